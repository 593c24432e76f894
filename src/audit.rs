// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::types::{Direction, Mode};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Sender};
use std::sync::Mutex;
use std::thread;

/// One audit record per security-relevant cryptor event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub timestamp: DateTime<Utc>,
    /// Operation name ("FINALIZE", "RESET", ...)
    pub operation: String,
    pub mode: Option<Mode>,
    pub direction: Option<Direction>,
    /// "SUCCESS" or "FAILURE"
    pub status: String,
    pub details: String,
}

/// Audit logger with channel-based logging to reduce lock contention.
pub struct AuditLogger {
    sender: Sender<String>,
    sync_buffer: Mutex<Vec<String>>,
    _handle: Option<thread::JoinHandle<()>>,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        // 后台线程处理日志
        let handle = thread::spawn(move || {
            for log_entry in receiver {
                log::info!("AUDIT: {}", log_entry);
            }
        });

        Self {
            sender,
            sync_buffer: Mutex::new(Vec::new()),
            _handle: Some(handle),
        }
    }

    pub fn init() {
        log::info!("Audit logger initialized");
    }

    /// Record a cryptor event.
    pub fn log(
        operation: &str,
        mode: Option<Mode>,
        direction: Option<Direction>,
        result: Result<(), &str>,
    ) {
        let entry = AuditLog {
            timestamp: Utc::now(),
            operation: operation.to_string(),
            mode,
            direction,
            status: if result.is_ok() { "SUCCESS" } else { "FAILURE" }.to_string(),
            details: result.err().unwrap_or("").to_string(),
        };

        if let Ok(json) = serde_json::to_string(&entry) {
            // Sync buffer keeps the most recent entries for inspection
            if let Ok(mut buf) = LOGGER.sync_buffer.lock() {
                if buf.len() < 1000 {
                    buf.push(json.clone());
                }
            }

            let _ = LOGGER.sender.send(json);
        }
    }

    pub fn get_logs() -> Vec<String> {
        LOGGER
            .sync_buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    pub fn clear_logs() {
        if let Ok(mut buf) = LOGGER.sync_buffer.lock() {
            buf.clear();
        }
    }
}

lazy_static! {
    static ref LOGGER: AuditLogger = AuditLogger::new();
}
