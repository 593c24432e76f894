// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::error::Result;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(unix)]
use libc::{c_void, mlock};

/// Secure container for key material with auto-zeroize and mlock.
///
/// Key bytes handed to a cryptor live here for the cryptor's lifetime and
/// are wiped when it is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes {
    inner: Vec<u8>,
    locked: bool,
}

impl SecretBytes {
    pub fn new(data: Vec<u8>) -> Result<Self> {
        let mut secret = Self {
            inner: data,
            locked: false,
        };
        secret.lock_memory()?;
        Ok(secret)
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Self::new(data.to_vec())
    }

    #[cfg(unix)]
    fn lock_memory(&mut self) -> Result<()> {
        if self.inner.is_empty() {
            return Ok(());
        }
        // Best effort: RLIMIT_MEMLOCK may be exhausted, zeroize-on-drop
        // still applies without the page lock.
        unsafe {
            let ptr = self.inner.as_ptr() as *const c_void;
            if mlock(ptr, self.inner.len()) == 0 {
                self.locked = true;
            } else {
                log::debug!("mlock unavailable, key pages not pinned");
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn lock_memory(&mut self) -> Result<()> {
        // No page locking on this platform, zeroize-on-drop still applies
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Clone for SecretBytes {
    fn clone(&self) -> Self {
        let mut cloned = Self {
            inner: self.inner.clone(),
            locked: false,
        };
        let _ = cloned.lock_memory();
        cloned
    }
}
