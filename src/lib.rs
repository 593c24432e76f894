// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Authcryptor
//!
//! Authenticated and tweakable block cryptor with an incremental parameter
//! protocol: block-level encrypt/decrypt with explicit per-call tweaks
//! (XTS, CBC), streaming AEAD with finalize/reset (GCM, CCM), and a typed
//! parameter interface for IVs, AAD, size hints and tag retrieval.

pub mod audit;
pub mod cryptor;
pub mod error;
pub mod memory;
pub mod random;
pub mod side_channel;
pub mod types;

pub use cryptor::{Cryptor, CryptorBuilder, Parameter};
pub use error::{CryptorError, Result};
pub use types::{Direction, Mode, ParameterKind, Phase, BLOCK_SIZE};

/// Initialize the library (audit logging).
pub fn init() {
    audit::AuditLogger::init();
}
