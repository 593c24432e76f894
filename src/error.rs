// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CryptorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid key length: {0}")]
    InvalidKeyLength(usize),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Buffer too small: {required} bytes required")]
    BufferTooSmall { required: usize },

    #[error("Call sequence error: {0}")]
    CallSequence(String),

    /// Tag mismatch on decrypt finalize. No payload: the failure signal
    /// must not reveal where the mismatch occurred.
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Insufficient entropy")]
    InsufficientEntropy,

    #[error("Memory protection failed: {0}")]
    MemoryProtectionFailed(String),
}

pub type Result<T> = std::result::Result<T, CryptorError>;
