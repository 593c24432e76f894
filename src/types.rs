// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 所有支持的模式共用 AES 分组宽度
pub const BLOCK_SIZE: usize = 16;

/// Cipher mode of operation, fixed at cryptor creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// CBC - chained blocks, IV supplied per block-interface call
    Cbc,
    /// CTR - keystream mode, identical transform both directions
    Ctr,
    /// XTS - tweaked blocks, full-width tweak supplied per data unit
    Xts,
    /// GCM - authenticated encryption, CTR + GHASH
    Gcm,
    /// CCM - authenticated encryption, CTR + CBC-MAC
    Ccm,
}

impl Mode {
    /// Authenticated modes produce and verify a tag via `finalize`.
    pub fn is_aead(&self) -> bool {
        matches!(self, Mode::Gcm | Mode::Ccm)
    }

    /// Modes served by the `encrypt_data_block`/`decrypt_data_block` pair.
    pub fn is_block_tweaked(&self) -> bool {
        matches!(self, Mode::Cbc | Mode::Xts)
    }

    /// Modes served by the streaming `update` path.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Mode::Ctr | Mode::Gcm | Mode::Ccm)
    }

    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Cbc => "CBC",
            Self::Ctr => "CTR",
            Self::Xts => "XTS",
            Self::Gcm => "GCM",
            Self::Ccm => "CCM",
        };
        write!(f, "{name}")
    }
}

/// Cryptor direction, fixed at creation.
///
/// `Both` is accepted only for modes where encryption and decryption are the
/// same transform (CTR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Encrypt,
    Decrypt,
    Both,
}

impl Direction {
    pub fn can_encrypt(&self) -> bool {
        matches!(self, Direction::Encrypt | Direction::Both)
    }

    pub fn can_decrypt(&self) -> bool {
        matches!(self, Direction::Decrypt | Direction::Both)
    }
}

/// Call-sequence phase of a cryptor.
///
/// Every mutating operation checks the phase first; out-of-order calls are
/// rejected without touching cryptor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// 创建后（或 reset 后）的初始状态
    Initialized,
    /// At least one parameter accepted, no data processed yet
    ParametersAccepted,
    /// Data has flowed; IV/AAD/size parameters are frozen
    Processing,
    /// Terminal per message; only `reset` leaves this phase
    Finalized,
}

impl Phase {
    /// IV/AAD/size parameters are only accepted before data flows.
    pub fn accepts_parameters(&self) -> bool {
        matches!(self, Phase::Initialized | Phase::ParametersAccepted)
    }
}

/// Tag identifying a cryptor parameter for retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Initialization vector (input only)
    Iv,
    /// Additional authenticated data (input only)
    AuthData,
    /// Expected tag size for CCM (input only)
    MacSize,
    /// Expected payload size for CCM (input only)
    DataSize,
    /// Authentication tag (output only, after encrypt finalize)
    AuthTag,
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Iv => "IV",
            Self::AuthData => "AuthData",
            Self::MacSize => "MacSize",
            Self::DataSize => "DataSize",
            Self::AuthTag => "AuthTag",
        };
        write!(f, "{name}")
    }
}
