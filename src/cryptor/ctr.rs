// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! CTR streaming path. The transform is its own inverse, so this is the one
//! mode that accepts `Direction::Both`.

use crate::cryptor::aes::AesCtr128;
use crate::error::{CryptorError, Result};
use crate::memory::SecretBytes;
use crate::types::BLOCK_SIZE;

pub(crate) struct CtrEngine {
    key: SecretBytes,
    iv: Vec<u8>,
    ks: Option<AesCtr128>,
}

impl CtrEngine {
    pub fn new(key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(CryptorError::InvalidKeyLength(key.len()));
        }
        Ok(Self {
            key: SecretBytes::from_slice(key)?,
            iv: Vec::new(),
            ks: None,
        })
    }

    pub fn append_iv(&mut self, data: &[u8]) {
        self.iv.extend_from_slice(data);
    }

    pub fn iv_len(&self) -> usize {
        self.iv.len()
    }

    /// Build the keystream from the accumulated counter block.
    pub fn start(&mut self) -> Result<()> {
        if self.iv.len() != BLOCK_SIZE {
            return Err(CryptorError::CallSequence(format!(
                "CTR requires a {BLOCK_SIZE}-byte initial counter block, got {}",
                self.iv.len()
            )));
        }
        let iv: [u8; BLOCK_SIZE] = self.iv[..].try_into().expect("length checked");
        self.ks = Some(AesCtr128::new(self.key.as_bytes(), &iv)?);
        Ok(())
    }

    pub fn apply(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        let ks = self
            .ks
            .as_mut()
            .ok_or_else(|| CryptorError::CallSequence("CTR keystream not started".into()))?;
        output.copy_from_slice(input);
        ks.apply_keystream(output);
        Ok(())
    }
}
