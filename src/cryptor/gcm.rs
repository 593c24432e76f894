// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Incremental GCM (SP 800-38D): AES-CTR keystream with 32-bit counter wrap
//! plus a streaming GHASH accumulator. IV and AAD arrive through the
//! parameter protocol before data flows; arbitrary IV lengths are supported
//! (12-byte IVs are used directly, others run through GHASH).

use ghash::universal_hash::generic_array::GenericArray;
use ghash::universal_hash::{KeyInit, UniversalHash};
use ghash::GHash;

use crate::cryptor::aes::{xor_in_place, AesBlock, AesCtr32};
use crate::error::{CryptorError, Result};
use crate::memory::SecretBytes;
use crate::types::BLOCK_SIZE;

pub(crate) const GCM_TAG_SIZE: usize = 16;

pub(crate) struct GcmEngine {
    key: SecretBytes,
    iv: Vec<u8>,
    aad: Vec<u8>,
    ks: Option<AesCtr32>,
    ghash: Option<GHash>,
    tag_mask: [u8; BLOCK_SIZE],
    /// Ciphertext bytes not yet absorbed into GHASH (sub-block carry)
    partial: [u8; BLOCK_SIZE],
    partial_len: usize,
    aad_len: u64,
    data_len: u64,
}

impl GcmEngine {
    pub fn new(key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(CryptorError::InvalidKeyLength(key.len()));
        }
        Ok(Self {
            key: SecretBytes::from_slice(key)?,
            iv: Vec::new(),
            aad: Vec::new(),
            ks: None,
            ghash: None,
            tag_mask: [0u8; BLOCK_SIZE],
            partial: [0u8; BLOCK_SIZE],
            partial_len: 0,
            aad_len: 0,
            data_len: 0,
        })
    }

    pub fn append_iv(&mut self, data: &[u8]) {
        self.iv.extend_from_slice(data);
    }

    pub fn append_aad(&mut self, data: &[u8]) {
        self.aad.extend_from_slice(data);
    }

    pub fn started(&self) -> bool {
        self.ks.is_some()
    }

    /// Freeze IV and AAD, derive the hash subkey and pre-counter block, and
    /// open the keystream.
    pub fn start(&mut self) -> Result<()> {
        if self.iv.is_empty() {
            return Err(CryptorError::CallSequence(
                "GCM initialization vector not supplied".into(),
            ));
        }

        // Hash subkey H = E_K(0^128)
        let cipher = AesBlock::new(self.key.as_bytes())?;
        let mut h = [0u8; BLOCK_SIZE];
        cipher.encrypt_block(&mut h);

        let j0 = derive_j0(&h, &self.iv);
        let mut ks = AesCtr32::new(self.key.as_bytes(), &j0)?;

        // First keystream block is E(J0), the tag mask; data starts at
        // inc32(J0).
        let mut tag_mask = [0u8; BLOCK_SIZE];
        ks.apply_keystream(&mut tag_mask);

        let mut ghash = GHash::new(GenericArray::from_slice(&h));
        ghash.update_padded(&self.aad);
        self.aad_len = self.aad.len() as u64;

        self.ks = Some(ks);
        self.ghash = Some(ghash);
        self.tag_mask = tag_mask;
        Ok(())
    }

    pub fn encrypt(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        let ks = self
            .ks
            .as_mut()
            .ok_or_else(|| CryptorError::CallSequence("GCM keystream not started".into()))?;
        output.copy_from_slice(input);
        ks.apply_keystream(output);
        self.absorb(output);
        self.data_len += input.len() as u64;
        Ok(())
    }

    pub fn decrypt(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        if self.ks.is_none() {
            return Err(CryptorError::CallSequence(
                "GCM keystream not started".into(),
            ));
        }
        // GHASH covers the ciphertext, so absorb before applying keystream
        self.absorb(input);
        output.copy_from_slice(input);
        if let Some(ks) = self.ks.as_mut() {
            ks.apply_keystream(output);
        }
        self.data_len += input.len() as u64;
        Ok(())
    }

    /// Close the GHASH accumulation and produce the full 16-byte tag.
    pub fn compute_tag(&mut self) -> Result<[u8; GCM_TAG_SIZE]> {
        let mut ghash = self
            .ghash
            .take()
            .ok_or_else(|| CryptorError::CallSequence("GCM not started".into()))?;

        if self.partial_len > 0 {
            ghash.update_padded(&self.partial[..self.partial_len]);
            self.partial_len = 0;
        }

        let mut len_block = [0u8; BLOCK_SIZE];
        len_block[..8].copy_from_slice(&(self.aad_len * 8).to_be_bytes());
        len_block[8..].copy_from_slice(&(self.data_len * 8).to_be_bytes());
        ghash.update_padded(&len_block);

        let mut tag = [0u8; GCM_TAG_SIZE];
        tag.copy_from_slice(&ghash.finalize());
        xor_in_place(&mut tag, &self.tag_mask);
        Ok(tag)
    }

    /// Back to the state creation left: key retained, everything else
    /// cleared.
    pub fn reset(&mut self) {
        self.iv.clear();
        self.aad.clear();
        self.ks = None;
        self.ghash = None;
        self.tag_mask = [0u8; BLOCK_SIZE];
        self.partial = [0u8; BLOCK_SIZE];
        self.partial_len = 0;
        self.aad_len = 0;
        self.data_len = 0;
    }

    /// Stream ciphertext bytes into GHASH, carrying sub-block remainders
    /// across calls.
    fn absorb(&mut self, mut data: &[u8]) {
        let ghash = match self.ghash.as_mut() {
            Some(g) => g,
            None => return,
        };

        if self.partial_len > 0 {
            let take = (BLOCK_SIZE - self.partial_len).min(data.len());
            self.partial[self.partial_len..self.partial_len + take].copy_from_slice(&data[..take]);
            self.partial_len += take;
            data = &data[take..];
            if self.partial_len == BLOCK_SIZE {
                ghash.update_padded(&self.partial);
                self.partial_len = 0;
            }
        }

        let full = data.len() - data.len() % BLOCK_SIZE;
        if full > 0 {
            ghash.update_padded(&data[..full]);
        }
        let rem = &data[full..];
        if !rem.is_empty() {
            self.partial[..rem.len()].copy_from_slice(rem);
            self.partial_len = rem.len();
        }
    }
}

/// Pre-counter block per SP 800-38D §7.1.
fn derive_j0(h: &[u8; BLOCK_SIZE], iv: &[u8]) -> [u8; BLOCK_SIZE] {
    let mut j0 = [0u8; BLOCK_SIZE];
    if iv.len() == 12 {
        j0[..12].copy_from_slice(iv);
        j0[15] = 1;
    } else {
        let mut ghash = GHash::new(GenericArray::from_slice(h));
        ghash.update_padded(iv);
        let mut len_block = [0u8; BLOCK_SIZE];
        len_block[8..].copy_from_slice(&((iv.len() as u64) * 8).to_be_bytes());
        ghash.update_padded(&len_block);
        j0.copy_from_slice(&ghash.finalize());
    }
    j0
}
