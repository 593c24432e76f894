// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! XTS tweaked-block path (IEEE 1619). Each block-interface call processes
//! one data unit under the caller-supplied full-width tweak.

use crate::cryptor::aes::{xor_in_place, AesBlock};
use crate::error::{CryptorError, Result};
use crate::types::BLOCK_SIZE;

/// GF(2^128) feedback constant for tweak multiplication.
const GF_128_FDBK: u8 = 0x87;

pub(crate) struct XtsEngine {
    data_cipher: AesBlock,
    tweak_cipher: AesBlock,
}

impl XtsEngine {
    /// Key is the concatenation of the data key and the tweak key.
    /// XTS-AES is defined for AES-128 and AES-256, so 32 or 64 bytes total.
    pub fn new(key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 32 | 64) {
            return Err(CryptorError::InvalidKeyLength(key.len()));
        }
        let (data_key, tweak_key) = key.split_at(key.len() / 2);
        Ok(Self {
            data_cipher: AesBlock::new(data_key)?,
            tweak_cipher: AesBlock::new(tweak_key)?,
        })
    }

    /// Encrypted tweak for the first block of a data unit.
    fn initial_tweak(&self, iv: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        let mut tweak = *iv;
        self.tweak_cipher.encrypt_block(&mut tweak);
        tweak
    }

    pub fn encrypt_data_unit(&self, iv: &[u8; BLOCK_SIZE], input: &[u8], output: &mut [u8]) {
        let mut tweak = self.initial_tweak(iv);
        for (pt, ct) in input
            .chunks_exact(BLOCK_SIZE)
            .zip(output.chunks_exact_mut(BLOCK_SIZE))
        {
            let mut block: [u8; BLOCK_SIZE] = pt.try_into().expect("block-aligned");
            xor_in_place(&mut block, &tweak);
            self.data_cipher.encrypt_block(&mut block);
            xor_in_place(&mut block, &tweak);
            ct.copy_from_slice(&block);
            gf_mul_alpha(&mut tweak);
        }
    }

    pub fn decrypt_data_unit(&self, iv: &[u8; BLOCK_SIZE], input: &[u8], output: &mut [u8]) {
        let mut tweak = self.initial_tweak(iv);
        for (ct, pt) in input
            .chunks_exact(BLOCK_SIZE)
            .zip(output.chunks_exact_mut(BLOCK_SIZE))
        {
            let mut block: [u8; BLOCK_SIZE] = ct.try_into().expect("block-aligned");
            xor_in_place(&mut block, &tweak);
            self.data_cipher.decrypt_block(&mut block);
            xor_in_place(&mut block, &tweak);
            pt.copy_from_slice(&block);
            gf_mul_alpha(&mut tweak);
        }
    }
}

/// Multiply the tweak by the primitive element alpha, little-endian bit
/// order per IEEE 1619.
fn gf_mul_alpha(tweak: &mut [u8; BLOCK_SIZE]) {
    let mut carry_in = 0u8;
    for byte in tweak.iter_mut() {
        let carry_out = (*byte >> 7) & 1;
        *byte = (*byte << 1) | carry_in;
        carry_in = carry_out;
    }
    if carry_in > 0 {
        tweak[0] ^= GF_128_FDBK;
    }
}
