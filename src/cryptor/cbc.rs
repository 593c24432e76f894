// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! CBC block path: one chained run per block-interface call, IV supplied by
//! the caller each time.

use crate::cryptor::aes::{xor_in_place, AesBlock};
use crate::error::Result;
use crate::types::BLOCK_SIZE;

pub(crate) struct CbcEngine {
    cipher: AesBlock,
}

impl CbcEngine {
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self {
            cipher: AesBlock::new(key)?,
        })
    }

    /// Encrypt a block-aligned run chained from `iv`. Lengths are validated
    /// by the caller.
    pub fn encrypt_blocks(&self, iv: &[u8; BLOCK_SIZE], input: &[u8], output: &mut [u8]) {
        let mut chain = *iv;
        for (pt, ct) in input
            .chunks_exact(BLOCK_SIZE)
            .zip(output.chunks_exact_mut(BLOCK_SIZE))
        {
            let mut block: [u8; BLOCK_SIZE] = pt.try_into().expect("block-aligned");
            xor_in_place(&mut block, &chain);
            self.cipher.encrypt_block(&mut block);
            ct.copy_from_slice(&block);
            chain = block;
        }
    }

    /// Decrypt a block-aligned run chained from `iv`.
    pub fn decrypt_blocks(&self, iv: &[u8; BLOCK_SIZE], input: &[u8], output: &mut [u8]) {
        let mut chain = *iv;
        for (ct, pt) in input
            .chunks_exact(BLOCK_SIZE)
            .zip(output.chunks_exact_mut(BLOCK_SIZE))
        {
            let cipher_block: [u8; BLOCK_SIZE] = ct.try_into().expect("block-aligned");
            let mut block = cipher_block;
            self.cipher.decrypt_block(&mut block);
            xor_in_place(&mut block, &chain);
            pt.copy_from_slice(&block);
            chain = cipher_block;
        }
    }
}
