// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! AES core dispatch over the supported key lengths.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::error::{CryptorError, Result};
use crate::types::BLOCK_SIZE;

/// AES key schedule selected by key length (16, 24 or 32 bytes).
#[derive(Clone)]
pub(crate) enum AesBlock {
    Aes128(Box<Aes128>),
    Aes192(Box<Aes192>),
    Aes256(Box<Aes256>),
}

impl AesBlock {
    pub fn new(key: &[u8]) -> Result<Self> {
        match key.len() {
            16 => Aes128::new_from_slice(key)
                .map(|c| Self::Aes128(Box::new(c)))
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            24 => Aes192::new_from_slice(key)
                .map(|c| Self::Aes192(Box::new(c)))
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            32 => Aes256::new_from_slice(key)
                .map(|c| Self::Aes256(Box::new(c)))
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            n => Err(CryptorError::InvalidKeyLength(n)),
        }
    }

    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes192(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }

    pub fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.decrypt_block(block),
            Self::Aes192(c) => c.decrypt_block(block),
            Self::Aes256(c) => c.decrypt_block(block),
        }
    }
}

/// AES-CTR keystream with 32-bit big-endian counter wrap (GCM flavor).
pub(crate) enum AesCtr32 {
    Aes128(ctr::Ctr32BE<Aes128>),
    Aes192(ctr::Ctr32BE<Aes192>),
    Aes256(ctr::Ctr32BE<Aes256>),
}

impl AesCtr32 {
    pub fn new(key: &[u8], iv: &[u8; BLOCK_SIZE]) -> Result<Self> {
        match key.len() {
            16 => ctr::Ctr32BE::<Aes128>::new_from_slices(key, iv)
                .map(Self::Aes128)
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            24 => ctr::Ctr32BE::<Aes192>::new_from_slices(key, iv)
                .map(Self::Aes192)
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            32 => ctr::Ctr32BE::<Aes256>::new_from_slices(key, iv)
                .map(Self::Aes256)
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            n => Err(CryptorError::InvalidKeyLength(n)),
        }
    }

    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.apply_keystream(buf),
            Self::Aes192(c) => c.apply_keystream(buf),
            Self::Aes256(c) => c.apply_keystream(buf),
        }
    }
}

/// AES-CTR keystream with full-width 128-bit big-endian counter
/// (SP 800-38A CTR and the CCM counter blocks).
pub(crate) enum AesCtr128 {
    Aes128(ctr::Ctr128BE<Aes128>),
    Aes192(ctr::Ctr128BE<Aes192>),
    Aes256(ctr::Ctr128BE<Aes256>),
}

impl AesCtr128 {
    pub fn new(key: &[u8], iv: &[u8; BLOCK_SIZE]) -> Result<Self> {
        match key.len() {
            16 => ctr::Ctr128BE::<Aes128>::new_from_slices(key, iv)
                .map(Self::Aes128)
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            24 => ctr::Ctr128BE::<Aes192>::new_from_slices(key, iv)
                .map(Self::Aes192)
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            32 => ctr::Ctr128BE::<Aes256>::new_from_slices(key, iv)
                .map(Self::Aes256)
                .map_err(|_| CryptorError::InvalidKeyLength(key.len())),
            n => Err(CryptorError::InvalidKeyLength(n)),
        }
    }

    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.apply_keystream(buf),
            Self::Aes192(c) => c.apply_keystream(buf),
            Self::Aes256(c) => c.apply_keystream(buf),
        }
    }
}

pub(crate) fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}
