// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::error::{CryptorError, Result};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::{Arc, Mutex};
use zeroize::Zeroize;

/// ChaCha20 CSPRNG seeded from the operating system entropy source.
///
/// Used for IV and key generation helpers; the cryptor itself never draws
/// randomness (IVs are caller-supplied).
pub struct SecureRandom {
    csprng: Arc<Mutex<ChaCha20Rng>>,
}

impl SecureRandom {
    pub fn new() -> Result<Self> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).map_err(|_| CryptorError::InsufficientEntropy)?;
        let rng = ChaCha20Rng::from_seed(seed);
        seed.zeroize();

        Ok(Self {
            csprng: Arc::new(Mutex::new(rng)),
        })
    }

    pub fn fill(&self, dest: &mut [u8]) -> Result<()> {
        let mut rng = self
            .csprng
            .lock()
            .map_err(|_| CryptorError::InsufficientEntropy)?;
        rng.fill_bytes(dest);
        Ok(())
    }

    /// 生成 n 字节随机数据
    pub fn generate(&self, n: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; n];
        self.fill(&mut out)?;
        Ok(out)
    }
}

impl RngCore for SecureRandom {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        let _ = self.fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        let _ = self.fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let _ = self.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill(dest).map_err(rand::Error::new)
    }
}

impl CryptoRng for SecureRandom {}
