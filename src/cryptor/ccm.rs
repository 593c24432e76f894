// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Incremental CCM (SP 800-38C / RFC 3610): AES-CTR for the payload plus a
//! streaming CBC-MAC. CCM needs the tag size and the total payload size up
//! front, which is what the `MacSize`/`DataSize` parameters carry.

use crate::cryptor::aes::{xor_in_place, AesBlock, AesCtr128};
use crate::error::{CryptorError, Result};
use crate::memory::SecretBytes;
use crate::types::BLOCK_SIZE;

/// Tag sizes permitted by SP 800-38C.
const VALID_MAC_SIZES: [usize; 7] = [4, 6, 8, 10, 12, 14, 16];

/// Nonce lengths permitted by the CCM counter layout.
const NONCE_LEN_RANGE: std::ops::RangeInclusive<usize> = 7..=13;

struct CbcMac {
    cipher: AesBlock,
    x: [u8; BLOCK_SIZE],
}

impl CbcMac {
    fn new(cipher: AesBlock) -> Self {
        Self {
            cipher,
            x: [0u8; BLOCK_SIZE],
        }
    }

    fn update_block(&mut self, block: &[u8; BLOCK_SIZE]) {
        xor_in_place(&mut self.x, block);
        self.cipher.encrypt_block(&mut self.x);
    }
}

pub(crate) struct CcmEngine {
    key: SecretBytes,
    nonce: Vec<u8>,
    aad: Vec<u8>,
    mac_size: Option<usize>,
    data_size: Option<usize>,
    ks: Option<AesCtr128>,
    cbc_mac: Option<CbcMac>,
    a0_mask: [u8; BLOCK_SIZE],
    /// Plaintext bytes not yet absorbed into the CBC-MAC
    partial: [u8; BLOCK_SIZE],
    partial_len: usize,
    processed: usize,
}

impl CcmEngine {
    pub fn new(key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(CryptorError::InvalidKeyLength(key.len()));
        }
        Ok(Self {
            key: SecretBytes::from_slice(key)?,
            nonce: Vec::new(),
            aad: Vec::new(),
            mac_size: None,
            data_size: None,
            ks: None,
            cbc_mac: None,
            a0_mask: [0u8; BLOCK_SIZE],
            partial: [0u8; BLOCK_SIZE],
            partial_len: 0,
            processed: 0,
        })
    }

    pub fn append_nonce(&mut self, data: &[u8]) {
        self.nonce.extend_from_slice(data);
    }

    pub fn append_aad(&mut self, data: &[u8]) {
        self.aad.extend_from_slice(data);
    }

    pub fn set_mac_size(&mut self, size: usize) -> Result<()> {
        if !VALID_MAC_SIZES.contains(&size) {
            return Err(CryptorError::InvalidParameter(format!(
                "CCM MAC size {size} not in {VALID_MAC_SIZES:?}"
            )));
        }
        self.mac_size = Some(size);
        Ok(())
    }

    pub fn set_data_size(&mut self, size: usize) {
        self.data_size = Some(size);
    }

    pub fn mac_size(&self) -> Option<usize> {
        self.mac_size
    }

    pub fn started(&self) -> bool {
        self.ks.is_some()
    }

    /// Freeze nonce, AAD and size hints; absorb the B0 and AAD blocks into
    /// the CBC-MAC and open the counter keystream.
    pub fn start(&mut self) -> Result<()> {
        let mac_size = self
            .mac_size
            .ok_or_else(|| CryptorError::CallSequence("CCM MAC size not set".into()))?;
        let data_size = self
            .data_size
            .ok_or_else(|| CryptorError::CallSequence("CCM data size not set".into()))?;
        if !NONCE_LEN_RANGE.contains(&self.nonce.len()) {
            return Err(CryptorError::InvalidParameter(format!(
                "CCM nonce length {} outside 7..=13",
                self.nonce.len()
            )));
        }

        // Counter field width q is implied by the nonce length and bounds
        // the payload size.
        let q = 15 - self.nonce.len();
        if q < 8 && (data_size as u128) >= (1u128 << (8 * q as u32)) {
            return Err(CryptorError::InvalidParameter(format!(
                "CCM data size {data_size} does not fit a {q}-byte length field"
            )));
        }

        let cipher = AesBlock::new(self.key.as_bytes())?;
        let mut cbc_mac = CbcMac::new(cipher);

        // B0: flags | nonce | payload length
        let mut b0 = [0u8; BLOCK_SIZE];
        let mut flags = ((mac_size - 2) / 2) << 3 | (q - 1);
        if !self.aad.is_empty() {
            flags |= 0x40;
        }
        b0[0] = flags as u8;
        b0[1..1 + self.nonce.len()].copy_from_slice(&self.nonce);
        b0[BLOCK_SIZE - q..].copy_from_slice(&(data_size as u64).to_be_bytes()[8 - q..]);
        cbc_mac.update_block(&b0);

        if !self.aad.is_empty() {
            for block in encode_aad(&self.aad).chunks_exact(BLOCK_SIZE) {
                cbc_mac.update_block(block.try_into().expect("block-aligned"));
            }
        }

        // A0 is the tag mask counter block; payload counters follow from A1
        let mut a0 = [0u8; BLOCK_SIZE];
        a0[0] = (q - 1) as u8;
        a0[1..1 + self.nonce.len()].copy_from_slice(&self.nonce);
        let mut ks = AesCtr128::new(self.key.as_bytes(), &a0)?;
        let mut a0_mask = [0u8; BLOCK_SIZE];
        ks.apply_keystream(&mut a0_mask);

        self.ks = Some(ks);
        self.cbc_mac = Some(cbc_mac);
        self.a0_mask = a0_mask;
        self.processed = 0;
        Ok(())
    }

    pub fn encrypt(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        self.check_declared_size(input.len())?;
        // MAC covers the plaintext
        self.mac_absorb_copy(input);
        let ks = self
            .ks
            .as_mut()
            .ok_or_else(|| CryptorError::CallSequence("CCM keystream not started".into()))?;
        output.copy_from_slice(input);
        ks.apply_keystream(output);
        self.processed += input.len();
        Ok(())
    }

    pub fn decrypt(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        self.check_declared_size(input.len())?;
        let ks = self
            .ks
            .as_mut()
            .ok_or_else(|| CryptorError::CallSequence("CCM keystream not started".into()))?;
        output.copy_from_slice(input);
        ks.apply_keystream(output);
        self.mac_absorb_copy(output);
        self.processed += input.len();
        Ok(())
    }

    /// Close the CBC-MAC and produce the tag at the configured size.
    pub fn compute_tag(&mut self) -> Result<Vec<u8>> {
        let mac_size = self
            .mac_size
            .ok_or_else(|| CryptorError::CallSequence("CCM MAC size not set".into()))?;
        let data_size = self
            .data_size
            .ok_or_else(|| CryptorError::CallSequence("CCM data size not set".into()))?;
        if self.processed != data_size {
            return Err(CryptorError::InvalidParameter(format!(
                "CCM processed {} bytes of {} declared",
                self.processed, data_size
            )));
        }

        let cbc_mac = self
            .cbc_mac
            .as_mut()
            .ok_or_else(|| CryptorError::CallSequence("CCM not started".into()))?;
        if self.partial_len > 0 {
            let mut last = [0u8; BLOCK_SIZE];
            last[..self.partial_len].copy_from_slice(&self.partial[..self.partial_len]);
            cbc_mac.update_block(&last);
            self.partial_len = 0;
        }

        let mut tag = cbc_mac.x;
        xor_in_place(&mut tag, &self.a0_mask);
        Ok(tag[..mac_size].to_vec())
    }

    /// Back to the state creation left: key retained, everything else
    /// cleared.
    pub fn reset(&mut self) {
        self.nonce.clear();
        self.aad.clear();
        self.mac_size = None;
        self.data_size = None;
        self.ks = None;
        self.cbc_mac = None;
        self.a0_mask = [0u8; BLOCK_SIZE];
        self.partial = [0u8; BLOCK_SIZE];
        self.partial_len = 0;
        self.processed = 0;
    }

    fn check_declared_size(&self, len: usize) -> Result<()> {
        let data_size = self
            .data_size
            .ok_or_else(|| CryptorError::CallSequence("CCM data size not set".into()))?;
        if self.processed + len > data_size {
            return Err(CryptorError::InvalidParameter(format!(
                "CCM input exceeds declared data size {data_size}"
            )));
        }
        Ok(())
    }

    /// Stream plaintext bytes into the CBC-MAC, carrying sub-block
    /// remainders across calls.
    fn mac_absorb_copy(&mut self, mut data: &[u8]) {
        let cbc_mac = match self.cbc_mac.as_mut() {
            Some(m) => m,
            None => return,
        };

        if self.partial_len > 0 {
            let take = (BLOCK_SIZE - self.partial_len).min(data.len());
            self.partial[self.partial_len..self.partial_len + take].copy_from_slice(&data[..take]);
            self.partial_len += take;
            data = &data[take..];
            if self.partial_len == BLOCK_SIZE {
                let block = self.partial;
                cbc_mac.update_block(&block);
                self.partial_len = 0;
            }
        }

        let mut chunks = data.chunks_exact(BLOCK_SIZE);
        for block in chunks.by_ref() {
            cbc_mac.update_block(block.try_into().expect("block-aligned"));
        }
        let rem = chunks.remainder();
        if !rem.is_empty() {
            self.partial[..rem.len()].copy_from_slice(rem);
            self.partial_len = rem.len();
        }
    }
}

/// Length-prefixed AAD encoding per RFC 3610 §2.2, zero-padded to the block
/// boundary.
fn encode_aad(aad: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(aad.len() + BLOCK_SIZE);
    let len = aad.len();
    if len < 0xFF00 {
        encoded.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        encoded.extend_from_slice(&[0xFF, 0xFE]);
        encoded.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        encoded.extend_from_slice(&[0xFF, 0xFF]);
        encoded.extend_from_slice(&(len as u64).to_be_bytes());
    }
    encoded.extend_from_slice(aad);
    let rem = encoded.len() % BLOCK_SIZE;
    if rem != 0 {
        encoded.resize(encoded.len() + BLOCK_SIZE - rem, 0);
    }
    encoded
}
