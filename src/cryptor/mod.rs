// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Authenticated/tweakable block cryptor.
//!
//! A [`Cryptor`] is fixed to a mode and direction at creation and driven
//! through an incremental protocol: parameters first (IV, AAD, size hints),
//! then data, then finalize. Every mutating operation checks the phase
//! state machine and rejects out-of-order calls without touching state.

mod aes;
mod cbc;
mod ccm;
mod ctr;
mod gcm;
mod parameter;
mod xts;

pub use parameter::Parameter;

use crate::audit::AuditLogger;
use crate::cryptor::cbc::CbcEngine;
use crate::cryptor::ccm::CcmEngine;
use crate::cryptor::ctr::CtrEngine;
use crate::cryptor::gcm::{GcmEngine, GCM_TAG_SIZE};
use crate::cryptor::xts::XtsEngine;
use crate::error::{CryptorError, Result};
use crate::side_channel::constant_time_eq;
use crate::types::{Direction, Mode, ParameterKind, Phase, BLOCK_SIZE};

/// Per-mode engine state, dispatched by a single match over the
/// mode/phase/parameter triple.
enum Engine {
    Cbc(CbcEngine),
    Ctr(CtrEngine),
    Xts(XtsEngine),
    Gcm(GcmEngine),
    Ccm(CcmEngine),
}

/// An already-keyed cryptor for one `(mode, direction)` pair.
///
/// Not safe for concurrent use: the phase and accumulator state is mutated
/// in place by every operation, and call ordering must be linearized by the
/// caller. Use one cryptor per concurrent stream.
pub struct Cryptor {
    mode: Mode,
    direction: Direction,
    phase: Phase,
    engine: Engine,
    /// Tag produced by the last encrypt finalize, kept for retrieval
    tag: Option<Vec<u8>>,
}

impl Cryptor {
    /// Create a keyed cryptor.
    ///
    /// Key lengths are 16/24/32 bytes for CBC/CTR/GCM/CCM and 32/64 bytes
    /// (two concatenated AES keys) for XTS. `Direction::Both` is accepted
    /// only for CTR.
    ///
    /// # Errors
    /// `InvalidParameter` for an impossible mode/direction pairing,
    /// `InvalidKeyLength` for unsupported key material.
    pub fn new(mode: Mode, direction: Direction, key: &[u8]) -> Result<Self> {
        if direction == Direction::Both && mode != Mode::Ctr {
            return Err(CryptorError::InvalidParameter(format!(
                "direction Both is not valid for {mode} mode"
            )));
        }

        let engine = match mode {
            Mode::Cbc => Engine::Cbc(CbcEngine::new(key)?),
            Mode::Ctr => Engine::Ctr(CtrEngine::new(key)?),
            Mode::Xts => Engine::Xts(XtsEngine::new(key)?),
            Mode::Gcm => Engine::Gcm(GcmEngine::new(key)?),
            Mode::Ccm => Engine::Ccm(CcmEngine::new(key)?),
        };

        Ok(Self {
            mode,
            direction,
            phase: Phase::Initialized,
            engine,
            tag: None,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Feed one input parameter.
    ///
    /// IV and AAD accumulate across calls; `MacSize`/`DataSize` set scalar
    /// hints consumed by `finalize`. Rejected parameters leave the cryptor
    /// untouched.
    ///
    /// # Errors
    /// `NotImplemented` when the active mode does not take the parameter,
    /// `InvalidParameter` for malformed payloads, `CallSequence` once
    /// processing has started.
    pub fn add_parameter(&mut self, parameter: Parameter<'_>) -> Result<()> {
        if !self.phase.accepts_parameters() {
            return Err(CryptorError::CallSequence(format!(
                "{} parameter after processing started",
                parameter.kind()
            )));
        }

        match (&mut self.engine, parameter) {
            (Engine::Gcm(engine), Parameter::Iv(data)) => {
                require_payload(data)?;
                engine.append_iv(data);
            }
            (Engine::Ccm(engine), Parameter::Iv(data)) => {
                require_payload(data)?;
                engine.append_nonce(data);
            }
            (Engine::Ctr(engine), Parameter::Iv(data)) => {
                require_payload(data)?;
                if engine.iv_len() + data.len() > BLOCK_SIZE {
                    return Err(CryptorError::InvalidParameter(format!(
                        "CTR counter block exceeds {BLOCK_SIZE} bytes"
                    )));
                }
                engine.append_iv(data);
            }
            (Engine::Gcm(engine), Parameter::AuthData(data)) => {
                require_payload(data)?;
                engine.append_aad(data);
            }
            (Engine::Ccm(engine), Parameter::AuthData(data)) => {
                require_payload(data)?;
                engine.append_aad(data);
            }
            (Engine::Ccm(engine), Parameter::MacSize(size)) => {
                engine.set_mac_size(size)?;
            }
            (Engine::Ccm(engine), Parameter::DataSize(size)) => {
                engine.set_data_size(size);
            }
            (_, parameter) => {
                return Err(CryptorError::NotImplemented(format!(
                    "{} parameter not supported in {} mode",
                    parameter.kind(),
                    self.mode
                )));
            }
        }

        self.phase = Phase::ParametersAccepted;
        Ok(())
    }

    /// Retrieve an output parameter into `data`.
    ///
    /// Only `AuthTag` is retrievable, on an encrypt-direction AEAD cryptor
    /// after `finalize`. Returns the number of bytes written.
    ///
    /// # Errors
    /// `BufferTooSmall { required }` when `data` cannot hold the value;
    /// `data` is left untouched. `NotImplemented` for input-only parameters
    /// or when no tag is available for this mode/direction/phase.
    pub fn get_parameter(&self, kind: ParameterKind, data: &mut [u8]) -> Result<usize> {
        match kind {
            ParameterKind::AuthTag => {
                if !self.mode.is_aead() || self.direction != Direction::Encrypt {
                    return Err(CryptorError::NotImplemented(format!(
                        "authentication tag not retrievable for {} {:?} cryptor",
                        self.mode, self.direction
                    )));
                }
                let tag = self.tag.as_ref().ok_or_else(|| {
                    CryptorError::NotImplemented(
                        "authentication tag not available before finalize".into(),
                    )
                })?;
                if data.len() < tag.len() {
                    return Err(CryptorError::BufferTooSmall {
                        required: tag.len(),
                    });
                }
                data[..tag.len()].copy_from_slice(tag);
                Ok(tag.len())
            }
            kind => Err(CryptorError::NotImplemented(format!(
                "{kind} is an input-only parameter"
            ))),
        }
    }

    /// Stream payload through the cryptor (GCM/CCM/CTR).
    ///
    /// The first call freezes the accepted parameters and starts
    /// processing. `data_out` receives exactly `data_in.len()` bytes;
    /// arbitrary call granularity is supported.
    ///
    /// # Errors
    /// `NotImplemented` for block-tweaked modes, `CallSequence` after
    /// finalize or when required parameters are missing, `InvalidParameter`
    /// for mismatched buffer lengths.
    pub fn update(&mut self, data_in: &[u8], data_out: &mut [u8]) -> Result<()> {
        if !self.mode.is_streaming() {
            return Err(CryptorError::NotImplemented(format!(
                "update not supported in {} mode",
                self.mode
            )));
        }
        if self.phase == Phase::Finalized {
            return Err(CryptorError::CallSequence("update after finalize".into()));
        }
        if data_in.len() != data_out.len() {
            return Err(CryptorError::InvalidParameter(format!(
                "output length {} does not match input length {}",
                data_out.len(),
                data_in.len()
            )));
        }

        self.ensure_processing()?;

        match &mut self.engine {
            Engine::Ctr(engine) => engine.apply(data_in, data_out),
            Engine::Gcm(engine) => match self.direction {
                Direction::Encrypt => engine.encrypt(data_in, data_out),
                Direction::Decrypt => engine.decrypt(data_in, data_out),
                Direction::Both => Err(CryptorError::InvalidParameter(
                    "GCM cryptor cannot have direction Both".into(),
                )),
            },
            Engine::Ccm(engine) => match self.direction {
                Direction::Encrypt => engine.encrypt(data_in, data_out),
                Direction::Decrypt => engine.decrypt(data_in, data_out),
                Direction::Both => Err(CryptorError::InvalidParameter(
                    "CCM cryptor cannot have direction Both".into(),
                )),
            },
            _ => Err(CryptorError::NotImplemented(format!(
                "update not supported in {} mode",
                self.mode
            ))),
        }
    }

    /// Single-shot tweaked-block encryption (XTS/CBC).
    ///
    /// `iv` is the full-width tweak (XTS data unit) or chaining IV (CBC)
    /// for this call only. `data_in` must be a non-zero multiple of the
    /// block size; output is written all-or-nothing.
    pub fn encrypt_data_block(
        &mut self,
        iv: &[u8],
        data_in: &[u8],
        data_out: &mut [u8],
    ) -> Result<()> {
        self.check_block_call(iv, data_in, data_out)?;
        if !self.direction.can_encrypt() {
            return Err(CryptorError::InvalidParameter(
                "cryptor direction does not allow encryption".into(),
            ));
        }
        let iv: [u8; BLOCK_SIZE] = iv.try_into().expect("length checked");
        match &self.engine {
            Engine::Xts(engine) => engine.encrypt_data_unit(&iv, data_in, data_out),
            Engine::Cbc(engine) => engine.encrypt_blocks(&iv, data_in, data_out),
            _ => {
                return Err(CryptorError::NotImplemented(format!(
                    "block interface not supported in {} mode",
                    self.mode
                )))
            }
        }
        self.phase = Phase::Processing;
        Ok(())
    }

    /// Single-shot tweaked-block decryption (XTS/CBC).
    pub fn decrypt_data_block(
        &mut self,
        iv: &[u8],
        data_in: &[u8],
        data_out: &mut [u8],
    ) -> Result<()> {
        self.check_block_call(iv, data_in, data_out)?;
        if !self.direction.can_decrypt() {
            return Err(CryptorError::InvalidParameter(
                "cryptor direction does not allow decryption".into(),
            ));
        }
        let iv: [u8; BLOCK_SIZE] = iv.try_into().expect("length checked");
        match &self.engine {
            Engine::Xts(engine) => engine.decrypt_data_unit(&iv, data_in, data_out),
            Engine::Cbc(engine) => engine.decrypt_blocks(&iv, data_in, data_out),
            _ => {
                return Err(CryptorError::NotImplemented(format!(
                    "block interface not supported in {} mode",
                    self.mode
                )))
            }
        }
        self.phase = Phase::Processing;
        Ok(())
    }

    /// Close the authenticated message (GCM/CCM).
    ///
    /// Encrypt direction: computes the tag over all supplied AAD and
    /// processed data and writes exactly `tag.len()` bytes. Decrypt
    /// direction: treats `tag` as the expected tag, compares in constant
    /// time, and reports `AuthenticationFailed` on mismatch without
    /// modifying the buffer. The cryptor is `Finalized` afterwards either
    /// way.
    pub fn finalize(&mut self, tag: &mut [u8]) -> Result<()> {
        if !self.mode.is_aead() {
            return Err(CryptorError::NotImplemented(format!(
                "finalize not supported in {} mode",
                self.mode
            )));
        }
        if self.phase == Phase::Finalized {
            return Err(CryptorError::CallSequence(
                "cryptor already finalized".into(),
            ));
        }

        match &self.engine {
            Engine::Gcm(_) => {
                if tag.is_empty() || tag.len() > GCM_TAG_SIZE {
                    return Err(CryptorError::InvalidParameter(format!(
                        "GCM tag length {} outside 1..={GCM_TAG_SIZE}",
                        tag.len()
                    )));
                }
            }
            Engine::Ccm(engine) => {
                let mac_size = engine.mac_size().ok_or_else(|| {
                    CryptorError::CallSequence("CCM MAC size not set".into())
                })?;
                if tag.len() != mac_size {
                    return Err(CryptorError::InvalidParameter(format!(
                        "CCM tag length {} does not match configured MAC size {mac_size}",
                        tag.len()
                    )));
                }
            }
            _ => {}
        }

        // AAD-only and empty messages finalize without a prior update call
        self.ensure_processing()?;

        let computed = match &mut self.engine {
            Engine::Gcm(engine) => engine.compute_tag()?.to_vec(),
            Engine::Ccm(engine) => engine.compute_tag()?,
            _ => {
                return Err(CryptorError::NotImplemented(format!(
                    "finalize not supported in {} mode",
                    self.mode
                )))
            }
        };

        match self.direction {
            Direction::Encrypt => {
                tag.copy_from_slice(&computed[..tag.len()]);
                self.tag = Some(computed[..tag.len()].to_vec());
                self.phase = Phase::Finalized;
                AuditLogger::log("FINALIZE", Some(self.mode), Some(self.direction), Ok(()));
                Ok(())
            }
            Direction::Decrypt => {
                let authentic = constant_time_eq(tag, &computed[..tag.len()]);
                self.phase = Phase::Finalized;
                if authentic {
                    AuditLogger::log("FINALIZE", Some(self.mode), Some(self.direction), Ok(()));
                    Ok(())
                } else {
                    AuditLogger::log(
                        "FINALIZE",
                        Some(self.mode),
                        Some(self.direction),
                        Err("Authentication failed"),
                    );
                    Err(CryptorError::AuthenticationFailed)
                }
            }
            Direction::Both => Err(CryptorError::InvalidParameter(
                "AEAD cryptor cannot have direction Both".into(),
            )),
        }
    }

    /// Return the cryptor to the state creation left it in (GCM/CCM).
    ///
    /// Clears all per-message accumulation while retaining key material;
    /// IV/AAD may then be re-supplied. Valid from any phase; idempotent.
    pub fn reset(&mut self) -> Result<()> {
        match &mut self.engine {
            Engine::Gcm(engine) => engine.reset(),
            Engine::Ccm(engine) => engine.reset(),
            _ => {
                return Err(CryptorError::NotImplemented(format!(
                    "reset not supported in {} mode",
                    self.mode
                )))
            }
        }
        self.tag = None;
        self.phase = Phase::Initialized;
        AuditLogger::log("RESET", Some(self.mode), Some(self.direction), Ok(()));
        Ok(())
    }

    /// Start the engine on the first data-bearing call.
    fn ensure_processing(&mut self) -> Result<()> {
        if self.phase == Phase::Processing {
            return Ok(());
        }
        match &mut self.engine {
            Engine::Gcm(engine) => {
                if !engine.started() {
                    engine.start()?;
                }
            }
            Engine::Ccm(engine) => {
                if !engine.started() {
                    engine.start()?;
                }
            }
            Engine::Ctr(engine) => engine.start()?,
            _ => {}
        }
        self.phase = Phase::Processing;
        Ok(())
    }

    fn check_block_call(&self, iv: &[u8], data_in: &[u8], data_out: &[u8]) -> Result<()> {
        if !self.mode.is_block_tweaked() {
            return Err(CryptorError::NotImplemented(format!(
                "block interface not supported in {} mode",
                self.mode
            )));
        }
        if self.phase == Phase::Finalized {
            return Err(CryptorError::CallSequence(
                "block operation after finalize".into(),
            ));
        }
        if iv.len() != BLOCK_SIZE {
            return Err(CryptorError::InvalidParameter(format!(
                "IV length {} does not match block size {BLOCK_SIZE}",
                iv.len()
            )));
        }
        if data_in.is_empty() || data_in.len() % BLOCK_SIZE != 0 {
            return Err(CryptorError::InvalidParameter(format!(
                "data length {} is not a non-zero multiple of {BLOCK_SIZE}",
                data_in.len()
            )));
        }
        if data_out.len() != data_in.len() {
            return Err(CryptorError::InvalidParameter(format!(
                "output length {} does not match input length {}",
                data_out.len(),
                data_in.len()
            )));
        }
        Ok(())
    }
}

/// Builder-style construction mirroring the streaming cipher builder.
pub struct CryptorBuilder {
    mode: Mode,
    direction: Direction,
}

impl CryptorBuilder {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            direction: Direction::Encrypt,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn build(self, key: &[u8]) -> Result<Cryptor> {
        Cryptor::new(self.mode, self.direction, key)
    }
}

fn require_payload(data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(CryptorError::InvalidParameter(
            "empty parameter payload".into(),
        ));
    }
    Ok(())
}
