// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Cryptor protocol tests: phase state machine, parameter dispatch, and
//! the per-mode operation surface.

use authcryptor::{Cryptor, CryptorError, Direction, Mode, Parameter, ParameterKind, Phase};

const KEY16: [u8; 16] = [0x2au8; 16];
const KEY32: [u8; 32] = [0x4cu8; 32];
const KEY64: [u8; 64] = [0x77u8; 64];

fn gcm_encryptor() -> Cryptor {
    Cryptor::new(Mode::Gcm, Direction::Encrypt, &KEY32).unwrap()
}

#[test]
fn test_gcm_roundtrip_through_public_api() {
    let iv = [0x09u8; 12];
    let aad = b"header";
    let plaintext = b"payload123456789";

    let mut enc = gcm_encryptor();
    enc.add_parameter(Parameter::Iv(&iv)).unwrap();
    enc.add_parameter(Parameter::AuthData(aad)).unwrap();
    let mut ciphertext = [0u8; 16];
    enc.update(plaintext, &mut ciphertext).unwrap();
    let mut tag = [0u8; 16];
    enc.finalize(&mut tag).unwrap();
    assert_eq!(enc.phase(), Phase::Finalized);

    let mut dec = Cryptor::new(Mode::Gcm, Direction::Decrypt, &KEY32).unwrap();
    dec.add_parameter(Parameter::Iv(&iv)).unwrap();
    dec.add_parameter(Parameter::AuthData(aad)).unwrap();
    let mut recovered = [0u8; 16];
    dec.update(&ciphertext, &mut recovered).unwrap();
    dec.finalize(&mut tag).unwrap();
    assert_eq!(&recovered, plaintext);
}

#[test]
fn test_gcm_truncated_tag_roundtrip() {
    let iv = [0x01u8; 12];
    let plaintext = [0x5au8; 48];

    let mut enc = gcm_encryptor();
    enc.add_parameter(Parameter::Iv(&iv)).unwrap();
    let mut ciphertext = [0u8; 48];
    enc.update(&plaintext, &mut ciphertext).unwrap();
    let mut tag = [0u8; 12];
    enc.finalize(&mut tag).unwrap();

    let mut dec = Cryptor::new(Mode::Gcm, Direction::Decrypt, &KEY32).unwrap();
    dec.add_parameter(Parameter::Iv(&iv)).unwrap();
    let mut recovered = [0u8; 48];
    dec.update(&ciphertext, &mut recovered).unwrap();
    dec.finalize(&mut tag).unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn test_two_identical_cryptors_agree() {
    let run = || {
        let mut enc = gcm_encryptor();
        enc.add_parameter(Parameter::Iv(&[7u8; 12])).unwrap();
        enc.add_parameter(Parameter::AuthData(b"hdr")).unwrap();
        let mut ct = [0u8; 32];
        enc.update(&[0x11u8; 32], &mut ct).unwrap();
        let mut tag = [0u8; 16];
        enc.finalize(&mut tag).unwrap();
        (ct, tag)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_aad_after_data_is_call_sequence_error() {
    let mut enc = gcm_encryptor();
    enc.add_parameter(Parameter::Iv(&[0u8; 12])).unwrap();
    let mut out = [0u8; 16];
    enc.update(&[0u8; 16], &mut out).unwrap();

    assert!(matches!(
        enc.add_parameter(Parameter::AuthData(b"late")),
        Err(CryptorError::CallSequence(_))
    ));
    assert!(matches!(
        enc.add_parameter(Parameter::Iv(&[0u8; 12])),
        Err(CryptorError::CallSequence(_))
    ));
}

#[test]
fn test_update_after_finalize_is_call_sequence_error() {
    let mut enc = gcm_encryptor();
    enc.add_parameter(Parameter::Iv(&[0u8; 12])).unwrap();
    let mut tag = [0u8; 16];
    enc.finalize(&mut tag).unwrap();

    let mut out = [0u8; 16];
    assert!(matches!(
        enc.update(&[0u8; 16], &mut out),
        Err(CryptorError::CallSequence(_))
    ));
    assert!(matches!(
        enc.finalize(&mut tag),
        Err(CryptorError::CallSequence(_))
    ));
}

#[test]
fn test_unsupported_parameter_is_state_preserving_noop() {
    let mut ctr = Cryptor::new(Mode::Ctr, Direction::Both, &KEY16).unwrap();
    assert!(matches!(
        ctr.add_parameter(Parameter::AuthData(b"aad")),
        Err(CryptorError::NotImplemented(_))
    ));
    assert!(matches!(
        ctr.add_parameter(Parameter::MacSize(8)),
        Err(CryptorError::NotImplemented(_))
    ));
    assert_eq!(ctr.phase(), Phase::Initialized);

    // the cryptor still works normally afterwards
    ctr.add_parameter(Parameter::Iv(&[0u8; 16])).unwrap();
    let mut out = [0u8; 4];
    ctr.update(b"abcd", &mut out).unwrap();
}

#[test]
fn test_gcm_rejects_mac_and_data_size() {
    let mut enc = gcm_encryptor();
    assert!(matches!(
        enc.add_parameter(Parameter::MacSize(16)),
        Err(CryptorError::NotImplemented(_))
    ));
    assert!(matches!(
        enc.add_parameter(Parameter::DataSize(16)),
        Err(CryptorError::NotImplemented(_))
    ));
}

#[test]
fn test_empty_parameter_payload_is_param_error() {
    let mut enc = gcm_encryptor();
    assert!(matches!(
        enc.add_parameter(Parameter::Iv(&[])),
        Err(CryptorError::InvalidParameter(_))
    ));
    assert!(matches!(
        enc.add_parameter(Parameter::AuthData(&[])),
        Err(CryptorError::InvalidParameter(_))
    ));
}

#[test]
fn test_auth_tag_retrieval_contract() {
    let mut enc = gcm_encryptor();
    enc.add_parameter(Parameter::Iv(&[3u8; 12])).unwrap();

    // not retrievable before finalize
    let mut buf = [0u8; 16];
    assert!(matches!(
        enc.get_parameter(ParameterKind::AuthTag, &mut buf),
        Err(CryptorError::NotImplemented(_))
    ));

    let mut ct = [0u8; 16];
    enc.update(&[0xabu8; 16], &mut ct).unwrap();
    let mut tag = [0u8; 16];
    enc.finalize(&mut tag).unwrap();

    // too-small buffer: required size reported, buffer untouched
    let mut small = [0xeeu8; 8];
    match enc.get_parameter(ParameterKind::AuthTag, &mut small) {
        Err(CryptorError::BufferTooSmall { required }) => assert_eq!(required, 16),
        other => panic!("expected BufferTooSmall, got {other:?}"),
    }
    assert_eq!(small, [0xeeu8; 8]);

    let mut full = [0u8; 16];
    let written = enc.get_parameter(ParameterKind::AuthTag, &mut full).unwrap();
    assert_eq!(written, 16);
    assert_eq!(full, tag);
}

#[test]
fn test_auth_tag_not_retrievable_on_decrypt() {
    let (ciphertext, tag) = {
        let mut enc = gcm_encryptor();
        enc.add_parameter(Parameter::Iv(&[5u8; 12])).unwrap();
        let mut ct = [0u8; 16];
        enc.update(&[1u8; 16], &mut ct).unwrap();
        let mut tag = [0u8; 16];
        enc.finalize(&mut tag).unwrap();
        (ct, tag)
    };

    let mut dec = Cryptor::new(Mode::Gcm, Direction::Decrypt, &KEY32).unwrap();
    dec.add_parameter(Parameter::Iv(&[5u8; 12])).unwrap();
    let mut pt = [0u8; 16];
    dec.update(&ciphertext, &mut pt).unwrap();
    let mut expected = tag;
    dec.finalize(&mut expected).unwrap();

    let mut buf = [0u8; 16];
    assert!(matches!(
        dec.get_parameter(ParameterKind::AuthTag, &mut buf),
        Err(CryptorError::NotImplemented(_))
    ));
}

#[test]
fn test_input_only_parameters_not_retrievable() {
    let enc = gcm_encryptor();
    let mut buf = [0u8; 16];
    for kind in [
        ParameterKind::Iv,
        ParameterKind::AuthData,
        ParameterKind::MacSize,
        ParameterKind::DataSize,
    ] {
        assert!(matches!(
            enc.get_parameter(kind, &mut buf),
            Err(CryptorError::NotImplemented(_))
        ));
    }
}

#[test]
fn test_gcm_invalid_tag_lengths() {
    let mut enc = gcm_encryptor();
    enc.add_parameter(Parameter::Iv(&[0u8; 12])).unwrap();
    let mut none = [0u8; 0];
    assert!(matches!(
        enc.finalize(&mut none),
        Err(CryptorError::InvalidParameter(_))
    ));
    let mut long = [0u8; 17];
    assert!(matches!(
        enc.finalize(&mut long),
        Err(CryptorError::InvalidParameter(_))
    ));
    // the failed attempts must not finalize the message
    let mut tag = [0u8; 16];
    enc.finalize(&mut tag).unwrap();
}

#[test]
fn test_gcm_finalize_without_iv_is_call_sequence_error() {
    let mut enc = gcm_encryptor();
    let mut tag = [0u8; 16];
    assert!(matches!(
        enc.finalize(&mut tag),
        Err(CryptorError::CallSequence(_))
    ));
}

#[test]
fn test_reset_reproduces_identical_tag() {
    let mut enc = gcm_encryptor();
    let mut first_tag = [0u8; 16];
    let mut ct = [0u8; 24];
    enc.add_parameter(Parameter::Iv(&[9u8; 12])).unwrap();
    enc.add_parameter(Parameter::AuthData(b"aad")).unwrap();
    enc.update(&[0x42u8; 24], &mut ct).unwrap();
    enc.finalize(&mut first_tag).unwrap();

    enc.reset().unwrap();
    assert_eq!(enc.phase(), Phase::Initialized);

    let mut second_tag = [0u8; 16];
    let mut ct2 = [0u8; 24];
    enc.add_parameter(Parameter::Iv(&[9u8; 12])).unwrap();
    enc.add_parameter(Parameter::AuthData(b"aad")).unwrap();
    enc.update(&[0x42u8; 24], &mut ct2).unwrap();
    enc.finalize(&mut second_tag).unwrap();

    assert_eq!(ct, ct2);
    assert_eq!(first_tag, second_tag);
}

#[test]
fn test_reset_is_idempotent_and_valid_from_any_phase() {
    let mut enc = gcm_encryptor();
    enc.reset().unwrap();
    enc.reset().unwrap();

    enc.add_parameter(Parameter::Iv(&[1u8; 12])).unwrap();
    enc.reset().unwrap();
    assert_eq!(enc.phase(), Phase::Initialized);

    // previously accumulated IV must be gone after reset
    let mut tag = [0u8; 16];
    assert!(matches!(
        enc.finalize(&mut tag),
        Err(CryptorError::CallSequence(_))
    ));
}

#[test]
fn test_reset_not_supported_outside_aead() {
    for (mode, key) in [
        (Mode::Cbc, &KEY16[..]),
        (Mode::Ctr, &KEY16[..]),
        (Mode::Xts, &KEY32[..]),
    ] {
        let mut cryptor = Cryptor::new(mode, Direction::Encrypt, key).unwrap();
        assert!(matches!(
            cryptor.reset(),
            Err(CryptorError::NotImplemented(_))
        ));
    }
}

#[test]
fn test_block_interface_rejected_for_streaming_modes() {
    let mut enc = gcm_encryptor();
    let mut out = [0u8; 16];
    assert!(matches!(
        enc.encrypt_data_block(&[0u8; 16], &[0u8; 16], &mut out),
        Err(CryptorError::NotImplemented(_))
    ));
}

#[test]
fn test_update_rejected_for_block_modes() {
    let mut xts = Cryptor::new(Mode::Xts, Direction::Encrypt, &KEY64).unwrap();
    let mut out = [0u8; 16];
    assert!(matches!(
        xts.update(&[0u8; 16], &mut out),
        Err(CryptorError::NotImplemented(_))
    ));

    let mut tag = [0u8; 16];
    assert!(matches!(
        xts.finalize(&mut tag),
        Err(CryptorError::NotImplemented(_))
    ));
}

#[test]
fn test_block_call_validation() {
    let mut xts = Cryptor::new(Mode::Xts, Direction::Encrypt, &KEY64).unwrap();
    let mut out = [0u8; 16];

    // wrong IV width
    assert!(matches!(
        xts.encrypt_data_block(&[0u8; 12], &[0u8; 16], &mut out),
        Err(CryptorError::InvalidParameter(_))
    ));
    // zero-length data
    assert!(matches!(
        xts.encrypt_data_block(&[0u8; 16], &[], &mut []),
        Err(CryptorError::InvalidParameter(_))
    ));
    // unaligned data
    let mut out24 = [0u8; 24];
    assert!(matches!(
        xts.encrypt_data_block(&[0u8; 16], &[0u8; 24], &mut out24),
        Err(CryptorError::InvalidParameter(_))
    ));
    // output length mismatch
    let mut short = [0u8; 8];
    assert!(matches!(
        xts.encrypt_data_block(&[0u8; 16], &[0u8; 16], &mut short),
        Err(CryptorError::InvalidParameter(_))
    ));
}

#[test]
fn test_block_call_direction_enforcement() {
    let mut enc = Cryptor::new(Mode::Xts, Direction::Encrypt, &KEY64).unwrap();
    let mut out = [0u8; 16];
    assert!(matches!(
        enc.decrypt_data_block(&[0u8; 16], &[0u8; 16], &mut out),
        Err(CryptorError::InvalidParameter(_))
    ));

    let mut dec = Cryptor::new(Mode::Xts, Direction::Decrypt, &KEY64).unwrap();
    assert!(matches!(
        dec.encrypt_data_block(&[0u8; 16], &[0u8; 16], &mut out),
        Err(CryptorError::InvalidParameter(_))
    ));
}

#[test]
fn test_xts_roundtrip_through_public_api() {
    let tweak = [0x0fu8; 16];
    let plaintext = [0x33u8; 64];

    let mut enc = Cryptor::new(Mode::Xts, Direction::Encrypt, &KEY64).unwrap();
    let mut ciphertext = [0u8; 64];
    enc.encrypt_data_block(&tweak, &plaintext, &mut ciphertext)
        .unwrap();
    assert_eq!(enc.phase(), Phase::Processing);

    let mut dec = Cryptor::new(Mode::Xts, Direction::Decrypt, &KEY64).unwrap();
    let mut recovered = [0u8; 64];
    dec.decrypt_data_block(&tweak, &ciphertext, &mut recovered)
        .unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn test_cbc_roundtrip_through_public_api() {
    let iv = [0xa0u8; 16];
    let plaintext = [0x55u8; 32];

    let mut enc = Cryptor::new(Mode::Cbc, Direction::Encrypt, &KEY16).unwrap();
    let mut ciphertext = [0u8; 32];
    enc.encrypt_data_block(&iv, &plaintext, &mut ciphertext)
        .unwrap();

    let mut dec = Cryptor::new(Mode::Cbc, Direction::Decrypt, &KEY16).unwrap();
    let mut recovered = [0u8; 32];
    dec.decrypt_data_block(&iv, &ciphertext, &mut recovered)
        .unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn test_ctr_both_direction_roundtrip() {
    let mut forward = Cryptor::new(Mode::Ctr, Direction::Both, &KEY32).unwrap();
    forward.add_parameter(Parameter::Iv(&[0x61u8; 16])).unwrap();
    let plaintext = b"stream mode is its own inverse";
    let mut ciphertext = vec![0u8; plaintext.len()];
    forward.update(plaintext, &mut ciphertext).unwrap();

    let mut backward = Cryptor::new(Mode::Ctr, Direction::Both, &KEY32).unwrap();
    backward
        .add_parameter(Parameter::Iv(&[0x61u8; 16]))
        .unwrap();
    let mut recovered = vec![0u8; plaintext.len()];
    backward.update(&ciphertext, &mut recovered).unwrap();
    assert_eq!(recovered, plaintext.to_vec());
}

#[test]
fn test_ctr_counter_block_must_be_full_width() {
    let mut ctr = Cryptor::new(Mode::Ctr, Direction::Both, &KEY16).unwrap();
    ctr.add_parameter(Parameter::Iv(&[0u8; 8])).unwrap();
    let mut out = [0u8; 4];
    assert!(matches!(
        ctr.update(b"abcd", &mut out),
        Err(CryptorError::CallSequence(_))
    ));

    // over-long accumulation is rejected at the parameter call
    let mut ctr = Cryptor::new(Mode::Ctr, Direction::Both, &KEY16).unwrap();
    ctr.add_parameter(Parameter::Iv(&[0u8; 16])).unwrap();
    assert!(matches!(
        ctr.add_parameter(Parameter::Iv(&[0u8; 1])),
        Err(CryptorError::InvalidParameter(_))
    ));
}

#[test]
fn test_ccm_requires_size_hints_before_data() {
    let mut enc = Cryptor::new(Mode::Ccm, Direction::Encrypt, &KEY16).unwrap();
    enc.add_parameter(Parameter::Iv(&[0u8; 13])).unwrap();
    let mut out = [0u8; 4];
    assert!(matches!(
        enc.update(&[0u8; 4], &mut out),
        Err(CryptorError::CallSequence(_))
    ));
}

#[test]
fn test_ccm_roundtrip_through_public_api() {
    let nonce = [0x21u8; 13];
    let aad = b"associated";
    let plaintext = b"ccm payload bytes";

    let mut enc = Cryptor::new(Mode::Ccm, Direction::Encrypt, &KEY16).unwrap();
    enc.add_parameter(Parameter::Iv(&nonce)).unwrap();
    enc.add_parameter(Parameter::AuthData(aad)).unwrap();
    enc.add_parameter(Parameter::MacSize(10)).unwrap();
    enc.add_parameter(Parameter::DataSize(plaintext.len()))
        .unwrap();
    let mut ciphertext = vec![0u8; plaintext.len()];
    enc.update(plaintext, &mut ciphertext).unwrap();
    let mut tag = [0u8; 10];
    enc.finalize(&mut tag).unwrap();

    let mut dec = Cryptor::new(Mode::Ccm, Direction::Decrypt, &KEY16).unwrap();
    dec.add_parameter(Parameter::Iv(&nonce)).unwrap();
    dec.add_parameter(Parameter::AuthData(aad)).unwrap();
    dec.add_parameter(Parameter::MacSize(10)).unwrap();
    dec.add_parameter(Parameter::DataSize(plaintext.len()))
        .unwrap();
    let mut recovered = vec![0u8; plaintext.len()];
    dec.update(&ciphertext, &mut recovered).unwrap();
    dec.finalize(&mut tag).unwrap();
    assert_eq!(recovered, plaintext.to_vec());
}

#[test]
fn test_ccm_tag_length_must_match_mac_size() {
    let mut enc = Cryptor::new(Mode::Ccm, Direction::Encrypt, &KEY16).unwrap();
    enc.add_parameter(Parameter::Iv(&[0u8; 13])).unwrap();
    enc.add_parameter(Parameter::MacSize(8)).unwrap();
    enc.add_parameter(Parameter::DataSize(0)).unwrap();
    let mut wrong = [0u8; 12];
    assert!(matches!(
        enc.finalize(&mut wrong),
        Err(CryptorError::InvalidParameter(_))
    ));
    let mut tag = [0u8; 8];
    enc.finalize(&mut tag).unwrap();
}

#[test]
fn test_key_length_validation() {
    assert!(matches!(
        Cryptor::new(Mode::Gcm, Direction::Encrypt, &[0u8; 15]),
        Err(CryptorError::InvalidKeyLength(15))
    ));
    assert!(matches!(
        Cryptor::new(Mode::Xts, Direction::Encrypt, &[0u8; 16]),
        Err(CryptorError::InvalidKeyLength(16))
    ));
    assert!(Cryptor::new(Mode::Gcm, Direction::Encrypt, &[0u8; 24]).is_ok());
    assert!(Cryptor::new(Mode::Xts, Direction::Encrypt, &[0u8; 64]).is_ok());
}

#[test]
fn test_update_length_mismatch() {
    let mut enc = gcm_encryptor();
    enc.add_parameter(Parameter::Iv(&[0u8; 12])).unwrap();
    let mut out = [0u8; 8];
    assert!(matches!(
        enc.update(&[0u8; 16], &mut out),
        Err(CryptorError::InvalidParameter(_))
    ));
}

#[test]
fn test_gcm_aad_only_message() {
    let run = || {
        let mut enc = gcm_encryptor();
        enc.add_parameter(Parameter::Iv(&[2u8; 12])).unwrap();
        enc.add_parameter(Parameter::AuthData(b"only aad")).unwrap();
        let mut tag = [0u8; 16];
        enc.finalize(&mut tag).unwrap();
        tag
    };
    let tag = run();
    assert_eq!(tag, run());

    let mut dec = Cryptor::new(Mode::Gcm, Direction::Decrypt, &KEY32).unwrap();
    dec.add_parameter(Parameter::Iv(&[2u8; 12])).unwrap();
    dec.add_parameter(Parameter::AuthData(b"only aad")).unwrap();
    let mut expected = tag;
    dec.finalize(&mut expected).unwrap();
}
