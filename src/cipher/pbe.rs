//! Password-based cipher compatible with Maven's encrypted passwords.
//!
//! The base64 payload is `salt[8] | pad_len[1] | ciphertext | filler`,
//! where `pad_len` counts the random filler bytes appended after the
//! ciphertext and the total length is a multiple of the AES block size.
//! The AES-128 key and the IV are the two halves of a single SHA-256
//! digest over the password bytes followed by the salt.

use aes::Aes128;
use aes::cipher::block_padding::Pkcs7;
use base64::prelude::*;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::CipherError;

const SALT_SIZE: usize = 8;
const BLOCK_SIZE: usize = 16;
const KEY_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

fn derive_key_iv(password: &str, salt: &[u8]) -> Zeroizing<[u8; 2 * KEY_SIZE]> {
    let mut digest = Sha256::new();
    digest.update(password.as_bytes());
    digest.update(salt);
    Zeroizing::new(digest.finalize().into())
}

/// Encrypts `clear_text` with `password` and returns the bare base64
/// payload, without the `{` `}` decoration.
pub fn encrypt64(clear_text: &str, password: &str) -> Result<String, CipherError> {
    let salt: [u8; SALT_SIZE] = rand::random();

    let key_iv = derive_key_iv(password, &salt);
    let (key, iv) = key_iv.split_at(KEY_SIZE);

    let aes = Aes128CbcEnc::new_from_slices(key, iv).map_err(CipherError::InvalidKeyOrIvLength)?;
    let ct = aes.encrypt_padded_vec_mut::<Pkcs7>(clear_text.as_bytes());

    let pad_len = BLOCK_SIZE - (SALT_SIZE + ct.len() + 1) % BLOCK_SIZE;
    let mut payload = Vec::with_capacity(SALT_SIZE + 1 + ct.len() + pad_len);
    payload.extend_from_slice(&salt);
    payload.push(pad_len as u8);
    payload.extend_from_slice(&ct);

    let mut filler = vec![0u8; pad_len];
    rand::thread_rng().fill_bytes(&mut filler);
    payload.extend_from_slice(&filler);

    Ok(BASE64_STANDARD.encode(payload))
}

/// Decrypts a bare base64 payload produced by [`encrypt64`] or by
/// Maven's password encryption tooling.
pub fn decrypt64(encrypted_text: &str, password: &str) -> Result<String, CipherError> {
    // Tokens copied out of XML files may carry embedded line breaks;
    // Maven's own tooling accepts those.
    let compact: String = encrypted_text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let payload = BASE64_STANDARD.decode(compact)?;

    if payload.len() < SALT_SIZE + 1 {
        return Err(CipherError::MalformedPayload(payload.len()));
    }
    let (salt, rest) = payload.split_at(SALT_SIZE);
    let pad_len = rest[0] as usize;
    let ct_len = rest
        .len()
        .checked_sub(1 + pad_len)
        .ok_or(CipherError::MalformedPayload(payload.len()))?;
    let ct = &rest[1..1 + ct_len];

    let key_iv = derive_key_iv(password, salt);
    let (key, iv) = key_iv.split_at(KEY_SIZE);

    let aes = Aes128CbcDec::new_from_slices(key, iv).map_err(CipherError::InvalidKeyOrIvLength)?;
    let clear = Zeroizing::new(
        aes.decrypt_padded_vec_mut::<Pkcs7>(ct)
            .map_err(CipherError::InvalidPadding)?,
    );

    let clear_text = std::str::from_utf8(&clear)?;
    Ok(clear_text.to_owned())
}
