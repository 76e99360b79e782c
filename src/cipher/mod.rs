use aes::cipher::InvalidLength;
use aes::cipher::block_padding::UnpadError;
use thiserror::Error;

mod pbe;
pub use pbe::*;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Encrypted payload was not valid base64")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("Encrypted payload was malformed ({0} bytes)")]
    MalformedPayload(usize),
    #[error("Invalid key or IV length for the cipher")]
    InvalidKeyOrIvLength(InvalidLength),
    #[error("Invalid padding while decrypting")]
    InvalidPadding(UnpadError),
    #[error("Decrypted value was not valid UTF-8")]
    InvalidPlaintextEncoding(#[from] std::str::Utf8Error),
    #[error("Value is not a decorated password token")]
    NotDecorated,
}

/// Wraps a bare base64 payload in the `{` `}` decoration that marks a
/// value as encrypted in Maven settings files.
pub fn decorate(payload: &str) -> String {
    format!("{{{payload}}}")
}

/// Returns true when `value` contains a decorated token. Text around the
/// token is allowed; braces escaped with `\` do not count.
pub fn is_encrypted(value: &str) -> bool {
    find_token(value).is_some()
}

/// Extracts the payload of the first decorated token in `value`.
pub fn un_decorate(value: &str) -> Result<&str, CipherError> {
    find_token(value)
        .map(|(start, end)| &value[start..end])
        .ok_or(CipherError::NotDecorated)
}

pub fn encrypt_and_decorate(clear_text: &str, password: &str) -> Result<String, CipherError> {
    Ok(decorate(&encrypt64(clear_text, password)?))
}

/// Decrypts a possibly decorated value. A value without any decoration
/// is treated as a bare base64 payload.
pub fn decrypt_decorated(value: &str, password: &str) -> Result<String, CipherError> {
    match find_token(value) {
        Some((start, end)) => decrypt64(&value[start..end], password),
        None => decrypt64(value, password),
    }
}

// The token span is the first non-empty brace-wrapped run whose braces
// are not escaped with a backslash. Empty braces are skipped.
fn find_token(value: &str) -> Option<(usize, usize)> {
    let bytes = value.as_bytes();
    let escaped = |i: usize| i > 0 && bytes[i - 1] == b'\\';

    let mut from = 0;
    while let Some(open) = (from..bytes.len()).find(|&i| bytes[i] == b'{' && !escaped(i)) {
        let close = (open + 1..bytes.len()).find(|&i| bytes[i] == b'}' && !escaped(i))?;
        if close > open + 1 {
            return Some((open + 1, close));
        }
        from = close + 1;
    }
    None
}
