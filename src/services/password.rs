//! Credential hashing.
//!
//! Passwords are stored as `salt.hex(key)`: a 16-hex-char random salt and a
//! 32-byte scrypt-derived key. Verification re-derives the key and compares
//! it in constant time.

use anyhow::{Context, Result, anyhow};
use rand::Rng;
use subtle::ConstantTimeEq;

const SALT_BYTES: usize = 8;
const KEY_BYTES: usize = 32;

// N=2^14, r=8, p=1
fn kdf_params() -> Result<scrypt::Params> {
    scrypt::Params::new(14, 8, 1, KEY_BYTES).map_err(|e| anyhow!("Invalid scrypt params: {e}"))
}

fn derive_key(password: &str, salt: &str) -> Result<[u8; KEY_BYTES]> {
    let mut key = [0u8; KEY_BYTES];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &kdf_params()?, &mut key)
        .map_err(|e| anyhow!("Key derivation failed: {e}"))?;
    Ok(key)
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt_bytes: [u8; SALT_BYTES] = rand::rng().random();
    let salt = hex::encode(salt_bytes);

    let key = derive_key(password, &salt)?;
    Ok(format!("{salt}.{}", hex::encode(key)))
}

/// Check a candidate password against a stored `salt.hex(key)` value.
///
/// A stored value without the separator or with undecodable hex is a
/// programming error, not a failed login, and surfaces as `Err`.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let (salt, expected_hex) = stored
        .split_once('.')
        .ok_or_else(|| anyhow!("Stored password is missing the salt separator"))?;

    let expected = hex::decode(expected_hex).context("Stored password hash is not valid hex")?;
    let derived = derive_key(password, salt)?;

    Ok(derived.as_slice().ct_eq(&expected).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &stored).unwrap());
        assert!(!verify_password("hunter3", &stored).unwrap());
    }

    #[test]
    fn test_salts_are_random() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a).unwrap());
        assert!(verify_password("same-password", &b).unwrap());
    }

    #[test]
    fn test_stored_format() {
        let stored = hash_password("pw").unwrap();
        let (salt, hash) = stored.split_once('.').unwrap();
        assert_eq!(salt.len(), 16);
        assert_eq!(hash.len(), 64);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_malformed_stored_value_fails_loudly() {
        assert!(verify_password("pw", "no-separator-here").is_err());
        assert!(verify_password("pw", "abcd1234abcd1234.not-hex!").is_err());
    }
}
