//! Field-encryption seam.
//!
//! The production cipher is an external collaborator; services only depend
//! on [`FieldCipher`]. [`XorCipher`] is the development implementation:
//! reversible and deterministic, but NOT cryptographically secure.

use anyhow::{anyhow, Result};

pub trait FieldCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> String;

    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// Keyed XOR over the plaintext bytes, hex-encoded.
pub struct XorCipher {
    key: Vec<u8>,
}

impl XorCipher {
    pub fn new(key: &str) -> Self {
        assert!(!key.is_empty(), "cipher key must not be empty");
        XorCipher {
            key: key.as_bytes().to_vec(),
        }
    }

    fn xor(&self, bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key_byte)| byte ^ key_byte)
            .collect()
    }
}

impl FieldCipher for XorCipher {
    fn encrypt(&self, plaintext: &str) -> String {
        hex::encode(self.xor(plaintext.as_bytes()))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let bytes = hex::decode(ciphertext)?;
        String::from_utf8(self.xor(&bytes)).map_err(|_| anyhow!("ciphertext is not valid utf-8"))
    }
}
