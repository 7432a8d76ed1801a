//! Insecure test capability
//!
//! `ClearCapability` "encrypts" by copying, so protocol logic (selectors,
//! shard layout, decoding) can be tested in milliseconds. Like SEAL, it
//! refuses to multiply by an all-zero plaintext, which is how tests observe
//! that the server never produces a transparent ciphertext.
//!
//! Only compiled for tests or with the `test-utils` feature.

use crate::{CryptoCapability, Error, Result};

/// Identity "encryption" over `slot_count` slots modulo `plaintext_modulus`
#[derive(Debug, Clone)]
pub struct ClearCapability {
    slot_count: usize,
    plaintext_modulus: u64,
}

impl ClearCapability {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            plaintext_modulus: 65537,
        }
    }
}

impl CryptoCapability for ClearCapability {
    type PublicKey = ();
    type SecretKey = ();
    type Plaintext = Vec<u64>;
    type Ciphertext = Vec<u64>;

    fn slot_count(&self) -> usize {
        self.slot_count
    }

    fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    fn generate_key_pair(&self) -> Result<((), ())> {
        Ok(((), ()))
    }

    fn encode_vector(&self, values: &[u64]) -> Result<Vec<u64>> {
        if values.len() > self.slot_count {
            return Err(Error::Encode(format!(
                "vector of {} values exceeds {} slots",
                values.len(),
                self.slot_count
            )));
        }
        let mut slots = vec![0u64; self.slot_count];
        for (slot, value) in slots.iter_mut().zip(values) {
            *slot = value % self.plaintext_modulus;
        }
        Ok(slots)
    }

    fn decode_vector(&self, plaintext: &Vec<u64>) -> Result<Vec<u64>> {
        Ok(plaintext.clone())
    }

    fn encrypt(&self, plaintext: &Vec<u64>, _public_key: &()) -> Result<Vec<u64>> {
        Ok(plaintext.clone())
    }

    fn decrypt(&self, ciphertext: &Vec<u64>, _secret_key: &()) -> Result<Vec<u64>> {
        Ok(ciphertext.clone())
    }

    fn multiply_plain(&self, ciphertext: &Vec<u64>, plaintext: &Vec<u64>) -> Result<Vec<u64>> {
        if plaintext.iter().all(|v| *v == 0) {
            return Err(Error::Crypto(
                "multiplication by an all-zero plaintext yields a transparent ciphertext".into(),
            ));
        }
        Ok(ciphertext
            .iter()
            .zip(plaintext)
            .map(|(c, p)| (c * p) % self.plaintext_modulus)
            .collect())
    }

    fn serialize(&self, ciphertext: &Vec<u64>) -> Vec<u8> {
        ciphertext.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<u64>> {
        if bytes.len() != self.slot_count * 8 {
            return Err(Error::Decode(format!(
                "ciphertext: expected {} bytes, got {}",
                self.slot_count * 8,
                bytes.len()
            )));
        }
        Ok(bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut word = [0u8; 8];
                word.copy_from_slice(chunk);
                u64::from_le_bytes(word)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_transparent_product() {
        let cap = ClearCapability::new(8);
        let ct = cap.encrypt(&cap.encode_vector(&[1]).unwrap(), &()).unwrap();
        let zero = cap.encode_vector(&[]).unwrap();
        assert!(matches!(cap.multiply_plain(&ct, &zero), Err(Error::Crypto(_))));
    }

    #[test]
    fn test_serialized_width_checked() {
        let cap = ClearCapability::new(8);
        let bytes = cap.serialize(&vec![0u64; 8]);
        assert_eq!(bytes.len(), 64);
        assert!(cap.deserialize(&bytes).is_ok());
        assert!(matches!(cap.deserialize(&bytes[1..]), Err(Error::Decode(_))));
    }
}
