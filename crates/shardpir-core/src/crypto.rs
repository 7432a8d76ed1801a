//! Crypto capability: the homomorphic primitives the protocol consumes
//!
//! The protocol only ever needs batched (slot-wise) vectors, public-key
//! encryption, and ciphertext x plaintext multiplication. Everything about
//! the scheme itself (noise, moduli, NTTs) stays behind this trait.

use std::sync::Arc;

use fhe::bfv::{
    BfvParameters, BfvParametersBuilder, Ciphertext, Encoding, Plaintext, PublicKey, SecretKey,
};
use fhe_traits::{
    DeserializeParametrized, FheDecoder, FheDecrypter, FheEncoder, FheEncrypter, Serialize as _,
};

use crate::{CryptoParams, Error, Result};

/// Homomorphic primitives over fixed-width vectors of integers
///
/// Implementations must be deterministic in their slot layout: slot `i` of
/// an encoded vector is slot `i` of the decoded one, and `multiply_plain`
/// acts slot by slot.
pub trait CryptoCapability {
    type PublicKey;
    type SecretKey;
    type Plaintext;
    type Ciphertext;

    /// Number of slots in one vector
    fn slot_count(&self) -> usize;

    /// Largest value a slot can carry plus one
    fn plaintext_modulus(&self) -> u64;

    fn generate_key_pair(&self) -> Result<(Self::PublicKey, Self::SecretKey)>;

    /// Batch-encode `values` (at most `slot_count`, zero-padded)
    fn encode_vector(&self, values: &[u64]) -> Result<Self::Plaintext>;

    /// Decode all `slot_count` slots
    fn decode_vector(&self, plaintext: &Self::Plaintext) -> Result<Vec<u64>>;

    fn encrypt(&self, plaintext: &Self::Plaintext, public_key: &Self::PublicKey) -> Result<Self::Ciphertext>;

    fn decrypt(&self, ciphertext: &Self::Ciphertext, secret_key: &Self::SecretKey) -> Result<Self::Plaintext>;

    /// Slot-wise product of an encrypted vector and a plaintext vector
    fn multiply_plain(&self, ciphertext: &Self::Ciphertext, plaintext: &Self::Plaintext) -> Result<Self::Ciphertext>;

    fn serialize(&self, ciphertext: &Self::Ciphertext) -> Vec<u8>;

    /// Parse a ciphertext against this context; malformed bytes are a `Decode` error
    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Ciphertext>;
}

/// BFV capability backed by `fhe`
///
/// Holds the shared context. Client and server each build one from the same
/// `CryptoParams`; only the client ever generates keys.
#[derive(Clone)]
pub struct BfvCapability {
    params: Arc<BfvParameters>,
}

impl BfvCapability {
    /// Build the context, validating parameters first
    ///
    /// Callers treat a failure here as fatal: the process must not serve or
    /// issue queries with inconsistent parameters.
    pub fn new(params: &CryptoParams) -> Result<Self> {
        params.validate()?;

        let bfv = BfvParametersBuilder::new()
            .set_degree(params.degree)
            .set_plaintext_modulus(params.plaintext_modulus)
            .set_moduli_sizes(&params.moduli_sizes)
            .build()
            .map_err(|e| Error::InvalidParams(e.to_string()))?;

        tracing::debug!(
            degree = params.degree,
            plaintext_modulus = params.plaintext_modulus,
            moduli = ?params.moduli_sizes,
            "BFV context ready"
        );

        Ok(Self {
            params: Arc::new(bfv),
        })
    }
}

impl CryptoCapability for BfvCapability {
    type PublicKey = PublicKey;
    type SecretKey = SecretKey;
    type Plaintext = Plaintext;
    type Ciphertext = Ciphertext;

    fn slot_count(&self) -> usize {
        self.params.degree()
    }

    fn plaintext_modulus(&self) -> u64 {
        self.params.plaintext()
    }

    fn generate_key_pair(&self) -> Result<(PublicKey, SecretKey)> {
        let mut rng = rand::rng();
        let secret_key = SecretKey::random(&self.params, &mut rng);
        let public_key = PublicKey::new(&secret_key, &mut rng);
        Ok((public_key, secret_key))
    }

    fn encode_vector(&self, values: &[u64]) -> Result<Plaintext> {
        if values.len() > self.slot_count() {
            return Err(Error::Encode(format!(
                "vector of {} values exceeds {} slots",
                values.len(),
                self.slot_count()
            )));
        }
        Ok(Plaintext::try_encode(values, Encoding::simd(), &self.params)?)
    }

    fn decode_vector(&self, plaintext: &Plaintext) -> Result<Vec<u64>> {
        Ok(Vec::<u64>::try_decode(plaintext, Encoding::simd())?)
    }

    fn encrypt(&self, plaintext: &Plaintext, public_key: &PublicKey) -> Result<Ciphertext> {
        Ok(public_key.try_encrypt(plaintext, &mut rand::rng())?)
    }

    fn decrypt(&self, ciphertext: &Ciphertext, secret_key: &SecretKey) -> Result<Plaintext> {
        Ok(secret_key.try_decrypt(ciphertext)?)
    }

    fn multiply_plain(&self, ciphertext: &Ciphertext, plaintext: &Plaintext) -> Result<Ciphertext> {
        Ok(ciphertext * plaintext)
    }

    fn serialize(&self, ciphertext: &Ciphertext) -> Vec<u8> {
        ciphertext.to_bytes()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Ciphertext> {
        Ciphertext::from_bytes(bytes, &self.params)
            .map_err(|e| Error::Decode(format!("ciphertext: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability() -> BfvCapability {
        BfvCapability::new(&CryptoParams::default()).unwrap()
    }

    #[test]
    fn test_context_reports_slots() {
        let cap = capability();
        assert_eq!(cap.slot_count(), 4096);
        assert_eq!(cap.plaintext_modulus(), 65537);
    }

    #[test]
    fn test_invalid_params_fail_construction() {
        let params = CryptoParams {
            plaintext_modulus: 65539,
            ..CryptoParams::default()
        };
        assert!(matches!(BfvCapability::new(&params), Err(Error::InvalidParams(_))));
    }

    #[test]
    fn test_slotwise_multiply() {
        let cap = capability();
        let (pk, sk) = cap.generate_key_pair().unwrap();

        let mut selector = vec![0u64; cap.slot_count()];
        selector[3] = 1;
        selector[4] = 1;
        let data: Vec<u64> = (0..cap.slot_count() as u64).map(|i| i % 256).collect();

        let ct = cap.encrypt(&cap.encode_vector(&selector).unwrap(), &pk).unwrap();
        let product = cap.multiply_plain(&ct, &cap.encode_vector(&data).unwrap()).unwrap();

        let bytes = cap.serialize(&product);
        let restored = cap.deserialize(&bytes).unwrap();
        let decoded = cap.decode_vector(&cap.decrypt(&restored, &sk).unwrap()).unwrap();

        assert_eq!(decoded.len(), cap.slot_count());
        assert_eq!(decoded[3], 3);
        assert_eq!(decoded[4], 4);
        assert!(decoded
            .iter()
            .enumerate()
            .all(|(i, v)| i == 3 || i == 4 || *v == 0));
    }

    #[test]
    fn test_garbage_ciphertext_rejected() {
        let cap = capability();
        assert!(matches!(cap.deserialize(&[1, 2, 3]), Err(Error::Decode(_))));
    }

    #[test]
    fn test_oversized_vector_rejected() {
        let cap = capability();
        let values = vec![0u64; cap.slot_count() + 1];
        assert!(matches!(cap.encode_vector(&values), Err(Error::Encode(_))));
    }
}
