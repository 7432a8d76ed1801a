//! Crypto parameter versioning for client/server compatibility
//!
//! When scheme parameters change (degree, plaintext modulus, moduli chain),
//! the version must be bumped to prevent silent incompatibility.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Crypto parameter version
///
/// Bump this when changing:
/// - polynomial degree (slot count)
/// - plaintext modulus
/// - ciphertext moduli sizes
/// - ciphertext serialization format
///
/// History:
/// - v1: BFV, degree 4096, t = 65537, moduli 36/36/37 bits
pub const CRYPTO_PARAMS_VERSION: u16 = 1;

/// BFV parameters
///
/// These must match between client and server for queries to succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoParams {
    /// Parameter version (must match CRYPTO_PARAMS_VERSION)
    pub version: u16,
    /// Polynomial degree, which is also the number of SIMD slots
    pub degree: usize,
    /// Plaintext modulus (prime, congruent to 1 mod 2*degree for batching)
    pub plaintext_modulus: u64,
    /// Bit sizes of the ciphertext moduli chain
    pub moduli_sizes: Vec<usize>,
}

/// Default production parameters
impl Default for CryptoParams {
    fn default() -> Self {
        Self {
            version: CRYPTO_PARAMS_VERSION,
            degree: 4096,
            plaintext_modulus: 65537, // 2^16 + 1
            moduli_sizes: vec![36, 36, 37],
        }
    }
}

impl CryptoParams {
    /// Check if parameters are compatible with current version
    pub fn is_compatible(&self) -> bool {
        self.version == CRYPTO_PARAMS_VERSION
    }

    /// Number of SIMD slots one plaintext carries
    pub fn slot_count(&self) -> usize {
        self.degree
    }

    /// Validate parameters before building a context
    ///
    /// Batching needs a prime plaintext modulus with `t = 1 mod 2n`, and the
    /// decoder needs every byte value to survive encoding, so `t > 255`.
    pub fn validate(&self) -> Result<()> {
        if self.version != CRYPTO_PARAMS_VERSION {
            return Err(Error::ParamsVersionMismatch {
                expected: CRYPTO_PARAMS_VERSION,
                actual: self.version,
            });
        }
        if !self.degree.is_power_of_two() || !(1024..=32768).contains(&self.degree) {
            return Err(Error::InvalidParams(format!(
                "degree must be a power of two in [1024, 32768], got {}",
                self.degree
            )));
        }
        if self.plaintext_modulus <= u8::MAX as u64 || self.plaintext_modulus >= 1 << 32 {
            return Err(Error::InvalidParams(format!(
                "plaintext modulus must be in (255, 2^32), got {}",
                self.plaintext_modulus
            )));
        }
        if !is_prime(self.plaintext_modulus) {
            return Err(Error::InvalidParams(format!(
                "plaintext modulus {} is not prime",
                self.plaintext_modulus
            )));
        }
        if self.plaintext_modulus % (2 * self.degree as u64) != 1 {
            return Err(Error::InvalidParams(format!(
                "plaintext modulus {} does not support batching at degree {}",
                self.plaintext_modulus, self.degree
            )));
        }
        if self.moduli_sizes.is_empty() {
            return Err(Error::InvalidParams("moduli chain is empty".into()));
        }
        if let Some(size) = self.moduli_sizes.iter().find(|s| !(10..=62).contains(*s)) {
            return Err(Error::InvalidParams(format!(
                "modulus size {} outside [10, 62] bits",
                size
            )));
        }
        Ok(())
    }
}

/// Trial division; the plaintext modulus is capped below 2^32
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        let params = CryptoParams::default();
        assert_eq!(params.version, CRYPTO_PARAMS_VERSION);
        assert!(params.is_compatible());
        params.validate().unwrap();
        assert_eq!(params.slot_count(), 4096);
    }

    #[test]
    fn test_version_mismatch() {
        let old = CryptoParams {
            version: 0,
            ..CryptoParams::default()
        };
        assert!(!old.is_compatible());
        assert!(matches!(
            old.validate(),
            Err(Error::ParamsVersionMismatch { expected: 1, actual: 0 })
        ));
    }

    #[test]
    fn test_rejects_non_batching_modulus() {
        // 65539 is prime but not 1 mod 8192
        let params = CryptoParams {
            plaintext_modulus: 65539,
            ..CryptoParams::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParams(_))));
    }

    #[test]
    fn test_rejects_composite_modulus() {
        let params = CryptoParams {
            plaintext_modulus: 8193 * 3,
            ..CryptoParams::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParams(_))));
    }

    #[test]
    fn test_rejects_bad_degree_and_moduli() {
        let params = CryptoParams {
            degree: 3000,
            ..CryptoParams::default()
        };
        assert!(params.validate().is_err());

        let params = CryptoParams {
            moduli_sizes: vec![],
            ..CryptoParams::default()
        };
        assert!(params.validate().is_err());

        let params = CryptoParams {
            moduli_sizes: vec![36, 70],
            ..CryptoParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_serialization() {
        let params = CryptoParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let parsed: CryptoParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn test_is_prime() {
        assert!(is_prime(65537));
        assert!(is_prime(12289));
        assert!(!is_prime(65535));
        assert!(!is_prime(1));
    }
}
