//! Sharded PIR configuration

use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

use crate::constants::{DEFAULT_KEY_DOMAIN, DEFAULT_SHARD_WIDTH, DEFAULT_VALUE_WIDTH};
use crate::{CryptoParams, Error, KeySpace, Result, Variant};

/// Protocol version constant
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Configuration shared out of band by client and server
///
/// Nothing here is negotiated per request. Both sides load the same file (or
/// build the same value) at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PirConfig {
    /// Presence bit or bounded value per key
    #[serde(default)]
    pub variant: Variant,
    /// Slots per shard (`S`)
    pub shard_width: usize,
    /// Bytes per key in the value variant (`W`), 0 for presence
    #[serde(default)]
    pub value_width: usize,
    /// Exclusive upper bound of the key domain
    #[serde(default = "default_key_domain")]
    pub key_domain: u64,
    /// Scheme parameters
    #[serde(default)]
    pub crypto: CryptoParams,
    /// Protocol version
    #[serde(default = "default_version")]
    pub version: String,
    /// Configuration hash for change detection
    #[serde(default)]
    pub config_hash: Option<String>,
}

fn default_key_domain() -> u64 {
    DEFAULT_KEY_DOMAIN
}

fn default_version() -> String {
    PROTOCOL_VERSION.to_string()
}

impl PirConfig {
    /// Presence-only configuration with `shard_width` slots per shard
    pub fn presence(shard_width: usize) -> Self {
        Self {
            variant: Variant::Presence,
            shard_width,
            value_width: 0,
            key_domain: DEFAULT_KEY_DOMAIN,
            crypto: CryptoParams::default(),
            version: PROTOCOL_VERSION.to_string(),
            config_hash: None,
        }
    }

    /// Value-carrying configuration with `value_width` bytes per key
    pub fn with_values(shard_width: usize, value_width: usize) -> Self {
        Self {
            variant: Variant::Value,
            value_width,
            ..Self::presence(shard_width)
        }
    }

    /// Set the key domain
    pub fn with_key_domain(mut self, key_domain: u64) -> Self {
        self.key_domain = key_domain;
        self
    }

    /// Set custom crypto parameters
    pub fn with_crypto(mut self, crypto: CryptoParams) -> Self {
        self.crypto = crypto;
        self
    }

    /// Load configuration from a JSON file
    ///
    /// A recorded hash that no longer matches the contents is rejected.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.verify_hash()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Key space described by this configuration
    pub fn keyspace(&self) -> Result<KeySpace> {
        KeySpace::new(self.variant, self.shard_width, self.value_width, self.key_domain)
    }

    /// Validate shape and scheme parameters
    ///
    /// Checks that the variant and value width agree, that the crypto
    /// parameters are consistent, and that one serialized shard (`S*W + 1`)
    /// fits into a single plaintext.
    pub fn validate(&self) -> Result<()> {
        match self.variant {
            Variant::Presence if self.value_width != 0 => {
                return Err(Error::InvalidConfig(format!(
                    "presence variant must have value_width 0, got {}",
                    self.value_width
                )));
            }
            Variant::Value if self.value_width == 0 => {
                return Err(Error::InvalidConfig(
                    "value variant needs a positive value_width".into(),
                ));
            }
            _ => {}
        }

        self.crypto.validate()?;

        let keyspace = self.keyspace()?;
        if keyspace.serialized_width() > self.crypto.slot_count() {
            return Err(Error::ShardTooWide {
                required: keyspace.serialized_width(),
                available: self.crypto.slot_count(),
            });
        }

        self.verify_hash()
    }

    /// Compute a hash of the configuration for change detection
    ///
    /// Covers every field that must match between client and server. Keccak
    /// keeps the value stable across builds and platforms.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Keccak::v256();
        hasher.update(self.variant.to_string().as_bytes());
        hasher.update(&(self.shard_width as u64).to_le_bytes());
        hasher.update(&(self.value_width as u64).to_le_bytes());
        hasher.update(&self.key_domain.to_le_bytes());
        hasher.update(&self.crypto.version.to_le_bytes());
        hasher.update(&(self.crypto.degree as u64).to_le_bytes());
        hasher.update(&self.crypto.plaintext_modulus.to_le_bytes());
        for size in &self.crypto.moduli_sizes {
            hasher.update(&(*size as u64).to_le_bytes());
        }
        hasher.update(self.version.as_bytes());

        let mut digest = [0u8; 32];
        hasher.finalize(&mut digest);
        hex::encode(&digest[..8])
    }

    /// Set the config hash (call after setting every other field)
    pub fn with_hash(mut self) -> Self {
        self.config_hash = Some(self.compute_hash());
        self
    }

    fn verify_hash(&self) -> Result<()> {
        if let Some(recorded) = &self.config_hash {
            let computed = self.compute_hash();
            if *recorded != computed {
                return Err(Error::ConfigHashMismatch {
                    recorded: recorded.clone(),
                    computed,
                });
            }
        }
        Ok(())
    }
}

impl Default for PirConfig {
    fn default() -> Self {
        Self::presence(DEFAULT_SHARD_WIDTH)
    }
}

impl PirConfig {
    /// Default value-variant configuration (`S = 20`, `W = 20`)
    pub fn default_values() -> Self {
        Self::with_values(DEFAULT_SHARD_WIDTH, DEFAULT_VALUE_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = PirConfig::default();
        assert_eq!(config.variant, Variant::Presence);
        assert_eq!(config.shard_width, 20);
        assert_eq!(config.version, PROTOCOL_VERSION);
        config.validate().unwrap();
        PirConfig::default_values().validate().unwrap();
    }

    #[test]
    fn test_variant_width_consistency() {
        let mut config = PirConfig::presence(20);
        config.value_width = 4;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = PirConfig::with_values(20, 0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_shard_must_fit_plaintext() {
        // 205 * 20 + 1 = 4101 > 4096 slots
        let config = PirConfig::with_values(205, 20);
        assert!(matches!(
            config.validate(),
            Err(Error::ShardTooWide { required: 4101, available: 4096 })
        ));

        // 4095 + 1 fits exactly
        PirConfig::presence(4095).validate().unwrap();

        // A larger ring makes room for it
        let wider = PirConfig::with_values(205, 20).with_crypto(CryptoParams {
            degree: 8192,
            ..CryptoParams::default()
        });
        wider.validate().unwrap();
        assert_ne!(wider.compute_hash(), config.compute_hash());
    }

    #[test]
    fn test_config_hash_changes_on_shape_change() {
        let base = PirConfig::presence(20).with_hash();
        let same = PirConfig::presence(20).with_hash();
        assert_eq!(base.config_hash, same.config_hash);

        let wider = PirConfig::presence(21).with_hash();
        assert_ne!(base.config_hash, wider.config_hash);

        let values = PirConfig::with_values(20, 20).with_hash();
        assert_ne!(base.config_hash, values.config_hash);

        let smaller_domain = PirConfig::presence(20).with_key_domain(1_000).with_hash();
        assert_ne!(base.config_hash, smaller_domain.config_hash);
    }

    #[test]
    fn test_tampered_hash_rejected() {
        let mut config = PirConfig::presence(20).with_hash();
        config.shard_width = 40;
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigHashMismatch { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = PirConfig::with_values(20, 20).with_key_domain(1_000_000).with_hash();
        config.save(&path).unwrap();

        let loaded = PirConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.keyspace().unwrap().block_width(), 20);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config: PirConfig = serde_json::from_str(r#"{"shard_width": 20}"#).unwrap();
        assert_eq!(config.variant, Variant::Presence);
        assert_eq!(config.key_domain, DEFAULT_KEY_DOMAIN);
        assert_eq!(config.crypto, CryptoParams::default());
        config.validate().unwrap();
    }
}
