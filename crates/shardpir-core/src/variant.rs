//! Database variant: what a key's slot carries

use serde::{Deserialize, Serialize};
use std::fmt;

/// Database variant
///
/// - Presence: one byte per key, `1` if the key was inserted
/// - Value: a fixed `W`-byte block per key holding a bounded string
///
/// Client and server must agree on the variant out of band; nothing in a
/// query reveals it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Presence bit per key
    #[default]
    Presence,
    /// Bounded value per key
    Value,
}

impl Variant {
    /// Bytes reserved per key for a given configured value width
    ///
    /// The presence variant always uses a single byte, whatever `value_width`
    /// says.
    pub fn block_width(&self, value_width: usize) -> usize {
        match self {
            Variant::Presence => 1,
            Variant::Value => value_width,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Presence => write!(f, "presence"),
            Variant::Value => write!(f, "value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_serialization() {
        assert_eq!(serde_json::to_string(&Variant::Presence).unwrap(), "\"presence\"");
        assert_eq!(serde_json::to_string(&Variant::Value).unwrap(), "\"value\"");
        assert_eq!(serde_json::from_str::<Variant>("\"value\"").unwrap(), Variant::Value);
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(Variant::Presence.to_string(), "presence");
        assert_eq!(Variant::Value.to_string(), "value");
    }

    #[test]
    fn test_default_is_presence() {
        assert_eq!(Variant::default(), Variant::Presence);
    }

    #[test]
    fn test_block_width() {
        assert_eq!(Variant::Presence.block_width(0), 1);
        assert_eq!(Variant::Presence.block_width(20), 1);
        assert_eq!(Variant::Value.block_width(20), 20);
    }
}
