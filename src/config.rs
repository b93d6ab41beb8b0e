//! RON configuration
//!
//! Sight ranges and layer setups can be authored as data and loaded at
//! startup. Invalid layer setups are rejected when the map is built, not on
//! first use.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Radius;

/// How far and in which shape an observer sees.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    /// Sight radius; `None` is unbounded
    pub radius: Option<f64>,
    pub shape: Radius,
    /// Restrict sight to a cone
    pub cone: Option<ConeConfig>,
}

/// A viewing cone in degrees. `angle` 0 is up, growing clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeConfig {
    pub angle: f64,
    pub span: f64,
}

impl SightConfig {
    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }
}

/// Layout of a [`LayeredSpatialMap`](crate::spatial::LayeredSpatialMap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Number of layers
    pub layers: u32,
    /// Layer number of the lowest layer
    #[serde(default)]
    pub starting_layer: u32,
    /// Layer numbers that allow several items per position
    #[serde(default)]
    pub multi_item_layers: Vec<u32>,
}

impl LayerConfig {
    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_sight_config_defaults() {
        let config = SightConfig::from_ron("()").unwrap();
        assert_eq!(config, SightConfig::default());
        assert_eq!(config.shape, Radius::Circle);
        assert!(config.radius.is_none());
    }

    #[test]
    fn test_sight_config_full() {
        let config = SightConfig::from_ron(
            "(radius: Some(8.0), shape: Square, cone: Some((angle: 90.0, span: 120.0)))",
        )
        .unwrap();
        assert_eq!(config.radius, Some(8.0));
        assert_eq!(config.shape, Radius::Square);
        assert_eq!(config.cone, Some(ConeConfig { angle: 90.0, span: 120.0 }));
    }

    #[test]
    fn test_layer_config() {
        let config = LayerConfig::from_ron("(layers: 3, multi_item_layers: [1, 2])").unwrap();
        assert_eq!(config.layers, 3);
        assert_eq!(config.starting_layer, 0);
        assert_eq!(config.multi_item_layers, vec![1, 2]);
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(SightConfig::from_ron("(radius: "), Err(Error::Config(_))));
        assert!(matches!(LayerConfig::from_ron("()"), Err(Error::Config(_))));
    }
}
