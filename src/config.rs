use crate::device::BridgedAttributes;
use crate::matter::DEFAULT_ENERGY_ENDPOINT_ID;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    let Ok(content) = fs::read_to_string(env_path) else {
        return;
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before anything else runs)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Split `.env` content into key/value pairs, skipping blanks and comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let mut value = value.trim();
            // Remove surrounding quotes if present
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }
            Some((key.trim(), value))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub energy: EnergyConfig,
    pub bridged: BridgedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnergyConfig {
    /// Endpoint the ElectricalPowerMeasurement cluster is enabled on
    pub endpoint_id: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgedConfig {
    pub node_id: u64,
    pub device_name: String,
    pub endpoint_id: u16,
    pub vendor_name: Option<String>,
    pub product_name: Option<String>,
}

impl BridgedConfig {
    /// Descriptive attributes for the BridgedDeviceBasicInformation cluster.
    pub fn attributes(&self) -> BridgedAttributes {
        BridgedAttributes {
            vendor_name: self.vendor_name.clone(),
            product_name: self.product_name.clone(),
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            energy: EnergyConfig {
                endpoint_id: DEFAULT_ENERGY_ENDPOINT_ID,
            },
            bridged: BridgedConfig {
                node_id: 1,
                device_name: "Virtual Energy Meter".to_string(),
                endpoint_id: 2,
                vendor_name: None,
                product_name: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Unparseable numeric values are ignored and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("EPM_ENDPOINT_ID")
            && let Ok(e) = endpoint.parse()
        {
            config.energy.endpoint_id = e;
        }

        // Bridged device configuration
        if let Some(node_id) = lookup("BRIDGED_NODE_ID")
            && let Some(n) = parse_node_id(&node_id)
        {
            config.bridged.node_id = n;
        }
        if let Some(name) = lookup("BRIDGED_DEVICE_NAME") {
            config.bridged.device_name = name;
        }
        if let Some(endpoint) = lookup("BRIDGED_ENDPOINT_ID")
            && let Ok(e) = endpoint.parse()
        {
            config.bridged.endpoint_id = e;
        }
        if let Some(vendor) = lookup("BRIDGED_VENDOR_NAME") {
            config.bridged.vendor_name = Some(vendor);
        }
        if let Some(product) = lookup("BRIDGED_PRODUCT_NAME") {
            config.bridged.product_name = Some(product);
        }

        config
    }
}

/// Parse a node id given in decimal or `0x`-prefixed hex.
pub fn parse_node_id(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.energy.endpoint_id, 1);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("EPM_ENDPOINT_ID", "4"),
            ("BRIDGED_NODE_ID", "0x1F"),
            ("BRIDGED_DEVICE_NAME", "Solar Inverter"),
            ("BRIDGED_ENDPOINT_ID", "5"),
            ("BRIDGED_VENDOR_NAME", "Fronius"),
        ]));
        assert_eq!(config.energy.endpoint_id, 4);
        assert_eq!(config.bridged.node_id, 31);
        assert_eq!(config.bridged.device_name, "Solar Inverter");
        assert_eq!(config.bridged.endpoint_id, 5);
        assert_eq!(config.bridged.attributes().vendor_name.as_deref(), Some("Fronius"));
        assert_eq!(config.bridged.attributes().product_name, None);
    }

    #[test]
    fn test_invalid_numbers_keep_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("EPM_ENDPOINT_ID", "seventy"),
            ("BRIDGED_NODE_ID", "0xZZ"),
        ]));
        assert_eq!(config.energy.endpoint_id, 1);
        assert_eq!(config.bridged.node_id, 1);
    }

    #[test]
    fn test_parse_node_id() {
        assert_eq!(parse_node_id("42"), Some(42));
        assert_eq!(parse_node_id(" 0xff "), Some(255));
        assert_eq!(parse_node_id("0XFF"), Some(255));
        assert_eq!(parse_node_id("-1"), None);
    }

    #[test]
    fn test_parse_dotenv() {
        let content = "# comment\n\nBRIDGED_DEVICE_NAME=Garage Meter\nEPM_ENDPOINT_ID = \"3\"\nBROKEN\nQUOTE='x'\n";
        assert_eq!(
            parse_dotenv(content),
            vec![
                ("BRIDGED_DEVICE_NAME", "Garage Meter"),
                ("EPM_ENDPOINT_ID", "3"),
                ("QUOTE", "x"),
            ]
        );
    }
}
