//! Daemon configuration file.
//!
//! ```json
//! {
//!   "neighbors": [{ "address": "10.0.0.1" }, { "interface": "swp1" }],
//!   "log_neighbor_changes": true,
//!   "debug": ["debug bgp updates in 10.0.0.1", "debug bgp nht"]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::command::{execute_line, CommandNode};
use crate::error::{DebugError, DebugResult};
use crate::neighbor::{Neighbor, NeighborDirectory, NeighborTable};
use crate::registry::DebugRegistry;
use crate::show::write_config;
use bgpd_types::IpAddress;

/// A configured neighbor, keyed by address or by interface name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<IpAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl NeighborConfig {
    fn to_neighbor(&self, index: usize) -> DebugResult<Neighbor> {
        match (&self.address, &self.interface) {
            (Some(address), None) => Ok(Neighbor::with_address(*address)),
            (None, Some(interface)) if !interface.is_empty() => {
                Ok(Neighbor::with_interface(interface.clone()))
            }
            _ => Err(DebugError::invalid_config(
                format!("neighbors[{index}]"),
                "exactly one of address or interface is required",
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub neighbors: Vec<NeighborConfig>,
    /// Log every NOTIFICATION whether or not neighbor events are debugged.
    #[serde(default)]
    pub log_neighbor_changes: bool,
    /// `debug bgp ...` lines applied in the configuration node at startup.
    #[serde(default)]
    pub debug: Vec<String>,
}

impl DaemonConfig {
    pub fn from_json_str(json: &str) -> DebugResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DebugResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| DebugError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            neighbors = config.neighbors.len(),
            debug_lines = config.debug.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> DebugResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| DebugError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Builds the neighbor directory. Fails on the first invalid entry.
    pub fn neighbor_table(&self) -> DebugResult<NeighborTable> {
        let mut table = NeighborTable::new();
        for (index, neighbor) in self.neighbors.iter().enumerate() {
            table.add(neighbor.to_neighbor(index)?);
        }
        Ok(table)
    }

    /// Applies the `debug` lines in the configuration node.
    ///
    /// A rejected line is logged and skipped. Returns the number of lines
    /// rejected.
    pub fn replay_debug(
        &self,
        registry: &mut DebugRegistry,
        directory: &dyn NeighborDirectory,
    ) -> usize {
        let mut rejected = 0;
        for line in &self.debug {
            let output = execute_line(registry, directory, CommandNode::Config, line);
            if !output.is_success() {
                warn!(line = %line, reason = ?output.lines, "Skipping debug configuration line");
                rejected += 1;
            }
        }
        rejected
    }

    /// Replaces the `debug` lines with the registry's configuration scope.
    pub fn save_debug(&mut self, registry: &DebugRegistry) {
        self.debug = write_config(registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Category, DebugFlags, ListId};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DaemonConfig::default());
    }

    #[test]
    fn test_neighbor_table() {
        let config = DaemonConfig::from_json_str(
            r#"{"neighbors": [{"address": "10.0.0.1"}, {"interface": "swp1"}]}"#,
        )
        .unwrap();
        let table = config.neighbor_table().unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.lookup_by_interface("swp1").is_some());
    }

    #[test]
    fn test_neighbor_needs_exactly_one_key() {
        for json in [
            r#"{"neighbors": [{}]}"#,
            r#"{"neighbors": [{"address": "10.0.0.1", "interface": "swp1"}]}"#,
            r#"{"neighbors": [{"interface": ""}]}"#,
        ] {
            let config = DaemonConfig::from_json_str(json).unwrap();
            let err = config.neighbor_table().unwrap_err();
            assert!(matches!(err, DebugError::InvalidConfig { .. }));
            assert!(!err.is_input_error());
        }
    }

    #[test]
    fn test_bad_address_is_json_error() {
        let err = DaemonConfig::from_json_str(r#"{"neighbors": [{"address": "10.0.0"}]}"#)
            .unwrap_err();
        assert!(matches!(err, DebugError::Json(_)));
    }

    #[test]
    fn test_replay_sets_both_scopes() {
        let config = DaemonConfig::from_json_str(
            r#"{
                "neighbors": [{"address": "10.0.0.1"}],
                "debug": [
                    "debug bgp keepalives 10.0.0.1",
                    "debug bgp keepalives 10.9.9.9",
                    "debug bgp nonsense"
                ]
            }"#,
        )
        .unwrap();
        let table = config.neighbor_table().unwrap();
        let mut reg = DebugRegistry::new();

        assert_eq!(config.replay_debug(&mut reg, &table), 2);
        assert!(reg.config_enabled(Category::Keepalive, DebugFlags::KEEPALIVE));
        assert!(reg.session_enabled(Category::Keepalive, DebugFlags::KEEPALIVE));
        assert_eq!(reg.list(ListId::Keepalive).unwrap().len(), 1);
        assert_eq!(reg.config_list(ListId::Keepalive).unwrap().len(), 1);
    }
}
