//! Configured neighbors and how debug commands resolve them.
//!
//! Neighbor records are owned by the daemon's neighbor directory. Filter
//! entries hold a [`NeighborRef`] clone, which keeps the record alive until the
//! entry is removed, independent of whether the directory still lists it.

use std::fmt;
use std::sync::Arc;

use bgpd_types::IpAddress;
use tracing::debug;

use crate::error::{DebugError, DebugResult};

/// Shared handle to a configured neighbor.
pub type NeighborRef = Arc<Neighbor>;

/// A configured BGP neighbor, identified by address or by interface.
#[derive(Debug)]
pub struct Neighbor {
    /// Display name used in trace lines and status output.
    host: String,
    address: Option<IpAddress>,
    interface: Option<String>,
}

impl Neighbor {
    /// Creates a neighbor configured by address.
    pub fn with_address(address: IpAddress) -> Self {
        Self {
            host: address.to_string(),
            address: Some(address),
            interface: None,
        }
    }

    /// Creates an unnumbered neighbor configured on an interface.
    pub fn with_interface(interface: impl Into<String>) -> Self {
        let interface = interface.into();
        Self {
            host: interface.clone(),
            address: None,
            interface: Some(interface),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn address(&self) -> Option<&IpAddress> {
        self.address.as_ref()
    }

    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }
}

impl fmt::Display for Neighbor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

/// Lookup interface onto the daemon's configured neighbors.
pub trait NeighborDirectory {
    /// Finds a neighbor configured with this address.
    fn lookup(&self, address: &IpAddress) -> Option<NeighborRef>;

    /// Finds an unnumbered neighbor configured on this interface.
    fn lookup_by_interface(&self, interface: &str) -> Option<NeighborRef>;
}

/// In-memory neighbor directory.
#[derive(Debug, Default)]
pub struct NeighborTable {
    neighbors: Vec<NeighborRef>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a neighbor and returns the directory's handle to it.
    pub fn add(&mut self, neighbor: Neighbor) -> NeighborRef {
        let neighbor = Arc::new(neighbor);
        self.neighbors.push(Arc::clone(&neighbor));
        neighbor
    }

    /// Removes a neighbor by host name, returning the directory's handle.
    ///
    /// Debug filters that still reference the neighbor keep it alive.
    pub fn remove(&mut self, host: &str) -> Option<NeighborRef> {
        let pos = self.neighbors.iter().position(|n| n.host() == host)?;
        Some(self.neighbors.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborRef> {
        self.neighbors.iter()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

impl NeighborDirectory for NeighborTable {
    fn lookup(&self, address: &IpAddress) -> Option<NeighborRef> {
        self.neighbors
            .iter()
            .find(|n| n.address() == Some(address))
            .cloned()
    }

    fn lookup_by_interface(&self, interface: &str) -> Option<NeighborRef> {
        self.neighbors
            .iter()
            .find(|n| n.interface() == Some(interface))
            .cloned()
    }
}

/// Resolves an operator-supplied neighbor token.
///
/// The token is parsed as an address first; only when that fails is it taken
/// as an interface name. A token that parses as an address is never retried as
/// an interface name.
pub fn resolve_neighbor(
    directory: &dyn NeighborDirectory,
    token: &str,
) -> DebugResult<NeighborRef> {
    let found = match token.parse::<IpAddress>() {
        Ok(address) => directory.lookup(&address),
        Err(_) => directory.lookup_by_interface(token),
    };

    match found {
        Some(neighbor) => Ok(neighbor),
        None => {
            debug!(token, "neighbor token did not resolve");
            Err(DebugError::peer_not_found(token))
        }
    }
}
