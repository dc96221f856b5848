//! Thread-safe handle to a [`DebugRegistry`].

use std::sync::Arc;

use bgpd_types::IpPrefix;
use parking_lot::Mutex;

use crate::command::{execute, Command, CommandNode, CommandOutput};
use crate::gate::Direction;
use crate::neighbor::{Neighbor, NeighborDirectory};
use crate::registry::DebugRegistry;

/// Shared registry for hosts that evaluate predicates from several threads.
///
/// Command execution and predicate evaluation serialize on one lock, so a
/// predicate never observes a half-applied command.
#[derive(Debug, Clone, Default)]
pub struct SharedDebugRegistry {
    inner: Arc<Mutex<DebugRegistry>>,
}

impl SharedDebugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: DebugRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Runs `f` with the registry locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut DebugRegistry) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn execute(
        &self,
        directory: &dyn NeighborDirectory,
        node: CommandNode,
        command: &Command,
    ) -> CommandOutput {
        execute(&mut self.inner.lock(), directory, node, command)
    }

    pub fn should_trace_neighbor_event(&self, neighbor: Option<&Neighbor>) -> bool {
        self.inner.lock().should_trace_neighbor_event(neighbor)
    }

    pub fn should_trace_keepalive(&self, neighbor: Option<&Neighbor>) -> bool {
        self.inner.lock().should_trace_keepalive(neighbor)
    }

    pub fn should_trace_update(
        &self,
        neighbor: Option<&Neighbor>,
        prefix: Option<&IpPrefix>,
        direction: Direction,
    ) -> bool {
        self.inner
            .lock()
            .should_trace_update(neighbor, prefix, direction)
    }

    pub fn should_trace_zebra(&self, prefix: Option<&IpPrefix>) -> bool {
        self.inner.lock().should_trace_zebra(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbor::NeighborTable;
    use std::thread;

    #[test]
    fn test_commands_visible_across_threads() {
        let mut table = NeighborTable::new();
        let peer = table.add(Neighbor::with_address("10.0.0.1".parse().unwrap()));
        let shared = SharedDebugRegistry::new();

        let command: Command = "debug bgp keepalives 10.0.0.1".parse().unwrap();
        assert!(shared.execute(&table, CommandNode::Enable, &command).is_success());

        let reader = shared.clone();
        let seen = thread::spawn(move || reader.should_trace_keepalive(Some(&*peer)))
            .join()
            .unwrap();
        assert!(seen);
    }

    #[test]
    fn test_with_gives_mutable_access() {
        let shared = SharedDebugRegistry::new();
        let idle = shared.with(|reg| {
            reg.reset();
            reg.is_idle()
        });
        assert!(idle);
    }
}
