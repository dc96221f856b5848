//! Gated trace emission for protocol events.
//!
//! Each helper checks its predicate first and only formats a line when the
//! event is being debugged. The line is written through `tracing` and handed
//! back to the caller.

use bgpd_types::IpPrefix;
use tracing::debug;

use crate::attr::{dump_attr, PathAttributes};
use crate::gate::Direction;
use crate::messages::{FsmState, MessageType};
use crate::neighbor::Neighbor;
use crate::registry::DebugRegistry;

/// Whether a route is being installed in or withdrawn from zebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZebraAction {
    Add,
    Delete,
}

impl ZebraAction {
    const fn verb(self) -> &'static str {
        match self {
            ZebraAction::Add => "add",
            ZebraAction::Delete => "delete",
        }
    }
}

fn emit(line: String) -> Option<String> {
    debug!(target: "bgpd::debug", "{}", line);
    Some(line)
}

impl DebugRegistry {
    pub fn trace_state_change(
        &self,
        neighbor: &Neighbor,
        from: FsmState,
        to: FsmState,
    ) -> Option<String> {
        if !self.should_trace_neighbor_event(Some(neighbor)) {
            return None;
        }
        emit(format!("{} went from {} to {}", neighbor.host(), from, to))
    }

    pub fn trace_keepalive(&self, neighbor: &Neighbor, direction: Direction) -> Option<String> {
        if !self.should_trace_keepalive(Some(neighbor)) {
            return None;
        }
        let verb = match direction {
            Direction::Inbound => "rcvd",
            Direction::Outbound => "sending",
        };
        emit(format!("{} {} {}", neighbor.host(), verb, MessageType::Keepalive))
    }

    /// Traces one prefix of an UPDATE. `attrs` is `None` for withdrawals.
    pub fn trace_update(
        &self,
        neighbor: &Neighbor,
        prefix: &IpPrefix,
        direction: Direction,
        attrs: Option<&PathAttributes>,
    ) -> Option<String> {
        if !self.should_trace_update(Some(neighbor), Some(prefix), direction) {
            return None;
        }
        let verb = match direction {
            Direction::Inbound => "rcvd",
            Direction::Outbound => "send",
        };
        let line = match attrs {
            None => format!("{} {} UPDATE about {} -- withdrawn", neighbor.host(), verb, prefix),
            Some(attrs) => match dump_attr(attrs) {
                Some(dump) => format!("{} {} UPDATE {} {}", neighbor.host(), verb, prefix, dump),
                None => format!("{} {} UPDATE {}", neighbor.host(), verb, prefix),
            },
        };
        emit(line)
    }

    pub fn trace_zebra(&self, prefix: &IpPrefix, action: ZebraAction) -> Option<String> {
        if !self.should_trace_zebra(Some(prefix)) {
            return None;
        }
        emit(format!(
            "Zebra send: {} route {} {}",
            prefix.family(),
            action.verb(),
            prefix
        ))
    }
}
