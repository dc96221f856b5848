//! Selective debug tracing for the BGP daemon.
//!
//! Operators switch trace categories on and off at runtime and narrow them to
//! particular neighbors or prefixes. Protocol code asks a cheap predicate
//! before formatting a trace line.
//!
//! - [`registry`]: per-category bits and filter lists in two scopes (saved
//!   configuration and running session)
//! - [`gate`]: the hot-path predicates
//! - [`command`]: `debug bgp ...` parsing and execution
//! - [`notify`]: NOTIFICATION code/subcode decoding and logging
//! - [`trace`]: gated trace line helpers
//!
//! # Architecture
//!
//! ```text
//! operator / config file          protocol engine
//!          |                             |
//!          v                             v
//!   command::execute  ---->  DebugRegistry  <----  should_trace_*()
//!          |                 (scopes, lists)           |
//!          v                                           v
//!   show_debugging / write_config           trace::* / log_notification
//! ```
//!
//! # Example
//!
//! ```
//! use bgpd_debug::{execute_line, CommandNode, DebugRegistry, Direction, Neighbor, NeighborTable};
//!
//! let mut neighbors = NeighborTable::new();
//! let peer = neighbors.add(Neighbor::with_address("10.0.0.1".parse().unwrap()));
//! let mut registry = DebugRegistry::new();
//!
//! let out = execute_line(&mut registry, &neighbors, CommandNode::Enable, "debug bgp updates in 10.0.0.1");
//! assert!(out.is_success());
//! assert!(registry.should_trace_update(Some(&*peer), None, Direction::Inbound));
//! ```

pub mod attr;
pub mod command;
pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod messages;
pub mod neighbor;
pub mod notify;
pub mod registry;
pub mod shared;
pub mod show;
pub mod trace;

pub use attr::{dump_attr, PathAttributes};
pub use command::{
    execute, execute_line, Command, CommandNode, CommandOutput, CommandStatus, DebugTarget,
};
pub use config::{DaemonConfig, NeighborConfig};
pub use error::{DebugError, DebugResult};
pub use filter::{FilterEntry, FilterKey, FilterList};
pub use gate::{matches_neighbor_filter, matches_prefix_filter, Direction};
pub use messages::{FsmState, MessageType, Origin};
pub use neighbor::{resolve_neighbor, Neighbor, NeighborDirectory, NeighborRef, NeighborTable};
pub use notify::{decode, format_notification, Notification, NotifyDirection, NotifyLabels};
pub use registry::{Category, DebugFlags, DebugRegistry, ListId, Scope, ScopeBits};
pub use shared::SharedDebugRegistry;
pub use show::{config_commands, show_debugging, write_config};
pub use trace::ZebraAction;

pub use bgpd_types::{AddressFamily, IpAddress, IpPrefix};
