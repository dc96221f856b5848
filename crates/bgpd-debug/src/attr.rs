//! Path attribute rendering for UPDATE trace lines.

use std::fmt::{self, Write as _};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::messages::Origin;

/// The path attributes of an UPDATE, as far as the trace output needs them.
///
/// Attribute decoding belongs to the protocol engine; communities and the AS
/// path arrive already rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAttributes {
    pub next_hop: Option<Ipv4Addr>,
    pub origin: Option<Origin>,
    pub mp_next_hop_global: Option<Ipv6Addr>,
    /// Printed only alongside `mp_next_hop_global`.
    pub mp_next_hop_local: Option<Ipv6Addr>,
    pub local_pref: Option<u32>,
    pub med: Option<u32>,
    pub community: Option<String>,
    pub atomic_aggregate: bool,
    /// Aggregator AS and address.
    pub aggregator: Option<(u32, Ipv4Addr)>,
    pub originator_id: Option<Ipv4Addr>,
    pub cluster_list: Vec<Ipv4Addr>,
    pub as_path: Option<String>,
}

/// Comma separated attribute builder.
#[derive(Debug, Default)]
struct AttrWriter {
    buf: String,
}

impl AttrWriter {
    /// Starts a new `, `-separated item.
    fn item(&mut self, args: fmt::Arguments<'_>) {
        if !self.buf.is_empty() {
            self.buf.push_str(", ");
        }
        let _ = self.buf.write_fmt(args);
    }

    /// Appends to the current item without a separator.
    fn append(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.buf.write_fmt(args);
    }

    fn finish(self) -> Option<String> {
        (!self.buf.is_empty()).then_some(self.buf)
    }
}

/// Renders the attributes present in `attr`, e.g.
/// `nexthop 10.0.0.1, origin i, localpref 100, path 65001 65002`.
///
/// Returns `None` when no attribute is present.
pub fn dump_attr(attr: &PathAttributes) -> Option<String> {
    let mut w = AttrWriter::default();

    if let Some(nh) = attr.next_hop {
        w.item(format_args!("nexthop {nh}"));
    }
    if let Some(origin) = attr.origin {
        w.item(format_args!("origin {}", origin.short_name()));
    }
    if let Some(global) = attr.mp_next_hop_global {
        w.item(format_args!("mp_nexthop {global}"));
        if let Some(local) = attr.mp_next_hop_local {
            w.append(format_args!("({local})"));
        }
    }
    if let Some(pref) = attr.local_pref {
        w.item(format_args!("localpref {pref}"));
    }
    if let Some(med) = attr.med {
        w.item(format_args!("metric {med}"));
    }
    if let Some(community) = &attr.community {
        w.item(format_args!("community {community}"));
    }
    if attr.atomic_aggregate {
        w.item(format_args!("atomic-aggregate"));
    }
    if let Some((asn, addr)) = attr.aggregator {
        w.item(format_args!("aggregated by {asn} {addr}"));
    }
    if let Some(id) = attr.originator_id {
        w.item(format_args!("originator {id}"));
    }
    if !attr.cluster_list.is_empty() {
        w.item(format_args!("clusterlist"));
        for id in &attr.cluster_list {
            w.append(format_args!(" {id}"));
        }
    }
    if let Some(path) = &attr.as_path {
        w.item(format_args!("path {path}"));
    }

    w.finish()
}
