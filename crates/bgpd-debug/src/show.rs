//! `show debugging bgp` output and `debug bgp` lines for the saved
//! configuration.

use crate::command::{Command, DebugTarget};
use crate::filter::FilterEntry;
use crate::gate::Direction;
use crate::registry::{Category, DebugFlags, DebugRegistry, ListId};

fn status_line(registry: &DebugRegistry, description: &str, list: Option<ListId>) -> String {
    match list.and_then(|id| registry.list(id)).filter(|l| !l.is_empty()) {
        Some(entries) => format!("  {description} for {entries}"),
        None => format!("  {description}"),
    }
}

/// Lists every category active in the running session.
///
/// The first line is a header and the last one is blank; filtered categories
/// name their filter entries.
pub fn show_debugging(registry: &DebugRegistry) -> Vec<String> {
    let on = |category: Category, flags: DebugFlags| registry.session_enabled(category, flags);
    let rows: [(bool, &str, Option<ListId>); 9] = [
        (on(Category::As4, DebugFlags::AS4), "BGP as4 debugging is on", None),
        (
            on(Category::As4, DebugFlags::AS4_SEGMENT),
            "BGP as4 aspath segment debugging is on",
            None,
        ),
        (
            on(Category::NeighborEvents, DebugFlags::NEIGHBOR_EVENTS),
            "BGP neighbor-events debugging is on",
            Some(ListId::NeighborEvents),
        ),
        (
            on(Category::Keepalive, DebugFlags::KEEPALIVE),
            "BGP keepalives debugging is on",
            Some(ListId::Keepalive),
        ),
        (
            on(Category::Nht, DebugFlags::NHT),
            "BGP next-hop tracking debugging is on",
            None,
        ),
        (
            on(Category::Update, DebugFlags::UPDATE_PREFIX),
            "BGP updates debugging is on (per prefix)",
            Some(ListId::UpdatePrefix),
        ),
        (
            on(Category::Update, DebugFlags::UPDATE_IN),
            "BGP updates debugging is on (inbound)",
            Some(ListId::UpdateIn),
        ),
        (
            on(Category::Update, DebugFlags::UPDATE_OUT),
            "BGP updates debugging is on (outbound)",
            Some(ListId::UpdateOut),
        ),
        (
            on(Category::Zebra, DebugFlags::ZEBRA),
            "BGP zebra debugging is on",
            Some(ListId::Zebra),
        ),
    ];

    let mut out = vec!["BGP debugging status:".to_string()];
    out.extend(
        rows.into_iter()
            .filter(|(enabled, _, _)| *enabled)
            .map(|(_, description, list)| status_line(registry, description, list)),
    );
    out.push(String::new());
    out
}

/// One target per saved entry of `id`, or a single unfiltered target when
/// the saved list is empty.
fn neighbor_targets(
    registry: &DebugRegistry,
    id: ListId,
    target: impl Fn(Option<String>) -> DebugTarget,
) -> Vec<DebugTarget> {
    let hosts: Vec<String> = registry
        .config_list(id)
        .into_iter()
        .flat_map(|l| l.iter())
        .filter_map(|entry| match entry {
            FilterEntry::Neighbor(n) => Some(n.host().to_string()),
            FilterEntry::Prefix(_) => None,
        })
        .collect();
    if hosts.is_empty() {
        vec![target(None)]
    } else {
        hosts.into_iter().map(|h| target(Some(h))).collect()
    }
}

fn prefix_targets(registry: &DebugRegistry, id: ListId) -> Vec<String> {
    registry
        .config_list(id)
        .into_iter()
        .flat_map(|l| l.iter())
        .filter_map(|entry| match entry {
            FilterEntry::Prefix(p) => Some(p.to_string()),
            FilterEntry::Neighbor(_) => None,
        })
        .collect()
}

/// Commands that recreate the configuration scope when replayed in the
/// configuration node.
///
/// Only configuration-scope bits and filter entries are written; filters
/// added or removed in the running session do not show up here. With both
/// update directions configured a single `debug bgp updates` is written and
/// per-direction neighbor filters are not.
pub fn config_commands(registry: &DebugRegistry) -> Vec<Command> {
    let on = |category: Category, flags: DebugFlags| registry.config_enabled(category, flags);
    let mut targets = Vec::new();

    if on(Category::As4, DebugFlags::AS4) {
        targets.push(DebugTarget::As4);
    }
    if on(Category::As4, DebugFlags::AS4_SEGMENT) {
        targets.push(DebugTarget::As4Segment);
    }
    if on(Category::Keepalive, DebugFlags::KEEPALIVE) {
        targets.extend(neighbor_targets(
            registry,
            ListId::Keepalive,
            DebugTarget::Keepalives,
        ));
    }

    let inbound = on(Category::Update, DebugFlags::UPDATE_IN);
    let outbound = on(Category::Update, DebugFlags::UPDATE_OUT);
    if inbound && outbound {
        targets.push(DebugTarget::Updates);
    } else {
        for dir in [Direction::Inbound, Direction::Outbound] {
            if on(Category::Update, dir.update_flag()) {
                targets.extend(neighbor_targets(registry, dir.update_list(), |peer| {
                    DebugTarget::UpdatesDirection(dir, peer)
                }));
            }
        }
    }
    if on(Category::Update, DebugFlags::UPDATE_PREFIX) {
        targets.extend(
            prefix_targets(registry, ListId::UpdatePrefix)
                .into_iter()
                .map(DebugTarget::UpdatesPrefix),
        );
    }

    if on(Category::NeighborEvents, DebugFlags::NEIGHBOR_EVENTS) {
        targets.extend(neighbor_targets(
            registry,
            ListId::NeighborEvents,
            DebugTarget::NeighborEvents,
        ));
    }
    if on(Category::Zebra, DebugFlags::ZEBRA) {
        let prefixes = prefix_targets(registry, ListId::Zebra);
        if prefixes.is_empty() {
            targets.push(DebugTarget::Zebra);
        } else {
            targets.extend(prefixes.into_iter().map(DebugTarget::ZebraPrefix));
        }
    }
    if on(Category::Nht, DebugFlags::NHT) {
        targets.push(DebugTarget::Nht);
    }

    targets.into_iter().map(Command::Debug).collect()
}

/// Renders [`config_commands`] as configuration lines.
pub fn write_config(registry: &DebugRegistry) -> Vec<String> {
    config_commands(registry)
        .iter()
        .map(ToString::to_string)
        .collect()
}
