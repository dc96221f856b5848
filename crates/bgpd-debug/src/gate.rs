//! Trace gating predicates.
//!
//! These run on every protocol event before a trace line is formatted, so
//! they never allocate. Lists are scanned linearly; they hold a handful of
//! operator-entered entries.

use std::fmt;

use bgpd_types::IpPrefix;

use crate::filter::{FilterKey, FilterList};
use crate::neighbor::Neighbor;
use crate::registry::{Category, DebugFlags, DebugRegistry, ListId};

/// Direction of a protocol message relative to this daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Keyword used by the `debug bgp updates (in|out)` commands.
    pub const fn keyword(self) -> &'static str {
        match self {
            Direction::Inbound => "in",
            Direction::Outbound => "out",
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Inbound => Direction::Outbound,
            Direction::Outbound => Direction::Inbound,
        }
    }

    pub(crate) const fn update_flag(self) -> DebugFlags {
        match self {
            Direction::Inbound => DebugFlags::UPDATE_IN,
            Direction::Outbound => DebugFlags::UPDATE_OUT,
        }
    }

    pub(crate) const fn update_list(self) -> ListId {
        match self {
            Direction::Inbound => ListId::UpdateIn,
            Direction::Outbound => ListId::UpdateOut,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

/// An absent or empty list matches every prefix. Otherwise `prefix` must be
/// given and equal one of the entries at the same length.
pub fn matches_prefix_filter(list: Option<&FilterList>, prefix: Option<&IpPrefix>) -> bool {
    match list {
        None => true,
        Some(list) if list.is_empty() => true,
        Some(list) => prefix.is_some_and(|p| list.contains(FilterKey::Prefix(p))),
    }
}

/// An absent or empty list matches every neighbor. Otherwise `neighbor` must be
/// given and be one of the listed neighbors.
pub fn matches_neighbor_filter(list: Option<&FilterList>, neighbor: Option<&Neighbor>) -> bool {
    match list {
        None => true,
        Some(list) if list.is_empty() => true,
        Some(list) => neighbor.is_some_and(|n| list.contains(FilterKey::Neighbor(n))),
    }
}

impl DebugRegistry {
    fn per_neighbor(
        &self,
        category: Category,
        flag: DebugFlags,
        list: ListId,
        neighbor: Option<&Neighbor>,
    ) -> bool {
        self.session_enabled(category, flag) && matches_neighbor_filter(self.list(list), neighbor)
    }

    fn per_prefix(
        &self,
        category: Category,
        flag: DebugFlags,
        list: ListId,
        prefix: Option<&IpPrefix>,
    ) -> bool {
        self.session_enabled(category, flag) && matches_prefix_filter(self.list(list), prefix)
    }

    /// Should a neighbor state change or NOTIFICATION be traced?
    #[inline]
    pub fn should_trace_neighbor_event(&self, neighbor: Option<&Neighbor>) -> bool {
        self.per_neighbor(
            Category::NeighborEvents,
            DebugFlags::NEIGHBOR_EVENTS,
            ListId::NeighborEvents,
            neighbor,
        )
    }

    #[inline]
    pub fn should_trace_keepalive(&self, neighbor: Option<&Neighbor>) -> bool {
        self.per_neighbor(
            Category::Keepalive,
            DebugFlags::KEEPALIVE,
            ListId::Keepalive,
            neighbor,
        )
    }

    /// Should an UPDATE be traced?
    ///
    /// True when the direction's flag is on and the neighbor passes that
    /// direction's list, or when per-prefix update debugging is on and the
    /// prefix passes the prefix list.
    pub fn should_trace_update(
        &self,
        neighbor: Option<&Neighbor>,
        prefix: Option<&IpPrefix>,
        direction: Direction,
    ) -> bool {
        self.per_neighbor(
            Category::Update,
            direction.update_flag(),
            direction.update_list(),
            neighbor,
        ) || self.per_prefix(
            Category::Update,
            DebugFlags::UPDATE_PREFIX,
            ListId::UpdatePrefix,
            prefix,
        )
    }

    /// Should a route sent to or received from zebra be traced?
    #[inline]
    pub fn should_trace_zebra(&self, prefix: Option<&IpPrefix>) -> bool {
        self.per_prefix(Category::Zebra, DebugFlags::ZEBRA, ListId::Zebra, prefix)
    }

    #[inline]
    pub fn should_trace_as4(&self) -> bool {
        self.session_enabled(Category::As4, DebugFlags::AS4)
    }

    #[inline]
    pub fn should_trace_as4_segment(&self) -> bool {
        self.session_enabled(Category::As4, DebugFlags::AS4_SEGMENT)
    }

    #[inline]
    pub fn should_trace_nht(&self) -> bool {
        self.session_enabled(Category::Nht, DebugFlags::NHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterEntry;
    use crate::neighbor::NeighborRef;
    use std::sync::Arc;

    fn neighbor(addr: &str) -> NeighborRef {
        Arc::new(Neighbor::with_address(addr.parse().unwrap()))
    }

    fn prefix(s: &str) -> IpPrefix {
        s.parse().unwrap()
    }

    #[test]
    fn test_prefix_filter_empty_list_matches_all() {
        let empty = FilterList::new();
        assert!(matches_prefix_filter(None, None));
        assert!(matches_prefix_filter(Some(&empty), None));
        assert!(matches_prefix_filter(Some(&empty), Some(&prefix("1.2.3.0/24"))));
    }

    #[test]
    fn test_prefix_filter_exact_length() {
        let mut list = FilterList::new();
        list.add(FilterEntry::prefix(prefix("10.0.0.0/8")));

        assert!(matches_prefix_filter(Some(&list), Some(&prefix("10.0.0.0/8"))));
        assert!(!matches_prefix_filter(Some(&list), Some(&prefix("10.1.0.0/16"))));
        assert!(!matches_prefix_filter(Some(&list), Some(&prefix("10.0.0.0/9"))));
        assert!(!matches_prefix_filter(Some(&list), Some(&prefix("11.0.0.0/8"))));
        assert!(!matches_prefix_filter(Some(&list), None));
    }

    #[test]
    fn test_neighbor_filter() {
        let a = neighbor("10.0.0.1");
        let b = neighbor("10.0.0.2");
        let mut list = FilterList::new();
        assert!(matches_neighbor_filter(Some(&list), Some(&*b)));

        list.add(FilterEntry::neighbor(&a));
        assert!(matches_neighbor_filter(Some(&list), Some(&*a)));
        assert!(!matches_neighbor_filter(Some(&list), Some(&*b)));
        assert!(!matches_neighbor_filter(Some(&list), None));
    }

    #[test]
    fn test_flag_required() {
        let reg = DebugRegistry::new();
        let a = neighbor("10.0.0.1");
        assert!(!reg.should_trace_neighbor_event(Some(&*a)));
        assert!(!reg.should_trace_keepalive(Some(&*a)));
        assert!(!reg.should_trace_update(Some(&*a), None, Direction::Inbound));
        assert!(!reg.should_trace_zebra(None));
        assert!(!reg.should_trace_as4());
        assert!(!reg.should_trace_nht());
    }

    #[test]
    fn test_config_scope_does_not_gate() {
        let mut reg = DebugRegistry::new();
        reg.enable_config(Category::Keepalive, DebugFlags::KEEPALIVE);
        assert!(!reg.should_trace_keepalive(None));

        reg.enable_session(Category::Keepalive, DebugFlags::KEEPALIVE);
        assert!(reg.should_trace_keepalive(None));
    }

    #[test]
    fn test_neighbor_events_with_list() {
        let mut reg = DebugRegistry::new();
        let a = neighbor("10.0.0.1");
        let b = neighbor("10.0.0.2");

        reg.enable_session(Category::NeighborEvents, DebugFlags::NEIGHBOR_EVENTS);
        assert!(reg.should_trace_neighbor_event(Some(&*b)));
        assert!(reg.should_trace_neighbor_event(None));

        reg.list_mut(ListId::NeighborEvents)
            .add(FilterEntry::neighbor(&a));
        assert!(reg.should_trace_neighbor_event(Some(&*a)));
        assert!(!reg.should_trace_neighbor_event(Some(&*b)));
        assert!(!reg.should_trace_neighbor_event(None));
    }

    #[test]
    fn test_update_direction_lists_are_separate() {
        let mut reg = DebugRegistry::new();
        let a = neighbor("10.0.0.1");
        let b = neighbor("10.0.0.2");

        reg.enable_session(Category::Update, DebugFlags::UPDATE_IN | DebugFlags::UPDATE_OUT);
        reg.list_mut(ListId::UpdateIn).add(FilterEntry::neighbor(&a));

        assert!(reg.should_trace_update(Some(&*a), None, Direction::Inbound));
        assert!(!reg.should_trace_update(Some(&*b), None, Direction::Inbound));
        assert!(reg.should_trace_update(Some(&*b), None, Direction::Outbound));
    }

    #[test]
    fn test_update_truth_table() {
        let a = neighbor("10.0.0.1");
        let other = neighbor("10.0.0.2");
        let listed = prefix("10.0.0.0/8");
        let unlisted = prefix("172.16.0.0/12");

        let mut reg = DebugRegistry::new();
        reg.enable_session(Category::Update, DebugFlags::UPDATE_IN | DebugFlags::UPDATE_PREFIX);
        reg.list_mut(ListId::UpdateIn).add(FilterEntry::neighbor(&a));
        reg.list_mut(ListId::UpdatePrefix)
            .add(FilterEntry::prefix(listed));

        let cases = [
            (&a, &listed, true),
            (&a, &unlisted, true),
            (&other, &listed, true),
            (&other, &unlisted, false),
        ];
        for (n, p, expected) in cases {
            assert_eq!(
                reg.should_trace_update(Some(n), Some(p), Direction::Inbound),
                expected,
                "neighbor {} prefix {}",
                n,
                p
            );
        }
    }

    #[test]
    fn test_zebra_prefix() {
        let mut reg = DebugRegistry::new();
        reg.enable_session(Category::Zebra, DebugFlags::ZEBRA);
        assert!(reg.should_trace_zebra(None));

        reg.list_mut(ListId::Zebra)
            .add(FilterEntry::prefix(prefix("2001:db8::/32")));
        assert!(reg.should_trace_zebra(Some(&prefix("2001:db8::/32"))));
        assert!(!reg.should_trace_zebra(Some(&prefix("2001:db8::/48"))));
        assert!(!reg.should_trace_zebra(None));
    }

    #[test]
    fn test_as4_subflags() {
        let mut reg = DebugRegistry::new();
        reg.enable_session(Category::As4, DebugFlags::AS4_SEGMENT);
        assert!(reg.should_trace_as4_segment());
        assert!(!reg.should_trace_as4());
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::Inbound.opposite(), Direction::Outbound);
        assert_eq!(Direction::Outbound.keyword(), "out");
        assert_eq!(Direction::Inbound.to_string(), "inbound");
    }
}
