//! Debug category state.
//!
//! Every category carries two independent bitmasks: the configuration scope,
//! which is written back by `show running-config`, and the session scope,
//! which the trace predicates read. Six filter lists per scope narrow the
//! categories that support per-neighbor or per-prefix tracing.

use bitflags::bitflags;
use tracing::debug;

use crate::filter::FilterList;

bitflags! {
    /// Individual debug flags. Each belongs to exactly one [`Category`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugFlags: u32 {
        const AS4 = 1 << 0;
        const AS4_SEGMENT = 1 << 1;
        const NEIGHBOR_EVENTS = 1 << 2;
        const KEEPALIVE = 1 << 3;
        const UPDATE_IN = 1 << 4;
        const UPDATE_OUT = 1 << 5;
        const UPDATE_PREFIX = 1 << 6;
        const ZEBRA = 1 << 7;
        const NHT = 1 << 8;
    }
}

/// A group of debug flags toggled by one family of commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    As4,
    NeighborEvents,
    Keepalive,
    Update,
    /// Route synchronization with the forwarding backend (zebra).
    Zebra,
    /// Next-hop tracking.
    Nht,
}

impl Category {
    pub const COUNT: usize = 6;

    pub const ALL: [Category; Self::COUNT] = [
        Category::As4,
        Category::NeighborEvents,
        Category::Keepalive,
        Category::Update,
        Category::Zebra,
        Category::Nht,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Returns every flag this category owns.
    pub const fn flags(self) -> DebugFlags {
        match self {
            Category::As4 => DebugFlags::AS4.union(DebugFlags::AS4_SEGMENT),
            Category::NeighborEvents => DebugFlags::NEIGHBOR_EVENTS,
            Category::Keepalive => DebugFlags::KEEPALIVE,
            Category::Update => DebugFlags::UPDATE_IN
                .union(DebugFlags::UPDATE_OUT)
                .union(DebugFlags::UPDATE_PREFIX),
            Category::Zebra => DebugFlags::ZEBRA,
            Category::Nht => DebugFlags::NHT,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Category::As4 => "as4",
            Category::NeighborEvents => "neighbor-events",
            Category::Keepalive => "keepalives",
            Category::Update => "updates",
            Category::Zebra => "zebra",
            Category::Nht => "nht",
        }
    }
}

/// Identifies one of the filter lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListId {
    NeighborEvents,
    Keepalive,
    UpdateIn,
    UpdateOut,
    UpdatePrefix,
    Zebra,
}

impl ListId {
    pub const COUNT: usize = 6;

    pub const ALL: [ListId; Self::COUNT] = [
        ListId::NeighborEvents,
        ListId::Keepalive,
        ListId::UpdateIn,
        ListId::UpdateOut,
        ListId::UpdatePrefix,
        ListId::Zebra,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Which of a category's bitmasks an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Persisted configuration.
    Config,
    /// The running session; what the trace predicates read.
    Session,
}

/// Both bitmasks of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeBits {
    pub config: DebugFlags,
    pub session: DebugFlags,
}

impl Default for ScopeBits {
    fn default() -> Self {
        Self {
            config: DebugFlags::empty(),
            session: DebugFlags::empty(),
        }
    }
}

impl ScopeBits {
    fn get_mut(&mut self, scope: Scope) -> &mut DebugFlags {
        match scope {
            Scope::Config => &mut self.config,
            Scope::Session => &mut self.session,
        }
    }

    fn get(&self, scope: Scope) -> DebugFlags {
        match scope {
            Scope::Config => self.config,
            Scope::Session => self.session,
        }
    }
}

/// Process-wide debug state: scope bits per category and the filter lists.
///
/// Each scope owns its own set of filter lists, so entries added in the
/// running session never leak into the saved configuration and the other
/// way round. The trace predicates read the session lists.
///
/// Created with every bit clear and no lists. One instance lives for the
/// daemon's lifetime; tests create their own.
#[derive(Debug, Default)]
pub struct DebugRegistry {
    scopes: [ScopeBits; Category::COUNT],
    config_lists: [Option<FilterList>; ListId::COUNT],
    session_lists: [Option<FilterList>; ListId::COUNT],
}

impl DebugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `flags` in `scope`. `flags` must belong to `category`.
    pub fn enable(&mut self, scope: Scope, category: Category, flags: DebugFlags) {
        debug_assert!(
            category.flags().contains(flags),
            "{flags:?} is not part of category {category:?}"
        );
        self.scopes[category.index()].get_mut(scope).insert(flags);
        debug!(?scope, category = category.name(), ?flags, "debug flags on");
    }

    /// Clears `flags` in `scope`. `flags` must belong to `category`.
    pub fn disable(&mut self, scope: Scope, category: Category, flags: DebugFlags) {
        debug_assert!(
            category.flags().contains(flags),
            "{flags:?} is not part of category {category:?}"
        );
        self.scopes[category.index()].get_mut(scope).remove(flags);
        debug!(?scope, category = category.name(), ?flags, "debug flags off");
    }

    pub fn enable_config(&mut self, category: Category, flags: DebugFlags) {
        self.enable(Scope::Config, category, flags);
    }

    pub fn disable_config(&mut self, category: Category, flags: DebugFlags) {
        self.disable(Scope::Config, category, flags);
    }

    pub fn enable_session(&mut self, category: Category, flags: DebugFlags) {
        self.enable(Scope::Session, category, flags);
    }

    pub fn disable_session(&mut self, category: Category, flags: DebugFlags) {
        self.disable(Scope::Session, category, flags);
    }

    /// Returns true if any of `flags` is set in `scope`.
    pub fn is_enabled(&self, scope: Scope, category: Category, flags: DebugFlags) -> bool {
        self.scopes[category.index()].get(scope).intersects(flags)
    }

    /// Returns true if any of `flags` is active in the running session.
    #[inline]
    pub fn session_enabled(&self, category: Category, flags: DebugFlags) -> bool {
        self.is_enabled(Scope::Session, category, flags)
    }

    /// Returns true if any of `flags` is part of the saved configuration.
    #[inline]
    pub fn config_enabled(&self, category: Category, flags: DebugFlags) -> bool {
        self.is_enabled(Scope::Config, category, flags)
    }

    pub fn scope_bits(&self, category: Category) -> ScopeBits {
        self.scopes[category.index()]
    }

    fn lists(&self, scope: Scope) -> &[Option<FilterList>; ListId::COUNT] {
        match scope {
            Scope::Config => &self.config_lists,
            Scope::Session => &self.session_lists,
        }
    }

    fn lists_mut(&mut self, scope: Scope) -> &mut [Option<FilterList>; ListId::COUNT] {
        match scope {
            Scope::Config => &mut self.config_lists,
            Scope::Session => &mut self.session_lists,
        }
    }

    /// Returns the `scope` list if it has ever been created.
    pub fn list_in(&self, scope: Scope, id: ListId) -> Option<&FilterList> {
        self.lists(scope)[id.index()].as_ref()
    }

    /// Returns the `scope` list, creating it empty on first use.
    pub fn list_in_mut(&mut self, scope: Scope, id: ListId) -> &mut FilterList {
        self.lists_mut(scope)[id.index()].get_or_insert_with(FilterList::new)
    }

    /// Returns the `scope` list only if it exists and has entries.
    pub fn populated_list_in_mut(&mut self, scope: Scope, id: ListId) -> Option<&mut FilterList> {
        self.lists_mut(scope)[id.index()]
            .as_mut()
            .filter(|l| !l.is_empty())
    }

    /// Releases every entry of one `scope` list.
    pub fn clear_list_in(&mut self, scope: Scope, id: ListId) {
        if let Some(list) = self.lists_mut(scope)[id.index()].as_mut() {
            list.clear();
        }
    }

    /// Session list read by the trace predicates.
    #[inline]
    pub fn list(&self, id: ListId) -> Option<&FilterList> {
        self.list_in(Scope::Session, id)
    }

    pub fn list_mut(&mut self, id: ListId) -> &mut FilterList {
        self.list_in_mut(Scope::Session, id)
    }

    pub fn populated_list_mut(&mut self, id: ListId) -> Option<&mut FilterList> {
        self.populated_list_in_mut(Scope::Session, id)
    }

    pub fn clear_list(&mut self, id: ListId) {
        self.clear_list_in(Scope::Session, id);
    }

    /// Saved configuration list, written back by `write_config`.
    pub fn config_list(&self, id: ListId) -> Option<&FilterList> {
        self.list_in(Scope::Config, id)
    }

    /// Clears every bit in both scopes and releases every filter entry.
    pub fn reset(&mut self) {
        for scope in [Scope::Config, Scope::Session] {
            for id in ListId::ALL {
                self.clear_list_in(scope, id);
            }
        }
        self.scopes = Default::default();
        debug!("all debug state reset");
    }

    /// Returns true if no flag is set in either scope and every list is empty.
    pub fn is_idle(&self) -> bool {
        self.scopes.iter().all(|s| *s == ScopeBits::default())
            && self
                .config_lists
                .iter()
                .chain(self.session_lists.iter())
                .all(|l| l.as_ref().is_none_or(FilterList::is_empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterEntry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_registry_is_idle() {
        let reg = DebugRegistry::new();
        assert!(reg.is_idle());
        for category in Category::ALL {
            assert_eq!(reg.scope_bits(category), ScopeBits::default());
        }
        for id in ListId::ALL {
            assert!(reg.list(id).is_none());
        }
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut reg = DebugRegistry::new();

        reg.enable_session(Category::Keepalive, DebugFlags::KEEPALIVE);
        assert!(reg.session_enabled(Category::Keepalive, DebugFlags::KEEPALIVE));
        assert!(!reg.config_enabled(Category::Keepalive, DebugFlags::KEEPALIVE));

        reg.enable_config(Category::Keepalive, DebugFlags::KEEPALIVE);
        reg.disable_session(Category::Keepalive, DebugFlags::KEEPALIVE);
        assert!(reg.config_enabled(Category::Keepalive, DebugFlags::KEEPALIVE));
        assert!(!reg.session_enabled(Category::Keepalive, DebugFlags::KEEPALIVE));
    }

    #[test]
    fn test_flags_within_category_are_independent() {
        let mut reg = DebugRegistry::new();
        reg.enable_session(Category::As4, DebugFlags::AS4_SEGMENT);

        assert!(reg.session_enabled(Category::As4, DebugFlags::AS4_SEGMENT));
        assert!(!reg.session_enabled(Category::As4, DebugFlags::AS4));

        reg.enable_session(Category::Update, DebugFlags::UPDATE_IN);
        reg.disable_session(Category::Update, DebugFlags::UPDATE_OUT);
        assert!(reg.session_enabled(Category::Update, DebugFlags::UPDATE_IN));
    }

    #[test]
    fn test_category_flags_partition() {
        let mut seen = DebugFlags::empty();
        for category in Category::ALL {
            assert!(!seen.intersects(category.flags()));
            seen |= category.flags();
        }
        assert_eq!(seen, DebugFlags::all());
    }

    #[test]
    fn test_list_created_on_demand() {
        let mut reg = DebugRegistry::new();
        assert!(reg.list(ListId::Zebra).is_none());
        assert!(reg.populated_list_mut(ListId::Zebra).is_none());

        reg.list_mut(ListId::Zebra)
            .add(FilterEntry::prefix("10.0.0.0/8".parse().unwrap()));
        assert_eq!(reg.list(ListId::Zebra).map(FilterList::len), Some(1));
        assert!(reg.populated_list_mut(ListId::Zebra).is_some());

        reg.clear_list(ListId::Zebra);
        assert!(reg.populated_list_mut(ListId::Zebra).is_none());
    }

    #[test]
    fn test_scope_lists_are_separate() {
        let mut reg = DebugRegistry::new();
        reg.list_in_mut(Scope::Config, ListId::Keepalive)
            .add(FilterEntry::prefix("10.0.0.0/8".parse().unwrap()));

        assert!(reg.list(ListId::Keepalive).is_none());
        assert_eq!(reg.config_list(ListId::Keepalive).map(FilterList::len), Some(1));
        assert!(!reg.is_idle());

        reg.clear_list(ListId::Keepalive);
        assert_eq!(reg.config_list(ListId::Keepalive).map(FilterList::len), Some(1));

        reg.reset();
        assert!(reg.is_idle());
    }

    #[test]
    fn test_reset() {
        let mut reg = DebugRegistry::new();
        reg.enable_config(Category::Nht, DebugFlags::NHT);
        reg.enable_session(Category::Update, DebugFlags::UPDATE_PREFIX);
        reg.list_mut(ListId::UpdatePrefix)
            .add(FilterEntry::prefix("10.0.0.0/8".parse().unwrap()));
        assert!(!reg.is_idle());

        reg.reset();
        assert!(reg.is_idle());
        reg.reset();
        assert!(reg.is_idle());
    }
}
