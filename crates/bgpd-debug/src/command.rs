//! `debug bgp ...` commands.
//!
//! Commands entered in the configuration node are part of the saved
//! configuration: they switch a flag in both scopes and print no confirmation.
//! Commands entered in the enable node only touch the running session and
//! confirm what they did. Operator input errors abort a command before it
//! changes anything and come back as a warning.

use std::fmt;
use std::str::FromStr;

use bgpd_types::IpPrefix;
use tracing::{instrument, warn};

use crate::error::{DebugError, DebugResult};
use crate::filter::{FilterEntry, FilterKey};
use crate::gate::Direction;
use crate::neighbor::{resolve_neighbor, NeighborDirectory, NeighborRef};
use crate::registry::{Category, DebugFlags, DebugRegistry, ListId, Scope};
use crate::show::show_debugging;

/// CLI node a command is executed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandNode {
    /// Declarative configuration (`configure terminal`, config file replay).
    Config,
    /// Interactive operator session.
    Enable,
}

/// What a `debug bgp` / `no debug bgp` command applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugTarget {
    As4,
    As4Segment,
    NeighborEvents(Option<String>),
    Keepalives(Option<String>),
    /// Both update directions.
    Updates,
    UpdatesDirection(Direction, Option<String>),
    UpdatesPrefix(String),
    Zebra,
    ZebraPrefix(String),
    Nht,
}

impl DebugTarget {
    fn parse(tokens: &[&str]) -> Option<Self> {
        let peer = |p: &&str| Some(p.to_string());
        let target = match tokens {
            ["as4"] => DebugTarget::As4,
            ["as4", "segment"] => DebugTarget::As4Segment,
            ["neighbor-events"] => DebugTarget::NeighborEvents(None),
            ["neighbor-events", p] => DebugTarget::NeighborEvents(peer(p)),
            ["keepalives"] => DebugTarget::Keepalives(None),
            ["keepalives", p] => DebugTarget::Keepalives(peer(p)),
            ["updates"] => DebugTarget::Updates,
            ["updates", "prefix", p] => DebugTarget::UpdatesPrefix(p.to_string()),
            ["updates", dir @ ("in" | "out")] => {
                DebugTarget::UpdatesDirection(parse_direction(dir), None)
            }
            ["updates", dir @ ("in" | "out"), p] => {
                DebugTarget::UpdatesDirection(parse_direction(dir), peer(p))
            }
            ["zebra"] => DebugTarget::Zebra,
            ["zebra", "prefix", p] => DebugTarget::ZebraPrefix(p.to_string()),
            ["nht"] => DebugTarget::Nht,
            _ => return None,
        };
        Some(target)
    }
}

fn parse_direction(token: &str) -> Direction {
    if token.starts_with('i') {
        Direction::Inbound
    } else {
        Direction::Outbound
    }
}

fn write_with_peer(f: &mut fmt::Formatter<'_>, base: &str, peer: Option<&str>) -> fmt::Result {
    match peer {
        Some(p) => write!(f, "{base} {p}"),
        None => f.write_str(base),
    }
}

impl fmt::Display for DebugTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugTarget::As4 => f.write_str("as4"),
            DebugTarget::As4Segment => f.write_str("as4 segment"),
            DebugTarget::NeighborEvents(peer) => {
                write_with_peer(f, "neighbor-events", peer.as_deref())
            }
            DebugTarget::Keepalives(peer) => write_with_peer(f, "keepalives", peer.as_deref()),
            DebugTarget::Updates => f.write_str("updates"),
            DebugTarget::UpdatesDirection(dir, peer) => {
                write_with_peer(f, &format!("updates {}", dir.keyword()), peer.as_deref())
            }
            DebugTarget::UpdatesPrefix(p) => write!(f, "updates prefix {p}"),
            DebugTarget::Zebra => f.write_str("zebra"),
            DebugTarget::ZebraPrefix(p) => write!(f, "zebra prefix {p}"),
            DebugTarget::Nht => f.write_str("nht"),
        }
    }
}

/// A debug command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Debug(DebugTarget),
    NoDebug(DebugTarget),
    /// `no debug bgp`: everything off in both scopes, every filter released.
    NoDebugAll,
    /// `show debugging bgp`
    ShowDebugging,
}

impl FromStr for Command {
    type Err = DebugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let command = match tokens.as_slice() {
            ["debug", "bgp", rest @ ..] => DebugTarget::parse(rest).map(Command::Debug),
            ["no", "debug", "bgp"] => Some(Command::NoDebugAll),
            ["no", "debug", "bgp", rest @ ..] => DebugTarget::parse(rest).map(Command::NoDebug),
            ["show", "debugging", "bgp"] | ["show", "debugging"] => Some(Command::ShowDebugging),
            _ => None,
        };
        command.ok_or_else(|| DebugError::unknown_command(s.trim()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Debug(target) => write!(f, "debug bgp {target}"),
            Command::NoDebug(target) => write!(f, "no debug bgp {target}"),
            Command::NoDebugAll => f.write_str("no debug bgp"),
            Command::ShowDebugging => f.write_str("show debugging bgp"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// Rejected operator input; nothing was changed.
    Warning,
}

/// Result of a command: its status and the lines to print on the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub lines: Vec<String>,
}

impl CommandOutput {
    fn success(lines: Vec<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            lines,
        }
    }

    fn warning(line: String) -> Self {
        Self {
            status: CommandStatus::Warning,
            lines: vec![line],
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

/// Executes `command` against `registry`.
#[instrument(skip(registry, directory), fields(command = %command))]
pub fn execute(
    registry: &mut DebugRegistry,
    directory: &dyn NeighborDirectory,
    node: CommandNode,
    command: &Command,
) -> CommandOutput {
    let mut handler = Handler {
        registry,
        directory,
        node,
        lines: Vec::new(),
    };
    match handler.dispatch(command) {
        Ok(()) => CommandOutput::success(handler.lines),
        Err(e) => {
            warn!(error = %e, "debug command rejected");
            CommandOutput::warning(e.to_string())
        }
    }
}

/// Parses and executes one command line.
pub fn execute_line(
    registry: &mut DebugRegistry,
    directory: &dyn NeighborDirectory,
    node: CommandNode,
    line: &str,
) -> CommandOutput {
    match line.parse::<Command>() {
        Ok(command) => execute(registry, directory, node, &command),
        Err(e) => {
            warn!(error = %e, "debug command rejected");
            CommandOutput::warning(e.to_string())
        }
    }
}

fn parse_prefix(input: &str) -> DebugResult<IpPrefix> {
    input
        .parse()
        .map_err(|_| DebugError::malformed_prefix(input))
}

/// Outcome of removing one entry from a filter list.
struct Removal {
    found: bool,
    /// The removal left a list empty and its flag was switched off.
    emptied: bool,
}

/// A filter list together with the flag it gates.
#[derive(Clone, Copy)]
struct FilterSlot {
    list: ListId,
    category: Category,
    flag: DebugFlags,
}

impl FilterSlot {
    const NEIGHBOR_EVENTS: Self = Self::new(
        ListId::NeighborEvents,
        Category::NeighborEvents,
        DebugFlags::NEIGHBOR_EVENTS,
    );
    const KEEPALIVE: Self = Self::new(ListId::Keepalive, Category::Keepalive, DebugFlags::KEEPALIVE);
    const UPDATE_PREFIX: Self = Self::new(
        ListId::UpdatePrefix,
        Category::Update,
        DebugFlags::UPDATE_PREFIX,
    );
    const ZEBRA: Self = Self::new(ListId::Zebra, Category::Zebra, DebugFlags::ZEBRA);

    const fn new(list: ListId, category: Category, flag: DebugFlags) -> Self {
        Self {
            list,
            category,
            flag,
        }
    }

    fn update(dir: Direction) -> Self {
        Self::new(dir.update_list(), Category::Update, dir.update_flag())
    }
}

struct Handler<'a> {
    registry: &'a mut DebugRegistry,
    directory: &'a dyn NeighborDirectory,
    node: CommandNode,
    lines: Vec<String>,
}

impl Handler<'_> {
    fn dispatch(&mut self, command: &Command) -> DebugResult<()> {
        match command {
            Command::Debug(target) => self.debug(target),
            Command::NoDebug(target) => self.no_debug(target),
            Command::NoDebugAll => {
                self.registry.reset();
                self.confirm("All possible debugging has been turned off".to_string());
                Ok(())
            }
            Command::ShowDebugging => {
                self.lines.extend(show_debugging(self.registry));
                Ok(())
            }
        }
    }

    fn debug(&mut self, target: &DebugTarget) -> DebugResult<()> {
        match target {
            DebugTarget::As4 => self.flag_on(Category::As4, DebugFlags::AS4, "as4"),
            DebugTarget::As4Segment => {
                self.flag_on(Category::As4, DebugFlags::AS4_SEGMENT, "as4 segment")
            }
            DebugTarget::NeighborEvents(None) => self.flag_on(
                Category::NeighborEvents,
                DebugFlags::NEIGHBOR_EVENTS,
                "neighbor-events",
            ),
            DebugTarget::NeighborEvents(Some(token)) => {
                let neighbor = self.neighbor(token)?;
                self.add_neighbor(
                    FilterSlot::NEIGHBOR_EVENTS,
                    &neighbor,
                    "neighbor-events",
                    "neighbor-events",
                    token,
                );
            }
            DebugTarget::Keepalives(None) => {
                self.flag_on(Category::Keepalive, DebugFlags::KEEPALIVE, "keepalives")
            }
            DebugTarget::Keepalives(Some(token)) => {
                let neighbor = self.neighbor(token)?;
                self.add_neighbor(
                    FilterSlot::KEEPALIVE,
                    &neighbor,
                    "keepalive",
                    "keepalives",
                    token,
                );
            }
            DebugTarget::Updates => self.flag_on(
                Category::Update,
                DebugFlags::UPDATE_IN | DebugFlags::UPDATE_OUT,
                "updates",
            ),
            DebugTarget::UpdatesDirection(dir, token) => {
                self.updates_direction(*dir, token.as_deref())?
            }
            DebugTarget::UpdatesPrefix(input) => {
                let prefix = parse_prefix(input)?;
                self.add_prefix(FilterSlot::UPDATE_PREFIX, "updates", prefix, input);
            }
            DebugTarget::Zebra => self.flag_on(Category::Zebra, DebugFlags::ZEBRA, "zebra"),
            DebugTarget::ZebraPrefix(input) => {
                let prefix = parse_prefix(input)?;
                self.add_prefix(FilterSlot::ZEBRA, "zebra", prefix, input);
            }
            DebugTarget::Nht => self.flag_on(Category::Nht, DebugFlags::NHT, "nexthop tracking"),
        }
        Ok(())
    }

    fn no_debug(&mut self, target: &DebugTarget) -> DebugResult<()> {
        match target {
            DebugTarget::As4 => self.flag_off(Category::As4, DebugFlags::AS4, "as4"),
            DebugTarget::As4Segment => {
                self.flag_off(Category::As4, DebugFlags::AS4_SEGMENT, "as4 segment")
            }
            DebugTarget::NeighborEvents(None) => {
                self.clear(ListId::NeighborEvents);
                self.flag_off(
                    Category::NeighborEvents,
                    DebugFlags::NEIGHBOR_EVENTS,
                    "neighbor-events",
                );
            }
            DebugTarget::NeighborEvents(Some(token)) => {
                let neighbor = self.neighbor(token)?;
                let removal =
                    self.remove_entry(FilterSlot::NEIGHBOR_EVENTS, FilterKey::Neighbor(&neighbor));
                self.report_removal(removal.found, "BGP neighbor-events debugging", token);
            }
            DebugTarget::Keepalives(None) => {
                self.clear(ListId::Keepalive);
                self.flag_off(Category::Keepalive, DebugFlags::KEEPALIVE, "keepalives");
            }
            DebugTarget::Keepalives(Some(token)) => {
                let neighbor = self.neighbor(token)?;
                let removal =
                    self.remove_entry(FilterSlot::KEEPALIVE, FilterKey::Neighbor(&neighbor));
                self.report_removal(removal.found, "BGP keepalives debugging", token);
            }
            DebugTarget::Updates => {
                self.clear(ListId::UpdateIn);
                self.clear(ListId::UpdateOut);
                self.clear(ListId::UpdatePrefix);
                self.flag_off(
                    Category::Update,
                    DebugFlags::UPDATE_IN | DebugFlags::UPDATE_OUT | DebugFlags::UPDATE_PREFIX,
                    "updates",
                );
            }
            DebugTarget::UpdatesDirection(dir, None) => {
                self.clear(dir.update_list());
                self.off(Category::Update, dir.update_flag());
                self.confirm(format!("BGP updates debugging ({dir}) is off"));
            }
            DebugTarget::UpdatesDirection(dir, Some(token)) => {
                let neighbor = self.neighbor(token)?;
                let removal =
                    self.remove_entry(FilterSlot::update(*dir), FilterKey::Neighbor(&neighbor));
                if removal.emptied {
                    self.confirm(format!("BGP updates debugging ({dir}) is off"));
                }
                self.report_removal(
                    removal.found,
                    &format!("BGP updates debugging ({dir})"),
                    token,
                );
            }
            DebugTarget::UpdatesPrefix(input) => {
                let prefix = parse_prefix(input)?;
                let removal =
                    self.remove_entry(FilterSlot::UPDATE_PREFIX, FilterKey::Prefix(&prefix));
                if removal.emptied {
                    self.confirm("BGP updates debugging (per prefix) is off".to_string());
                }
                self.report_removal(removal.found, "BGP updates debugging", input);
            }
            DebugTarget::Zebra => {
                self.clear(ListId::Zebra);
                self.flag_off(Category::Zebra, DebugFlags::ZEBRA, "zebra");
            }
            DebugTarget::ZebraPrefix(input) => {
                let prefix = parse_prefix(input)?;
                let removal = self.remove_entry(FilterSlot::ZEBRA, FilterKey::Prefix(&prefix));
                if removal.emptied {
                    self.confirm("BGP zebra debugging is off".to_string());
                }
                self.report_removal(removal.found, "BGP zebra debugging", input);
            }
            DebugTarget::Nht => self.flag_off(Category::Nht, DebugFlags::NHT, "nexthop tracking"),
        }
        Ok(())
    }

    /// Scopes written by a command from this node.
    fn scopes(&self) -> &'static [Scope] {
        match self.node {
            CommandNode::Config => &[Scope::Config, Scope::Session],
            CommandNode::Enable => &[Scope::Session],
        }
    }

    fn on(&mut self, category: Category, flags: DebugFlags) {
        for &scope in self.scopes() {
            self.registry.enable(scope, category, flags);
        }
    }

    fn off(&mut self, category: Category, flags: DebugFlags) {
        for &scope in self.scopes() {
            self.registry.disable(scope, category, flags);
        }
    }

    fn clear(&mut self, list: ListId) {
        for &scope in self.scopes() {
            self.registry.clear_list_in(scope, list);
        }
    }

    /// True when every scope this node writes already holds `key`.
    fn holds(&self, list: ListId, key: FilterKey<'_>) -> bool {
        self.scopes().iter().all(|&scope| {
            self.registry
                .list_in(scope, list)
                .is_some_and(|l| l.contains(key))
        })
    }

    /// Adds `entry` to each written scope list and sets the flag there.
    fn insert(&mut self, slot: FilterSlot, entry: FilterEntry) {
        for &scope in self.scopes() {
            self.registry
                .list_in_mut(scope, slot.list)
                .add(entry.clone());
            self.registry.enable(scope, slot.category, slot.flag);
        }
    }

    /// Confirmation printed in the enable node only.
    fn confirm(&mut self, line: String) {
        if self.node == CommandNode::Enable {
            self.lines.push(line);
        }
    }

    /// Informational line printed in either node.
    fn inform(&mut self, line: String) {
        self.lines.push(line);
    }

    fn neighbor(&self, token: &str) -> DebugResult<NeighborRef> {
        resolve_neighbor(self.directory, token)
    }

    fn flag_on(&mut self, category: Category, flags: DebugFlags, label: &str) {
        self.on(category, flags);
        self.confirm(format!("BGP {label} debugging is on"));
    }

    fn flag_off(&mut self, category: Category, flags: DebugFlags, label: &str) {
        self.off(category, flags);
        self.confirm(format!("BGP {label} debugging is off"));
    }

    fn add_neighbor(
        &mut self,
        slot: FilterSlot,
        neighbor: &NeighborRef,
        duplicate_label: &str,
        label: &str,
        token: &str,
    ) {
        if self.holds(slot.list, FilterKey::Neighbor(neighbor)) {
            self.inform(format!(
                "BGP {duplicate_label} debugging is already enabled for {}",
                neighbor.host()
            ));
            return;
        }
        self.insert(slot, FilterEntry::neighbor(neighbor));
        self.confirm(format!("BGP {label} debugging is on for {token}"));
    }

    /// A direction is exclusive: the opposite one is switched off even when
    /// the peer is already in this direction's list.
    fn updates_direction(&mut self, dir: Direction, token: Option<&str>) -> DebugResult<()> {
        let neighbor = token.map(|t| self.neighbor(t)).transpose()?;

        self.off(Category::Update, dir.opposite().update_flag());
        self.on(Category::Update, dir.update_flag());

        if let Some(neighbor) = &neighbor {
            if self.holds(dir.update_list(), FilterKey::Neighbor(neighbor)) {
                self.inform(format!(
                    "BGP {dir} update debugging is already enabled for {}",
                    neighbor.host()
                ));
                return Ok(());
            }
            self.insert(FilterSlot::update(dir), FilterEntry::neighbor(neighbor));
        }

        match token {
            Some(token) => self.confirm(format!("BGP updates debugging is on ({dir}) for {token}")),
            None => self.confirm(format!("BGP updates debugging is on ({dir})")),
        }
        Ok(())
    }

    fn add_prefix(&mut self, slot: FilterSlot, label: &str, prefix: IpPrefix, input: &str) {
        if self.holds(slot.list, FilterKey::Prefix(&prefix)) {
            self.inform(format!(
                "BGP {label} debugging is already enabled for {input}"
            ));
            return;
        }
        self.insert(slot, FilterEntry::prefix(prefix));
        self.confirm(format!("BGP {label} debugging is on for {input}"));
    }

    /// Removes one entry from each written scope; a scope whose list ends up
    /// empty has the flag switched off. Lists that were already empty are
    /// left alone.
    fn remove_entry(&mut self, slot: FilterSlot, key: FilterKey<'_>) -> Removal {
        let mut removal = Removal {
            found: false,
            emptied: false,
        };
        for &scope in self.scopes() {
            let Some(entries) = self.registry.populated_list_in_mut(scope, slot.list) else {
                continue;
            };
            removal.found |= entries.remove(key);
            if entries.is_empty() {
                self.registry.disable(scope, slot.category, slot.flag);
                removal.emptied = true;
            }
        }
        removal
    }

    fn report_removal(&mut self, found: bool, subject: &str, what: &str) {
        if found {
            self.inform(format!("{subject} is off for {what}"));
        } else {
            self.inform(format!("{subject} was not enabled for {what}"));
        }
    }
}
