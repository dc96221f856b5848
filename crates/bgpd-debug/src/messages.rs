//! Display names for protocol values that appear in trace lines.

use std::fmt;

/// Neighbor finite-state-machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsmState {
    Idle,
    Connect,
    Active,
    OpenSent,
    OpenConfirm,
    Established,
    Clearing,
    Deleted,
}

impl FsmState {
    pub const fn name(self) -> &'static str {
        match self {
            FsmState::Idle => "Idle",
            FsmState::Connect => "Connect",
            FsmState::Active => "Active",
            FsmState::OpenSent => "OpenSent",
            FsmState::OpenConfirm => "OpenConfirm",
            FsmState::Established => "Established",
            FsmState::Clearing => "Clearing",
            FsmState::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for FsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FsmState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            FsmState::Idle,
            FsmState::Connect,
            FsmState::Active,
            FsmState::OpenSent,
            FsmState::OpenConfirm,
            FsmState::Established,
            FsmState::Clearing,
            FsmState::Deleted,
        ]
        .into_iter()
        .find(|state| state.name().eq_ignore_ascii_case(s))
        .ok_or(())
    }
}

/// BGP message types by their header type octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Open = 1,
    Update = 2,
    Notification = 3,
    Keepalive = 4,
    RouteRefresh = 5,
    Capability = 6,
}

impl MessageType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(MessageType::Open),
            2 => Some(MessageType::Update),
            3 => Some(MessageType::Notification),
            4 => Some(MessageType::Keepalive),
            5 => Some(MessageType::RouteRefresh),
            6 => Some(MessageType::Capability),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MessageType::Open => "OPEN",
            MessageType::Update => "UPDATE",
            MessageType::Notification => "NOTIFICATION",
            MessageType::Keepalive => "KEEPALIVE",
            MessageType::RouteRefresh => "ROUTE-REFRESH",
            MessageType::Capability => "CAPABILITY",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// ORIGIN path attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Igp,
    Egp,
    Incomplete,
}

impl Origin {
    /// Single character form used in attribute dumps.
    pub const fn short_name(self) -> &'static str {
        match self {
            Origin::Igp => "i",
            Origin::Egp => "e",
            Origin::Incomplete => "?",
        }
    }

    pub const fn long_name(self) -> &'static str {
        match self {
            Origin::Igp => "IGP",
            Origin::Egp => "EGP",
            Origin::Incomplete => "incomplete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fsm_state_names() {
        assert_eq!(FsmState::OpenConfirm.to_string(), "OpenConfirm");
        assert_eq!("established".parse::<FsmState>(), Ok(FsmState::Established));
        assert!("Bogus".parse::<FsmState>().is_err());
    }

    #[test]
    fn test_message_type() {
        assert_eq!(MessageType::from_u8(5), Some(MessageType::RouteRefresh));
        assert_eq!(MessageType::RouteRefresh.to_string(), "ROUTE-REFRESH");
        assert_eq!(MessageType::from_u8(0), None);
        assert_eq!(MessageType::from_u8(7), None);
    }

    #[test]
    fn test_origin_names() {
        assert_eq!(Origin::Incomplete.short_name(), "?");
        assert_eq!(Origin::Egp.long_name(), "EGP");
    }
}
