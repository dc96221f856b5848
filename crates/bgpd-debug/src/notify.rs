//! NOTIFICATION error code decoding.
//!
//! Codes and subcodes are the RFC 4271 values (plus the RFC 4486 cease and
//! dynamic-capability subcodes). Subcode labels carry a leading `/` so that
//! `code` and `subcode` labels can be printed back to back.

use std::fmt::{self, Write as _};

use tracing::info;

use crate::neighbor::Neighbor;
use crate::registry::DebugRegistry;

/// Label for a code missing from the code table.
pub const UNRECOGNIZED_CODE: &str = "Unrecognized Error Code";

/// Label for a subcode missing from its code's subcode table.
pub const UNRECOGNIZED_SUBCODE: &str = "/Unrecognized Error Subcode";

/// NOTIFICATION error codes.
pub mod code {
    pub const HEADER_ERR: u8 = 1;
    pub const OPEN_ERR: u8 = 2;
    pub const UPDATE_ERR: u8 = 3;
    pub const HOLD_ERR: u8 = 4;
    pub const FSM_ERR: u8 = 5;
    pub const CEASE: u8 = 6;
    pub const CAPABILITY_ERR: u8 = 7;
}

/// NOTIFICATION error subcodes, grouped by the code they belong to.
pub mod subcode {
    pub const UNSPECIFIC: u8 = 0;

    pub mod header {
        pub const NOT_SYNC: u8 = 1;
        pub const BAD_MESLEN: u8 = 2;
        pub const BAD_MESTYPE: u8 = 3;
    }

    pub mod open {
        pub const UNSUP_VERSION: u8 = 1;
        pub const BAD_PEER_AS: u8 = 2;
        pub const BAD_BGP_IDENT: u8 = 3;
        pub const UNSUP_PARAM: u8 = 4;
        pub const AUTH_FAILURE: u8 = 5;
        pub const UNACEP_HOLDTIME: u8 = 6;
        pub const UNSUP_CAPBL: u8 = 7;
    }

    pub mod update {
        pub const MAL_ATTR: u8 = 1;
        pub const UNREC_ATTR: u8 = 2;
        pub const MISS_ATTR: u8 = 3;
        pub const ATTR_FLAG_ERR: u8 = 4;
        pub const ATTR_LENG_ERR: u8 = 5;
        pub const INVAL_ORIGIN: u8 = 6;
        pub const AS_ROUTE_LOOP: u8 = 7;
        pub const INVAL_NEXT_HOP: u8 = 8;
        pub const OPT_ATTR_ERR: u8 = 9;
        pub const INVAL_NETWORK: u8 = 10;
        pub const MAL_AS_PATH: u8 = 11;
    }

    pub mod cease {
        pub const MAX_PREFIX: u8 = 1;
        pub const ADMIN_SHUTDOWN: u8 = 2;
        pub const PEER_UNCONFIG: u8 = 3;
        pub const ADMIN_RESET: u8 = 4;
        pub const CONNECT_REJECT: u8 = 5;
        pub const CONFIG_CHANGE: u8 = 6;
        pub const COLLISION_RESOLUTION: u8 = 7;
        pub const OUT_OF_RESOURCE: u8 = 8;
    }

    pub mod capability {
        pub const INVALID_ACTION: u8 = 1;
        pub const INVALID_LENGTH: u8 = 2;
        pub const MALFORMED_CODE: u8 = 3;
    }
}

fn code_label(c: u8) -> Option<&'static str> {
    Some(match c {
        code::HEADER_ERR => "Message Header Error",
        code::OPEN_ERR => "OPEN Message Error",
        code::UPDATE_ERR => "UPDATE Message Error",
        code::HOLD_ERR => "Hold Timer Expired",
        code::FSM_ERR => "Neighbor Events Error",
        code::CEASE => "Cease",
        code::CAPABILITY_ERR => "CAPABILITY Message Error",
        _ => return None,
    })
}

fn header_subcode(s: u8) -> Option<&'static str> {
    use subcode::header::*;
    Some(match s {
        NOT_SYNC => "/Connection Not Synchronized",
        BAD_MESLEN => "/Bad Message Length",
        BAD_MESTYPE => "/Bad Message Type",
        _ => return None,
    })
}

fn open_subcode(s: u8) -> Option<&'static str> {
    use subcode::open::*;
    Some(match s {
        subcode::UNSPECIFIC => "/Unspecific",
        UNSUP_VERSION => "/Unsupported Version Number",
        BAD_PEER_AS => "/Bad Peer AS",
        BAD_BGP_IDENT => "/Bad BGP Identifier",
        UNSUP_PARAM => "/Unsupported Optional Parameter",
        AUTH_FAILURE => "/Authentication Failure",
        UNACEP_HOLDTIME => "/Unacceptable Hold Time",
        UNSUP_CAPBL => "/Unsupported Capability",
        _ => return None,
    })
}

fn update_subcode(s: u8) -> Option<&'static str> {
    use subcode::update::*;
    Some(match s {
        subcode::UNSPECIFIC => "/Unspecific",
        MAL_ATTR => "/Malformed Attribute List",
        UNREC_ATTR => "/Unrecognized Well-known Attribute",
        MISS_ATTR => "/Missing Well-known Attribute",
        ATTR_FLAG_ERR => "/Attribute Flags Error",
        ATTR_LENG_ERR => "/Attribute Length Error",
        INVAL_ORIGIN => "/Invalid ORIGIN Attribute",
        AS_ROUTE_LOOP => "/AS Routing Loop",
        INVAL_NEXT_HOP => "/Invalid NEXT_HOP Attribute",
        OPT_ATTR_ERR => "/Optional Attribute Error",
        INVAL_NETWORK => "/Invalid Network Field",
        MAL_AS_PATH => "/Malformed AS_PATH",
        _ => return None,
    })
}

fn cease_subcode(s: u8) -> Option<&'static str> {
    use subcode::cease::*;
    Some(match s {
        subcode::UNSPECIFIC => "/Unspecific",
        MAX_PREFIX => "/Maximum Number of Prefixes Reached",
        ADMIN_SHUTDOWN => "/Administratively Shutdown",
        PEER_UNCONFIG => "/Peer Unconfigured",
        ADMIN_RESET => "/Administratively Reset",
        CONNECT_REJECT => "/Connection Rejected",
        CONFIG_CHANGE => "/Other Configuration Change",
        COLLISION_RESOLUTION => "/Connection collision resolution",
        OUT_OF_RESOURCE => "/Out of Resource",
        _ => return None,
    })
}

fn capability_subcode(s: u8) -> Option<&'static str> {
    use subcode::capability::*;
    Some(match s {
        subcode::UNSPECIFIC => "/Unspecific",
        INVALID_ACTION => "/Invalid Action Value",
        INVALID_LENGTH => "/Invalid Capability Length",
        MALFORMED_CODE => "/Malformed Capability Value",
        _ => return None,
    })
}

/// Human-readable labels for a (code, subcode) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyLabels {
    pub code: &'static str,
    /// Empty for codes without subcodes, otherwise `/`-prefixed.
    pub subcode: &'static str,
}

impl fmt::Display for NotifyLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.code, self.subcode)
    }
}

/// Decodes a NOTIFICATION code and subcode. Never fails: unknown values map to
/// [`UNRECOGNIZED_CODE`] and [`UNRECOGNIZED_SUBCODE`].
pub fn decode(c: u8, s: u8) -> NotifyLabels {
    let Some(label) = code_label(c) else {
        return NotifyLabels {
            code: UNRECOGNIZED_CODE,
            subcode: "",
        };
    };

    let table: fn(u8) -> Option<&'static str> = match c {
        code::HEADER_ERR => header_subcode,
        code::OPEN_ERR => open_subcode,
        code::UPDATE_ERR => update_subcode,
        code::CEASE => cease_subcode,
        code::CAPABILITY_ERR => capability_subcode,
        // Hold timer expiry and FSM errors carry no subcode.
        _ => {
            return NotifyLabels {
                code: label,
                subcode: "",
            }
        }
    };

    NotifyLabels {
        code: label,
        subcode: table(s).unwrap_or(UNRECOGNIZED_SUBCODE),
    }
}

/// Whether a NOTIFICATION was received from or sent to the neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyDirection {
    Received,
    Sent,
}

impl fmt::Display for NotifyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyDirection::Received => f.write_str("received from"),
            NotifyDirection::Sent => f.write_str("sent to"),
        }
    }
}

/// A NOTIFICATION message as seen by the debug subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub code: u8,
    pub subcode: u8,
    /// Raw data field following the subcode.
    pub data: Vec<u8>,
}

impl Notification {
    pub fn new(code: u8, subcode: u8) -> Self {
        Self {
            code,
            subcode,
            data: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    pub fn labels(&self) -> NotifyLabels {
        decode(self.code, self.subcode)
    }

    /// The data field as space separated hex octets.
    pub fn data_hex(&self) -> String {
        let mut out = String::with_capacity(self.data.len() * 3);
        for (i, byte) in self.data.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

/// Formats the NOTIFICATION trace line.
pub fn format_notification(
    neighbor: &Neighbor,
    notify: &Notification,
    direction: NotifyDirection,
) -> String {
    format!(
        "%NOTIFICATION: {} neighbor {} {}/{} ({}) {} bytes {}",
        direction,
        neighbor.host(),
        notify.code,
        notify.subcode,
        notify.labels(),
        notify.data.len(),
        notify.data_hex()
    )
}

impl DebugRegistry {
    /// Logs a NOTIFICATION when neighbor-events debugging covers `neighbor`
    /// or the instance logs all neighbor changes.
    ///
    /// Returns the emitted line.
    pub fn log_notification(
        &self,
        neighbor: &Neighbor,
        notify: &Notification,
        direction: NotifyDirection,
        log_neighbor_changes: bool,
    ) -> Option<String> {
        if !(log_neighbor_changes || self.should_trace_neighbor_event(Some(neighbor))) {
            return None;
        }
        let line = format_notification(neighbor, notify, direction);
        info!(target: "bgpd::debug", "{}", line);
        Some(line)
    }
}
