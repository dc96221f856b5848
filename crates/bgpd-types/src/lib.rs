//! Network primitives shared by the BGP daemon components.
//!
//! - [`IpAddress`]: IPv4 and IPv6 addresses
//! - [`IpPrefix`]: IP network prefixes (CIDR notation) with the bit-level
//!   matching used by prefix filters
//! - [`AddressFamily`]: the address family of either of the above

mod ip;

pub use ip::{AddressFamily, IpAddress, IpPrefix};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),
}
