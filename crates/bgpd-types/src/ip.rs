//! IP address and prefix types with safe parsing.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family of an [`IpAddress`] or [`IpPrefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Returns the number of bits in an address of this family.
    pub const fn max_prefix_len(&self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("IPv4"),
            AddressFamily::Ipv6 => f.write_str("IPv6"),
        }
    }
}

/// An IP address that can be either IPv4 or IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpAddress {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl IpAddress {
    /// Returns true if this is an IPv4 address.
    pub const fn is_ipv4(&self) -> bool {
        matches!(self, IpAddress::V4(_))
    }

    /// Returns true if this is an IPv6 address.
    pub const fn is_ipv6(&self) -> bool {
        matches!(self, IpAddress::V6(_))
    }

    pub const fn family(&self) -> AddressFamily {
        match self {
            IpAddress::V4(_) => AddressFamily::Ipv4,
            IpAddress::V6(_) => AddressFamily::Ipv6,
        }
    }

    /// Returns the address bits left-aligned in a `u128`, so that bit 127 is
    /// the first bit on the wire for either family.
    const fn to_bits(self) -> u128 {
        match self {
            IpAddress::V4(addr) => (addr.to_bits() as u128) << 96,
            IpAddress::V6(addr) => addr.to_bits(),
        }
    }

    const fn from_bits(family: AddressFamily, bits: u128) -> Self {
        match family {
            AddressFamily::Ipv4 => IpAddress::V4(Ipv4Addr::from_bits((bits >> 96) as u32)),
            AddressFamily::Ipv6 => IpAddress::V6(Ipv6Addr::from_bits(bits)),
        }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpAddress::V4(addr) => addr.fmt(f),
            IpAddress::V6(addr) => addr.fmt(f),
        }
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpAddr>()
            .map(IpAddress::from)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl From<IpAddr> for IpAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => IpAddress::V4(v4),
            IpAddr::V6(v6) => IpAddress::V6(v6),
        }
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        IpAddress::V4(addr)
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(addr: Ipv6Addr) -> Self {
        IpAddress::V6(addr)
    }
}

impl From<IpAddress> for IpAddr {
    fn from(addr: IpAddress) -> Self {
        match addr {
            IpAddress::V4(v4) => IpAddr::V4(v4),
            IpAddress::V6(v6) => IpAddr::V6(v6),
        }
    }
}

/// Mask selecting the first `len` bits of a left-aligned address.
const fn leading_mask(len: u8) -> u128 {
    if len == 0 {
        0
    } else {
        u128::MAX << (128 - len as u32)
    }
}

/// An IP prefix in CIDR notation (e.g., 10.0.0.0/24 or 2001:db8::/32).
///
/// The address is kept exactly as given; host bits beyond the prefix length
/// are not cleared. All comparisons only look at the leading `prefix_len`
/// bits, so `10.0.0.1/8` and `10.0.0.0/8` denote the same network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpPrefix {
    address: IpAddress,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is invalid for the address type
    /// (>32 for IPv4, >128 for IPv6).
    pub fn new(address: IpAddress, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = address.family().max_prefix_len();

        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Creates a host prefix (/32 or /128) for an address.
    pub const fn host(address: IpAddress) -> Self {
        IpPrefix {
            address,
            prefix_len: address.family().max_prefix_len(),
        }
    }

    /// Returns the address this prefix was created with.
    pub const fn address(&self) -> &IpAddress {
        &self.address
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub const fn family(&self) -> AddressFamily {
        self.address.family()
    }

    /// Returns the prefix with every bit past `prefix_len` cleared.
    pub const fn network(&self) -> IpPrefix {
        let bits = self.address.to_bits() & leading_mask(self.prefix_len);
        IpPrefix {
            address: IpAddress::from_bits(self.family(), bits),
            prefix_len: self.prefix_len,
        }
    }

    /// Returns true if `other` lies inside this prefix: same family, a length
    /// at least as long as ours, and identical leading `prefix_len` bits.
    pub const fn contains(&self, other: &IpPrefix) -> bool {
        if !matches!(
            (self.family(), other.family()),
            (AddressFamily::Ipv4, AddressFamily::Ipv4) | (AddressFamily::Ipv6, AddressFamily::Ipv6)
        ) {
            return false;
        }
        if self.prefix_len > other.prefix_len {
            return false;
        }
        let mask = leading_mask(self.prefix_len);
        (self.address.to_bits() & mask) == (other.address.to_bits() & mask)
    }

    /// Returns true if `other` is this exact network: equal length and equal
    /// leading bits. This is the rule debug prefix filters match with.
    pub const fn matches_exact(&self, other: &IpPrefix) -> bool {
        self.prefix_len == other.prefix_len && self.contains(other)
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    /// Parses `A.B.C.D/M`, `X:X::X:X/M`, or a bare address as a host prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((addr_str, len_str)) = s.rsplit_once('/') else {
            let address: IpAddress = s
                .parse()
                .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;
            return Ok(IpPrefix::host(address));
        };

        let address: IpAddress = addr_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(address, prefix_len)
    }
}
