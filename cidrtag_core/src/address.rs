//! Address model: fixed-width bit pattern plus significant prefix length.

use crate::constants::{V4_WIDTH, V6_WIDTH};
use crate::helpers::KeyBits;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

/// Failures raised while building an address from text or raw parts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address syntax: {0:?}")]
    InvalidSyntax(String),

    #[error("prefix length {length} exceeds {width}-bit address width")]
    PrefixTooLong { length: u8, width: u8 },

    #[error("address family does not match the requested width")]
    FamilyMismatch,
}

/// What the tree needs from an address type.
pub trait Address: Copy + fmt::Debug {
    type Bits: KeyBits;

    /// Left-aligned bit pattern.
    fn bits(&self) -> Self::Bits;

    /// Number of leading significant bits.
    fn prefix_len(&self) -> u8;

    fn from_parts(bits: Self::Bits, prefix_len: u8) -> Self;

    #[inline]
    fn width() -> u8 {
        <Self::Bits as KeyBits>::WIDTH
    }
}

/// IPv4 address or prefix. `length` 0 is the default route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IPv4Address {
    pub address: u32,
    pub length: u8,
}

/// IPv6 address or prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IPv6Address {
    pub address: u128,
    pub length: u8,
}

impl IPv4Address {
    /// Unchecked constructor; lengths past 32 are rejected by the tree.
    pub const fn new(address: u32, length: u8) -> Self {
        Self { address, length }
    }

    pub fn try_new(address: u32, length: u8) -> Result<Self, AddressError> {
        if length > V4_WIDTH {
            return Err(AddressError::PrefixTooLong { length, width: V4_WIDTH });
        }
        Ok(Self::new(address, length))
    }

    pub fn from_octets(octets: [u8; 4], length: u8) -> Self {
        Self::new(u32::from_be_bytes(octets), length)
    }

    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }
}

impl IPv6Address {
    pub const fn new(address: u128, length: u8) -> Self {
        Self { address, length }
    }

    pub fn try_new(address: u128, length: u8) -> Result<Self, AddressError> {
        if length > V6_WIDTH {
            return Err(AddressError::PrefixTooLong { length, width: V6_WIDTH });
        }
        Ok(Self::new(address, length))
    }

    pub fn ip(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.address)
    }
}

impl Address for IPv4Address {
    type Bits = u32;

    #[inline]
    fn bits(&self) -> u32 {
        self.address
    }

    #[inline]
    fn prefix_len(&self) -> u8 {
        self.length
    }

    #[inline]
    fn from_parts(bits: u32, prefix_len: u8) -> Self {
        Self::new(bits, prefix_len)
    }
}

impl Address for IPv6Address {
    type Bits = u128;

    #[inline]
    fn bits(&self) -> u128 {
        self.address
    }

    #[inline]
    fn prefix_len(&self) -> u8 {
        self.length
    }

    #[inline]
    fn from_parts(bits: u128, prefix_len: u8) -> Self {
        Self::new(bits, prefix_len)
    }
}

impl From<Ipv4Addr> for IPv4Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self::new(u32::from(ip), V4_WIDTH)
    }
}

impl From<Ipv4Net> for IPv4Address {
    fn from(net: Ipv4Net) -> Self {
        Self::new(u32::from(net.network()), net.prefix_len())
    }
}

impl From<Ipv6Addr> for IPv6Address {
    fn from(ip: Ipv6Addr) -> Self {
        Self::new(u128::from(ip), V6_WIDTH)
    }
}

impl From<Ipv6Net> for IPv6Address {
    fn from(net: Ipv6Net) -> Self {
        Self::new(u128::from(net.network()), net.prefix_len())
    }
}

impl fmt::Display for IPv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip(), self.length)
    }
}

impl fmt::Display for IPv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip(), self.length)
    }
}

/// Result of parsing text of either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedAddress {
    V4(IPv4Address),
    V6(IPv6Address),
}

/// Parse `a.b.c.d`, `a.b.c.d/n`, `x:y::z` or `x:y::z/n`.
///
/// A bare address is a host route (full width). Host bits past the prefix
/// length are kept as written; the tree ignores them.
pub fn parse_ip_from_string(s: &str) -> Result<ParsedAddress, AddressError> {
    let s = s.trim();
    let (ip_part, len_part) = match s.split_once('/') {
        Some((ip, len)) => (ip, Some(len)),
        None => (s, None),
    };
    let ip: IpAddr = ip_part
        .parse()
        .map_err(|_| AddressError::InvalidSyntax(s.to_string()))?;
    let width = if ip.is_ipv4() { V4_WIDTH } else { V6_WIDTH };
    let length = match len_part {
        None => width,
        Some(len) => len
            .parse::<u8>()
            .map_err(|_| AddressError::InvalidSyntax(s.to_string()))?,
    };
    let net = IpNet::new(ip, length).map_err(|_| AddressError::PrefixTooLong { length, width })?;
    Ok(match net {
        IpNet::V4(n) => ParsedAddress::V4(IPv4Address::new(u32::from(n.addr()), n.prefix_len())),
        IpNet::V6(n) => ParsedAddress::V6(IPv6Address::new(u128::from(n.addr()), n.prefix_len())),
    })
}

impl FromStr for IPv4Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_ip_from_string(s)? {
            ParsedAddress::V4(a) => Ok(a),
            ParsedAddress::V6(_) => Err(AddressError::FamilyMismatch),
        }
    }
}

impl FromStr for IPv6Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_ip_from_string(s)? {
            ParsedAddress::V6(a) => Ok(a),
            ParsedAddress::V4(_) => Err(AddressError::FamilyMismatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_v4_as_host() {
        let a: IPv4Address = "59.60.75.52".parse().unwrap();
        assert_eq!(a, IPv4Address::from_octets([59, 60, 75, 52], 32));
    }

    #[test]
    fn parses_v4_cidr_and_keeps_host_bits() {
        let a: IPv4Address = "1.2.3.4/16".parse().unwrap();
        assert_eq!(a.address, 0x0102_0304);
        assert_eq!(a.length, 16);
        assert_eq!(a.to_string(), "1.2.3.4/16");
    }

    #[test]
    fn parses_v6() {
        match parse_ip_from_string("2001:db8::1/64").unwrap() {
            ParsedAddress::V6(a) => {
                assert_eq!(a.length, 64);
                assert_eq!(a.address >> 96, 0x2001_0db8);
                assert_eq!(a.bits().get_bit(2), 1);
            }
            other => panic!("expected v6, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_ip_from_string("300.1.1.1"),
            Err(AddressError::InvalidSyntax(_))
        ));
        assert!(matches!(
            parse_ip_from_string("1.2.3.4/x"),
            Err(AddressError::InvalidSyntax(_))
        ));
        assert_eq!(
            parse_ip_from_string("1.2.3.4/33"),
            Err(AddressError::PrefixTooLong { length: 33, width: 32 })
        );
        assert_eq!(
            "::1".parse::<IPv4Address>(),
            Err(AddressError::FamilyMismatch)
        );
        assert!(IPv6Address::try_new(0, 129).is_err());
        assert!(IPv4Address::try_new(0, 32).is_ok());
    }

    #[test]
    fn net_conversion_uses_network() {
        let net: Ipv4Net = "10.1.2.3/8".parse().unwrap();
        assert_eq!(IPv4Address::from(net), IPv4Address::from_octets([10, 0, 0, 0], 8));
    }
}
