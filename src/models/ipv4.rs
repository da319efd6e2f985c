//! IPv4 address and CIDR notation utilities.
//!
//! Provides [`Ipv4`] for representing an address block as `addr/mask`, along
//! with the bit arithmetic the allocator needs.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use network_sync::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, Box<dyn Error>> {
    if len > MAX_LENGTH {
        Err("Network length is too long".into())
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, Box<dyn Error>> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Calculate the broadcast (top) address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, Box<dyn Error>> {
    let mask = get_cidr_mask(len)?;
    let network_bits = u32::from(addr) & mask;
    Ok(Ipv4Addr::from(network_bits | !mask))
}

/// Number of leading bits two addresses have in common (0-32).
pub fn common_prefix_len(a: Ipv4Addr, b: Ipv4Addr) -> u8 {
    (u32::from(a) ^ u32::from(b)).leading_zeros() as u8
}

/// IPv4 address block in CIDR notation.
#[derive(Eq, Ord, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address, host bits are not required to be zero.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(|e| de::Error::custom(format!("invalid CIDR '{s}': {e}")))
    }
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.121.15.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, Box<dyn Error>> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| format!("Invalid address/mask '{addr_cidr}'"))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("Invalid address {addr}"))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| format!("Invalid subnet mask {mask}"))?;
        if mask > MAX_LENGTH {
            return Err("Network length is too long".into());
        }
        Ok(Ipv4 { addr, mask })
    }

    /// The same block with the host bits zeroed.
    pub fn network(&self) -> Result<Ipv4, Box<dyn Error>> {
        Ok(Ipv4 {
            addr: cut_addr(self.addr, self.mask)?,
            mask: self.mask,
        })
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> Result<Ipv4Addr, Box<dyn Error>> {
        cut_addr(self.addr, self.mask)
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> Result<Ipv4Addr, Box<dyn Error>> {
        broadcast_addr(self.addr, self.mask)
    }

    /// First and last host address, excluding the network and broadcast
    /// addresses.
    ///
    /// A /31 or /32 has no such range and is rejected instead of producing an
    /// inverted pair.
    pub fn usable_range(&self) -> Result<(Ipv4Addr, Ipv4Addr), Box<dyn Error>> {
        if self.mask > MAX_LENGTH - 2 {
            return Err(format!("No usable host range in {self}, prefix must be /30 or shorter").into());
        }
        let lo = u32::from(self.lo()?);
        let hi = u32::from(self.hi()?);
        Ok((Ipv4Addr::from(lo + 1), Ipv4Addr::from(hi - 1)))
    }
}

impl FromStr for Ipv4 {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

impl PartialEq for Ipv4 {
    fn eq(&self, other: &Ipv4) -> bool {
        self.addr == other.addr && self.mask == other.mask
    }
}

impl PartialOrd for Ipv4 {
    fn partial_cmp(&self, other: &Ipv4) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
