//! Domain models for network synchronization.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Ipv4`] - IPv4 address block with CIDR notation support
//! - [`Route`], [`PersistedRoute`] and [`PersistedNetwork`] - routing state
//! - [`NetworkParameters`] - addressing pushed to the controller
//! - [`NetworkSnapshot`] and [`NetworkUpdate`] - observed network state

mod ipv4;
mod network;
mod route;
mod snapshot;

// Re-export public types
pub use ipv4::{broadcast_addr, common_prefix_len, cut_addr, get_cidr_mask, Ipv4, MAX_LENGTH};
pub use network::{IpAssignmentPool, NetworkParameters, V4AssignMode};
pub use route::{normalize_via, route_key, PersistedNetwork, PersistedRoute, Route, NULL_VIA};
pub use snapshot::{NetworkMembers, NetworkSnapshot, NetworkUpdate};
