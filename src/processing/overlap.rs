//! Route targets shared between networks of the same requester.
//!
//! A network whose routes point at blocks another network of the same owner
//! also routes is likely to collide once both are joined by one member.

use crate::models::{PersistedNetwork, PersistedRoute};
use std::collections::HashSet;

/// Another network reusing some of the inspected targets.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateRoutes {
    pub nwid: String,
    pub name: String,
    pub routes: Vec<PersistedRoute>,
}

/// Find the owner's other networks that route any of `targets`.
///
/// # Arguments
/// * `network_id` - The network being inspected, excluded from the result
/// * `targets` - Route targets reported by the controller for that network
/// * `owner_networks` - All persisted networks of the owner
///
/// # Returns
/// One entry per conflicting network, sorted by network id
pub fn find_duplicate_routes(
    network_id: &str,
    targets: &[&str],
    owner_networks: &[PersistedNetwork],
) -> Vec<DuplicateRoutes> {
    if targets.is_empty() {
        return vec![];
    }
    let targets: HashSet<&str> = targets.iter().map(|t| t.trim()).collect();

    let mut conflicts: Vec<DuplicateRoutes> = owner_networks
        .iter()
        .filter(|n| n.nwid != network_id)
        .filter_map(|n| {
            let routes: Vec<PersistedRoute> = n
                .routes
                .iter()
                .flatten()
                .filter(|r| targets.contains(r.target.as_str()))
                .cloned()
                .collect();
            (!routes.is_empty()).then(|| DuplicateRoutes {
                nwid: n.nwid.clone(),
                name: n.name.clone(),
                routes,
            })
        })
        .collect();

    // Sort by network id for consistent output
    conflicts.sort_by(|a, b| a.nwid.cmp(&b.nwid));

    conflicts
}

/// Log duplicate route conflicts as warnings.
pub fn log_duplicate_routes(network_id: &str, conflicts: &[DuplicateRoutes]) {
    if conflicts.is_empty() {
        log::debug!("No duplicate routes found for network {network_id}.");
        return;
    }

    log::warn!(
        "Network {network_id} shares route targets with {} other network(s):",
        conflicts.len()
    );

    for conflict in conflicts {
        for route in &conflict.routes {
            log::warn!(
                "  - Network: '{}' ({}), target: {}, via: {}",
                conflict.name,
                conflict.nwid,
                route.target,
                route.via.as_deref().unwrap_or("LAN")
            );
        }
    }
}
