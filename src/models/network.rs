//! Address parameters pushed to the controller when a network is created.

use super::{Ipv4, Route};
use serde::{Deserialize, Serialize};

/// Inclusive range of addresses the controller may hand out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IpAssignmentPool {
    pub ip_range_start: String,
    pub ip_range_end: String,
}

impl IpAssignmentPool {
    pub fn new(start: impl ToString, end: impl ToString) -> IpAssignmentPool {
        IpAssignmentPool {
            ip_range_start: start.to_string(),
            ip_range_end: end.to_string(),
        }
    }
}

/// IPv4 addressing mode of a network.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct V4AssignMode {
    /// Controller assigns addresses from the pools automatically.
    pub zt: bool,
}

/// Everything derived from one CIDR block for a new network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParameters {
    pub ip_assignment_pools: Vec<IpAssignmentPool>,
    pub routes: Vec<Route>,
    pub v4_assign_mode: V4AssignMode,
    /// The candidate pool the block was chosen from.
    pub cidr_options: Vec<Ipv4>,
}
