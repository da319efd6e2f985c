//! Network snapshot models exchanged with the controller and the drift cache.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full observable state of one network at one point in time.
///
/// The controller's payloads are semi-structured, so the three parts are kept
/// as JSON values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub network: Value,
    #[serde(default)]
    pub members: Vec<Value>,
    /// Members the controller still lists but that have departed.
    #[serde(default)]
    pub zombie_members: Vec<Value>,
}

/// Member listing of a network as returned by the controller.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMembers {
    #[serde(default)]
    pub members: Vec<Value>,
    #[serde(default)]
    pub zombie_members: Vec<Value>,
}

impl NetworkSnapshot {
    pub fn new(network: Value, members: NetworkMembers) -> NetworkSnapshot {
        NetworkSnapshot {
            network,
            members: members.members,
            zombie_members: members.zombie_members,
        }
    }
}

/// Result of one observation of a network.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NetworkUpdate {
    pub network_id: String,
    pub data: NetworkSnapshot,
    /// Millis since epoch of the last accepted snapshot, 0 if none.
    pub timestamp: i64,
    /// Whether this observation differed from the previously accepted one.
    pub changed: bool,
}
