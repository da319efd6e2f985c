//! The external network controller.
//!
//! - [`Controller`] - operations the engine consumes
//! - [`dump`] - controller backed by a captured JSON dump

mod dump;

pub use dump::{read_controller_dump, ControllerDump, DumpController, DumpedNetwork};

use crate::error::{ControllerError, ControllerResult};
use crate::models::{NetworkMembers, NetworkParameters, Route};
use serde_json::Value;

/// Authoritative owner of network, member and route state.
pub trait Controller: Send + Sync {
    /// Network configuration object, including its `routes`.
    fn network(&self, nwid: &str) -> ControllerResult<Value>;

    /// Current and departed members of a network.
    fn members(&self, nwid: &str) -> ControllerResult<NetworkMembers>;

    /// Routes of a network.
    fn routes(&self, nwid: &str) -> ControllerResult<Vec<Route>> {
        routes_from_network(&self.network(nwid)?)
    }

    /// Create a network with the given addressing, returning its id.
    fn create_network(
        &self,
        name: &str,
        params: &NetworkParameters,
        central: bool,
    ) -> ControllerResult<String>;
}

/// Read the `routes` array of a controller network object. A missing or null
/// array means no routes.
pub fn routes_from_network(network: &Value) -> ControllerResult<Vec<Route>> {
    match network.get("routes") {
        None | Some(Value::Null) => Ok(vec![]),
        Some(routes) => serde_json::from_value(routes.clone()).map_err(|e| {
            ControllerError::Payload {
                path: "network.routes".to_string(),
                message: e.to_string(),
            }
        }),
    }
}

/// Network id of a controller network object (`id`, or `nwid` for
/// locally annotated objects).
pub fn network_id(network: &Value) -> Option<&str> {
    network
        .get("id")
        .or_else(|| network.get("nwid"))
        .and_then(Value::as_str)
}
