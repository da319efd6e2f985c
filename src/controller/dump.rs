//! Controller replayed from a JSON dump file.
//!
//! A dump captures what the controller reported for a set of networks,
//! optionally with the local mirror row of each network, so a sync cycle can
//! be rerun offline.

use super::{network_id, Controller};
use crate::error::{ControllerError, ControllerResult};
use crate::models::{NetworkMembers, NetworkParameters, PersistedNetwork};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

/// One network as captured from the controller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DumpedNetwork {
    pub network: Value,
    #[serde(default)]
    pub members: Vec<Value>,
    #[serde(default)]
    pub zombie_members: Vec<Value>,
    /// Local mirror row of the network, if it was stored.
    #[serde(default)]
    pub persisted: Option<PersistedNetwork>,
}

/// Content of a dump file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ControllerDump {
    pub networks: Vec<DumpedNetwork>,
}

impl ControllerDump {
    /// Mirror rows contained in the dump.
    pub fn persisted_networks(&self) -> Vec<PersistedNetwork> {
        self.networks
            .iter()
            .filter_map(|n| n.persisted.clone())
            .collect()
    }
}

/// Read and parse a dump file.
///
/// # Returns
/// * `Ok(ControllerDump)` - The parsed dump
/// * `Err` - If the file is missing or not a valid dump, with the JSON path
///   of the first offending value
pub fn read_controller_dump(file: impl AsRef<Path>) -> ControllerResult<ControllerDump> {
    let file = file.as_ref();
    if !file.exists() {
        return Err(ControllerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Dump file does not exist: {}", file.display()),
        )));
    }

    log::info!("Reading controller dump: {}", file.display());
    let json = std::fs::read_to_string(file)?;

    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let dump: ControllerDump =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            ControllerError::Payload {
                path: e.path().to_string(),
                message: e.inner().to_string(),
            }
        })?;

    log::info!("Parsed {} network(s) from {}", dump.networks.len(), file.display());
    Ok(dump)
}

/// [`Controller`] serving the networks of a dump.
#[derive(Debug, Default)]
pub struct DumpController {
    networks: RwLock<BTreeMap<String, DumpedNetwork>>,
}

impl DumpController {
    /// Index the dump by network id. Networks without an id are skipped.
    pub fn new(dump: ControllerDump) -> DumpController {
        let mut networks = BTreeMap::new();
        for network in dump.networks {
            match network_id(&network.network).map(str::to_string) {
                Some(id) => {
                    networks.insert(id, network);
                }
                None => log::warn!("Skipping dumped network without id: {}", network.network),
            }
        }
        DumpController {
            networks: RwLock::new(networks),
        }
    }

    pub fn from_file(file: impl AsRef<Path>) -> ControllerResult<DumpController> {
        Ok(DumpController::new(read_controller_dump(file)?))
    }

    /// Ids of the served networks, sorted.
    pub fn network_ids(&self) -> Vec<String> {
        self.networks.read().keys().cloned().collect()
    }

    /// Replace what the controller reports for one network.
    pub fn set_network(&self, nwid: &str, network: Value) {
        let mut networks = self.networks.write();
        match networks.get_mut(nwid) {
            Some(entry) => entry.network = network,
            None => {
                networks.insert(
                    nwid.to_string(),
                    DumpedNetwork {
                        network,
                        members: vec![],
                        zombie_members: vec![],
                        persisted: None,
                    },
                );
            }
        }
    }

    /// Replace the member listing of one network.
    pub fn set_members(&self, nwid: &str, members: NetworkMembers) -> ControllerResult<()> {
        let mut networks = self.networks.write();
        let entry = networks
            .get_mut(nwid)
            .ok_or_else(|| ControllerError::NetworkNotFound {
                nwid: nwid.to_string(),
            })?;
        entry.members = members.members;
        entry.zombie_members = members.zombie_members;
        Ok(())
    }

    fn with_network<T>(
        &self,
        nwid: &str,
        f: impl FnOnce(&DumpedNetwork) -> T,
    ) -> ControllerResult<T> {
        self.networks
            .read()
            .get(nwid)
            .map(f)
            .ok_or_else(|| ControllerError::NetworkNotFound {
                nwid: nwid.to_string(),
            })
    }
}

impl Controller for DumpController {
    fn network(&self, nwid: &str) -> ControllerResult<Value> {
        self.with_network(nwid, |n| n.network.clone())
    }

    fn members(&self, nwid: &str) -> ControllerResult<NetworkMembers> {
        self.with_network(nwid, |n| NetworkMembers {
            members: n.members.clone(),
            zombie_members: n.zombie_members.clone(),
        })
    }

    fn create_network(
        &self,
        name: &str,
        params: &NetworkParameters,
        central: bool,
    ) -> ControllerResult<String> {
        // controller network ids are 16 hex digits
        let nwid = Uuid::new_v4().simple().to_string()[..16].to_string();
        let network = json!({
            "id": nwid,
            "name": name,
            "central": central,
            "ipAssignmentPools": params.ip_assignment_pools,
            "routes": params.routes,
            "v4AssignMode": params.v4_assign_mode,
        });
        self.set_network(&nwid, network);
        log::info!("created network {nwid} '{name}'");
        Ok(nwid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::routes_from_network;
    use crate::models::{Ipv4, Route};
    use crate::processing::derive_network_parameters;
    use std::io::Write;

    const DUMP: &str = r#"{
        "networks": [
            {
                "network": {"id": "nw1", "name": "office", "routes": [{"target": "10.121.15.0/24", "via": null}]},
                "members": [{"id": "m1", "authorized": true}],
                "zombieMembers": [],
                "persisted": {"nwid": "nw1", "name": "office", "ownerId": "u1", "routes": []}
            },
            {
                "network": {"id": "nw2", "name": "lab"}
            }
        ]
    }"#;

    #[test]
    fn test_read_dump_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DUMP.as_bytes()).unwrap();

        let controller = DumpController::from_file(file.path()).unwrap();
        assert_eq!(controller.network_ids(), vec!["nw1", "nw2"]);
        assert_eq!(controller.members("nw1").unwrap().members.len(), 1);
        assert!(controller.members("nw2").unwrap().members.is_empty());
        assert_eq!(
            controller.routes("nw1").unwrap(),
            vec![Route::lan("10.121.15.0/24")]
        );
        assert!(matches!(
            controller.network("nw3"),
            Err(ControllerError::NetworkNotFound { .. })
        ));
    }

    #[test]
    fn test_persisted_rows() {
        let dump: ControllerDump = serde_json::from_str(DUMP).unwrap();
        let rows = dump.persisted_networks();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].owner_id, "u1");
        assert_eq!(rows[0].routes, Some(vec![]));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_controller_dump("does/not/exist.json"),
            Err(ControllerError::Io(_))
        ));
    }

    #[test]
    fn test_bad_dump_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"networks": [{"network": {}, "members": 5}]}"#)
            .unwrap();
        match read_controller_dump(file.path()) {
            Err(ControllerError::Payload { path, .. }) => assert!(path.contains("members")),
            other => panic!("expected payload error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_network() {
        let controller = DumpController::default();
        let params = derive_network_parameters(Ipv4::new("10.121.17.0/24").unwrap()).unwrap();
        let nwid = controller.create_network("new", &params, false).unwrap();
        assert_eq!(nwid.len(), 16);
        let network = controller.network(&nwid).unwrap();
        assert_eq!(network["name"], json!("new"));
        assert_eq!(
            routes_from_network(&network).unwrap(),
            vec![Route::lan("10.121.17.0/24")]
        );
    }
}
