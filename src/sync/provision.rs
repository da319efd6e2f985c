//! Creation of new networks.

use crate::controller::Controller;
use crate::error::{SyncError, SyncResult};
use crate::models::{NetworkParameters, PersistedNetwork};
use crate::processing::CidrPool;
use crate::store::{usage_record, RouteStore};

/// A network created on the controller.
#[derive(Debug, Clone)]
pub struct ProvisionedNetwork {
    pub nwid: String,
    pub parameters: NetworkParameters,
    /// Mirror row, `None` for centrally hosted networks.
    pub persisted: Option<PersistedNetwork>,
}

/// Create a network for `owner_id` in a block the owner does not use yet.
///
/// Central networks get a random block since the controller keeps them apart,
/// and are not mirrored locally. Allocation plus persist is not serialized per
/// owner here; two concurrent calls may pick the same block.
pub fn provision_network(
    controller: &dyn Controller,
    store: &dyn RouteStore,
    pool: &CidrPool,
    owner_id: &str,
    name: &str,
    central: bool,
) -> SyncResult<ProvisionedNetwork> {
    let used = usage_record(store, owner_id)?;
    let parameters = pool
        .network_parameters(None, &used, central)
        .map_err(|e| SyncError::Addressing(e.to_string()))?;

    let nwid = controller.create_network(name, &parameters, central)?;
    log::info!(
        "provisioned network {nwid} '{name}' for {owner_id} with {}",
        parameters
            .routes
            .first()
            .map(|r| r.target.as_str())
            .unwrap_or("no route")
    );

    if central {
        return Ok(ProvisionedNetwork {
            nwid,
            parameters,
            persisted: None,
        });
    }

    let persisted = store.insert_network(&nwid, name, owner_id, &parameters.routes)?;
    Ok(ProvisionedNetwork {
        nwid,
        parameters,
        persisted: Some(persisted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DumpController;
    use crate::models::Route;
    use crate::store::MemoryRouteStore;

    #[test]
    fn test_provision_spreads_subnets() {
        let controller = DumpController::default();
        let store = MemoryRouteStore::new();
        let pool = CidrPool::default();

        let first = provision_network(&controller, &store, &pool, "u1", "one", false).unwrap();
        let second = provision_network(&controller, &store, &pool, "u1", "two", false).unwrap();
        let other = provision_network(&controller, &store, &pool, "u2", "three", false).unwrap();

        assert_eq!(first.parameters.routes, vec![Route::lan("10.121.15.0/24")]);
        assert_eq!(second.parameters.routes, vec![Route::lan("10.121.16.0/24")]);
        assert_eq!(other.parameters.routes, vec![Route::lan("10.121.15.0/24")]);

        let row = second.persisted.unwrap();
        assert_eq!(row.owner_id, "u1");
        assert_eq!(row.route_targets(), vec!["10.121.16.0/24".to_string()]);
        assert_eq!(controller.network_ids().len(), 3);
    }

    #[test]
    fn test_provision_central_not_persisted() {
        let controller = DumpController::default();
        let store = MemoryRouteStore::new();
        let pool = CidrPool::default();

        let network = provision_network(&controller, &store, &pool, "u1", "hosted", true).unwrap();
        assert!(network.persisted.is_none());
        assert!(store.network(&network.nwid).unwrap().is_none());
        assert!(pool
            .candidates()
            .iter()
            .any(|c| c.to_string() == network.parameters.routes[0].target));
    }
}
