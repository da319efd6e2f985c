//! Observation cycle of one network.
//!
//! Fetches the controller's view, runs it through the drift cache, and
//! converges the persisted routes toward the controller.

use super::cache::NetworkStateCache;
use crate::controller::{routes_from_network, Controller};
use crate::error::{ControllerResult, SyncResult};
use crate::models::{NetworkSnapshot, NetworkUpdate};
use crate::processing::{
    find_duplicate_routes, log_duplicate_routes, DuplicateRoutes, ReconcileOutcome,
    RouteReconciler,
};
use crate::store::RouteStore;
use std::sync::Arc;

/// Everything one refresh cycle found out about a network.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub update: NetworkUpdate,
    /// `None` when the network has no local mirror row.
    pub routes: Option<ReconcileOutcome>,
    /// Other networks of the owner routing the same targets.
    pub duplicates: Vec<DuplicateRoutes>,
}

#[derive(Clone)]
pub struct NetworkSyncService {
    controller: Arc<dyn Controller>,
    store: Arc<dyn RouteStore>,
    cache: Arc<NetworkStateCache>,
    reconciler: RouteReconciler,
}

impl NetworkSyncService {
    pub fn new(
        controller: Arc<dyn Controller>,
        store: Arc<dyn RouteStore>,
        cache: Arc<NetworkStateCache>,
    ) -> NetworkSyncService {
        NetworkSyncService {
            reconciler: RouteReconciler::new(store.clone()),
            controller,
            store,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<NetworkStateCache> {
        &self.cache
    }

    /// Observe a network and accept the snapshot when it changed.
    ///
    /// The caller propagates the update when `changed` is set; nothing is
    /// broadcast from here.
    pub fn sync_network(&self, network_id: &str) -> ControllerResult<NetworkUpdate> {
        let snapshot = self.fetch_snapshot(network_id).map_err(|e| {
            log::error!("Error syncing network {network_id}: {e}");
            e
        })?;

        let changed = self.cache.has_changed(network_id, &snapshot);
        if changed {
            self.cache.update_cache(network_id, &snapshot);
            log::info!("network {network_id} changed, snapshot accepted");
        }

        Ok(NetworkUpdate {
            network_id: network_id.to_string(),
            data: snapshot,
            timestamp: self.cache.last_update_time(network_id),
            changed,
        })
    }

    /// One full refresh: drift check, route reconciliation, and a duplicate
    /// route check against the owner's other networks.
    ///
    /// Controller errors are returned. Store errors only cost this cycle's
    /// reconciliation and are logged.
    pub fn refresh_network(&self, network_id: &str) -> SyncResult<RefreshReport> {
        let update = self.sync_network(network_id)?;
        let controller_routes = routes_from_network(&update.data.network)?;

        let persisted = match self.store.network(network_id) {
            Ok(persisted) => persisted,
            Err(e) => {
                log::error!("Error loading network {network_id} from store: {e}");
                None
            }
        };

        let Some(persisted) = persisted else {
            return Ok(RefreshReport {
                update,
                routes: None,
                duplicates: vec![],
            });
        };

        let owner_id = persisted.owner_id.clone();
        let outcome = self
            .reconciler
            .reconcile(network_id, persisted, &controller_routes);

        let targets: Vec<&str> = controller_routes.iter().map(|r| r.target.as_str()).collect();
        let duplicates = match self.store.networks_for_owner(&owner_id) {
            Ok(networks) => find_duplicate_routes(network_id, &targets, &networks),
            Err(e) => {
                log::warn!("Skipping duplicate route check for {network_id}: {e}");
                vec![]
            }
        };
        log_duplicate_routes(network_id, &duplicates);

        Ok(RefreshReport {
            update,
            routes: Some(outcome),
            duplicates,
        })
    }

    /// Forget the accepted snapshot of a network, e.g. after deletion.
    pub fn clear_network_cache(&self, network_id: &str) {
        self.cache.clear_cache(network_id);
    }

    fn fetch_snapshot(&self, network_id: &str) -> ControllerResult<NetworkSnapshot> {
        let network = self.controller.network(network_id)?;
        let members = self.controller.members(network_id)?;
        Ok(NetworkSnapshot::new(network, members))
    }
}
