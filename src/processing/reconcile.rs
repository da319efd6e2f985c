//! Route reconciliation between the controller and the local mirror.
//!
//! The controller is authoritative: the persisted route set of a network is
//! converged toward the controller's list in one transaction, never the other
//! way round.

use crate::models::{PersistedNetwork, PersistedRoute, Route};
use crate::processing::dedup::de_duplicate_by_key;
use crate::store::{RouteBatch, RouteStore};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// What a reconciliation did. Every variant carries the network the caller
/// should continue with.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The network has no route history and is left alone.
    Unmanaged(PersistedNetwork),
    /// Persisted routes already match the controller; nothing was written.
    Unchanged(PersistedNetwork),
    /// A batch was committed; the network was re-read afterwards.
    Applied(PersistedNetwork),
    /// The transaction failed and was rolled back; the input is returned.
    Failed(PersistedNetwork),
}

impl ReconcileOutcome {
    pub fn network(&self) -> &PersistedNetwork {
        match self {
            ReconcileOutcome::Unmanaged(n)
            | ReconcileOutcome::Unchanged(n)
            | ReconcileOutcome::Applied(n)
            | ReconcileOutcome::Failed(n) => n,
        }
    }

    pub fn into_network(self) -> PersistedNetwork {
        match self {
            ReconcileOutcome::Unmanaged(n)
            | ReconcileOutcome::Unchanged(n)
            | ReconcileOutcome::Applied(n)
            | ReconcileOutcome::Failed(n) => n,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied(_))
    }
}

/// Compute the writes that make `persisted` equal to `controller`.
///
/// Routes are matched by their `(target, via)` key. Creates follow the
/// controller's order, deletes the persisted order. Surplus persisted rows
/// sharing a key with an earlier row are deleted as well.
pub fn plan_route_changes(persisted: &[PersistedRoute], controller: &[Route]) -> RouteBatch {
    let (db_routes, db_duplicates) = de_duplicate_by_key(persisted, PersistedRoute::key);
    let (zt_routes, zt_duplicates) = de_duplicate_by_key(controller, Route::key);

    if !zt_duplicates.is_empty() {
        log::warn!(
            "Controller reported {} duplicate route(s), keeping the first of each: {:?}",
            zt_duplicates.len(),
            zt_duplicates
        );
    }

    let existing: HashMap<&str, &PersistedRoute> =
        db_routes.iter().map(|(k, r)| (k.as_str(), *r)).collect();
    let reported: HashSet<&str> = zt_routes.iter().map(|(k, _)| k.as_str()).collect();

    let mut batch = RouteBatch::default();

    for (key, zt_route) in &zt_routes {
        match existing.get(key.as_str()) {
            None => batch.create.push(zt_route.normalized()),
            Some(db_route) if db_route.differs_from(zt_route) => {
                let fresh = zt_route.normalized();
                batch.update.push(PersistedRoute {
                    id: db_route.id.clone(),
                    network_id: db_route.network_id.clone(),
                    target: fresh.target,
                    via: fresh.via,
                });
            }
            Some(_) => {}
        }
    }

    for (key, db_route) in &db_routes {
        if !reported.contains(key.as_str()) {
            batch.delete.push(db_route.id.clone());
        }
    }

    if !db_duplicates.is_empty() {
        log::warn!(
            "Removing {} duplicate persisted route row(s)",
            db_duplicates.len()
        );
        batch
            .delete
            .extend(db_duplicates.iter().map(|r| r.id.clone()));
    }

    batch
}

/// Converges persisted routes to the controller's routes.
#[derive(Clone)]
pub struct RouteReconciler {
    store: Arc<dyn RouteStore>,
}

impl RouteReconciler {
    pub fn new(store: Arc<dyn RouteStore>) -> RouteReconciler {
        RouteReconciler { store }
    }

    /// Reconcile one network.
    ///
    /// Storage errors are logged and reported as [`ReconcileOutcome::Failed`]
    /// rather than returned: the next refresh cycle retries from scratch.
    pub fn reconcile(
        &self,
        network_id: &str,
        persisted: PersistedNetwork,
        controller_routes: &[Route],
    ) -> ReconcileOutcome {
        let Some(db_routes) = persisted.routes.as_deref() else {
            log::debug!("reconcile {network_id}: no route history, skipping");
            return ReconcileOutcome::Unmanaged(persisted);
        };

        let batch = plan_route_changes(db_routes, controller_routes);
        if batch.is_empty() {
            log::debug!("reconcile {network_id}: routes in sync");
            return ReconcileOutcome::Unchanged(persisted);
        }

        log::info!(
            "reconcile {network_id}: {} write(s), create={} update={} delete={}",
            batch.len(),
            batch.create.len(),
            batch.update.len(),
            batch.delete.len()
        );

        match self.store.apply_route_batch(network_id, &batch) {
            Ok(network) => ReconcileOutcome::Applied(network),
            Err(e) => {
                log::error!("Error syncing network routes for {network_id}: {e}");
                ReconcileOutcome::Failed(persisted)
            }
        }
    }
}
