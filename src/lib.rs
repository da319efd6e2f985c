//! Network state synchronization engine.
//!
//! Keeps a local mirror of controller-owned virtual networks honest:
//! - [`processing`] - subnet allocation, covering blocks, route reconciliation
//! - [`sync`] - drift detection cache, refresh cycle, provisioning
//! - [`store`] and [`controller`] - the collaborators the engine talks to

pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
pub mod store;
pub mod sync;

use config::Config;
use controller::DumpController;
use itertools::Itertools;
use models::Ipv4;
use processing::CidrPool;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use store::{usage_record, MemoryRouteStore};
use sync::{NetworkStateCache, NetworkSyncService, RefreshReport};

pub use error::{ControllerError, StoreError, SyncError};

/// Outcome of replaying a controller dump.
#[derive(Debug)]
pub struct ReplaySummary {
    /// Reports of all cycles, in order.
    pub reports: Vec<RefreshReport>,
    /// Block the next network of each owner would get.
    pub next_cidr: BTreeMap<String, Ipv4>,
}

/// Replay a controller dump: seed a store with the dump's mirror rows, run
/// `cycles` refresh cycles over every dumped network, then work out the next
/// block per owner from the reconciled routes.
pub fn replay_dump(
    dump_file: impl AsRef<Path>,
    config: &Config,
    cache: Arc<NetworkStateCache>,
    cycles: usize,
) -> Result<ReplaySummary, Box<dyn Error>> {
    let pool = CidrPool::new(config.cidr_pool.clone())?;
    let dump = controller::read_controller_dump(dump_file)?;
    let owners: Vec<String> = dump
        .persisted_networks()
        .into_iter()
        .map(|n| n.owner_id)
        .unique()
        .collect();

    let store = Arc::new(MemoryRouteStore::with_networks(dump.persisted_networks()));
    let controller = Arc::new(DumpController::new(dump));
    let service = NetworkSyncService::new(controller.clone(), store.clone(), cache);

    let mut reports = Vec::new();
    for cycle in 0..cycles {
        log::debug!("refresh cycle {cycle}");
        for nwid in controller.network_ids() {
            match service.refresh_network(&nwid) {
                Ok(report) => reports.push(report),
                Err(e) => log::error!("refresh of {nwid} failed: {e}"),
            }
        }
    }

    let mut next_cidr = BTreeMap::new();
    for owner in owners {
        let used = usage_record(store.as_ref(), &owner)?;
        next_cidr.insert(owner, pool.allocate(&used, config.prefer_random));
    }

    Ok(ReplaySummary { reports, next_cidr })
}
