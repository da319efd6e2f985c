//! Keeping the local mirror in step with the controller.
//!
//! - [`cache`] - Drift detection over successive observations
//! - [`service`] - Per-network observation and refresh cycle
//! - [`provision`] - Creation of new networks

mod cache;
mod provision;
mod service;

pub use cache::{NetworkStateCache, VOLATILE_MEMBER_FIELDS, VOLATILE_NETWORK_FIELDS};
pub use provision::{provision_network, ProvisionedNetwork};
pub use service::{NetworkSyncService, RefreshReport};
