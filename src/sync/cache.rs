//! Drift detection over successive network observations.
//!
//! Keeps the last accepted snapshot per network and tells whether a new one
//! differs in a way that matters, ignoring fields the controller refreshes on
//! every poll.

use crate::models::NetworkSnapshot;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Network config fields that change without any real state change.
pub const VOLATILE_NETWORK_FIELDS: [&str; 2] = ["lastSeen", "lastUpdate"];

/// Per-member fields that change without any real state change.
pub const VOLATILE_MEMBER_FIELDS: [&str; 3] = ["lastSeen", "latency", "pathCost"];

static GLOBAL_CACHE: OnceLock<Arc<NetworkStateCache>> = OnceLock::new();

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: NetworkSnapshot,
    accepted_at_millis: i64,
}

/// Last accepted snapshot per network id.
///
/// One instance is meant to be shared by every observer of the process,
/// either passed around as an `Arc` or reached through [`NetworkStateCache::global`].
#[derive(Debug, Default)]
pub struct NetworkStateCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl NetworkStateCache {
    pub fn new() -> NetworkStateCache {
        NetworkStateCache::default()
    }

    /// The process-wide instance, created on first use.
    pub fn global() -> Arc<NetworkStateCache> {
        GLOBAL_CACHE
            .get_or_init(|| Arc::new(NetworkStateCache::new()))
            .clone()
    }

    /// Whether `snapshot` differs from the accepted one for `network_id`.
    ///
    /// Always true for a network without an entry. Never modifies the cache.
    /// Numbers compare by JSON representation, so `1` and `1.0` count as a
    /// change.
    pub fn has_changed(&self, network_id: &str, snapshot: &NetworkSnapshot) -> bool {
        let entries = self.entries.read();
        let Some(cached) = entries.get(network_id) else {
            return true;
        };
        let cached = &cached.snapshot;

        let network_changed = strip_fields(&cached.network, &VOLATILE_NETWORK_FIELDS)
            != strip_fields(&snapshot.network, &VOLATILE_NETWORK_FIELDS);

        let members_changed =
            normalize_members(&cached.members) != normalize_members(&snapshot.members);

        let zombies_changed = normalize_zombies(&cached.zombie_members)
            != normalize_zombies(&snapshot.zombie_members);

        if network_changed || members_changed || zombies_changed {
            log::debug!(
                "network {network_id} changed: config={network_changed} members={members_changed} zombies={zombies_changed}"
            );
        }

        network_changed || members_changed || zombies_changed
    }

    /// Accept `snapshot` as the current state of `network_id`.
    ///
    /// Stores an independent copy and the current time, replacing any
    /// previous entry as a whole.
    pub fn update_cache(&self, network_id: &str, snapshot: &NetworkSnapshot) {
        let entry = CacheEntry {
            snapshot: snapshot.clone(),
            accepted_at_millis: chrono::Utc::now().timestamp_millis(),
        };
        self.entries.write().insert(network_id.to_string(), entry);
    }

    /// Millis since epoch of the last accepted snapshot, 0 if none.
    pub fn last_update_time(&self, network_id: &str) -> i64 {
        self.entries
            .read()
            .get(network_id)
            .map(|e| e.accepted_at_millis)
            .unwrap_or(0)
    }

    /// Copy of the accepted snapshot, if any.
    pub fn snapshot(&self, network_id: &str) -> Option<NetworkSnapshot> {
        self.entries
            .read()
            .get(network_id)
            .map(|e| e.snapshot.clone())
    }

    /// Forget a network, e.g. after it was deleted.
    pub fn clear_cache(&self, network_id: &str) {
        if self.entries.write().remove(network_id).is_some() {
            log::debug!("cleared cached state of network {network_id}");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Copy of `value` without the given top-level keys.
fn strip_fields(value: &Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !fields.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

fn member_id(member: &Value) -> String {
    match member.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn by_member_id(a: &Value, b: &Value) -> Ordering {
    member_id(a).cmp(&member_id(b))
}

fn normalize_members(members: &[Value]) -> Vec<Value> {
    let mut members: Vec<Value> = members
        .iter()
        .map(|m| strip_fields(m, &VOLATILE_MEMBER_FIELDS))
        .collect();
    members.sort_by(by_member_id);
    members
}

fn normalize_zombies(zombies: &[Value]) -> Vec<Value> {
    let mut zombies = zombies.to_vec();
    zombies.sort_by(by_member_id);
    zombies
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> NetworkSnapshot {
        NetworkSnapshot {
            network: json!({
                "id": "8056c2e21c000001",
                "name": "office",
                "lastSeen": 1000,
                "lastUpdate": 1000,
                "routes": [{"target": "10.121.15.0/24", "via": null}]
            }),
            members: vec![
                json!({"id": "aaaaaaaaaa", "name": "laptop", "authorized": true,
                       "lastSeen": 10, "latency": 12, "pathCost": 1,
                       "ipAssignments": ["10.121.15.10"]}),
                json!({"id": "bbbbbbbbbb", "name": "server", "authorized": true,
                       "lastSeen": 10, "latency": 3, "pathCost": 1,
                       "ipAssignments": ["10.121.15.11"]}),
            ],
            zombie_members: vec![json!({"id": "zzzzzzzzzz", "deleted": true})],
        }
    }

    #[test]
    fn test_first_observation_always_changed() {
        let cache = NetworkStateCache::new();
        assert!(cache.has_changed("nw", &snapshot()));
        let empty = NetworkSnapshot {
            network: Value::Null,
            members: vec![],
            zombie_members: vec![],
        };
        assert!(cache.has_changed("nw", &empty));
        assert_eq!(cache.last_update_time("nw"), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_identical_snapshot_unchanged() {
        let cache = NetworkStateCache::new();
        cache.update_cache("nw", &snapshot());
        assert!(!cache.has_changed("nw", &snapshot()));
    }

    #[test]
    fn test_volatile_member_fields_ignored() {
        let cache = NetworkStateCache::new();
        cache.update_cache("nw", &snapshot());

        let mut next = snapshot();
        next.members[0]["lastSeen"] = json!(99);
        next.members[0]["latency"] = json!(250);
        next.members[1]["pathCost"] = json!(7);
        next.members.reverse();
        next.network["lastSeen"] = json!(2000);
        next.network["lastUpdate"] = json!(2000);
        assert!(!cache.has_changed("nw", &next));
    }

    #[test]
    fn test_volatile_field_presence_ignored() {
        let cache = NetworkStateCache::new();
        cache.update_cache("nw", &snapshot());

        let mut next = snapshot();
        if let Value::Object(map) = &mut next.members[1] {
            map.remove("latency");
        }
        assert!(!cache.has_changed("nw", &next));
    }

    #[test]
    fn test_network_config_change_detected() {
        let cache = NetworkStateCache::new();
        cache.update_cache("nw", &snapshot());

        let mut next = snapshot();
        next.network["name"] = json!("office-2");
        assert!(cache.has_changed("nw", &next));

        let mut next = snapshot();
        next.network["routes"] = json!([]);
        assert!(cache.has_changed("nw", &next));
    }

    #[test]
    fn test_member_changes_detected() {
        let cache = NetworkStateCache::new();
        cache.update_cache("nw", &snapshot());

        let mut next = snapshot();
        next.members[0]["authorized"] = json!(false);
        assert!(cache.has_changed("nw", &next));

        let mut next = snapshot();
        next.members[1]["ipAssignments"] = json!(["10.121.15.12"]);
        assert!(cache.has_changed("nw", &next));

        let mut next = snapshot();
        next.members.pop();
        assert!(cache.has_changed("nw", &next));
    }

    #[test]
    fn test_zombie_changes() {
        let cache = NetworkStateCache::new();
        let mut first = snapshot();
        first
            .zombie_members
            .push(json!({"id": "yyyyyyyyyy", "deleted": true}));
        cache.update_cache("nw", &first);

        let mut reordered = first.clone();
        reordered.zombie_members.reverse();
        assert!(!cache.has_changed("nw", &reordered));

        // zombie entries are compared in full, lastSeen included
        let mut next = first.clone();
        next.zombie_members[0]["lastSeen"] = json!(5);
        assert!(cache.has_changed("nw", &next));
    }

    #[test]
    fn test_integer_and_float_differ() {
        let cache = NetworkStateCache::new();
        let mut first = snapshot();
        first.network["mtu"] = json!(2800);
        cache.update_cache("nw", &first);

        let mut next = first.clone();
        next.network["mtu"] = json!(2800.0);
        assert!(cache.has_changed("nw", &next));
    }

    #[test]
    fn test_has_changed_does_not_touch_cache() {
        let cache = NetworkStateCache::new();
        cache.update_cache("nw", &snapshot());
        let stamp = cache.last_update_time("nw");
        assert!(stamp > 0);

        let mut changed = snapshot();
        changed.network["name"] = json!("renamed");
        for _ in 0..5 {
            assert!(cache.has_changed("nw", &changed));
            assert!(!cache.has_changed("nw", &snapshot()));
            assert_eq!(cache.last_update_time("nw"), stamp);
        }
        assert_eq!(cache.snapshot("nw"), Some(snapshot()));
    }

    #[test]
    fn test_stored_copy_is_independent() {
        let cache = NetworkStateCache::new();
        let mut data = snapshot();
        cache.update_cache("nw", &data);
        data.network["name"] = json!("mutated after store");
        assert!(cache.has_changed("nw", &data));
        assert_eq!(cache.snapshot("nw").unwrap().network["name"], json!("office"));
    }

    #[test]
    fn test_clear_cache() {
        let cache = NetworkStateCache::new();
        cache.update_cache("nw", &snapshot());
        cache.update_cache("other", &snapshot());
        assert_eq!(cache.len(), 2);

        cache.clear_cache("nw");
        assert!(cache.has_changed("nw", &snapshot()));
        assert_eq!(cache.last_update_time("nw"), 0);
        assert!(!cache.has_changed("other", &snapshot()));
        cache.clear_cache("nw");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_global_is_shared() {
        let a = NetworkStateCache::global();
        let b = NetworkStateCache::global();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_concurrent_observers() {
        let cache = Arc::new(NetworkStateCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    let id = format!("nw{}", i % 4);
                    let data = snapshot();
                    if cache.has_changed(&id, &data) {
                        cache.update_cache(&id, &data);
                    }
                    assert!(!cache.has_changed(&id, &data));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 4);
    }
}
