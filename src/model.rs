//! Result model
//!
//! Plain values decoded from daemon responses. Each is built by exactly one
//! decoder call and owned by the caller afterwards.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{FtlError, Result};

/// Snapshot of daemon counters (`>stats`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub domains_being_blocked: u32,
    pub dns_queries_today: u32,
    pub ads_blocked_today: u32,
    pub ads_percentage_today: f32,
    pub unique_domains: u32,
    pub queries_forwarded: u32,
    pub queries_cached: u32,
    pub clients_ever_seen: u32,
    pub unique_clients: u32,
    /// Raw blocking status code, see [`EngineStats::blocking_status`]
    pub status: u8,
}

impl EngineStats {
    pub fn blocking_status(&self) -> BlockingStatus {
        BlockingStatus::from(self.status)
    }
}

/// Blocking status reported in `>stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockingStatus {
    Disabled,
    Enabled,
    Unknown(u8),
}

impl From<u8> for BlockingStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => BlockingStatus::Disabled,
            1 => BlockingStatus::Enabled,
            other => BlockingStatus::Unknown(other),
        }
    }
}

/// Size of the persisted query log (`>dbstats`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub rows: u32,
    /// Database file size in bytes
    pub file_size: u64,
}

/// One ranked entry: a domain, an ad domain or a client address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledCount {
    pub label: String,
    pub count: u32,
}

/// A ranked collection with the daemon's aggregate
///
/// `total` is whatever the daemon reported; it is not tied to
/// `entries.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedList {
    pub total: u32,
    pub entries: Vec<LabeledCount>,
}

/// A forwarding target (`>forward-dest`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamDestination {
    pub name: String,
    pub address: String,
    /// Share of forwarded queries, 0-100 expected but not enforced
    pub percentage: f32,
}

/// Query type name → percentage (`>querytypes`)
pub type QueryTypes = BTreeMap<String, f32>;

/// One 10-minute aggregation point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    /// Unix seconds
    pub timestamp: u32,
    pub count: u32,
}

/// Forwarded and blocked queries over time (`>overTime`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub forwarded: Vec<TimeBucket>,
    pub blocked: Vec<TimeBucket>,
}

impl TimeSeries {
    /// Most recent forwarded bucket
    pub fn latest_forwarded(&self) -> Option<TimeBucket> {
        latest(&self.forwarded)
    }

    /// Most recent blocked bucket
    pub fn latest_blocked(&self) -> Option<TimeBucket> {
        latest(&self.blocked)
    }
}

fn latest(buckets: &[TimeBucket]) -> Option<TimeBucket> {
    buckets.iter().copied().max_by_key(|b| b.timestamp)
}

/// Per-client query counts for one timestamp (`>ClientsoverTime`)
///
/// `counts[i]` belongs to the i-th entry of `>client-names`; nothing in the
/// response itself says so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientTimeBucket {
    /// Unix seconds
    pub timestamp: u32,
    pub counts: Vec<u32>,
}

/// A known client (`>client-names`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedClient {
    pub name: String,
    pub address: String,
}

/// Most recent per-client bucket
pub fn latest_client_bucket(buckets: &[ClientTimeBucket]) -> Option<&ClientTimeBucket> {
    buckets.iter().max_by_key(|b| b.timestamp)
}

/// Pair each positional count with the address of the matching client
///
/// Counts past the end of `names` are labelled `address_<i>`.
pub fn label_client_counts(bucket: &ClientTimeBucket, names: &[NamedClient]) -> Vec<LabeledCount> {
    bucket
        .counts
        .iter()
        .enumerate()
        .map(|(i, &count)| LabeledCount {
            label: names
                .get(i)
                .map(|client| client.address.clone())
                .unwrap_or_else(|| format!("address_{}", i)),
            count,
        })
        .collect()
}

/// Render any result as pretty-printed JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| FtlError::Serialization(e.to_string()))
}
