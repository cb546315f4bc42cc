//! Collector Module
//!
//! Fetches every command group in parallel, each on its own connection, and
//! keeps each group's result separate so one failing command does not hide
//! the others.
//!
//! ## Groups
//! - stats, db_stats, query_types, forward_destinations
//! - top_domains, top_ads, top_clients, top_blocked_clients
//! - queries_over_time
//! - clients_over_time (`>ClientsoverTime` + `>client-names`, opt-in since
//!   the command is undocumented)

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::client::FtlClient;
use crate::error::{FtlError, Result};
use crate::model::{
    label_client_counts, latest_client_bucket, ClientTimeBucket, DatabaseStats, EngineStats,
    LabeledCount, NamedClient, QueryTypes, RankedList, TimeSeries, UpstreamDestination,
};

/// Result of one group together with how long it took
#[derive(Debug)]
pub struct GroupOutcome<T> {
    pub result: Result<T>,
    pub duration: Duration,
}

impl<T> GroupOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&FtlError> {
        self.result.as_ref().err()
    }
}

/// Per-client activity: the buckets and the names they are positional to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientActivity {
    pub buckets: Vec<ClientTimeBucket>,
    pub names: Vec<NamedClient>,
}

impl ClientActivity {
    /// Counts of the most recent bucket, labelled by client address
    pub fn latest_labeled(&self) -> Vec<LabeledCount> {
        latest_client_bucket(&self.buckets)
            .map(|bucket| label_client_counts(bucket, &self.names))
            .unwrap_or_default()
    }
}

/// One round of collection
#[derive(Debug)]
pub struct Snapshot {
    pub stats: GroupOutcome<EngineStats>,
    pub db_stats: GroupOutcome<DatabaseStats>,
    pub top_domains: GroupOutcome<RankedList>,
    pub top_ads: GroupOutcome<RankedList>,
    pub top_clients: GroupOutcome<RankedList>,
    pub top_blocked_clients: GroupOutcome<RankedList>,
    pub forward_destinations: GroupOutcome<Vec<UpstreamDestination>>,
    pub query_types: GroupOutcome<QueryTypes>,
    pub queries_over_time: GroupOutcome<TimeSeries>,
    /// `None` when the group is disabled
    pub clients_over_time: Option<GroupOutcome<ClientActivity>>,
}

/// Summary line for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatus {
    pub group: &'static str,
    pub success: bool,
    pub duration_secs: f64,
    pub error: Option<String>,
}

impl Snapshot {
    /// Status of every group that ran, in a fixed order
    pub fn statuses(&self) -> Vec<GroupStatus> {
        let mut statuses = vec![
            status("stats", &self.stats),
            status("db_stats", &self.db_stats),
            status("top_domains", &self.top_domains),
            status("top_ads", &self.top_ads),
            status("top_clients", &self.top_clients),
            status("top_blocked_clients", &self.top_blocked_clients),
            status("forward_destinations", &self.forward_destinations),
            status("query_types", &self.query_types),
            status("queries_over_time", &self.queries_over_time),
        ];
        if let Some(ref outcome) = self.clients_over_time {
            statuses.push(status("clients_over_time", outcome));
        }
        statuses
    }

    /// True when every group that ran succeeded
    pub fn all_succeeded(&self) -> bool {
        self.statuses().iter().all(|s| s.success)
    }
}

fn status<T>(group: &'static str, outcome: &GroupOutcome<T>) -> GroupStatus {
    GroupStatus {
        group,
        success: outcome.is_success(),
        duration_secs: outcome.duration.as_secs_f64(),
        error: outcome.error().map(|e| e.to_string()),
    }
}

/// Runs all groups against one daemon
pub struct Collector {
    client: FtlClient,
    clients_over_time: bool,
}

impl Collector {
    pub fn new(client: FtlClient) -> Self {
        Self {
            client,
            clients_over_time: false,
        }
    }

    /// Also collect `>ClientsoverTime` (off by default)
    pub fn with_clients_over_time(mut self, enabled: bool) -> Self {
        self.clients_over_time = enabled;
        self
    }

    pub fn client(&self) -> &FtlClient {
        &self.client
    }

    /// Fetch every enabled group concurrently
    ///
    /// Errors inside a group land in that group's outcome. The call itself
    /// fails only if a worker thread panicked.
    pub fn collect(&self) -> Result<Snapshot> {
        let client = &self.client;
        let started = Instant::now();

        let snapshot = crossbeam::scope(|s| {
            let stats = s.spawn(|_| timed("stats", || client.stats()));
            let db_stats = s.spawn(|_| timed("db_stats", || client.db_stats()));
            let top_domains = s.spawn(|_| timed("top_domains", || client.top_domains()));
            let top_ads = s.spawn(|_| timed("top_ads", || client.top_ads()));
            let top_clients = s.spawn(|_| timed("top_clients", || client.top_clients()));
            let top_blocked_clients =
                s.spawn(|_| timed("top_blocked_clients", || client.top_blocked_clients()));
            let forward_destinations =
                s.spawn(|_| timed("forward_destinations", || client.forward_destinations()));
            let query_types = s.spawn(|_| timed("query_types", || client.query_types()));
            let queries_over_time =
                s.spawn(|_| timed("queries_over_time", || client.queries_over_time()));
            let clients_over_time = self.clients_over_time.then(|| {
                s.spawn(|_| {
                    timed("clients_over_time", || {
                        Ok(ClientActivity {
                            buckets: client.clients_over_time()?,
                            names: client.client_names()?,
                        })
                    })
                })
            });

            Snapshot {
                stats: join(stats.join()),
                db_stats: join(db_stats.join()),
                top_domains: join(top_domains.join()),
                top_ads: join(top_ads.join()),
                top_clients: join(top_clients.join()),
                top_blocked_clients: join(top_blocked_clients.join()),
                forward_destinations: join(forward_destinations.join()),
                query_types: join(query_types.join()),
                queries_over_time: join(queries_over_time.join()),
                clients_over_time: clients_over_time.map(|handle| join(handle.join())),
            }
        })
        .map_err(|_| FtlError::Protocol("collector thread panicked".to_string()))?;

        tracing::debug!(
            "Collected {} groups in {:?}",
            snapshot.statuses().len(),
            started.elapsed()
        );

        Ok(snapshot)
    }
}

fn timed<T>(group: &'static str, fetch: impl FnOnce() -> Result<T>) -> GroupOutcome<T> {
    let begin = Instant::now();
    let result = fetch();
    let duration = begin.elapsed();

    if let Err(ref e) = result {
        tracing::warn!("Collector {} failed: {}", group, e);
    }

    GroupOutcome { result, duration }
}

fn join<T>(joined: std::thread::Result<GroupOutcome<T>>) -> GroupOutcome<T> {
    joined.unwrap_or_else(|_| GroupOutcome {
        result: Err(FtlError::Protocol("collector thread panicked".to_string())),
        duration: Duration::ZERO,
    })
}
