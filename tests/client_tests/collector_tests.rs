//! Tests for the parallel Collector
//!
//! These tests verify:
//! - Every group lands in its own outcome
//! - A failing group does not affect the others
//! - The `>ClientsoverTime` group is opt-in

use std::time::Duration;

use ftlwire::collector::ClientActivity;
use ftlwire::model::{ClientTimeBucket, LabeledCount, NamedClient};
use ftlwire::network::{StubDaemon, StubHandle};
use ftlwire::protocol::{tag, Command, FrameBuilder};
use ftlwire::{Collector, Config, FtlClient, FtlError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn ranked(total: i32, label: &str, count: i32) -> bytes::Bytes {
    FrameBuilder::new()
        .int32(total)
        .string(label)
        .int32(count)
        .end()
        .freeze()
}

fn ranked_clients(total: i32, address: &str, count: i32) -> bytes::Bytes {
    FrameBuilder::new()
        .int32(total)
        .string("")
        .string(address)
        .int32(count)
        .end()
        .freeze()
}

/// A daemon answering everything except `>dbstats`
fn stub_without_db_stats(temp_dir: &TempDir) -> StubDaemon {
    let stats = FrameBuilder::new()
        .int32(100)
        .int32(50)
        .int32(5)
        .float32(10.0)
        .int32(20)
        .int32(30)
        .int32(15)
        .int32(3)
        .int32(2)
        .uint8(1)
        .end()
        .freeze();

    StubDaemon::new(temp_dir.path().join("FTL.sock"))
        .respond(Command::Stats, stats)
        .respond(Command::TopDomains, ranked(45, "example.com", 40))
        .respond(Command::TopAds, ranked(5, "ads.example", 5))
        .respond(Command::TopClients, ranked_clients(50, "10.0.0.2", 30))
        .respond(Command::TopBlockedClients, ranked_clients(5, "10.0.0.3", 4))
        .respond(
            Command::ForwardDestinations,
            FrameBuilder::new()
                .string("dns.example")
                .string("192.0.2.53")
                .float32(60.0)
                .end()
                .freeze(),
        )
        .respond(
            Command::QueryTypes,
            FrameBuilder::new()
                .string("A (IPv4)")
                .float32(75.0)
                .string("AAAA (IPv6)")
                .float32(25.0)
                .end()
                .freeze(),
        )
        .respond(
            Command::OverTime,
            FrameBuilder::new()
                .map16(2)
                .int32(600)
                .int32(4)
                .int32(1200)
                .int32(6)
                .map16(2)
                .int32(600)
                .int32(1)
                .int32(1200)
                .int32(0)
                .freeze(),
        )
        .respond(
            Command::ClientsOverTime,
            FrameBuilder::new()
                .raw_u32(tag::INT32, 600)
                .int32(1)
                .int32(2)
                .int32(-1)
                .raw_u32(tag::INT32, 1200)
                .int32(3)
                .int32(0)
                .int32(-1)
                .end()
                .freeze(),
        )
        .respond(
            Command::ClientNames,
            FrameBuilder::new()
                .string("laptop")
                .string("10.0.0.2")
                .string("")
                .string("10.0.0.3")
                .end()
                .freeze(),
        )
}

fn collector_for(stub: &StubHandle) -> Collector {
    let config = Config::builder()
        .socket_path(stub.socket_path())
        .read_timeout_ms(300)
        .build();
    Collector::new(FtlClient::new(config).unwrap())
}

// =============================================================================
// Collection Tests
// =============================================================================

#[test]
fn test_failing_group_is_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let stub = stub_without_db_stats(&temp_dir).spawn().unwrap();

    let snapshot = collector_for(&stub).collect().unwrap();

    // The stub never answers >dbstats; the read times out
    assert!(matches!(snapshot.db_stats.error(), Some(FtlError::Read(_))));

    assert_eq!(snapshot.stats.value().unwrap().dns_queries_today, 50);
    assert_eq!(snapshot.top_domains.value().unwrap().total, 45);
    assert_eq!(snapshot.top_ads.value().unwrap().entries.len(), 1);
    assert_eq!(
        snapshot.top_clients.value().unwrap().entries,
        vec![LabeledCount { label: "10.0.0.2".into(), count: 30 }]
    );
    assert_eq!(snapshot.top_blocked_clients.value().unwrap().total, 5);
    assert_eq!(
        snapshot.forward_destinations.value().unwrap()[0].address,
        "192.0.2.53"
    );
    assert_eq!(snapshot.query_types.value().unwrap().len(), 2);
    assert_eq!(
        snapshot
            .queries_over_time
            .value()
            .unwrap()
            .latest_forwarded()
            .map(|b| b.count),
        Some(6)
    );

    assert!(!snapshot.all_succeeded());
    let failed: Vec<_> = snapshot
        .statuses()
        .into_iter()
        .filter(|s| !s.success)
        .map(|s| s.group)
        .collect();
    assert_eq!(failed, vec!["db_stats"]);
}

#[test]
fn test_clients_over_time_disabled_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let stub = stub_without_db_stats(&temp_dir).spawn().unwrap();

    let snapshot = collector_for(&stub).collect().unwrap();

    assert!(snapshot.clients_over_time.is_none());
    assert_eq!(snapshot.statuses().len(), 9);

    stub.wait_for_closed(9, Duration::from_secs(5)).unwrap();
    let requests = stub.requests();
    assert!(!requests.iter().any(|r| r == ">ClientsoverTime"));
    assert!(!requests.iter().any(|r| r == ">client-names"));
}

#[test]
fn test_clients_over_time_enabled() {
    let temp_dir = TempDir::new().unwrap();
    let stub = stub_without_db_stats(&temp_dir).spawn().unwrap();

    let snapshot = collector_for(&stub)
        .with_clients_over_time(true)
        .collect()
        .unwrap();

    let outcome = snapshot.clients_over_time.as_ref().unwrap();
    let activity = outcome.value().unwrap();
    assert_eq!(activity.buckets.len(), 2);
    assert_eq!(activity.names.len(), 2);
    assert_eq!(
        activity.latest_labeled(),
        vec![
            LabeledCount { label: "10.0.0.2".into(), count: 3 },
            LabeledCount { label: "10.0.0.3".into(), count: 0 },
        ]
    );
    assert_eq!(snapshot.statuses().len(), 10);
}

#[test]
fn test_unreachable_daemon_fails_every_group() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .socket_path(temp_dir.path().join("absent.sock"))
        .build();
    let collector = Collector::new(FtlClient::new(config).unwrap()).with_clients_over_time(true);

    let snapshot = collector.collect().unwrap();

    let statuses = snapshot.statuses();
    assert_eq!(statuses.len(), 10);
    assert!(statuses.iter().all(|s| !s.success && s.error.is_some()));
    assert!(snapshot.stats.error().unwrap().is_transport());
}

#[test]
fn test_latest_labeled_without_buckets() {
    let activity = ClientActivity {
        buckets: Vec::new(),
        names: vec![NamedClient { name: "nas".into(), address: "10.0.0.9".into() }],
    };
    assert!(activity.latest_labeled().is_empty());

    let activity = ClientActivity {
        buckets: vec![ClientTimeBucket { timestamp: 1, counts: vec![8] }],
        names: Vec::new(),
    };
    assert_eq!(
        activity.latest_labeled(),
        vec![LabeledCount { label: "address_0".into(), count: 8 }]
    );
}
