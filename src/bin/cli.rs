//! ftl-query
//!
//! Sends one command (or all of them) to the FTL socket and prints the
//! decoded result.

use std::fmt::Debug;

use clap::{Parser, Subcommand};
use ftlwire::config::DEFAULT_SOCKET_PATH;
use ftlwire::model::to_json;
use ftlwire::{Collector, Config, FtlClient, Result};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Query the Pi-hole FTL daemon
#[derive(Parser, Debug)]
#[command(name = "ftl-query")]
#[command(about = "Query the Pi-hole FTL daemon over its Unix socket")]
#[command(version)]
struct Args {
    /// FTL socket path
    #[arg(short, long, default_value = DEFAULT_SOCKET_PATH)]
    socket: String,

    /// Print results as JSON
    #[arg(short, long)]
    json: bool,

    /// Read timeout in milliseconds (0 = wait forever)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout in milliseconds (0 = wait forever)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the socket accepts connections
    Check,

    /// Daemon counters (>stats)
    Stats,

    /// Query log database size (>dbstats)
    DbStats,

    /// Most queried domains (>top-domains)
    TopDomains,

    /// Most queried ad domains (>top-ads)
    TopAds,

    /// Most active clients (>top-clients)
    TopClients {
        /// Rank by blocked queries instead
        #[arg(long)]
        blocked: bool,
    },

    /// Upstream destinations (>forward-dest)
    ForwardDest,

    /// Query type shares (>querytypes)
    QueryTypes,

    /// Forwarded and blocked queries over time (>overTime)
    OverTime,

    /// Per-client queries over time (>ClientsoverTime)
    ClientsOverTime,

    /// Known clients (>client-names)
    ClientNames,

    /// Every command, in parallel
    All {
        /// Include the undocumented >ClientsoverTime command
        #[arg(long)]
        clients_over_time: bool,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ftlwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("ftl-query v{}", ftlwire::VERSION);
    tracing::debug!("Socket: {}", args.socket);

    let config = Config::builder()
        .socket_path(&args.socket)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    if let Err(e) = run(config, args.command, args.json) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: Config, command: Commands, json: bool) -> Result<()> {
    let client = FtlClient::new(config)?;

    match command {
        Commands::Check => {
            client.check_connection()?;
            println!("ok");
        }
        Commands::Stats => print(&client.stats()?, json)?,
        Commands::DbStats => print(&client.db_stats()?, json)?,
        Commands::TopDomains => print(&client.top_domains()?, json)?,
        Commands::TopAds => print(&client.top_ads()?, json)?,
        Commands::TopClients { blocked: false } => print(&client.top_clients()?, json)?,
        Commands::TopClients { blocked: true } => print(&client.top_blocked_clients()?, json)?,
        Commands::ForwardDest => print(&client.forward_destinations()?, json)?,
        Commands::QueryTypes => print(&client.query_types()?, json)?,
        Commands::OverTime => print(&client.queries_over_time()?, json)?,
        Commands::ClientsOverTime => print(&client.clients_over_time()?, json)?,
        Commands::ClientNames => print(&client.client_names()?, json)?,
        Commands::All { clients_over_time } => {
            let snapshot = Collector::new(client)
                .with_clients_over_time(clients_over_time)
                .collect()?;
            print_snapshot(&snapshot, json)?;
        }
    }

    Ok(())
}

fn print<T: Serialize + Debug>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(value)?);
    } else {
        println!("{:#?}", value);
    }
    Ok(())
}

fn print_snapshot(snapshot: &ftlwire::Snapshot, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "groups": snapshot.statuses(),
            "stats": snapshot.stats.value(),
            "db_stats": snapshot.db_stats.value(),
            "top_domains": snapshot.top_domains.value(),
            "top_ads": snapshot.top_ads.value(),
            "top_clients": snapshot.top_clients.value(),
            "top_blocked_clients": snapshot.top_blocked_clients.value(),
            "forward_destinations": snapshot.forward_destinations.value(),
            "query_types": snapshot.query_types.value(),
            "queries_over_time": snapshot.queries_over_time.value(),
            "clients_over_time": snapshot
                .clients_over_time
                .as_ref()
                .and_then(|outcome| outcome.value())
                .map(|activity| activity.latest_labeled()),
        });
        return print(&value, true);
    }

    for status in snapshot.statuses() {
        match status.error {
            None => println!("{:<22} ok     {:.3}s", status.group, status.duration_secs),
            Some(e) => println!("{:<22} FAILED {:.3}s  {}", status.group, status.duration_secs, e),
        }
    }
    Ok(())
}
