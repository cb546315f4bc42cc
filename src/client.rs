//! FTL client
//!
//! One operation per daemon command. Every call dials its own connection,
//! writes the command, decodes the answer and closes the connection again.

use crate::config::Config;
use crate::error::Result;
use crate::model::{
    ClientTimeBucket, DatabaseStats, EngineStats, NamedClient, QueryTypes, RankedList,
    TimeSeries, UpstreamDestination,
};
use crate::network::{Connection, ResponseReader};
use crate::protocol::{self, Command};

/// Client for the FTL daemon's API socket
///
/// Holds only read-only configuration, so it can be shared across threads
/// and used for concurrent calls.
#[derive(Debug, Clone)]
pub struct FtlClient {
    config: Config,
}

impl FtlClient {
    /// Create a client; does not dial
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a client and verify the socket accepts connections
    pub fn connect(config: Config) -> Result<Self> {
        let client = Self::new(config)?;
        client.check_connection()?;
        Ok(client)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dial the socket once and hang up without sending anything
    pub fn check_connection(&self) -> Result<()> {
        Connection::open(&self.config)?.close();
        Ok(())
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// `>stats`
    pub fn stats(&self) -> Result<EngineStats> {
        self.call(Command::Stats, protocol::decode_stats)
    }

    /// `>dbstats`
    pub fn db_stats(&self) -> Result<DatabaseStats> {
        self.call(Command::DbStats, protocol::decode_db_stats)
    }

    /// `>top-domains`: most queried permitted domains
    pub fn top_domains(&self) -> Result<RankedList> {
        self.call(Command::TopDomains, protocol::decode_top_queries)
    }

    /// `>top-ads`: most queried blocked domains
    pub fn top_ads(&self) -> Result<RankedList> {
        self.call(Command::TopAds, protocol::decode_top_queries)
    }

    /// `>top-clients`: clients by query count, labelled by address
    pub fn top_clients(&self) -> Result<RankedList> {
        self.call(Command::TopClients, protocol::decode_top_clients)
    }

    /// `>top-clients blocked`: clients by blocked query count
    pub fn top_blocked_clients(&self) -> Result<RankedList> {
        self.call(Command::TopBlockedClients, protocol::decode_top_clients)
    }

    /// `>forward-dest`
    pub fn forward_destinations(&self) -> Result<Vec<UpstreamDestination>> {
        self.call(Command::ForwardDestinations, protocol::decode_forward_destinations)
    }

    /// `>querytypes`
    pub fn query_types(&self) -> Result<QueryTypes> {
        self.call(Command::QueryTypes, protocol::decode_query_types)
    }

    /// `>overTime`: forwarded and blocked queries in 10 minute buckets
    pub fn queries_over_time(&self) -> Result<TimeSeries> {
        self.call(Command::OverTime, protocol::decode_over_time)
    }

    /// `>ClientsoverTime`: per-client counts in 10 minute buckets
    ///
    /// Not part of the daemon's documented API. Counts are positional; pair
    /// them with [`FtlClient::client_names`].
    pub fn clients_over_time(&self) -> Result<Vec<ClientTimeBucket>> {
        self.call(Command::ClientsOverTime, protocol::decode_clients_over_time)
    }

    /// `>client-names`: known clients in the order used by `>ClientsoverTime`
    pub fn client_names(&self) -> Result<Vec<NamedClient>> {
        self.call(Command::ClientNames, protocol::decode_client_names)
    }

    fn call<T>(
        &self,
        command: Command,
        decode: fn(&mut ResponseReader) -> Result<T>,
    ) -> Result<T> {
        Connection::open(&self.config)?.request(command, decode)
    }
}
