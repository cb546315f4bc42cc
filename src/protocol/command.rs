//! Command definitions
//!
//! The ASCII literals understood by the daemon's socket API.

use std::fmt;

/// A daemon command
///
/// Each command is written verbatim (no trailing newline) on a freshly
/// dialed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Stats,
    DbStats,
    TopDomains,
    TopAds,
    TopClients,
    TopBlockedClients,
    ForwardDestinations,
    QueryTypes,
    OverTime,
    ClientsOverTime,
    ClientNames,
}

impl Command {
    /// Every command, in the order the CLI lists them
    pub const ALL: [Command; 11] = [
        Command::Stats,
        Command::DbStats,
        Command::TopDomains,
        Command::TopAds,
        Command::TopClients,
        Command::TopBlockedClients,
        Command::ForwardDestinations,
        Command::QueryTypes,
        Command::OverTime,
        Command::ClientsOverTime,
        Command::ClientNames,
    ];

    /// The literal sent on the wire
    pub fn literal(&self) -> &'static str {
        match self {
            Command::Stats => ">stats",
            Command::DbStats => ">dbstats",
            Command::TopDomains => ">top-domains",
            Command::TopAds => ">top-ads",
            Command::TopClients => ">top-clients",
            Command::TopBlockedClients => ">top-clients blocked",
            Command::ForwardDestinations => ">forward-dest",
            Command::QueryTypes => ">querytypes",
            Command::OverTime => ">overTime",
            Command::ClientsOverTime => ">ClientsoverTime",
            Command::ClientNames => ">client-names",
        }
    }

    /// Look a command up by its wire literal
    pub fn from_literal(literal: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|c| c.literal() == literal)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}
