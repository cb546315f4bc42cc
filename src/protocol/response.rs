//! Response decoders
//!
//! One decoder per daemon command. Each is a pure function from a buffered
//! byte stream to a typed result and follows one of four framings:
//!
//! - **Fixed record**: a known field sequence, no terminator
//!   (`>stats`, `>dbstats`)
//! - **Total + sentinel list**: leading int32 total, entries until END
//!   (`>top-domains`, `>top-ads`, `>top-clients`, `>top-clients blocked`)
//! - **Bare sentinel list**: entries until END
//!   (`>forward-dest`, `>querytypes`, `>client-names`)
//! - **Explicit arrays / nested groups**: map16-counted pairs (`>overTime`);
//!   untagged timestamps with −1 terminated counts (`>ClientsoverTime`)
//!
//! A list ends when END (or a clean close) sits where the next entry's
//! first field would start. Anything else wrong aborts the decode.

use std::io::BufRead;

use super::codec::{required, tag, WireReader};
use crate::error::Result;
use crate::model::{
    ClientTimeBucket, DatabaseStats, EngineStats, LabeledCount, NamedClient, QueryTypes,
    RankedList, TimeBucket, TimeSeries, UpstreamDestination,
};

/// Data-level terminator of a `>ClientsoverTime` count group
const CLIENT_COUNTS_END: i32 = -1;

// =============================================================================
// Fixed Records
// =============================================================================

/// Decode a `>stats` response
pub fn decode_stats<R: BufRead>(reader: &mut WireReader<R>) -> Result<EngineStats> {
    Ok(EngineStats {
        domains_being_blocked: counter(reader, "domains being blocked")?,
        dns_queries_today: counter(reader, "dns queries today")?,
        ads_blocked_today: counter(reader, "ads blocked today")?,
        ads_percentage_today: required(reader.read_f32()?, "ads percentage today")?,
        unique_domains: counter(reader, "unique domains")?,
        queries_forwarded: counter(reader, "queries forwarded")?,
        queries_cached: counter(reader, "queries cached")?,
        clients_ever_seen: counter(reader, "clients ever seen")?,
        unique_clients: counter(reader, "unique clients")?,
        status: required(reader.read_u8()?, "status")?,
    })
}

/// Decode a `>dbstats` response
pub fn decode_db_stats<R: BufRead>(reader: &mut WireReader<R>) -> Result<DatabaseStats> {
    let rows = counter(reader, "database rows")?;
    let file_size = required(reader.read_i64()?, "database file size")? as u64;
    Ok(DatabaseStats { rows, file_size })
}

// =============================================================================
// Total + Sentinel Lists
// =============================================================================

/// Decode `>top-domains` / `>top-ads`: label + count entries
pub fn decode_top_queries<R: BufRead>(reader: &mut WireReader<R>) -> Result<RankedList> {
    let total = counter(reader, "total")?;
    let mut entries = Vec::new();

    while let Some(label) = next_string(reader)? {
        let count = counter(reader, "query count")?;
        entries.push(LabeledCount { label, count });
    }

    tracing::trace!("Decoded {} ranked entries (total {})", entries.len(), total);
    Ok(RankedList { total, entries })
}

/// Decode `>top-clients` / `>top-clients blocked`
///
/// Each entry starts with a string the daemon always sends and nobody
/// documents; it is read and dropped. The label is the client address.
pub fn decode_top_clients<R: BufRead>(reader: &mut WireReader<R>) -> Result<RankedList> {
    let total = counter(reader, "total")?;
    let mut entries = Vec::new();

    while next_string(reader)?.is_some() {
        let label = required(reader.read_string()?, "client address")?;
        let count = counter(reader, "client count")?;
        entries.push(LabeledCount { label, count });
    }

    tracing::trace!("Decoded {} client entries (total {})", entries.len(), total);
    Ok(RankedList { total, entries })
}

// =============================================================================
// Bare Sentinel Lists
// =============================================================================

/// Decode a `>forward-dest` response
pub fn decode_forward_destinations<R: BufRead>(
    reader: &mut WireReader<R>,
) -> Result<Vec<UpstreamDestination>> {
    let mut destinations = Vec::new();

    while let Some(name) = next_string(reader)? {
        let address = required(reader.read_string()?, "destination address")?;
        let percentage = required(reader.read_f32()?, "destination percentage")?;
        destinations.push(UpstreamDestination {
            name,
            address,
            percentage,
        });
    }

    Ok(destinations)
}

/// Decode a `>querytypes` response
pub fn decode_query_types<R: BufRead>(reader: &mut WireReader<R>) -> Result<QueryTypes> {
    let mut query_types = QueryTypes::new();

    while let Some(name) = next_string(reader)? {
        let percentage = required(reader.read_f32()?, "query type percentage")?;
        query_types.insert(name, percentage);
    }

    Ok(query_types)
}

/// Decode a `>client-names` response
pub fn decode_client_names<R: BufRead>(reader: &mut WireReader<R>) -> Result<Vec<NamedClient>> {
    let mut clients = Vec::new();

    while let Some(name) = next_string(reader)? {
        let address = required(reader.read_string()?, "client address")?;
        clients.push(NamedClient { name, address });
    }

    Ok(clients)
}

// =============================================================================
// Arrays and Nested Groups
// =============================================================================

/// Decode an `>overTime` response
///
/// Two map16-counted arrays of (timestamp, count) pairs: forwarded first,
/// then blocked. The counts are explicit, so no END is read.
pub fn decode_over_time<R: BufRead>(reader: &mut WireReader<R>) -> Result<TimeSeries> {
    let forwarded = read_buckets(reader)?;
    let blocked = read_buckets(reader)?;
    Ok(TimeSeries { forwarded, blocked })
}

fn read_buckets<R: BufRead>(reader: &mut WireReader<R>) -> Result<Vec<TimeBucket>> {
    let len = required(reader.read_map16()?, "bucket count")?;
    let mut buckets = Vec::with_capacity(len as usize);

    for _ in 0..len {
        let timestamp = counter(reader, "bucket timestamp")?;
        let count = counter(reader, "bucket count")?;
        buckets.push(TimeBucket { timestamp, count });
    }

    Ok(buckets)
}

/// Decode a `>ClientsoverTime` response
///
/// Two different terminators are in play and must stay distinct:
/// - a bucket group ends on a tag-level END in place of the next timestamp;
/// - a bucket's counts end on a decoded int32 value of −1.
///
/// The timestamp's lead byte is not checked and its four bytes are read
/// raw, unlike every other integer in the protocol.
pub fn decode_clients_over_time<R: BufRead>(
    reader: &mut WireReader<R>,
) -> Result<Vec<ClientTimeBucket>> {
    let mut buckets = Vec::new();

    loop {
        if reader.at_eof()? || reader.read_tag("timestamp")? == tag::END {
            break;
        }

        let timestamp = reader.read_raw_u32("timestamp")?;
        let mut counts = Vec::new();

        loop {
            let value = required(reader.read_i32()?, "client count")?;
            if value == CLIENT_COUNTS_END {
                break;
            }
            counts.push(value as u32);
        }

        buckets.push(ClientTimeBucket { timestamp, counts });
    }

    tracing::trace!("Decoded {} client buckets", buckets.len());
    Ok(buckets)
}

// =============================================================================
// Helpers
// =============================================================================

/// Mandatory int32 carrying an unsigned counter
fn counter<R: BufRead>(reader: &mut WireReader<R>, expected: &'static str) -> Result<u32> {
    required(reader.read_i32()?, expected).map(|value| value as u32)
}

/// First field of a list entry; `None` ends the list
fn next_string<R: BufRead>(reader: &mut WireReader<R>) -> Result<Option<String>> {
    if reader.at_eof()? {
        return Ok(None);
    }
    reader.read_string()
}

