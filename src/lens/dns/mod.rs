//! DNS record scan lens
//!
//! This module scans a domain name across a fixed set of record types and
//! normalizes the answers into flat rows. Resolution runs against either the
//! system-configured resolvers or one explicitly supplied nameserver; the
//! resolver is constructed per call, so no process-wide resolver state exists.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::Resolver;
use serde::{Serialize, Serializer};
use tabled::Tabled;
use tracing::debug;

// =============================================================================
// Types
// =============================================================================

/// The fixed, ordered set of record types scanned for every domain
pub const RECORD_TYPES: [RecordType; 16] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::NS,
    RecordType::SOA,
    RecordType::PTR,
    RecordType::SRV,
    RecordType::TXT,
    RecordType::CAA,
    RecordType::DS,
    RecordType::DNSKEY,
    RecordType::RRSIG,
    RecordType::NSEC,
    RecordType::NSEC3,
    RecordType::NSEC3PARAM,
];

/// Default per-lookup timeout
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// A single DNS scan request
#[derive(Debug, Clone)]
pub struct DnsQuery {
    /// Fully qualified domain name to scan
    pub domain: String,
    /// Optional nameserver override; when set, resolution bypasses the
    /// system configuration and uses exactly this server
    pub nameserver: Option<IpAddr>,
}

impl DnsQuery {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            nameserver: None,
        }
    }

    pub fn with_nameserver(mut self, nameserver: IpAddr) -> Self {
        self.nameserver = Some(nameserver);
        self
    }
}

/// Outcome classification for one record-type lookup
///
/// `Skipped` marks expected absences (NXDOMAIN/NODATA); those never surface
/// as output rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Success,
    Skipped,
    Error(String),
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Success => write!(f, "✓"),
            RecordStatus::Skipped => write!(f, "skipped"),
            RecordStatus::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl Serialize for RecordStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One answer (or one isolated failure) for a scanned record type
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct DnsRecordResult {
    /// Record type that was queried
    #[serde(serialize_with = "serialize_record_type")]
    #[tabled(rename = "Record Type")]
    pub rtype: RecordType,
    /// Textual representation of the answer; empty on error
    #[tabled(rename = "Data")]
    pub data: String,
    #[tabled(rename = "Status")]
    pub status: RecordStatus,
}

fn serialize_record_type<S: Serializer>(
    rtype: &RecordType,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(rtype)
}

/// Result of a full scan over all record types
#[derive(Debug, Clone, Serialize)]
pub struct DnsScan {
    /// Display address of the resolver used: the override if one was given,
    /// else the first system-configured resolver, else "unknown"
    pub nameserver: String,
    /// Rows in record-type-list order; within one type, resolver return order
    pub records: Vec<DnsRecordResult>,
}

// =============================================================================
// Lens
// =============================================================================

/// DNS record scan lens
///
/// Attempts each of the 16 supported record types independently; a failure on
/// one type never aborts the rest of the scan.
pub struct DnsLens {
    timeout: Duration,
}

impl DnsLens {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Create a lens with a custom per-lookup timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Scan all supported record types for the queried domain
    ///
    /// Returns an error only when the resolver itself cannot be constructed
    /// (e.g., unreadable system configuration); per-record failures are
    /// reported inline as `RecordStatus::Error` rows.
    pub fn resolve(&self, query: &DnsQuery) -> Result<DnsScan> {
        let (resolver_config, mut opts, nameserver) = match query.nameserver {
            Some(ip) => {
                let group = NameServerConfigGroup::from_ips_clear(&[ip], 53, true);
                (
                    ResolverConfig::from_parts(None, vec![], group),
                    ResolverOpts::default(),
                    ip.to_string(),
                )
            }
            None => {
                let (resolver_config, opts) = read_system_conf()
                    .context("failed to read system resolver configuration")?;
                let nameserver = resolver_config
                    .name_servers()
                    .first()
                    .map(|ns| ns.socket_addr.ip().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                (resolver_config, opts, nameserver)
            }
        };

        opts.timeout = self.timeout;
        // no retries: one attempt per record type
        opts.attempts = 1;

        let resolver =
            Resolver::new(resolver_config, opts).context("failed to construct resolver")?;

        let records = scan_with(|rtype| {
            resolver
                .lookup(query.domain.as_str(), rtype)
                .map(|lookup| lookup.iter().map(|rdata| rdata.to_string()).collect())
        });

        Ok(DnsScan {
            nameserver,
            records,
        })
    }
}

/// Run one lookup per supported record type and normalize the outcomes
///
/// Each type is attempted independently; a failure on one type produces at
/// most one error row and never stops the remaining types. Rows appear in
/// record-type-list order, answers within a type in the order returned.
fn scan_with(
    mut lookup: impl FnMut(RecordType) -> Result<Vec<String>, ResolveError>,
) -> Vec<DnsRecordResult> {
    let mut records = Vec::new();
    for rtype in RECORD_TYPES {
        match lookup(rtype) {
            Ok(answers) => {
                for data in answers {
                    records.push(DnsRecordResult {
                        rtype,
                        data,
                        status: RecordStatus::Success,
                    });
                }
            }
            Err(e) => match classify_resolve_error(&e) {
                RecordStatus::Skipped => {
                    debug!("no {} records returned", rtype);
                }
                status => {
                    records.push(DnsRecordResult {
                        rtype,
                        data: String::new(),
                        status,
                    });
                }
            },
        }
    }
    records
}

impl Default for DnsLens {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a resolution failure: NXDOMAIN/NODATA are expected absences and
/// yield no row; anything else is an isolated per-record error
fn classify_resolve_error(err: &ResolveError) -> RecordStatus {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => RecordStatus::Skipped,
        _ => RecordStatus::Error(err.to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::proto::op::{Query, ResponseCode};
    use hickory_resolver::proto::rr::Name;

    fn no_records_err(rtype: RecordType) -> ResolveError {
        let name = Name::from_ascii("example.com.").unwrap();
        ResolveError::from(ResolveErrorKind::NoRecordsFound {
            query: Box::new(Query::query(name, rtype)),
            soa: None,
            negative_ttl: None,
            response_code: ResponseCode::NXDomain,
            trusted: false,
        })
    }

    #[test]
    fn test_record_type_list() {
        assert_eq!(RECORD_TYPES.len(), 16);
        assert_eq!(RECORD_TYPES[0], RecordType::A);
        assert_eq!(RECORD_TYPES[15], RecordType::NSEC3PARAM);
    }

    #[test]
    fn test_classify_no_records_found_is_skipped() {
        let err = no_records_err(RecordType::MX);
        assert_eq!(classify_resolve_error(&err), RecordStatus::Skipped);
    }

    #[test]
    fn test_scan_isolates_failures_and_preserves_order() {
        // A answers, SOA times out, TXT answers twice, everything else NODATA;
        // record-type order is A .. SOA .. TXT
        let rows = scan_with(|rtype| match rtype {
            RecordType::A => Ok(vec!["93.184.215.14".to_string()]),
            RecordType::SOA => Err(ResolveError::from(ResolveErrorKind::Timeout)),
            RecordType::TXT => Ok(vec!["v=spf1 -all".to_string(), "token=abc".to_string()]),
            other => Err(no_records_err(other)),
        });

        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].rtype, RecordType::A);
        assert_eq!(rows[0].data, "93.184.215.14");
        assert_eq!(rows[0].status, RecordStatus::Success);

        // exactly one row for the failed type, empty data, non-empty message
        assert_eq!(rows[1].rtype, RecordType::SOA);
        assert!(rows[1].data.is_empty());
        match &rows[1].status {
            RecordStatus::Error(msg) => assert!(!msg.is_empty()),
            other => panic!("expected error status, got {:?}", other),
        }

        // the scan continued past the failure; answers keep resolver order
        assert_eq!(rows[2].rtype, RecordType::TXT);
        assert_eq!(rows[2].data, "v=spf1 -all");
        assert_eq!(rows[3].rtype, RecordType::TXT);
        assert_eq!(rows[3].data, "token=abc");
    }

    #[test]
    fn test_scan_all_nodata_yields_no_rows() {
        let rows = scan_with(|rtype| Err(no_records_err(rtype)));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_classify_other_failures_are_errors() {
        let err = ResolveError::from(ResolveErrorKind::Message("connection refused"));
        match classify_resolve_error(&err) {
            RecordStatus::Error(msg) => assert!(msg.contains("connection refused")),
            other => panic!("expected error status, got {:?}", other),
        }

        let err = ResolveError::from(ResolveErrorKind::Timeout);
        assert!(matches!(
            classify_resolve_error(&err),
            RecordStatus::Error(_)
        ));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RecordStatus::Success.to_string(), "✓");
        assert_eq!(
            RecordStatus::Error("timed out".to_string()).to_string(),
            "Error: timed out"
        );
    }

    #[test]
    fn test_query_builder() {
        let query = DnsQuery::new("example.com").with_nameserver("9.9.9.9".parse().unwrap());
        assert_eq!(query.domain, "example.com");
        assert_eq!(query.nameserver, Some("9.9.9.9".parse().unwrap()));
    }

    #[test]
    fn test_record_result_json_shape() {
        let row = DnsRecordResult {
            rtype: RecordType::A,
            data: "93.184.215.14".to_string(),
            status: RecordStatus::Success,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["rtype"], "A");
        assert_eq!(value["data"], "93.184.215.14");
        assert_eq!(value["status"], "✓");
    }
}
