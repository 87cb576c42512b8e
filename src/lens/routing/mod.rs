//! Routing-data lookup lens
//!
//! This module classifies a routing token as an ASN or an IP prefix, queries
//! the matching BGPView endpoint, and flattens the nested JSON payload into
//! flat row sets: per-prefix rows for an ASN, or a summary row plus
//! per-upstream detail rows for a prefix.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use ipnet::IpNet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use thiserror::Error;
use tracing::debug;

// =============================================================================
// Types
// =============================================================================

/// Marker used in the status column of rows built from a successful lookup
pub const STATUS_FOUND: &str = "found";

/// Default bound on one HTTP request, connect through body read
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sentinel rendered when a prefix has no usable description
pub const UNKNOWN_DESCRIPTION: &str = "UNKNOWN";

/// Errors surfaced by the routing lens
#[derive(Debug, Error)]
pub enum RoutingLensError {
    /// The token is neither an ASN nor a parseable IP address/subnet
    #[error("the value passed is invalid: {0}; provide a valid ASN or a valid IP address/subnet")]
    InvalidIdentifier(String),

    /// Network/HTTP-layer failure reaching the routing-data API
    #[error("unable to reach the routing-data API: {0}")]
    Transport(#[from] ureq::Error),
}

/// A classified routing token
///
/// Classification is purely syntactic: an all-digit token is an ASN; anything
/// else must parse as an IP network or a bare IP address (promoted to a /32
/// or /128 host network).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingIdentifier {
    Asn(u32),
    Prefix(IpNet),
}

impl FromStr for RoutingIdentifier {
    type Err = RoutingLensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(RoutingLensError::InvalidIdentifier(token.to_string()));
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            return token
                .parse::<u32>()
                .map(RoutingIdentifier::Asn)
                .map_err(|_| RoutingLensError::InvalidIdentifier(token.to_string()));
        }
        if let Ok(net) = token.parse::<IpNet>() {
            // canonical CIDR form: zero out any host bits
            return Ok(RoutingIdentifier::Prefix(net.trunc()));
        }
        if let Ok(addr) = token.parse::<IpAddr>() {
            return Ok(RoutingIdentifier::Prefix(IpNet::from(addr)));
        }
        Err(RoutingLensError::InvalidIdentifier(token.to_string()))
    }
}

/// One IPv4 prefix announced by the queried ASN
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct AsnPrefixRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Prefix")]
    pub prefix: String,
    #[tabled(rename = "CIDR")]
    pub cidr: u8,
    #[tabled(rename = "Status")]
    pub status: String,
}

/// Summary of the queried prefix
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PrefixSummaryRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Prefix")]
    pub prefix: String,
    #[tabled(rename = "IP")]
    pub ip: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "ASN Count")]
    pub asn_count: usize,
    #[tabled(rename = "Status")]
    pub status: String,
}

/// One (owning ASN, upstream ASN) pair for the queried prefix
///
/// An owning ASN with no upstreams contributes zero rows here; it is visible
/// only through the summary row's ASN count. Downstream consumers rely on
/// row count matching upstream count, so this is kept as-is.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct AsnDetailRow {
    #[tabled(rename = "ASN")]
    pub asn: u32,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Country Code")]
    pub country_code: String,
    #[tabled(rename = "Upstream ASN")]
    pub upstream_asn: u32,
    #[tabled(rename = "Upstream ASN Name")]
    pub upstream_name: String,
}

/// Normalized result of a routing lookup
#[derive(Debug, Clone)]
pub enum RoutingReport {
    /// Result of an ASN query: announced IPv4 prefixes
    Asn {
        asn: u32,
        prefixes: Vec<AsnPrefixRow>,
    },
    /// Result of a prefix query: a summary row plus per-upstream detail rows.
    /// The summary is absent when the API returned no usable data.
    Prefix {
        prefix: IpNet,
        summary: Option<PrefixSummaryRow>,
        upstreams: Vec<AsnDetailRow>,
    },
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct AsnPrefixesPayload {
    #[serde(default)]
    ipv4_prefixes: Vec<AsnPrefixEntry>,
    // ipv6_prefixes are deliberately not consulted
}

#[derive(Debug, Deserialize)]
struct AsnPrefixEntry {
    #[serde(default)]
    name: Option<String>,
    prefix: String,
    cidr: u8,
}

#[derive(Debug, Deserialize)]
struct PrefixPayload {
    #[serde(default)]
    name: Option<String>,
    prefix: String,
    ip: String,
    #[serde(default)]
    description_short: Option<String>,
    #[serde(default)]
    asns: Vec<PrefixAsnEntry>,
}

#[derive(Debug, Deserialize)]
struct PrefixAsnEntry {
    asn: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    prefix_upstreams: Vec<UpstreamEntry>,
}

#[derive(Debug, Deserialize)]
struct UpstreamEntry {
    asn: u32,
    #[serde(default)]
    name: Option<String>,
}

// =============================================================================
// Lens
// =============================================================================

/// Routing-data lookup lens
///
/// # Example
///
/// ```rust,ignore
/// use netlens::lens::routing::{RoutingLens, RoutingReport};
///
/// let lens = RoutingLens::new();
/// match lens.lookup("13335")? {
///     RoutingReport::Asn { asn, prefixes } => {
///         println!("AS{} announces {} IPv4 prefixes", asn, prefixes.len());
///     }
///     RoutingReport::Prefix { summary, upstreams, .. } => {
///         println!("{} upstream pairs", upstreams.len());
///     }
/// }
/// ```
pub struct RoutingLens {
    base_url: String,
    agent: ureq::Agent,
}

impl RoutingLens {
    /// Create a lens against the default BGPView endpoint
    pub fn new() -> Self {
        Self::with_base_url(crate::config::DEFAULT_API_BASE_URL)
    }

    /// Create a lens against a custom API base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_base_url_and_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a lens with a custom API base URL and per-request timeout
    pub fn with_base_url_and_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            agent: build_agent(timeout),
        }
    }

    /// Classify the token and query the matching endpoint
    ///
    /// Validation failures abort before any network call. A non-200 response
    /// is treated as "no usable data" and yields an empty report, not an
    /// error.
    pub fn lookup(&self, token: &str) -> Result<RoutingReport, RoutingLensError> {
        match token.parse::<RoutingIdentifier>()? {
            RoutingIdentifier::Asn(asn) => {
                let prefixes = self.lookup_asn(asn)?;
                Ok(RoutingReport::Asn { asn, prefixes })
            }
            RoutingIdentifier::Prefix(prefix) => {
                let (summary, upstreams) = self.lookup_prefix(&prefix)?;
                Ok(RoutingReport::Prefix {
                    prefix,
                    summary,
                    upstreams,
                })
            }
        }
    }

    fn lookup_asn(&self, asn: u32) -> Result<Vec<AsnPrefixRow>, RoutingLensError> {
        let url = format!("{}/asn/{}/prefixes", self.base_url, asn);
        let payload: Option<AsnPrefixesPayload> = self.fetch(&url)?;
        Ok(payload.map(flatten_asn_prefixes).unwrap_or_default())
    }

    fn lookup_prefix(
        &self,
        prefix: &IpNet,
    ) -> Result<(Option<PrefixSummaryRow>, Vec<AsnDetailRow>), RoutingLensError> {
        let url = format!("{}/prefix/{}", self.base_url, prefix);
        let payload: Option<PrefixPayload> = self.fetch(&url)?;
        Ok(match payload {
            Some(payload) => {
                let (summary, upstreams) = flatten_prefix_payload(payload);
                (Some(summary), upstreams)
            }
            None => (None, Vec::new()),
        })
    }

    /// Issue one GET and unwrap the `data` envelope; only HTTP 200 counts as
    /// success, any other status maps to `None`
    fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, RoutingLensError> {
        debug!("GET {}", url);
        match self.agent.get(url).call() {
            Ok(mut response) => {
                if response.status().as_u16() != 200 {
                    debug!("HTTP {} from {}", response.status(), url);
                    return Ok(None);
                }
                let body = response.body_mut().read_json::<ApiResponse<T>>()?;
                Ok(body.data)
            }
            Err(e) => Err(RoutingLensError::Transport(e)),
        }
    }
}

impl Default for RoutingLens {
    fn default() -> Self {
        Self::new()
    }
}

/// Agent with a bound on every request; non-2xx statuses are returned as
/// responses so the 200 check in `fetch` is the single success gate
fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

// =============================================================================
// Flattening
// =============================================================================

fn flatten_asn_prefixes(payload: AsnPrefixesPayload) -> Vec<AsnPrefixRow> {
    payload
        .ipv4_prefixes
        .into_iter()
        .map(|entry| AsnPrefixRow {
            name: entry.name.unwrap_or_default(),
            prefix: entry.prefix,
            cidr: entry.cidr,
            status: STATUS_FOUND.to_string(),
        })
        .collect()
}

fn flatten_prefix_payload(payload: PrefixPayload) -> (PrefixSummaryRow, Vec<AsnDetailRow>) {
    let summary = PrefixSummaryRow {
        name: payload.name.clone().unwrap_or_default(),
        prefix: payload.prefix.clone(),
        ip: payload.ip.clone(),
        description: match payload.description_short.as_deref() {
            None | Some("") => UNKNOWN_DESCRIPTION.to_string(),
            Some(desc) => desc.to_string(),
        },
        asn_count: payload.asns.len(),
        status: STATUS_FOUND.to_string(),
    };

    let upstreams = payload
        .asns
        .into_iter()
        .flat_map(|owner| {
            let asn = owner.asn;
            let name = owner.name.unwrap_or_default();
            let description = owner.description.unwrap_or_default();
            let country_code = owner.country_code.unwrap_or_default();
            owner
                .prefix_upstreams
                .into_iter()
                .map(move |upstream| AsnDetailRow {
                    asn,
                    name: name.clone(),
                    description: description.clone(),
                    country_code: country_code.clone(),
                    upstream_asn: upstream.asn,
                    upstream_name: upstream.name.unwrap_or_default(),
                })
        })
        .collect();

    (summary, upstreams)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_payload<T: DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value::<ApiResponse<T>>(value)
            .unwrap()
            .data
            .unwrap()
    }

    #[test]
    fn test_classify_asn() {
        assert_eq!(
            "15169".parse::<RoutingIdentifier>().unwrap(),
            RoutingIdentifier::Asn(15169)
        );
    }

    #[test]
    fn test_classify_prefix() {
        assert_eq!(
            "8.8.8.0/24".parse::<RoutingIdentifier>().unwrap(),
            RoutingIdentifier::Prefix("8.8.8.0/24".parse().unwrap())
        );
    }

    #[test]
    fn test_classify_bare_address_becomes_host_network() {
        assert_eq!(
            "8.8.8.8".parse::<RoutingIdentifier>().unwrap(),
            RoutingIdentifier::Prefix("8.8.8.8/32".parse().unwrap())
        );
        assert_eq!(
            "2001:db8::1".parse::<RoutingIdentifier>().unwrap(),
            RoutingIdentifier::Prefix("2001:db8::1/128".parse().unwrap())
        );
    }

    #[test]
    fn test_classify_truncates_host_bits() {
        assert_eq!(
            "10.0.0.1/24".parse::<RoutingIdentifier>().unwrap(),
            RoutingIdentifier::Prefix("10.0.0.0/24".parse().unwrap())
        );
    }

    #[test]
    fn test_classify_invalid_tokens() {
        for token in ["not-a-token!", "", "4294967296", "10.0.0/8", "1.2.3.4/33"] {
            assert!(
                matches!(
                    token.parse::<RoutingIdentifier>(),
                    Err(RoutingLensError::InvalidIdentifier(_))
                ),
                "expected {:?} to be invalid",
                token
            );
        }
    }

    #[test]
    fn test_flatten_asn_prefixes() {
        let payload: AsnPrefixesPayload = parse_payload(json!({
            "data": {
                "ipv4_prefixes": [
                    {"name": "CF-1", "prefix": "1.1.1.0/24", "cidr": 24}
                ],
                "ipv6_prefixes": [
                    {"name": "CF-6", "prefix": "2606:4700::/32", "cidr": 32}
                ]
            }
        }));

        let rows = flatten_asn_prefixes(payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "CF-1");
        assert_eq!(rows[0].prefix, "1.1.1.0/24");
        assert_eq!(rows[0].cidr, 24);
        assert_eq!(rows[0].status, STATUS_FOUND);
    }

    #[test]
    fn test_flatten_asn_without_prefixes() {
        let payload: AsnPrefixesPayload = parse_payload(json!({"data": {}}));
        assert!(flatten_asn_prefixes(payload).is_empty());
    }

    #[test]
    fn test_flatten_prefix_payload() {
        let payload: PrefixPayload = parse_payload(json!({
            "data": {
                "name": "GOOGLE",
                "prefix": "8.8.8.0/24",
                "ip": "8.8.8.0",
                "description_short": "Google LLC",
                "asns": [
                    {
                        "asn": 15169,
                        "name": "GOOGLE",
                        "description": "Google LLC",
                        "country_code": "US",
                        "prefix_upstreams": [
                            {"asn": 1299, "name": "TWELVE99"},
                            {"asn": 3356, "name": "LEVEL3"}
                        ]
                    }
                ]
            }
        }));

        let (summary, upstreams) = flatten_prefix_payload(payload);
        assert_eq!(summary.description, "Google LLC");
        assert_eq!(summary.asn_count, 1);
        assert_eq!(summary.status, STATUS_FOUND);
        assert_eq!(upstreams.len(), 2);
        assert_eq!(upstreams[0].asn, 15169);
        assert_eq!(upstreams[0].country_code, "US");
        assert_eq!(upstreams[0].upstream_asn, 1299);
        assert_eq!(upstreams[1].upstream_name, "LEVEL3");
    }

    #[test]
    fn test_empty_description_renders_sentinel() {
        for description in [json!(""), json!(null)] {
            let payload: PrefixPayload = parse_payload(json!({
                "data": {
                    "name": "X",
                    "prefix": "192.0.2.0/24",
                    "ip": "192.0.2.0",
                    "description_short": description,
                    "asns": []
                }
            }));
            let (summary, _) = flatten_prefix_payload(payload);
            assert_eq!(summary.description, UNKNOWN_DESCRIPTION);
        }
    }

    #[test]
    fn test_owner_without_upstreams_counts_but_emits_no_rows() {
        let payload: PrefixPayload = parse_payload(json!({
            "data": {
                "name": "STUB",
                "prefix": "198.51.100.0/24",
                "ip": "198.51.100.0",
                "description_short": "stub network",
                "asns": [
                    {"asn": 64496, "name": "STUB-AS", "description": "", "country_code": "ZZ",
                     "prefix_upstreams": []},
                    {"asn": 64497, "name": "OTHER-AS", "description": "", "country_code": "ZZ",
                     "prefix_upstreams": [{"asn": 64511, "name": "TRANSIT"}]}
                ]
            }
        }));

        let (summary, upstreams) = flatten_prefix_payload(payload);
        assert_eq!(summary.asn_count, 2);
        assert_eq!(upstreams.len(), 1);
        assert_eq!(upstreams[0].asn, 64497);
    }

    #[test]
    fn test_agent_bounds_requests_and_returns_statuses() {
        let agent = build_agent(Duration::from_secs(7));
        assert_eq!(
            agent.config().timeouts().global,
            Some(Duration::from_secs(7))
        );
        // non-2xx responses must reach the Ok arm of fetch, not the Err arm
        assert!(!agent.config().http_status_as_error());
    }

    #[test]
    fn test_response_without_data_envelope() {
        let response: ApiResponse<AsnPrefixesPayload> =
            serde_json::from_value(json!({"status": "error"})).unwrap();
        assert!(response.data.is_none());
    }
}
