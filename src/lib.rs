#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Netlens - a network diagnostic toolkit
//!
//! Netlens queries public network data sources and normalizes their responses
//! into flat row sets suitable for table or JSON output. It can be used as
//! both a command-line application and a library.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - **[`lens`]**: High-level query-and-normalize logic
//!   - `dns`: DNS record scan across a fixed set of record types
//!   - `routing`: BGPView ASN/prefix lookup and response flattening
//!
//! - **[`config`]**: Configuration management
//!
//! Lenses never print; the CLI binary is the presentation sink that renders
//! the returned rows with `tabled` or as JSON.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use netlens::lens::dns::{DnsLens, DnsQuery};
//! use netlens::lens::routing::RoutingLens;
//!
//! // Scan DNS records using the system resolvers
//! let lens = DnsLens::new();
//! let scan = lens.resolve(&DnsQuery::new("example.com"))?;
//! for record in &scan.records {
//!     println!("{} {} {}", record.rtype, record.data, record.status);
//! }
//!
//! // Look up an ASN or prefix in public routing data
//! let lens = RoutingLens::new();
//! let report = lens.lookup("13335")?;
//! ```

pub mod config;
pub mod lens;

pub use crate::config::NetlensConfig;
pub use crate::lens::dns::{DnsLens, DnsQuery, DnsRecordResult, DnsScan, RecordStatus};
pub use crate::lens::routing::{
    AsnDetailRow, AsnPrefixRow, PrefixSummaryRow, RoutingIdentifier, RoutingLens,
    RoutingLensError, RoutingReport,
};
