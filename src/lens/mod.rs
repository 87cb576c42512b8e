//! Lens module
//!
//! This module provides high-level "lens" abstractions that combine the
//! query-and-normalize logic for each external data source. Lenses are
//! designed to be reusable across different presentation sinks (CLI tables,
//! JSON output, or library consumers).
//!
//! | Lens | Data Source | Dependencies |
//! |------|-------------|--------------|
//! | `DnsLens` | DNS resolvers (system or explicit) | hickory-resolver |
//! | `RoutingLens` | BGPView HTTP API | ureq, serde |
//!
//! # Architecture
//!
//! Each lens module exports:
//! - A **Lens struct** (e.g., `DnsLens`, `RoutingLens`) - the main entry
//!   point for all operations
//! - **Row types** - flat, uniform records ready for rendering (`Tabled` +
//!   `Serialize`)
//!
//! Internal implementation details (wire-format mirror structs, response
//! flattening, error classification) are kept private within each lens
//! module. Lenses never print; callers decide how rows are rendered.

pub mod dns;
pub mod routing;
