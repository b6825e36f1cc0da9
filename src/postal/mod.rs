//! Postal code module - ingestion and lookup over the national master / 郵便番号モジュール
//!
//! Data flow / データの流れ：
//! - Offline: decoded CSV text → `ingest` → `codec::save_artifact`
//! - Startup: `codec::load_artifact` → `SearchIndex::build` → `SharedIndex`
//! - Query: `query::lookup_by_zip` / `query::lookup_by_address` on a snapshot
//!
//! The index is immutable once built; refresh swaps a whole new index in.

pub mod codec;
pub mod csv;
pub mod error;
pub mod index;
pub mod ingest;
pub mod kana;
pub mod query;
pub mod store;

pub use error::{ArtifactError, QueryError};
pub use index::{PostalRecord, SearchIndex, SharedIndex};
pub use ingest::{ingest, IngestOutput};
pub use query::{lookup_by_address, lookup_by_zip, status, IndexStatus, LookupResponse, ProjectedRecord};
pub use store::{GroupedStore, KanaMap, OrderedMap, PostalArtifact, TownEntry};
