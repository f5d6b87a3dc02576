//! Core types for sqlsnap
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: Error taxonomy (connection, backup, not-found, statement, ...)
//! - ConnectionProfile: How to reach a database
//! - TableDescriptor / ColumnDescriptor: Introspected schema
//! - SqlValue: Scalar values extracted from rows
//! - Artifact: One unit of captured SQL text and its file naming
//! - EventSink: Injected receiver of structured run events

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod error;
pub mod events;
pub mod profile;
pub mod schema;
pub mod value;

pub use artifact::{
    file_stem, Artifact, ArtifactKind, ArtifactScope, SplitNaming, DCL_MARKER, DDL_MARKER,
    DML_MARKER, SQL_EXTENSION,
};
pub use error::{Error, Result};
pub use events::{
    default_sink, EventSink, MemorySink, Outcome, Phase, SnapshotEvent, TracingSink,
};
pub use profile::{ConnectionProfile, Credentials};
pub use schema::{parse_max_length, ColumnDescriptor, TableDescriptor};
pub use value::{SqlValue, TIMESTAMP_FORMAT};
