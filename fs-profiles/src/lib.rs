#[macro_use]
extern crate lazy_static;

pub mod holder;
pub mod profile;
pub mod registry;
pub mod settings;
pub mod team;

/// Extension of persisted profile and team files.
pub const PROFILE_EXTENSION: &str = "xml";

/// Schema version stamped into every saved document. Documents
/// declaring a newer version are rejected on load.
pub const SCHEMA_VERSION: i32 = 1;

/// Indentation used when serializing documents to disk.
pub const WRITE_INDENT: usize = 4;
