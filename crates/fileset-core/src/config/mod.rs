//! Configuration for file set queries.
//!
//! A file set ([`settings::FileSetConfig`]) can be described in a TOML file
//! and loaded at startup instead of being built in code.

pub mod settings;
