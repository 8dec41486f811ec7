//! mibgen: turn SNMP MIB object dumps into typed Rust driver source.
//!
//! Layers, innermost first:
//! - [`domain`]: OID tree, leaf reconciliation, name registry and emitter (no I/O)
//! - [`application`]: schema loading, dump acquisition and the generation pipeline
//! - [`infrastructure`]: I/O boundary implementations and the service container
//! - [`cli`]: argument parsing, command dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
