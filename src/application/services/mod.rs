//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner)
//! but are themselves concrete structs, not traits.

mod dump;
mod generator;
mod schema;

pub use dump::{DumpService, DumpSource};
pub use generator::{Freshness, GenerateRequest, GenerationReport, GeneratorService};
pub use schema::{expect_module, SchemaLoader};
