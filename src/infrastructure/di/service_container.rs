//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::GeneratorService;
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Filesystem abstraction, also used directly for config files
    pub fs: Arc<dyn FileSystem>,

    pub generator: GeneratorService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new() -> Self {
        Self::with_deps(Arc::new(RealFileSystem), Arc::new(RealCommandRunner))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(fs: Arc<dyn FileSystem>, cmd: Arc<dyn CommandRunner>) -> Self {
        let generator = GeneratorService::new(fs.clone(), cmd);
        Self { fs, generator }
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}
