//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::ExportService;
use crate::config::Settings;
use crate::infrastructure::converter::{DocumentConverter, GraphvizConverter};
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Document converter (external process)
    pub converter: Arc<dyn DocumentConverter>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let cmd: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
        let converter = Arc::new(GraphvizConverter::new(cmd, settings.converter.clone()));
        Self::with_deps(settings, Arc::new(RealFileSystem), converter)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        converter: Arc<dyn DocumentConverter>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            converter,
        }
    }

    /// Export service sharing the container's dependencies.
    pub fn export_service(&self) -> ExportService {
        ExportService::new(
            self.fs.clone(),
            self.converter.clone(),
            self.settings.clone(),
        )
    }
}
