//! Generation pipeline: dump -> working set -> forest -> reconcile -> source

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::dump::{DumpService, DumpSource};
use crate::application::services::schema::{expect_module, SchemaLoader};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{EmitOptions, Emitter, Forest};
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// Everything one generation run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub dump: DumpSource,
    /// Expected module name in the dump, if any.
    pub module: Option<String>,
    pub exclude: Vec<String>,
    /// Baseline override; the built-in MIB-2 system group otherwise.
    pub baseline: Option<PathBuf>,
    pub emit: EmitOptions,
    pub output: Option<PathBuf>,
}

impl GenerateRequest {
    /// Build a request from settings. `dump_file` bypasses the dump command.
    pub fn from_settings(settings: &Settings, dump_file: Option<&Path>) -> ApplicationResult<Self> {
        let module = settings.mib.module.clone();
        let dump = match (dump_file, &settings.dump.command) {
            (Some(path), _) => DumpSource::File(path.to_path_buf()),
            (None, Some(program)) => {
                let mib = settings
                    .mib
                    .path
                    .as_deref()
                    .ok_or_else(|| ApplicationError::Config {
                        message: "mib.path is not set".to_string(),
                    })?;
                DumpSource::command(program, &settings.dump.args, mib, module.as_deref())
            }
            (None, None) => {
                return Err(ApplicationError::Config {
                    message: "no dump source: set dump.command or pass --dump-file".to_string(),
                })
            }
        };

        Ok(Self {
            dump,
            module: module.clone(),
            exclude: settings.generator.exclude.clone(),
            baseline: settings.generator.baseline.clone(),
            emit: EmitOptions {
                root_name: settings.generator.root_name.clone(),
                runtime_path: settings.generator.runtime_path.clone(),
                module,
            },
            output: settings.generator.output.clone(),
        })
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub module: Option<String>,
    pub classes: usize,
    pub branches: usize,
    pub scalars: usize,
    pub source: String,
    /// Where the source was written, `None` when only rendered.
    pub output: Option<PathBuf>,
}

/// Result of comparing a fresh render with the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Missing,
}

/// Service running the whole generator pipeline.
pub struct GeneratorService {
    fs: Arc<dyn FileSystem>,
    dumps: DumpService,
}

impl GeneratorService {
    pub fn new(fs: Arc<dyn FileSystem>, cmd: Arc<dyn CommandRunner>) -> Self {
        Self {
            dumps: DumpService::new(fs.clone(), cmd),
            fs,
        }
    }

    /// Load the working set and build the reconciled forest.
    ///
    /// Dump failures and a missing module stop here, before any tree exists.
    #[instrument(level = "debug", skip_all)]
    pub fn forest(&self, request: &GenerateRequest) -> ApplicationResult<(Option<String>, Forest)> {
        let dump = self.dumps.load(&request.dump)?;
        let module = dump.module.clone();
        let vendor = expect_module(dump, request.module.as_deref())?;

        let loader = SchemaLoader::new(self.fs.clone(), &request.exclude);
        let baseline = loader.baseline(request.baseline.as_deref())?;
        let working_set = loader.merge(baseline, vendor);

        let mut forest = Forest::build(working_set)?;
        forest.reconcile()?;
        debug!(
            "forest: {} roots, {} branches, {} scalars",
            forest.roots().len(),
            forest.branch_count(),
            forest.scalar_count()
        );
        Ok((module, forest))
    }

    /// Render the source without writing it.
    pub fn render(&self, request: &GenerateRequest) -> ApplicationResult<GenerationReport> {
        let (module, forest) = self.forest(request)?;

        let mut options = request.emit.clone();
        if options.module.is_none() {
            options.module = module.clone();
        }
        let classes = Emitter::new(&options).plan(&forest)?;
        let source = crate::domain::render(&classes, &options);

        Ok(GenerationReport {
            module,
            classes: classes.len(),
            branches: forest.branch_count(),
            scalars: forest.scalar_count(),
            source,
            output: None,
        })
    }

    /// Render and write to the request's output path (atomically).
    #[instrument(level = "debug", skip_all)]
    pub fn generate(&self, request: &GenerateRequest) -> ApplicationResult<GenerationReport> {
        let mut report = self.render(request)?;
        if let Some(output) = &request.output {
            self.fs
                .write_atomic(output, &report.source)
                .with_path_context("write generated source", output)?;
            info!("wrote {} classes to {}", report.classes, output.display());
            report.output = Some(output.clone());
        }
        Ok(report)
    }

    /// Compare a fresh render with `path`.
    pub fn check(&self, request: &GenerateRequest, path: &Path) -> ApplicationResult<Freshness> {
        let report = self.render(request)?;
        if !self.fs.exists(path) {
            return Ok(Freshness::Missing);
        }
        let current = self
            .fs
            .read_to_string(path)
            .with_path_context("read generated source", path)?;
        Ok(if current == report.source {
            Freshness::Fresh
        } else {
            Freshness::Stale
        })
    }
}
