//! MIB dump acquisition
//!
//! The vendor mapping comes from an external tool that turns MIB text into the
//! JSON dump document, or from a dump file produced earlier. The tool runs once,
//! synchronously; any failure stops the pipeline before tree building.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::MibDump;
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// Where the vendor dump comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpSource {
    /// Previously produced dump document.
    File(PathBuf),
    /// External tool; stdout is the dump document.
    Command { program: String, args: Vec<String> },
}

impl DumpSource {
    /// Build a command source, substituting `{mib}` and `{module}` in `args`.
    pub fn command(program: &str, args: &[String], mib: &Path, module: Option<&str>) -> Self {
        let mib = mib.display().to_string();
        let args = args
            .iter()
            .map(|arg| {
                arg.replace("{mib}", &mib)
                    .replace("{module}", module.unwrap_or_default())
            })
            .collect();
        DumpSource::Command {
            program: program.to_string(),
            args,
        }
    }

    fn origin(&self) -> String {
        match self {
            DumpSource::File(path) => path.display().to_string(),
            DumpSource::Command { program, .. } => format!("`{}`", program),
        }
    }
}

/// Runs the dump tool (or reads a dump file) and parses the result.
pub struct DumpService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
}

impl DumpService {
    pub fn new(fs: Arc<dyn FileSystem>, cmd: Arc<dyn CommandRunner>) -> Self {
        Self { fs, cmd }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, source: &DumpSource) -> ApplicationResult<MibDump> {
        let content = match source {
            DumpSource::File(path) => self
                .fs
                .read_to_string(path)
                .with_path_context("read mib dump", path)?,
            DumpSource::Command { program, args } => self.run(program, args)?,
        };

        let dump = MibDump::parse(&content).map_err(|e| ApplicationError::InvalidDump {
            origin: source.origin(),
            message: e.message,
        })?;
        debug!(
            "dump: module={:?}, {} descriptors",
            dump.module,
            dump.descriptors.as_ref().map(Vec::len).unwrap_or(0)
        );
        Ok(dump)
    }

    fn run(&self, program: &str, args: &[String]) -> ApplicationResult<String> {
        info!("running {} {}", program, args.join(" "));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output =
            self.cmd
                .run(program, &args)
                .map_err(|e| ApplicationError::OperationFailed {
                    context: format!("spawn mib dump command `{}`", program),
                    source: Box::new(e),
                })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ApplicationError::DumpFailed {
                command: program.to_string(),
                exit_code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| ApplicationError::InvalidDump {
            origin: format!("`{}`", program),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_substitutes_placeholders() {
        let args = vec!["-m".to_string(), "{module}".to_string(), "{mib}".to_string()];
        let source = DumpSource::command(
            "mibdump",
            &args,
            Path::new("mibs/UHP.txt"),
            Some("UHP-MIB"),
        );
        assert_eq!(
            source,
            DumpSource::Command {
                program: "mibdump".into(),
                args: vec!["-m".into(), "UHP-MIB".into(), "mibs/UHP.txt".into()],
            }
        );
    }
}
