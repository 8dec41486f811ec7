//! Schema loading: baseline + vendor descriptors into one working set

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{MibDump, ObjectDescriptor};
use crate::infrastructure::traits::FileSystem;

/// Standard MIB-2 `system` group, always part of the working set.
const BUILTIN_BASELINE: &str = include_str!("mib2_system.json");

/// Merges the baseline and vendor mappings, dropping wrapper-only names.
pub struct SchemaLoader {
    fs: Arc<dyn FileSystem>,
    exclude: HashSet<String>,
}

impl SchemaLoader {
    pub fn new(fs: Arc<dyn FileSystem>, exclude: &[String]) -> Self {
        Self {
            fs,
            exclude: exclude.iter().cloned().collect(),
        }
    }

    /// Baseline descriptors: the built-in set, or `path` when configured.
    pub fn baseline(&self, path: Option<&Path>) -> ApplicationResult<Vec<ObjectDescriptor>> {
        let (origin, content) = match path {
            Some(path) => (
                path.display().to_string(),
                self.fs
                    .read_to_string(path)
                    .with_path_context("read baseline", path)?,
            ),
            None => ("builtin baseline".to_string(), BUILTIN_BASELINE.to_string()),
        };
        let dump = MibDump::parse(&content).map_err(|e| ApplicationError::InvalidDump {
            origin: origin.clone(),
            message: e.message,
        })?;
        dump.descriptors.ok_or(ApplicationError::InvalidDump {
            origin,
            message: "no nodes".to_string(),
        })
    }

    /// Merge baseline then vendor, in document order.
    ///
    /// A vendor descriptor whose name already exists in the baseline replaces
    /// it in place. Excluded names are dropped from both.
    #[instrument(level = "debug", skip_all)]
    pub fn merge(
        &self,
        baseline: Vec<ObjectDescriptor>,
        vendor: Vec<ObjectDescriptor>,
    ) -> Vec<ObjectDescriptor> {
        let mut merged: Vec<ObjectDescriptor> = Vec::with_capacity(baseline.len() + vendor.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for descriptor in baseline.into_iter().chain(vendor) {
            if self.exclude.contains(&descriptor.name) {
                debug!("excluding {}", descriptor.name);
                continue;
            }
            match positions.get(&descriptor.name) {
                Some(&idx) => merged[idx] = descriptor,
                None => {
                    positions.insert(descriptor.name.clone(), merged.len());
                    merged.push(descriptor);
                }
            }
        }

        debug!("working set: {} descriptors", merged.len());
        merged
    }
}

/// Take the descriptors out of a vendor dump, checking it is the expected module.
pub fn expect_module(
    dump: MibDump,
    expected: Option<&str>,
) -> ApplicationResult<Vec<ObjectDescriptor>> {
    if let Some(expected) = expected {
        if dump.module.as_deref() != Some(expected) {
            return Err(ApplicationError::ModuleNotFound {
                expected: expected.to_string(),
                found: dump.module,
            });
        }
    }
    match dump.descriptors {
        Some(descriptors) => Ok(descriptors),
        None => Err(ApplicationError::ModuleNotFound {
            expected: expected
                .or(dump.module.as_deref())
                .unwrap_or("<any>")
                .to_string(),
            found: None,
        }),
    }
}
