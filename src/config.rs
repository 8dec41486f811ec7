//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mibgen/mibgen.toml`
//! 3. Project config: `./mibgen.toml` (or `--config <path>`)
//! 4. Environment variables: `MIBGEN_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// File name of the project-local config.
pub const PROJECT_CONFIG_FILE: &str = "mibgen.toml";

/// Vendor MIB location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct MibConfig {
    /// MIB file handed to the dump command as `{mib}`
    pub path: Option<PathBuf>,
    /// Module name the dump must declare
    pub module: Option<String>,
}

/// External MIB dump command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DumpConfig {
    /// Program printing the JSON dump on stdout
    pub command: Option<String>,
    /// Argument template, `{mib}` and `{module}` are substituted
    pub args: Vec<String>,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: vec!["{mib}".into()],
        }
    }
}

/// Code generation options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Descriptor names dropped from the working set
    pub exclude: Vec<String>,
    /// Name of the generated root driver struct
    pub root_name: String,
    /// Module path the generated file imports its runtime types from
    pub runtime_path: String,
    /// Baseline dump replacing the built-in MIB-2 system group
    pub baseline: Option<PathBuf>,
    /// Where `generate` writes the source (stdout when unset)
    pub output: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["uhp".into(), "uhpV32".into()],
            root_name: "MibDriver".into(),
            runtime_path: "crate::snmp".into(),
            baseline: None,
            output: None,
        }
    }
}

/// Raw dump config for intermediate parsing (arrays are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDumpConfig {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
}

/// Raw generator config for intermediate parsing.
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawGeneratorConfig {
    pub exclude: Option<Vec<String>>,
    pub root_name: Option<String>,
    pub runtime_path: Option<String>,
    pub baseline: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub mib: MibConfig,
    pub dump: RawDumpConfig,
    pub generator: RawGeneratorConfig,
}

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are appended to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are dropped, first occurrence wins
///
/// # Examples
/// ```ignore
/// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
/// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(base.len() + overlay.len());
    for item in base {
        if !result.contains(item) {
            result.push(item.clone());
        }
    }

    for pattern in overlay {
        if let Some(negated) = pattern.strip_prefix('!') {
            result.retain(|item| item != negated);
        } else if !result.contains(pattern) {
            result.push(pattern.clone());
        }
    }
    result
}

impl GeneratorConfig {
    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Arrays: union merge with negation support (if overlay specified)
    pub fn merge(&self, overlay: &RawGeneratorConfig) -> Self {
        Self {
            exclude: overlay
                .exclude
                .as_ref()
                .map(|o| merge_array(&self.exclude, o))
                .unwrap_or_else(|| self.exclude.clone()),
            ..self.apply_scalars(overlay)
        }
    }

    /// Apply global config onto defaults.
    ///
    /// Unlike `merge()`, arrays use REPLACE semantics: a global `exclude`
    /// completely replaces the default list.
    pub fn apply_global(&self, global: &RawGeneratorConfig) -> Self {
        Self {
            exclude: global
                .exclude
                .clone()
                .unwrap_or_else(|| self.exclude.clone()),
            ..self.apply_scalars(global)
        }
    }

    fn apply_scalars(&self, raw: &RawGeneratorConfig) -> Self {
        Self {
            exclude: self.exclude.clone(),
            root_name: raw
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            runtime_path: raw
                .runtime_path
                .clone()
                .unwrap_or_else(|| self.runtime_path.clone()),
            baseline: raw.baseline.clone().or_else(|| self.baseline.clone()),
            output: raw.output.clone().or_else(|| self.output.clone()),
        }
    }
}

impl DumpConfig {
    /// Overlay wins for the command; `args` is a template, so it always replaces.
    pub fn merge(&self, overlay: &RawDumpConfig) -> Self {
        Self {
            command: overlay.command.clone().or_else(|| self.command.clone()),
            args: overlay.args.clone().unwrap_or_else(|| self.args.clone()),
        }
    }
}

impl MibConfig {
    pub fn merge(&self, overlay: &MibConfig) -> Self {
        Self {
            path: overlay.path.clone().or_else(|| self.path.clone()),
            module: overlay.module.clone().or_else(|| self.module.clone()),
        }
    }
}

/// Unified configuration for mibgen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub mib: MibConfig,
    pub dump: DumpConfig,
    pub generator: GeneratorConfig,
}

/// Get the XDG config directory for mibgen.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mibgen").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mibgen.toml"))
}

/// Get the path to the project config file in `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(PROJECT_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let expand = |p: &Path| PathBuf::from(expand_env_vars(p.to_string_lossy().as_ref()));

        self.mib.path = self.mib.path.as_deref().map(expand);
        self.generator.baseline = self.generator.baseline.as_deref().map(expand);
        self.generator.output = self.generator.output.as_deref().map(expand);
        if let Some(command) = &self.dump.command {
            self.dump.command = Some(expand_env_vars(command));
        }
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            mib: self.mib.merge(&overlay.mib),
            dump: self.dump.merge(&overlay.dump),
            generator: self.generator.merge(&overlay.generator),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    pub fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            mib: self.mib.merge(&global.mib),
            dump: self.dump.merge(&global.dump),
            generator: self.generator.apply_global(&global.generator),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_config` - Explicit project config; `./mibgen.toml` is used when `None`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/mibgen/mibgen.toml` (arrays REPLACE defaults)
    /// 3. Project config (arrays UNION with global, `!item` removes)
    /// 4. Environment variables: `MIBGEN_*` prefix (REPLACES - explicit override)
    pub fn load(project_config: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config defines the user's baseline
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        // 3. Project config; an explicit path must exist
        match project_config {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let local_path = project_config_path(Path::new("."));
                if local_path.exists() {
                    current = current.merge_with(&load_raw_settings(&local_path)?);
                }
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply MIBGEN_* environment variables as explicit overrides.
    ///
    /// Env vars replace values (not merge) - they are explicit user overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("MIBGEN")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("dump.args")
                .with_list_parse_key("generator.exclude")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("mib.path") {
            settings.mib.path = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("mib.module") {
            settings.mib.module = Some(val);
        }
        if let Ok(val) = config.get_string("dump.command") {
            settings.dump.command = Some(val);
        }
        if let Ok(val) = config.get::<Vec<String>>("dump.args") {
            settings.dump.args = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("generator.exclude") {
            settings.generator.exclude = val;
        }
        if let Ok(val) = config.get_string("generator.root_name") {
            settings.generator.root_name = val;
        }
        if let Ok(val) = config.get_string("generator.runtime_path") {
            settings.generator.runtime_path = val;
        }
        if let Ok(val) = config.get_string("generator.baseline") {
            settings.generator.baseline = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("generator.output") {
            settings.generator.output = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Reject values that would produce uncompilable generated code.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let ident = Regex::new(r"^[A-Z][A-Za-z0-9_]*$").map_err(regex_err)?;
        if !ident.is_match(&self.generator.root_name) {
            return Err(ApplicationError::Config {
                message: format!(
                    "generator.root_name must be a CamelCase identifier: {:?}",
                    self.generator.root_name
                ),
            });
        }

        let path = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$")
            .map_err(regex_err)?;
        if !path.is_match(&self.generator.runtime_path) {
            return Err(ApplicationError::Config {
                message: format!(
                    "generator.runtime_path must be a module path: {:?}",
                    self.generator.runtime_path
                ),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# mibgen configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/mibgen/mibgen.toml  (defines your baseline)
#   Project: ./mibgen.toml or --config     (project-specific additions)
#   Env:     MIBGEN_* environment variables, e.g. MIBGEN_MIB__MODULE
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Project config UNIONS with global for generator.exclude.
#   Use "!name" in project config to REMOVE an inherited item:
#     exclude = ["debugTable", "!uhp"]  # adds debugTable, keeps uhp in the tree

[mib]
# Vendor MIB file, substituted for {mib} in dump.args
# path = "mibs/VENDOR-MIB.txt"

# Module the dump must declare
# module = "VENDOR-MIB"

[dump]
# Program printing the JSON node dump on stdout
# command = "mibdump"
# args = ["{mib}"]

[generator]
# Descriptor names left out of the working set
# exclude = ["uhp", "uhpV32"]

# Name of the generated root driver struct
# root_name = "MibDriver"

# Module path providing SnmpContext, SnmpDriver, RoLeaf and RwLeaf
# runtime_path = "crate::snmp"

# Baseline dump replacing the built-in MIB-2 system group
# baseline = "mibs/baseline.json"

# Output file (stdout when unset)
# output = "src/snmp/generated.rs"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

fn regex_err(e: regex::Error) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn given_defaults_when_created_then_excludes_uhp_tables() {
        let settings = Settings::default();
        assert_eq!(settings.generator.exclude, s(&["uhp", "uhpV32"]));
        assert_eq!(settings.generator.root_name, "MibDriver");
        assert_eq!(settings.dump.args, s(&["{mib}"]));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn given_tilde_in_paths_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings::default();
        settings.mib.path = Some(PathBuf::from("~/mibs/VENDOR-MIB.txt"));
        settings.generator.output = Some(PathBuf::from("$HOME/out.rs"));

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let mib = settings.mib.path.expect("mib path");
        assert!(mib.to_string_lossy().starts_with(&home));
        assert!(!mib.to_string_lossy().contains('~'));
        let output = settings.generator.output.expect("output");
        assert!(output.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn test_merge_array_union() {
        let result = merge_array(&s(&["a", "b"]), &s(&["c"]));
        assert_eq!(result, s(&["a", "b", "c"]));
    }

    #[test]
    fn test_merge_array_negation() {
        let result = merge_array(&s(&["a", "b"]), &s(&["!a", "c"]));
        assert_eq!(result, s(&["b", "c"]));
    }

    #[test]
    fn test_merge_array_negation_nonexistent() {
        let result = merge_array(&s(&["a", "b"]), &s(&["!x"]));
        assert_eq!(result, s(&["a", "b"]));
    }

    #[test]
    fn test_merge_array_duplicates() {
        let result = merge_array(&s(&["a", "b"]), &s(&["a", "c"]));
        assert_eq!(result, s(&["a", "b", "c"]));
    }

    #[test]
    fn test_apply_global_replaces_exclude() {
        let base = GeneratorConfig::default();
        let global = RawGeneratorConfig {
            exclude: Some(s(&["debugTable"])),
            root_name: Some("AcmeDriver".into()),
            ..Default::default()
        };

        let result = base.apply_global(&global);

        assert_eq!(result.exclude, s(&["debugTable"]));
        assert_eq!(result.root_name, "AcmeDriver");
        assert_eq!(result.runtime_path, "crate::snmp");
    }

    #[test]
    fn test_merge_unions_exclude_with_negation() {
        let base = GeneratorConfig::default();
        let overlay = RawGeneratorConfig {
            exclude: Some(s(&["!uhp", "debugTable"])),
            ..Default::default()
        };

        let result = base.merge(&overlay);

        assert_eq!(result.exclude, s(&["uhpV32", "debugTable"]));
        assert_eq!(result.root_name, "MibDriver");
    }

    #[test]
    fn given_toml_sections_when_parsing_raw_then_unspecified_arrays_are_none() {
        let raw = parse_raw_settings(
            r#"
[mib]
module = "ACME-MIB"

[dump]
command = "mibdump"

[generator]
root_name = "AcmeDriver"
"#,
        )
        .expect("parse");

        assert_eq!(raw.mib.module.as_deref(), Some("ACME-MIB"));
        assert_eq!(raw.dump.command.as_deref(), Some("mibdump"));
        assert!(raw.dump.args.is_none());
        assert!(raw.generator.exclude.is_none());

        let merged = Settings::default().merge_with(&raw);
        assert_eq!(merged.dump.args, s(&["{mib}"]));
        assert_eq!(merged.generator.exclude, s(&["uhp", "uhpV32"]));
        assert_eq!(merged.generator.root_name, "AcmeDriver");
    }

    #[test]
    fn given_lowercase_root_name_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.generator.root_name = "driver".into();

        let err = settings.validate().expect_err("should reject");
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_bad_runtime_path_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.generator.runtime_path = "crate::snmp::".into();

        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_template_when_parsing_then_is_valid_toml() {
        let raw = parse_raw_settings(&Settings::template()).expect("template parses");
        assert!(raw.mib.module.is_none());
    }
}
