use crate::cli::{BackendArg, ContactsArgs, SameResidueArg, SelectArgs};
use crate::error::{CliError, Result};
use atomsel::engine::config::{
    ContactsConfig, ContactsConfigBuilder, EvaluatorConfig, EvaluatorConfigBuilder,
    SameResiduePolicy, SpatialBackend,
};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum BackendName {
    Grid,
    KdTree,
}

impl From<BackendName> for SpatialBackend {
    fn from(name: BackendName) -> Self {
        match name {
            BackendName::Grid => SpatialBackend::Grid,
            BackendName::KdTree => SpatialBackend::KdTree,
        }
    }
}

impl From<BackendArg> for SpatialBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Grid => SpatialBackend::Grid,
            BackendArg::KdTree => SpatialBackend::KdTree,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PolicyName {
    Include,
    Exclude,
}

impl From<PolicyName> for SameResiduePolicy {
    fn from(name: PolicyName) -> Self {
        match name {
            PolicyName::Include => SameResiduePolicy::Include,
            PolicyName::Exclude => SameResiduePolicy::Exclude,
        }
    }
}

impl From<SameResidueArg> for SameResiduePolicy {
    fn from(arg: SameResidueArg) -> Self {
        match arg {
            SameResidueArg::Include => SameResiduePolicy::Include,
            SameResidueArg::Exclude => SameResiduePolicy::Exclude,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSelectionConfig {
    cache: Option<bool>,
    backend: Option<BackendName>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialContactsConfig {
    radius: Option<f64>,
    #[serde(rename = "same-residue")]
    same_residue: Option<PolicyName>,
    backend: Option<BackendName>,
}

/// Settings read from the TOML config file. Every key is optional; command
/// line flags take precedence, then `--set` values, then the file.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    selection: Option<PartialSelectionConfig>,
    contacts: Option<PartialContactsConfig>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` when given, otherwise starts from an empty configuration,
    /// then applies `--set` overrides.
    pub fn load(path: Option<&Path>, set_values: &[String]) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_set_values(set_values)?;
        Ok(config)
    }

    pub fn merge_select(self, args: &SelectArgs) -> EvaluatorConfig {
        let file = self.selection.unwrap_or_default();
        let mut builder = EvaluatorConfigBuilder::new();
        if args.no_cache {
            builder = builder.use_cache(false);
        } else if let Some(cache) = file.cache {
            builder = builder.use_cache(cache);
        }
        let backend = args
            .backend
            .map(SpatialBackend::from)
            .or(file.backend.map(SpatialBackend::from));
        if let Some(backend) = backend {
            builder = builder.backend(backend);
        }
        builder.build()
    }

    pub fn merge_contacts(self, args: &ContactsArgs) -> Result<ContactsConfig> {
        let file = self.contacts.unwrap_or_default();

        let radius = args.radius.or(file.radius).ok_or_else(|| {
            CliError::Config(
                "A value for 'contacts.radius' is required either in the config file or via --radius."
                    .to_string(),
            )
        })?;
        let policy = args
            .same_residue
            .map(SameResiduePolicy::from)
            .or(file.same_residue.map(SameResiduePolicy::from))
            .ok_or_else(|| {
                CliError::Config(
                    "A value for 'contacts.same-residue' (include or exclude) is required either in the config file or via --same-residue."
                        .to_string(),
                )
            })?;

        let mut builder = ContactsConfigBuilder::new().radius(radius).same_residue(policy);
        let backend = args
            .backend
            .map(SpatialBackend::from)
            .or(file.backend.map(SpatialBackend::from));
        if let Some(backend) = backend {
            builder = builder.backend(backend);
        }
        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "selection.cache" => {
                    self.selection.get_or_insert_with(Default::default).cache =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid boolean value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                "selection.backend" => {
                    self.selection.get_or_insert_with(Default::default).backend =
                        Some(parse_backend(key, value_str)?);
                }
                "contacts.radius" => {
                    self.contacts.get_or_insert_with(Default::default).radius =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                        })?);
                }
                "contacts.same-residue" => {
                    let policy = match value_str {
                        "include" => PolicyName::Include,
                        "exclude" => PolicyName::Exclude,
                        _ => {
                            return Err(CliError::Config(format!(
                                "Invalid value for {}: {}. Expected 'include' or 'exclude'.",
                                key, value_str
                            )));
                        }
                    };
                    self.contacts.get_or_insert_with(Default::default).same_residue = Some(policy);
                }
                "contacts.backend" => {
                    self.contacts.get_or_insert_with(Default::default).backend =
                        Some(parse_backend(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_backend(key: &str, value: &str) -> Result<BackendName> {
    match value {
        "grid" => Ok(BackendName::Grid),
        "kd-tree" => Ok(BackendName::KdTree),
        _ => Err(CliError::Config(format!(
            "Invalid value for {}: {}. Expected 'grid' or 'kd-tree'.",
            key, value
        ))),
    }
}
