use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Which spatial index backs proximity predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpatialBackend {
    /// Uniform cell list sized to the query radius.
    #[default]
    Grid,
    /// k-d tree, independent of the query radius.
    KdTree,
}

/// How self-contacts treat pairs of atoms in the same residue.
///
/// Has no default; callers of the contacts facility must pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SameResiduePolicy {
    /// Report same-residue pairs like any other pair.
    Include,
    /// Drop pairs whose atoms share a residue index.
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorConfig {
    pub use_cache: bool,
    pub backend: SpatialBackend,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            backend: SpatialBackend::Grid,
        }
    }
}

#[derive(Default)]
pub struct EvaluatorConfigBuilder {
    use_cache: Option<bool>,
    backend: Option<SpatialBackend>,
}

impl EvaluatorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = Some(enabled);
        self
    }
    pub fn backend(mut self, backend: SpatialBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> EvaluatorConfig {
        let defaults = EvaluatorConfig::default();
        EvaluatorConfig {
            use_cache: self.use_cache.unwrap_or(defaults.use_cache),
            backend: self.backend.unwrap_or(defaults.backend),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactsConfig {
    pub radius: f64,
    pub same_residue: SameResiduePolicy,
    pub backend: SpatialBackend,
}

#[derive(Default)]
pub struct ContactsConfigBuilder {
    radius: Option<f64>,
    same_residue: Option<SameResiduePolicy>,
    backend: Option<SpatialBackend>,
}

impl ContactsConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }
    pub fn same_residue(mut self, policy: SameResiduePolicy) -> Self {
        self.same_residue = Some(policy);
        self
    }
    pub fn backend(mut self, backend: SpatialBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<ContactsConfig, ConfigError> {
        let radius = self.radius.ok_or(ConfigError::MissingParameter("radius"))?;
        if !radius.is_finite() || radius < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "radius",
                reason: format!("{radius} is not a finite, non-negative distance"),
            });
        }
        Ok(ContactsConfig {
            radius,
            same_residue: self
                .same_residue
                .ok_or(ConfigError::MissingParameter("same_residue"))?,
            backend: self.backend.unwrap_or_default(),
        })
    }
}
