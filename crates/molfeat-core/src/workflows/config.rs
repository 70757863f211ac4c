use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for parameter {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: &'static str,
    },
}

/// How descriptor columns are chosen from a structure-data table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DescriptorColumns {
    /// Every column whose first value contains a comma.
    #[default]
    Detect,
    /// Exactly these columns, in this order.
    Named(Vec<String>),
}

/// What to do with a per-atom vector that has fewer values than the molecule has atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortVectorPolicy {
    #[default]
    Error,
    PadWithZeros,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomDescriptorConfig {
    /// The data field that identifies each record.
    pub smiles_column: String,
    pub columns: DescriptorColumns,
    pub short_vectors: ShortVectorPolicy,
}

impl Default for AtomDescriptorConfig {
    fn default() -> Self {
        Self {
            smiles_column: "SMILES".to_string(),
            columns: DescriptorColumns::Detect,
            short_vectors: ShortVectorPolicy::Error,
        }
    }
}

#[derive(Default)]
pub struct AtomDescriptorConfigBuilder {
    smiles_column: Option<String>,
    columns: Option<DescriptorColumns>,
    short_vectors: Option<ShortVectorPolicy>,
}

impl AtomDescriptorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn smiles_column(mut self, column: impl Into<String>) -> Self {
        self.smiles_column = Some(column.into());
        self
    }
    pub fn columns(mut self, columns: DescriptorColumns) -> Self {
        self.columns = Some(columns);
        self
    }
    pub fn short_vectors(mut self, policy: ShortVectorPolicy) -> Self {
        self.short_vectors = Some(policy);
        self
    }

    /// Builds the configuration, filling unset parameters with their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if the SMILES column name is empty,
    /// or if an explicit column list is empty or names a column twice.
    pub fn build(self) -> Result<AtomDescriptorConfig, ConfigError> {
        let defaults = AtomDescriptorConfig::default();

        let smiles_column = self.smiles_column.unwrap_or(defaults.smiles_column);
        if smiles_column.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "smiles_column",
                reason: "must not be empty",
            });
        }

        let columns = self.columns.unwrap_or(defaults.columns);
        if let DescriptorColumns::Named(names) = &columns {
            if names.is_empty() {
                return Err(ConfigError::InvalidParameter {
                    parameter: "columns",
                    reason: "must name at least one column",
                });
            }
            let mut seen = std::collections::HashSet::new();
            if !names.iter().all(|name| seen.insert(name.as_str())) {
                return Err(ConfigError::InvalidParameter {
                    parameter: "columns",
                    reason: "must not repeat a column",
                });
            }
        }

        Ok(AtomDescriptorConfig {
            smiles_column,
            columns,
            short_vectors: self.short_vectors.unwrap_or(defaults.short_vectors),
        })
    }
}
