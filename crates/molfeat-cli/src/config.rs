use crate::cli::AtomsArgs;
use crate::error::{CliError, Result};
use molfeat::workflows::{
    AtomDescriptorConfig, AtomDescriptorConfigBuilder, DescriptorColumns, ShortVectorPolicy,
};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PartialShortVectors {
    Error,
    Pad,
}

impl From<PartialShortVectors> for ShortVectorPolicy {
    fn from(p: PartialShortVectors) -> Self {
        match p {
            PartialShortVectors::Error => ShortVectorPolicy::Error,
            PartialShortVectors::Pad => ShortVectorPolicy::PadWithZeros,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialAtomDescriptorConfig {
    #[serde(rename = "smiles-column")]
    smiles_column: Option<String>,
    columns: Option<Vec<String>>,
    #[serde(rename = "short-vectors")]
    short_vectors: Option<PartialShortVectors>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(rename = "atom-descriptors")]
    atom_descriptors: Option<PartialAtomDescriptorConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file named by `--config`, or starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(mut self, args: &AtomsArgs) -> Result<AtomDescriptorConfig> {
        let file_config = self.atom_descriptors.take().unwrap_or_default();

        let mut builder = AtomDescriptorConfigBuilder::new();

        if let Some(column) = args.index_field.clone().or(file_config.smiles_column) {
            builder = builder.smiles_column(column);
        }

        if let Some(columns) = args.columns.clone().or(file_config.columns) {
            builder = builder.columns(DescriptorColumns::Named(columns));
        }

        let policy = if args.pad_short {
            Some(ShortVectorPolicy::PadWithZeros)
        } else {
            file_config.short_vectors.map(Into::into)
        };
        if let Some(policy) = policy {
            builder = builder.short_vectors(policy);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }
}
