use crate::scope::InputPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PartitionConfig {
    /// Duplicate handling for finalized input lists
    pub input_policy: InputPolicy,
    /// Treat structural mismatches between built and original graphs as errors
    pub strict_structure: bool,
    /// Name of the extracted fragment's root graph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment_name: Option<String>,
}

impl PartitionConfig {
    /// Layer command-line choices over the file config. A `--strict` flag
    /// can only tighten the file's setting.
    pub fn with_overrides(mut self, fragment_name: Option<String>, strict: bool) -> Self {
        if fragment_name.is_some() {
            self.fragment_name = fragment_name;
        }
        self.strict_structure |= strict;
        self
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("subscope.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PartitionConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PartitionConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PartitionConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
