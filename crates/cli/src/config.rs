use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use c12n_core::{ClassificationDefinition, DisplayFormat, OriginalDefinition};
use serde::Deserialize;

pub const DEFAULT_CONFIG: &str = "c12n.toml";
const DEFINITION_ENV: &str = "C12N_DEFINITION";

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Flattened definition (JSON or YAML).
    #[serde(default)]
    pub definition: Option<PathBuf>,
    /// Authoring-form definition, compiled on load.
    #[serde(default)]
    pub definition_original: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<String>,
}

/// Where the definition comes from, in precedence order: command-line flags,
/// then the config file, then `C12N_DEFINITION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionSource {
    Flattened(PathBuf),
    Original(PathBuf),
}

impl AppConfig {
    pub fn format(&self, flag: Option<DisplayFormat>) -> Result<DisplayFormat> {
        if let Some(format) = flag {
            return Ok(format);
        }
        match self.format.as_deref() {
            Some(value) => value
                .parse()
                .map_err(|e| anyhow!("invalid config format: {e}")),
            None => Ok(DisplayFormat::default()),
        }
    }

    pub fn definition_source(
        &self,
        definition_flag: Option<&Path>,
        original_flag: Option<&Path>,
    ) -> Result<DefinitionSource> {
        if let Some(path) = definition_flag {
            return Ok(DefinitionSource::Flattened(path.to_path_buf()));
        }
        if let Some(path) = original_flag {
            return Ok(DefinitionSource::Original(path.to_path_buf()));
        }
        if let Some(path) = &self.definition {
            return Ok(DefinitionSource::Flattened(path.clone()));
        }
        if let Some(path) = &self.definition_original {
            return Ok(DefinitionSource::Original(path.clone()));
        }
        if let Ok(path) = env::var(DEFINITION_ENV) {
            if !path.trim().is_empty() {
                return Ok(DefinitionSource::Flattened(PathBuf::from(path)));
            }
        }
        Err(anyhow!(
            "no classification definition configured (use --definition, --original, `definition` in {DEFAULT_CONFIG} or {DEFINITION_ENV})"
        ))
    }

    pub fn load_definition(
        &self,
        definition_flag: Option<&Path>,
        original_flag: Option<&Path>,
    ) -> Result<ClassificationDefinition> {
        self.definition_source(definition_flag, original_flag)?.load()
    }
}

impl DefinitionSource {
    pub fn load(&self) -> Result<ClassificationDefinition> {
        match self {
            DefinitionSource::Flattened(path) => ClassificationDefinition::load(path)
                .with_context(|| format!("failed to load definition {}", path.display())),
            DefinitionSource::Original(path) => OriginalDefinition::load(path)
                .and_then(|original| original.compile())
                .with_context(|| format!("failed to compile definition {}", path.display())),
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&contents).map_err(|e| anyhow!("invalid config: {e}"))
}
