use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{C12nError, Result};
use crate::original::OriginalDefinition;

pub type StringMap = IndexMap<String, String>;
pub type AliasMap = IndexMap<String, Vec<String>>;

/// Per-token flags carried in `params_map`, keyed by both long and short names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required_group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solitary_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_lvl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limited_to_group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Flattened classification definition as served by the configuration
/// endpoint. Every lookup table is keyed by upper-case marking tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationDefinition {
    #[serde(rename = "RESTRICTED")]
    pub restricted: String,
    #[serde(rename = "UNRESTRICTED")]
    pub unrestricted: String,
    pub enforce: bool,
    pub dynamic_groups: bool,
    #[serde(deserialize_with = "loose_string_map")]
    pub levels_map: StringMap,
    pub levels_map_lts: StringMap,
    pub levels_map_stl: StringMap,
    pub levels_aliases: StringMap,
    pub levels_styles_map: IndexMap<String, LevelStyle>,
    pub access_req_map_lts: StringMap,
    pub access_req_map_stl: StringMap,
    pub access_req_aliases: AliasMap,
    pub groups_map_lts: StringMap,
    pub groups_map_stl: StringMap,
    pub groups_aliases: AliasMap,
    pub groups_auto_select: Vec<String>,
    pub groups_auto_select_short: Vec<String>,
    pub subgroups_map_lts: StringMap,
    pub subgroups_map_stl: StringMap,
    pub subgroups_aliases: AliasMap,
    pub subgroups_auto_select: Vec<String>,
    pub subgroups_auto_select_short: Vec<String>,
    pub params_map: IndexMap<String, TokenParams>,
    pub description: StringMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_definition: Option<OriginalDefinition>,
}

impl ClassificationDefinition {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Loads a flattened definition; `.yml`/`.yaml` files are read as YAML,
    /// everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let definition: Self = read_structured(path.as_ref())?;
        tracing::debug!(
            path = %path.as_ref().display(),
            levels = definition.levels_map_stl.len(),
            groups = definition.groups_map_stl.len(),
            "loaded classification definition"
        );
        Ok(definition)
    }

    pub fn params(&self, token: &str) -> Option<&TokenParams> {
        self.params_map.get(token)
    }

    pub fn is_required_group(&self, token: &str) -> bool {
        self.params(token)
            .and_then(|p| p.is_required_group)
            .unwrap_or(false)
    }

    pub fn solitary_display_name(&self, group: &str) -> Option<&str> {
        self.params(group)
            .and_then(|p| p.solitary_display_name.as_deref())
    }

    /// Numeric rank stored in `levels_map` for a short level token.
    pub fn level_rank(&self, short_name: &str) -> Option<i64> {
        self.levels_map
            .get(short_name)
            .and_then(|value| value.trim().parse().ok())
    }

    /// `(rank, short token)` for every level, lowest rank first.
    pub fn levels(&self) -> Vec<(i64, &str)> {
        let mut out: Vec<(i64, &str)> = self
            .levels_map
            .iter()
            .filter_map(|(key, short)| key.parse::<i64>().ok().map(|rank| (rank, short.as_str())))
            .collect();
        out.sort_by_key(|(rank, _)| *rank);
        out
    }

    pub(crate) fn is_required_token(&self, token: &str) -> bool {
        self.access_req_map_lts.contains_key(token)
            || self.access_req_map_stl.contains_key(token)
            || self.access_req_aliases.contains_key(token)
    }

    pub(crate) fn is_level_token(&self, token: &str) -> bool {
        self.levels_map.contains_key(token)
            || self.levels_map_lts.contains_key(token)
            || self.levels_aliases.contains_key(token)
    }
}

pub(crate) fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| C12nError::DefinitionRead {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "yml" | "yaml"))
        .unwrap_or(false);
    if is_yaml {
        Ok(serde_yaml::from_str(&contents)?)
    } else {
        Ok(serde_json::from_str(&contents)?)
    }
}

/// `levels_map` mixes rank strings and bare numbers depending on who produced
/// it, so scalar values are all folded into strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl From<LooseScalar> for String {
    fn from(value: LooseScalar) -> Self {
        match value {
            LooseScalar::Text(text) => text,
            LooseScalar::Integer(n) => n.to_string(),
            LooseScalar::Float(f) if f.is_finite() && f.fract() == 0.0 => (f as i64).to_string(),
            LooseScalar::Float(f) => f.to_string(),
            LooseScalar::Flag(b) => b.to_string(),
        }
    }
}

fn loose_string_map<'de, D>(deserializer: D) -> std::result::Result<StringMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, LooseScalar>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(key, value)| (key, value.into())).collect())
}
