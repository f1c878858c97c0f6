use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::definition::{
    read_structured, AliasMap, ClassificationDefinition, LevelStyle, TokenParams,
};
use crate::error::{C12nError, Result};
use crate::format::DisplayFormat;
use crate::normalize::normalize;

const DEFAULT_DESCRIPTION: &str = "N/A";

/// Authoring form of a classification scheme, as written by operators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginalDefinition {
    pub enforce: bool,
    pub dynamic_groups: bool,
    pub levels: Vec<LevelEntry>,
    pub required: Vec<RequiredEntry>,
    pub groups: Vec<GroupEntry>,
    pub subgroups: Vec<SubgroupEntry>,
    pub restricted: String,
    pub unrestricted: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelEntry {
    pub lvl: i64,
    pub name: String,
    pub short_name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub css: Option<LevelStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredEntry {
    pub name: String,
    pub short_name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub is_required_group: Option<bool>,
    pub require_lvl: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupEntry {
    pub name: String,
    pub short_name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub auto_select: bool,
    pub solitary_display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubgroupEntry {
    pub name: String,
    pub short_name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub auto_select: bool,
    pub solitary_display_name: Option<String>,
    pub require_group: Option<String>,
    pub limited_to_group: Option<String>,
}

impl OriginalDefinition {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_structured(path.as_ref())
    }

    /// Builds the flattened lookup tables. Names, short names and aliases are
    /// upper-cased; every table is keyed the way markings are written.
    pub fn compile(&self) -> Result<ClassificationDefinition> {
        let mut def = ClassificationDefinition {
            enforce: self.enforce,
            dynamic_groups: self.dynamic_groups,
            ..Default::default()
        };
        let mut seen_ranks = HashSet::new();

        for level in &self.levels {
            let (name, short) = names("level", &level.name, &level.short_name)?;
            if !seen_ranks.insert(level.lvl) {
                return Err(C12nError::InvalidDefinition(format!(
                    "duplicate level rank {} for {name}",
                    level.lvl
                )));
            }
            def.levels_map.insert(short.clone(), level.lvl.to_string());
            def.levels_map.insert(level.lvl.to_string(), short.clone());
            def.levels_map_lts.insert(name.clone(), short.clone());
            def.levels_map_stl.insert(short.clone(), name.clone());
            for alias in &level.aliases {
                def.levels_aliases.insert(alias.to_uppercase(), short.clone());
            }
            let style = level.css.clone().unwrap_or_else(|| LevelStyle {
                color: Some("default".to_string()),
                ..Default::default()
            });
            def.levels_styles_map.insert(short.clone(), style.clone());
            def.levels_styles_map.insert(name.clone(), style);
            describe(&mut def, &name, &short, level.description.as_deref());
            insert_params(&mut def, &name, &short, TokenParams::default());
        }

        for req in &self.required {
            let (name, short) = names("required", &req.name, &req.short_name)?;
            def.access_req_map_lts.insert(name.clone(), short.clone());
            def.access_req_map_stl.insert(short.clone(), name.clone());
            for alias in &req.aliases {
                push_alias(&mut def.access_req_aliases, alias, &short);
            }
            describe(&mut def, &name, &short, req.description.as_deref());
            let params = TokenParams {
                is_required_group: req.is_required_group,
                require_lvl: req.require_lvl,
                ..Default::default()
            };
            insert_params(&mut def, &name, &short, params);
        }

        for group in &self.groups {
            let (name, short) = names("group", &group.name, &group.short_name)?;
            def.groups_map_lts.insert(name.clone(), short.clone());
            def.groups_map_stl.insert(short.clone(), name.clone());
            for alias in &group.aliases {
                push_alias(&mut def.groups_aliases, alias, &short);
            }
            if group.auto_select {
                def.groups_auto_select.push(name.clone());
                def.groups_auto_select_short.push(short.clone());
            }
            describe(&mut def, &name, &short, group.description.as_deref());
            let params = TokenParams {
                solitary_display_name: group.solitary_display_name.clone(),
                ..Default::default()
            };
            insert_params(&mut def, &name, &short, params);
        }

        for subgroup in &self.subgroups {
            let (name, short) = names("subgroup", &subgroup.name, &subgroup.short_name)?;
            def.subgroups_map_lts.insert(name.clone(), short.clone());
            def.subgroups_map_stl.insert(short.clone(), name.clone());
            for alias in &subgroup.aliases {
                push_alias(&mut def.subgroups_aliases, alias, &short);
            }
            if subgroup.auto_select {
                def.subgroups_auto_select.push(name.clone());
                def.subgroups_auto_select_short.push(short.clone());
            }
            describe(&mut def, &name, &short, subgroup.description.as_deref());
            let params = TokenParams {
                solitary_display_name: subgroup.solitary_display_name.clone(),
                require_group: subgroup.require_group.as_deref().map(str::to_uppercase),
                limited_to_group: subgroup.limited_to_group.as_deref().map(str::to_uppercase),
                ..Default::default()
            };
            insert_params(&mut def, &name, &short, params);
        }

        def.restricted = normalize(&self.restricted.to_uppercase(), &def, DisplayFormat::Long);
        def.unrestricted = normalize(&self.unrestricted.to_uppercase(), &def, DisplayFormat::Long);
        def.original_definition = Some(self.clone());
        tracing::debug!(
            levels = self.levels.len(),
            required = self.required.len(),
            groups = self.groups.len(),
            subgroups = self.subgroups.len(),
            "compiled classification definition"
        );
        Ok(def)
    }
}

fn names(kind: &str, name: &str, short_name: &str) -> Result<(String, String)> {
    let name = name.trim().to_uppercase();
    let short = short_name.trim().to_uppercase();
    if name.is_empty() || short.is_empty() {
        return Err(C12nError::InvalidDefinition(format!(
            "{kind} entry needs both name and short_name (got {name:?}/{short:?})"
        )));
    }
    Ok((name, short))
}

fn push_alias(aliases: &mut AliasMap, alias: &str, short: &str) {
    let members = aliases.entry(alias.to_uppercase()).or_default();
    if !members.iter().any(|m| m == short) {
        members.push(short.to_string());
    }
}

fn describe(def: &mut ClassificationDefinition, name: &str, short: &str, text: Option<&str>) {
    let text = text.unwrap_or(DEFAULT_DESCRIPTION).to_string();
    def.description.insert(short.to_string(), text.clone());
    def.description.insert(name.to_string(), text);
}

fn insert_params(def: &mut ClassificationDefinition, name: &str, short: &str, params: TokenParams) {
    def.params_map.insert(short.to_string(), params.clone());
    def.params_map.insert(name.to_string(), params);
}
