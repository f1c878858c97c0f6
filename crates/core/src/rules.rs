use serde::{Deserialize, Serialize};

use crate::definition::ClassificationDefinition;
use crate::format::DisplayFormat;
use crate::parser::{level_text, ClassificationParts};

/// Picker entries that cannot be selected alongside the current parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledControls {
    pub levels: Vec<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesOutcome {
    pub disabled: DisabledControls,
    pub parts: ClassificationParts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Required,
    Groups,
    Subgroups,
}

impl Section {
    fn values(self, parts: &ClassificationParts) -> &[String] {
        match self {
            Section::Required => &parts.req,
            Section::Groups => &parts.groups,
            Section::Subgroups => &parts.subgroups,
        }
    }
}

/// Applies the per-token `require_lvl`, `require_group` and `limited_to_group`
/// constraints plus group auto-selection. `user_classification` marks a
/// user's own clearance, which never gets auto-selected groups.
pub fn apply_rules(
    parts: ClassificationParts,
    definition: &ClassificationDefinition,
    format: DisplayFormat,
    user_classification: bool,
) -> RulesOutcome {
    let mut parts = parts;
    let mut disabled = DisabledControls::default();

    for section in [Section::Required, Section::Groups, Section::Subgroups] {
        // Walk by position: entries pushed while walking are visited too.
        let mut pos = 0;
        while let Some(value) = section.values(&parts).get(pos).cloned() {
            pos += 1;
            if value.is_empty() {
                continue;
            }
            if let Some(params) = definition.params(&value) {
                if let Some(required_lvl) = params.require_lvl {
                    if parts.rank().unwrap_or(0) < required_lvl {
                        let idx = required_lvl.to_string();
                        parts.lvl = level_text(Some(&idx), definition, format);
                        parts.lvl_idx = Some(idx);
                    }
                    for (rank, short) in definition.levels() {
                        if rank < required_lvl {
                            disabled.levels.push(level_name(short, definition, format));
                        }
                    }
                }

                if let Some(group) = params.require_group.as_deref() {
                    let group = group_name(group, definition, format);
                    if !parts.groups.contains(&group) {
                        parts.groups.push(group);
                        auto_select_groups(&mut parts.groups, definition, format);
                    }
                }

                if let Some(limit) = params.limited_to_group.as_deref() {
                    for (short, long) in &definition.groups_map_stl {
                        if short == limit {
                            continue;
                        }
                        let shown = match format {
                            DisplayFormat::Long => long,
                            DisplayFormat::Short => short,
                        };
                        disabled.groups.push(shown.clone());
                        if let Some(idx) = parts.groups.iter().position(|g| g == shown) {
                            parts.groups.remove(idx);
                        }
                    }
                }
            }

            if !user_classification && section == Section::Groups {
                auto_select_groups(&mut parts.groups, definition, format);
            }
        }
    }

    parts.req.sort();
    parts.groups.sort();
    parts.subgroups.sort();
    tracing::trace!(
        disabled_levels = disabled.levels.len(),
        disabled_groups = disabled.groups.len(),
        "applied classification rules"
    );
    RulesOutcome { disabled, parts }
}

fn auto_select_groups(
    groups: &mut Vec<String>,
    definition: &ClassificationDefinition,
    format: DisplayFormat,
) {
    let auto = match format {
        DisplayFormat::Long => &definition.groups_auto_select,
        DisplayFormat::Short => &definition.groups_auto_select_short,
    };
    for group in auto {
        if !groups.contains(group) {
            groups.push(group.clone());
        }
    }
}

fn level_name(short: &str, definition: &ClassificationDefinition, format: DisplayFormat) -> String {
    match format {
        DisplayFormat::Long => definition
            .levels_map_stl
            .get(short)
            .cloned()
            .unwrap_or_else(|| short.to_string()),
        DisplayFormat::Short => short.to_string(),
    }
}

fn group_name(short: &str, definition: &ClassificationDefinition, format: DisplayFormat) -> String {
    match format {
        DisplayFormat::Long => definition
            .groups_map_stl
            .get(short)
            .cloned()
            .unwrap_or_else(|| short.to_string()),
        DisplayFormat::Short => short.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::test_support::fixture;
    use DisplayFormat::{Long, Short};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn limited_subgroup_disables_other_groups() {
        let def = fixture();
        let outcome = apply_rules(parse("L2//REL TO A, X/R3", &def, Short), &def, Short, false);
        assert_eq!(outcome.disabled.groups, strings(&["A", "B"]));
        assert!(outcome.disabled.levels.is_empty());
        assert_eq!(outcome.parts.groups, strings(&["X"]));
        assert_eq!(outcome.parts.subgroups, strings(&["R3"]));

        let outcome = apply_rules(parse("L2//REL TO X/R3", &def, Long), &def, Long, false);
        assert_eq!(outcome.disabled.groups, strings(&["GROUP A", "GROUP B"]));
        assert_eq!(outcome.parts.groups, strings(&["GROUP X"]));
        assert_eq!(outcome.parts.lvl, "LEVEL 2");
    }

    #[test]
    fn subgroup_pulls_in_its_required_group() {
        let def = fixture();
        let outcome = apply_rules(parse("L2//R2", &def, Short), &def, Short, false);
        assert_eq!(outcome.parts.groups, strings(&["X"]));
        assert_eq!(outcome.parts.normalized(&def, Short), "L2//XX/R2");

        let outcome = apply_rules(parse("L2//R2", &def, Long), &def, Long, false);
        assert_eq!(outcome.parts.groups, strings(&["GROUP X"]));
        assert_eq!(outcome.disabled, DisabledControls::default());
    }

    #[test]
    fn required_level_raises_the_level() {
        let mut def = fixture();
        for token in ["LE", "LEGAL DEPARTMENT"] {
            def.params_map.get_mut(token).unwrap().require_lvl = Some(5);
        }

        let outcome = apply_rules(parse("L0//LE", &def, Short), &def, Short, false);
        assert_eq!(outcome.parts.lvl, "L1");
        assert_eq!(outcome.parts.rank(), Some(5));
        assert_eq!(outcome.disabled.levels, strings(&["L0"]));

        let outcome = apply_rules(parse("L2//LE", &def, Long), &def, Long, false);
        assert_eq!(outcome.parts.lvl, "LEVEL 2");
        assert_eq!(outcome.parts.req, strings(&["LEGAL DEPARTMENT"]));
        assert_eq!(outcome.disabled.levels, strings(&["LEVEL 0"]));
    }

    #[test]
    fn auto_selects_groups_except_for_user_classification() {
        let mut def = fixture();
        def.groups_auto_select = strings(&["GROUP A"]);
        def.groups_auto_select_short = strings(&["A"]);

        let outcome = apply_rules(parse("L0//REL TO B", &def, Short), &def, Short, false);
        assert_eq!(outcome.parts.groups, strings(&["A", "B"]));
        assert_eq!(outcome.parts.normalized(&def, Long), "L0//REL TO A, B");

        let outcome = apply_rules(parse("L0//REL TO B", &def, Long), &def, Long, false);
        assert_eq!(outcome.parts.groups, strings(&["GROUP A", "GROUP B"]));

        let outcome = apply_rules(parse("L0//REL TO B", &def, Short), &def, Short, true);
        assert_eq!(outcome.parts.groups, strings(&["B"]));

        let outcome = apply_rules(parse("L0", &def, Short), &def, Short, false);
        assert!(outcome.parts.groups.is_empty());
    }
}
