use itertools::Itertools;

use crate::definition::ClassificationDefinition;
use crate::format::DisplayFormat;
use crate::parser::{groups, level_index, level_text, required, ClassificationParts};

/// Normalized marking covering both inputs: the higher level, every required
/// token (sorted), and the groups both sides share (or all of them when one side has
/// none).
pub fn max_classification(
    first: &str,
    second: &str,
    definition: &ClassificationDefinition,
    format: DisplayFormat,
) -> String {
    let rank = level_rank(first, definition).max(level_rank(second, definition));
    let lvl_idx = rank.to_string();

    let mut req: Vec<String> = required(first, definition, format)
        .into_iter()
        .chain(required(second, definition, format))
        .unique()
        .collect();
    req.sort();
    let (first_groups, first_subgroups) = groups(first, definition, format);
    let (second_groups, second_subgroups) = groups(second, definition, format);

    let parts = ClassificationParts {
        lvl: level_text(Some(&lvl_idx), definition, format),
        lvl_idx: Some(lvl_idx),
        req,
        groups: merge(first_groups, second_groups),
        subgroups: merge(first_subgroups, second_subgroups),
    };
    parts.normalized(definition, format)
}

fn level_rank(raw: &str, definition: &ClassificationDefinition) -> i64 {
    level_index(raw, definition)
        .and_then(|idx| idx.trim().parse().ok())
        .unwrap_or(0)
}

fn merge(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    if !first.is_empty() && !second.is_empty() {
        first.into_iter().filter(|v| second.contains(v)).collect()
    } else {
        first.into_iter().chain(second).unique().collect()
    }
}
