use serde::{Deserialize, Serialize};

use crate::definition::{ClassificationDefinition, StringMap};
use crate::format::DisplayFormat;

/// A marking broken into its components. Token lists hold either short or long
/// names depending on the format they were parsed with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationParts {
    pub lvl_idx: Option<String>,
    pub lvl: String,
    pub req: Vec<String>,
    pub groups: Vec<String>,
    pub subgroups: Vec<String>,
}

impl ClassificationParts {
    pub fn rank(&self) -> Option<i64> {
        self.lvl_idx
            .as_deref()
            .and_then(|idx| idx.trim().parse().ok())
    }
}

pub fn parse(
    raw: &str,
    definition: &ClassificationDefinition,
    format: DisplayFormat,
) -> ClassificationParts {
    let (groups, subgroups) = groups(raw, definition, format);
    let lvl_idx = level_index(raw, definition);
    ClassificationParts {
        lvl: level_text(lvl_idx.as_deref(), definition, format),
        lvl_idx,
        req: required(raw, definition, format),
        groups,
        subgroups,
    }
}

/// Resolves the level segment (everything before the first `//`) to its key
/// in `levels_map`.
pub fn level_index(raw: &str, definition: &ClassificationDefinition) -> Option<String> {
    let level = raw.split_once("//").map_or(raw, |(level, _)| level);
    let levels = &definition.levels_map;
    if let Some(idx) = levels.get(level) {
        return Some(idx.clone());
    }
    let idx = definition
        .levels_map_lts
        .get(level)
        .or_else(|| definition.levels_aliases.get(level))
        .and_then(|short| levels.get(short))
        .cloned();
    if idx.is_none() {
        tracing::trace!(level, "dropped unresolved level token");
    }
    idx
}

pub fn level_text(
    idx: Option<&str>,
    definition: &ClassificationDefinition,
    format: DisplayFormat,
) -> String {
    let text = idx
        .and_then(|idx| definition.levels_map.get(idx))
        .map(String::as_str)
        .unwrap_or("");
    if format.is_long() {
        definition
            .levels_map_stl
            .get(text)
            .cloned()
            .unwrap_or_default()
    } else {
        text.to_string()
    }
}

/// Required-access tokens, without deduplication: aliases that expand to an
/// already present token produce a second copy.
pub fn required(
    raw: &str,
    definition: &ClassificationDefinition,
    format: DisplayFormat,
) -> Vec<String> {
    let mut tokens = Vec::new();
    for part in raw.split('/') {
        if let Some(short) = definition.access_req_map_lts.get(part) {
            tokens.push(short.clone());
        } else if definition.access_req_map_stl.contains_key(part) {
            tokens.push(part.to_string());
        } else if let Some(aliased) = definition.access_req_aliases.get(part) {
            tokens.extend(aliased.iter().cloned());
        }
    }

    if format.is_long() {
        return to_long_names(tokens, &definition.access_req_map_stl);
    }
    tokens.sort();
    tokens
}

/// Releasability groups and subgroups, in that order.
pub fn groups(
    raw: &str,
    definition: &ClassificationDefinition,
    format: DisplayFormat,
) -> (Vec<String>, Vec<String>) {
    let mut groups = Vec::new();
    let mut subgroups = Vec::new();
    let mut unknown = Vec::new();

    for token in group_tokens(raw) {
        if let Some(short) = definition.groups_map_lts.get(&token) {
            groups.push(short.clone());
        } else if definition.groups_map_stl.contains_key(&token) {
            groups.push(token);
        } else if let Some(aliased) = definition.groups_aliases.get(&token) {
            groups.extend(aliased.iter().cloned());
        } else if let Some(short) = definition.subgroups_map_lts.get(&token) {
            subgroups.push(short.clone());
        } else if definition.subgroups_map_stl.contains_key(&token) {
            subgroups.push(token);
        } else if let Some(aliased) = definition.subgroups_aliases.get(&token) {
            subgroups.extend(aliased.iter().cloned());
        } else {
            unknown.push(token);
        }
    }

    // Level and required tokens also pass through here; only the rest is unknown.
    for token in unknown {
        if token.is_empty()
            || definition.is_required_token(&token)
            || definition.is_level_token(&token)
        {
            continue;
        }
        if definition.dynamic_groups {
            tracing::trace!(token = %token, "kept unknown token as dynamic group");
            groups.push(token);
        } else {
            tracing::trace!(token = %token, "dropped unknown marking token");
        }
    }

    if format.is_long() {
        let mut groups: Vec<String> = groups
            .into_iter()
            .map(|group| match definition.groups_map_stl.get(&group) {
                Some(long) => long.clone(),
                None => group,
            })
            .collect();
        groups.sort();
        return (groups, to_long_names(subgroups, &definition.subgroups_map_stl));
    }

    groups.sort();
    subgroups.sort();
    (groups, subgroups)
}

fn group_tokens(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for section in raw.split("//") {
        let section = section.replacen("REL TO ", "", 1);
        for piece in section.split(',') {
            tokens.extend(piece.trim().split('/').map(str::to_string));
        }
    }
    tokens
}

/// Maps short tokens to their long names and sorts them. Tokens without a long
/// name render as empty strings placed after every resolved name.
fn to_long_names(tokens: Vec<String>, short_to_long: &StringMap) -> Vec<String> {
    let mut resolved = Vec::with_capacity(tokens.len());
    let mut missing = 0;
    for token in tokens {
        match short_to_long.get(&token) {
            Some(long) => resolved.push(long.clone()),
            None => {
                tracing::trace!(token = %token, "token has no long name");
                missing += 1;
            }
        }
    }
    resolved.sort();
    resolved.extend(std::iter::repeat(String::new()).take(missing));
    resolved
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::test_support::fixture;
    use DisplayFormat::{Long, Short};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn extracts_level_from_short_long_and_alias() {
        let def = fixture();
        for raw in ["L0", "LEVEL 0", "OPEN", "L0//AC"] {
            let parts = parse(raw, &def, Short);
            assert_eq!(parts.lvl_idx.as_deref(), Some("1"), "{raw}");
            assert_eq!(parts.lvl, "L0");
        }
        let parts = parse("LEVEL 1", &def, Long);
        assert_eq!(parts.rank(), Some(5));
        assert_eq!(parts.lvl, "LEVEL 1");
    }

    #[test]
    fn unknown_level_yields_empty_text() {
        let def = fixture();
        let parts = parse("LEVEL 12", &def, Long);
        assert_eq!(parts.lvl_idx, None);
        assert_eq!(parts.lvl, "");
        assert_eq!(parts.rank(), None);
    }

    #[test]
    fn extracts_groups_in_both_formats() {
        let def = fixture();
        let parts = parse("L0//REL TO B, A", &def, Short);
        assert_eq!(parts.groups, strings(&["A", "B"]));
        let parts = parse("LEVEL 0//REL TO GROUP B, GROUP A", &def, Long);
        assert_eq!(parts.groups, strings(&["GROUP A", "GROUP B"]));
    }

    #[test]
    fn separates_groups_from_subgroups() {
        let def = fixture();
        let parts = parse("LEVEL 0//AC//REL TO A, XX/R3", &def, Short);
        assert_eq!(parts.req, strings(&["AC"]));
        assert_eq!(parts.groups, strings(&["A", "X"]));
        assert_eq!(parts.subgroups, strings(&["R3"]));

        let parts = parse("LEVEL 0//AC//REL TO A, XX/R3", &def, Long);
        assert_eq!(parts.req, strings(&["ACCOUNTING"]));
        assert_eq!(parts.groups, strings(&["GROUP A", "GROUP X"]));
        assert_eq!(parts.subgroups, strings(&["RESERVE THREE"]));
    }

    #[test]
    fn required_keeps_duplicates() {
        let def = fixture();
        let parts = parse("L0//AC/ACC", &def, Short);
        assert_eq!(parts.req, strings(&["AC", "AC"]));
    }

    #[test]
    fn long_names_missing_from_map_sort_last() {
        let mut def = fixture();
        def.access_req_aliases
            .insert("ZZ".to_string(), strings(&["QQ"]));
        let parts = parse("L0//ZZ/AC", &def, Long);
        assert_eq!(parts.req, strings(&["ACCOUNTING", ""]));
        let parts = parse("L0//ZZ/AC", &def, Short);
        assert_eq!(parts.req, strings(&["AC", "QQ"]));
    }

    #[test]
    fn unknown_tokens_are_dropped_unless_groups_are_dynamic() {
        let mut def = fixture();
        let parts = parse("LEVEL 0//LEGAL DEPARTMENT//GARBO", &def, Short);
        assert_eq!(parts.req, strings(&["LE"]));
        assert!(parts.groups.is_empty());

        def.dynamic_groups = true;
        let parts = parse("LEVEL 0//LEGAL DEPARTMENT//GARBO", &def, Short);
        assert_eq!(parts.req, strings(&["LE"]));
        assert_eq!(parts.groups, strings(&["GARBO"]));

        let parts = parse("L0//GARBO", &def, Long);
        assert_eq!(parts.groups, strings(&["GARBO"]));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn traced(run: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(captured.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn dropped_tokens_are_traced() {
        let def = fixture();
        let logs = traced(|| {
            parse("NOWHERE//LE//REL TO GARBO", &def, Short);
        });
        assert!(logs.contains("dropped unresolved level token"), "{logs}");
        assert!(logs.contains("NOWHERE"), "{logs}");
        assert!(logs.contains("dropped unknown marking token"), "{logs}");
        assert!(logs.contains("GARBO"), "{logs}");
        assert!(!logs.contains("token=LE"), "{logs}");
    }

    #[test]
    fn missing_long_names_are_traced() {
        let mut def = fixture();
        def.access_req_aliases
            .insert("ZZ".to_string(), strings(&["QQ"]));
        let logs = traced(|| {
            required("L0//ZZ", &def, Long);
        });
        assert!(logs.contains("token has no long name"), "{logs}");
        assert!(logs.contains("QQ"), "{logs}");
    }
}
