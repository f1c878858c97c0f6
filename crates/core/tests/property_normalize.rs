use c12n_core::{
    apply_rules, max_classification, normalize, parse, ClassificationDefinition, DisplayFormat,
};
use proptest::prelude::*;

fn definition() -> ClassificationDefinition {
    ClassificationDefinition::from_json_str(include_str!("fixtures/definition.json"))
        .expect("fixture definition")
}

const LEVELS: &[&str] = &["L0", "L1", "L2", "LEVEL 0", "LEVEL 2", "OPEN"];
const REQUIRED: &[&str] = &["AC", "LE", "NOCON", "ORCON", "ACCOUNTING", "LEGAL", "NO CONTRACTORS"];
const GROUPS: &[&str] = &["A", "B", "X", "GROUP A", "GROUP B", "XX"];
const SUBGROUPS: &[&str] = &["R1", "R2", "R3", "R0", "RESERVE TWO"];

fn subset(pool: &'static [&'static str]) -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(pool, 0..=pool.len().min(3))
}

prop_compose! {
    fn marking()(
        level in prop::sample::select(LEVELS),
        req in subset(REQUIRED),
        groups in subset(GROUPS),
        subgroups in subset(SUBGROUPS),
    ) -> String {
        let mut out = level.to_string();
        if !req.is_empty() {
            out.push_str("//");
            out.push_str(&req.join("/"));
        }
        if !groups.is_empty() {
            out.push_str("//REL TO ");
            out.push_str(&groups.join(", "));
        }
        if !subgroups.is_empty() {
            out.push_str(if groups.is_empty() { "//" } else { "/" });
            out.push_str(&subgroups.join("/"));
        }
        out
    }
}

proptest! {
    #[test]
    fn short_form_is_idempotent(raw in marking()) {
        let def = definition();
        let once = normalize(&raw, &def, DisplayFormat::Short);
        prop_assert_eq!(normalize(&once, &def, DisplayFormat::Short), once);
    }

    #[test]
    fn parsed_lists_are_sorted(raw in marking()) {
        let def = definition();
        for format in [DisplayFormat::Long, DisplayFormat::Short] {
            let parts = parse(&raw, &def, format);
            let mut sorted = parts.groups.clone();
            sorted.sort();
            prop_assert_eq!(&parts.groups, &sorted);
            let mut sorted = parts.subgroups.clone();
            sorted.sort();
            prop_assert_eq!(&parts.subgroups, &sorted);
        }
    }

    #[test]
    fn arbitrary_input_never_panics(raw in "[A-Z0-9 /,]{0,48}", other in "[A-Z0-9 /,]{0,24}") {
        let def = definition();
        for format in [DisplayFormat::Long, DisplayFormat::Short] {
            let _ = normalize(&raw, &def, format);
            let _ = max_classification(&raw, &other, &def, format);
            let _ = apply_rules(parse(&raw, &def, format), &def, format, false);
        }
    }
}
