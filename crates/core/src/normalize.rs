use crate::definition::ClassificationDefinition;
use crate::format::DisplayFormat;
use crate::parser::{parse, ClassificationParts};

/// Canonical display form of a raw marking. Unresolvable tokens are dropped;
/// this never fails.
pub fn normalize(raw: &str, definition: &ClassificationDefinition, format: DisplayFormat) -> String {
    parse(raw, definition, format).normalized(definition, format)
}

impl ClassificationParts {
    /// Assembles `LEVEL//REQ/REQ//REQGRP/REL TO G1, G2/SUB/SUB`.
    pub fn normalized(&self, definition: &ClassificationDefinition, format: DisplayFormat) -> String {
        let mut req = self.req.clone();
        let req_grp: Vec<String> = req
            .iter()
            .filter(|token| definition.is_required_group(token))
            .cloned()
            .collect();
        for token in &req_grp {
            if let Some(pos) = req.iter().position(|r| r == token) {
                req.remove(pos);
            }
        }

        let mut out = self.lvl.clone();
        if !req.is_empty() {
            out.push_str("//");
            out.push_str(&req.join("/"));
        }
        if !req_grp.is_empty() {
            out.push_str("//");
            out.push_str(&req_grp.join("/"));
        }

        if !self.groups.is_empty() {
            out.push_str(if req_grp.is_empty() { "//" } else { "/" });
            if let [group] = self.groups.as_slice() {
                match definition.solitary_display_name(group) {
                    Some(display) => out.push_str(display),
                    None => {
                        out.push_str("REL TO ");
                        out.push_str(group);
                    }
                }
            } else {
                let shown = match format {
                    DisplayFormat::Short => collapse_group_alias(&self.groups, definition),
                    DisplayFormat::Long => None,
                };
                out.push_str("REL TO ");
                match shown {
                    Some(alias) => out.push_str(alias),
                    None => out.push_str(&self.groups.join(", ")),
                }
            }
        }

        if !self.subgroups.is_empty() {
            let continues = !self.groups.is_empty() || !req_grp.is_empty();
            out.push_str(if continues { "/" } else { "//" });
            out.push_str(&self.subgroups.join("/"));
        }

        out
    }
}

/// First multi-group alias whose members are exactly `groups`.
fn collapse_group_alias<'a>(
    groups: &[String],
    definition: &'a ClassificationDefinition,
) -> Option<&'a str> {
    definition
        .groups_aliases
        .iter()
        .filter(|(_, members)| members.len() > 1)
        .find(|(_, members)| {
            let mut members = members.to_vec();
            members.sort();
            members.as_slice() == groups
        })
        .map(|(alias, _)| alias.as_str())
}
