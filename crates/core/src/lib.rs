mod color;
mod definition;
mod error;
mod format;
mod max;
mod normalize;
mod original;
mod parser;
mod rules;

pub use color::{color_for, level_color, Color};
pub use definition::{AliasMap, ClassificationDefinition, LevelStyle, StringMap, TokenParams};
pub use error::{C12nError, Result};
pub use format::DisplayFormat;
pub use max::max_classification;
pub use normalize::normalize;
pub use original::{GroupEntry, LevelEntry, OriginalDefinition, RequiredEntry, SubgroupEntry};
pub use parser::{groups, level_index, level_text, parse, required, ClassificationParts};
pub use rules::{apply_rules, DisabledControls, RulesOutcome};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::definition::ClassificationDefinition;

    const FIXTURE: &str = include_str!("../tests/fixtures/definition.json");

    pub fn fixture() -> ClassificationDefinition {
        ClassificationDefinition::from_json_str(FIXTURE).expect("fixture definition")
    }
}
