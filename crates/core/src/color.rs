use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::ClassificationDefinition;
use crate::format::DisplayFormat;
use crate::parser::{parse, ClassificationParts};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Primary,
    Secondary,
    Info,
    Success,
    Warning,
    Error,
}

impl Color {
    pub const ALL: [Color; 7] = [
        Color::Default,
        Color::Primary,
        Color::Secondary,
        Color::Info,
        Color::Success,
        Color::Warning,
        Color::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Default => "default",
            Color::Primary => "primary",
            Color::Secondary => "secondary",
            Color::Info => "info",
            Color::Success => "success",
            Color::Warning => "warning",
            Color::Error => "error",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Banner colour for the parsed level. Falls back to `Color::Default` when the
/// level has no style or names a colour outside the palette.
pub fn level_color(parts: &ClassificationParts, definition: &ClassificationDefinition) -> Color {
    let Some(style) = definition.levels_styles_map.get(&parts.lvl) else {
        return Color::Default;
    };
    let name = match style.color.as_deref().filter(|c| !c.is_empty()) {
        Some(color) => color.to_string(),
        None => match style.label.as_deref() {
            Some(label) => label.replacen("label-", "", 1),
            None => return Color::Default,
        },
    };
    Color::from_name(&name).unwrap_or_default()
}

pub fn color_for(raw: &str, definition: &ClassificationDefinition, format: DisplayFormat) -> Color {
    level_color(&parse(raw, definition, format), definition)
}
