use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::C12nError;

/// How tokens are rendered: full names (`LEVEL 0//ACCOUNTING`) or short names
/// (`L0//AC`). Narrow displays always use `Short`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    #[default]
    Long,
    Short,
}

impl DisplayFormat {
    pub fn is_long(self) -> bool {
        matches!(self, DisplayFormat::Long)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayFormat::Long => "long",
            DisplayFormat::Short => "short",
        }
    }
}

impl FromStr for DisplayFormat {
    type Err = C12nError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "long" => Ok(DisplayFormat::Long),
            "short" => Ok(DisplayFormat::Short),
            other => Err(C12nError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
