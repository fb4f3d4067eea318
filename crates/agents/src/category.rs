//! Routing categories.

use meridian_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The agent a question is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Clinical,
    Web,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Food, Category::Clinical, Category::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Clinical => "clinical",
            Self::Web => "web",
        }
    }

    /// Map raw classifier output to a category.
    ///
    /// Only the exact words `food` and `clinical` (ignoring case and
    /// surrounding whitespace) select those agents. Everything else,
    /// including sentences that merely mention a category, routes to `Web`.
    pub fn from_classifier_output(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "food" => Self::Food,
            "clinical" => Self::Clinical,
            _ => Self::Web,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "clinical" => Ok(Self::Clinical),
            "web" => Ok(Self::Web),
            other => Err(AppError::Parse(format!(
                "Unknown category '{}'. Expected food, clinical or web",
                other
            ))),
        }
    }
}
