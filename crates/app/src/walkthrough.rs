//! Scripted user sessions
//!
//! A walkthrough is a TOML list of `[[step]]` tables, each naming an
//! `action` a visitor performs on the page.

use std::path::Path;

use cazza_core::{Result, TypeFilter};
use serde::Deserialize;

/// Session used when no walkthrough file is given
pub const DEFAULT_WALKTHROUGH: &str = r#"
[[step]]
action = "navigate"
section = "rooms"

[[step]]
action = "filter"
type = "dorm"
available_only = true

[[step]]
action = "open"
room = "R001"

[[step]]
action = "thumbnail"
index = 1

[[step]]
action = "resize"
viewport = 720.0

[[step]]
action = "inquire"

[[step]]
action = "filter"

[[step]]
action = "open"
room = "S102"

[[step]]
action = "key"
key = "Escape"

[[step]]
action = "next"
"#;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Navigate {
        section: String,
    },
    Next,
    Previous,
    Filter {
        #[serde(default, rename = "type")]
        selected_type: TypeFilter,
        #[serde(default)]
        available_only: bool,
    },
    /// Activate a room's card, or open it directly when no card is shown
    Open {
        room: String,
    },
    Thumbnail {
        index: usize,
    },
    Close,
    /// Window keydown, or a keydown on a focused card
    Key {
        key: String,
        #[serde(default)]
        card: Option<String>,
    },
    Resize {
        viewport: f64,
    },
    ResizePanel {
        height: f64,
    },
    Inquire,
}

impl Step {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Step::Navigate { .. } => "navigate",
            Step::Next => "next",
            Step::Previous => "previous",
            Step::Filter { .. } => "filter",
            Step::Open { .. } => "open",
            Step::Thumbnail { .. } => "thumbnail",
            Step::Close => "close",
            Step::Key { .. } => "key",
            Step::Resize { .. } => "resize",
            Step::ResizePanel { .. } => "resize_panel",
            Step::Inquire => "inquire",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Walkthrough {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Walkthrough {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let walkthrough = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), steps = walkthrough.steps.len(), "Loaded walkthrough");
        Ok(walkthrough)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_toml(DEFAULT_WALKTHROUGH)
    }
}
