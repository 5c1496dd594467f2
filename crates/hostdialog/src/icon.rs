#![forbid(unsafe_code)]

//! Icon kinds and their presentation classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Icon shown beside the dialog title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Info,
    Warning,
    Error,
    Success,
    Question,
    Loading,
    /// No icon; the icon slot is hidden.
    #[default]
    None,
}

impl IconKind {
    /// Every kind, in declaration order.
    pub const ALL: [IconKind; 7] = [
        IconKind::Info,
        IconKind::Warning,
        IconKind::Error,
        IconKind::Success,
        IconKind::Question,
        IconKind::Loading,
        IconKind::None,
    ];

    /// Presentation class, or `None` when no icon is shown.
    pub const fn class_name(self) -> Option<&'static str> {
        match self {
            Self::Info => Some("hostdialog-icon-info"),
            Self::Warning => Some("hostdialog-icon-warning"),
            Self::Error => Some("hostdialog-icon-error"),
            Self::Success => Some("hostdialog-icon-success"),
            Self::Question => Some("hostdialog-icon-question"),
            Self::Loading => Some("hostdialog-icon-loading"),
            Self::None => None,
        }
    }

    /// All icon classes; cleared before the mapped one is applied.
    pub fn all_classes() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().filter_map(Self::class_name)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
            Self::Question => "question",
            Self::Loading => "loading",
            Self::None => "none",
        }
    }
}

impl fmt::Display for IconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized icon name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIcon(pub String);

impl fmt::Display for UnknownIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown icon kind: {}", self.0)
    }
}

impl std::error::Error for UnknownIcon {}

impl FromStr for IconKind {
    type Err = UnknownIcon;

    /// Case-insensitive; the empty string means no icon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::None);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownIcon(s.to_owned()))
    }
}
