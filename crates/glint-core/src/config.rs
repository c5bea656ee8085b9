//! Document-wide configuration and the shared appearance tokens.
//!
//! ```
//! use glint_core::{DocumentConfig, Placement, Size};
//!
//! let config = DocumentConfig::from_toml_str(r#"
//! required_message = "Pick one."
//! default_placement = "top-end"
//! "#).unwrap();
//! assert_eq!(config.required_message, "Pick one.");
//! assert_eq!(config.default_placement, Placement::TopEnd);
//! assert_eq!(config.default_size, Size::Medium);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Message reported by a required group that has no value.
pub const DEFAULT_REQUIRED_MESSAGE: &str = "Please select an option.";

/// The size token shared by group members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    /// The token as written in a `size` property.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a token does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken(pub String);

impl fmt::Display for UnknownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown token '{}'", self.0)
    }
}

impl std::error::Error for UnknownToken {}

impl FromStr for Size {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(UnknownToken(other.to_owned())),
        }
    }
}

/// Anchor position of a disclosure panel relative to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    TopStart,
    TopEnd,
    #[default]
    BottomStart,
    BottomEnd,
    LeftStart,
    RightStart,
}

impl Placement {
    /// All placements, in declaration order.
    pub const ALL: [Placement; 6] = [
        Self::TopStart,
        Self::TopEnd,
        Self::BottomStart,
        Self::BottomEnd,
        Self::LeftStart,
        Self::RightStart,
    ];

    /// The token as written in a `placement` property.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopStart => "top-start",
            Self::TopEnd => "top-end",
            Self::BottomStart => "bottom-start",
            Self::BottomEnd => "bottom-end",
            Self::LeftStart => "left-start",
            Self::RightStart => "right-start",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownToken(s.to_owned()))
    }
}

/// Configuration shared by every widget created in a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Validity message of a required group with no value.
    pub required_message: String,
    /// Placement used when a dropdown declares none (or an unparsable one).
    pub default_placement: Placement,
    /// Size used when neither a member nor its group declares one.
    pub default_size: Size,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            required_message: DEFAULT_REQUIRED_MESSAGE.to_owned(),
            default_placement: Placement::default(),
            default_size: Size::default(),
        }
    }
}

impl DocumentConfig {
    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.required_message.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "required_message",
                message: "must not be empty".into(),
            });
        }
        Ok(config)
    }

    /// Set the required message using builder pattern.
    pub fn with_required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = message.into();
        self
    }

    /// Set the default placement using builder pattern.
    pub fn with_default_placement(mut self, placement: Placement) -> Self {
        self.default_placement = placement;
        self
    }

    /// Set the default size using builder pattern.
    pub fn with_default_size(mut self, size: Size) -> Self {
        self.default_size = size;
        self
    }
}
