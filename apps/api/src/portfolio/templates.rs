use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The visual layouts a portfolio can be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateId {
    #[serde(rename = "classic-v1")]
    ClassicV1,
    #[serde(rename = "modern-v2")]
    ModernV2,
}

impl TemplateId {
    pub const ALL: [TemplateId; 2] = [TemplateId::ClassicV1, TemplateId::ModernV2];

    /// Used when a settings row is created without an explicit choice.
    pub const DEFAULT: TemplateId = TemplateId::ClassicV1;

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::ClassicV1 => "classic-v1",
            TemplateId::ModernV2 => "modern-v2",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TemplateId::ClassicV1 => "Classic",
            TemplateId::ModernV2 => "Modern",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TemplateId::ClassicV1 => "Clean single-column layout with a contribution calendar",
            TemplateId::ModernV2 => "Gradient layout with card sections and technology icons",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownTemplate(pub String);

impl fmt::Display for UnknownTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown template '{}'", self.0)
    }
}

impl FromStr for TemplateId {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}
