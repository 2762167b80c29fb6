//! Pattern configuration deserialization helpers.
//!
//! Hosts describe compile settings as JSON, e.g.
//! `{"options":["ignorecase","extend"],"syntax":"perl_ng","encoding":"utf8",
//! "limits":{"retry_limit_in_match":100000}}`. Every field is optional.

use serde::Deserialize;

use crate::compile::{MatchLimits, PatternBuilder};
use crate::error::Result;
use crate::options::{CompileOptions, Encoding, Syntax};

/// Named compile option as it appears in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionName {
    Ignorecase,
    Extend,
    Multiline,
    Singleline,
    FindLongest,
    FindNotEmpty,
    NegateSingleLine,
    DontCaptureGroup,
    CaptureGroup,
}

impl From<OptionName> for CompileOptions {
    fn from(name: OptionName) -> Self {
        match name {
            OptionName::Ignorecase => CompileOptions::IGNORECASE,
            OptionName::Extend => CompileOptions::EXTEND,
            OptionName::Multiline => CompileOptions::MULTILINE,
            OptionName::Singleline => CompileOptions::SINGLELINE,
            OptionName::FindLongest => CompileOptions::FIND_LONGEST,
            OptionName::FindNotEmpty => CompileOptions::FIND_NOT_EMPTY,
            OptionName::NegateSingleLine => CompileOptions::NEGATE_SINGLE_LINE,
            OptionName::DontCaptureGroup => CompileOptions::DONT_CAPTURE_GROUP,
            OptionName::CaptureGroup => CompileOptions::CAPTURE_GROUP,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegexConfig {
    pub options: Vec<OptionName>,
    pub syntax: Syntax,
    pub encoding: Encoding,
    pub limits: MatchLimits,
}

impl RegexConfig {
    pub fn compile_options(&self) -> CompileOptions {
        self.options
            .iter()
            .fold(CompileOptions::empty(), |acc, &name| acc | CompileOptions::from(name))
    }

    pub fn builder(&self) -> PatternBuilder {
        PatternBuilder::new()
            .options(self.compile_options())
            .syntax(self.syntax)
            .encoding(self.encoding)
            .limits(self.limits)
    }
}

/// Parse a pattern config from a JSON string.
pub fn parse_regex_config(json: &str) -> Result<RegexConfig> {
    Ok(serde_json::from_str(json)?)
}
