//! Decoder options
//!
//! Hosts hand options over as string key/value pairs. The ids and the
//! `yes`/`no` values are the ones users see in the host's option panel, so
//! the serde representation uses them too.

use hwfly_protocol::{Layout, RenderOptions};
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Option id: merge repeated identical status polls
pub const MERGE_POLLS: &str = "merge_same_flag_annots";
/// Option id: compact or split layout
pub const ANNOTATION_LAYOUT: &str = "annotation_layout";
/// Option id: keep a read and its response in one annotation (split layout)
pub const MERGE_READ_RESPONSE: &str = "merge_read_response";

/// Description of one host-visible option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionInfo {
    /// Option id
    pub id: &'static str,
    /// Text shown next to the option
    pub description: &'static str,
    /// Default value
    pub default: &'static str,
    /// Allowed values
    pub values: &'static [&'static str],
}

/// Every option the decoder understands
pub const OPTIONS: &[OptionInfo] = &[
    OptionInfo {
        id: MERGE_POLLS,
        description: "Merge same flag annotations into a single annotation",
        default: "yes",
        values: &["yes", "no"],
    },
    OptionInfo {
        id: ANNOTATION_LAYOUT,
        description: "Annotate command and payload/response separately",
        default: "compact",
        values: &["compact", "split"],
    },
    OptionInfo {
        id: MERGE_READ_RESPONSE,
        description: "Merge read command and response into a single annotation (split layout)",
        default: "no",
        values: &["yes", "no"],
    },
];

/// Decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    /// Merge consecutive identical glitch-timer / status-flag reads
    #[serde(rename = "merge_same_flag_annots", with = "yes_no")]
    pub merge_polls: bool,
    /// Output granularity
    #[serde(rename = "annotation_layout")]
    pub layout: Layout,
    /// In the split layout, render a read and its response as one annotation
    #[serde(rename = "merge_read_response", with = "yes_no")]
    pub merge_read_response: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            merge_polls: true,
            layout: Layout::Compact,
            merge_read_response: false,
        }
    }
}

impl DecoderOptions {
    /// Build options from host key/value pairs; unspecified ids keep their default
    pub fn from_host_options<'a, I>(pairs: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (id, value) in pairs {
            match id {
                MERGE_POLLS => options.merge_polls = parse_yes_no(id, value)?,
                ANNOTATION_LAYOUT => options.layout = parse_layout(value)?,
                MERGE_READ_RESPONSE => options.merge_read_response = parse_yes_no(id, value)?,
                other => return Err(OptionsError::UnknownOption(other.to_string())),
            }
        }
        Ok(options)
    }

    /// The subset of options that affects rendering of a single transaction
    pub fn render(&self) -> RenderOptions {
        RenderOptions {
            layout: self.layout,
            merge_read_response: self.merge_read_response,
        }
    }
}

fn parse_yes_no(option: &str, value: &str) -> Result<bool, OptionsError> {
    match value {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(OptionsError::InvalidValue {
            option: option.to_string(),
            value: value.to_string(),
            expected: "yes or no",
        }),
    }
}

fn parse_layout(value: &str) -> Result<Layout, OptionsError> {
    match value {
        "compact" => Ok(Layout::Compact),
        "split" => Ok(Layout::Split),
        _ => Err(OptionsError::InvalidValue {
            option: ANNOTATION_LAYOUT.to_string(),
            value: value.to_string(),
            expected: "compact or split",
        }),
    }
}

/// Serde adapter for `bool` fields carried as `"yes"`/`"no"`
mod yes_no {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "yes" } else { "no" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_yes_no("", &value).map_err(|_| {
            D::Error::invalid_value(serde::de::Unexpected::Str(&value), &"yes or no")
        })
    }
}
