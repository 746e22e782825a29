//! Plan elements keyed by a `type` tag that the renderer may not know
//!
//! The LLM can describe camera moves, actor actions or effects the renderer
//! has no translation for. Those must survive parsing so that rendering can
//! reject them with the offending scene id, instead of failing the whole
//! parse or being dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::types::Tick;

/// Implemented by internally tagged plan enums
pub trait TaggedKind {
    /// Every `type` value the enum itself accepts
    const KINDS: &'static [&'static str];

    /// Tag of this value as it appears on the wire
    fn kind(&self) -> &'static str;
}

/// Either a recognised element or the raw data of an unrecognised one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tagged<T> {
    Known(T),
    Unknown(UnknownTag),
}

/// Raw element with an unrecognised (or malformed) `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownTag {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl UnknownTag {
    /// Tick the element was scheduled at, trying the field names plans use
    pub fn tick(&self) -> Tick {
        ["tick", "tick_start"]
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(Value::as_u64))
            .unwrap_or(0)
    }
}

impl<T: TaggedKind> Tagged<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Tagged::Known(value) => Some(value),
            Tagged::Unknown(_) => None,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Tagged::Known(value) => value.kind(),
            Tagged::Unknown(raw) => &raw.kind,
        }
    }

    /// An element whose tag is known but whose fields did not fit.
    ///
    /// These are parse failures, not unsupported features.
    pub fn malformed(&self) -> Option<&str> {
        match self {
            Tagged::Unknown(raw) if T::KINDS.contains(&raw.kind.as_str()) => Some(&raw.kind),
            _ => None,
        }
    }
}

impl<T> From<T> for Tagged<T> {
    fn from(value: T) -> Self {
        Tagged::Known(value)
    }
}
