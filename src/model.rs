//! Core data model: element types, durable records, payloads and
//! resolution results.

use crate::error::BuilderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::fmt;
use std::str::FromStr;

/// Key under which a record marks its payload as externalized to a file.
pub const STORED_IN_FILE_KEY: &str = "_stored_in_file";

/// Inline sentinel stored in a record whose authoritative payload lives in
/// a file.
pub fn file_sentinel() -> JsonValue {
	json!({ STORED_IN_FILE_KEY: true })
}

/// Classification of a builder element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
	/// Reusable view component (hero banner, navbar, ...)
	Component,
	/// Element scoped to a single page
	Page,
	/// Site-wide element
	Global,
	/// Anything else
	General,
}

impl ElementType {
	/// Lowercase wire/storage name.
	pub fn as_str(&self) -> &'static str {
		match self {
			ElementType::Component => "component",
			ElementType::Page => "page",
			ElementType::Global => "global",
			ElementType::General => "general",
		}
	}

	/// Human-readable label for admin surfaces.
	pub fn label(&self) -> &'static str {
		match self {
			ElementType::Page => "Page",
			ElementType::Global => "Global",
			_ => "General",
		}
	}
}

impl fmt::Display for ElementType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for ElementType {
	type Err = BuilderError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"component" => Ok(ElementType::Component),
			"page" => Ok(ElementType::Page),
			"global" => Ok(ElementType::Global),
			"general" => Ok(ElementType::General),
			_ => Err(BuilderError::Config(format!(
				"invalid element type: {}",
				s
			))),
		}
	}
}

/// Durable element record.
///
/// `(key, page_id)` is unique across records. When `file_path` is set the
/// inline `data` holds only [`file_sentinel`] and the file is the
/// authoritative payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
	/// Surrogate id assigned by the repository
	pub id: i64,
	/// Element key, unique together with `page_id`
	pub key: String,
	/// Page scope; `None` means the element applies site-wide
	pub page_id: Option<String>,
	/// Element classification
	pub element_type: ElementType,
	/// Inline payload (or the externalization sentinel)
	pub data: JsonValue,
	/// Path of the external file holding the authoritative payload
	pub file_path: Option<String>,
	/// Set on first insert
	pub created_at: DateTime<Utc>,
	/// Refreshed on every write
	pub updated_at: DateTime<Utc>,
}

/// Input payload for a save.
///
/// A `Text` payload that parses as JSON is decoded before storage; a
/// non-JSON string is stored as an opaque scalar.
#[derive(Debug, Clone)]
pub enum ElementPayload {
	/// Already-structured JSON
	Json(JsonValue),
	/// Raw string, decoded if it is valid JSON
	Text(String),
}

impl ElementPayload {
	/// Normalize the payload to the JSON value that gets stored.
	pub fn into_value(self) -> JsonValue {
		match self {
			ElementPayload::Json(value) => value,
			ElementPayload::Text(raw) => match serde_json::from_str(&raw) {
				Ok(value) => value,
				Err(_) => JsonValue::String(raw),
			},
		}
	}
}

impl From<JsonValue> for ElementPayload {
	fn from(value: JsonValue) -> Self {
		ElementPayload::Json(value)
	}
}

impl From<String> for ElementPayload {
	fn from(raw: String) -> Self {
		ElementPayload::Text(raw)
	}
}

impl From<&str> for ElementPayload {
	fn from(raw: &str) -> Self {
		ElementPayload::Text(raw.to_string())
	}
}

/// Where a successful read was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSource {
	/// Cache hit, durable storage not touched
	Cache,
	/// Read from the record's external file
	File,
	/// Read from the record's inline data (no file pointer)
	Inline,
	/// File pointer present but the file was missing or unparsable;
	/// the inline copy was used instead (degraded read)
	InlineFallback,
}

/// A resolved element payload together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedElement {
	/// The resolved payload
	pub data: JsonValue,
	/// Which tier satisfied the read
	pub source: ResolvedSource,
}
