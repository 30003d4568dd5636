//! Shared data types for the webhook gateway (spec §3).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A value extracted by the path extractor: either a single scalar or an
/// ordered list of scalars collected by fanning out over an array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedValue {
    Scalar(serde_json::Value),
    List(Vec<serde_json::Value>),
}

impl ExtractedValue {
    /// Render this value the way the template renderer needs it: a scalar
    /// renders as its string form (`null` renders as empty), a list
    /// renders as a `", "`-joined sequence of scalar renderings.
    pub fn render(&self) -> String {
        match self {
            ExtractedValue::Scalar(v) => render_scalar(v),
            ExtractedValue::List(items) => items
                .iter()
                .map(render_scalar)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Render the `i`-th element for an indexed template reference
    /// (`$a.b[i]$`). Empty string when out of range or not a list.
    pub fn render_index(&self, index: usize) -> String {
        match self {
            ExtractedValue::Scalar(v) => {
                if index == 0 {
                    render_scalar(v)
                } else {
                    String::new()
                }
            }
            ExtractedValue::List(items) => items
                .get(index)
                .map(render_scalar)
                .unwrap_or_default(),
        }
    }
}

fn render_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The extracted value map produced by C1: dotted path -> value.
pub type ExtractedMap = BTreeMap<String, ExtractedValue>;

/// A downstream routing hint (spec glossary: "Alignment").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Org(u64),
    Device(u64),
}

impl Alignment {
    /// The `aligned_resource` path sent to the sink.
    pub fn aligned_resource(&self) -> String {
        match self {
            Alignment::None => "/api/organization/0".to_string(),
            Alignment::Org(id) => format!("/api/organization/{id}"),
            Alignment::Device(id) => format!("/api/device/{id}"),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::None => Ok(()),
            Alignment::Org(id) => write!(f, "org:{id}"),
            Alignment::Device(id) => write!(f, "device:{id}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("alignment must be empty, 'org:<id>' or 'device:<id>'")]
pub struct BadAlignment;

impl FromStr for Alignment {
    type Err = BadAlignment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Alignment::None);
        }
        let (kind, id) = s.split_once(':').ok_or(BadAlignment)?;
        let id: u64 = id.parse().map_err(|_| BadAlignment)?;
        match kind {
            "org" => Ok(Alignment::Org(id)),
            "device" => Ok(Alignment::Device(id)),
            _ => Err(BadAlignment),
        }
    }
}

/// A configuration record (spec §3, "Configuration record").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub service: String,
    pub token: String,
    pub alignment: AlignmentDto,
    pub fields: String,
    pub template: String,
}

/// `Alignment` carried across the wire as its string form, so the JSON API
/// and the on-disk format share one representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlignmentDto(pub Alignment);

impl TryFrom<String> for AlignmentDto {
    type Error = BadAlignment;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(AlignmentDto(value.parse()?))
    }
}

impl From<AlignmentDto> for String {
    fn from(value: AlignmentDto) -> Self {
        value.0.to_string()
    }
}

impl From<Alignment> for AlignmentDto {
    fn from(value: Alignment) -> Self {
        AlignmentDto(value)
    }
}

/// The message forwarded to the sink (spec §3, "Sink message").
#[derive(Debug, Clone, Serialize)]
pub struct SinkMessage {
    pub message: String,
    pub aligned_resource: String,
}

impl SinkMessage {
    pub fn new(service: &str, token: &str, rendered: &str, alignment: Alignment) -> Self {
        Self {
            message: format!("{service}:{token}:{rendered}"),
            aligned_resource: alignment.aligned_resource(),
        }
    }
}

/// Whether a webhook's processing completed successfully (spec §3, "Payload
/// log record").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Success,
    Failure,
}

/// One line of a per-service payload log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadLogRecord {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub webhook_type: String,
    pub payload: serde_json::Value,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
    pub processing_status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
}
