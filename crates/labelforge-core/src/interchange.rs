//! Interchange types shared by the producer and the flattener.
//!
//! A [`Task`] is what the producer writes and a labelling tool imports: one
//! page image plus paired geometry/transcription records. After correction
//! the tool exports one [`ExportRecord`] per task, which the flattener turns
//! into a [`FlattenedExample`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::geometry::NormalizedBox;

/// `from_name` of geometry records.
pub const BBOX_ROLE: &str = "bbox";
/// `from_name` of transcription records.
pub const TRANSCRIPTION_ROLE: &str = "transcription";
/// `to_name` of every record: the image control in the labelling config.
pub const IMAGE_TARGET: &str = "image";

// ── Task (producer output) ──

/// One page image and its weak annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Image reference keyed by the labelling config's data key (e.g. `ocr`).
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

impl Task {
    /// A task with no predictions, referencing `url` under `image_key`.
    pub fn new(image_key: &str, url: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(image_key.to_string(), url.into());
        Self {
            data,
            predictions: Vec::new(),
        }
    }

    pub fn image_ref(&self, image_key: &str) -> Option<&str> {
        self.data.get(image_key).map(String::as_str)
    }

    /// All records across all predictions, in order.
    pub fn records(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.predictions.iter().flat_map(|p| p.result.iter())
    }
}

/// A scored set of records for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub result: Vec<AnnotationRecord>,
    pub score: f64,
}

/// One half of a geometry/transcription pair, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnnotationRecord {
    #[serde(rename = "rectangle")]
    Geometry(GeometryRecord),
    #[serde(rename = "textarea")]
    Transcription(TranscriptionRecord),
}

impl AnnotationRecord {
    /// The correlation id shared by both halves of a pair.
    pub fn id(&self) -> &str {
        match self {
            Self::Geometry(r) => &r.id,
            Self::Transcription(r) => &r.id,
        }
    }

    pub fn bbox(&self) -> &NormalizedBox {
        match self {
            Self::Geometry(r) => &r.value,
            Self::Transcription(r) => &r.value.bbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub id: String,
    pub from_name: String,
    pub to_name: String,
    pub value: NormalizedBox,
}

impl GeometryRecord {
    pub fn new(id: impl Into<String>, value: NormalizedBox) -> Self {
        Self {
            id: id.into(),
            from_name: BBOX_ROLE.to_string(),
            to_name: IMAGE_TARGET.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionRecord {
    pub id: String,
    pub from_name: String,
    pub to_name: String,
    pub value: TranscriptionValue,
    pub score: f32,
}

impl TranscriptionRecord {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        bbox: NormalizedBox,
        score: f32,
    ) -> Self {
        Self {
            id: id.into(),
            from_name: TRANSCRIPTION_ROLE.to_string(),
            to_name: IMAGE_TARGET.to_string(),
            value: TranscriptionValue {
                text: vec![text.into()],
                bbox,
            },
            score,
        }
    }
}

/// The box fields repeated alongside the recognised text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionValue {
    pub text: Vec<String>,
    #[serde(flatten)]
    pub bbox: NormalizedBox,
}

// ── Corrected export (flattener input) ──

/// Structural problems in a corrected export. Unknown label names are not
/// errors; see [`crate::labels::UNKNOWN_LABEL_ID`].
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("task {task}: label[{index}] is missing `{field}`")]
    MissingField {
        task: ExportId,
        index: usize,
        field: &'static str,
    },

    #[error("task {task}: label[{index}] has an empty `labels` list")]
    EmptyLabelList { task: ExportId, index: usize },

    #[error("task {task}: missing `{field}` sequence")]
    MissingSequence { task: ExportId, field: &'static str },

    #[error(
        "export record at position {index}{} is malformed: {source}",
        .task.as_ref().map(|t| format!(" (task {t})")).unwrap_or_default()
    )]
    Decode {
        index: usize,
        /// The record's `id`, when that much of it could be read.
        task: Option<ExportId>,
        #[source]
        source: serde_json::Error,
    },

    #[error("export is not a JSON array of records: {0}")]
    NotAnArray(#[source] serde_json::Error),
}

/// Task identifier as exported: numeric from the labelling tool, or free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One document as exported after human correction.
///
/// `transcription` and `label` are separately sized sequences; the flattener
/// pairs them by position. Both are optional here so that a missing sequence
/// can be reported against the task id instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: ExportId,
    #[serde(rename = "ocr")]
    pub image: String,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub transcription: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Vec<LabelEntry>>,
}

impl ExportRecord {
    /// Parse a JSON array of export records, one result per element.
    ///
    /// Only a document that is not an array fails as a whole. A bad element
    /// is reported by position (and task id, if readable) and leaves its
    /// neighbours untouched, so the caller decides whether to skip it.
    pub fn parse_batch(json: &str) -> Result<Vec<Result<Self, ExportError>>, ExportError> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(json).map_err(ExportError::NotAnArray)?;
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Self::decode(index, value))
            .collect())
    }

    fn decode(index: usize, value: serde_json::Value) -> Result<Self, ExportError> {
        let task = value
            .get("id")
            .and_then(|id| ExportId::deserialize(id).ok());
        serde_json::from_value(value).map_err(|source| ExportError::Decode {
            index,
            task,
            source,
        })
    }
}

/// A labelled region. Fields are optional so the flattener can name
/// whichever one is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Candidate class names; only the first is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Single-value exports write a bare string instead of a one-element list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|v| match v {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }),
    )
}

// ── Flattened dataset record ──

/// Aligned per-document arrays for token classification.
///
/// `tokens`, `bboxes` and `label_ids` always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenedExample {
    pub id: String,
    pub image: String,
    pub tokens: Vec<String>,
    pub bboxes: Vec<[f64; 4]>,
    #[serde(rename = "ner_tags")]
    pub label_ids: Vec<i64>,
}

impl FlattenedExample {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
