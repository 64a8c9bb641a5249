//! Closed label vocabulary for token classification.
//!
//! Class names map to small non-negative ids fixed at construction time.
//! Names outside the vocabulary resolve to [`UNKNOWN_LABEL_ID`] instead of
//! failing, so a stray class in a corrected export never halts a build.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use thiserror::Error;

/// Id assigned to any class name the vocabulary does not know.
pub const UNKNOWN_LABEL_ID: i64 = -1;

/// Classes of the income-tax declaration layout, in id order.
pub const DEFAULT_LABELS: &[&str] = &[
    "ano_calendario",
    "dependentes",
    "exercicio_e_ano",
    "nome_contribuinte",
    "protegida_por_sigilo",
    "rodape_pagina",
    "texto_ignorado",
    "tipo_declaracao",
    "valor_total_bens",
];

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("label vocabulary is empty")]
    Empty,

    #[error("label `{0}` appears more than once")]
    Duplicate(String),

    #[error("cannot read label vocabulary {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("label vocabulary {} is not a JSON array of names: {source}", .path.display())]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable name → id mapping. Ids are positions in the name list.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVocabulary {
    names: Vec<String>,
    ids: HashMap<String, i64>,
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self::from_names(DEFAULT_LABELS.iter().copied())
            .expect("built-in label vocabulary is non-empty and unique")
    }
}

impl LabelVocabulary {
    /// Build a vocabulary from names in id order.
    pub fn from_names<I, S>(names: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(LabelError::Empty);
        }

        let mut ids = HashMap::with_capacity(names.len());
        for (id, name) in names.iter().enumerate() {
            if ids.insert(name.clone(), id as i64).is_some() {
                return Err(LabelError::Duplicate(name.clone()));
            }
        }

        Ok(Self { names, ids })
    }

    /// Load a vocabulary from a JSON array of class names.
    pub fn from_json_file(path: &Path) -> Result<Self, LabelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let names: Vec<String> = serde_json::from_str(&raw).map_err(|source| LabelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_names(names)
    }

    /// Id for `name`, or [`UNKNOWN_LABEL_ID`].
    pub fn resolve(&self, name: &str) -> i64 {
        self.lookup(name).unwrap_or(UNKNOWN_LABEL_ID)
    }

    pub fn lookup(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (i as i64, n.as_str()))
    }

    /// `id2label` map as model configs expect it (string keys).
    pub fn id2label(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    pub fn label2id(&self) -> BTreeMap<String, i64> {
        self.iter().map(|(id, name)| (name.to_string(), id)).collect()
    }
}
