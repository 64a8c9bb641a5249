//! Geometry/transcription pairing check.
//!
//! Within each prediction every transcription id must match exactly one
//! geometry id and vice versa. Pairs are matched by id, never by position.

use std::collections::HashSet;

use labelforge_core::Task;
use labelforge_core::interchange::AnnotationRecord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairingError {
    #[error("prediction {prediction}: transcription `{id}` has no geometry record")]
    OrphanTranscription { prediction: usize, id: String },

    #[error("prediction {prediction}: geometry `{id}` has no transcription record")]
    OrphanGeometry { prediction: usize, id: String },

    #[error("prediction {prediction}: {role} id `{id}` is used more than once")]
    DuplicateId {
        prediction: usize,
        role: &'static str,
        id: String,
    },
}

/// Check the pairing bijection; returns the number of pairs in the task.
pub fn validate_pairing(task: &Task) -> Result<usize, PairingError> {
    let mut pairs = 0;

    for (prediction, p) in task.predictions.iter().enumerate() {
        let mut geometry = HashSet::new();
        let mut transcription = HashSet::new();

        for record in &p.result {
            let (seen, role) = match record {
                AnnotationRecord::Geometry(_) => (&mut geometry, "geometry"),
                AnnotationRecord::Transcription(_) => (&mut transcription, "transcription"),
            };
            if !seen.insert(record.id()) {
                return Err(PairingError::DuplicateId {
                    prediction,
                    role,
                    id: record.id().to_string(),
                });
            }
        }

        if let Some(id) = transcription.iter().find(|id| !geometry.contains(*id)) {
            return Err(PairingError::OrphanTranscription {
                prediction,
                id: id.to_string(),
            });
        }
        if let Some(id) = geometry.iter().find(|id| !transcription.contains(*id)) {
            return Err(PairingError::OrphanGeometry {
                prediction,
                id: id.to_string(),
            });
        }

        pairs += geometry.len();
    }

    Ok(pairs)
}
