//! Annotation producer: one page image + OCR detections → one weak [`Task`].

use std::collections::HashSet;

use labelforge_core::interchange::{
    AnnotationRecord, GeometryRecord, Prediction, TranscriptionRecord,
};
use labelforge_core::{Detection, GeometryError, NormalizedBox, ProducerConfig, Task};
use tracing::debug;

use crate::ids::IdGenerator;
use crate::page::PageImage;

/// Build the weak annotation task for one page.
///
/// Each detection with non-blank text becomes a geometry record immediately
/// followed by a transcription record; both carry the same normalised box
/// and a correlation id unique within this task. Blank detections produce
/// nothing. A zero-area image fails before any detection is looked at.
pub fn produce(
    page: &PageImage,
    image_url: &str,
    detections: &[Detection],
    config: &ProducerConfig,
    ids: &mut dyn IdGenerator,
) -> Result<Task, GeometryError> {
    if page.width == 0 || page.height == 0 {
        return Err(GeometryError::EmptyImage {
            width: page.width,
            height: page.height,
        });
    }

    let mut result = Vec::with_capacity(detections.len() * 2);
    let mut issued = HashSet::with_capacity(detections.len());
    let mut skipped = 0usize;

    for detection in detections {
        if !detection.has_text() {
            skipped += 1;
            continue;
        }

        let bbox = NormalizedBox::from_polygon(&detection.polygon, page.width, page.height)?;
        let id = unique_id(ids, &mut issued);
        let score = config.record_score(detection.score);

        result.push(AnnotationRecord::Geometry(GeometryRecord::new(id.clone(), bbox)));
        result.push(AnnotationRecord::Transcription(TranscriptionRecord::new(
            id,
            detection.text.clone(),
            bbox,
            score,
        )));
    }

    debug!(
        page = %page.path.display(),
        pairs = result.len() / 2,
        skipped,
        "produced task"
    );

    let mut task = Task::new(&config.image_key, image_url);
    task.predictions.push(Prediction {
        result,
        score: config.prediction_score,
    });
    Ok(task)
}

/// Draw an id not yet issued in this task. On a repeat the id is suffixed
/// with a counter until it is free.
fn unique_id(ids: &mut dyn IdGenerator, issued: &mut HashSet<String>) -> String {
    let base = ids.next_id();
    let mut id = base.clone();
    let mut n = 1u32;
    while issued.contains(&id) {
        id = format!("{base}-{n}");
        n += 1;
    }
    issued.insert(id.clone());
    id
}
