//! Dataset flattener: one corrected export record → one [`FlattenedExample`].
//!
//! The export carries two separately sized sequences: `transcription` (token
//! text) and `label` (box + candidate class names). They are paired by
//! position up to the shorter length; the tail of the longer one is dropped.
//! Boxes are taken from the label entries as stored, with no re-normalisation.

use labelforge_core::interchange::LabelEntry;
use labelforge_core::{
    ExportError, ExportId, ExportRecord, FlattenedExample, LabelVocabulary, UNKNOWN_LABEL_ID,
};
use tracing::{debug, info, warn};

/// What happened while flattening one record.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenReport {
    pub task: ExportId,
    pub tokens_in: usize,
    pub labels_in: usize,
    /// Length of every output array.
    pub kept: usize,
    /// Class names that resolved to [`UNKNOWN_LABEL_ID`], in token order.
    pub unknown_labels: Vec<String>,
}

impl FlattenReport {
    pub fn dropped_tokens(&self) -> usize {
        self.tokens_in - self.kept
    }

    pub fn dropped_labels(&self) -> usize {
        self.labels_in - self.kept
    }

    pub fn is_aligned(&self) -> bool {
        self.tokens_in == self.labels_in
    }
}

/// Flatten one export record.
pub fn flatten(
    record: &ExportRecord,
    vocab: &LabelVocabulary,
) -> Result<FlattenedExample, ExportError> {
    flatten_with_report(record, vocab).map(|(example, _)| example)
}

/// Flatten one export record and report alignment and vocabulary misses.
///
/// Every label entry is checked for its box fields and a non-empty `labels`
/// list, including entries past the paired length; a structural problem
/// anywhere fails the whole record.
pub fn flatten_with_report(
    record: &ExportRecord,
    vocab: &LabelVocabulary,
) -> Result<(FlattenedExample, FlattenReport), ExportError> {
    let task = &record.id;
    let tokens = record
        .transcription
        .as_deref()
        .ok_or_else(|| ExportError::MissingSequence {
            task: task.clone(),
            field: "transcription",
        })?;
    let labels = record
        .label
        .as_deref()
        .ok_or_else(|| ExportError::MissingSequence {
            task: task.clone(),
            field: "label",
        })?;

    let regions = labels
        .iter()
        .enumerate()
        .map(|(index, entry)| Region::from_entry(task, index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let kept = tokens.len().min(regions.len());
    if tokens.len() != regions.len() {
        info!(
            task = %task,
            tokens = tokens.len(),
            labels = regions.len(),
            kept,
            "token/label count mismatch; truncating to shorter"
        );
    }

    let mut example = FlattenedExample {
        id: task.to_string(),
        image: record.image.clone(),
        tokens: Vec::with_capacity(kept),
        bboxes: Vec::with_capacity(kept),
        label_ids: Vec::with_capacity(kept),
    };
    let mut unknown_labels = Vec::new();

    for (region, token) in regions.iter().zip(tokens) {
        let id = vocab.resolve(region.class);
        if id == UNKNOWN_LABEL_ID {
            warn!(task = %task, label = region.class, "label not in vocabulary");
            unknown_labels.push(region.class.to_string());
        }
        example.tokens.push(token.clone());
        example.bboxes.push(region.bbox);
        example.label_ids.push(id);
    }

    debug!(task = %task, kept, unknown = unknown_labels.len(), "flattened record");

    let report = FlattenReport {
        task: task.clone(),
        tokens_in: tokens.len(),
        labels_in: regions.len(),
        kept,
        unknown_labels,
    };
    Ok((example, report))
}

/// A label entry with every required field present.
struct Region<'a> {
    bbox: [f64; 4],
    class: &'a str,
}

impl<'a> Region<'a> {
    fn from_entry(
        task: &ExportId,
        index: usize,
        entry: &'a LabelEntry,
    ) -> Result<Self, ExportError> {
        let missing = |field| ExportError::MissingField {
            task: task.clone(),
            index,
            field,
        };

        let x = entry.x.ok_or_else(|| missing("x"))?;
        let y = entry.y.ok_or_else(|| missing("y"))?;
        let width = entry.width.ok_or_else(|| missing("width"))?;
        let height = entry.height.ok_or_else(|| missing("height"))?;
        let class = entry
            .labels
            .as_ref()
            .ok_or_else(|| missing("labels"))?
            .first()
            .ok_or_else(|| ExportError::EmptyLabelList {
                task: task.clone(),
                index,
            })?;

        Ok(Self {
            bbox: [x, y, width, height],
            class,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(x: f64, class: &str) -> LabelEntry {
        LabelEntry {
            x: Some(x),
            y: Some(2.0),
            width: Some(3.0),
            height: Some(4.0),
            rotation: Some(0.0),
            labels: Some(vec![class.to_string()]),
        }
    }

    fn record(tokens: &[&str], labels: Vec<LabelEntry>) -> ExportRecord {
        ExportRecord {
            id: ExportId::Number(42),
            image: "http://localhost:8080/doc/page_1.png".into(),
            transcription: Some(tokens.iter().map(|s| s.to_string()).collect()),
            label: Some(labels),
        }
    }

    #[test]
    fn equal_lengths_pair_positionally() {
        let rec = record(
            &["JOAO DA SILVA", "2023"],
            vec![entry(1.0, "nome_contribuinte"), entry(5.0, "ano_calendario")],
        );
        let ex = flatten(&rec, &LabelVocabulary::default()).unwrap();
        assert_eq!(ex.id, "42");
        assert_eq!(ex.image, "http://localhost:8080/doc/page_1.png");
        assert_eq!(ex.tokens, ["JOAO DA SILVA", "2023"]);
        assert_eq!(ex.bboxes, [[1.0, 2.0, 3.0, 4.0], [5.0, 2.0, 3.0, 4.0]]);
        assert_eq!(ex.label_ids, [3, 0]);
    }

    #[test]
    fn more_tokens_than_labels_truncates() {
        let rec = record(
            &["a", "b", "c", "d", "e"],
            vec![
                entry(1.0, "dependentes"),
                entry(2.0, "dependentes"),
                entry(3.0, "rodape_pagina"),
            ],
        );
        let (ex, report) = flatten_with_report(&rec, &LabelVocabulary::default()).unwrap();
        assert_eq!(ex.tokens.len(), 3);
        assert_eq!(ex.bboxes.len(), 3);
        assert_eq!(ex.label_ids.len(), 3);
        assert_eq!(ex.tokens, ["a", "b", "c"]);
        assert_eq!(report.dropped_tokens(), 2);
        assert_eq!(report.dropped_labels(), 0);
        assert!(!report.is_aligned());
    }

    #[test]
    fn more_labels_than_tokens_truncates() {
        let rec = record(
            &["a"],
            vec![entry(1.0, "tipo_declaracao"), entry(2.0, "valor_total_bens")],
        );
        let (ex, report) = flatten_with_report(&rec, &LabelVocabulary::default()).unwrap();
        assert_eq!(ex.len(), 1);
        assert_eq!(ex.label_ids, [7]);
        assert_eq!(report.kept, 1);
        assert_eq!(report.dropped_labels(), 1);
    }

    #[test]
    fn unknown_label_maps_to_sentinel() {
        let rec = record(&["x", "y"], vec![entry(1.0, "carimbo"), entry(1.0, "dependentes")]);
        let (ex, report) = flatten_with_report(&rec, &LabelVocabulary::default()).unwrap();
        assert_eq!(ex.label_ids, [UNKNOWN_LABEL_ID, 1]);
        assert_eq!(report.unknown_labels, ["carimbo"]);
    }

    #[test]
    fn only_first_candidate_label_is_used() {
        let mut e = entry(1.0, "rodape_pagina");
        e.labels = Some(vec!["rodape_pagina".into(), "texto_ignorado".into()]);
        let ex = flatten(&record(&["p. 1"], vec![e]), &LabelVocabulary::default()).unwrap();
        assert_eq!(ex.label_ids, [5]);
    }

    #[test]
    fn missing_labels_field_is_structural() {
        let mut e = entry(1.0, "dependentes");
        e.labels = None;
        let err = flatten(&record(&["a"], vec![e]), &LabelVocabulary::default()).unwrap_err();
        match err {
            ExportError::MissingField { task, index, field } => {
                assert_eq!(task, ExportId::Number(42));
                assert_eq!(index, 0);
                assert_eq!(field, "labels");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn missing_box_field_is_structural() {
        let mut e = entry(1.0, "dependentes");
        e.height = None;
        let rec = record(&["a", "b"], vec![entry(0.0, "dependentes"), e]);
        let err = flatten(&rec, &LabelVocabulary::default()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::MissingField {
                index: 1,
                field: "height",
                ..
            }
        ));
        assert!(err.to_string().contains("task 42"));
    }

    #[test]
    fn malformed_entry_past_paired_length_still_fails() {
        let mut e = entry(1.0, "dependentes");
        e.x = None;
        let rec = record(&["a"], vec![entry(0.0, "dependentes"), e]);
        assert!(flatten(&rec, &LabelVocabulary::default()).is_err());
    }

    #[test]
    fn empty_label_list_is_structural() {
        let mut e = entry(1.0, "dependentes");
        e.labels = Some(vec![]);
        let err = flatten(&record(&["a"], vec![e]), &LabelVocabulary::default()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyLabelList { index: 0, .. }));
    }

    #[test]
    fn missing_sequences_are_structural() {
        let mut rec = record(&["a"], vec![entry(1.0, "dependentes")]);
        rec.label = None;
        let err = flatten(&rec, &LabelVocabulary::default()).unwrap_err();
        assert!(matches!(err, ExportError::MissingSequence { field: "label", .. }));

        let mut rec = record(&["a"], vec![entry(1.0, "dependentes")]);
        rec.transcription = None;
        let err = flatten(&rec, &LabelVocabulary::default()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::MissingSequence {
                field: "transcription",
                ..
            }
        ));
    }

    #[test]
    fn empty_sequences_give_empty_example() {
        let ex = flatten(&record(&[], vec![]), &LabelVocabulary::default()).unwrap();
        assert!(ex.is_empty());
        assert!(ex.bboxes.is_empty() && ex.label_ids.is_empty());
    }

    #[test]
    fn flattening_is_idempotent() {
        let rec = record(
            &["a", "b", "c"],
            vec![entry(1.0, "dependentes"), entry(2.0, "??")],
        );
        let vocab = LabelVocabulary::default();
        assert_eq!(flatten(&rec, &vocab).unwrap(), flatten(&rec, &vocab).unwrap());
    }

    #[test]
    fn custom_vocabulary_is_injected() {
        let vocab = LabelVocabulary::from_names(["header", "nome_contribuinte"]).unwrap();
        let rec = record(&["x", "y"], vec![entry(1.0, "nome_contribuinte"), entry(1.0, "header")]);
        assert_eq!(flatten(&rec, &vocab).unwrap().label_ids, [1, 0]);
    }

    #[test]
    fn flattens_labelling_tool_export_json() {
        let json = r#"[{
            "id": 3,
            "ocr": "http://localhost:8080/decl/page_1.png",
            "transcription": ["EXERCICIO 2024", "ANO-CALENDARIO 2023", "sobra"],
            "label": [
                {"x": 4.1, "y": 2.0, "width": 30.5, "height": 1.5, "rotation": 0,
                 "labels": ["exercicio_e_ano"], "original_width": 2480, "original_height": 3508},
                {"x": 4.1, "y": 4.0, "width": 32.0, "height": 1.5, "rotation": 0,
                 "labels": ["ano_calendario"]}
            ]
        }]"#;
        let mut records = ExportRecord::parse_batch(json).unwrap();
        let record = records.remove(0).unwrap();
        let ex = flatten(&record, &LabelVocabulary::default()).unwrap();
        assert_eq!(ex.tokens, ["EXERCICIO 2024", "ANO-CALENDARIO 2023"]);
        assert_eq!(ex.bboxes[0], [4.1, 2.0, 30.5, 1.5]);
        assert_eq!(ex.label_ids, [2, 0]);
    }
}
