//! JSON-lines copy of a flattened dataset, one example per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use labelforge_core::FlattenedExample;
use tracing::info;

use crate::StoreError;

pub fn write_jsonl(path: &Path, examples: &[FlattenedExample]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    for example in examples {
        serde_json::to_writer(&mut out, example)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!(path = %path.display(), rows = examples.len(), "wrote json lines");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_example() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("dataset.jsonl");
        let examples = vec![
            FlattenedExample {
                id: "7".into(),
                image: "p.png".into(),
                tokens: vec!["A".into()],
                bboxes: vec![[1.0, 2.0, 3.0, 4.0]],
                label_ids: vec![4],
            },
            FlattenedExample {
                id: "8".into(),
                image: "q.png".into(),
                tokens: vec![],
                bboxes: vec![],
                label_ids: vec![],
            },
        ];

        write_jsonl(&path, &examples).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], "7");
        assert_eq!(first["ner_tags"], serde_json::json!([4]));
        assert_eq!(first["bboxes"], serde_json::json!([[1.0, 2.0, 3.0, 4.0]]));
    }
}
