//! Archive packaging: one zip per non-empty batch, entries in row order.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use wcr_core::Batch;

use crate::error::PackagingError;

/// Zip every artifact of `batch` under its own name.
///
/// Returns `Ok(None)` for an empty batch: no archive is produced.
pub fn package(batch: &Batch) -> Result<Option<Vec<u8>>, PackagingError> {
    if batch.is_empty() {
        return Ok(None);
    }

    let mut seen = HashSet::with_capacity(batch.len());
    for artifact in &batch.artifacts {
        if !seen.insert(artifact.name.as_str()) {
            return Err(PackagingError::DuplicateEntry {
                name: artifact.name.clone(),
            });
        }
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for artifact in &batch.artifacts {
        writer.start_file(artifact.name.as_str(), options)?;
        writer
            .write_all(&artifact.bytes)
            .map_err(PackagingError::Buffer)?;
    }
    Ok(Some(writer.finish()?.into_inner()))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use wcr_core::{Artifact, ArtifactKind};
    use zip::ZipArchive;

    use super::*;

    fn artifact(name: &str, body: &str, row_index: usize) -> Artifact {
        Artifact {
            name: name.to_string(),
            bytes: body.as_bytes().to_vec(),
            row_index,
        }
    }

    #[test]
    fn empty_batch_has_no_archive() {
        let batch = Batch::new(ArtifactKind::Converted);
        assert!(package(&batch).unwrap().is_none());
    }

    #[test]
    fn entries_follow_batch_order() {
        let mut batch = Batch::new(ArtifactKind::Document);
        batch.push(artifact("WCR_B.docx", "b", 0));
        batch.push(artifact("WCR_A.docx", "a", 1));
        batch.push(artifact("WCR_Row3.docx", "c", 2));

        let bytes = package(&batch).unwrap().expect("archive");
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["WCR_B.docx", "WCR_A.docx", "WCR_Row3.docx"]);

        let mut body = String::new();
        archive.by_name("WCR_A.docx").unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "a");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut batch = Batch::new(ArtifactKind::Document);
        batch.push(artifact("WCR_X.docx", "1", 0));
        batch.push(artifact("WCR_X.docx", "2", 1));
        let err = package(&batch).unwrap_err();
        assert!(matches!(err, PackagingError::DuplicateEntry { ref name } if name == "WCR_X.docx"));
    }
}
