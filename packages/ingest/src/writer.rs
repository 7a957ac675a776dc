//! Output writer.
//!
//! One compact JSON file per source, overwritten in full on every run.
//! Consumers must not assume incremental updates or stable byte offsets
//! between runs.

use std::path::{Path, PathBuf};

use toronto_radar_models::TheftRecord;

use crate::IngestError;

/// Serializes `records` to `output_dir/filename`, creating the directory
/// if needed and replacing any previous file.
///
/// # Errors
///
/// Returns [`IngestError`] if serialization or file I/O fails.
pub fn write_records(
    records: &[TheftRecord],
    output_dir: &Path,
    filename: &str,
) -> Result<PathBuf, IngestError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(filename);

    let json = serde_json::to_string(records)?;
    std::fs::write(&path, &json)?;

    #[allow(clippy::cast_precision_loss)]
    let kib = json.len() as f64 / 1024.0;
    log::info!(
        "saved {} records to {} ({kib:.1} KiB)",
        records.len(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use toronto_radar_models::TheftCategory;

    use super::*;

    fn temp_dir(test: &str) -> PathBuf {
        std::env::temp_dir()
            .join("toronto_radar_writer_tests")
            .join(format!("{test}_{}", std::process::id()))
    }

    fn sample_records() -> Vec<TheftRecord> {
        vec![
            TheftRecord {
                id: "auto-GO-1".to_string(),
                category: TheftCategory::Auto,
                date: "2024-03-15".to_string(),
                year: 2024,
                month: 3,
                day: 15,
                hour: 2,
                neighbourhood: "Rouge (131)".to_string(),
                premise_type: "Outside".to_string(),
                lat: 43.804_523,
                lng: -79.165_837,
                status: "Recovered".to_string(),
            },
            TheftRecord {
                id: "auto-GO-2".to_string(),
                category: TheftCategory::Auto,
                date: "2024-02-01".to_string(),
                year: 2024,
                month: 2,
                day: 1,
                hour: 23,
                neighbourhood: "Unknown".to_string(),
                premise_type: "Apartment".to_string(),
                lat: 43.65,
                lng: -79.38,
                status: "Unknown".to_string(),
            },
        ]
    }

    #[test]
    fn round_trips_records_through_disk() {
        let dir = temp_dir("round_trip");
        let records = sample_records();

        let path = write_records(&records, &dir, "auto_thefts.json").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let read_back: Vec<TheftRecord> = serde_json::from_str(&contents).unwrap();

        assert_eq!(read_back, records);
        // Re-serializing must reproduce the file byte-for-byte.
        assert_eq!(serde_json::to_string(&read_back).unwrap(), contents);
    }

    #[test]
    fn encoding_is_compact_and_camel_cased() {
        let dir = temp_dir("compact");
        let path = write_records(&sample_records(), &dir, "auto_thefts.json").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();

        assert!(!contents.contains(": "), "expected no padded separators");
        assert!(!contents.contains('\n'));
        assert!(contents.contains("\"premiseType\":\"Outside\""));
        assert!(contents.contains("\"type\":\"auto\""));
        assert!(contents.contains("\"lat\":43.804523"));
    }

    #[test]
    fn overwrites_previous_contents_in_full() {
        let dir = temp_dir("overwrite");
        write_records(&sample_records(), &dir, "auto_thefts.json").unwrap();
        let path = write_records(&[], &dir, "auto_thefts.json").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
