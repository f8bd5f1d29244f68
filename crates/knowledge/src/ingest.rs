//! CSV parsing for the curated dataset.
//!
//! The header row names the columns. `id` and `text` are required; the
//! metadata columns (`name`, `category`, `neighborhood`, `transit`,
//! `price_level`, `duration_hours`, `best_for`, `highlights`, `tips`) are
//! optional and default to empty strings. Unknown columns are ignored.

use cityguide_core::error::IngestError;
use cityguide_core::knowledge::{KnowledgeRecord, RecordMetadata};
use std::path::Path;

/// Column positions resolved from the header row.
struct Columns {
    id: usize,
    text: usize,
    name: Option<usize>,
    category: Option<usize>,
    neighborhood: Option<usize>,
    transit: Option<usize>,
    price_level: Option<usize>,
    duration_hours: Option<usize>,
    best_for: Option<usize>,
    highlights: Option<usize>,
    tips: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let find = |column: &str| headers.iter().position(|h| h.trim() == column);
        let require = |column: &str| find(column).ok_or_else(|| IngestError::MissingColumn(column.into()));

        Ok(Self {
            text: require("text")?,
            id: require("id")?,
            name: find("name"),
            category: find("category"),
            neighborhood: find("neighborhood"),
            transit: find("transit"),
            price_level: find("price_level"),
            duration_hours: find("duration_hours"),
            best_for: find("best_for"),
            highlights: find("highlights"),
            tips: find("tips"),
        })
    }

    fn record(&self, row: &csv::StringRecord) -> KnowledgeRecord {
        let field = |idx: usize| row.get(idx).unwrap_or_default().to_string();
        let optional = |idx: Option<usize>| idx.map(field).unwrap_or_default();

        KnowledgeRecord {
            id: field(self.id),
            text: field(self.text),
            metadata: RecordMetadata {
                name: optional(self.name),
                category: optional(self.category),
                neighborhood: optional(self.neighborhood),
                transit: optional(self.transit),
                price_level: optional(self.price_level),
                duration_hours: optional(self.duration_hours),
                best_for: optional(self.best_for),
                highlights: optional(self.highlights),
                tips: optional(self.tips),
            },
        }
    }
}

/// Read every row of the CSV at `path` into knowledge records.
pub fn read_csv(path: &Path) -> Result<Vec<KnowledgeRecord>, IngestError> {
    if !path.exists() {
        return Err(IngestError::SourceNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| IngestError::Malformed(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Malformed(e.to_string()))?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| IngestError::Malformed(e.to_string()))?;
        records.push(columns.record(&row));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        tmp
    }

    #[test]
    fn reads_all_columns() {
        let tmp = write_csv(
            "id,name,category,neighborhood,transit,price_level,duration_hours,best_for,highlights,tips,text\n\
             rom,Royal Ontario Museum,museum,Downtown,Line 1 to Museum,medium,3,family,Dinosaurs,Go early,\"World cultures, natural history\"\n",
        );
        let records = read_csv(tmp.path()).unwrap();
        assert_eq!(records.len(), 1);
        let rom = &records[0];
        assert_eq!(rom.id, "rom");
        assert_eq!(rom.text, "World cultures, natural history");
        assert_eq!(rom.metadata.name, "Royal Ontario Museum");
        assert_eq!(rom.metadata.transit, "Line 1 to Museum");
        assert_eq!(rom.metadata.price_level, "medium");
        assert_eq!(rom.metadata.tips, "Go early");
    }

    #[test]
    fn optional_columns_default_to_empty() {
        let tmp = write_csv("id,text\n1,Lakeshore boardwalk\n");
        let records = read_csv(tmp.path()).unwrap();
        assert_eq!(records[0].text, "Lakeshore boardwalk");
        assert_eq!(records[0].metadata, RecordMetadata::default());
    }

    #[test]
    fn missing_text_column() {
        let tmp = write_csv("id,name\n1,ROM\n");
        let err = read_csv(tmp.path()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn(ref c) if c == "text"));
        assert_eq!(err.to_string(), "CSV must contain a 'text' column.");
    }

    #[test]
    fn missing_id_column() {
        let tmp = write_csv("name,text\nROM,Museum\n");
        let err = read_csv(tmp.path()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn(ref c) if c == "id"));
    }

    #[test]
    fn missing_file() {
        let err = read_csv(Path::new("/nonexistent/tips.csv")).unwrap_err();
        assert!(matches!(err, IngestError::SourceNotFound(_)));
        assert!(err.to_string().starts_with("CSV not found at"));
    }

    #[test]
    fn short_rows_fill_empty() {
        let tmp = write_csv("id,text,tips\n1,Short row\n");
        let records = read_csv(tmp.path()).unwrap();
        assert_eq!(records[0].metadata.tips, "");
    }
}
