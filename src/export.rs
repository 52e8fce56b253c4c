// 📤 CSV export of the materialized graph, for bulk loading into a graph store

use crate::db::value_to_text;
use crate::error::{GraphError, Result};
use crate::sink::tables::output_tables;
use crate::sink::triples::TRIPLES_TABLE;
use crate::sink::SinkFormat;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// One written CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Tables exported for a sink format
pub fn export_tables(format: SinkFormat) -> Vec<&'static str> {
    match format {
        SinkFormat::Tables => output_tables(),
        SinkFormat::Triples => vec![TRIPLES_TABLE],
    }
}

/// Write one `<table>.csv` (with a header row) per output table into `dir`
///
/// The directory and every table of `format` must already exist; nothing is
/// written otherwise.
pub fn export_csv(conn: &Connection, format: SinkFormat, dir: &Path) -> Result<Vec<ExportedFile>> {
    if !dir.is_dir() {
        return Err(GraphError::SinkUnavailable(format!(
            "export directory {} does not exist",
            dir.display()
        )));
    }

    let tables = export_tables(format);
    for table in &tables {
        if !table_exists(conn, table)? {
            return Err(GraphError::SinkUnavailable(format!(
                "table {} does not exist; materialize with --sink {} first",
                table, format
            )));
        }
    }

    let mut files = Vec::new();
    for table in tables {
        let path = dir.join(format!("{}.csv", table));
        let rows = export_table(conn, table, &path)?;
        tracing::info!(table, rows, path = %path.display(), "exported table");

        files.push(ExportedFile {
            table: table.to_string(),
            path,
            rows,
        });
    }

    Ok(files)
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn export_table(conn: &Connection, table: &str, path: &Path) -> Result<usize> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {} ORDER BY rowid", table))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;

    let mut rows = stmt.query([])?;
    let mut count = 0;
    while let Some(row) = rows.next()? {
        let record = (0..columns.len())
            .map(|idx| {
                row.get::<_, Value>(idx)
                    .map(|v| value_to_text(v).unwrap_or_default())
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        writer.write_record(&record)?;
        count += 1;
    }

    writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SourceRow;
    use crate::entities::{EntityType, Field};
    use crate::materializer::materialize;
    use crate::sink::{TableSink, TripleSink};

    fn rows() -> Vec<SourceRow> {
        vec![SourceRow::default()
            .with(Field::FacilityName, "Sunny Daycare")
            .with(Field::LicenseNumber, "LIC001")
            .with(Field::FacilityAddress, "1 Main St")
            .with(Field::City, "Springfield")
            .with(Field::State, "IL")
            .with(Field::ZipCode, "62701")]
    }

    #[test]
    fn test_export_tables_format() {
        let conn = Connection::open_in_memory().unwrap();
        let all = EntityType::ALL.into_iter().collect();
        materialize(&rows(), TableSink::new(&conn), &all).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let files = export_csv(&conn, SinkFormat::Tables, dir.path()).unwrap();

        assert_eq!(files.len(), output_tables().len());
        let facilities = files.iter().find(|f| f.table == "facilities").unwrap();
        assert_eq!(facilities.rows, 1);

        let mut reader = csv::Reader::from_path(&facilities.path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "entity_id");
        assert!(headers.iter().any(|h| h == "location_id"));

        let relationships = dir.path().join("relationships.csv");
        assert!(relationships.exists(), "relationships.csv should be written");
    }

    #[test]
    fn test_export_triples_format() {
        let conn = Connection::open_in_memory().unwrap();
        let all = EntityType::ALL.into_iter().collect();
        let (report, _) = materialize(&rows(), TripleSink::new(&conn), &all).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let files = export_csv(&conn, SinkFormat::Triples, dir.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, dir.path().join("triples.csv"));
        assert_eq!(
            files[0].rows,
            report.entities_written + report.attributes_written + report.relationships_written
        );
    }

    #[test]
    fn test_missing_directory_is_sink_unavailable() {
        let conn = Connection::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = export_csv(&conn, SinkFormat::Triples, &dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, GraphError::SinkUnavailable(_)));
    }

    #[test]
    fn test_missing_table_is_sink_unavailable() {
        let conn = Connection::open_in_memory().unwrap();
        let all = EntityType::ALL.into_iter().collect();
        materialize(&rows(), TableSink::new(&conn), &all).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let err = export_csv(&conn, SinkFormat::Triples, dir.path()).unwrap_err();
        assert!(
            matches!(err, GraphError::SinkUnavailable(_)),
            "Exporting a format that was never materialized: {:?}",
            err
        );
        assert!(!dir.path().join("triples.csv").exists(), "No file is written");

        let empty = Connection::open_in_memory().unwrap();
        let err = export_csv(&empty, SinkFormat::Tables, dir.path()).unwrap_err();
        assert!(matches!(err, GraphError::SinkUnavailable(_)));
        assert_eq!(
            std::fs::read_dir(dir.path()).unwrap().count(),
            0,
            "Tables are checked before any file is written"
        );
    }
}
