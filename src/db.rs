use crate::entities::{zone_for_state, Field, RowData};
use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Table the raw facility filings are imported into
pub const SOURCE_TABLE: &str = "childcare_facilities";

/// Source columns in table order
pub const SOURCE_COLUMNS: [Field; 30] = [
    Field::DateExtracted,
    Field::LicenseNumber,
    Field::LicenseIssueDate,
    Field::LicenseExpiryDate,
    Field::LicenseType,
    Field::FacilityName,
    Field::FacilityAddress,
    Field::City,
    Field::State,
    Field::ZipCode,
    Field::PhoneNumber,
    Field::FacilityType,
    Field::Capacity,
    Field::Enrollment,
    Field::Staff,
    Field::OperationalSchedule,
    Field::AcceptsSubsidies,
    Field::HoursSunday,
    Field::HoursMonday,
    Field::HoursTuesday,
    Field::HoursWednesday,
    Field::HoursThursday,
    Field::HoursFriday,
    Field::HoursSaturday,
    Field::SchoolDistrict,
    Field::AlternativeAddress,
    Field::AlternativeZip,
    Field::AlternativeContactNumber,
    Field::DateOriginallyLicensed,
    Field::FacilityStatus,
];

/// One childcare facility filing, as exported by the licensing agency
///
/// The same facility appears in many filings (one per extraction date), so
/// rows are repeated views of the same real-world entities.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SourceRow {
    #[serde(rename = "Date Extracted")]
    pub date_extracted: Option<String>,

    // ========================================================================
    // LICENSE
    // ========================================================================
    #[serde(rename = "License Number")]
    pub license_number: Option<String>,

    #[serde(rename = "License Issue Date")]
    pub license_issue_date: Option<String>,

    #[serde(rename = "License Expiry Date")]
    pub license_expiry_date: Option<String>,

    #[serde(rename = "License Type")]
    pub license_type: Option<String>,

    #[serde(rename = "Date Originally Licensed")]
    pub date_originally_licensed: Option<String>,

    // ========================================================================
    // FACILITY
    // ========================================================================
    #[serde(rename = "Facility Name")]
    pub facility_name: Option<String>,

    #[serde(rename = "Facility Type")]
    pub facility_type: Option<String>,

    #[serde(rename = "Facility Status")]
    pub facility_status: Option<String>,

    #[serde(rename = "Phone Number")]
    pub phone_number: Option<String>,

    #[serde(rename = "Capacity")]
    pub capacity: Option<String>,

    #[serde(rename = "Enrollment")]
    pub enrollment: Option<String>,

    #[serde(rename = "Staff")]
    pub staff: Option<String>,

    #[serde(rename = "Accepts Subsidies")]
    pub accepts_subsidies: Option<String>,

    #[serde(rename = "School District Affiliation")]
    pub school_district: Option<String>,

    // ========================================================================
    // LOCATION
    // ========================================================================
    #[serde(rename = "Facility Address")]
    pub facility_address: Option<String>,

    #[serde(rename = "City")]
    pub city: Option<String>,

    #[serde(rename = "State")]
    pub state: Option<String>,

    #[serde(rename = "Zip Code")]
    pub zip_code: Option<String>,

    #[serde(rename = "Alternative Address")]
    pub alternative_address: Option<String>,

    #[serde(rename = "Facility Zip (Alt)")]
    pub alternative_zip: Option<String>,

    #[serde(rename = "Alternative Contact Number")]
    pub alternative_contact_number: Option<String>,

    // ========================================================================
    // SCHEDULE
    // ========================================================================
    #[serde(rename = "Operational Schedule")]
    pub operational_schedule: Option<String>,

    #[serde(rename = "Hours of Operation (Sunday)")]
    pub hours_sunday: Option<String>,

    #[serde(rename = "Hours of Operation (Monday)")]
    pub hours_monday: Option<String>,

    #[serde(rename = "Hours of Operation (Tuesday)")]
    pub hours_tuesday: Option<String>,

    #[serde(rename = "Hours of Operation (Wednesday)")]
    pub hours_wednesday: Option<String>,

    #[serde(rename = "Hours of Operation (Thursday)")]
    pub hours_thursday: Option<String>,

    #[serde(rename = "Hours of Operation (Friday)")]
    pub hours_friday: Option<String>,

    #[serde(rename = "Hours of Operation (Saturday)")]
    pub hours_saturday: Option<String>,
}

impl SourceRow {
    fn slot(&self, field: Field) -> Option<&Option<String>> {
        let slot = match field {
            Field::DateExtracted => &self.date_extracted,
            Field::LicenseNumber => &self.license_number,
            Field::LicenseIssueDate => &self.license_issue_date,
            Field::LicenseExpiryDate => &self.license_expiry_date,
            Field::LicenseType => &self.license_type,
            Field::FacilityName => &self.facility_name,
            Field::FacilityAddress => &self.facility_address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::ZipCode => &self.zip_code,
            Field::PhoneNumber => &self.phone_number,
            Field::FacilityType => &self.facility_type,
            Field::Capacity => &self.capacity,
            Field::Enrollment => &self.enrollment,
            Field::Staff => &self.staff,
            Field::OperationalSchedule => &self.operational_schedule,
            Field::AcceptsSubsidies => &self.accepts_subsidies,
            Field::HoursSunday => &self.hours_sunday,
            Field::HoursMonday => &self.hours_monday,
            Field::HoursTuesday => &self.hours_tuesday,
            Field::HoursWednesday => &self.hours_wednesday,
            Field::HoursThursday => &self.hours_thursday,
            Field::HoursFriday => &self.hours_friday,
            Field::HoursSaturday => &self.hours_saturday,
            Field::SchoolDistrict => &self.school_district,
            Field::AlternativeAddress => &self.alternative_address,
            Field::AlternativeZip => &self.alternative_zip,
            Field::AlternativeContactNumber => &self.alternative_contact_number,
            Field::DateOriginallyLicensed => &self.date_originally_licensed,
            Field::FacilityStatus => &self.facility_status,
            _ => return None,
        };
        Some(slot)
    }

    fn slot_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        let slot = match field {
            Field::DateExtracted => &mut self.date_extracted,
            Field::LicenseNumber => &mut self.license_number,
            Field::LicenseIssueDate => &mut self.license_issue_date,
            Field::LicenseExpiryDate => &mut self.license_expiry_date,
            Field::LicenseType => &mut self.license_type,
            Field::FacilityName => &mut self.facility_name,
            Field::FacilityAddress => &mut self.facility_address,
            Field::City => &mut self.city,
            Field::State => &mut self.state,
            Field::ZipCode => &mut self.zip_code,
            Field::PhoneNumber => &mut self.phone_number,
            Field::FacilityType => &mut self.facility_type,
            Field::Capacity => &mut self.capacity,
            Field::Enrollment => &mut self.enrollment,
            Field::Staff => &mut self.staff,
            Field::OperationalSchedule => &mut self.operational_schedule,
            Field::AcceptsSubsidies => &mut self.accepts_subsidies,
            Field::HoursSunday => &mut self.hours_sunday,
            Field::HoursMonday => &mut self.hours_monday,
            Field::HoursTuesday => &mut self.hours_tuesday,
            Field::HoursWednesday => &mut self.hours_wednesday,
            Field::HoursThursday => &mut self.hours_thursday,
            Field::HoursFriday => &mut self.hours_friday,
            Field::HoursSaturday => &mut self.hours_saturday,
            Field::SchoolDistrict => &mut self.school_district,
            Field::AlternativeAddress => &mut self.alternative_address,
            Field::AlternativeZip => &mut self.alternative_zip,
            Field::AlternativeContactNumber => &mut self.alternative_contact_number,
            Field::DateOriginallyLicensed => &mut self.date_originally_licensed,
            Field::FacilityStatus => &mut self.facility_status,
            _ => return None,
        };
        Some(slot)
    }

    /// Raw value of a source column (None for derived fields)
    pub fn value(&self, field: Field) -> Option<&str> {
        self.slot(field).and_then(|v| v.as_deref())
    }

    /// Builder: set a source column (derived fields are ignored)
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        if let Some(slot) = self.slot_mut(field) {
            *slot = Some(value.into());
        }
        self
    }

    /// Parsed projection: trimmed present values plus derived time zone
    pub fn project(&self) -> RowData {
        let mut data = RowData::new();
        for field in SOURCE_COLUMNS {
            data.set(field, self.value(field));
        }

        let zone = data.get(Field::State).and_then(zone_for_state);
        data.set(Field::TimeZone, zone);
        data
    }

    /// SHA-256 over every column, used to count exact duplicate filings
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for field in SOURCE_COLUMNS {
            hasher.update(self.value(field).unwrap_or_default().as_bytes());
            hasher.update([0x1f]);
        }
        format!("{:x}", hasher.finalize())
    }
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<SourceRow>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let row: SourceRow =
            result.with_context(|| format!("Failed to deserialize facility row {}", line + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Drop and recreate the source table (import replaces previous data)
pub fn setup_source_table(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;

    let columns = SOURCE_COLUMNS
        .iter()
        .map(|f| format!("\"{}\" TEXT", f.column()))
        .collect::<Vec<_>>()
        .join(",\n            ");

    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};
         CREATE TABLE {table} (
            {columns}
         );",
        table = SOURCE_TABLE,
        columns = columns,
    ))?;

    Ok(())
}

pub fn import_rows(conn: &mut Connection, rows: &[SourceRow]) -> Result<usize> {
    let column_list = SOURCE_COLUMNS
        .iter()
        .map(|f| format!("\"{}\"", f.column()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=SOURCE_COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        SOURCE_TABLE, column_list, placeholders
    );

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&sql)?;
        for row in rows {
            stmt.execute(params_from_iter(
                SOURCE_COLUMNS.iter().map(|f| row.value(*f)),
            ))?;
        }
    }
    tx.commit()?;

    tracing::info!(rows = rows.len(), table = SOURCE_TABLE, "imported source rows");
    Ok(rows.len())
}

/// Column names currently present in the source table
fn source_table_columns(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", SOURCE_TABLE))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Read every source row in insertion order
///
/// Tolerates tables written by other tools: absent columns read as None and
/// numeric cells are rendered as text.
pub fn load_source_rows(conn: &Connection) -> Result<Vec<SourceRow>> {
    let existing = source_table_columns(conn)?;
    if existing.is_empty() {
        anyhow::bail!("Source table {} does not exist", SOURCE_TABLE);
    }

    let present: Vec<Field> = SOURCE_COLUMNS
        .iter()
        .copied()
        .filter(|f| existing.iter().any(|c| c == f.column()))
        .collect();

    let select_list = present
        .iter()
        .map(|f| format!("\"{}\"", f.column()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} ORDER BY rowid",
        select_list, SOURCE_TABLE
    ))?;

    let rows = stmt
        .query_map([], |sql_row| {
            let mut row = SourceRow::default();
            for (idx, field) in present.iter().enumerate() {
                let value: Value = sql_row.get(idx)?;
                if let Some(slot) = row.slot_mut(*field) {
                    *slot = value_to_text(value);
                }
            }
            Ok(row)
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub(crate) fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

pub fn count_source_rows(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", SOURCE_TABLE),
        [],
        |row| row.get(0),
    )?;

    Ok(count)
}
