//! CSV parsing into normalized import rows.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;

use crate::error::{EngineError, EngineResult};
use crate::models::AttendanceStatus;

/// Spreadsheet serial dates count days from this epoch (the Excel "day 0"
/// convention, which absorbs the fictitious 1900-02-29).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// One successfully parsed import row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// 1-based line number in the source stream, for error reporting.
    pub line: u64,
    /// The employee code to reconcile against the organization's employees.
    pub employee_code: String,
    /// The attendance date.
    pub date: NaiveDate,
    /// Check-in instant, when the row carried a check-in time.
    pub check_in: Option<NaiveDateTime>,
    /// Check-out instant, when the row carried a check-out time.
    pub check_out: Option<NaiveDateTime>,
    /// Explicit status column, when present and valid.
    pub status: Option<AttendanceStatus>,
    /// Shift name to resolve within the organization, when present.
    pub shift_name: Option<String>,
}

/// A row that could not be parsed, with its position and reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the source stream; 0 when unknown.
    pub line: u64,
    /// What was wrong with the row.
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.line, self.message)
    }
}

/// The outcome of normalizing a tabular stream.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImport {
    /// Rows that parsed successfully.
    pub rows: Vec<ImportRow>,
    /// Row-level failures; the rest of the stream still parses.
    pub errors: Vec<RowError>,
}

struct HeaderMap {
    employee_code: usize,
    date: usize,
    check_in: Option<usize>,
    check_out: Option<usize>,
    status: Option<usize>,
    shift_name: Option<usize>,
}

/// Normalizes a tabular byte stream into import rows.
///
/// Expected columns: `employee_code`, `date` (required), `check_in`,
/// `check_out`, `status`, `shift_name` (optional). Header matching is
/// case-insensitive and tolerates spaces. Dates accept spreadsheet serial
/// numbers and common string forms; times accept `HH:MM` or `HH:MM:SS` and
/// are combined with the row's date.
///
/// Missing required headers reject the whole stream as a validation error;
/// everything else is a row-level error that leaves other rows intact.
pub fn normalize(bytes: &[u8]) -> EngineResult<NormalizedImport> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| EngineError::validation("import", format!("unreadable header row: {e}")))?
        .clone();
    let map = resolve_headers(&headers)?;

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                errors.push(RowError {
                    line: e.position().map(|p| p.line()).unwrap_or(0),
                    message: format!("malformed row: {e}"),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        match parse_row(&record, &map, line) {
            Ok(row) => rows.push(row),
            Err(message) => errors.push(RowError { line, message }),
        }
    }

    Ok(NormalizedImport { rows, errors })
}

fn resolve_headers(headers: &csv::StringRecord) -> EngineResult<HeaderMap> {
    let index_of = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().to_ascii_lowercase().replace(' ', "_") == name)
    };

    let employee_code = index_of("employee_code").ok_or_else(|| {
        EngineError::validation("import", "missing required column 'employee_code'")
    })?;
    let date = index_of("date")
        .ok_or_else(|| EngineError::validation("import", "missing required column 'date'"))?;

    Ok(HeaderMap {
        employee_code,
        date,
        check_in: index_of("check_in"),
        check_out: index_of("check_out"),
        status: index_of("status"),
        shift_name: index_of("shift_name"),
    })
}

fn field<'a>(record: &'a csv::StringRecord, index: Option<usize>) -> Option<&'a str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_row(
    record: &csv::StringRecord,
    map: &HeaderMap,
    line: u64,
) -> Result<ImportRow, String> {
    let employee_code = field(record, Some(map.employee_code))
        .ok_or("missing employee code")?
        .to_string();
    let raw_date = field(record, Some(map.date)).ok_or("missing date")?;
    let date = parse_date(raw_date).ok_or_else(|| format!("unparseable date '{raw_date}'"))?;

    let check_in = match field(record, map.check_in) {
        Some(raw) => Some(parse_time_on(date, raw)?),
        None => None,
    };
    let check_out = match field(record, map.check_out) {
        Some(raw) => Some(parse_time_on(date, raw)?),
        None => None,
    };

    // An unknown status string falls back to inference rather than failing
    // the row; only the valid enum values override.
    let status = field(record, map.status).and_then(|raw| raw.parse::<AttendanceStatus>().ok());
    let shift_name = field(record, map.shift_name).map(str::to_string);

    Ok(ImportRow {
        line,
        employee_code,
        date,
        check_in,
        check_out,
        status,
        shift_name,
    })
}

/// Accepts spreadsheet serial numbers and the common string forms.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.chars().all(|c| c.is_ascii_digit()) {
        if raw.len() == 8 {
            // Compact form like 20260316.
            return NaiveDate::parse_from_str(raw, "%Y%m%d").ok();
        }
        let serial: i64 = raw.parse().ok()?;
        let (y, m, d) = SERIAL_EPOCH;
        return NaiveDate::from_ymd_opt(y, m, d)?.checked_add_signed(Duration::days(serial));
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}

fn parse_time_on(date: NaiveDate, raw: &str) -> Result<NaiveDateTime, String> {
    for format in ["%H:%M", "%H:%M:%S"] {
        if let Ok(time) = NaiveTime::parse_from_str(raw, format) {
            return Ok(date.and_time(time));
        }
    }
    Err(format!("unparseable time '{raw}'"))
}
