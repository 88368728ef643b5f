//! Delimited-file loader: schema check, row cleaning, and deduplication.
//!
//! The loader is the only place rows are validated. Structural problems
//! (missing file, missing columns, an undecodable header or broken
//! delimited framing) fail the whole load; row-level defects are dropped
//! and counted in the [`LoadReport`].

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::analytics::bucketing::parse_record_date;
use crate::model::{Column, LaunchRecord};

use super::dataset::{Dataset, LoadReport};

/// Tokens treated as a null cell.
const NULL_TOKENS: [&str; 10] = [
    "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "<NA>", "#N/A",
];

/// Errors that stop a load. No dataset is produced when one is returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("data source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("data source is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("failed to read data source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed delimited data: {0}")]
    Malformed(#[from] csv::Error),
}

impl LoadError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not-found",
            Self::MissingColumns { .. } => "data-validation",
            Self::Io { .. } => "io",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// Reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Single-byte field delimiter.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Load and clean a launch table with default options.
pub fn load(path: &Path) -> Result<Dataset, LoadError> {
    load_with(path, &LoadOptions::default())
}

/// Load and clean a launch table.
pub fn load_with(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let started = Instant::now();
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let (records, report) = read_records(file, options)?;
    tracing::info!(
        path = %path.display(),
        rows_read = report.rows_read,
        kept = records.len(),
        dropped_bad_date = report.dropped_bad_date,
        dropped_missing_required = report.dropped_missing_required,
        dropped_undecodable = report.dropped_undecodable,
        dropped_duplicates = report.dropped_duplicates,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded launch dataset"
    );
    Ok(Dataset::from_load(records, report, path.to_path_buf()))
}

/// Parse and clean rows from any reader. Records keep source order.
pub fn read_records<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<(Vec<LaunchRecord>, LoadReport), LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut report = LoadReport::default();
    let mut candidates: Vec<(u64, LaunchRecord)> = Vec::new();
    let mut row = csv::ByteRecord::new();

    while rdr.read_byte_record(&mut row)? {
        report.rows_read += 1;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let cells = match layout.decode(&row) {
            Ok(cells) => cells,
            Err(column) => {
                report.dropped_undecodable += 1;
                tracing::debug!(line, %column, "dropping row: cell is not valid UTF-8");
                continue;
            }
        };

        let Some(date) = parse_record_date(cells.get(Column::Date)) else {
            report.dropped_bad_date += 1;
            tracing::debug!(line, raw = cells.get(Column::Date), "dropping row: unparseable date");
            continue;
        };

        let (Some(mission), Some(mission_status)) = (
            non_null(cells.get(Column::Mission)),
            non_null(cells.get(Column::MissionStatus)),
        ) else {
            report.dropped_missing_required += 1;
            tracing::debug!(line, "dropping row: missing mission or status");
            continue;
        };

        candidates.push((
            line,
            LaunchRecord {
                company: text(cells.get(Column::Company)),
                location: text(cells.get(Column::Location)),
                date,
                time: non_null(cells.get(Column::Time)).map(str::to_string),
                rocket: text(cells.get(Column::Rocket)),
                mission: mission.to_string(),
                rocket_status: text(cells.get(Column::RocketStatus)),
                price: parse_price(cells.get(Column::Price)),
                mission_status: mission_status.to_string(),
            },
        ));
    }

    // Duplicates are judged on the parsed records, the same view the
    // validation report checks.
    let mut seen = HashSet::new();
    let fresh: Vec<bool> = candidates
        .iter()
        .map(|(line, record)| {
            let first = seen.insert(record.identity());
            if !first {
                report.dropped_duplicates += 1;
                tracing::debug!(line, "dropping row: exact duplicate");
            }
            first
        })
        .collect();
    let records = candidates
        .into_iter()
        .zip(fresh)
        .filter_map(|((_, record), first)| first.then_some(record))
        .collect();

    Ok((records, report))
}

/// Positions of the required columns inside the header.
struct ColumnLayout {
    positions: [usize; Column::REQUIRED.len()],
}

impl ColumnLayout {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();

        let mut positions = [0usize; Column::REQUIRED.len()];
        let mut missing = Vec::new();
        for (slot, column) in Column::REQUIRED.iter().enumerate() {
            match names.iter().position(|n| *n == column.header()) {
                Some(idx) => positions[slot] = idx,
                None => missing.push(column.header().to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns { missing });
        }
        Ok(Self { positions })
    }

    /// Decode the required cells of one row. Short rows read as empty.
    ///
    /// Undecodable `Price` or `Time` cells read as null; any other
    /// undecodable cell rejects the row and names the column.
    fn decode<'r>(&self, row: &'r csv::ByteRecord) -> Result<RowCells<'r>, Column> {
        let mut cells = [""; Column::REQUIRED.len()];
        for (slot, column) in Column::REQUIRED.into_iter().enumerate() {
            let raw = row.get(self.positions[slot]).unwrap_or(b"");
            cells[slot] = match std::str::from_utf8(raw) {
                Ok(text) => text,
                Err(_) if matches!(column, Column::Price | Column::Time) => "",
                Err(_) => return Err(column),
            };
        }
        Ok(RowCells(cells))
    }
}

/// Decoded required cells of one row, indexed by column.
struct RowCells<'r>([&'r str; Column::REQUIRED.len()]);

impl<'r> RowCells<'r> {
    fn get(&self, column: Column) -> &'r str {
        // REQUIRED lists every variant in declaration order.
        self.0[column as usize]
    }
}

fn non_null(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NULL_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

fn text(raw: &str) -> String {
    non_null(raw).unwrap_or("").to_string()
}

fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = non_null(raw)?.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Company,Location,Date,Time,Rocket,Mission,RocketStatus,Price,MissionStatus\n";

    fn read(body: &str) -> (Vec<LaunchRecord>, LoadReport) {
        let data = format!("{HEADER}{body}");
        read_records(data.as_bytes(), &LoadOptions::default()).expect("load")
    }

    #[test]
    fn parses_well_formed_rows() {
        let (records, report) = read(
            "SpaceX,\"LC-39A, Kennedy Space Center, Florida, USA\",2020-08-07,05:12:00,Falcon 9 Block 5,Starlink V1 L9,Active,50.0,Success\n",
        );
        assert_eq!(report.rows_read, 1);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.company, "SpaceX");
        assert_eq!(r.location, "LC-39A, Kennedy Space Center, Florida, USA");
        assert_eq!(r.date.to_string(), "2020-08-07");
        assert_eq!(r.time.as_deref(), Some("05:12:00"));
        assert_eq!(r.price, Some(50.0));
        assert_eq!(r.mission_status, "Success");
    }

    #[test]
    fn drops_unparseable_dates() {
        let (records, report) = read(
            "A,USA,not-a-date,,R,M1,Active,,Success\n\
             A,USA,2020-02-30,,R,M2,Active,,Success\n\
             A,USA,2020-01-01,,R,M3,Active,,Success\n",
        );
        assert_eq!(report.dropped_bad_date, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mission, "M3");
    }

    #[test]
    fn drops_missing_mission_or_status() {
        let (records, report) = read(
            "A,USA,2020-01-01,,R,,Active,,Success\n\
             A,USA,2020-01-02,,R,M2,Active,,\n\
             A,USA,2020-01-03,,R,NaN,Active,,Success\n\
             A,USA,2020-01-04,,R,M4,Active,,Failure\n",
        );
        assert_eq!(report.dropped_missing_required, 3);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mission, "M4");
    }

    #[test]
    fn removes_exact_duplicates_keeping_first() {
        let (records, report) = read(
            "A,USA,2020-01-01,10:00,R,M1,Active,5,Success\n\
             B,USA,2020-01-01,10:00,R,M1,Active,5,Success\n\
             A,USA,2020-01-01,10:00,R,M1,Active,5,Success\n\
             A,USA,2020/01/01,10:00,R,M1,Active,5,Success\n",
        );
        assert_eq!(report.dropped_duplicates, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company, "A");
        assert_eq!(records[1].company, "B");
        assert_eq!(report.rows_kept(), records.len());
    }

    #[test]
    fn duplicates_compare_parsed_values() {
        let data = "Company,Location,Date,Time,Rocket,Mission,RocketStatus,Price,MissionStatus,Extra\n\
                    A,USA,2020-01-01,10:00,R,M1,Active,5,Success,x\n\
                    A,USA,2020-01-01,10:00,R,M1,Active,5.0,Success,x\n\
                    A,USA,2020-01-01,10:00,R,M1,Active,5,Success,y\n\
                    A,USA,2020-01-01,10:00,R,M1,Active,\"5,000\",Success,x\n\
                    A,USA,2020-01-01,10:00,R,M1,Active,5000,Success,x\n";
        let (records, report) =
            read_records(data.as_bytes(), &LoadOptions::default()).expect("load");
        assert_eq!(records.len(), 2);
        assert_eq!(report.dropped_duplicates, 3);
        assert_eq!(records[0].price, Some(5.0));
        assert_eq!(records[1].price, Some(5000.0));
    }

    #[test]
    fn null_spellings_collapse_as_duplicates() {
        let (records, report) = read(
            "A,USA,2020-01-01,,R,M1,Active,,Success\n\
             A,USA,2020-01-01,NA,R,M1,Active,n/a,Success\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(report.dropped_duplicates, 1);
    }

    #[test]
    fn undecodable_optional_cells_read_as_null() {
        let mut data = HEADER.as_bytes().to_vec();
        data.extend_from_slice(b"A,USA,2020-01-01,10:00,R,M1,Active,5,Success\n");
        data.extend_from_slice(b"A,USA,2020-01-02,10:00,R,M2,Active,\xa350,Success\n");
        data.extend_from_slice(b"A,USA,2020-01-03,\xff,R,M3,Active,,Success\n");
        let (records, report) = read_records(data.as_slice(), &LoadOptions::default()).expect("load");
        assert_eq!(records.len(), 3);
        assert_eq!(report.dropped_undecodable, 0);
        assert_eq!(records[0].price, Some(5.0));
        assert_eq!(records[1].price, None);
        assert_eq!(records[1].mission, "M2");
        assert_eq!(records[2].time, None);
    }

    #[test]
    fn undecodable_required_cells_drop_the_row() {
        let mut data = HEADER.as_bytes().to_vec();
        data.extend_from_slice(b"Soci\xe9t\xe9,France,2020-01-01,,R,M1,Active,,Success\n");
        data.extend_from_slice(b"A,USA,2020-01-02,,R,M2,Active,,Success\n");
        let (records, report) = read_records(data.as_slice(), &LoadOptions::default()).expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mission, "M2");
        assert_eq!(report.dropped_undecodable, 1);
        assert_eq!(report.rows_kept(), 1);
        assert_eq!(report.rows_dropped(), 1);
    }

    #[test]
    fn undecodable_header_is_malformed() {
        let data = b"Company,Loc\xe9tion,Date\nA,USA,2020-01-01\n";
        let err = read_records(&data[..], &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn price_is_optional_and_lenient() {
        let (records, _) = read(
            "A,USA,2020-01-01,,R,M1,Active,\"5,000.0\",Success\n\
             A,USA,2020-01-02,,R,M2,Active,unknown,Success\n\
             A,USA,2020-01-03,,R,M3,Active,,Success\n",
        );
        assert_eq!(records[0].price, Some(5000.0));
        assert_eq!(records[1].price, None);
        assert_eq!(records[2].price, None);
        assert!(records.iter().all(|r| r.time.is_none()));
    }

    #[test]
    fn reports_every_missing_column_in_canonical_order() {
        let data = "Company,Date,Rocket,Mission\nA,2020-01-01,R,M\n";
        let err = read_records(data.as_bytes(), &LoadOptions::default()).unwrap_err();
        match err {
            LoadError::MissingColumns { missing } => assert_eq!(
                missing,
                vec!["Location", "Time", "RocketStatus", "Price", "MissionStatus"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tolerates_extra_columns_reordering_and_bom() {
        let data = "\u{feff}MissionStatus,Extra,Price,RocketStatus,Mission,Rocket,Time,Date,Location,Company\n\
                    Success,x,,Retired,Apollo 11,Saturn V,13:32,1969-07-16,\"LC-39A, Florida, USA\",NASA\n";
        let (records, _) = read_records(data.as_bytes(), &LoadOptions::default()).expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company, "NASA");
        assert_eq!(records[0].rocket, "Saturn V");
        assert_eq!(records[0].mission, "Apollo 11");
    }

    #[test]
    fn short_rows_read_missing_cells_as_null() {
        let (records, report) = read("A,USA,2020-01-01,,R,M1\n");
        assert_eq!(records.len(), 0);
        assert_eq!(report.dropped_missing_required, 1);
    }

    #[test]
    fn custom_delimiter() {
        let data = "Company;Location;Date;Time;Rocket;Mission;RocketStatus;Price;MissionStatus\n\
                    A;Kourou, France;2020-01-01;;Ariane 5;M1;Active;;Success\n";
        let (records, _) =
            read_records(data.as_bytes(), &LoadOptions { delimiter: b';' }).expect("load");
        assert_eq!(records[0].location, "Kourou, France");
    }

    #[test]
    fn error_kinds_are_stable() {
        let not_found = LoadError::NotFound {
            path: PathBuf::from("x.csv"),
        };
        assert_eq!(not_found.kind(), "not-found");
        assert!(not_found.to_string().contains("x.csv"));
        let missing = LoadError::MissingColumns {
            missing: vec!["Date".into(), "Price".into()],
        };
        assert_eq!(missing.kind(), "data-validation");
        assert!(missing.to_string().ends_with("Date, Price"));
    }
}
