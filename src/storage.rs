use crate::errors::DataError;
use crate::models::{GroupingVar, TripRecord, TripTable};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::Deserialize;
use std::{collections::HashSet, env, io::Read, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Required columns. Each entry lists the accepted header names, preferred first.
const REQUIRED_COLUMNS: [(&str, &[&str]); 5] = [
    ("dyear", &["dyear"]),
    ("group", &["group"]),
    ("var", &["var"]),
    ("daily_fare", &["daily_fare", "totalfares"]),
    ("daily_miles", &["daily_miles", "totalmileage"]),
];

#[derive(Debug, Deserialize)]
struct RawRow {
    dyear: String,
    group: String,
    var: String,
    daily_fare: f64,
    daily_miles: f64,
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("TLC_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/tlc_data.csv")
}

pub async fn load_table(path: &Path) -> Result<TripTable, DataError> {
    let bytes = fs::read(path).await.map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = parse_table(bytes.as_slice())?;
    info!(rows = table.len(), path = %path.display(), "loaded trip summary");
    Ok(table)
}

pub fn parse_table<R: Read>(reader: R) -> Result<TripTable, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = normalize_headers(csv_reader.headers()?)?;
    csv_reader.set_headers(headers);

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (index, result) in csv_reader.deserialize::<RawRow>().enumerate() {
        let row = index + 1;
        let raw = result?;
        let record = to_record(row, raw)?;

        let key = (record.var, record.category_date, record.group.clone());
        if !seen.insert(key) {
            return Err(DataError::DuplicateRow {
                row,
                var: record.var.to_string(),
                group: record.group,
                date: record.category_date.to_string(),
            });
        }
        rows.push(record);
    }

    debug!(rows = rows.len(), "parsed trip summary rows");
    Ok(TripTable::new(rows))
}

/// Renames the preferred header of each required column to its canonical name.
/// Lower-priority alternates present alongside it are renamed out of the way
/// so they are ignored like any other extra column.
fn normalize_headers(headers: &StringRecord) -> Result<StringRecord, DataError> {
    let mut names: Vec<String> = headers.iter().map(str::to_string).collect();
    for (column, accepted) in REQUIRED_COLUMNS {
        let chosen = accepted
            .iter()
            .find_map(|name| headers.iter().position(|header| header == *name))
            .ok_or(DataError::MissingColumn(column))?;
        for (index, header) in headers.iter().enumerate() {
            if index != chosen && accepted.contains(&header) {
                names[index] = format!("unused:{header}");
            }
        }
        names[chosen] = column.to_string();
    }
    Ok(StringRecord::from(names))
}

fn to_record(row: usize, raw: RawRow) -> Result<TripRecord, DataError> {
    let category_date = parse_date(&raw.dyear).ok_or_else(|| DataError::InvalidDate {
        row,
        value: raw.dyear.clone(),
    })?;
    let var = GroupingVar::parse(&raw.var).ok_or_else(|| DataError::UnknownVar {
        row,
        value: raw.var.clone(),
    })?;
    if !raw.daily_fare.is_finite() {
        return Err(DataError::NonFinite { row, column: "daily_fare" });
    }
    if !raw.daily_miles.is_finite() {
        return Err(DataError::NonFinite { row, column: "daily_miles" });
    }

    Ok(TripRecord {
        category_date,
        group: raw.group,
        var,
        daily_fare: raw.daily_fare,
        daily_miles: raw.daily_miles,
    })
}

// Upstream exports sometimes carry a midnight time component.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}
