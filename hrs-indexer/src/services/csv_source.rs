//! CSV review dataset loader
//!
//! Reads the hotel review dataset (one row per review, hotel fields repeated
//! on every row). Only rows whose `categories` column equals `Hotels` are
//! kept. Empty cells and the usual NA spellings become `RawValue::Absent`.
//!
//! A missing dataset file yields no rows. A file that exists but cannot be
//! read or parsed is an error.

use async_trait::async_trait;
use csv::StringRecord;
use std::path::{Path, PathBuf};

use crate::models::{RawReviewRow, RawValue};
use crate::services::review_builder;
use crate::types::{ReviewSource, SourceError};

/// Category value identifying hotel rows
pub const HOTEL_CATEGORY: &str = "Hotels";

/// Cell values treated as missing, besides the empty string
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Column index of every field the loader reads
struct ColumnMap {
    categories: Option<usize>,
    name: Option<usize>,
    city: Option<usize>,
    country: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    postal_code: Option<usize>,
    date: Option<usize>,
    date_added: Option<usize>,
    rating: Option<usize>,
    text: Option<usize>,
    title: Option<usize>,
    user_city: Option<usize>,
    username: Option<usize>,
    user_province: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |column: &str| headers.iter().position(|h| h.trim() == column);
        Self {
            categories: find("categories"),
            name: find("name"),
            city: find("city"),
            country: find("country"),
            latitude: find("latitude"),
            longitude: find("longitude"),
            postal_code: find("postalCode"),
            date: find("reviews.date"),
            date_added: find("reviews.dateAdded"),
            rating: find("reviews.rating"),
            text: find("reviews.text"),
            title: find("reviews.title"),
            user_city: find("reviews.userCity"),
            username: find("reviews.username"),
            user_province: find("reviews.userProvince"),
        }
    }

    fn row(&self, record: &StringRecord) -> RawReviewRow {
        let cell = |idx: Option<usize>| raw_cell(idx.and_then(|i| record.get(i)));
        RawReviewRow {
            name: cell(self.name),
            city: cell(self.city),
            country: cell(self.country),
            latitude: cell(self.latitude),
            longitude: cell(self.longitude),
            postal_code: cell(self.postal_code),
            date: cell(self.date),
            date_added: cell(self.date_added),
            rating: cell(self.rating),
            text: cell(self.text),
            title: cell(self.title),
            user_city: cell(self.user_city),
            username: cell(self.username),
            user_province: cell(self.user_province),
        }
    }
}

fn raw_cell(cell: Option<&str>) -> RawValue {
    match cell {
        Some(v) if !v.is_empty() && !MISSING_MARKERS.contains(&v) => RawValue::present(v),
        _ => RawValue::Absent,
    }
}

/// Parse dataset rows from a file, keeping hotel rows (optionally one hotel)
pub fn read_rows(path: &Path, hotel_name: Option<&str>) -> Result<Vec<RawReviewRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| SourceError::Parse(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| SourceError::Parse(e.to_string()))?
        .clone();
    let columns = ColumnMap::from_headers(&headers);

    if columns.categories.is_none() {
        tracing::warn!(path = %path.display(), "Dataset has no categories column, keeping every row");
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(i) = columns.categories {
            if record.get(i) != Some(HOTEL_CATEGORY) {
                skipped += 1;
                continue;
            }
        }

        let row = columns.row(&record);
        // Same name rule as grouping, so nameless rows are reachable as "Other"
        if let Some(wanted) = hotel_name {
            if review_builder::hotel_name(&row) != wanted {
                continue;
            }
        }
        rows.push(row);
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        non_hotel_rows = skipped,
        hotel = hotel_name.unwrap_or("*"),
        "Loaded review dataset"
    );

    Ok(rows)
}

pub struct CsvReviewSource {
    path: PathBuf,
}

impl CsvReviewSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReviewSource for CsvReviewSource {
    async fn load(&self, hotel_name: Option<&str>) -> Result<Vec<RawReviewRow>, SourceError> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "Review dataset not found, nothing to load");
            return Ok(Vec::new());
        }

        let path = self.path.clone();
        let hotel_name = hotel_name.map(str::to_string);

        // CSV parsing is blocking file I/O
        tokio::task::spawn_blocking(move || read_rows(&path, hotel_name.as_deref()))
            .await
            .map_err(|e| SourceError::Internal(format!("Dataset load task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "address,categories,city,country,latitude,longitude,name,postalCode,province,reviews.date,reviews.dateAdded,reviews.doRecommend,reviews.id,reviews.rating,reviews.text,reviews.title,reviews.userCity,reviews.username,reviews.userProvince";

    fn dataset(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_reads_hotel_rows_only() {
        let file = dataset(&[
            "Riviera San Nicol 11/a,Hotels,Mableton,US,45.421611,12.376187,Hotel Russo Palace,30126,GA,2013-09-22T00:00:00Z,2016-10-24T00:00:25Z,,,4.0,Pleasant 10 min walk,Good location,,Russ (kent),",
            "1 Main St,Restaurants,Austin,US,30.2,-97.7,Taco Shack,78701,TX,2014-01-01T00:00:00Z,2016-10-24T00:00:25Z,,,5.0,Tasty,Yum,Austin,eater,TX",
        ]);

        let rows = read_rows(file.path(), None).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, RawValue::present("Hotel Russo Palace"));
        assert_eq!(row.postal_code, RawValue::present("30126"));
        assert_eq!(row.rating, RawValue::present("4.0"));
        assert_eq!(row.text, RawValue::present("Pleasant 10 min walk"));
        assert_eq!(row.user_city, RawValue::Absent);
        assert_eq!(row.user_province, RawValue::Absent);
    }

    #[test]
    fn test_filters_by_hotel_name() {
        let file = dataset(&[
            "a,Hotels,X,US,1,2,Alpha Inn,1,P,,,,,3,one,t,,u,",
            "a,Hotels,X,US,1,2,Beta Lodge,1,P,,,,,3,two,t,,u,",
            "a,Hotels,X,US,1,2,Alpha Inn,1,P,,,,,3,three,t,,u,",
        ]);

        let rows = read_rows(file.path(), Some("Alpha Inn")).unwrap();
        let texts: Vec<_> = rows.iter().map(|r| r.text.clone()).collect();
        assert_eq!(texts, vec![RawValue::present("one"), RawValue::present("three")]);

        assert!(read_rows(file.path(), Some("Gamma")).unwrap().is_empty());
    }

    #[test]
    fn test_quoted_text_with_commas_and_na_markers() {
        let file = dataset(&[
            "a,Hotels,X,US,NaN,2,Alpha Inn,N/A,P,,,,,3,\"Clean, quiet, \"\"cozy\"\"\",t,null,u,",
        ]);

        let rows = read_rows(file.path(), None).unwrap();

        assert_eq!(rows[0].text, RawValue::present("Clean, quiet, \"cozy\""));
        assert_eq!(rows[0].latitude, RawValue::Absent);
        assert_eq!(rows[0].postal_code, RawValue::Absent);
        assert_eq!(rows[0].user_city, RawValue::Absent);
    }

    #[test]
    fn test_nameless_rows_are_found_as_other() {
        let file = dataset(&[
            "a,Hotels,X,US,1,2,,1,P,,,,,3,one,t,,u,",
            "a,Hotels,X,US,1,2,Alpha Inn,1,P,,,,,3,two,t,,u,",
        ]);

        let rows = read_rows(file.path(), Some("Other")).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, RawValue::Absent);
        assert_eq!(rows[0].text, RawValue::present("one"));
    }

    #[test]
    fn test_missing_category_value_is_not_a_hotel() {
        let file = dataset(&["a,,X,US,1,2,Alpha Inn,1,P,,,,,3,one,t,,u,"]);
        assert!(read_rows(file.path(), None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let source = CsvReviewSource::new("/nonexistent/hrs/sample.csv");
        assert!(source.load(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_source_loads_through_blocking_task() {
        let file = dataset(&["a,Hotels,X,US,1,2,Alpha Inn,1,P,,,,,3,one,t,,u,"]);
        let source = CsvReviewSource::new(file.path());

        let rows = source.load(Some("Alpha Inn")).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
