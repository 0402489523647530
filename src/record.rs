use anyhow::{bail, Context, Result};
use log::debug;
use serde::Deserialize;
use serde_with::DeserializeFromStr;

use std::{
    convert::Infallible,
    fmt::Display,
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Cell contents that count as a missing value: the usual "not available"
/// markers written by spreadsheets and data tools.
const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reports whether a raw CSV field should be treated as missing.
///
/// A field is missing if it is empty or exactly one of the usual "not
/// available" markers such as `N/A` or `NaN`. Matching is exact, so a
/// whitespace-only cell, or a marker with surrounding spaces, is a value.
///
/// ```
/// # use vgsales::record::is_missing;
/// assert!(is_missing(""));
/// assert!(is_missing("N/A"));
/// assert!(!is_missing(" N/A "));
/// assert!(!is_missing("Nintendo"));
/// ```
#[must_use]
pub fn is_missing(field: &str) -> bool {
    NA_MARKERS.contains(&field)
}

/// A single CSV cell, which may be missing.
#[derive(Clone, Debug, DeserializeFromStr, Eq, PartialEq)]
pub enum Field {
    Missing,
    Value(String),
}

impl Field {
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Missing => None,
            Self::Value(s) => Some(s),
        }
    }
}

impl FromStr for Field {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if is_missing(s) {
            Ok(Self::Missing)
        } else {
            Ok(Self::Value(s.to_string()))
        }
    }
}

/// Wraps a present value as a field, in its CSV text form.
fn present(value: impl Display) -> Field {
    Field::Value(value.to_string())
}

/// Defines the CSV format for video game sales data, before cleaning.
///
/// Columns are matched by header name; any others (such as `Rank`) are
/// ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawRecord {
    #[serde(rename = "Name")]
    pub name: Field,
    #[serde(rename = "Platform")]
    pub platform: Field,
    #[serde(rename = "Year", alias = "Year_of_Release")]
    pub year: Field,
    #[serde(rename = "Genre")]
    pub genre: Field,
    #[serde(rename = "Publisher")]
    pub publisher: Field,
    #[serde(rename = "NA_Sales")]
    pub na_sales: Field,
    #[serde(rename = "EU_Sales")]
    pub eu_sales: Field,
    #[serde(rename = "JP_Sales")]
    pub jp_sales: Field,
    #[serde(rename = "Other_Sales")]
    pub other_sales: Field,
    #[serde(rename = "Global_Sales")]
    pub global_sales: Field,
}

impl RawRecord {
    /// Reports whether every field has a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.platform,
            &self.year,
            &self.genre,
            &self.publisher,
            &self.na_sales,
            &self.eu_sales,
            &self.jp_sales,
            &self.other_sales,
            &self.global_sales,
        ]
        .iter()
        .all(|f| f.value().is_some())
    }
}

impl From<&Record> for RawRecord {
    fn from(r: &Record) -> Self {
        Self {
            name: present(&r.name),
            platform: present(&r.platform),
            year: present(r.year),
            genre: present(&r.genre),
            publisher: present(&r.publisher),
            na_sales: present(r.na_sales),
            eu_sales: present(r.eu_sales),
            jp_sales: present(r.jp_sales),
            other_sales: present(r.other_sales),
            global_sales: present(r.global_sales),
        }
    }
}

/// One game's release on one platform, with every field present.
///
/// Sales figures are in millions of units.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub name: String,
    pub platform: String,
    pub year: i32,
    pub genre: String,
    pub publisher: String,
    pub na_sales: f64,
    pub eu_sales: f64,
    pub jp_sales: f64,
    pub other_sales: f64,
    pub global_sales: f64,
}

impl TryFrom<RawRecord> for Record {
    type Error = anyhow::Error;

    /// Converts a complete raw record.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is missing, or if the year or a sales
    /// figure is not a number.
    fn try_from(raw: RawRecord) -> Result<Self> {
        Ok(Self {
            name: text(raw.name, "Name")?,
            platform: text(raw.platform, "Platform")?,
            year: parse_year(&text(raw.year, "Year")?)?,
            genre: text(raw.genre, "Genre")?,
            publisher: text(raw.publisher, "Publisher")?,
            na_sales: parse_sales(&text(raw.na_sales, "NA_Sales")?)?,
            eu_sales: parse_sales(&text(raw.eu_sales, "EU_Sales")?)?,
            jp_sales: parse_sales(&text(raw.jp_sales, "JP_Sales")?)?,
            other_sales: parse_sales(&text(raw.other_sales, "Other_Sales")?)?,
            global_sales: parse_sales(&text(raw.global_sales, "Global_Sales")?)?,
        })
    }
}

fn text(field: Field, column: &str) -> Result<String> {
    match field {
        Field::Value(s) => Ok(s),
        Field::Missing => bail!("missing value in column {column}"),
    }
}

/// Parses a release year, accepting integral floats such as `2006.0`.
fn parse_year(s: &str) -> Result<i32> {
    let s = s.trim();
    if let Ok(year) = s.parse::<i32>() {
        return Ok(year);
    }
    let year: f64 = s.parse().with_context(|| format!("bad year {s:?}"))?;
    if year.fract() != 0.0 || year < f64::from(i32::MIN) || year > f64::from(i32::MAX) {
        bail!("bad year {s:?}");
    }
    Ok(year as i32)
}

fn parse_sales(s: &str) -> Result<f64> {
    let s = s.trim();
    s.parse().with_context(|| format!("bad sales figure {s:?}"))
}

/// Drops every raw record with a missing field and converts the rest.
///
/// Returns the clean records, in input order, and the number of rows dropped.
///
/// # Errors
///
/// Returns an error if a complete row holds an unparseable number.
pub fn clean(rows: impl IntoIterator<Item = RawRecord>) -> Result<(Vec<Record>, usize)> {
    let mut records = Vec::new();
    let mut dropped = 0;
    for raw in rows {
        if raw.is_complete() {
            records.push(Record::try_from(raw)?);
        } else {
            dropped += 1;
        }
    }
    Ok((records, dropped))
}

/// The input file could not be found.
#[derive(Debug)]
pub struct InputMissing(pub PathBuf);

impl Display for InputMissing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' not found.", self.0.display())
    }
}

impl std::error::Error for InputMissing {}

/// Holds the cleaned sales records for a run.
///
/// To load a CSV file, use [`Dataset::from_path`].
#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<Record>,
    dropped: usize,
}

impl Dataset {
    /// Reads and cleans the sales data in the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InputMissing`] if there is no file at `path`, and any other
    /// error from opening, parsing, or converting the CSV data.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(InputMissing(path.to_path_buf()).into())
            }
            Err(e) => return Err(e).with_context(|| format!("{}", path.display())),
        };
        Self::from_reader(file).with_context(|| format!("{}", path.display()))
    }

    /// Reads and cleans CSV sales data from `reader`.
    ///
    /// # Errors
    ///
    /// Returns any errors from parsing or converting the CSV data.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let rows = rdr
            .deserialize::<RawRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        let read = rows.len();
        let (records, dropped) = clean(rows)?;
        debug!("read {read} rows, kept {}, dropped {dropped}", records.len());
        Ok(Self { records, dropped })
    }

    /// Creates a dataset from records that are already clean.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            dropped: 0,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the number of rows dropped for having a missing value.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
