use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Synthesized column carrying the source sheet name.
pub const YEAR_COLUMN: &str = "Year";
/// Optional state column; its presence enables the state filter.
pub const STATE_COLUMN: &str = "state_abbreviation";
/// County identifier column; required by the county filter.
pub const COUNTY_COLUMN: &str = "name";

/// Columns that can never be chosen as a metric.
pub const RESERVED_COLUMNS: [&str; 3] = [YEAR_COLUMN, STATE_COLUMN, COUNTY_COLUMN];

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the spreadsheet dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date/time string kept as text for simplicity.
    DateTime(String),
    Empty,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Empty => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                DateTime(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Empty, Empty) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::DateTime(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Empty => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(d) => write!(f, "{d}"),
            CellValue::Empty => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet / Workbook – the parsed upload
// ---------------------------------------------------------------------------

/// One named sheet of the uploaded workbook: a header row plus cell rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    /// Header columns in file order.
    pub columns: Vec<String>,
    /// Rows in file order; cells keyed by column name, empty cells omitted.
    pub rows: Vec<BTreeMap<String, CellValue>>,
}

impl Sheet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The full parsed workbook. Replaced wholesale when a new file is opened.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

// ---------------------------------------------------------------------------
// RowTable – the combined, filterable working table
// ---------------------------------------------------------------------------

/// One row of the combined table. `year` is synthesized from the source
/// sheet name and present on every row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub year: String,
    pub cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

/// The working dataset after sheet combination (and later, filtering),
/// with the sorted union of cell column names precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTable {
    pub rows: Vec<Row>,
    /// Sorted union of cell column names across rows (excludes `year`).
    pub columns: Vec<String>,
}

impl RowTable {
    /// Build the column index from a set of rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut column_set: BTreeSet<String> = BTreeSet::new();
        for row in &rows {
            for col in row.cells.keys() {
                column_set.insert(col.clone());
            }
        }
        RowTable {
            rows,
            columns: column_set.into_iter().collect(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Sorted distinct values of a column across all rows.
    pub fn distinct_values(&self, column: &str) -> Vec<CellValue> {
        let set: BTreeSet<CellValue> = self
            .rows
            .iter()
            .filter_map(|r| r.get(column).cloned())
            .collect();
        set.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
