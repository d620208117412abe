use std::collections::{BTreeMap, BTreeSet};

use super::model::{COUNTY_COLUMN, RowTable};

// ---------------------------------------------------------------------------
// View models – three independent projections of the filtered table
// ---------------------------------------------------------------------------
//
// Each builder is pure: it reads the table and the chosen metric, produces a
// fresh view model, and never mutates its input.  Rows whose metric cell is
// missing or non-numeric are skipped by every builder alike, so the three
// views always describe the same subset.

/// Per-county metric totals for the bar chart, sorted by county name.
#[derive(Debug, Clone, PartialEq)]
pub struct BarAggregate {
    pub bars: Vec<(String, f64)>,
}

/// Group rows by county and sum the metric per group.
pub fn bar_aggregate(table: &RowTable, metric: &str) -> BarAggregate {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in &table.rows {
        let Some(county) = row.get(COUNTY_COLUMN) else {
            continue;
        };
        let Some(value) = row.get(metric).and_then(|v| v.as_f64()) else {
            continue;
        };
        *totals.entry(county.to_string()).or_insert(0.0) += value;
    }
    BarAggregate {
        bars: totals.into_iter().collect(),
    }
}

/// One plotted point of the trend chart: a single filtered row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub year: String,
    /// Index into [`TrendSeries::years`], used as the x coordinate.
    pub year_index: usize,
    pub county: String,
    pub value: f64,
}

/// The trend view: one point per (year, county) row actually present.
/// Duplicate (year, county) pairs are kept as-is, not re-aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    /// Distinct years in order of first appearance; the playback axis.
    pub years: Vec<String>,
    /// Points in table row order.
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Sorted distinct county names, for per-line colors and legend order.
    pub fn counties(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.points.iter().map(|p| p.county.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }
}

pub fn trend_series(table: &RowTable, metric: &str) -> TrendSeries {
    let mut years: Vec<String> = Vec::new();
    let mut points = Vec::new();

    for row in &table.rows {
        let Some(county) = row.get(COUNTY_COLUMN) else {
            continue;
        };
        let Some(value) = row.get(metric).and_then(|v| v.as_f64()) else {
            continue;
        };
        let year_index = match years.iter().position(|y| y == &row.year) {
            Some(i) => i,
            None => {
                years.push(row.year.clone());
                years.len() - 1
            }
        };
        points.push(TrendPoint {
            year: row.year.clone(),
            year_index,
            county: county.to_string(),
            value,
        });
    }

    TrendSeries { years, points }
}

/// Year × county matrix for the heatmap.  Missing (year, county)
/// combinations are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    /// Row labels, sorted.
    pub years: Vec<String>,
    /// Column labels, sorted.
    pub counties: Vec<String>,
    /// `values[year_idx][county_idx]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl PivotMatrix {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() || self.counties.is_empty()
    }

    /// Min and max over the populated cells, for the color scale.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for v in self.values.iter().flatten().flatten() {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
                None => (*v, *v),
            });
        }
        range
    }
}

/// Pivot the table into a year × county matrix of metric values.
///
/// Duplicate (year, county) pairs resolve last-write-wins in table row
/// order; the input is normally one row per pair.
pub fn pivot_matrix(table: &RowTable, metric: &str) -> PivotMatrix {
    let mut year_set: BTreeSet<String> = BTreeSet::new();
    let mut county_set: BTreeSet<String> = BTreeSet::new();
    for row in &table.rows {
        if let Some(county) = row.get(COUNTY_COLUMN) {
            year_set.insert(row.year.clone());
            county_set.insert(county.to_string());
        }
    }
    let years: Vec<String> = year_set.into_iter().collect();
    let counties: Vec<String> = county_set.into_iter().collect();

    let mut values = vec![vec![None; counties.len()]; years.len()];
    for row in &table.rows {
        let Some(county) = row.get(COUNTY_COLUMN).map(|v| v.to_string()) else {
            continue;
        };
        let Some(value) = row.get(metric).and_then(|v| v.as_f64()) else {
            continue;
        };
        let yi = years.iter().position(|y| y == &row.year).unwrap();
        let ci = counties.iter().position(|c| *c == county).unwrap();
        values[yi][ci] = Some(value);
    }

    PivotMatrix {
        years,
        counties,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Row};
    use std::collections::BTreeMap;

    fn row(year: &str, county: &str, cases: f64) -> Row {
        let mut cells: BTreeMap<String, CellValue> = BTreeMap::new();
        cells.insert("name".into(), CellValue::String(county.into()));
        cells.insert("cases".into(), CellValue::Float(cases));
        Row {
            year: year.to_string(),
            cells,
        }
    }

    /// Filtered table of the reference scenario: sheets 2020/2021, state CA,
    /// counties Alpha/Beta, metric "cases".
    fn sample_table() -> RowTable {
        RowTable::from_rows(vec![
            row("2020", "Alpha", 10.0),
            row("2020", "Beta", 5.0),
            row("2021", "Alpha", 12.0),
            row("2021", "Beta", 7.0),
        ])
    }

    #[test]
    fn bar_aggregate_sums_per_county() {
        let bars = bar_aggregate(&sample_table(), "cases").bars;
        assert_eq!(
            bars,
            vec![("Alpha".to_string(), 22.0), ("Beta".to_string(), 12.0)]
        );
    }

    #[test]
    fn bar_aggregate_conserves_the_metric_total() {
        let table = sample_table();
        let bar_total: f64 = bar_aggregate(&table, "cases")
            .bars
            .iter()
            .map(|(_, v)| v)
            .sum();
        let row_total: f64 = table
            .rows
            .iter()
            .filter_map(|r| r.get("cases").and_then(|v| v.as_f64()))
            .sum();
        assert_eq!(bar_total, row_total);
    }

    #[test]
    fn trend_has_one_point_per_row() {
        let series = trend_series(&sample_table(), "cases");
        assert_eq!(series.points.len(), 4);
        assert_eq!(series.years, vec!["2020", "2021"]);
        assert_eq!(series.counties(), vec!["Alpha", "Beta"]);
        assert_eq!(series.points[0].year_index, 0);
        assert_eq!(series.points[2].year_index, 1);
        assert_eq!(series.points[3].value, 7.0);
    }

    #[test]
    fn trend_keeps_duplicate_year_county_pairs() {
        let table = RowTable::from_rows(vec![
            row("2020", "Alpha", 1.0),
            row("2020", "Alpha", 2.0),
        ]);
        let series = trend_series(&table, "cases");
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].value, 1.0);
        assert_eq!(series.points[1].value, 2.0);
    }

    #[test]
    fn pivot_matches_reference_matrix() {
        let pivot = pivot_matrix(&sample_table(), "cases");
        assert_eq!(pivot.years, vec!["2020", "2021"]);
        assert_eq!(pivot.counties, vec!["Alpha", "Beta"]);
        assert_eq!(
            pivot.values,
            vec![
                vec![Some(10.0), Some(5.0)],
                vec![Some(12.0), Some(7.0)],
            ]
        );
        assert_eq!(pivot.value_range(), Some((5.0, 12.0)));
    }

    #[test]
    fn pivot_duplicates_resolve_last_write_wins() {
        let table = RowTable::from_rows(vec![
            row("2020", "Alpha", 1.0),
            row("2020", "Alpha", 9.0),
        ]);
        let pivot = pivot_matrix(&table, "cases");
        assert_eq!(pivot.values, vec![vec![Some(9.0)]]);
    }

    #[test]
    fn pivot_leaves_missing_combinations_empty() {
        let table = RowTable::from_rows(vec![
            row("2020", "Alpha", 1.0),
            row("2021", "Beta", 2.0),
        ]);
        let pivot = pivot_matrix(&table, "cases");
        assert_eq!(pivot.values[0], vec![Some(1.0), None]);
        assert_eq!(pivot.values[1], vec![None, Some(2.0)]);
    }

    #[test]
    fn non_numeric_metric_cells_are_skipped_everywhere() {
        let mut bad = row("2020", "Alpha", 0.0);
        bad.cells
            .insert("cases".into(), CellValue::String("n/a".into()));
        let table = RowTable::from_rows(vec![bad, row("2020", "Beta", 3.0)]);

        assert_eq!(
            bar_aggregate(&table, "cases").bars,
            vec![("Beta".to_string(), 3.0)]
        );
        assert_eq!(trend_series(&table, "cases").points.len(), 1);
        let pivot = pivot_matrix(&table, "cases");
        assert_eq!(pivot.values, vec![vec![None, Some(3.0)]]);
    }
}
