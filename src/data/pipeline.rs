use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{
    COUNTY_COLUMN, RESERVED_COLUMNS, Row, RowTable, STATE_COLUMN, Workbook, YEAR_COLUMN,
};

// ---------------------------------------------------------------------------
// Selection – the per-run filter state
// ---------------------------------------------------------------------------

/// Everything the sidebar widgets have chosen, passed by reference into the
/// pipeline on every run.  No hidden state: two runs with equal selections
/// over the same workbook produce equal outputs.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Selected sheet names, in selection order.
    pub sheets: Vec<String>,
    /// Selected state value; `None` means no state filtering.
    pub state: Option<String>,
    /// Selected county names; `None` means "all counties".
    pub counties: Option<BTreeSet<String>>,
    /// Chosen metric column.
    pub metric: Option<String>,
}

// ---------------------------------------------------------------------------
// PipelineHalt – user-facing stop conditions
// ---------------------------------------------------------------------------

/// How a halt should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A terminal, user-visible stop for one pipeline run.  Never fatal to the
/// process: the next interaction simply re-runs the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineHalt {
    #[error("Please select at least one sheet.")]
    NoSheetsSelected,

    #[error("The dataset does not contain a 'name' column for counties.")]
    MissingCountyColumn,

    #[error("No data available for the selected filters. Please adjust your selections.")]
    NoRowsForSelection,

    #[error("No valid metrics are available in the dataset.")]
    NoMetricsAvailable,

    #[error("Please select a valid metric.")]
    NoMetricSelected,
}

impl PipelineHalt {
    pub fn severity(&self) -> Severity {
        match self {
            // The missing county column is the one hard error; everything
            // else is a nudge to adjust the selection.
            PipelineHalt::MissingCountyColumn => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Concatenate the selected sheets into one table, tagging every row with
/// its source sheet name as the year.  Sheets are taken in selection order;
/// within a sheet, file row order is preserved.
///
/// A literal `Year` column in the source data is dropped: the synthesized
/// year always wins.
pub fn combine_sheets(workbook: &Workbook, selected: &[String]) -> RowTable {
    let mut rows = Vec::new();
    for sheet_name in selected {
        let Some(sheet) = workbook.sheet(sheet_name) else {
            continue;
        };
        for cells in &sheet.rows {
            let mut cells = cells.clone();
            cells.remove(YEAR_COLUMN);
            rows.push(Row {
                year: sheet_name.clone(),
                cells,
            });
        }
    }
    RowTable::from_rows(rows)
}

/// Keep only rows whose `state_abbreviation` equals the selected value.
/// Skipped silently when the column is absent or no value is selected.
pub fn state_filter(table: RowTable, state: Option<&str>) -> RowTable {
    let Some(state) = state else {
        return table;
    };
    if !table.has_column(STATE_COLUMN) {
        return table;
    }
    retain_rows(table, |row| {
        row.get(STATE_COLUMN)
            .is_some_and(|v| v.to_string() == state)
    })
}

/// Keep only rows whose county `name` is in the selected set.
/// `None` means all counties are selected.
pub fn county_filter(table: RowTable, counties: Option<&BTreeSet<String>>) -> RowTable {
    let Some(counties) = counties else {
        return table;
    };
    retain_rows(table, |row| {
        row.get(COUNTY_COLUMN)
            .is_some_and(|v| counties.contains(&v.to_string()))
    })
}

/// Candidate metric columns: everything except the reserved set.
pub fn available_metrics(table: &RowTable) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| !RESERVED_COLUMNS.contains(&c.as_str()))
        .cloned()
        .collect()
}

fn retain_rows(table: RowTable, keep: impl Fn(&Row) -> bool) -> RowTable {
    // Filtering keeps the column set: an emptied column is still a column,
    // matching the source-table semantics downstream stages expect.
    RowTable {
        rows: table.rows.into_iter().filter(|r| keep(r)).collect(),
        columns: table.columns,
    }
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

/// The filtered table plus the metric all three views will project.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub table: RowTable,
    pub metric: String,
}

/// Run the whole chain: combine, state filter, county filter, metric
/// selection.  Each halt maps to exactly one user-facing message.
pub fn run_pipeline(
    workbook: &Workbook,
    selection: &Selection,
) -> Result<PipelineOutput, PipelineHalt> {
    if selection.sheets.is_empty() {
        return Err(PipelineHalt::NoSheetsSelected);
    }

    let table = combine_sheets(workbook, &selection.sheets);
    let table = state_filter(table, selection.state.as_deref());

    // Missing state column degrades silently above; a missing county column
    // is a hard stop.  Asymmetric on purpose.
    if !table.has_column(COUNTY_COLUMN) {
        return Err(PipelineHalt::MissingCountyColumn);
    }
    let table = county_filter(table, selection.counties.as_ref());

    if table.is_empty() {
        return Err(PipelineHalt::NoRowsForSelection);
    }

    let metrics = available_metrics(&table);
    if metrics.is_empty() {
        return Err(PipelineHalt::NoMetricsAvailable);
    }

    let metric = selection
        .metric
        .as_ref()
        .filter(|m| metrics.contains(*m))
        .ok_or(PipelineHalt::NoMetricSelected)?;

    Ok(PipelineOutput {
        table,
        metric: metric.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Sheet};
    use std::collections::BTreeMap;

    fn cells(entries: &[(&str, CellValue)]) -> BTreeMap<String, CellValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn county_row(state: &str, name: &str, cases: i64) -> BTreeMap<String, CellValue> {
        cells(&[
            ("state_abbreviation", CellValue::String(state.into())),
            ("name", CellValue::String(name.into())),
            ("cases", CellValue::Integer(cases)),
        ])
    }

    /// The two-sheet workbook from the dashboard's reference scenario.
    fn sample_workbook() -> Workbook {
        Workbook {
            sheets: vec![
                Sheet {
                    name: "2020".into(),
                    columns: vec!["state_abbreviation".into(), "name".into(), "cases".into()],
                    rows: vec![county_row("CA", "Alpha", 10), county_row("CA", "Beta", 5)],
                },
                Sheet {
                    name: "2021".into(),
                    columns: vec!["state_abbreviation".into(), "name".into(), "cases".into()],
                    rows: vec![county_row("CA", "Alpha", 12), county_row("CA", "Beta", 7)],
                },
            ],
        }
    }

    fn all_selected() -> Selection {
        Selection {
            sheets: vec!["2020".into(), "2021".into()],
            state: Some("CA".into()),
            counties: None,
            metric: Some("cases".into()),
        }
    }

    #[test]
    fn combiner_tags_rows_with_sheet_name() {
        let wb = sample_workbook();
        let table = combine_sheets(&wb, &["2020".into(), "2021".into()]);

        assert_eq!(table.len(), 4);
        assert_eq!(table.rows[0].year, "2020");
        assert_eq!(table.rows[1].year, "2020");
        assert_eq!(table.rows[2].year, "2021");
        assert_eq!(table.rows[3].year, "2021");
    }

    #[test]
    fn combiner_respects_selection_order() {
        let wb = sample_workbook();
        let table = combine_sheets(&wb, &["2021".into(), "2020".into()]);
        assert_eq!(table.rows[0].year, "2021");
        assert_eq!(table.rows[2].year, "2020");
    }

    #[test]
    fn combiner_overrides_literal_year_column() {
        let wb = Workbook {
            sheets: vec![Sheet {
                name: "2020".into(),
                columns: vec!["Year".into(), "name".into()],
                rows: vec![cells(&[
                    ("Year", CellValue::String("1999".into())),
                    ("name", CellValue::String("Alpha".into())),
                ])],
            }],
        };
        let table = combine_sheets(&wb, &["2020".into()]);
        assert_eq!(table.rows[0].year, "2020");
        assert!(table.rows[0].get("Year").is_none());
    }

    #[test]
    fn state_filter_keeps_matching_rows_in_order() {
        let wb = Workbook {
            sheets: vec![Sheet {
                name: "2020".into(),
                columns: vec![],
                rows: vec![
                    county_row("CA", "Alpha", 1),
                    county_row("NY", "Kings", 2),
                    county_row("CA", "Beta", 3),
                ],
            }],
        };
        let table = combine_sheets(&wb, &["2020".into()]);
        let filtered = state_filter(table, Some("CA"));

        assert_eq!(filtered.len(), 2);
        assert_eq!(
            filtered.rows[0].get("name"),
            Some(&CellValue::String("Alpha".into()))
        );
        assert_eq!(
            filtered.rows[1].get("name"),
            Some(&CellValue::String("Beta".into()))
        );
    }

    #[test]
    fn state_filter_skips_silently_without_column() {
        let wb = Workbook {
            sheets: vec![Sheet {
                name: "2020".into(),
                columns: vec![],
                rows: vec![cells(&[("name", CellValue::String("Alpha".into()))])],
            }],
        };
        let table = combine_sheets(&wb, &["2020".into()]);
        let filtered = state_filter(table, Some("CA"));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn county_filter_intersects_selection_with_present_values() {
        let wb = sample_workbook();
        let table = combine_sheets(&wb, &["2020".into(), "2021".into()]);
        let selected: BTreeSet<String> =
            ["Alpha".to_string(), "Gamma".to_string()].into_iter().collect();
        let filtered = county_filter(table, Some(&selected));

        let names: BTreeSet<String> = filtered
            .rows
            .iter()
            .filter_map(|r| r.get("name").map(|v| v.to_string()))
            .collect();
        assert_eq!(names, ["Alpha".to_string()].into_iter().collect());
    }

    #[test]
    fn halts_without_sheet_selection() {
        let wb = sample_workbook();
        let selection = Selection::default();
        assert_eq!(
            run_pipeline(&wb, &selection),
            Err(PipelineHalt::NoSheetsSelected)
        );
    }

    #[test]
    fn halts_hard_without_county_column() {
        let wb = Workbook {
            sheets: vec![Sheet {
                name: "2020".into(),
                columns: vec!["cases".into()],
                rows: vec![cells(&[("cases", CellValue::Integer(1))])],
            }],
        };
        let selection = Selection {
            sheets: vec!["2020".into()],
            ..Selection::default()
        };
        let halt = run_pipeline(&wb, &selection).unwrap_err();
        assert_eq!(halt, PipelineHalt::MissingCountyColumn);
        assert_eq!(halt.severity(), Severity::Error);
    }

    #[test]
    fn halts_when_filters_leave_no_rows() {
        let wb = sample_workbook();
        let selection = Selection {
            state: Some("TX".into()),
            ..all_selected()
        };
        assert_eq!(
            run_pipeline(&wb, &selection),
            Err(PipelineHalt::NoRowsForSelection)
        );
    }

    #[test]
    fn halts_when_no_metric_columns_exist() {
        let wb = Workbook {
            sheets: vec![Sheet {
                name: "2020".into(),
                columns: vec!["name".into()],
                rows: vec![cells(&[("name", CellValue::String("Alpha".into()))])],
            }],
        };
        let selection = Selection {
            sheets: vec!["2020".into()],
            ..Selection::default()
        };
        assert_eq!(
            run_pipeline(&wb, &selection),
            Err(PipelineHalt::NoMetricsAvailable)
        );
    }

    #[test]
    fn halts_until_a_metric_is_chosen() {
        let wb = sample_workbook();
        let selection = Selection {
            metric: None,
            ..all_selected()
        };
        let halt = run_pipeline(&wb, &selection).unwrap_err();
        assert_eq!(halt, PipelineHalt::NoMetricSelected);
        assert_eq!(halt.severity(), Severity::Warning);
    }

    #[test]
    fn stale_metric_name_counts_as_unselected() {
        let wb = sample_workbook();
        let selection = Selection {
            metric: Some("deaths".into()),
            ..all_selected()
        };
        assert_eq!(
            run_pipeline(&wb, &selection),
            Err(PipelineHalt::NoMetricSelected)
        );
    }

    #[test]
    fn full_run_produces_filtered_table_and_metric() {
        let wb = sample_workbook();
        let out = run_pipeline(&wb, &all_selected()).unwrap();
        assert_eq!(out.metric, "cases");
        assert_eq!(out.table.len(), 4);
        assert!(out.table.rows.iter().all(|r| {
            r.get("state_abbreviation") == Some(&CellValue::String("CA".into()))
        }));
    }

    #[test]
    fn combined_row_count_is_sum_of_selected_sheets() {
        let wb = sample_workbook();
        for sheets in [vec!["2020".to_string()], vec!["2020".into(), "2021".into()]] {
            let expected: usize = sheets
                .iter()
                .map(|s| wb.sheet(s).map(Sheet::len).unwrap_or(0))
                .sum();
            assert_eq!(combine_sheets(&wb, &sheets).len(), expected);
        }
    }
}
