use std::collections::BTreeSet;

use crate::data::model::{COUNTY_COLUMN, STATE_COLUMN, RowTable, Workbook};
use crate::data::pipeline::{Selection, available_metrics, combine_sheets, state_filter};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Trend-chart playback over the Year axis.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    pub playing: bool,
    /// Index of the last revealed year.
    pub cursor: usize,
    /// `egui` time of the last cursor advance, for frame pacing.
    pub last_advance: f64,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded workbook (None until user opens a file).
    pub workbook: Option<Workbook>,

    /// Current sidebar selections, fed into the pipeline each frame.
    pub selection: Selection,

    /// Trend-chart playback state.
    pub playback: Playback,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            workbook: None,
            selection: Selection::default(),
            playback: Playback::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly opened workbook and reset selections to the defaults:
    /// all sheets, no state, all counties, no metric.
    pub fn set_workbook(&mut self, workbook: Workbook) {
        self.selection = Selection {
            sheets: workbook.sheet_names(),
            state: None,
            counties: None,
            metric: None,
        };
        self.playback = Playback::default();
        self.workbook = Some(workbook);
        self.status_message = None;
    }

    /// The combined table for the current sheet selection, before filters.
    /// The sidebar derives its option lists from this.
    pub fn combined_table(&self) -> Option<RowTable> {
        self.workbook
            .as_ref()
            .map(|wb| combine_sheets(wb, &self.selection.sheets))
    }

    /// Distinct `state_abbreviation` values, or empty if the column is absent.
    pub fn state_options(&self, combined: &RowTable) -> Vec<String> {
        combined
            .distinct_values(STATE_COLUMN)
            .into_iter()
            .map(|v| v.to_string())
            .collect()
    }

    /// Distinct county names after the state filter, mirroring how the
    /// county widget narrows when a state is picked.
    pub fn county_options(&self, combined: &RowTable) -> Vec<String> {
        let table = state_filter(combined.clone(), self.selection.state.as_deref());
        table
            .distinct_values(COUNTY_COLUMN)
            .into_iter()
            .map(|v| v.to_string())
            .collect()
    }

    /// Candidate metric columns for the current sheet selection.
    pub fn metric_options(&self, combined: &RowTable) -> Vec<String> {
        available_metrics(combined)
    }

    // ---- Sheet selection -------------------------------------------------

    pub fn toggle_sheet(&mut self, sheet: &str) {
        if let Some(pos) = self.selection.sheets.iter().position(|s| s == sheet) {
            self.selection.sheets.remove(pos);
        } else {
            self.selection.sheets.push(sheet.to_string());
        }
        self.playback = Playback::default();
    }

    pub fn select_all_sheets(&mut self) {
        if let Some(wb) = &self.workbook {
            self.selection.sheets = wb.sheet_names();
        }
        self.playback = Playback::default();
    }

    pub fn select_no_sheets(&mut self) {
        self.selection.sheets.clear();
        self.playback = Playback::default();
    }

    // ---- County selection ------------------------------------------------

    /// Toggle one county.  `options` is the currently offered county list;
    /// the implicit "all" default is materialised on the first toggle.
    pub fn toggle_county(&mut self, county: &str, options: &[String]) {
        let selected = self
            .selection
            .counties
            .get_or_insert_with(|| options.iter().cloned().collect());
        if !selected.remove(county) {
            selected.insert(county.to_string());
        }
    }

    pub fn select_all_counties(&mut self) {
        // Back to the implicit default: every county present passes.
        self.selection.counties = None;
    }

    pub fn select_no_counties(&mut self) {
        self.selection.counties = Some(BTreeSet::new());
    }

    /// Whether a county is currently selected (the `None` default selects all).
    pub fn county_selected(&self, county: &str) -> bool {
        match &self.selection.counties {
            Some(set) => set.contains(county),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Sheet};
    use std::collections::BTreeMap;

    fn workbook() -> Workbook {
        let mut cells: BTreeMap<String, CellValue> = BTreeMap::new();
        cells.insert("state_abbreviation".into(), CellValue::String("CA".into()));
        cells.insert("name".into(), CellValue::String("Alpha".into()));
        cells.insert("cases".into(), CellValue::Integer(10));
        Workbook {
            sheets: vec![Sheet {
                name: "2020".into(),
                columns: vec!["state_abbreviation".into(), "name".into(), "cases".into()],
                rows: vec![cells],
            }],
        }
    }

    #[test]
    fn opening_a_workbook_defaults_to_all_sheets() {
        let mut state = AppState::default();
        state.set_workbook(workbook());
        assert_eq!(state.selection.sheets, vec!["2020"]);
        assert_eq!(state.selection.state, None);
        assert_eq!(state.selection.counties, None);
        assert_eq!(state.selection.metric, None);
    }

    #[test]
    fn sidebar_options_come_from_the_combined_table() {
        let mut state = AppState::default();
        state.set_workbook(workbook());
        let combined = state.combined_table().unwrap();
        assert_eq!(state.state_options(&combined), vec!["CA"]);
        assert_eq!(state.county_options(&combined), vec!["Alpha"]);
        assert_eq!(state.metric_options(&combined), vec!["cases"]);
    }

    #[test]
    fn county_toggle_materialises_the_all_default() {
        let mut state = AppState::default();
        state.set_workbook(workbook());
        assert!(state.county_selected("Alpha"));

        state.toggle_county("Alpha", &["Alpha".to_string()]);
        assert!(!state.county_selected("Alpha"));

        state.select_all_counties();
        assert!(state.county_selected("Alpha"));
    }

    #[test]
    fn sheet_toggle_round_trips() {
        let mut state = AppState::default();
        state.set_workbook(workbook());
        state.toggle_sheet("2020");
        assert!(state.selection.sheets.is_empty());
        state.toggle_sheet("2020");
        assert_eq!(state.selection.sheets, vec!["2020"]);
    }
}
