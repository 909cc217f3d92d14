use itertools::Itertools;

use crate::types::{
    DisplayRow, FilterCriteria, RawSnapshots, Snapshot, SnapshotError, SortMode, Summary,
};

pub const ALL_FILTER: &str = "all";
pub const NO_RESULTS_LABEL: &str = "No snapshots match your filters";
pub const INVALID_DATE_LABEL: &str = "invalid date";

const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

// Owns the full record set of the current search and the filtered/sorted
// view derived from it. One catalog per session; rendering never mutates.
#[derive(Debug, Default)]
pub struct SnapshotCatalog {
    full: Vec<Snapshot>,
    view: Vec<Snapshot>,
    years: Vec<String>,
    filters: FilterCriteria,
    sort: SortMode,
}

impl SnapshotCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_snapshots(&mut self, raw: RawSnapshots) -> Result<(), SnapshotError> {
        // the proxy already rejects short payloads, but the catalog does not
        // trust its caller
        if raw.len() < 2 {
            return Err(SnapshotError::EmptyResult);
        }

        self.full = raw[1..].iter().map(|row| Snapshot::from_row(row)).collect();
        self.years = self
            .full
            .iter()
            .map(|s| s.year.clone())
            .unique()
            .sorted()
            .rev()
            .collect();

        // a fresh search starts from the unfiltered set; active criteria
        // only bite again on the next filter change
        self.view = self.full.clone();
        self.sort_view();

        debug!("catalog holds {} snapshots", self.full.len());
        Ok(())
    }

    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        self.filters = criteria;

        let status = active_choice(&self.filters.status);
        let year = active_choice(&self.filters.year);
        let query = self
            .filters
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        self.view = self
            .full
            .iter()
            .filter(|s| {
                if let Some(status) = status {
                    if s.status_code != status {
                        return false;
                    }
                }
                if let Some(year) = year {
                    if s.year != year {
                        return false;
                    }
                }
                if let Some(query) = &query {
                    if !s.original_url.to_lowercase().contains(query.as_str()) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        // filtering never leaves the view unsorted
        self.sort_view();
    }

    pub fn apply_sorting(&mut self, mode: SortMode) {
        self.sort = mode;
        self.sort_view();
    }

    // Vec::sort_by is stable, so ties keep their prior relative order.
    // Timestamps are fixed-width zero-padded and compare lexicographically
    // in chronological order.
    fn sort_view(&mut self) {
        match self.sort {
            SortMode::Newest => self.view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortMode::Oldest => self.view.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            SortMode::Status => self.view.sort_by(|a, b| a.status_code.cmp(&b.status_code)),
            SortMode::Unspecified => {}
        }
    }

    pub fn display_rows(&self) -> Vec<DisplayRow> {
        if self.view.is_empty() {
            return vec![DisplayRow {
                rank: 0,
                captured: String::new(),
                original_url: NO_RESULTS_LABEL.into(),
                status_code: String::new(),
                mime_type: String::new(),
                archive_view_url: String::new(),
            }];
        }

        self.view
            .iter()
            .enumerate()
            .map(|(i, s)| DisplayRow {
                rank: i + 1,
                captured: match s.captured_at {
                    Some(at) => at.format(DISPLAY_DATE_FORMAT).to_string(),
                    None => INVALID_DATE_LABEL.into(),
                },
                original_url: s.original_url.clone(),
                status_code: s.status_code.clone(),
                mime_type: s.mime_type.clone(),
                archive_view_url: s.archive_view_url.clone(),
            })
            .collect()
    }

    // The range label reads the full set in its original order, so it is
    // unaffected by whatever sort the view currently carries.
    pub fn summary(&self) -> Summary {
        let date_range = match (self.full.first(), self.full.last()) {
            (Some(first), Some(last)) => Some(format!("{} - {}", first.year, last.year)),
            _ => None,
        };

        Summary {
            total: self.full.len(),
            showing: self.view.len(),
            date_range,
        }
    }

    pub fn year_options(&self) -> Vec<String> {
        let mut options = Vec::with_capacity(self.years.len() + 1);
        options.push(ALL_FILTER.into());
        options.extend(self.years.iter().cloned());
        options
    }

    pub fn full(&self) -> &[Snapshot] {
        &self.full
    }

    pub fn view(&self) -> &[Snapshot] {
        &self.view
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }
}

fn active_choice(choice: &Option<String>) -> Option<&str> {
    choice
        .as_deref()
        .filter(|c| !c.is_empty() && *c != ALL_FILTER)
}
