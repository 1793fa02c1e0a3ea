//! Row view-models and the two character tables fed from one fetch.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::color::Color;
use crate::components::table::{Cell, Column, Row};
use crate::config::types::{AppConfig, Labels};
use crate::filter::filter_rows;
use crate::progress::{self, ProgressError, ReadinessTag};
use crate::theme::ResolvedTheme;
use crate::types::{Character, DetailEntry, DetailsPayload, PayloadError, RosterPayload};
use crate::util::format_optional_date;

pub const DEFAULT_PAGE_SIZE: usize = 25;

const BAR_WIDTH: usize = 10;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

// ---------------------------------------------------------------------------
// Row view-model
// ---------------------------------------------------------------------------

/// Row background tier. Purely visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowHighlight {
    #[default]
    None,
    Warning,
    Alert,
}

impl From<Option<ReadinessTag>> for RowHighlight {
    fn from(tag: Option<ReadinessTag>) -> Self {
        match tag {
            Some(ReadinessTag::Maybe) => Self::Warning,
            Some(ReadinessTag::Ready) => Self::Alert,
            Some(ReadinessTag::NotReady) | None => Self::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowViewModel {
    /// Absent only when the detail endpoint omits it everywhere.
    pub character_id: Option<u64>,
    pub name: String,
    pub notification: bool,
    pub progress: f64,
    pub readiness: Option<ReadinessTag>,
    pub last_update: Option<DateTime<Utc>>,
    pub filter_active: bool,
}

impl RowViewModel {
    pub fn from_character(character: &Character) -> Result<Self, ProgressError> {
        let readiness = progress::compute_readiness(character, &character.skillset)?;
        Ok(Self {
            character_id: Some(character.character_id),
            name: character.character_name.clone(),
            notification: character.notification,
            progress: progress::queue_progress(&character.skillqueue),
            readiness,
            last_update: character.last_update,
            filter_active: character.has_filter(),
        })
    }

    pub fn from_detail_entry(entry: &DetailEntry) -> Result<Self, PayloadError> {
        let name = entry.display_name()?;
        let progress = entry.details.progress.percent(&name)?;
        Ok(Self {
            character_id: entry.character_id(),
            notification: entry.notification(),
            progress,
            readiness: entry.readiness(),
            last_update: entry.details.last_update,
            filter_active: entry.details.is_filter.is_set(),
            name,
        })
    }

    pub fn highlight(&self) -> RowHighlight {
        self.readiness.into()
    }
}

// ---------------------------------------------------------------------------
// View config and columns
// ---------------------------------------------------------------------------

/// Text colors used for individual cells.
#[derive(Debug, Clone)]
pub struct CellPalette {
    pub success: Color,
    pub warning: Color,
    pub faint: Color,
}

impl From<&ResolvedTheme> for CellPalette {
    fn from(theme: &ResolvedTheme) -> Self {
        Self {
            success: theme.text_success,
            warning: theme.text_warning,
            faint: theme.text_faint,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub page_size: usize,
    pub date_format: String,
    pub labels: Labels,
    pub palette: CellPalette,
}

impl ViewConfig {
    pub fn new(config: &AppConfig, theme: &ResolvedTheme) -> Self {
        Self {
            page_size: config.defaults.page_size.max(1),
            date_format: config.defaults.date_format.clone(),
            labels: config.labels.clone(),
            palette: theme.into(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        let theme = crate::views::default_theme();
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            date_format: crate::config::types::Defaults::default().date_format,
            labels: Labels::default(),
            palette: (&theme).into(),
        }
    }
}

pub fn character_columns() -> Vec<Column> {
    vec![
        Column::new("character", "Character", 0.30),
        Column::new("progress", "Training", 0.0).fixed(17),
        Column::new("readiness", "Extraction", 0.20),
        Column::new("updated", "Last update", 0.20),
        Column::new("filter", "Filter", 0.0).fixed(8),
        Column::new("actions", "Actions", 0.15),
    ]
}

fn progress_bar(pct: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{}{} {pct:>3.0}%",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(BAR_WIDTH - filled)
    )
}

fn build_cells(row: &RowViewModel, cfg: &ViewConfig) -> Row {
    let labels = &cfg.labels;
    let palette = &cfg.palette;
    let mut cells = Row::new();

    let bell = if row.notification { "\u{25cf}" } else { "\u{25cb}" };
    cells.insert(
        "character".to_owned(),
        Cell::bold(format!("{} {bell}", row.name)),
    );
    cells.insert("progress".to_owned(), Cell::plain(progress_bar(row.progress)));

    let readiness = match row.readiness {
        Some(ReadinessTag::Ready) => Cell::colored(&labels.readiness_ready, palette.success),
        Some(ReadinessTag::Maybe) => Cell::colored(&labels.readiness_maybe, palette.warning),
        Some(ReadinessTag::NotReady) => Cell::colored(&labels.readiness_not_ready, palette.faint),
        None => Cell::plain(""),
    };
    cells.insert("readiness".to_owned(), readiness);

    let updated = format_optional_date(
        row.last_update.as_ref(),
        &cfg.date_format,
        &labels.not_updated,
    );
    cells.insert(
        "updated".to_owned(),
        if row.last_update.is_some() {
            Cell::plain(updated)
        } else {
            Cell::colored(updated, palette.faint)
        },
    );

    cells.insert(
        "filter".to_owned(),
        if row.filter_active {
            Cell::colored(&labels.filter_active, palette.success)
        } else {
            Cell::colored(&labels.filter_inactive, palette.faint)
        },
    );
    cells.insert(
        "actions".to_owned(),
        Cell::colored("a alarm  m read  e filter", palette.faint),
    );
    cells
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Character,
    Progress,
    LastUpdate,
}

impl SortColumn {
    pub fn column_id(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Progress => "progress",
            Self::LastUpdate => "updated",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Character => Self::Progress,
            Self::Progress => Self::LastUpdate,
            Self::LastUpdate => Self::Character,
        }
    }

    fn compare(self, a: &RowViewModel, b: &RowViewModel) -> Ordering {
        match self {
            Self::Character => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Progress => a.progress.total_cmp(&b.progress),
            // Absent timestamps sort first.
            Self::LastUpdate => a.last_update.cmp(&b.last_update),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

// ---------------------------------------------------------------------------
// TableView
// ---------------------------------------------------------------------------

/// One sortable, searchable, paginated table of characters.
///
/// Created once; every fetch goes through [`TableView::replace`], which
/// throws the previous rows away.
#[derive(Debug, Clone)]
pub struct TableView {
    config: ViewConfig,
    rows: Vec<RowViewModel>,
    cells: Vec<Row>,
    /// Indices into `rows` after search and sort.
    order: Vec<usize>,
    search: String,
    sort: SortColumn,
    direction: SortDirection,
    page: usize,
    cursor: usize,
    loaded: bool,
}

impl TableView {
    pub fn create(config: ViewConfig) -> Self {
        Self {
            config,
            rows: Vec::new(),
            cells: Vec::new(),
            order: Vec::new(),
            search: String::new(),
            sort: SortColumn::default(),
            direction: SortDirection::default(),
            page: 0,
            cursor: 0,
            loaded: false,
        }
    }

    /// Swap in a freshly built set of rows. Search and sort settings stay.
    pub fn replace(&mut self, rows: Vec<RowViewModel>) {
        self.cells = rows.iter().map(|r| build_cells(r, &self.config)).collect();
        self.rows = rows;
        self.loaded = true;
        self.refresh();
    }

    /// Back to the pre-fetch empty state.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.cells.clear();
        self.loaded = false;
        self.refresh();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn rows(&self) -> &[RowViewModel] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows left after the search, in display order.
    pub fn visible(&self) -> impl Iterator<Item = &RowViewModel> {
        self.order.iter().map(|&i| &self.rows[i])
    }

    pub fn visible_len(&self) -> usize {
        self.order.len()
    }

    pub fn search(&mut self, term: &str) {
        term.clone_into(&mut self.search);
        self.page = 0;
        self.cursor = 0;
        self.refresh();
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn sort_by(&mut self, column: SortColumn, direction: SortDirection) {
        self.sort = column;
        self.direction = direction;
        self.refresh();
    }

    pub fn cycle_sort(&mut self) {
        self.sort_by(self.sort.next(), SortDirection::Ascending);
    }

    pub fn flip_direction(&mut self) {
        self.sort_by(self.sort, self.direction.flip());
    }

    pub fn sort(&self) -> (SortColumn, SortDirection) {
        (self.sort, self.direction)
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub fn page_count(&self) -> usize {
        self.order.len().div_ceil(self.config.page_size).max(1)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
        self.cursor = 0;
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    fn page_range(&self) -> std::ops::Range<usize> {
        let start = (self.page * self.config.page_size).min(self.order.len());
        let end = (start + self.config.page_size).min(self.order.len());
        start..end
    }

    pub fn page_rows(&self) -> Vec<&RowViewModel> {
        self.order[self.page_range()]
            .iter()
            .map(|&i| &self.rows[i])
            .collect()
    }

    /// Rendered cells of the current page.
    pub fn page_cells(&self) -> Vec<Row> {
        self.order[self.page_range()]
            .iter()
            .map(|&i| self.cells[i].clone())
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.page_range().len();
        self.cursor = if len == 0 {
            0
        } else {
            self.cursor.saturating_add_signed(delta).min(len - 1)
        };
    }

    pub fn selected(&self) -> Option<&RowViewModel> {
        let idx = *self.order.get(self.page_range().start + self.cursor)?;
        self.rows.get(idx)
    }

    pub fn labels(&self) -> &Labels {
        &self.config.labels
    }

    fn refresh(&mut self) {
        let mut order = filter_rows(&self.cells, &self.search);
        let (sort, direction) = (self.sort, self.direction);
        order.sort_by(|&a, &b| {
            let ord = sort.compare(&self.rows[a], &self.rows[b]);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        self.order = order;
        self.page = self.page.min(self.page_count() - 1);
        self.move_cursor(0);
    }
}

// ---------------------------------------------------------------------------
// TableRenderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewId {
    #[default]
    Details,
    Inactive,
}

impl ViewId {
    pub fn other(self) -> Self {
        match self {
            Self::Details => Self::Inactive,
            Self::Inactive => Self::Details,
        }
    }
}

/// Feeds the "details" and "inactive" tables from one payload.
#[derive(Debug, Clone)]
pub struct TableRenderer {
    details: TableView,
    inactive: TableView,
    inactive_days: u32,
}

impl TableRenderer {
    pub fn new(config: ViewConfig, inactive_days: u32) -> Self {
        Self {
            details: TableView::create(config.clone()),
            inactive: TableView::create(config),
            inactive_days,
        }
    }

    pub fn view(&self, id: ViewId) -> &TableView {
        match id {
            ViewId::Details => &self.details,
            ViewId::Inactive => &self.inactive,
        }
    }

    pub fn view_mut(&mut self, id: ViewId) -> &mut TableView {
        match id {
            ViewId::Details => &mut self.details,
            ViewId::Inactive => &mut self.inactive,
        }
    }

    pub fn details(&self) -> &TableView {
        &self.details
    }

    pub fn inactive(&self) -> &TableView {
        &self.inactive
    }

    pub fn clear(&mut self) {
        self.details.clear();
        self.inactive.clear();
    }

    /// Rows from the detail endpoint. Nothing is touched unless every entry
    /// converts. A character listed in both sections stays in `details`.
    pub fn render_details(&mut self, payload: &DetailsPayload) -> Result<(), RenderError> {
        let mut seen = HashSet::new();
        let details = detail_rows(&payload.details, &mut seen)?;
        let inactive = detail_rows(&payload.inactive, &mut seen)?;
        self.details.replace(details);
        self.inactive.replace(inactive);
        Ok(())
    }

    /// Rows computed locally from the raw roster; characters not updated
    /// within `inactive_days` of `now` land in the inactive table.
    pub fn render_roster(
        &mut self,
        payload: &RosterPayload,
        now: DateTime<Utc>,
    ) -> Result<(), RenderError> {
        let cutoff = now - Duration::days(i64::from(self.inactive_days));
        let mut seen = HashSet::new();
        let mut details = Vec::new();
        let mut inactive = Vec::new();
        for character in payload.characters() {
            if !seen.insert(character.character_id) {
                continue;
            }
            let row = RowViewModel::from_character(character)?;
            match character.last_update {
                Some(ts) if ts >= cutoff => details.push(row),
                _ => inactive.push(row),
            }
        }
        self.details.replace(details);
        self.inactive.replace(inactive);
        Ok(())
    }
}

fn detail_rows(
    entries: &[DetailEntry],
    seen: &mut HashSet<u64>,
) -> Result<Vec<RowViewModel>, RenderError> {
    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let row = RowViewModel::from_detail_entry(entry)?;
        if let Some(id) = row.character_id
            && !seen.insert(id)
        {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}
