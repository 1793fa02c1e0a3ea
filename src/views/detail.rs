//! Per-character detail: the skill queue and the trained skills.
//!
//! Built from the roster snapshot already in memory; opening the modal never
//! triggers a fetch.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::components::table::{Cell, Column, Row};
use crate::progress::{MAX_SKILL_LEVEL, compute_progress, finished_skills};
use crate::types::Character;
use crate::util::{format_optional_date, format_sp, roman_level};
use crate::views::rows::SortDirection;

#[derive(Debug, Clone, PartialEq)]
pub struct QueueRow {
    /// Position in the server's queue order.
    pub position: usize,
    pub name: String,
    pub finished_level: Option<u8>,
    /// This entry's own progress, not the character aggregate.
    pub progress: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub finish_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillRow {
    pub name: String,
    pub level: u8,
    pub trained_sp: u64,
    pub mastered: bool,
    /// Part of the character's skill-set filter.
    pub filtered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueSort {
    #[default]
    Position,
    Skill,
    Progress,
    StartDate,
    FinishDate,
}

impl QueueSort {
    fn next(self) -> Self {
        match self {
            Self::Position => Self::Skill,
            Self::Skill => Self::Progress,
            Self::Progress => Self::StartDate,
            Self::StartDate => Self::FinishDate,
            Self::FinishDate => Self::Position,
        }
    }

    pub fn column_id(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Skill => "skill",
            Self::Progress => "progress",
            Self::StartDate => "start",
            Self::FinishDate => "finish",
        }
    }

    fn compare(self, a: &QueueRow, b: &QueueRow) -> Ordering {
        match self {
            Self::Position => a.position.cmp(&b.position),
            Self::Skill => a.name.cmp(&b.name).then(a.finished_level.cmp(&b.finished_level)),
            Self::Progress => a.progress.total_cmp(&b.progress),
            Self::StartDate => a.start_date.cmp(&b.start_date),
            Self::FinishDate => a.finish_date.cmp(&b.finish_date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkillSort {
    #[default]
    Name,
    Level,
    TrainedSp,
}

impl SkillSort {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Level,
            Self::Level => Self::TrainedSp,
            Self::TrainedSp => Self::Name,
        }
    }

    pub fn column_id(self) -> &'static str {
        match self {
            Self::Name => "skill",
            Self::Level => "level",
            Self::TrainedSp => "sp",
        }
    }

    fn compare(self, a: &SkillRow, b: &SkillRow) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Level => a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)),
            Self::TrainedSp => a.trained_sp.cmp(&b.trained_sp),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalSection {
    #[default]
    Queue,
    Skills,
}

fn ordered(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

#[derive(Debug, Clone)]
pub struct DetailModal {
    pub character_id: u64,
    pub title: String,
    /// e.g. "2 / 3 filtered skills mastered"; `None` without a filter.
    pub filter_summary: Option<String>,
    queue: Vec<QueueRow>,
    /// `None` when the character has no trained skills at all.
    skills: Option<Vec<SkillRow>>,
    queue_sort: (QueueSort, SortDirection),
    skill_sort: (SkillSort, SortDirection),
    focus: ModalSection,
    scroll: usize,
}

impl DetailModal {
    pub fn open(character: &Character) -> Self {
        let queue = character
            .skillqueue
            .iter()
            .enumerate()
            .map(|(position, e)| QueueRow {
                position,
                name: e.name.clone(),
                finished_level: e.finished_level,
                progress: compute_progress(e.start_sp, e.trained_sp, e.end_sp),
                start_date: e.start_date,
                finish_date: e.finish_date,
            })
            .collect();

        let mut skills: Vec<SkillRow> = character
            .skills
            .iter()
            .filter(|s| s.level > 0)
            .map(|s| SkillRow {
                name: s.name.clone(),
                level: s.level,
                trained_sp: s.trained_sp,
                mastered: s.level >= MAX_SKILL_LEVEL,
                filtered: character.skillset.contains(&s.name),
            })
            .collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));

        let filter_summary = character.has_filter().then(|| {
            format!(
                "{} / {} filtered skills mastered",
                finished_skills(character, &character.skillset).len(),
                character.skillset.len()
            )
        });

        Self {
            character_id: character.character_id,
            title: character.character_name.clone(),
            filter_summary,
            queue,
            skills: (!skills.is_empty()).then_some(skills),
            queue_sort: (QueueSort::default(), SortDirection::Ascending),
            skill_sort: (SkillSort::default(), SortDirection::Ascending),
            focus: ModalSection::Queue,
            scroll: 0,
        }
    }

    pub fn queue(&self) -> &[QueueRow] {
        &self.queue
    }

    pub fn skills(&self) -> Option<&[SkillRow]> {
        self.skills.as_deref()
    }

    pub fn sort_queue(&mut self, column: QueueSort, direction: SortDirection) {
        self.queue_sort = (column, direction);
        self.queue
            .sort_by(|a, b| ordered(column.compare(a, b), direction));
    }

    pub fn sort_skills(&mut self, column: SkillSort, direction: SortDirection) {
        self.skill_sort = (column, direction);
        if let Some(skills) = &mut self.skills {
            skills.sort_by(|a, b| ordered(column.compare(a, b), direction));
        }
    }

    pub fn queue_sort(&self) -> (QueueSort, SortDirection) {
        self.queue_sort
    }

    pub fn skill_sort(&self) -> (SkillSort, SortDirection) {
        self.skill_sort
    }

    pub fn focus(&self) -> ModalSection {
        self.focus
    }

    /// Move focus between sections; stays on the queue when there are no skills.
    pub fn toggle_section(&mut self) {
        self.focus = match self.focus {
            ModalSection::Queue if self.skills.is_some() => ModalSection::Skills,
            _ => ModalSection::Queue,
        };
        self.scroll = 0;
    }

    /// Next sort column of the focused section.
    pub fn cycle_sort(&mut self) {
        match self.focus {
            ModalSection::Queue => self.sort_queue(self.queue_sort.0.next(), SortDirection::Ascending),
            ModalSection::Skills => {
                self.sort_skills(self.skill_sort.0.next(), SortDirection::Ascending);
            }
        }
    }

    pub fn flip_direction(&mut self) {
        match self.focus {
            ModalSection::Queue => self.sort_queue(self.queue_sort.0, self.queue_sort.1.flip()),
            ModalSection::Skills => self.sort_skills(self.skill_sort.0, self.skill_sort.1.flip()),
        }
    }

    pub fn scroll(&mut self, delta: isize) {
        let len = match self.focus {
            ModalSection::Queue => self.queue.len(),
            ModalSection::Skills => self.skills.as_ref().map_or(0, Vec::len),
        };
        self.scroll = self
            .scroll
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    // -- rendering helpers ---------------------------------------------------

    pub fn queue_columns() -> Vec<Column> {
        vec![
            Column::new("skill", "Skill", 0.40),
            Column::new("level", "Level", 0.0).fixed(6),
            Column::new("progress", "Progress", 0.0).fixed(9).right(),
            Column::new("start", "Start", 0.25),
            Column::new("finish", "Finish", 0.25),
        ]
    }

    pub fn skill_columns() -> Vec<Column> {
        vec![
            Column::new("skill", "Skill", 0.55),
            Column::new("level", "Level", 0.0).fixed(8),
            Column::new("sp", "SP", 0.30).right(),
        ]
    }

    pub fn queue_cells(&self, date_format: &str) -> Vec<Row> {
        self.queue
            .iter()
            .map(|q| {
                let mut row = Row::new();
                row.insert("skill".to_owned(), Cell::plain(&q.name));
                row.insert(
                    "level".to_owned(),
                    Cell::plain(q.finished_level.map_or("-", roman_level)),
                );
                row.insert(
                    "progress".to_owned(),
                    Cell::plain(format!("{:.1}%", q.progress)),
                );
                row.insert(
                    "start".to_owned(),
                    Cell::plain(format_optional_date(q.start_date.as_ref(), date_format, "-")),
                );
                row.insert(
                    "finish".to_owned(),
                    Cell::plain(format_optional_date(q.finish_date.as_ref(), date_format, "-")),
                );
                row
            })
            .collect()
    }

    pub fn skill_cells(&self, mastered_marker: &str) -> Option<Vec<Row>> {
        let skills = self.skills.as_ref()?;
        Some(
            skills
                .iter()
                .map(|s| {
                    let mut row = Row::new();
                    let name = if s.filtered {
                        format!("{} *", s.name)
                    } else {
                        s.name.clone()
                    };
                    row.insert("skill".to_owned(), Cell::plain(name));
                    let level = if s.mastered {
                        Cell::bold(format!("{} {mastered_marker}", roman_level(s.level)))
                    } else {
                        Cell::plain(roman_level(s.level))
                    };
                    row.insert("level".to_owned(), level);
                    row.insert("sp".to_owned(), Cell::plain(format_sp(s.trained_sp)));
                    row
                })
                .collect(),
        )
    }
}
