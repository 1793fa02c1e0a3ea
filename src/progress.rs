//! Training progress and extraction readiness.
//!
//! Everything here is a pure function of the fetched records; nothing is
//! remembered between fetches.

use thiserror::Error;

use crate::types::{Character, Skill, SkillQueueEntry};

pub const MAX_SKILL_LEVEL: u8 = 5;

/// Readiness tier of a character with an active skill-set filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadinessTag {
    /// Every filtered skill is mastered and nothing more is queued.
    Ready,
    /// Filtered skills are mid-training, none freshly started.
    Maybe,
    NotReady,
}

impl ReadinessTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Maybe => "maybe",
            Self::NotReady => "not-ready",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("{character}: skill {skill:?} has level {level}, expected 0-{MAX_SKILL_LEVEL}")]
    InvalidLevel {
        character: String,
        skill: String,
        level: u8,
    },
    #[error("{character}: queued {skill:?} finishes at level {level}, expected 1-{MAX_SKILL_LEVEL}")]
    InvalidFinishedLevel {
        character: String,
        skill: String,
        level: u8,
    },
    #[error("{character}: queued {skill:?} has trained SP {trained} below its start SP {start}")]
    TrainedBelowStart {
        character: String,
        skill: String,
        trained: u64,
        start: u64,
    },
}

/// Completion percentage of one training step, in `[0, 100]`.
///
/// A zero target yields 0, and so does a step with no progress since it began
/// even if the raw ratio would say otherwise.
pub fn compute_progress(start_sp: u64, trained_sp: u64, end_sp: u64) -> f64 {
    if end_sp == 0 || trained_sp == start_sp {
        return 0.0;
    }
    let pct = 100.0 * trained_sp as f64 / end_sp as f64;
    if pct.is_finite() {
        pct.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Aggregate over a whole queue: one ratio of the summed counters, so each
/// entry weighs in proportion to its own target.
pub fn queue_progress(queue: &[SkillQueueEntry]) -> f64 {
    let (start, trained, end) = queue.iter().fold((0u64, 0u64, 0u64), |acc, e| {
        (
            acc.0.saturating_add(e.start_sp),
            acc.1.saturating_add(e.trained_sp),
            acc.2.saturating_add(e.end_sp),
        )
    });
    compute_progress(start, trained, end)
}

/// Reject records no real character can have.
pub fn validate(character: &Character) -> Result<(), ProgressError> {
    let who = || character.character_name.clone();
    for skill in &character.skills {
        if skill.level > MAX_SKILL_LEVEL {
            return Err(ProgressError::InvalidLevel {
                character: who(),
                skill: skill.name.clone(),
                level: skill.level,
            });
        }
    }
    for entry in &character.skillqueue {
        if let Some(level) = entry.finished_level
            && !(1..=MAX_SKILL_LEVEL).contains(&level)
        {
            return Err(ProgressError::InvalidFinishedLevel {
                character: who(),
                skill: entry.name.clone(),
                level,
            });
        }
        if entry.trained_sp < entry.start_sp {
            return Err(ProgressError::TrainedBelowStart {
                character: who(),
                skill: entry.name.clone(),
                trained: entry.trained_sp,
                start: entry.start_sp,
            });
        }
    }
    Ok(())
}

/// Classify `character` against `filter`. `Ok(None)` means no filter is
/// active, which is shown differently from any tier.
pub fn compute_readiness(
    character: &Character,
    filter: &[String],
) -> Result<Option<ReadinessTag>, ProgressError> {
    validate(character)?;

    let names: Vec<&str> = filter
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        return Ok(None);
    }

    let all_mastered = names.iter().all(|name| {
        let level = character.skill(name).map_or(0, |s| s.level);
        level == MAX_SKILL_LEVEL && character.queued(name).next().is_none()
    });
    if all_mastered {
        return Ok(Some(ReadinessTag::Ready));
    }

    let mut mid_training = false;
    let mut fresh = false;
    for name in &names {
        for entry in character.queued(name) {
            if entry.is_fresh() {
                fresh = true;
            } else {
                mid_training = true;
            }
        }
    }

    Ok(Some(if mid_training && !fresh {
        ReadinessTag::Maybe
    } else {
        ReadinessTag::NotReady
    }))
}

/// Filtered skills already at the maximum level.
pub fn finished_skills<'a>(character: &'a Character, filter: &[String]) -> Vec<&'a Skill> {
    character
        .skills
        .iter()
        .filter(|s| s.level == MAX_SKILL_LEVEL && filter.iter().any(|f| f == &s.name))
        .collect()
}
