//! crates/devotional_core/src/reading_plan.rs
//!
//! The sequential New Testament reading plan and the cursor state machine that
//! walks a user through it.
//!
//! A user's position is `UserProgress::current_plan_index`: 0 is the first
//! entry and `plan().len()` means the plan is complete. `advance` is the only
//! function that moves the cursor.

use std::sync::LazyLock;

use chrono::NaiveDate;

use crate::books::{new_testament_chapter_count, NEW_TESTAMENT};
use crate::domain::{ReadingPlanEntry, UserProgress};

/// Chapters per plan entry.
pub const CHAPTERS_PER_ENTRY: u32 = 2;

static PLAN: LazyLock<Vec<ReadingPlanEntry>> = LazyLock::new(build_plan);

fn build_plan() -> Vec<ReadingPlanEntry> {
    let mut entries = Vec::new();
    for (book, chapters) in NEW_TESTAMENT {
        let mut start = 1;
        while start <= chapters {
            let end = (start + CHAPTERS_PER_ENTRY - 1).min(chapters);
            entries.push(ReadingPlanEntry {
                sequence_index: entries.len(),
                book,
                chapter_start: start,
                chapter_end: end,
            });
            start = end + 1;
        }
    }
    entries
}

/// The full plan, Matthew through Revelation.
pub fn plan() -> &'static [ReadingPlanEntry] {
    &PLAN
}

/// The entry at the user's cursor, or `None` once the plan is complete.
pub fn current_entry(progress: &UserProgress) -> Option<&'static ReadingPlanEntry> {
    PLAN.get(progress.current_plan_index)
}

/// Result of one `advance` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The entry to read now, plus the progress to persist.
    Next {
        entry: ReadingPlanEntry,
        progress: UserProgress,
    },
    /// The cursor is already past the last entry. Nothing changes.
    PlanComplete,
}

/// Moves the cursor forward by one entry.
///
/// Calling this twice advances twice; callers must invoke it at most once per
/// reading request.
pub fn advance(progress: &UserProgress, today: NaiveDate) -> Advance {
    let Some(entry) = current_entry(progress) else {
        return Advance::PlanComplete;
    };

    let mut next = progress.clone();
    next.current_plan_index += 1;
    next.completed_chapter_count += entry.span();
    next.streak_days = next_streak(progress.last_read_date, progress.streak_days, today);
    next.last_read_date = Some(today);

    Advance::Next {
        entry: *entry,
        progress: next,
    }
}

/// Streak after reading on `today`: unchanged on the same day, +1 the day
/// after the last read, otherwise a fresh streak of 1.
pub fn next_streak(last_read: Option<NaiveDate>, streak: u32, today: NaiveDate) -> u32 {
    match last_read {
        Some(last) => match (today - last).num_days() {
            days if days <= 0 => streak.max(1),
            1 => streak + 1,
            _ => 1,
        },
        None => 1,
    }
}

/// A read-only summary of a user's progress, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completed_chapters: u32,
    pub total_chapters: u32,
    pub percent: f64,
    /// Book and first chapter of the next unread entry.
    pub current_position: Option<(&'static str, u32)>,
    pub streak_days: u32,
    pub plan_complete: bool,
}

impl ProgressSnapshot {
    pub fn from_progress(progress: &UserProgress) -> Self {
        let total_chapters = new_testament_chapter_count();
        let percent = (progress.completed_chapter_count as f64 / total_chapters as f64) * 100.0;
        let entry = current_entry(progress);
        Self {
            completed_chapters: progress.completed_chapter_count,
            total_chapters,
            percent: (percent * 10.0).round() / 10.0,
            current_position: entry.map(|e| (e.book, e.chapter_start)),
            streak_days: progress.streak_days,
            plan_complete: entry.is_none(),
        }
    }
}
