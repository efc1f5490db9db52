//! crates/devotional_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub use crate::reference::VerseReference;

/// A user's position in the New Testament reading plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgress {
    pub user_id: Uuid,
    /// Index of the next unread `ReadingPlanEntry`.
    pub current_plan_index: usize,
    pub completed_chapter_count: u32,
    pub last_read_date: Option<NaiveDate>,
    pub streak_days: u32,
}

impl UserProgress {
    /// The progress row created on a user's first interaction.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            current_plan_index: 0,
            completed_chapter_count: 0,
            last_read_date: None,
            streak_days: 0,
        }
    }
}

/// A verse reference saved by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reference: VerseReference,
    pub note: Option<String>,
    pub topic: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One block of the reading plan: a contiguous chapter range within one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingPlanEntry {
    pub sequence_index: usize,
    pub book: &'static str,
    pub chapter_start: u32,
    pub chapter_end: u32,
}

impl ReadingPlanEntry {
    /// Number of chapters covered by this entry.
    pub fn span(&self) -> u32 {
        self.chapter_end - self.chapter_start + 1
    }

    /// Whole-chapter references for every chapter in the entry, in order.
    pub fn chapters(&self) -> Vec<VerseReference> {
        (self.chapter_start..=self.chapter_end)
            .map(|chapter| VerseReference::chapter(self.book, chapter))
            .collect()
    }
}

/// The emotional states the classifier recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feeling {
    Anxious,
    Afraid,
    Sad,
    Lonely,
    Angry,
    Doubtful,
    Guilty,
    Hopeless,
    Weak,
}

impl Feeling {
    /// The keyword index topic holding verses for this feeling.
    pub fn topic(self) -> &'static str {
        match self {
            Feeling::Anxious => "anxiety",
            Feeling::Afraid => "fear",
            Feeling::Sad => "sad",
            Feeling::Lonely => "lonely",
            Feeling::Angry => "angry",
            Feeling::Doubtful => "doubt",
            Feeling::Guilty => "guilt",
            Feeling::Hopeless => "hopeless",
            Feeling::Weak => "weak",
        }
    }
}

/// The classified purpose of one chat message. Produced fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedIntent {
    Greeting,
    DailyReading,
    /// "done" after a reading. The cursor already moved when the reading was
    /// assigned, so this only acknowledges.
    ReadingCompleted,
    EmotionalSupport { feeling: Feeling },
    Search { topic: String },
    SaveBookmark { reference: VerseReference, note: Option<String> },
    ShowProgress,
    ShowBookmarks,
    Unknown { raw_text: String },
}

impl ClassifiedIntent {
    /// A short stable label, used in logs and the conversation record.
    pub fn label(&self) -> &'static str {
        match self {
            ClassifiedIntent::Greeting => "greeting",
            ClassifiedIntent::DailyReading => "daily_reading",
            ClassifiedIntent::ReadingCompleted => "reading_completed",
            ClassifiedIntent::EmotionalSupport { .. } => "emotional_support",
            ClassifiedIntent::Search { .. } => "search",
            ClassifiedIntent::SaveBookmark { .. } => "save_bookmark",
            ClassifiedIntent::ShowProgress => "show_progress",
            ClassifiedIntent::ShowBookmarks => "show_bookmarks",
            ClassifiedIntent::Unknown { .. } => "unknown",
        }
    }
}

/// The text of a verse or passage returned by the verse lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseText {
    pub reference: VerseReference,
    pub text: String,
    pub translation: Option<String>,
}

/// One handled chat exchange, kept for context.
#[derive(Debug, Clone)]
pub struct ConversationRecord {
    pub user_id: Uuid,
    pub message: String,
    pub response: String,
    pub intent: String,
    pub created_at: DateTime<Utc>,
}
