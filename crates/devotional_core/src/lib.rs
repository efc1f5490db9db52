pub mod books;
pub mod composer;
pub mod domain;
pub mod intent;
pub mod keyword_index;
pub mod orchestrator;
pub mod ports;
pub mod reading_plan;
pub mod reference;

pub use domain::{
    Bookmark, ClassifiedIntent, ConversationRecord, Feeling, ReadingPlanEntry, UserProgress,
    VerseReference, VerseText,
};
pub use orchestrator::{Orchestrator, ReadingPreview, Reply};
pub use ports::{Clock, PersistenceStore, PortError, PortResult, SystemClock, VerseTextLookup};
pub use reading_plan::ProgressSnapshot;
