//! crates/devotional_core/src/orchestrator.rs
//!
//! Sequences one chat request: classify, fetch or mutate state through the
//! ports, then compose the reply. This is the only part of the core that
//! talks to external collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::composer::{compose, FetchedData, ReadingOutcome, PERSISTENCE_FAILURE_MESSAGE};
use crate::domain::{Bookmark, ClassifiedIntent, ConversationRecord, VerseReference, VerseText};
use crate::intent::classify;
use crate::keyword_index;
use crate::ports::{Clock, PersistenceStore, PortError, PortResult, SystemClock, VerseTextLookup};
use crate::reading_plan::{advance, current_entry, Advance, ProgressSnapshot};

/// Default upper bound for a single verse lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_SUPPORT_VERSES: usize = 3;
const MAX_SEARCH_VERSES: usize = 5;
const LOCK_TABLE_PRUNE_AT: usize = 1024;

/// The reply to one chat message, with the intent it was classified as.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub intent: ClassifiedIntent,
}

/// The reading a user would be given next, without assigning it.
#[derive(Debug, Clone)]
pub struct ReadingPreview {
    pub text: String,
    pub chapters: Vec<VerseText>,
}

pub struct Orchestrator {
    store: Arc<dyn PersistenceStore>,
    lookup: Arc<dyn VerseTextLookup>,
    clock: Arc<dyn Clock>,
    lookup_timeout: Duration,
    /// Serializes read-modify-write of a single user's rows.
    user_locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn PersistenceStore>, lookup: Arc<dyn VerseTextLookup>) -> Self {
        Self {
            store,
            lookup,
            clock: Arc::new(SystemClock),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Handles one chat message and returns the reply text.
    pub async fn handle(&self, user_id: Uuid, raw_text: &str) -> String {
        self.respond(user_id, raw_text).await.text
    }

    /// Like `handle`, but also reports the classified intent.
    pub async fn respond(&self, user_id: Uuid, raw_text: &str) -> Reply {
        let intent = classify(raw_text);
        debug!(%user_id, intent = intent.label(), "Classified chat message");

        let text = match self.dispatch(user_id, &intent).await {
            Ok(data) => compose(&intent, &data),
            Err(e) => {
                error!(%user_id, intent = intent.label(), "Persistence failure: {:?}", e);
                PERSISTENCE_FAILURE_MESSAGE.to_string()
            }
        };

        let record = ConversationRecord {
            user_id,
            message: raw_text.to_string(),
            response: text.clone(),
            intent: intent.label().to_string(),
            created_at: self.clock.now(),
        };
        if let Err(e) = self.store.record_conversation(&record).await {
            warn!(%user_id, "Failed to record conversation: {:?}", e);
        }

        Reply { text, intent }
    }

    /// The user's progress summary, for the read-only progress endpoint.
    pub async fn progress_snapshot(&self, user_id: Uuid) -> PortResult<ProgressSnapshot> {
        let progress = self.store.get_progress(user_id).await?;
        Ok(ProgressSnapshot::from_progress(&progress))
    }

    /// The user's next reading block with chapter texts. The cursor does not move.
    pub async fn peek_reading(&self, user_id: Uuid) -> PortResult<ReadingPreview> {
        let progress = self.store.get_progress(user_id).await?;
        let mut data = FetchedData::default();
        let outcome = match current_entry(&progress) {
            Some(entry) => {
                data.verses = self.fetch_verses(&entry.chapters()).await;
                ReadingOutcome::Assigned(*entry)
            }
            None => ReadingOutcome::PlanComplete,
        };
        data.reading = Some(outcome);
        Ok(ReadingPreview {
            text: compose(&ClassifiedIntent::DailyReading, &data),
            chapters: data.verses,
        })
    }

    /// Today's featured verse with its text.
    pub async fn verse_of_the_day(&self) -> PortResult<VerseText> {
        let reference = keyword_index::verse_of_the_day(self.clock.today());
        match tokio::time::timeout(self.lookup_timeout, self.lookup.fetch(&reference)).await {
            Ok(result) => result,
            Err(_) => Err(PortError::Unavailable(format!(
                "lookup of {} timed out",
                reference
            ))),
        }
    }

    async fn dispatch(&self, user_id: Uuid, intent: &ClassifiedIntent) -> PortResult<FetchedData> {
        let mut data = FetchedData::default();
        match intent {
            ClassifiedIntent::Greeting | ClassifiedIntent::Unknown { .. } => {}
            ClassifiedIntent::DailyReading => {
                let outcome = {
                    let lock = self.user_lock(user_id);
                    let _guard = lock.lock().await;
                    let progress = self.store.get_progress(user_id).await?;
                    match advance(&progress, self.clock.today()) {
                        Advance::Next { entry, progress } => {
                            self.store.put_progress(user_id, &progress).await?;
                            ReadingOutcome::Assigned(entry)
                        }
                        Advance::PlanComplete => ReadingOutcome::PlanComplete,
                    }
                };
                if let ReadingOutcome::Assigned(entry) = outcome {
                    data.verses = self.fetch_verses(&entry.chapters()).await;
                }
                data.reading = Some(outcome);
            }
            ClassifiedIntent::ReadingCompleted => match self.progress_snapshot(user_id).await {
                Ok(snapshot) => data.progress = Some(snapshot),
                Err(e) => warn!(%user_id, "Progress unavailable for completion reply: {:?}", e),
            },
            ClassifiedIntent::EmotionalSupport { feeling } => {
                let mut references = keyword_index::lookup_by_topic(feeling.topic());
                references.truncate(MAX_SUPPORT_VERSES);
                data.verses = self.fetch_verses(&references).await;
            }
            ClassifiedIntent::Search { topic } => {
                let mut references = keyword_index::lookup_by_topic(topic);
                references.truncate(MAX_SEARCH_VERSES);
                data.verses = self.fetch_verses(&references).await;
            }
            ClassifiedIntent::SaveBookmark { reference, note } => {
                let bookmark = Bookmark {
                    id: Uuid::new_v4(),
                    user_id,
                    reference: reference.clone(),
                    note: note.clone(),
                    topic: None,
                    created_at: self.clock.now(),
                };
                let lock = self.user_lock(user_id);
                let _guard = lock.lock().await;
                self.store.add_bookmark(user_id, &bookmark).await?;
            }
            ClassifiedIntent::ShowProgress => {
                data.progress = Some(self.progress_snapshot(user_id).await?);
            }
            ClassifiedIntent::ShowBookmarks => {
                data.bookmarks = self.store.list_bookmarks(user_id).await?;
            }
        }
        Ok(data)
    }

    /// Looks up every reference concurrently, keeping the input order and
    /// dropping any reference whose lookup fails or times out.
    async fn fetch_verses(&self, references: &[VerseReference]) -> Vec<VerseText> {
        let lookups = references.iter().map(|reference| async move {
            match tokio::time::timeout(self.lookup_timeout, self.lookup.fetch(reference)).await {
                Ok(Ok(verse)) => Some(verse),
                Ok(Err(e)) => {
                    warn!(%reference, "Verse lookup failed: {:?}", e);
                    None
                }
                Err(_) => {
                    warn!(%reference, "Verse lookup timed out after {:?}", self.lookup_timeout);
                    None
                }
            }
        });
        join_all(lookups).await.into_iter().flatten().collect()
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.user_locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.len() >= LOCK_TABLE_PRUNE_AT {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks.entry(user_id).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{HELP_MESSAGE, PLAN_COMPLETE_MESSAGE};
    use crate::domain::UserProgress;
    use crate::reading_plan::plan;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeStore {
        progress: Mutex<HashMap<Uuid, UserProgress>>,
        bookmarks: Mutex<Vec<Bookmark>>,
        conversations: AtomicUsize,
        failing: AtomicBool,
    }

    impl FakeStore {
        fn check(&self) -> PortResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(PortError::Unavailable("store offline".to_string()))
            } else {
                Ok(())
            }
        }

        fn stored_progress(&self, user_id: Uuid) -> Option<UserProgress> {
            self.progress.lock().unwrap().get(&user_id).cloned()
        }
    }

    #[async_trait]
    impl PersistenceStore for FakeStore {
        async fn get_progress(&self, user_id: Uuid) -> PortResult<UserProgress> {
            self.check()?;
            tokio::task::yield_now().await;
            Ok(self
                .progress
                .lock()
                .unwrap()
                .entry(user_id)
                .or_insert_with(|| UserProgress::new(user_id))
                .clone())
        }

        async fn put_progress(&self, user_id: Uuid, progress: &UserProgress) -> PortResult<()> {
            self.check()?;
            tokio::task::yield_now().await;
            self.progress.lock().unwrap().insert(user_id, progress.clone());
            Ok(())
        }

        async fn list_bookmarks(&self, user_id: Uuid) -> PortResult<Vec<Bookmark>> {
            self.check()?;
            let mut found: Vec<_> = self
                .bookmarks
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(found)
        }

        async fn add_bookmark(&self, _user_id: Uuid, bookmark: &Bookmark) -> PortResult<()> {
            self.check()?;
            self.bookmarks.lock().unwrap().push(bookmark.clone());
            Ok(())
        }

        async fn record_conversation(&self, _record: &ConversationRecord) -> PortResult<()> {
            self.conversations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Returns "text of <reference>" unless the reference is listed as broken.
    #[derive(Default)]
    struct FakeLookup {
        broken: Vec<String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VerseTextLookup for FakeLookup {
        async fn fetch(&self, reference: &VerseReference) -> PortResult<VerseText> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let name = reference.to_string();
            if self.broken.contains(&name) {
                return Err(PortError::Unavailable(format!("no text for {}", name)));
            }
            Ok(VerseText {
                reference: reference.clone(),
                text: format!("text of {}", name),
                translation: Some("web".to_string()),
            })
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()))
    }

    fn orchestrator(store: Arc<FakeStore>, lookup: FakeLookup) -> Orchestrator {
        Orchestrator::new(store, Arc::new(lookup)).with_clock(fixed_clock())
    }

    #[tokio::test]
    async fn todays_reading_assigns_first_block_and_moves_cursor() {
        let store = Arc::new(FakeStore::default());
        let orchestrator = orchestrator(store.clone(), FakeLookup::default());
        let user = Uuid::new_v4();

        let reply = orchestrator.handle(user, "Today's reading").await;

        assert!(reply.contains("Matthew 1"));
        assert!(reply.contains("Matthew 2"));
        assert!(reply.contains("text of Matthew 2"));
        let progress = store.stored_progress(user).unwrap();
        assert_eq!(progress.current_plan_index, 1);
        assert_eq!(progress.completed_chapter_count, 2);
        assert_eq!(progress.streak_days, 1);
        assert_eq!(store.conversations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn feeling_anxious_offers_anxiety_or_fear_verses() {
        let orchestrator = orchestrator(Arc::new(FakeStore::default()), FakeLookup::default());
        let reply = orchestrator.handle(Uuid::new_v4(), "I'm feeling anxious").await;

        let candidates: Vec<String> = ["anxiety", "fear"]
            .iter()
            .flat_map(|topic| keyword_index::lookup_by_topic(topic))
            .map(|r| r.to_string())
            .collect();
        assert!(candidates.iter().any(|r| reply.contains(r.as_str())));
    }

    #[tokio::test]
    async fn save_persists_the_bookmark_and_confirms() {
        let store = Arc::new(FakeStore::default());
        let orchestrator = orchestrator(store.clone(), FakeLookup::default());
        let user = Uuid::new_v4();

        let reply = orchestrator.handle(user, "Save John 3:16").await;
        assert!(reply.contains("John 3:16"));

        let saved = store.list_bookmarks(user).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].reference, VerseReference::verse("John", 3, 16));

        let listing = orchestrator.handle(user, "show my bookmarks").await;
        assert!(listing.contains("John 3:16"));
    }

    #[tokio::test]
    async fn nonsense_gets_the_help_message() {
        let orchestrator = orchestrator(Arc::new(FakeStore::default()), FakeLookup::default());
        let reply = orchestrator.respond(Uuid::new_v4(), "asdkjhasd nonsense").await;
        assert!(matches!(reply.intent, ClassifiedIntent::Unknown { .. }));
        assert_eq!(reply.text, HELP_MESSAGE);
    }

    #[tokio::test]
    async fn failed_lookups_are_dropped_not_fatal() {
        let lookup = FakeLookup {
            broken: vec!["1 Corinthians 13:4-8".to_string()],
            ..Default::default()
        };
        let orchestrator = orchestrator(Arc::new(FakeStore::default()), lookup);
        let reply = orchestrator.handle(Uuid::new_v4(), "find verses about love").await;

        assert!(!reply.contains("1 Corinthians 13:4-8"));
        assert!(reply.contains("text of John 3:16"));
        let john = reply.find("John 3:16").unwrap();
        let first_john = reply.find("1 John 4:8").unwrap();
        assert!(john < first_john, "results must keep index order");
    }

    #[tokio::test]
    async fn slow_lookups_time_out_into_a_degraded_reply() {
        let lookup = FakeLookup {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        };
        let orchestrator = orchestrator(Arc::new(FakeStore::default()), lookup)
            .with_lookup_timeout(Duration::from_millis(20));
        let reply = orchestrator.handle(Uuid::new_v4(), "Today's reading").await;
        assert!(reply.contains("Open your Bible to Matthew 1 and Matthew 2"));
    }

    #[tokio::test]
    async fn completed_plan_does_not_advance_or_fetch() {
        let store = Arc::new(FakeStore::default());
        let user = Uuid::new_v4();
        let mut finished = UserProgress::new(user);
        finished.current_plan_index = plan().len();
        finished.completed_chapter_count = 260;
        store.progress.lock().unwrap().insert(user, finished.clone());

        let lookup = Arc::new(FakeLookup::default());
        let orchestrator = Orchestrator::new(store.clone(), lookup.clone()).with_clock(fixed_clock());
        let reply = orchestrator.handle(user, "continue reading").await;

        assert_eq!(reply, PLAN_COMPLETE_MESSAGE);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.stored_progress(user), Some(finished));
    }

    #[tokio::test]
    async fn persistence_failure_returns_apology_without_mutation() {
        let store = Arc::new(FakeStore::default());
        store.failing.store(true, Ordering::SeqCst);
        let orchestrator = orchestrator(store.clone(), FakeLookup::default());
        let user = Uuid::new_v4();

        let reply = orchestrator.handle(user, "Today's reading").await;

        assert_eq!(reply, PERSISTENCE_FAILURE_MESSAGE);
        assert_eq!(store.stored_progress(user), None);
        assert_eq!(
            orchestrator.handle(user, "Save John 3:16").await,
            PERSISTENCE_FAILURE_MESSAGE
        );
        assert!(store.bookmarks.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readings_for_one_user_are_serialized() {
        let store = Arc::new(FakeStore::default());
        let orchestrator = Arc::new(orchestrator(store.clone(), FakeLookup::default()));
        let user = Uuid::new_v4();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move { orchestrator.handle(user, "next chapter").await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let progress = store.stored_progress(user).unwrap();
        assert_eq!(progress.current_plan_index, 10);
        assert_eq!(progress.completed_chapter_count, 20);
    }

    #[tokio::test]
    async fn done_acknowledges_without_moving_the_cursor() {
        let store = Arc::new(FakeStore::default());
        let orchestrator = orchestrator(store.clone(), FakeLookup::default());
        let user = Uuid::new_v4();
        orchestrator.handle(user, "Today's reading").await;

        let reply = orchestrator.respond(user, "done").await;

        assert_eq!(reply.intent, ClassifiedIntent::ReadingCompleted);
        assert!(reply.text.contains("Matthew 3"));
        assert_eq!(store.stored_progress(user).unwrap().current_plan_index, 1);

        store.failing.store(true, Ordering::SeqCst);
        let offline = orchestrator.handle(user, "finished").await;
        assert!(offline.contains("Ready for tomorrow's reading?"));
    }

    #[tokio::test]
    async fn peeking_shows_the_next_block_and_keeps_the_cursor() {
        let store = Arc::new(FakeStore::default());
        let orchestrator = orchestrator(store.clone(), FakeLookup::default());
        let user = Uuid::new_v4();

        let first = orchestrator.peek_reading(user).await.unwrap();
        let again = orchestrator.peek_reading(user).await.unwrap();

        assert!(first.text.contains("Matthew 1"));
        assert_eq!(first.text, again.text);
        assert_eq!(first.chapters.len(), 2);
        assert_eq!(first.chapters[0].text, "text of Matthew 1");
        let progress = store.stored_progress(user).unwrap();
        assert_eq!(progress.current_plan_index, 0);
        assert_eq!(progress.completed_chapter_count, 0);
        assert_eq!(progress.last_read_date, None);

        orchestrator.handle(user, "Today's reading").await;
        let next = orchestrator.peek_reading(user).await.unwrap();
        assert!(next.text.contains("Matthew 3"));
    }

    #[tokio::test]
    async fn peeking_a_finished_plan_reports_completion() {
        let store = Arc::new(FakeStore::default());
        let user = Uuid::new_v4();
        let mut finished = UserProgress::new(user);
        finished.current_plan_index = plan().len();
        store.progress.lock().unwrap().insert(user, finished);

        let preview = orchestrator(store, FakeLookup::default()).peek_reading(user).await.unwrap();
        assert_eq!(preview.text, PLAN_COMPLETE_MESSAGE);
        assert!(preview.chapters.is_empty());
    }

    #[tokio::test]
    async fn progress_reflects_completed_readings() {
        let orchestrator = orchestrator(Arc::new(FakeStore::default()), FakeLookup::default());
        let user = Uuid::new_v4();
        orchestrator.handle(user, "Today's reading").await;

        let reply = orchestrator.handle(user, "show my progress").await;
        assert!(reply.contains("2 / 260"));
        assert!(reply.contains("Matthew 3"));
    }
}
