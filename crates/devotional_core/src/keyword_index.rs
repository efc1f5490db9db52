//! crates/devotional_core/src/keyword_index.rs
//!
//! Static topic → verse reference table.
//!
//! The table is built once, on first use, and is read-only for the rest of the
//! process lifetime. Lookups iterate it in declaration order, which is what
//! makes repeated queries return identical sequences.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};

use crate::domain::VerseReference;

/// One row of the index. Keywords are lowercase, trimmed and unique.
#[derive(Debug, Clone)]
pub struct KeywordEntry {
    pub keyword: &'static str,
    pub references: Vec<VerseReference>,
}

const KEYWORD_TABLE: &[(&str, &[&str])] = &[
    // Emotions
    ("anxiety", &["Philippians 4:6-7", "Matthew 6:34", "Isaiah 41:10", "1 Peter 5:7", "Psalms 55:22"]),
    ("fear", &["2 Timothy 1:7", "Isaiah 41:10", "Psalms 56:3", "Joshua 1:9", "Deuteronomy 31:6"]),
    ("sad", &["Psalms 34:18", "Matthew 5:4", "2 Corinthians 1:3-4", "Psalms 147:3", "John 14:1"]),
    ("sadness", &["Psalms 34:18", "Matthew 5:4", "2 Corinthians 1:3-4"]),
    ("lonely", &["Deuteronomy 31:6", "Psalms 68:6", "Matthew 28:20", "Hebrews 13:5"]),
    ("angry", &["Ephesians 4:26-27", "Proverbs 15:1", "James 1:19-20", "Psalms 37:8"]),
    ("doubt", &["James 1:6-8", "Hebrews 11:1", "Mark 9:24", "Jude 1:22"]),
    ("guilt", &["1 John 1:9", "Romans 8:1", "Psalms 103:12", "Isaiah 43:25"]),
    ("hopeless", &["Jeremiah 29:11", "Romans 15:13", "Psalms 42:5", "Lamentations 3:22-23"]),
    ("weak", &["Isaiah 40:31", "Philippians 4:13", "Psalms 46:1", "2 Corinthians 12:9"]),
    // Spiritual concepts
    ("love", &["1 Corinthians 13:4-8", "John 3:16", "1 John 4:8", "Romans 8:38-39", "John 15:12"]),
    ("peace", &["John 14:27", "Philippians 4:7", "Romans 5:1", "Isaiah 26:3", "Colossians 3:15"]),
    ("joy", &["Nehemiah 8:10", "Psalms 16:11", "John 15:11", "Romans 15:13", "Philippians 4:4"]),
    ("faith", &["Hebrews 11:1", "Romans 10:17", "James 2:17", "2 Corinthians 5:7", "Mark 11:22"]),
    ("hope", &["Romans 15:13", "Jeremiah 29:11", "Hebrews 6:19", "Psalms 42:11", "Romans 8:24-25"]),
    ("trust", &["Proverbs 3:5-6", "Psalms 56:3", "Isaiah 26:4", "Nahum 1:7", "Psalms 37:5"]),
    ("prayer", &["Matthew 6:6", "Philippians 4:6", "1 Thessalonians 5:17", "James 5:16", "Luke 18:1"]),
    ("worship", &["Psalms 95:6", "John 4:24", "Psalms 100:2", "Romans 12:1", "Hebrews 13:15"]),
    // Life situations
    ("strength", &["Philippians 4:13", "Isaiah 40:31", "Psalms 46:1", "2 Corinthians 12:9"]),
    ("wisdom", &["James 1:5", "Proverbs 3:5-6", "Colossians 3:16", "Proverbs 2:6"]),
    ("guidance", &["Proverbs 3:5-6", "Psalms 32:8", "Isaiah 30:21", "James 1:5"]),
    ("patience", &["James 1:3-4", "Romans 12:12", "Galatians 5:22", "Psalms 37:7"]),
    ("forgiveness", &["1 John 1:9", "Ephesians 4:32", "Matthew 6:14-15", "Colossians 3:13"]),
    ("healing", &["Psalms 147:3", "Jeremiah 17:14", "Exodus 15:26", "1 Peter 2:24"]),
    ("comfort", &["2 Corinthians 1:3-4", "Psalms 23:4", "Matthew 5:4", "John 14:1"]),
    ("provision", &["Philippians 4:19", "Matthew 6:26", "Psalms 23:1", "Luke 12:24"]),
    // Common words
    ("beginning", &["Genesis 1:1", "John 1:1", "Proverbs 9:10", "Psalms 111:10"]),
    ("shepherd", &["Psalms 23:1", "John 10:11", "Hebrews 13:20", "1 Peter 5:4"]),
    ("light", &["John 8:12", "Matthew 5:14", "Psalms 119:105", "1 John 1:5"]),
    ("life", &["John 10:10", "John 14:6", "Romans 6:23", "1 John 5:12"]),
    ("salvation", &["Romans 10:9", "Ephesians 2:8-9", "Acts 4:12", "John 3:16"]),
    ("grace", &["Ephesians 2:8-9", "2 Corinthians 12:9", "Romans 3:24", "Titus 2:11"]),
    ("eternal", &["John 3:16", "John 17:3", "1 John 5:13", "Romans 6:23"]),
    ("kingdom", &["Matthew 6:33", "Luke 17:21", "Mark 1:15", "Matthew 5:3"]),
    ("glory", &["Romans 8:18", "2 Corinthians 4:17", "Psalms 19:1", "Isaiah 60:1"]),
    ("heaven", &["Matthew 6:20", "Philippians 3:20", "John 14:2", "Revelation 21:4"]),
];

const DAILY_VERSES: [&str; 20] = [
    "Philippians 4:13", "Jeremiah 29:11", "Proverbs 3:5-6", "Isaiah 40:31", "Romans 8:28",
    "Psalms 23:1", "John 3:16", "Matthew 6:33", "Joshua 1:9", "Psalms 46:1",
    "2 Corinthians 12:9", "Philippians 4:6-7", "Isaiah 41:10", "Proverbs 16:3", "Psalms 37:4",
    "Matthew 11:28", "Romans 15:13", "Psalms 118:24", "Colossians 3:23", "James 1:5",
];

static INDEX: LazyLock<Vec<KeywordEntry>> = LazyLock::new(|| {
    KEYWORD_TABLE
        .iter()
        .map(|(keyword, references)| KeywordEntry {
            keyword: *keyword,
            references: references.iter().map(|r| static_reference(r)).collect(),
        })
        .collect()
});

fn static_reference(text: &str) -> VerseReference {
    text.parse()
        .unwrap_or_else(|e| panic!("invalid reference '{}' in static table: {}", text, e))
}

/// The whole index, in declaration order.
pub fn entries() -> &'static [KeywordEntry] {
    &INDEX
}

/// Whether `topic` is exactly one of the index keywords.
pub fn is_keyword(topic: &str) -> bool {
    let topic = topic.trim().to_lowercase();
    INDEX.iter().any(|entry| entry.keyword == topic)
}

/// Finds verse references for a topic.
///
/// An exact keyword match returns that keyword's references unchanged.
/// Otherwise every keyword that contains the topic, or is contained in it,
/// contributes its references in table order; a reference already
/// contributed by an earlier keyword is skipped.
pub fn lookup_by_topic(topic: &str) -> Vec<VerseReference> {
    let topic = topic.trim().to_lowercase();
    if topic.is_empty() {
        return Vec::new();
    }

    if let Some(entry) = INDEX.iter().find(|entry| entry.keyword == topic) {
        return entry.references.clone();
    }

    let mut seen = HashSet::new();
    INDEX
        .iter()
        .filter(|entry| entry.keyword.contains(topic.as_str()) || topic.contains(entry.keyword))
        .flat_map(|entry| entry.references.iter())
        .filter(|reference| seen.insert((*reference).clone()))
        .cloned()
        .collect()
}

/// The verse shown for `date`; stable for the whole day.
pub fn verse_of_the_day(date: NaiveDate) -> VerseReference {
    let slot = date.num_days_from_ce().rem_euclid(DAILY_VERSES.len() as i32) as usize;
    static_reference(DAILY_VERSES[slot])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_tables_parse_and_keywords_are_unique() {
        let mut keywords = HashSet::new();
        for entry in entries() {
            assert_eq!(entry.keyword, entry.keyword.trim().to_lowercase());
            assert!(keywords.insert(entry.keyword), "duplicate keyword {}", entry.keyword);
            assert!(!entry.references.is_empty());
        }
        for text in DAILY_VERSES {
            static_reference(text);
        }
    }

    #[test]
    fn exact_match_returns_the_keyword_row() {
        let love = lookup_by_topic("love");
        assert_eq!(love.len(), 5);
        assert_eq!(love[0].to_string(), "1 Corinthians 13:4-8");
        assert_eq!(love[1], VerseReference::verse("John", 3, 16));
    }

    #[test]
    fn lookup_is_deterministic() {
        assert_eq!(lookup_by_topic("love"), lookup_by_topic("love"));
        assert_eq!(lookup_by_topic("  LOVE "), lookup_by_topic("love"));
    }

    #[test]
    fn substring_fallback_merges_in_table_order_without_duplicates() {
        let found = lookup_by_topic("feeling sad");
        assert_eq!(found, lookup_by_topic("sad"));

        let merged = lookup_by_topic("sadnes");
        assert_eq!(merged.first().map(|r| r.to_string()), Some("Psalms 34:18".to_string()));
        let unique: HashSet<_> = merged.iter().collect();
        assert_eq!(unique.len(), merged.len());
    }

    #[test]
    fn unknown_and_empty_topics_find_nothing() {
        assert!(lookup_by_topic("zzzz").is_empty());
        assert!(lookup_by_topic("   ").is_empty());
    }

    #[test]
    fn verse_of_the_day_is_stable_per_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(verse_of_the_day(date), verse_of_the_day(date));
        let next = date.succ_opt().unwrap();
        assert_ne!(verse_of_the_day(date), verse_of_the_day(next));
    }
}
