//! crates/devotional_core/src/intent.rs
//!
//! Rule-based intent classification for free-text chat messages.
//!
//! Rule groups are tried in a fixed order and the first match wins, so more
//! specific phrasings are listed before the generic fallbacks. Classification
//! is a pure function of the message and the static tables below.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{ClassifiedIntent, Feeling};
use crate::keyword_index;
use crate::reference::parse_leading_reference;

const GREETINGS: [&str; 7] = [
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "hi there",
];

const COMPLETION_WORDS: [&str; 3] = ["done", "finished", "completed"];

const DAILY_READING_PHRASES: [&str; 7] = [
    "today's reading",
    "todays reading",
    "continue reading",
    "next chapter",
    "daily reading",
    "read today",
    "next reading",
];

const SAVE_PREFIXES: [&str; 2] = ["save ", "bookmark "];

const PROGRESS_PHRASES: [&str; 5] = [
    "my progress",
    "show progress",
    "how far",
    "where am i",
    "what chapter am i",
];

const BOOKMARK_LIST_PHRASES: [&str; 4] = [
    "my bookmarks",
    "show bookmarks",
    "list bookmarks",
    "saved verses",
];

/// Feeling trigger words, scanned in order.
const FEELING_WORDS: &[(&str, Feeling)] = &[
    ("anxious", Feeling::Anxious),
    ("anxiety", Feeling::Anxious),
    ("worried", Feeling::Anxious),
    ("worry", Feeling::Anxious),
    ("stress", Feeling::Anxious),
    ("overwhelmed", Feeling::Anxious),
    ("afraid", Feeling::Afraid),
    ("scared", Feeling::Afraid),
    ("fear", Feeling::Afraid),
    ("terrified", Feeling::Afraid),
    ("sad", Feeling::Sad),
    ("depressed", Feeling::Sad),
    ("sorrow", Feeling::Sad),
    ("grief", Feeling::Sad),
    ("lonely", Feeling::Lonely),
    ("alone", Feeling::Lonely),
    ("isolated", Feeling::Lonely),
    ("abandoned", Feeling::Lonely),
    ("angry", Feeling::Angry),
    ("furious", Feeling::Angry),
    ("frustrated", Feeling::Angry),
    ("doubt", Feeling::Doubtful),
    ("uncertain", Feeling::Doubtful),
    ("guilty", Feeling::Guilty),
    ("guilt", Feeling::Guilty),
    ("ashamed", Feeling::Guilty),
    ("shame", Feeling::Guilty),
    ("hopeless", Feeling::Hopeless),
    ("despair", Feeling::Hopeless),
    ("discouraged", Feeling::Hopeless),
    ("giving up", Feeling::Hopeless),
    ("weak", Feeling::Weak),
    ("exhausted", Feeling::Weak),
    ("weary", Feeling::Weak),
    ("tired", Feeling::Weak),
];

static SEARCH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"what does the bible say about\s+(.+)",
        r"bible says about\s+(.+)",
        r"scriptures? about\s+(.+)",
        r"show me verses? (?:about|on|for)\s+(.+)",
        r"\bfind verses? (?:about|on|for)\s+(.+)",
        r"\bverses? (?:about|on|for)\s+(.+)",
        r"\bsearch for\s+(.+)",
        r"\bsearch\s+(.+)",
        r"\blook for\s+(.+)",
        r"\blook up\s+(.+)",
        r"\bfind\s+(.+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("search pattern must compile"))
    .collect()
});

static TOPIC_TRAILER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(please|thanks|thank you|in the bible)$").expect("trailer pattern must compile")
});

/// Classifies one raw chat message.
pub fn classify(raw_text: &str) -> ClassifiedIntent {
    let raw = collapse_whitespace(raw_text);
    let raw = raw.as_str();
    let text = normalize(raw);
    let bare = text.trim_end_matches(['!', '.', '?', ',']).trim();

    if GREETINGS.contains(&bare) {
        return ClassifiedIntent::Greeting;
    }

    if COMPLETION_WORDS.contains(&bare) {
        return ClassifiedIntent::ReadingCompleted;
    }

    if contains_any(&text, &DAILY_READING_PHRASES) {
        return ClassifiedIntent::DailyReading;
    }

    if let Some(rest) = strip_save_prefix(raw) {
        return match parse_leading_reference(rest) {
            Ok((reference, trailing)) => ClassifiedIntent::SaveBookmark {
                reference,
                note: clean_note(trailing),
            },
            Err(_) => ClassifiedIntent::Unknown {
                raw_text: raw.to_string(),
            },
        };
    }

    if contains_any(&text, &PROGRESS_PHRASES) {
        return ClassifiedIntent::ShowProgress;
    }

    if contains_any(&text, &BOOKMARK_LIST_PHRASES) {
        return ClassifiedIntent::ShowBookmarks;
    }

    if let Some(topic) = extract_search_topic(&text) {
        return ClassifiedIntent::Search { topic };
    }

    if let Some(feeling) = detect_feeling(&text) {
        return ClassifiedIntent::EmotionalSupport { feeling };
    }

    if keyword_index::is_keyword(bare) {
        return ClassifiedIntent::Search {
            topic: bare.to_string(),
        };
    }

    ClassifiedIntent::Unknown {
        raw_text: raw.to_string(),
    }
}

/// The first feeling whose trigger word appears in the normalized text.
pub fn detect_feeling(text: &str) -> Option<Feeling> {
    FEELING_WORDS
        .iter()
        .find(|(word, _)| text.contains(word))
        .map(|(_, feeling)| *feeling)
}

/// Pulls the topic out of a search request, lowercased and trimmed.
pub fn extract_search_topic(text: &str) -> Option<String> {
    SEARCH_PATTERNS.iter().find_map(|pattern| {
        let captured = pattern.captures(text)?.get(1)?.as_str();
        let topic = captured.trim().trim_end_matches(['.', '?', '!']).trim();
        let topic = TOPIC_TRAILER.replace(topic, "");
        let topic = topic.trim();
        (!topic.is_empty()).then(|| topic.to_lowercase())
    })
}

/// Lowercases, straightens curly apostrophes and collapses every whitespace
/// run to a single space.
fn normalize(text: &str) -> String {
    collapse_whitespace(text)
        .to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

fn strip_save_prefix(raw: &str) -> Option<&str> {
    let raw = strip_prefix_ignore_case(raw, "please ").unwrap_or(raw);
    SAVE_PREFIXES
        .iter()
        .find_map(|prefix| strip_prefix_ignore_case(raw, prefix))
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn clean_note(trailing: &str) -> Option<String> {
    let note = trailing
        .trim_start_matches(['-', ':', ',', '\u{2013}', '\u{2014}'])
        .trim();
    (!note.is_empty()).then(|| note.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VerseReference;

    #[test]
    fn reading_phrases_ignore_case_and_whitespace() {
        for text in [
            "Today's reading",
            "  TODAY'S READING  ",
            "today\u{2019}s reading please",
            "Continue reading",
            "next chapter",
            "Today's  reading",
            "continue\treading",
            "next\nchapter",
            "  daily \r\n reading ",
        ] {
            assert_eq!(classify(text), ClassifiedIntent::DailyReading, "{}", text);
        }
    }

    #[test]
    fn save_parses_reference_and_note() {
        assert_eq!(
            classify("Save John 3:16"),
            ClassifiedIntent::SaveBookmark {
                reference: VerseReference::verse("John", 3, 16),
                note: None,
            }
        );
        assert_eq!(
            classify("bookmark Philippians 4:6-7 - for exam week"),
            ClassifiedIntent::SaveBookmark {
                reference: "Philippians 4:6-7".parse().unwrap(),
                note: Some("for exam week".to_string()),
            }
        );
    }

    #[test]
    fn save_with_unparsable_reference_is_unknown() {
        assert_eq!(
            classify("save this"),
            ClassifiedIntent::Unknown {
                raw_text: "save this".to_string()
            }
        );
        assert!(matches!(classify("Save John abc"), ClassifiedIntent::Unknown { .. }));
    }

    #[test]
    fn progress_and_bookmark_listing() {
        assert_eq!(classify("Show my progress"), ClassifiedIntent::ShowProgress);
        assert_eq!(classify("how far am I?"), ClassifiedIntent::ShowProgress);
        assert_eq!(classify("show my bookmarks"), ClassifiedIntent::ShowBookmarks);
        assert_eq!(classify("My bookmarks"), ClassifiedIntent::ShowBookmarks);
    }

    #[test]
    fn search_extracts_a_clean_topic() {
        assert_eq!(
            classify("Find verses about Peace please"),
            ClassifiedIntent::Search {
                topic: "peace".to_string()
            }
        );
        assert_eq!(
            classify("what does the Bible say about forgiveness?"),
            ClassifiedIntent::Search {
                topic: "forgiveness".to_string()
            }
        );
        assert_eq!(
            classify("search hope"),
            ClassifiedIntent::Search {
                topic: "hope".to_string()
            }
        );
    }

    #[test]
    fn feelings_map_to_emotional_support() {
        assert_eq!(
            classify("I'm feeling anxious"),
            ClassifiedIntent::EmotionalSupport {
                feeling: Feeling::Anxious
            }
        );
        assert_eq!(
            classify("I am so afraid of tomorrow"),
            ClassifiedIntent::EmotionalSupport {
                feeling: Feeling::Afraid
            }
        );
        assert_eq!(
            classify("I feel weak today"),
            ClassifiedIntent::EmotionalSupport {
                feeling: Feeling::Weak
            }
        );
    }

    #[test]
    fn greetings_and_bare_topics() {
        assert_eq!(classify("Hello!"), ClassifiedIntent::Greeting);
        assert_eq!(classify("good morning"), ClassifiedIntent::Greeting);
        assert_eq!(
            classify("Grace"),
            ClassifiedIntent::Search {
                topic: "grace".to_string()
            }
        );
    }

    #[test]
    fn inner_whitespace_does_not_break_other_phrases() {
        assert_eq!(classify("show  my\tprogress"), ClassifiedIntent::ShowProgress);
        assert_eq!(classify("my\nbookmarks"), ClassifiedIntent::ShowBookmarks);
        assert_eq!(
            classify("find   verses\tabout  peace"),
            ClassifiedIntent::Search {
                topic: "peace".to_string()
            }
        );
        assert_eq!(
            classify("Save   John 3:16"),
            ClassifiedIntent::SaveBookmark {
                reference: VerseReference::verse("John", 3, 16),
                note: None,
            }
        );
        assert_eq!(
            classify("asdkjhasd   nonsense"),
            ClassifiedIntent::Unknown {
                raw_text: "asdkjhasd nonsense".to_string()
            }
        );
    }

    #[test]
    fn completion_words_acknowledge_a_reading() {
        for text in ["done", "Finished!", "  completed. "] {
            assert_eq!(classify(text), ClassifiedIntent::ReadingCompleted, "{}", text);
        }
    }

    #[test]
    fn gibberish_is_unknown() {
        assert_eq!(
            classify("asdkjhasd nonsense"),
            ClassifiedIntent::Unknown {
                raw_text: "asdkjhasd nonsense".to_string()
            }
        );
    }
}
