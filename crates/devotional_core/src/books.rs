//! crates/devotional_core/src/books.rs
//!
//! The canonical book catalogue used for reference parsing and the reading plan.

/// All 66 books in canonical order.
pub const CANONICAL_BOOKS: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
    "Malachi", "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians",
    "2 Corinthians", "Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians",
    "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James",
    "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude", "Revelation",
];

/// Alternative spellings, mapped to their canonical name.
const ALIASES: [(&str, &str); 4] = [
    ("psalm", "Psalms"),
    ("song of songs", "Song of Solomon"),
    ("songs", "Song of Solomon"),
    ("revelations", "Revelation"),
];

/// New Testament books in reading order with their chapter counts.
pub const NEW_TESTAMENT: [(&str, u32); 27] = [
    ("Matthew", 28),
    ("Mark", 16),
    ("Luke", 24),
    ("John", 21),
    ("Acts", 28),
    ("Romans", 16),
    ("1 Corinthians", 16),
    ("2 Corinthians", 13),
    ("Galatians", 6),
    ("Ephesians", 6),
    ("Philippians", 4),
    ("Colossians", 4),
    ("1 Thessalonians", 5),
    ("2 Thessalonians", 3),
    ("1 Timothy", 6),
    ("2 Timothy", 4),
    ("Titus", 3),
    ("Philemon", 1),
    ("Hebrews", 13),
    ("James", 5),
    ("1 Peter", 5),
    ("2 Peter", 3),
    ("1 John", 5),
    ("2 John", 1),
    ("3 John", 1),
    ("Jude", 1),
    ("Revelation", 22),
];

/// Total chapters in the New Testament.
pub fn new_testament_chapter_count() -> u32 {
    NEW_TESTAMENT.iter().map(|(_, chapters)| chapters).sum()
}

/// Resolves a book name case-insensitively to its canonical spelling.
pub fn canonical_book(name: &str) -> Option<&'static str> {
    let wanted = name.trim().to_lowercase();
    CANONICAL_BOOKS
        .iter()
        .copied()
        .find(|book| book.to_lowercase() == wanted)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == wanted)
                .map(|(_, book)| *book)
        })
}

/// Splits a leading book name off `text`.
///
/// The longest matching name wins, so "1 John 4:8" resolves to "1 John"
/// rather than failing on "1". The name must be followed by whitespace.
/// Returns the canonical book and the remainder after the separator.
pub fn split_book_prefix(text: &str) -> Option<(&'static str, &str)> {
    let lowered = text.to_ascii_lowercase();
    let candidates = CANONICAL_BOOKS
        .iter()
        .map(|book| (book.to_lowercase(), *book))
        .chain(ALIASES.iter().map(|(alias, book)| (alias.to_string(), *book)));

    let mut best: Option<(usize, &'static str)> = None;
    for (name, book) in candidates {
        let Some(rest) = lowered.strip_prefix(name.as_str()) else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }
        if best.map_or(true, |(len, _)| name.len() > len) {
            best = Some((name.len(), book));
        }
    }

    best.and_then(|(len, book)| text.get(len..).map(|rest| (book, rest.trim_start())))
}
