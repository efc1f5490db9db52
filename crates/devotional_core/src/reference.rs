//! crates/devotional_core/src/reference.rs
//!
//! The `VerseReference` value type and its text parser.
//!
//! Accepted shape: `<Book> <chapter>[:<verse>[-<verseEnd>]]`, with the book
//! matched case-insensitively against the canonical catalogue.

use std::fmt;
use std::str::FromStr;

use crate::books::split_book_prefix;

/// Errors produced when a verse reference cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Reference text is empty")]
    Empty,
    #[error("Unrecognized book in '{0}'")]
    UnknownBook(String),
    #[error("Missing chapter number after book {0}")]
    MissingChapter(String),
    #[error("Not a valid chapter or verse number: '{0}'")]
    InvalidNumber(String),
    #[error("Verse range ends before it starts: {0}")]
    InvalidRange(String),
}

/// A book/chapter reference, optionally narrowed to a verse or verse range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerseReference {
    pub book: String,
    pub chapter: u32,
    pub verse: Option<u32>,
    pub verse_end: Option<u32>,
}

impl VerseReference {
    /// A reference to a whole chapter.
    pub fn chapter(book: impl Into<String>, chapter: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse: None,
            verse_end: None,
        }
    }

    /// A reference to a single verse.
    pub fn verse(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse: Some(verse),
            verse_end: None,
        }
    }
}

impl fmt::Display for VerseReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.chapter)?;
        if let Some(verse) = self.verse {
            write!(f, ":{}", verse)?;
            if let Some(end) = self.verse_end {
                write!(f, "-{}", end)?;
            }
        }
        Ok(())
    }
}

impl FromStr for VerseReference {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (reference, rest) = parse_leading_reference(s)?;
        if !rest.is_empty() {
            return Err(ParseError::InvalidNumber(rest.to_string()));
        }
        Ok(reference)
    }
}

/// Parses a reference at the start of `text`, returning it together with
/// whatever text follows the chapter/verse token (trimmed).
pub fn parse_leading_reference(text: &str) -> Result<(VerseReference, &str), ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let (book, rest) =
        split_book_prefix(text).ok_or_else(|| ParseError::UnknownBook(text.to_string()))?;

    let (token, remainder) = match rest.split_once(char::is_whitespace) {
        Some((token, remainder)) => (token, remainder.trim()),
        None => (rest, ""),
    };
    let token = token.trim_end_matches([',', '.', ';', '!', '?']);
    if token.is_empty() {
        return Err(ParseError::MissingChapter(book.to_string()));
    }

    let (chapter, verses) = match token.split_once(':') {
        Some((chapter, verses)) => (chapter, Some(verses)),
        None => (token, None),
    };
    let chapter = parse_number(chapter)?;

    let (verse, verse_end) = match verses {
        None => (None, None),
        Some(verses) => match verses.split_once(['-', '–']) {
            Some((start, end)) => {
                let start = parse_number(start)?;
                let end = parse_number(end)?;
                if end < start {
                    return Err(ParseError::InvalidRange(token.to_string()));
                }
                (Some(start), Some(end))
            }
            None => (Some(parse_number(verses)?), None),
        },
    };

    Ok((
        VerseReference {
            book: book.to_string(),
            chapter,
            verse,
            verse_end,
        },
        remainder,
    ))
}

fn parse_number(text: &str) -> Result<u32, ParseError> {
    match text.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ParseError::InvalidNumber(text.to_string())),
    }
}
