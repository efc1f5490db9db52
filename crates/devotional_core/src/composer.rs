//! crates/devotional_core/src/composer.rs
//!
//! Turns a classified intent plus the data fetched for it into the reply text.
//! Pure formatting: no I/O, no clock, no randomness.

use crate::domain::{Bookmark, ClassifiedIntent, Feeling, ReadingPlanEntry, VerseText};
use crate::reading_plan::ProgressSnapshot;

pub const GREETING_MESSAGE: &str = "Hello! 🙏 I'm here to help you grow in God's Word.\n\n\
I can help you with:\n\
📖 Daily Bible reading (2 chapters from the New Testament)\n\
💭 Finding verses for life challenges\n\
🔖 Saving favorite verses\n\
📊 Tracking your progress\n\n\
Try saying:\n\
• 'Today's reading'\n\
• 'I'm feeling anxious'\n\
• 'Save John 3:16'\n\
• 'Show my progress'";

pub const HELP_MESSAGE: &str = "I'm not sure what you meant, but I'd love to help! Try:\n\
• 'Today's reading'\n\
• 'I'm feeling anxious'\n\
• 'Find verses about peace'\n\
• 'Save John 3:16'\n\
• 'Show my progress'\n\
• 'Show my bookmarks'";

pub const NO_MATCHES_MESSAGE: &str = "I couldn't find verses for that right now. \
Try rephrasing, or tell me how you're feeling and we'll look together.";

pub const PLAN_COMPLETE_MESSAGE: &str = "🎉 You've finished the whole New Testament reading plan! \
Praise God for your faithfulness. Every chapter from Matthew to Revelation is now behind you.";

pub const READING_UNAVAILABLE_MESSAGE: &str = "I couldn't retrieve today's reading. Please try again.";

pub const PROGRESS_UNAVAILABLE_MESSAGE: &str = "I couldn't load your progress right now. Please try again.";

pub const PERSISTENCE_FAILURE_MESSAGE: &str = "I'm sorry, I couldn't reach your saved data just now. \
Nothing was changed. Please try again in a moment.";

const SAVE_HINT: &str = "💡 Want to save any of these? Say **'Save [verse reference]'**";

const PREVIEW_CHARS: usize = 300;
const MAX_SEARCH_RESULTS: usize = 5;
const MAX_LISTED_BOOKMARKS: usize = 10;

/// What the orchestrator found for a daily reading request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOutcome {
    Assigned(ReadingPlanEntry),
    PlanComplete,
}

/// Everything a handler gathered for the composer. Fields not relevant to
/// the intent are left empty.
#[derive(Debug, Clone, Default)]
pub struct FetchedData {
    /// Verse or chapter texts, in reference order. Failed lookups are absent.
    pub verses: Vec<VerseText>,
    pub reading: Option<ReadingOutcome>,
    pub progress: Option<ProgressSnapshot>,
    pub bookmarks: Vec<Bookmark>,
}

/// Builds the reply for one intent.
pub fn compose(intent: &ClassifiedIntent, data: &FetchedData) -> String {
    match intent {
        ClassifiedIntent::Greeting => GREETING_MESSAGE.to_string(),
        ClassifiedIntent::DailyReading => match data.reading {
            Some(ReadingOutcome::Assigned(entry)) => daily_reading(&entry, &data.verses),
            Some(ReadingOutcome::PlanComplete) => PLAN_COMPLETE_MESSAGE.to_string(),
            None => READING_UNAVAILABLE_MESSAGE.to_string(),
        },
        ClassifiedIntent::ReadingCompleted => completion(data.progress.as_ref()),
        ClassifiedIntent::EmotionalSupport { feeling } => comfort(*feeling, &data.verses),
        ClassifiedIntent::Search { topic } => search_results(topic, &data.verses),
        ClassifiedIntent::SaveBookmark { reference, note } => {
            let mut message = format!("✅ **Bookmark Saved!**\n\n📌 **Verse:** {}\n", reference);
            if let Some(note) = note {
                message.push_str(&format!("📝 **Note:** {}\n", note));
            }
            message.push_str(
                "\n💡 You can view all your bookmarks anytime by saying **'Show my bookmarks'**",
            );
            message
        }
        ClassifiedIntent::ShowProgress => match &data.progress {
            Some(snapshot) => progress(snapshot),
            None => PROGRESS_UNAVAILABLE_MESSAGE.to_string(),
        },
        ClassifiedIntent::ShowBookmarks => format_bookmarks(&data.bookmarks),
        ClassifiedIntent::Unknown { .. } => HELP_MESSAGE.to_string(),
    }
}

fn daily_reading(entry: &ReadingPlanEntry, chapters: &[VerseText]) -> String {
    let references: Vec<String> = entry.chapters().iter().map(|r| r.to_string()).collect();
    let mut message = format!(
        "📖 **Today's Reading**\n\n**Chapters:** {}\n\n---\n\n",
        references.join(", ")
    );

    if chapters.is_empty() {
        message.push_str(&format!(
            "I couldn't load the chapter text right now. Open your Bible to {} and read along.\n\n",
            references.join(" and ")
        ));
    }
    for (i, chapter) in chapters.iter().enumerate() {
        message.push_str(&format!("**{}**\n\n{}\n\n", chapter.reference, preview(&chapter.text)));
        if i + 1 < chapters.len() {
            message.push_str("---\n\n");
        }
    }

    message.push_str(&format!(
        "💭 **Reflection:** {}\n\n---\n\n",
        reflection_question(entry.book, entry.chapter_start)
    ));
    message.push_str("💡 Want to bookmark a verse? Just say **'Save [verse reference]'**");
    message
}

fn completion(snapshot: Option<&ProgressSnapshot>) -> String {
    let mut message = "🎉 Well done! Every chapter you read is time well spent with God.".to_string();
    match snapshot {
        Some(ProgressSnapshot {
            plan_complete: true,
            ..
        }) => {
            message.push_str("\n\n");
            message.push_str(PLAN_COMPLETE_MESSAGE);
            return message;
        }
        Some(ProgressSnapshot {
            current_position: Some((book, chapter)),
            completed_chapters,
            total_chapters,
            ..
        }) => message.push_str(&format!(
            "\n\n📊 {} / {} chapters read. Next up: **{} {}**.",
            completed_chapters, total_chapters, book, chapter
        )),
        _ => {}
    }
    message.push_str("\n\n📚 Ready for tomorrow's reading? I'll be here when you are!");
    message
}

fn comfort(feeling: Feeling, verses: &[VerseText]) -> String {
    if verses.is_empty() {
        return NO_MATCHES_MESSAGE.to_string();
    }

    let mut message = format!("{}\n\n**Here are some verses for you:**\n\n", opening(feeling));
    push_verses(&mut message, verses, |v| format!("**{}**\n_{}_\n\n", v.reference, v.text));
    message.push_str("\n💙 You are loved and not alone.\n\n");
    message.push_str("💬 Want to talk more? I'm here to listen.\n");
    message.push_str(SAVE_HINT);
    message
}

fn search_results(topic: &str, verses: &[VerseText]) -> String {
    if verses.is_empty() {
        return NO_MATCHES_MESSAGE.to_string();
    }

    let shown = &verses[..verses.len().min(MAX_SEARCH_RESULTS)];
    let mut message = format!("🔍 **Verses about: {}**\n\n", topic);
    push_verses(&mut message, shown, |v| format!("**{}**\n{}\n\n", v.reference, v.text));
    message.push('\n');
    message.push_str(SAVE_HINT);
    message
}

fn push_verses(message: &mut String, verses: &[VerseText], render: impl Fn(&VerseText) -> String) {
    for (i, verse) in verses.iter().enumerate() {
        message.push_str(&render(verse));
        if i + 1 < verses.len() {
            message.push_str("---\n\n");
        }
    }
}

fn progress(snapshot: &ProgressSnapshot) -> String {
    let position = match snapshot.current_position {
        Some((book, chapter)) => format!("{} {}", book, chapter),
        None => "Plan complete 🎉".to_string(),
    };
    let mut message = format!(
        "📊 **Your Reading Progress**\n\n\
         📖 **Chapters Completed:** {} / {}\n\
         📈 **Progress:** {}%\n\
         📍 **Current Position:** {}\n\
         🔥 **Streak:** {} days\n\n",
        snapshot.completed_chapters,
        snapshot.total_chapters,
        snapshot.percent,
        position,
        snapshot.streak_days
    );

    let filled = ((snapshot.percent / 10.0) as usize).min(10);
    message.push_str(&format!(
        "{}{} {}%\n\n",
        "█".repeat(filled),
        "░".repeat(10 - filled),
        snapshot.percent
    ));

    message.push_str(match snapshot.percent {
        _ if snapshot.plan_complete => {
            "🏆 You've read the entire New Testament. Praise God for your faithfulness!"
        }
        p if p < 10.0 => "🌱 Great start! Keep building the habit of daily reading.",
        p if p < 50.0 => "🌿 You're making excellent progress! Stay consistent.",
        p if p < 90.0 => "🌳 Wonderful dedication! You're over halfway through the New Testament.",
        _ => "🎉 Almost there! You're nearly finished with the entire New Testament!",
    });
    message
}

/// Formats a bookmark list, newest first as given.
pub fn format_bookmarks(bookmarks: &[Bookmark]) -> String {
    if bookmarks.is_empty() {
        return "📖 You haven't saved any bookmarks yet.\n\n\
                Say **'Save [verse reference]'** to bookmark your favorite verses!"
            .to_string();
    }

    let mut message = format!("🔖 **Your Bookmarks** ({} saved)\n\n", bookmarks.len());
    for bookmark in bookmarks.iter().take(MAX_LISTED_BOOKMARKS) {
        message.push_str(&format!("📌 **{}**\n", bookmark.reference));
        if let Some(note) = &bookmark.note {
            message.push_str(&format!("   💭 {}\n", note));
        }
        if let Some(topic) = &bookmark.topic {
            message.push_str(&format!("   🏷️ {}\n", topic));
        }
        message.push('\n');
    }
    if bookmarks.len() > MAX_LISTED_BOOKMARKS {
        message.push_str(&format!(
            "\n_...and {} more_",
            bookmarks.len() - MAX_LISTED_BOOKMARKS
        ));
    }
    message
}

fn opening(feeling: Feeling) -> &'static str {
    match feeling {
        Feeling::Anxious => "I understand you're feeling anxious. God cares deeply about your worries.",
        Feeling::Afraid => "It's okay to feel afraid. God promises to be with you.",
        Feeling::Sad => "I'm sorry you're going through a difficult time. God is close to the brokenhearted.",
        Feeling::Lonely => "Loneliness is hard. Remember, God never leaves you.",
        Feeling::Angry => "Your feelings are valid. Let's find peace in God's Word.",
        Feeling::Doubtful => "Doubt is part of the journey. God can handle your questions.",
        Feeling::Guilty => "God's grace is greater than any guilt. Let's remember His forgiveness.",
        Feeling::Hopeless => "Even in darkness, there is hope in Christ.",
        Feeling::Weak => "When we are weak, God is strong. His strength is made perfect in our weakness.",
    }
}

/// A reflection prompt for a passage; the chapter number picks among the
/// book's questions so the same passage always gets the same prompt.
pub fn reflection_question(book: &str, chapter: u32) -> &'static str {
    let questions: &[&str] = match book {
        "Matthew" | "Mark" | "Luke" | "John" => &[
            "How does this passage challenge your understanding of discipleship?",
            "What does Jesus' teaching here reveal about God's kingdom?",
            "How can you apply this teaching in your daily life?",
        ],
        "Romans" | "Galatians" | "Ephesians" => &[
            "How does this deepen your understanding of the Gospel?",
            "What does this passage teach about grace?",
            "How should this truth transform your daily walk?",
        ],
        _ => &[
            "What is God teaching you through this passage?",
            "How can you apply this truth today?",
            "What stands out to you most in this reading?",
            "How does this passage point to Christ?",
            "What action will you take in response to this Scripture?",
        ],
    };
    questions[chapter as usize % questions.len()]
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
