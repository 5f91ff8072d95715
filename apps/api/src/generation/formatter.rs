//! Output Formatter: normalizes raw LLM text into the target paragraph
//! count with no markdown emphasis.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::experiments::service::strip_experiment_block;
use crate::models::generation::RecommendationLength;

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"));

/// Heading hashes or list bullets at the start of a line.
static LINE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:#{1,6}[ \t]+|[-+•][ \t]+)").expect("valid marker regex"));

/// Sentence terminator plus any closing quotes/brackets and trailing whitespace.
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]["'”’)\]]*\s+"#).expect("valid sentence regex"));

/// Formats a generated letter to exactly `length.paragraph_count()` paragraphs
/// when the text holds enough sentences, separated by one blank line.
pub fn format_recommendation(raw: &str, length: RecommendationLength) -> String {
    let target = length.paragraph_count();
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned = strip_markdown(&strip_experiment_block(&normalized));

    let mut paragraphs = split_paragraphs(&cleaned);

    if paragraphs.len() > target {
        // Surplus paragraphs fold into the last kept one.
        let tail = paragraphs.split_off(target - 1);
        paragraphs.push(tail.join(" "));
    } else if paragraphs.len() < target {
        let sentences: Vec<String> = paragraphs.iter().flat_map(|p| split_sentences(p)).collect();
        if sentences.len() >= target {
            paragraphs = distribute(sentences, target);
        }
    }

    paragraphs.join("\n\n")
}

/// Non-empty paragraphs with inner whitespace collapsed.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(text.trim())
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

fn strip_markdown(text: &str) -> String {
    let without_markers = LINE_MARKER.replace_all(text, "");
    without_markers
        .replace("__", "")
        .chars()
        .filter(|c| *c != '*' && *c != '`')
        .collect()
}

fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(paragraph) {
        let sentence = paragraph[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }
    let rest = paragraph[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Spreads sentences over `target` paragraphs; earlier paragraphs take the remainder.
fn distribute(sentences: Vec<String>, target: usize) -> Vec<String> {
    let base = sentences.len() / target;
    let extra = sentences.len() % target;
    let mut iter = sentences.into_iter();

    (0..target)
        .map(|i| {
            let take = base + usize::from(i < extra);
            iter.by_ref().take(take).collect::<Vec<_>>().join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_LENGTHS: [RecommendationLength; 3] = [
        RecommendationLength::Short,
        RecommendationLength::Medium,
        RecommendationLength::Long,
    ];

    fn paragraphs(text: &str) -> usize {
        text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
    }

    #[test]
    fn test_too_many_paragraphs_are_merged() {
        let raw = "**Maya** is great.\n\nShe ships.\n\nShe mentors.\n\nShe tests.\n\nShe documents.\n\nHire her.";
        for length in ALL_LENGTHS {
            let out = format_recommendation(raw, length);
            assert_eq!(paragraphs(&out), length.paragraph_count(), "{length:?}");
            assert!(!out.contains('*'));
        }
    }

    #[test]
    fn test_single_block_is_split_by_sentences() {
        let raw = "Maya is great. She ships fast. She mentors juniors. She writes tests. \
                   She documents everything. She is kind. I recommend her. Truly.";
        for length in ALL_LENGTHS {
            let out = format_recommendation(raw, length);
            assert_eq!(paragraphs(&out), length.paragraph_count(), "{length:?}");
        }
    }

    #[test]
    fn test_sentence_distribution_is_front_loaded() {
        let raw = "One. Two. Three. Four. Five.";
        let out = format_recommendation(raw, RecommendationLength::Short);
        assert_eq!(out, "One. Two. Three.\n\nFour. Five.");
    }

    #[test]
    fn test_not_enough_sentences_keeps_text() {
        let out = format_recommendation("Only one sentence here.", RecommendationLength::Long);
        assert_eq!(out, "Only one sentence here.");
    }

    #[test]
    fn test_markdown_removed() {
        let raw = "# Recommendation\n\n- **Maya** is _great_ with `Rust`.\n\n* She *really* ships.";
        let out = format_recommendation(raw, RecommendationLength::Short);
        assert!(!out.contains('*'));
        assert!(!out.contains('#'));
        assert!(!out.contains('`'));
        assert!(out.contains("Maya is _great_ with Rust."));
        assert!(out.contains("She really ships."));
    }

    #[test]
    fn test_windows_line_endings_and_extra_blank_lines() {
        let raw = "First paragraph here.\r\n\r\n\r\nSecond\r\nparagraph here.";
        let out = format_recommendation(raw, RecommendationLength::Short);
        assert_eq!(out, "First paragraph here.\n\nSecond paragraph here.");
    }

    #[test]
    fn test_echoed_experiment_block_removed() {
        let raw = "Para one.\n\nPara two.\n\n--- EXPERIMENT: story_first ---\nOpen with a story.\n--- END EXPERIMENT ---";
        let out = format_recommendation(raw, RecommendationLength::Short);
        assert_eq!(out, "Para one.\n\nPara two.");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let raw = "Maya is great. She ships fast. She mentors juniors. She writes tests.";
        let once = format_recommendation(raw, RecommendationLength::Medium);
        assert_eq!(format_recommendation(&once, RecommendationLength::Medium), once);
    }

    #[test]
    fn test_split_sentences_handles_quotes() {
        let sentences = split_sentences("She said \"ship it.\" Then we did! Done?");
        assert_eq!(
            sentences,
            vec!["She said \"ship it.\"", "Then we did!", "Done?"]
        );
    }
}
