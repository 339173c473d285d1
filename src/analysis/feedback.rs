//! Rule-based coaching feedback.
//!
//! Three independent checks run in a fixed order: pace, pitch variety and
//! filler words. Each one either appends one mistake plus one improvement, or
//! (for pace and pitch) appends a positive clause to the feedback text.

/// Pace above this many WPM is flagged as too fast.
pub const FAST_WPM: u32 = 170;
/// Pace below this many WPM is flagged as too slow.
pub const SLOW_WPM: u32 = 120;
/// The slow-pace check only applies above this many words.
pub const SLOW_MIN_WORDS: usize = 10;
/// Pitch modulation (Hz std-dev) below this is considered monotone.
pub const MONOTONE_PITCH: f64 = 25.0;
/// The monotone check only applies to clips longer than this many seconds.
pub const MONOTONE_MIN_SECONDS: f64 = 4.0;

/// Fillers searched for, in reporting order.
pub const FILLER_WORDS: &[&str] = &["uh", "um", "like", "you know", "so", "actually", "basically"];

pub const OPENING: &str = "Your practice session has been analyzed.";
pub const PACE_OK: &str = " Your speaking pace was excellent.";
pub const PITCH_OK: &str = " You used great vocal variety.";
pub const NO_MISTAKES: &str = "No major mistakes detected. Great job!";
pub const KEEP_PRACTICING: &str = "Keep practicing to build consistency.";

/// Feedback text plus ordered mistake and improvement lists.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackReport {
    pub feedback: String,
    pub improvements: Vec<String>,
    pub mistakes: Vec<String>,
}

/// Everything the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackInput<'a> {
    pub transcript: &'a str,
    pub wpm: u32,
    pub pitch_modulation: f64,
    pub word_count: usize,
    pub duration_seconds: f64,
}

/// Apply the pace, pitch and filler rules.
///
/// Both lists in the returned report are non-empty.
pub fn synthesize(input: &FeedbackInput<'_>) -> FeedbackReport {
    let mut feedback = OPENING.to_string();
    let mut improvements = Vec::new();
    let mut mistakes = Vec::new();

    if input.wpm > FAST_WPM {
        mistakes.push(format!("Your pace was quite fast at {} WPM.", input.wpm));
        improvements.push("Try pausing briefly between key points.".to_string());
    } else if input.wpm < SLOW_WPM && input.word_count > SLOW_MIN_WORDS {
        mistakes.push(format!("Your pace was a bit slow at {} WPM.", input.wpm));
        improvements.push("Try speaking with more energy.".to_string());
    } else {
        feedback.push_str(PACE_OK);
    }

    if input.pitch_modulation < MONOTONE_PITCH && input.duration_seconds > MONOTONE_MIN_SECONDS {
        mistakes.push("Your vocal delivery was a bit monotone.".to_string());
        improvements.push("Practice varying your pitch for emphasis.".to_string());
    } else {
        feedback.push_str(PITCH_OK);
    }

    let fillers = detect_fillers(input.transcript);
    if !fillers.is_empty() {
        mistakes.push(format!(
            "Some filler words like '{}' were detected.",
            fillers.join(", ")
        ));
        improvements.push("Try to pause silently instead of using filler words.".to_string());
    }

    if mistakes.is_empty() {
        mistakes.push(NO_MISTAKES.to_string());
    }
    if improvements.is_empty() {
        improvements.push(KEEP_PRACTICING.to_string());
    }

    FeedbackReport {
        feedback,
        improvements,
        mistakes,
    }
}

/// Fillers that appear as `" word "` in the lower-cased transcript.
///
/// The transcript is not padded, so a filler at the very start or end is not
/// counted, and punctuation attached to a word ("um,") hides it.
pub fn detect_fillers(transcript: &str) -> Vec<&'static str> {
    let lower = transcript.to_lowercase();
    FILLER_WORDS
        .iter()
        .copied()
        .filter(|word| lower.contains(&format!(" {} ", word)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(transcript: &str, wpm: u32, pitch: f64, words: usize, secs: f64) -> FeedbackInput<'_> {
        FeedbackInput {
            transcript,
            wpm,
            pitch_modulation: pitch,
            word_count: words,
            duration_seconds: secs,
        }
    }

    #[test]
    fn all_rules_pass_gives_fallback_entries() {
        let report = synthesize(&input("hello world", 120, 0.0, 2, 1.0));

        assert_eq!(
            report.feedback,
            "Your practice session has been analyzed. Your speaking pace was excellent. You used great vocal variety."
        );
        assert_eq!(report.mistakes, vec![NO_MISTAKES]);
        assert_eq!(report.improvements, vec![KEEP_PRACTICING]);
    }

    #[test]
    fn fast_pace_is_flagged() {
        let report = synthesize(&input("words", 171, 40.0, 50, 20.0));
        assert_eq!(report.mistakes, vec!["Your pace was quite fast at 171 WPM."]);
        assert_eq!(report.improvements, vec!["Try pausing briefly between key points."]);
        assert!(!report.feedback.contains(PACE_OK));
        assert!(report.feedback.contains(PITCH_OK));
    }

    #[test]
    fn pace_boundaries_are_strict() {
        assert!(synthesize(&input("x", 170, 40.0, 50, 20.0)).feedback.contains(PACE_OK));
        assert!(synthesize(&input("x", 120, 40.0, 50, 20.0)).feedback.contains(PACE_OK));
    }

    #[test]
    fn slow_pace_requires_more_than_ten_words() {
        let short = synthesize(&input("x", 60, 40.0, 10, 10.0));
        assert!(short.feedback.contains(PACE_OK));

        let long = synthesize(&input("x", 60, 40.0, 11, 11.0));
        assert_eq!(long.mistakes, vec!["Your pace was a bit slow at 60 WPM."]);
        assert_eq!(long.improvements, vec!["Try speaking with more energy."]);
    }

    #[test]
    fn monotone_only_flagged_for_longer_clips() {
        let short = synthesize(&input("x", 150, 10.0, 10, 4.0));
        assert!(short.feedback.contains(PITCH_OK));

        let long = synthesize(&input("x", 150, 10.0, 25, 10.0));
        assert_eq!(long.mistakes, vec!["Your vocal delivery was a bit monotone."]);
        assert_eq!(long.improvements, vec!["Practice varying your pitch for emphasis."]);
    }

    #[test]
    fn rules_are_independent() {
        let report = synthesize(&input("a calm steady talk", 150, 10.0, 25, 10.0));

        assert_eq!(report.mistakes.len(), 1);
        assert_eq!(report.mistakes[0], "Your vocal delivery was a bit monotone.");
        assert!(report.feedback.contains(PACE_OK));
        assert!(!report.feedback.contains(PITCH_OK));
    }

    #[test]
    fn fillers_are_reported_in_one_entry() {
        let transcript = "Well so um I think we should start";
        let report = synthesize(&input(transcript, 150, 40.0, 8, 3.0));

        assert_eq!(
            report.mistakes,
            vec!["Some filler words like 'um, so' were detected."]
        );
        assert_eq!(
            report.improvements,
            vec!["Try to pause silently instead of using filler words."]
        );
    }

    #[test]
    fn filler_matching_respects_word_boundaries() {
        assert!(detect_fillers("I really liked the summary").is_empty());
        assert!(detect_fillers("the album was good").is_empty());
        assert_eq!(detect_fillers("and you know what"), vec!["you know"]);
        assert_eq!(detect_fillers("It was LIKE really BASICALLY done"), vec!["like", "basically"]);
    }

    #[test]
    fn filler_matching_uses_plain_space_padding() {
        // No padding is added around the transcript, and attached punctuation blocks a match
        assert!(detect_fillers("um I think").is_empty());
        assert!(detect_fillers("I think, um, yes").is_empty());
        assert_eq!(detect_fillers("well, so um I think"), vec!["um", "so"]);
    }

    #[test]
    fn comma_separated_fillers_at_the_start_are_not_reported() {
        assert!(detect_fillers("so, um, I think...").is_empty());
    }

    #[test]
    fn every_rule_firing_lists_all_mistakes_in_order() {
        let report = synthesize(&input("uh we um go", 200, 5.0, 40, 12.0));
        assert_eq!(report.mistakes.len(), 3);
        assert!(report.mistakes[0].starts_with("Your pace was quite fast"));
        assert!(report.mistakes[1].contains("monotone"));
        assert!(report.mistakes[2].contains("'um'"));
        assert_eq!(report.improvements.len(), 3);
        assert_eq!(report.feedback, OPENING);
    }
}
