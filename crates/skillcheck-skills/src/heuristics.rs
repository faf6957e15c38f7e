//! Advisory wording checks for descriptions
//!
//! These are word-level heuristics. They can misfire, so the validator only
//! reports them as warnings.

const FIRST_PERSON: &[&str] = &[
    "i", "i'm", "i'll", "i've", "i'd", "me", "my", "mine", "we", "we're", "we'll", "our", "ours",
    "us",
];
const SECOND_PERSON: &[&str] = &["you", "you'll", "you're", "you've", "your", "yours"];

const TRIGGER_WORDS: &[&str] = &[
    "when", "whenever", "if", "trigger", "triggers", "triggered", "before", "after", "during",
];
const TRIGGER_PHRASES: &[&[&str]] = &[
    &["use", "for"],
    &["used", "for"],
    &["useful", "for"],
    &["use", "on"],
    &["use", "with"],
];

/// Lowercased words, keeping in-word apostrophes
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|w| w.trim_matches(|c| c == '\'' || c == '\u{2019}'))
        .filter(|w| !w.is_empty())
        .map(|w| w.replace('\u{2019}', "'").to_lowercase())
        .collect()
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '\n', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First- and second-person words used, in order of first appearance
pub(crate) fn personal_pronouns(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for word in words(text) {
        let personal =
            FIRST_PERSON.contains(&word.as_str()) || SECOND_PERSON.contains(&word.as_str());
        if personal && !found.contains(&word) {
            found.push(word);
        }
    }
    found
}

fn contains_phrase(words: &[String], phrase: &[&str]) -> bool {
    words
        .windows(phrase.len())
        .any(|window| window.iter().zip(phrase).all(|(w, p)| w == p))
}

/// Whether the text names a triggering condition ("use when ...")
pub(crate) fn has_trigger(text: &str) -> bool {
    let words = words(text);
    words.iter().any(|w| TRIGGER_WORDS.contains(&w.as_str()))
        || TRIGGER_PHRASES
            .iter()
            .any(|phrase| contains_phrase(&words, phrase))
}

fn is_trigger_lead(sentence: &str) -> bool {
    let words = words(sentence);
    match words.as_slice() {
        [] => false,
        [first, rest @ ..] => match first.as_str() {
            "when" | "whenever" | "if" | "trigger" | "triggers" => true,
            "use" | "invoke" | "activate" => rest.first().is_some_and(|second| {
                matches!(second.as_str(), "when" | "whenever" | "if" | "for" | "on")
            }),
            _ => false,
        },
    }
}

/// Whether the text states a capability, i.e. has a sentence that is not
/// just a trigger clause
pub(crate) fn has_capability(text: &str) -> bool {
    sentences(text).any(|s| !is_trigger_lead(s))
}
