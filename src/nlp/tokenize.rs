//! Tokenization, stopwords and casing helpers shared by the extractors

/// English stopwords (function words that carry no task information)
pub const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Acronyms kept upper-case when title-casing
const ACRONYMS: &[&str] = &["hvac", "mep"];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Split on whitespace and trim surrounding punctuation.
///
/// Characters meaningful inside task names (`#`, `-`, `/`) survive when
/// they sit inside a token.
pub fn tokens(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '#'))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Crude lemma: strips plural endings, leaves everything else alone
pub fn lemma(word: &str) -> String {
    let len = word.chars().count();
    if len <= 3 || !word.is_ascii() {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if len > 4 {
            return format!("{}y", stem);
        }
    }
    if word.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && !word.ends_with("is")
    {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Lower-cased, stopword-free, lemmatized form used by the statistical
/// classifier
pub fn lemmatize(text: &str) -> String {
    let lower = text.to_lowercase();
    tokens(&lower)
        .into_iter()
        .filter(|token| !is_stopword(token))
        .map(lemma)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalize each word; known acronyms go fully upper-case
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            if ACRONYMS.contains(&lower.as_str()) {
                return lower.to_uppercase();
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-word containment test over a lower-cased haystack
pub fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .match_indices(word)
        .any(|(start, _)| {
            let end = start + word.len();
            let before_ok = haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let after_ok = haystack[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
            before_ok && after_ok
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_trim_punctuation() {
        assert_eq!(
            tokens("Update pour #12, please!"),
            vec!["Update", "pour", "#12", "please"]
        );
        assert_eq!(tokens("due 5/12/2026."), vec!["due", "5/12/2026"]);
    }

    #[test]
    fn test_lemma() {
        assert_eq!(lemma("windows"), "window");
        assert_eq!(lemma("status"), "status");
        assert_eq!(lemma("activities"), "activity");
        assert_eq!(lemma("glass"), "glass");
        assert_eq!(lemma("add"), "add");
    }

    #[test]
    fn test_lemmatize_drops_stopwords() {
        assert_eq!(
            lemmatize("Please change the Windows to on hold"),
            "please change window hold"
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("foundation piling"), "Foundation Piling");
        assert_eq!(title_case("hvac installation"), "HVAC Installation");
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("add railing task", "add"));
        assert!(!contains_word("address the railing", "add"));
        assert!(contains_word("mark it complete", "complete"));
        assert!(!contains_word("incomplete", "complete"));
    }
}
