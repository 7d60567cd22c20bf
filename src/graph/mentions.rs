//! Extraction of mentioned email addresses from update text.

use crate::email::is_email;

/// Prefix a mention may carry in front of the address.
const MENTION_SIGIL: char = '@';

/// Extracts email-like mentions from free text.
///
/// Stateless; exists as a type so the audience resolver can name it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionParser;

impl MentionParser {
    /// Returns the mentioned addresses in order of appearance.
    ///
    /// The text is split on whitespace. A token starting with `@` loses
    /// exactly one leading `@`, so `@andy@example.com` and
    /// `andy@example.com` mention the same address. Tokens that are not
    /// valid addresses are dropped without error; duplicates are kept.
    ///
    /// # Example
    ///
    /// ```
    /// use friendnet_core::graph::MentionParser;
    ///
    /// assert_eq!(MentionParser::parse("Hello @a@b.com"), vec!["a@b.com"]);
    /// assert_eq!(MentionParser::parse("Hello a@b.com"), vec!["a@b.com"]);
    /// assert!(MentionParser::parse("Hello World").is_empty());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Vec<&str> {
        text.split_whitespace()
            .map(|token| token.strip_prefix(MENTION_SIGIL).unwrap_or(token))
            .filter(|token| is_email(token))
            .collect()
    }
}
