//! Clean-up and classification of model replies.
//!
//! Models frequently wrap their answer in Markdown code spans or fenced
//! blocks, sometimes with a language tag (` ```xpath `). `unwrap_locator`
//! strips that wrapping; `parse_locator` classifies what is left.

use std::fmt;

const FENCE: &str = "```";

/// Removes Markdown code wrapping from a model reply.
///
/// Fenced blocks lose their fences and, when the first line is a bare
/// alphabetic word followed by a non-empty line, that language tag too.
/// Inline code spans lose their single backticks. Anything else is only
/// trimmed.
pub fn unwrap_locator(block: &str) -> String {
    let content = block.trim();

    if content.starts_with(FENCE) && content.ends_with(FENCE) {
        // A block shorter than two fences has nothing between them.
        let inner = content
            .get(FENCE.len()..content.len().saturating_sub(FENCE.len()))
            .unwrap_or("");
        let mut body = inner;
        if let Some((first, rest)) = inner.split_once('\n') {
            if is_language_tag(first.trim()) && !rest.trim().is_empty() {
                body = rest;
            }
        }
        body.trim().to_string()
    } else if content.starts_with('`') && content.ends_with('`') {
        content
            .get(1..content.len().saturating_sub(1))
            .unwrap_or("")
            .trim()
            .to_string()
    } else {
        content.to_string()
    }
}

fn is_language_tag(line: &str) -> bool {
    !line.is_empty() && line.chars().all(char::is_alphabetic)
}

/// True when the reply has the `strategy=value` shape of a Selenium locator.
pub fn looks_like_locator(reply: &str) -> bool {
    !reply.is_empty() && reply.split('=').count() >= 2
}

/// How a locator selects its element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorStrategy {
    XPath,
    Css,
    Id,
    Name,
    LinkText,
    PartialLinkText,
    ClassName,
    TagName,
    /// A `key=value` locator with an unrecognised key.
    Other(String),
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorStrategy::XPath => write!(f, "xpath"),
            LocatorStrategy::Css => write!(f, "css"),
            LocatorStrategy::Id => write!(f, "id"),
            LocatorStrategy::Name => write!(f, "name"),
            LocatorStrategy::LinkText => write!(f, "link text"),
            LocatorStrategy::PartialLinkText => write!(f, "partial link text"),
            LocatorStrategy::ClassName => write!(f, "class name"),
            LocatorStrategy::TagName => write!(f, "tag name"),
            LocatorStrategy::Other(key) => write!(f, "{}", key),
        }
    }
}

/// A locator split into its strategy and selector value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

/// Classifies a cleaned locator string.
///
/// Accepts `strategy=value` forms and bare XPath expressions. Returns `None`
/// when the string matches neither.
pub fn parse_locator(locator: &str) -> Option<Locator> {
    let locator = locator.trim();
    if locator.is_empty() {
        return None;
    }

    // Bare XPath may itself contain '=' inside predicates.
    if locator.starts_with('/') || locator.starts_with("(/") {
        return Some(Locator {
            strategy: LocatorStrategy::XPath,
            value: locator.to_string(),
        });
    }

    let (key, value) = locator.split_once('=')?;
    let key = key.trim();
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '_' || c == '-')
    {
        return None;
    }

    let normalized = key.to_ascii_lowercase().replace(['_', '-'], " ");
    let strategy = match normalized.as_str() {
        "xpath" => LocatorStrategy::XPath,
        "css" | "css selector" => LocatorStrategy::Css,
        "id" => LocatorStrategy::Id,
        "name" => LocatorStrategy::Name,
        "link" | "link text" => LocatorStrategy::LinkText,
        "partial link text" => LocatorStrategy::PartialLinkText,
        "class" | "class name" => LocatorStrategy::ClassName,
        "tag" | "tag name" => LocatorStrategy::TagName,
        _ => LocatorStrategy::Other(key.to_string()),
    };

    Some(Locator {
        strategy,
        value: value.trim().to_string(),
    })
}
