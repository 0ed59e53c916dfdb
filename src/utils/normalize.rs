//! Text normalisation shared by the document parser.

/// Literal written in place of a missing title or link.
pub const NONE_PLACEHOLDER: &str = "None";

/// Number of leading `/`-segments of a result link that are dropped
/// (scheme, the empty segment after it, and the host).
const LINK_SKIP: usize = 3;

/// Number of `/`-segments kept when rebuilding a result link.
const LINK_SEGMENTS: usize = 6;

/// Replace non-breaking spaces with regular spaces.
pub fn normalize_spaces(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

/// Substitute the placeholder literal for a missing value.
pub fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| NONE_PLACEHOLDER.to_string())
}

/// Guess whether a result is an advertisement from its title.
///
/// Flags titles containing the word `ad` between spaces or starting with `ad`,
/// both case-insensitively. The heuristic is rough: "Advances in Biology" is
/// flagged as well, so the column should be taken with a grain of salt.
pub fn is_advertisement(title: &str) -> bool {
    if title.to_lowercase().contains(" ad ") {
        return true;
    }

    let prefix: String = title.chars().take(2).collect();
    prefix.to_lowercase() == "ad"
}

/// Rebuild the resource path of a fulltext or PDF link.
///
/// The link is split on `/` and segments 3 to 8 are joined again behind a
/// leading slash, which drops the scheme and host of an absolute URL.
/// Returns `None` when the link is too short to carry all six segments.
pub fn rebuild_link(href: &str) -> Option<String> {
    let segments: Vec<&str> = href.split('/').collect();
    let kept = segments.get(LINK_SKIP..LINK_SKIP + LINK_SEGMENTS)?;
    Some(format!("/{}", kept.join("/")))
}
