//! Pure string-transformation rules for track queries and playlist naming.
//!
//! Everything here is deterministic and I/O-free; the style tag (e.g. `lofi`)
//! parameterizes all outputs. Search queries get parenthetical annotations
//! stripped ("(Remastered 2011)", "(feat. ...)") because they drag catalog
//! search toward the annotated original instead of the styled re-recording.

use std::sync::OnceLock;

use regex::Regex;

fn paren_group() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Innermost well-formed groups; applied repeatedly so nesting unwinds.
    RE.get_or_init(|| Regex::new(r"\([^()]*\)").expect("static regex"))
}

/// Derives the catalog search query for one track: parenthetical groups are
/// removed (repeatedly, so nested groups unwind and the operation is
/// idempotent), whitespace is collapsed, the remainder is lower-cased and the
/// lower-cased style is appended.
pub fn track_query(original_title: &str, style: &str) -> String {
    let mut cleaned = original_title.to_string();
    loop {
        let next = paren_group().replace_all(&cleaned, "").into_owned();
        if next == cleaned {
            break;
        }
        cleaned = next;
    }

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{} {}", collapsed.to_lowercase(), style.to_lowercase())
        .trim()
        .to_string()
}

/// Name template for the destination playlist.
pub fn playlist_name(original_name: &str, style: &str) -> String {
    format!("{} - {} 🍃", style.to_lowercase(), original_name)
}

/// Description template for the destination playlist.
pub fn playlist_description(original_name: &str, style: &str) -> String {
    format!(
        "a {} version of playlist: {}",
        style.to_lowercase(),
        original_name
    )
}
