//! Reply Option Extraction
//!
//! Pure parsing of mention text into ordered reply options.
//! A mention like `"@bot.bsky.social yes, no, maybe"` yields one option per
//! comma-separated fragment, with the leading handle token stripped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a handle token: `@` followed by non-whitespace, then one whitespace.
static HANDLE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\S+\s").expect("valid regex"));

/// Split mention text into ordered reply options.
///
/// For each comma-separated fragment, the first `@handle ` occurrence is
/// removed and surrounding whitespace trimmed. Fragments that end up empty
/// (trailing commas, handle-only fragments) are dropped so the bot never
/// posts an empty reply. Duplicates are kept; the tracker dedups them.
pub fn extract_options(text: &str) -> Vec<String> {
    text.split(',')
        .map(|fragment| HANDLE_TOKEN.replace(fragment, "").trim().to_string())
        .filter(|option| !option.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_handle_and_trims() {
        let options = extract_options("@bot.bsky.social yes, no, maybe ");
        assert_eq!(options, vec!["yes", "no", "maybe"]);
    }

    #[test]
    fn test_no_comma_single_option() {
        let options = extract_options("@bot.bsky.social just one");
        assert_eq!(options, vec!["just one"]);
    }

    #[test]
    fn test_handle_stripped_only_where_present() {
        let options = extract_options("@bot.bsky.social first, second, @other.bsky.social third");
        assert_eq!(options, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_fragments_dropped() {
        let options = extract_options("yes,, no,");
        assert_eq!(options, vec!["yes", "no"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(extract_options("").is_empty());
        assert!(extract_options("   ").is_empty());
    }

    #[test]
    fn test_handle_only_mention_yields_nothing() {
        // Trailing whitespace is required for the handle token to match;
        // a bare handle with nothing after it survives as its own option.
        assert!(extract_options("@bot.bsky.social ").is_empty());
        assert_eq!(extract_options("@bot.bsky.social"), vec!["@bot.bsky.social"]);
    }

    #[test]
    fn test_only_first_handle_occurrence_removed() {
        let options = extract_options("@a.bsky.social @b.bsky.social hi");
        assert_eq!(options, vec!["@b.bsky.social hi"]);
    }

    #[test]
    fn test_duplicates_preserved() {
        let options = extract_options("yes, yes");
        assert_eq!(options, vec!["yes", "yes"]);
    }
}
