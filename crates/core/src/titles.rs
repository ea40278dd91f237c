//! Extracts suggested movie titles from an agent reply.
//!
//! The agent is asked to put every title it recommends in `**bold**`, so the
//! bold spans of a reply are the titles a user can send to the wheel.

use crate::message::unescape_newlines;

const BOLD: &str = "**";

/// Returns the distinct, non-empty bold spans of `markdown`, in order.
///
/// Spans never cross a line break, which keeps a stray `**` from swallowing
/// the rest of the reply.
pub fn extract_titles(markdown: &str) -> Vec<String> {
    let text = unescape_newlines(markdown);
    let mut titles: Vec<String> = Vec::new();

    for line in text.lines() {
        let mut rest = line;
        while let Some(start) = rest.find(BOLD) {
            let after_open = &rest[start + BOLD.len()..];
            let Some(end) = after_open.find(BOLD) else {
                break;
            };
            let title = after_open[..end].trim();
            if !title.is_empty() && !titles.iter().any(|t| t == title) {
                titles.push(title.to_string());
            }
            rest = &after_open[end + BOLD.len()..];
        }
    }

    titles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_bold_titles_in_order() {
        let reply = "Here you go:\\n1. **Alien** - space horror\\n2. **Heat** - crime\\n![poster](https://image.tmdb.org/t/p/w500/x.jpg)";
        assert_eq!(extract_titles(reply), vec!["Alien", "Heat"]);
    }

    #[test]
    fn test_dedupes_and_trims() {
        let reply = "** Heat ** is great. I mean it, **Heat** is great. Also **Ronin**.";
        assert_eq!(extract_titles(reply), vec!["Heat", "Ronin"]);
    }

    #[test]
    fn test_ignores_empty_and_unterminated_spans() {
        assert!(extract_titles("****").is_empty());
        assert_eq!(extract_titles("**Open\n**Closed**"), vec!["Closed"]);
        assert!(extract_titles("no titles here").is_empty());
    }
}
