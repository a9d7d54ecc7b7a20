//! List Parser: lenient line-oriented parsing of the plain-text page
//! index, tolerant of cosmetic changes in the text the server produces.

/// Parses a multi-line page index into an ordered list of page names.
///
/// Recognition rule, line by line:
/// - trim whitespace
/// - if the line starts with `[` and contains `]`, split once on `]`
/// - if the remainder contains `(`, the page name is the text before it,
///   trimmed; otherwise the page name is the whole remainder, trimmed
/// - non-empty page names are appended in encounter order
pub fn parse_page_list(text: &str) -> Vec<String> {
    let mut pages = Vec::new();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if !line.starts_with('[') || !line.contains(']') {
            continue;
        }
        let Some((_, descriptor)) = line.split_once(']') else {
            continue;
        };
        let descriptor = descriptor.trim();
        let name = match descriptor.split_once('(') {
            Some((name, _)) => name.trim(),
            None => descriptor,
        };
        if !name.is_empty() {
            pages.push(name.to_string());
        }
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_index() {
        let text = "Available Files\n\n[1] about.html (120 B)\n[2] help.html (340 B)\n";
        assert_eq!(
            parse_page_list(text),
            vec!["about.html".to_string(), "help.html".to_string()]
        );
    }

    #[test]
    fn ignores_lines_without_a_closing_bracket() {
        let text = "Available Files\n\nnote: nothing here\n[bad line without a bracket\n[1] ok.html (1 B)\n";
        assert_eq!(parse_page_list(text), vec!["ok.html".to_string()]);
    }

    #[test]
    fn bracketed_line_without_parens_uses_whole_descriptor() {
        let text = "[1] about.html\n";
        assert_eq!(parse_page_list(text), vec!["about.html".to_string()]);
    }

    #[test]
    fn tolerates_cosmetic_whitespace() {
        let text = "   [1]    spaced.html   (2 B)   \n";
        assert_eq!(parse_page_list(text), vec!["spaced.html".to_string()]);
    }

    #[test]
    fn empty_page_names_are_skipped() {
        let text = "[1]  ()\n";
        assert!(parse_page_list(text).is_empty());
    }
}
