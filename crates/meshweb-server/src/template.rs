//! Template & Index Engine: literal placeholder substitution and the
//! auto-generated directory index.

use time::macros::format_description;
use time::OffsetDateTime;

use crate::pages::{human_size, PageEntry, PageKind};

/// The page names that trigger dynamic index generation instead of a
/// file lookup, case-insensitive.
pub fn is_index_request(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    lower.is_empty() || matches!(lower.as_str(), "index" | "_index" | "_list" | "list")
}

/// Applies the three literal placeholders. No conditional logic — a page
/// containing none of these placeholders is returned unchanged.
pub fn substitute_placeholders(body: &str, page_count: usize) -> String {
    body.replace("{{timestamp}}", &current_timestamp())
        .replace("{{page_count}}", &page_count.to_string())
        .replace("{{page_list}}", &page_list_fragment(&[]))
}

/// Same as [`substitute_placeholders`] but fills `{{page_list}}` from a
/// real page set, used by the index page itself.
pub fn substitute_with_pages(body: &str, pages: &[PageEntry]) -> String {
    body.replace("{{timestamp}}", &current_timestamp())
        .replace("{{page_count}}", &pages.len().to_string())
        .replace("{{page_list}}", &page_list_fragment(pages))
}

fn current_timestamp() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&format)
        .unwrap_or_else(|_| "unknown-time".to_string())
}

fn page_list_fragment(pages: &[PageEntry]) -> String {
    pages
        .iter()
        .map(|p| format!(r#"<a href="{0}">{1} {0}</a>"#, p.filename, p.kind.icon()))
        .collect::<Vec<_>>()
        .join("<br>")
}

const INDEX_ORDER: [PageKind; 5] = [
    PageKind::Html,
    PageKind::Text,
    PageKind::Image,
    PageKind::Pdf,
    PageKind::Archive,
];

/// Renders the dynamic HTML index: fixed heading order, grouped entries,
/// human-readable sizes and category icons.
pub fn render_index_html(server_name: &str, pages: &[PageEntry]) -> String {
    let mut body = String::new();
    body.push_str("<html><head><title>");
    body.push_str(server_name);
    body.push_str("</title></head><body>");
    body.push_str(&format!("<h1>{server_name}</h1>"));
    body.push_str(&format!("<p>Generated {}</p>", current_timestamp()));
    body.push_str(&format!("<p>{} files served</p>", pages.len()));

    for kind in INDEX_ORDER {
        let group: Vec<&PageEntry> = pages.iter().filter(|p| p.kind == kind).collect();
        if group.is_empty() {
            continue;
        }
        body.push_str(&format!("<h2>{} {}</h2><ul>", kind.icon(), kind.heading()));
        for page in group {
            body.push_str(&format!(
                r#"<li><a href="{}">{}</a> ({})</li>"#,
                page.filename,
                page.filename,
                human_size(page.size_bytes)
            ));
        }
        body.push_str("</ul>");
    }

    body.push_str("</body></html>");
    body
}

/// Renders the plain-text companion listing sent alongside the HTML
/// index. The sentinel line `Available Files` is load-bearing: the
/// client's list parser keys off lines beginning with `[`, and its
/// request correlator's LIST detection keys off the text containing
/// `Available Pages`-family sentinels.
pub fn render_index_text(pages: &[PageEntry]) -> String {
    let mut out = String::from("Available Files\n\n");
    for (i, page) in pages.iter().enumerate() {
        out.push_str(&format!(
            "[{}] {} ({})\n",
            i + 1,
            page.filename,
            human_size(page.size_bytes)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageKind;

    fn entry(name: &str, kind: PageKind, size: u64) -> PageEntry {
        PageEntry {
            filename: name.to_string(),
            extension: "html".to_string(),
            mime_type: "text/html",
            size_bytes: size,
            kind,
        }
    }

    #[test]
    fn is_index_request_matches_known_aliases() {
        for alias in ["", "index", "INDEX", "_list", "List"] {
            assert!(is_index_request(alias), "{alias} should be index-like");
        }
        assert!(!is_index_request("about.html"));
    }

    #[test]
    fn substitute_placeholders_replaces_all_three() {
        let body = "built {{timestamp}} with {{page_count}} pages: {{page_list}}";
        let out = substitute_placeholders(body, 3);
        assert!(!out.contains("{{"));
        assert!(out.contains('3'));
    }

    #[test]
    fn index_html_groups_in_fixed_order() {
        let pages = vec![
            entry("z.zip", PageKind::Archive, 10),
            entry("a.html", PageKind::Html, 20),
            entry("b.txt", PageKind::Text, 30),
        ];
        let html = render_index_html("LXMF HTML Server", &pages);
        let html_pos = html.find("HTML Pages").unwrap();
        let text_pos = html.find("Text Files").unwrap();
        let archive_pos = html.find("Archives").unwrap();
        assert!(html_pos < text_pos);
        assert!(text_pos < archive_pos);
    }

    #[test]
    fn index_text_lists_every_page_with_sentinel() {
        let pages = vec![entry("about.html", PageKind::Html, 100)];
        let text = render_index_text(&pages);
        assert!(text.starts_with("Available Files"));
        assert!(text.contains("about.html"));
    }
}
