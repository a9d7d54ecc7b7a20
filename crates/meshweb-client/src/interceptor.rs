//! Link Interceptor: injects a small script into cached HTML so
//! intra-site navigation re-enters the mesh protocol instead of issuing an
//! ordinary network request. Literal string injection at fixed boundaries
//! (`</head>`/`</body>` fallback chain), since bit-equivalence with the
//! served page requires literal string replacement rather than a parse
//! and rewrite.

/// Marker unique to the injected script, used both to find the insertion
/// point's sibling content and to detect whether a page already carries
/// the interceptor (reinjection must stay idempotent).
const INTERCEPTOR_MARKER: &str = "LXMF Browser - Link Interceptor";

/// Renders the interceptor script for `peer_hash`, the server this page
/// was fetched from. Every `<a>` click is captured; hrefs that end in
/// `.html`/`.htm` or contain no `://` scheme delimiter are cancelled,
/// normalized (`./` and leading `/` stripped), and posted to the hosting
/// frame as `{type: "lxmf_navigate", server, page}`.
fn render_script(peer_hash: &str) -> String {
    format!(
        r#"
<script>
// {marker}
(function() {{
    const currentServer = '{peer_hash}';

    document.addEventListener('DOMContentLoaded', function() {{
        document.addEventListener('click', function(e) {{
            let target = e.target;
            while (target && target.tagName !== 'A') {{
                target = target.parentElement;
            }}
            if (!target || target.tagName !== 'A') {{
                return;
            }}

            const href = target.getAttribute('href');
            if (!href || !(href.endsWith('.html') || href.endsWith('.htm') || !href.includes('://'))) {{
                return;
            }}

            e.preventDefault();
            let pageName = href;
            if (pageName.startsWith('./')) {{
                pageName = pageName.substring(2);
            }}
            if (pageName.startsWith('/')) {{
                pageName = pageName.substring(1);
            }}

            window.parent.postMessage({{
                type: 'lxmf_navigate',
                server: currentServer,
                page: pageName
            }}, '*');
        }}, true);
    }});
}})();
</script>
"#,
        marker = INTERCEPTOR_MARKER,
        peer_hash = peer_hash,
    )
}

/// Injects the interceptor script into `html` exactly once. No-op if the
/// marker is already present. Otherwise inserts before `</head>`, else
/// before `</body>`, else appends.
pub fn inject_once(html: &str, peer_hash: &str) -> String {
    if html.contains(INTERCEPTOR_MARKER) {
        return html.to_string();
    }

    let script = render_script(peer_hash);
    if let Some(pos) = html.find("</head>") {
        let mut out = String::with_capacity(html.len() + script.len());
        out.push_str(&html[..pos]);
        out.push_str(&script);
        out.push_str(&html[pos..]);
        out
    } else if let Some(pos) = html.find("</body>") {
        let mut out = String::with_capacity(html.len() + script.len());
        out.push_str(&html[..pos]);
        out.push_str(&script);
        out.push_str(&html[pos..]);
        out
    } else {
        let mut out = html.to_string();
        out.push_str(&script);
        out
    }
}

/// Counts how many copies of the interceptor marker a page carries; used
/// by tests and by [`crate::cache::ContentCache`] to enforce the
/// exactly-once injection invariant.
pub fn marker_count(html: &str) -> usize {
    html.matches(INTERCEPTOR_MARKER).count()
}
