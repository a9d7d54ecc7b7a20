//! Display-name capability marker handling.
//!
//! Normalize first, classify second, never panic on malformed app-data.

use crate::constants::{HTML_MARKER, HTML_MARKER_LOOSE};

/// Outcome of classifying an announced display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerClass {
    /// Carries the canonical `[HTML]` marker.
    Canonical,
    /// Carries only the loose `HTML` substring — second-class, tolerated.
    Loose,
    /// Does not advertise HTML capability at all.
    None,
}

/// Classifies a raw display name against the HTML-server marker rules.
///
/// The canonical marker is `[HTML]`; a bare `HTML` substring anywhere in the
/// name is also accepted for tolerance but is second-class — faithfully
/// reproduced rather than hardened to the canonical form only.
pub fn classify_marker(display_name: &str) -> MarkerClass {
    if display_name.contains(HTML_MARKER) {
        MarkerClass::Canonical
    } else if display_name.contains(HTML_MARKER_LOOSE) {
        MarkerClass::Loose
    } else {
        MarkerClass::None
    }
}

/// Strips the canonical marker from a display name to produce the peer's
/// presentation name, substituting a placeholder if nothing remains.
pub fn strip_marker(display_name: &str) -> String {
    let stripped = display_name.replace(HTML_MARKER, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        "Unknown Server".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Decodes a display name out of announce app-data. The substrate is
/// responsible for the actual encoding; here we only assume UTF-8 app-data,
/// which is what `MeshAdapter` implementations must hand back per their
/// narrow contract.
pub fn decode_display_name(app_data: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(app_data).ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_marker_wins_over_loose() {
        assert_eq!(classify_marker("[HTML] Node"), MarkerClass::Canonical);
    }

    #[test]
    fn loose_marker_is_still_recognized() {
        assert_eq!(classify_marker("My HTML Thing"), MarkerClass::Loose);
    }

    #[test]
    fn no_marker_is_none() {
        assert_eq!(classify_marker("Just a peer"), MarkerClass::None);
    }

    #[test]
    fn strip_marker_produces_presentation_name() {
        assert_eq!(strip_marker("[HTML] Node"), "Node");
        assert_eq!(strip_marker("[HTML]"), "Unknown Server");
        assert_eq!(strip_marker("[HTML]   "), "Unknown Server");
    }

    #[test]
    fn decode_rejects_empty_or_non_utf8() {
        assert_eq!(decode_display_name(b""), None);
        assert_eq!(decode_display_name(&[0xff, 0xfe]), None);
        assert_eq!(decode_display_name(b"  Node  "), Some("Node".to_string()));
    }
}
