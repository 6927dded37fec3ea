//! HTML fragment summarising where a setting is inherited from

use crate::resolver::InheritanceResult;
use std::fmt::Write as _;

/// Tooltip of the conflict icon
pub const CONFLICT_TEXT: &str = "Conflict between keys!";

/// Render the heritage table for a resolved key
///
/// One `<link>: value` line per entry. On conflict a second cell holds the
/// warning icon inside `div_id`, hidden when the subject already overrides
/// the key. Returns `None` when nothing is inherited.
#[must_use]
pub fn render_heritage(
    result: &InheritanceResult,
    key_redefined: bool,
    div_id: &str,
) -> Option<String> {
    if result.entries.is_empty() {
        return None;
    }

    let mut html =
        String::from("<table cellpadding=\"0\" cellspacing=\"0\" border=\"0\"><tr><td>");
    for entry in &result.entries {
        let _ = write!(
            html,
            "<a href=\"{}\">{}</a>: {} <br />",
            escape(&entry.source_link),
            escape(&entry.source_label),
            escape(&entry.value)
        );
    }
    html.push_str("</td>");

    if result.conflict {
        let display = if key_redefined { "none" } else { "" };
        let _ = write!(
            html,
            "<td><div id=\"{id}\" style=\"display:{display}\" ><img src=\"img/battention.gif\" alt=\"{CONFLICT_TEXT}\" title=\"{CONFLICT_TEXT}\"></div></td>",
            id = escape(div_id),
        );
    }
    html.push_str("</tr></table>");
    Some(html)
}

/// Escape text for element content and double-quoted attributes
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::InheritedEntry;
    use pretty_assertions::assert_eq;
    use turret_model::OwnerKind;

    fn entry(label: &str, link: &str, value: &str) -> InheritedEntry {
        InheritedEntry {
            source_label: label.into(),
            source_link: link.into(),
            value: value.into(),
            source: OwnerKind::SpecificZone,
        }
    }

    #[test]
    fn nothing_inherited_renders_nothing() {
        assert_eq!(render_heritage(&InheritanceResult::default(), false, "d"), None);
    }

    #[test]
    fn single_entry_has_no_icon() {
        let result = InheritanceResult {
            entries: vec![entry("Zone A", "z?item=1", "chime1")],
            conflict: false,
        };
        assert_eq!(
            render_heritage(&result, false, "div_cb_ringtone").unwrap(),
            "<table cellpadding=\"0\" cellspacing=\"0\" border=\"0\"><tr><td>\
             <a href=\"z?item=1\">Zone A</a>: chime1 <br /></td></tr></table>"
        );
    }

    #[test]
    fn conflict_icon_hidden_when_redefined() {
        let result = InheritanceResult {
            entries: vec![entry("A", "a", "1"), entry("B", "b", "2")],
            conflict: true,
        };
        let shown = render_heritage(&result, false, "div_cb_k").unwrap();
        assert!(shown.contains("<div id=\"div_cb_k\" style=\"display:\" >"));
        assert!(shown.contains("title=\"Conflict between keys!\""));

        let hidden = render_heritage(&result, true, "div_cb_k").unwrap();
        assert!(hidden.contains("style=\"display:none\""));
    }

    #[test]
    fn values_are_escaped() {
        assert_eq!(escape("<b>\"x\" & 'y'"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;");
        let result = InheritanceResult {
            entries: vec![entry("A&B", "p?a=1&b=2", "<script>")],
            conflict: false,
        };
        let html = render_heritage(&result, false, "d").unwrap();
        assert!(html.contains("href=\"p?a=1&amp;b=2\""));
        assert!(html.contains("A&amp;B</a>: &lt;script&gt;"));
    }
}
