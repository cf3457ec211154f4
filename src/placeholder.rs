// Placeholder page shown on retired routes while the one-shot redirect runs.

use crate::ad_sdk::AdSdkConfig;
use crate::retirement::RouteRetirementEntry;

const DEFAULT_TITLE: &str = "Page moved";
const LINK_TEXT: &str = "Continue";

/// Escape text for HTML element content and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Make serialized JSON safe to embed inside a `<script>` element.
pub fn escape_script(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// A string as a JS string literal, safe inside `<script>`.
pub fn script_literal(value: &str) -> String {
    escape_script(&serde_json::Value::from(value).to_string())
}

/// Static status view: heading, text, optional spinner and manual link.
///
/// When `destination` is set the page also carries a redirect script that
/// replaces the current history entry exactly once. If that navigation never
/// happens the body simply stays on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub title: String,
    pub subtitle: String,
    pub destination: Option<String>,
    pub spinner: bool,
    pub manual_link: bool,
    /// Pre-rendered ad SDK loader, empty for none.
    pub ad_sdk: String,
}

impl Placeholder {
    /// Fixed-text page with no redirect.
    pub fn fixed(title: &str, subtitle: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            destination: None,
            spinner: false,
            manual_link: false,
            ad_sdk: String::new(),
        }
    }

    /// Placeholder for a retired page that redirects.
    pub fn for_entry(entry: &RouteRetirementEntry, ads: &AdSdkConfig) -> Self {
        Self {
            title: entry
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            subtitle: entry.message.clone(),
            destination: Some(entry.destination().to_string()),
            spinner: entry.spinner,
            manual_link: entry.manual_link,
            ad_sdk: if entry.ad_slot {
                ads.snippet()
            } else {
                String::new()
            },
        }
    }

    pub fn render(&self) -> String {
        let title = escape_html(&self.title);
        let subtitle = escape_html(&self.subtitle);

        let mut body = String::new();
        body.push_str(&format!("<h1>{title}</h1>\n<p>{subtitle}</p>\n"));
        if self.spinner {
            body.push_str("<div class=\"spinner\" role=\"status\" aria-label=\"Redirecting\"></div>\n");
        }

        let mut tail = String::new();
        if let Some(dest) = &self.destination {
            let href = escape_html(dest);
            if self.manual_link {
                body.push_str(&format!("<p><a href=\"{href}\">{LINK_TEXT}</a></p>\n"));
            } else {
                body.push_str(&format!(
                    "<noscript><p><a href=\"{href}\">{LINK_TEXT}</a></p></noscript>\n"
                ));
            }
            tail.push_str(&redirect_script(dest));
        }
        tail.push_str(&self.ad_sdk);

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; margin: 0; text-align: center; }}
.spinner {{ width: 2rem; height: 2rem; border: 3px solid #ccc; border-top-color: #333; border-radius: 50%; animation: spin 1s linear infinite; }}
@keyframes spin {{ to {{ transform: rotate(360deg); }} }}
</style>
</head>
<body>
{body}{tail}
</body>
</html>
"#
        )
    }
}

/// One-shot navigation: runs on first activation, guarded so a re-run is a no-op,
/// and uses `location.replace` so the retired path leaves no history entry.
fn redirect_script(destination: &str) -> String {
    format!(
        r#"<script>
(function () {{
  var done = false;
  function go() {{
    if (done) return;
    done = true;
    window.location.replace({dest});
  }}
  if (document.readyState === "loading") {{
    document.addEventListener("DOMContentLoaded", go, {{ once: true }});
  }} else {{
    go();
  }}
}})();
</script>
"#,
        dest = script_literal(destination)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retirement::RetirementTable;

    #[test]
    fn test_fixed_placeholder_has_no_redirect() {
        let html = Placeholder::fixed("Gone fishing", "Back soon").render();
        assert!(html.contains("<h1>Gone fishing</h1>"));
        assert!(html.contains("<p>Back soon</p>"));
        assert!(!html.contains("location.replace"));
        assert!(!html.contains("spinner\" role"));
    }

    #[test]
    fn test_entry_placeholder_redirects_once_with_replace() {
        let table = RetirementTable::builtin();
        let entry = table.lookup("/tournaments/all").unwrap();
        let html = Placeholder::for_entry(entry, &AdSdkConfig::default()).render();

        assert_eq!(html.matches("window.location.replace(").count(), 1);
        assert!(html.contains(r#"window.location.replace("/tournaments");"#));
        assert!(html.contains("if (done) return;"));
        assert!(!html.contains("location.href ="));
        assert!(!html.contains("history.push"));
        assert!(html.contains(r#"<a href="/tournaments">Continue</a>"#));
        assert!(html.contains("role=\"status\""));
    }

    #[test]
    fn test_noscript_link_when_manual_link_disabled() {
        let mut entry = RetirementTable::builtin().lookup("/mining").unwrap().clone();
        entry.manual_link = false;
        let html = Placeholder::for_entry(&entry, &AdSdkConfig::default()).render();
        assert!(html.contains(r#"<noscript><p><a href="/">Continue</a></p></noscript>"#));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = Placeholder::fixed("<b>x</b>", "a & \"b\"").render();
        assert!(html.contains("<h1>&lt;b&gt;x&lt;/b&gt;</h1>"));
        assert!(html.contains("a &amp; &quot;b&quot;"));
    }

    #[test]
    fn test_destination_cannot_break_out_of_script() {
        let mut placeholder = Placeholder::fixed("t", "s");
        placeholder.destination = Some("/x</script><script>alert(1)".into());
        let html = placeholder.render();
        assert!(!html.contains("</script><script>alert"));
        assert!(html.contains(r"/x\u003c/script\u003e"));
    }

    #[test]
    fn test_ad_snippet_only_on_ad_slot_entries() {
        let ads = AdSdkConfig {
            script_url: Some("https://ads.example.com/sdk.js".into()),
            publisher_id: Some("pub-1".into()),
            ..Default::default()
        };
        let table = RetirementTable::builtin();

        let watch = Placeholder::for_entry(table.lookup("/watch-and-earn").unwrap(), &ads);
        assert!(watch.render().contains("https://ads.example.com/sdk.js"));

        let mining = Placeholder::for_entry(table.lookup("/mining").unwrap(), &ads);
        assert!(!mining.render().contains("ads.example.com"));
    }

    #[test]
    fn test_default_title() {
        let entry = RouteRetirementEntry::redirect("/old", "/new", "moved");
        let placeholder = Placeholder::for_entry(&entry, &AdSdkConfig::default());
        assert_eq!(placeholder.title, DEFAULT_TITLE);
    }
}
