// Third-party ad SDK loader snippet for placeholder pages.

use serde_json::json;

use crate::placeholder::{escape_script, script_literal};

/// Global object the SDK installs on `window`.
pub const SDK_GLOBAL: &str = "adSdk";

/// Ad SDK settings. All values come from the environment; nothing is baked in.
#[derive(Debug, Clone, Default)]
pub struct AdSdkConfig {
    pub script_url: Option<String>,
    pub publisher_id: Option<String>,
    pub token: Option<String>,
    pub allowed_domains: Vec<String>,
    pub blocked_domains: Vec<String>,
}

impl AdSdkConfig {
    /// The loader is only emitted when both the script and publisher are known.
    pub fn is_enabled(&self) -> bool {
        matches!(
            (&self.script_url, &self.publisher_id),
            (Some(url), Some(id)) if !url.is_empty() && !id.is_empty()
        )
    }

    /// HTML fragment that loads the SDK after the page is interactive and
    /// initializes it if the SDK exposes `init`. Empty when disabled.
    pub fn snippet(&self) -> String {
        if !self.is_enabled() {
            return String::new();
        }
        let url = self.script_url.as_deref().unwrap_or_default();
        let publisher_id = self.publisher_id.as_deref().unwrap_or_default();
        let init = json!({
            "publisherId": publisher_id,
            "allowedDomains": self.allowed_domains,
            "blockedDomains": self.blocked_domains,
            "token": self.token.as_deref().unwrap_or(""),
        });
        format!(
            r#"<script>
window.addEventListener("load", function () {{
  var s = document.createElement("script");
  s.src = {src};
  s.async = true;
  s.onload = function () {{
    var sdk = window[{global}];
    if (sdk && typeof sdk.init === "function") {{
      sdk.init({init});
    }}
  }};
  document.head.appendChild(s);
}});
</script>"#,
            src = script_literal(url),
            global = script_literal(SDK_GLOBAL),
            init = escape_script(&init.to_string()),
        )
    }
}
