// Retired route table: which old paths redirect, which answer 410 Gone.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Fallback destination for retired pages without a replacement.
pub const HOME_PATH: &str = "/";

/// How a retired path is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetirementMode {
    /// Serve a placeholder page that navigates to the replacement once.
    ClientRedirect,
    /// Answer with `410 Gone` and a JSON error body.
    GoneResponse,
}

impl RetirementMode {
    /// Label used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetirementMode::ClientRedirect => "client_redirect",
            RetirementMode::GoneResponse => "gone",
        }
    }
}

impl std::fmt::Display for RetirementMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// One retired page or endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRetirementEntry {
    pub old_path: String,
    #[serde(default)]
    pub replacement_path: Option<String>,
    pub mode: RetirementMode,
    pub message: String,
    /// Placeholder heading; a generic one is used when absent.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_true")]
    pub spinner: bool,
    #[serde(default = "default_true")]
    pub manual_link: bool,
    /// Embed the ad SDK loader in this entry's placeholder.
    #[serde(default)]
    pub ad_slot: bool,
}

impl RouteRetirementEntry {
    pub fn redirect(old_path: &str, replacement_path: &str, message: &str) -> Self {
        Self {
            old_path: old_path.to_string(),
            replacement_path: Some(replacement_path.to_string()),
            mode: RetirementMode::ClientRedirect,
            message: message.to_string(),
            title: None,
            spinner: true,
            manual_link: true,
            ad_slot: false,
        }
    }

    pub fn gone(old_path: &str, message: &str) -> Self {
        Self {
            old_path: old_path.to_string(),
            replacement_path: None,
            mode: RetirementMode::GoneResponse,
            message: message.to_string(),
            title: None,
            spinner: false,
            manual_link: false,
            ad_slot: false,
        }
    }

    fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    fn with_ad_slot(mut self) -> Self {
        self.ad_slot = true;
        self
    }

    /// Where the retired page sends the user. Falls back to the home path.
    pub fn destination(&self) -> &str {
        self.replacement_path.as_deref().unwrap_or(HOME_PATH)
    }
}

/// Errors building or querying a retirement table.
#[derive(Debug, thiserror::Error)]
pub enum RetirementError {
    #[error("retired path must be a same-origin absolute path: {0:?}")]
    RelativeOldPath(String),
    #[error("replacement for {old_path} must be a same-origin absolute path: {replacement:?}")]
    RelativeReplacement { old_path: String, replacement: String },
    #[error("duplicate retired path: {0}")]
    Duplicate(String),
    #[error("{0} redirects to itself")]
    SelfRedirect(String),
    #[error("redirect cycle: {}", .0.join(" -> "))]
    RedirectCycle(Vec<String>),
    #[error("failed to read retirement table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse retirement table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Strip one trailing slash so `/mining/` matches `/mining`. The root stays `/`.
pub fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// A same-origin absolute path. `//host` and `/\host` are read by browsers as
/// protocol-relative URLs and leave the site.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

/// Immutable, validated set of retired routes.
#[derive(Debug, Clone, Default)]
pub struct RetirementTable {
    entries: Vec<RouteRetirementEntry>,
    index: HashMap<String, usize>,
}

impl RetirementTable {
    /// Validate entries and build the lookup index.
    pub fn from_entries(entries: Vec<RouteRetirementEntry>) -> Result<Self, RetirementError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if !is_local_path(&entry.old_path) {
                return Err(RetirementError::RelativeOldPath(entry.old_path.clone()));
            }
            let key = normalize_path(&entry.old_path);
            if let Some(replacement) = &entry.replacement_path {
                if !is_local_path(replacement) {
                    return Err(RetirementError::RelativeReplacement {
                        old_path: entry.old_path.clone(),
                        replacement: replacement.clone(),
                    });
                }
            }
            if entry.mode == RetirementMode::ClientRedirect
                && normalize_path(entry.destination()) == key
            {
                return Err(RetirementError::SelfRedirect(entry.old_path.clone()));
            }
            if index.insert(key.to_string(), i).is_some() {
                return Err(RetirementError::Duplicate(entry.old_path.clone()));
            }
        }
        Ok(Self { entries, index })
    }

    /// Load a JSON array of entries from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, RetirementError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RetirementError> {
        let entries: Vec<RouteRetirementEntry> = serde_json::from_str(raw)?;
        Self::from_entries(entries)
    }

    /// Routes retired from the product so far.
    pub fn builtin() -> Self {
        let settings_msg = "These settings have moved to the admin settings hub.";
        let entries = vec![
            RouteRetirementEntry::redirect(
                "/admin/settings/crash-game",
                "/admin/settings",
                "The crash game has been removed. Its settings are no longer available.",
            )
            .with_title("Crash game settings removed"),
            RouteRetirementEntry::redirect(
                "/admin/settings/linkvertise",
                "/admin/settings",
                settings_msg,
            )
            .with_title("Linkvertise settings moved"),
            RouteRetirementEntry::redirect(
                "/admin/settings/milestone-tasks",
                "/admin/settings",
                settings_msg,
            )
            .with_title("Milestone tasks settings moved"),
            RouteRetirementEntry::redirect(
                "/admin/settings/splash-screen",
                "/admin/settings",
                "The splash screen feature has been removed.",
            )
            .with_title("Splash screen removed"),
            RouteRetirementEntry::redirect(
                "/admin/splash-screen",
                "/admin/settings",
                "The splash screen feature has been removed.",
            )
            .with_title("Splash screen removed"),
            RouteRetirementEntry::redirect(
                "/mining",
                HOME_PATH,
                "Mining has been retired. Taking you back to the homepage.",
            )
            .with_title("Mining is no longer available"),
            RouteRetirementEntry::redirect(
                "/results-hub",
                HOME_PATH,
                "The results hub has been removed. Taking you back to the homepage.",
            )
            .with_title("Results hub removed"),
            RouteRetirementEntry::redirect(
                "/tournaments/all",
                "/tournaments",
                "All tournaments are now listed on the tournaments page.",
            )
            .with_title("Tournaments have moved"),
            RouteRetirementEntry::redirect(
                "/watch-and-earn",
                "/earn-tasks",
                "Watch and earn is now part of earn tasks.",
            )
            .with_title("Watch and earn has moved")
            .with_ad_slot(),
            RouteRetirementEntry::gone(
                "/api/generate-content",
                "This endpoint is deprecated. Use the direct content generation action instead.",
            ),
        ];
        Self::from_entries(entries).expect("built-in retirement table is valid")
    }

    pub fn lookup(&self, path: &str) -> Option<&RouteRetirementEntry> {
        self.index
            .get(normalize_path(path))
            .map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteRetirementEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follow redirect hops through retired destinations to the first live path.
    ///
    /// Only used for diagnostics: the placeholder always performs a single hop.
    /// A path that is not retired resolves to itself.
    pub fn resolve_chain(&self, path: &str) -> Result<String, RetirementError> {
        let mut seen: Vec<String> = Vec::new();
        let mut current = normalize_path(path).to_string();
        loop {
            let entry = match self.lookup(&current) {
                Some(e) if e.mode == RetirementMode::ClientRedirect => e,
                _ => return Ok(current),
            };
            if let Some(pos) = seen.iter().position(|p| *p == current) {
                let mut cycle = seen.split_off(pos);
                cycle.push(current);
                return Err(RetirementError::RedirectCycle(cycle));
            }
            seen.push(current);
            current = normalize_path(entry.destination()).to_string();
        }
    }

    /// All redirect cycles, each reported once starting from its first table entry.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut reported: HashSet<String> = HashSet::new();
        let mut cycles = Vec::new();
        for entry in &self.entries {
            if entry.mode != RetirementMode::ClientRedirect {
                continue;
            }
            if let Err(RetirementError::RedirectCycle(cycle)) =
                self.resolve_chain(&entry.old_path)
            {
                if cycle.iter().any(|p| reported.contains(p)) {
                    continue;
                }
                reported.extend(cycle.iter().cloned());
                cycles.push(cycle);
            }
        }
        cycles
    }
}
