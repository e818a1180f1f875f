//! The productive site list. A hostname is productive when any pattern of the list is contained
//! in it, so `github.com` covers `gist.github.com` as well.

use serde::{Deserialize, Serialize};

use crate::daemon::storage::entities::Category;

/// Patterns used until the user edits the list.
pub const DEFAULT_PRODUCTIVE_SITES: [&str; 25] = [
    "github.com",
    "stackoverflow.com",
    "developer.mozilla.org",
    "leetcode.com",
    "codecademy.com",
    "udemy.com",
    "coursera.org",
    "edx.org",
    "freecodecamp.org",
    "medium.com/tech",
    "dev.to",
    "hashnode.com",
    "css-tricks.com",
    "codepen.io",
    "repl.it",
    "glitch.com",
    "notion.so",
    "trello.com",
    "atlassian.com",
    "google.com/docs",
    "google.com/sheets",
    "google.com/slides",
    "docs.microsoft.com",
    "aws.amazon.com",
    "cloud.google.com",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteList(Vec<String>);

impl Default for SiteList {
    fn default() -> Self {
        Self(DEFAULT_PRODUCTIVE_SITES.iter().map(|v| v.to_string()).collect())
    }
}

impl SiteList {
    pub fn new(patterns: Vec<String>) -> Self {
        Self(patterns)
    }

    /// Builds a list from the settings editor text: one pattern per line, surrounding whitespace
    /// removed, blank lines dropped.
    pub fn parse(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Text shown in the settings editor. [SiteList::parse] of it gives the same list back.
    pub fn to_editor_text(&self) -> String {
        self.0.join("\n")
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    pub fn is_productive(&self, hostname: &str) -> bool {
        self.0.iter().any(|pattern| hostname.contains(pattern.as_str()))
    }

    pub fn classify(&self, hostname: &str) -> Category {
        if self.is_productive(hostname) {
            Category::Productive
        } else {
            Category::Unproductive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_is_productive() {
        let sites = SiteList::default();
        assert_eq!(sites.classify("sub.github.com"), Category::Productive);
        assert_eq!(sites.classify("github.com"), Category::Productive);
        assert_eq!(sites.classify("youtube.com"), Category::Unproductive);
    }

    #[test]
    fn test_path_patterns_never_match_hostnames() {
        // Hostnames carry no path, so these defaults only ever match through a custom list.
        let sites = SiteList::new(vec!["google.com/docs".into()]);
        assert_eq!(sites.classify("docs.google.com"), Category::Unproductive);
    }

    #[test]
    fn test_empty_list_classifies_everything_unproductive() {
        let sites = SiteList::new(vec![]);
        assert_eq!(sites.classify("github.com"), Category::Unproductive);
    }

    #[test]
    fn test_editor_text_parsing() {
        let sites = SiteList::parse("  a.com \n\n\t\nb.com\n");
        assert_eq!(sites.patterns(), ["a.com", "b.com"]);
        assert_eq!(SiteList::parse(&sites.to_editor_text()), sites);
    }
}
