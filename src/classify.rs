//! Classifies captured package-manager output by phrase matching.
//!
//! All matching is case-insensitive substring search. The phrase tables track
//! the English messages printed by winget and must stay in sync with the tool
//! version being driven.

/// Maximum number of lines kept by [`summarize`].
pub const SUMMARY_LINES: usize = 6;

/// Shown in place of a summary when the command printed nothing useful.
pub const NO_OUTPUT: &str = "(no output)";

const NOT_INSTALLED_PHRASES: &[&str] = &[
    "No installed package found matching input criteria",
    "No installed package found",
];

const NO_UPGRADE_PHRASES: &[&str] = &[
    "No available upgrade found",
    "No newer package versions are available from the configured sources",
    "No packages found matching input criteria",
    "No installed package found",
];

const ELEVATION_PHRASES: &[&str] = &[
    "will request to run as administrator",
    "request to run as administrator",
];

const SPINNER_GLYPHS: &[char] = &['-', '\\', '/', '|', '█', '▒', '░'];

/// The kind of operation whose success is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Installed,
    Uninstalled,
    /// Upgrades report any of "installed", "upgraded" or "updated".
    Upgraded,
}

impl Verb {
    fn success_phrases(self) -> &'static [&'static str] {
        match self {
            Verb::Installed => &["Successfully installed"],
            Verb::Uninstalled => &["Successfully uninstalled"],
            Verb::Upgraded => &[
                "Successfully installed",
                "Successfully upgraded",
                "Successfully updated",
            ],
        }
    }
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    let haystack = text.to_lowercase();
    phrases
        .iter()
        .any(|phrase| haystack.contains(&phrase.to_lowercase()))
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// True when the output says the package is absent, or says nothing at all.
pub fn is_not_installed(text: &str) -> bool {
    is_blank(text) || contains_any(text, NOT_INSTALLED_PHRASES)
}

/// True when the upgrade check found nothing to do, or produced no output.
pub fn is_no_upgrade_available(text: &str) -> bool {
    is_blank(text) || contains_any(text, NO_UPGRADE_PHRASES)
}

/// True when the installer announced it would prompt for administrator rights.
pub fn requires_elevation(text: &str) -> bool {
    contains_any(text, ELEVATION_PHRASES)
}

pub fn is_success(text: &str, verb: Verb) -> bool {
    contains_any(text, verb.success_phrases())
}

/// A line made only of whitespace and progress-animation glyphs.
pub fn is_spinner_line(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || SPINNER_GLYPHS.contains(&c))
}

/// The first few informative lines of `text`, for diagnostics.
pub fn summarize(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_spinner_line(line))
        .take(SUMMARY_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

/// [`summarize`] for a failure message; never empty.
pub fn failure_summary(text: &str) -> String {
    let summary = summarize(text);
    if summary.is_empty() {
        NO_OUTPUT.to_string()
    } else {
        summary
    }
}
