//! Settings loading from a flat `KEY=VALUE` environment file.
//!
//! The file format is deliberately primitive: one pair per line, `#`-led
//! comments and blank lines skipped, first `=` splits key from value, no
//! quoting or escaping. A missing file is not an error — the probe then
//! runs entirely on defaults. Settings are loaded once at startup and
//! passed by reference; there is no ambient global state.

use crate::{ProbeError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = ".env.app";

/// Immutable mapping of setting names to string values.
///
/// Keys and values are stored verbatim as they appear after line trimming;
/// interpretation (defaults, parsing ports) happens at derivation time in
/// [`crate::config::ConnectionConfig::from_settings`].
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the given file path.
    ///
    /// A non-existent file yields an empty mapping. Any other read failure
    /// (permissions, not-a-file) is reported as an I/O error so a present
    /// but unreadable file is never silently ignored.
    ///
    /// # Errors
    /// Returns [`ProbeError::Io`] if the file exists but cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let settings = Self::parse(&content);
                tracing::debug!(
                    "loaded {} setting(s) from {}",
                    settings.len(),
                    path.display()
                );
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("settings file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ProbeError::io(
                format!("failed to read settings file {}", path.display()),
                e,
            )),
        }
    }

    /// Parses settings from file content.
    ///
    /// Lines are trimmed as a whole; a trimmed line is skipped when it is
    /// empty, starts with `#`, or contains no `=`. The first `=` splits key
    /// from value and both halves are kept verbatim (no inner trimming).
    /// Later occurrences of a key overwrite earlier ones.
    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.to_string(), value.to_string());
            }
        }
        Self { values }
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the value for `key`, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Consumes these settings and returns a copy with `entries` applied
    /// on top.
    ///
    /// Used by the CLI to let explicit flags and process environment
    /// variables win over file values while keeping the loaded value
    /// immutable in spirit: overlaying produces a new `Settings`.
    pub fn overlay<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in entries {
            self.values.insert(key, value);
        }
        self
    }

    /// Number of settings in the mapping.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the mapping holds no settings at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_well_formed_pairs_verbatim() {
        let settings = Settings::parse("REDIS_HOST=cache.example.com\nREDIS_PORT=6380\n");
        assert_eq!(settings.get("REDIS_HOST"), Some("cache.example.com"));
        assert_eq!(settings.get("REDIS_PORT"), Some("6380"));
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content = "# redis connection\n\n   \nREDIS_HOST=localhost\n  # trailing comment\n";
        let settings = Settings::parse(content);
        assert_eq!(settings.len(), 1);
        assert_eq!(settings.get("REDIS_HOST"), Some("localhost"));
    }

    #[test]
    fn test_parse_splits_on_first_equals_only() {
        let settings = Settings::parse("REDIS_PASSWORD=s3cr=et==\n");
        assert_eq!(settings.get("REDIS_PASSWORD"), Some("s3cr=et=="));
    }

    #[test]
    fn test_parse_keeps_inner_whitespace_verbatim() {
        // Only the line as a whole is trimmed; key/value halves are not.
        let settings = Settings::parse("  REDIS_HOST = cache.internal  \n");
        assert_eq!(settings.get("REDIS_HOST "), Some(" cache.internal"));
        assert_eq!(settings.get("REDIS_HOST"), None);
    }

    #[test]
    fn test_parse_skips_lines_without_equals() {
        let settings = Settings::parse("REDIS_HOST\njust some text\nREDIS_PORT=6379\n");
        assert_eq!(settings.len(), 1);
    }

    #[test]
    fn test_parse_empty_value_and_later_duplicate_wins() {
        let settings = Settings::parse("REDIS_PASSWORD=\nREDIS_HOST=a\nREDIS_HOST=b\n");
        assert_eq!(settings.get("REDIS_PASSWORD"), Some(""));
        assert_eq!(settings.get("REDIS_HOST"), Some("b"));
    }

    #[test]
    fn test_load_missing_file_yields_empty_mapping() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("no-such.env");

        let settings = Settings::load(&path).expect("missing file is not an error");
        assert!(settings.is_empty());
    }

    #[test]
    fn test_load_reads_file_contents() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(".env.app");
        let mut file = std::fs::File::create(&path).expect("create settings file");
        writeln!(file, "# probe target").expect("write");
        writeln!(file, "REDIS_HOST=cache.example.com").expect("write");
        writeln!(file, "REDIS_PORT=6380").expect("write");

        let settings = Settings::load(&path).expect("load settings");
        assert_eq!(settings.get("REDIS_HOST"), Some("cache.example.com"));
        assert_eq!(settings.get_or("REDIS_PASSWORD", ""), "");
    }

    #[test]
    fn test_load_unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        // A directory exists but cannot be read as a file.
        let result = Settings::load(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_overlay_overrides_and_extends() {
        let settings = Settings::parse("REDIS_HOST=from-file\nREDIS_PORT=6379\n").overlay([
            ("REDIS_HOST".to_string(), "from-flag".to_string()),
            ("REDIS_DB".to_string(), "2".to_string()),
        ]);

        assert_eq!(settings.get("REDIS_HOST"), Some("from-flag"));
        assert_eq!(settings.get("REDIS_PORT"), Some("6379"));
        assert_eq!(settings.get("REDIS_DB"), Some("2"));
    }
}
