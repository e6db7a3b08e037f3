// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API key discovery.
//!
//! Resolution order:
//! 1. The `ANTHROPIC_API_KEY` environment variable
//! 2. `./.env`, `./server/.env` (relative to the working directory)
//! 3. `~/.anthropic/api_key`, `~/.config/anthropic/key`
//!
//! A file matches if it has an `ANTHROPIC_API_KEY=` line (quotes stripped)
//! or if its whole content is a bare `sk-ant-` key.

use std::path::PathBuf;

use routewise_core::RoutewiseError;
use secrecy::SecretString;
use tracing::debug;

/// Environment variable checked first.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const BARE_KEY_PREFIX: &str = "sk-ant-";

/// Where to look for a credential, in order.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    env_var: String,
    search_paths: Vec<PathBuf>,
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::standard()
    }
}

impl CredentialSource {
    pub fn new(env_var: impl Into<String>, search_paths: Vec<PathBuf>) -> Self {
        Self {
            env_var: env_var.into(),
            search_paths,
        }
    }

    /// The standard env var and file locations.
    pub fn standard() -> Self {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(".env"));
            paths.push(cwd.join("server").join(".env"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".anthropic").join("api_key"));
            paths.push(home.join(".config").join("anthropic").join("key"));
        }
        Self::new(API_KEY_ENV, paths)
    }

    /// Find the first usable key, or [`RoutewiseError::Credential`].
    pub fn resolve(&self) -> Result<SecretString, RoutewiseError> {
        if let Ok(value) = std::env::var(&self.env_var)
            && !value.trim().is_empty()
        {
            debug!(env = %self.env_var, "credential found in environment");
            return Ok(SecretString::from(value.trim().to_string()));
        }

        for path in &self.search_paths {
            let Ok(content) = std::fs::read_to_string(path) else {
                continue;
            };
            if let Some(key) = parse_key_file(&content, &self.env_var) {
                debug!(path = %path.display(), "credential found in file");
                return Ok(SecretString::from(key));
            }
        }

        Err(RoutewiseError::Credential)
    }
}

/// Extract a key from a dotenv-style or bare key file.
pub(crate) fn parse_key_file(content: &str, env_var: &str) -> Option<String> {
    let assignment = format!("{env_var}=");
    for line in content.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix(&assignment) {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    let bare = content.trim();
    bare.starts_with(BARE_KEY_PREFIX).then(|| bare.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn parses_assignment_lines() {
        let content = "OTHER=1\nANTHROPIC_API_KEY=\"sk-ant-quoted\"\n";
        assert_eq!(
            parse_key_file(content, API_KEY_ENV).as_deref(),
            Some("sk-ant-quoted")
        );
        assert_eq!(
            parse_key_file("ANTHROPIC_API_KEY='abc123'", API_KEY_ENV).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn parses_bare_key() {
        assert_eq!(
            parse_key_file("  sk-ant-bare-key\n", API_KEY_ENV).as_deref(),
            Some("sk-ant-bare-key")
        );
    }

    #[test]
    fn ignores_unrelated_content() {
        assert_eq!(parse_key_file("OPENAI_API_KEY=sk-other", API_KEY_ENV), None);
        assert_eq!(parse_key_file("ANTHROPIC_API_KEY=", API_KEY_ENV), None);
        assert_eq!(parse_key_file("", API_KEY_ENV), None);
    }

    #[test]
    fn searches_files_in_order() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.env");
        let unrelated = dir.path().join("unrelated.env");
        let first = dir.path().join("first.env");
        let second = dir.path().join("second");
        std::fs::write(&unrelated, "FOO=bar\n").unwrap();
        std::fs::write(&first, "ANTHROPIC_API_KEY=sk-ant-first\n").unwrap();
        std::fs::write(&second, "sk-ant-second").unwrap();

        let source = CredentialSource::new(
            "ROUTEWISE_TEST_UNSET_KEY_VAR",
            vec![missing, unrelated, first, second],
        );
        assert_eq!(source.resolve().unwrap().expose_secret(), "sk-ant-first");
    }

    #[test]
    fn nothing_found_is_a_credential_error() {
        let dir = tempdir().unwrap();
        let source = CredentialSource::new(
            "ROUTEWISE_TEST_UNSET_KEY_VAR",
            vec![dir.path().join("nope")],
        );
        assert!(matches!(source.resolve(), Err(RoutewiseError::Credential)));
    }

    #[test]
    #[serial]
    fn environment_wins_over_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(".env");
        std::fs::write(&file, "ROUTEWISE_TEST_KEY=from-file\n").unwrap();

        // SAFETY: serialized with the other env-mutating tests.
        unsafe { std::env::set_var("ROUTEWISE_TEST_KEY", "from-env") };
        let source = CredentialSource::new("ROUTEWISE_TEST_KEY", vec![file.clone()]);
        let resolved = source.resolve().unwrap();
        unsafe { std::env::remove_var("ROUTEWISE_TEST_KEY") };
        assert_eq!(resolved.expose_secret(), "from-env");

        let resolved = source.resolve().unwrap();
        assert_eq!(resolved.expose_secret(), "from-file");
    }
}
