//! Dotenv-style file loader
//!
//! One `KEY=VALUE` per line. Blank lines and lines starting with `#` are
//! skipped, the line is split on the first `=` only, and the last
//! occurrence of a key wins. No quoting, escaping or multi-line values.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::errors::RoadError;
use crate::filesys::file::File;

/// Parse dotenv contents into a map
pub fn parse_env(contents: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            debug!("Skipping env line without '=': {}", trimmed);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), value.trim().to_string());
    }

    vars
}

/// Copy parsed variables into the process environment.
///
/// Keys already present in the environment are left untouched. Returns the
/// number of variables set.
pub fn apply_to_process_env(vars: &HashMap<String, String>) -> usize {
    let mut applied = 0;
    for (key, value) in vars {
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, value);
            applied += 1;
        }
    }
    applied
}

/// Load an env file, apply it to the process environment and return the
/// full parsed map.
///
/// A missing file is not an error: a warning is logged and an empty map
/// returned.
pub async fn load_env_file(file: &File) -> Result<HashMap<String, String>, RoadError> {
    let Some(contents) = file.read_string_opt().await? else {
        warn!(
            "Env file not found at {}, continuing with an empty environment",
            file.path().display()
        );
        return Ok(HashMap::new());
    };

    let vars = parse_env(&contents);
    let applied = apply_to_process_env(&vars);
    debug!(
        "Loaded {} variables from {} ({} new to the process environment)",
        vars.len(),
        file.path().display(),
        applied
    );
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_first_equals() {
        let vars = parse_env("FOO=bar=baz\n");
        assert_eq!(vars.get("FOO").map(String::as_str), Some("bar=baz"));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let vars = parse_env("# comment\n\n   \n  # indented comment\nA=1\n");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["A"], "1");
    }

    #[test]
    fn test_last_duplicate_wins() {
        let vars = parse_env("KEY=first\nKEY=second\n");
        assert_eq!(vars["KEY"], "second");
    }

    #[test]
    fn test_value_trimmed_and_empty_allowed() {
        let vars = parse_env("SPACED =  padded value  \nEMPTY=\n");
        assert_eq!(vars["SPACED"], "padded value");
        assert_eq!(vars["EMPTY"], "");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let contents = "A=1\nB=2=3\n# c\nA=4\n";
        assert_eq!(parse_env(contents), parse_env(contents));
    }

    #[test]
    fn test_apply_keeps_existing_values() {
        std::env::set_var("ROADCTL_TEST_LOADER_EXISTING", "process");
        let vars = parse_env(
            "ROADCTL_TEST_LOADER_EXISTING=file\nROADCTL_TEST_LOADER_NEW=file\n",
        );

        let applied = apply_to_process_env(&vars);

        assert_eq!(applied, 1);
        assert_eq!(
            std::env::var("ROADCTL_TEST_LOADER_EXISTING").unwrap(),
            "process"
        );
        assert_eq!(std::env::var("ROADCTL_TEST_LOADER_NEW").unwrap(), "file");
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let vars = load_env_file(&File::new(dir.path().join(".env")))
            .await
            .unwrap();
        assert!(vars.is_empty());
    }

    #[tokio::test]
    async fn test_load_returns_full_map_even_when_process_has_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "ROADCTL_TEST_LOADER_SHADOWED=from-file\n").unwrap();
        std::env::set_var("ROADCTL_TEST_LOADER_SHADOWED", "from-process");

        let vars = load_env_file(&File::new(path)).await.unwrap();

        assert_eq!(vars["ROADCTL_TEST_LOADER_SHADOWED"], "from-file");
        assert_eq!(
            std::env::var("ROADCTL_TEST_LOADER_SHADOWED").unwrap(),
            "from-process"
        );
    }
}
