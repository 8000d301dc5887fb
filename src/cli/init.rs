//! Init command implementation
//!
//! Writes a commented `papyrus.toml` and a `.env.example` listing the
//! environment variables the configuration refers to.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Files were written
    Success,
    /// papyrus.toml already exists and `--force` was not given
    AlreadyExists,
    /// An error occurred while writing
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    let base_path = &config.path;
    if let Err(e) = fs::create_dir_all(base_path) {
        output.error(&format!("Failed to create {}: {}", base_path.display(), e));
        return InitResult::Error(e.to_string());
    }

    let config_path = base_path.join("papyrus.toml");
    if config_path.exists() && !config.force {
        output.warning("papyrus.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = fs::write(&config_path, generate_papyrus_toml()) {
        output.error(&format!("Failed to create papyrus.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "papyrus.toml");

    let env_path = base_path.join(".env.example");
    match write_file(&env_path, generate_env_example(), config.force) {
        Ok(true) => output.created("env", ".env.example"),
        Ok(false) => output.skipped(".env.example", "already exists"),
        Err(e) => output.warning(&format!("Failed to create .env.example: {}", e)),
    }

    output.success("Project initialized");
    output.info("Set your API key, then run a search:");
    output.command("cp .env.example .env");
    output.command("papyrus search \"your research topic\"");

    InitResult::Success
}

/// Write `content` unless the file exists and `force` is off; returns
/// whether the file was written.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

/// The default configuration file, with every setting spelled out.
pub fn generate_papyrus_toml() -> &'static str {
    r#"# Papyrus configuration
#
# Credentials never live in this file: it names the environment variables
# that hold them (a .env file in the working directory is loaded too).

[llm]
# "openai" for any OpenAI-compatible endpoint, or "ollama"
provider = "openai"
api_base = "https://api.openai.com/v1"
# Search agents need a model with web search
model = "gpt-4o-search-preview"
# Several keys spread agent calls across credentials
api_key_envs = ["OPENAI_API_KEY"]
timeout_secs = 120

[sources]
openalex_base = "https://api.openalex.org"
semantic_scholar_base = "https://api.semanticscholar.org/graph/v1"
crossref_base = "https://api.crossref.org"
# Contact address for the OpenAlex/Crossref polite pools (optional)
mailto_env = "PAPYRUS_MAILTO"
semantic_scholar_key_env = "S2_API_KEY"
timeout_secs = 8

[search]
# Delay between agent launches
stagger_ms = 1500
# Total attempts per agent when rate limited; waits 2s, 4s, ... in between
max_attempts = 3
backoff_step_secs = 2

# Uncomment to replace the built-in roster
# [[search.agents]]
# name = "Journal Scout"
# focus = "Only peer-reviewed journal articles."
# preprint_policy = "exclude"          # or "follow_session"

[validation]
# Concurrent resolutions; leave unset for no limit
# max_concurrency = 16
min_abstract_len = 50
# "verified_or_doi" keeps unverified references with a DOI, "verified_only" drops them
quality_filter = "verified_or_doi"
"#
}

fn generate_env_example() -> &'static str {
    r#"# Papyrus environment
OPENAI_API_KEY=
# PAPYRUS_MAILTO=you@example.org
# S2_API_KEY=
# RUST_LOG=papyrus=debug
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::PapyrusConfig;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_parses_and_validates() {
        let config: PapyrusConfig = toml::from_str(generate_papyrus_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.agents.len(), 4);
        assert_eq!(config.sources.timeout_secs, 8);
    }

    #[test]
    fn test_init_writes_files() {
        let dir = TempDir::new().unwrap();
        let result = run(
            InitConfig {
                path: dir.path().to_path_buf(),
                force: false,
            },
            &Output::no_color(),
        );

        assert_eq!(result, InitResult::Success);
        assert!(dir.path().join("papyrus.toml").exists());
        assert!(dir.path().join(".env.example").exists());
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("papyrus.toml");
        fs::write(&config_path, "# mine").unwrap();

        let result = run(
            InitConfig {
                path: dir.path().to_path_buf(),
                force: false,
            },
            &Output::no_color(),
        );
        assert_eq!(result, InitResult::AlreadyExists);
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine");

        let result = run(
            InitConfig {
                path: dir.path().to_path_buf(),
                force: true,
            },
            &Output::no_color(),
        );
        assert_eq!(result, InitResult::Success);
        assert!(fs::read_to_string(&config_path)
            .unwrap()
            .contains("[validation]"));
    }
}
