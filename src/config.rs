// Run configuration: the API token comes from the environment (or a local
// `.env`) when set, everything else is asked interactively.

use anyhow::Result;
use dialoguer::{Confirm, Input, Password};
use log::debug;
use std::path::PathBuf;

pub const TOKEN_ENV: &str = "WORKATO_API_TOKEN";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_token: String,
    pub structure_path: PathBuf,
    pub dry_run: bool,
}

impl RunConfig {
    /// Gather the configuration, prompting for whatever the environment
    /// does not provide.
    pub fn prompt() -> Result<Self> {
        let api_token = match token_from(std::env::var(TOKEN_ENV).ok()) {
            Some(token) => {
                debug!("using API token from {}", TOKEN_ENV);
                token
            }
            None => {
                // `Password` hides the token as it is typed.
                let token: String = Password::new().with_prompt("Enter your Workato API token").interact()?;
                token.trim().to_string()
            }
        };

        let path: String = Input::new()
            .with_prompt("Enter the path to your folder structure JSON file")
            .interact_text()?;
        let dry_run = Confirm::new()
            .with_prompt("Dry run mode?")
            .default(false)
            .interact()?;

        Ok(RunConfig {
            api_token,
            structure_path: expand_home(path.trim()),
            dry_run,
        })
    }
}

/// A usable token from the environment: trimmed and non-empty.
fn token_from(value: Option<String>) -> Option<String> {
    value
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_token_is_trimmed_and_blank_ignored() {
        assert_eq!(token_from(Some("  abc123\n".into())), Some("abc123".into()));
        assert_eq!(token_from(Some("   ".into())), None);
        assert_eq!(token_from(None), None);
    }

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_home("structure.json"), PathBuf::from("structure.json"));
        assert_eq!(expand_home("/tmp/s.json"), PathBuf::from("/tmp/s.json"));
        assert_eq!(expand_home("~other/s.json"), PathBuf::from("~other/s.json"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/projects/s.json"), home.join("projects/s.json"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
