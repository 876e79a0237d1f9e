//! Credential and endpoint resolution shared by provider clients.

use anyhow::{Context, Result};

/// Resolves an API key with precedence: config > env.
///
/// # Errors
/// Returns an error if neither source provides a non-empty key.
pub fn resolve_api_key(config_api_key: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = config_api_key {
        let trimmed = key.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let key = std::env::var(env_var).context(format!(
        "No API key available. Set {env_var} or api_key in [identity]."
    ))?;
    let trimmed = key.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{env_var} is set but empty");
    }
    Ok(trimmed.to_string())
}

/// Resolves a base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if the chosen URL is malformed.
pub fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    Ok(default_url.to_string())
}

fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid identity provider base URL: {url}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_key_wins() {
        let key = resolve_api_key(Some("  from-config "), "FITSESSION_TEST_UNSET_KEY").unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn test_config_key_beats_env_key() {
        const VAR: &str = "FITSESSION_TEST_KEY_BOTH_SOURCES";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(VAR, "from-env") };

        assert_eq!(resolve_api_key(Some("from-config"), VAR).unwrap(), "from-config");
        assert_eq!(resolve_api_key(Some("  "), VAR).unwrap(), "from-env");
        assert_eq!(resolve_api_key(None, VAR).unwrap(), "from-env");
    }

    #[test]
    fn test_env_base_url_beats_config() {
        const VAR: &str = "FITSESSION_TEST_URL_BOTH_SOURCES";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(VAR, "http://127.0.0.1:9099/v1/") };

        let url = resolve_base_url(Some("http://localhost:1/v1"), VAR, "https://default").unwrap();
        assert_eq!(url, "http://127.0.0.1:9099/v1");
    }

    #[test]
    fn test_missing_key_is_error() {
        let err = resolve_api_key(None, "FITSESSION_TEST_UNSET_KEY").unwrap_err();
        assert!(err.to_string().contains("FITSESSION_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_base_url_falls_back_to_default() {
        let url = resolve_base_url(None, "FITSESSION_TEST_UNSET_URL", "https://default").unwrap();
        assert_eq!(url, "https://default");

        let url =
            resolve_base_url(Some("   "), "FITSESSION_TEST_UNSET_URL", "https://default").unwrap();
        assert_eq!(url, "https://default");
    }

    #[test]
    fn test_base_url_from_config_is_validated() {
        let url = resolve_base_url(
            Some("http://localhost:9099/v1/"),
            "FITSESSION_TEST_UNSET_URL",
            "https://default",
        )
        .unwrap();
        assert_eq!(url, "http://localhost:9099/v1");

        assert!(resolve_base_url(Some("not a url"), "FITSESSION_TEST_UNSET_URL", "x").is_err());
    }
}
