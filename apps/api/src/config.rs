use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::ProviderKind;

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or malformed.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmSettings,
    pub generation: GenerationSettings,
    /// Generated item → source items that justify it. Empty means strict containment.
    pub skill_aliases: BTreeMap<String, Vec<String>>,
}

/// Backend selection and credentials.
#[derive(Clone)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub call_timeout: Duration,
}

/// Limits applied to every generation request.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub max_output_tokens: u32,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub total_budget: Duration,
    pub max_concurrent: usize,
    pub profile_char_limit: usize,
    pub job_description_char_limit: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_output_tokens: 8000,
            max_attempts: 3,
            backoff_base: Duration::from_millis(1000),
            total_budget: Duration::from_secs(180),
            max_concurrent: 4,
            profile_char_limit: 25_000,
            job_description_char_limit: 15_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let provider: ProviderKind = optional_env("LLM_PROVIDER")
            .unwrap_or_else(|| "anthropic".to_string())
            .parse()?;
        let api_key = optional_env("LLM_API_KEY");
        if provider.requires_api_key() && api_key.is_none() {
            bail!("Required environment variable 'LLM_API_KEY' is not set for provider '{provider}'");
        }

        let call_timeout = Duration::from_secs(parse_env("LLM_CALL_TIMEOUT_SECS", 60u64)?);
        let total_budget = match optional_env("LLM_TOTAL_BUDGET_SECS") {
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .context("LLM_TOTAL_BUDGET_SECS must be a whole number of seconds")?,
            ),
            None => call_timeout * 3,
        };

        let generation = GenerationSettings {
            max_output_tokens: parse_env("LLM_MAX_OUTPUT_TOKENS", 8000u32)?,
            max_attempts: parse_env("LLM_MAX_ATTEMPTS", 3u32)?.max(1),
            backoff_base: Duration::from_millis(parse_env("LLM_BACKOFF_BASE_MS", 1000u64)?),
            total_budget,
            max_concurrent: parse_env("MAX_CONCURRENT_GENERATIONS", 4usize)?.max(1),
            profile_char_limit: parse_env("PROFILE_CHAR_LIMIT", 25_000usize)?,
            job_description_char_limit: parse_env("JOB_DESCRIPTION_CHAR_LIMIT", 15_000usize)?,
        };

        Ok(Config {
            port: parse_env("PORT", 8080u16)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm: LlmSettings {
                provider,
                api_key,
                api_base: optional_env("LLM_API_BASE"),
                model: optional_env("LLM_MODEL"),
                call_timeout,
            },
            generation,
            skill_aliases: parse_skill_aliases(&optional_env("SKILL_ALIASES").unwrap_or_default())?,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("llm", &self.llm)
            .field("generation", &self.generation)
            .field("skill_aliases", &self.skill_aliases)
            .finish()
    }
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

/// Parses `Excel=spreadsheets|Google Sheets;K8s=Kubernetes`.
pub fn parse_skill_aliases(raw: &str) -> Result<BTreeMap<String, Vec<String>>> {
    let mut aliases = BTreeMap::new();
    for rule in raw.split(';').map(str::trim).filter(|r| !r.is_empty()) {
        let Some((generated, sources)) = rule.split_once('=') else {
            bail!("SKILL_ALIASES rule '{rule}' must look like 'Generated=source1|source2'");
        };
        let generated = generated.trim();
        let sources: Vec<String> = sources
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if generated.is_empty() || sources.is_empty() {
            bail!("SKILL_ALIASES rule '{rule}' needs a generated item and at least one source item");
        }
        aliases
            .entry(generated.to_string())
            .or_insert_with(Vec::new)
            .extend(sources);
    }
    Ok(aliases)
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{v}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skill_aliases() {
        let aliases = parse_skill_aliases("Excel=spreadsheets|Google Sheets; K8s = Kubernetes").unwrap();
        assert_eq!(
            aliases.get("Excel").unwrap(),
            &vec!["spreadsheets".to_string(), "Google Sheets".to_string()]
        );
        assert_eq!(aliases.get("K8s").unwrap(), &vec!["Kubernetes".to_string()]);
    }

    #[test]
    fn test_parse_skill_aliases_empty_is_strict() {
        assert!(parse_skill_aliases("").unwrap().is_empty());
        assert!(parse_skill_aliases(" ; ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_skill_aliases_rejects_malformed_rule() {
        assert!(parse_skill_aliases("Excel").is_err());
        assert!(parse_skill_aliases("Excel=").is_err());
        assert!(parse_skill_aliases("=spreadsheets").is_err());
    }

    #[test]
    fn test_debug_masks_api_key() {
        let settings = LlmSettings {
            provider: ProviderKind::OpenAi,
            api_key: Some("sk-secret".to_string()),
            api_base: None,
            model: None,
            call_timeout: Duration::from_secs(60),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_generation_defaults_match_input_ceilings() {
        let g = GenerationSettings::default();
        assert_eq!(g.profile_char_limit, 25_000);
        assert_eq!(g.job_description_char_limit, 15_000);
        assert_eq!(g.max_attempts, 3);
    }
}
