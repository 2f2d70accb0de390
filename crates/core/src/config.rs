use std::env;

use serde::{Deserialize, Serialize};

use crate::tuning::Thresholds;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).as_deref() {
        Some("true") | Some("1") | Some("yes") => true,
        Some("false") | Some("0") | Some("no") => false,
        _ => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub orchestrator: OrchestratorConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CREASE_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CREASE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            orchestrator: OrchestratorConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  llm:          provider={}, timeout_ms={}",
            self.llm.provider,
            self.llm.timeout_ms
        );
        tracing::info!(
            "  models:       fatigue={}, risk={}, tactical={}",
            self.llm.models.fatigue,
            self.llm.models.risk,
            self.llm.models.tactical
        );
        tracing::info!("  ollama:       url={}", self.ollama.url);
        tracing::info!(
            "  orchestrator: candidate_limit={}, substitute_fallbacks={}",
            self.orchestrator.candidate_limit,
            self.orchestrator.substitute_fallbacks
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "llm": {
                "provider": self.llm.provider,
                "configured": self.llm.is_configured(),
                "models": self.llm.models,
                "azure_endpoint": self.llm.azure_endpoint,
                "timeout_ms": self.llm.timeout_ms,
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
            "orchestrator": self.orchestrator,
        })
    }
}

// ── LLM (OpenAI / Azure OpenAI / Ollama) ──────────────────────

/// Model (or Azure deployment) name per capability domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainModels {
    pub fatigue: String,
    pub risk: String,
    pub tactical: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "rules", "openai", "azure", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub azure_api_key: Option<String>,
    pub azure_endpoint: Option<String>,
    pub azure_api_version: String,
    pub models: DomainModels,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-invocation deadline enforced by the chat-completion runners.
    pub timeout_ms: u64,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        let default_model = profiled_env_or(p, "LLM_MODEL", "gpt-4o-mini");
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "rules"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            azure_api_key: profiled_env_opt(p, "AZURE_OPENAI_API_KEY"),
            azure_endpoint: profiled_env_opt(p, "AZURE_OPENAI_ENDPOINT"),
            azure_api_version: profiled_env_or(p, "AZURE_OPENAI_API_VERSION", "2024-06-01"),
            models: DomainModels {
                fatigue: profiled_env_or(p, "FATIGUE_MODEL", &default_model),
                risk: profiled_env_or(p, "RISK_MODEL", &default_model),
                tactical: profiled_env_or(p, "TACTICAL_MODEL", &default_model),
            },
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.2")
                .parse()
                .unwrap_or(0.2),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 800),
            timeout_ms: profiled_env_u64(p, "LLM_TIMEOUT_MS", 12_000),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "rules" | "ollama" => true,
            "openai" => self.openai_api_key.is_some(),
            "azure" => self.azure_api_key.is_some() && self.azure_endpoint.is_some(),
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
        }
    }
}

// ── Orchestrator ──────────────────────────────────────────────

/// Read-only settings injected into the orchestrator at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Length of each safety candidate list.
    pub candidate_limit: usize,
    /// Replace a failed domain's output with its fallback builder's output.
    pub substitute_fallbacks: bool,
    pub thresholds: Thresholds,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 3,
            substitute_fallbacks: true,
            thresholds: Thresholds::default(),
        }
    }
}

impl OrchestratorConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        let mut thresholds = defaults.thresholds;
        thresholds.router.fatigue_trigger = profiled_env_f64(
            p,
            "CREASE_FATIGUE_TRIGGER",
            thresholds.router.fatigue_trigger,
        );
        thresholds.router.strain_trigger = profiled_env_f64(
            p,
            "CREASE_STRAIN_TRIGGER",
            thresholds.router.strain_trigger,
        );
        thresholds.router.fatigue_gain_per_over = profiled_env_f64(
            p,
            "CREASE_FATIGUE_GAIN_PER_OVER",
            thresholds.router.fatigue_gain_per_over,
        );
        Self {
            candidate_limit: profiled_env_u32(
                p,
                "CREASE_CANDIDATE_LIMIT",
                defaults.candidate_limit as u32,
            ) as usize,
            substitute_fallbacks: profiled_env_bool(
                p,
                "CREASE_SUBSTITUTE_FALLBACKS",
                defaults.substitute_fallbacks,
            ),
            thresholds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Profile names are unique per test so parallel tests never share keys.

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("CFGTESTA_CREASE_FATIGUE_TRIGGER", "7.5");
        let config = Config::for_profile("cfgtesta");
        assert_eq!(config.profile, "CFGTESTA");
        assert_eq!(config.orchestrator.thresholds.router.fatigue_trigger, 7.5);
        env::remove_var("CFGTESTA_CREASE_FATIGUE_TRIGGER");
    }

    #[test]
    fn unparseable_values_fall_back_to_defaults() {
        env::set_var("CFGTESTB_CREASE_CANDIDATE_LIMIT", "lots");
        env::set_var("CFGTESTB_CREASE_SUBSTITUTE_FALLBACKS", "no");
        let config = Config::for_profile("CFGTESTB");
        assert_eq!(config.orchestrator.candidate_limit, 3);
        assert!(!config.orchestrator.substitute_fallbacks);
        env::remove_var("CFGTESTB_CREASE_CANDIDATE_LIMIT");
        env::remove_var("CFGTESTB_CREASE_SUBSTITUTE_FALLBACKS");
    }

    #[test]
    fn provider_configuration_checks() {
        let mut llm = Config::for_profile("CFGTESTC").llm;
        llm.provider = "azure".into();
        llm.azure_api_key = Some("k".into());
        llm.azure_endpoint = None;
        assert!(!llm.is_configured());
        llm.azure_endpoint = Some("https://example.openai.azure.com".into());
        assert!(llm.is_configured());
        llm.provider = "mystery".into();
        assert!(!llm.is_configured());
    }

    #[test]
    fn redacted_summary_has_no_keys() {
        let mut config = Config::for_profile("CFGTESTD");
        config.llm.openai_api_key = Some("sk-secret".into());
        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("sk-secret"));
        assert!(summary.contains("candidate_limit"));
    }
}
