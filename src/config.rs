//! Runtime configuration loading for the trivia engine.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    error::ConfigError,
    matcher::AnswerMatcher,
    question::normalizer::DEFAULT_BLACKLIST,
    sources::ProviderKind,
    state::session::{Consolation, SessionSettings},
};

/// Default location on disk where the engine looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/trivia.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// A provider enabled in configuration with its selection weight.
pub struct ProviderConfig {
    /// Provider family.
    pub kind: ProviderKind,
    /// Relative weight in the random choice.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the engine.
pub struct TriviaConfig {
    /// Hints shown before the forced reveal.
    pub hint_count: u8,
    /// Delay between two steps of a question.
    pub step_delay: Duration,
    /// Bounty used when `start` carries no valid override.
    pub default_point_bounty: u32,
    /// Recency memory capacity.
    pub q_memory: usize,
    /// Streak length earning a note.
    pub min_streak: u32,
    /// Streak length earning the egregious note.
    pub egregious_streak: u32,
    /// Similarity ratio accepted for long answers.
    pub similarity_threshold: f64,
    /// Answers up to this length must match exactly.
    pub exact_match_max_len: usize,
    /// Delay between a resolution and the next question.
    pub question_cooldown: Duration,
    /// Candidates tried per acquisition before giving up until the next tick.
    pub max_fetch_attempts: u32,
    /// Upper bound on one whole acquisition.
    pub fetch_timeout: Duration,
    /// Credit handed out when nobody answers.
    pub consolation: Option<Consolation>,
    /// Phrases vetoing a question or answer.
    pub blacklist: Vec<String>,
    /// Enabled providers.
    pub providers: Vec<ProviderConfig>,
    /// Local question bank used by the `bank` provider.
    pub bank_path: Option<PathBuf>,
    /// Period of the fast lifecycle tick.
    pub tick_interval: Duration,
    /// Period of the liveness supervisor.
    pub supervisor_interval: Duration,
    /// Whether the supervisor may start and stop sessions on its own.
    pub auto_start: bool,
}

impl TriviaConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        providers = config.providers.len(),
                        "loaded trivia config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document. Out-of-range values are clamped and logged rather than
    /// rejected.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        if let Err(errors) = raw.validate() {
            warn!(error = %errors, "config values out of range; clamping");
        }
        Ok(raw.into())
    }

    /// Lifecycle settings derived from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            hint_count: self.hint_count,
            step_delay: self.step_delay,
            question_cooldown: self.question_cooldown,
            q_memory: self.q_memory,
            min_streak: self.min_streak,
            egregious_streak: self.egregious_streak,
            matcher: AnswerMatcher::new(self.similarity_threshold, self.exact_match_max_len),
            consolation: self.consolation.clone(),
        }
    }
}

impl Default for TriviaConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[validate(range(min = 0, max = 4))]
    hint_count: i64,
    #[validate(range(min = 5, max = 45))]
    step_delay_secs: i64,
    #[validate(range(min = 0, max = 1000))]
    default_point_bounty: i64,
    #[validate(range(min = 1))]
    q_memory: i64,
    #[validate(range(min = 1))]
    min_streak: i64,
    egregious_streak: i64,
    #[validate(range(min = 0.0, max = 1.0))]
    similarity_threshold: f64,
    #[validate(range(min = 0))]
    exact_match_max_len: i64,
    #[validate(range(min = 0))]
    question_cooldown_secs: i64,
    #[validate(range(min = 1))]
    max_fetch_attempts: i64,
    #[validate(range(min = 1))]
    fetch_timeout_secs: i64,
    consolation_account: Option<String>,
    #[validate(range(min = 0))]
    consolation_amount: i64,
    blacklist: Option<Vec<String>>,
    providers: Option<Vec<ProviderConfig>>,
    bank_path: Option<PathBuf>,
    #[validate(range(min = 100))]
    tick_interval_ms: i64,
    #[validate(range(min = 1))]
    supervisor_interval_secs: i64,
    auto_start: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            hint_count: 2,
            step_delay_secs: 10,
            default_point_bounty: 0,
            q_memory: 200,
            min_streak: 3,
            egregious_streak: 12,
            similarity_threshold: 0.86,
            exact_match_max_len: 5,
            question_cooldown_secs: 12,
            max_fetch_attempts: 5,
            fetch_timeout_secs: 5,
            consolation_account: None,
            consolation_amount: 1,
            blacklist: None,
            providers: None,
            bank_path: None,
            tick_interval_ms: 1000,
            supervisor_interval_secs: 10,
            auto_start: true,
        }
    }
}

impl From<RawConfig> for TriviaConfig {
    fn from(raw: RawConfig) -> Self {
        let min_streak = clamp_u32(raw.min_streak, 1, u32::MAX);
        let consolation = raw
            .consolation_account
            .map(|account| account.trim().to_owned())
            .filter(|account| !account.is_empty())
            .map(|account| Consolation {
                account,
                amount: clamp_u32(raw.consolation_amount, 0, u32::MAX),
            });

        Self {
            hint_count: clamp_u32(raw.hint_count, 0, 4) as u8,
            step_delay: Duration::from_secs(clamp_u32(raw.step_delay_secs, 5, 45).into()),
            default_point_bounty: clamp_u32(raw.default_point_bounty, 0, 1000),
            q_memory: clamp_u32(raw.q_memory, 1, u32::MAX) as usize,
            min_streak,
            egregious_streak: clamp_u32(raw.egregious_streak, min_streak, u32::MAX),
            similarity_threshold: if raw.similarity_threshold.is_nan() {
                crate::matcher::DEFAULT_SIMILARITY_THRESHOLD
            } else {
                raw.similarity_threshold.clamp(0.0, 1.0)
            },
            exact_match_max_len: clamp_u32(raw.exact_match_max_len, 0, u32::MAX) as usize,
            question_cooldown: Duration::from_secs(
                clamp_u32(raw.question_cooldown_secs, 0, u32::MAX).into(),
            ),
            max_fetch_attempts: clamp_u32(raw.max_fetch_attempts, 1, u32::MAX),
            fetch_timeout: Duration::from_secs(
                clamp_u32(raw.fetch_timeout_secs, 1, u32::MAX).into(),
            ),
            consolation,
            blacklist: raw
                .blacklist
                .unwrap_or_else(|| DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()),
            providers: raw.providers.unwrap_or_else(default_providers),
            bank_path: raw.bank_path,
            tick_interval: Duration::from_millis(
                clamp_u32(raw.tick_interval_ms, 100, u32::MAX).into(),
            ),
            supervisor_interval: Duration::from_secs(
                clamp_u32(raw.supervisor_interval_secs, 1, u32::MAX).into(),
            ),
            auto_start: raw.auto_start,
        }
    }
}

fn clamp_u32(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(i64::from(min), i64::from(max)) as u32
}

fn default_weight() -> u32 {
    1
}

/// Roughly three OpenTDB questions for every eight Gazatu ones.
fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            kind: ProviderKind::Opentdb,
            weight: 3,
        },
        ProviderConfig {
            kind: ProviderKind::Gazatu,
            weight: 8,
        },
    ]
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TriviaConfig::default();
        assert_eq!(config.hint_count, 2);
        assert_eq!(config.step_delay, Duration::from_secs(10));
        assert_eq!(config.default_point_bounty, 0);
        assert_eq!(config.q_memory, 200);
        assert_eq!(config.min_streak, 3);
        assert_eq!(config.similarity_threshold, 0.86);
        assert_eq!(config.exact_match_max_len, 5);
        assert!(config.consolation.is_none());
        assert_eq!(config.providers, default_providers());
        assert_eq!(config.blacklist.len(), DEFAULT_BLACKLIST.len());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = TriviaConfig::from_json(
            r#"{"hint_count": 3, "consolation_account": "datguy1",
                "providers": [{"kind": "bank"}], "bank_path": "q.json"}"#,
        )
        .unwrap();
        assert_eq!(config.hint_count, 3);
        assert_eq!(config.step_delay, Duration::from_secs(10));
        assert_eq!(
            config.consolation,
            Some(Consolation {
                account: "datguy1".into(),
                amount: 1
            })
        );
        assert_eq!(
            config.providers,
            vec![ProviderConfig {
                kind: ProviderKind::Bank,
                weight: 1
            }]
        );
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = TriviaConfig::from_json(
            r#"{"hint_count": 9, "step_delay_secs": 1, "default_point_bounty": -5,
                "similarity_threshold": 3.0, "min_streak": 5, "egregious_streak": 2}"#,
        )
        .unwrap();
        assert_eq!(config.hint_count, 4);
        assert_eq!(config.step_delay, Duration::from_secs(5));
        assert_eq!(config.default_point_bounty, 0);
        assert_eq!(config.similarity_threshold, 1.0);
        assert_eq!(config.egregious_streak, 5);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(TriviaConfig::from_json("{not json").is_err());
        assert!(TriviaConfig::from_json(r#"{"providers": [{"kind": "nope"}]}"#).is_err());
    }

    #[test]
    fn session_settings_follow_config() {
        let config = TriviaConfig::from_json(r#"{"step_delay_secs": 20}"#).unwrap();
        let settings = config.session_settings();
        assert_eq!(settings.step_delay, Duration::from_secs(20));
        assert_eq!(settings.hint_count, 2);
    }
}
