use crate::error::AppError;
use std::env;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

/// Default upper bound for a single generation call, in seconds. The
/// external API enforces no timeout of its own, so a hung call would
/// otherwise block a request's cleanup indefinitely.
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub port: u16,
    pub telegram: TelegramConfig,
    pub gemini: GeminiConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Image model (e.g., imagen-3.0-generate-002)
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub timeout_secs: u64,
}

impl BotConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Ok(BotConfig {
            port: get_env("PORT", Some(&DEFAULT_PORT.to_string()))?
                .parse()
                .unwrap_or(DEFAULT_PORT),
            telegram: TelegramConfig {
                token: get_env("TELEGRAM_TOKEN", None)?,
            },
            gemini: GeminiConfig {
                api_key: get_env("GEMINI_API_KEY", None)?,
                model: get_env("GEMINI_IMAGE_MODEL", Some(DEFAULT_IMAGE_MODEL))?,
            },
            generation: GenerationConfig {
                timeout_secs: get_env(
                    "GENERATION_TIMEOUT_SECS",
                    Some(&DEFAULT_GENERATION_TIMEOUT_SECS.to_string()),
                )?
                .parse()
                .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_env_falls_back_to_default() {
        let value = get_env("IMAGEN_BOT_TEST_UNSET_VAR", Some("fallback")).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn get_env_errors_without_default() {
        let result = get_env("IMAGEN_BOT_TEST_UNSET_VAR", None);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
