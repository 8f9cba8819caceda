//! Typed configuration loaded once from the environment at startup
//! (component P). Every problem is collected and reported together rather
//! than failing on the first missing variable.

use std::time::Duration;

use crate::infrastructure::url::Url;
use crate::shared::duration::parse_duration;
use crate::shared::error::ConfigError;

const DEFAULT_ANIDB_ERROR_BACKOFF: Duration = Duration::from_secs(30 * 60);
const DEFAULT_TMDB_ERROR_BACKOFF: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    pub anidb_titles_url: Url,
    pub anidb_titles_cache_url: Url,
    pub anidb_titles_cache_time: Duration,
    pub anidb_api_url: Url,
    pub anidb_api_cache_url: Url,
    pub anidb_api_cache_time: Duration,
    pub anidb_image_url: Url,
    pub anidb_image_cache_url: Url,
    pub anidb_image_cache_time: Duration,
    pub tmdb_api_cache_url: Url,
    pub tmdb_api_cache_time: Duration,
    pub tmdb_image_cache_url: Url,
    pub tmdb_image_cache_time: Duration,
    pub tmdb_api_key: String,
    pub anime_mapping_url: Url,
}

struct Loader {
    problems: Vec<String>,
}

impl Loader {
    fn new() -> Self {
        Loader { problems: Vec::new() }
    }

    fn required_url(&mut self, name: &str) -> Url {
        match std::env::var(name) {
            Ok(value) => match Url::parse(&value) {
                Ok(url) => return url,
                Err(e) => self.problems.push(format!("{name}: {e}")),
            },
            Err(_) => self.problems.push(format!("{name}: not set")),
        }
        Url::parse("null://").expect("null:// always parses")
    }

    fn cache_url(&mut self, name: &str) -> Url {
        match std::env::var(name) {
            Ok(value) => match Url::parse(&value) {
                Ok(url) => url,
                Err(e) => {
                    self.problems.push(format!("{name}: {e}"));
                    Url::parse("null://").expect("null:// always parses")
                }
            },
            Err(_) => Url::parse("null://").expect("null:// always parses"),
        }
    }

    fn cache_time(&mut self, name: &str, default: Duration) -> Duration {
        match std::env::var(name) {
            Ok(value) => match parse_duration(&value) {
                Some(d) => d,
                None => {
                    self.problems.push(format!("{name}: invalid duration '{value}'"));
                    default
                }
            },
            Err(_) => default,
        }
    }

    fn required_string(&mut self, name: &str) -> String {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => value,
            Ok(_) => {
                self.problems.push(format!("{name}: must not be empty"));
                String::new()
            }
            Err(_) => {
                self.problems.push(format!("{name}: not set"));
                String::new()
            }
        }
    }
}

impl Config {
    /// Loads every variable named in §6, collecting all problems before
    /// failing so a misconfigured deployment sees the full list at once.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut loader = Loader::new();

        let config = Config {
            anidb_titles_url: loader.required_url("ANIDB_TITLES_URL"),
            anidb_titles_cache_url: loader.cache_url("ANIDB_TITLES_CACHE_URL"),
            anidb_titles_cache_time: loader.cache_time("ANIDB_TITLES_CACHE_TIME", DEFAULT_ANIDB_ERROR_BACKOFF),
            anidb_api_url: loader.required_url("ANIDB_API_URL"),
            anidb_api_cache_url: loader.cache_url("ANIDB_API_CACHE_URL"),
            anidb_api_cache_time: loader.cache_time("ANIDB_API_CACHE_TIME", DEFAULT_ANIDB_ERROR_BACKOFF),
            anidb_image_url: loader.required_url("ANIDB_IMAGE_URL"),
            anidb_image_cache_url: loader.cache_url("ANIDB_IMAGE_CACHE_URL"),
            anidb_image_cache_time: loader.cache_time("ANIDB_IMAGE_CACHE_TIME", DEFAULT_ANIDB_ERROR_BACKOFF),
            tmdb_api_cache_url: loader.cache_url("TMDB_API_CACHE_URL"),
            tmdb_api_cache_time: loader.cache_time("TMDB_API_CACHE_TIME", DEFAULT_TMDB_ERROR_BACKOFF),
            tmdb_image_cache_url: loader.cache_url("TMDB_IMAGE_CACHE_URL"),
            tmdb_image_cache_time: loader.cache_time("TMDB_IMAGE_CACHE_TIME", DEFAULT_TMDB_ERROR_BACKOFF),
            tmdb_api_key: loader.required_string("TMDB_API_KEY"),
            anime_mapping_url: loader.cache_url("ANIME_MAPPING_URL"),
        };

        if loader.problems.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(loader.problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all() {
        for name in [
            "ANIDB_TITLES_URL",
            "ANIDB_TITLES_CACHE_URL",
            "ANIDB_TITLES_CACHE_TIME",
            "ANIDB_API_URL",
            "ANIDB_API_CACHE_URL",
            "ANIDB_API_CACHE_TIME",
            "ANIDB_IMAGE_URL",
            "ANIDB_IMAGE_CACHE_URL",
            "ANIDB_IMAGE_CACHE_TIME",
            "TMDB_API_CACHE_URL",
            "TMDB_API_CACHE_TIME",
            "TMDB_IMAGE_CACHE_URL",
            "TMDB_IMAGE_CACHE_TIME",
            "TMDB_API_KEY",
            "ANIME_MAPPING_URL",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn missing_required_variables_are_all_reported_together() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();

        let err = Config::from_env().unwrap_err();
        let ConfigError::Invalid(problems) = err;
        assert!(problems.iter().any(|p| p.starts_with("ANIDB_TITLES_URL")));
        assert!(problems.iter().any(|p| p.starts_with("ANIDB_API_URL")));
        assert!(problems.iter().any(|p| p.starts_with("ANIDB_IMAGE_URL")));
        assert!(problems.iter().any(|p| p.starts_with("TMDB_API_KEY")));
    }

    #[test]
    fn unset_cache_variables_default_to_null_store_and_design_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        std::env::set_var("ANIDB_TITLES_URL", "https://anidb.example/titles.xml.gz");
        std::env::set_var("ANIDB_API_URL", "https://anidb.example/httpapi");
        std::env::set_var("ANIDB_IMAGE_URL", "https://images.anidb.example");
        std::env::set_var("TMDB_API_KEY", "a-key");

        let config = Config::from_env().unwrap();
        assert_eq!(config.anidb_titles_cache_url.scheme(), "null");
        assert_eq!(config.anidb_api_cache_time, DEFAULT_ANIDB_ERROR_BACKOFF);
        assert_eq!(config.tmdb_api_cache_time, DEFAULT_TMDB_ERROR_BACKOFF);

        clear_all();
    }

    #[test]
    fn invalid_duration_is_reported_and_does_not_panic() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        std::env::set_var("ANIDB_TITLES_URL", "https://anidb.example/titles.xml.gz");
        std::env::set_var("ANIDB_API_URL", "https://anidb.example/httpapi");
        std::env::set_var("ANIDB_IMAGE_URL", "https://images.anidb.example");
        std::env::set_var("TMDB_API_KEY", "a-key");
        std::env::set_var("ANIDB_API_CACHE_TIME", "not-a-duration");

        let err = Config::from_env().unwrap_err();
        let ConfigError::Invalid(problems) = err;
        assert!(problems.iter().any(|p| p.starts_with("ANIDB_API_CACHE_TIME")));

        clear_all();
    }
}
