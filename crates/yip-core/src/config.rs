use std::{env, fs, io, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    /// Shared secret expected by `/login`.
    pub telegram_password: String,

    // Router bridge
    pub router_url: String,
    pub router_api_key: Option<String>,
    pub router_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env, map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = required(&lookup, "TELEGRAM_BOT_TOKEN")?;
        let telegram_password = required(&lookup, "TELEGRAM_PASSWORD")?;
        let router_url = required(&lookup, "ROUTER_URL")?
            .trim_end_matches('/')
            .to_string();

        let router_api_key = lookup("ROUTER_API_KEY").and_then(non_empty);
        let router_timeout = Duration::from_millis(
            lookup("ROUTER_TIMEOUT_MS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(10_000),
        );

        Ok(Self {
            telegram_bot_token,
            telegram_password,
            router_url,
            router_api_key,
            router_timeout,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

/// Export `path`'s variables unless already set. A missing file is fine;
/// any other read error is returned.
fn load_dotenv_if_present(path: &Path) -> Result<()> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
    Ok(())
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn loads_required_and_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "tok"),
            ("TELEGRAM_PASSWORD", "hunter2"),
            ("ROUTER_URL", "http://192.168.0.1:8080/"),
        ]))
        .unwrap();

        assert_eq!(cfg.telegram_password, "hunter2");
        assert_eq!(cfg.router_url, "http://192.168.0.1:8080");
        assert_eq!(cfg.router_api_key, None);
        assert_eq!(cfg.router_timeout, Duration::from_secs(10));
    }

    #[test]
    fn empty_password_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "tok"),
            ("TELEGRAM_PASSWORD", "  "),
            ("ROUTER_URL", "http://router"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_PASSWORD"));
    }

    #[test]
    fn missing_dotenv_is_skipped_but_unreadable_one_fails() {
        let missing = env::temp_dir().join("yip-no-such-dir").join(".env");
        assert!(load_dotenv_if_present(&missing).is_ok());

        // A directory exists but cannot be read as a file.
        let err = load_dotenv_if_present(&env::temp_dir()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn dotenv_strips_quotes_and_comments() {
        let parsed = parse_dotenv("# comment\nA=1\nB=\"two words\"\n\nC='x'\nbogus\n");
        assert_eq!(
            parsed,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "two words".to_string()),
                ("C".to_string(), "x".to_string()),
            ]
        );
    }
}
