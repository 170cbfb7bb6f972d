use std::{fs, io::ErrorKind, path::Path, time::Duration};

use tracing::warn;
use url::Url;

use crate::error::SettingsError;

pub const SETTINGS_FILE: &str = "admin_client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub send_otp_path: String,
    pub verify_otp_path: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://yus.kwscloud.in/yus".into(),
            send_otp_path: "send-otp-admin".into(),
            verify_otp_path: "verify-otp-admin".into(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub send_otp: Url,
    pub verify_otp: Url,
}

impl ClientSettings {
    pub fn endpoints(&self) -> Result<Endpoints, SettingsError> {
        let raw = self.api_base_url.trim();
        let base = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let base = Url::parse(&base).map_err(|source| SettingsError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            source,
        })?;

        let join = |path: &str| {
            base.join(path.trim_start_matches('/'))
                .map_err(|source| SettingsError::InvalidEndpoint {
                    path: path.to_string(),
                    source,
                })
        };

        Ok(Endpoints {
            send_otp: join(&self.send_otp_path)?,
            verify_otp: join(&self.verify_otp_path)?,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Defaults, then `admin_client.toml` in the working directory, then environment.
pub fn load_settings() -> Result<ClientSettings, SettingsError> {
    let raw = match fs::read_to_string(SETTINGS_FILE) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(source) => {
            return Err(SettingsError::Read {
                path: SETTINGS_FILE.to_string(),
                source,
            })
        }
    };
    load_settings_with(raw.as_deref(), |key| std::env::var(key).ok())
}

pub fn load_settings_from(path: &Path) -> Result<ClientSettings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    load_settings_with(Some(&raw), |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        let table: toml::Table = toml::from_str(raw)?;
        if let Some(v) = table.get("api_base_url").and_then(|v| v.as_str()) {
            settings.api_base_url = v.to_string();
        }
        if let Some(v) = table.get("send_otp_path").and_then(|v| v.as_str()) {
            settings.send_otp_path = v.to_string();
        }
        if let Some(v) = table.get("verify_otp_path").and_then(|v| v.as_str()) {
            settings.verify_otp_path = v.to_string();
        }
        if let Some(v) = table.get("request_timeout_secs") {
            match v
                .as_integer()
                .and_then(|secs| u64::try_from(secs).ok())
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
            {
                Some(secs) => settings.request_timeout_secs = Some(secs),
                None => warn!(value = %v, "ignoring invalid request_timeout_secs"),
            }
        }
    }

    if let Some(v) = env("ADMIN_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__SEND_OTP_PATH") {
        settings.send_otp_path = v;
    }
    if let Some(v) = env("APP__VERIFY_OTP_PATH") {
        settings.verify_otp_path = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(secs) => settings.request_timeout_secs = Some(secs),
            Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    settings.endpoints()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
