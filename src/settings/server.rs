use serde::Deserialize;
use std::env;

use super::SettingsError;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerSettings {
    /// HTTP 포트 (기본값: 3000)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// 외부에서 관측되는 공개 스킴. X-Forwarded-Proto와 리다이렉트
    /// 재작성이 모두 이 값을 사용합니다.
    #[serde(default = "default_public_scheme")]
    pub public_scheme: String,

    /// 내부 네트워크 도메인 (예: "oznet")
    #[serde(default = "default_domain")]
    pub domain: String,
}

fn default_http_port() -> u16 { 3000 }
fn default_public_scheme() -> String { "https".to_string() }
fn default_domain() -> String { "oznet".to_string() }

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(
    name: &str,
    default: F,
) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

impl ServerSettings {
    fn parse_port(name: &str, value: &str) -> Result<u16, SettingsError> {
        let port = value.parse::<u16>().map_err(|_| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: value.to_string(),
            reason: "포트는 0-65535 범위여야 합니다".to_string(),
        })?;

        Ok(port)
    }

    pub fn from_env() -> Result<Self, SettingsError> {
        // GATEWAY_HTTP_PORT가 우선하며, 없으면 관례적인 PORT를 따릅니다.
        let port_value = env::var("GATEWAY_HTTP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| default_http_port().to_string());
        let http_port = Self::parse_port("GATEWAY_HTTP_PORT", &port_value)?;

        let settings = Self {
            http_port,
            public_scheme: parse_env_var("GATEWAY_PUBLIC_SCHEME", default_public_scheme)?,
            domain: parse_env_var("GATEWAY_DOMAIN", default_domain)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.public_scheme != "http" && self.public_scheme != "https" {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "GATEWAY_PUBLIC_SCHEME".to_string(),
                value: self.public_scheme.clone(),
                reason: "http 또는 https만 허용됩니다".to_string(),
            });
        }

        if self.domain.is_empty() {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "GATEWAY_DOMAIN".to_string(),
                value: self.domain.clone(),
                reason: "도메인은 비어 있을 수 없습니다".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            public_scheme: default_public_scheme(),
            domain: default_domain(),
        }
    }
}
