use serde::Deserialize;
use std::env;

use super::{server::parse_env_var, SettingsError};

/// 프록시되는 서브도메인 하나에 대응하는 업스트림 대상 설정입니다.
#[derive(Clone, Debug, Deserialize)]
pub struct UpstreamSettings {
    pub subdomain: String,

    #[serde(default = "default_upstream_scheme")]
    pub scheme: String,

    pub host: String,
    pub port: u16,
}

fn default_upstream_scheme() -> String { "http".to_string() }
fn default_upstream_subdomain() -> String { "3dprint".to_string() }
fn default_upstream_host() -> String { "127.0.0.1".to_string() }
fn default_upstream_port() -> u16 { 5000 }

impl UpstreamSettings {
    /// 환경 변수로 단일 기본 업스트림(OctoPrint)을 구성합니다.
    pub fn from_env() -> Result<Vec<Self>, SettingsError> {
        let upstream = Self {
            subdomain: parse_env_var("GATEWAY_UPSTREAM_SUBDOMAIN", default_upstream_subdomain)?,
            scheme: default_upstream_scheme(),
            host: parse_env_var("GATEWAY_UPSTREAM_HOST", default_upstream_host)?,
            port: parse_env_var("GATEWAY_UPSTREAM_PORT", default_upstream_port)?,
        };

        Ok(vec![upstream])
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.subdomain.is_empty() || self.subdomain.contains('.') {
            return Err(SettingsError::InvalidConfig(format!(
                "업스트림 서브도메인이 유효하지 않습니다: {:?}",
                self.subdomain
            )));
        }

        // 업스트림 연결은 평문 HTTP만 지원합니다
        if self.scheme != "http" {
            return Err(SettingsError::InvalidConfig(format!(
                "업스트림 스킴은 http만 지원됩니다: {}",
                self.scheme
            )));
        }

        if self.host.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "업스트림 호스트는 비어 있을 수 없습니다".to_string(),
            ));
        }

        Ok(())
    }
}

pub fn default_upstreams() -> Vec<UpstreamSettings> {
    vec![UpstreamSettings {
        subdomain: default_upstream_subdomain(),
        scheme: default_upstream_scheme(),
        host: default_upstream_host(),
        port: default_upstream_port(),
    }]
}
