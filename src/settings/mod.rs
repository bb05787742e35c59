//! 게이트웨이 설정 모듈입니다.
//!
//! 설정은 TOML 파일(`GATEWAY_CONFIG_FILE`) 또는 환경 변수에서
//! 로드되며, 로드 시점에 즉시 검증됩니다. 검증 실패는 기동 에러로
//! 이어지며 부분적으로 구성된 상태로 실행되지 않습니다.

use std::{env, path::Path};

use serde::Deserialize;

mod apps;
mod error;
pub mod logging;
mod server;
mod upstream;

pub use apps::AppSettings;
pub use error::SettingsError;
pub use logging::LogSettings;
pub use server::{parse_env_var, ServerSettings};
pub use upstream::UpstreamSettings;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    /// 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 로컬 애플리케이션 설정
    #[serde(default)]
    pub apps: AppSettings,

    /// 프록시되는 서브도메인별 업스트림 대상
    #[serde(default = "upstream::default_upstreams")]
    pub upstreams: Vec<UpstreamSettings>,
}

impl Settings {
    pub async fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("GATEWAY_CONFIG_FILE") {
            Self::from_toml_file(&config_path).await
        } else {
            Self::from_env()
        }
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SettingsError::FileError {
                path: path.as_ref().to_string_lossy().to_string(),
                error: e,
            })?;

        let settings: Self =
            toml::from_str(&content).map_err(|e| SettingsError::ParseError { source: e })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            apps: AppSettings::from_env()?,
            upstreams: UpstreamSettings::from_env()?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;

        for upstream in &self.upstreams {
            upstream.validate()?;
        }

        // 동일 서브도메인에 업스트림이 둘 이상이면 에러
        for (i, a) in self.upstreams.iter().enumerate() {
            if self.upstreams[i + 1..].iter().any(|b| b.subdomain == a.subdomain) {
                return Err(SettingsError::InvalidConfig(format!(
                    "서브도메인 {}에 업스트림이 중복 정의되었습니다",
                    a.subdomain
                )));
            }
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            logging: LogSettings::default(),
            apps: AppSettings::default(),
            upstreams: upstream::default_upstreams(),
        }
    }
}
