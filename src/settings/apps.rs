use serde::Deserialize;
use std::env;

use super::SettingsError;

/// 로컬 애플리케이션이 사용하는 고정 디렉터리 설정입니다.
#[derive(Clone, Debug, Deserialize)]
pub struct AppSettings {
    /// CA 인증서 디렉터리 (읽기 전용)
    #[serde(default = "default_cert_dir")]
    pub cert_dir: String,

    /// 파일 서버 루트 디렉터리
    #[serde(default = "default_files_root")]
    pub files_root: String,
}

fn default_cert_dir() -> String { "/var/oznet/certs".to_string() }
fn default_files_root() -> String { "/var/oznet/files".to_string() }

impl AppSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            cert_dir: env::var("GATEWAY_CERT_DIR").unwrap_or_else(|_| default_cert_dir()),
            files_root: env::var("GATEWAY_FILES_ROOT").unwrap_or_else(|_| default_files_root()),
        })
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            cert_dir: default_cert_dir(),
            files_root: default_files_root(),
        }
    }
}
