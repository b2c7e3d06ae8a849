//! 설정 관리.
//!
//! TOML 파일(선택)과 `FORECAST__` 접두사 환경 변수에서 설정을 읽습니다.
//! 모든 섹션은 기본값을 가지므로 설정 파일 없이도 동작합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 원격 연산 서비스 클라이언트 설정
    #[serde(default)]
    pub client: ClientConfig,
    /// 워크플로 설정
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 원격 연산 서비스 클라이언트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// API 기본 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 요청 타임아웃 (초). 모델 학습은 설정당 수십 초가 걸릴 수 있습니다.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8001/api".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// 워크플로 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// 서비스에 전달할 과거 데이터 기간 (예: "2y")
    #[serde(default = "default_period")]
    pub period: String,
    /// 비교표 상위 N개
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// 이벤트 브로드캐스트 버퍼 크기
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
    /// 미래 예측 기준 설정을 고를 모델
    #[serde(default = "default_seed_model")]
    pub seed_model: String,
}

fn default_period() -> String {
    "2y".to_string()
}
fn default_top_n() -> usize {
    10
}
fn default_event_buffer() -> usize {
    64
}
fn default_seed_model() -> String {
    "ensemble".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            top_n: default_top_n(),
            event_buffer_size: default_event_buffer(),
            seed_model: default_seed_model(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수 예: `FORECAST__CLIENT__BASE_URL=http://10.0.0.5:8001/api`
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("FORECAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// 기본 경로(`config/forecast.toml`)가 있으면 읽고, 없으면 환경 변수만 사용합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path = Path::new("config/forecast.toml");
        if path.exists() {
            Self::load(Some(path))
        } else {
            Self::load(None)
        }
    }
}
