//! 원격 연산 클라이언트 에러 타입.

use forecast_core::ForecastError;
use thiserror::Error;

/// 원격 연산 서비스 호출 에러.
#[derive(Debug, Error)]
pub enum ClientError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 서비스가 반환한 에러 응답 (`{"detail": ...}`)
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// 응답 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// 설정 목록이 비어 있음 (요청 전 거부)
    #[error("Empty configuration list")]
    EmptySelection,
}

/// 클라이언트 작업을 위한 Result 타입.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// 재시도 가능한 에러인지 확인.
    ///
    /// 서버 측 5xx 응답은 학습 실패일 수 있으므로 재시도 대상에 포함합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout(_) => true,
            ClientError::Api { status, .. } => *status >= 500,
            ClientError::Parse(_) | ClientError::EmptySelection => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<ClientError> for ForecastError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::EmptySelection => ForecastError::EmptySelection,
            ClientError::Parse(msg) => ForecastError::DataShape(msg),
            other => ForecastError::Computation(other.to_string()),
        }
    }
}
