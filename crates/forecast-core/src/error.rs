//! 워크플로 에러 타입.
//!
//! 이 모듈은 설정 선택, 원격 연산, 결과 집계/병합 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 워크플로 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// 설정이 하나도 선택되지 않은 상태에서 백테스트 제출
    #[error("선택된 설정이 없습니다: 최소 하나 이상의 설정을 선택하세요")]
    EmptySelection,

    /// 원격 학습/예측 호출 실패 또는 타임아웃
    #[error("연산 에러: {0}")]
    Computation(String),

    /// 응답이 날짜 축/길이 계약을 위반
    #[error("데이터 형태 에러: {0}")]
    DataShape(String),

    /// 현재 단계에서 허용되지 않는 동작
    #[error("잘못된 전이: {action} (현재 단계: {stage})")]
    InvalidTransition { stage: String, action: String },

    /// 같은 종류의 연산이 이미 진행 중
    #[error("이미 진행 중인 연산: {0}")]
    Busy(String),

    /// 미래 예측의 기준 설정을 찾을 수 없음
    #[error("기준 설정 없음: {0} 모델의 최적 설정이 없습니다")]
    MissingSeed(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 워크플로 작업을 위한 Result 타입.
pub type ForecastResult<T> = Result<T, ForecastError>;

impl ForecastError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ForecastError::Computation(_))
    }

    /// 외부 서비스의 계약 위반인지 확인합니다.
    pub fn is_contract_breach(&self) -> bool {
        matches!(
            self,
            ForecastError::DataShape(_) | ForecastError::Serialization(_)
        )
    }

    /// 사용자가 입력을 고쳐 해결할 수 있는 에러인지 확인합니다.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ForecastError::EmptySelection | ForecastError::InvalidInput(_)
        )
    }

    /// 데이터 형태 에러 생성 헬퍼.
    pub fn data_shape(msg: impl Into<String>) -> Self {
        ForecastError::DataShape(msg.into())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ForecastError {
    fn from(err: config::ConfigError) -> Self {
        ForecastError::Config(err.to_string())
    }
}
