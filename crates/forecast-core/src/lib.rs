//! # Forecast Core
//!
//! 백테스트 비교 및 미래 예측 워크플로의 핵심 도메인 모델과 타입을 제공합니다.
//!
//! 이 크레이트는 워크플로 전반에서 사용되는 기본 타입을 제공합니다:
//! - 백테스트 설정(`Configuration`)과 예측 기간(`Horizon`)
//! - 백테스트 결과 및 정확도 지표
//! - 미래 예측 및 과거 꼬리 구간
//! - 모델 성능/학습 응답
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
