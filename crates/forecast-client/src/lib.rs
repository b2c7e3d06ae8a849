//! 원격 연산 서비스 클라이언트.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `ComputationClient` trait: 백테스트/미래 예측/학습/성능 조회 호출 계약
//! - `HttpComputationClient`: reqwest 기반 JSON 구현
//! - 요청/응답 봉투와 `ClientError`

pub mod error;
pub mod http;
pub mod traits;
pub mod wire;

pub use error::*;
pub use http::HttpComputationClient;
pub use traits::*;
