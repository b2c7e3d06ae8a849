//! forecast CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 설정 선택 → 백테스트 → 미래 예측 워크플로 실행
//! - 모델 학습/예측/성능 조회
//! - 터미널 표 출력

pub mod commands;
pub mod output;

pub use commands::*;
