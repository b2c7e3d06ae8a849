//! 백테스트 비교와 미래 예측을 위한 도메인 모델.

mod backtest;
mod future;
mod metrics;
mod performance;

pub use backtest::*;
pub use future::*;
pub use metrics::*;
pub use performance::*;
