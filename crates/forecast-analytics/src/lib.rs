//! 백테스트 결과 집계와 차트 시리즈 병합.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - [`ranking`]: RMSE 순위, 모델별 최적 설정, 전체 최적 선택
//! - [`merge`]: 과거 꼬리 구간 + 미래 예측 병합, 백테스트 미리보기 시리즈
//! - [`shape`]: 응답 날짜 축/길이 계약 검증

pub mod merge;
pub mod ranking;
pub mod shape;

pub use merge::{merge_backtest_sample, merge_historical_and_future, ChartPoint, ModelPoint, PointKind};
pub use ranking::{
    best_per_model, comparison_rows, overall_best, rank_by_rmse, RankedEntry, Ranking,
};
pub use shape::{validate_backtest, validate_future};
