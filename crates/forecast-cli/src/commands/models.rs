//! 모델 학습/예측/성능 조회 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본 구간으로 학습
//! forecast train SPY
//!
//! # 학습/테스트 구간 지정
//! forecast train SPY --train-start 2023-01-01 --train-end 2024-06-30 --test-start 2024-07-01
//!
//! # 앙상블 모델 예측, 모델 성능 비교
//! forecast predictions SPY --model ensemble
//! forecast performance SPY
//! ```

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use forecast_core::{
    ModelId, ModelPerformanceReport, PredictionsReport, TrainingReport, TrainingWindow,
};
use forecast_workflow::PerformanceView;
use tracing::info;

/// `train` 명령 인자.
#[derive(Debug, Clone, Default)]
pub struct TrainArgs {
    pub symbol: String,
    pub period: String,
    pub window: TrainingWindow,
}

/// 학습 구간의 순서를 검증합니다.
///
/// 지정된 날짜끼리만 비교하며, 학습 구간은 테스트 구간보다 앞서야 합니다.
pub fn validate_window(window: &TrainingWindow) -> Result<()> {
    let ordered = [
        ("train_start_date", window.train_start_date),
        ("train_end_date", window.train_end_date),
        ("test_start_date", window.test_start_date),
        ("test_end_date", window.test_end_date),
    ];
    let given: Vec<(&str, NaiveDate)> = ordered
        .iter()
        .filter_map(|(name, date)| date.map(|d| (*name, d)))
        .collect();

    for pair in given.windows(2) {
        let (prev_name, prev) = pair[0];
        let (next_name, next) = pair[1];
        if prev > next {
            bail!("{} ({}) must not be after {} ({})", prev_name, prev, next_name, next);
        }
    }
    Ok(())
}

fn require_symbol(symbol: &str) -> Result<&str> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        bail!("심볼이 비어 있습니다");
    }
    Ok(symbol)
}

/// 모델을 학습합니다. 해당 심볼의 성능 캐시는 무효화됩니다.
pub async fn train_models(view: &PerformanceView, args: &TrainArgs) -> Result<TrainingReport> {
    let symbol = require_symbol(&args.symbol)?;
    validate_window(&args.window)?;

    info!(symbol, period = %args.period, "모델 학습 요청");
    Ok(view.train(symbol, &args.period, &args.window).await?)
}

/// 학습된 모델의 예측을 조회합니다.
pub async fn show_predictions(
    view: &PerformanceView,
    symbol: &str,
    model: &ModelId,
) -> Result<PredictionsReport> {
    let symbol = require_symbol(symbol)?;
    Ok(view.predictions(symbol, model).await?)
}

/// 모델 성능 비교를 조회합니다.
pub async fn show_performance(
    view: &PerformanceView,
    symbol: &str,
) -> Result<Arc<ModelPerformanceReport>> {
    let symbol = require_symbol(symbol)?;
    Ok(view.get(symbol).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> Option<NaiveDate> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_window_partial_dates() {
        let window = TrainingWindow {
            train_start_date: date("2023-01-01"),
            test_start_date: date("2024-07-01"),
            ..Default::default()
        };
        assert!(validate_window(&window).is_ok());
        assert!(validate_window(&TrainingWindow::default()).is_ok());
    }

    #[test]
    fn test_window_out_of_order() {
        let window = TrainingWindow {
            train_end_date: date("2024-08-01"),
            test_start_date: date("2024-07-01"),
            ..Default::default()
        };
        let err = validate_window(&window).unwrap_err();
        assert!(err.to_string().contains("train_end_date"));
    }

    #[test]
    fn test_require_symbol() {
        assert_eq!(require_symbol(" SPY ").unwrap(), "SPY");
        assert!(require_symbol("  ").is_err());
    }
}
