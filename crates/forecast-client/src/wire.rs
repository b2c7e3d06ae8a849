//! 서비스 요청/응답 봉투(envelope).
//!
//! 백테스트 응답은 `{symbol, name, results}`로 감싸져 오며, 에러 응답은
//! `{"detail": ...}` 형식입니다.

use forecast_core::{BacktestResultSet, Configuration, Horizon, TrainingWindow};
use serde::{Deserialize, Serialize};

/// `POST /backtest` 요청 본문.
#[derive(Debug, Serialize)]
pub struct BacktestRequest<'a> {
    pub symbol: &'a str,
    pub period: &'a str,
    pub configs: &'a [Configuration],
}

/// `POST /predict-future` 요청 본문.
#[derive(Debug, Serialize)]
pub struct FuturePredictRequest<'a> {
    pub symbol: &'a str,
    pub period: &'a str,
    pub best_config: &'a Configuration,
    pub prediction_horizon: Horizon,
}

/// `POST /train` 요청 본문.
#[derive(Debug, Serialize)]
pub struct TrainRequest<'a> {
    pub symbol: &'a str,
    pub period: &'a str,
    #[serde(flatten)]
    pub window: &'a TrainingWindow,
}

/// `POST /backtest` 응답.
#[derive(Debug, Deserialize)]
pub struct BacktestResponse {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub results: BacktestResultSet,
}

/// 에러 응답 본문.
///
/// 검증 실패(422) 시 `detail`은 문자열 대신 배열로 옵니다.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub(crate) fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
