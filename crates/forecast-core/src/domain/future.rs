//! 미래 예측 결과 모델.

use super::backtest::check_optional_band;
use crate::error::{ForecastError, ForecastResult};
use crate::types::{Horizon, ModelId, ModelMap};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 과거 종가 레코드 (미래 예측 직전 구간).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl HistoricalRecord {
    /// 종가만 가진 레코드 생성.
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// 한 모델의 미래 예측 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureSeries {
    /// 미래 날짜 축
    pub dates: Vec<NaiveDate>,
    /// 예측값
    pub predictions: Vec<f64>,
    /// 신뢰 구간 하한 (없으면 빈 배열)
    #[serde(default)]
    pub lower_bound: Vec<f64>,
    /// 신뢰 구간 상한 (없으면 빈 배열)
    #[serde(default)]
    pub upper_bound: Vec<f64>,
}

impl FutureSeries {
    /// 인덱스의 하한값.
    pub fn lower_at(&self, idx: usize) -> Option<f64> {
        self.lower_bound.get(idx).copied()
    }

    /// 인덱스의 상한값.
    pub fn upper_at(&self, idx: usize) -> Option<f64> {
        self.upper_bound.get(idx).copied()
    }

    /// 길이 계약을 검증합니다.
    pub fn validate(&self, model: &ModelId) -> ForecastResult<()> {
        let n = self.dates.len();
        if self.predictions.len() != n {
            return Err(ForecastError::data_shape(format!(
                "{}: dates={}, predictions={}",
                model,
                n,
                self.predictions.len()
            )));
        }
        check_optional_band(model, "lower_bound", &self.lower_bound, n)?;
        check_optional_band(model, "upper_bound", &self.upper_bound, n)?;
        Ok(())
    }
}

/// 미래 예측 결과 (모든 모델).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuturePrediction {
    /// 요청한 예측 기간
    #[serde(default)]
    pub prediction_horizon: Option<Horizon>,
    /// 예측 일수
    pub days_ahead: u32,
    /// 첫 예측일
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// 마지막 예측일
    pub end_date: NaiveDate,
    /// 마지막 과거 데이터 날짜
    pub last_historical_date: NaiveDate,
    /// 마지막 과거 종가
    #[serde(default)]
    pub last_historical_price: Option<f64>,
    /// 모델별 예측 시계열
    #[serde(default)]
    pub predictions: ModelMap<FutureSeries>,
}

impl FuturePrediction {
    /// 예측 모델이 하나도 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// 미래 예측 응답 전체 (과거 꼬리 구간 포함).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureForecast {
    /// 심볼
    pub symbol: String,
    /// 자산 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 최근 과거 종가 (시간순)
    #[serde(default)]
    pub historical_tail: Vec<HistoricalRecord>,
    /// 미래 예측
    pub future_predictions: FuturePrediction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_future_payload() {
        let json = serde_json::json!({
            "symbol": "^GSPC",
            "name": "S&P 500",
            "historical_tail": [
                {"date": "2024-03-28", "open": 5200.0, "high": 5260.0, "low": 5190.0,
                 "close": 5254.35, "volume": 3.1e9, "rsi": 61.2}
            ],
            "future_predictions": {
                "prediction_horizon": "1month",
                "days_ahead": 2,
                "start_date": "2024-03-29",
                "end_date": "2024-03-30",
                "last_historical_date": "2024-03-28",
                "last_historical_price": 5254.35,
                "predictions": {
                    "ensemble": {
                        "dates": ["2024-03-29", "2024-03-30"],
                        "predictions": [5260.0, 5270.0],
                        "lower_bound": [5200.0, 5190.0],
                        "upper_bound": [5320.0, 5350.0]
                    }
                }
            }
        });

        let forecast: FutureForecast = serde_json::from_value(json).unwrap();
        assert_eq!(forecast.historical_tail.len(), 1);
        assert_eq!(forecast.historical_tail[0].volume, Some(3.1e9));
        let ensemble = &forecast.future_predictions.predictions[&ModelId::ensemble()];
        assert!(ensemble.validate(&ModelId::ensemble()).is_ok());
        assert_eq!(ensemble.upper_at(1), Some(5350.0));
        assert_eq!(
            forecast.future_predictions.prediction_horizon,
            Some(Horizon::OneMonth)
        );
    }

    #[test]
    fn test_missing_bounds_are_absent() {
        let series = FutureSeries {
            dates: vec![NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()],
            predictions: vec![1.0],
            lower_bound: vec![],
            upper_bound: vec![],
        };
        assert!(series.validate(&ModelId::new("prophet")).is_ok());
        assert_eq!(series.lower_at(0), None);
    }
}
