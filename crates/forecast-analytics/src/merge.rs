//! 과거/미래 시계열 병합.
//!
//! 과거 꼬리 구간과 모델별 미래 예측(신뢰 구간 포함)을 하나의 연속된 차트 시리즈로
//! 합칩니다. 병합은 입력 순서를 보존하는 순수 변환입니다.

use chrono::NaiveDate;
use forecast_core::{
    ConfigurationResult, ForecastResult, FuturePrediction, HistoricalRecord, ModelId, ModelMap,
};
use serde::Serialize;

use crate::shape::{backtest_axis, validate_future};

/// 차트 포인트 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// 실제 종가
    Historical,
    /// 모델 예측
    Future,
}

/// 한 날짜의 모델 예측값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPoint {
    pub prediction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// 차트 데이터 포인트.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub kind: PointKind,
    /// 실제 가격 (미래 포인트는 없음)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    /// 모델별 예측값 (과거 꼬리 포인트는 비어 있음)
    #[serde(skip_serializing_if = "ModelMap::is_empty")]
    pub models: ModelMap<ModelPoint>,
}

impl ChartPoint {
    fn historical(record: &HistoricalRecord) -> Self {
        Self {
            date: record.date,
            kind: PointKind::Historical,
            actual: Some(record.close),
            models: ModelMap::new(),
        }
    }
}

/// 과거 꼬리 구간과 미래 예측을 하나의 시리즈로 병합합니다.
///
/// 결과의 앞 `tail.len()`개는 `Historical`(입력 순서 유지), 나머지는 날짜 오름차순의
/// `Future` 포인트입니다. 모델 간 날짜 축이 다르면 `DataShape` 에러를 반환합니다.
pub fn merge_historical_and_future(
    tail: &[HistoricalRecord],
    future: &FuturePrediction,
) -> ForecastResult<Vec<ChartPoint>> {
    let axis = validate_future(tail, future)?;

    let mut points = Vec::with_capacity(tail.len() + axis.len());
    points.extend(tail.iter().map(ChartPoint::historical));

    for (idx, date) in axis.iter().enumerate() {
        let models = future
            .predictions
            .iter()
            .map(|(model, series)| {
                (
                    model.clone(),
                    ModelPoint {
                        prediction: series.predictions[idx],
                        lower: series.lower_at(idx),
                        upper: series.upper_at(idx),
                    },
                )
            })
            .collect();

        points.push(ChartPoint {
            date: *date,
            kind: PointKind::Future,
            actual: None,
            models,
        });
    }

    Ok(points)
}

/// 한 설정의 백테스트 결과를 실제값/모델별 예측값 시리즈로 병합합니다.
///
/// 모든 모델은 같은 날짜 축을 공유해야 합니다. 실제값은 서비스가 처음 나열한 모델의
/// 값을 사용합니다.
pub fn merge_backtest_sample(result: &ConfigurationResult) -> ForecastResult<Vec<ChartPoint>> {
    let axis = backtest_axis(result)?;
    let actual = result
        .predictions
        .values()
        .next()
        .map(|series| series.actual.as_slice())
        .unwrap_or(&[]);

    let points = axis
        .iter()
        .enumerate()
        .map(|(idx, date)| ChartPoint {
            date: *date,
            kind: PointKind::Historical,
            actual: actual.get(idx).copied(),
            models: result
                .predictions
                .iter()
                .map(|(model, series)| {
                    (
                        model.clone(),
                        ModelPoint {
                            prediction: series.predictions[idx],
                            lower: series.lower_bound.get(idx).copied(),
                            upper: series.upper_bound.get(idx).copied(),
                        },
                    )
                })
                .collect(),
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::{ForecastError, FutureSeries, ModelSeries};

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn tail() -> Vec<HistoricalRecord> {
        vec![
            HistoricalRecord::new(d(5, 30), 100.0),
            HistoricalRecord::new(d(5, 31), 101.0),
        ]
    }

    fn prediction(predictions: ModelMap<FutureSeries>) -> FuturePrediction {
        FuturePrediction {
            prediction_horizon: None,
            days_ahead: 2,
            start_date: Some(d(6, 3)),
            end_date: d(6, 4),
            last_historical_date: d(5, 31),
            last_historical_price: Some(101.0),
            predictions,
        }
    }

    #[test]
    fn test_merge_tags_and_bounds() {
        let mut predictions = ModelMap::new();
        predictions.insert(
            ModelId::ensemble(),
            FutureSeries {
                dates: vec![d(6, 3), d(6, 4)],
                predictions: vec![102.0, 103.0],
                lower_bound: vec![98.0, 97.0],
                upper_bound: vec![106.0, 109.0],
            },
        );
        predictions.insert(
            ModelId::new("prophet"),
            FutureSeries {
                dates: vec![d(6, 3), d(6, 4)],
                predictions: vec![101.5, 101.8],
                lower_bound: vec![],
                upper_bound: vec![],
            },
        );

        let points = merge_historical_and_future(&tail(), &prediction(predictions)).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].kind, PointKind::Historical);
        assert_eq!(points[1].actual, Some(101.0));
        assert!(points[1].models.is_empty());

        let first_future = &points[2];
        assert_eq!(first_future.kind, PointKind::Future);
        assert_eq!(first_future.actual, None);
        let ensemble = first_future.models[&ModelId::ensemble()];
        assert_eq!((ensemble.lower, ensemble.upper), (Some(98.0), Some(106.0)));
        let prophet = first_future.models[&ModelId::new("prophet")];
        assert_eq!(prophet.prediction, 101.5);
        assert_eq!(prophet.lower, None);
        assert_eq!(points[3].date, d(6, 4));
    }

    #[test]
    fn test_empty_future_keeps_history() {
        let tail = tail();
        let points = merge_historical_and_future(&tail, &prediction(ModelMap::new())).unwrap();
        assert_eq!(points.len(), tail.len());
        for (point, record) in points.iter().zip(&tail) {
            assert_eq!(point.date, record.date);
            assert_eq!(point.actual, Some(record.close));
        }
    }

    #[test]
    fn test_mismatched_axis_rejected() {
        let mut predictions = ModelMap::new();
        predictions.insert(
            ModelId::ensemble(),
            FutureSeries {
                dates: vec![d(6, 3), d(6, 4)],
                predictions: vec![102.0, 103.0],
                lower_bound: vec![],
                upper_bound: vec![],
            },
        );
        predictions.insert(
            ModelId::new("lstm"),
            FutureSeries {
                dates: vec![d(6, 3)],
                predictions: vec![102.0],
                lower_bound: vec![],
                upper_bound: vec![],
            },
        );

        let err = merge_historical_and_future(&tail(), &prediction(predictions)).unwrap_err();
        assert!(matches!(err, ForecastError::DataShape(_)));
    }

    #[test]
    fn test_backtest_sample() {
        let mut predictions = ModelMap::new();
        for (model, offset) in [("lstm", 0.5), ("xgboost", -0.5)] {
            predictions.insert(
                ModelId::new(model),
                ModelSeries {
                    dates: vec![d(4, 1), d(4, 2), d(4, 3)],
                    predictions: vec![10.0 + offset, 11.0 + offset, 12.0 + offset],
                    actual: vec![10.0, 11.0, 12.0],
                    lower_bound: vec![],
                    upper_bound: vec![],
                },
            );
        }
        let result = ConfigurationResult {
            config: "current_month:1month:80_20".parse().unwrap(),
            predictions,
            accuracy_metrics: ModelMap::new(),
            data_info: None,
        };

        let points = merge_backtest_sample(&result).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].actual, Some(12.0));
        assert_eq!(points[2].models[&ModelId::new("xgboost")].prediction, 11.5);
        assert!(points.iter().all(|p| p.kind == PointKind::Historical));
    }

    #[test]
    fn test_backtest_sample_uses_first_listed_model() {
        let mut predictions = ModelMap::new();
        for (model, actual) in [("xgboost", 20.0), ("ensemble", 10.0)] {
            predictions.insert(
                ModelId::new(model),
                ModelSeries {
                    dates: vec![d(4, 1)],
                    predictions: vec![actual + 1.0],
                    actual: vec![actual],
                    lower_bound: vec![],
                    upper_bound: vec![],
                },
            );
        }
        let result = ConfigurationResult {
            config: "current_month:1month:80_20".parse().unwrap(),
            predictions,
            accuracy_metrics: ModelMap::new(),
            data_info: None,
        };

        let points = merge_backtest_sample(&result).unwrap();
        assert_eq!(points[0].actual, Some(20.0));
        let order: Vec<&str> = points[0].models.keys().map(ModelId::as_str).collect();
        assert_eq!(order, vec!["xgboost", "ensemble"]);
    }
}
