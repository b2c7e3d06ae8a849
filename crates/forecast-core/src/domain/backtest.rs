//! 백테스트 결과 모델.
//!
//! 외부 연산 서비스가 반환하는 `(설정 × 모델)` 결과 구조를 정의합니다.

use super::metrics::AccuracyMetrics;
use crate::error::{ForecastError, ForecastResult};
use crate::types::{Configuration, ModelId, ModelMap};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 한 모델의 백테스트 예측 시계열.
///
/// `dates`, `predictions`, `actual`은 같은 길이로 정렬되어 있어야 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSeries {
    /// 테스트 구간 날짜 축
    pub dates: Vec<NaiveDate>,
    /// 예측값
    pub predictions: Vec<f64>,
    /// 실제 종가
    pub actual: Vec<f64>,
    /// 신뢰 구간 하한 (없으면 빈 배열)
    #[serde(default)]
    pub lower_bound: Vec<f64>,
    /// 신뢰 구간 상한 (없으면 빈 배열)
    #[serde(default)]
    pub upper_bound: Vec<f64>,
}

impl ModelSeries {
    /// 데이터 포인트 수.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// 길이 계약을 검증합니다.
    pub fn validate(&self, model: &ModelId) -> ForecastResult<()> {
        let n = self.dates.len();
        if self.predictions.len() != n || self.actual.len() != n {
            return Err(ForecastError::data_shape(format!(
                "{}: dates={}, predictions={}, actual={}",
                model,
                n,
                self.predictions.len(),
                self.actual.len()
            )));
        }
        check_optional_band(model, "lower_bound", &self.lower_bound, n)?;
        check_optional_band(model, "upper_bound", &self.upper_bound, n)?;
        Ok(())
    }
}

/// 신뢰 구간 배열은 비어 있거나 날짜 축과 같은 길이여야 합니다.
pub(crate) fn check_optional_band(
    model: &ModelId,
    name: &str,
    band: &[f64],
    expected: usize,
) -> ForecastResult<()> {
    if !band.is_empty() && band.len() != expected {
        return Err(ForecastError::data_shape(format!(
            "{}: {} has {} points, expected {}",
            model,
            name,
            band.len(),
            expected
        )));
    }
    Ok(())
}

/// 백테스트 데이터 구간 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataInfo {
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub test_start: NaiveDate,
    pub test_end: NaiveDate,
    pub train_samples: usize,
    pub val_samples: usize,
    pub test_samples: usize,
}

/// 하나의 설정에 대한 모든 모델의 백테스트 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationResult {
    /// 실행한 설정
    pub config: Configuration,
    /// 모델별 예측 시계열
    #[serde(default)]
    pub predictions: ModelMap<ModelSeries>,
    /// 모델별 정확도 지표 (서비스가 나열한 순서)
    #[serde(default)]
    pub accuracy_metrics: ModelMap<AccuracyMetrics>,
    /// 데이터 구간 정보
    #[serde(default)]
    pub data_info: Option<DataInfo>,
}

/// 모델별 최적 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestConfig {
    pub config: Configuration,
    pub metrics: AccuracyMetrics,
}

/// 비교표의 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// 설정 라벨 (`Configuration::label`)
    pub configuration: String,
    /// 모델 이름
    pub model: ModelId,
    /// 정확도 지표
    #[serde(flatten)]
    pub metrics: AccuracyMetrics,
}

/// 한 번의 백테스트 실행 결과 전체.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestResultSet {
    /// 제출 순서대로 정렬된 설정별 결과
    #[serde(default)]
    pub all_results: Vec<ConfigurationResult>,
    /// 서비스가 계산한 모델별 최적 설정 (참고용, 클라이언트에서 재계산함)
    #[serde(default)]
    pub best_configs: BTreeMap<ModelId, BestConfig>,
    /// 서비스가 만든 비교 요약
    #[serde(default)]
    pub comparison_summary: Vec<ComparisonRow>,
}

impl BacktestResultSet {
    /// 결과가 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.all_results.is_empty()
    }

    /// 결과에 등장하는 모든 모델 (정렬됨, 중복 없음).
    pub fn models(&self) -> Vec<ModelId> {
        let mut models: Vec<ModelId> = self
            .all_results
            .iter()
            .flat_map(|r| r.accuracy_metrics.keys().cloned())
            .collect();
        models.sort();
        models.dedup();
        models
    }

    /// 특정 설정의 결과 조회.
    pub fn result_for(&self, config: &Configuration) -> Option<&ConfigurationResult> {
        self.all_results.iter().find(|r| &r.config == config)
    }
}
