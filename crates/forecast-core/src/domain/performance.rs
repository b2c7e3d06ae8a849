//! 모델 성능 비교 및 학습 결과 모델.

use crate::types::ModelId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 모델 성능 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
    pub direction_accuracy: f64,
    /// 학습 완료 여부
    #[serde(default)]
    pub is_trained: Option<bool>,
}

/// RMSE 순위가 매겨진 모델.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedModel {
    pub model: ModelId,
    pub metrics: PerformanceMetrics,
    /// 모델 사양 (하이퍼파라미터 등, 서비스 정의 형식)
    #[serde(default)]
    pub model_specs: Option<serde_json::Value>,
}

/// 모델 성능 비교 결과.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    #[serde(default)]
    pub performance: BTreeMap<ModelId, PerformanceMetrics>,
    #[serde(default)]
    pub best_model: Option<ModelId>,
    #[serde(default)]
    pub ranked_models: Vec<RankedModel>,
    /// 학습 전이면 서비스가 채우는 메시지
    #[serde(default)]
    pub error: Option<String>,
}

impl ModelPerformance {
    /// 성능 데이터가 준비되었는지 확인.
    pub fn is_available(&self) -> bool {
        self.error.is_none() && !self.performance.is_empty()
    }
}

/// `GET models/performance/{symbol}` 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformanceReport {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub performance: ModelPerformance,
}

/// 학습 구간 재정의 (모두 선택).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_end_date: Option<NaiveDate>,
}

/// 실제 학습에 사용된 구간.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_end_date: Option<NaiveDate>,
    pub total_days: usize,
}

/// `POST train` 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    /// 모델별 학습 결과 (서비스 정의 형식)
    #[serde(default)]
    pub training_results: serde_json::Value,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

/// `GET predictions/{symbol}` 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionsReport {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    /// 기간별 예측 (서비스 정의 형식)
    #[serde(default)]
    pub predictions: serde_json::Value,
}
