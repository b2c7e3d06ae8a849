//! 백테스트 결과 순위 및 최적 설정 선택.
//!
//! 모든 함수는 순수 함수이며 입력 결과 집합의 제출 순서(설정 순서, 같은 설정 안에서는
//! 서비스가 나열한 모델 순서)를 동점 처리의 기준으로 사용합니다.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use forecast_core::{
    AccuracyMetrics, BacktestResultSet, BestConfig, ComparisonRow, Configuration, ModelId,
};
use serde::Serialize;

/// 순위표의 한 행.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 설정 라벨 (예: `current_month_train2months_split80_20`)
    pub configuration_label: String,
    pub config: Configuration,
    pub model: ModelId,
    pub metrics: AccuracyMetrics,
}

/// RMSE 오름차순으로 정렬된 순위표.
///
/// 한 번 정렬된 뒤에는 상위 N개 조회나 전체 최적 조회에 재정렬이 필요 없습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    entries: Vec<RankedEntry>,
}

impl Ranking {
    /// 전체 순위.
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    /// 상위 `n`개. `n`이 전체보다 크면 전체를 반환합니다.
    pub fn top(&self, n: usize) -> &[RankedEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// 전체 최적(첫 번째) 항목.
    pub fn overall_best(&self) -> Option<&RankedEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter()
    }
}

/// RMSE 비교. NaN은 어떤 값보다도 뒤로 보냅니다.
fn compare_rmse(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// 제출 순서대로 (설정, 모델) 항목을 나열합니다.
fn entries_in_submission_order(set: &BacktestResultSet) -> impl Iterator<Item = RankedEntry> + '_ {
    set.all_results.iter().flat_map(|result| {
        let label = result.config.label();
        result
            .accuracy_metrics
            .iter()
            .map(move |(model, metrics)| RankedEntry {
                configuration_label: label.clone(),
                config: result.config,
                model: model.clone(),
                metrics: *metrics,
            })
    })
}

/// RMSE 오름차순 안정 정렬 순위표를 생성합니다.
///
/// RMSE가 같으면 제출 순서가 유지됩니다. 빈 결과 집합은 빈 순위표를 반환합니다.
pub fn rank_by_rmse(set: &BacktestResultSet) -> Ranking {
    let mut entries: Vec<RankedEntry> = entries_in_submission_order(set).collect();
    // sort_by는 안정 정렬
    entries.sort_by(|a, b| compare_rmse(a.metrics.rmse, b.metrics.rmse));
    Ranking { entries }
}

/// 모델별 최소 RMSE 설정을 선택합니다.
///
/// 정확히 같은 RMSE면 먼저 제출된 설정이 선택됩니다.
pub fn best_per_model(set: &BacktestResultSet) -> BTreeMap<ModelId, BestConfig> {
    let mut best: BTreeMap<ModelId, BestConfig> = BTreeMap::new();

    for entry in entries_in_submission_order(set) {
        match best.get_mut(&entry.model) {
            Some(current) if entry.metrics.beats(&current.metrics) => {
                current.config = entry.config;
                current.metrics = entry.metrics;
            }
            Some(_) => {}
            None => {
                best.insert(
                    entry.model,
                    BestConfig {
                        config: entry.config,
                        metrics: entry.metrics,
                    },
                );
            }
        }
    }

    best
}

/// 전체 결과에서 RMSE가 가장 낮은 (설정, 모델) 쌍.
pub fn overall_best(set: &BacktestResultSet) -> Option<RankedEntry> {
    entries_in_submission_order(set).fold(None, |best: Option<RankedEntry>, entry| match best {
        Some(current) if !entry.metrics.beats(&current.metrics) => Some(current),
        _ => Some(entry),
    })
}

/// 결과 집합에서 비교표 행을 제출 순서대로 생성합니다.
///
/// 서비스가 `comparison_summary`를 생략했을 때 같은 형태의 표를 만드는 데 사용합니다.
pub fn comparison_rows(set: &BacktestResultSet) -> Vec<ComparisonRow> {
    entries_in_submission_order(set)
        .map(|entry| ComparisonRow {
            configuration: entry.configuration_label,
            model: entry.model,
            metrics: entry.metrics,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::{ConfigurationResult, ModelMap, TestPeriod, TrainLookback, TrainTestSplit};

    fn metrics(rmse: f64) -> AccuracyMetrics {
        AccuracyMetrics {
            rmse,
            mae: rmse,
            mape: 1.0,
            direction_accuracy: 50.0,
            total_points: 20,
        }
    }

    fn result(config: Configuration, rmses: &[(&str, f64)]) -> ConfigurationResult {
        ConfigurationResult {
            config,
            predictions: ModelMap::new(),
            accuracy_metrics: rmses
                .iter()
                .map(|(m, r)| (ModelId::new(*m), metrics(*r)))
                .collect(),
            data_info: None,
        }
    }

    fn config(lookback: TrainLookback) -> Configuration {
        Configuration::new(TestPeriod::CurrentMonth, lookback, TrainTestSplit::Split80_20)
    }

    const MODELS: [&str; 5] = ["ensemble", "lstm", "prophet", "random_forest", "xgboost"];

    #[test]
    fn test_three_configs_five_models() {
        let c1 = config(TrainLookback::OneMonth);
        let c2 = config(TrainLookback::TwoMonths);
        let c3 = config(TrainLookback::SixMonths);

        let set = BacktestResultSet {
            all_results: vec![
                result(
                    c1,
                    &[("ensemble", 2.0), ("lstm", 3.1), ("prophet", 5.0), ("random_forest", 2.6), ("xgboost", 2.9)],
                ),
                result(
                    c2,
                    &[("ensemble", 1.8), ("lstm", 3.5), ("prophet", 4.2), ("random_forest", 2.7), ("xgboost", 1.2)],
                ),
                result(
                    c3,
                    &[("ensemble", 1.9), ("lstm", 2.4), ("prophet", 4.9), ("random_forest", 2.2), ("xgboost", 1.5)],
                ),
            ],
            ..Default::default()
        };

        let ranking = rank_by_rmse(&set);
        assert_eq!(ranking.len(), 15);
        let best = ranking.overall_best().unwrap();
        assert_eq!(best.model, ModelId::new("xgboost"));
        assert_eq!(best.config, c2);
        assert_eq!(overall_best(&set).as_ref(), Some(best));

        let per_model = best_per_model(&set);
        assert_eq!(per_model.len(), MODELS.len());
        assert_eq!(per_model[&ModelId::ensemble()].config, c2);
        assert_eq!(per_model[&ModelId::new("lstm")].config, c3);
        assert_eq!(per_model[&ModelId::new("prophet")].config, c2);
        assert_eq!(per_model[&ModelId::new("random_forest")].config, c3);
        assert_eq!(per_model[&ModelId::new("xgboost")].config, c2);
    }

    #[test]
    fn test_ties_prefer_first_submitted() {
        let c1 = config(TrainLookback::ThreeMonths);
        let c2 = config(TrainLookback::OneMonth);
        let set = BacktestResultSet {
            all_results: vec![result(c1, &[("ensemble", 1.0)]), result(c2, &[("ensemble", 1.0)])],
            ..Default::default()
        };

        assert_eq!(best_per_model(&set)[&ModelId::ensemble()].config, c1);
        assert_eq!(overall_best(&set).unwrap().config, c1);
        let ranking = rank_by_rmse(&set);
        assert_eq!(ranking.entries()[0].config, c1);
        assert_eq!(ranking.entries()[1].config, c2);
    }

    #[test]
    fn test_ties_keep_service_model_order() {
        let c1 = config(TrainLookback::OneMonth);
        let set = BacktestResultSet {
            all_results: vec![result(c1, &[("xgboost", 1.0), ("lstm", 0.5), ("ensemble", 1.0)])],
            ..Default::default()
        };

        let ranking = rank_by_rmse(&set);
        let order: Vec<&str> = ranking.iter().map(|e| e.model.as_str()).collect();
        assert_eq!(order, vec!["lstm", "xgboost", "ensemble"]);

        let rows: Vec<String> = comparison_rows(&set).into_iter().map(|r| r.model.to_string()).collect();
        assert_eq!(rows, vec!["xgboost", "lstm", "ensemble"]);
    }

    #[test]
    fn test_top_slice() {
        let set = BacktestResultSet {
            all_results: vec![result(
                config(TrainLookback::OneMonth),
                &[("a", 3.0), ("b", 1.0), ("c", 2.0)],
            )],
            ..Default::default()
        };
        let ranking = rank_by_rmse(&set);
        let top: Vec<&str> = ranking.top(2).iter().map(|e| e.model.as_str()).collect();
        assert_eq!(top, vec!["b", "c"]);
        assert_eq!(ranking.top(10).len(), 3);
        assert_eq!(ranking.entries()[0].configuration_label, "current_month_train1month_split80_20");
    }

    #[test]
    fn test_nan_sorts_last() {
        let set = BacktestResultSet {
            all_results: vec![result(
                config(TrainLookback::OneMonth),
                &[("broken", f64::NAN), ("lstm", 9.0)],
            )],
            ..Default::default()
        };
        let ranking = rank_by_rmse(&set);
        assert_eq!(ranking.overall_best().unwrap().model, ModelId::new("lstm"));
        assert_eq!(overall_best(&set).unwrap().model, ModelId::new("lstm"));
    }

    #[test]
    fn test_empty_set() {
        let set = BacktestResultSet::default();
        assert!(rank_by_rmse(&set).is_empty());
        assert!(rank_by_rmse(&set).top(10).is_empty());
        assert!(best_per_model(&set).is_empty());
        assert!(overall_best(&set).is_none());
        assert!(comparison_rows(&set).is_empty());
    }
}
