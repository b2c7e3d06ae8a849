//! 순위 및 병합 속성 테스트.
//!
//! 1. 순위는 RMSE 비내림차순이며 동점이면 제출 순서를 유지
//! 2. best_per_model은 모델마다 먼저 제출된 최솟값을 선택
//! 3. 병합 시리즈는 과거 구간이 먼저 오고 미래 날짜는 오름차순

use chrono::{Duration, NaiveDate};
use forecast_analytics::{
    best_per_model, merge_historical_and_future, overall_best, rank_by_rmse, PointKind,
};
use forecast_core::{
    AccuracyMetrics, BacktestResultSet, Configuration, ConfigurationResult, FuturePrediction,
    FutureSeries, HistoricalRecord, ModelId, ModelMap,
};
use proptest::prelude::*;

const MODELS: [&str; 5] = ["ensemble", "lstm", "prophet", "random_forest", "xgboost"];

// ── 전략 ─────────────────────────────────────────────────────────────

/// 작은 격자에서 뽑은 RMSE (정확한 동점이 자주 나옴).
fn arb_rmse() -> impl Strategy<Value = f64> {
    (0u32..8).prop_map(|step| f64::from(step) * 0.25)
}

fn arb_result_set() -> impl Strategy<Value = BacktestResultSet> {
    let grid = Configuration::grid();
    (1usize..=grid.len())
        .prop_flat_map(move |n| {
            let configs = grid[..n].to_vec();
            (
                Just(configs),
                prop::collection::vec(prop::collection::vec(arb_rmse(), MODELS.len()), n),
            )
        })
        .prop_map(|(configs, rmses)| BacktestResultSet {
            all_results: configs
                .into_iter()
                .zip(rmses)
                .map(|(config, row)| ConfigurationResult {
                    config,
                    predictions: ModelMap::new(),
                    // 서비스 나열 순서는 이름순과 다름
                    accuracy_metrics: MODELS
                        .iter()
                        .rev()
                        .zip(row)
                        .map(|(model, rmse)| {
                            (
                                ModelId::new(*model),
                                AccuracyMetrics {
                                    rmse,
                                    mae: rmse,
                                    mape: 0.0,
                                    direction_accuracy: 50.0,
                                    total_points: 10,
                                },
                            )
                        })
                        .collect(),
                    data_info: None,
                })
                .collect(),
            ..Default::default()
        })
}

/// (설정 제출 순서, 설정 안에서 모델이 나열된 순서).
fn submission_index(
    set: &BacktestResultSet,
    config: &Configuration,
    model: &ModelId,
) -> (usize, usize) {
    set.all_results
        .iter()
        .position(|r| &r.config == config)
        .and_then(|idx| {
            let model_idx = set.all_results[idx].accuracy_metrics.get_index_of(model)?;
            Some((idx, model_idx))
        })
        .unwrap_or((usize::MAX, usize::MAX))
}

// ── 1. 순위 순서 ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ranking_is_sorted_and_stable(set in arb_result_set()) {
        let ranking = rank_by_rmse(&set);
        let entries = ranking.entries();
        prop_assert_eq!(entries.len(), set.all_results.len() * MODELS.len());

        for pair in entries.windows(2) {
            prop_assert!(pair[0].metrics.rmse <= pair[1].metrics.rmse);
            if pair[0].metrics.rmse == pair[1].metrics.rmse {
                let a = submission_index(&set, &pair[0].config, &pair[0].model);
                let b = submission_index(&set, &pair[1].config, &pair[1].model);
                prop_assert!(a < b);
            }
        }

        prop_assert_eq!(ranking.overall_best().cloned(), overall_best(&set));
        prop_assert_eq!(ranking.top(10), &entries[..entries.len().min(10)]);
    }

    // ── 2. 모델별 최적 ───────────────────────────────────────────────

    #[test]
    fn best_per_model_is_first_minimum(set in arb_result_set()) {
        let best = best_per_model(&set);
        prop_assert_eq!(best.len(), MODELS.len());

        for model in MODELS {
            let model = ModelId::new(model);
            let min = set
                .all_results
                .iter()
                .map(|r| r.accuracy_metrics[&model].rmse)
                .fold(f64::INFINITY, f64::min);
            let first = set
                .all_results
                .iter()
                .find(|r| r.accuracy_metrics[&model].rmse == min)
                .map(|r| r.config);

            prop_assert_eq!(best[&model].metrics.rmse, min);
            prop_assert_eq!(Some(best[&model].config), first);
        }
    }

    // ── 3. 병합 구분 ─────────────────────────────────────────────────

    #[test]
    fn merge_is_history_then_future(
        closes in prop::collection::vec(50.0..150.0_f64, 0..30),
        horizon in 0usize..40,
        model_count in 0usize..4,
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let tail: Vec<HistoricalRecord> = closes
            .iter()
            .enumerate()
            .map(|(i, close)| HistoricalRecord::new(start + Duration::days(i as i64), *close))
            .collect();

        let first_future = start + Duration::days(closes.len() as i64);
        let dates: Vec<NaiveDate> = (0..horizon)
            .map(|i| first_future + Duration::days(i as i64))
            .collect();
        let predictions: ModelMap<FutureSeries> = MODELS[..model_count]
            .iter()
            .map(|model| {
                (
                    ModelId::new(*model),
                    FutureSeries {
                        dates: dates.clone(),
                        predictions: vec![100.0; horizon],
                        lower_bound: vec![90.0; horizon],
                        upper_bound: vec![110.0; horizon],
                    },
                )
            })
            .collect();
        let future = FuturePrediction {
            prediction_horizon: None,
            days_ahead: horizon as u32,
            start_date: dates.first().copied(),
            end_date: dates.last().copied().unwrap_or(first_future),
            last_historical_date: tail.last().map(|r| r.date).unwrap_or(start),
            last_historical_price: closes.last().copied(),
            predictions,
        };

        let points = merge_historical_and_future(&tail, &future).unwrap();
        let expected_future = if model_count == 0 { 0 } else { horizon };
        prop_assert_eq!(points.len(), tail.len() + expected_future);

        for (point, record) in points.iter().zip(&tail) {
            prop_assert_eq!(point.kind, PointKind::Historical);
            prop_assert_eq!(point.date, record.date);
            prop_assert_eq!(point.actual, Some(record.close));
        }

        let future_points = &points[tail.len()..];
        prop_assert!(future_points.iter().all(|p| p.kind == PointKind::Future));
        prop_assert!(future_points.windows(2).all(|w| w[0].date < w[1].date));
        prop_assert!(future_points.iter().all(|p| p.models.len() == model_count));
    }
}
