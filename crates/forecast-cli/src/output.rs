//! 터미널 출력.
//!
//! 각 함수는 출력할 문자열을 만들어 반환하며, 실제 출력은 호출자가 담당합니다.

use std::collections::BTreeMap;

use forecast_analytics::{ChartPoint, PointKind, RankedEntry};
use forecast_core::{BestConfig, Configuration, ModelId, ModelPerformanceReport, TrainingReport};
use serde::Serialize;

/// 값을 보기 좋은 JSON으로 직렬화합니다.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// 선택 가능한 설정 목록.
pub fn grid_table(configs: &[Configuration]) -> String {
    let mut out = format!(
        "{:>3}  {:<30} {:>9} {:>10} {:>6}\n",
        "#", "config", "test days", "train days", "train%"
    );
    for (idx, config) in configs.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<30} {:>9} {:>10} {:>5.0}%\n",
            idx + 1,
            config.to_string(),
            config.test_period.days(),
            config.train_lookback.days(),
            config.train_test_split.train_ratio() * 100.0
        ));
    }
    out
}

/// RMSE 순위표.
pub fn ranking_table(entries: &[RankedEntry]) -> String {
    if entries.is_empty() {
        return "(결과 없음)\n".to_string();
    }

    let mut out = format!(
        "{:>3}  {:<42} {:<14} {:>10} {:>10} {:>8} {:>8}\n",
        "#", "configuration", "model", "rmse", "mae", "mape%", "dir%"
    );
    for (idx, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<42} {:<14} {:>10.4} {:>10.4} {:>8.2} {:>8.2}\n",
            idx + 1,
            entry.configuration_label,
            entry.model.as_str(),
            entry.metrics.rmse,
            entry.metrics.mae,
            entry.metrics.mape,
            entry.metrics.direction_accuracy
        ));
    }
    out
}

/// 모델별 최적 설정. 미래 예측 기준 모델은 `*`로 표시합니다.
pub fn best_per_model_table(best: &BTreeMap<ModelId, BestConfig>, seed: &ModelId) -> String {
    let mut out = String::new();
    for (model, choice) in best {
        let marker = if model == seed { "*" } else { " " };
        out.push_str(&format!(
            "{} {:<14} {:<42} rmse={:.4}\n",
            marker,
            model.as_str(),
            choice.config.label(),
            choice.metrics.rmse
        ));
    }
    out
}

/// 병합된 차트 시리즈 표.
///
/// 모델 열은 시리즈에 처음 등장한 순서(서비스가 나열한 순서)를 따르며, 신뢰 구간이
/// 있으면 `예측 [하한, 상한]` 형식으로 표시합니다.
pub fn chart_table(points: &[ChartPoint]) -> String {
    let mut models: Vec<&ModelId> = Vec::new();
    for model in points.iter().flat_map(|p| p.models.keys()) {
        if !models.contains(&model) {
            models.push(model);
        }
    }

    let mut out = format!("{:<10}  {:<4} {:>10}", "date", "kind", "actual");
    for model in &models {
        out.push_str(&format!(" {:>28}", model.as_str()));
    }
    out.push('\n');

    for point in points {
        let kind = match point.kind {
            PointKind::Historical => "hist",
            PointKind::Future => "fut",
        };
        let actual = point
            .actual
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{:<10}  {:<4} {:>10}", point.date, kind, actual));

        for model in &models {
            let cell = match point.models.get(*model) {
                Some(p) => match (p.lower, p.upper) {
                    (Some(lo), Some(hi)) => format!("{:.2} [{:.2}, {:.2}]", p.prediction, lo, hi),
                    _ => format!("{:.2}", p.prediction),
                },
                None => "-".to_string(),
            };
            out.push_str(&format!(" {:>28}", cell));
        }
        out.push('\n');
    }
    out
}

/// 모델 성능 비교 표.
pub fn performance_table(report: &ModelPerformanceReport) -> String {
    let perf = &report.performance;
    if !perf.is_available() {
        let reason = perf.error.as_deref().unwrap_or("성능 데이터 없음");
        return format!("{}: {}\n", report.symbol, reason);
    }

    let mut out = format!(
        "{:<14} {:>10} {:>10} {:>8} {:>8}\n",
        "model", "rmse", "mae", "mape%", "dir%"
    );
    for (model, metrics) in &perf.performance {
        let marker = if perf.best_model.as_ref() == Some(model) {
            " (best)"
        } else {
            ""
        };
        out.push_str(&format!(
            "{:<14} {:>10.4} {:>10.4} {:>8.2} {:>8.2}{}\n",
            model.as_str(),
            metrics.rmse,
            metrics.mae,
            metrics.mape,
            metrics.direction_accuracy,
            marker
        ));
    }
    out
}

/// 학습 결과 요약.
pub fn training_summary(report: &TrainingReport) -> String {
    let mut out = format!("학습 완료: {}\n", report.symbol);
    if let Some(range) = &report.date_range {
        let start = range
            .actual_start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());
        let end = range
            .actual_end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());
        out.push_str(&format!("기간: {} ~ {} ({}일)\n", start, end, range.total_days));
    }
    if let Some(models) = report.training_results.as_object() {
        let names: Vec<&str> = models.keys().map(String::as_str).collect();
        out.push_str(&format!("모델: {}\n", names.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use forecast_analytics::ModelPoint;
    use forecast_core::{AccuracyMetrics, ModelMap};

    fn metrics(rmse: f64) -> AccuracyMetrics {
        AccuracyMetrics {
            rmse,
            mae: rmse / 2.0,
            mape: 1.5,
            direction_accuracy: 60.0,
            total_points: 20,
        }
    }

    #[test]
    fn test_grid_table_lists_every_config() {
        let table = grid_table(&Configuration::grid());
        assert_eq!(table.lines().count(), 17);
        assert!(table.contains("current_3months:6months:70_30"));
    }

    #[test]
    fn test_ranking_table() {
        let config: Configuration = "current_month:2months:80_20".parse().unwrap();
        let entries = vec![RankedEntry {
            configuration_label: config.label(),
            config,
            model: ModelId::new("lstm"),
            metrics: metrics(1.2345),
        }];
        let table = ranking_table(&entries);
        assert!(table.contains("current_month_train2months_split80_20"));
        assert!(table.contains("1.2345"));
        assert_eq!(ranking_table(&[]), "(결과 없음)\n");
    }

    #[test]
    fn test_best_per_model_marks_seed() {
        let config: Configuration = "current_month:1month:80_20".parse().unwrap();
        let mut best = BTreeMap::new();
        best.insert(ModelId::ensemble(), BestConfig { config, metrics: metrics(0.5) });
        best.insert(ModelId::new("xgboost"), BestConfig { config, metrics: metrics(0.7) });

        let table = best_per_model_table(&best, &ModelId::ensemble());
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("* ensemble"));
        assert!(lines[1].starts_with("  xgboost"));
    }

    #[test]
    fn test_chart_table_bounds_and_missing_cells() {
        let date = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let mut models = ModelMap::new();
        models.insert(
            ModelId::new("xgboost"),
            ModelPoint {
                prediction: 100.5,
                lower: None,
                upper: None,
            },
        );
        models.insert(
            ModelId::ensemble(),
            ModelPoint {
                prediction: 101.0,
                lower: Some(99.0),
                upper: Some(103.0),
            },
        );
        let points = vec![
            ChartPoint {
                date: date(1),
                kind: PointKind::Historical,
                actual: Some(100.0),
                models: ModelMap::new(),
            },
            ChartPoint {
                date: date(4),
                kind: PointKind::Future,
                actual: None,
                models,
            },
        ];

        let table = chart_table(&points);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].find("xgboost") < lines[0].find("ensemble"));
        assert!(lines[1].contains("hist"));
        assert!(lines[1].contains("100.00"));
        assert!(lines[2].contains("101.00 [99.00, 103.00]"));
    }
}
