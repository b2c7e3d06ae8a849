//! 응답 데이터 형태 검증.
//!
//! 외부 서비스 응답이 날짜 축/길이 계약을 지키는지 저장 전에 확인합니다.
//! 위반은 잘라내지 않고 `ForecastError::DataShape`로 보고합니다.

use chrono::NaiveDate;
use forecast_core::{
    BacktestResultSet, ConfigurationResult, ForecastError, ForecastResult, FuturePrediction,
    HistoricalRecord, ModelId,
};
use tracing::warn;

/// 백테스트 결과 집합 전체를 검증합니다.
///
/// 각 모델 시리즈의 길이가 일치하고, 같은 설정 안의 모델들이 같은 날짜 축을 공유해야 합니다.
pub fn validate_backtest(set: &BacktestResultSet) -> ForecastResult<()> {
    for result in &set.all_results {
        backtest_axis(result)?;
    }
    Ok(())
}

/// 한 설정 결과의 공통 날짜 축을 반환합니다. 모델이 없으면 빈 축입니다.
pub(crate) fn backtest_axis(result: &ConfigurationResult) -> ForecastResult<&[NaiveDate]> {
    let mut reference: Option<(&ModelId, &[NaiveDate])> = None;

    for (model, series) in &result.predictions {
        series.validate(model)?;
        match reference {
            None => reference = Some((model, series.dates.as_slice())),
            Some((ref_model, axis)) => {
                check_same_axis(ref_model, axis, model, &series.dates)
                    .map_err(|e| with_context(e, &result.config.label()))?;
            }
        }
    }

    Ok(reference.map(|(_, axis)| axis).unwrap_or(&[]))
}

/// 미래 예측의 공통 날짜 축을 검증하고 반환합니다.
///
/// - 모든 모델이 같은 날짜 축을 공유
/// - 날짜는 엄격한 오름차순
/// - 첫 날짜는 과거 꼬리 구간의 마지막 날짜 이후
pub fn validate_future<'a>(
    tail: &[HistoricalRecord],
    future: &'a FuturePrediction,
) -> ForecastResult<&'a [NaiveDate]> {
    let mut reference: Option<(&ModelId, &[NaiveDate])> = None;

    for (model, series) in &future.predictions {
        series.validate(model)?;
        match reference {
            None => reference = Some((model, series.dates.as_slice())),
            Some((ref_model, axis)) => check_same_axis(ref_model, axis, model, &series.dates)?,
        }
    }

    let axis = reference.map(|(_, axis)| axis).unwrap_or(&[]);

    if let Some(pair) = axis.windows(2).find(|w| w[0] >= w[1]) {
        warn!(prev = %pair[0], next = %pair[1], "미래 날짜 축이 오름차순이 아님");
        return Err(ForecastError::data_shape(format!(
            "future dates not strictly ascending: {} then {}",
            pair[0], pair[1]
        )));
    }

    if let (Some(last), Some(first)) = (tail.last(), axis.first()) {
        if *first <= last.date {
            warn!(last_historical = %last.date, first_future = %first, "미래 날짜가 과거 구간과 겹침");
            return Err(ForecastError::data_shape(format!(
                "first future date {} is not after last historical date {}",
                first, last.date
            )));
        }
    }

    Ok(axis)
}

fn check_same_axis(
    ref_model: &ModelId,
    reference: &[NaiveDate],
    model: &ModelId,
    dates: &[NaiveDate],
) -> ForecastResult<()> {
    if reference.len() != dates.len() {
        warn!(%ref_model, %model, "모델 간 날짜 축 길이 불일치");
        return Err(ForecastError::data_shape(format!(
            "{} has {} dates but {} has {}",
            model,
            dates.len(),
            ref_model,
            reference.len()
        )));
    }
    if let Some(idx) = reference.iter().zip(dates).position(|(a, b)| a != b) {
        warn!(%ref_model, %model, idx, "모델 간 날짜 축 불일치");
        return Err(ForecastError::data_shape(format!(
            "{} date[{}]={} differs from {} date[{}]={}",
            model, idx, dates[idx], ref_model, idx, reference[idx]
        )));
    }
    Ok(())
}

fn with_context(err: ForecastError, label: &str) -> ForecastError {
    match err {
        ForecastError::DataShape(msg) => ForecastError::DataShape(format!("{}: {}", label, msg)),
        other => other,
    }
}
