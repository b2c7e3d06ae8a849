//! 워크플로 실행 명령어.
//!
//! 설정 선택 → 백테스트 → (선택) 미래 예측을 한 번에 실행합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 두 설정으로 SPY 백테스트 후 1개월 예측
//! forecast run SPY -c current_month:2months:80_20 -c current_3months:6months:70_30 --horizon 1month
//!
//! # 전체 16개 설정으로 백테스트하고 모델 성능까지 조회
//! forecast run TLT --all --horizon 3months --performance
//! ```

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use forecast_analytics::RankedEntry;
use forecast_client::ComputationClient;
use forecast_core::{Configuration, Horizon, ModelPerformanceReport, WorkflowConfig};
use forecast_workflow::{
    BacktestView, ConfigurationSet, FutureView, Resolution, WorkflowController,
};
use tracing::{info, warn};

/// `run` 명령 인자.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// 종목 심볼
    pub symbol: String,
    /// 명시적으로 고른 설정 (중복은 한 번만 반영)
    pub configs: Vec<Configuration>,
    /// 전체 설정 조합 사용
    pub all: bool,
    /// 백테스트 후 미래 예측 기간
    pub horizon: Option<Horizon>,
    /// 백테스트 후 모델 성능 조회
    pub with_performance: bool,
}

/// `run` 명령 실행 결과.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub backtest: Arc<BacktestView>,
    /// 순위표 상위 N개
    pub top: Vec<RankedEntry>,
    pub future: Option<Arc<FutureView>>,
    pub performance: Option<Arc<ModelPerformanceReport>>,
}

/// 인자에서 제출할 설정 집합을 만듭니다.
pub fn select_configs(args: &RunArgs) -> ConfigurationSet {
    if args.all {
        Configuration::grid().into_iter().collect()
    } else {
        args.configs.iter().copied().collect()
    }
}

/// 워크플로를 끝까지 실행합니다.
///
/// 선택이 비어 있으면 원격 호출 없이 `EmptySelection` 에러로 끝납니다.
pub async fn run_workflow(
    client: Arc<dyn ComputationClient>,
    settings: WorkflowConfig,
    args: &RunArgs,
) -> Result<RunOutcome> {
    let controller = WorkflowController::new(client, settings);
    let performance_view = args
        .with_performance
        .then(|| controller.attach_performance_view());

    let selection = select_configs(args);
    for config in selection.iter().copied() {
        controller.toggle(config).await?;
    }

    info!(symbol = %args.symbol, configs = selection.len(), "백테스트 실행");
    let pending = controller.submit_backtest(&args.symbol).await?;
    settle(pending.wait().await?)?;

    let backtest = controller
        .backtest()
        .await
        .ok_or_else(|| anyhow!("백테스트 결과가 저장되지 않았습니다"))?;
    let top = controller.top_ranked().await;

    let future = match args.horizon {
        Some(horizon) => {
            let pending = controller.request_future(horizon).await?;
            settle(pending.wait().await?)?;
            controller.future().await
        }
        None => None,
    };

    let performance = match performance_view {
        Some(view) => Some(view.get(&args.symbol).await?),
        None => None,
    };

    Ok(RunOutcome {
        backtest,
        top,
        future,
        performance,
    })
}

fn settle(resolution: Resolution) -> Result<()> {
    match resolution {
        Resolution::Applied => Ok(()),
        Resolution::Failed(err) => Err(err.into()),
        Resolution::Stale => {
            warn!("Response superseded by a newer request");
            bail!("응답이 더 최신 요청으로 대체되었습니다")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(s: &str) -> Configuration {
        s.parse().unwrap()
    }

    #[test]
    fn test_select_configs_dedups_in_order() {
        let args = RunArgs {
            symbol: "SPY".to_string(),
            configs: vec![
                config("current_3months:6months:70_30"),
                config("current_month:2months:80_20"),
                config("current_3months:6months:70_30"),
            ],
            ..Default::default()
        };
        let set = select_configs(&args);
        assert_eq!(
            set.snapshot(),
            vec![
                config("current_3months:6months:70_30"),
                config("current_month:2months:80_20"),
            ]
        );
    }

    #[test]
    fn test_select_all_ignores_explicit_configs() {
        let args = RunArgs {
            symbol: "SPY".to_string(),
            configs: vec![config("current_month:1month:80_20")],
            all: true,
            ..Default::default()
        };
        assert_eq!(select_configs(&args).len(), 16);
    }

    #[test]
    fn test_settle() {
        assert!(settle(Resolution::Applied).is_ok());
        assert!(settle(Resolution::Stale).is_err());
        let err = settle(Resolution::Failed(forecast_core::ForecastError::Computation(
            "boom".into(),
        )))
        .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
