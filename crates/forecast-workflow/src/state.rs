//! 워크플로 상태 기계.
//!
//! 비동기 호출과 무관한 순수 전이 로직입니다. 컨트롤러는 이 상태를 잠금 아래에서
//! 갱신하고, 원격 호출은 잠금 밖에서 수행합니다.
//!
//! ```text
//! SelectingConfig ──submit──▶ RunningBacktest ──ok──▶ ViewingResults ──horizon──▶ PredictingFuture
//!        ▲                          │ err/back              ▲  │ back                  │ ok
//!        └──────────────────────────┴───────────────────────┘  │                       ▼
//!                                                              └────────back──── ViewingFuture
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use forecast_analytics::{
    best_per_model, merge_backtest_sample, merge_historical_and_future, rank_by_rmse,
    validate_backtest, ChartPoint, Ranking,
};
use forecast_core::{
    BacktestResultSet, BestConfig, Configuration, ForecastError, ForecastResult, FutureForecast,
    Horizon, ModelId,
};
use serde::Serialize;

use crate::selection::ConfigurationSet;
use crate::tracker::{OperationKind, RequestSeq, RequestTracker, Ticket};

/// 워크플로 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    SelectingConfig,
    RunningBacktest,
    ViewingResults,
    PredictingFuture,
    ViewingFuture,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SelectingConfig => "selecting_config",
            Stage::RunningBacktest => "running_backtest",
            Stage::ViewingResults => "viewing_results",
            Stage::PredictingFuture => "predicting_future",
            Stage::ViewingFuture => "viewing_future",
        }
    }

    /// 원격 응답을 기다리는 단계인지 확인.
    pub fn is_pending(&self) -> bool {
        matches!(self, Stage::RunningBacktest | Stage::PredictingFuture)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 저장된 백테스트 결과와 파생 데이터.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestView {
    pub symbol: String,
    pub seq: RequestSeq,
    /// 제출된 설정 (제출 시점 사본)
    pub configs: Vec<Configuration>,
    pub results: BacktestResultSet,
    pub ranking: Ranking,
    pub best_per_model: BTreeMap<ModelId, BestConfig>,
    /// 첫 번째 설정의 실제값/예측값 미리보기
    pub preview: Vec<ChartPoint>,
}

impl BacktestView {
    fn build(request: &BacktestRequest, results: BacktestResultSet) -> ForecastResult<Self> {
        validate_backtest(&results)?;
        let preview = match results.all_results.first() {
            Some(first) => merge_backtest_sample(first)?,
            None => Vec::new(),
        };

        Ok(Self {
            symbol: request.symbol.clone(),
            seq: request.ticket.seq,
            configs: request.configs.clone(),
            ranking: rank_by_rmse(&results),
            best_per_model: best_per_model(&results),
            results,
            preview,
        })
    }

    /// 모델의 최적 설정.
    pub fn best_for(&self, model: &ModelId) -> Option<&BestConfig> {
        self.best_per_model.get(model)
    }
}

/// 저장된 미래 예측과 병합된 차트 시리즈.
#[derive(Debug, Clone, Serialize)]
pub struct FutureView {
    pub symbol: String,
    pub seq: RequestSeq,
    pub seed_model: ModelId,
    pub config: Configuration,
    pub horizon: Horizon,
    pub forecast: FutureForecast,
    pub chart: Vec<ChartPoint>,
}

/// 진행 중인 백테스트 요청.
#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub ticket: Ticket,
    pub symbol: String,
    pub configs: Vec<Configuration>,
}

/// 진행 중인 미래 예측 요청.
#[derive(Debug, Clone)]
pub struct FutureRequest {
    pub ticket: Ticket,
    pub symbol: String,
    pub seed_model: ModelId,
    pub config: Configuration,
    pub horizon: Horizon,
}

/// 응답 적용 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// 결과가 저장되고 단계가 전이됨
    Applied,
    /// 실패가 기록되고 이전 대화형 단계로 돌아감
    Failed(ForecastError),
    /// 대체된 요청의 응답이라 버려짐
    Stale,
}

/// 워크플로 상태.
#[derive(Debug, Default)]
pub struct WorkflowState {
    stage: Stage,
    selection: ConfigurationSet,
    tracker: RequestTracker,
    backtest: Option<Arc<BacktestView>>,
    future: Option<Arc<FutureView>>,
    last_error: Option<ForecastError>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selection(&self) -> &ConfigurationSet {
        &self.selection
    }

    pub fn backtest(&self) -> Option<&Arc<BacktestView>> {
        self.backtest.as_ref()
    }

    pub fn future(&self) -> Option<&Arc<FutureView>> {
        self.future.as_ref()
    }

    pub fn last_error(&self) -> Option<&ForecastError> {
        self.last_error.as_ref()
    }

    pub fn in_flight(&self, kind: OperationKind) -> Option<RequestSeq> {
        self.tracker.in_flight(kind)
    }

    fn invalid(&self, action: &str) -> ForecastError {
        ForecastError::InvalidTransition {
            stage: self.stage.to_string(),
            action: action.to_string(),
        }
    }

    fn require_selecting(&self, action: &str) -> ForecastResult<()> {
        if self.stage == Stage::SelectingConfig {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    // === 설정 선택 ===

    /// 설정을 토글합니다. 설정 선택 단계에서만 허용됩니다.
    pub fn toggle(&mut self, config: Configuration) -> ForecastResult<bool> {
        self.require_selecting("toggle")?;
        Ok(self.selection.toggle(config))
    }

    /// 선택을 모두 비웁니다.
    pub fn clear_selection(&mut self) -> ForecastResult<()> {
        self.require_selecting("clear")?;
        self.selection.clear();
        Ok(())
    }

    // === 백테스트 ===

    /// 백테스트 제출을 시작합니다.
    ///
    /// 선택이 비어 있으면 원격 호출 없이 `EmptySelection`을 반환합니다.
    pub fn begin_backtest(&mut self, symbol: &str) -> ForecastResult<BacktestRequest> {
        if self.stage == Stage::RunningBacktest {
            return Err(ForecastError::Busy(OperationKind::Backtest.to_string()));
        }
        self.require_selecting("submit_backtest")?;
        if self.selection.is_empty() {
            return Err(ForecastError::EmptySelection);
        }
        if symbol.trim().is_empty() {
            return Err(ForecastError::InvalidInput("empty symbol".to_string()));
        }

        let ticket = self.tracker.issue(OperationKind::Backtest)?;
        self.stage = Stage::RunningBacktest;
        self.last_error = None;

        Ok(BacktestRequest {
            ticket,
            symbol: symbol.to_string(),
            configs: self.selection.snapshot(),
        })
    }

    /// 백테스트 응답을 적용합니다.
    pub fn resolve_backtest(
        &mut self,
        request: &BacktestRequest,
        outcome: ForecastResult<BacktestResultSet>,
    ) -> Resolution {
        if !self.tracker.complete(request.ticket) {
            return Resolution::Stale;
        }

        match outcome.and_then(|results| BacktestView::build(request, results)) {
            Ok(view) => {
                self.backtest = Some(Arc::new(view));
                self.future = None;
                self.stage = Stage::ViewingResults;
                Resolution::Applied
            }
            Err(err) => {
                self.stage = Stage::SelectingConfig;
                self.last_error = Some(err.clone());
                Resolution::Failed(err)
            }
        }
    }

    // === 미래 예측 ===

    /// 미래 예측 요청을 시작합니다.
    ///
    /// 기준 설정은 `seed_model`의 최적 설정이며, 없으면 `MissingSeed`를 반환합니다.
    pub fn begin_future(
        &mut self,
        horizon: Horizon,
        seed_model: &ModelId,
    ) -> ForecastResult<FutureRequest> {
        if self.stage == Stage::PredictingFuture {
            return Err(ForecastError::Busy(OperationKind::Future.to_string()));
        }
        if self.stage != Stage::ViewingResults {
            return Err(self.invalid("predict_future"));
        }

        let backtest = self.backtest.as_ref().ok_or_else(|| self.invalid("predict_future"))?;
        let seed = backtest
            .best_for(seed_model)
            .ok_or_else(|| ForecastError::MissingSeed(seed_model.to_string()))?;
        let config = seed.config;
        let symbol = backtest.symbol.clone();

        let ticket = self.tracker.issue(OperationKind::Future)?;
        self.stage = Stage::PredictingFuture;
        self.last_error = None;

        Ok(FutureRequest {
            ticket,
            symbol,
            seed_model: seed_model.clone(),
            config,
            horizon,
        })
    }

    /// 미래 예측 응답을 적용합니다. 실패해도 이전에 본 결과는 유지됩니다.
    pub fn resolve_future(
        &mut self,
        request: &FutureRequest,
        outcome: ForecastResult<FutureForecast>,
    ) -> Resolution {
        if !self.tracker.complete(request.ticket) {
            return Resolution::Stale;
        }

        let built = outcome.and_then(|forecast| {
            let chart =
                merge_historical_and_future(&forecast.historical_tail, &forecast.future_predictions)?;
            Ok(FutureView {
                symbol: request.symbol.clone(),
                seq: request.ticket.seq,
                seed_model: request.seed_model.clone(),
                config: request.config,
                horizon: request.horizon,
                forecast,
                chart,
            })
        });

        match built {
            Ok(view) => {
                self.future = Some(Arc::new(view));
                self.stage = Stage::ViewingFuture;
                Resolution::Applied
            }
            Err(err) => {
                self.stage = Stage::ViewingResults;
                self.last_error = Some(err.clone());
                Resolution::Failed(err)
            }
        }
    }

    /// 응답 없이 끝난 요청(작업 패닉, 취소)을 실패로 정리합니다.
    ///
    /// 이미 대체되었거나 처리된 요청이면 아무것도 바꾸지 않습니다.
    pub fn abandon(&mut self, ticket: Ticket, err: ForecastError) -> Resolution {
        if !self.tracker.complete(ticket) {
            return Resolution::Stale;
        }

        self.stage = match ticket.kind {
            OperationKind::Backtest => Stage::SelectingConfig,
            OperationKind::Future => Stage::ViewingResults,
        };
        self.last_error = Some(err.clone());
        Resolution::Failed(err)
    }

    // === 이동 ===

    /// 한 단계 뒤로 이동합니다.
    ///
    /// 진행 중인 요청이 있으면 대체 처리되어 그 응답은 도착 시 버려집니다.
    /// 설정 선택 단계로 돌아가면 결과와 미래 예측이 지워지지만 선택은 유지됩니다.
    pub fn back(&mut self) -> ForecastResult<Stage> {
        self.stage = match self.stage {
            Stage::SelectingConfig => return Err(self.invalid("back")),
            Stage::RunningBacktest => {
                self.tracker.supersede(OperationKind::Backtest);
                self.backtest = None;
                self.future = None;
                Stage::SelectingConfig
            }
            Stage::ViewingResults => {
                self.backtest = None;
                self.future = None;
                Stage::SelectingConfig
            }
            Stage::PredictingFuture => {
                self.tracker.supersede(OperationKind::Future);
                Stage::ViewingResults
            }
            Stage::ViewingFuture => Stage::ViewingResults,
        };
        Ok(self.stage)
    }

    /// 저장된 미래 예측 화면으로 다시 이동합니다 (재계산 없음).
    pub fn forward(&mut self) -> ForecastResult<Stage> {
        if self.stage != Stage::ViewingResults || self.future.is_none() {
            return Err(self.invalid("forward"));
        }
        self.stage = Stage::ViewingFuture;
        Ok(self.stage)
    }
}
