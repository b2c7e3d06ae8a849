//! 비동기 워크플로 컨트롤러.
//!
//! 상태 기계(`WorkflowState`)를 `Arc<RwLock<..>>`로 공유하고, 원격 호출은 잠금 밖의
//! 태스크에서 수행합니다. 응답은 요청 순번이 현재일 때만 적용됩니다.
//!
//! 응답 적용과 그에 따른 이벤트 발행은 같은 쓰기 잠금 안에서 일어나므로 구독자는
//! 단계 전이를 일어난 순서대로 받습니다.

use std::sync::Arc;

use forecast_analytics::RankedEntry;
use forecast_client::ComputationClient;
use forecast_core::{
    workflow_span, Configuration, ForecastError, ForecastResult, Horizon, ModelId, WorkflowConfig,
};
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};

use crate::events::WorkflowEvent;
use crate::performance::{CompletionLog, PerformanceView};
use crate::selection::ConfigurationSet;
use crate::state::{BacktestView, FutureView, Resolution, Stage, WorkflowState};
use crate::tracker::{OperationKind, RequestSeq, Ticket};

/// 진행 중인 원격 요청 핸들.
///
/// 핸들을 버려도 요청은 계속 진행되며 응답은 정상적으로 적용됩니다.
#[derive(Debug)]
pub struct PendingRequest {
    ticket: Ticket,
    handle: JoinHandle<Resolution>,
}

impl PendingRequest {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn seq(&self) -> RequestSeq {
        self.ticket.seq
    }

    /// 응답이 적용(또는 폐기)될 때까지 기다립니다.
    ///
    /// 태스크가 패닉하면 에러를 반환하며, 요청은 실패로 정리됩니다.
    pub async fn wait(self) -> ForecastResult<Resolution> {
        self.handle
            .await
            .map_err(|e| ForecastError::Computation(format!("요청 태스크 실패: {}", e)))
    }
}

/// 컨트롤러 상태의 읽기 전용 사본.
#[derive(Debug, Clone)]
pub struct WorkflowSnapshot {
    pub stage: Stage,
    pub selection: Vec<Configuration>,
    pub backtest: Option<Arc<BacktestView>>,
    pub future: Option<Arc<FutureView>>,
    pub last_error: Option<ForecastError>,
    pub backtest_in_flight: Option<RequestSeq>,
    pub future_in_flight: Option<RequestSeq>,
}

/// 백테스트 → 결과 → 미래 예측 워크플로 컨트롤러.
pub struct WorkflowController {
    client: Arc<dyn ComputationClient>,
    state: Arc<RwLock<WorkflowState>>,
    events: broadcast::Sender<WorkflowEvent>,
    completions: Arc<watch::Sender<CompletionLog>>,
    settings: WorkflowConfig,
    seed_model: ModelId,
}

impl WorkflowController {
    /// 새 컨트롤러를 생성합니다.
    pub fn new(client: Arc<dyn ComputationClient>, settings: WorkflowConfig) -> Self {
        let (events, _) = broadcast::channel(settings.event_buffer_size.max(1));
        let seed_model = ModelId::new(settings.seed_model.as_str());
        let (completions, _) = watch::channel(CompletionLog::new());

        Self {
            client,
            state: Arc::new(RwLock::new(WorkflowState::new())),
            events,
            completions: Arc::new(completions),
            settings,
            seed_model,
        }
    }

    /// 이벤트 구독.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &WorkflowConfig {
        &self.settings
    }

    /// 심볼별 백테스트 완료 기록 구독.
    ///
    /// 기록은 `PendingRequest::wait`가 반환되기 전에 갱신됩니다.
    pub fn completion_log(&self) -> watch::Receiver<CompletionLog> {
        self.completions.subscribe()
    }

    /// 이 컨트롤러의 완료 기록과 이벤트를 구독하는 모델 성능 뷰를 생성합니다.
    ///
    /// 수신 태스크를 띄우므로 tokio 런타임 안에서 호출해야 합니다.
    pub fn attach_performance_view(&self) -> Arc<PerformanceView> {
        let view = Arc::new(
            PerformanceView::new(Arc::clone(&self.client))
                .with_completion_log(self.completion_log()),
        );
        view.spawn_listener(self.subscribe());
        view
    }

    // === 조회 ===

    pub async fn stage(&self) -> Stage {
        self.state.read().await.stage()
    }

    pub async fn selection(&self) -> ConfigurationSet {
        self.state.read().await.selection().clone()
    }

    pub async fn backtest(&self) -> Option<Arc<BacktestView>> {
        self.state.read().await.backtest().cloned()
    }

    pub async fn future(&self) -> Option<Arc<FutureView>> {
        self.state.read().await.future().cloned()
    }

    pub async fn last_error(&self) -> Option<ForecastError> {
        self.state.read().await.last_error().cloned()
    }

    /// 순위표 상위 N개 (`WorkflowConfig::top_n`).
    pub async fn top_ranked(&self) -> Vec<RankedEntry> {
        self.backtest()
            .await
            .map(|view| view.ranking.top(self.settings.top_n).to_vec())
            .unwrap_or_default()
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.state.read().await;
        WorkflowSnapshot {
            stage: state.stage(),
            selection: state.selection().snapshot(),
            backtest: state.backtest().cloned(),
            future: state.future().cloned(),
            last_error: state.last_error().cloned(),
            backtest_in_flight: state.in_flight(OperationKind::Backtest),
            future_in_flight: state.in_flight(OperationKind::Future),
        }
    }

    // === 설정 선택 ===

    /// 설정을 토글합니다. 추가되었으면 `true`.
    pub async fn toggle(&self, config: Configuration) -> ForecastResult<bool> {
        let added = self.state.write().await.toggle(config)?;
        debug!(%config, added, "설정 토글");
        Ok(added)
    }

    pub async fn clear_selection(&self) -> ForecastResult<()> {
        self.state.write().await.clear_selection()
    }

    // === 원격 연산 ===

    /// 현재 선택으로 백테스트를 제출합니다.
    ///
    /// 선택이 비어 있으면 `EmptySelection`, 이미 실행 중이면 `Busy`를 반환하며
    /// 어느 경우에도 원격 호출은 일어나지 않습니다.
    pub async fn submit_backtest(&self, symbol: &str) -> ForecastResult<PendingRequest> {
        let request = {
            let mut state = self.state.write().await;
            let from = state.stage();
            let request = state.begin_backtest(symbol)?;
            emit(&self.events, WorkflowEvent::StageChanged {
                from,
                to: state.stage(),
            });
            request
        };

        let ticket = request.ticket;
        info!(
            symbol = %request.symbol,
            seq = %ticket.seq,
            configs = request.configs.len(),
            "백테스트 제출"
        );

        let span = workflow_span!("backtest", request.symbol, ticket.seq.value());
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let completions = Arc::clone(&self.completions);
        let period = self.settings.period.clone();
        let mut abandon = AbandonGuard::new(&self.state, &self.events, ticket, &request.symbol);

        let handle = tokio::spawn(
            async move {
                let outcome = client
                    .run_backtest(&request.symbol, &period, &request.configs)
                    .await
                    .map_err(ForecastError::from);

                let mut state = state.write().await;
                let from = state.stage();
                let resolution = state.resolve_backtest(&request, outcome);
                let to = state.stage();
                abandon.disarm();

                match &resolution {
                    Resolution::Applied => {
                        info!("백테스트 결과 저장");
                        completions.send_modify(|log| {
                            log.insert(request.symbol.clone(), ticket.seq);
                        });
                        emit(&events, WorkflowEvent::StageChanged { from, to });
                        emit(&events, WorkflowEvent::BacktestCompleted {
                            symbol: request.symbol.clone(),
                            seq: ticket.seq,
                        });
                    }
                    Resolution::Failed(err) => {
                        error!(error = %err, "백테스트 실패");
                        emit(&events, WorkflowEvent::StageChanged { from, to });
                        emit(&events, WorkflowEvent::BacktestFailed {
                            symbol: request.symbol.clone(),
                            seq: ticket.seq,
                            error: err.to_string(),
                        });
                    }
                    Resolution::Stale => {
                        warn!("대체된 백테스트 응답 폐기");
                        emit(&events, WorkflowEvent::StaleResponseDiscarded {
                            kind: OperationKind::Backtest,
                            seq: ticket.seq,
                        });
                    }
                }
                drop(state);

                resolution
            }
            .instrument(span),
        );

        Ok(PendingRequest { ticket, handle })
    }

    /// 기준 모델(기본 ensemble)의 최적 설정으로 미래 예측을 요청합니다.
    pub async fn request_future(&self, horizon: Horizon) -> ForecastResult<PendingRequest> {
        let request = {
            let mut state = self.state.write().await;
            let from = state.stage();
            let request = state.begin_future(horizon, &self.seed_model)?;
            emit(&self.events, WorkflowEvent::StageChanged {
                from,
                to: state.stage(),
            });
            request
        };

        let ticket = request.ticket;
        info!(
            symbol = %request.symbol,
            seq = %ticket.seq,
            config = %request.config,
            %horizon,
            "미래 예측 요청"
        );

        let span = workflow_span!("future", request.symbol, ticket.seq.value());
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let period = self.settings.period.clone();
        let mut abandon = AbandonGuard::new(&self.state, &self.events, ticket, &request.symbol);

        let handle = tokio::spawn(
            async move {
                let outcome = client
                    .predict_future(&request.symbol, &period, &request.config, request.horizon)
                    .await
                    .map_err(ForecastError::from);

                let mut state = state.write().await;
                let from = state.stage();
                let resolution = state.resolve_future(&request, outcome);
                let to = state.stage();
                abandon.disarm();

                match &resolution {
                    Resolution::Applied => {
                        info!("미래 예측 저장");
                        emit(&events, WorkflowEvent::StageChanged { from, to });
                        emit(&events, WorkflowEvent::FutureReady {
                            symbol: request.symbol.clone(),
                            seq: ticket.seq,
                            horizon: request.horizon,
                        });
                    }
                    Resolution::Failed(err) => {
                        error!(error = %err, "미래 예측 실패");
                        emit(&events, WorkflowEvent::StageChanged { from, to });
                        emit(&events, WorkflowEvent::FutureFailed {
                            symbol: request.symbol.clone(),
                            seq: ticket.seq,
                            error: err.to_string(),
                        });
                    }
                    Resolution::Stale => {
                        warn!("대체된 미래 예측 응답 폐기");
                        emit(&events, WorkflowEvent::StaleResponseDiscarded {
                            kind: OperationKind::Future,
                            seq: ticket.seq,
                        });
                    }
                }
                drop(state);

                resolution
            }
            .instrument(span),
        );

        Ok(PendingRequest { ticket, handle })
    }

    // === 이동 ===

    /// 한 단계 뒤로 이동합니다. 진행 중인 요청은 대체됩니다.
    pub async fn back(&self) -> ForecastResult<Stage> {
        let mut state = self.state.write().await;
        let from = state.stage();
        let to = state.back()?;
        debug!(%from, %to, "뒤로 이동");
        emit(&self.events, WorkflowEvent::StageChanged { from, to });
        Ok(to)
    }

    /// 저장된 미래 예측 화면으로 이동합니다.
    pub async fn forward(&self) -> ForecastResult<Stage> {
        let mut state = self.state.write().await;
        let from = state.stage();
        let to = state.forward()?;
        emit(&self.events, WorkflowEvent::StageChanged { from, to });
        Ok(to)
    }
}

/// 요청 태스크가 응답을 적용하지 못하고 끝날 때(패닉, 런타임 종료) 요청을 정리합니다.
///
/// 정리하지 않으면 추적기 슬롯이 계속 점유되어 같은 종류의 요청이 `Busy`로 거부됩니다.
struct AbandonGuard {
    state: Arc<RwLock<WorkflowState>>,
    events: broadcast::Sender<WorkflowEvent>,
    ticket: Ticket,
    symbol: String,
    armed: bool,
}

impl AbandonGuard {
    fn new(
        state: &Arc<RwLock<WorkflowState>>,
        events: &broadcast::Sender<WorkflowEvent>,
        ticket: Ticket,
        symbol: &str,
    ) -> Self {
        Self {
            state: Arc::clone(state),
            events: events.clone(),
            ticket,
            symbol: symbol.to_string(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        // Drop 안에서는 기다릴 수 없으므로 잠금이 바쁘면 별도 태스크로 넘김
        if let Ok(mut state) = self.state.try_write() {
            abandon_request(&mut state, &self.events, self.ticket, &self.symbol);
            return;
        }

        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let ticket = self.ticket;
        let symbol = std::mem::take(&mut self.symbol);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    let mut state = state.write().await;
                    abandon_request(&mut state, &events, ticket, &symbol);
                });
            }
            Err(_) => warn!(seq = %ticket.seq, "런타임 없음, 중단된 요청을 정리하지 못함"),
        }
    }
}

fn abandon_request(
    state: &mut WorkflowState,
    events: &broadcast::Sender<WorkflowEvent>,
    ticket: Ticket,
    symbol: &str,
) {
    let from = state.stage();
    let err = ForecastError::Computation("요청 태스크가 응답 없이 종료됨".to_string());
    let Resolution::Failed(err) = state.abandon(ticket, err) else {
        return;
    };

    error!(kind = %ticket.kind, seq = %ticket.seq, "요청 태스크 중단");
    emit(events, WorkflowEvent::StageChanged {
        from,
        to: state.stage(),
    });
    let event = match ticket.kind {
        OperationKind::Backtest => WorkflowEvent::BacktestFailed {
            symbol: symbol.to_string(),
            seq: ticket.seq,
            error: err.to_string(),
        },
        OperationKind::Future => WorkflowEvent::FutureFailed {
            symbol: symbol.to_string(),
            seq: ticket.seq,
            error: err.to_string(),
        },
    };
    emit(events, event);
}

fn emit(events: &broadcast::Sender<WorkflowEvent>, event: WorkflowEvent) {
    // 구독자가 없으면 전송은 실패하지만 상태에는 영향 없음
    if events.send(event).is_err() {
        debug!("이벤트 구독자 없음");
    }
}
