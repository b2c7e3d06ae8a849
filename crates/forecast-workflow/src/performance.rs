//! 모델 성능 뷰.
//!
//! 심볼별 모델 성능 조회 결과를 캐시합니다. 캐시는 두 경로로 무효화됩니다.
//!
//! - 완료 기록: 컨트롤러가 백테스트 결과를 저장하면서 `watch` 채널의 심볼별 완료
//!   순번을 갱신합니다. 조회 시 이 값을 동기적으로 비교하므로, 백테스트 대기가
//!   끝난 직후의 조회는 항상 다시 가져옵니다.
//! - 이벤트: `spawn_listener`가 `BacktestCompleted`를 받아 세대를 올립니다.
//!   수신이 밀리면 모든 심볼을 무효화합니다.
//!
//! 컨트롤러는 이 뷰의 갱신을 기다리지 않습니다.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use forecast_client::ComputationClient;
use forecast_core::{
    ForecastResult, ModelId, ModelPerformanceReport, PredictionsReport, TrainingReport,
    TrainingWindow,
};
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::WorkflowEvent;
use crate::tracker::RequestSeq;

/// 심볼별 마지막으로 저장된 백테스트 순번.
pub type CompletionLog = BTreeMap<String, RequestSeq>;

/// 캐시 항목이 유효한 시점.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    /// 전체 무효화 횟수
    epoch: u64,
    /// 심볼 무효화 횟수
    generation: u64,
    /// 마지막 백테스트 완료 순번
    completed: Option<RequestSeq>,
}

struct CachedReport {
    report: Arc<ModelPerformanceReport>,
    /// 조회를 시작할 때의 시점
    stamp: Stamp,
}

#[derive(Default)]
struct PerformanceCache {
    entries: HashMap<String, CachedReport>,
    generations: HashMap<String, u64>,
    epoch: u64,
}

impl PerformanceCache {
    fn stamp(&self, symbol: &str, completed: Option<RequestSeq>) -> Stamp {
        Stamp {
            epoch: self.epoch,
            generation: self.generations.get(symbol).copied().unwrap_or(0),
            completed,
        }
    }

    fn fresh(&self, symbol: &str, now: Stamp) -> Option<Arc<ModelPerformanceReport>> {
        self.entries
            .get(symbol)
            .filter(|cached| cached.stamp == now)
            .map(|cached| Arc::clone(&cached.report))
    }

    fn bump(&mut self, symbol: &str) {
        *self.generations.entry(symbol.to_string()).or_insert(0) += 1;
    }
}

/// 모델 성능 조회 캐시.
pub struct PerformanceView {
    client: Arc<dyn ComputationClient>,
    cache: RwLock<PerformanceCache>,
    completions: Option<watch::Receiver<CompletionLog>>,
}

impl PerformanceView {
    pub fn new(client: Arc<dyn ComputationClient>) -> Self {
        Self {
            client,
            cache: RwLock::new(PerformanceCache::default()),
            completions: None,
        }
    }

    /// 컨트롤러의 백테스트 완료 기록을 연결합니다.
    pub fn with_completion_log(mut self, completions: watch::Receiver<CompletionLog>) -> Self {
        self.completions = Some(completions);
        self
    }

    fn completed(&self, symbol: &str) -> Option<RequestSeq> {
        self.completions
            .as_ref()
            .and_then(|log| log.borrow().get(symbol).copied())
    }

    /// 심볼의 모델 성능을 반환합니다. 캐시가 없거나 무효화되었으면 다시 조회합니다.
    pub async fn get(&self, symbol: &str) -> ForecastResult<Arc<ModelPerformanceReport>> {
        let stamp = {
            let cache = self.cache.read().await;
            let now = cache.stamp(symbol, self.completed(symbol));
            if let Some(report) = cache.fresh(symbol, now) {
                debug!(symbol, "모델 성능 캐시 적중");
                return Ok(report);
            }
            now
        };

        info!(symbol, "모델 성능 조회");
        let report = Arc::new(self.client.get_model_performance(symbol).await?);

        // 조회 중에 무효화되었다면 이전 시점으로 저장되어 다음 조회에서 다시 가져옴
        self.cache.write().await.entries.insert(
            symbol.to_string(),
            CachedReport {
                report: Arc::clone(&report),
                stamp,
            },
        );

        Ok(report)
    }

    /// 캐시된 값 (무효화 여부와 무관).
    pub async fn cached(&self, symbol: &str) -> Option<Arc<ModelPerformanceReport>> {
        self.cache
            .read()
            .await
            .entries
            .get(symbol)
            .map(|cached| Arc::clone(&cached.report))
    }

    /// 다음 조회 시 다시 가져와야 하는지 확인.
    pub async fn is_stale(&self, symbol: &str) -> bool {
        let cache = self.cache.read().await;
        let now = cache.stamp(symbol, self.completed(symbol));
        cache.fresh(symbol, now).is_none()
    }

    /// 심볼의 캐시를 무효화합니다.
    pub async fn invalidate(&self, symbol: &str) {
        self.cache.write().await.bump(symbol);
        debug!(symbol, "모델 성능 캐시 무효화");
    }

    /// 모든 심볼의 캐시를 무효화합니다. 아직 저장되지 않은 진행 중 조회도 포함됩니다.
    pub async fn invalidate_all(&self) {
        self.cache.write().await.epoch += 1;
        debug!("모델 성능 캐시 전체 무효화");
    }

    /// 워크플로 이벤트를 처리합니다.
    pub async fn handle_event(&self, event: &WorkflowEvent) {
        if let WorkflowEvent::BacktestCompleted { symbol, seq } = event {
            debug!(symbol = %symbol, %seq, "백테스트 완료로 성능 캐시 무효화");
            self.invalidate(symbol).await;
        }
    }

    /// 이벤트 수신 태스크를 시작합니다. 채널이 닫히면 종료됩니다.
    pub fn spawn_listener(
        self: &Arc<Self>,
        mut events: broadcast::Receiver<WorkflowEvent>,
    ) -> JoinHandle<()> {
        let view = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => view.handle_event(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // 놓친 완료 이벤트가 있을 수 있음
                        warn!(skipped = n, "Performance view receiver lagged");
                        view.invalidate_all().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Workflow event channel closed");
                        break;
                    }
                }
            }
        })
    }

    /// 모델을 학습하고 해당 심볼의 성능 캐시를 무효화합니다.
    pub async fn train(
        &self,
        symbol: &str,
        period: &str,
        window: &TrainingWindow,
    ) -> ForecastResult<TrainingReport> {
        let report = self.client.train_models(symbol, period, window).await?;
        self.invalidate(symbol).await;
        Ok(report)
    }

    /// 학습된 모델의 기간별 예측을 조회합니다.
    pub async fn predictions(
        &self,
        symbol: &str,
        model: &ModelId,
    ) -> ForecastResult<PredictionsReport> {
        Ok(self.client.get_predictions(symbol, model).await?)
    }
}
