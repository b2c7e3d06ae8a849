//! 워크플로 이벤트.
//!
//! 컨트롤러는 단계 전이와 연산 완료를 `tokio::sync::broadcast` 채널로 알립니다.
//! 모델 성능 뷰 같은 외부 구독자는 이 이벤트로 캐시를 무효화합니다.

use forecast_core::Horizon;
use serde::Serialize;

use crate::state::Stage;
use crate::tracker::{OperationKind, RequestSeq};

/// 컨트롤러가 발행하는 이벤트.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// 단계 전이
    StageChanged { from: Stage, to: Stage },
    /// 백테스트 결과가 저장됨
    BacktestCompleted { symbol: String, seq: RequestSeq },
    /// 백테스트 실패 (연산 실패 또는 데이터 형태 위반)
    BacktestFailed {
        symbol: String,
        seq: RequestSeq,
        error: String,
    },
    /// 미래 예측이 저장됨
    FutureReady {
        symbol: String,
        seq: RequestSeq,
        horizon: Horizon,
    },
    /// 미래 예측 실패
    FutureFailed {
        symbol: String,
        seq: RequestSeq,
        error: String,
    },
    /// 대체된 요청의 응답이 버려짐
    StaleResponseDiscarded { kind: OperationKind, seq: RequestSeq },
}

impl WorkflowEvent {
    /// 이벤트가 가리키는 심볼 (있으면).
    pub fn symbol(&self) -> Option<&str> {
        match self {
            WorkflowEvent::BacktestCompleted { symbol, .. }
            | WorkflowEvent::BacktestFailed { symbol, .. }
            | WorkflowEvent::FutureReady { symbol, .. }
            | WorkflowEvent::FutureFailed { symbol, .. } => Some(symbol),
            WorkflowEvent::StageChanged { .. } | WorkflowEvent::StaleResponseDiscarded { .. } => {
                None
            }
        }
    }
}
