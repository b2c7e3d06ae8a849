//! 백테스트 비교 → 미래 예측 워크플로.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - [`ConfigurationSet`]: 중복 없는 설정 선택
//! - [`RequestTracker`]: 연산 종류별 요청 순번과 오래된 응답 판별
//! - [`WorkflowState`]: 순수 상태 기계
//! - [`WorkflowController`]: 원격 호출을 조율하는 비동기 컨트롤러
//! - [`WorkflowEvent`]: broadcast 이벤트
//! - [`PerformanceView`]: 백테스트 완료 기록과 이벤트로 무효화되는 모델 성능 캐시

pub mod controller;
pub mod events;
pub mod performance;
pub mod selection;
pub mod state;
pub mod tracker;

pub use controller::{PendingRequest, WorkflowController, WorkflowSnapshot};
pub use events::WorkflowEvent;
pub use performance::{CompletionLog, PerformanceView};
pub use selection::ConfigurationSet;
pub use state::{
    BacktestRequest, BacktestView, FutureRequest, FutureView, Resolution, Stage, WorkflowState,
};
pub use tracker::{OperationKind, RequestSeq, RequestTracker, Ticket};
