//! 연산 종류별 요청 순번 추적.
//!
//! 각 제출은 종류별로 단조 증가하는 순번을 받습니다. 응답은 자신의 순번이 현재 활성
//! 순번과 같을 때만 적용되며, 대체된 요청의 응답은 도착 시 버려집니다.

use serde::Serialize;
use std::fmt;

use forecast_core::{ForecastError, ForecastResult};

/// 비동기 연산 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Backtest,
    Future,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Backtest => f.write_str("backtest"),
            OperationKind::Future => f.write_str("future"),
        }
    }
}

/// 요청 순번 (1부터 시작).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestSeq(u64);

impl RequestSeq {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 발급된 요청 표식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Ticket {
    pub kind: OperationKind,
    pub seq: RequestSeq,
}

#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    issued: u64,
    active: Option<u64>,
}

/// 종류별 순번 발급기.
#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    backtest: Slot,
    future: Slot,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: OperationKind) -> &Slot {
        match kind {
            OperationKind::Backtest => &self.backtest,
            OperationKind::Future => &self.future,
        }
    }

    fn slot_mut(&mut self, kind: OperationKind) -> &mut Slot {
        match kind {
            OperationKind::Backtest => &mut self.backtest,
            OperationKind::Future => &mut self.future,
        }
    }

    /// 새 순번을 발급합니다. 같은 종류의 요청이 진행 중이면 `Busy`를 반환합니다.
    pub fn issue(&mut self, kind: OperationKind) -> ForecastResult<Ticket> {
        let slot = self.slot_mut(kind);
        if slot.active.is_some() {
            return Err(ForecastError::Busy(kind.to_string()));
        }
        slot.issued += 1;
        slot.active = Some(slot.issued);
        Ok(Ticket {
            kind,
            seq: RequestSeq(slot.issued),
        })
    }

    /// 응답을 적용할 수 있는지 확인합니다.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.slot(ticket.kind).active == Some(ticket.seq.0)
    }

    /// 현재 요청이면 완료 처리하고 `true`를 반환합니다. 오래된 요청이면 `false`.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        let slot = self.slot_mut(ticket.kind);
        if slot.active == Some(ticket.seq.0) {
            slot.active = None;
            true
        } else {
            false
        }
    }

    /// 진행 중인 요청을 대체 처리합니다. 이후 도착하는 응답은 버려집니다.
    pub fn supersede(&mut self, kind: OperationKind) -> Option<RequestSeq> {
        self.slot_mut(kind).active.take().map(RequestSeq)
    }

    pub fn in_flight(&self, kind: OperationKind) -> Option<RequestSeq> {
        self.slot(kind).active.map(RequestSeq)
    }

    /// 마지막으로 발급된 순번.
    pub fn latest(&self, kind: OperationKind) -> Option<RequestSeq> {
        match self.slot(kind).issued {
            0 => None,
            n => Some(RequestSeq(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_in_flight_per_kind() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue(OperationKind::Backtest).unwrap();
        assert!(matches!(
            tracker.issue(OperationKind::Backtest),
            Err(ForecastError::Busy(_))
        ));
        // 다른 종류는 독립적
        assert!(tracker.issue(OperationKind::Future).is_ok());

        assert!(tracker.complete(first));
        assert!(!tracker.complete(first));
        let second = tracker.issue(OperationKind::Backtest).unwrap();
        assert_eq!(second.seq.value(), 2);
    }

    #[test]
    fn test_superseded_response_is_stale() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue(OperationKind::Backtest).unwrap();
        assert_eq!(tracker.supersede(OperationKind::Backtest), Some(first.seq));

        let second = tracker.issue(OperationKind::Backtest).unwrap();
        assert!(tracker.complete(second));
        assert!(!tracker.is_current(first));
        assert!(!tracker.complete(first));
        assert_eq!(tracker.latest(OperationKind::Backtest), Some(second.seq));
        assert_eq!(tracker.in_flight(OperationKind::Backtest), None);
    }
}
