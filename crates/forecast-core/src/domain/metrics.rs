//! 백테스트 정확도 지표.

use serde::{Deserialize, Serialize};

/// 한 (설정 × 모델) 조합의 예측 정확도 지표.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// 평균 제곱근 오차
    pub rmse: f64,
    /// 평균 절대 오차
    pub mae: f64,
    /// 평균 절대 백분율 오차 (%)
    pub mape: f64,
    /// 방향 정확도 (%) - 상승/하락 방향을 맞힌 비율
    pub direction_accuracy: f64,
    /// 평가에 사용된 데이터 포인트 수
    pub total_points: usize,
}

impl AccuracyMetrics {
    /// 다른 지표보다 RMSE가 엄격히 낮은지 확인합니다.
    ///
    /// NaN은 어떤 값보다도 나쁜 것으로 취급합니다.
    pub fn beats(&self, other: &AccuracyMetrics) -> bool {
        match (self.rmse.is_nan(), other.rmse.is_nan()) {
            (false, true) => true,
            (true, _) => false,
            (false, false) => self.rmse < other.rmse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(rmse: f64) -> AccuracyMetrics {
        AccuracyMetrics {
            rmse,
            mae: 0.0,
            mape: 0.0,
            direction_accuracy: 50.0,
            total_points: 30,
        }
    }

    #[test]
    fn test_beats() {
        assert!(metrics(1.0).beats(&metrics(2.0)));
        assert!(!metrics(2.0).beats(&metrics(2.0)));
        assert!(metrics(100.0).beats(&metrics(f64::NAN)));
        assert!(!metrics(f64::NAN).beats(&metrics(100.0)));
    }
}
