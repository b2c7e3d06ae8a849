//! 원격 연산 서비스 trait 정의.

use async_trait::async_trait;
use forecast_core::{
    BacktestResultSet, Configuration, FutureForecast, Horizon, ModelId, ModelPerformanceReport,
    PredictionsReport, TrainingReport, TrainingWindow,
};

use crate::ClientResult;

/// 모델 학습/백테스트/예측을 수행하는 외부 서비스 인터페이스.
///
/// 모든 호출은 서버 측 상태 없이 독립적으로 수행되며, 설정 하나당 수십 초가
/// 걸릴 수 있습니다. 같은 종류의 호출을 동시에 두 번 보내지 않는 것은
/// 호출자(워크플로 컨트롤러)의 책임입니다.
#[async_trait]
pub trait ComputationClient: Send + Sync {
    /// 클라이언트 이름 반환.
    fn name(&self) -> &str;

    /// 여러 설정으로 백테스트를 실행합니다.
    ///
    /// 설정 목록이 비어 있으면 요청을 보내지 않고 `ClientError::EmptySelection`을 반환합니다.
    async fn run_backtest(
        &self,
        symbol: &str,
        period: &str,
        configs: &[Configuration],
    ) -> ClientResult<BacktestResultSet>;

    /// 주어진 설정으로 미래 가격을 예측합니다.
    async fn predict_future(
        &self,
        symbol: &str,
        period: &str,
        config: &Configuration,
        horizon: Horizon,
    ) -> ClientResult<FutureForecast>;

    /// 모델을 학습합니다. 비어 있는 날짜 필드는 서비스 기본값을 사용합니다.
    async fn train_models(
        &self,
        symbol: &str,
        period: &str,
        window: &TrainingWindow,
    ) -> ClientResult<TrainingReport>;

    /// 학습된 모델의 기간별 예측을 조회합니다.
    async fn get_predictions(&self, symbol: &str, model: &ModelId)
        -> ClientResult<PredictionsReport>;

    /// 모델 성능 비교를 조회합니다.
    async fn get_model_performance(&self, symbol: &str) -> ClientResult<ModelPerformanceReport>;
}
