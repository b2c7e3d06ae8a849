//! reqwest 기반 원격 연산 클라이언트.

use std::time::Duration;

use async_trait::async_trait;
use forecast_core::{
    BacktestResultSet, ClientConfig, Configuration, FutureForecast, Horizon, ModelId,
    ModelPerformanceReport, PredictionsReport, TrainingReport, TrainingWindow,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::wire::{BacktestRequest, BacktestResponse, ErrorBody, FuturePredictRequest, TrainRequest};
use crate::{ClientError, ClientResult, ComputationClient};

/// HTTP(JSON) 원격 연산 클라이언트.
#[derive(Debug, Clone)]
pub struct HttpComputationClient {
    base_url: Url,
    client: Client,
}

impl HttpComputationClient {
    /// 설정으로 클라이언트를 생성합니다.
    ///
    /// # Errors
    /// 기본 URL이 잘못되었거나 HTTP 클라이언트 생성에 실패하면 `ClientError::Network`를 반환합니다.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_base_url(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// 기본 URL과 타임아웃을 직접 지정해 생성합니다.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Network(format!("잘못된 기본 URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Network(format!(
                "경로를 붙일 수 없는 URL: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// 기본 URL 반환.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 기본 URL 뒤에 경로 세그먼트를 붙입니다. 세그먼트 안의 `/`는 퍼센트 인코딩됩니다.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        Self::handle_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {:.200}", e, body);
                ClientError::Parse(e.to_string())
            })
        } else {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|err| err.message())
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ComputationClient for HttpComputationClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn run_backtest(
        &self,
        symbol: &str,
        period: &str,
        configs: &[Configuration],
    ) -> ClientResult<BacktestResultSet> {
        if configs.is_empty() {
            return Err(ClientError::EmptySelection);
        }

        info!(symbol, period, configs = configs.len(), "백테스트 요청");
        let response: BacktestResponse = self
            .post_json(
                self.endpoint(&["backtest"]),
                &BacktestRequest {
                    symbol,
                    period,
                    configs,
                },
            )
            .await?;

        if response.symbol != symbol {
            debug!(
                requested = symbol,
                returned = %response.symbol,
                "응답 심볼이 요청과 다름"
            );
        }
        Ok(response.results)
    }

    async fn predict_future(
        &self,
        symbol: &str,
        period: &str,
        config: &Configuration,
        horizon: Horizon,
    ) -> ClientResult<FutureForecast> {
        info!(symbol, %config, %horizon, "미래 예측 요청");
        self.post_json(
            self.endpoint(&["predict-future"]),
            &FuturePredictRequest {
                symbol,
                period,
                best_config: config,
                prediction_horizon: horizon,
            },
        )
        .await
    }

    async fn train_models(
        &self,
        symbol: &str,
        period: &str,
        window: &TrainingWindow,
    ) -> ClientResult<TrainingReport> {
        info!(symbol, period, "모델 학습 요청");
        self.post_json(
            self.endpoint(&["train"]),
            &TrainRequest {
                symbol,
                period,
                window,
            },
        )
        .await
    }

    async fn get_predictions(
        &self,
        symbol: &str,
        model: &ModelId,
    ) -> ClientResult<PredictionsReport> {
        let mut url = self.endpoint(&["predictions", symbol]);
        url.query_pairs_mut().append_pair("model", model.as_str());
        self.get_json(url).await
    }

    async fn get_model_performance(&self, symbol: &str) -> ClientResult<ModelPerformanceReport> {
        self.get_json(self.endpoint(&["models", "performance", symbol]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client =
            HttpComputationClient::with_base_url("http://localhost:8001/api", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            client.endpoint(&["backtest"]).as_str(),
            "http://localhost:8001/api/backtest"
        );
        assert_eq!(
            client.endpoint(&["models", "performance", "BRK/B"]).as_str(),
            "http://localhost:8001/api/models/performance/BRK%2FB"
        );
    }

    #[test]
    fn test_trailing_slash_base() {
        let client =
            HttpComputationClient::with_base_url("http://localhost:8001/api/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            client.endpoint(&["train"]).as_str(),
            "http://localhost:8001/api/train"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpComputationClient::with_base_url("not a url", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
