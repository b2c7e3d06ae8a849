//! 모델 식별자.
//!
//! 모델 집합(ensemble, lstm, random_forest, xgboost, prophet 등)은 외부 연산 서비스가
//! 결정하므로 열거형 대신 문자열 기반 식별자를 사용합니다.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// 모델 이름.
///
/// 역직렬화도 [`ModelId::new`]를 거치므로 `"randomForest"`와 `"random_forest"`처럼
/// 대소문자만 다른 이름은 같은 식별자가 됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModelId(String);

/// 모델별 값. 서비스가 나열한 모델 순서를 유지합니다.
pub type ModelMap<V> = IndexMap<ModelId, V>;

impl ModelId {
    /// 앙상블 모델 이름
    pub const ENSEMBLE: &'static str = "ensemble";

    /// 새 모델 식별자를 생성합니다. 이름은 소문자로 정규화됩니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_lowercase())
    }

    /// 앙상블 모델 식별자.
    pub fn ensemble() -> Self {
        Self(Self::ENSEMBLE.to_string())
    }

    /// 문자열 참조 반환.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 앙상블 모델인지 확인합니다.
    pub fn is_ensemble(&self) -> bool {
        self.0 == Self::ENSEMBLE
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ModelId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

impl Borrow<str> for ModelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_normalized() {
        assert_eq!(ModelId::new(" XGBoost "), ModelId::new("xgboost"));
        assert!(ModelId::from("Ensemble").is_ensemble());
    }

    #[test]
    fn test_deserialize_normalizes_like_new() {
        let id: ModelId = serde_json::from_str("\" RandomForest \"").unwrap();
        assert_eq!(id, ModelId::new("randomforest"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"randomforest\"");

        let map: ModelMap<u32> = serde_json::from_str(r#"{"XGBoost": 1, "Ensemble": 2}"#).unwrap();
        assert_eq!(map.get("xgboost"), Some(&1));
        assert!(map.keys().nth(1).is_some_and(ModelId::is_ensemble));
    }
}
