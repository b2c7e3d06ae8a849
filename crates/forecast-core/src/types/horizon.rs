//! 미래 예측 기간(Horizon) 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 미래 예측 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    /// 다음 1개월 (30일)
    #[serde(rename = "1month")]
    OneMonth,
    /// 다음 3개월 (90일)
    #[serde(rename = "3months")]
    ThreeMonths,
}

impl Default for Horizon {
    fn default() -> Self {
        Self::OneMonth
    }
}

impl Horizon {
    /// 예측할 일수.
    pub fn days(&self) -> u32 {
        match self {
            Horizon::OneMonth => 30,
            Horizon::ThreeMonths => 90,
        }
    }

    /// 와이어 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::OneMonth => "1month",
            Horizon::ThreeMonths => "3months",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1month" | "1m" | "1_month" => Ok(Horizon::OneMonth),
            "3months" | "3m" | "3_months" => Ok(Horizon::ThreeMonths),
            _ => Err(format!("Invalid horizon: {}", s)),
        }
    }
}
