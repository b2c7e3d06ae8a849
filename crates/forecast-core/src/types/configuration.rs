//! 백테스트 설정(Configuration) 정의.
//!
//! 하나의 백테스트 실행은 다음 세 가지 축으로 정의됩니다:
//! - `TestPeriod` - 최근 데이터 중 테스트(예측 검증)에 사용할 기간
//! - `TrainLookback` - 테스트 기간 이전에 학습에 사용할 기간
//! - `TrainTestSplit` - 학습 데이터의 학습/검증 분할 비율
//!
//! `Configuration`은 불변 값 객체이며 동등성은 세 필드의 구조적 비교로 결정됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 테스트 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TestPeriod {
    /// 최근 1개월 (30일)
    #[serde(rename = "current_month")]
    CurrentMonth,
    /// 최근 3개월 (90일)
    #[serde(rename = "current_3months")]
    Current3Months,
}

impl TestPeriod {
    /// 표시 순서대로 모든 값.
    pub const ALL: [TestPeriod; 2] = [TestPeriod::CurrentMonth, TestPeriod::Current3Months];

    /// 테스트 기간 일수.
    pub fn days(&self) -> u32 {
        match self {
            TestPeriod::CurrentMonth => 30,
            TestPeriod::Current3Months => 90,
        }
    }

    /// 와이어 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestPeriod::CurrentMonth => "current_month",
            TestPeriod::Current3Months => "current_3months",
        }
    }
}

/// 학습 룩백 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrainLookback {
    /// 1개월 (30일)
    #[serde(rename = "1month")]
    OneMonth,
    /// 2개월 (60일)
    #[serde(rename = "2months")]
    TwoMonths,
    /// 3개월 (90일)
    #[serde(rename = "3months")]
    ThreeMonths,
    /// 6개월 (180일)
    #[serde(rename = "6months")]
    SixMonths,
}

impl TrainLookback {
    /// 표시 순서대로 모든 값.
    pub const ALL: [TrainLookback; 4] = [
        TrainLookback::OneMonth,
        TrainLookback::TwoMonths,
        TrainLookback::ThreeMonths,
        TrainLookback::SixMonths,
    ];

    /// 학습 기간 일수.
    pub fn days(&self) -> u32 {
        match self {
            TrainLookback::OneMonth => 30,
            TrainLookback::TwoMonths => 60,
            TrainLookback::ThreeMonths => 90,
            TrainLookback::SixMonths => 180,
        }
    }

    /// 와이어 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainLookback::OneMonth => "1month",
            TrainLookback::TwoMonths => "2months",
            TrainLookback::ThreeMonths => "3months",
            TrainLookback::SixMonths => "6months",
        }
    }
}

/// 학습/검증 분할 비율.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrainTestSplit {
    /// 80/20 분할
    #[serde(rename = "80_20")]
    Split80_20,
    /// 70/30 분할
    #[serde(rename = "70_30")]
    Split70_30,
}

impl TrainTestSplit {
    /// 표시 순서대로 모든 값.
    pub const ALL: [TrainTestSplit; 2] = [TrainTestSplit::Split80_20, TrainTestSplit::Split70_30];

    /// 학습 구간 비율 (0.0 ~ 1.0).
    pub fn train_ratio(&self) -> f64 {
        match self {
            TrainTestSplit::Split80_20 => 0.8,
            TrainTestSplit::Split70_30 => 0.7,
        }
    }

    /// 와이어 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainTestSplit::Split80_20 => "80_20",
            TrainTestSplit::Split70_30 => "70_30",
        }
    }
}

macro_rules! impl_wire_enum {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_lowercase();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| format!("Invalid {}: {}", $what, s))
            }
        }
    };
}

impl_wire_enum!(TestPeriod, "test period");
impl_wire_enum!(TrainLookback, "train lookback");
impl_wire_enum!(TrainTestSplit, "train/test split");

/// 하나의 백테스트 설정.
///
/// 생성 후 변경되지 않으며, 두 설정은 세 필드가 모두 같을 때 동일합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Configuration {
    /// 테스트 기간
    pub test_period: TestPeriod,
    /// 학습 룩백
    pub train_lookback: TrainLookback,
    /// 학습/검증 분할
    pub train_test_split: TrainTestSplit,
}

impl Configuration {
    /// 새 설정을 생성합니다.
    pub const fn new(
        test_period: TestPeriod,
        train_lookback: TrainLookback,
        train_test_split: TrainTestSplit,
    ) -> Self {
        Self {
            test_period,
            train_lookback,
            train_test_split,
        }
    }

    /// 선택 가능한 모든 설정 조합 (2 x 4 x 2 = 16개).
    ///
    /// 테스트 기간 → 룩백 → 분할 순서로 나열합니다.
    pub fn grid() -> Vec<Configuration> {
        let mut grid = Vec::with_capacity(
            TestPeriod::ALL.len() * TrainLookback::ALL.len() * TrainTestSplit::ALL.len(),
        );
        for test_period in TestPeriod::ALL {
            for train_lookback in TrainLookback::ALL {
                for train_test_split in TrainTestSplit::ALL {
                    grid.push(Configuration::new(test_period, train_lookback, train_test_split));
                }
            }
        }
        grid
    }

    /// 비교표에 사용하는 설정 라벨.
    ///
    /// 예: `current_month_train2months_split80_20`
    pub fn label(&self) -> String {
        format!(
            "{}_train{}_split{}",
            self.test_period, self.train_lookback, self.train_test_split
        )
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.test_period, self.train_lookback, self.train_test_split
        )
    }
}

/// `test_period:train_lookback:split` 형식 파싱 (예: `current_month:2months:80_20`).
impl FromStr for Configuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [test_period, lookback, split] => Ok(Configuration::new(
                test_period.parse()?,
                lookback.parse()?,
                split.parse()?,
            )),
            _ => Err(format!(
                "Invalid configuration '{}': expected test_period:train_lookback:split",
                s
            )),
        }
    }
}
