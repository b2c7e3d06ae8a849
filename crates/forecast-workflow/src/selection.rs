//! 사용자가 선택한 백테스트 설정 집합.

use forecast_core::Configuration;
use serde::{Deserialize, Serialize};

/// 중복 없는 설정 목록 (삽입 순서 유지).
///
/// 두 설정은 세 필드가 모두 같으면 같은 원소로 취급됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationSet {
    items: Vec<Configuration>,
}

impl ConfigurationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 같은 설정이 있으면 제거하고, 없으면 뒤에 추가합니다.
    ///
    /// 추가되었으면 `true`를 반환합니다.
    pub fn toggle(&mut self, config: Configuration) -> bool {
        match self.position(&config) {
            Some(idx) => {
                self.items.remove(idx);
                false
            }
            None => {
                self.items.push(config);
                true
            }
        }
    }

    /// 없을 때만 추가합니다.
    pub fn insert(&mut self, config: Configuration) -> bool {
        if self.contains(&config) {
            return false;
        }
        self.items.push(config);
        true
    }

    /// 있으면 제거합니다.
    pub fn remove(&mut self, config: &Configuration) -> bool {
        match self.position(config) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, config: &Configuration) -> bool {
        self.position(config).is_some()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Configuration> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Configuration] {
        &self.items
    }

    /// 제출용 고정 사본.
    pub fn snapshot(&self) -> Vec<Configuration> {
        self.items.clone()
    }

    fn position(&self, config: &Configuration) -> Option<usize> {
        self.items.iter().position(|c| c == config)
    }
}

impl FromIterator<Configuration> for ConfigurationSet {
    fn from_iter<I: IntoIterator<Item = Configuration>>(iter: I) -> Self {
        let mut set = Self::new();
        for config in iter {
            set.insert(config);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ConfigurationSet {
    type Item = &'a Configuration;
    type IntoIter = std::slice::Iter<'a, Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
