//! 피처 계산기 집합.
//!
//! 구체적인 지표 구현은 이 크레이트 밖에 있습니다. 엔진은 이름 붙은
//! `FeatureCalculator` 집합만 알고, 각 이벤트를 전달한 뒤 의사결정
//! 시점에 피처 벡터를 수집합니다.

use std::collections::HashMap;

use replay_core::{FeatureCalculator, MarketEvent};

/// 의사결정 엔진이 기대하는 표준 피처 키.
pub const FEATURE_KEYS: [&str; 10] = [
    "price",
    "obi",
    "obi_velocity",
    "microprice",
    "microprice_pressure",
    "signed_volume",
    "vpin",
    "spread_bps",
    "total_depth",
    "depth_imbalance",
];

/// 이름 붙은 피처 계산기 집합.
///
/// 등록 순서를 유지합니다 (수집된 벡터의 키는 HashMap이므로 순서와
/// 무관하지만, 로그 출력의 안정성을 위해).
pub struct FeatureSet {
    calculators: Vec<(String, Box<dyn FeatureCalculator>)>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self {
            calculators: Vec::new(),
        }
    }

    /// 계산기 등록.
    pub fn with_calculator(
        mut self,
        name: impl Into<String>,
        calculator: Box<dyn FeatureCalculator>,
    ) -> Self {
        self.calculators.push((name.into(), calculator));
        self
    }

    /// 등록된 계산기 수.
    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    /// 모든 계산기에 이벤트 전달.
    pub fn update(&mut self, event: &MarketEvent) {
        for (_, calculator) in &mut self.calculators {
            calculator.update(event);
        }
    }

    /// 피처 벡터 수집.
    ///
    /// 계산기 하나라도 아직 값이 없으면 (`None`) 전체 수집을 포기합니다.
    /// 부분 벡터로 의사결정을 내리지 않기 위함입니다.
    pub fn collect(&self) -> Option<HashMap<String, f64>> {
        let mut features = HashMap::with_capacity(self.calculators.len());
        for (name, calculator) in &self.calculators {
            features.insert(name.clone(), calculator.current_value()?);
        }
        Some(features)
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new()
    }
}
