//! 연료 종류와 연료 특성(밀도/탄소 함량) 상수 테이블.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::estimator::EstimateError;

/// 지원하는 연료 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Diesel,
    Petrol,
}

/// 연료별 물성 상수.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelCharacteristics {
    /// 밀도 [kg/L]
    pub density: f64,
    /// 탄소 함량 (질량 분율, 0~1)
    pub carbon_content: f64,
}

impl FuelCharacteristics {
    /// 밀도 × 탄소 함량. 소비량 식의 연료 계수로 쓰인다.
    pub fn fuel_factor(&self) -> f64 {
        self.density * self.carbon_content
    }
}

/// 연료 특성 테이블. 프로그램 수명 동안 변하지 않는다.
pub const FUEL_CHARACTERISTICS: [(FuelType, FuelCharacteristics); 2] = [
    (
        FuelType::Diesel,
        FuelCharacteristics {
            density: 0.832,
            carbon_content: 0.86,
        },
    ),
    (
        FuelType::Petrol,
        FuelCharacteristics {
            density: 0.745,
            carbon_content: 0.85,
        },
    ),
];

impl FuelType {
    pub const ALL: [FuelType; 2] = [FuelType::Diesel, FuelType::Petrol];

    /// 테이블에서 해당 연료의 특성을 찾는다.
    pub fn characteristics(self) -> FuelCharacteristics {
        match self {
            FuelType::Diesel => FUEL_CHARACTERISTICS[0].1,
            FuelType::Petrol => FUEL_CHARACTERISTICS[1].1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Diesel => "Diesel",
            FuelType::Petrol => "Petrol",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diesel" => Ok(FuelType::Diesel),
            "petrol" => Ok(FuelType::Petrol),
            _ => Err(EstimateError::InvalidInput(format!(
                "unknown fuel type: {}",
                s.trim()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_lookup() {
        for (fuel, chars) in FUEL_CHARACTERISTICS {
            assert_eq!(fuel.characteristics(), chars);
        }
    }

    #[test]
    fn diesel_fuel_factor() {
        let f = FuelType::Diesel.characteristics().fuel_factor();
        assert!((f - 0.71552).abs() < 1e-12);
    }

    #[test]
    fn unknown_fuel_is_invalid_input() {
        let err = "Kerosene".parse::<FuelType>().unwrap_err();
        assert!(matches!(err, EstimateError::InvalidInput(_)));
        assert_eq!(" petrol ".parse::<FuelType>().unwrap(), FuelType::Petrol);
    }
}
