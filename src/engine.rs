//! 엔진 용도/시험 종류 구분과 소비량 단위.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::estimator::EstimateError;

/// 엔진 용도. 결과 단위가 용도에 따라 달라진다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineType {
    /// 차량용 (거리당 소비량)
    Truck,
    /// 발전기 세트 (시간당 소비량)
    Genset,
}

impl EngineType {
    pub const ALL: [EngineType; 2] = [EngineType::Truck, EngineType::Genset];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineType::Truck => "Truck",
            EngineType::Genset => "Genset",
        }
    }

    /// 해당 용도의 결과 단위.
    pub fn consumption_unit(self) -> ConsumptionUnit {
        match self {
            EngineType::Genset => ConsumptionUnit::LitersPerHour,
            EngineType::Truck => ConsumptionUnit::LitersPerKm,
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineType {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "truck" => Ok(EngineType::Truck),
            "genset" => Ok(EngineType::Genset),
            _ => Err(EstimateError::InvalidInput(format!(
                "unknown engine type: {}",
                s.trim()
            ))),
        }
    }
}

/// 배출가스 시험 구분. 입력으로 받지만 계산에는 쓰이지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Pre,
    Post,
}

impl TestType {
    pub const ALL: [TestType; 2] = [TestType::Pre, TestType::Post];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Pre => "pre",
            TestType::Post => "post",
        }
    }

    /// 폼에 표시하는 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            TestType::Pre => "Pre-emission",
            TestType::Post => "Post-emission",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pre" | "pre-emission" => Ok(TestType::Pre),
            "post" | "post-emission" => Ok(TestType::Post),
            _ => Err(EstimateError::InvalidInput(format!(
                "unknown test type: {}",
                s.trim()
            ))),
        }
    }
}

/// 소비량 결과 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionUnit {
    LitersPerHour,
    LitersPerKm,
}

impl ConsumptionUnit {
    pub fn label(&self) -> &'static str {
        match self {
            ConsumptionUnit::LitersPerHour => "L/h",
            ConsumptionUnit::LitersPerKm => "L/km",
        }
    }
}

impl fmt::Display for ConsumptionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_follows_engine_type() {
        assert_eq!(EngineType::Genset.consumption_unit().label(), "L/h");
        assert_eq!(EngineType::Truck.consumption_unit().label(), "L/km");
    }

    #[test]
    fn test_type_accepts_labels() {
        assert_eq!("Pre-emission".parse::<TestType>().unwrap(), TestType::Pre);
        assert_eq!("POST".parse::<TestType>().unwrap(), TestType::Post);
        assert!("during".parse::<TestType>().is_err());
    }
}
