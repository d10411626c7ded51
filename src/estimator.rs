//! 배출가스 측정값과 엔진 운전 조건으로 연료 소비량을 추정한다.
//!
//! 소비량 = 배출 계수 × 엔진 계수 × 연료 계수
//! - 배출 계수 = (HC + NOx)/1e6 + CO/100 + CO2/100
//! - 엔진 계수 = 용량 × 배기량 × (RPM/1000) × (부하/100)
//! - 연료 계수 = 밀도 × 탄소 함량
//!
//! Genset은 L/h 그대로, Truck은 평균 100 km/h 가정으로 /100 하여 L/km로 표시한다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{ConsumptionUnit, EngineType, TestType};
use crate::fuel::FuelType;

/// 추정기 입력. 폼 검증을 통과한 값이 들어온다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// 탄화수소 [ppm]
    pub hc: f64,
    /// 질소산화물 [ppm]
    pub nox: f64,
    /// 일산화탄소 [%]
    pub co: f64,
    /// 이산화탄소 [%]
    pub co2: f64,
    /// 산소 [%] (계산에 쓰이지 않음)
    pub o2: f64,
    pub engine_type: EngineType,
    /// 엔진 정격 용량 [kW]
    pub engine_capacity: f64,
    /// 배기량 [L]
    pub engine_size: f64,
    pub engine_rpm: f64,
    /// 엔진 부하 [%]
    pub engine_load: f64,
    pub fuel_type: FuelType,
    /// 시험 구분 (계산에 쓰이지 않음)
    pub test_type: TestType,
}

/// 추정 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// 소비량 [L/h 또는 L/km]
    pub value: f64,
    pub unit: ConsumptionUnit,
}

/// 중간 계수까지 포함한 계산 내역.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionBreakdown {
    pub emissions_factor: f64,
    pub engine_factor: f64,
    pub fuel_factor: f64,
    /// 단위 환산 전 소비량
    pub consumption: f64,
    pub estimate: Estimate,
}

/// 계약 범위를 벗어난 입력으로 호출되었을 때의 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Truck 결과를 L/km로 환산할 때 쓰는 평균 속도 [km/h].
const TRUCK_AVERAGE_SPEED_KM_PER_H: f64 = 100.0;

/// 연료 소비량을 추정한다.
pub fn estimate(input: &InputRecord) -> Result<Estimate, EstimateError> {
    Ok(breakdown(input)?.estimate)
}

/// 중간 계수를 포함한 계산 내역을 반환한다.
pub fn breakdown(input: &InputRecord) -> Result<ConsumptionBreakdown, EstimateError> {
    check_preconditions(input)?;

    let emissions_factor =
        (input.hc + input.nox) / 1_000_000.0 + input.co / 100.0 + input.co2 / 100.0;
    let engine_factor = input.engine_capacity
        * input.engine_size
        * (input.engine_rpm / 1000.0)
        * (input.engine_load / 100.0);
    let fuel_factor = input.fuel_type.characteristics().fuel_factor();

    let consumption = emissions_factor * engine_factor * fuel_factor;
    if !consumption.is_finite() {
        return Err(EstimateError::InvalidInput(format!(
            "consumption overflowed (emissions={emissions_factor}, engine={engine_factor})"
        )));
    }

    let value = match input.engine_type {
        EngineType::Genset => consumption,
        EngineType::Truck => consumption / TRUCK_AVERAGE_SPEED_KM_PER_H,
    };
    let estimate = Estimate {
        value,
        unit: input.engine_type.consumption_unit(),
    };
    log::debug!(
        "estimate: ef={emissions_factor} eng={engine_factor} fuel={fuel_factor} -> {value} {}",
        estimate.unit
    );

    Ok(ConsumptionBreakdown {
        emissions_factor,
        engine_factor,
        fuel_factor,
        consumption,
        estimate,
    })
}

fn check_preconditions(input: &InputRecord) -> Result<(), EstimateError> {
    let checks: [(&str, f64, Option<f64>); 9] = [
        ("hc", input.hc, None),
        ("nox", input.nox, None),
        ("co", input.co, Some(100.0)),
        ("co2", input.co2, Some(100.0)),
        ("o2", input.o2, Some(100.0)),
        ("engine_capacity", input.engine_capacity, None),
        ("engine_size", input.engine_size, None),
        ("engine_rpm", input.engine_rpm, None),
        ("engine_load", input.engine_load, Some(100.0)),
    ];
    for (name, value, max) in checks {
        if !value.is_finite() {
            return Err(EstimateError::InvalidInput(format!(
                "{name} must be a finite number"
            )));
        }
        // -0.0도 음수로 본다.
        if value.is_sign_negative() || max.is_some_and(|m| value > m) {
            return Err(EstimateError::InvalidInput(format!(
                "{name}={value} is out of range"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InputRecord {
        InputRecord {
            hc: 100.0,
            nox: 200.0,
            co: 1.0,
            co2: 5.0,
            o2: 2.0,
            engine_type: EngineType::Genset,
            engine_capacity: 50.0,
            engine_size: 5.0,
            engine_rpm: 1500.0,
            engine_load: 80.0,
            fuel_type: FuelType::Diesel,
            test_type: TestType::Pre,
        }
    }

    #[test]
    fn breakdown_factors() {
        let b = breakdown(&sample()).unwrap();
        assert!((b.emissions_factor - 0.0603).abs() < 1e-12);
        assert!((b.engine_factor - 300.0).abs() < 1e-9);
        assert!((b.fuel_factor - 0.71552).abs() < 1e-12);
        assert_eq!(b.estimate.value, b.consumption);
    }

    #[test]
    fn negative_value_rejected() {
        let mut input = sample();
        input.hc = -1.0;
        assert!(estimate(&input).is_err());
    }

    #[test]
    fn percent_above_100_rejected() {
        let mut input = sample();
        input.engine_load = 100.5;
        assert!(estimate(&input).is_err());
    }

    #[test]
    fn negative_zero_rejected() {
        let mut input = sample();
        input.engine_load = -0.0;
        assert!(estimate(&input).is_err());
    }

    #[test]
    fn nan_rejected() {
        let mut input = sample();
        input.engine_rpm = f64::NAN;
        assert!(matches!(
            estimate(&input),
            Err(EstimateError::InvalidInput(_))
        ));
    }
}
