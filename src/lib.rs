//! 핵심 계산 로직과 폼 검증을 라이브러리로 분리하여 CLI와 GUI가 함께 쓴다.

pub mod app;
pub mod config;
pub mod engine;
pub mod estimator;
pub mod form;
pub mod fuel;
pub mod i18n;
pub mod ui_cli;

pub use engine::{ConsumptionUnit, EngineType, TestType};
pub use estimator::{breakdown, estimate, ConsumptionBreakdown, Estimate, EstimateError, InputRecord};
pub use form::{format_result, submit, validate, FormErrors, RawForm};
pub use fuel::{FuelCharacteristics, FuelType};
