//! 입력 폼 검증 계층.
//!
//! 사용자가 입력한 문자열을 필드별로 검사해 `InputRecord`를 만들거나,
//! 실패한 필드 목록을 돌려준다. CLI/GUI 모두 이 모듈을 거쳐 추정기를 호출한다.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::engine::{EngineType, TestType};
use crate::estimator::{self, ConsumptionBreakdown, Estimate, EstimateError, InputRecord};
use crate::fuel::FuelType;
use crate::i18n::{self, Translator};

/// 폼 필드 식별자. 선언 순서가 화면 표시 순서다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Hc,
    Nox,
    Co,
    Co2,
    O2,
    EngineType,
    EngineCapacity,
    EngineSize,
    EngineRpm,
    EngineLoad,
    FuelType,
    TestType,
}

/// 필드 값의 형태.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// 숫자 입력. 범위는 양 끝 포함.
    Number { min: f64, max: Option<f64> },
    /// 선택 입력. (값, 표시 라벨)
    Select(&'static [(&'static str, &'static str)]),
}

/// 필드 메타데이터.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    /// 직렬화/CLI 플래그에 쓰는 이름
    pub name: &'static str,
    /// 기본(영문) 라벨
    pub label: &'static str,
    /// i18n 라벨 키
    pub label_key: &'static str,
    pub kind: FieldKind,
}

const PERCENT: FieldKind = FieldKind::Number {
    min: 0.0,
    max: Some(100.0),
};
const NON_NEGATIVE: FieldKind = FieldKind::Number {
    min: 0.0,
    max: None,
};

const ENGINE_TYPE_CHOICES: &[(&str, &str)] = &[("Truck", "Truck"), ("Genset", "Genset")];
const FUEL_TYPE_CHOICES: &[(&str, &str)] = &[("Diesel", "Diesel"), ("Petrol", "Petrol")];
const TEST_TYPE_CHOICES: &[(&str, &str)] = &[("pre", "Pre-emission"), ("post", "Post-emission")];

/// 폼 필드 정의 테이블.
pub static FIELDS: [FieldSpec; 12] = [
    FieldSpec {
        field: Field::Hc,
        name: "hc",
        label: "Hydrocarbons (HC) in PPM",
        label_key: i18n::keys::FIELD_HC,
        kind: NON_NEGATIVE,
    },
    FieldSpec {
        field: Field::Nox,
        name: "nox",
        label: "Nitrogen Oxides (NOx) in PPM",
        label_key: i18n::keys::FIELD_NOX,
        kind: NON_NEGATIVE,
    },
    FieldSpec {
        field: Field::Co,
        name: "co",
        label: "Carbon Monoxide (CO) in %",
        label_key: i18n::keys::FIELD_CO,
        kind: PERCENT,
    },
    FieldSpec {
        field: Field::Co2,
        name: "co2",
        label: "Carbon Dioxide (CO2) in %",
        label_key: i18n::keys::FIELD_CO2,
        kind: PERCENT,
    },
    FieldSpec {
        field: Field::O2,
        name: "o2",
        label: "Oxygen (O2) in %",
        label_key: i18n::keys::FIELD_O2,
        kind: PERCENT,
    },
    FieldSpec {
        field: Field::EngineType,
        name: "engine_type",
        label: "Engine Type",
        label_key: i18n::keys::FIELD_ENGINE_TYPE,
        kind: FieldKind::Select(ENGINE_TYPE_CHOICES),
    },
    FieldSpec {
        field: Field::EngineCapacity,
        name: "engine_capacity",
        label: "Engine Capacity (kW)",
        label_key: i18n::keys::FIELD_ENGINE_CAPACITY,
        kind: NON_NEGATIVE,
    },
    FieldSpec {
        field: Field::EngineSize,
        name: "engine_size",
        label: "Engine Size (L)",
        label_key: i18n::keys::FIELD_ENGINE_SIZE,
        kind: NON_NEGATIVE,
    },
    FieldSpec {
        field: Field::EngineRpm,
        name: "engine_rpm",
        label: "Engine RPM",
        label_key: i18n::keys::FIELD_ENGINE_RPM,
        kind: NON_NEGATIVE,
    },
    FieldSpec {
        field: Field::EngineLoad,
        name: "engine_load",
        label: "Engine Load (%)",
        label_key: i18n::keys::FIELD_ENGINE_LOAD,
        kind: PERCENT,
    },
    FieldSpec {
        field: Field::FuelType,
        name: "fuel_type",
        label: "Fuel Type",
        label_key: i18n::keys::FIELD_FUEL_TYPE,
        kind: FieldKind::Select(FUEL_TYPE_CHOICES),
    },
    FieldSpec {
        field: Field::TestType,
        name: "test_type",
        label: "Test Type",
        label_key: i18n::keys::FIELD_TEST_TYPE,
        kind: FieldKind::Select(TEST_TYPE_CHOICES),
    },
];

impl Field {
    pub fn spec(self) -> &'static FieldSpec {
        // FIELDS는 Field 선언 순서와 같다.
        &FIELDS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 사용자가 입력한 원문 값 모음.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawForm {
    values: BTreeMap<Field, String>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// 빌더 형태의 `set`.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// GUI 텍스트 입력에 바로 연결할 수 있는 가변 참조.
    pub fn entry(&mut self, field: Field) -> &mut String {
        self.values.entry(field).or_default()
    }

    /// 검증된 레코드로부터 폼 값을 채운다. (파일 불러오기 등)
    pub fn from_record(record: &InputRecord) -> Self {
        Self::new()
            .with(Field::Hc, record.hc.to_string())
            .with(Field::Nox, record.nox.to_string())
            .with(Field::Co, record.co.to_string())
            .with(Field::Co2, record.co2.to_string())
            .with(Field::O2, record.o2.to_string())
            .with(Field::EngineType, record.engine_type.as_str())
            .with(Field::EngineCapacity, record.engine_capacity.to_string())
            .with(Field::EngineSize, record.engine_size.to_string())
            .with(Field::EngineRpm, record.engine_rpm.to_string())
            .with(Field::EngineLoad, record.engine_load.to_string())
            .with(Field::FuelType, record.fuel_type.as_str())
            .with(Field::TestType, record.test_type.as_str())
    }
}

/// 필드 오류 종류.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldErrorKind {
    /// 값이 비어 있음
    Required,
    /// 숫자로 해석할 수 없음
    NotANumber,
    /// 허용 범위 밖
    OutOfRange { min: f64, max: Option<f64> },
    /// 선택지에 없는 값
    InvalidChoice,
}

/// 단일 필드 검증 오류.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {kind}")]
pub struct FieldError {
    pub field: Field,
    pub kind: FieldErrorKind,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldErrorKind::Required => f.write_str("This field is required."),
            FieldErrorKind::NotANumber => f.write_str("Not a valid float value."),
            FieldErrorKind::OutOfRange { min, max: None } => {
                write!(f, "Number must be at least {min}.")
            }
            FieldErrorKind::OutOfRange {
                min,
                max: Some(max),
            } => write!(f, "Number must be between {min} and {max}."),
            FieldErrorKind::InvalidChoice => f.write_str("Not a valid choice."),
        }
    }
}

impl FieldError {
    /// 번역된 오류 메시지.
    pub fn message(&self, tr: &Translator) -> String {
        use i18n::keys::*;
        match &self.kind {
            FieldErrorKind::Required => tr.t(ERROR_FIELD_REQUIRED),
            FieldErrorKind::NotANumber => tr.t(ERROR_FIELD_NOT_A_NUMBER),
            FieldErrorKind::OutOfRange { min, max: None } => {
                i18n::fill(&tr.t(ERROR_FIELD_AT_LEAST), &[("min", min.to_string())])
            }
            FieldErrorKind::OutOfRange {
                min,
                max: Some(max),
            } => i18n::fill(
                &tr.t(ERROR_FIELD_BETWEEN),
                &[("min", min.to_string()), ("max", max.to_string())],
            ),
            FieldErrorKind::InvalidChoice => tr.t(ERROR_FIELD_INVALID_CHOICE),
        }
    }
}

/// 폼 전체 검증 실패. 실패한 모든 필드를 담는다.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} invalid field(s): {}", .0.len(), summarize(.0))]
pub struct FormErrors(pub Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormErrors {
    /// 특정 필드의 오류를 찾는다.
    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

/// 제출 실패.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// 필드 검증 실패
    #[error(transparent)]
    Invalid(#[from] FormErrors),
    /// 추정기 전제 조건 위반
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

/// 검증에 성공한 제출 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub record: InputRecord,
    pub breakdown: ConsumptionBreakdown,
    /// 화면 표시용 결과 문자열
    pub message: String,
}

struct Collector<'a> {
    raw: &'a RawForm,
    errors: Vec<FieldError>,
}

impl<'a> Collector<'a> {
    fn fail(&mut self, field: Field, kind: FieldErrorKind) {
        self.errors.push(FieldError { field, kind });
    }

    fn text(&mut self, field: Field) -> Option<&'a str> {
        match self.raw.get(field).map(str::trim) {
            Some(s) if !s.is_empty() => Some(s),
            _ => {
                self.fail(field, FieldErrorKind::Required);
                None
            }
        }
    }

    fn number(&mut self, field: Field) -> Option<f64> {
        let text = self.text(field)?;
        let value = match text.parse::<f64>() {
            // "-0"은 0으로 정규화
            Ok(v) if v == 0.0 => 0.0,
            Ok(v) if v.is_finite() => v,
            _ => {
                self.fail(field, FieldErrorKind::NotANumber);
                return None;
            }
        };
        if let FieldKind::Number { min, max } = field.spec().kind {
            if value < min || max.is_some_and(|m| value > m) {
                self.fail(field, FieldErrorKind::OutOfRange { min, max });
                return None;
            }
        }
        Some(value)
    }

    fn choice<T: std::str::FromStr>(&mut self, field: Field) -> Option<T> {
        let text = self.text(field)?;
        match text.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                self.fail(field, FieldErrorKind::InvalidChoice);
                None
            }
        }
    }
}

/// 폼을 검증해 `InputRecord`를 만든다. 실패한 필드는 모두 수집한다.
pub fn validate(raw: &RawForm) -> Result<InputRecord, FormErrors> {
    let mut c = Collector {
        raw,
        errors: Vec::new(),
    };
    let hc = c.number(Field::Hc);
    let nox = c.number(Field::Nox);
    let co = c.number(Field::Co);
    let co2 = c.number(Field::Co2);
    let o2 = c.number(Field::O2);
    let engine_type = c.choice::<EngineType>(Field::EngineType);
    let engine_capacity = c.number(Field::EngineCapacity);
    let engine_size = c.number(Field::EngineSize);
    let engine_rpm = c.number(Field::EngineRpm);
    let engine_load = c.number(Field::EngineLoad);
    let fuel_type = c.choice::<FuelType>(Field::FuelType);
    let test_type = c.choice::<TestType>(Field::TestType);

    match (
        hc,
        nox,
        co,
        co2,
        o2,
        engine_type,
        engine_capacity,
        engine_size,
        engine_rpm,
        engine_load,
        fuel_type,
        test_type,
    ) {
        (
            Some(hc),
            Some(nox),
            Some(co),
            Some(co2),
            Some(o2),
            Some(engine_type),
            Some(engine_capacity),
            Some(engine_size),
            Some(engine_rpm),
            Some(engine_load),
            Some(fuel_type),
            Some(test_type),
        ) if c.errors.is_empty() => Ok(InputRecord {
            hc,
            nox,
            co,
            co2,
            o2,
            engine_type,
            engine_capacity,
            engine_size,
            engine_rpm,
            engine_load,
            fuel_type,
            test_type,
        }),
        _ => {
            log::debug!("form rejected with {} error(s)", c.errors.len());
            Err(FormErrors(c.errors))
        }
    }
}

/// 결과 문자열: `Fuel consumption: {값:.2} {단위}`
pub fn format_result(estimate: &Estimate) -> String {
    format!("Fuel consumption: {:.2} {}", estimate.value, estimate.unit)
}

/// 검증 → 추정 → 결과 문자열 생성을 한 번에 수행한다.
pub fn submit(raw: &RawForm) -> Result<Submission, SubmitError> {
    let record = validate(raw)?;
    let breakdown = estimator::breakdown(&record)?;
    let message = format_result(&breakdown.estimate);
    log::info!("{message}");
    Ok(Submission {
        record,
        breakdown,
        message,
    })
}
