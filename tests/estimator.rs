//! 연료 소비량 추정식 회귀 테스트.
use approx::{assert_relative_eq, relative_eq};
use engine_fuel_estimator::{
    breakdown, estimate, EngineType, EstimateError, FuelType, InputRecord, TestType,
};
use rstest::rstest;

fn genset_diesel() -> InputRecord {
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
fn reference_genset_scenario() {
    let b = breakdown(&genset_diesel()).unwrap();
    assert_relative_eq!(b.emissions_factor, 0.0603, epsilon = 1e-12);
    assert_relative_eq!(b.engine_factor, 300.0, epsilon = 1e-9);
    assert_relative_eq!(b.fuel_factor, 0.71552, epsilon = 1e-12);
    // 0.0603 * 300 * 0.71552
    assert_relative_eq!(b.estimate.value, 12.9437568, epsilon = 1e-9);
    assert_eq!(b.estimate.unit.label(), "L/h");
}

#[test]
fn reference_truck_scenario() {
    let mut input = genset_diesel();
    input.engine_type = EngineType::Truck;
    let est = estimate(&input).unwrap();
    assert_relative_eq!(est.value, 0.129437568, epsilon = 1e-11);
    assert_eq!(est.unit.label(), "L/km");
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let input = genset_diesel();
    let a = estimate(&input).unwrap();
    let b = estimate(&input.clone()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.value.to_bits(), b.value.to_bits());
}

#[rstest]
#[case(FuelType::Diesel)]
#[case(FuelType::Petrol)]
fn truck_is_genset_over_100(#[case] fuel: FuelType) {
    let mut genset = genset_diesel();
    genset.fuel_type = fuel;
    let mut truck = genset.clone();
    truck.engine_type = EngineType::Truck;
    let g = estimate(&genset).unwrap();
    let t = estimate(&truck).unwrap();
    assert_eq!(g.unit.label(), "L/h");
    assert_eq!(t.unit.label(), "L/km");
    assert_relative_eq!(t.value, g.value / 100.0);
}

#[rstest]
#[case::hc(|r: &mut InputRecord| r.hc = 0.0)]
#[case::nox(|r: &mut InputRecord| r.nox = 0.0)]
#[case::co(|r: &mut InputRecord| r.co = 0.0)]
#[case::co2(|r: &mut InputRecord| r.co2 = 0.0)]
fn zeroing_an_emission_never_raises_factor(#[case] zero: fn(&mut InputRecord)) {
    let base = genset_diesel();
    let mut zeroed = base.clone();
    zero(&mut zeroed);
    let before = breakdown(&base).unwrap();
    let after = breakdown(&zeroed).unwrap();
    assert!(after.emissions_factor < before.emissions_factor);
    assert!(after.estimate.value <= before.estimate.value);
}

#[test]
fn zero_emission_at_floor_stays_unchanged() {
    let mut base = genset_diesel();
    base.hc = 0.0;
    let mut again = base.clone();
    again.hc = 0.0;
    assert_eq!(
        breakdown(&base).unwrap().emissions_factor,
        breakdown(&again).unwrap().emissions_factor
    );
}

#[test]
fn fuel_substitution_scales_by_fuel_factor_ratio() {
    let diesel = genset_diesel();
    let mut petrol = diesel.clone();
    petrol.fuel_type = FuelType::Petrol;
    let d = estimate(&diesel).unwrap().value;
    let p = estimate(&petrol).unwrap().value;
    assert!(relative_eq!(
        d / p,
        (0.832 * 0.86) / (0.745 * 0.85),
        max_relative = 1e-12
    ));
}

#[rstest]
#[case(0.0, TestType::Pre)]
#[case(20.9, TestType::Post)]
#[case(100.0, TestType::Post)]
fn o2_and_test_type_do_not_affect_output(#[case] o2: f64, #[case] test_type: TestType) {
    let base = genset_diesel();
    let mut varied = base.clone();
    varied.o2 = o2;
    varied.test_type = test_type;
    assert_eq!(estimate(&base).unwrap(), estimate(&varied).unwrap());
}

#[test]
fn zero_load_gives_zero_consumption() {
    let mut input = genset_diesel();
    input.engine_load = 0.0;
    assert_eq!(estimate(&input).unwrap().value, 0.0);
}

#[test]
fn out_of_contract_record_is_rejected() {
    let mut input = genset_diesel();
    input.co2 = 150.0;
    assert!(estimate(&input).is_err());
    input.co2 = f64::INFINITY;
    assert!(estimate(&input).is_err());
}

#[test]
fn input_record_toml_roundtrip() {
    let src = r#"
hc = 100.0
nox = 200.0
co = 1.0
co2 = 5.0
o2 = 2.0
engine_type = "Truck"
engine_capacity = 50.0
engine_size = 5.0
engine_rpm = 1500.0
engine_load = 80.0
fuel_type = "Petrol"
test_type = "post"
"#;
    let record: InputRecord = toml::from_str(src).unwrap();
    assert_eq!(record.engine_type, EngineType::Truck);
    assert_eq!(record.fuel_type, FuelType::Petrol);
    assert_eq!(record.test_type, TestType::Post);
    let back: InputRecord = toml::from_str(&toml::to_string(&record).unwrap()).unwrap();
    assert_eq!(back, record);
}

#[rstest]
#[case::emissions_overflow_times_zero_load(|r: &mut InputRecord| {
    r.hc = 1e308;
    r.nox = 1e308;
    r.engine_load = 0.0;
})]
#[case::engine_factor_overflow(|r: &mut InputRecord| {
    r.engine_capacity = 1e200;
    r.engine_size = 1e200;
})]
fn non_finite_consumption_is_rejected(#[case] tweak: fn(&mut InputRecord)) {
    let mut input = genset_diesel();
    tweak(&mut input);
    assert!(matches!(
        estimate(&input),
        Err(EstimateError::InvalidInput(_))
    ));
}

#[test]
fn negative_zero_is_out_of_contract() {
    let mut input = genset_diesel();
    input.engine_load = -0.0;
    assert!(estimate(&input).is_err());
}
