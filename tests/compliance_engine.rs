//! 엔진 기준 시나리오 회귀 테스트. 손계산 값과 비교한다.
use bs7671_calc::{
    cable::{CableSpec, CableTable, CableType, CrossSection, DeratingFactors, RxConvention},
    compliance::{
        evaluate, ChecksEnabled, CircuitInput, ImpedanceOverride, ImpedanceSource, MissingData,
        UsageCategory, ValidationError, ValidationKind, DEFAULT_ZE_OHM,
    },
    protection::{DeviceKind, FuseStandard, McbCurve, ZsLimitTable},
};

fn assert_close(label: &str, actual: f64, expected: f64, abs_tol: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= abs_tol,
        "{label} expected {expected:.6} got {actual:.6} (diff {diff:.6}, tol {abs_tol})"
    );
}

fn size(mm2: f64) -> CrossSection {
    CrossSection::from_mm2(mm2).expect("valid size")
}

/// 2.5 mm² T&E, 20 m, 10 A, pf 0.9, MCB B
fn twin_and_earth_circuit() -> CircuitInput {
    CircuitInput {
        design_current_a: 10.0,
        tabulated_capacity_a: 27.0,
        supply_voltage_v: 230.0,
        length_m: 20.0,
        power_factor: 0.9,
        usage: UsageCategory::General,
        cable_type: CableType::PvcTwinAndEarth,
        cross_section: size(2.5),
        derating: DeratingFactors::default(),
        impedance_override: None,
        device: Some(DeviceKind::Mcb(McbCurve::B)),
        ze_ohm: DEFAULT_ZE_OHM,
    }
}

fn builtin() -> (CableTable, ZsLimitTable) {
    (CableTable::builtin(), ZsLimitTable::builtin())
}

fn only_voltage_drop() -> ChecksEnabled {
    ChecksEnabled {
        thermal: false,
        voltage_drop: true,
        device: false,
        zs: false,
    }
}

#[test]
fn derated_capacity_scenario() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.tabulated_capacity_a = 16.0;
    input.derating = DeratingFactors::new(0.94, 0.85, 1.0);
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("evaluate");
    assert_close("Cd", res.derating.total_derating_factor, 0.799, 1e-9);
    let thermal = res.thermal.expect("thermal evaluated");
    assert_close("Iz'", thermal.corrected_capacity_iz_cd, 12.784, 1e-9);
    assert!(thermal.thermal_pass);
    assert_close("It", res.derating.required_tabulated_capacity_a, 10.0 / 0.799, 1e-9);
}

#[test]
fn thermal_fails_when_corrected_capacity_below_ib() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.design_current_a = 13.0;
    input.tabulated_capacity_a = 16.0;
    input.derating = DeratingFactors::new(0.94, 0.85, 1.0);
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("evaluate");
    assert!(!res.thermal.expect("thermal").thermal_pass);
    assert!(!res.overall_pass);
}

#[test]
fn voltage_drop_per_conductor_table() {
    let (cables, zs) = builtin();
    let input = twin_and_earth_circuit();
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("evaluate");
    assert_eq!(res.convention_multiplier, 2.0);
    assert_eq!(res.impedance.source, ImpedanceSource::Table);
    let vd = res.voltage_drop.expect("vd");
    assert_close("Vd", vd.voltage_drop_v, 2.68, 0.005);
    assert_close("Vd%", vd.voltage_drop_percent, 1.17, 0.005);
    assert_eq!(vd.voltage_drop_limit_percent, 5.0);
    assert!(vd.voltage_drop_pass);
}

#[test]
fn loop_table_halves_the_drop() {
    let (per_conductor, zs) = builtin();
    let loop_table = CableTable::new(RxConvention::Loop).with_entry(CableSpec::from_milliohms(
        CableType::PvcTwinAndEarth,
        size(2.5),
        7.41,
        0.08,
        Some(19.51),
    ));
    let input = twin_and_earth_circuit();
    let a = evaluate(&input, &per_conductor, &zs, only_voltage_drop()).expect("per conductor");
    let b = evaluate(&input, &loop_table, &zs, only_voltage_drop()).expect("loop");
    assert_eq!(b.convention_multiplier, 1.0);
    let vd_a = a.voltage_drop.expect("vd").voltage_drop_v;
    let vd_b = b.voltage_drop.expect("vd").voltage_drop_v;
    assert_close("loop Vd", vd_b, vd_a / 2.0, 1e-12);
}

fn boundary_case(length_m: f64) -> (CircuitInput, CableTable) {
    let table = CableTable::new(RxConvention::Loop);
    let input = CircuitInput {
        design_current_a: 8.0,
        supply_voltage_v: 100.0,
        length_m,
        power_factor: 1.0,
        impedance_override: Some(ImpedanceOverride {
            resistance_mohm_per_m: Some(62.5),
            reactance_mohm_per_m: Some(0.0),
        }),
        device: None,
        ..twin_and_earth_circuit()
    };
    (input, table)
}

#[test]
fn exactly_five_percent_passes() {
    let (input, table) = boundary_case(10.0);
    let res = evaluate(&input, &table, &ZsLimitTable::new(), ChecksEnabled::default())
        .expect("override needs no table entry");
    assert_eq!(res.impedance.source, ImpedanceSource::Override);
    let vd = res.voltage_drop.expect("vd");
    assert_eq!(vd.voltage_drop_percent, 5.0);
    assert!(vd.voltage_drop_pass);
    assert!(res.overall_pass);
}

#[test]
fn just_over_five_percent_fails() {
    let (input, table) = boundary_case(10.5);
    let res = evaluate(&input, &table, &ZsLimitTable::new(), ChecksEnabled::default())
        .expect("evaluate");
    let vd = res.voltage_drop.expect("vd");
    assert_close("Vd%", vd.voltage_drop_percent, 5.25, 1e-9);
    assert!(!vd.voltage_drop_pass);
    assert!(!res.overall_pass);
}

#[test]
fn lighting_uses_three_percent() {
    let (mut input, table) = boundary_case(7.0);
    input.usage = UsageCategory::Lighting;
    let res = evaluate(&input, &table, &ZsLimitTable::new(), only_voltage_drop()).expect("evaluate");
    let vd = res.voltage_drop.expect("vd");
    assert_eq!(vd.voltage_drop_limit_percent, 3.0);
    assert!(!vd.voltage_drop_pass);
}

#[test]
fn partial_override_mixes_with_table() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.impedance_override = Some(ImpedanceOverride {
        resistance_mohm_per_m: Some(10.0),
        reactance_mohm_per_m: None,
    });
    let res = evaluate(&input, &cables, &zs, only_voltage_drop()).expect("evaluate");
    assert_eq!(res.impedance.source, ImpedanceSource::Mixed);
    assert_close("r", res.impedance.resistance_ohm_per_m, 0.010, 1e-12);
    assert_close("x", res.impedance.reactance_ohm_per_m, 0.000_08, 1e-12);
}

#[test]
fn mcb_selection_scenarios() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();

    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("Ib 10");
    let dev = res.device.expect("device");
    assert_eq!(dev.device.nominal_rating_a, 10.0);
    assert!(dev.device_pass);

    input.design_current_a = 17.0;
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("Ib 17");
    assert_eq!(res.device.expect("device").device.nominal_rating_a, 20.0);

    // 카탈로그 최대값보다 큰 Ib: 최대 정격으로 실패 판정
    input.design_current_a = 130.0;
    input.tabulated_capacity_a = 200.0;
    input.cross_section = size(16.0);
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("Ib 130");
    let dev = res.device.expect("device");
    assert_eq!(dev.device.nominal_rating_a, 125.0);
    assert!(dev.device.is_undersized(130.0));
    assert!(!dev.device_pass);
    assert!(!res.overall_pass);
}

#[test]
fn device_must_not_exceed_corrected_capacity() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.design_current_a = 17.0;
    input.tabulated_capacity_a = 19.0;
    input.derating = DeratingFactors::new(1.0, 1.0, 0.88);
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("evaluate");
    // 20 A > 19 × 0.88 = 16.72 A
    assert!(!res.device.expect("device").device_pass);
}

#[test]
fn semi_enclosed_fuse_effective_rating() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.design_current_a = 12.0;
    input.device = Some(DeviceKind::Fuse(FuseStandard::Bs3036));
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("evaluate");
    let dev = res.device.expect("device");
    assert_eq!(dev.device.nominal_rating_a, 15.0);
    assert_close("eff", dev.device_effective_rating, 10.875, 1e-9);
    assert!(!dev.device_pass);
}

#[test]
fn zs_scenario() {
    let (cables, zs) = builtin();
    let input = twin_and_earth_circuit();
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("evaluate");
    let z = res.zs.expect("zs");
    assert_close("Zs", z.zs_calculated, 0.35 + 0.019_51 * 20.0, 1e-9);
    assert_close("Zs limit", z.zs_limit, 4.37, 1e-9);
    assert!(z.zs_pass);
    assert!(res.overall_pass);
}

#[test]
fn long_run_fails_zs_only() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.device = Some(DeviceKind::Mcb(McbCurve::D));
    input.length_m = 40.0;
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("evaluate");
    // 0.35 + 0.01951 × 40 = 1.13 Ω > 1.09 Ω
    assert!(!res.zs.expect("zs").zs_pass);
    assert!(res.thermal.expect("thermal").thermal_pass);
    assert!(!res.overall_pass);
}

#[test]
fn unknown_cable_is_missing_reference_data() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.cable_type = CableType::XlpeSwaSingleCore;
    input.cross_section = size(1.5);
    let err = evaluate(&input, &cables, &zs, ChecksEnabled::default()).unwrap_err();
    assert_eq!(err.kind(), ValidationKind::MissingReferenceData);
    assert_eq!(
        err,
        ValidationError::MissingReferenceData(MissingData::Cable {
            cable_type: CableType::XlpeSwaSingleCore,
            size: size(1.5),
        })
    );
}

#[test]
fn zs_needs_cpc_resistance() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.cable_type = CableType::XlpeSwaSingleCore;
    input.cross_section = size(50.0);
    input.design_current_a = 100.0;
    input.tabulated_capacity_a = 200.0;
    let err = evaluate(&input, &cables, &zs, ChecksEnabled::default()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::MissingReferenceData(MissingData::CpcResistance { .. })
    ));

    let checks = ChecksEnabled {
        zs: false,
        ..ChecksEnabled::default()
    };
    let res = evaluate(&input, &cables, &zs, checks).expect("without Zs");
    assert!(res.zs.is_none());
    assert!(res.device.is_some());
}

#[test]
fn out_of_range_inputs_are_rejected() {
    let (cables, zs) = builtin();
    let cases: [(&str, fn(&mut CircuitInput)); 8] = [
        ("pf zero", |i: &mut CircuitInput| i.power_factor = 0.0),
        ("pf above one", |i: &mut CircuitInput| i.power_factor = 1.01),
        ("negative length", |i: &mut CircuitInput| i.length_m = -1.0),
        ("zero current", |i: &mut CircuitInput| i.design_current_a = 0.0),
        ("zero voltage", |i: &mut CircuitInput| i.supply_voltage_v = 0.0),
        ("factor above one", |i: &mut CircuitInput| i.derating.grouping = 1.2),
        ("negative Ze", |i: &mut CircuitInput| i.ze_ohm = -0.1),
        ("NaN length", |i: &mut CircuitInput| i.length_m = f64::NAN),
    ];
    for (label, mutate) in cases {
        let mut input = twin_and_earth_circuit();
        mutate(&mut input);
        let err = evaluate(&input, &cables, &zs, ChecksEnabled::default()).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::OutOfRange, "{label}");
    }
}

#[test]
fn disabled_checks_are_absent() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.design_current_a = 30.0;
    let res = evaluate(&input, &cables, &zs, only_voltage_drop()).expect("evaluate");
    assert!(res.thermal.is_none());
    assert!(res.device.is_none());
    assert!(res.zs.is_none());
    assert_eq!(res.verdicts().len(), 1);
    assert_eq!(res.overall_pass, res.voltage_drop.expect("vd").voltage_drop_pass);
}

#[test]
fn no_device_skips_device_and_zs() {
    let (cables, zs) = builtin();
    let mut input = twin_and_earth_circuit();
    input.device = None;
    let res = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("evaluate");
    assert!(res.device.is_none());
    assert!(res.zs.is_none());
    assert!(res.overall_pass);
}

#[test]
fn same_input_same_result() {
    let (cables, zs) = builtin();
    let input = twin_and_earth_circuit();
    let a = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("a");
    let b = evaluate(&input, &cables, &zs, ChecksEnabled::default()).expect("b");
    assert_eq!(a, b);
}
