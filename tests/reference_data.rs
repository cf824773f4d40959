//! 설정 파일과 케이블 테이블 파일 로드 테스트.
use bs7671_calc::{
    app::{self, BatchOptions},
    cable::{CableDataError, CableTable, CableType, CrossSection, DeratingFactors, RxConvention},
    compliance::{evaluate, ChecksEnabled, CircuitInput, UsageCategory, DEFAULT_ZE_OHM},
    config::{self, Config},
    protection::{DeviceKind, McbCurve},
    reference::ReferenceData,
    report::ProjectInfo,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bs7671_calc_{name}_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn assert_close(label: &str, actual: f64, expected: f64) {
    let diff = (actual - expected).abs();
    assert!(diff <= 1e-12, "{label} expected {expected} got {actual}");
}

fn bundled_table() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/cable_data.json")
}

#[test]
fn bundled_table_declares_convention() {
    let table = CableTable::load(&bundled_table(), None).expect("bundled table");
    assert_eq!(table.convention(), RxConvention::PerConductor);
    let spec = table
        .get(CableType::PvcTwinAndEarth, CrossSection::from_hundredths(250))
        .expect("2.5 mm² T&E");
    assert_close("R", spec.resistance_ohm_per_m, 0.007_41);
    assert_close("R1R2", spec.r1_plus_r2_ohm_per_m.unwrap_or(0.0), 0.019_51);
    let builtin = CableTable::builtin();
    for spec in table.iter() {
        let b = builtin
            .get(spec.cable_type, spec.cross_section)
            .expect("bundled entries are a subset of the built-in table");
        assert_close("R", spec.resistance_ohm_per_m, b.resistance_ohm_per_m);
        assert_close("X", spec.reactance_ohm_per_m, b.reactance_ohm_per_m);
    }
}

#[test]
fn bare_mapping_needs_configured_convention() {
    let src = r#"{"SWA": {"4": {"R": 4.61, "X": 0.08}}}"#;
    let err = CableTable::from_json_str(src, None).unwrap_err();
    assert!(matches!(err, CableDataError::UndeclaredConvention));
    let table = CableTable::from_json_str(src, Some(RxConvention::Loop)).expect("with fallback");
    assert_eq!(table.convention(), RxConvention::Loop);
    assert_eq!(table.len(), 1);
}

#[test]
fn declared_convention_wins_over_config() {
    let src = r#"{"convention": "per_conductor", "cables": {"SWA": {"4": {"R": 4.61, "X": 0.08}}}}"#;
    let table = CableTable::from_json_str(src, Some(RxConvention::Loop)).expect("table");
    assert_eq!(table.convention(), RxConvention::PerConductor);
}

#[test]
fn malformed_tables_are_rejected() {
    let unknown = r#"{"convention": "loop", "cables": {"Mineral": {"4": {"R": 1, "X": 0}}}}"#;
    assert!(matches!(
        CableTable::from_json_str(unknown, None),
        Err(CableDataError::UnknownCableType(_))
    ));
    let bad_size = r#"{"convention": "loop", "cables": {"SWA": {"big": {"R": 1, "X": 0}}}}"#;
    assert!(matches!(
        CableTable::from_json_str(bad_size, None),
        Err(CableDataError::InvalidSize(_))
    ));
    let negative = r#"{"convention": "loop", "cables": {"SWA": {"4": {"R": -1, "X": 0}}}}"#;
    assert!(matches!(
        CableTable::from_json_str(negative, None),
        Err(CableDataError::InvalidValue { field: "R", .. })
    ));
    assert!(matches!(
        CableTable::from_json_str("not json", None),
        Err(CableDataError::Json(_))
    ));
}

#[test]
fn missing_table_file_fails_reference_load() {
    let mut cfg = Config::default();
    cfg.data.cable_data = Some(PathBuf::from("no/such/cable_data.json"));
    assert!(matches!(ReferenceData::load(&cfg), Err(CableDataError::Io(_))));
}

#[test]
fn config_is_created_with_defaults() {
    let dir = scratch_dir("config");
    let path = dir.join("config.toml");
    let _ = fs::remove_file(&path);
    let cfg = config::load_or_create(&path).expect("create");
    assert!(path.exists());
    assert_eq!(cfg, Config::default());

    let mut changed = cfg.clone();
    changed.checks.zs = false;
    changed.data.cable_data = Some(bundled_table());
    changed.save_to(&path).expect("save");
    let reloaded = config::load_or_create(&path).expect("reload");
    assert_eq!(reloaded, changed);
    let refs = ReferenceData::load(&reloaded).expect("refs from file");
    assert_eq!(refs.cables.convention(), RxConvention::PerConductor);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn batch_circuit_file_is_evaluated() {
    let dir = scratch_dir("batch");
    let circuit = dir.join("circuit.toml");
    fs::write(
        &circuit,
        r#"
[project]
engineer = "A. Engineer"
job_number = "J-100"

[circuit]
design_current_a = 10.0
tabulated_capacity_a = 27.0
supply_voltage_v = 230.0
length_m = 20.0
power_factor = 0.9
usage = "general"
cable_type = "PVC Twin & Earth"
cross_section = 2.5
device = { mcb = "B" }

[circuit.derating]
ambient = 0.94
"#,
    )
    .expect("write circuit");
    let opts = BatchOptions {
        json: true,
        report: Some(dir.clone()),
        logo: None,
    };
    let pass = app::run_batch(&Config::default(), &ReferenceData::builtin(), &circuit, &opts)
        .expect("batch");
    assert!(pass);
    assert!(dir.join("BS7671_Report_J-100.pdf").exists());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn report_export_creates_configured_output_dir() {
    let dir = scratch_dir("output_dir");
    let mut cfg = Config::default();
    cfg.report.output_dir = dir.join("reports");
    assert!(!cfg.report.output_dir.exists());

    let refs = ReferenceData::builtin();
    let input = CircuitInput {
        design_current_a: 16.0,
        tabulated_capacity_a: 27.0,
        supply_voltage_v: 230.0,
        length_m: 25.0,
        power_factor: 0.95,
        usage: UsageCategory::General,
        cable_type: CableType::PvcTwinAndEarth,
        cross_section: CrossSection::from_hundredths(250),
        derating: DeratingFactors::default(),
        impedance_override: None,
        device: Some(DeviceKind::Mcb(McbCurve::B)),
        ze_ohm: DEFAULT_ZE_OHM,
    };
    let result = evaluate(&input, &refs.cables, &refs.zs_limits, ChecksEnabled::default())
        .expect("evaluate");
    let project = ProjectInfo {
        engineer: None,
        job_number: Some("J-200".into()),
    };
    let saved = app::export_report(&cfg, &project, &input, &result, &cfg.report.output_dir, None)
        .expect("export");
    assert_eq!(saved, cfg.report.output_dir.join("BS7671_Report_J-200.pdf"));
    assert!(saved.is_file());
    let _ = fs::remove_dir_all(dir);
}
