//! PDF 보고서 생성 테스트.
use bs7671_calc::{
    cable::{CableType, CrossSection, DeratingFactors},
    compliance::{evaluate, ChecksEnabled, CircuitInput, UsageCategory, DEFAULT_ZE_OHM},
    protection::{DeviceKind, McbCurve},
    reference::ReferenceData,
    report::{pdf, ProjectInfo, Report},
};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bs7671_calc_{name}_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn sample_report(job: Option<&str>) -> Report {
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
        engineer: Some("A. Engineer".into()),
        job_number: job.map(str::to_string),
    };
    let date = NaiveDate::from_ymd_opt(2024, 3, 14).expect("date");
    Report::build(project, date, &input, &result)
}

fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("valid PDF")
        .get_pages()
        .len()
}

#[test]
fn render_produces_single_page_pdf() {
    let bytes = pdf::render(&sample_report(Some("J-7")), None).expect("render");
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn long_report_paginates() {
    let mut report = sample_report(None);
    let extra = report.sections[0].clone();
    for _ in 0..12 {
        report.sections.push(extra.clone());
    }
    let bytes = pdf::render(&report, None).expect("render");
    assert!(page_count(&bytes) >= 2);
}

#[test]
fn unreadable_logo_is_not_fatal() {
    let bytes = pdf::render(&sample_report(None), Some(Path::new("no/such/logo.png")))
        .expect("render without logo");
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn logo_is_embedded_as_image() {
    let dir = scratch_dir("logo");
    let logo = dir.join("logo.png");
    image::RgbImage::from_pixel(8, 4, image::Rgb([0, 80, 160]))
        .save(&logo)
        .expect("write png");
    let bytes = pdf::render(&sample_report(None), Some(&logo)).expect("render");
    let doc = lopdf::Document::load_mem(&bytes).expect("valid PDF");
    let has_image = doc.objects.values().any(|obj| {
        obj.as_stream()
            .ok()
            .and_then(|s| s.dict.get(b"Subtype").ok())
            .and_then(|v| v.as_name().ok())
            == Some(b"Image".as_slice())
    });
    assert!(has_image);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn standard_report_with_wide_logo_fits_one_page() {
    let dir = scratch_dir("wide_logo");
    let logo = dir.join("logo.png");
    image::RgbImage::from_pixel(8, 4, image::Rgb([0, 80, 160]))
        .save(&logo)
        .expect("write png");
    let bytes = pdf::render(&sample_report(Some("J-7")), Some(&logo)).expect("render");
    assert_eq!(page_count(&bytes), 1);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn write_into_directory_uses_default_name() {
    let dir = scratch_dir("write");
    let path = pdf::write(&dir, &sample_report(Some("J 42")), None).expect("write");
    assert_eq!(path, dir.join("BS7671_Report_J_42.pdf"));
    let bytes = fs::read(&path).expect("read back");
    assert!(bytes.starts_with(b"%PDF"));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn write_creates_missing_directory() {
    let dir = scratch_dir("write_missing");
    let target = dir.join("reports").join("2024");
    let path = pdf::write(&target, &sample_report(Some("J-9")), None).expect("write");
    assert_eq!(path, target.join("BS7671_Report_J-9.pdf"));
    assert!(path.is_file());
    let _ = fs::remove_dir_all(dir);
}
