use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::app::{self, AppError};
use crate::cable::cable_table::CableType;
use crate::cable::derating::{
    AmbientTemperature, DeratingFactors, Grouping, InstallationMethod, ThermalInsulation,
};
use crate::compliance::engine::{
    self, round2, CircuitInput, ComplianceResult, ImpedanceOverride,
};
use crate::compliance::voltage_drop::UsageCategory;
use crate::config::Config;
use crate::protection::device::DeviceKind;
use crate::reference::ReferenceData;
use crate::report::ProjectInfo;

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Calculate,
    CableTable,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu() -> Result<MenuChoice, AppError> {
    println!("\n=== BS7671 Calc – Voltage Drop & Compliance ===");
    println!("1) Circuit calculation");
    println!("2) Cable table");
    println!("3) Settings");
    println!("0) Exit");
    loop {
        let sel = read_line("Select: ")?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::Calculate),
            "2" => return Ok(MenuChoice::CableTable),
            "3" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("Invalid selection, try again."),
        }
    }
}

/// 회로 입력을 받아 판정하고, 원하면 PDF 보고서를 저장한다.
pub fn handle_calculation(cfg: &Config, refs: &ReferenceData) -> Result<(), AppError> {
    println!("\n-- Circuit calculation --");
    let defaults = &cfg.defaults;
    let design_current_a = read_f64("Load current Ib (A): ")?;
    let tabulated_capacity_a =
        read_f64_or("Tabulated capacity Iz (A)", defaults.tabulated_capacity_a)?;
    let length_m = read_f64("Cable length (m): ")?;
    let power_factor = read_f64_or("Power factor", defaults.power_factor)?;
    let supply_voltage_v = read_f64_or("Supply voltage (V)", defaults.supply_voltage_v)?;
    let usage = read_choice(
        "Circuit type",
        &UsageCategory::ALL.map(|u| (u, u.label())),
    )?;

    let types = refs.cables.cable_types();
    let type_options: Vec<(CableType, &str)> = types.iter().map(|t| (*t, t.label())).collect();
    let cable_type = read_choice("Cable type", &type_options)?;
    let sizes = refs.cables.sizes(cable_type);
    let size_labels: Vec<String> = sizes.iter().map(|s| format!("{s} mm²")).collect();
    let size_options: Vec<_> = sizes
        .iter()
        .zip(size_labels.iter())
        .map(|(s, l)| (*s, l.as_str()))
        .collect();
    let cross_section = read_choice("Cable size", &size_options)?;

    let derating = read_derating()?;
    let device = read_device()?;
    let ze_ohm = read_f64_or("External loop impedance Ze (Ω)", defaults.ze_ohm)?;
    let impedance_override = if read_yes_no("Override table R/X? (y/N): ")? {
        Some(ImpedanceOverride {
            resistance_mohm_per_m: read_optional_f64("Resistance (mΩ/m, enter = table): ")?,
            reactance_mohm_per_m: read_optional_f64("Reactance (mΩ/m, enter = table): ")?,
        })
    } else {
        None
    };

    let input = CircuitInput {
        design_current_a,
        tabulated_capacity_a,
        supply_voltage_v,
        length_m,
        power_factor,
        usage,
        cable_type,
        cross_section,
        derating,
        impedance_override,
        device,
        ze_ohm,
    };
    let result = engine::evaluate(&input, &refs.cables, &refs.zs_limits, cfg.checks)?;
    print_result(&input, &result);

    if read_yes_no("Export PDF report? (y/N): ")? {
        let project = ProjectInfo {
            engineer: read_optional_text("Engineer name: ")?,
            job_number: read_optional_text("Job number: ")?,
        };
        let logo = read_optional_text("Logo image path (optional): ")?.map(PathBuf::from);
        let path = app::export_report(
            cfg,
            &project,
            &input,
            &result,
            &cfg.report.output_dir,
            logo.as_deref(),
        )?;
        println!("Report saved: {}", path.display());
    }
    Ok(())
}

fn read_derating() -> Result<DeratingFactors, AppError> {
    println!("Derating: 1) Ca/Cg/Ci factors  2) Installation method");
    let sel = read_line("Select: ")?;
    if sel.trim() == "2" {
        let method = read_choice(
            "Installation method",
            &InstallationMethod::ALL.map(|m| (m, m.label())),
        )?;
        return Ok(DeratingFactors::from_installation_method(method));
    }
    let ambient = read_choice(
        "Ambient temperature (Ca)",
        &AmbientTemperature::ALL.map(|a| (a, a.label())),
    )?;
    let grouping = read_choice("Grouping (Cg)", &Grouping::ALL.map(|g| (g, g.label())))?;
    let insulation = read_choice(
        "Thermal insulation (Ci)",
        &ThermalInsulation::ALL.map(|i| (i, i.label())),
    )?;
    Ok(DeratingFactors::from_selection(ambient, grouping, insulation))
}

fn read_device() -> Result<Option<DeviceKind>, AppError> {
    println!("Protective device:");
    println!("  0) None");
    for (i, kind) in DeviceKind::ALL.iter().enumerate() {
        println!("  {}) {}", i + 1, kind.label());
    }
    loop {
        let sel = read_line("Select: ")?;
        match sel.trim().parse::<usize>() {
            Ok(0) => return Ok(None),
            Ok(n) if n <= DeviceKind::ALL.len() => return Ok(Some(DeviceKind::ALL[n - 1])),
            _ => println!("Invalid selection, try again."),
        }
    }
}

/// 케이블 테이블 내용을 출력한다.
pub fn handle_cable_table(refs: &ReferenceData) {
    println!("\n-- Cable table ({}) --", refs.cables.convention());
    println!("{:<24} {:>8} {:>10} {:>10} {:>10}", "Type", "mm²", "R mΩ/m", "X mΩ/m", "R1+R2");
    for spec in refs.cables.iter() {
        let r1r2 = spec
            .r1_plus_r2_ohm_per_m
            .map(|v| format!("{:.3}", v * 1000.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:>8} {:>10.3} {:>10.3} {:>10}",
            spec.cable_type.label(),
            spec.cross_section.to_string(),
            spec.resistance_ohm_per_m * 1000.0,
            spec.reactance_ohm_per_m * 1000.0,
            r1r2
        );
    }

    println!("\n-- Max Zs (0.4 s) --");
    for kind in DeviceKind::ALL {
        let limits: Vec<String> = refs
            .zs_limits
            .points(kind)
            .iter()
            .map(|p| format!("{}A {:.2}", p.rating_a, p.limit_ohm))
            .collect();
        println!("{:<28} {}", kind.label(), limits.join(", "));
    }
}

/// 판정 항목 on/off 설정 메뉴.
pub fn handle_settings(cfg: &mut Config) -> Result<(), AppError> {
    println!("\n-- Settings --");
    let checks = &mut cfg.checks;
    println!("1) Thermal check        [{}]", on_off(checks.thermal));
    println!("2) Voltage drop check   [{}]", on_off(checks.voltage_drop));
    println!("3) Protective device    [{}]", on_off(checks.device));
    println!("4) Zs check             [{}]", on_off(checks.zs));
    let sel = read_line("Toggle number (enter to cancel): ")?;
    match sel.trim() {
        "" => return Ok(()),
        "1" => checks.thermal = !checks.thermal,
        "2" => checks.voltage_drop = !checks.voltage_drop,
        "3" => checks.device = !checks.device,
        "4" => checks.zs = !checks.zs,
        _ => println!("Invalid input, nothing changed."),
    }
    println!("Checks: {:?}", cfg.checks);
    Ok(())
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}

fn badge(pass: bool) -> &'static str {
    if pass {
        "PASS"
    } else {
        "FAIL"
    }
}

/// 계산 결과를 출력한다. 표시값만 소수 둘째 자리로 반올림한다.
pub fn print_result(input: &CircuitInput, result: &ComplianceResult) {
    println!("\n-- Result: {} {} mm² --", input.cable_type, input.cross_section);
    println!(
        "R = {:.3} mΩ/m, X = {:.3} mΩ/m, k = {}",
        result.impedance.resistance_ohm_per_m * 1000.0,
        result.impedance.reactance_ohm_per_m * 1000.0,
        result.convention_multiplier
    );
    println!(
        "Cd = {:.3}, Iz×Cd = {:.2} A, required Iz = {:.2} A",
        result.derating.total_derating_factor,
        round2(result.derating.corrected_capacity_a),
        round2(result.derating.required_tabulated_capacity_a)
    );
    if let Some(t) = &result.thermal {
        println!(
            "Thermal: Ib {:.2} A ≤ {:.2} A  [{}]",
            input.design_current_a,
            round2(t.corrected_capacity_iz_cd),
            badge(t.thermal_pass)
        );
    }
    if let Some(v) = &result.voltage_drop {
        println!(
            "Voltage drop: {:.2} V ({:.2} %, limit {} %)  [{}]",
            round2(v.voltage_drop_v),
            round2(v.voltage_drop_percent),
            v.voltage_drop_limit_percent,
            badge(v.voltage_drop_pass)
        );
    }
    if let Some(d) = &result.device {
        println!(
            "Device: {} {} A (effective {:.2} A)  [{}]",
            d.device.kind,
            d.device.nominal_rating_a,
            round2(d.device_effective_rating),
            badge(d.device_pass)
        );
        if d.device.is_undersized(input.design_current_a) {
            println!("  Largest catalog rating is below the design current.");
        }
    }
    if let Some(z) = &result.zs {
        println!(
            "Zs: {:.2} Ω (limit {:.2} Ω)  [{}]",
            round2(z.zs_calculated),
            round2(z.zs_limit),
            badge(z.zs_pass)
        );
    }
    if result.overall_pass {
        println!("Overall: COMPLIANT");
    } else {
        println!("Overall: NOT COMPLIANT");
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    read_line_from(&mut io::stdin().lock(), &mut io::stdout().lock(), prompt)
}

/// 입력이 닫혀 있으면 `UnexpectedEof`를 돌려준다.
fn read_line_from<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> Result<String, AppError> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
    }
    Ok(buf)
}

fn read_f64(prompt: &str) -> Result<f64, AppError> {
    loop {
        let s = read_line(prompt)?;
        match s.trim().parse::<f64>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("Please enter a number."),
        }
    }
}

fn read_f64_or(label: &str, default: f64) -> Result<f64, AppError> {
    loop {
        let s = read_line(&format!("{label} [{default}]: "))?;
        let s = s.trim();
        if s.is_empty() {
            return Ok(default);
        }
        match s.parse::<f64>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("Please enter a number."),
        }
    }
}

fn read_optional_f64(prompt: &str) -> Result<Option<f64>, AppError> {
    loop {
        let s = read_line(prompt)?;
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        match s.parse::<f64>() {
            Ok(v) => return Ok(Some(v)),
            Err(_) => println!("Please enter a number."),
        }
    }
}

fn read_optional_text(prompt: &str) -> Result<Option<String>, AppError> {
    let s = read_line(prompt)?;
    let s = s.trim();
    Ok((!s.is_empty()).then(|| s.to_string()))
}

fn read_yes_no(prompt: &str) -> Result<bool, AppError> {
    let s = read_line(prompt)?;
    Ok(matches!(s.trim(), "y" | "Y" | "yes"))
}

fn read_choice<T: Copy>(title: &str, options: &[(T, &str)]) -> Result<T, AppError> {
    println!("{title}:");
    for (i, (_, label)) in options.iter().enumerate() {
        println!("  {}) {}", i + 1, label);
    }
    loop {
        let sel = read_line("Select: ")?;
        match sel.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= options.len() => return Ok(options[n - 1].0),
            _ => println!("Invalid selection, try again."),
        }
    }
}
