//! 보고서용 라벨 → 값 매핑. 레이아웃은 `pdf` 모듈이 담당한다.

pub mod pdf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::compliance::engine::{round2, CircuitInput, ComplianceResult, ImpedanceSource};

pub const REPORT_TITLE: &str = "BS7671 Calc – Voltage Drop & Compliance Report";
pub const DEFAULT_FOOTER: &str = "Generated using BS7671 Calc";

/// 보고서 생성 오류.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF generation error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("report file error: {0}")]
    Io(#[from] std::io::Error),
}

/// 프로젝트 정보. 비어 있으면 보고서에 N/A로 표시한다.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub engineer: Option<String>,
    #[serde(default)]
    pub job_number: Option<String>,
}

impl ProjectInfo {
    pub fn engineer_or_na(&self) -> &str {
        non_empty(self.engineer.as_deref()).unwrap_or("N/A")
    }

    pub fn job_number_or_na(&self) -> &str {
        non_empty(self.job_number.as_deref()).unwrap_or("N/A")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl ReportSection {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, label: &str, value: impl Into<String>) {
        self.rows.push((label.to_string(), value.into()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub footer: String,
    pub project: ProjectInfo,
    pub date: NaiveDate,
    pub sections: Vec<ReportSection>,
}

fn fixed2(value: f64) -> String {
    format!("{:.2}", round2(value))
}

fn verdict(pass: bool) -> &'static str {
    if pass {
        "PASS"
    } else {
        "FAIL"
    }
}

impl Report {
    /// 입력 정보와 계산 결과를 섹션별로 정리한다.
    pub fn build(
        project: ProjectInfo,
        date: NaiveDate,
        input: &CircuitInput,
        result: &ComplianceResult,
    ) -> Self {
        let mut circuit = ReportSection::new("Circuit");
        circuit.row("Design current Ib (A)", fixed2(input.design_current_a));
        circuit.row("Cable length (m)", fixed2(input.length_m));
        circuit.row("Supply voltage (V)", fixed2(input.supply_voltage_v));
        circuit.row("Power factor", fixed2(input.power_factor));
        circuit.row("Circuit type", input.usage.label());

        let mut cable = ReportSection::new("Cable");
        cable.row("Cable type", input.cable_type.label());
        cable.row("Size (mm²)", input.cross_section.to_string());
        cable.row(
            "Resistance (mΩ/m)",
            format!("{:.3}", result.impedance.resistance_ohm_per_m * 1000.0),
        );
        cable.row(
            "Reactance (mΩ/m)",
            format!("{:.3}", result.impedance.reactance_ohm_per_m * 1000.0),
        );
        cable.row(
            "R/X source",
            match result.impedance.source {
                ImpedanceSource::Table => "Cable table",
                ImpedanceSource::Override => "Manual override",
                ImpedanceSource::Mixed => "Cable table + manual override",
            },
        );
        cable.row("Multiplier k", format!("{}", result.convention_multiplier));

        let mut derating = ReportSection::new("Derating");
        derating.row("Ca", fixed2(input.derating.ambient));
        derating.row("Cg", fixed2(input.derating.grouping));
        derating.row("Ci", fixed2(input.derating.thermal_insulation));
        if let Some(cm) = input.derating.installation_method {
            derating.row("Installation method factor", fixed2(cm));
        }
        derating.row(
            "Total derating Cd",
            format!("{:.3}", result.derating.total_derating_factor),
        );
        derating.row("Tabulated capacity Iz (A)", fixed2(input.tabulated_capacity_a));
        derating.row(
            "Corrected capacity Iz×Cd (A)",
            fixed2(result.derating.corrected_capacity_a),
        );
        derating.row(
            "Required tabulated capacity Ib/Cd (A)",
            fixed2(result.derating.required_tabulated_capacity_a),
        );

        let mut results = ReportSection::new("Results");
        if let Some(t) = &result.thermal {
            results.row("Thermal check (Ib ≤ Iz×Cd)", verdict(t.thermal_pass));
        }
        if let Some(v) = &result.voltage_drop {
            results.row("Voltage drop (V)", fixed2(v.voltage_drop_v));
            results.row("Voltage drop (%)", fixed2(v.voltage_drop_percent));
            results.row("Voltage drop limit (%)", fixed2(v.voltage_drop_limit_percent));
            results.row("Voltage drop check", verdict(v.voltage_drop_pass));
        }
        if let Some(d) = &result.device {
            results.row("Protective device", d.device.kind.label());
            results.row("Nominal rating In (A)", fixed2(d.device.nominal_rating_a));
            results.row("Effective rating (A)", fixed2(d.device_effective_rating));
            results.row("Device check (Ib ≤ In ≤ Iz×Cd)", verdict(d.device_pass));
        }
        if let Some(z) = &result.zs {
            results.row("Ze (Ω)", fixed2(z.ze_ohm));
            results.row("Zs calculated (Ω)", fixed2(z.zs_calculated));
            results.row("Zs limit (Ω)", fixed2(z.zs_limit));
            results.row("Zs check", verdict(z.zs_pass));
        }

        let mut overall = ReportSection::new("Verdict");
        overall.row(
            "Overall",
            if result.overall_pass {
                "COMPLIANT"
            } else {
                "NOT COMPLIANT"
            },
        );

        Self {
            title: REPORT_TITLE.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
            project,
            date,
            sections: vec![circuit, cable, derating, results, overall],
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// 섹션 순서를 유지한 평탄한 라벨 → 값 목록.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn default_file_name(&self) -> String {
        file_name_for(&self.project)
    }
}

/// `BS7671_Report_<job>.pdf`, 작업번호가 없으면 `Untitled`.
pub fn file_name_for(project: &ProjectInfo) -> String {
    let job = non_empty(project.job_number.as_deref()).unwrap_or("Untitled");
    let safe: String = job
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("BS7671_Report_{safe}.pdf")
}
