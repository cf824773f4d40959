#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use bs7671_calc::{
    app,
    cable::{
        AmbientTemperature, CableType, CrossSection, DeratingFactors, Grouping,
        InstallationMethod, ThermalInsulation,
    },
    compliance::{self, round2, CircuitInput, ComplianceResult, ImpedanceOverride, UsageCategory},
    config, logging,
    protection::DeviceKind,
    reference::ReferenceData,
    report::{self, ProjectInfo},
};
use eframe::{egui, App, Frame};
use image::GenericImageView;
use rfd::FileDialog;
use std::{fs, path::Path, path::PathBuf, sync::Arc};

const PASS_COLOR: egui::Color32 = egui::Color32::from_rgb(0x2e, 0x7d, 0x32);
const FAIL_COLOR: egui::Color32 = egui::Color32::from_rgb(0xc6, 0x28, 0x28);

fn main() -> Result<(), eframe::Error> {
    let app_cfg = config::load_or_default().unwrap_or_default();
    logging::init(&app_cfg.log_level);
    let refs = ReferenceData::load(&app_cfg)
        .map(Arc::new)
        .map_err(|e| e.to_string());

    let mut viewport = egui::ViewportBuilder::default().with_inner_size(egui::vec2(1000.0, 760.0));
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "BS7671 Calc – Voltage Drop & Compliance",
        options,
        Box::new(move |_cc| Box::new(GuiApp::new(app_cfg, refs))),
    )
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["icon.png", "assets/icon.png", "../assets/icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: rgba.into_raw(),
        width: w,
        height: h,
    })
}

fn label_with_tip(ui: &mut egui::Ui, text: &str, tip: &str) -> egui::Response {
    ui.label(text).on_hover_text(tip)
}

fn badge(ui: &mut egui::Ui, pass: bool) {
    if pass {
        ui.colored_label(PASS_COLOR, "PASS");
    } else {
        ui.colored_label(FAIL_COLOR, "FAIL");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeratingMode {
    Factors,
    InstallationMethod,
}

struct GuiApp {
    config: config::Config,
    refs: Result<Arc<ReferenceData>, String>,
    // 프로젝트
    engineer: String,
    job_number: String,
    logo_path: Option<PathBuf>,
    // 회로
    design_current_a: f64,
    tabulated_capacity_a: f64,
    length_m: f64,
    power_factor: f64,
    supply_voltage_v: f64,
    usage: UsageCategory,
    cable_type: CableType,
    cross_section: Option<CrossSection>,
    // 보정계수
    derating_mode: DeratingMode,
    ambient: AmbientTemperature,
    grouping: Grouping,
    insulation: ThermalInsulation,
    installation_method: InstallationMethod,
    // 보호장치/Zs
    device: Option<DeviceKind>,
    ze_ohm: f64,
    // 수동 R/X [mΩ/m]
    override_r_enabled: bool,
    override_r: f64,
    override_x_enabled: bool,
    override_x: f64,
    // 결과
    outcome: Option<Result<(CircuitInput, ComplianceResult), String>>,
    status: Option<String>,
}

impl GuiApp {
    fn new(config: config::Config, refs: Result<Arc<ReferenceData>, String>) -> Self {
        let defaults = config.defaults.clone();
        let (cable_type, cross_section) = match &refs {
            Ok(r) => {
                let ty = r
                    .cables
                    .cable_types()
                    .first()
                    .copied()
                    .unwrap_or(CableType::PvcTwinAndEarth);
                let size = r.cables.sizes(ty).first().copied();
                (ty, size)
            }
            Err(_) => (CableType::PvcTwinAndEarth, None),
        };
        Self {
            config,
            refs,
            engineer: String::new(),
            job_number: String::new(),
            logo_path: None,
            design_current_a: 10.0,
            tabulated_capacity_a: defaults.tabulated_capacity_a,
            length_m: 20.0,
            power_factor: defaults.power_factor,
            supply_voltage_v: defaults.supply_voltage_v,
            usage: defaults.usage,
            cable_type,
            cross_section,
            derating_mode: DeratingMode::Factors,
            ambient: AmbientTemperature::C30,
            grouping: Grouping::One,
            insulation: ThermalInsulation::NotInsulated,
            installation_method: InstallationMethod::ALL[0],
            device: Some(DeviceKind::ALL[0]),
            ze_ohm: defaults.ze_ohm,
            override_r_enabled: false,
            override_r: 0.0,
            override_x_enabled: false,
            override_x: 0.0,
            outcome: None,
            status: None,
        }
    }

    fn project(&self) -> ProjectInfo {
        let opt = |s: &str| {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        };
        ProjectInfo {
            engineer: opt(&self.engineer),
            job_number: opt(&self.job_number),
        }
    }

    fn derating(&self) -> DeratingFactors {
        match self.derating_mode {
            DeratingMode::Factors => {
                DeratingFactors::from_selection(self.ambient, self.grouping, self.insulation)
            }
            DeratingMode::InstallationMethod => {
                DeratingFactors::from_installation_method(self.installation_method)
            }
        }
    }

    /// 현재 폼 값으로 입력 레코드를 만든다. 케이블 크기가 없으면 None.
    fn circuit_input(&self) -> Option<CircuitInput> {
        let cross_section = self.cross_section?;
        let impedance_override =
            (self.override_r_enabled || self.override_x_enabled).then(|| ImpedanceOverride {
                resistance_mohm_per_m: self.override_r_enabled.then_some(self.override_r),
                reactance_mohm_per_m: self.override_x_enabled.then_some(self.override_x),
            });
        Some(CircuitInput {
            design_current_a: self.design_current_a,
            tabulated_capacity_a: self.tabulated_capacity_a,
            supply_voltage_v: self.supply_voltage_v,
            length_m: self.length_m,
            power_factor: self.power_factor,
            usage: self.usage,
            cable_type: self.cable_type,
            cross_section,
            derating: self.derating(),
            impedance_override,
            device: self.device,
            ze_ohm: self.ze_ohm,
        })
    }

    fn calculate(&mut self) {
        let refs = match &self.refs {
            Ok(r) => r,
            Err(_) => return,
        };
        self.status = None;
        self.outcome = Some(match self.circuit_input() {
            Some(input) => {
                compliance::evaluate(&input, &refs.cables, &refs.zs_limits, self.config.checks)
                    .map(|result| (input, result))
                    .map_err(|e| e.to_string())
            }
            None => Err("Select a cable size".to_string()),
        });
    }

    fn export_pdf(&mut self) {
        let Some(Ok((input, result))) = &self.outcome else {
            return;
        };
        let project = self.project();
        let default_name = report::file_name_for(&project);
        let Some(path) = FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .set_directory(&self.config.report.output_dir)
            .set_file_name(default_name.as_str())
            .save_file()
        else {
            return;
        };
        self.status = Some(
            match app::export_report(
                &self.config,
                &project,
                input,
                result,
                &path,
                self.logo_path.as_deref(),
            ) {
                Ok(saved) => format!("Report saved: {}", saved.display()),
                Err(e) => format!("Export failed: {e}"),
            },
        );
    }

    fn sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Project");
        ui.separator();
        ui.label("Engineer name");
        ui.text_edit_singleline(&mut self.engineer);
        ui.label("Job number");
        ui.text_edit_singleline(&mut self.job_number);
        ui.add_space(8.0);
        ui.label("Company logo");
        ui.horizontal(|ui| {
            if ui.button("Choose…").clicked() {
                if let Some(p) = FileDialog::new()
                    .add_filter("Image", &["png", "jpg", "jpeg"])
                    .pick_file()
                {
                    self.logo_path = Some(p);
                }
            }
            if self.logo_path.is_some() && ui.button("Clear").clicked() {
                self.logo_path = None;
            }
        });
        if let Some(p) = &self.logo_path {
            ui.small(p.display().to_string());
        }

        ui.add_space(12.0);
        ui.heading("Checks");
        ui.separator();
        let checks = &mut self.config.checks;
        ui.checkbox(&mut checks.thermal, "Thermal (Ib ≤ Iz×Cd)");
        ui.checkbox(&mut checks.voltage_drop, "Voltage drop");
        ui.checkbox(&mut checks.device, "Protective device");
        ui.checkbox(&mut checks.zs, "Earth fault loop Zs");
        if ui.button("Save settings").clicked() {
            self.status = Some(match self.config.save() {
                Ok(()) => "Settings saved".to_string(),
                Err(e) => format!("Settings not saved: {e}"),
            });
        }
    }

    fn circuit_form(&mut self, ui: &mut egui::Ui, refs: &ReferenceData) {
        egui::Grid::new("circuit_grid")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                label_with_tip(ui, "Load current Ib (A)", "Design current of the circuit");
                ui.add(
                    egui::DragValue::new(&mut self.design_current_a)
                        .speed(0.5)
                        .clamp_range(0.1..=2000.0),
                );
                ui.end_row();

                label_with_tip(ui, "Tabulated capacity Iz (A)", "Current-carrying capacity before derating");
                ui.add(
                    egui::DragValue::new(&mut self.tabulated_capacity_a)
                        .speed(0.5)
                        .clamp_range(0.1..=2000.0),
                );
                ui.end_row();

                ui.label("Cable length (m)");
                ui.add(
                    egui::DragValue::new(&mut self.length_m)
                        .speed(0.5)
                        .clamp_range(0.1..=5000.0),
                );
                ui.end_row();

                ui.label("Power factor");
                ui.add(
                    egui::DragValue::new(&mut self.power_factor)
                        .speed(0.01)
                        .clamp_range(0.01..=1.0),
                );
                ui.end_row();

                ui.label("Supply voltage (V)");
                ui.add(
                    egui::DragValue::new(&mut self.supply_voltage_v)
                        .speed(1.0)
                        .clamp_range(1.0..=1000.0),
                );
                ui.end_row();

                ui.label("Circuit type");
                egui::ComboBox::from_id_source("usage")
                    .selected_text(self.usage.label())
                    .show_ui(ui, |ui| {
                        for u in UsageCategory::ALL {
                            ui.selectable_value(&mut self.usage, u, u.label());
                        }
                    });
                ui.end_row();

                ui.label("Cable type");
                let before = self.cable_type;
                egui::ComboBox::from_id_source("cable_type")
                    .selected_text(self.cable_type.label())
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        for t in refs.cables.cable_types() {
                            ui.selectable_value(&mut self.cable_type, t, t.label());
                        }
                    });
                if before != self.cable_type {
                    self.cross_section = refs.cables.sizes(self.cable_type).first().copied();
                }
                ui.end_row();

                ui.label("Cable size (mm²)");
                let size_text = self
                    .cross_section
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                egui::ComboBox::from_id_source("cable_size")
                    .selected_text(size_text)
                    .show_ui(ui, |ui| {
                        for s in refs.cables.sizes(self.cable_type) {
                            ui.selectable_value(&mut self.cross_section, Some(s), s.to_string());
                        }
                    });
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Derating:");
            ui.radio_value(&mut self.derating_mode, DeratingMode::Factors, "Ca / Cg / Ci");
            ui.radio_value(
                &mut self.derating_mode,
                DeratingMode::InstallationMethod,
                "Installation method",
            );
        });
        egui::Grid::new("derating_grid")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| match self.derating_mode {
                DeratingMode::Factors => {
                    ui.label("Ambient temperature (Ca)");
                    egui::ComboBox::from_id_source("ambient")
                        .selected_text(self.ambient.label())
                        .show_ui(ui, |ui| {
                            for a in AmbientTemperature::ALL {
                                ui.selectable_value(&mut self.ambient, a, a.label());
                            }
                        });
                    ui.end_row();
                    ui.label("Grouping (Cg)");
                    egui::ComboBox::from_id_source("grouping")
                        .selected_text(self.grouping.label())
                        .show_ui(ui, |ui| {
                            for g in Grouping::ALL {
                                ui.selectable_value(&mut self.grouping, g, g.label());
                            }
                        });
                    ui.end_row();
                    ui.label("Thermal insulation (Ci)");
                    egui::ComboBox::from_id_source("insulation")
                        .selected_text(self.insulation.label())
                        .show_ui(ui, |ui| {
                            for i in ThermalInsulation::ALL {
                                ui.selectable_value(&mut self.insulation, i, i.label());
                            }
                        });
                    ui.end_row();
                }
                DeratingMode::InstallationMethod => {
                    ui.label("Installation method");
                    egui::ComboBox::from_id_source("install_method")
                        .selected_text(self.installation_method.label())
                        .width(260.0)
                        .show_ui(ui, |ui| {
                            for m in InstallationMethod::ALL {
                                ui.selectable_value(&mut self.installation_method, m, m.label());
                            }
                        });
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        egui::Grid::new("device_grid")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                ui.label("Protective device");
                let text = self.device.map(|d| d.label()).unwrap_or("None");
                egui::ComboBox::from_id_source("device")
                    .selected_text(text)
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.device, None, "None");
                        for d in DeviceKind::ALL {
                            ui.selectable_value(&mut self.device, Some(d), d.label());
                        }
                    });
                ui.end_row();

                label_with_tip(ui, "Ze (Ω)", "External earth fault loop impedance");
                ui.add(
                    egui::DragValue::new(&mut self.ze_ohm)
                        .speed(0.01)
                        .clamp_range(0.0..=10.0),
                );
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.label("Override cable impedance (mΩ/m)");
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.override_r_enabled, "R");
            ui.add_enabled(
                self.override_r_enabled,
                egui::DragValue::new(&mut self.override_r)
                    .speed(0.1)
                    .clamp_range(0.0..=100_000.0),
            );
            ui.checkbox(&mut self.override_x_enabled, "X");
            ui.add_enabled(
                self.override_x_enabled,
                egui::DragValue::new(&mut self.override_x)
                    .speed(0.01)
                    .clamp_range(0.0..=1000.0),
            );
        });
        ui.small("Unticked values come from the cable table.");
    }

    fn results_panel(&self, ui: &mut egui::Ui) {
        let Some(outcome) = &self.outcome else {
            return;
        };
        let (input, result) = match outcome {
            Ok(v) => v,
            Err(msg) => {
                ui.colored_label(FAIL_COLOR, format!("Input rejected: {msg}"));
                return;
            }
        };
        ui.heading("Results");
        egui::Grid::new("result_grid")
            .num_columns(3)
            .spacing([16.0, 6.0])
            .striped(true)
            .show(ui, |ui| {
                ui.label("Total derating Cd");
                ui.label(format!("{:.3}", result.derating.total_derating_factor));
                ui.label("");
                ui.end_row();

                ui.label("Derated current Ib/Cd (A)");
                ui.label(format!("{:.2}", round2(result.derating.required_tabulated_capacity_a)));
                ui.label("");
                ui.end_row();

                if let Some(t) = &result.thermal {
                    ui.label("Corrected capacity Iz×Cd (A)");
                    ui.label(format!("{:.2}", round2(t.corrected_capacity_iz_cd)));
                    badge(ui, t.thermal_pass);
                    ui.end_row();
                }
                if let Some(v) = &result.voltage_drop {
                    ui.label("Voltage drop");
                    ui.label(format!(
                        "{:.2} V / {:.2} % (limit {} %)",
                        round2(v.voltage_drop_v),
                        round2(v.voltage_drop_percent),
                        v.voltage_drop_limit_percent
                    ));
                    badge(ui, v.voltage_drop_pass);
                    ui.end_row();
                }
                if let Some(d) = &result.device {
                    ui.label("Protective device");
                    ui.label(format!(
                        "{} {} A (eff. {:.2} A)",
                        d.device.kind,
                        d.device.nominal_rating_a,
                        round2(d.device_effective_rating)
                    ));
                    badge(ui, d.device_pass);
                    ui.end_row();
                }
                if let Some(z) = &result.zs {
                    ui.label("Zs (Ω)");
                    ui.label(format!(
                        "{:.2} (limit {:.2})",
                        round2(z.zs_calculated),
                        round2(z.zs_limit)
                    ));
                    badge(ui, z.zs_pass);
                    ui.end_row();
                }
            });
        if let Some(d) = &result.device {
            if d.device.is_undersized(input.design_current_a) {
                ui.colored_label(FAIL_COLOR, "Largest catalog rating is below Ib");
            }
        }
        ui.add_space(8.0);
        if result.overall_pass {
            ui.colored_label(PASS_COLOR, egui::RichText::new("COMPLIANT").heading());
        } else {
            ui.colored_label(FAIL_COLOR, egui::RichText::new("NOT COMPLIANT").heading());
        }
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::SidePanel::left("project_panel")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| self.sidebar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("BS7671 Calc – Voltage Drop & Compliance");
            ui.separator();
            let refs = match &self.refs {
                Ok(r) => Arc::clone(r),
                Err(e) => {
                    ui.colored_label(FAIL_COLOR, format!("Reference data error: {e}"));
                    return;
                }
            };
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.circuit_form(ui, &refs);
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("Calculate").clicked() {
                        self.calculate();
                    }
                    let can_export = matches!(self.outcome, Some(Ok(_)));
                    if ui
                        .add_enabled(can_export, egui::Button::new("Export PDF…"))
                        .clicked()
                    {
                        self.export_pdf();
                    }
                });
                if let Some(s) = &self.status {
                    ui.label(s);
                }
                ui.separator();
                self.results_panel(ui);
            });
        });
    }
}
