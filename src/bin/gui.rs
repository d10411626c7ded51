#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use eframe::{egui, App, Frame};
use engine_fuel_estimator::{
    app, config,
    form::{self, Field, FieldKind, FormErrors, RawForm, SubmitError, Submission, FIELDS},
    i18n::{self, keys},
    ui_cli,
};
use image::GenericImageView;
use rfd::FileDialog;
use simple_logger::SimpleLogger;
use std::{env, fs, path::Path};

fn main() -> Result<(), eframe::Error> {
    // CLI 언어 옵션 처리: --lang xx 또는 --lang=xx (xx: auto/en-us/ko-kr)
    let mut cli_lang: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if let Some(val) = a.strip_prefix("--lang=") {
            cli_lang = Some(val.to_string());
        } else if (a == "--lang" || a == "-L") && i + 1 < args.len() {
            cli_lang = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    let (mut app_cfg, load_err) = config::load_or_fallback(config::DEFAULT_CONFIG_PATH);
    if let Err(e) = SimpleLogger::new()
        .with_level(app_cfg.log_level_filter())
        .init()
    {
        eprintln!("Logger error: {e}");
    }
    if let Some(e) = load_err {
        log::warn!("{}: {e}; using default settings", config::DEFAULT_CONFIG_PATH);
    }
    if let Some(lang_cli) = cli_lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(egui::vec2(640.0, 620.0))
        .with_transparent(true);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "Engine Fuel Estimator",
        options,
        Box::new(move |_cc| Box::new(GuiApp::new(app_cfg))),
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

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    lang_input: String,
    window_alpha: f32,
    form: RawForm,
    errors: Option<FormErrors>,
    result: Option<Submission>,
    status: Option<String>,
    show_breakdown: bool,
    show_formula_modal: bool,
    show_settings_modal: bool,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let resolved = i18n::resolve_language(&config.language, None);
        let tr = i18n::Translator::new_with_pack(&resolved, config.language_pack_dir.as_deref());
        Self {
            lang_input: config.language.clone(),
            window_alpha: config.window_alpha.clamp(0.3, 1.0),
            form: ui_cli::initial_form(&config.defaults),
            tr,
            config,
            errors: None,
            result: None,
            status: None,
            show_breakdown: false,
            show_formula_modal: false,
            show_settings_modal: false,
        }
    }

    /// 폼을 제출한다. 실패하면 필드별 오류를 남긴다.
    fn calculate(&mut self) {
        match form::submit(&self.form) {
            Ok(submission) => {
                self.errors = None;
                self.result = Some(submission);
                self.status = None;
            }
            Err(SubmitError::Invalid(errors)) => {
                self.errors = Some(errors);
                self.result = None;
            }
            Err(SubmitError::Estimate(e)) => {
                self.errors = None;
                self.result = None;
                self.status = Some(format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)));
            }
        }
    }

    fn field_error(&self, field: Field) -> Option<String> {
        self.errors
            .as_ref()
            .and_then(|errs| errs.for_field(field))
            .map(|e| e.message(&self.tr))
    }

    fn save_inputs(&mut self) {
        let record = match form::validate(&self.form) {
            Ok(record) => record,
            Err(errors) => {
                self.errors = Some(errors);
                return;
            }
        };
        let Some(path) = FileDialog::new()
            .add_filter("TOML", &["toml"])
            .set_file_name("inputs.toml")
            .save_file()
        else {
            return;
        };
        self.status = Some(match app::save_input_file(&path, &record) {
            Ok(()) => format!("{} {}", self.tr.lookup("gui.form.saved").unwrap_or_else(|| "Saved:".into()), path.display()),
            Err(e) => format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)),
        });
    }

    fn load_inputs(&mut self) {
        let Some(path) = FileDialog::new().add_filter("TOML", &["toml"]).pick_file() else {
            return;
        };
        match app::load_input_file(&path) {
            Ok(record) => {
                self.form = RawForm::from_record(&record);
                self.errors = None;
                self.result = None;
                self.status = Some(format!(
                    "{} {}",
                    self.tr.lookup("gui.form.loaded").unwrap_or_else(|| "Loaded:".into()),
                    path.display()
                ));
            }
            Err(e) => self.status = Some(format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX))),
        }
    }

    fn ui_form(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());
        ui.heading(tr.t(keys::APP_TITLE));
        ui.add_space(8.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("fuel_form_grid")
                .num_columns(3)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    for spec in FIELDS.iter() {
                        let label = tr.t(spec.label_key);
                        label_with_tip(ui, &label, spec.label);
                        match spec.kind {
                            FieldKind::Number { .. } => {
                                ui.add(
                                    egui::TextEdit::singleline(self.form.entry(spec.field))
                                        .desired_width(140.0),
                                );
                            }
                            FieldKind::Select(choices) => {
                                let value = self.form.entry(spec.field);
                                let selected = choices
                                    .iter()
                                    .find(|(v, _)| v.eq_ignore_ascii_case(value.as_str()))
                                    .map(|(_, l)| l.to_string())
                                    .unwrap_or_else(|| value.clone());
                                egui::ComboBox::from_id_source(spec.name)
                                    .selected_text(selected)
                                    .show_ui(ui, |ui| {
                                        for (v, l) in choices {
                                            ui.selectable_value(&mut *value, v.to_string(), *l);
                                        }
                                    });
                            }
                        }
                        match self.field_error(spec.field) {
                            Some(msg) => {
                                ui.colored_label(egui::Color32::from_rgb(220, 60, 60), msg);
                            }
                            None => {
                                ui.label("");
                            }
                        }
                        ui.end_row();
                    }
                });
        });
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button(tr.t(keys::FORM_CALCULATE)).clicked() {
                self.calculate();
            }
            if ui.button(txt("gui.form.save_inputs", "Save inputs…")).clicked() {
                self.save_inputs();
            }
            if ui.button(txt("gui.form.load_inputs", "Load inputs…")).clicked() {
                self.load_inputs();
            }
        });
        ui.separator();
        if let Some(sub) = &self.result {
            ui.strong(sub.message.as_str());
            ui.checkbox(&mut self.show_breakdown, tr.t(keys::RESULT_BREAKDOWN));
            if self.show_breakdown {
                let b = sub.breakdown;
                ui.label(format!(
                    "{}: {:.6}",
                    tr.t(keys::RESULT_EMISSIONS_FACTOR),
                    b.emissions_factor
                ));
                ui.label(format!(
                    "{}: {:.4}",
                    tr.t(keys::RESULT_ENGINE_FACTOR),
                    b.engine_factor
                ));
                ui.label(format!(
                    "{}: {:.6}",
                    tr.t(keys::RESULT_FUEL_FACTOR),
                    b.fuel_factor
                ));
            }
        } else if self.errors.is_some() {
            ui.colored_label(
                egui::Color32::from_rgb(220, 60, 60),
                tr.t(keys::FORM_ERRORS_HEADING),
            );
        }
        if let Some(msg) = &self.status {
            ui.small(msg.as_str());
        }
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 투명도 적용: 매 프레임 기본 팔레트에서 다시 계산한다.
        let mut style = (*ctx.style()).clone();
        let base = if style.visuals.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        style.visuals.window_fill = base.window_fill.linear_multiply(self.window_alpha);
        style.visuals.panel_fill = base.panel_fill.linear_multiply(self.window_alpha);
        ctx.set_style(style);

        let tr = self.tr.clone();
        let txt = |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(tr.t(keys::APP_TITLE));
                ui.separator();
                if ui.button(txt("gui.formula.button", "Formula reference")).clicked() {
                    self.show_formula_modal = true;
                }
                if ui.button(txt("gui.settings.title", "Settings")).clicked() {
                    self.show_settings_modal = true;
                }
            });
        });

        if self.show_formula_modal {
            egui::Window::new(txt("gui.formula.title", "Formula reference"))
                .collapsible(true)
                .resizable(true)
                .open(&mut self.show_formula_modal)
                .show(ctx, |ui| {
                    for key in [
                        keys::FORMULA_EMISSIONS,
                        keys::FORMULA_ENGINE,
                        keys::FORMULA_FUEL,
                        keys::FORMULA_RESULT,
                        keys::FORMULA_UNUSED,
                    ] {
                        ui.label(tr.t(key));
                    }
                });
        }

        if self.show_settings_modal {
            let mut apply = false;
            egui::Window::new(txt("gui.settings.title", "Settings"))
                .collapsible(false)
                .resizable(true)
                .open(&mut self.show_settings_modal)
                .show(ctx, |ui| {
                    ui.label(tr.t(keys::SETTINGS_CURRENT));
                    egui::ComboBox::from_id_source("lang_choice")
                        .selected_text(&self.lang_input)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut self.lang_input, "auto".into(), txt("gui.settings.lang.auto", "System"));
                            ui.selectable_value(&mut self.lang_input, "en-us".into(), "English (US)");
                            ui.selectable_value(&mut self.lang_input, "ko-kr".into(), "한국어");
                        });
                    ui.separator();
                    ui.label(txt("gui.settings.alpha", "Window transparency"));
                    ui.add(egui::Slider::new(&mut self.window_alpha, 0.3..=1.0).text("alpha"));
                    ui.separator();
                    if ui.button(txt("gui.settings.save", "Save settings")).clicked() {
                        apply = true;
                    }
                });
            if apply {
                self.config.language = self.lang_input.clone();
                self.config.window_alpha = self.window_alpha;
                let resolved = i18n::resolve_language(&self.config.language, None);
                self.tr = i18n::Translator::new_with_pack(
                    &resolved,
                    self.config.language_pack_dir.as_deref(),
                );
                self.status = Some(match self.config.save() {
                    Ok(()) => format!("{} {}", self.tr.t(keys::SETTINGS_SAVED), resolved),
                    Err(e) => format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)),
                });
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| self.ui_form(ui));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> GuiApp {
        let mut cfg = config::Config::default();
        cfg.language = "en-us".into();
        GuiApp::new(cfg)
    }

    #[test]
    fn new_app_prefills_select_defaults() {
        let app = app();
        assert_eq!(app.form.get(Field::EngineType), Some("Genset"));
        assert_eq!(app.form.get(Field::FuelType), Some("Diesel"));
        assert_eq!(app.form.get(Field::TestType), Some("pre"));
    }

    #[test]
    fn empty_form_marks_numeric_fields() {
        let mut app = app();
        app.calculate();
        assert!(app.result.is_none());
        assert_eq!(
            app.field_error(Field::Hc).as_deref(),
            Some("This field is required.")
        );
        assert!(app.field_error(Field::EngineType).is_none());
    }

    #[test]
    fn filled_form_shows_result() {
        let mut app = app();
        for (field, v) in [
            (Field::Hc, "100"),
            (Field::Nox, "200"),
            (Field::Co, "1"),
            (Field::Co2, "5"),
            (Field::O2, "2"),
            (Field::EngineCapacity, "50"),
            (Field::EngineSize, "5"),
            (Field::EngineRpm, "1500"),
            (Field::EngineLoad, "80"),
        ] {
            app.form.set(field, v);
        }
        app.calculate();
        assert!(app.errors.is_none());
        assert_eq!(
            app.result.as_ref().map(|s| s.message.as_str()),
            Some("Fuel consumption: 12.94 L/h")
        );
    }
}
