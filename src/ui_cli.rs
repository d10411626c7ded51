use std::io::{self, BufRead, Write};

use crate::app::AppError;
use crate::config::{Config, FormDefaults};
use crate::estimator::ConsumptionBreakdown;
use crate::form::{self, Field, FieldKind, FormErrors, RawForm, SubmitError, FIELDS};
use crate::i18n::{self, keys, Translator};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Estimate,
    Formula,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다. 입력이 끝나면(EOF) 종료로 본다.
pub fn main_menu(tr: &Translator) -> Result<MenuChoice, AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    writeln!(out, "{}", tr.t(keys::MAIN_MENU_TITLE))?;
    for key in [
        keys::MAIN_MENU_ESTIMATE,
        keys::MAIN_MENU_FORMULA,
        keys::MAIN_MENU_SETTINGS,
        keys::MAIN_MENU_EXIT,
    ] {
        writeln!(out, "{}", tr.t(key))?;
    }
    loop {
        let Some(sel) = read_line(&mut input, &mut out, &tr.t(keys::PROMPT_MENU_SELECT))? else {
            return Ok(MenuChoice::Exit);
        };
        match sel.trim() {
            "1" => return Ok(MenuChoice::Estimate),
            "2" => return Ok(MenuChoice::Formula),
            "3" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => writeln!(out, "{}", tr.t(keys::INVALID_SELECTION_RETRY))?,
        }
    }
}

/// 연료 소비량 계산 폼을 처리한다. 검증 실패 시 오류와 함께 폼을 다시 보여준다.
pub fn handle_estimate(tr: &Translator, cfg: &Config) -> Result<(), AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    run_estimate_form(&mut input, &mut out, tr, &cfg.defaults)
}

/// 입출력을 주입받는 계산 폼 루프.
pub fn run_estimate_form<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    tr: &Translator,
    defaults: &FormDefaults,
) -> Result<(), AppError> {
    writeln!(out, "{}", tr.t(keys::FORM_HEADING))?;
    writeln!(out, "{}", tr.t(keys::FORM_HINT))?;
    let mut raw = initial_form(defaults);
    loop {
        let Some(filled) = collect_form(input, out, tr, &raw)? else {
            return Ok(());
        };
        raw = filled;
        match form::submit(&raw) {
            Ok(submission) => {
                writeln!(out, "{}", submission.message)?;
                print_breakdown(out, tr, &submission.breakdown)?;
                return Ok(());
            }
            Err(SubmitError::Invalid(errors)) => {
                print_errors(out, tr, &errors)?;
            }
            Err(SubmitError::Estimate(e)) => {
                log::warn!("estimate rejected: {e}");
                writeln!(out, "{}: {e}", tr.t(keys::ERROR_PREFIX))?;
            }
        }
    }
}

/// 설정의 기본 선택값으로 빈 폼을 만든다.
pub fn initial_form(defaults: &FormDefaults) -> RawForm {
    RawForm::new()
        .with(Field::EngineType, defaults.engine_type.as_str())
        .with(Field::FuelType, defaults.fuel_type.as_str())
        .with(Field::TestType, defaults.test_type.as_str())
}

/// 모든 필드를 순서대로 입력받는다. 빈 입력은 기존 값을 유지한다.
/// 입력 스트림이 끝나면 None.
pub fn collect_form<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    tr: &Translator,
    previous: &RawForm,
) -> Result<Option<RawForm>, AppError> {
    let mut raw = previous.clone();
    for spec in FIELDS.iter() {
        let current = previous.get(spec.field).unwrap_or("").trim().to_string();
        if let FieldKind::Select(choices) = spec.kind {
            writeln!(out, "  {}: {}", tr.t(keys::FORM_CHOICES), list_choices(choices))?;
        }
        let prompt = format!("{} [{current}]: ", tr.t(spec.label_key));
        let Some(line) = read_line(input, out, &prompt)? else {
            return Ok(None);
        };
        let entered = line.trim();
        if entered.is_empty() {
            continue;
        }
        let value = match spec.kind {
            FieldKind::Select(choices) => select_value(choices, entered),
            FieldKind::Number { .. } => entered.to_string(),
        };
        raw.set(spec.field, value);
    }
    Ok(Some(raw))
}

fn list_choices(choices: &[(&str, &str)]) -> String {
    choices
        .iter()
        .enumerate()
        .map(|(i, (_, label))| format!("{}={label}", i + 1))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 번호(1부터)로 고른 선택지 값. 번호가 아니면 입력 그대로.
fn select_value(choices: &[(&str, &str)], entered: &str) -> String {
    entered
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| choices.get(i))
        .map(|(v, _)| v.to_string())
        .unwrap_or_else(|| entered.to_string())
}

fn print_errors<W: Write>(out: &mut W, tr: &Translator, errors: &FormErrors) -> io::Result<()> {
    writeln!(out, "{}", tr.t(keys::FORM_ERRORS_HEADING))?;
    for err in errors.iter() {
        writeln!(
            out,
            "  - {}: {}",
            tr.t(err.field.spec().label_key),
            err.message(tr)
        )?;
    }
    Ok(())
}

fn print_breakdown<W: Write>(
    out: &mut W,
    tr: &Translator,
    b: &ConsumptionBreakdown,
) -> io::Result<()> {
    writeln!(out, "{}:", tr.t(keys::RESULT_BREAKDOWN))?;
    writeln!(
        out,
        "  {}: {:.6}",
        tr.t(keys::RESULT_EMISSIONS_FACTOR),
        b.emissions_factor
    )?;
    writeln!(
        out,
        "  {}: {:.4}",
        tr.t(keys::RESULT_ENGINE_FACTOR),
        b.engine_factor
    )?;
    writeln!(out, "  {}: {:.6}", tr.t(keys::RESULT_FUEL_FACTOR), b.fuel_factor)?;
    Ok(())
}

/// 계산식 설명을 출력한다.
pub fn handle_formula(tr: &Translator) {
    for key in [
        keys::FORMULA_HEADING,
        keys::FORMULA_EMISSIONS,
        keys::FORMULA_ENGINE,
        keys::FORMULA_FUEL,
        keys::FORMULA_RESULT,
        keys::FORMULA_UNUSED,
    ] {
        println!("{}", tr.t(key));
    }
}

/// 설정 메뉴를 처리한다. 언어가 바뀌었으면 true.
pub fn handle_settings(tr: &Translator, cfg: &mut Config) -> Result<bool, AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    run_settings(&mut input, &mut out, tr, cfg)
}

/// 입출력을 주입받는 설정 화면. 언어와 폼 기본 선택값을 바꾼다.
pub fn run_settings<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    tr: &Translator,
    cfg: &mut Config,
) -> Result<bool, AppError> {
    writeln!(out, "{}", tr.t(keys::SETTINGS_HEADING))?;
    writeln!(out, "{} {}", tr.t(keys::SETTINGS_CURRENT), cfg.language)?;
    writeln!(out, "{}", tr.t(keys::SETTINGS_OPTIONS))?;
    let Some(sel) = read_line(input, out, &tr.t(keys::SETTINGS_PROMPT_LANGUAGE))? else {
        return Ok(false);
    };
    let language = match sel.trim() {
        "" => None,
        "1" => Some("auto"),
        "2" => Some("en-us"),
        "3" => Some("ko-kr"),
        _ => {
            writeln!(out, "{}", tr.t(keys::SETTINGS_INVALID))?;
            None
        }
    };
    let changed = if let Some(language) = language {
        cfg.language = language.to_string();
        writeln!(out, "{} {}", tr.t(keys::SETTINGS_SAVED), cfg.language)?;
        log::info!("language set to {}", cfg.language);
        true
    } else {
        false
    };

    writeln!(out, "{}", tr.t(keys::SETTINGS_DEFAULTS_HEADING))?;
    let defaults = &mut cfg.defaults;
    if let Some(v) = prompt_default(input, out, tr, Field::EngineType, defaults.engine_type.as_str())? {
        defaults.engine_type = v;
    }
    if let Some(v) = prompt_default(input, out, tr, Field::FuelType, defaults.fuel_type.as_str())? {
        defaults.fuel_type = v;
    }
    if let Some(v) = prompt_default(input, out, tr, Field::TestType, defaults.test_type.as_str())? {
        defaults.test_type = v;
    }
    writeln!(
        out,
        "{} {} / {} / {}",
        tr.t(keys::SETTINGS_DEFAULTS_SAVED),
        defaults.engine_type,
        defaults.fuel_type,
        defaults.test_type.label()
    )?;
    log::info!(
        "form defaults: {} {} {}",
        defaults.engine_type,
        defaults.fuel_type,
        defaults.test_type.as_str()
    );
    Ok(changed)
}

/// 선택 필드 하나의 기본값을 묻는다. 빈 입력, 잘못된 값, EOF는 None.
fn prompt_default<T, R, W>(
    input: &mut R,
    out: &mut W,
    tr: &Translator,
    field: Field,
    current: &str,
) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    R: BufRead,
    W: Write,
{
    let spec = field.spec();
    let FieldKind::Select(choices) = spec.kind else {
        return Ok(None);
    };
    writeln!(out, "  {}: {}", tr.t(keys::FORM_CHOICES), list_choices(choices))?;
    let prompt = format!("{} [{current}]: ", tr.t(spec.label_key));
    let Some(line) = read_line(input, out, &prompt)? else {
        return Ok(None);
    };
    let entered = line.trim();
    if entered.is_empty() {
        return Ok(None);
    }
    match select_value(choices, entered).parse::<T>() {
        Ok(v) => Ok(Some(v)),
        Err(_) => {
            writeln!(out, "{}", tr.t(keys::SETTINGS_DEFAULT_INVALID))?;
            Ok(None)
        }
    }
}

fn read_line<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> Result<Option<String>, AppError> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf))
}

/// 프롬프트 없이 에러 접두어와 함께 메시지를 출력한다.
pub fn print_error(tr: &Translator, err: &dyn std::error::Error) {
    eprintln!("{}: {err}", tr.t(i18n::keys::ERROR_PREFIX));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineType, TestType};
    use crate::fuel::FuelType;
    use std::io::Cursor;

    fn run(script: &str) -> String {
        let tr = Translator::new("en-us");
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run_estimate_form(&mut input, &mut out, &tr, &FormDefaults::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn defaults_fill_select_fields() {
        // hc nox co co2 o2 | type(default) cap size rpm load | fuel(default) test(default)
        let out = run("100\n200\n1\n5\n2\n\n50\n5\n1500\n80\n\n\n");
        assert!(out.contains("Fuel consumption: 12.94 L/h"), "{out}");
    }

    #[test]
    fn select_by_number() {
        let out = run("100\n200\n1\n5\n2\n1\n50\n5\n1500\n80\n1\n2\n");
        assert!(out.contains("Fuel consumption: 0.13 L/km"), "{out}");
    }

    #[test]
    fn invalid_entries_are_reported_then_corrected() {
        let first = "abc\n200\n1\n5\n2\n\n50\n5\n1500\n180\n\n\n";
        let second = "100\n\n\n\n\n\n\n\n\n80\n\n\n";
        let out = run(&format!("{first}{second}"));
        assert!(out.contains("Please correct the following:"));
        assert!(out.contains("Not a valid float value."));
        assert!(out.contains("Number must be between 0 and 100."));
        assert!(out.contains("Fuel consumption: 12.94 L/h"), "{out}");
    }

    #[test]
    fn overflowing_result_is_reported_and_form_reprompted() {
        let first = "1e308\n1e308\n1\n5\n2\n\n50\n5\n1500\n0\n\n\n";
        let second = "100\n200\n\n\n\n\n\n\n\n80\n\n\n";
        let out = run(&format!("{first}{second}"));
        assert!(out.contains("invalid input"), "{out}");
        assert!(out.contains("Fuel consumption: 12.94 L/h"), "{out}");
    }

    fn settings(script: &str, cfg: &mut Config) -> (bool, String) {
        let tr = Translator::new("en-us");
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let changed = run_settings(&mut input, &mut out, &tr, cfg).unwrap();
        (changed, String::from_utf8(out).unwrap())
    }

    #[test]
    fn settings_change_language_and_defaults() {
        let mut cfg = Config::default();
        // language=ko-kr, engine=1(Truck), fuel=Petrol, test=2(post)
        let (changed, _) = settings("3\n1\nPetrol\n2\n", &mut cfg);
        assert!(changed);
        assert_eq!(cfg.language, "ko-kr");
        assert_eq!(cfg.defaults.engine_type, EngineType::Truck);
        assert_eq!(cfg.defaults.fuel_type, FuelType::Petrol);
        assert_eq!(cfg.defaults.test_type, TestType::Post);
        assert_eq!(
            initial_form(&cfg.defaults).get(Field::EngineType),
            Some("Truck")
        );
    }

    #[test]
    fn settings_blank_entries_keep_everything() {
        let mut cfg = Config::default();
        let (changed, out) = settings("\n\n\n\n", &mut cfg);
        assert!(!changed);
        assert_eq!(cfg, Config::default());
        assert!(out.contains("Default selections: Genset / Diesel / Pre-emission"), "{out}");
    }

    #[test]
    fn settings_invalid_entries_are_ignored() {
        let mut cfg = Config::default();
        let (changed, out) = settings("9\nTractor\n7\n\n", &mut cfg);
        assert!(!changed);
        assert_eq!(cfg.language, "auto");
        assert_eq!(cfg.defaults, FormDefaults::default());
        assert!(out.contains("Invalid input; language unchanged."));
        assert!(out.contains("Not a valid choice; keeping the current value."));
    }

    #[test]
    fn eof_abandons_form() {
        let out = run("100\n");
        assert!(!out.contains("Fuel consumption"));
    }
}
