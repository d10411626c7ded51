use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const APP_TITLE: &str = "general.app_title";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_ESTIMATE: &str = "main_menu.estimate";
    pub const MAIN_MENU_FORMULA: &str = "main_menu.formula";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const FORM_HEADING: &str = "form.heading";
    pub const FORM_HINT: &str = "form.hint";
    pub const FORM_ERRORS_HEADING: &str = "form.errors_heading";
    pub const FORM_CALCULATE: &str = "form.calculate";
    pub const FORM_CHOICES: &str = "form.choices";

    pub const FIELD_HC: &str = "field.hc";
    pub const FIELD_NOX: &str = "field.nox";
    pub const FIELD_CO: &str = "field.co";
    pub const FIELD_CO2: &str = "field.co2";
    pub const FIELD_O2: &str = "field.o2";
    pub const FIELD_ENGINE_TYPE: &str = "field.engine_type";
    pub const FIELD_ENGINE_CAPACITY: &str = "field.engine_capacity";
    pub const FIELD_ENGINE_SIZE: &str = "field.engine_size";
    pub const FIELD_ENGINE_RPM: &str = "field.engine_rpm";
    pub const FIELD_ENGINE_LOAD: &str = "field.engine_load";
    pub const FIELD_FUEL_TYPE: &str = "field.fuel_type";
    pub const FIELD_TEST_TYPE: &str = "field.test_type";

    pub const ERROR_FIELD_REQUIRED: &str = "error.field_required";
    pub const ERROR_FIELD_NOT_A_NUMBER: &str = "error.field_not_a_number";
    pub const ERROR_FIELD_AT_LEAST: &str = "error.field_at_least";
    pub const ERROR_FIELD_BETWEEN: &str = "error.field_between";
    pub const ERROR_FIELD_INVALID_CHOICE: &str = "error.field_invalid_choice";

    pub const RESULT_BREAKDOWN: &str = "result.breakdown";
    pub const RESULT_EMISSIONS_FACTOR: &str = "result.emissions_factor";
    pub const RESULT_ENGINE_FACTOR: &str = "result.engine_factor";
    pub const RESULT_FUEL_FACTOR: &str = "result.fuel_factor";

    pub const FORMULA_HEADING: &str = "formula.heading";
    pub const FORMULA_EMISSIONS: &str = "formula.emissions";
    pub const FORMULA_ENGINE: &str = "formula.engine";
    pub const FORMULA_FUEL: &str = "formula.fuel";
    pub const FORMULA_RESULT: &str = "formula.result";
    pub const FORMULA_UNUSED: &str = "formula.unused";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_CURRENT: &str = "settings.current";
    pub const SETTINGS_OPTIONS: &str = "settings.options";
    pub const SETTINGS_PROMPT_LANGUAGE: &str = "settings.prompt_language";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
    pub const SETTINGS_SAVED: &str = "settings.saved";
    pub const SETTINGS_DEFAULTS_HEADING: &str = "settings.defaults_heading";
    pub const SETTINGS_DEFAULT_INVALID: &str = "settings.default_invalid";
    pub const SETTINGS_DEFAULTS_SAVED: &str = "settings.defaults_saved";

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(ko/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 en으로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code))
            .or_else(|| built_in_pack(lang_code));
        if overrides.is_some() {
            log::info!("language pack loaded for {lang_code}");
        }
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn language_code(&self) -> &'static str {
        self.lang.as_code()
    }

    /// 키를 조회해 문자열을 반환한다. 언어팩에 없으면 None.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.overrides.as_ref().and_then(|m| m.get(key).cloned())
    }

    /// 번역을 가져온다. 언어팩 → 내장 문자열 → 영어 순으로 찾는다.
    pub fn t(&self, key: &str) -> String {
        if let Some(v) = self.lookup(key) {
            return v;
        }
        let builtin = match self.lang {
            Language::Ko => ko(key).or_else(|| en(key)),
            Language::En => en(key),
        };
        builtin.unwrap_or("[missing translation]").to_string()
    }
}

/// `{name}` 자리표시자를 값으로 치환한다.
pub fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko-kr".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko-kr".into()),
        "en" => Some("en-us".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(loc) = get_locale() {
        if let Some(lang) = normalize_locale_string(&loc) {
            return Some(lang);
        }
    }
    for var in ["LANG", "LC_ALL"] {
        if let Ok(lang) = std::env::var(var) {
            if let Some(code) = normalize_locale_string(&lang) {
                return Some(code);
            }
        }
    }
    None
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 또는 [section] 테이블.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    // 1) full code (e.g., en-us)
    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    // 2) base code (e.g., en)
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

pub(crate) fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// 내장 언어팩(파일이 없어도 동작하도록 빌드 시 포함).
fn built_in_pack(lang: &str) -> Option<HashMap<String, String>> {
    match lang.to_lowercase().as_str() {
        "ko-kr" | "ko" => parse_toml_to_map(include_str!("../locales/ko-kr.toml")),
        _ => None,
    }
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        APP_TITLE => "엔진 연료 소비량 추정기",
        MAIN_MENU_TITLE => "\n=== 엔진 연료 소비량 추정기 ===",
        MAIN_MENU_ESTIMATE => "1) 연료 소비량 계산",
        MAIN_MENU_FORMULA => "2) 계산식 보기",
        MAIN_MENU_SETTINGS => "3) 설정",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        FORM_HEADING => "\n-- 연료 소비량 계산 --",
        FORM_HINT => "엔터만 누르면 [ ] 안의 값을 사용합니다.",
        FORM_ERRORS_HEADING => "입력값을 확인하세요:",
        FORM_CALCULATE => "계산",
        FORM_CHOICES => "선택지",
        FIELD_HC => "탄화수소 (HC) [ppm]",
        FIELD_NOX => "질소산화물 (NOx) [ppm]",
        FIELD_CO => "일산화탄소 (CO) [%]",
        FIELD_CO2 => "이산화탄소 (CO2) [%]",
        FIELD_O2 => "산소 (O2) [%]",
        FIELD_ENGINE_TYPE => "엔진 종류",
        FIELD_ENGINE_CAPACITY => "엔진 용량 [kW]",
        FIELD_ENGINE_SIZE => "배기량 [L]",
        FIELD_ENGINE_RPM => "엔진 회전수 [rpm]",
        FIELD_ENGINE_LOAD => "엔진 부하 [%]",
        FIELD_FUEL_TYPE => "연료 종류",
        FIELD_TEST_TYPE => "시험 구분",
        ERROR_FIELD_REQUIRED => "필수 입력 항목입니다.",
        ERROR_FIELD_NOT_A_NUMBER => "올바른 숫자가 아닙니다.",
        ERROR_FIELD_AT_LEAST => "{min} 이상이어야 합니다.",
        ERROR_FIELD_BETWEEN => "{min}~{max} 범위여야 합니다.",
        ERROR_FIELD_INVALID_CHOICE => "선택지에 없는 값입니다.",
        RESULT_BREAKDOWN => "계산 내역",
        RESULT_EMISSIONS_FACTOR => "배출 계수",
        RESULT_ENGINE_FACTOR => "엔진 계수",
        RESULT_FUEL_FACTOR => "연료 계수",
        FORMULA_HEADING => "\n-- 계산식 --",
        FORMULA_EMISSIONS => "배출 계수 = (HC + NOx)/1,000,000 + CO/100 + CO2/100",
        FORMULA_ENGINE => "엔진 계수 = 용량 × 배기량 × (RPM/1000) × (부하/100)",
        FORMULA_FUEL => "연료 계수 = 밀도 × 탄소 함량 (경유 0.832×0.86, 휘발유 0.745×0.85)",
        FORMULA_RESULT => "소비량 = 배출 × 엔진 × 연료; Genset은 L/h, Truck은 /100 하여 L/km (평균 100 km/h 가정)",
        FORMULA_UNUSED => "O2와 시험 구분은 입력만 받고 계산에는 쓰지 않습니다.",
        SETTINGS_HEADING => "\n-- 설정 --",
        SETTINGS_CURRENT => "현재 언어:",
        SETTINGS_OPTIONS => "1) 자동  2) English  3) 한국어",
        SETTINGS_PROMPT_LANGUAGE => "변경할 번호(취소하려면 엔터): ",
        SETTINGS_INVALID => "잘못된 입력이므로 변경하지 않습니다.",
        SETTINGS_SAVED => "언어가 변경되었습니다:",
        SETTINGS_DEFAULTS_HEADING => "폼 기본 선택값 (엔터는 현재 값 유지)",
        SETTINGS_DEFAULT_INVALID => "선택지에 없는 값이므로 기존 값을 유지합니다.",
        SETTINGS_DEFAULTS_SAVED => "기본 선택값:",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting application.",
        APP_TITLE => "Engine Fuel Consumption Estimator",
        MAIN_MENU_TITLE => "\n=== Engine Fuel Consumption Estimator ===",
        MAIN_MENU_ESTIMATE => "1) Estimate fuel consumption",
        MAIN_MENU_FORMULA => "2) Formula reference",
        MAIN_MENU_SETTINGS => "3) Settings",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please try again.",
        FORM_HEADING => "\n-- Fuel Consumption --",
        FORM_HINT => "Press enter to keep the value in [ ].",
        FORM_ERRORS_HEADING => "Please correct the following:",
        FORM_CALCULATE => "Calculate",
        FORM_CHOICES => "choices",
        FIELD_HC => "Hydrocarbons (HC) in PPM",
        FIELD_NOX => "Nitrogen Oxides (NOx) in PPM",
        FIELD_CO => "Carbon Monoxide (CO) in %",
        FIELD_CO2 => "Carbon Dioxide (CO2) in %",
        FIELD_O2 => "Oxygen (O2) in %",
        FIELD_ENGINE_TYPE => "Engine Type",
        FIELD_ENGINE_CAPACITY => "Engine Capacity (kW)",
        FIELD_ENGINE_SIZE => "Engine Size (L)",
        FIELD_ENGINE_RPM => "Engine RPM",
        FIELD_ENGINE_LOAD => "Engine Load (%)",
        FIELD_FUEL_TYPE => "Fuel Type",
        FIELD_TEST_TYPE => "Test Type",
        ERROR_FIELD_REQUIRED => "This field is required.",
        ERROR_FIELD_NOT_A_NUMBER => "Not a valid float value.",
        ERROR_FIELD_AT_LEAST => "Number must be at least {min}.",
        ERROR_FIELD_BETWEEN => "Number must be between {min} and {max}.",
        ERROR_FIELD_INVALID_CHOICE => "Not a valid choice.",
        RESULT_BREAKDOWN => "Breakdown",
        RESULT_EMISSIONS_FACTOR => "Emissions factor",
        RESULT_ENGINE_FACTOR => "Engine factor",
        RESULT_FUEL_FACTOR => "Fuel factor",
        FORMULA_HEADING => "\n-- Formula reference --",
        FORMULA_EMISSIONS => "Emissions factor = (HC + NOx)/1,000,000 + CO/100 + CO2/100",
        FORMULA_ENGINE => "Engine factor = capacity × size × (RPM/1000) × (load/100)",
        FORMULA_FUEL => "Fuel factor = density × carbon content (Diesel 0.832×0.86, Petrol 0.745×0.85)",
        FORMULA_RESULT => "Consumption = emissions × engine × fuel; Genset in L/h, Truck /100 in L/km (100 km/h average speed)",
        FORMULA_UNUSED => "O2 and test type are accepted but not used by the formula.",
        SETTINGS_HEADING => "\n-- Settings --",
        SETTINGS_CURRENT => "Current language:",
        SETTINGS_OPTIONS => "1) Auto  2) English  3) 한국어",
        SETTINGS_PROMPT_LANGUAGE => "Enter number to change (enter to cancel): ",
        SETTINGS_INVALID => "Invalid input; language unchanged.",
        SETTINGS_SAVED => "Language changed to:",
        SETTINGS_DEFAULTS_HEADING => "Form default selections (enter keeps current)",
        SETTINGS_DEFAULT_INVALID => "Not a valid choice; keeping the current value.",
        SETTINGS_DEFAULTS_SAVED => "Default selections:",
        _ => return None,
    })
}
