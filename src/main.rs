use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use simple_logger::SimpleLogger;

use engine_fuel_estimator::{
    app,
    config,
    form::{self, Field, RawForm, SubmitError},
    i18n::{self, Translator},
    ui_cli,
};

/// 배출가스 측정값으로 엔진 연료 소비량을 추정하는 CLI.
#[derive(Parser, Debug)]
#[command(name = "engine_fuel_estimator_cli", version, about)]
struct Cli {
    /// UI 언어 (auto, en-us, ko-kr)
    #[arg(long, short = 'L', default_value = "auto")]
    lang: String,
    /// 설정 파일 경로
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 대화형 메뉴 없이 한 번 계산한다.
    Estimate(EstimateArgs),
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// TOML 입력 레코드 파일. 플래그로 준 값이 파일 값을 덮어쓴다.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    hc: Option<String>,
    #[arg(long)]
    nox: Option<String>,
    #[arg(long)]
    co: Option<String>,
    #[arg(long)]
    co2: Option<String>,
    #[arg(long)]
    o2: Option<String>,
    /// Truck | Genset
    #[arg(long)]
    engine_type: Option<String>,
    #[arg(long)]
    engine_capacity: Option<String>,
    #[arg(long)]
    engine_size: Option<String>,
    #[arg(long)]
    engine_rpm: Option<String>,
    #[arg(long)]
    engine_load: Option<String>,
    /// Diesel | Petrol
    #[arg(long)]
    fuel_type: Option<String>,
    /// pre | post
    #[arg(long)]
    test_type: Option<String>,
    /// 중간 계수도 출력
    #[arg(long)]
    breakdown: bool,
}

impl EstimateArgs {
    fn overrides(&self) -> [(Field, &Option<String>); 12] {
        [
            (Field::Hc, &self.hc),
            (Field::Nox, &self.nox),
            (Field::Co, &self.co),
            (Field::Co2, &self.co2),
            (Field::O2, &self.o2),
            (Field::EngineType, &self.engine_type),
            (Field::EngineCapacity, &self.engine_capacity),
            (Field::EngineSize, &self.engine_size),
            (Field::EngineRpm, &self.engine_rpm),
            (Field::EngineLoad, &self.engine_load),
            (Field::FuelType, &self.fuel_type),
            (Field::TestType, &self.test_type),
        ]
    }
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() -> ExitCode {
    let cli = Cli::parse();
    let (mut cfg, load_err) = config::load_or_fallback(&cli.config);
    if let Err(err) = SimpleLogger::new().with_level(cfg.log_level_filter()).init() {
        eprintln!("Error: {err}");
    }
    if let Some(err) = load_err {
        log::warn!("{}: {err}; using default settings", cli.config.display());
    }

    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let mut tr = Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());

    let result = match &cli.command {
        None => app::run(&mut cfg, &mut tr).map(|_| ExitCode::SUCCESS),
        Some(Command::Estimate(args)) => {
            estimate_once(args, &tr, &mut io::stdout(), &mut io::stderr()).map(ExitCode::from)
        }
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            ui_cli::print_error(&tr, &err);
            ExitCode::FAILURE
        }
    }
}

/// `--input` 파일 값 위에 플래그 값을 덮어써 폼을 만든다.
fn build_form(args: &EstimateArgs) -> Result<RawForm, app::AppError> {
    let mut raw = match &args.input {
        Some(path) => RawForm::from_record(&app::load_input_file(path)?),
        None => RawForm::new(),
    };
    for (field, value) in args.overrides() {
        if let Some(v) = value {
            raw.set(field, v.clone());
        }
    }
    Ok(raw)
}

/// 필드 오류가 있을 때의 종료 코드.
const EXIT_INVALID_FIELDS: u8 = 2;

/// 한 번 계산하고 종료 코드를 돌려준다. 결과는 `out`, 필드 오류는 `err`로 쓴다.
fn estimate_once<O: Write, E: Write>(
    args: &EstimateArgs,
    tr: &Translator,
    out: &mut O,
    err: &mut E,
) -> Result<u8, app::AppError> {
    let raw = build_form(args)?;
    match form::submit(&raw) {
        Ok(submission) => {
            writeln!(out, "{}", submission.message)?;
            if args.breakdown {
                let b = submission.breakdown;
                writeln!(
                    out,
                    "emissions_factor={} engine_factor={} fuel_factor={} consumption={}",
                    b.emissions_factor, b.engine_factor, b.fuel_factor, b.consumption
                )?;
            }
            Ok(0)
        }
        Err(SubmitError::Invalid(errors)) => {
            for e in errors.iter() {
                writeln!(err, "--{}: {}", e.field.name().replace('_', "-"), e.message(tr))?;
            }
            Ok(EXIT_INVALID_FIELDS)
        }
        Err(SubmitError::Estimate(e)) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_fuel_estimator::{EngineType, FuelType, InputRecord, TestType};
    use std::fs;

    fn args(argv: &[&str]) -> EstimateArgs {
        let cli = Cli::try_parse_from(
            ["engine_fuel_estimator_cli", "estimate"]
                .iter()
                .chain(argv.iter())
                .copied(),
        )
        .unwrap();
        match cli.command {
            Some(Command::Estimate(args)) => args,
            None => panic!("estimate subcommand expected"),
        }
    }

    fn run(args: &EstimateArgs) -> (u8, String, String) {
        let tr = Translator::new("en-us");
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = estimate_once(args, &tr, &mut out, &mut err).unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    const FULL: &[&str] = &[
        "--hc", "100", "--nox", "200", "--co", "1", "--co2", "5", "--o2", "2",
        "--engine-type", "Genset", "--engine-capacity", "50", "--engine-size", "5",
        "--engine-rpm", "1500", "--engine-load", "80", "--fuel-type", "Diesel",
        "--test-type", "pre",
    ];

    #[test]
    fn flags_only_estimate() {
        let (code, out, err) = run(&args(FULL));
        assert_eq!(code, 0);
        assert_eq!(out.trim(), "Fuel consumption: 12.94 L/h");
        assert!(err.is_empty());
    }

    #[test]
    fn flag_overrides_input_file() {
        let dir = std::env::temp_dir().join(format!("fuel_cli_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("inputs.toml");
        let record = InputRecord {
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
        };
        app::save_input_file(&path, &record).unwrap();
        let path_str = path.to_string_lossy().to_string();

        let a = args(&["--input", &path_str, "--engine-type", "Truck"]);
        let raw = build_form(&a).unwrap();
        assert_eq!(raw.get(Field::EngineType), Some("Truck"));
        assert_eq!(raw.get(Field::Hc), Some("100"));

        let (code, out, _) = run(&a);
        assert_eq!(code, 0);
        assert_eq!(out.trim(), "Fuel consumption: 0.13 L/km");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn invalid_fields_exit_with_flag_messages() {
        let argv: Vec<&str> = FULL
            .iter()
            .map(|a| match *a {
                "80" => "150",
                "Diesel" => "Coal",
                other => other,
            })
            .collect();
        let (code, out, err) = run(&args(&argv));
        assert_eq!(code, EXIT_INVALID_FIELDS);
        assert!(out.is_empty());
        let lines: Vec<&str> = err.lines().collect();
        assert_eq!(
            lines,
            vec![
                "--engine-load: Number must be between 0 and 100.",
                "--fuel-type: Not a valid choice.",
            ]
        );
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let a = args(&["--input", "/nonexistent/fuel_inputs.toml"]);
        assert!(matches!(build_form(&a), Err(app::AppError::Io(_))));
    }
}
