use thiserror::Error;

use crate::config::Config;
use crate::estimator::{EstimateError, InputRecord};
use crate::i18n::{self, Translator};
use crate::ui_cli;
use crate::ui_cli::MenuChoice;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    /// 추정기 전제 조건 위반
    #[error("estimate error: {0}")]
    Estimate(#[from] EstimateError),
    /// 입력 레코드 파일 파싱 오류
    #[error("input file parse error: {0}")]
    InputFile(#[from] toml::de::Error),
    /// 입력 레코드 직렬화 오류
    #[error("input file write error: {0}")]
    InputFileWrite(#[from] toml::ser::Error),
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run(config: &mut Config, tr: &mut Translator) -> Result<(), AppError> {
    log::info!("interactive session started (lang={})", tr.language_code());
    loop {
        match ui_cli::main_menu(tr)? {
            MenuChoice::Estimate => ui_cli::handle_estimate(tr, config)?,
            MenuChoice::Formula => ui_cli::handle_formula(tr),
            MenuChoice::Settings => {
                if ui_cli::handle_settings(tr, config)? {
                    let resolved = i18n::resolve_language(&config.language, None);
                    *tr = Translator::new_with_pack(&resolved, config.language_pack_dir.as_deref());
                }
                config.save()?;
            }
            MenuChoice::Exit => {
                config.save()?;
                println!("{}", tr.t(i18n::keys::APP_EXIT));
                break;
            }
        }
    }
    Ok(())
}

/// TOML 입력 레코드 파일을 읽는다.
pub fn load_input_file(path: &std::path::Path) -> Result<InputRecord, AppError> {
    let content = std::fs::read_to_string(path)?;
    let record: InputRecord = toml::from_str(&content)?;
    log::info!("input record loaded from {}", path.display());
    Ok(record)
}

/// 입력 레코드를 TOML 파일로 저장한다.
pub fn save_input_file(path: &std::path::Path, record: &InputRecord) -> Result<(), AppError> {
    let content = toml::to_string_pretty(record)?;
    std::fs::write(path, content)?;
    log::info!("input record saved to {}", path.display());
    Ok(())
}
