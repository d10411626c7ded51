use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::{EngineType, TestType};
use crate::fuel::FuelType;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 폼 선택 항목의 기본값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub engine_type: EngineType,
    pub fuel_type: FuelType,
    pub test_type: TestType,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            engine_type: EngineType::Genset,
            fuel_type: FuelType::Diesel,
            test_type: TestType::Pre,
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드 (auto, en-us, ko-kr)
    pub language: String,
    /// 언어팩 디렉터리 (없으면 locales/)
    pub language_pack_dir: Option<String>,
    /// 로그 레벨 (error, warn, info, debug, trace, off)
    pub log_level: String,
    /// GUI 창 투명도 (0.3~1.0)
    pub window_alpha: f32,
    pub defaults: FormDefaults,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            language_pack_dir: None,
            log_level: "warn".to_string(),
            window_alpha: 1.0,
            defaults: FormDefaults::default(),
            path: None,
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 파일 입출력 오류
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML 역직렬화 오류
    #[error("config parse error: {0}")]
    Serde(#[from] toml::de::Error),
    /// TOML 직렬화 오류
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 지정한 경로의 설정을 로드한다. 파일이 없으면 기본 설정을 만들어 저장한다.
pub fn load_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let mut cfg = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str::<Config>(&content)?
    } else {
        let cfg = Config::default();
        save_config(&cfg, path)?;
        log::info!("default config written to {}", path.display());
        cfg
    };
    cfg.path = Some(path.to_path_buf());
    Ok(cfg)
}

/// 설정을 로드하되 실패하면 기본 설정과 오류를 함께 돌려준다.
/// 로거 초기화 전에 호출되므로 오류 기록은 호출자가 한다.
pub fn load_or_fallback(path: impl AsRef<Path>) -> (Config, Option<ConfigError>) {
    match load_from(path) {
        Ok(cfg) => (cfg, None),
        Err(err) => (Config::default(), Some(err)),
    }
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 로드했던 파일(기본 config.toml)에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        save_config(self, &path)
    }

    /// 로그 레벨 문자열을 해석한다. 잘못된 값이면 Warn.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Warn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
        let cfg: Config = toml::from_str("language = \"ko-kr\"\n").unwrap();
        assert_eq!(cfg.language, "ko-kr");
        assert_eq!(cfg.defaults, FormDefaults::default());
        assert_eq!(cfg.log_level_filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("fuel_cfg_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        let mut cfg = load_from(&path).unwrap();
        assert!(path.exists());
        cfg.defaults.fuel_type = FuelType::Petrol;
        cfg.log_level = "debug".into();
        cfg.save().unwrap();

        let reloaded = load_from(&path).unwrap();
        assert_eq!(reloaded.defaults.fuel_type, FuelType::Petrol);
        assert_eq!(reloaded.log_level_filter(), log::LevelFilter::Debug);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn broken_file_falls_back_without_rewriting() {
        let dir = std::env::temp_dir().join(format!("fuel_cfg_bad_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "language = [unterminated").unwrap();

        let (cfg, err) = load_or_fallback(&path);
        let err = err.unwrap();
        assert!(err.to_string().starts_with("config parse error"), "{err}");
        assert!(matches!(err, ConfigError::Serde(_)));
        assert_eq!(cfg, Config::default());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "language = [unterminated"
        );
        fs::remove_dir_all(&dir).unwrap();
    }
}
