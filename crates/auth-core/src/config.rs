//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! TTL 값과 서명 비밀 키는 전역 상태가 아니라 이 구조체를 통해
//! 각 구성 요소 생성 시점에 주입됩니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 토큰 설정
    pub token: TokenConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 토큰 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// 액세스 토큰 서명 비밀 키 (HS256)
    ///
    /// 운영 환경에서는 반드시 환경 변수로 재설정해야 합니다.
    pub secret: String,
    /// 액세스 토큰 수명 (밀리초)
    pub access_token_ttl_ms: i64,
    /// 리프레시 토큰 수명 (밀리초)
    pub refresh_token_ttl_ms: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "development-secret-key-change-in-production".to_string(),
            // 15분
            access_token_ttl_ms: 900_000,
            // 7일
            refresh_token_ttl_ms: 604_800_000,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("token.access_token_ttl_ms", 900_000i64)?
            .set_default("token.refresh_token_ttl_ms", 604_800_000i64)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드 (예: AUTH__TOKEN__SECRET)
            .add_source(
                config::Environment::with_prefix("AUTH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
