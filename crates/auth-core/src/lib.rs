//! # Auth Core
//!
//! 인증 플랫폼의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 인증 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 및 역할 정의
//! - 리프레시 토큰 레코드
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
