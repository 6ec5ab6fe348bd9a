//! 액세스 토큰 서명/검증.
//!
//! 액세스 토큰은 사용자 ID, 역할, 발급/만료 시각을 담은 무상태 서명
//! 어서션입니다. 검증은 서명과 만료 확인만으로 이루어지며 저장소 조회가
//! 없습니다 — 수평 확장 시 인증 경로에 I/O가 발생하지 않습니다.
//! 그 대가로 만료 전 회수가 불가능하므로 수명을 짧게 유지하고,
//! 회수 제어는 상태 보유 리프레시 계층이 담당합니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use auth_core::{Role, TokenConfig, User};

use crate::guard::Identity;

/// 액세스 토큰 페이로드.
///
/// 동일한 입력과 발급 시각에 대해 결정적입니다 — 랜덤 필드(jti 등)를
/// 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 사용자 역할
    pub role: Role,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `user_id` - 사용자 ID
    /// * `role` - 사용자 역할
    /// * `ttl` - 발급 시점부터의 수명
    pub fn new(user_id: Uuid, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// 액세스 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingFailed(String),
    #[error("서명이 일치하지 않습니다")]
    InvalidSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("잘못된 토큰 형식")]
    Malformed,
}

impl From<TokenError> for auth_core::AuthError {
    /// 경계에서 액세스 토큰 검증 실패는 세부 원인 구분 없이
    /// `Unauthenticated`로 수렴합니다.
    fn from(_: TokenError) -> Self {
        auth_core::AuthError::Unauthenticated
    }
}

/// 액세스 토큰 서명자.
///
/// 프로세스 전역 비밀 키와 TTL을 생성 시점에 주입받습니다.
/// 만료 판정에 유예 시간(leeway)을 두지 않으므로 `exp` 시각부터는
/// 즉시 검증이 실패합니다.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    /// 토큰 설정으로 서명자 생성.
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::milliseconds(config.access_token_ttl_ms),
        }
    }

    /// 액세스 토큰 수명 반환.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 사용자에 대한 액세스 토큰 발급.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let claims = Claims::new(user.id, user.role, self.ttl);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// 액세스 토큰 검증.
    ///
    /// 순수 연산입니다 — 저장소 접근이 없습니다.
    ///
    /// # Errors
    ///
    /// - `TokenError::InvalidSignature`: 서명 불일치
    /// - `TokenError::Expired`: 현재 시각이 `exp` 이상
    /// - `TokenError::Malformed`: 파싱 불가능한 토큰
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed,
                }
            })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)?;

        Ok(Identity {
            user_id,
            role: data.claims.role,
        })
    }
}
