//! 리프레시 토큰 레코드.
//!
//! 사용자당 하나만 유효한, 수명이 긴 상태 보유 자격증명입니다.
//! 만료는 다음 검증 시점에 지연 감지되며, 폐기는 삭제로 모델링됩니다.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 토큰 값의 원본 바이트 길이.
pub const TOKEN_VALUE_BYTES: usize = 32;

/// 리프레시 토큰 레코드.
///
/// # 불변 조건
///
/// - `token` 값은 추측 불가능한 랜덤 문자열이며 저장소 전역에서 유일합니다.
/// - 한 사용자에 대해 동시에 유효한 토큰은 최대 하나입니다.
///   새 토큰 생성은 기존 토큰을 먼저 삭제합니다 (교체, 추가 아님).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    /// 불투명 토큰 값
    pub token: String,
    /// 소유 사용자
    pub user_id: Uuid,
    /// 절대 만료 시각
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// 새 리프레시 토큰 발급.
    ///
    /// # Arguments
    ///
    /// * `user_id` - 소유 사용자 ID
    /// * `ttl` - 발급 시점부터의 수명
    pub fn issue(user_id: Uuid, ttl: Duration) -> Self {
        Self {
            token: generate_token_value(),
            user_id,
            expires_at: Utc::now() + ttl,
        }
    }

    /// 토큰이 만료되었는지 확인.
    ///
    /// `expires_at` 이후(포함)이면 만료로 판정합니다.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// 랜덤 토큰 값 생성.
///
/// OS 난수 32바이트를 패딩 없는 base64url로 인코딩합니다.
pub fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_VALUE_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
