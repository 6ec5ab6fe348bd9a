//! 권한 검사.
//!
//! 토큰 검증을 통과한 신원에 대해 역할 요구사항을 평가합니다.
//! 신원은 전역/스레드 로컬 컨텍스트가 아니라 명시적 인자로 전달됩니다.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use auth_core::{AuthError, Role};

/// 검증된 요청 신원.
///
/// [`TokenSigner::verify`](crate::token::TokenSigner::verify)가 반환하는,
/// 서명과 만료 확인을 이미 통과한 신원입니다. 만료/변조/형식 오류 토큰은
/// 이 타입이 만들어지기 전에 `Unauthenticated`로 거부됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

/// 요구 역할 검사.
///
/// 순수 함수이며 부수 효과가 없습니다. 역할이 요구 역할과 정확히
/// 일치할 때만 허용합니다 — 역할 간 계층이 없으므로 Admin이 User
/// 전용 검사를 자동으로 통과하지 않습니다.
///
/// # Errors
///
/// 역할 불일치 시 `AuthError::Forbidden`
pub fn require_role(identity: &Identity, required: Role) -> Result<(), AuthError> {
    if identity.role == required {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
