//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할 정의.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 엔드포인트 접근 권한을 결정하는 단순 태그입니다.
/// 역할 간 계층 구조는 없습니다 — 권한 검사는 요구 역할과의
/// 정확한 일치로만 판정됩니다 (Admin이라고 해서 User 전용
/// 검사를 자동으로 통과하지 않습니다).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// 일반 사용자
    User,
    /// 관리자 - 사용자 관리 작업 수행 가능
    Admin,
}

impl Role {
    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        };
        write!(f, "{}", s)
    }
}
