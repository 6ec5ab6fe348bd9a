//! 사용자 레코드.
//!
//! 저장소가 소유하는 사용자 레코드와, 서비스 계층 밖으로 나가는
//! 민감 정보 제거 프로젝션을 정의합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// 사용자 레코드.
///
/// # 불변 조건
///
/// - `email`은 저장 시점에 유일성이 보장됩니다 (대소문자 구분 정확 일치).
/// - `password_hash`는 단방향 해시이며 이 레코드 밖으로 노출되지 않습니다.
/// - 레코드는 삭제되지 않습니다. 계정 차단은 `enabled = false`로 표현합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// PHC 형식의 비밀번호 해시 (불투명 검증자)
    pub password_hash: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 새 사용자 레코드 생성.
    ///
    /// 가입 경로에서만 호출됩니다. 역할은 항상 `Role::User`,
    /// 계정은 활성 상태로 시작합니다.
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash,
            role: Role::User,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// 민감 정보가 제거된 프로젝션 반환.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            enabled: self.enabled,
            created_at: self.created_at,
        }
    }
}

/// 외부로 노출 가능한 사용자 프로젝션.
///
/// 비밀번호 해시를 절대 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}
