//! 사용자 관리 서비스.
//!
//! 관리자 전용 사용자 관리 작업(목록/조회/활성화/비활성화/역할 변경)과
//! 본인 프로필 조회를 제공합니다. 모든 관리 작업은 권한 가드 뒤에
//! 있으며, 호출자의 신원은 명시적 인자로 전달됩니다.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use auth_core::{AuthError, Role, UserProfile};

use crate::guard::{require_role, Identity};
use crate::repository::UserStore;
use crate::services::refresh_token::RefreshTokenManager;

/// 사용자 관리 서비스.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenManager,
}

impl UserService {
    /// 새 사용자 서비스 생성.
    pub fn new(users: Arc<dyn UserStore>, refresh_tokens: RefreshTokenManager) -> Self {
        Self {
            users,
            refresh_tokens,
        }
    }

    /// 본인 프로필 조회.
    ///
    /// # Errors
    ///
    /// - `AuthError::UserNotFound`: 신원의 사용자 ID가 해석되지 않음
    pub async fn current_user(&self, identity: &Identity) -> Result<UserProfile, AuthError> {
        let user = self
            .users
            .find_user_by_id(identity.user_id)
            .await?
            .ok_or(AuthError::UserNotFound(identity.user_id))?;

        Ok(user.profile())
    }

    /// 전체 사용자 목록 조회 (관리자 전용).
    ///
    /// # Errors
    ///
    /// - `AuthError::Forbidden`: 호출자가 관리자가 아님
    pub async fn list_users(&self, actor: &Identity) -> Result<Vec<UserProfile>, AuthError> {
        require_role(actor, Role::Admin)?;

        let users = self.users.list_users().await?;
        Ok(users.iter().map(|u| u.profile()).collect())
    }

    /// ID로 사용자 조회 (관리자 전용).
    ///
    /// # Errors
    ///
    /// - `AuthError::Forbidden`: 호출자가 관리자가 아님
    /// - `AuthError::UserNotFound`: 존재하지 않는 사용자
    pub async fn get_user(&self, actor: &Identity, id: Uuid) -> Result<UserProfile, AuthError> {
        require_role(actor, Role::Admin)?;

        let user = self
            .users
            .find_user_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound(id))?;

        Ok(user.profile())
    }

    /// 계정 활성화 (관리자 전용).
    ///
    /// # Errors
    ///
    /// - `AuthError::Forbidden`: 호출자가 관리자가 아님
    /// - `AuthError::UserNotFound`: 존재하지 않는 사용자
    pub async fn enable_user(&self, actor: &Identity, id: Uuid) -> Result<UserProfile, AuthError> {
        require_role(actor, Role::Admin)?;

        let mut user = self
            .users
            .find_user_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound(id))?;

        user.enabled = true;
        let user = self.users.save_user(user).await?;

        info!(user_id = %id, actor_id = %actor.user_id, "user enabled");
        Ok(user.profile())
    }

    /// 계정 비활성화 (관리자 전용).
    ///
    /// 해당 사용자의 리프레시 토큰을 함께 무효화합니다. 이미 발급된
    /// 액세스 토큰은 자체 만료까지 유효합니다.
    ///
    /// # Errors
    ///
    /// - `AuthError::Forbidden`: 호출자가 관리자가 아님
    /// - `AuthError::UserNotFound`: 존재하지 않는 사용자
    pub async fn disable_user(&self, actor: &Identity, id: Uuid) -> Result<UserProfile, AuthError> {
        require_role(actor, Role::Admin)?;

        let mut user = self
            .users
            .find_user_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound(id))?;

        user.enabled = false;
        let user = self.users.save_user(user).await?;

        self.refresh_tokens.invalidate_all_for_user(id).await?;

        info!(user_id = %id, actor_id = %actor.user_id, "user disabled");
        Ok(user.profile())
    }

    /// 역할 변경 (관리자 전용).
    ///
    /// 역할 승격/강등은 관리자만 수행할 수 있습니다.
    ///
    /// # Errors
    ///
    /// - `AuthError::Forbidden`: 호출자가 관리자가 아님
    /// - `AuthError::UserNotFound`: 존재하지 않는 사용자
    pub async fn assign_role(
        &self,
        actor: &Identity,
        id: Uuid,
        role: Role,
    ) -> Result<UserProfile, AuthError> {
        require_role(actor, Role::Admin)?;

        let mut user = self
            .users
            .find_user_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound(id))?;

        user.role = role;
        let user = self.users.save_user(user).await?;

        info!(user_id = %id, actor_id = %actor.user_id, role = %role, "role assigned");
        Ok(user.profile())
    }
}
