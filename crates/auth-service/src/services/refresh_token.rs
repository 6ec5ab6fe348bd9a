//! 리프레시 토큰 회전 프로토콜.
//!
//! 사용자당 최대 하나의 유효 리프레시 토큰이라는 불변 조건을 소유합니다.
//! 새 토큰 생성은 기존 토큰을 먼저 삭제하며(교체, 추가 아님), 같은
//! 사용자에 대한 삭제+삽입 쌍은 사용자별 뮤텍스로 직렬화됩니다 —
//! 동일 사용자의 동시 로그인 두 건이 모두 자신의 토큰이 유일하다고
//! 믿는 상황을 막습니다.
//!
//! 만료는 다음 검증 시점에 지연 감지되어 그 자리에서 삭제됩니다.
//! 정확성을 위한 백그라운드 청소 작업은 필요하지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use auth_core::{AuthError, RefreshToken, TokenConfig};

use crate::repository::{RefreshTokenStore, UserStore};

/// 리프레시 토큰 매니저.
///
/// 저장소와 TTL을 생성 시점에 주입받습니다.
#[derive(Clone)]
pub struct RefreshTokenManager {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    ttl: Duration,
    /// 사용자별 회전 직렬화 뮤텍스
    user_locks: Arc<RwLock<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl RefreshTokenManager {
    /// 새 매니저 생성.
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        config: &TokenConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            ttl: Duration::milliseconds(config.refresh_token_ttl_ms),
            user_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 사용자별 직렬화 뮤텍스 반환.
    async fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        if let Some(lock) = self.user_locks.read().await.get(&user_id) {
            return lock.clone();
        }

        let mut locks = self.user_locks.write().await;
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 새 리프레시 토큰 생성.
    ///
    /// 해당 사용자의 기존 토큰을 먼저 삭제한 뒤 새 토큰을 저장합니다.
    /// 삭제+삽입 쌍은 사용자별 뮤텍스 아래에서 실행됩니다.
    ///
    /// # Errors
    ///
    /// - `AuthError::UserNotFound`: 사용자 ID가 해석되지 않음
    /// - `AuthError::Store`: 저장소 장애
    pub async fn create(&self, user_id: Uuid) -> Result<RefreshToken, AuthError> {
        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound(user_id))?;

        let lock = self.user_lock(user.id).await;
        let _guard = lock.lock().await;

        self.tokens.delete_refresh_tokens_for_user(user.id).await?;

        let token = RefreshToken::issue(user.id, self.ttl);
        let saved = self.tokens.save_refresh_token(token).await?;

        debug!(user_id = %user.id, "refresh token rotated");
        Ok(saved)
    }

    /// 토큰 값으로 조회.
    ///
    /// # Errors
    ///
    /// - `AuthError::RefreshTokenInvalid`: 존재하지 않는 토큰
    /// - `AuthError::Store`: 저장소 장애
    pub async fn find_by_token(&self, value: &str) -> Result<RefreshToken, AuthError> {
        self.tokens
            .find_refresh_token_by_value(value)
            .await?
            .ok_or(AuthError::RefreshTokenInvalid)
    }

    /// 만료 여부 검증.
    ///
    /// 만료된 토큰은 부수 효과로 저장소에서 삭제됩니다 (지연 청소).
    ///
    /// # Errors
    ///
    /// - `AuthError::RefreshTokenExpired`: 현재 시각이 만료 시각 이상
    /// - `AuthError::Store`: 저장소 장애
    pub async fn verify_not_expired(
        &self,
        token: RefreshToken,
    ) -> Result<RefreshToken, AuthError> {
        if token.is_expired() {
            self.tokens.delete_refresh_token(&token).await?;
            warn!(user_id = %token.user_id, "expired refresh token deleted");
            return Err(AuthError::RefreshTokenExpired);
        }

        Ok(token)
    }

    /// 사용자의 모든 리프레시 토큰 무효화 (멱등).
    ///
    /// 계정 비활성화 및 로그아웃 경로에서 사용됩니다.
    ///
    /// # Errors
    ///
    /// - `AuthError::Store`: 저장소 장애
    pub async fn invalidate_all_for_user(&self, user_id: Uuid) -> Result<(), AuthError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        self.tokens.delete_refresh_tokens_for_user(user_id).await?;
        debug!(user_id = %user_id, "refresh tokens invalidated");
        Ok(())
    }
}
