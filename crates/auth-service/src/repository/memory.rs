//! 인메모리 참조 저장소.
//!
//! 테스트 및 단일 프로세스 배포용 구현입니다. 유일성 제약(이메일,
//! 토큰 값)을 쓰기 시점에 강제하여 실제 저장 엔진과 동일한 계약을
//! 제공합니다.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use auth_core::{RefreshToken, User};

use super::{RefreshTokenStore, StoreError, UserStore};

/// 인메모리 저장소.
///
/// 내부 맵은 `RwLock`으로 보호되며, 복제 시 동일한 저장소를 공유합니다.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl MemoryStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }

    async fn save_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        // 쓰기 시점 이메일 유일성 검사 (다른 ID의 동일 이메일 금지)
        if users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn find_refresh_token_by_value(
        &self,
        value: &str,
    ) -> Result<Option<RefreshToken>, StoreError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(value).cloned())
    }

    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, StoreError> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, t| t.user_id != user_id);
        Ok(())
    }

    async fn delete_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;
        tokens.remove(&token.token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_save_and_find_user() {
        let store = MemoryStore::new();
        let user = User::new("Alice", "alice@example.com", "$argon2id$stub".to_string());

        store.save_user(user.clone()).await.unwrap();

        let by_email = store
            .find_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, user.email);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        let user = User::new("Alice", "alice@example.com", "$argon2id$stub".to_string());
        store.save_user(user).await.unwrap();

        assert!(store
            .find_user_by_email("Alice@example.com")
            .await
            .unwrap()
            .is_none());
        assert!(!store.exists_by_email("ALICE@EXAMPLE.COM").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_on_write() {
        let store = MemoryStore::new();
        store
            .save_user(User::new(
                "Alice",
                "alice@example.com",
                "$argon2id$a".to_string(),
            ))
            .await
            .unwrap();

        let result = store
            .save_user(User::new(
                "Impostor",
                "alice@example.com",
                "$argon2id$b".to_string(),
            ))
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_update_same_user_allowed() {
        let store = MemoryStore::new();
        let mut user = User::new("Alice", "alice@example.com", "$argon2id$stub".to_string());
        store.save_user(user.clone()).await.unwrap();

        // 같은 ID의 갱신은 유일성 위반이 아님
        user.enabled = false;
        let saved = store.save_user(user).await.unwrap();
        assert!(!saved.enabled);
    }

    #[tokio::test]
    async fn test_delete_tokens_for_user_idempotent() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let token = RefreshToken::issue(user_id, Duration::days(7));
        store.save_refresh_token(token.clone()).await.unwrap();

        store.delete_refresh_tokens_for_user(user_id).await.unwrap();
        assert!(store
            .find_refresh_token_by_value(&token.token)
            .await
            .unwrap()
            .is_none());

        // 이미 비어 있어도 에러 없음
        store.delete_refresh_tokens_for_user(user_id).await.unwrap();
    }
}
