//! 자격증명 저장소 계약.
//!
//! 사용자와 리프레시 토큰의 영속성은 이 모듈의 추상 계약 뒤에 숨겨집니다.
//! 저장소는 시스템에서 유일한 공유 가변 자원이며, 이메일과 토큰 값
//! 유일성 제약의 최종 중재자입니다. 구현체는 어떤 엔진이든 될 수 있고
//! (RDBMS, KV 스토어, ...), 이 크레이트는 테스트와 참조용으로
//! 인메모리 구현 [`MemoryStore`]를 제공합니다.

mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use auth_core::{AuthError, RefreshToken, User};

pub use memory::MemoryStore;

/// 저장소 에러.
///
/// 인프라 장애는 인증 도메인 에러와 구분되어 변형 없이 전파됩니다.
/// 이 코어는 어떤 저장소 실패도 자동으로 재시도하지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 저장 엔진 장애 (연결 실패 등)
    #[error("저장소 백엔드 에러: {0}")]
    Backend(String),
    /// 쓰기 시점 이메일 유일성 위반
    #[error("이미 존재하는 이메일입니다: {0}")]
    DuplicateEmail(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => AuthError::EmailAlreadyExists(email),
            StoreError::Backend(msg) => AuthError::Store(msg),
        }
    }
}

/// 사용자 저장소 계약.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 사용자 조회 (대소문자 구분 정확 일치).
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// 이메일 존재 여부 확인.
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// 사용자 저장 (신규 삽입 또는 갱신).
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateEmail`: 다른 사용자가 이미 해당 이메일을 보유
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn save_user(&self, user: User) -> Result<User, StoreError>;

    /// ID로 사용자 조회.
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// 전체 사용자 목록 조회.
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
}

/// 리프레시 토큰 저장소 계약.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// 토큰 값으로 조회 (정확 일치).
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn find_refresh_token_by_value(
        &self,
        value: &str,
    ) -> Result<Option<RefreshToken>, StoreError>;

    /// 리프레시 토큰 저장.
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, StoreError>;

    /// 사용자의 모든 리프레시 토큰 삭제 (멱등).
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn delete_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<(), StoreError>;

    /// 단일 리프레시 토큰 삭제 (멱등).
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장 엔진 장애
    async fn delete_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError>;
}
