//! 인증 서비스.
//!
//! 가입/로그인/토큰 갱신 플로우를 오케스트레이션합니다:
//! 자격증명 확인, 토큰 발급, 응답 조립.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::{Validate, ValidationError};

use auth_core::{AuthError, User, UserProfile};

use crate::password::{hash_password, validate_password_strength, verify_password};
use crate::repository::UserStore;
use crate::services::refresh_token::RefreshTokenManager;
use crate::token::TokenSigner;

/// 로그인 지연 시간 평탄화용 더미 해시.
///
/// 존재하지 않는 이메일로 로그인할 때도 실제 해시 검증과 같은 비용을
/// 지불하게 하여, 응답 시간으로 계정 존재 여부를 추측할 수 없게 합니다.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("invalid-password-placeholder").unwrap_or_default());

/// 비밀번호 강도 검증 (validator 연동).
fn validate_password(value: &str) -> Result<(), ValidationError> {
    validate_password_strength(value)
        .map_err(|msg| ValidationError::new("weak_password").with_message(msg.into()))
}

/// 가입 요청.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "이름은 1-100자여야 합니다"))]
    pub name: String,
    #[validate(email(message = "올바른 이메일 형식이 아닙니다"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// 로그인 요청.
///
/// 여기서는 형식 검증을 하지 않습니다 — 잘못된 형식의 이메일은 단순히
/// 조회에 실패하여 다른 실패 사유와 동일한 에러로 수렴합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 인증 응답 번들.
///
/// 요청마다 새로 조립되는 일시적 구조체입니다. 사용자 프로젝션은
/// 비밀번호 검증자를 절대 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    /// 액세스 토큰
    pub access_token: String,
    /// 리프레시 토큰 값
    pub refresh_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 액세스 토큰 만료 시간 (초)
    pub expires_in: i64,
    /// 민감 정보가 제거된 사용자 프로젝션
    pub user: UserProfile,
}

/// 인증 서비스.
///
/// 자격증명 저장소, 토큰 서명자, 리프레시 토큰 매니저를 조합합니다.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    signer: TokenSigner,
    refresh_tokens: RefreshTokenManager,
}

impl AuthService {
    /// 새 인증 서비스 생성.
    pub fn new(
        users: Arc<dyn UserStore>,
        signer: TokenSigner,
        refresh_tokens: RefreshTokenManager,
    ) -> Self {
        Self {
            users,
            signer,
            refresh_tokens,
        }
    }

    /// 회원 가입.
    ///
    /// 이메일 중복은 어떤 쓰기도 일어나기 전에 확인합니다. 확인과 저장
    /// 사이의 좁은 경쟁 구간은 저장소의 쓰기 시점 유일성 제약이
    /// 이중으로 방어합니다.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidInput`: 요청 형식/비밀번호 강도 미달
    /// - `AuthError::EmailAlreadyExists`: 이미 등록된 이메일
    /// - `AuthError::Store`: 저장소 장애
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResult, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        if self.users.exists_by_email(&request.email).await? {
            return Err(AuthError::EmailAlreadyExists(request.email));
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = self
            .users
            .save_user(User::new(request.name, request.email, password_hash))
            .await?;

        info!(user_id = %user.id, "user registered");
        self.issue_auth_result(user).await
    }

    /// 로그인.
    ///
    /// 존재하지 않는 이메일, 비활성 계정, 비밀번호 불일치는 모두
    /// 구분 불가능한 `InvalidCredentials`로 수렴합니다 (계정 열거 방지).
    /// 성공 시 리프레시 토큰은 기존 토큰을 교체합니다. 이미 발급된
    /// 액세스 토큰은 자체 만료까지 유효합니다 — 의도된 좁은 중첩
    /// 구간입니다.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredentials`: 인증 실패 (사유 비공개)
    /// - `AuthError::Store`: 저장소 장애
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResult, AuthError> {
        let user = match self.users.find_user_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                // 알려지지 않은 이메일도 해시 검증 비용을 동일하게 지불
                let _ = verify_password(&request.password, &DUMMY_HASH);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if verify_password(&request.password, &user.password_hash).is_err() || !user.enabled {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        self.issue_auth_result(user).await
    }

    /// 액세스 토큰 갱신.
    ///
    /// 리프레시 토큰 값은 변경되지 않고 그대로 반환됩니다 — 회전은
    /// 로그인/가입 시에만 일어납니다.
    ///
    /// # Errors
    ///
    /// - `AuthError::RefreshTokenInvalid`: 존재하지 않는 토큰
    /// - `AuthError::RefreshTokenExpired`: 만료 (부수 효과로 삭제됨)
    /// - `AuthError::UserNotFound`: 데이터 정합성 실패
    /// - `AuthError::Store`: 저장소 장애
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<AuthResult, AuthError> {
        let token = self.refresh_tokens.find_by_token(refresh_token).await?;
        let token = self.refresh_tokens.verify_not_expired(token).await?;

        let user = match self.users.find_user_by_id(token.user_id).await? {
            Some(user) => user,
            None => {
                // 토큰 생성과 조회 사이에 사용자 레코드가 사라짐 -
                // 일반 인증 실패가 아닌 정합성 버그 신호
                error!(user_id = %token.user_id, "refresh token references missing user");
                return Err(AuthError::UserNotFound(token.user_id));
            }
        };

        let access_token = self
            .signer
            .issue(&user)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(AuthResult {
            access_token,
            refresh_token: token.token,
            token_type: "Bearer".to_string(),
            expires_in: self.signer.ttl().num_seconds(),
            user: user.profile(),
        })
    }

    /// 토큰 발급 및 응답 조립 (가입/로그인 공통 경로).
    async fn issue_auth_result(&self, user: User) -> Result<AuthResult, AuthError> {
        let access_token = self
            .signer
            .issue(&user)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh_token = self.refresh_tokens.create(user.id).await?;

        Ok(AuthResult {
            access_token,
            refresh_token: refresh_token.token,
            token_type: "Bearer".to_string(),
            expires_in: self.signer.ttl().num_seconds(),
            user: user.profile(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_core::{Role, TokenConfig};
    use chrono::Duration;

    use crate::repository::{MemoryStore, RefreshTokenStore};

    fn build_service(store: &MemoryStore) -> AuthService {
        let config = TokenConfig {
            secret: "test-secret-key-for-jwt-testing-minimum-32-chars".to_string(),
            ..TokenConfig::default()
        };
        let users: Arc<dyn UserStore> = Arc::new(store.clone());
        let signer = TokenSigner::new(&config);
        let manager = RefreshTokenManager::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            &config,
        );
        AuthService::new(users, signer, manager)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "pw123secure".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_issues_tokens_and_sanitized_profile() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        let result = service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        assert_eq!(result.token_type, "Bearer");
        assert_eq!(result.user.role, Role::User);
        assert!(result.user.enabled);

        // 액세스 토큰은 즉시 검증 가능
        let config = TokenConfig {
            secret: "test-secret-key-for-jwt-testing-minimum-32-chars".to_string(),
            ..TokenConfig::default()
        };
        let identity = TokenSigner::new(&config)
            .verify(&result.access_token)
            .unwrap();
        assert_eq!(identity.user_id, result.user.id);
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn test_auth_result_serialization_has_no_verifier() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        let result = service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains(r#""token_type":"Bearer""#));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        let mut request = register_request("alice@example.com");
        request.password = "short".to_string();

        let result = service.register(request).await;
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_mutates_nothing() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        let result = service.register(register_request("alice@example.com")).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyExists(_))));

        // 저장소에는 여전히 사용자 한 명뿐
        let all = store.list_users().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_login_failure_modes_indistinguishable() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        // 비밀번호 불일치
        let wrong_password = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "wrong-password1".to_string(),
            })
            .await;

        // 존재하지 않는 이메일
        let unknown_email = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "pw123secure".to_string(),
            })
            .await;

        // 비활성 계정 + 올바른 자격증명
        let mut user = store
            .find_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        user.enabled = false;
        store.save_user(user).await.unwrap();

        let disabled_account = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "pw123secure".to_string(),
            })
            .await;

        // 세 경우 모두 동일한 에러 종류, 구분 필드 없음
        for result in [wrong_password, unknown_email, disabled_account] {
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn test_login_rotates_refresh_token() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        let registered = service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        let logged_in = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "pw123secure".to_string(),
            })
            .await
            .unwrap();

        assert_ne!(registered.refresh_token, logged_in.refresh_token);

        // 가입 시 발급된 토큰은 더 이상 유효하지 않음
        let stale = service.refresh_access_token(&registered.refresh_token).await;
        assert!(matches!(stale, Err(AuthError::RefreshTokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_returns_same_token_value() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        let registered = service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        let refreshed = service
            .refresh_access_token(&registered.refresh_token)
            .await
            .unwrap();

        // 리프레시 토큰은 회전하지 않음
        assert_eq!(refreshed.refresh_token, registered.refresh_token);
        assert_eq!(refreshed.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_refresh_with_unknown_token_fails() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        let result = service.refresh_access_token("no-such-token").await;
        assert!(matches!(result, Err(AuthError::RefreshTokenInvalid)));
    }

    #[tokio::test]
    async fn test_end_to_end_credential_lifecycle() {
        let store = MemoryStore::new();
        let service = build_service(&store);

        // 가입
        let registered = service
            .register(RegisterRequest {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "pw123secure".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(registered.user.role, Role::User);
        assert!(registered.user.enabled);

        // 같은 자격증명으로 로그인 - 새 리프레시 토큰
        let logged_in = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "pw123secure".to_string(),
            })
            .await
            .unwrap();
        assert_ne!(logged_in.refresh_token, registered.refresh_token);

        // 로그인의 리프레시 토큰으로 갱신 - 새 액세스 토큰, 리프레시 값 불변
        let refreshed = service
            .refresh_access_token(&logged_in.refresh_token)
            .await
            .unwrap();
        assert_eq!(refreshed.refresh_token, logged_in.refresh_token);

        // 수동 만료 후 갱신 시도 - 만료 에러 및 삭제
        let mut token = store
            .find_refresh_token_by_value(&logged_in.refresh_token)
            .await
            .unwrap()
            .unwrap();
        token.expires_at = chrono::Utc::now() - Duration::seconds(1);
        store.save_refresh_token(token).await.unwrap();

        let expired = service.refresh_access_token(&logged_in.refresh_token).await;
        assert!(matches!(expired, Err(AuthError::RefreshTokenExpired)));

        // 삭제 부수 효과 - 같은 값 재조회는 존재하지 않음으로 수렴
        let gone = service.refresh_access_token(&logged_in.refresh_token).await;
        assert!(matches!(gone, Err(AuthError::RefreshTokenInvalid)));
    }
}
