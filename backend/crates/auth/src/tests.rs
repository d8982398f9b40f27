//! Use-case and HTTP tests for the auth crate
//!
//! `MemoryAuthStore` keeps everything behind one `tokio::sync::Mutex`, so
//! each repository call is atomic the way a database statement would be.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::UserId;
use tokio::sync::Mutex;

use crate::domain::entity::{auth_session::AuthSession, credential::Credential, user::User};
use crate::domain::repository::{AuthSessionRepository, CredentialRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    credentials: HashMap<UserId, Credential>,
    sessions: HashMap<String, AuthSession>,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryAuthStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryAuthStore {
    async fn credential_of(&self, user_id: UserId) -> Option<Credential> {
        self.state.lock().await.credentials.get(&user_id).cloned()
    }

    async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }
}

impl UserRepository for MemoryAuthStore {
    async fn create(&self, user: &User, credential: Option<&Credential>) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        state.users.insert(user.id, user.clone());
        if let Some(credential) = credential {
            state.credentials.insert(user.id, credential.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state.lock().await.users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.state.lock().await;
        Ok(state.users.values().any(|u| &u.email == email))
    }
}

impl CredentialRepository for MemoryAuthStore {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credential>> {
        Ok(self.state.lock().await.credentials.get(user_id).cloned())
    }

    async fn update(&self, credential: &Credential) -> AuthResult<()> {
        self.state
            .lock()
            .await
            .credentials
            .insert(credential.user_id, credential.clone());
        Ok(())
    }
}

impl AuthSessionRepository for MemoryAuthStore {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.state
            .lock()
            .await
            .sessions
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> AuthResult<Option<AuthSession>> {
        Ok(self.state.lock().await.sessions.get(session_id).cloned())
    }
}

#[cfg(test)]
mod use_case_tests {
    use super::*;
    use crate::application::*;
    use crate::domain::entity::auth_session::SessionLookup;
    use crate::domain::value_object::{
        display_name::DisplayName, user_password::UserPassword, user_role::UserRole,
    };
    use chrono::{Duration, Utc};

    fn setup() -> (Arc<MemoryAuthStore>, Arc<AuthConfig>) {
        (
            Arc::new(MemoryAuthStore::default()),
            Arc::new(AuthConfig::default()),
        )
    }

    fn sign_up_input(email: &str) -> SignUpInput {
        SignUpInput {
            email: email.to_string(),
            password: "correct horse battery".to_string(),
            name: "Ada".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_issues_working_session() {
        let (store, config) = setup();
        let sign_up = SignUpUseCase::new(store.clone(), store.clone(), config);

        let output = sign_up.execute(sign_up_input("ada@example.com")).await.unwrap();
        assert_eq!(output.user.role, UserRole::Both);
        assert_eq!(output.user.reputation, 0);

        let check = CheckSessionUseCase::new(store.clone());
        let user_id = check
            .authenticate(output.session.token.as_str())
            .await
            .unwrap();
        assert_eq!(user_id, output.user.id);

        // Credential stored in the salted format
        let credential = store.credential_of(output.user.id).await.unwrap();
        assert!(!credential.password_hash.needs_rehash());
        assert!(credential.password_hash.to_stored().contains(':'));
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email_conflicts() {
        let (store, config) = setup();
        let sign_up = SignUpUseCase::new(store.clone(), store.clone(), config);

        sign_up.execute(sign_up_input("ada@example.com")).await.unwrap();
        let err = sign_up
            .execute(sign_up_input("ADA@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_admin_and_bad_input() {
        let (store, config) = setup();
        let sign_up = SignUpUseCase::new(store.clone(), store.clone(), config);

        let mut input = sign_up_input("ada@example.com");
        input.role = Some("admin".into());
        assert!(matches!(
            sign_up.execute(input).await.unwrap_err(),
            AuthError::Validation(_)
        ));

        let mut input = sign_up_input("ada@example.com");
        input.password = "short".into();
        assert!(matches!(
            sign_up.execute(input).await.unwrap_err(),
            AuthError::Validation(_)
        ));

        assert!(matches!(
            sign_up.execute(sign_up_input("not-an-email")).await.unwrap_err(),
            AuthError::Validation(_)
        ));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_sign_in_success_and_failures() {
        let (store, config) = setup();
        SignUpUseCase::new(store.clone(), store.clone(), config.clone())
            .execute(sign_up_input("ada@example.com"))
            .await
            .unwrap();

        let sign_in = SignInUseCase::new(store.clone(), store.clone(), store.clone(), config);

        let ok = sign_in
            .execute(SignInInput {
                email: "Ada@Example.com".into(),
                password: "correct horse battery".into(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.email.as_str(), "ada@example.com");

        let wrong_password = sign_in
            .execute(SignInInput {
                email: "ada@example.com".into(),
                password: "wrong horse battery".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));

        let unknown = sign_in
            .execute(SignInInput {
                email: "nobody@example.com".into(),
                password: "correct horse battery".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_legacy_digest_login_upgrades_hash() {
        let (store, config) = setup();

        let user = User::new(
            Email::new("old@example.com").unwrap(),
            DisplayName::new("Old Timer").unwrap(),
            UserRole::Poster,
        );
        // sha256("hello")
        let legacy = UserPassword::from_stored(
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
        )
        .unwrap();
        UserRepository::create(&*store, &user, Some(&Credential::new(user.id, legacy)))
            .await
            .unwrap();

        let sign_in = SignInUseCase::new(store.clone(), store.clone(), store.clone(), config);
        sign_in
            .execute(SignInInput {
                email: "old@example.com".into(),
                password: "hello".into(),
            })
            .await
            .unwrap();

        let upgraded = store.credential_of(user.id).await.unwrap();
        assert!(!upgraded.password_hash.needs_rehash());

        // Same password still works against the new hash
        sign_in
            .execute(SignInInput {
                email: "old@example.com".into(),
                password: "hello".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_legacy_upgrade_can_be_disabled() {
        let store = Arc::new(MemoryAuthStore::default());
        let config = Arc::new(AuthConfig {
            upgrade_legacy_hashes: false,
            ..AuthConfig::default()
        });

        let user = User::new(
            Email::new("old@example.com").unwrap(),
            DisplayName::new("Old").unwrap(),
            UserRole::Both,
        );
        let legacy = UserPassword::from_stored(
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
        )
        .unwrap();
        UserRepository::create(&*store, &user, Some(&Credential::new(user.id, legacy)))
            .await
            .unwrap();

        SignInUseCase::new(store.clone(), store.clone(), store.clone(), config)
            .execute(SignInInput {
                email: "old@example.com".into(),
                password: "hello".into(),
            })
            .await
            .unwrap();

        assert!(
            store
                .credential_of(user.id)
                .await
                .unwrap()
                .password_hash
                .needs_rehash()
        );
    }

    #[tokio::test]
    async fn test_external_sign_in_find_or_create() {
        let (store, config) = setup();
        let use_case = ExternalSignInUseCase::new(store.clone(), store.clone(), config.clone());

        let first = use_case
            .execute(ExternalSignInInput {
                provider: "github".into(),
                email: "octo@example.com".into(),
                name: None,
            })
            .await
            .unwrap();
        assert!(first.created);
        assert_eq!(first.user.name.as_str(), "octo");
        assert!(store.credential_of(first.user.id).await.is_none());

        let second = use_case
            .execute(ExternalSignInInput {
                provider: "github".into(),
                email: "Octo@Example.com".into(),
                name: Some("Octocat".into()),
            })
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.user.id, first.user.id);

        // No password was ever set, so password login is refused
        let err = SignInUseCase::new(store.clone(), store.clone(), store.clone(), config)
            .execute(SignInInput {
                email: "octo@example.com".into(),
                password: "anything-at-all".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_session_validation_boundaries() {
        let (store, config) = setup();
        let issued = CreateSessionUseCase::new(store.clone(), config)
            .execute(UserId::new())
            .await
            .unwrap();
        let check = CheckSessionUseCase::new(store.clone());
        let token = issued.token.as_str();

        let before = issued.expires_at - Duration::seconds(1);
        let after = issued.expires_at + Duration::seconds(1);

        assert!(matches!(
            check.validate_at(token, before).await.unwrap(),
            SessionLookup::Valid(_)
        ));
        assert_eq!(
            check.validate_at(token, after).await.unwrap(),
            SessionLookup::Expired
        );
        assert_eq!(
            check.validate_at("unknown", Utc::now()).await.unwrap(),
            SessionLookup::NotFound
        );
        assert_eq!(
            check.validate_at("", Utc::now()).await.unwrap(),
            SessionLookup::NotFound
        );
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_like_absent() {
        let store = Arc::new(MemoryAuthStore::default());
        let (token, session) =
            AuthSession::issue(UserId::new(), Duration::days(30), Utc::now() - Duration::days(31));
        AuthSessionRepository::create(&*store, &session).await.unwrap();

        let check = CheckSessionUseCase::new(store.clone());
        assert!(matches!(
            check.authenticate(token.as_str()).await.unwrap_err(),
            AuthError::SessionInvalid
        ));
        assert!(matches!(
            check.authenticate("never-issued").await.unwrap_err(),
            AuthError::SessionInvalid
        ));
    }

    #[tokio::test]
    async fn test_profile_not_found() {
        let store = Arc::new(MemoryAuthStore::default());
        let err = ProfileUseCase::new(store)
            .public_profile(UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::EmailTaken, StatusCode::CONFLICT),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::SessionInvalid, StatusCode::UNAUTHORIZED),
            (AuthError::MissingToken, StatusCode::UNAUTHORIZED),
            (
                AuthError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AuthError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.status_code(), expected_status);
            assert_eq!(error.into_response().status(), expected_status);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let app_error = AuthError::Internal("connection refused on 10.0.0.5".into()).to_app_error();
        assert_eq!(app_error.message(), "Internal server error");
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::application::config::AuthConfig;
    use crate::presentation::router::{auth_router, users_router};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(store: Arc<MemoryAuthStore>) -> Router {
        Router::new()
            .nest("/api/auth", auth_router(store.clone(), AuthConfig::default()))
            .nest("/api/users", users_router(store, AuthConfig::default()))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_signup_then_me_with_bearer() {
        let store = Arc::new(MemoryAuthStore::default());

        let response = app(store.clone())
            .oneshot(
                Request::post("/api/auth/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"email":"ada@example.com","password":"correct horse battery","name":"Ada","role":"poster"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        let token = body["token"].as_str().unwrap().to_string();
        assert_eq!(body["user"]["role"], "poster");
        assert_eq!(body["user"]["totalEarned"], 0);
        assert!(body["user"].get("passwordHash").is_none());

        let me = app(store.clone())
            .oneshot(
                Request::get("/api/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        let me = json_body(me).await;
        assert_eq!(me["email"], "ada@example.com");

        // Public profile omits the email
        let id = me["id"].as_str().unwrap();
        let public = app(store)
            .oneshot(
                Request::get(format!("/api/users/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(public.status(), StatusCode::OK);
        let public = json_body(public).await;
        assert!(public.get("email").is_none());
        assert_eq!(public["name"], "Ada");
    }

    #[tokio::test]
    async fn test_me_requires_valid_bearer() {
        let store = Arc::new(MemoryAuthStore::default());

        let missing = app(store.clone())
            .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let unknown = app(store.clone())
            .oneshot(
                Request::get("/api/auth/me")
                    .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

        let wrong_scheme = app(store)
            .oneshot(
                Request::get("/api/auth/me")
                    .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong_scheme.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_is_no_content() {
        let response = app(Arc::new(MemoryAuthStore::default()))
            .oneshot(Request::post("/api/auth/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_malformed_input_is_bad_request() {
        let store = Arc::new(MemoryAuthStore::default());

        let response = app(store.clone())
            .oneshot(
                Request::post("/api/auth/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"email":42,"password":"correct horse battery","name":"Ada"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let problem = json_body(response).await;
        assert_eq!(problem["title"], "Bad Request");

        let response = app(store.clone())
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app(store)
            .oneshot(
                Request::get("/api/users/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["status"], 400);
    }
}
