use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use somon_auth::{
    Account, Argon2PasswordHasher, AuthError, AuthService, CredentialStore, Error, JwtConfig,
    NotificationGateway, Registration, Role,
    token::{generate_reset_token, hash_reset_token},
};

const TEST_HS256_SECRET: &[u8] = b"this_is_a_test_secret_key_for_hs256_jwt_tokens_not_for_prod";

/// In-memory credential store keyed by lowercased email, mirroring the
/// case-insensitive uniqueness a real backend enforces at write time.
#[derive(Default)]
struct MemoryCredentialStore {
    accounts: Mutex<HashMap<String, Account>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        Ok(self
            .accounts
            .lock()
            .await
            .get(&email.to_lowercase())
            .cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, Error> {
        let mut accounts = self.accounts.lock().await;
        let key = account.email.to_lowercase();
        if accounts.contains_key(&key) {
            return Err(somon_auth::error::StorageError::Database(
                "unique constraint violation".to_string(),
            )
            .into());
        }
        accounts.insert(key, account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<(), Error> {
        self.accounts
            .lock()
            .await
            .insert(account.email.to_lowercase(), account.clone());
        Ok(())
    }
}

/// Records outbound messages instead of delivering them.
#[derive(Default)]
struct RecordingGateway {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingGateway {
    async fn last_token(&self) -> String {
        let sent = self.sent.lock().await;
        let (_, _, body) = sent.last().expect("no email was sent");
        // Body shape: greeting, instructions, token, validity note, sign-off,
        // separated by blank lines.
        body.split("\n\n").nth(2).expect("malformed body").to_string()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), Error> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

type Service = AuthService<MemoryCredentialStore, Argon2PasswordHasher, RecordingGateway>;

fn setup() -> (Service, Arc<MemoryCredentialStore>, Arc<RecordingGateway>, JwtConfig) {
    let store = Arc::new(MemoryCredentialStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let jwt = JwtConfig::new(TEST_HS256_SECRET.to_vec(), "somon-api", "somon-clients");
    let service = AuthService::new(
        store.clone(),
        Arc::new(Argon2PasswordHasher),
        gateway.clone(),
        jwt.clone(),
    );
    (service, store, gateway, jwt)
}

fn alice() -> Registration {
    Registration {
        display_name: "Alice".to_string(),
        phone: "+19995551234".to_string(),
        email: "a@x.com".to_string(),
        password: "pw123".to_string(),
    }
}

#[tokio::test]
async fn test_register_login_and_claims() {
    let (service, _, _, jwt) = setup();

    let account = service.register(alice()).await.unwrap();
    assert_eq!(account.email, "a@x.com");
    assert_eq!(account.role, Role::User);

    // Case-insensitive email on login
    let token = service.login("A@X.com", "pw123").await.unwrap();

    let claims = token.verify(&jwt).unwrap();
    assert_eq!(claims.sub, account.id.to_string());
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.role, Some("User".to_string()));
    // Fixed two-hour lifetime
    assert_eq!(claims.exp - claims.iat, 7200);

    // Wrong password
    let result = service.login("a@x.com", "wrongpw").await;
    assert!(matches!(
        result.unwrap_err(),
        Error::Auth(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_duplicate_email_differs_only_in_case() {
    let (service, _, _, _) = setup();

    service.register(alice()).await.unwrap();

    let mut dup = alice();
    dup.email = "A@X.com".to_string();
    let result = service.register(dup).await;
    assert!(matches!(
        result.unwrap_err(),
        Error::Auth(AuthError::DuplicateEmail)
    ));
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_identical() {
    let (service, _, _, _) = setup();

    service.register(alice()).await.unwrap();

    let unknown = service.login("unknown@x.com", "anything").await.unwrap_err();
    let wrong = service.login("a@x.com", "wrongPassword").await.unwrap_err();

    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(unknown.status_code(), wrong.status_code());
    assert_eq!(unknown.public_message(), wrong.public_message());
}

#[tokio::test]
async fn test_reset_request_does_not_reveal_account_existence() {
    let (service, _, gateway, _) = setup();

    service.register(alice()).await.unwrap();

    // Both calls return the same generic success
    assert!(service.request_password_reset("a@x.com").await.is_ok());
    assert!(
        service
            .request_password_reset("nonexistent@x.com")
            .await
            .is_ok()
    );

    // Only the registered address actually received mail
    let sent = gateway.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "a@x.com");
    assert_eq!(sent[0].1, "Password Reset Request");
}

#[tokio::test]
async fn test_full_reset_round_trip() {
    let (service, _, gateway, _) = setup();

    service.register(alice()).await.unwrap();

    // Request a reset and capture the token from the email
    service.request_password_reset("a@x.com").await.unwrap();
    let token = gateway.last_token().await;

    // Wrong token is rejected
    let result = service
        .reset_password("a@x.com", "wrong-token", "newpw")
        .await;
    assert!(matches!(
        result.unwrap_err(),
        Error::Auth(AuthError::InvalidOrExpiredToken)
    ));

    // Correct token succeeds
    service
        .reset_password("a@x.com", &token, "newpw")
        .await
        .unwrap();

    // Old password no longer works, new one does
    let old = service.login("a@x.com", "pw123").await;
    assert!(matches!(
        old.unwrap_err(),
        Error::Auth(AuthError::InvalidCredentials)
    ));
    assert!(service.login("a@x.com", "newpw").await.is_ok());

    // The consumed token cannot be replayed
    let replay = service.reset_password("a@x.com", &token, "another").await;
    assert!(matches!(
        replay.unwrap_err(),
        Error::Auth(AuthError::InvalidOrExpiredToken)
    ));
}

#[tokio::test]
async fn test_expired_token_fails_validation() {
    let (service, store, _, _) = setup();

    service.register(alice()).await.unwrap();

    // Seed a pending reset as if it had been issued 61 minutes ago
    let token = generate_reset_token();
    let mut account = store.find_by_email("a@x.com").await.unwrap().unwrap();
    account.set_pending_reset(
        hash_reset_token(&token),
        Utc::now() - Duration::minutes(1), // issued at t0, now is t0 + 61m
    );
    store.update(&account).await.unwrap();

    let result = service.reset_password("a@x.com", &token, "newpw").await;
    assert!(matches!(
        result.unwrap_err(),
        Error::Auth(AuthError::InvalidOrExpiredToken)
    ));
}

#[tokio::test]
async fn test_second_request_invalidates_first_token() {
    let (service, _, gateway, _) = setup();

    service.register(alice()).await.unwrap();

    service.request_password_reset("a@x.com").await.unwrap();
    let first = gateway.last_token().await;

    service.request_password_reset("a@x.com").await.unwrap();
    let second = gateway.last_token().await;

    assert_ne!(first, second);

    // Last write wins: the earlier token is no longer redeemable
    let stale = service.reset_password("a@x.com", &first, "newpw").await;
    assert!(matches!(
        stale.unwrap_err(),
        Error::Auth(AuthError::InvalidOrExpiredToken)
    ));
    assert!(
        service
            .reset_password("a@x.com", &second, "newpw")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_reset_with_unknown_email() {
    let (service, _, _, _) = setup();

    let result = service
        .reset_password("nobody@x.com", "any-token", "newpw")
        .await;
    assert!(matches!(
        result.unwrap_err(),
        Error::Auth(AuthError::InvalidTokenOrEmail)
    ));
}
