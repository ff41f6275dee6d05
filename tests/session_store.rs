use anyhow::{anyhow, Result};
use greedybear_session::{
    api::{Credentials, HttpAuthApi, PasswordChange, Registration, UserProfile},
    config::ClientConfig,
    drafts::{DraftStore, RegistrationDraft},
    notify::{ToastLevel, ToastQueue},
    session::{Session, SessionStore, StatusKind, LOGIN_FALLBACK_MESSAGE},
};
use serde_json::json;
use std::{net::TcpListener, time::Duration};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Store = SessionStore<HttpAuthApi, ToastQueue>;

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn store_for(base_url: &str) -> Result<(Store, ToastQueue)> {
    let toasts = ToastQueue::new();
    let api = HttpAuthApi::new(ClientConfig::new(base_url)?)?;
    Ok((SessionStore::new(api, toasts.clone()), toasts))
}

fn bob() -> UserProfile {
    UserProfile {
        full_name: "Bob Builder".to_string(),
        first_name: "Bob".to_string(),
        last_name: "Builder".to_string(),
        email: "bob@example.com".to_string(),
        username: "bob".to_string(),
    }
}

async fn mount_check(server: &MockServer, status: u16, is_superuser: bool) {
    Mock::given(method("GET"))
        .and(path("/api/auth/authentication"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({"is_superuser": is_superuser})),
        )
        .mount(server)
        .await;
}

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/me/access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": bob()})))
        .mount(server)
        .await;
}

async fn authenticated_as_bob(server: &MockServer, store: &Store) -> Result<()> {
    mount_check(server, 200, true).await;
    mount_profile(server).await;
    store.check_authentication().await;
    store.fetch_user_access().await;
    if store.snapshot().user() != Some(&bob()) {
        return Err(anyhow!("expected bob to be signed in"));
    }
    server.reset().await;
    Ok(())
}

#[tokio::test]
async fn new_store_is_unauthenticated() -> Result<()> {
    let (store, toasts) = store_for("http://127.0.0.1:1")?;
    assert_eq!(store.snapshot(), Session::Unauthenticated);
    assert!(toasts.drain().is_empty());
    Ok(())
}

#[tokio::test]
async fn repeated_successful_checks_change_state_once() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_check(&server, 200, true).await;

    let (store, toasts) = store_for(&server.uri())?;
    let mut updates = store.subscribe();

    store.check_authentication().await;
    assert!(updates.has_changed()?);
    updates.borrow_and_update();
    assert_eq!(store.status(), StatusKind::Authenticated);
    assert!(store.snapshot().is_superuser());

    for _ in 0..3 {
        store.check_authentication().await;
        assert!(!updates.has_changed()?);
    }
    assert!(toasts.drain().is_empty());
    Ok(())
}

#[tokio::test]
async fn repeated_failed_checks_stay_silent() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_check(&server, 403, false).await;

    let (store, toasts) = store_for(&server.uri())?;
    let updates = store.subscribe();

    for _ in 0..3 {
        store.check_authentication().await;
    }
    assert!(!updates.has_changed()?);
    assert_eq!(store.snapshot(), Session::Unauthenticated);
    assert!(toasts.drain().is_empty());
    Ok(())
}

#[tokio::test]
async fn check_updates_superuser_flag_only_when_it_differs() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let (store, _) = store_for(&server.uri())?;
    authenticated_as_bob(&server, &store).await?;

    mount_check(&server, 200, false).await;
    let mut updates = store.subscribe();
    store.check_authentication().await;

    assert!(updates.has_changed()?);
    let session = updates.borrow_and_update().clone();
    assert!(!session.is_superuser());
    assert_eq!(session.user(), Some(&bob()));
    Ok(())
}

#[tokio::test]
async fn expired_session_is_demoted_silently() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let (store, toasts) = store_for(&server.uri())?;
    authenticated_as_bob(&server, &store).await?;
    toasts.drain();

    mount_check(&server, 401, false).await;
    store.check_authentication().await;

    assert_eq!(store.snapshot(), Session::Unauthenticated);
    assert!(!store.snapshot().is_superuser());
    assert!(toasts.drain().is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_server_means_unauthenticated() -> Result<()> {
    let (store, toasts) = store_for("http://127.0.0.1:1")?;
    store.check_authentication().await;
    assert_eq!(store.status(), StatusKind::Unauthenticated);
    assert!(toasts.drain().is_empty());
    Ok(())
}

#[tokio::test]
async fn login_passes_through_pending_to_authenticated() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"expiry": "2026-10-20T00:00:00Z"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (store, toasts) = store_for(&server.uri())?;
    let mut updates = store.subscribe();
    let mut seen = vec![updates.borrow_and_update().kind()];

    let credentials = Credentials::new("a", "b");
    let (receipt, ()) = tokio::join!(store.login_user(&credentials), async {
        while updates.changed().await.is_ok() {
            let kind = updates.borrow_and_update().kind();
            seen.push(kind);
            if kind != StatusKind::Pending {
                break;
            }
        }
    });

    assert_eq!(
        seen,
        vec![
            StatusKind::Unauthenticated,
            StatusKind::Pending,
            StatusKind::Authenticated
        ]
    );
    let receipt = receipt?;
    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body["expiry"], "2026-10-20T00:00:00Z");

    let toasts = toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Success);
    assert_eq!(toasts[0].title, "You've been logged in!");
    Ok(())
}

#[tokio::test]
async fn rejected_login_ends_unauthenticated_with_server_message() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad credentials"})))
        .mount(&server)
        .await;

    let (store, toasts) = store_for(&server.uri())?;
    let err = store
        .login_user(&Credentials::new("a", "b"))
        .await
        .err()
        .ok_or_else(|| anyhow!("expected login to fail"))?;

    assert_eq!(store.status(), StatusKind::Unauthenticated);
    assert_eq!(err.message(), "bad credentials");
    assert_eq!(err.api_error().status(), Some(400));

    let toasts = toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Danger);
    assert_eq!(toasts[0].detail.as_deref(), Some("bad credentials"));
    assert!(toasts[0].sticky);
    Ok(())
}

#[tokio::test]
async fn login_field_errors_reach_the_form() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "password": ["This field may not be blank."]
        })))
        .mount(&server)
        .await;

    let (store, _) = store_for(&server.uri())?;
    let err = store
        .login_user(&Credentials::new("a", ""))
        .await
        .err()
        .ok_or_else(|| anyhow!("expected login to fail"))?;

    assert_eq!(
        err.field_errors().get("password"),
        Some(&vec!["This field may not be blank.".to_string()])
    );
    Ok(())
}

#[tokio::test]
async fn login_network_failure_uses_generic_message() -> Result<()> {
    let (store, toasts) = store_for("http://127.0.0.1:1")?;
    let err = store
        .login_user(&Credentials::new("a", "b"))
        .await
        .err()
        .ok_or_else(|| anyhow!("expected login to fail"))?;

    assert_eq!(store.status(), StatusKind::Unauthenticated);
    assert_eq!(err.message(), LOGIN_FALLBACK_MESSAGE);
    assert_eq!(toasts.drain()[0].detail.as_deref(), Some(LOGIN_FALLBACK_MESSAGE));
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_when_endpoint_is_missing() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let (store, toasts) = store_for(&server.uri())?;
    authenticated_as_bob(&server, &store).await?;
    assert!(store.snapshot().is_superuser());

    // No logout mock: the server answers 404.
    store.logout_user().await;

    let session = store.snapshot();
    assert_eq!(session, Session::Unauthenticated);
    assert!(session.user().is_none());
    assert!(!session.is_superuser());

    let toasts = toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Info);
    assert_eq!(toasts[0].title, "Logged out!");
    Ok(())
}

#[tokio::test]
async fn logout_without_network_still_notifies() -> Result<()> {
    let (store, toasts) = store_for("http://127.0.0.1:1")?;
    store.logout_user().await;

    assert_eq!(store.snapshot(), Session::Unauthenticated);
    assert_eq!(toasts.drain().len(), 1);
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_on_server_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let (store, _) = store_for(&server.uri())?;
    authenticated_as_bob(&server, &store).await?;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    store.logout_user().await;

    assert_eq!(store.snapshot(), Session::Unauthenticated);
    Ok(())
}

#[tokio::test]
async fn fetch_user_access_failure_keeps_profile() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let (store, toasts) = store_for(&server.uri())?;
    authenticated_as_bob(&server, &store).await?;

    Mock::given(method("GET"))
        .and(path("/api/me/access"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&server)
        .await;
    store.fetch_user_access().await;

    assert_eq!(store.snapshot().user(), Some(&bob()));
    let toasts = toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Error fetching user access information!");
    assert_eq!(toasts[0].detail.as_deref(), Some("boom"));
    Ok(())
}

#[tokio::test]
async fn profile_is_not_stored_while_unauthenticated() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_profile(&server).await;

    let (store, _) = store_for(&server.uri())?;
    store.fetch_user_access().await;

    assert_eq!(store.snapshot(), Session::Unauthenticated);
    Ok(())
}

#[tokio::test]
async fn hung_login_stays_pending() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(60)))
        .mount(&server)
        .await;

    let (store, toasts) = store_for(&server.uri())?;
    let credentials = Credentials::new("a", "b");
    let outcome = tokio::time::timeout(
        Duration::from_millis(300),
        store.login_user(&credentials),
    )
    .await;

    assert!(outcome.is_err(), "login should still be in flight");
    assert_eq!(store.status(), StatusKind::Pending);
    assert!(toasts.drain().is_empty());
    Ok(())
}

#[tokio::test]
async fn overlapping_login_and_logout_last_settled_wins() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (store, _) = store_for(&server.uri())?;
    let credentials = Credentials::new("a", "b");

    // Logout settles first; the slower login settles last and wins.
    let (login, ()) = tokio::join!(store.login_user(&credentials), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.logout_user().await;
    });

    assert!(login.is_ok());
    assert_eq!(store.status(), StatusKind::Authenticated);
    Ok(())
}

#[tokio::test]
async fn change_password_reports_outcome() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/change-password"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Old password is incorrect."
        })))
        .mount(&server)
        .await;

    let (store, toasts) = store_for(&server.uri())?;
    let err = store
        .change_password(&PasswordChange::new("wrong-old-password", "newValidPassword123!"))
        .await
        .err()
        .ok_or_else(|| anyhow!("expected change to fail"))?;

    assert_eq!(err.user_message(), "Old password is incorrect.");
    assert_eq!(store.status(), StatusKind::Unauthenticated);
    let toasts = toasts.drain();
    assert_eq!(toasts[0].level, ToastLevel::Danger);
    assert_eq!(toasts[0].detail.as_deref(), Some("Old password is incorrect."));
    Ok(())
}

#[tokio::test]
async fn stale_profile_is_dropped_after_relogin() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_check(&server, 200, false).await;
    Mock::given(method("GET"))
        .and(path("/api/me/access"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": bob()}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (store, _) = store_for(&server.uri())?;
    store.check_authentication().await;
    let first = store.snapshot().generation();

    let credentials = Credentials::new("alice", "secret");
    tokio::join!(store.fetch_user_access(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.logout_user().await;
        assert!(store.login_user(&credentials).await.is_ok());
    });

    let session = store.snapshot();
    assert_eq!(session.kind(), StatusKind::Authenticated);
    assert_ne!(session.generation(), first);
    assert!(session.user().is_some_and(UserProfile::is_empty));
    Ok(())
}

fn ada_draft() -> RegistrationDraft {
    RegistrationDraft {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        twitter_handle: "@ada".to_string(),
        ..RegistrationDraft::default()
    }
}

#[tokio::test]
async fn accepted_registration_clears_the_draft() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "username": "ada",
            "email": "ada@example.com",
            "password": "engine-no-1",
            "profile": {
                "company_name": "",
                "company_role": "",
                "twitter_handle": "@ada",
                "discover_from": "other"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"email": "ada@example.com"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let drafts = DraftStore::new(dir.path());
    drafts.save_registration(&ada_draft())?;

    let (store, toasts) = store_for(&server.uri())?;
    store
        .register_user(&drafts, &Registration::new(drafts.load_registration(), "engine-no-1"))
        .await?;

    assert_eq!(drafts.load_registration(), RegistrationDraft::default());
    assert_eq!(store.status(), StatusKind::Unauthenticated);
    let toasts = toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Success);
    Ok(())
}

#[tokio::test]
async fn rejected_registration_keeps_the_draft() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": {"username": ["A user with that username already exists."]},
            "detail": "Username taken."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let drafts = DraftStore::new(dir.path());
    drafts.save_registration(&ada_draft())?;

    let (store, toasts) = store_for(&server.uri())?;
    let err = store
        .register_user(&drafts, &Registration::new(ada_draft(), "engine-no-1"))
        .await
        .err()
        .ok_or_else(|| anyhow!("expected registration to fail"))?;

    assert_eq!(err.status(), Some(400));
    assert_eq!(drafts.load_registration(), ada_draft());
    let toasts = toasts.drain();
    assert_eq!(toasts[0].level, ToastLevel::Danger);
    assert_eq!(toasts[0].detail.as_deref(), Some("Username taken."));
    Ok(())
}

#[tokio::test]
async fn email_flows_report_outcome() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/resend-verification"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/request-password-reset"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "detail": "Request was throttled."
        })))
        .mount(&server)
        .await;

    let (store, toasts) = store_for(&server.uri())?;
    store.resend_verification("ada@example.com").await?;
    assert!(store.request_password_reset("ada@example.com").await.is_err());

    let toasts = toasts.drain();
    assert_eq!(toasts.len(), 2);
    assert_eq!(toasts[0].title, "Verification email sent!");
    assert_eq!(toasts[1].level, ToastLevel::Danger);
    assert_eq!(toasts[1].detail.as_deref(), Some("Request was throttled."));
    Ok(())
}
