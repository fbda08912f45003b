mod support;

use ailocator::arcgis::{CredentialStore, IdentityManager};
use ailocator::config::ExtractionMode;
use ailocator::Error;
use std::sync::Arc;
use support::{GOOD_PASSWORD, TOKEN};

fn manager(base: &str) -> IdentityManager {
    let config = support::config(base, ExtractionMode::Permit);
    IdentityManager::new(
        config.http_client().unwrap(),
        &config.arcgis,
        Arc::new(CredentialStore::default()),
    )
}

#[tokio::test]
async fn sign_in_registers_token_and_display_name() {
    let (_mock, base) = support::spawn().await;
    let identity = manager(&base);

    let credential = identity.sign_in(" jdoe ", GOOD_PASSWORD).await.unwrap();
    assert_eq!(credential.user_id, "jdoe");
    assert_eq!(credential.token, TOKEN);
    assert_eq!(credential.full_name.as_deref(), Some("Jordan Doe"));
    assert!(!credential.is_expired());

    assert_eq!(identity.token().as_deref(), Some(TOKEN));
    let stored = identity
        .store()
        .find_credential(&format!("{base}/portal/"))
        .unwrap();
    assert_eq!(stored.full_name.as_deref(), Some("Jordan Doe"));
}

#[tokio::test]
async fn wrong_password_leaves_store_empty() {
    let (_mock, base) = support::spawn().await;
    let identity = manager(&base);

    let err = identity.sign_in("jdoe", "wrong").await.unwrap_err();
    match err {
        Error::SignIn(message) => assert!(message.contains("Invalid username or password")),
        other => panic!("unexpected {other:?}"),
    }
    assert!(identity.store().is_empty());
    assert!(identity.token().is_none());
}

#[tokio::test]
async fn sign_out_destroys_credentials() {
    let (_mock, base) = support::spawn().await;
    let identity = manager(&base);
    identity.sign_in("jdoe", GOOD_PASSWORD).await.unwrap();
    assert!(identity.token().is_some());

    identity.sign_out();
    assert!(identity.store().is_empty());
    assert!(identity.token().is_none());
}
