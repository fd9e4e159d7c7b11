//! Tests for the auth module

use super::*;
use base64::Engine;
use crate::error::Error;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_case::test_case;

/// January 1, 2020 00:00:00 UTC
fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

fn offset(days: i64, hours: i64, minutes: i64, seconds: i64) -> DateTime<Utc> {
    reference()
        + Duration::days(days)
        + Duration::hours(hours)
        + Duration::minutes(minutes)
        + Duration::seconds(seconds)
}

fn expiring_at(at: DateTime<Utc>) -> HeaderCredential {
    HeaderCredential::new("", "").with_expiry(at)
}

// ============================================================================
// Header values
// ============================================================================

#[test]
fn test_header_credential_value() {
    let credential = HeaderCredential::new("123", "bearer");
    assert_eq!(
        credential.header(),
        ("Authorization", "bearer 123".to_string())
    );
}

#[test]
fn test_header_credential_empty_type_sends_bare_token() {
    let credential = HeaderCredential::new("raw-token", "");
    assert_eq!(credential.header_value(), "raw-token");
}

#[test]
fn test_bearer_credential() {
    let credential = HeaderCredential::bearer("my-bearer-token");
    assert_eq!(credential.header_value(), "Bearer my-bearer-token");
}

#[test]
fn test_basic_credential() {
    let credential = HeaderCredential::basic("user", "pass");
    let value = credential.header_value();
    assert!(value.starts_with("Basic "));

    let encoded = value.strip_prefix("Basic ").unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "user:pass");
}

#[test]
fn test_query_credential_pair() {
    let credential = QueryCredential::new("apiToken", "123");
    assert_eq!(credential.pair(), ("apiToken", "123"));
}

#[test]
fn test_credential_contributions() {
    let header = Credential::header("abc", "bearer");
    assert_eq!(
        header.header_pair(),
        Some(("Authorization", "bearer abc".to_string()))
    );
    assert!(header.query_pair().is_none());

    let query = Credential::query("apiKey", "apiValue");
    assert!(query.header_pair().is_none());
    assert_eq!(query.query_pair(), Some(("apiKey", "apiValue")));
}

#[test]
fn test_refresh_token_is_kept() {
    let credential = HeaderCredential::bearer("t").with_refresh_token("r-1");
    assert_eq!(credential.refresh_token(), Some("r-1"));
    assert_eq!(HeaderCredential::bearer("t").refresh_token(), None);
}

// ============================================================================
// Expiration
// ============================================================================

#[test]
fn test_expiring_in_seconds() {
    let credential = HeaderCredential::new("", "")
        .expiring_in(reference(), 45)
        .unwrap();
    assert_eq!(credential.expires_at(), Some(offset(0, 0, 0, 45)));
}

#[test_case(i64::MAX ; "far future")]
#[test_case(i64::MIN ; "far past")]
#[test_case(i64::MAX / 1000 ; "past the last representable date")]
fn test_expiring_in_out_of_range(seconds: i64) {
    let err = HeaderCredential::new("abc", "bearer")
        .expiring_in(reference(), seconds)
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_expiry_from_iso8601() {
    let credential = HeaderCredential::new("", "")
        .with_expiry_str("2020-01-01T00:00:00Z")
        .unwrap();
    assert_eq!(credential.expires_at(), Some(reference()));
}

#[test]
fn test_expiry_from_invalid_string() {
    let result = HeaderCredential::new("", "").with_expiry_str("tomorrow");
    assert!(result.is_err());
}

#[test]
fn test_not_expired_before_expiration() {
    let credential = expiring_at(offset(0, 24, 0, 0));
    assert!(!credential.is_expired(reference()));
}

#[test]
fn test_expired_after_expiration() {
    let credential = expiring_at(reference());
    assert!(credential.is_expired(offset(0, 24, 0, 0)));
}

#[test]
fn test_not_expired_at_exact_expiration() {
    let credential = expiring_at(reference());
    assert!(!credential.is_expired(reference()));
}

#[test]
fn test_no_expiration_never_expires() {
    let credential = HeaderCredential::bearer("t");
    assert!(!credential.is_expired(offset(3650, 0, 0, 0)));
}

#[test]
fn test_about_to_expire_hours() {
    let credential = expiring_at(offset(0, 24, 0, 0));
    assert!(!credential.is_about_to_expire(offset(0, 12, 0, 0), ToleranceLevel::Hours, 4.0));
    assert!(credential.is_about_to_expire(offset(0, 22, 0, 0), ToleranceLevel::Hours, 4.0));
}

#[test]
fn test_about_to_expire_days() {
    let credential = expiring_at(offset(30, 0, 0, 0));
    assert!(!credential.is_about_to_expire(offset(25, 0, 0, 0), ToleranceLevel::Days, 1.0));
    assert!(credential.is_about_to_expire(offset(29, 0, 0, 0), ToleranceLevel::Days, 2.0));
}

#[test]
fn test_about_to_expire_minutes() {
    let credential = expiring_at(offset(0, 0, 30, 0));
    assert!(!credential.is_about_to_expire(reference(), ToleranceLevel::Minutes, 5.0));
    assert!(credential.is_about_to_expire(offset(0, 0, 26, 0), ToleranceLevel::Minutes, 5.0));
}

#[test]
fn test_about_to_expire_seconds() {
    let credential = expiring_at(offset(0, 0, 0, 30));
    assert!(!credential.is_about_to_expire(offset(0, 0, 0, 10), ToleranceLevel::Seconds, 5.0));
    assert!(credential.is_about_to_expire(offset(0, 0, 0, 26), ToleranceLevel::Seconds, 5.0));
}

#[test]
fn test_about_to_expire_measures_absolute_difference() {
    // Two seconds past the expiration is still within a five second window.
    let credential = expiring_at(offset(0, 0, 0, 30));
    assert!(credential.is_about_to_expire(offset(0, 0, 0, 32), ToleranceLevel::Seconds, 5.0));
}

#[test]
fn test_about_to_expire_without_expiration() {
    let credential = HeaderCredential::bearer("t");
    assert!(credential.is_about_to_expire(reference(), ToleranceLevel::Days, 1.0));
}

// ============================================================================
// Serde
// ============================================================================

#[test]
fn test_credential_serde_header() {
    let json = serde_json::json!({
        "kind": "header",
        "token": "abc",
        "token_type": "bearer",
        "expires_at": "2020-01-01T00:00:00Z"
    });
    let credential: Credential = serde_json::from_value(json).unwrap();
    let Credential::Header(header) = &credential else {
        panic!("expected header credential");
    };
    assert_eq!(header.header_value(), "bearer abc");
    assert_eq!(header.expires_at(), Some(reference()));

    let back = serde_json::to_value(&credential).unwrap();
    assert_eq!(back["kind"], "header");
    assert_eq!(back["token"], "abc");
}

#[test]
fn test_credential_serde_query() {
    let credential: Credential =
        serde_yaml::from_str("kind: query\nkey: apiKey\nvalue: \"123\"\n").unwrap();
    assert_eq!(credential, Credential::query("apiKey", "123"));
}

// ============================================================================
// Store
// ============================================================================

#[tokio::test]
async fn test_store_starts_empty() {
    let store = CredentialStore::new();
    assert!(!store.is_set().await);
    assert!(store.snapshot().await.is_none());
}

#[tokio::test]
async fn test_store_replace_and_snapshot() {
    let store = CredentialStore::new();
    assert!(store.replace(Credential::header("abc", "bearer")).await.is_none());

    let previous = store.replace(Credential::query("k", "v")).await;
    assert_eq!(previous, Some(Credential::header("abc", "bearer")));
    assert_eq!(store.snapshot().await, Some(Credential::query("k", "v")));
}

#[tokio::test]
async fn test_store_snapshot_is_detached() {
    let store = CredentialStore::with_credential(Credential::header("old", "bearer"));
    let snapshot = store.snapshot().await;

    store.replace(Credential::header("new", "bearer")).await;

    assert_eq!(snapshot, Some(Credential::header("old", "bearer")));
}

#[tokio::test]
async fn test_store_clones_share_state() {
    let store = CredentialStore::new();
    let handle = store.clone();

    handle.replace(Credential::header("shared", "")).await;
    assert!(store.is_set().await);

    store.clear().await;
    assert!(!handle.is_set().await);
}

// ============================================================================
// Refresh hooks
// ============================================================================

#[tokio::test]
async fn test_closure_refresh_hook() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let hook = move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }
    };

    assert!(hook.refresh().await);
    assert!(hook.refresh().await);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_callback_refresh_completes() {
    let hook = CallbackRefresh::new(|completion: RefreshCompletion| {
        tokio::spawn(async move {
            completion.complete(true);
        });
    });
    assert!(hook.refresh().await);

    let hook = CallbackRefresh::new(|completion: RefreshCompletion| completion.complete(false));
    assert!(!hook.refresh().await);
}

#[tokio::test]
async fn test_callback_refresh_dropped_completion_fails() {
    let hook = CallbackRefresh::new(|completion: RefreshCompletion| drop(completion));
    assert!(!hook.refresh().await);
}

#[tokio::test]
async fn test_refresh_hook_updates_store() {
    let store = CredentialStore::with_credential(Credential::header("stale", "bearer"));
    let handle = store.clone();
    let hook = move || {
        let handle = handle.clone();
        async move {
            handle.replace(Credential::header("fresh", "bearer")).await;
            true
        }
    };

    assert!(hook.refresh().await);
    assert_eq!(store.snapshot().await, Some(Credential::header("fresh", "bearer")));
}
