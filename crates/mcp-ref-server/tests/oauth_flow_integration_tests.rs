//! Full OAuth 2.1 + PKCE authorization-code flow against the in-memory
//! store, independent of the HTTP transport (spec.md §4.11, §4.12, §8
//! scenario 5).

use mcp_ref_server::oauth::pkce;
use mcp_ref_server::oauth::OAuthStore;

#[tokio::test]
async fn test_full_authorization_code_flow_with_pkce() {
    let store = OAuthStore::new();

    let client = store.register_client(Some("test-client".to_string()), vec!["https://app.example/cb".to_string()]).await;

    let verifier = pkce::generate_code_verifier(64).unwrap();
    let challenge = pkce::generate_code_challenge(&verifier).unwrap();

    let code = store
        .store_authorization_code(
            client.client_id.clone(),
            "https://app.example/cb".to_string(),
            challenge,
            "S256".to_string(),
            "user-1".to_string(),
            "mcp".to_string(),
            Some("xyz".to_string()),
        )
        .await;

    let info = store.consume_authorization_code(&code).await.expect("code should still be valid");
    assert!(pkce::verify_code_challenge(&verifier, &info.code_challenge, &info.code_challenge_method).unwrap());

    let tokens = store.create_token_pair(&info.client_id, &info.subject, &info.scope).await;
    let (looked_up_client, looked_up_subject) =
        store.validate_access_token(&tokens.access_token).await.expect("fresh access token should validate");
    assert_eq!(looked_up_client, client.client_id);
    assert_eq!(looked_up_subject, "user-1");
}

#[tokio::test]
async fn test_authorization_code_is_single_use() {
    let store = OAuthStore::new();
    let client = store.register_client(None, vec!["https://app.example/cb".to_string()]).await;
    let code = store
        .store_authorization_code(
            client.client_id,
            "https://app.example/cb".to_string(),
            "challenge".to_string(),
            "S256".to_string(),
            "user-1".to_string(),
            "mcp".to_string(),
            None,
        )
        .await;

    assert!(store.consume_authorization_code(&code).await.is_some());
    assert!(store.consume_authorization_code(&code).await.is_none(), "second lookup must fail, even though the first succeeded");
}

#[tokio::test]
async fn test_mismatched_verifier_fails_the_exchange() {
    let store = OAuthStore::new();
    let client = store.register_client(None, vec!["https://app.example/cb".to_string()]).await;

    let verifier = pkce::generate_code_verifier(64).unwrap();
    let challenge = pkce::generate_code_challenge(&verifier).unwrap();
    let code = store
        .store_authorization_code(
            client.client_id,
            "https://app.example/cb".to_string(),
            challenge,
            "S256".to_string(),
            "user-1".to_string(),
            "mcp".to_string(),
            None,
        )
        .await;

    let info = store.consume_authorization_code(&code).await.unwrap();
    let wrong_verifier = pkce::generate_code_verifier(64).unwrap();
    assert!(!pkce::verify_code_challenge(&wrong_verifier, &info.code_challenge, &info.code_challenge_method).unwrap());
}

#[tokio::test]
async fn test_refresh_token_issues_a_new_access_token() {
    let store = OAuthStore::new();
    let client = store.register_client(None, vec!["https://app.example/cb".to_string()]).await;
    let tokens = store.create_token_pair(&client.client_id, "user-1", "mcp").await;

    let refreshed = store.refresh_token_pair(&tokens.refresh_token).await.expect("refresh should succeed");
    assert_ne!(refreshed.access_token, tokens.access_token);

    assert!(store.validate_access_token(&tokens.access_token).await.is_none(), "old access token must be revoked");
    assert!(store.validate_access_token(&refreshed.access_token).await.is_some());

    let refreshed_again =
        store.refresh_token_pair(&tokens.refresh_token).await.expect("refresh token is multi-use until revoked");
    assert!(store.validate_access_token(&refreshed_again.access_token).await.is_some());
}

#[tokio::test]
async fn test_revoked_refresh_token_cannot_be_reused() {
    let store = OAuthStore::new();
    let client = store.register_client(None, vec!["https://app.example/cb".to_string()]).await;
    let tokens = store.create_token_pair(&client.client_id, "user-1", "mcp").await;

    store.revoke_refresh_token(&tokens.refresh_token).await;
    assert!(store.refresh_token_pair(&tokens.refresh_token).await.is_none());
}

#[tokio::test]
async fn test_plain_method_is_rejected_even_with_a_matching_challenge() {
    let verifier = pkce::generate_code_verifier(64).unwrap();
    assert!(pkce::verify_code_challenge(&verifier, &verifier, "plain").is_err());
}
