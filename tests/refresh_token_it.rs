// std
use std::sync::Arc;
// crates.io
use color_eyre::Result as EyreResult;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use oauth2_issuer::{
	auth::{OauthToken, ScopeSet, TokenKind},
	grant::{RefreshTokenGrant, RefreshTokenGrantConfig},
	http::OauthRequest,
	oauth::OauthError,
	server::Server,
	store::{MemoryStore, TokenStore},
};

async fn seed_refresh(store: &MemoryStore, value: &str, scope: &str, ttl: Duration) {
	let issued_at = OffsetDateTime::now_utc() - Duration::hours(2);
	let token = OauthToken::builder(TokenKind::RefreshToken, value)
		.scope(ScopeSet::parse(scope))
		.issued_at(issued_at)
		.expires_at(issued_at + ttl)
		.build()
		.expect("Refresh token fixture should build.");

	TokenStore::create(store, token).await.expect("Refresh token fixture should be stored.");
}

fn server(store: &MemoryStore, config: RefreshTokenGrantConfig) -> Server {
	Server::builder()
		.token_store(Arc::new(store.clone()))
		.grant(RefreshTokenGrant::new(config))
		.build()
		.expect("Server should build.")
}

fn refresh_request(value: &str, scope: Option<&str>) -> OauthRequest {
	let request = OauthRequest::new()
		.with_form_value("grant_type", "refresh_token")
		.with_form_value("refresh_token", value);

	match scope {
		Some(scope) => request.with_form_value("scope", scope),
		None => request,
	}
}

async fn stored(store: &MemoryStore, value: &str) -> Option<OauthToken> {
	TokenStore::fetch(store, TokenKind::RefreshToken, value)
		.await
		.expect("Refresh token lookup should succeed.")
}

fn body(raw: &str) -> Value {
	serde_json::from_str(raw).expect("Response body should be JSON.")
}

#[tokio::test]
async fn expired_refresh_tokens_are_invalid_grants() {
	let store = MemoryStore::default();

	seed_refresh(&store, "expired-refresh", "read", Duration::hours(1)).await;

	let server = server(&store, RefreshTokenGrantConfig::default());
	let response = server.handle_token_request(&refresh_request("expired-refresh", None)).await;

	assert_eq!(response.status, 400);
	assert_eq!(
		body(&response.body),
		json!({ "error": "invalid_grant", "error_description": "Refresh token has expired" })
	);
	assert!(store.is_empty(TokenKind::AccessToken));
}

#[tokio::test]
async fn unknown_refresh_tokens_are_translated() {
	let store = MemoryStore::default();
	let server = server(&store, RefreshTokenGrantConfig::default());
	let response = server.handle_token_request(&refresh_request("never-issued", None)).await;

	assert_eq!(response.status, 400);
	assert_eq!(
		body(&response.body),
		json!({
			"error": "invalid_grant",
			"error_description": "Refresh token has expired or been deleted",
		})
	);
}

#[tokio::test]
async fn without_rotation_the_presented_token_is_returned() -> EyreResult<()> {
	let store = MemoryStore::default();

	seed_refresh(&store, "long-lived", "read write", Duration::days(30)).await;

	let server = server(&store, RefreshTokenGrantConfig::default());
	let grant = server.grant(&refresh_request("long-lived", Some("read"))).await?;
	let response = grant.response();

	assert_eq!(response.refresh_token.as_deref(), Some("long-lived"));
	assert_eq!(response.scope, "read write");
	assert_eq!(grant.access_token.scope.normalized(), "read");
	assert!(stored(&store, "long-lived").await.is_some());
	assert_eq!(store.len(TokenKind::RefreshToken), 1);
	assert_eq!(store.len(TokenKind::AccessToken), 1);

	Ok(())
}

#[tokio::test]
async fn rotation_with_revocation_replaces_the_refresh_token() -> EyreResult<()> {
	let store = MemoryStore::default();

	seed_refresh(&store, "rotate-me", "read write", Duration::days(30)).await;

	let server = server(
		&store,
		RefreshTokenGrantConfig {
			rotate_refresh_tokens: true,
			revoke_rotated_refresh_tokens: true,
			..Default::default()
		},
	);
	let grant = server.grant(&refresh_request("rotate-me", None)).await?;
	let rotated = grant.refresh_token.expect("Rotation should issue a new refresh token.");

	assert_ne!(rotated.value.expose(), "rotate-me");
	assert!(stored(&store, "rotate-me").await.is_none());
	assert_eq!(
		stored(&store, rotated.value.expose())
			.await
			.expect("Rotated refresh token should be stored.")
			.scope
			.normalized(),
		"read write"
	);
	assert_eq!(grant.access_token.scope.normalized(), "read write");

	let reuse = server.handle_token_request(&refresh_request("rotate-me", None)).await;

	assert_eq!(reuse.status, 400);
	assert_eq!(body(&reuse.body)["error"], "invalid_grant");

	Ok(())
}

#[tokio::test]
async fn rotation_without_revocation_keeps_both_tokens() -> EyreResult<()> {
	let store = MemoryStore::default();

	seed_refresh(&store, "keep-me", "read", Duration::days(30)).await;

	let server = server(
		&store,
		RefreshTokenGrantConfig { rotate_refresh_tokens: true, ..Default::default() },
	);
	let grant = server.grant(&refresh_request("keep-me", None)).await?;

	assert!(grant.refresh_token.is_some());
	assert!(stored(&store, "keep-me").await.is_some());
	assert_eq!(store.len(TokenKind::RefreshToken), 2);

	Ok(())
}

#[tokio::test]
async fn requested_scope_must_stay_within_the_refresh_token() {
	let store = MemoryStore::default();

	seed_refresh(&store, "narrow", "read", Duration::days(30)).await;

	let server = server(&store, RefreshTokenGrantConfig::default());
	let request = refresh_request("narrow", Some("read admin"));
	let response = server.handle_token_request(&request).await;

	assert_eq!(response.status, 400);
	assert_eq!(body(&response.body)["error"], "invalid_scope");
	assert!(store.is_empty(TokenKind::AccessToken));
}

#[tokio::test]
async fn client_bound_tokens_require_their_client() -> EyreResult<()> {
	let store = MemoryStore::default();
	let server = Server::builder()
		.token_store(Arc::new(store.clone()))
		.client_store(Arc::new(store.clone()))
		.grant(RefreshTokenGrant::default())
		.build()?;
	let (client, secret) = server.register_client("backend", Vec::new(), true).await?;
	let secret = secret.expect("Confidential client should receive a secret.");
	let token = OauthToken::builder(TokenKind::RefreshToken, "bound-refresh")
		.client_id(Some(client.id.clone()))
		.scope(ScopeSet::parse("read"))
		.expires_in(Duration::days(30))
		.build()?;

	TokenStore::create(&store, token).await?;

	let anonymous = server.handle_token_request(&refresh_request("bound-refresh", None)).await;

	assert_eq!(anonymous.status, 400);
	assert_eq!(
		body(&anonymous.body),
		json!({
			"error": "invalid_grant",
			"error_description": "Refresh token was issued to another client",
		})
	);
	assert!(store.is_empty(TokenKind::AccessToken));

	let owner = refresh_request("bound-refresh", None)
		.with_form_value("client_id", client.id.to_string())
		.with_form_value("client_secret", secret);
	let grant = server.grant(&owner).await?;

	assert_eq!(grant.access_token.client_id, Some(client.id));

	Ok(())
}

#[tokio::test]
async fn failed_rotation_keeps_the_presented_token() {
	let store = MemoryStore::default();

	seed_refresh(&store, "survivor", "read", Duration::days(30)).await;

	let server = Server::builder()
		.token_store(Arc::new(store.clone()))
		.grant(RefreshTokenGrant::new(RefreshTokenGrantConfig {
			rotate_refresh_tokens: true,
			revoke_rotated_refresh_tokens: true,
			..Default::default()
		}))
		.pre_persist_refresh_token(|_| Err(OauthError::access_denied("Rotation paused").into()))
		.build()
		.expect("Server should build.");
	let response = server.handle_token_request(&refresh_request("survivor", None)).await;

	assert_eq!(response.status, 500);
	assert_eq!(
		body(&response.body),
		json!({
			"error": "server_error",
			"error_description":
				"The pre_persist_refresh_token hook rejected the operation: \
				access_denied: Rotation paused.",
		})
	);
	assert!(stored(&store, "survivor").await.is_some());
	assert_eq!(store.len(TokenKind::RefreshToken), 1);
}
