//! Transport-neutral request and response shapes for the token and authorize endpoints.
//!
//! The host framework owns routing and body parsing. It builds an [`OauthRequest`] from the
//! urlencoded body (or query string), the headers it received, and the socket address, and
//! writes the returned [`OauthResponse`] back verbatim.

// std
use std::net::{IpAddr, SocketAddr};
// self
use crate::{
	_prelude::*,
	auth::{OauthToken, OwnerId, ScopeSet},
	oauth::{OauthError, TokenType},
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Inbound OAuth request: form fields, headers, and the peer address.
#[derive(Clone, Debug, Default)]
pub struct OauthRequest {
	form: BTreeMap<String, String>,
	headers: BTreeMap<String, String>,
	remote_addr: Option<String>,
}
impl OauthRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses an `application/x-www-form-urlencoded` body or query string.
	///
	/// Repeated keys keep the first value, matching common form readers.
	pub fn from_form_urlencoded(body: &str) -> Self {
		let mut form = BTreeMap::new();

		for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
			form.entry(key.into_owned()).or_insert_with(|| value.into_owned());
		}

		Self { form, ..Default::default() }
	}

	/// Sets a form field.
	pub fn with_form_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.form.insert(name.into(), value.into());

		self
	}

	/// Sets a header; names are matched case-insensitively.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Sets the socket peer address, with or without a port.
	pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
		self.remote_addr = Some(addr.into());

		self
	}

	/// Returns a form field; empty values count as absent.
	pub fn form_value(&self, name: &str) -> Option<&str> {
		self.form.get(name).map(String::as_str).filter(|value| !value.is_empty())
	}

	/// Returns a header value, looked up case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns the socket peer address as given by the host.
	pub fn remote_addr(&self) -> Option<&str> {
		self.remote_addr.as_deref()
	}

	/// Resolves the caller IP.
	///
	/// `proxy_header` is read first when set; the socket address (port stripped) is the
	/// fallback. When the value is a comma-separated hop chain the first entry wins.
	pub fn client_ip(&self, proxy_header: Option<&str>) -> String {
		let forwarded = proxy_header.and_then(|name| self.header(name)).filter(|v| !v.is_empty());
		let raw = match forwarded {
			Some(value) => value.to_owned(),
			None => self.remote_addr().map(strip_port).unwrap_or_default(),
		};

		raw.split(',').next().unwrap_or_default().trim().to_owned()
	}
}

/// Outbound response to be written by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OauthResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers in insertion order.
	pub headers: Vec<(String, String)>,
	/// Response body; empty for redirects.
	pub body: String,
}
impl OauthResponse {
	/// Renders a successful token response.
	pub fn token(payload: &TokenResponse) -> Self {
		match serde_json::to_string(payload) {
			Ok(body) => Self::json(200, body),
			Err(_) => Self::error(&OauthError::server_error("Failed to create token response")),
		}
	}

	/// Renders an error with the status mandated by its code.
	pub fn error(error: &OauthError) -> Self {
		let body = serde_json::to_string(error).unwrap_or_else(|e| {
			format!(r#"{{"error":"server_error","error_description":"Failed to create response: {e}"}}"#)
		});

		Self::json(error.http_status(), body)
	}

	/// `302 Found` pointing at `location`.
	pub fn redirect(location: &Url) -> Self {
		Self {
			status: 302,
			headers: vec![("Location".into(), location.to_string())],
			body: String::new(),
		}
	}

	/// Returns the first header with a case-insensitive match on `name`.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}

	fn json(status: u16, body: String) -> Self {
		Self {
			status,
			headers: vec![
				("Content-Type".into(), JSON_CONTENT_TYPE.into()),
				("Cache-Control".into(), "no-store".into()),
				("Pragma".into(), "no-cache".into()),
			],
			body,
		}
	}
}

/// Wire shape of a successful token response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Issued access token.
	pub access_token: String,
	/// Issued or carried-over refresh token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
	/// Always `Bearer`.
	pub token_type: TokenType,
	/// Seconds until the access token expires, floored.
	pub expires_in: u64,
	/// Space-joined scopes.
	pub scope: String,
	/// Resource owner the token acts for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub owner_id: Option<OwnerId>,
}
impl TokenResponse {
	/// Builds the payload from issued records, measuring `expires_in` at `now`.
	pub fn new(
		access_token: &OauthToken,
		refresh_token: Option<&OauthToken>,
		scope: &ScopeSet,
		now: OffsetDateTime,
	) -> Self {
		Self {
			access_token: access_token.value.expose().to_owned(),
			refresh_token: refresh_token.map(|token| token.value.expose().to_owned()),
			token_type: TokenType::Bearer,
			expires_in: access_token.expires_in_at(now),
			scope: scope.normalized(),
			owner_id: access_token.owner.clone(),
		}
	}
}

fn strip_port(addr: &str) -> String {
	if let Ok(socket) = addr.parse::<SocketAddr>() {
		return socket.ip().to_string();
	}
	if addr.parse::<IpAddr>().is_ok() {
		return addr.to_owned();
	}

	match addr.rsplit_once(':') {
		Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host.to_owned(),
		_ => addr.to_owned(),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::TokenKind;

	#[test]
	fn form_parsing_decodes_and_treats_empty_as_absent() {
		let request = OauthRequest::from_form_urlencoded(
			"grant_type=password&username=jane%40example.com&password=&scope=read+write",
		);

		assert_eq!(request.form_value("grant_type"), Some("password"));
		assert_eq!(request.form_value("username"), Some("jane@example.com"));
		assert_eq!(request.form_value("password"), None);
		assert_eq!(request.form_value("scope"), Some("read write"));
		assert_eq!(request.form_value("missing"), None);
	}

	#[test]
	fn headers_are_case_insensitive() {
		let request = OauthRequest::new().with_header("Authorization", "Basic abc");

		assert_eq!(request.header("authorization"), Some("Basic abc"));
		assert_eq!(request.header("AUTHORIZATION"), Some("Basic abc"));
	}

	#[test]
	fn client_ip_prefers_the_proxy_header_and_takes_the_first_hop() {
		let request = OauthRequest::new()
			.with_remote_addr("10.0.0.1:51234")
			.with_header("X-Forwarded-For", "203.0.113.7, 10.0.0.2");

		assert_eq!(request.client_ip(Some("X-Forwarded-For")), "203.0.113.7");
		assert_eq!(request.client_ip(None), "10.0.0.1");
		assert_eq!(request.client_ip(Some("X-Real-Ip")), "10.0.0.1");
	}

	#[test]
	fn client_ip_strips_ports_from_ipv6_and_hosts() {
		assert_eq!(OauthRequest::new().with_remote_addr("[::1]:8080").client_ip(None), "::1");
		assert_eq!(OauthRequest::new().with_remote_addr("::1").client_ip(None), "::1");
		assert_eq!(
			OauthRequest::new().with_remote_addr("localhost:80").client_ip(None),
			"localhost"
		);
		assert_eq!(OauthRequest::new().client_ip(None), "");
	}

	#[test]
	fn error_responses_carry_status_and_no_store() {
		let response = OauthResponse::error(&OauthError::server_error("boom"));

		assert_eq!(response.status, 500);
		assert_eq!(response.header("content-type"), Some("application/json"));
		assert_eq!(response.header("cache-control"), Some("no-store"));
		assert_eq!(
			serde_json::from_str::<serde_json::Value>(&response.body)
				.expect("Error body should be JSON."),
			serde_json::json!({ "error": "server_error", "error_description": "boom" })
		);
	}

	#[test]
	fn token_payload_omits_absent_fields() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let access = OauthToken::builder(TokenKind::AccessToken, "a-1")
			.scope(ScopeSet::parse("read"))
			.issued_at(now)
			.expires_in(Duration::seconds(3600))
			.build()
			.expect("Access token fixture should build.");
		let payload =
			TokenResponse::new(&access, None, &access.scope, now + Duration::milliseconds(1));
		let body = serde_json::to_value(&payload).expect("Token payload should serialize.");

		assert_eq!(
			body,
			serde_json::json!({
				"access_token": "a-1",
				"token_type": "Bearer",
				"expires_in": 3599,
				"scope": "read",
			})
		);
	}

	#[test]
	fn redirects_have_no_body() {
		let location =
			Url::parse("https://app.example.com/cb?code=abc").expect("Location should parse.");
		let response = OauthResponse::redirect(&location);

		assert_eq!(response.status, 302);
		assert_eq!(response.header("location"), Some("https://app.example.com/cb?code=abc"));
		assert!(response.body.is_empty());
	}
}
