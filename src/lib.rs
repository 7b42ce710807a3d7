//! Embeddable OAuth 2.0 authorization-server engine: grant dispatch and collision-free token
//! issuance with refresh rotation and RFC 6749 error mapping, all behind pluggable stores.
//!
//! The host application owns HTTP routing and persistence. It hands an [`http::OauthRequest`]
//! to [`server::Server::handle_token_request`] and writes the returned
//! [`http::OauthResponse`] back to the wire.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod grant;
pub mod http;
pub mod issuance;
pub mod oauth;
pub mod obs;
pub mod random;
pub mod server;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use color_eyre as _;
