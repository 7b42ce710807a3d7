//! Auth-domain identifiers, clients, scope sets, and token models.

pub mod client;
pub mod id;
pub mod scope;
pub mod token;

pub use client::{secret::*, *};
pub use id::*;
pub use scope::*;
pub use token::{kind::*, record::*, secret::*};
