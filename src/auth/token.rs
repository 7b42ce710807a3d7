//! Token kinds, redacted secrets, and the flattened token record.

pub mod kind;
pub mod record;
pub mod secret;
