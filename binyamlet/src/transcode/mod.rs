//! Output formats that need a third-party encoder.

pub mod cbor;
pub mod toml;
pub mod yaml;
