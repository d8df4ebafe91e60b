pub mod client;
pub mod error;
pub mod operations;
pub mod status;

pub use client::BridgeClient;
pub use error::BridgeError;
pub use operations::BridgeOperation;
