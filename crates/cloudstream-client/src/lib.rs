//! Cloudstream Client - streaming object transfers
//!
//! This crate issues signed GET and PUT requests and relays object bytes
//! between the process and the service without holding whole objects in
//! memory.

pub mod error;
pub mod pipe;
pub mod transfer;

#[cfg(test)]
mod mock;

// Re-exports
pub use error::TransferError;
pub use pipe::UploadPipe;
pub use transfer::TransferClient;
