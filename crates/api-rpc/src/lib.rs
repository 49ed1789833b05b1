//! JSON-RPC API Layer
//!
//! JSON-RPC 2.0 front end for the walk-in counter: ticket intake,
//! distribution, roster management and admin projections.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
