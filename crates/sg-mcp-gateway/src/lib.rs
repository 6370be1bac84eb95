//! # sg-mcp-gateway
//!
//! MCP (Model Context Protocol) gateway for Subscription Guardian.
//!
//! Exposes the policy engine, the delegated actor, and the finance vault
//! as `sg_`-prefixed MCP tools. The gateway holds no authorization logic:
//! every sensitive tool forwards to the engine and renders its
//! [`sg_policy::Decision`] as a flat structured result
//! (`status: "blocked" | "success"`, reason, resource id, requester,
//! timestamp).

pub mod config;
pub mod error;
pub mod server;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use server::{decision_json, GatewayState, SgGatewayServer};
