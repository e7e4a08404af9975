//! # n8n-mcp - MCP tool server for the n8n automation platform
//!
//! Exposes the n8n public REST API (workflows, executions, credentials, users,
//! tags, variables, projects and security audits) as a flat catalog of named
//! tools that an MCP client can discover and call.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - One declarative shape contract per tool, used for both validation and the
//!   advertised JSON schema
//! - Exact-name routing built once at startup
//! - Failures are reported as data, never as transport faults
//!
//! ## Architecture
//!
//! 1. **`N8nApi`** is the only component that talks to the network.
//! 2. **Handlers** (one per resource domain) validate arguments, build
//!    [`ApiRequest`]s and shape the results.
//! 3. **`ToolRouter`** owns the catalog and maps each tool name to its handler.
//! 4. **`N8nServer`** adapts the router to `rmcp`.
//!
//! ### Core Types
//!
//! - **`ApiClient`**: Trait seam between handlers and the network.
//! - **`ShapeContract`**: Field list of a tool's arguments.
//! - **`Operation`**: Name, domain, description and contract of one tool.
//! - **`ToolError`**: Everything a tool call can fail with.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use n8n_mcp::{ConnectionConfig, N8nApi, ToolRouter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::new("https://n8n.example.com", "your-api-key");
//!     let router = ToolRouter::new(Arc::new(N8nApi::new(config)?))?;
//!
//!     let workflows = router
//!         .route("n8n_list_workflows", &serde_json::Map::new())
//!         .await?;
//!     println!("{workflows:#}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod http;
pub mod mcp;
pub mod router;
pub mod shape;
pub mod tools;

pub use api::N8nApi;
pub use client::{ApiClient, ApiRequest, ClientError};
pub use config::ConnectionConfig;
pub use mcp::N8nServer;
pub use router::ToolRouter;
pub use shape::{JsonObject, ShapeContract, ValidationError};
pub use tools::{Domain, Operation, ToolError, ToolHandler};

// Re-export rmcp for convenience
pub use rmcp;
