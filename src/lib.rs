//! bioauth - authentication and user management over GraphQL.
//!
//! Email/password registration and login plus a biometric-key login path,
//! all issuing HS256 bearer tokens.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: command-line entry points (`serve`, `migrate`)
//! - **config**: environment-driven settings and constants
//! - **domain**: entities, request/response shapes, secret hashing
//! - **services**: token issuer, biometric matcher, auth and user flows
//! - **infra**: SeaORM database, migrations and the credential store
//! - **api**: GraphQL schema, access guard, REST mirror, routes
//! - **errors**: the error taxonomy and its transport renderings
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{AuthResult, Credential, User};
pub use errors::{AppError, AppResult};
