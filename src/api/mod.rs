//! API layer - HTTP transport
//!
//! - GraphQL schema, resolvers and the guarded `/graphql` endpoint
//! - Access guard and its capability table
//! - REST mirror of the credential flows
//! - Extractors, middleware and route definitions

pub mod extractors;
pub mod graphql;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use guard::{AccessGuard, Capability, Operation};
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
