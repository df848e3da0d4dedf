//! API Module
//!
//! Admin HTTP handlers and routing over a shared cache instance.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value
//! - `GET /get/:key` - Retrieve a value and its staleness
//! - `DELETE /del/:key` - Delete a key
//! - `DELETE /invalidate/:prefix` - Delete every key with a prefix
//! - `DELETE /clear` - Drop every entry
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
