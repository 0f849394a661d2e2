//! API Module
//!
//! HTTP handlers and routing for inspecting and administering a cache.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `GET /stats` - Get cache statistics
//! - `GET /analytics` - Get cache analytics
//! - `POST /invalidate` - Invalidate keys by pattern
//! - `POST /fingerprint` - Compute a query fingerprint
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
