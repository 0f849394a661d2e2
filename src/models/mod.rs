//! Request and Response models for the cache administration API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{FingerprintRequest, InvalidateRequest, SetRequest, MAX_KEY_LENGTH};
pub use responses::{
    DeleteResponse, FingerprintResponse, GetResponse, HealthResponse, InvalidateResponse,
    SetResponse, StatsResponse,
};
