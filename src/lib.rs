//! Speech-to-Sign Pipeline
//!
//! This library provides the core functionality for the speech2sign system,
//! which turns an uploaded audio utterance (or raw text) into an ordered
//! sequence of sign-language video references. Audio is transcribed by an
//! external primary provider observed through an S3-compatible object store,
//! with a local Whisper-based fallback when the provider times out or errors.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
