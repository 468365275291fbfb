//! Rosella App - storefront state and sync engine.
//!
//! The heart of this crate is the remote-synced entity store pattern: each
//! store keeps an in-memory mirror of one remote document or collection,
//! holds a live subscription that pushes snapshots into the mirror, and
//! exposes mutation methods that write through to the remote store. Local
//! mutations may land optimistically before the remote write resolves; the
//! next inbound snapshot reconciles (last-snapshot-wins).
//!
//! # Modules
//!
//! - [`store`] - document-store collaborator seam and in-process backend
//! - [`auth`] - auth-provider collaborator seam and in-process backend
//! - [`sync`] - mirror and subscription lifecycle primitives
//! - [`stores`] - the entity stores (session, ambassador, products,
//!   settings, builder, interactions)
//! - [`images`] - downscale/re-encode helpers for embedded images
//! - [`logger`] - PII-redacting logger
//! - [`router`] - route table and navigation guard
//! - [`config`] - environment configuration
//! - [`state`] - application state wiring

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod images;
pub mod logger;
pub mod router;
pub mod state;
pub mod store;
pub mod stores;
pub mod sync;

pub use state::AppState;
