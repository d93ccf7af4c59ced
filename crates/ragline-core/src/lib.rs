//! # ragline-core
//!
//! Pure pipeline logic for ragline: chunking strategies, the ingestion
//! and retrieval pipelines, and the backend traits they run against.
//! This crate does no HTTP or filesystem I/O of its own; network
//! backends live in the `ragline` crate and are injected through the
//! [`embedding::Embedder`], [`index::VectorIndex`], and
//! [`generation::Generator`] traits. The bundled
//! [`index::memory::InMemoryIndex`] supports tests and offline runs.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingest;
pub mod models;
pub mod retrieve;

pub use error::{Error, Result, Stage};
