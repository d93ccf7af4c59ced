//! # ragline
//!
//! **A strategy-driven chunking, embedding, and retrieval-augmented
//! answering service for technical documentation.**
//!
//! ragline splits documents with a selectable chunking strategy
//! (fixed, markdown, semantic, or hybrid), embeds every chunk, and
//! indexes the vectors for similarity search and retrieval-augmented
//! question answering via a CLI and a JSON HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Document │──▶│   Pipeline   │──▶│ Vector Index │
//! │ (md/txt) │   │ Chunk+Embed  │   │ mem/Pinecone │
//! └──────────┘   └──────────────┘   └──────┬───────┘
//!                                          │
//!                      ┌───────────────────┤
//!                      ▼                   ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │   CLI    │       │   HTTP   │
//!                 │(ragline) │       │  (axum)  │
//!                 └──────────┘       └──────────┘
//! ```
//!
//! Pipeline logic lives in the `ragline-core` crate; this crate wires
//! it to real backends (OpenAI embeddings and chat, a Pinecone-style
//! vector index) and to offline stand-ins (deterministic hash
//! embeddings, an in-memory index) selected through the config file.
//!
//! ## Quick Start
//!
//! ```bash
//! ragline ingest docs/guide.md          # chunk, embed, and index
//! ragline search "connection pooling"   # similarity search
//! ragline ask "How do I set retries?"   # RAG answer with sources
//! ragline compare docs/guide.md         # chunking strategy stats
//! ragline serve                         # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`embedding`] | OpenAI and hash embedding backends |
//! | [`generation`] | OpenAI chat and disabled generation backends |
//! | [`vector_index`] | Pinecone-style and in-memory index backends |
//! | [`server`] | JSON HTTP server |
//! | [`commands`] | CLI command handlers |

pub mod commands;
pub mod config;
pub mod embedding;
pub mod generation;
mod http;
pub mod server;
pub mod vector_index;
