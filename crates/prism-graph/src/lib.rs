//! # prism-graph
//!
//! Graph primitives shared by the Prism analysis engine.
//!
//! This crate owns two things:
//!
//! - [`ResolvedUrl`]: the canonical identity of a loadable document. Every
//!   cache key and every graph node uses this form, never the raw URL text
//!   found in a source file.
//! - [`DependencyGraph`]: the "document A imports document B" graph, together
//!   with the readiness tracking that lets transitive import scanning finish
//!   even when imports form cycles.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     DependencyGraph                      │
//! │                                                          │
//! │   a.html ──imports──▶ b.html ──imports──▶ a.html (cycle) │
//! │     │                   │                                │
//! │  [Ready]             [Pending]  ◀── add_document(b, ..)  │
//! │                                                          │
//! │  when_ready(a): DFS over currently known edges, waiting  │
//! │  for each node to leave `Pending`; visited nodes are     │
//! │  never awaited twice, so cycles terminate.               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Graphs are never mutated destructively across cache generations:
//! [`DependencyGraph::fork`] and [`DependencyGraph::invalidate_paths`] both
//! return a new graph and leave the receiver untouched.

pub mod dependency_graph;
pub mod url;

pub use dependency_graph::DependencyGraph;
pub use url::ResolvedUrl;

/// Errors raised by the dependency graph.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    /// The document itself failed to scan.
    #[error("{url} failed to scan: {reason}")]
    Rejected { url: ResolvedUrl, reason: String },

    /// The readiness channel for a document was dropped while waiting on it.
    #[error("dependency record for {0} was dropped")]
    RecordDropped(ResolvedUrl),
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
