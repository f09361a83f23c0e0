//! Cache generations and the analysis context that drives them.

mod cache;
mod context;

pub use cache::Memo;
pub use context::AnalysisContext;
