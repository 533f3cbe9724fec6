//! Document scanning: masking, per-document context, scripts and execution

pub mod context;
pub mod executor;
pub mod masking;
pub mod script;

pub use context::DocumentContext;
pub use executor::{Document, ExecutionEngine, ExecutionResult};
pub use masking::{MaskedText, Masker};
pub use script::{ProcessRunner, ScriptAlert, ScriptHost, ScriptRunner};
