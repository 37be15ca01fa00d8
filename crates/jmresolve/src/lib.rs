//! Resolve tokenizer output to JMdict senses.
//!
//! [`resolver`] is the synchronous core: one fragment in, at most one
//! [`ResolvedEntry`] out. [`handlers`] puts it behind an axum router for the
//! `jmresolve` binary.

pub mod handlers;
pub mod resolver;

pub use handlers::{AppState, router};
pub use resolver::{
    EntryMatch, MatchedSense, MecabOutput, Resolution, ResolvedEntry, Tokenizer, resolve,
    resolve_all, resolve_text,
};
