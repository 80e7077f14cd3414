//! Language model: configured languages and per-request language state.
//!
//! - `registry`: read model over the configured languages (list, lookup,
//!   default). Loaded from the database and owned by the top-level `Site`;
//!   components receive it by reference, never through a global.
//! - `context`: the ephemeral per-request language context (current,
//!   preferred, explicitly requested). Built at the start of a request and
//!   discarded at its end; never persisted or shared between requests.

mod context;
mod registry;

pub use context::RequestContext;
pub use registry::{Language, LanguageRegistry};
