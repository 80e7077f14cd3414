//! Multilingual content core.
//!
//! Turns a single-language content store into a multilingual one: every
//! content object (post or taxonomy term) belongs to exactly one language
//! and is optionally linked to its equivalents in other languages through
//! a translation group. The crate resolves which language applies to any
//! inbound request or content-creation event, maintains translation-group
//! membership, mirrors configured fields across a group on save, and
//! encodes/decodes the language into URLs under three interchangeable
//! strategies (query parameter, path prefix, domain).
//!
//! # Architecture
//!
//! - `language`: configured languages (registry) and per-request context
//! - `links`: URL language strategies
//! - `group`: translation-group membership
//! - `resolver`: the creation-time priority chain and request binding
//! - `sync`: field synchronization across a group
//! - `terms`: term translation cloning
//! - `site`: top-level context owning the database, config, and registry
//!
//! Everything runs synchronously inside the caller's request lifecycle;
//! there is no internal scheduler or worker. Administrative UI, endpoint
//! wiring, and editor integrations live outside and talk to the core
//! through `Site` and the `ContentStore`/`TermStore` seams.

pub mod config;
pub mod db;
pub mod error;
pub mod group;
pub mod language;
pub mod links;
pub mod resolver;
pub mod site;
pub mod sync;
pub mod terms;

pub use config::{LinksMode, SiteConfig};
pub use db::Database;
pub use error::{Error, PropagationFailure, Result};
pub use group::{GroupId, ObjectId, ObjectKind, TranslationGroups};
pub use language::{Language, LanguageRegistry, RequestContext};
pub use links::LinksStrategy;
pub use resolver::{Caller, CreationRequest, LanguageResolver};
pub use site::Site;
pub use sync::{ContentStore, FieldKey, FieldValue, SyncEngine, SyncField, SyncPolicy};
pub use terms::{BatchOutcome, NewTerm, Term, TermCloner, TermStore, TermTranslation};
