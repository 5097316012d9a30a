//! # Design Patterns: Polymorphic Construction
//!
//! Creational and structural patterns built around one idea: callers pick a
//! family by name and get back objects they only know through traits.
//!
//! ## Patterns Covered
//!
//! 1. **Factory method / abstract factory**
//!    - [`registry::Registry`]: selector → factory, default on unknown selector
//!    - [`components`]: Material, Bootstrap and Tailwind buttons and inputs
//!    - [`devices`]: Apple and Samsung phones and tablets
//!
//! 2. **Builder**
//!    - [`query`]: fluent MySQL and MongoDB query builders with deferred
//!      validation and idempotent `finalize`
//!
//! 3. **Singleton**
//!    - [`singleton::SingletonCell`]: exactly-once construction, cached failure
//!    - [`singleton::shared_database`]: the process-wide database handle
//!
//! 4. **Adapter**
//!    - [`notify`]: an SMS gateway exposed as a notification sender
//!
//! 5. **Prototype**
//!    - [`prototype`]: copying a loaded book instead of loading it again
//!
//! ## Running the Demo
//!
//! ```bash
//! cargo run --bin catalog
//! RUST_LOG=design_patterns=debug cargo run --bin catalog -- catalog.toml
//! ```

pub mod client;
pub mod components;
pub mod config;
pub mod devices;
pub mod error;
pub mod notify;
pub mod prototype;
pub mod query;
pub mod registry;
pub mod singleton;

pub use client::Catalog;
pub use config::CatalogConfig;
pub use error::{ConfigError, InitializationFailure, NotifyError, QueryError, UnknownSelector};
pub use registry::{Registry, Resolution};
