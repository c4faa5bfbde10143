//! # pay-store
//!
//! `PricingStore` implementations.
//!
//! - **TursoStore** talks to a hosted libSQL database over its HTTP
//!   pipeline API (`TURSO_DATABASE_URL`, `TURSO_AUTH_TOKEN`).
//! - **MemoryStore** keeps the pricing row and enrollments in process, for
//!   store-less deployments and tests.
//!
//! ```rust,ignore
//! use pay_store::{StoreConfig, TursoStore};
//!
//! let store = TursoStore::new(StoreConfig::new("libsql://db.turso.io").with_auth_token(token))?;
//! store.ensure_schema().await?;
//! let pricing = store.current_pricing().await?;
//! ```

pub mod config;
pub mod hrana;
pub mod memory;
pub mod turso;

pub use config::StoreConfig;
pub use memory::MemoryStore;
pub use turso::TursoStore;
