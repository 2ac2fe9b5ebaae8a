//! Personal-library record service.
//!
//! A thin CRUD layer over a persistent book store: five operations on two
//! HTTP routes. Handlers validate input, perform one store operation, and
//! shape the response; everything else is wiring.

pub mod config;
pub mod model;
pub mod routes;
pub mod server;
pub mod store;

pub use config::{ConfigError, ServiceConfig, StoreBackend};
pub use model::{Book, BookId, InvalidBookId};
pub use routes::{AppState, router};
pub use server::{ServeError, serve};
pub use store::{BookStore, MemoryBookStore, RedbBookStore, StoreError};
