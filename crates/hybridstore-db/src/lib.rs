//! Hybridstore Metadata Repository
//!
//! Row-oriented catalog of stored files: one row per `StoredFileRecord` plus
//! its free-form metadata (category, description, tags). The upload router
//! consumes the `FileRecordRepository` trait; this crate provides a Postgres
//! implementation and an in-memory one for tests.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::MemoryFileRecordRepository;
pub use postgres::PgFileRecordRepository;
pub use traits::FileRecordRepository;
