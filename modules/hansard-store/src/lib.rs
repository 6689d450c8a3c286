//! Persistence for the Bronze audit trail and the Gold entities.
//!
//! The audit log store is append-only: `create` is the only write, `update`
//! fails loudly. Entity repositories are the mutable side, guarded upstream
//! by the manually-verified flag. Both come as in-memory implementations
//! (tests, dev) and Postgres implementations.

pub mod memory;
pub mod postgres;
pub mod schema;
pub mod traits;

pub use memory::{
    MemoryAuditLogStore, MemoryMembershipRepo, MemoryPoliticianRepo, MemorySpeakerRepo,
    MemoryStatementRepo,
};
pub use postgres::{
    PgAuditLogStore, PgMembershipRepo, PgPoliticianRepo, PgSpeakerRepo, PgStatementRepo,
};
pub use schema::ensure_schema;
pub use traits::{
    AccuracyStats, AuditLogStore, AutoCommit, LogFilter, MembershipRepository,
    PoliticianRepository, SpeakerRepository, StatementRepository, TransactionBoundary,
};
