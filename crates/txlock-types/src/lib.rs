//! Core types shared by the txlock crates.
//!
//! Identifiers for transactions and resources, the lock type lattice with its
//! compatibility and substitutability predicates, and the `Lock` record that
//! describes a single grant.

pub mod ids;
pub mod lock;
pub mod lock_type;
pub mod resource;

pub use ids::TransactionId;
pub use lock::Lock;
pub use lock_type::LockType;
pub use resource::ResourceName;
