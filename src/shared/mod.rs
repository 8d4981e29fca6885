pub mod caller;
pub mod errors;
pub mod locks;

pub use caller::{Caller, Role};
pub use errors::{DomainError, DomainResult};
pub use locks::KeyedLocks;
