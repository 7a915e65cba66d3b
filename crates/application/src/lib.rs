//! dns-sql application layer: the resolver port and the use cases the SQL
//! adapter drives.
pub mod errors;
pub mod ports;
pub mod use_cases;

pub use errors::LookupError;
