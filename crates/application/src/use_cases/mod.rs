pub mod dns;

pub use dns::{LookupRecordsUseCase, LookupRequest, SearchListUseCase};
