pub mod lookup_records;
pub mod search_list;

pub use lookup_records::{LookupRecordsUseCase, LookupRequest};
pub use search_list::SearchListUseCase;
