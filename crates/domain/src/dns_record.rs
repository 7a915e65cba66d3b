mod class;
mod rdata;
mod record_type;
mod resource_record;

pub use class::DnsClass;
pub use rdata::RData;
pub use record_type::RecordType;
pub use resource_record::ResourceRecord;
