use super::{DnsClass, RData, RecordType};
use std::sync::Arc;

/// One resource record from a response section.
///
/// The record type is carried by [`RData`], so the payload always agrees with
/// the declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: Arc<str>,
    pub class: DnsClass,
    pub ttl: u32,
    pub rdata: RData,
}

impl ResourceRecord {
    pub fn new(name: impl Into<Arc<str>>, class: DnsClass, ttl: u32, rdata: RData) -> Self {
        Self {
            name: name.into(),
            class,
            ttl,
            rdata,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.rdata.record_type()
    }
}
