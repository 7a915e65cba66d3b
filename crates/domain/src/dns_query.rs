use crate::dns_name::fqdn;
use crate::{DnsClass, Question, RecordType};
use std::sync::Arc;

/// A single question to put on the wire.
///
/// The name is normalized to its fully qualified form. Each resolution attempt
/// uses its own transaction id, see [`DnsQuery::with_fresh_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: RecordType,
    pub class: DnsClass,
    pub id: u16,
}

impl DnsQuery {
    pub fn new(domain: impl AsRef<str>, record_type: RecordType) -> Self {
        Self {
            domain: fqdn(domain.as_ref().trim()).into(),
            record_type,
            class: DnsClass::IN,
            id: fastrand::u16(..),
        }
    }

    pub fn with_class(mut self, class: DnsClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    /// Same question under a new random transaction id.
    pub fn with_fresh_id(&self) -> Self {
        self.clone().with_id(fastrand::u16(..))
    }

    pub fn question(&self) -> Question {
        Question {
            name: self.domain.clone(),
            qtype: self.record_type,
            qclass: self.class,
        }
    }
}
