use crate::{Message, RecordType, ResourceRecord, ResponseCode};
use std::fmt;

/// Response section a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Answer,
    Authority,
    Additional,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Answer => "answer",
            Section::Authority => "authority",
            Section::Additional => "additional",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionedRecord {
    pub section: Section,
    pub record: ResourceRecord,
}

/// Outcome of one successful resolution, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Answer, authority and additional records, in that order.
    pub records: Vec<SectionedRecord>,
    pub truncated: bool,
    pub rcode: ResponseCode,
    /// Nameserver that produced the response, as a URL.
    pub nameserver: String,
}

impl ResolutionResult {
    /// Flattens the record sections of `message`. The EDNS OPT pseudo-record
    /// describes the transport, not the zone, and is left out.
    pub fn from_message(message: Message, nameserver: impl Into<String>) -> Self {
        let truncated = message.header.truncated;
        let rcode = message.header.rcode;
        let sections = [
            (Section::Answer, message.answers),
            (Section::Authority, message.authority),
            (Section::Additional, message.additional),
        ];
        let records = sections
            .into_iter()
            .flat_map(|(section, records)| {
                records
                    .into_iter()
                    .map(move |record| SectionedRecord { section, record })
            })
            .filter(|r| r.record.record_type() != RecordType::OPT)
            .collect();

        Self {
            records,
            truncated,
            rcode,
            nameserver: nameserver.into(),
        }
    }

    pub fn answers(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records
            .iter()
            .filter(|r| r.section == Section::Answer)
            .map(|r| &r.record)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
