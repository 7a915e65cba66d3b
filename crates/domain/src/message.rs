use crate::{DnsClass, RecordType, ResourceRecord};
use std::fmt;
use std::sync::Arc;

/// Response code carried in the low four header bits (RFC 1035 §4.1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,
    Other(u8),
}

impl ResponseCode {
    pub fn from_u8(code: u8) -> Self {
        match code & 0x0F {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NXDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            other => ResponseCode::Other(other),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NXDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Other(code) => *code & 0x0F,
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::NoError => f.write_str("NOERROR"),
            ResponseCode::FormErr => f.write_str("FORMERR"),
            ResponseCode::ServFail => f.write_str("SERVFAIL"),
            ResponseCode::NXDomain => f.write_str("NXDOMAIN"),
            ResponseCode::NotImp => f.write_str("NOTIMP"),
            ResponseCode::Refused => f.write_str("REFUSED"),
            ResponseCode::Other(code) => write!(f, "RCODE{}", code),
        }
    }
}

/// Message header. Section counts are not stored: they are the lengths of
/// the [`Message`] sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub response: bool,
    pub opcode: u8,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub rcode: ResponseCode,
}

impl Header {
    /// Header of a standard recursive query: only RD set.
    pub fn query(id: u16) -> Self {
        Self {
            id,
            response: false,
            opcode: 0,
            authoritative: false,
            truncated: false,
            recursion_desired: true,
            recursion_available: false,
            rcode: ResponseCode::NoError,
        }
    }

    pub fn flags(&self) -> u16 {
        let mut flags = 0u16;
        if self.response {
            flags |= 0x8000;
        }
        flags |= ((self.opcode & 0x0F) as u16) << 11;
        if self.authoritative {
            flags |= 0x0400;
        }
        if self.truncated {
            flags |= 0x0200;
        }
        if self.recursion_desired {
            flags |= 0x0100;
        }
        if self.recursion_available {
            flags |= 0x0080;
        }
        flags | self.rcode.to_u8() as u16
    }

    pub fn from_flags(id: u16, flags: u16) -> Self {
        Self {
            id,
            response: flags & 0x8000 != 0,
            opcode: ((flags >> 11) & 0x0F) as u8,
            authoritative: flags & 0x0400 != 0,
            truncated: flags & 0x0200 != 0,
            recursion_desired: flags & 0x0100 != 0,
            recursion_available: flags & 0x0080 != 0,
            rcode: ResponseCode::from_u8((flags & 0x000F) as u8),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: Arc<str>,
    pub qtype: RecordType,
    pub qclass: DnsClass,
}

impl Question {
    /// Same question, name compared case-insensitively.
    pub fn matches(&self, other: &Question) -> bool {
        self.qtype == other.qtype
            && self.qclass == other.qclass
            && crate::dns_name::names_equal(&self.name, &other.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn rcode(&self) -> ResponseCode {
        self.header.rcode
    }

    /// Whether this message answers `question` under transaction `id`.
    pub fn answers_question(&self, id: u16, question: &Question) -> bool {
        self.header.id == id
            && self.header.response
            && self.questions.len() == 1
            && self.questions[0].matches(question)
    }
}
