use super::RecordType;
use serde::{Serialize, Serializer};
use std::fmt::{self, Write as _};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Type-tagged record payload.
///
/// Names are stored in presentation form with a trailing dot. Types without a
/// dedicated variant keep their raw bytes in [`RData::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms)]
pub enum RData {
    A {
        address: Ipv4Addr,
    },
    AAAA {
        address: Ipv6Addr,
    },
    CNAME {
        target: String,
    },
    NS {
        nsdname: String,
    },
    PTR {
        ptrdname: String,
    },
    DNAME {
        target: String,
    },
    MX {
        preference: u16,
        exchange: String,
    },
    TXT {
        #[serde(serialize_with = "serialize_character_strings")]
        strings: Vec<Vec<u8>>,
    },
    SOA {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    CAA {
        flags: u8,
        tag: String,
        #[serde(serialize_with = "serialize_lossy")]
        value: Vec<u8>,
    },
    #[serde(rename = "UNKNOWN")]
    Unknown {
        code: u16,
        #[serde(serialize_with = "serialize_hex")]
        data: Vec<u8>,
    },
}

impl RData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RData::A { .. } => RecordType::A,
            RData::AAAA { .. } => RecordType::AAAA,
            RData::CNAME { .. } => RecordType::CNAME,
            RData::NS { .. } => RecordType::NS,
            RData::PTR { .. } => RecordType::PTR,
            RData::DNAME { .. } => RecordType::DNAME,
            RData::MX { .. } => RecordType::MX,
            RData::TXT { .. } => RecordType::TXT,
            RData::SOA { .. } => RecordType::SOA,
            RData::SRV { .. } => RecordType::SRV,
            RData::CAA { .. } => RecordType::CAA,
            RData::Unknown { code, .. } => RecordType::from_u16(*code),
        }
    }

    /// Renders the payload as a JSON object tagged with its type.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("null"))
    }
}

fn serialize_character_strings<S: Serializer>(
    strings: &[Vec<u8>],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(strings.iter().map(|s| String::from_utf8_lossy(s)))
}

fn serialize_lossy<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(value))
}

fn serialize_hex<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_hex(data))
}

pub(crate) fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Writes a `<character-string>` in zone-file form: quoted, with `"` and `\`
/// escaped and non-printable bytes as `\DDD`.
fn write_character_string(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_char('"')?;
    for &b in bytes {
        match b {
            b'"' | b'\\' => write!(f, "\\{}", b as char)?,
            0x20..=0x7e => f.write_char(b as char)?,
            _ => write!(f, "\\{:03}", b)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A { address } => write!(f, "{}", address),
            RData::AAAA { address } => write!(f, "{}", address),
            RData::CNAME { target } | RData::DNAME { target } => f.write_str(target),
            RData::NS { nsdname } => f.write_str(nsdname),
            RData::PTR { ptrdname } => f.write_str(ptrdname),
            RData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RData::TXT { strings } => {
                for (i, s) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write_character_string(f, s)?;
                }
                Ok(())
            }
            RData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                mname, rname, serial, refresh, retry, expire, minimum
            ),
            RData::SRV {
                priority,
                weight,
                port,
                target,
            } => write!(f, "{} {} {} {}", priority, weight, port, target),
            RData::CAA { flags, tag, value } => {
                write!(f, "{} {} ", flags, tag)?;
                write_character_string(f, value)
            }
            RData::Unknown { data, .. } => {
                // RFC 3597 §5
                write!(f, "\\# {}", data.len())?;
                if !data.is_empty() {
                    write!(f, " {}", to_hex(data))?;
                }
                Ok(())
            }
        }
    }
}
