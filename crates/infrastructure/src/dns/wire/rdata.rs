use super::name::{read_name, write_name};
use dns_sql_domain::{DecodeError, RData, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Decodes `len` bytes of RDATA at `start`. Names inside the RDATA may point
/// anywhere earlier in `msg`, so the whole message is passed in.
pub(crate) fn decode_rdata(
    msg: &[u8],
    start: usize,
    len: usize,
    rtype: RecordType,
) -> Result<RData, DecodeError> {
    let end = start + len;
    let data = msg.get(start..end).ok_or(DecodeError::TruncatedMessage {
        offset: start,
        needed: end.saturating_sub(msg.len()),
    })?;
    let mismatch = DecodeError::RdataLengthMismatch { rtype, len };

    let rdata = match rtype {
        RecordType::A => {
            let octets: [u8; 4] = data.try_into().map_err(|_| mismatch.clone())?;
            RData::A {
                address: Ipv4Addr::from(octets),
            }
        }
        RecordType::AAAA => {
            let octets: [u8; 16] = data.try_into().map_err(|_| mismatch.clone())?;
            RData::AAAA {
                address: Ipv6Addr::from(octets),
            }
        }
        RecordType::CNAME => RData::CNAME {
            target: rdata_name(msg, start, end, &mismatch)?.0,
        },
        RecordType::DNAME => RData::DNAME {
            target: rdata_name(msg, start, end, &mismatch)?.0,
        },
        RecordType::NS => RData::NS {
            nsdname: rdata_name(msg, start, end, &mismatch)?.0,
        },
        RecordType::PTR => RData::PTR {
            ptrdname: rdata_name(msg, start, end, &mismatch)?.0,
        },
        RecordType::MX => {
            if len < 3 {
                return Err(mismatch);
            }
            let preference = u16::from_be_bytes([data[0], data[1]]);
            let (exchange, _) = rdata_name(msg, start + 2, end, &mismatch)?;
            RData::MX {
                preference,
                exchange,
            }
        }
        RecordType::TXT => RData::TXT {
            strings: character_strings(data).ok_or(mismatch)?,
        },
        RecordType::SOA => {
            let (mname, next) = name_within(msg, start, end, &mismatch)?;
            let (rname, next) = name_within(msg, next, end, &mismatch)?;
            let fixed = msg.get(next..end).filter(|f| f.len() == 20).ok_or(mismatch)?;
            let word = |i: usize| {
                u32::from_be_bytes([fixed[i], fixed[i + 1], fixed[i + 2], fixed[i + 3]])
            };
            RData::SOA {
                mname,
                rname,
                serial: word(0),
                refresh: word(4),
                retry: word(8),
                expire: word(12),
                minimum: word(16),
            }
        }
        RecordType::SRV => {
            if len < 7 {
                return Err(mismatch);
            }
            let priority = u16::from_be_bytes([data[0], data[1]]);
            let weight = u16::from_be_bytes([data[2], data[3]]);
            let port = u16::from_be_bytes([data[4], data[5]]);
            let (target, _) = rdata_name(msg, start + 6, end, &mismatch)?;
            RData::SRV {
                priority,
                weight,
                port,
                target,
            }
        }
        RecordType::CAA => {
            if len < 2 {
                return Err(mismatch);
            }
            let flags = data[0];
            let tag_len = data[1] as usize;
            if tag_len == 0 || 2 + tag_len > len {
                return Err(mismatch);
            }
            // Tags are ASCII letters and digits (RFC 8659 §4.1).
            let tag = &data[2..2 + tag_len];
            if !tag.iter().all(u8::is_ascii_alphanumeric) {
                return Err(mismatch);
            }
            RData::CAA {
                flags,
                tag: tag.iter().map(|&b| char::from(b)).collect(),
                value: data[2 + tag_len..].to_vec(),
            }
        }
        other => RData::Unknown {
            code: other.to_u16(),
            data: data.to_vec(),
        },
    };
    Ok(rdata)
}

/// A name that must fill the RDATA exactly.
fn rdata_name(
    msg: &[u8],
    start: usize,
    end: usize,
    mismatch: &DecodeError,
) -> Result<(String, usize), DecodeError> {
    let (name, next) = name_within(msg, start, end, mismatch)?;
    if next != end {
        return Err(mismatch.clone());
    }
    Ok((name, next))
}

/// A name whose in-place bytes must not run past `end`.
fn name_within(
    msg: &[u8],
    start: usize,
    end: usize,
    mismatch: &DecodeError,
) -> Result<(String, usize), DecodeError> {
    if start >= end {
        return Err(mismatch.clone());
    }
    let (name, next) = read_name(&msg[..end], start).map_err(|e| match e {
        DecodeError::TruncatedMessage { .. } => mismatch.clone(),
        other => other,
    })?;
    Ok((name, next))
}

fn character_strings(data: &[u8]) -> Option<Vec<Vec<u8>>> {
    if data.is_empty() {
        return None;
    }
    let mut strings = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let len = data[pos] as usize;
        strings.push(data.get(pos + 1..pos + 1 + len)?.to_vec());
        pos += 1 + len;
    }
    Some(strings)
}

/// Wire form of `rdata`, names uncompressed.
pub(crate) fn write_rdata(buf: &mut Vec<u8>, rdata: &RData) -> Result<(), DecodeError> {
    match rdata {
        RData::A { address } => buf.extend_from_slice(&address.octets()),
        RData::AAAA { address } => buf.extend_from_slice(&address.octets()),
        RData::CNAME { target } | RData::DNAME { target } => write_name(buf, target)?,
        RData::NS { nsdname } => write_name(buf, nsdname)?,
        RData::PTR { ptrdname } => write_name(buf, ptrdname)?,
        RData::MX {
            preference,
            exchange,
        } => {
            buf.extend_from_slice(&preference.to_be_bytes());
            write_name(buf, exchange)?;
        }
        RData::TXT { strings } => {
            for s in strings {
                let len = u8::try_from(s.len()).map_err(|_| DecodeError::RdataLengthMismatch {
                    rtype: RecordType::TXT,
                    len: s.len(),
                })?;
                buf.push(len);
                buf.extend_from_slice(s);
            }
        }
        RData::SOA {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        } => {
            write_name(buf, mname)?;
            write_name(buf, rname)?;
            for value in [serial, refresh, retry, expire, minimum] {
                buf.extend_from_slice(&value.to_be_bytes());
            }
        }
        RData::SRV {
            priority,
            weight,
            port,
            target,
        } => {
            buf.extend_from_slice(&priority.to_be_bytes());
            buf.extend_from_slice(&weight.to_be_bytes());
            buf.extend_from_slice(&port.to_be_bytes());
            write_name(buf, target)?;
        }
        RData::CAA { flags, tag, value } => {
            let tag_len = u8::try_from(tag.len()).map_err(|_| DecodeError::RdataLengthMismatch {
                rtype: RecordType::CAA,
                len: tag.len(),
            })?;
            buf.push(*flags);
            buf.push(tag_len);
            buf.extend_from_slice(tag.as_bytes());
            buf.extend_from_slice(value);
        }
        RData::Unknown { data, .. } => buf.extend_from_slice(data),
    }
    Ok(())
}
