use super::{MAX_LABEL_LEN, MAX_NAME_LEN, MAX_POINTER_FOLLOWS};
use dns_sql_domain::DecodeError;
use std::fmt::Write as _;

/// Splits a presentation-form name into wire labels, honouring `\.` and
/// `\DDD` escapes. The root name has no labels.
pub(crate) fn name_to_labels(name: &str) -> Result<Vec<Vec<u8>>, DecodeError> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes == b"." {
        return Ok(Vec::new());
    }

    let mut labels = Vec::new();
    let mut label = Vec::new();
    let mut wire_len = 1;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                if label.is_empty() {
                    return Err(DecodeError::MalformedName {
                        offset: i,
                        reason: "empty label",
                    });
                }
                wire_len += label.len() + 1;
                labels.push(std::mem::take(&mut label));
                i += 1;
            }
            b'\\' => {
                let (byte, consumed) = unescape(bytes, i)?;
                label.push(byte);
                i += consumed;
            }
            b => {
                label.push(b);
                i += 1;
            }
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(DecodeError::MalformedName {
                offset: i,
                reason: "label exceeds 63 bytes",
            });
        }
    }
    if !label.is_empty() {
        wire_len += label.len() + 1;
        labels.push(label);
    }
    if wire_len > MAX_NAME_LEN {
        return Err(DecodeError::MalformedName {
            offset: 0,
            reason: "name exceeds 255 bytes",
        });
    }
    Ok(labels)
}

fn unescape(bytes: &[u8], at: usize) -> Result<(u8, usize), DecodeError> {
    let malformed = DecodeError::MalformedName {
        offset: at,
        reason: "invalid escape",
    };
    match bytes.get(at + 1..at + 4) {
        Some(digits) if digits.iter().all(u8::is_ascii_digit) => {
            let value = digits
                .iter()
                .fold(0u16, |acc, d| acc * 10 + (d - b'0') as u16);
            let byte = u8::try_from(value).map_err(|_| malformed)?;
            Ok((byte, 4))
        }
        _ => match bytes.get(at + 1) {
            Some(b) if !b.is_ascii_digit() => Ok((*b, 2)),
            _ => Err(malformed),
        },
    }
}

pub(crate) fn write_name(buf: &mut Vec<u8>, name: &str) -> Result<(), DecodeError> {
    for label in name_to_labels(name)? {
        buf.push(label.len() as u8);
        buf.extend_from_slice(&label);
    }
    buf.push(0);
    Ok(())
}

fn push_label(out: &mut String, label: &[u8]) {
    for &b in label {
        match b {
            b'.' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x21..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03}", b);
            }
        }
    }
    out.push('.');
}

/// Reads a possibly compressed name starting at `start`.
///
/// Returns the name in presentation form (trailing dot) and the offset just
/// past the name's in-place bytes.
pub(crate) fn read_name(msg: &[u8], start: usize) -> Result<(String, usize), DecodeError> {
    let mut out = String::new();
    let mut pos = start;
    let mut end = None;
    let mut follows = 0;
    let mut pointer_floor = start;
    let mut wire_len = 1;

    loop {
        let len = *msg.get(pos).ok_or(DecodeError::TruncatedMessage {
            offset: pos,
            needed: 1,
        })?;

        match len & 0xC0 {
            0x00 if len == 0 => {
                end.get_or_insert(pos + 1);
                break;
            }
            0x00 => {
                let label_start = pos + 1;
                let label_end = label_start + len as usize;
                let label = msg
                    .get(label_start..label_end)
                    .ok_or_else(|| DecodeError::TruncatedMessage {
                        offset: label_start,
                        needed: label_end.saturating_sub(msg.len()),
                    })?;
                wire_len += label.len() + 1;
                if wire_len > MAX_NAME_LEN {
                    return Err(DecodeError::MalformedName {
                        offset: pos,
                        reason: "name exceeds 255 bytes",
                    });
                }
                push_label(&mut out, label);
                pos = label_end;
            }
            0xC0 => {
                let low = *msg.get(pos + 1).ok_or(DecodeError::TruncatedMessage {
                    offset: pos + 1,
                    needed: 1,
                })?;
                let target = (((len & 0x3F) as usize) << 8) | low as usize;
                end.get_or_insert(pos + 2);

                follows += 1;
                if follows > MAX_POINTER_FOLLOWS {
                    return Err(DecodeError::MalformedName {
                        offset: pos,
                        reason: "too many compression pointers",
                    });
                }
                if target >= pointer_floor {
                    return Err(DecodeError::MalformedName {
                        offset: pos,
                        reason: "compression pointer does not point backward",
                    });
                }
                pointer_floor = target;
                pos = target;
            }
            _ => {
                return Err(DecodeError::MalformedName {
                    offset: pos,
                    reason: "unsupported label type",
                })
            }
        }
    }

    if out.is_empty() {
        out.push('.');
    }
    Ok((out, end.unwrap_or(pos + 1)))
}
