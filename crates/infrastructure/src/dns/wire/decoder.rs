use super::name::read_name;
use super::rdata::decode_rdata;
use super::HEADER_LEN;
use dns_sql_domain::{
    DecodeError, DnsClass, Header, Message, Question, RecordType, ResourceRecord,
};

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedMessage {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn name(&mut self) -> Result<String, DecodeError> {
        let (name, next) = read_name(self.buf, self.pos)?;
        self.pos = next;
        Ok(name)
    }
}

struct Counts {
    questions: u16,
    answers: u16,
    authority: u16,
    additional: u16,
}

fn read_header(r: &mut Reader<'_>) -> Result<(Header, Counts), DecodeError> {
    if r.remaining() < HEADER_LEN {
        return Err(DecodeError::TruncatedMessage {
            offset: 0,
            needed: HEADER_LEN - r.remaining(),
        });
    }
    let id = r.u16()?;
    let flags = r.u16()?;
    let counts = Counts {
        questions: r.u16()?,
        answers: r.u16()?,
        authority: r.u16()?,
        additional: r.u16()?,
    };
    Ok((Header::from_flags(id, flags), counts))
}

fn read_section<T>(
    r: &mut Reader<'_>,
    section: &'static str,
    declared: u16,
    mut read_one: impl FnMut(&mut Reader<'_>) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let mut items = Vec::with_capacity(declared.min(32) as usize);
    for found in 0..declared {
        if r.remaining() == 0 {
            return Err(DecodeError::UnexpectedSectionCount {
                section,
                declared,
                found,
            });
        }
        items.push(read_one(r)?);
    }
    Ok(items)
}

fn read_question(r: &mut Reader<'_>) -> Result<Question, DecodeError> {
    let name = r.name()?;
    let qtype = RecordType::from_u16(r.u16()?);
    let qclass = DnsClass::from_u16(r.u16()?);
    Ok(Question {
        name: name.into(),
        qtype,
        qclass,
    })
}

fn read_record(r: &mut Reader<'_>) -> Result<ResourceRecord, DecodeError> {
    let name = r.name()?;
    let rtype = RecordType::from_u16(r.u16()?);
    let class = DnsClass::from_u16(r.u16()?);
    let ttl = r.u32()?;
    let rdlen = r.u16()? as usize;

    let start = r.pos;
    r.take(rdlen)?;
    let rdata = decode_rdata(r.buf, start, rdlen, rtype)?;

    Ok(ResourceRecord::new(name, class, ttl, rdata))
}

/// Decodes a complete DNS message.
///
/// Every declared entry must be present and nothing may follow the last one.
pub fn decode_message(bytes: &[u8]) -> Result<Message, DecodeError> {
    let mut r = Reader::new(bytes);
    let (header, counts) = read_header(&mut r)?;

    let questions = read_section(&mut r, "question", counts.questions, read_question)?;
    let answers = read_section(&mut r, "answer", counts.answers, read_record)?;
    let authority = read_section(&mut r, "authority", counts.authority, read_record)?;
    let additional = read_section(&mut r, "additional", counts.additional, read_record)?;

    if r.remaining() > 0 {
        // Undeclared bytes after the last section count as an extra entry.
        return Err(DecodeError::UnexpectedSectionCount {
            section: "additional",
            declared: counts.additional,
            found: counts.additional.saturating_add(1),
        });
    }

    Ok(Message {
        header,
        questions,
        answers,
        authority,
        additional,
    })
}

/// Decodes only the header and question section, ignoring what follows.
/// Used to match a reply to its request, including truncated replies whose
/// record sections are incomplete.
pub fn decode_header_and_questions(bytes: &[u8]) -> Result<(Header, Vec<Question>), DecodeError> {
    let mut r = Reader::new(bytes);
    let (header, counts) = read_header(&mut r)?;
    let questions = read_section(&mut r, "question", counts.questions, read_question)?;
    Ok((header, questions))
}
