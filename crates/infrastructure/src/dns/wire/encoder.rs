use super::name::write_name;
use super::rdata::write_rdata;
use dns_sql_domain::{DecodeError, DnsQuery, Header, Message, RData, ResourceRecord};

/// Standard recursive query for `query`: RD set, one question, no records.
pub fn encode_query(query: &DnsQuery) -> Result<Vec<u8>, DecodeError> {
    let message = Message {
        header: Header::query(query.id),
        questions: vec![query.question()],
        answers: Vec::new(),
        authority: Vec::new(),
        additional: Vec::new(),
    };
    encode_message(&message)
}

fn section_count(section: &'static str, len: usize) -> Result<u16, DecodeError> {
    u16::try_from(len).map_err(|_| DecodeError::UnexpectedSectionCount {
        section,
        declared: u16::MAX,
        found: u16::MAX,
    })
}

/// Serializes any message without name compression.
pub fn encode_message(message: &Message) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::with_capacity(512);
    buf.extend_from_slice(&message.header.id.to_be_bytes());
    buf.extend_from_slice(&message.header.flags().to_be_bytes());
    for (section, len) in [
        ("question", message.questions.len()),
        ("answer", message.answers.len()),
        ("authority", message.authority.len()),
        ("additional", message.additional.len()),
    ] {
        buf.extend_from_slice(&section_count(section, len)?.to_be_bytes());
    }

    for question in &message.questions {
        write_name(&mut buf, &question.name)?;
        buf.extend_from_slice(&question.qtype.to_u16().to_be_bytes());
        buf.extend_from_slice(&question.qclass.to_u16().to_be_bytes());
    }
    for record in message
        .answers
        .iter()
        .chain(&message.authority)
        .chain(&message.additional)
    {
        write_record(&mut buf, record)?;
    }
    Ok(buf)
}

fn write_record(buf: &mut Vec<u8>, record: &ResourceRecord) -> Result<(), DecodeError> {
    write_name(buf, &record.name)?;
    buf.extend_from_slice(&record.record_type().to_u16().to_be_bytes());
    buf.extend_from_slice(&record.class.to_u16().to_be_bytes());
    buf.extend_from_slice(&record.ttl.to_be_bytes());

    let rdata = encode_rdata(&record.rdata)?;
    let rdlen = u16::try_from(rdata.len()).map_err(|_| DecodeError::RdataLengthMismatch {
        rtype: record.record_type(),
        len: rdata.len(),
    })?;
    buf.extend_from_slice(&rdlen.to_be_bytes());
    buf.extend_from_slice(&rdata);
    Ok(())
}

/// Uncompressed wire form of a record payload.
pub fn encode_rdata(rdata: &RData) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    write_rdata(&mut buf, rdata)?;
    Ok(buf)
}
