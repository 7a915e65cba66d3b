use dns_sql_domain::{ResolutionResult, SectionedRecord};
use dns_sql_infrastructure::dns::wire::encode_rdata;

/// One record projected onto the columns of the `dns` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub domain: String,
    pub section: &'static str,
    pub class: String,
    pub record_type: String,
    pub ttl: u32,
    pub nameserver: String,
    /// Presentation format.
    pub data: String,
    /// Wire format, uncompressed.
    pub rdata: Vec<u8>,
    pub json: String,
}

impl Row {
    fn project(entry: &SectionedRecord, nameserver: &str) -> Self {
        let record = &entry.record;
        Self {
            domain: record.name.to_string(),
            section: entry.section.as_str(),
            class: record.class.to_string(),
            record_type: record.record_type().to_string(),
            ttl: record.ttl,
            nameserver: nameserver.to_string(),
            data: record.rdata.to_string(),
            // decoded rdata only holds names that were valid on the wire
            rdata: encode_rdata(&record.rdata).unwrap_or_default(),
            json: record.rdata.to_json(),
        }
    }
}

/// Walks a materialized resolution result, projecting one row per step.
#[derive(Debug, Default)]
pub struct RecordCursor {
    records: std::vec::IntoIter<SectionedRecord>,
    nameserver: String,
}

impl RecordCursor {
    pub fn new(result: ResolutionResult) -> Self {
        Self {
            records: result.records.into_iter(),
            nameserver: result.nameserver,
        }
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl Iterator for RecordCursor {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let entry = self.records.next()?;
        Some(Row::project(&entry, &self.nameserver))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dns_sql_domain::{
        DnsClass, Header, Message, Question, RData, RecordType, ResourceRecord, ResponseCode,
    };

    fn record(name: &str, ttl: u32, rdata: RData) -> ResourceRecord {
        ResourceRecord::new(name, DnsClass::IN, ttl, rdata)
    }

    fn result() -> ResolutionResult {
        let mut header = Header::query(1);
        header.response = true;
        let message = Message {
            header,
            questions: vec![Question {
                name: "example.test.".into(),
                qtype: RecordType::MX,
                qclass: DnsClass::IN,
            }],
            answers: vec![record(
                "example.test.",
                300,
                RData::MX {
                    preference: 10,
                    exchange: "mx.example.test.".into(),
                },
            )],
            authority: vec![record(
                "example.test.",
                3600,
                RData::NS {
                    nsdname: "ns1.example.test.".into(),
                },
            )],
            additional: vec![record(
                "mx.example.test.",
                300,
                RData::A {
                    address: "192.0.2.25".parse().unwrap(),
                },
            )],
        };
        ResolutionResult::from_message(message, "udp://192.0.2.53:53")
    }

    #[test]
    fn test_rows_follow_section_order() {
        let rows: Vec<Row> = RecordCursor::new(result()).collect();

        let sections: Vec<&str> = rows.iter().map(|r| r.section).collect();
        assert_eq!(sections, vec!["answer", "authority", "additional"]);
        assert!(rows.iter().all(|r| r.nameserver == "udp://192.0.2.53:53"));
    }

    #[test]
    fn test_row_projection() {
        let row = RecordCursor::new(result()).next().unwrap();

        assert_eq!(row.domain, "example.test.");
        assert_eq!(row.class, "IN");
        assert_eq!(row.record_type, "MX");
        assert_eq!(row.ttl, 300);
        assert_eq!(row.data, "10 mx.example.test.");
        assert_eq!(
            row.rdata,
            b"\x00\x0a\x02mx\x07example\x04test\x00".to_vec()
        );
        assert_eq!(
            row.json,
            r#"{"type":"MX","preference":10,"exchange":"mx.example.test."}"#
        );
    }

    #[test]
    fn test_cursor_is_lazy_and_finite() {
        let mut cursor = RecordCursor::new(result());
        assert_eq!(cursor.remaining(), 3);
        cursor.next();
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.by_ref().count(), 2);
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_empty_result() {
        let mut header = Header::query(1);
        header.rcode = ResponseCode::NoError;
        let empty = ResolutionResult::from_message(
            Message {
                header,
                questions: vec![],
                answers: vec![],
                authority: vec![],
                additional: vec![],
            },
            "udp://192.0.2.53:53",
        );
        assert!(RecordCursor::new(empty).next().is_none());
    }
}
