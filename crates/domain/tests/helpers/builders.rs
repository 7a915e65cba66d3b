#![allow(dead_code)]
use dns_sql_domain::{DnsClass, RData, ResourceRecord};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

pub struct ResourceRecordBuilder {
    name: Arc<str>,
    class: DnsClass,
    ttl: u32,
    rdata: RData,
}

impl ResourceRecordBuilder {
    pub fn new() -> Self {
        Self {
            name: "example.com.".into(),
            class: DnsClass::IN,
            ttl: 300,
            rdata: RData::A {
                address: Ipv4Addr::new(192, 0, 2, 1),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.into();
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn class(mut self, class: DnsClass) -> Self {
        self.class = class;
        self
    }

    pub fn ipv4(mut self, address: Ipv4Addr) -> Self {
        self.rdata = RData::A { address };
        self
    }

    pub fn ipv6(mut self, address: Ipv6Addr) -> Self {
        self.rdata = RData::AAAA { address };
        self
    }

    pub fn mx(mut self, preference: u16, exchange: &str) -> Self {
        self.rdata = RData::MX {
            preference,
            exchange: exchange.to_string(),
        };
        self
    }

    pub fn txt(mut self, strings: &[&str]) -> Self {
        self.rdata = RData::TXT {
            strings: strings.iter().map(|s| s.as_bytes().to_vec()).collect(),
        };
        self
    }

    pub fn rdata(mut self, rdata: RData) -> Self {
        self.rdata = rdata;
        self
    }

    pub fn build(self) -> ResourceRecord {
        ResourceRecord::new(self.name, self.class, self.ttl, self.rdata)
    }
}

impl Default for ResourceRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
