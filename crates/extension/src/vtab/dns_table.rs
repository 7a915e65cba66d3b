use super::cursor::{RecordCursor, Row};
use super::{table_runtime, ArgumentColumns};
use crate::di::UseCases;
use crate::error::AdapterError;
use dns_sql_application::use_cases::{LookupRecordsUseCase, LookupRequest};
use dns_sql_domain::ResolutionResult;
use rusqlite::types::Null;
use rusqlite::vtab::{
    sqlite3_vtab, sqlite3_vtab_cursor, Context, IndexInfo, VTab, VTabConnection, VTabCursor,
    Values,
};
use std::os::raw::c_int;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE x(\
    domain TEXT, section TEXT, class TEXT, type TEXT, ttl INTEGER, \
    nameserver TEXT, data TEXT, rdata BLOB, json TEXT, \
    qname HIDDEN, qtype HIDDEN, qclass HIDDEN, server HIDDEN)";

const COL_DOMAIN: c_int = 0;
const COL_SECTION: c_int = 1;
const COL_CLASS: c_int = 2;
const COL_TYPE: c_int = 3;
const COL_TTL: c_int = 4;
const COL_NAMESERVER: c_int = 5;
const COL_DATA: c_int = 6;
const COL_RDATA: c_int = 7;
const COL_JSON: c_int = 8;
const COL_QNAME: c_int = 9;
const COL_QTYPE: c_int = 10;
const COL_QCLASS: c_int = 11;
const COL_SERVER: c_int = 12;

const ARGUMENTS: ArgumentColumns = ArgumentColumns {
    function: "dns",
    first_column: COL_QNAME,
    names: &["qname", "qtype", "qclass", "server"],
};

/// `dns(name [, type [, class [, nameserver]]])`
#[repr(C)]
pub struct DnsTable {
    base: sqlite3_vtab,
    lookup: Arc<LookupRecordsUseCase>,
    // Only `None` once dropped.
    runtime: Option<Runtime>,
}

impl DnsTable {
    /// Drives one lookup to completion on the table's runtime. A caller
    /// already inside a tokio runtime cannot block it, so the lookup then
    /// runs on a scoped helper thread.
    fn resolve(&self, request: &LookupRequest) -> Result<ResolutionResult, AdapterError> {
        let runtime = self.runtime.as_ref().ok_or_else(|| AdapterError::Runtime {
            function: "dns",
            reason: "runtime already shut down".to_string(),
        })?;
        let lookup = self.lookup.as_ref();

        let outcome = if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::scope(|scope| {
                scope
                    .spawn(|| runtime.block_on(lookup.execute(request)))
                    .join()
            })
            .map_err(|_| AdapterError::Runtime {
                function: "dns",
                reason: "lookup thread panicked".to_string(),
            })?
        } else {
            runtime.block_on(lookup.execute(request))
        };

        outcome.map_err(|e| AdapterError::from_lookup("dns", e))
    }
}

// The connection may be closed from async code, where dropping a runtime
// in place panics.
impl Drop for DnsTable {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

unsafe impl<'vtab> VTab<'vtab> for DnsTable {
    type Aux = UseCases;
    type Cursor = DnsCursor<'vtab>;

    fn connect(
        _db: &mut VTabConnection,
        aux: Option<&UseCases>,
        _args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        let use_cases = aux.ok_or_else(|| {
            rusqlite::Error::ModuleError("dns: module registered without state".to_string())
        })?;

        Ok((
            SCHEMA.to_string(),
            Self {
                base: sqlite3_vtab::default(),
                lookup: Arc::clone(&use_cases.lookup_records),
                runtime: Some(table_runtime("dns")?),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        ARGUMENTS.plan(info)
    }

    fn open(&'vtab mut self) -> rusqlite::Result<DnsCursor<'vtab>> {
        Ok(DnsCursor {
            base: sqlite3_vtab_cursor::default(),
            table: self,
            request: LookupRequest::default(),
            rows: RecordCursor::default(),
            current: None,
            rowid: 0,
        })
    }
}

#[repr(C)]
pub struct DnsCursor<'vtab> {
    base: sqlite3_vtab_cursor,
    table: &'vtab DnsTable,
    request: LookupRequest,
    rows: RecordCursor,
    current: Option<Row>,
    rowid: i64,
}

unsafe impl VTabCursor for DnsCursor<'_> {
    fn filter(
        &mut self,
        idx_num: c_int,
        _idx_str: Option<&str>,
        args: &Values<'_>,
    ) -> rusqlite::Result<()> {
        let mut values = ARGUMENTS.read(idx_num, args)?.into_iter();
        let request = LookupRequest {
            name: values.next().flatten(),
            record_type: values.next().flatten(),
            class: values.next().flatten(),
            nameserver: values.next().flatten(),
        };

        // a restarted scan is a new resolution
        self.rows = RecordCursor::default();
        self.current = None;
        self.rowid = 0;

        let result = self.table.resolve(&request)?;

        debug!(
            domain = request.name.as_deref().unwrap_or_default(),
            rows = result.len(),
            nameserver = %result.nameserver,
            "dns() resolved"
        );

        self.request = request;
        self.rows = RecordCursor::new(result);
        self.current = self.rows.next();
        Ok(())
    }

    fn next(&mut self) -> rusqlite::Result<()> {
        self.current = self.rows.next();
        self.rowid += 1;
        Ok(())
    }

    fn eof(&self) -> bool {
        self.current.is_none()
    }

    fn column(&self, ctx: &mut Context, i: c_int) -> rusqlite::Result<()> {
        match i {
            COL_QNAME => return ctx.set_result(&self.request.name),
            COL_QTYPE => return ctx.set_result(&self.request.record_type),
            COL_QCLASS => return ctx.set_result(&self.request.class),
            COL_SERVER => return ctx.set_result(&self.request.nameserver),
            _ => {}
        }

        let Some(row) = &self.current else {
            return ctx.set_result(&Null);
        };
        match i {
            COL_DOMAIN => ctx.set_result(&row.domain),
            COL_SECTION => ctx.set_result(&row.section),
            COL_CLASS => ctx.set_result(&row.class),
            COL_TYPE => ctx.set_result(&row.record_type),
            COL_TTL => ctx.set_result(&row.ttl),
            COL_NAMESERVER => ctx.set_result(&row.nameserver),
            COL_DATA => ctx.set_result(&row.data),
            COL_RDATA => ctx.set_result(&row.rdata),
            COL_JSON => ctx.set_result(&row.json),
            _ => Err(rusqlite::Error::ModuleError(format!(
                "dns: column index out of range: {}",
                i
            ))),
        }
    }

    fn rowid(&self) -> rusqlite::Result<i64> {
        Ok(self.rowid)
    }
}
