use super::ArgumentColumns;
use crate::di::UseCases;
use crate::error::AdapterError;
use dns_sql_application::use_cases::SearchListUseCase;
use rusqlite::types::Null;
use rusqlite::vtab::{
    sqlite3_vtab, sqlite3_vtab_cursor, Context, IndexInfo, VTab, VTabConnection, VTabCursor,
    Values,
};
use std::os::raw::c_int;
use std::sync::Arc;

const SCHEMA: &str = "CREATE TABLE x(fqdn TEXT, partial HIDDEN, ndots HIDDEN)";

const COL_FQDN: c_int = 0;
const COL_PARTIAL: c_int = 1;
const COL_NDOTS: c_int = 2;

const ARGUMENTS: ArgumentColumns = ArgumentColumns {
    function: "search_list",
    first_column: COL_PARTIAL,
    names: &["partial", "ndots"],
};

/// `search_list(partial [, ndots])`
#[repr(C)]
pub struct SearchListTable {
    base: sqlite3_vtab,
    search_list: Arc<SearchListUseCase>,
}

unsafe impl<'vtab> VTab<'vtab> for SearchListTable {
    type Aux = UseCases;
    type Cursor = SearchListCursor<'vtab>;

    fn connect(
        _db: &mut VTabConnection,
        aux: Option<&UseCases>,
        _args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        let use_cases = aux.ok_or_else(|| {
            rusqlite::Error::ModuleError(
                "search_list: module registered without state".to_string(),
            )
        })?;

        Ok((
            SCHEMA.to_string(),
            Self {
                base: sqlite3_vtab::default(),
                search_list: Arc::clone(&use_cases.search_list),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        ARGUMENTS.plan(info)
    }

    fn open(&'vtab mut self) -> rusqlite::Result<SearchListCursor<'vtab>> {
        Ok(SearchListCursor {
            base: sqlite3_vtab_cursor::default(),
            table: self,
            partial: None,
            ndots: None,
            candidates: Vec::new(),
            position: 0,
        })
    }
}

#[repr(C)]
pub struct SearchListCursor<'vtab> {
    base: sqlite3_vtab_cursor,
    table: &'vtab SearchListTable,
    partial: Option<String>,
    ndots: Option<i64>,
    candidates: Vec<String>,
    position: usize,
}

unsafe impl VTabCursor for SearchListCursor<'_> {
    fn filter(
        &mut self,
        idx_num: c_int,
        _idx_str: Option<&str>,
        args: &Values<'_>,
    ) -> rusqlite::Result<()> {
        let mut values = ARGUMENTS.read(idx_num, args)?.into_iter();
        let partial = values.next().flatten();
        let ndots = values
            .next()
            .flatten()
            .map(|n| {
                n.trim().parse::<usize>().map_err(|_| {
                    AdapterError::invalid_argument(
                        "search_list",
                        format!("ndots must be a non-negative integer, got '{}'", n),
                    )
                })
            })
            .transpose()?;

        self.candidates = self
            .table
            .search_list
            .execute(partial.as_deref().unwrap_or_default(), ndots)
            .map_err(|e| AdapterError::from_lookup("search_list", e))?;
        self.position = 0;
        self.partial = partial;
        self.ndots = ndots.and_then(|n| i64::try_from(n).ok());
        Ok(())
    }

    fn next(&mut self) -> rusqlite::Result<()> {
        self.position += 1;
        Ok(())
    }

    fn eof(&self) -> bool {
        self.position >= self.candidates.len()
    }

    fn column(&self, ctx: &mut Context, i: c_int) -> rusqlite::Result<()> {
        match i {
            COL_FQDN => match self.candidates.get(self.position) {
                Some(candidate) => ctx.set_result(candidate),
                None => ctx.set_result(&Null),
            },
            COL_PARTIAL => ctx.set_result(&self.partial),
            COL_NDOTS => ctx.set_result(&self.ndots),
            _ => Err(rusqlite::Error::ModuleError(format!(
                "search_list: column index out of range: {}",
                i
            ))),
        }
    }

    fn rowid(&self) -> rusqlite::Result<i64> {
        Ok(self.position as i64)
    }
}
