//! Table-valued functions.
//!
//! Both tables take their arguments through HIDDEN columns. Only equality
//! constraints bind an argument; the n-th bound argument reaches `xFilter`
//! as `args[n]`, and `idx_num` carries one bit per bound argument column.

mod cursor;
mod dns_table;
mod search_list;

pub use cursor::{RecordCursor, Row};
pub use dns_table::DnsTable;
pub use search_list::SearchListTable;

use crate::di::UseCases;
use crate::error::AdapterError;
use rusqlite::types::Value;
use rusqlite::vtab::{eponymous_only_module, IndexConstraintOp, IndexInfo, Values};
use rusqlite::Connection;
use std::os::raw::c_int;

pub fn register_modules(conn: &Connection, use_cases: &UseCases) -> rusqlite::Result<()> {
    conn.create_module(
        "dns",
        eponymous_only_module::<DnsTable>(),
        Some(use_cases.clone()),
    )?;
    conn.create_module(
        "search_list",
        eponymous_only_module::<SearchListTable>(),
        Some(use_cases.clone()),
    )?;
    Ok(())
}

/// Argument columns of a table function: `names[i]` is column
/// `first_column + i`.
pub(crate) struct ArgumentColumns {
    pub function: &'static str,
    pub first_column: c_int,
    pub names: &'static [&'static str],
}

impl ArgumentColumns {
    fn slot(&self, column: c_int) -> Option<usize> {
        let offset = usize::try_from(column.checked_sub(self.first_column)?).ok()?;
        (offset < self.names.len()).then_some(offset)
    }

    /// xBestIndex: binds every usable equality constraint on an argument
    /// column. Any other comparison on an argument column is an error.
    /// Plans that leave the first argument unbound are priced out.
    pub fn plan(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        let mut bound: Vec<Option<usize>> = vec![None; self.names.len()];

        for (i, constraint) in info.constraints().enumerate() {
            let Some(slot) = self.slot(constraint.column()) else {
                continue;
            };
            if !constraint.is_usable() {
                continue;
            }
            match constraint.operator() {
                IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_EQ => bound[slot] = Some(i),
                IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LIMIT
                | IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_OFFSET => {}
                _ => {
                    return Err(AdapterError::invalid_argument(
                        self.function,
                        format!("only '=' constraints are supported on '{}'", self.names[slot]),
                    )
                    .into())
                }
            }
        }

        let mut idx_num: c_int = 0;
        let mut argv_index: c_int = 0;
        for (slot, constraint) in bound.iter().enumerate() {
            if let Some(i) = constraint {
                argv_index += 1;
                let mut usage = info.constraint_usage(*i);
                usage.set_argv_index(argv_index);
                usage.set_omit(true);
                idx_num |= 1 << slot;
            }
        }

        info.set_idx_num(idx_num);
        if idx_num & 1 != 0 {
            info.set_estimated_cost(10.0);
        } else {
            info.set_estimated_cost(f64::from(i32::MAX));
        }
        Ok(())
    }

    /// xFilter: argument values by slot, `None` for unbound or NULL ones.
    pub fn read(&self, idx_num: c_int, args: &Values<'_>) -> rusqlite::Result<Vec<Option<String>>> {
        let mut values = vec![None; self.names.len()];
        let mut next_arg = 0;

        for (slot, value) in values.iter_mut().enumerate() {
            if idx_num & (1 << slot) == 0 {
                continue;
            }
            let raw: Value = args.get(next_arg)?;
            next_arg += 1;
            *value = argument_text(self.function, self.names[slot], raw)?;
        }

        Ok(values)
    }
}

fn argument_text(
    function: &'static str,
    name: &str,
    value: Value,
) -> Result<Option<String>, AdapterError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text)),
        Value::Integer(n) => Ok(Some(n.to_string())),
        Value::Real(_) | Value::Blob(_) => Err(AdapterError::invalid_argument(
            function,
            format!("'{}' must be text", name),
        )),
    }
}

/// Current-thread runtime a table uses to drive one resolution at a time.
pub(crate) fn table_runtime(function: &'static str) -> rusqlite::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            AdapterError::Runtime {
                function,
                reason: format!("failed to start runtime: {}", e),
            }
            .into()
        })
}
