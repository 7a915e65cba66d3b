//! SQLite extension to query DNS with SQL.
//!
//! ```sql
//! SELECT domain, ttl, data FROM dns('example.com', 'MX');
//! SELECT * FROM dns WHERE qname = 'example.com' AND server = tls_resolver('1.1.1.1', 853, 'one.one.one.one');
//! SELECT fqdn FROM search_list('intranet');
//! ```
//!
//! [`register`] installs everything on a connection. Built with the
//! `loadable_extension` feature the crate also exports the entry points
//! SQLite looks up when loading the shared library.

pub mod config_handle;
pub mod di;
pub mod error;
pub mod functions;
pub mod logging;
pub mod vtab;

pub use config_handle::ConfigHandle;
pub use error::AdapterError;

use di::UseCases;
use dns_sql_domain::ResolverConfig;
use dns_sql_infrastructure::system::{load_system_config, RESOLV_CONF_PATH};
use rusqlite::Connection;

/// Registers the `dns` and `search_list` table functions and the helper
/// scalar functions, configured from `/etc/resolv.conf`.
pub fn register(conn: &Connection) -> rusqlite::Result<()> {
    register_with_config(conn, load_system_config(RESOLV_CONF_PATH))
}

/// Same as [`register`] with an explicit starting configuration. Each call
/// gets its own [`ConfigHandle`], so `dns_configure` only affects `conn`.
/// Configurations outside the accepted bounds are rejected.
pub fn register_with_config(conn: &Connection, config: ResolverConfig) -> rusqlite::Result<()> {
    config
        .validate()
        .map_err(|e| AdapterError::config("register", e))?;
    let use_cases = UseCases::new(ConfigHandle::new(config));
    vtab::register_modules(conn, &use_cases)?;
    functions::register_functions(conn, &use_cases)?;
    Ok(())
}

#[cfg(feature = "loadable_extension")]
mod entrypoint {
    use rusqlite::{ffi, Connection};
    use std::os::raw::{c_char, c_int};

    /// Default entry point, found by `.load path/to/libdns_sql`.
    ///
    /// # Safety
    /// Must only be called by SQLite while loading the extension.
    #[no_mangle]
    pub unsafe extern "C" fn sqlite3_extension_init(
        db: *mut ffi::sqlite3,
        pz_err_msg: *mut *mut c_char,
        p_api: *mut ffi::sqlite3_api_routines,
    ) -> c_int {
        Connection::extension_init2(db, pz_err_msg, p_api, init)
    }

    /// Entry point SQLite derives from the file name `libdns_sql`.
    ///
    /// # Safety
    /// Must only be called by SQLite while loading the extension.
    #[no_mangle]
    pub unsafe extern "C" fn sqlite3_dnssql_init(
        db: *mut ffi::sqlite3,
        pz_err_msg: *mut *mut c_char,
        p_api: *mut ffi::sqlite3_api_routines,
    ) -> c_int {
        Connection::extension_init2(db, pz_err_msg, p_api, init)
    }

    fn init(conn: Connection) -> rusqlite::Result<bool> {
        crate::logging::init_logging();
        crate::register(&conn)?;
        Ok(false)
    }
}
