use crate::config_handle::ConfigHandle;
use crate::di::UseCases;
use crate::error::{user_function_error, AdapterError};
use dns_sql_domain::dns_name::fqdn;
use dns_sql_domain::{ConfigOverrides, ResolverConfig};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;
use std::net::Ipv6Addr;

const DETERMINISTIC: FunctionFlags = FunctionFlags::SQLITE_UTF8.union(FunctionFlags::SQLITE_DETERMINISTIC);

pub fn register_functions(conn: &Connection, use_cases: &UseCases) -> rusqlite::Result<()> {
    conn.create_scalar_function("fqdn", 1, DETERMINISTIC, |ctx| {
        let name: Option<String> = ctx.get(0)?;
        Ok(name.map(|n| fqdn(n.trim())))
    })?;

    conn.create_scalar_function("classic_resolver", 3, DETERMINISTIC, classic_resolver)?;
    conn.create_scalar_function("tls_resolver", 3, DETERMINISTIC, tls_resolver)?;

    let config = use_cases.config.clone();
    conn.create_scalar_function("system_resolver", 0, FunctionFlags::SQLITE_UTF8, move |_| {
        config.snapshot().system_resolver_url().ok_or_else(|| {
            user_function_error(AdapterError::invalid_argument(
                "system_resolver",
                "no nameserver configured",
            ))
        })
    })?;

    let config = use_cases.config.clone();
    conn.create_scalar_function("dns_config", 0, FunctionFlags::SQLITE_UTF8, move |_| {
        config_json("dns_config", &config.snapshot())
    })?;

    let config = use_cases.config.clone();
    conn.create_scalar_function("dns_configure", 1, FunctionFlags::SQLITE_UTF8, move |ctx| {
        let json: String = ctx.get(0)?;
        dns_configure(&config, &json)
    })?;

    Ok(())
}

/// IPv6 literals are bracketed so the port stays unambiguous.
fn host_port(host: &str, port: i64) -> String {
    let host = host.trim();
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

fn port_argument(function: &'static str, ctx: &Context<'_>, idx: usize) -> rusqlite::Result<i64> {
    let port: i64 = ctx.get(idx)?;
    if !(1..=i64::from(u16::MAX)).contains(&port) {
        return Err(user_function_error(AdapterError::invalid_argument(
            function,
            format!("port out of range: {}", port),
        )));
    }
    Ok(port)
}

fn classic_resolver(ctx: &Context<'_>) -> rusqlite::Result<String> {
    let protocol: String = ctx.get(0)?;
    let host: String = ctx.get(1)?;
    let port = port_argument("classic_resolver", ctx, 2)?;
    Ok(format!(
        "{}://{}",
        protocol.trim().to_ascii_lowercase(),
        host_port(&host, port)
    ))
}

fn tls_resolver(ctx: &Context<'_>) -> rusqlite::Result<String> {
    let host: String = ctx.get(0)?;
    let port = port_argument("tls_resolver", ctx, 1)?;
    let hostname: String = ctx.get(2)?;
    Ok(format!(
        "tls://{}?hostname={}",
        host_port(&host, port),
        hostname.trim()
    ))
}

fn config_json(function: &'static str, config: &ResolverConfig) -> rusqlite::Result<String> {
    serde_json::to_string(config).map_err(|e| {
        user_function_error(AdapterError::Runtime {
            function,
            reason: e.to_string(),
        })
    })
}

fn dns_configure(config: &ConfigHandle, json: &str) -> rusqlite::Result<String> {
    let overrides = ConfigOverrides::from_json(json)
        .map_err(|e| user_function_error(AdapterError::config("dns_configure", e)))?;
    let next = config
        .reconfigure(&overrides)
        .map_err(|e| user_function_error(AdapterError::config("dns_configure", e)))?;
    config_json("dns_configure", &next)
}
