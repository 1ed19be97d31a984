//! DSN string parser.
//!
//! ```text
//! [user[:password]@][net[(addr)]]/dbname[?param1=value1&paramN=valueN]
//! ```
//!
//! Passwords and network addresses may themselves contain `/` and `@`, so
//! the separators are resolved by scan direction:
//!
//! - the **last** `/` separates the connection part from the database,
//! - the **last** `@` before it separates credentials from the protocol,
//! - the **first** `:` in the credentials separates user from password,
//! - the **first** `(` in the protocol opens the address, which must be
//!   closed by the `)` immediately before the database separator,
//! - the **first** `?` after the separator starts the query string.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::dsn::Dsn;
use crate::error::{DsnError, DsnResult};
use crate::escape::query_unescape;

/// Parse a DSN string into a [`Dsn`].
///
/// An empty string is accepted and yields an empty record.
///
/// # Examples
///
/// ```rust
/// use prax_dsn::parse;
///
/// let dsn = parse("root:123456@tcp(127.0.0.1:3306)/Test?charset=utf8").unwrap();
/// assert_eq!(dsn.user, "root");
/// assert_eq!(dsn.password, "123456");
/// assert_eq!(dsn.network, "tcp");
/// assert_eq!(dsn.address, "127.0.0.1:3306");
/// assert_eq!(dsn.database, "Test");
/// assert_eq!(dsn.param("charset"), Some("utf8"));
/// ```
pub fn parse(dsn: &str) -> DsnResult<Dsn> {
    debug!(dsn_len = dsn.len(), "parse()");

    let mut cfg = Dsn::default();
    if dsn.is_empty() {
        return Ok(cfg);
    }

    let slash = dsn.rfind('/').ok_or_else(|| DsnError::no_slash(dsn))?;

    if slash > 0 {
        parse_connection(dsn, slash, &mut cfg)?;
    }

    let rest = &dsn[slash + 1..];
    match rest.find('?') {
        Some(q) => {
            cfg.database = rest[..q].to_string();
            let query_start = slash + 1 + q + 1;
            cfg.params = parse_params(dsn, query_start)?;
        }
        None => cfg.database = rest.to_string(),
    }

    debug!(
        network = %cfg.network,
        address = %cfg.address,
        database = %cfg.database,
        params = cfg.params_len(),
        "DSN parsed"
    );
    Ok(cfg)
}

/// Parse `[user[:password]@][net[(addr)]]`, i.e. everything before `slash`.
fn parse_connection(dsn: &str, slash: usize, cfg: &mut Dsn) -> DsnResult<()> {
    let prefix = &dsn[..slash];

    let protocol_start = match prefix.rfind('@') {
        Some(at) => {
            let credentials = &prefix[..at];
            match credentials.find(':') {
                Some(colon) => {
                    cfg.user = credentials[..colon].to_string();
                    cfg.password = credentials[colon + 1..].to_string();
                }
                None => cfg.user = credentials.to_string(),
            }
            at + 1
        }
        None => 0,
    };

    let protocol = &prefix[protocol_start..];
    match protocol.find('(') {
        Some(open) => {
            let open = protocol_start + open;
            if !prefix.ends_with(')') {
                return Err(match dsn[open + 1..slash].find(')') {
                    Some(close) => DsnError::unescaped_value(dsn, open + 1 + close),
                    None => DsnError::unterminated_address(dsn, open, slash),
                });
            }
            cfg.network = dsn[protocol_start..open].to_string();
            cfg.address = dsn[open + 1..slash - 1].to_string();
        }
        None => cfg.network = protocol.to_string(),
    }

    trace!(
        has_user = !cfg.user.is_empty(),
        has_password = !cfg.password.is_empty(),
        "credentials scanned"
    );
    Ok(())
}

/// Parse the query string that starts at byte `start` of `dsn`.
///
/// Pairs without `=` are skipped. Returns `None` when no pair was valid.
fn parse_params(dsn: &str, start: usize) -> DsnResult<Option<BTreeMap<String, String>>> {
    let mut params: Option<BTreeMap<String, String>> = None;
    let mut offset = start;

    for pair in dsn[start..].split('&') {
        let pair_start = offset;
        offset += pair.len() + 1;

        let Some((key, value)) = pair.split_once('=') else {
            trace!(pair_len = pair.len(), "skipping parameter without '='");
            continue;
        };

        let value_start = pair_start + key.len() + 1;
        let decoded = query_unescape(value).map_err(|source| {
            DsnError::query_decode(dsn, key, source, value_start, value.len())
        })?;

        params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), decoded);
    }

    Ok(params)
}
