//! The DSN record and its canonical string form.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DsnError, DsnResult};
use crate::escape::query_escape;

/// A parsed MySQL-style data source name.
///
/// ```text
/// [user[:password]@][network[(address)]]/database[?param1=value1&...]
/// ```
///
/// Every field is optional. `password` is only written back when `user` is
/// set, and `address` only when `network` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dsn {
    /// Username.
    pub user: String,
    /// Password (requires `user`).
    pub password: String,
    /// Network type, e.g. `tcp` or `unix`.
    pub network: String,
    /// Network address (requires `network`).
    pub address: String,
    /// Database name.
    pub database: String,
    /// Connection parameters with decoded values.
    ///
    /// `None` when the DSN had no valid `key=value` pair at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
}

impl Dsn {
    /// Create an empty DSN.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a DSN string.
    ///
    /// See [`crate::parse`].
    pub fn parse(dsn: &str) -> DsnResult<Self> {
        crate::parser::parse(dsn)
    }

    /// Format the DSN into its canonical string.
    ///
    /// Parameter keys are written in ascending order and values are
    /// query-escaped, so the output is stable across parse/format cycles.
    ///
    /// ```rust
    /// use prax_dsn::Dsn;
    ///
    /// let dsn = Dsn::new()
    ///     .user("root")
    ///     .password("123456")
    ///     .network("tcp")
    ///     .address("localhost:3306")
    ///     .database("Test")
    ///     .with_param("charset", "utf8");
    ///
    /// assert_eq!(dsn.format(), "root:123456@tcp(localhost:3306)/Test?charset=utf8");
    /// ```
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Format the DSN with the password masked.
    ///
    /// Meant for logs and error messages.
    pub fn redacted(&self) -> String {
        if self.password.is_empty() {
            return self.format();
        }
        Self {
            password: "***".to_string(),
            ..self.clone()
        }
        .format()
    }

    /// Set the username.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the network type.
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Set the network address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Add or replace a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Remove a parameter.
    ///
    /// The parameter map stays present even if it becomes empty.
    pub fn without_param(mut self, key: &str) -> Self {
        if let Some(params) = self.params.as_mut() {
            params.remove(key);
        }
        self
    }

    /// Get a parameter value.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.as_ref()?.get(key).map(String::as_str)
    }

    /// Number of parameters.
    pub fn params_len(&self) -> usize {
        self.params.as_ref().map_or(0, BTreeMap::len)
    }

    /// Check if the DSN carries a credentials section.
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty()
    }

    /// Check if the DSN carries a network address.
    pub fn has_address(&self) -> bool {
        !self.network.is_empty() && !self.address.is_empty()
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // [username[:password]@]
        if !self.user.is_empty() {
            f.write_str(&self.user)?;
            if !self.password.is_empty() {
                write!(f, ":{}", self.password)?;
            }
            f.write_str("@")?;
        }

        // [protocol[(address)]]
        if !self.network.is_empty() {
            f.write_str(&self.network)?;
            if !self.address.is_empty() {
                write!(f, "({})", self.address)?;
            }
        }

        write!(f, "/{}", self.database)?;

        if let Some(ref params) = self.params {
            let mut sep = '?';
            for (key, value) in params {
                write!(f, "{}{}={}", sep, key, query_escape(value))?;
                sep = '&';
            }
        }

        Ok(())
    }
}

impl FromStr for Dsn {
    type Err = DsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(s)
    }
}

/// Serde adapter storing a [`Dsn`] as its canonical string.
///
/// ```rust
/// use prax_dsn::Dsn;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct DatabaseSection {
///     #[serde(with = "prax_dsn::dsn::as_string")]
///     dsn: Dsn,
/// }
///
/// let section: DatabaseSection =
///     serde_json::from_str(r#"{"dsn": "root@tcp(localhost:3306)/app"}"#).unwrap();
/// assert_eq!(section.dsn.database, "app");
/// ```
pub mod as_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::Dsn;

    /// Serialize a DSN as its formatted string.
    pub fn serialize<S: Serializer>(dsn: &Dsn, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(dsn)
    }

    /// Deserialize a DSN from a string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Dsn, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Dsn::parse(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full() -> Dsn {
        Dsn::new()
            .user("root")
            .password("123456")
            .network("tcp")
            .address("127.0.0.1:3306")
            .database("Test")
            .with_param("charset", "utf8")
    }

    #[test]
    fn test_format_full() {
        assert_eq!(
            full().format(),
            "root:123456@tcp(127.0.0.1:3306)/Test?charset=utf8"
        );
    }

    #[test]
    fn test_format_localhost() {
        let dsn = full().address("localhost:3306");
        assert_eq!(dsn.format(), "root:123456@tcp(localhost:3306)/Test?charset=utf8");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(Dsn::new().format(), "/");
    }

    #[test]
    fn test_format_sorted_params() {
        let dsn = Dsn::new()
            .database("db")
            .with_param("timeout", "5s")
            .with_param("charset", "utf8mb4")
            .with_param("parseTime", "true");
        assert_eq!(dsn.format(), "/db?charset=utf8mb4&parseTime=true&timeout=5s");
    }

    #[test]
    fn test_format_escapes_values() {
        let dsn = Dsn::new().database("db").with_param("loc", "Asia/Shanghai");
        assert_eq!(dsn.format(), "/db?loc=Asia%2FShanghai");

        let dsn = Dsn::new().database("db").with_param("init", "SET a = 1");
        assert_eq!(dsn.format(), "/db?init=SET+a+%3D+1");
    }

    #[test]
    fn test_format_empty_but_present_params() {
        let dsn = Dsn {
            database: "db".into(),
            params: Some(BTreeMap::new()),
            ..Dsn::default()
        };
        assert_eq!(dsn.format(), "/db");
    }

    #[test]
    fn test_format_password_without_user_dropped() {
        let dsn = Dsn::new().password("secret").database("db");
        assert_eq!(dsn.format(), "/db");
    }

    #[test]
    fn test_format_address_without_network_dropped() {
        let dsn = Dsn::new().address("localhost:3306").database("db");
        assert_eq!(dsn.format(), "/db");
    }

    #[test]
    fn test_format_network_without_address() {
        let dsn = Dsn::new().user("root").network("tcp").database("db");
        assert_eq!(dsn.format(), "root@tcp/db");
    }

    #[test]
    fn test_display_matches_format() {
        let dsn = full();
        assert_eq!(dsn.to_string(), dsn.format());
    }

    #[test]
    fn test_from_str() {
        let dsn: Dsn = "root:123456@tcp(127.0.0.1:3306)/Test?charset=utf8"
            .parse()
            .unwrap();
        assert_eq!(dsn, full());
    }

    #[test]
    fn test_roundtrip_is_stable() {
        let inputs = [
            "root:123456@tcp(127.0.0.1:3306)/Test?charset=utf8",
            "user:p@ss/w:rd@unix(/var/run/mysqld.sock)/db?loc=Local&time_zone=%27-07%3A00%27",
            "root@/Test",
            "/",
            "tcp/db?b=2&a=1",
        ];

        for input in inputs {
            let first = Dsn::parse(input).unwrap();
            let formatted = first.format();
            let second = Dsn::parse(&formatted).unwrap();
            assert_eq!(first, second, "roundtrip of {input}");
            assert_eq!(second.format(), formatted, "format of {input}");
        }
    }

    #[test]
    fn test_redacted() {
        assert_eq!(
            full().redacted(),
            "root:***@tcp(127.0.0.1:3306)/Test?charset=utf8"
        );

        let no_password = Dsn::new().user("root").database("db");
        assert_eq!(no_password.redacted(), "root@/db");
    }

    #[test]
    fn test_params_accessors() {
        let dsn = full();
        assert_eq!(dsn.param("charset"), Some("utf8"));
        assert_eq!(dsn.param("missing"), None);
        assert_eq!(dsn.params_len(), 1);
        assert_eq!(Dsn::new().param("charset"), None);
        assert_eq!(Dsn::new().params_len(), 0);
    }

    #[test]
    fn test_without_param_keeps_map() {
        let dsn = full().without_param("charset");
        assert_eq!(dsn.params, Some(BTreeMap::new()));
        assert_eq!(dsn.format(), "root:123456@tcp(127.0.0.1:3306)/Test");

        let dsn = Dsn::new().without_param("charset");
        assert!(dsn.params.is_none());
    }

    #[test]
    fn test_has_credentials_and_address() {
        assert!(full().has_credentials());
        assert!(full().has_address());
        assert!(!Dsn::new().network("tcp").has_address());
        assert!(!Dsn::new().address("localhost").has_address());
    }

    #[test]
    fn test_serde_struct_form() {
        let json = serde_json::to_value(full()).unwrap();
        assert_eq!(json["user"], "root");
        assert_eq!(json["params"]["charset"], "utf8");

        let json = serde_json::to_value(Dsn::new().database("db")).unwrap();
        assert!(json.get("params").is_none());

        let dsn: Dsn = serde_json::from_str(r#"{"database": "db"}"#).unwrap();
        assert_eq!(dsn, Dsn::new().database("db"));
    }

    #[test]
    fn test_serde_as_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "as_string")]
            dsn: Dsn,
        }

        let json = serde_json::to_string(&Wrapper { dsn: full() }).unwrap();
        assert_eq!(
            json,
            r#"{"dsn":"root:123456@tcp(127.0.0.1:3306)/Test?charset=utf8"}"#
        );

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dsn, full());

        let bad = serde_json::from_str::<Wrapper>(r#"{"dsn":"no-slash"}"#);
        assert!(bad.is_err());
    }
}
