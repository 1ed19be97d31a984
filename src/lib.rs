//! # prax-dsn
//!
//! Parsing and formatting of MySQL-style data source names.
//!
//! ```text
//! [user[:password]@][network[(address)]]/database[?param1=value1&...&paramN=valueN]
//! ```
//!
//! A DSN is parsed into a [`Dsn`] record and formatted back into its
//! canonical string, with parameter keys sorted and values query-escaped.
//! Nothing here opens connections or validates credentials.
//!
//! ## Parsing
//!
//! ```rust
//! use prax_dsn::Dsn;
//!
//! let dsn = Dsn::parse("root:123456@tcp(127.0.0.1:3306)/Test?charset=utf8").unwrap();
//! assert_eq!(dsn.user, "root");
//! assert_eq!(dsn.address, "127.0.0.1:3306");
//! assert_eq!(dsn.param("charset"), Some("utf8"));
//!
//! // Passwords may contain `@` and `/`.
//! let dsn = Dsn::parse("app:p@ss/w0rd@unix(/run/mysqld/mysqld.sock)/shop").unwrap();
//! assert_eq!(dsn.password, "p@ss/w0rd");
//! assert_eq!(dsn.address, "/run/mysqld/mysqld.sock");
//! ```
//!
//! ## Formatting
//!
//! ```rust
//! use prax_dsn::Dsn;
//!
//! let dsn = Dsn::new()
//!     .user("root")
//!     .network("tcp")
//!     .address("db:3306")
//!     .database("shop")
//!     .with_param("parseTime", "true")
//!     .with_param("loc", "Asia/Tokyo");
//!
//! assert_eq!(dsn.to_string(), "root@tcp(db:3306)/shop?loc=Asia%2FTokyo&parseTime=true");
//! ```
//!
//! ## Errors
//!
//! ```rust
//! use prax_dsn::{Dsn, DsnError};
//!
//! let err = Dsn::parse("root@tcp(127.0.0.1:3306)").unwrap_err();
//! assert!(matches!(err, DsnError::NoSlash { .. }));
//! ```
//!
//! Errors implement [`miette::Diagnostic`], so a labelled report pointing at
//! the faulty part of the input is available to callers that use miette.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod dsn;
pub mod env;
pub mod error;
pub mod escape;
pub mod logging;
mod parser;

pub use dsn::Dsn;
pub use env::{DEFAULT_DSN_VAR, EnvExpander, EnvSource, MapEnvSource, StdEnvSource};
pub use error::{DsnError, DsnResult};
pub use escape::EscapeError;
pub use parser::parse;
