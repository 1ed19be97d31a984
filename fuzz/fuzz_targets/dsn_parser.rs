//! Fuzz target for the DSN parser.
//!
//! Feeds arbitrary strings to the parser. Parsing must never panic, and
//! every successfully parsed DSN must survive a format/parse round trip.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_dsn_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use prax_dsn::Dsn;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(dsn) = Dsn::parse(input) else {
        return;
    };

    // A password without a user, or an address without a network, has no
    // position in the formatted string and is dropped on purpose.
    if dsn.user.is_empty() && !dsn.password.is_empty() {
        return;
    }
    if dsn.network.is_empty() && !dsn.address.is_empty() {
        return;
    }

    let formatted = dsn.format();
    let reparsed = Dsn::parse(&formatted).expect("formatted DSN must parse");
    assert_eq!(dsn, reparsed, "round trip changed {input:?} -> {formatted:?}");
    assert_eq!(reparsed.format(), formatted);
});
