//! Cookie model.
//!
//! # Data Flow
//! ```text
//! Server side:
//!     Cookie::new(name, value)
//!         → responder.add_cookie(...)
//!         → one Set-Cookie header per cookie (insertion order)
//!
//! Client side:
//!     Set-Cookie header values
//!         → parse::parse_set_cookie (malformed ones dropped)
//!         → CookieJar (name → set of Cookie, duplicates preserved)
//! ```
//!
//! # Design Decisions
//! - Names are validated against RFC 6265 token characters at construction
//! - Serialization of an attribute-free cookie round-trips with parsing
//! - The jar is rebuilt fresh per response; persistence is out of scope

pub mod jar;
pub mod model;
pub mod parse;

pub use jar::CookieJar;
pub use model::Cookie;
pub use parse::{parse_cookie_header, parse_set_cookie};
