//! Expansion engine for Emmet-style abbreviations.
//!
//! A single-line expression such as `ul#name>li.item*2` expands to a
//! markup fragment; property shortcuts such as `m10-20` expand to CSS
//! declarations. The engine is a pure function of the abbreviation, the
//! [`Options`], and the snippet/preference tables; it does no I/O and
//! holds no state beyond monotonic template caches.

mod ast;
mod css;
mod engine;
mod error;
mod lorem;
mod makers;
mod numbering;
mod options;
mod parser;
mod scanner;
mod tables;
mod transform;

// Public exports.
pub use engine::{expand, expand_with};
pub use error::{ExpandError, ExpandErrorKind, ParseError, ParseErrorKind};
pub use options::{ColorCase, Mode, Options, SelfClosingStyle};
pub use tables::{TagSettings, Tables};
