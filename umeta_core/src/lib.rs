//! `umeta_core` parses, validates, and stringifies the UserCSS metadata
//! block — the `/* ==UserStyle== ... ==/UserStyle== */` comment that carries
//! a userstyle's name, version, URLs, and user-configurable variables.
//!
//! ## Processing Pipeline
//!
//! ```text
//! UserCSS source
//!   → Declaration scan (finds @key tokens, skipping consumed values)
//!   → Per-key value parsers (strings, heredocs, JSON literals, variables)
//!   → Per-key validators (version grammar, URL schemes, variable rules)
//!   → Metadata record (ordered fields + variable registry)
//! ```
//!
//! The reverse direction renders a record back into a metadata block, in
//! either the stylus (`@var`) or xstyle (`@advanced`) dialect.
//!
//! ## Modules
//!
//! - [`parser`] — The declaration scanner, builtin key/variable handling,
//!   and the [`ParserBuilder`] extension points.
//! - [`stringify`] — The block renderer and its [`StringifierBuilder`]
//!   extension points.
//! - [`scanner`] — Position-tracked lexical primitives, exposed so custom
//!   resolvers can consume values the way the builtin ones do.
//!
//! ## Key Types
//!
//! - [`Metadata`] — Ordered declaration fields plus the variable registry.
//! - [`Variable`] — One `@var`/`@advanced` descriptor with its default,
//!   options, and numeric bounds.
//! - [`ParseError`] — A structured failure with a stable code string and a
//!   byte offset into the source.
//!
//! ## Quick Start
//!
//! ```rust
//! let source = r#"/* ==UserStyle==
//! @name        Example
//! @namespace   github.com/openstyles/stylus
//! @version     0.1.0
//! ==/UserStyle== */"#;
//!
//! let result = umeta_core::parse(source).unwrap();
//! assert_eq!(result.metadata.get_str("name"), Some("Example"));
//! assert_eq!(result.metadata.get_str("version"), Some("0.1.0"));
//!
//! let block = umeta_core::stringify(&result.metadata);
//! assert!(block.starts_with("/* ==UserStyle=="));
//! ```

pub use distance::*;
pub use error::*;
pub use metadata::*;
pub use parser::*;
pub use scanner::*;
pub use stringify::*;
pub use units::*;

mod distance;
mod error;
mod metadata;
pub mod parser;
pub mod scanner;
pub mod stringify;
mod units;

/// Parse a metadata block with the default parser configuration.
pub fn parse(text: &str) -> MetaResult<ParseResult> {
	Parser::default().parse(text)
}

/// Render a metadata record with the default stringifier configuration.
pub fn stringify(metadata: &Metadata) -> String {
	Stringifier::default().stringify(metadata)
}
