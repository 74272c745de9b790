//! SQL reference extractor.
//!
//! Not a SQL parser: a lexical scan with a small clause-position state
//! machine. The lexer strips comments and string literals so neither can
//! ever contribute a reference; the scanner tracks FROM/JOIN/UPDATE/
//! INSERT INTO/DELETE FROM/MERGE INTO/EXEC/CALL positions, CTE names,
//! and table aliases. Malformed input never fails; unreadable segments
//! simply contribute nothing.

pub mod lexer;
pub mod params;
pub mod resolve;
pub mod scanner;
pub mod types;

pub use resolve::NameResolver;
pub use scanner::extract;
pub use types::{AntiPattern, CrudFlags, ExtractionResult};
