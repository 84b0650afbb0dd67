//! A small regular-expression engine: scan pattern text into tokens, parse
//! into an AST, compile the AST into a flat instruction program, and run
//! that program against input with a backtracking matcher.
//!
//! ```
//! use regex_engine::Regex;
//!
//! let re = Regex::compile(r"(\w+)@(\w+)").unwrap();
//! assert!(re.is_match("contact alice@example"));
//! ```

mod analysis;
mod ast;
mod charset;
mod compiler;
mod error;
mod instruction;
mod matcher;
mod options;
mod parser;
mod regex;
mod scanner;

pub use crate::error::Error;
pub use crate::options::Options;
pub use crate::regex::{Match, Regex};
