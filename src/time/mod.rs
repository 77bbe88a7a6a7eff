mod date_parser;
pub use date_parser::*;
