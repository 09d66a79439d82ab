mod ast;
mod error;
mod parser;
mod report;

pub use ast::Ast;
pub use error::SyntaxError;
pub use parser::{
    check_depth, desugar, insert_concatenation, is_metachar, lex, parse, parse_observed, parse_with_limit,
    postfix_to_ast, to_postfix, tokens_to_string, Token, TokenKind, DEFAULT_MAX_DEPTH,
};
pub use report::{RegexReport, RegexReportEntry, RegexReportLevel};

/// Surface syntax for the empty string
pub const EPSILON: char = 'ε';
