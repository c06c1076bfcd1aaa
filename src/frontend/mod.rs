//! Source text to AST: lexer, Pratt parser and syntax diagnostics.

pub mod block;
pub mod diagnostic;
pub mod error_codes;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod precedence;
pub mod program;
pub mod statement;
pub mod token;
pub mod token_type;

pub use position::Position;
pub use token::Token;
pub use token_type::TokenType;
