pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;
pub mod request;

pub use ast::*;
pub use compiler::{CompileError, Compiler};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser, variable_index};
pub use request::ProblemRequest;
