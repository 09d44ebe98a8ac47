pub mod ast;
pub mod generate;
pub mod imports;
pub mod lexer;
pub mod parser;
pub mod record_type;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use ast::*;
pub use generate::{generate, generate_with_options, GenerateError, GenerateOptions, Generator};
pub use imports::{resolve_imports, ImportRegistry, ImportResolver, RegistryError, ResolveError};
pub use lexer::{tokenize, Lexer, Span, Token, TokenKind};
pub use parser::{parse, ParseError, ParseResult, Parser};
