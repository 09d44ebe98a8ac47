//! Apex source generator
//!
//! Renders a parsed Apex AST back to canonically formatted source:
//! - one declaration, member or statement per line
//! - braces always emitted, closing brace at the depth of its opening line
//! - SOQL/SOSL expanded to one clause keyword per line
//!
//! Nesting depth is passed by value through every call, so a `Generator`
//! holds nothing but its options and can be shared freely.

mod codegen;
mod error;
mod query;

pub use codegen::Generator;
pub use error::{GenerateError, GenerateResult};

use crate::ast::CompilationUnit;

/// Render a compilation unit with default options
pub fn generate(unit: &CompilationUnit) -> GenerateResult<String> {
    Generator::new().render(unit)
}

/// Render with custom options
pub fn generate_with_options(
    unit: &CompilationUnit,
    options: GenerateOptions,
) -> GenerateResult<String> {
    Generator::with_options(options).render(unit)
}

/// Options for generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Spaces per nesting level (default: 4)
    pub indent_width: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}
