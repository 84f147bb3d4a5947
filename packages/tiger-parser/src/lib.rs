//! Parser for the Tiger language.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod visitor;

#[cfg(test)]
mod tests;
