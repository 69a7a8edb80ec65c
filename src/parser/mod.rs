// Session command language

pub mod ast;
pub mod command;
pub mod lexer;
pub mod pipeline;

pub use ast::{Command, Script};
pub use pipeline::{parse, parse_script};
