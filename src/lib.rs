//! # cstepper
//!
//! An educational C-subset interpreter: lexer, recursive-descent parser,
//! and a tree-walking, single-steppable evaluator with a simulated
//! memory manager and I/O, built for driving a program one statement at
//! a time rather than just running it to completion.
//!
//! ## Pipeline
//!
//! 1. **Lexer** (`lexer`) — tokenizes source text
//! 2. **Parser** (`parser`) — builds an arena-indexed AST (`ast`)
//! 3. **Interpreter** (`interpreter`) — walks the AST step by step,
//!    backed by a simulated memory manager (`memory`), an I/O simulator
//!    (`io`), and an execution recorder (`recorder`) for rewind/replay
//!
//! ## Example
//!
//! ```rust,no_run
//! use cstepper::{lexer, parser, options::Options};
//!
//! let source = std::fs::read_to_string("program.c").unwrap();
//! let options = Options::default();
//! let lexed = lexer::lex(&source, "program.c", &options);
//! let parsed = parser::parse(&lexed.tokens, &options);
//!
//! if parsed.errors.is_empty() {
//!     println!("parsed {} top-level declarations", parsed.ast.len());
//! }
//! ```

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod io;
pub mod lexer;
pub mod memory;
pub mod options;
pub mod parser;
pub mod recorder;
pub mod token;
