#![forbid(unsafe_code)]
//! tyla semantic analysis pass.
//!
//! Takes a parsed `Program` (in practice: constructed by hand in tests, or
//! read from a JSON document by the CLI) and produces either a fully typed
//! `Program` or a single `Diagnostic` describing the first error found.
//!
//! ## Panic policy
//!
//! - **Production code**: propagate `Result<_, Diagnostic>` with `?`.
//! - **Test code**: `.unwrap()`/`.expect()` are fine.
//! - **True invariants**: a broken invariant (a compiler bug, not a user
//!   error) uses `assert!`/`unreachable!`/`.expect("...")` and is allowed to
//!   unwind the process.

pub mod checker;

pub use checker::{check_program, Checker, Diagnostic};
pub use tyla_ast as ast;
pub use tyla_builtins as builtins;
pub use tyla_types as types;
