pub mod sexp;

// Re-export for convenience
pub use sexp::{parse_sexpr, SExp, SExpParser};
