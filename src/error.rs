use thiserror::Error;

/// Construction failure of [`compile`](crate::compile).
///
/// Malformed Markdown never fails; it degrades to literal text. The only
/// failure is a source with nothing in it to compile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    #[error("document has no compilable content")]
    Empty,
}
