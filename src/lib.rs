// src/lib.rs
//
// squeezehtml — regex-staged HTML whitespace minifier
//
// - Protects script/style/pre/textarea blocks behind placeholder tokens, so
//   later passes never see their contents.
// - Strips HTML comments except IE conditional comments.
// - Trims every line, removes whitespace before block-level tags, collapses
//   the whitespace edges of text nodes to a single space.
// - Moves the first attribute of every start tag onto its own line.
// - Placeholder state is local to each `minify` call; the function is
//   reentrant and safe to call from many threads at once.

pub mod env;
pub mod minify;
mod placeholder;

pub use minify::minify;

use std::path::PathBuf;

/// Errors raised outside the minifier itself, which never fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a document failed
    #[error("cannot read or write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `env::init` was called more than once in this process
    #[error("environment already initialized")]
    AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, Error>;
