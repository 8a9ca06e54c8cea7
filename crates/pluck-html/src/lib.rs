//! Markup loading for pluck.
//!
//! Turns HTML or XML text into a [`DomTree`]. Parsing itself is delegated to
//! html5ever and xml5ever; this crate only converts their `RcDom` output into
//! the arena tree the selector engine walks.
//!
//! # Source detection
//!
//! - Text containing `<html` is parsed as HTML.
//! - Otherwise text containing `<?xml` is parsed as XML.
//! - Anything else is parsed as an HTML fragment (html5ever wraps it in
//!   `html`/`head`/`body`).

/// Conversion from `RcDom` to [`DomTree`].
mod convert;
/// Debug printing of a loaded tree.
mod print;

use std::fs;
use std::path::{Path, PathBuf};

use html5ever::ParseOpts;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;
use pluck_dom::DomTree;
use thiserror::Error;
use xml5ever::driver::XmlParseOpts;

pub use print::print_tree;

/// Which parser a source is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// WHATWG HTML parsing (html5ever).
    Html,
    /// XML parsing (xml5ever).
    Xml,
}

impl SourceKind {
    /// Pick the parser for `source`.
    #[must_use]
    pub fn detect(source: &str) -> Self {
        if source.contains("<html") {
            Self::Html
        } else if source.contains("<?xml") {
            Self::Xml
        } else {
            Self::Html
        }
    }
}

/// Errors raised while loading markup.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source was empty or only whitespace.
    #[error("nothing to load: source is empty")]
    Empty,

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The parser driver failed.
    #[error("failed to parse markup: {0}")]
    Parse(String),
}

/// Load `source`, treating it as a file path when such a file exists and as
/// markup text otherwise.
///
/// # Errors
/// See [`load_file`] and [`load_str`].
pub fn load(source: &str) -> Result<DomTree, LoadError> {
    if !source.contains('<') && Path::new(source).is_file() {
        load_file(source)
    } else {
        load_str(source)
    }
}

/// Read a file and load its contents.
///
/// # Errors
/// Returns [`LoadError::Io`] if the file cannot be read, otherwise whatever
/// [`load_str`] returns.
pub fn load_file(path: impl AsRef<Path>) -> Result<DomTree, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Loaded {} bytes from {}", text.len(), path.display());
    load_str(&text)
}

/// Parse markup text into a tree.
///
/// # Errors
/// Returns [`LoadError::Empty`] for blank input and [`LoadError::Parse`] if
/// the parser driver fails.
pub fn load_str(source: &str) -> Result<DomTree, LoadError> {
    if source.trim().is_empty() {
        return Err(LoadError::Empty);
    }

    let kind = SourceKind::detect(source);
    tracing::debug!("Parsing {kind:?} source ({} bytes)", source.len());

    let dom = match kind {
        SourceKind::Html => html5ever::parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut source.as_bytes()),
        SourceKind::Xml => {
            xml5ever::driver::parse_document(RcDom::default(), XmlParseOpts::default())
                .from_utf8()
                .read_from(&mut source.as_bytes())
        }
    }
    .map_err(|err| LoadError::Parse(err.to_string()))?;

    let tree = convert::to_dom_tree(&dom);
    tracing::debug!("Built tree with {} nodes", tree.len());
    Ok(tree)
}
