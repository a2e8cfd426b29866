//! Loading parse buffers from files.
//!
//! [`open_source`] classifies what it finds at a path and returns a buffer
//! ready for [`Document::parse`](crate::Document::parse) together with a
//! [`ResultCode`]. Files that are not UTF-8 are transcoded, using the
//! encoding they declare or that can be detected from their content, and
//! the encoding named in their declaration is rewritten to `UTF-8`.
//!
//! ```rust,no_run
//! use xmlarena::{source, Document};
//!
//! let mut buffer = source::load_source("config.xml")?;
//! let doc = Document::parse(&mut buffer)?;
//! # Ok::<(), xmlarena::Error>(())
//! ```
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;
use log::debug;
use xhtmlchardet::detect;

use crate::error::Error;

/// Outcome of loading a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResultCode {
    /// The file was read.
    Success,
    /// Something else went wrong; the message says what.
    UnknownError(String),
    /// Nothing exists at the path.
    FileNotFound,
    /// The path is a directory.
    PathIsDirectory,
    /// The file exists but could not be opened, usually for lack of
    /// permission.
    CannotOpenFile,
}

impl ResultCode {
    /// Returns true for [`ResultCode::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResultCode::Success => write!(f, "success"),
            ResultCode::UnknownError(message) => write!(f, "unknown error: {}", message),
            ResultCode::FileNotFound => write!(f, "file not found"),
            ResultCode::PathIsDirectory => write!(f, "path is a directory"),
            ResultCode::CannotOpenFile => write!(f, "cannot open file"),
        }
    }
}

/// Read the file at `path` into a UTF-8 buffer.
///
/// On anything but [`ResultCode::Success`] the buffer is empty.
pub fn open_source(path: impl AsRef<Path>) -> (Vec<u8>, ResultCode) {
    let path = path.as_ref();
    let code = classify(path);
    if !code.is_success() {
        debug!("cannot load {}: {}", path.display(), code);
        return (Vec::new(), code);
    }
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("cannot open {}: {}", path.display(), e);
            return (Vec::new(), ResultCode::CannotOpenFile);
        }
    };
    let mut data = Vec::new();
    if let Err(e) = file.read_to_end(&mut data) {
        return (Vec::new(), ResultCode::UnknownError(e.to_string()));
    }
    match to_utf8(data) {
        Ok(data) => {
            debug!("loaded {} ({} bytes)", path.display(), data.len());
            (data, ResultCode::Success)
        }
        Err(message) => (Vec::new(), ResultCode::UnknownError(message)),
    }
}

/// Read the file at `path` into a UTF-8 buffer, turning anything but success
/// into [`Error::Source`].
pub fn load_source(path: impl AsRef<Path>) -> Result<Vec<u8>, Error> {
    match open_source(path) {
        (data, ResultCode::Success) => Ok(data),
        (_, code) => Err(Error::Source(code)),
    }
}

fn classify(path: &Path) -> ResultCode {
    if path.is_dir() {
        ResultCode::PathIsDirectory
    } else if !path.exists() {
        ResultCode::FileNotFound
    } else {
        ResultCode::Success
    }
}

fn to_utf8(data: Vec<u8>) -> Result<Vec<u8>, String> {
    if std::str::from_utf8(&data).is_ok() {
        return Ok(data);
    }
    let encoding = encoding(&data).ok_or_else(|| "unknown encoding".to_string())?;
    let (decoded, _, had_errors) = encoding.decode(&data);
    if had_errors {
        return Err(format!("input is not valid {}", encoding.name()));
    }
    debug!("transcoded input from {}", encoding.name());
    let mut text = decoded.into_owned();
    relabel_declaration(&mut text);
    Ok(text.into_bytes())
}

/// Rewrite the encoding a leading declaration names to UTF-8, as the text
/// now is.
fn relabel_declaration(text: &mut String) {
    if !text.starts_with("<?xml") {
        return;
    }
    let end = match text.find("?>") {
        Some(end) => end,
        None => return,
    };
    let after_name = match text[..end].find("encoding") {
        Some(at) => at + "encoding".len(),
        None => return,
    };
    let quoted = match text[after_name..end].trim_start().strip_prefix('=') {
        Some(rest) => rest.trim_start(),
        None => return,
    };
    let open = end - quoted.len();
    let quote = match quoted.chars().next() {
        Some(quote @ ('"' | '\'')) => quote,
        _ => return,
    };
    let close = text[open + 1..end].find(quote);
    if let Some(len) = close {
        text.replace_range(open + 1..open + 1 + len, "UTF-8");
    }
}

fn encoding(data: &[u8]) -> Option<&'static Encoding> {
    let mut cursor = std::io::Cursor::new(data);
    let charsets = detect(&mut cursor, None).ok()?;
    // no encoding detected
    let label = if charsets.is_empty() {
        "UTF-8"
    } else {
        &charsets[0]
    };
    Encoding::for_label(label.as_bytes())
}
