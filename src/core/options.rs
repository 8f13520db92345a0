//! Document options
//!
//! Options control how a [`Document`](crate::Document) decodes input and
//! what happens when it is encoded.
//!
//! # Example
//!
//! ```rust
//! use xmpmodel::{Document, DocumentOptions};
//!
//! let options = DocumentOptions::default().strict().skip_unknown();
//! let doc = Document::new().with_options(options);
//! assert!(doc.options().strict);
//! ```

/// Options for decoding and encoding documents
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Abort decoding on the first field error (default: collect and continue)
    pub strict: bool,
    /// Drop properties of namespaces without a model instead of keeping them verbatim
    pub skip_unknown: bool,
    /// Do not run model synchronization when encoding
    pub no_sync: bool,
}

impl DocumentOptions {
    /// Abort decoding on the first malformed field.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Decode best-effort (default).
    ///
    /// Malformed fields are reset to their zero value and reported alongside
    /// the decoded document.
    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    /// Drop properties no registered model understands.
    pub fn skip_unknown(mut self) -> Self {
        self.skip_unknown = true;
        self
    }

    /// Encode models as they are, without inbound/outbound synchronization.
    pub fn without_sync(mut self) -> Self {
        self.no_sync = true;
        self
    }
}
