//! Byte-offset source spans.

use serde::{Deserialize, Serialize};

/// A half-open byte range into a source file.
///
/// Spans are attached to syntax-tree elements by the parser and carried
/// through unchanged so that diagnostics can point back at source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteSpan {
    pub start: u32,
    pub len: u32,
}

impl ByteSpan {
    /// The empty span at offset zero, used for synthesized elements.
    pub const ZERO: ByteSpan = ByteSpan { start: 0, len: 0 };

    pub const fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    pub const fn end(&self) -> u32 {
        self.start + self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The smallest span covering both `self` and `other`.
    pub fn cover(&self, other: ByteSpan) -> ByteSpan {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return other;
        }
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        ByteSpan::new(start, end - start)
    }
}
