//! Chunked bundle archives.
//!
//! Bundles are flat files made of `(id, size)`-headed chunks, some of which
//! nest further chunks. [`walker::Walker`] drives the traversal and hands
//! recognized chunks to the format handlers in [`handlers`].

pub mod chunk;
pub mod error;
pub mod handlers;
pub mod jdlz;
pub mod kind;
pub mod names;
pub mod output;
pub mod walker;

pub use error::BundleError;

use bunkit_core::cursor::Endian;

/// The platform a bundle was cooked for. Decides the byte order of the
/// platform-specific payloads; chunk envelopes are little-endian everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Platform {
    #[default]
    Xenon,
    Pc,
}

impl Platform {
    pub fn endian(self) -> Endian {
        match self {
            Self::Xenon => Endian::Big,
            Self::Pc => Endian::Little,
        }
    }
}
