//! Raw documents and their identities.
//!
//! A [`Document`] is an immutable, cheaply clonable handle to the bytes of one
//! JSON document. Its [`DocumentId`] is a content hash, so two handles holding
//! the same bytes are the same document as far as cycle detection goes.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

// other lookups keyed by document identity use a fast non-cryptographic hash
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;

use crate::error::Result;

pub type DocumentHasher = BuildHasherDefault<SeaHasher>;

// ------------- DocumentId -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn of(bytes: &[u8]) -> Self {
        Self(seahash::hash(bytes))
    }
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ------------- Document -------------
#[derive(Clone)]
pub struct Document {
    id: DocumentId,
    bytes: Arc<[u8]>,
}

impl Document {
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let bytes: Arc<[u8]> = Arc::from(bytes.as_ref());
        Self {
            id: DocumentId::of(&bytes),
            bytes,
        }
    }
    /// Reads a whole file into a document. The engine itself never does I/O.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(Self::new(bytes))
    }
    pub fn id(&self) -> DocumentId {
        self.id
    }
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Vec<u8>> for Document {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Document {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}
