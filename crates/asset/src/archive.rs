//! Read-only packed asset containers.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use crate::error::{AssetError, AssetResult};

/// Lookup of named entries in a packed asset container.
pub trait Archive {
    fn load_entry(&self, name: &str) -> Option<&[u8]>;

    fn exists(&self, name: &str) -> bool {
        self.load_entry(name).is_some()
    }
}

/// Archive assembled in memory, mostly for generated content and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), data.into());
    }
}

impl Archive for MemoryArchive {
    fn load_entry(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }
}

/// Pack file: `JPK01.00`, entry count, then per entry offset/length/name, then the data.
///
/// All integers are little-endian `u32`; names are NUL padded to 52 bytes.
/// The whole file is kept in memory and entries are served as slices of it.
#[derive(Clone, Debug)]
pub struct PackArchive {
    data: Vec<u8>,
    index: HashMap<String, Range<usize>>,
}

impl PackArchive {
    pub const MAGIC: &'static [u8; 8] = b"JPK01.00";
    const NAME_LEN: usize = 52;
    const ENTRY_LEN: usize = 8 + Self::NAME_LEN;
    const HEADER_LEN: usize = 8 + 4;

    pub fn open(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&path.display().to_string(), data)
    }

    pub fn from_bytes(name: &str, data: Vec<u8>) -> AssetResult<Self> {
        let malformed = |message: String| AssetError::Parse {
            name: name.to_owned(),
            message,
        };

        if data.len() < Self::HEADER_LEN || &data[..8] != Self::MAGIC {
            return Err(malformed("not a JPK01.00 pack".to_owned()));
        }
        let count = read_u32(&data, 8) as usize;
        let index_end = count
            .checked_mul(Self::ENTRY_LEN)
            .and_then(|len| len.checked_add(Self::HEADER_LEN));
        if index_end.is_none_or(|end| end > data.len()) {
            return Err(malformed(format!(
                "index of {count} entries does not fit in {} bytes",
                data.len()
            )));
        }

        let mut index = HashMap::with_capacity(count);
        for i in 0..count {
            let at = Self::HEADER_LEN + i * Self::ENTRY_LEN;
            let Some(entry) = data.get(at..at + Self::ENTRY_LEN) else {
                return Err(malformed(format!("index truncated at entry {i}")));
            };
            let offset = read_u32(entry, 0) as usize;
            let length = read_u32(entry, 4) as usize;
            let raw_name = &entry[8..];
            let end = raw_name.iter().position(|&b| b == 0).unwrap_or(raw_name.len());
            let entry_name = String::from_utf8_lossy(&raw_name[..end]).into_owned();

            let range = offset..offset.saturating_add(length);
            if range.end > data.len() {
                return Err(malformed(format!(
                    "entry '{entry_name}' points past the end of the pack"
                )));
            }
            index.insert(entry_name, range);
        }

        log::debug!("Opened pack {name} with {} entries", index.len());
        Ok(Self { data, index })
    }

    /// Serialize entries into the pack layout.
    ///
    /// # Panics
    /// If a name does not fit the 52 byte name field (including its terminator).
    pub fn build(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(Self::MAGIC);
        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());

        let mut offset = Self::HEADER_LEN + entries.len() * Self::ENTRY_LEN;
        for (name, data) in entries {
            assert!(name.len() < Self::NAME_LEN, "pack entry name too long: {name}");
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            let mut field = [0u8; Self::NAME_LEN];
            field[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&field);
            offset += data.len();
        }
        for (_, data) in entries {
            out.extend_from_slice(data);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Archive for PackArchive {
    fn load_entry(&self, name: &str) -> Option<&[u8]> {
        self.index.get(name).map(|range| &self.data[range.clone()])
    }

    fn exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
