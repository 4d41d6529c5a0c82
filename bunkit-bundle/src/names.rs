//! Hash-to-name resolution for resources that are stored by name hash only.

use std::collections::HashMap;
use std::io::BufRead;

use bunkit_core::hash::binary_upper_hash;

/// Maps resource name hashes back to the identifiers they were derived from.
///
/// Bundles store most resource references as 32-bit hashes; a key list (one
/// identifier per line) seeds the reverse mapping so extracted files get
/// readable names.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: HashMap<u32, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a key list: one identifier per line, blank lines skipped.
    pub fn load_key_list(reader: impl BufRead) -> std::io::Result<Self> {
        let mut table = Self::new();
        for line in reader.lines() {
            let line = line?;
            let name = line.trim_end_matches('\r');
            if name.is_empty() {
                continue;
            }
            table.insert(name);
        }
        Ok(table)
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(binary_upper_hash(name), name.to_string());
    }

    pub fn lookup(&self, hash: u32) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }

    /// The known name for `hash`, or a stable `prefix_xxxxxxxx` fallback.
    pub fn name_or_hash(&self, hash: u32, prefix: &str) -> String {
        match self.lookup(hash) {
            Some(name) => name.to_string(),
            None => format!("{prefix}_{hash:08x}"),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_list_maps_hashes_back_to_names() {
        let list = "TRAFFIC_COP\r\n\nWORLD_SUN\n";
        let table = NameTable::load_key_list(list.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup(binary_upper_hash("TRAFFIC_COP")),
            Some("TRAFFIC_COP")
        );
        assert_eq!(table.lookup(binary_upper_hash("WORLD_SUN")), Some("WORLD_SUN"));
    }

    #[test]
    fn unknown_hashes_fall_back_to_hex() {
        let table = NameTable::new();
        assert_eq!(table.name_or_hash(0xDEADBEEF, "texture"), "texture_deadbeef");
    }
}
