use indexmap::IndexMap;
use std::sync::Arc;

/// One line of a fingerprint file: `hash <hex> <connections> <packets>;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TfHashEntry {
    pub connections: u64,
    pub packets: u64,
}

impl TfHashEntry {
    pub fn new(connections: u64, packets: u64) -> Self {
        Self {
            connections,
            packets,
        }
    }

    /// The entry a freshly blocked hash is given — a blocker only ever
    /// writes a bare block marker, never real counters.
    pub fn blocked() -> Self {
        Self::new(0, 0)
    }
}

/// In-memory mirror of a TFt/TFh fingerprint file.
///
/// Order-preserving so [`FingerprintTable::dump`] can reproduce insertion
/// order in the rewritten file, per the invariant that re-loading a dump
/// must produce an identical map.
#[derive(Debug, Clone, Default)]
pub struct FingerprintTable {
    entries: IndexMap<Arc<str>, TfHashEntry>,
    dirty: bool,
}

impl FingerprintTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn add(&mut self, hash: impl Into<Arc<str>>, entry: TfHashEntry) {
        self.entries.insert(hash.into(), entry);
        self.dirty = true;
    }

    /// Removes `hash`. Returns `false` if it was not present — callers that
    /// must treat this as an error (per §4.C) check the return value.
    pub fn remove(&mut self, hash: &str) -> bool {
        if self.entries.shift_remove(hash).is_some() {
            self.dirty = true;
            true
        } else {
            false
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &TfHashEntry)> {
        self.entries.iter()
    }

    /// Replaces the table's contents in full, as `load` does — the file is
    /// the source of truth on reload, not an incremental merge.
    pub fn replace_with(&mut self, entries: IndexMap<Arc<str>, TfHashEntry>) {
        self.entries = entries;
        self.dirty = false;
    }

    /// Formats one entry as a fingerprint-file line, in the grammar `hash
    /// <hex> <connections> <packets>;\n`.
    pub fn format_line(hash: &str, entry: TfHashEntry) -> String {
        format!("hash {} {} {};\n", hash, entry.connections, entry.packets)
    }

    /// Renders the whole table as file contents, one `format_line` per entry
    /// in insertion order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (hash, entry) in &self.entries {
            out.push_str(&Self::format_line(hash, *entry));
        }
        out
    }

    /// Parses one non-comment, non-blank line. Returns `None` when the line
    /// does not match the grammar — callers log a warning and continue, they
    /// do not fail the whole load.
    pub fn parse_line(line: &str) -> Option<(Arc<str>, TfHashEntry)> {
        let trimmed = line.trim();
        let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);
        let mut fields = trimmed.split_whitespace();
        if fields.next()? != "hash" {
            return None;
        }
        let hash = fields.next()?;
        let connections: u64 = fields.next()?.parse().ok()?;
        let packets: u64 = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        Some((Arc::from(hash), TfHashEntry::new(connections, packets)))
    }

    /// Whether a raw line should be skipped entirely (blank or `#` comment),
    /// as distinct from a malformed line that merits a warning.
    pub fn is_skippable(line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_line() {
        let (hash, entry) = FingerprintTable::parse_line("  hash abc123 5 10; \n").unwrap();
        assert_eq!(&*hash, "abc123");
        assert_eq!(entry, TfHashEntry::new(5, 10));
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(FingerprintTable::parse_line("hash abc123 5").is_none());
        assert!(FingerprintTable::parse_line("not-a-hash-line").is_none());
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert!(FingerprintTable::is_skippable(""));
        assert!(FingerprintTable::is_skippable("   "));
        assert!(FingerprintTable::is_skippable("# a comment"));
        assert!(!FingerprintTable::is_skippable("hash abc 1 2;"));
    }

    #[test]
    fn dump_then_reload_round_trips() {
        let mut table = FingerprintTable::new();
        table.add("aaa", TfHashEntry::new(1, 2));
        table.add("bbb", TfHashEntry::blocked());
        let rendered = table.render();

        let mut reloaded = IndexMap::new();
        for line in rendered.lines() {
            if FingerprintTable::is_skippable(line) {
                continue;
            }
            let (hash, entry) = FingerprintTable::parse_line(line).unwrap();
            reloaded.insert(hash, entry);
        }
        let mut reloaded_table = FingerprintTable::new();
        reloaded_table.replace_with(reloaded);

        assert_eq!(reloaded_table.len(), table.len());
        assert_eq!(
            reloaded_table.iter().collect::<Vec<_>>(),
            table.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn remove_absent_entry_reports_failure() {
        let mut table = FingerprintTable::new();
        assert!(!table.remove("missing"));
    }

    #[test]
    fn insertion_order_preserved_across_remove_and_reinsert() {
        let mut table = FingerprintTable::new();
        table.add("a", TfHashEntry::blocked());
        table.add("b", TfHashEntry::blocked());
        table.add("c", TfHashEntry::blocked());
        table.remove("b");
        table.add("b", TfHashEntry::blocked());
        let order: Vec<&str> = table.iter().map(|(h, _)| h.as_ref()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
    }
}
