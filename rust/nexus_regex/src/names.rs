//! Capture-group name table.
//!
//! Built once when a pattern compiles and never mutated afterwards, so lookups
//! are plain reads that any number of threads can do at once.
//!
//! Group indices use the engine numbering: 1-based, with the implicit
//! whole-match group 0 never named. A name can map to several indices when the
//! syntax allows duplicate names (Ruby does), so every lookup returns a set.

use ahash::AHashMap;

use crate::compile::CompiledPattern;

/// One distinct group name and every group index that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureNameEntry {
    name: Vec<u8>,
    group_indices: Vec<u32>,
}

impl CaptureNameEntry {
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Group indices sharing this name, ascending, no duplicates.
    pub fn group_indices(&self) -> &[u32] {
        &self.group_indices
    }
}

/// Immutable name -> indices mapping for one compiled pattern.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    /// Entries in the engine's name-table iteration order.
    entries: Vec<CaptureNameEntry>,
    /// Name -> position in `entries`.
    by_name: AHashMap<Vec<u8>, usize>,
}

impl NameTable {
    /// Read the engine's name table for `regex`.
    pub(crate) fn from_regex(regex: &onig::Regex) -> Self {
        let mut raw = Vec::with_capacity(regex.capture_names_len());
        regex.foreach_name(|name, groups| {
            raw.push((name.as_bytes().to_vec(), groups.to_vec()));
            true
        });
        Self::from_groups(raw)
    }

    pub(crate) fn from_groups(raw: Vec<(Vec<u8>, Vec<u32>)>) -> Self {
        let mut entries: Vec<CaptureNameEntry> = Vec::with_capacity(raw.len());
        let mut by_name: AHashMap<Vec<u8>, usize> = AHashMap::with_capacity(raw.len());
        for (name, mut groups) in raw {
            if let Some(&pos) = by_name.get(&name) {
                groups.extend_from_slice(&entries[pos].group_indices);
                entries[pos].group_indices = groups;
                normalize(&mut entries[pos].group_indices);
                continue;
            }
            normalize(&mut groups);
            by_name.insert(name.clone(), entries.len());
            entries.push(CaptureNameEntry {
                name,
                group_indices: groups,
            });
        }
        Self { entries, by_name }
    }

    /// Group indices for `name`; empty when the name is not defined.
    pub fn resolve(&self, name: &[u8]) -> &[u32] {
        self.by_name
            .get(name)
            .map(|&pos| self.entries[pos].group_indices.as_slice())
            .unwrap_or(&[])
    }

    /// Every (name, index) pair, one per group carrying a name.
    pub fn list(&self) -> Vec<(&[u8], u32)> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .group_indices
                    .iter()
                    .map(move |&idx| (entry.name.as_slice(), idx))
            })
            .collect()
    }

    pub fn entries(&self) -> &[CaptureNameEntry] {
        &self.entries
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(groups: &mut Vec<u32>) {
    groups.sort_unstable();
    groups.dedup();
}

/// Group indices sharing `name` in `pattern`; empty when undefined.
pub fn resolve_name<'p>(pattern: &'p CompiledPattern, name: &[u8]) -> &'p [u32] {
    pattern.names().resolve(name)
}

/// Every named group of `pattern` as (name, index), in definition order of
/// the engine's name table.
pub fn list_names(pattern: &CompiledPattern) -> Vec<(&[u8], u32)> {
    pattern.names().list()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::options::CompileOptions;

    fn table(raw: &[(&str, &[u32])]) -> NameTable {
        NameTable::from_groups(
            raw.iter()
                .map(|(n, g)| (n.as_bytes().to_vec(), g.to_vec()))
                .collect(),
        )
    }

    #[test]
    fn resolve_undefined_is_empty() {
        let t = table(&[("year", &[1])]);
        assert_eq!(t.resolve(b"year"), &[1]);
        assert!(t.resolve(b"month").is_empty());
    }

    #[test]
    fn duplicate_indices_are_sorted_and_merged() {
        let t = table(&[("x", &[3, 1]), ("y", &[2]), ("x", &[3])]);
        assert_eq!(t.resolve(b"x"), &[1, 3]);
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.list(),
            vec![(&b"x"[..], 1), (&b"x"[..], 3), (&b"y"[..], 2)]
        );
    }

    #[test]
    fn names_with_arbitrary_bytes() {
        let t = NameTable::from_groups(vec![(vec![b'a', 0, b'b'], vec![1])]);
        assert_eq!(t.resolve(&[b'a', 0, b'b']), &[1]);
        assert!(t.resolve(b"a").is_empty());
    }

    #[test]
    fn table_from_compiled_pattern() {
        let p = compile(br"(?<year>\d{4})-(?<month>\d{2})", CompileOptions::empty()).unwrap();
        assert_eq!(resolve_name(&p, b"year"), &[1]);
        assert_eq!(resolve_name(&p, b"month"), &[2]);
        let mut names = list_names(&p);
        names.sort();
        assert_eq!(names, vec![(&b"month"[..], 2), (&b"year"[..], 1)]);
    }

    #[test]
    fn duplicate_names_resolve_to_every_group() {
        let p = compile(b"(?<x>a)|(?<x>b)", CompileOptions::empty()).unwrap();
        assert_eq!(resolve_name(&p, b"x"), &[1, 2]);
        assert_eq!(list_names(&p), vec![(&b"x"[..], 1), (&b"x"[..], 2)]);
    }

    #[test]
    fn unnamed_pattern_has_empty_table() {
        let p = compile(b"(a)(b)", CompileOptions::empty()).unwrap();
        assert!(p.names().is_empty());
        assert!(list_names(&p).is_empty());
    }

    #[test]
    fn resolve_is_idempotent() {
        let p = compile(b"(?<a>x)(?<b>y)(?<a>z)", CompileOptions::empty()).unwrap();
        let first = resolve_name(&p, b"a").to_vec();
        let second = resolve_name(&p, b"a").to_vec();
        assert_eq!(first, second);
        assert_eq!(first, vec![1, 3]);
    }
}
