//! Flat-text outputs built from the loaded word books.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::engine::collection::WordCollection;
use crate::engine::registry::CollectionRegistry;
use crate::engine::word::WordEntry;

const SAVE_WIDTH: usize = 40;
const WRITE_BACK_WIDTH: usize = 30;

/// `foreign | native` with the foreign term padded to `width` characters.
pub fn format_entry(entry: &WordEntry, width: usize) -> String {
    format!("{:<width$} | {}", entry.foreign, entry.native)
}

/// Every distinct loaded word, sorted by foreign term, in word book format.
pub fn save_consolidated(registry: &CollectionRegistry, path: &Path) -> Result<usize> {
    let entries = registry.unique_entries();
    let mut out = String::new();
    for entry in &entries {
        out.push_str(&format_entry(entry, SAVE_WIDTH));
        out.push('\n');
    }
    write_atomic(path, &out)?;
    Ok(entries.len())
}

/// One foreign term per line, `page_size` lines per `list-<page>.txt`.
pub fn save_list(registry: &CollectionRegistry, dir: &Path, page_size: usize) -> Result<Vec<PathBuf>> {
    let page_size = page_size.max(1);
    let entries = registry.unique_entries();
    let mut written = Vec::new();
    for (page, chunk) in entries.chunks(page_size).enumerate() {
        let path = dir.join(format!("list-{page}.txt"));
        let mut out = String::new();
        for entry in chunk {
            out.push_str(&entry.foreign);
            out.push('\n');
        }
        fs::write(&path, out).with_context(|| format!("open {} failed", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Word wall: `per_file` terms per `<base>.<page>`, `per_line` per line.
pub fn dump(
    registry: &CollectionRegistry,
    base: &Path,
    per_file: usize,
    per_line: usize,
) -> Result<Vec<PathBuf>> {
    let per_file = per_file.max(1);
    let per_line = per_line.max(1);
    let entries = registry.unique_entries();
    let mut written = Vec::new();
    for (page, chunk) in entries.chunks(per_file).enumerate() {
        let path = PathBuf::from(format!("{}.{page}", base.display()));
        let mut file =
            fs::File::create(&path).with_context(|| format!("open {} failed", path.display()))?;
        for line in chunk.chunks(per_line) {
            let words: Vec<&str> = line.iter().map(|e| e.foreign.as_str()).collect();
            writeln!(file, "{}", words.join(" "))?;
        }
        written.push(path);
    }
    Ok(written)
}

/// Rewrite each collection to its own source, normalized.
pub fn write_back(registry: &CollectionRegistry) -> Result<usize> {
    let mut count = 0;
    for collection in registry.collections() {
        write_collection(collection)?;
        count += 1;
    }
    Ok(count)
}

pub fn write_collection(collection: &WordCollection) -> Result<()> {
    let mut out = String::new();
    for entry in collection.entries() {
        out.push_str(&format_entry(entry, WRITE_BACK_WIDTH));
        out.push('\n');
    }
    write_atomic(Path::new(&collection.name), &out)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("open {} for writing failed", tmp_path.display()))?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn registry() -> CollectionRegistry {
        let mut registry = CollectionRegistry::new();
        registry.load_str("b", "zebra | 斑马\napple | 苹果\n", true);
        registry.load_str("a", "apple | 苹果树\nmango | 芒果\n", true);
        registry
    }

    #[test]
    fn test_format_entry_pads_foreign() {
        let line = format_entry(&WordEntry::new("cat", "猫"), 6);
        assert_eq!(line, "cat    | 猫");
    }

    #[test]
    fn test_save_consolidated_sorted_unique() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("save.txt");
        assert_eq!(save_consolidated(&registry(), &path).unwrap(), 3);

        let content = fs::read_to_string(&path).unwrap();
        let firsts: Vec<&str> = content
            .lines()
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(firsts, vec!["apple", "mango", "zebra"]);
        // Book "a" is visited first, so its translation wins.
        assert!(content.lines().next().unwrap().ends_with("苹果树"));
    }

    #[test]
    fn test_save_list_paginates() {
        let dir = TempDir::new().unwrap();
        let pages = save_list(&registry(), dir.path(), 2).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(fs::read_to_string(&pages[0]).unwrap(), "apple\nmango\n");
        assert_eq!(fs::read_to_string(&pages[1]).unwrap(), "zebra\n");
        assert!(pages[0].ends_with("list-0.txt"));
    }

    #[test]
    fn test_dump_wraps_lines() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("dump.txt");
        let files = dump(&registry(), &base, 100, 2).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(
            fs::read_to_string(&files[0]).unwrap(),
            "apple mango\nzebra\n"
        );
        assert!(files[0].to_string_lossy().ends_with("dump.txt.0"));
    }

    #[test]
    fn test_write_back_normalizes_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "# header\ncat 猫\ncat 猫咪\nbroken\n").unwrap();
        let name = path.to_string_lossy().to_string();

        let mut registry = CollectionRegistry::new();
        registry.load(&name, true).unwrap();
        assert_eq!(write_back(&registry).unwrap(), 1);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{:<30} | 猫\n", "cat"));
    }
}
