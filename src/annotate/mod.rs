//! Annotation of formatted abundance tables from a lookup file.

use crate::error::{ProtdiffError, Result};
use log::{info, warn};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix of tables waiting to be annotated.
pub const FORMATTED_SUFFIX: &str = "_formatted.txt";

/// Replacement suffix for annotated output files.
const ANNOTATED_REPLACEMENT: &str = "_annotated.txt";

/// Feature id to annotation lookup.
#[derive(Debug, Clone, Default)]
pub struct AnnotationMap {
    entries: HashMap<String, String>,
}

impl AnnotationMap {
    /// Load a lookup from a TSV file, one `id<TAB>annotation` per line.
    ///
    /// The line is split at the first tab only, so the annotation text
    /// may itself contain tabs. Lines without a tab are skipped with a
    /// warning; later entries for an id overwrite earlier ones.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut entries = HashMap::new();
        for line_result in reader.lines() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((id, annotation)) => {
                    entries.insert(id.trim().to_string(), annotation.trim().to_string());
                }
                None => {
                    warn!(
                        "{}: skipping lookup line without a tab: {:?}",
                        path.display(),
                        line
                    );
                }
            }
        }

        if entries.is_empty() {
            return Err(ProtdiffError::EmptyData(format!(
                "no lookup entries in {}",
                path.display()
            )));
        }
        Ok(Self { entries })
    }

    /// Annotation for an id, `Unknown` when the lookup has none.
    pub fn get(&self, feature_id: &str) -> &str {
        self.entries
            .get(feature_id)
            .map(String::as_str)
            .unwrap_or("Unknown")
    }

    /// Whether the lookup carries an entry for an id.
    pub fn contains(&self, feature_id: &str) -> bool {
        self.entries.contains_key(feature_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrite one table, filling its annotation column from the lookup.
///
/// The header line passes through unchanged. Every data row with at
/// least two columns gets its second column replaced by the lookup
/// value (or `Unknown`); shorter rows pass through as-is. Measurement
/// fields are untouched, and tabs inside the looked-up annotation are
/// replaced with spaces so the column count stays fixed. Returns the
/// number of rows whose annotation came from the lookup.
pub fn annotate_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    map: &AnnotationMap,
    output: Q,
) -> Result<usize> {
    let reader = BufReader::new(File::open(input.as_ref())?);
    let mut writer = BufWriter::new(File::create(output.as_ref())?);

    let mut n_hits = 0;
    for (line_idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line_idx == 0 {
            writeln!(writer, "{line}")?;
            continue;
        }
        let Some((id, rest)) = line.split_once('\t') else {
            writeln!(writer, "{line}")?;
            continue;
        };
        if map.contains(id.trim()) {
            n_hits += 1;
        }
        let annotation = map.get(id.trim()).replace('\t', " ");
        match rest.split_once('\t') {
            Some((_, tail)) => writeln!(writer, "{id}\t{annotation}\t{tail}")?,
            None => writeln!(writer, "{id}\t{annotation}")?,
        }
    }
    writer.flush()?;
    Ok(n_hits)
}

/// Annotate every `*_formatted.txt` table in a directory.
///
/// Each input produces a sibling `*_annotated.txt` file. Returns the
/// written paths, sorted by name.
pub fn annotate_directory<P: AsRef<Path>>(
    dir: P,
    map: &AnnotationMap,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ProtdiffError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut inputs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_formatted = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(FORMATTED_SUFFIX))
                .unwrap_or(false);
        if is_formatted {
            inputs.push(path);
        }
    }
    inputs.sort();
    if inputs.is_empty() {
        warn!("no *{} files in {}", FORMATTED_SUFFIX, dir.display());
        return Ok(vec![]);
    }

    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        // The suffix filter guarantees a valid UTF-8 file name here.
        let name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let output_name = name.replacen(FORMATTED_SUFFIX, ANNOTATED_REPLACEMENT, 1);
        let output = dir.join(output_name);
        let n_hits = annotate_file(&input, map, &output)?;
        info!(
            "annotated {} -> {} ({} lookup hits)",
            input.display(),
            output.display(),
            n_hits
        );
        outputs.push(output);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_lookup_load_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "lookup.tsv",
            "P001\tkinase\nP002\tphosphatase\nmalformed line\n",
        );

        let map = AnnotationMap::from_tsv(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("P001"), "kinase");
        assert_eq!(map.get("P999"), "Unknown");
        assert!(map.contains("P002"));
        assert!(!map.contains("P999"));
    }

    #[test]
    fn test_lookup_annotation_may_contain_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = write_file(&dir, "lookup.tsv", "P001\tkinase activity\tEC 2.7.11.1\n");
        let input = write_file(
            &dir,
            "A_formatted.txt",
            "id\tAnnotation\t1\t2\nP001\t\t1.0\t2.0\n",
        );
        let output = dir.path().join("A_annotated.txt");

        let map = AnnotationMap::from_tsv(&lookup).unwrap();
        assert_eq!(map.get("P001"), "kinase activity\tEC 2.7.11.1");

        annotate_file(&input, &map, &output).unwrap();
        let content = fs::read_to_string(&output).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert_eq!(row, "P001\tkinase activity EC 2.7.11.1\t1.0\t2.0");
        assert_eq!(row.split('\t').count(), 4);
    }

    #[test]
    fn test_empty_lookup_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "lookup.tsv", "\n\n");
        assert!(AnnotationMap::from_tsv(&path).is_err());
    }

    #[test]
    fn test_annotate_file_rewrites_second_column() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = write_file(&dir, "lookup.tsv", "P001\tkinase\n");
        let input = write_file(
            &dir,
            "A_formatted.txt",
            "Accession Number\tAnnotation\t1\t2\n\
             P001\t\t1.0\t2.0\n\
             P002\told text\t3.0\t4.0\n",
        );
        let output = dir.path().join("A_annotated.txt");

        let map = AnnotationMap::from_tsv(&lookup).unwrap();
        let n_hits = annotate_file(&input, &map, &output).unwrap();
        assert_eq!(n_hits, 1);

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Accession Number\tAnnotation\t1\t2");
        assert_eq!(lines[1], "P001\tkinase\t1.0\t2.0");
        assert_eq!(lines[2], "P002\tUnknown\t3.0\t4.0");
    }

    #[test]
    fn test_annotate_directory() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = write_file(&dir, "lookup.tsv", "P001\tkinase\n");
        write_file(
            &dir,
            "B_formatted.txt",
            "id\tAnnotation\t1\nP001\t\t1.0\n",
        );
        write_file(
            &dir,
            "A_formatted.txt",
            "id\tAnnotation\t1\nP001\t\t1.0\n",
        );
        write_file(&dir, "notes.txt", "not a table\n");

        let map = AnnotationMap::from_tsv(&lookup).unwrap();
        let outputs = annotate_directory(dir.path(), &map).unwrap();
        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].ends_with("A_annotated.txt"));
        assert!(outputs[1].ends_with("B_annotated.txt"));
        assert!(outputs[0].exists());

        let content = fs::read_to_string(&outputs[0]).unwrap();
        assert!(content.contains("P001\tkinase"));
    }

    #[test]
    fn test_annotate_missing_directory() {
        let map = AnnotationMap {
            entries: [("P001".to_string(), "x".to_string())].into_iter().collect(),
        };
        assert!(matches!(
            annotate_directory("/no/such/dir", &map),
            Err(ProtdiffError::DirectoryNotFound(_))
        ));
    }
}
