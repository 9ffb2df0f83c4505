//! Discovery of annotated abundance tables and condition-pair enumeration.

use crate::error::{ProtdiffError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File-name suffix a table must carry to be picked up by a run.
pub const ANNOTATED_SUFFIX: &str = "annotated.txt";

/// How condition pairs are enumerated from N discovered tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PairOrder {
    /// Each unordered pair once: N(N-1)/2 comparisons.
    #[default]
    Unordered,
    /// Both orientations of every pair: N(N-1) comparisons.
    Mirrored,
}

impl PairOrder {
    pub fn name(&self) -> &'static str {
        match self {
            PairOrder::Unordered => "unordered",
            PairOrder::Mirrored => "mirrored",
        }
    }
}

/// List the annotated tables in a directory, sorted by file name.
///
/// Only regular files whose name ends in [`ANNOTATED_SUFFIX`] are
/// returned. The sort keeps pair enumeration deterministic across
/// platforms.
pub fn annotated_tables<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ProtdiffError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut tables: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_annotated = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(ANNOTATED_SUFFIX))
            .unwrap_or(false);
        if is_annotated {
            tables.push(path);
        }
    }
    tables.sort();
    Ok(tables)
}

/// Index pairs for N tables under the given enumeration order.
pub fn pair_indices(n: usize, order: PairOrder) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    match order {
        PairOrder::Unordered => {
            for i in 0..n {
                for j in (i + 1)..n {
                    pairs.push((i, j));
                }
            }
        }
        PairOrder::Mirrored => {
            for i in 0..n {
                for j in 0..n {
                    if i != j {
                        pairs.push((i, j));
                    }
                }
            }
        }
    }
    pairs
}

/// Discover annotated tables in a directory and enumerate their pairs.
pub fn enumerate_pairs<P: AsRef<Path>>(
    dir: P,
    order: PairOrder,
) -> Result<Vec<(PathBuf, PathBuf)>> {
    let tables = annotated_tables(dir)?;
    let pairs = pair_indices(tables.len(), order)
        .into_iter()
        .map(|(i, j)| (tables[i].clone(), tables[j].clone()))
        .collect();
    Ok(pairs)
}
