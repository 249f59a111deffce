use std::fs;
use std::path::PathBuf;

use crate::error::DrillError;

/// Where the list of word book names comes from.
#[derive(Clone, Debug)]
pub enum Manifest {
    /// Re-read on every call to [`Manifest::entries`].
    File(PathBuf),
    Inline(Vec<String>),
}

impl Manifest {
    pub fn entries(&self) -> Result<Vec<String>, DrillError> {
        match self {
            Manifest::File(path) => {
                let bytes = fs::read(path).map_err(|source| DrillError::ManifestUnreadable {
                    path: path.clone(),
                    source,
                })?;
                Ok(parse_manifest(&String::from_utf8_lossy(&bytes)))
            }
            Manifest::Inline(names) => Ok(names.clone()),
        }
    }
}

/// One name per line. Blank lines and `#` lines are ignored.
pub fn parse_manifest(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
