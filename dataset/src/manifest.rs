//! Manifest parsing and the speaker corpus it describes.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DatasetError, Result};

/// Audio files with their integer speaker labels.
///
/// Labels are assigned in first-seen order. Once a speaker string has an id,
/// the id never changes.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    files: Vec<PathBuf>,
    labels: Vec<usize>,
    label_names: Vec<String>,
    label_ids: HashMap<String, usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a manifest, joining each listed path to `base_path`.
    pub fn load(manifest: impl AsRef<Path>, base_path: impl AsRef<Path>) -> Result<Self> {
        let manifest = manifest.as_ref();
        let file = File::open(manifest).map_err(|e| DatasetError::io(manifest, e))?;
        let corpus = Self::from_reader(BufReader::new(file), base_path, manifest)?;
        info!(
            manifest = %manifest.display(),
            files = corpus.len(),
            classes = corpus.nb_classes(),
            "loaded manifest"
        );
        Ok(corpus)
    }

    /// Parses `<label> <relative_path>` lines. `source` only labels errors.
    pub fn from_reader<R: BufRead>(
        reader: R,
        base_path: impl AsRef<Path>,
        source: impl AsRef<Path>,
    ) -> Result<Self> {
        let base_path = base_path.as_ref();
        let mut corpus = Self::new();

        for (n, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| DatasetError::io(source.as_ref(), e))?;
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (None, _, _) => continue,
                (Some(label), Some(path), None) => {
                    corpus.push(label, base_path.join(path));
                }
                _ => {
                    return Err(DatasetError::Manifest {
                        path: source.as_ref().to_path_buf(),
                        line: n + 1,
                        content: line,
                    });
                }
            }
        }
        Ok(corpus)
    }

    /// Appends a file, assigning a new id if the speaker is unseen.
    /// Returns the speaker's id.
    pub fn push(&mut self, label: &str, path: PathBuf) -> usize {
        let id = match self.label_ids.get(label) {
            Some(&id) => id,
            None => {
                let id = self.label_names.len();
                self.label_ids.insert(label.to_string(), id);
                self.label_names.push(label.to_string());
                id
            }
        };
        self.files.push(path);
        self.labels.push(id);
        id
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Speaker strings indexed by id.
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub fn label_id(&self, label: &str) -> Option<usize> {
        self.label_ids.get(label).copied()
    }

    pub fn nb_classes(&self) -> usize {
        self.label_names.len()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
