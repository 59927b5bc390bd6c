//! Weighted sets of resource files (fonts, textures) discovered on disk.

use std::path::{Path, PathBuf};

use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{Categorical, SynthRng, int_inclusive};

/// Resource files grouped by the configured path that produced them.
///
/// A configured file contributes itself; a directory contributes every file below it whose
/// extension is in the accepted list, in sorted order.
#[derive(Clone, Debug)]
pub struct ResourceSet {
    roots: Vec<PathBuf>,
    files: Vec<Vec<PathBuf>>,
    choice: Option<Categorical>,
}

impl ResourceSet {
    /// Scan `paths`; a path that does not exist is a configuration error.
    pub fn scan(paths: &[PathBuf], weights: Option<&[f64]>, exts: &[&str]) -> SynthResult<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for root in paths {
            if !root.exists() {
                return Err(SynthError::config(format!(
                    "resource path {} does not exist",
                    root.display()
                )));
            }
            let mut found = Vec::new();
            if root.is_dir() {
                collect(root, exts, &mut found)?;
                found.sort();
            } else {
                found.push(root.clone());
            }
            files.push(found);
        }
        Self::from_groups(paths.to_vec(), files, weights)
    }

    /// Build from explicit groups; `roots` names each group in error messages.
    pub fn from_groups(
        roots: Vec<PathBuf>,
        files: Vec<Vec<PathBuf>>,
        weights: Option<&[f64]>,
    ) -> SynthResult<Self> {
        let choice = if files.is_empty() {
            None
        } else {
            Some(Categorical::new(files.len(), weights)?)
        };
        Ok(Self {
            roots,
            files,
            choice,
        })
    }

    /// Every file of every group.
    pub fn groups(&self) -> &[Vec<PathBuf>] {
        &self.files
    }

    /// Draw a group by weight; an empty configuration or an empty group is a configuration error.
    pub fn pick_group(&self, rng: &mut SynthRng) -> SynthResult<(usize, &[PathBuf])> {
        let choice = self
            .choice
            .as_ref()
            .ok_or_else(|| SynthError::config("no resource paths configured"))?;
        let key = choice.sample(rng);
        let files = &self.files[key];
        if files.is_empty() {
            return Err(SynthError::config(format!(
                "no resources found under {}",
                self.roots
                    .get(key)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            )));
        }
        Ok((key, files))
    }

    /// Draw a group by weight, then a file uniformly inside it.
    pub fn pick(&self, rng: &mut SynthRng) -> SynthResult<PathBuf> {
        let (_, files) = self.pick_group(rng)?;
        let idx = int_inclusive(rng, (0, files.len() as i64 - 1)) as usize;
        Ok(files[idx].clone())
    }
}

fn collect(dir: &Path, exts: &[&str], out: &mut Vec<PathBuf>) -> SynthResult<()> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SynthError::config(format!("read dir {}: {e}", dir.display())))?;
    for entry in entries {
        let path = entry
            .map_err(|e| SynthError::config(format!("read dir {}: {e}", dir.display())))?
            .path();
        if path.is_dir() {
            collect(&path, exts, out)?;
        } else if has_ext(&path, exts) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_ext(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
#[path = "../../tests/unit/components/resource.rs"]
mod tests;
