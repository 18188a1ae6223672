//! Shader preset directory
//!
//! Lists the shader presets found in the configured directory so the user
//! can cycle through them at runtime.

use std::io;
use std::path::{Path, PathBuf};

/// File extensions recognised as shaders
pub const SHADER_EXTENSIONS: [&str; 4] = ["cg", "cgp", "glsl", "glslp"];

/// Sorted shader files of one directory plus a cursor
#[derive(Debug, Clone, Default)]
pub struct ShaderDir {
    entries: Vec<PathBuf>,
    index: usize,
}

impl ShaderDir {
    /// Scan `dir`. `Ok(None)` if it holds no shaders.
    pub fn scan(dir: &Path) -> io::Result<Option<Self>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_shader(&path) {
                entries.push(path);
            }
        }

        if entries.is_empty() {
            return Ok(None);
        }

        entries.sort();
        for path in &entries {
            tracing::info!("Found shader \"{}\"", path.display());
        }

        Ok(Some(Self { entries, index: 0 }))
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shader under the cursor
    pub fn current(&self) -> Option<&Path> {
        self.entries.get(self.index).map(PathBuf::as_path)
    }

    /// Advance the cursor, wrapping at the end.
    pub fn next(&mut self) -> Option<&Path> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.entries.len();
        self.current()
    }

    /// Move the cursor back, wrapping at the start.
    pub fn prev(&mut self) -> Option<&Path> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = (self.index + self.entries.len() - 1) % self.entries.len();
        self.current()
    }
}

fn is_shader(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SHADER_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("retroplex-shaders-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = scratch_dir("scan");
        for name in ["crt.glslp", "blur.cg", "notes.txt", "Scale.GLSL"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let mut shaders = ShaderDir::scan(&dir).unwrap().unwrap();
        let names: Vec<_> = shaders
            .entries()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Scale.GLSL", "blur.cg", "crt.glslp"]);

        assert!(shaders.current().unwrap().ends_with("Scale.GLSL"));
        assert!(shaders.prev().unwrap().ends_with("crt.glslp"));
        assert!(shaders.next().unwrap().ends_with("Scale.GLSL"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_directory() {
        let dir = scratch_dir("empty");
        assert!(ShaderDir::scan(&dir).unwrap().is_none());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
