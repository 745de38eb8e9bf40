//! Output sink: one text file per exported document

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory of exported documents, written with atomic tmp→rename
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    written: usize,
}

impl FileSink {
    /// Create the directory if absent and open a sink over it
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    /// Write `contents` verbatim to `<dir>/<filename>`, replacing any existing file.
    ///
    /// Returns the final path.
    pub fn write(&mut self, filename: &str, contents: &str) -> io::Result<PathBuf> {
        let final_path = self.dir.join(filename);
        let tmp_path = self.dir.join(format!("{filename}.tmp"));

        let written =
            fs::write(&tmp_path, contents).and_then(|()| fs::rename(&tmp_path, &final_path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        self.written += 1;
        Ok(final_path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files written through this sink
    pub fn written(&self) -> usize {
        self.written
    }
}

/// Remove stale `<prefix>*.tmp` files left behind by an interrupted run.
///
/// Other files in `output_dir` are never touched.
pub fn cleanup_tmp_files(output_dir: &Path, prefix: &str) -> io::Result<()> {
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(".tmp") && entry.file_type()?.is_file() {
            let path = entry.path();
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
