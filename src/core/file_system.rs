/*
 * The filesystem seam consumed by the packing engine. The trait keeps the
 * engine testable against fakes and pins down exactly which primitives the
 * engine relies on; the concrete implementation forwards to `std::fs`, with
 * `walkdir` providing a sorted single-level directory listing so traversal
 * order is deterministic across platforms.
 *
 * All primitives are treated as atomic black boxes. The engine never retries
 * them and interprets any failure as "skip and continue".
 */
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait FileSystemOperations: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_directory(&self, path: &Path) -> bool;

    /*
     * Lists the direct children of `path` (one level, no recursion), sorted
     * by file name. Deeper levels are the engine's business.
     */
    fn list_directory(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    fn create_directories(&self, path: &Path) -> io::Result<()>;

    /*
     * Copies `source` to `destination`, overwriting the destination's bytes
     * if it already exists.
     */
    fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

pub struct CoreFileSystem {}

impl CoreFileSystem {
    pub fn new() -> Self {
        CoreFileSystem {}
    }
}

impl Default for CoreFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemOperations for CoreFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_directory(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            entries.push(entry.into_path());
        }
        Ok(entries)
    }

    fn create_directories(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<()> {
        fs::copy(source, destination).map(|_| ())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
