/*
 * The packing engine and its persisted settings. A `Packer` holds the rule
 * set (paths, pack mode, extension list, filename transforms, flags) and
 * packs files by walking the read directory depth-first, deciding per file
 * whether to copy or move it into the mirrored write tree.
 *
 * The engine itself is stateless between runs: every `pack_files` call is a
 * single synchronous traversal whose only per-frame state is whether the
 * destination directory for that frame has been created yet. Per-file
 * failures never abort a run; packing is best-effort file by file.
 *
 * Paths are handled as strings with '/' separators so the textual rules in
 * `path_utils` (suffix removal, extension adjustment) apply uniformly;
 * filesystem access goes through the `FileSystemOperations` seam.
 */
use super::config_file::{self, ConfigFile};
use super::file_system::{CoreFileSystem, FileSystemOperations};
use super::obfuscation::ObfuscationKey;
use super::path_utils;
use super::value::Value;
use std::path::Path;

pub const DEFAULT_READ_PATH: &str = "";
pub const DEFAULT_WRITE_PATH: &str = "";
pub const DEFAULT_PACK_MODE: PackMode = PackMode::Include;
pub const DEFAULT_OVERWRITE_FILES: bool = false;
pub const DEFAULT_MOVE_FILES: bool = false;
pub const DEFAULT_SUFFIX_STRING: &str = "";
pub const DEFAULT_SUFFIX_ENABLED: bool = false;
pub const DEFAULT_EXTENSION_INSENSITIVE: bool = false;
pub const DEFAULT_EXTENSION_ADJUST: ExtensionAdjust = ExtensionAdjust::Default;
pub const DEFAULT_IGNORE_FILE_NAME: &str = ".pkignore";
pub const DEFAULT_IGNORE_FILE_ENABLED: bool = true;
pub const DEFAULT_LOG_ENABLED: bool = true;

/*
 * Which files are selected for packing: an allow-list by extension, a
 * deny-list by extension, or everything regardless of extension.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackMode {
    Include,
    Exclude,
    Everything,
}

impl PackMode {
    pub fn name(self) -> &'static str {
        match self {
            PackMode::Include => "include",
            PackMode::Exclude => "exclude",
            PackMode::Everything => "everything",
        }
    }

    pub fn find(name: &str) -> Option<PackMode> {
        match name {
            "include" => Some(PackMode::Include),
            "exclude" => Some(PackMode::Exclude),
            "everything" => Some(PackMode::Everything),
            _ => None,
        }
    }

    pub fn ordinal(self) -> i64 {
        match self {
            PackMode::Include => 0,
            PackMode::Exclude => 1,
            PackMode::Everything => 2,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<PackMode> {
        match ordinal {
            0 => Some(PackMode::Include),
            1 => Some(PackMode::Exclude),
            2 => Some(PackMode::Everything),
            _ => None,
        }
    }
}

/*
 * Post-copy casing transform for the destination filename's extension.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionAdjust {
    Default,
    Lower,
    Upper,
}

impl ExtensionAdjust {
    pub fn name(self) -> &'static str {
        match self {
            ExtensionAdjust::Default => "default",
            ExtensionAdjust::Lower => "lower",
            ExtensionAdjust::Upper => "upper",
        }
    }

    pub fn find(name: &str) -> Option<ExtensionAdjust> {
        match name {
            "default" => Some(ExtensionAdjust::Default),
            "lower" => Some(ExtensionAdjust::Lower),
            "upper" => Some(ExtensionAdjust::Upper),
            _ => None,
        }
    }

    pub fn ordinal(self) -> i64 {
        match self {
            ExtensionAdjust::Default => 0,
            ExtensionAdjust::Lower => 1,
            ExtensionAdjust::Upper => 2,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<ExtensionAdjust> {
        match ordinal {
            0 => Some(ExtensionAdjust::Default),
            1 => Some(ExtensionAdjust::Lower),
            2 => Some(ExtensionAdjust::Upper),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum PackError {
    Unconfigured(&'static str),
    DoesNotExist(String),
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::Unconfigured(setting) => {
                write!(f, "Required setting '{setting}' is not configured")
            }
            PackError::DoesNotExist(path) => write!(f, "Read path '{path}' does not exist"),
        }
    }
}

impl std::error::Error for PackError {}

pub type Result<T> = std::result::Result<T, PackError>;

/*
 * Observer for completed transfers. Injected into the engine call so there
 * is no hidden global state; a run without an interested observer passes a
 * no-op handler.
 */
pub trait PackEventHandler {
    fn on_transfer(&mut self, source: &Path, destination: &Path, moved: bool);
}

struct NullPackEventHandler;

impl PackEventHandler for NullPackEventHandler {
    fn on_transfer(&mut self, _source: &Path, _destination: &Path, _moved: bool) {}
}

// Per-file result of the decide/transform/write pipeline. Internal only; the
// public contract stays a single aggregate Result per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Copied,
    Moved,
    SkippedExists,
    SkippedFilter,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Packer {
    read_path: String,
    write_path: String,
    extensions: Vec<String>,
    pack_mode: PackMode,
    overwrite_files: bool,
    move_files: bool,
    suffix_string: String,
    suffix_enabled: bool,
    extension_insensitive: bool,
    extension_adjust: ExtensionAdjust,
    ignore_file_name: String,
    ignore_file_enabled: bool,
    log_enabled: bool,
}

impl Default for Packer {
    fn default() -> Self {
        Self::new()
    }
}

impl Packer {
    pub fn new() -> Self {
        Packer {
            read_path: DEFAULT_READ_PATH.to_string(),
            write_path: DEFAULT_WRITE_PATH.to_string(),
            extensions: Vec::new(),
            pack_mode: DEFAULT_PACK_MODE,
            overwrite_files: DEFAULT_OVERWRITE_FILES,
            move_files: DEFAULT_MOVE_FILES,
            suffix_string: DEFAULT_SUFFIX_STRING.to_string(),
            suffix_enabled: DEFAULT_SUFFIX_ENABLED,
            extension_insensitive: DEFAULT_EXTENSION_INSENSITIVE,
            extension_adjust: DEFAULT_EXTENSION_ADJUST,
            ignore_file_name: DEFAULT_IGNORE_FILE_NAME.to_string(),
            ignore_file_enabled: DEFAULT_IGNORE_FILE_ENABLED,
            log_enabled: DEFAULT_LOG_ENABLED,
        }
    }

    pub fn set_read_path(&mut self, path: &str) {
        self.read_path = path.to_string();
    }

    pub fn read_path(&self) -> &str {
        &self.read_path
    }

    pub fn set_write_path(&mut self, path: &str) {
        self.write_path = path.to_string();
    }

    pub fn write_path(&self) -> &str {
        &self.write_path
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /*
     * Adds an extension to the list, preserving the case the caller typed.
     * Returns false when the exact extension is already present.
     */
    pub fn add_extension(&mut self, extension: &str) -> bool {
        if self.has_extension(extension) {
            return false;
        }
        self.extensions.push(extension.to_string());
        true
    }

    pub fn remove_extension(&mut self, extension: &str) -> bool {
        match self.extensions.iter().position(|e| e == extension) {
            Some(index) => {
                self.extensions.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }

    pub fn clear_extensions(&mut self) {
        self.extensions.clear();
    }

    pub fn set_pack_mode(&mut self, mode: PackMode) {
        self.pack_mode = mode;
    }

    pub fn pack_mode(&self) -> PackMode {
        self.pack_mode
    }

    pub fn set_overwrite_files(&mut self, enable: bool) {
        self.overwrite_files = enable;
    }

    pub fn overwrite_files(&self) -> bool {
        self.overwrite_files
    }

    pub fn set_move_files(&mut self, enable: bool) {
        self.move_files = enable;
    }

    pub fn move_files(&self) -> bool {
        self.move_files
    }

    pub fn set_suffix_string(&mut self, suffix: &str) {
        self.suffix_string = suffix.to_string();
    }

    pub fn suffix_string(&self) -> &str {
        &self.suffix_string
    }

    pub fn set_suffix_enabled(&mut self, enable: bool) {
        self.suffix_enabled = enable;
    }

    pub fn suffix_enabled(&self) -> bool {
        self.suffix_enabled
    }

    pub fn set_extension_insensitive(&mut self, enable: bool) {
        self.extension_insensitive = enable;
    }

    pub fn extension_insensitive(&self) -> bool {
        self.extension_insensitive
    }

    pub fn set_extension_adjust(&mut self, adjust: ExtensionAdjust) {
        self.extension_adjust = adjust;
    }

    pub fn extension_adjust(&self) -> ExtensionAdjust {
        self.extension_adjust
    }

    pub fn set_ignore_file_name(&mut self, name: &str) {
        self.ignore_file_name = name.to_string();
    }

    pub fn ignore_file_name(&self) -> &str {
        &self.ignore_file_name
    }

    pub fn set_ignore_file_enabled(&mut self, enable: bool) {
        self.ignore_file_enabled = enable;
    }

    pub fn ignore_file_enabled(&self) -> bool {
        self.ignore_file_enabled
    }

    pub fn set_log_enabled(&mut self, enable: bool) {
        self.log_enabled = enable;
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }

    pub fn to_config_file(&self, file: &mut ConfigFile) {
        file.set_value("read_path", self.read_path.as_str());
        file.set_value("write_path", self.write_path.as_str());
        file.set_value("extensions", self.extensions.clone());
        file.set_value("pack_mode", self.pack_mode.ordinal());
        file.set_value("overwrite_files", self.overwrite_files);
        file.set_value("move_files", self.move_files);
        file.set_value("suffix_string", self.suffix_string.as_str());
        file.set_value("suffix_enabled", self.suffix_enabled);
        file.set_value("extension_insensitive", self.extension_insensitive);
        file.set_value("extension_adjust", self.extension_adjust.ordinal());
        file.set_value("ignore_file_name", self.ignore_file_name.as_str());
        file.set_value("ignore_file_enabled", self.ignore_file_enabled);
        file.set_value("log_enabled", self.log_enabled);
    }

    /*
     * Restores settings from a config file. Missing keys fall back to the
     * documented defaults, mismatched payloads read as zero values, and an
     * out-of-range enum ordinal falls back to the default mode rather than
     * failing the load.
     */
    pub fn from_config_file(&mut self, file: &ConfigFile) {
        self.read_path = file
            .get_value("read_path", Value::from(DEFAULT_READ_PATH))
            .as_str()
            .to_string();
        self.write_path = file
            .get_value("write_path", Value::from(DEFAULT_WRITE_PATH))
            .as_str()
            .to_string();
        self.extensions = file
            .get_value("extensions", Value::from(Vec::<String>::new()))
            .as_string_list()
            .to_vec();
        self.pack_mode = PackMode::from_ordinal(
            file.get_value("pack_mode", Value::from(DEFAULT_PACK_MODE.ordinal()))
                .as_int(),
        )
        .unwrap_or(DEFAULT_PACK_MODE);
        self.overwrite_files = file
            .get_value("overwrite_files", Value::from(DEFAULT_OVERWRITE_FILES))
            .as_bool();
        self.move_files = file
            .get_value("move_files", Value::from(DEFAULT_MOVE_FILES))
            .as_bool();
        self.suffix_string = file
            .get_value("suffix_string", Value::from(DEFAULT_SUFFIX_STRING))
            .as_str()
            .to_string();
        self.suffix_enabled = file
            .get_value("suffix_enabled", Value::from(DEFAULT_SUFFIX_ENABLED))
            .as_bool();
        self.extension_insensitive = file
            .get_value(
                "extension_insensitive",
                Value::from(DEFAULT_EXTENSION_INSENSITIVE),
            )
            .as_bool();
        self.extension_adjust = ExtensionAdjust::from_ordinal(
            file.get_value(
                "extension_adjust",
                Value::from(DEFAULT_EXTENSION_ADJUST.ordinal()),
            )
            .as_int(),
        )
        .unwrap_or(DEFAULT_EXTENSION_ADJUST);
        self.ignore_file_name = file
            .get_value("ignore_file_name", Value::from(DEFAULT_IGNORE_FILE_NAME))
            .as_str()
            .to_string();
        self.ignore_file_enabled = file
            .get_value(
                "ignore_file_enabled",
                Value::from(DEFAULT_IGNORE_FILE_ENABLED),
            )
            .as_bool();
        self.log_enabled = file
            .get_value("log_enabled", Value::from(DEFAULT_LOG_ENABLED))
            .as_bool();
    }

    pub fn save(&self, path: &Path) -> config_file::Result<()> {
        let mut file = ConfigFile::new();
        self.to_config_file(&mut file);
        file.save(path)
    }

    pub fn load(&mut self, path: &Path) -> config_file::Result<()> {
        let mut file = ConfigFile::new();
        file.load(path)?;
        self.from_config_file(&file);
        Ok(())
    }

    pub fn save_obfuscated(&self, path: &Path, key: &ObfuscationKey) -> config_file::Result<()> {
        let mut file = ConfigFile::new();
        self.to_config_file(&mut file);
        file.save_obfuscated(path, key)
    }

    pub fn load_obfuscated(&mut self, path: &Path, key: &ObfuscationKey) -> config_file::Result<()> {
        let mut file = ConfigFile::new();
        file.load_obfuscated(path, key)?;
        self.from_config_file(&file);
        Ok(())
    }

    /*
     * Resets every setting to its documented default.
     */
    pub fn revert_state(&mut self) {
        *self = Packer::new();
    }

    /*
     * Runs a pack with the real filesystem and no observer.
     */
    pub fn pack_files(&self) -> Result<()> {
        self.pack_files_with(&CoreFileSystem::new(), &mut NullPackEventHandler)
    }

    /*
     * Runs a pack against the given filesystem, notifying `handler` once per
     * transferred file.
     *
     * Preconditions are validated before any filesystem access: both paths
     * must be configured, and include mode additionally requires a non-empty
     * extension list. A read path that exists but is not a directory
     * re-targets to its containing directory, so handing the packer a file
     * path packs that file's folder.
     *
     * Once validation passes the run always completes and returns Ok: a file
     * that cannot be copied is skipped and traversal continues with the next
     * sibling.
     */
    pub fn pack_files_with(
        &self,
        fs: &dyn FileSystemOperations,
        handler: &mut dyn PackEventHandler,
    ) -> Result<()> {
        if self.read_path.is_empty() {
            return Err(PackError::Unconfigured("read_path"));
        }
        if self.write_path.is_empty() {
            return Err(PackError::Unconfigured("write_path"));
        }
        if self.pack_mode == PackMode::Include && self.extensions.is_empty() {
            return Err(PackError::Unconfigured("extensions"));
        }

        let mut read_path = self.read_path.clone();
        path_utils::normalize_path_separators(&mut read_path);

        if !fs.exists(Path::new(&read_path)) {
            return Err(PackError::DoesNotExist(read_path));
        }

        if !fs.is_directory(Path::new(&read_path)) {
            read_path = Path::new(&read_path)
                .parent()
                .map(|parent| parent.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        let mut write_path = self.write_path.clone();
        path_utils::normalize_path_separators(&mut write_path);

        // The write tree is created lazily, directory by directory, only
        // when a file is actually about to be written there.
        self._pack_files(fs, handler, &read_path, &write_path);

        Ok(())
    }

    fn _pack_files(
        &self,
        fs: &dyn FileSystemOperations,
        handler: &mut dyn PackEventHandler,
        read_dir: &str,
        write_dir: &str,
    ) {
        if self.ignore_file_enabled
            && !self.ignore_file_name.is_empty()
            && fs.is_directory(Path::new(read_dir))
        {
            let marker = format!("{read_dir}/{}", self.ignore_file_name);
            if fs.exists(Path::new(&marker)) {
                log::debug!("Packer: Skipping '{read_dir}', ignore marker present.");
                return;
            }
        }

        let mut write_directory_exists = false;

        let entries = match fs.list_directory(Path::new(read_dir)) {
            Ok(entries) => entries,
            Err(error) => {
                log::warn!("Packer: Cannot read directory '{read_dir}': {error}");
                return;
            }
        };

        for entry in entries {
            let mut read_path = entry.to_string_lossy().into_owned();
            path_utils::normalize_path_separators(&mut read_path);

            if fs.is_directory(Path::new(&read_path)) {
                // Recurse unconditionally; empty output directories are
                // neither created (creation is deferred to the first write)
                // nor pruned afterwards.
                let segment_start = read_path.rfind('/').unwrap_or(0);
                let child_write_dir = format!("{write_dir}{}", &read_path[segment_start..]);
                self._pack_files(fs, handler, &read_path, &child_write_dir);
            } else {
                let outcome = self._pack_file(
                    fs,
                    handler,
                    &read_path,
                    write_dir,
                    &mut write_directory_exists,
                );
                if outcome == FileOutcome::Failed {
                    log::debug!("Packer: Skipped '{read_path}' after a failed copy.");
                }
            }
        }
    }

    fn _pack_file(
        &self,
        fs: &dyn FileSystemOperations,
        handler: &mut dyn PackEventHandler,
        read_path: &str,
        write_dir: &str,
        write_directory_exists: &mut bool,
    ) -> FileOutcome {
        if self.pack_mode != PackMode::Everything && self.skip_by_extension(read_path) {
            return FileOutcome::SkippedFilter;
        }

        let name_start = read_path.rfind('/').unwrap_or(0);
        let mut write_path = format!("{write_dir}{}", &read_path[name_start..]);

        if self.suffix_enabled {
            path_utils::remove_path_suffix(&mut write_path, &self.suffix_string);
        }

        if self.extension_adjust != ExtensionAdjust::Default {
            // A destination without any dot adjusts from the start of the
            // string; everything after the last dot otherwise.
            let ext_start = write_path.rfind('.').map_or(0, |position| position + 1);
            let adjusted = match self.extension_adjust {
                ExtensionAdjust::Lower => write_path[ext_start..].to_ascii_lowercase(),
                _ => write_path[ext_start..].to_ascii_uppercase(),
            };
            write_path.replace_range(ext_start.., &adjusted);
        }

        // An existing destination counts as already packed, not as an error.
        if !self.overwrite_files && fs.exists(Path::new(&write_path)) {
            return FileOutcome::SkippedExists;
        }

        if !*write_directory_exists {
            *write_directory_exists = true;
            if let Err(error) = fs.create_directories(Path::new(write_dir)) {
                log::warn!("Packer: Cannot create directory '{write_dir}': {error}");
            }
        }

        if fs
            .copy_file(Path::new(read_path), Path::new(&write_path))
            .is_err()
        {
            return FileOutcome::Failed;
        }

        if self.move_files {
            if let Err(error) = fs.remove_file(Path::new(read_path)) {
                log::warn!("Packer: Copied but could not remove '{read_path}': {error}");
            }
        }

        handler.on_transfer(
            Path::new(read_path),
            Path::new(&write_path),
            self.move_files,
        );

        if self.log_enabled {
            log::info!(
                "{} {read_path} to {write_path}",
                if self.move_files { "Moved" } else { "Copied" }
            );
        }

        if self.move_files {
            FileOutcome::Moved
        } else {
            FileOutcome::Copied
        }
    }

    /*
     * Decides whether the extension filter drops this file. The extension is
     * everything after the last dot of the full read path; a path with no
     * dot at all stands in whole for its extension, so extension-less files
     * only ever match rules that happen to equal the entire path.
     */
    fn skip_by_extension(&self, read_path: &str) -> bool {
        let ext_start = read_path.rfind('.').map_or(0, |position| position + 1);
        let extension = &read_path[ext_start..];

        let mut skip_file = self.pack_mode == PackMode::Include;

        if self.extension_insensitive {
            let extension = extension.to_ascii_lowercase();
            for configured in &self.extensions {
                if extension == configured.to_ascii_lowercase() {
                    skip_file = self.pack_mode == PackMode::Exclude;
                    break;
                }
            }
        } else {
            for configured in &self.extensions {
                if extension == configured.as_str() {
                    skip_file = self.pack_mode == PackMode::Exclude;
                    break;
                }
            }
        }

        skip_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    struct RecordingHandler {
        transfers: Vec<(PathBuf, PathBuf, bool)>,
    }

    impl RecordingHandler {
        fn new() -> Self {
            RecordingHandler {
                transfers: Vec::new(),
            }
        }
    }

    impl PackEventHandler for RecordingHandler {
        fn on_transfer(&mut self, source: &Path, destination: &Path, moved: bool) {
            self.transfers
                .push((source.to_path_buf(), destination.to_path_buf(), moved));
        }
    }

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn make_packer(read_dir: &Path, write_dir: &Path) -> Packer {
        let mut packer = Packer::new();
        packer.set_read_path(&read_dir.to_string_lossy());
        packer.set_write_path(&write_dir.to_string_lossy());
        packer.set_ignore_file_enabled(false);
        packer.set_log_enabled(false);
        packer
    }

    #[test]
    fn test_pack_mode_and_adjust_names_round_trip() {
        for mode in [PackMode::Include, PackMode::Exclude, PackMode::Everything] {
            assert_eq!(PackMode::find(mode.name()), Some(mode));
            assert_eq!(PackMode::from_ordinal(mode.ordinal()), Some(mode));
        }
        assert_eq!(PackMode::find("bogus"), None);
        assert_eq!(PackMode::from_ordinal(9), None);

        for adjust in [
            ExtensionAdjust::Default,
            ExtensionAdjust::Lower,
            ExtensionAdjust::Upper,
        ] {
            assert_eq!(ExtensionAdjust::find(adjust.name()), Some(adjust));
            assert_eq!(ExtensionAdjust::from_ordinal(adjust.ordinal()), Some(adjust));
        }
    }

    #[test]
    fn test_unconfigured_paths_fail_before_any_traversal() {
        let packer = Packer::new();
        assert!(matches!(
            packer.pack_files(),
            Err(PackError::Unconfigured("read_path"))
        ));

        let mut packer = Packer::new();
        packer.set_read_path("somewhere");
        assert!(matches!(
            packer.pack_files(),
            Err(PackError::Unconfigured("write_path"))
        ));

        // Include mode additionally requires extensions.
        packer.set_write_path("elsewhere");
        packer.set_pack_mode(PackMode::Include);
        assert!(matches!(
            packer.pack_files(),
            Err(PackError::Unconfigured("extensions"))
        ));
    }

    #[test]
    fn test_missing_read_path_is_does_not_exist() {
        let dir = tempdir().unwrap();
        let mut packer = make_packer(&dir.path().join("not_there"), &dir.path().join("out"));
        packer.set_pack_mode(PackMode::Everything);
        assert!(matches!(
            packer.pack_files(),
            Err(PackError::DoesNotExist(_))
        ));
    }

    #[test]
    fn test_everything_mode_packs_files_verbatim() {
        // Scenario: two files, no filter, no transforms; both names appear
        // unchanged in the write directory.
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("lower_case(1).txt"), "a");
        write_file(&read_dir.join("UPPER_CASE(1).TXT"), "b");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Everything);
        packer.pack_files().unwrap();

        assert!(write_dir.join("lower_case(1).txt").exists());
        assert!(write_dir.join("UPPER_CASE(1).TXT").exists());
        assert!(read_dir.join("lower_case(1).txt").exists());
    }

    #[test]
    fn test_include_mode_with_suffix_removal() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("lower_case(1).txt"), "a");
        write_file(&read_dir.join("UPPER_CASE(1).TXT"), "b");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Include);
        packer.add_extension("txt");
        packer.add_extension("TXT");
        packer.set_suffix_enabled(true);
        packer.set_suffix_string("(1)");
        packer.pack_files().unwrap();

        assert!(write_dir.join("lower_case.txt").exists());
        assert!(write_dir.join("UPPER_CASE.TXT").exists());
        assert!(!write_dir.join("lower_case(1).txt").exists());
    }

    #[test]
    fn test_include_mode_with_suffix_removal_and_upper_adjust() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("lower_case(1).txt"), "a");
        write_file(&read_dir.join("UPPER_CASE(1).TXT"), "b");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Include);
        packer.add_extension("txt");
        packer.add_extension("TXT");
        packer.set_suffix_enabled(true);
        packer.set_suffix_string("(1)");
        packer.set_extension_adjust(ExtensionAdjust::Upper);
        packer.pack_files().unwrap();

        assert!(write_dir.join("lower_case.TXT").exists());
        assert!(write_dir.join("UPPER_CASE.TXT").exists());
    }

    #[test]
    fn test_exclude_mode_creates_no_destination_directory() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("lower_case(1).txt"), "a");
        write_file(&read_dir.join("UPPER_CASE(1).TXT"), "b");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Exclude);
        packer.add_extension("txt");
        packer.add_extension("TXT");
        packer.pack_files().unwrap();

        // Both files are excluded, so no write occurred and directory
        // creation was never triggered.
        assert!(!write_dir.exists());
    }

    #[test]
    fn test_include_filter_case_sensitivity() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("a.TXT"), "content");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Include);
        packer.add_extension("txt");

        packer.pack_files().unwrap();
        assert!(!write_dir.join("a.TXT").exists());

        packer.set_extension_insensitive(true);
        packer.pack_files().unwrap();
        assert!(write_dir.join("a.TXT").exists());
    }

    #[test]
    fn test_extension_less_file_is_filtered_in_include_mode() {
        // A file with no dot stands in whole for its extension, so it never
        // matches an ordinary extension rule.
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("README"), "docs");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Include);
        packer.add_extension("txt");
        packer.pack_files().unwrap();
        assert!(!write_dir.join("README").exists());

        packer.set_pack_mode(PackMode::Everything);
        packer.pack_files().unwrap();
        assert!(write_dir.join("README").exists());
    }

    #[test]
    fn test_overwrite_gating() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        let source = read_dir.join("file.txt");
        let destination = write_dir.join("file.txt");
        write_file(&source, "original");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Everything);
        packer.pack_files().unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "original");

        // With overwrite disabled the second run leaves the destination
        // untouched, even though the source changed.
        write_file(&source, "changed");
        packer.pack_files().unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "original");

        packer.set_overwrite_files(true);
        packer.pack_files().unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "changed");
    }

    #[test]
    fn test_move_files_removes_source() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("file.txt"), "payload");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Everything);
        packer.set_move_files(true);
        packer.pack_files().unwrap();

        assert!(!read_dir.join("file.txt").exists());
        assert_eq!(
            fs::read_to_string(write_dir.join("file.txt")).unwrap(),
            "payload"
        );
    }

    #[test]
    fn test_subdirectories_are_mirrored() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("top.txt"), "1");
        write_file(&read_dir.join("sub").join("inner.txt"), "2");
        write_file(&read_dir.join("sub").join("deeper").join("leaf.txt"), "3");
        fs::create_dir_all(read_dir.join("empty_dir")).unwrap();

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Everything);
        packer.pack_files().unwrap();

        assert!(write_dir.join("top.txt").exists());
        assert!(write_dir.join("sub").join("inner.txt").exists());
        assert!(write_dir.join("sub").join("deeper").join("leaf.txt").exists());
        // A subtree with nothing to write produces no destination directory.
        assert!(!write_dir.join("empty_dir").exists());
    }

    #[test]
    fn test_ignore_marker_skips_directory_and_subtree() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("keep.txt"), "kept");
        write_file(&read_dir.join("skipped").join(".pkignore"), "");
        write_file(&read_dir.join("skipped").join("a.txt"), "a");
        write_file(&read_dir.join("skipped").join("deeper").join("b.txt"), "b");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Everything);
        packer.set_ignore_file_enabled(true);
        packer.pack_files().unwrap();

        assert!(write_dir.join("keep.txt").exists());
        // The marker stops the whole subtree, including subdirectories that
        // carry no marker of their own.
        assert!(!write_dir.join("skipped").exists());
    }

    #[test]
    fn test_file_read_path_packs_containing_directory() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("one.txt"), "1");
        write_file(&read_dir.join("two.txt"), "2");

        let mut packer = make_packer(&read_dir.join("one.txt"), &write_dir);
        packer.set_pack_mode(PackMode::Everything);
        packer.pack_files().unwrap();

        assert!(write_dir.join("one.txt").exists());
        assert!(write_dir.join("two.txt").exists());
    }

    #[test]
    fn test_event_handler_sees_each_transfer() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("a.txt"), "a");
        write_file(&read_dir.join("b.txt"), "b");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Everything);

        let mut handler = RecordingHandler::new();
        packer
            .pack_files_with(&CoreFileSystem::new(), &mut handler)
            .unwrap();

        assert_eq!(handler.transfers.len(), 2);
        for (source, destination, moved) in &handler.transfers {
            assert!(source.exists());
            assert!(destination.exists());
            assert!(!moved);
        }
    }

    #[test]
    fn test_skipped_files_do_not_reach_the_handler() {
        let dir = tempdir().unwrap();
        let read_dir = dir.path().join("read");
        let write_dir = dir.path().join("write");
        write_file(&read_dir.join("a.txt"), "a");
        write_file(&write_dir.join("a.txt"), "pre-existing");

        let mut packer = make_packer(&read_dir, &write_dir);
        packer.set_pack_mode(PackMode::Everything);

        let mut handler = RecordingHandler::new();
        packer
            .pack_files_with(&CoreFileSystem::new(), &mut handler)
            .unwrap();

        assert!(handler.transfers.is_empty());
        assert_eq!(
            fs::read_to_string(write_dir.join("a.txt")).unwrap(),
            "pre-existing"
        );
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("packer.cfg");

        let mut packer = Packer::new();
        packer.set_read_path("/data/in");
        packer.set_write_path("/data/out");
        packer.add_extension("txt");
        packer.add_extension("TXT");
        packer.set_pack_mode(PackMode::Exclude);
        packer.set_overwrite_files(true);
        packer.set_move_files(true);
        packer.set_suffix_string("(1)");
        packer.set_suffix_enabled(true);
        packer.set_extension_insensitive(true);
        packer.set_extension_adjust(ExtensionAdjust::Lower);
        packer.set_ignore_file_name(".skip");
        packer.set_ignore_file_enabled(false);
        packer.set_log_enabled(false);

        packer.save(&path).unwrap();

        let mut loaded = Packer::new();
        loaded.load(&path).unwrap();

        assert_eq!(loaded.read_path(), "/data/in");
        assert_eq!(loaded.write_path(), "/data/out");
        assert_eq!(loaded.extensions(), ["txt", "TXT"]);
        assert_eq!(loaded.pack_mode(), PackMode::Exclude);
        assert!(loaded.overwrite_files());
        assert!(loaded.move_files());
        assert_eq!(loaded.suffix_string(), "(1)");
        assert!(loaded.suffix_enabled());
        assert!(loaded.extension_insensitive());
        assert_eq!(loaded.extension_adjust(), ExtensionAdjust::Lower);
        assert_eq!(loaded.ignore_file_name(), ".skip");
        assert!(!loaded.ignore_file_enabled());
        assert!(!loaded.log_enabled());
    }

    #[test]
    fn test_obfuscated_config_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("packer.cfg");
        let key = ObfuscationKey::from_password("file_packer");

        let mut packer = Packer::new();
        packer.set_read_path("/data/in");
        packer.set_pack_mode(PackMode::Everything);
        packer.save_obfuscated(&path, &key).unwrap();

        let mut loaded = Packer::new();
        loaded.load_obfuscated(&path, &key).unwrap();
        assert_eq!(loaded.read_path(), "/data/in");
        assert_eq!(loaded.pack_mode(), PackMode::Everything);
    }

    #[test]
    fn test_from_config_file_defaults_missing_and_invalid_keys() {
        let mut file = ConfigFile::new();
        file.set_value("pack_mode", 99i64);
        file.set_value("read_path", "kept");

        let mut packer = Packer::new();
        packer.set_write_path("will_be_defaulted");
        packer.from_config_file(&file);

        assert_eq!(packer.read_path(), "kept");
        // An out-of-range ordinal falls back to the default mode, and keys
        // absent from the file reset to their defaults.
        assert_eq!(packer.pack_mode(), DEFAULT_PACK_MODE);
        assert_eq!(packer.write_path(), DEFAULT_WRITE_PATH);
        assert_eq!(packer.ignore_file_name(), DEFAULT_IGNORE_FILE_NAME);
        assert_eq!(packer.ignore_file_enabled(), DEFAULT_IGNORE_FILE_ENABLED);
    }

    #[test]
    fn test_revert_state_restores_defaults() {
        let mut packer = Packer::new();
        packer.set_read_path("/in");
        packer.set_write_path("/out");
        packer.add_extension("txt");
        packer.set_pack_mode(PackMode::Everything);
        packer.set_overwrite_files(true);

        packer.revert_state();

        assert_eq!(packer.read_path(), DEFAULT_READ_PATH);
        assert_eq!(packer.write_path(), DEFAULT_WRITE_PATH);
        assert!(packer.extensions().is_empty());
        assert_eq!(packer.pack_mode(), DEFAULT_PACK_MODE);
        assert_eq!(packer.overwrite_files(), DEFAULT_OVERWRITE_FILES);
    }

    #[test]
    fn test_extension_list_editing() {
        let mut packer = Packer::new();
        assert!(packer.add_extension("txt"));
        assert!(!packer.add_extension("txt"));
        assert!(packer.add_extension("TXT"));
        assert!(packer.has_extension("txt"));
        assert!(packer.remove_extension("txt"));
        assert!(!packer.remove_extension("txt"));
        packer.clear_extensions();
        assert!(packer.extensions().is_empty());
    }
}
