/*
 * This module provides utility functions for path manipulation: the textual
 * rules the packing engine applies to paths it is about to write, and the
 * resolution of the application's own configuration directory. The textual
 * rules operate on plain strings with '/' separators; they are shared by the
 * engine and its tests.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/*
 * Replaces every backslash in `path` with a forward slash. Nothing else is
 * normalized: repeated slashes and trailing slashes pass through untouched.
 */
pub fn normalize_path_separators(path: &mut String) {
    // Byte-wise replacement is safe; '\\' and '/' are both single-byte UTF-8.
    *path = path.replace('\\', "/");
}

/*
 * Removes the first occurrence of `suffix` from `path`, searching at or
 * after the first '/' so that any leading segment before the first separator
 * can never match. An empty suffix is a no-op success: there is nothing to
 * remove, so the request is treated as satisfied. Returns whether a removal
 * happened.
 */
pub fn remove_path_suffix(path: &mut String, suffix: &str) -> bool {
    if suffix.is_empty() {
        return true;
    }
    let Some(search_from) = path.find('/') else {
        return false;
    };
    if let Some(relative) = path[search_from..].find(suffix) {
        let at = search_from + relative;
        path.replace_range(at..at + suffix.len(), "");
        true
    } else {
        false
    }
}

/*
 * Retrieves the application's local configuration directory, creating it if
 * necessary. The path is derived without an organization qualifier, placing
 * it directly under the user's local application data structure. Returns
 * `None` when the directory cannot be determined or created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!("PathUtils: Failed to create app config directory {config_path:?}: {e}");
                return None;
            }
            log::debug!("PathUtils: Created app config directory: {config_path:?}");
        }
        Some(config_path.to_path_buf())
    })
}
