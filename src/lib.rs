/*
 * A rule-driven file-packing utility: walks a source directory tree and
 * copies (or moves) matching files into a mirrored destination tree,
 * applying filename transforms and extension filtering along the way. The
 * `core` module holds the engine and its persisted configuration; `console`
 * is the interactive front-end over it.
 */
pub mod console;
pub mod core;

pub use crate::core::{
    ConfigError, ConfigFile, CoreFileSystem, ExtensionAdjust, FileSystemOperations,
    ObfuscationKey, PackError, PackEventHandler, PackMode, Packer, ParseError, Value, ValueKind,
};
