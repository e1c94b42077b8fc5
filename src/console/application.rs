/*
 * The interactive front-end. An `Application` owns the `Packer`, a command
 * table and the console, and runs a read-dispatch loop: one command word per
 * iteration, with prompt-style commands reading one further token as their
 * argument. Every command prints a single feedback line.
 *
 * The configuration (packer settings plus the log file name) persists to
 * `packer.cfg` in the application's config directory by default and is
 * loaded back at startup.
 */
use super::console::Console;
use crate::core::config_file::{self, ConfigFile};
#[cfg(feature = "config-obfuscation")]
use crate::core::obfuscation::ObfuscationKey;
use crate::core::packer::{DEFAULT_IGNORE_FILE_NAME, ExtensionAdjust, PackMode, Packer};
use crate::core::path_utils;
use crate::core::value::Value;
use std::env;
use std::path::{Path, PathBuf};

pub const APPLICATION_NAME: &str = "file_packer";
pub const DEFAULT_CONFIG_FILE_NAME: &str = "packer.cfg";
pub const DEFAULT_LOG_FILE_NAME: &str = "packer.log";

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn enabled_str(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Hidden,
    Simple,
    Prompt,
}

struct Command {
    kind: CommandKind,
    action: fn(&mut Application),
    name: &'static str,
    description: &'static str,
    prompt: String,
}

pub struct Application {
    packer: Packer,
    console: Console,
    input: String,
    commands: Vec<Command>,
    process_commands: bool,
    log_file_name: String,
}

impl Application {
    pub fn new() -> Self {
        let mut application = Application {
            packer: Packer::new(),
            console: Console::new(),
            input: String::new(),
            commands: Vec::new(),
            process_commands: true,
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
        };
        application.register_commands();
        application
    }

    /*
     * Resolves a configuration or log file name to its on-disk location.
     * The default names live in the application's config directory so they
     * survive working-directory changes; a name the user typed resolves as
     * given (absolute, or relative to the current directory).
     */
    fn resolve_data_path(file_name: &str) -> PathBuf {
        if file_name == DEFAULT_CONFIG_FILE_NAME || file_name == DEFAULT_LOG_FILE_NAME {
            if let Some(dir) = path_utils::get_base_app_config_local_dir(APPLICATION_NAME) {
                return dir.join(file_name);
            }
        }
        PathBuf::from(file_name)
    }

    pub fn default_config_path() -> PathBuf {
        Self::resolve_data_path(DEFAULT_CONFIG_FILE_NAME)
    }

    /*
     * The log file location the logger should open at startup. Reads the
     * persisted `log_file_name` out of the default configuration before the
     * logging sinks exist, so a renamed log file takes effect on the next
     * start.
     */
    pub fn default_log_file_path() -> PathBuf {
        let mut file = ConfigFile::new();
        let _ = Self::load_config_file_into(&mut file, &Self::default_config_path());
        let name = file
            .get_value("log_file_name", Value::from(DEFAULT_LOG_FILE_NAME))
            .as_str()
            .to_string();
        Self::resolve_data_path(&name)
    }

    #[cfg(feature = "config-obfuscation")]
    fn load_config_file_into(file: &mut ConfigFile, path: &Path) -> config_file::Result<()> {
        file.load_obfuscated(path, &ObfuscationKey::from_password(APPLICATION_NAME))
    }

    #[cfg(not(feature = "config-obfuscation"))]
    fn load_config_file_into(file: &mut ConfigFile, path: &Path) -> config_file::Result<()> {
        file.load(path)
    }

    #[cfg(feature = "config-obfuscation")]
    fn save_config_file_from(file: &ConfigFile, path: &Path) -> config_file::Result<()> {
        file.save_obfuscated(path, &ObfuscationKey::from_password(APPLICATION_NAME))
    }

    #[cfg(not(feature = "config-obfuscation"))]
    fn save_config_file_from(file: &ConfigFile, path: &Path) -> config_file::Result<()> {
        file.save(path)
    }

    fn to_config_file(&self, file: &mut ConfigFile) {
        file.set_value("log_file_name", self.log_file_name.as_str());
        self.packer.to_config_file(file);
    }

    fn from_config_file(&mut self, file: &ConfigFile) {
        self.log_file_name = file
            .get_value("log_file_name", Value::from(DEFAULT_LOG_FILE_NAME))
            .as_str()
            .to_string();
        self.packer.from_config_file(file);
    }

    fn save_state(&self, path: &Path) -> config_file::Result<()> {
        let mut file = ConfigFile::new();
        self.to_config_file(&mut file);
        Self::save_config_file_from(&file, path)
    }

    fn load_state(&mut self, path: &Path) -> config_file::Result<()> {
        let mut file = ConfigFile::new();
        Self::load_config_file_into(&mut file, path)?;
        self.from_config_file(&file);
        Ok(())
    }

    // Command implementations. Each prints exactly one feedback line.

    fn set_read_path(&mut self) {
        let read_path = if self.input != "current" {
            self.input.clone()
        } else {
            env::current_dir()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        if read_path == self.packer.read_path() {
            self.console
                .print_line(&format!("Read path is already '{read_path}'."));
            return;
        }
        if read_path == self.packer.write_path() {
            self.console.print_line(&format!(
                "Read path '{read_path}' cannot be the same as the write path."
            ));
            return;
        }
        if !Path::new(&read_path).exists() {
            self.console.print_line("Path does not exist.");
            return;
        }
        self.packer.set_read_path(&read_path);
        self.console
            .print_line(&format!("Read path changed to '{read_path}'."));
    }

    fn set_write_path(&mut self) {
        let write_path = self.input.clone();
        if write_path == self.packer.write_path() {
            self.console
                .print_line(&format!("Write path is already '{write_path}'."));
            return;
        }
        if write_path == self.packer.read_path() {
            self.console.print_line(&format!(
                "Write path '{write_path}' cannot be the same as the read path."
            ));
            return;
        }
        self.packer.set_write_path(&write_path);
        self.console
            .print_line(&format!("Write path changed to '{write_path}'."));
    }

    fn add_extension(&mut self) {
        if self.packer.add_extension(&self.input) {
            self.console
                .print_line(&format!("Extension '{}' added.", self.input));
        } else {
            self.console
                .print_line(&format!("Extension '{}' already exists.", self.input));
        }
    }

    fn remove_extension(&mut self) {
        if self.packer.remove_extension(&self.input) {
            self.console
                .print_line(&format!("Extension '{}' removed.", self.input));
        } else {
            self.console
                .print_line(&format!("Extension '{}' does not exist.", self.input));
        }
    }

    fn clear_extensions(&mut self) {
        self.packer.clear_extensions();
        self.console.print_line("Extensions cleared.");
    }

    fn set_pack_mode(&mut self) {
        let Some(pack_mode) = PackMode::find(&self.input) else {
            self.console
                .print_line(&format!("Pack mode '{}' is invalid.", self.input));
            return;
        };
        if pack_mode == self.packer.pack_mode() {
            self.console
                .print_line(&format!("Pack mode is already '{}'.", self.input));
            return;
        }
        self.packer.set_pack_mode(pack_mode);
        self.console
            .print_line(&format!("Pack mode changed to '{}'.", self.input));
    }

    fn toggle_overwrite_files(&mut self) {
        self.packer
            .set_overwrite_files(!self.packer.overwrite_files());
        self.console.print_line(&format!(
            "Overwrite files is {}.",
            enabled_str(self.packer.overwrite_files())
        ));
    }

    fn toggle_move_files(&mut self) {
        self.packer.set_move_files(!self.packer.move_files());
        self.console.print_line(&format!(
            "Move files is {}.",
            enabled_str(self.packer.move_files())
        ));
    }

    fn set_suffix_string(&mut self) {
        self.packer.set_suffix_string(&self.input);
        self.console
            .print_line(&format!("Suffix string changed to '{}'.", self.input));
    }

    fn toggle_suffix_enabled(&mut self) {
        self.packer.set_suffix_enabled(!self.packer.suffix_enabled());
        self.console.print_line(&format!(
            "Suffix is {}.",
            enabled_str(self.packer.suffix_enabled())
        ));
    }

    fn toggle_extension_insensitive(&mut self) {
        self.packer
            .set_extension_insensitive(!self.packer.extension_insensitive());
        self.console.print_line(&format!(
            "Extension insensitive is {}.",
            enabled_str(self.packer.extension_insensitive())
        ));
    }

    fn set_extension_adjust(&mut self) {
        let Some(adjust) = ExtensionAdjust::find(&self.input) else {
            self.console
                .print_line(&format!("Extension case '{}' is invalid.", self.input));
            return;
        };
        if adjust == self.packer.extension_adjust() {
            self.console
                .print_line(&format!("Extension case is already '{}'.", self.input));
            return;
        }
        self.packer.set_extension_adjust(adjust);
        self.console
            .print_line(&format!("Extension case changed to '{}'.", self.input));
    }

    fn set_ignore_file_name(&mut self) {
        let ignore_file_name = if self.input != "default" {
            self.input.clone()
        } else {
            DEFAULT_IGNORE_FILE_NAME.to_string()
        };
        if ignore_file_name == self.packer.ignore_file_name() {
            self.console.print_line(&format!(
                "Ignore file name is already '{ignore_file_name}'."
            ));
            return;
        }
        self.packer.set_ignore_file_name(&ignore_file_name);
        self.console.print_line(&format!(
            "Ignore file name changed to '{}'.",
            self.packer.ignore_file_name()
        ));
    }

    fn toggle_ignore_file_enabled(&mut self) {
        self.packer
            .set_ignore_file_enabled(!self.packer.ignore_file_enabled());
        self.console.print_line(&format!(
            "Ignore file is {}.",
            enabled_str(self.packer.ignore_file_enabled())
        ));
    }

    fn set_log_file_name(&mut self) {
        let log_file_name = if self.input != "default" {
            self.input.clone()
        } else {
            DEFAULT_LOG_FILE_NAME.to_string()
        };
        if log_file_name == self.log_file_name {
            self.console
                .print_line(&format!("Log file name is already '{log_file_name}'."));
            return;
        }
        self.log_file_name = log_file_name;
        self.console.print_line(&format!(
            "Log file name changed to '{}'. The new name takes effect on the next start.",
            self.log_file_name
        ));
    }

    fn toggle_log_enabled(&mut self) {
        self.packer.set_log_enabled(!self.packer.log_enabled());
        self.console.print_line(&format!(
            "Log {}.",
            enabled_str(self.packer.log_enabled())
        ));
    }

    fn swap_paths(&mut self) {
        if !Path::new(self.packer.write_path()).exists() {
            self.console.print_line("Write path does not exist.");
            return;
        }
        let read_path = self.packer.read_path().to_string();
        let write_path = self.packer.write_path().to_string();
        self.packer.set_read_path(&write_path);
        self.packer.set_write_path(&read_path);
        self.console.print_line("Paths swapped.");
    }

    fn revert_state(&mut self) {
        self.log_file_name = DEFAULT_LOG_FILE_NAME.to_string();
        self.packer.revert_state();
        self.console.print_line("State reverted.");
    }

    fn save_config(&mut self) {
        let file_name = if self.input != "default" {
            self.input.clone()
        } else {
            DEFAULT_CONFIG_FILE_NAME.to_string()
        };
        let path = Self::resolve_data_path(&file_name);
        match self.save_state(&path) {
            Ok(()) => self
                .console
                .print_line(&format!("Config file '{}' saved.", path.display())),
            Err(error) => {
                log::error!("Application: Failed to save config: {error}");
                self.console
                    .print_line(&format!("Failed to save config file '{}'.", path.display()));
            }
        }
    }

    fn load_config(&mut self) {
        let file_name = if self.input != "default" {
            self.input.clone()
        } else {
            DEFAULT_CONFIG_FILE_NAME.to_string()
        };
        let path = Self::resolve_data_path(&file_name);
        match self.load_state(&path) {
            Ok(()) => self
                .console
                .print_line(&format!("Config file '{}' loaded.", path.display())),
            Err(error) => {
                log::error!("Application: Failed to load config: {error}");
                self.console
                    .print_line(&format!("Failed to load config file '{}'.", path.display()));
            }
        }
    }

    fn extension_list_line(&self) -> String {
        if self.packer.extensions().is_empty() {
            String::from("No extensions added")
        } else {
            format!("Extensions: {}", self.packer.extensions().join(", "))
        }
    }

    fn print_info(&mut self) {
        self.console
            .print_line(&format!("Read path: {}", self.packer.read_path()));
        self.console
            .print_line(&format!("Write path: {}", self.packer.write_path()));
        self.console.print_line(&self.extension_list_line());
        self.console
            .print_line(&format!("Pack mode: {}", self.packer.pack_mode().name()));
        self.console.print_line(&format!(
            "Overwrite files: {}",
            enabled_str(self.packer.overwrite_files())
        ));
        self.console.print_line(&format!(
            "Move files: {}",
            enabled_str(self.packer.move_files())
        ));
        self.console
            .print_line(&format!("Suffix string: {}", self.packer.suffix_string()));
        self.console.print_line(&format!(
            "Suffix: {}",
            enabled_str(self.packer.suffix_enabled())
        ));
        self.console.print_line(&format!(
            "Extension insensitive: {}",
            enabled_str(self.packer.extension_insensitive())
        ));
        self.console.print_line(&format!(
            "Extension adjust: {}",
            self.packer.extension_adjust().name()
        ));
        self.console.print_line(&format!(
            "Ignore file name: {}",
            self.packer.ignore_file_name()
        ));
        self.console.print_line(&format!(
            "Ignore file: {}",
            enabled_str(self.packer.ignore_file_enabled())
        ));
        self.console
            .print_line(&format!("Log file name: {}", self.log_file_name));
        self.console.print_line(&format!(
            "Log: {}",
            enabled_str(self.packer.log_enabled())
        ));
    }

    /*
     * Validates the settings, logs the full configuration and any warnings,
     * then runs the packer. Validation failures and run errors surface as
     * error-level log lines; the per-file work itself is best-effort inside
     * the engine.
     */
    fn run_packer(&mut self) {
        if self.packer.read_path().is_empty() {
            log::error!("Read path is not configured");
            return;
        }
        if !Path::new(self.packer.read_path()).exists() {
            log::error!("Read path '{}' does not exist", self.packer.read_path());
            return;
        }
        if !Path::new(self.packer.read_path()).is_dir() {
            log::error!("Read path '{}' is not a directory", self.packer.read_path());
            return;
        }
        if self.packer.write_path().is_empty() {
            log::error!("Write path is not configured");
            return;
        }
        if self.packer.pack_mode() == PackMode::Include && self.packer.extensions().is_empty() {
            log::error!("No extensions are added");
            return;
        }

        log::info!("Running packer version {VERSION}");
        log::info!("Read path: {}", self.packer.read_path());
        log::info!("Write path: {}", self.packer.write_path());
        if !self.packer.extensions().is_empty() {
            log::info!("Extensions: {}", self.packer.extensions().join(", "));
        }
        log::info!("Pack mode: {}", self.packer.pack_mode().name());
        log::info!(
            "Overwrite files: {}",
            enabled_str(self.packer.overwrite_files())
        );
        log::info!("Move files: {}", enabled_str(self.packer.move_files()));
        log::info!("Suffix string: {}", self.packer.suffix_string());
        log::info!("Suffix: {}", enabled_str(self.packer.suffix_enabled()));
        if self.packer.suffix_enabled() && self.packer.suffix_string().is_empty() {
            log::warn!("Suffix removal is enabled but the suffix string is empty");
        }
        log::info!(
            "Extension insensitive: {}",
            enabled_str(self.packer.extension_insensitive())
        );
        log::info!("Extension adjust: {}", self.packer.extension_adjust().name());
        log::info!("Ignore file name: {}", self.packer.ignore_file_name());
        log::info!(
            "Ignore file: {}",
            enabled_str(self.packer.ignore_file_enabled())
        );
        if self.packer.ignore_file_enabled() && self.packer.ignore_file_name().is_empty() {
            log::warn!("The ignore file is enabled but the ignore file name is empty");
        }
        log::info!("Log file name: {}", self.log_file_name);
        log::info!("Log: {}", enabled_str(self.packer.log_enabled()));

        self.console.print_line("Packing files...");
        if let Err(error) = self.packer.pack_files() {
            log::error!("{error}");
        }
        self.console.print_line("Finished packing");
    }

    fn quit_program(&mut self) {
        self.process_commands = false;
    }

    fn print_help(&mut self) {
        self.console.print_line("Available commands:");

        let longest_name = self
            .commands
            .iter()
            .map(|command| command.name.len())
            .max()
            .unwrap_or(0);

        // Borrow the table up front; printing does not touch the packer.
        let lines: Vec<String> = self
            .commands
            .iter()
            .filter(|command| command.kind != CommandKind::Hidden)
            .map(|command| {
                format!(
                    "{}{} - {}.",
                    command.name,
                    " ".repeat(longest_name - command.name.len()),
                    command.description
                )
            })
            .collect();
        for line in lines {
            self.console.print_line(&line);
        }
    }

    // Command table plumbing.

    fn add_hidden_command(&mut self, action: fn(&mut Application), name: &'static str) {
        self.commands.push(Command {
            kind: CommandKind::Hidden,
            action,
            name,
            description: "",
            prompt: String::new(),
        });
    }

    fn add_simple_command(
        &mut self,
        action: fn(&mut Application),
        name: &'static str,
        description: &'static str,
    ) {
        self.commands.push(Command {
            kind: CommandKind::Simple,
            action,
            name,
            description,
            prompt: String::new(),
        });
    }

    fn add_prompt_command(
        &mut self,
        action: fn(&mut Application),
        name: &'static str,
        description: &'static str,
        prompt: String,
    ) {
        self.commands.push(Command {
            kind: CommandKind::Prompt,
            action,
            name,
            description,
            prompt,
        });
    }

    fn register_commands(&mut self) {
        self.add_prompt_command(
            Self::set_read_path,
            "read_path",
            "Change the path that you would like to read from",
            "Type the path (or 'current' to use the current directory):".to_string(),
        );
        self.add_prompt_command(
            Self::set_write_path,
            "write_path",
            "Change the path that you would like to write to",
            "Type the path:".to_string(),
        );
        self.add_prompt_command(
            Self::add_extension,
            "add_extension",
            "Add an extension to the extension list",
            "Type the extension to add:".to_string(),
        );
        self.add_prompt_command(
            Self::remove_extension,
            "remove_extension",
            "Remove an extension from the extension list",
            "Type the extension to remove:".to_string(),
        );
        self.add_simple_command(
            Self::clear_extensions,
            "clear_extensions",
            "Clear all of the extensions in the extension list",
        );
        self.add_prompt_command(
            Self::set_pack_mode,
            "pack_mode",
            "Pack matching extensions, exclude matching extensions or pack everything",
            format!(
                "Type '{}', '{}' or '{}':",
                PackMode::Include.name(),
                PackMode::Exclude.name(),
                PackMode::Everything.name()
            ),
        );
        self.add_simple_command(
            Self::toggle_overwrite_files,
            "overwrite_files",
            "Overwrite existing files",
        );
        self.add_simple_command(Self::toggle_move_files, "move_files", "Move the files");
        self.add_prompt_command(
            Self::set_suffix_string,
            "suffix_string",
            "The suffix string to remove",
            "Type the suffix string to remove:".to_string(),
        );
        self.add_simple_command(
            Self::toggle_suffix_enabled,
            "suffix_enabled",
            "Enable suffix string removal",
        );
        self.add_simple_command(
            Self::toggle_extension_insensitive,
            "extension_insensitive",
            "Ignore extension case in the extension list",
        );
        self.add_prompt_command(
            Self::set_extension_adjust,
            "extension_adjust",
            "Adjust the extension case",
            format!(
                "Type '{}', '{}' or '{}':",
                ExtensionAdjust::Default.name(),
                ExtensionAdjust::Lower.name(),
                ExtensionAdjust::Upper.name()
            ),
        );
        self.add_prompt_command(
            Self::set_ignore_file_name,
            "ignore_file_name",
            "Change the name of the ignore file",
            "Type the name of the ignore file (or 'default' to use the default):".to_string(),
        );
        self.add_simple_command(
            Self::toggle_ignore_file_enabled,
            "ignore_file_enabled",
            "Check for an ignore file",
        );
        self.add_prompt_command(
            Self::set_log_file_name,
            "log_file_name",
            "Change the name of the log file",
            "Type the name of the log file (or 'default' to use the default):".to_string(),
        );
        self.add_simple_command(Self::toggle_log_enabled, "log_enabled", "Enable logging");
        self.add_simple_command(
            Self::swap_paths,
            "swap_paths",
            "Swap the read and write directories",
        );
        self.add_simple_command(
            Self::revert_state,
            "revert",
            "Revert all of the settings to their defaults",
        );
        self.add_prompt_command(
            Self::save_config,
            "save",
            "Save the state to a config file",
            "Type the name of the config file (or 'default' to use the default):".to_string(),
        );
        self.add_prompt_command(
            Self::load_config,
            "load",
            "Load a state from a config file",
            "Type the name of the config file (or 'default' to use the default):".to_string(),
        );
        self.add_simple_command(
            Self::print_info,
            "info",
            "Print the current state of the packer",
        );
        self.add_simple_command(Self::run_packer, "run", "Run the packer");
        self.add_simple_command(Self::quit_program, "quit", "Quit the application");
        self.add_hidden_command(Self::print_help, "help");
    }

    /*
     * The command loop. Greets, restores the persisted state when present,
     * then dispatches one command per iteration until `quit` or stdin
     * closes.
     */
    pub fn run(&mut self) {
        self.console
            .print_line(&format!("Welcome to packer version {VERSION}."));
        self.console
            .print_line("Type a command or 'help' for a list of commands:");

        let config_path = Self::default_config_path();
        if let Err(error) = self.load_state(&config_path) {
            log::debug!("Application: No startup configuration loaded: {error}");
        }

        while self.process_commands {
            let Some(input) = self.console.read_token(true) else {
                break;
            };
            self.input = input;

            let command = self
                .commands
                .iter()
                .find(|command| command.name == self.input)
                .map(|command| (command.kind, command.action, command.prompt.clone()));

            match command {
                Some((kind, action, prompt)) => {
                    if kind == CommandKind::Prompt {
                        self.console.print_prompt(&prompt);
                        let Some(argument) = self.console.read_token(false) else {
                            break;
                        };
                        self.input = argument;
                    }
                    action(self);
                }
                None => self.console.print_line("Unknown command"),
            }
        }
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}
