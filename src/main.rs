/*
 * Entry point. Wires the logging sinks (terminal plus the packer log file)
 * and hands control to the interactive console application. The log file
 * location comes from the persisted configuration, so renaming it through
 * the console takes effect here on the next start.
 */
use file_packer::console::Application;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use time::macros::format_description;

fn main() {
    let log_config = ConfigBuilder::new()
        .set_time_format_custom(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        log_config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    let log_file_path = Application::default_log_file_path();
    match File::create(&log_file_path) {
        Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Info, log_config, file)),
        Err(error) => eprintln!("Could not open log file {log_file_path:?}: {error}"),
    }

    if let Err(error) = CombinedLogger::init(loggers) {
        eprintln!("Logger initialization failed: {error}");
    }

    let mut application = Application::new();
    application.run();
}
