mod app;
mod config;
mod launch;
mod paths;
mod registry;
mod verify;

use crate::app::LauncherApp;
use crate::launch::{Dispatcher, ProcessInjector};
use crate::registry::RealmRegistry;

fn main() -> eframe::Result {
    let args: Vec<String> = std::env::args().collect();

    if std::env::args().any(|arg| arg == "--help") {
        println!("{}", USAGE_TEXT);
        std::process::exit(0);
    }

    let mut config_arg = paths::CONFIG_FILE_NAME.to_string();
    if let Some(config_index) = args.iter().position(|arg| arg == "--config") {
        if let Some(next_arg) = args.get(config_index + 1) {
            config_arg = next_arg.clone();
        } else {
            eprintln!("{}", USAGE_TEXT);
            std::process::exit(1);
        }
    }

    let mut realm_arg = String::new();
    if let Some(realm_index) = args.iter().position(|arg| arg == "--realm") {
        if let Some(next_arg) = args.get(realm_index + 1) {
            realm_arg = next_arg.clone();
        } else {
            eprintln!("{}", USAGE_TEXT);
            std::process::exit(1);
        }
    }

    let Some(config_path) = paths::resolve_config(&config_arg) else {
        fatal(&format!("Config file \"{config_arg}\" not found"));
    };

    let registry = match RealmRegistry::load(&config_path) {
        Ok(registry) => registry,
        Err(e) => fatal(&e.to_string()),
    };

    println!(
        "[wowreeb] loaded {} realm(s) from {}",
        registry.len(),
        config_path.display()
    );

    if registry.is_empty() {
        println!("[wowreeb] warning: no realms configured");
    }

    // one-shot command line launch, no UI
    if !realm_arg.is_empty() {
        let dispatcher = Dispatcher::new(ProcessInjector);
        match dispatcher.dispatch(&registry, &realm_arg) {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("[wowreeb] {e}");
                std::process::exit(1);
            }
        }
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([320.0, 420.0])
            .with_min_inner_size([240.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Wowreeb Launcher",
        options,
        Box::new(|_cc| Ok(Box::<LauncherApp>::new(LauncherApp::new(registry)))),
    )
}

/// A launcher without a valid registry cannot run: show the error, then exit.
fn fatal(message: &str) -> ! {
    println!("[wowreeb] fatal: {message}");
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("Exception")
        .set_description(message)
        .show();
    std::process::exit(1);
}

static USAGE_TEXT: &str = r#"
Usage: wowreeb [OPTIONS]

Options:
    --config <file>   Config document to load (default: config.xml, searched
                      in the working directory, then beside the executable)
    --realm <name>    Launch the named realm immediately and exit, skipping
                      the selection window
    --help            Show this help text
"#;
