//! Selection surface: one button per realm, plus Exit.
//!
//! Each click maps to exactly one dispatch on the UI thread. Launch failures
//! are shown in a message box and the launcher keeps running so another realm
//! can be tried.

use eframe::egui;

use crate::launch::{Dispatcher, ProcessInjector};
use crate::registry::RealmRegistry;

pub struct LauncherApp {
    registry: RealmRegistry,
    dispatcher: Dispatcher<ProcessInjector>,
    names: Vec<String>,
}

impl LauncherApp {
    pub fn new(registry: RealmRegistry) -> Self {
        let names = registry.names().map(str::to_string).collect();
        Self {
            registry,
            dispatcher: Dispatcher::new(ProcessInjector),
            names,
        }
    }

    fn launch(&self, name: &str) {
        match self.dispatcher.dispatch(&self.registry, name) {
            Ok(()) => println!("[wowreeb] dispatched {name}"),
            Err(e) => {
                println!("[wowreeb] launch failed: {e}");
                rfd::MessageDialog::new()
                    .set_level(rfd::MessageLevel::Error)
                    .set_title("Launch Exception")
                    .set_description(e.to_string())
                    .show();
            }
        }
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut selected: Option<String> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Wowreeb Launcher");
            ui.separator();

            for name in &self.names {
                if ui.button(name).clicked() {
                    selected = Some(name.clone());
                }
            }

            ui.separator();

            if ui.button("Exit").clicked() {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        // dispatch outside the panel closure; one click, one dispatch
        if let Some(name) = selected {
            self.launch(&name);
        }
    }
}
