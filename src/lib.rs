use std::time::Duration;

use tauri::Manager;

pub mod app;
mod commands;
pub mod config;
pub mod error;
pub mod tasks;

use app::lifecycle::{self, Lifecycle};
use app::platform::TauriHost;
use app::window::WindowController;
use app::{AppTray, AppWindows};
use config::AppConfig;
use tasks::TaskStore;

pub fn run() {
    let config = AppConfig::default();
    let setup_config = config.clone();

    let app = tauri::Builder::default()
        // Must be registered first so a second launch exits before doing any work.
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            lifecycle::on_second_instance(app);
        }))
        .plugin(lifecycle::hotkey_plugin())
        .manage(Lifecycle::new())
        .manage(AppTray::new())
        .manage(config)
        .on_window_event(app::events::handle_window_event)
        .invoke_handler(tauri::generate_handler![
            // Task commands
            commands::tasks::load_tasks,
            commands::tasks::save_tasks,
            // Logging commands
            commands::logging::write_log,
            commands::logging::write_logs,
            commands::logging::get_log_dir,
            // Config
            config::app::get_app_config,
        ])
        .setup(move |app| {
            if let Err(e) = commands::logging::init_logging(app.handle()) {
                eprintln!("Failed to initialize logging: {}", e);
            }

            let store = match TaskStore::for_app(app.handle(), &setup_config.tasks_file_name) {
                Ok(store) => store,
                Err(e) => {
                    log::warn!("[SETUP] No app data dir, storing tasks next to the binary: {}", e);
                    TaskStore::new(&setup_config.tasks_file_name)
                }
            };
            log::info!("[SETUP] Tasks file: {:?}", store.path());
            app.manage(store);

            let windows: AppWindows = WindowController::new(
                TauriHost::new(app.handle().clone()),
                setup_config.window,
                Duration::from_millis(u64::from(setup_config.resize_animation_ms)),
            );
            app.manage(windows);

            app::tray::init(app)?;

            if let Err(e) = lifecycle::register_hotkey(app.handle(), &setup_config.hotkey) {
                log::error!("[SETUP] {}", e);
            }

            app::bridge::listen(app.handle());

            // Create the popup hidden once startup settles so the first tray
            // click shows it without a load delay.
            let app_handle = app.handle().clone();
            let delay = Duration::from_millis(u64::from(setup_config.startup_delay_ms));
            tauri::async_runtime::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = app_handle.state::<AppWindows>().ensure_created() {
                    log::error!("[SETUP] Failed to create window: {}", e);
                }
            });

            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(lifecycle::handle_run_event);
}
