pub mod commands;
pub mod error;
pub mod models;
pub mod progress;
pub mod store;

/// Installs the `env_logger` backend. `RUST_LOG` wins over `default_level`;
/// calling this more than once is harmless.
pub fn init_logging(default_level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

#[cfg(feature = "app")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::{
        progress::{
            get_reading_progress, get_reading_sessions, log_pages, log_pages_read_today,
            set_daily_goal, update_page_position,
        },
        settings::{get_settings, load_effective_tracker_settings, save_settings},
    };
    use tauri::Manager;

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            let settings = load_effective_tracker_settings(&data_dir.to_string_lossy())
                .unwrap_or_default();
            init_logging(&settings.log_level);
            log::info!("Shelfmark data directory: {}", data_dir.display());
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_reading_progress,
            log_pages_read_today,
            log_pages,
            update_page_position,
            set_daily_goal,
            get_reading_sessions,
            get_settings,
            save_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
