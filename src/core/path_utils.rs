/*
 * Locates the application's local data directory, where the log file is written.
 * The directory is created on first use.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

pub const LOG_FILE_NAME: &str = "tex_dropper.log";

/*
 * Returns the platform-specific local (non-roaming) data directory for `app_name`,
 * creating it if needed. `None` when the directory cannot be determined or created;
 * callers then fall back to logging to the terminal only.
 */
pub fn get_base_app_data_local_dir(app_name: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let data_path = proj_dirs.data_local_dir();
        if !data_path.exists() {
            if let Err(e) = fs::create_dir_all(data_path) {
                // The logger may not be up yet, so this also goes to stderr.
                eprintln!("PathUtils: Failed to create data directory {data_path:?}: {e}");
                return None;
            }
        }
        Some(data_path.to_path_buf())
    })
}

pub fn get_log_file_path(app_name: &str) -> Option<PathBuf> {
    get_base_app_data_local_dir(app_name).map(|dir| dir.join(LOG_FILE_NAME))
}
