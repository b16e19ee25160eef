use directories::ProjectDirs;
use std::path::PathBuf;

pub const STORE_FILE: &str = "zhcards.json";
pub const BACKUPS_DIR: &str = "backups";

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "zhcards", "zhcards") {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

/// Store file and backup directory inside `root`.
pub fn store_files_in(root: PathBuf) -> (PathBuf, PathBuf) {
    let file = root.join(STORE_FILE);
    let backups = root.join(BACKUPS_DIR);
    (file, backups)
}

pub fn default_store_file() -> (PathBuf, PathBuf) {
    store_files_in(data_root())
}
