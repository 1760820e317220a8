mod filesystem;
mod storage;

pub use filesystem::{FilesystemAuthStore, AUTH_STORAGE_FILE};
pub use storage::{AuthState, AuthStore};
