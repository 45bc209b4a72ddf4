//! # Filesystem-backed slot store
//!
//! [`FileStore`] is a [`KvStore`] implementation that persists each slot as a
//! plain file under a base directory. It is used on desktop to retain the
//! collection and session across app restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── subscription-data.json   # the collection slot
//! └── user-info.json           # the session slot
//! ```
//!
//! Reads of missing files map to `None`; write failures (permissions, full
//! disk) are reported through `put`'s boolean so [`crate::LocalStore`] can
//! surface them without panicking.

use std::path::PathBuf;

use crate::local::KvStore;

/// Filesystem-backed KvStore for desktop persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.slot_path(key)).ok()
    }

    fn put(&self, key: &str, value: &str) -> bool {
        if std::fs::create_dir_all(&self.base).is_err() {
            return false;
        }
        std::fs::write(self.slot_path(key), value).is_ok()
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.slot_path(key));
    }
}
