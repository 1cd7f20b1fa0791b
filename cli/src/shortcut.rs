/// Windows `.lnk` shortcut metadata: create, query, edit.
///
/// [`WindowsShortcuts`] talks to the shell through `IShellLinkW` and
/// `IPersistFile`. COM calls block, so callers go through the async wrappers at
/// the bottom of this file which run each call on a blocking thread with its
/// own COM apartment.
///
/// On non-Windows platforms everything compiles, and every call fails with
/// [`PrepError::ShortcutMetadata`].
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PrepError;
use crate::winpath;

pub const SHORTCUT_EXTENSION: &str = "lnk";

/// The subset of shortcut metadata this tool reads and writes.
///
/// Empty strings mean "not set": backends leave the stored field alone, so
/// links to shell items without a file path (This PC, Control Panel) keep
/// their target. Arguments and window state are never touched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortcutMeta {
    pub target: String,
    pub working_dir: String,
    #[cfg_attr(not(windows), allow(dead_code))]
    pub description: String,
}

impl ShortcutMeta {
    pub fn new(target: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Backend that stores shortcut metadata on disk.
pub trait ShortcutStore: Send + Sync {
    fn create(&self, path: &Path, meta: &ShortcutMeta) -> Result<(), PrepError>;
    fn query(&self, path: &Path) -> Result<ShortcutMeta, PrepError>;
    fn edit(&self, path: &Path, meta: &ShortcutMeta) -> Result<(), PrepError>;

    /// True for backends that hand values to `cmd.exe`, which would expand
    /// `%VAR%` references before they reach the `.lnk` file.
    fn expands_variables(&self) -> bool {
        false
    }
}

/// Shell-backed store. Targets are written and read in their raw form, so
/// `%OneDriveConsumer%` survives in the file and is expanded at launch.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsShortcuts;

impl ShortcutStore for WindowsShortcuts {
    fn create(&self, path: &Path, meta: &ShortcutMeta) -> Result<(), PrepError> {
        #[cfg(windows)]
        {
            imp::create(path, meta)
        }
        #[cfg(not(windows))]
        {
            let _ = (path, meta);
            Err(unsupported())
        }
    }

    fn query(&self, path: &Path) -> Result<ShortcutMeta, PrepError> {
        #[cfg(windows)]
        {
            imp::query(path)
        }
        #[cfg(not(windows))]
        {
            let _ = path;
            Err(unsupported())
        }
    }

    fn edit(&self, path: &Path, meta: &ShortcutMeta) -> Result<(), PrepError> {
        #[cfg(windows)]
        {
            imp::edit(path, meta)
        }
        #[cfg(not(windows))]
        {
            let _ = (path, meta);
            Err(unsupported())
        }
    }
}

#[cfg(not(windows))]
fn unsupported() -> PrepError {
    PrepError::ShortcutMetadata("shortcuts are only supported on Windows".to_string())
}

// ── Windows implementation ─────────────────────────────────────────────────────

#[cfg(windows)]
mod imp {
    use std::path::Path;

    use windows::core::{Interface, PCWSTR};
    use windows::Win32::Storage::FileSystem::WIN32_FIND_DATAW;
    use windows::Win32::System::Com::{
        CoCreateInstance, CoInitializeEx, CoUninitialize, IPersistFile, CLSCTX_INPROC_SERVER,
        COINIT_APARTMENTTHREADED, STGM_READ, STGM_READWRITE,
    };
    use windows::Win32::UI::Shell::{IShellLinkW, ShellLink};
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    use super::ShortcutMeta;
    use crate::error::PrepError;

    /// INFOTIPSIZE; long enough for any field the shell stores.
    const FIELD_CHARS: usize = 1024;
    /// SLGP_RAWPATH: return the target without expanding `%VAR%` references.
    const SLGP_RAWPATH: u32 = 0x4;

    /// Initialises COM for the calling thread and uninitialises it on drop.
    struct ComApartment;

    impl ComApartment {
        fn enter() -> Result<Self, PrepError> {
            unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }
                .ok()
                .map_err(|e| com_error("CoInitializeEx", e))?;
            Ok(Self)
        }
    }

    impl Drop for ComApartment {
        fn drop(&mut self) {
            unsafe { CoUninitialize() };
        }
    }

    fn com_error(call: &str, e: windows::core::Error) -> PrepError {
        PrepError::ShortcutMetadata(format!("{call} failed: {e}"))
    }

    /// Converts a Rust `&str` to a null-terminated UTF-16 `Vec<u16>`.
    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn from_wide(buf: &[u16]) -> String {
        let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        String::from_utf16_lossy(&buf[..len])
    }

    fn new_link() -> Result<IShellLinkW, PrepError> {
        unsafe { CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER) }
            .map_err(|e| com_error("CoCreateInstance(ShellLink)", e))
    }

    /// Writes the populated fields of `meta`; empty ones keep their stored value.
    fn apply(link: &IShellLinkW, meta: &ShortcutMeta) -> Result<(), PrepError> {
        unsafe {
            if !meta.target.is_empty() {
                let target = to_wide(&meta.target);
                link.SetPath(PCWSTR::from_raw(target.as_ptr()))
                    .map_err(|e| com_error("IShellLinkW::SetPath", e))?;
            }
            if !meta.working_dir.is_empty() {
                let working_dir = to_wide(&meta.working_dir);
                link.SetWorkingDirectory(PCWSTR::from_raw(working_dir.as_ptr()))
                    .map_err(|e| com_error("IShellLinkW::SetWorkingDirectory", e))?;
            }
            if !meta.description.is_empty() {
                let description = to_wide(&meta.description);
                link.SetDescription(PCWSTR::from_raw(description.as_ptr()))
                    .map_err(|e| com_error("IShellLinkW::SetDescription", e))?;
            }
        }
        Ok(())
    }

    fn save(link: &IShellLinkW, path: &Path) -> Result<(), PrepError> {
        let file: IPersistFile = link
            .cast()
            .map_err(|e| com_error("IShellLinkW as IPersistFile", e))?;
        let path_w = to_wide(&path.to_string_lossy());
        unsafe { file.Save(PCWSTR::from_raw(path_w.as_ptr()), true) }
            .map_err(|e| com_error("IPersistFile::Save", e))
    }

    fn load(path: &Path, writable: bool) -> Result<IShellLinkW, PrepError> {
        let link = new_link()?;
        let file: IPersistFile = link
            .cast()
            .map_err(|e| com_error("IShellLinkW as IPersistFile", e))?;
        let path_w = to_wide(&path.to_string_lossy());
        let mode = if writable { STGM_READWRITE } else { STGM_READ };
        unsafe { file.Load(PCWSTR::from_raw(path_w.as_ptr()), mode) }
            .map_err(|e| com_error("IPersistFile::Load", e))?;
        Ok(link)
    }

    pub fn create(path: &Path, meta: &ShortcutMeta) -> Result<(), PrepError> {
        let _com = ComApartment::enter()?;
        let link = new_link()?;
        apply(&link, meta)?;
        unsafe { link.SetShowCmd(SW_SHOWNORMAL) }
            .map_err(|e| com_error("IShellLinkW::SetShowCmd", e))?;
        save(&link, path)
    }

    pub fn query(path: &Path) -> Result<ShortcutMeta, PrepError> {
        let _com = ComApartment::enter()?;
        let link = load(path, false)?;

        let mut target = [0u16; FIELD_CHARS];
        let mut working_dir = [0u16; FIELD_CHARS];
        let mut description = [0u16; FIELD_CHARS];
        let mut find_data = WIN32_FIND_DATAW::default();

        unsafe {
            link.GetPath(&mut target, &mut find_data, SLGP_RAWPATH)
                .map_err(|e| com_error("IShellLinkW::GetPath", e))?;
            link.GetWorkingDirectory(&mut working_dir)
                .map_err(|e| com_error("IShellLinkW::GetWorkingDirectory", e))?;
            link.GetDescription(&mut description)
                .map_err(|e| com_error("IShellLinkW::GetDescription", e))?;
        }

        Ok(ShortcutMeta {
            target: from_wide(&target),
            working_dir: from_wide(&working_dir),
            description: from_wide(&description),
        })
    }

    pub fn edit(path: &Path, meta: &ShortcutMeta) -> Result<(), PrepError> {
        let _com = ComApartment::enter()?;
        let link = load(path, true)?;
        apply(&link, meta)?;
        save(&link, path)
    }
}

// ── Async boundary ─────────────────────────────────────────────────────────────

/// Applies the escaping the backend needs before values leave the process.
fn for_store(store: &dyn ShortcutStore, meta: &ShortcutMeta) -> ShortcutMeta {
    if !store.expands_variables() {
        return meta.clone();
    }
    ShortcutMeta {
        target: winpath::escape_variables(&meta.target).into_owned(),
        working_dir: winpath::escape_variables(&meta.working_dir).into_owned(),
        ..meta.clone()
    }
}

fn join_error(e: tokio::task::JoinError) -> PrepError {
    PrepError::ShortcutMetadata(format!("shortcut task panicked: {e}"))
}

pub async fn create(
    store: Arc<dyn ShortcutStore>,
    path: PathBuf,
    meta: ShortcutMeta,
) -> Result<(), PrepError> {
    tokio::task::spawn_blocking(move || {
        let meta = for_store(store.as_ref(), &meta);
        store.create(&path, &meta)
    })
    .await
    .map_err(join_error)?
}

pub async fn query(store: Arc<dyn ShortcutStore>, path: PathBuf) -> Result<ShortcutMeta, PrepError> {
    tokio::task::spawn_blocking(move || store.query(&path))
        .await
        .map_err(join_error)?
}

pub async fn edit(
    store: Arc<dyn ShortcutStore>,
    path: PathBuf,
    meta: ShortcutMeta,
) -> Result<(), PrepError> {
    tokio::task::spawn_blocking(move || {
        let meta = for_store(store.as_ref(), &meta);
        store.edit(&path, &meta)
    })
    .await
    .map_err(join_error)?
}

/// In-memory store for tests. `create` also drops an empty file at `path` so
/// directory listings and existence checks see the shortcut.
#[cfg(test)]
pub mod memory {
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use super::{ShortcutMeta, ShortcutStore};
    use crate::error::PrepError;

    #[derive(Default)]
    pub struct MemoryShortcuts {
        pub entries: Mutex<HashMap<PathBuf, ShortcutMeta>>,
        pub fail_query: HashSet<PathBuf>,
        pub fail_edit: HashSet<PathBuf>,
        pub expands: bool,
    }

    impl MemoryShortcuts {
        pub fn insert(&self, path: &Path, meta: ShortcutMeta) {
            std::fs::write(path, b"").unwrap();
            self.entries.lock().unwrap().insert(path.to_path_buf(), meta);
        }

        pub fn get(&self, path: &Path) -> Option<ShortcutMeta> {
            self.entries.lock().unwrap().get(path).cloned()
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    impl ShortcutStore for MemoryShortcuts {
        fn create(&self, path: &Path, meta: &ShortcutMeta) -> Result<(), PrepError> {
            std::fs::write(path, b"").map_err(|e| PrepError::filesystem(path, e))?;
            self.entries
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), meta.clone());
            Ok(())
        }

        fn query(&self, path: &Path) -> Result<ShortcutMeta, PrepError> {
            if self.fail_query.contains(path) {
                return Err(PrepError::ShortcutMetadata("query refused".to_string()));
            }
            self.get(path)
                .ok_or_else(|| PrepError::ShortcutMetadata(format!("{} unknown", path.display())))
        }

        /// Like the shell store, empty fields keep their stored value.
        fn edit(&self, path: &Path, meta: &ShortcutMeta) -> Result<(), PrepError> {
            if self.fail_edit.contains(path) {
                return Err(PrepError::ShortcutMetadata("edit refused".to_string()));
            }
            let mut entries = self.entries.lock().unwrap();
            let stored = entries
                .get_mut(path)
                .ok_or_else(|| PrepError::ShortcutMetadata(format!("{} unknown", path.display())))?;
            for (field, value) in [
                (&mut stored.target, &meta.target),
                (&mut stored.working_dir, &meta.working_dir),
                (&mut stored.description, &meta.description),
            ] {
                if !value.is_empty() {
                    field.clone_from(value);
                }
            }
            Ok(())
        }

        fn expands_variables(&self) -> bool {
            self.expands
        }
    }
}
