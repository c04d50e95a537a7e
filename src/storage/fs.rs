use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{Storage, StorageError, StorageResult};

/// std::fs を使ったストレージ
///
/// 実機ではSPIFFS等をVFSにマウントしたディレクトリ（例: `/spiffs`）を
/// ルートとして使用します。ホストでは任意のディレクトリを指定できます。
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Storage for FsStorage {
    fn file_exists(&self, path: &str) -> StorageResult<bool> {
        match fs::metadata(self.resolve(path)) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                warn!("Failed to stat {}: {}", path, e);
                Err(StorageError::ReadFailed {
                    path: path.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn read_file(&self, path: &str) -> StorageResult<String> {
        let full_path = self.resolve(path);
        debug!("Reading {}", full_path.display());
        fs::read_to_string(&full_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            _ => StorageError::ReadFailed {
                path: path.to_string(),
                reason: e.to_string(),
            },
        })
    }

    fn write_file(&mut self, path: &str, contents: &str) -> StorageResult<()> {
        let full_path = self.resolve(path);
        debug!("Writing {} ({} bytes)", full_path.display(), contents.len());

        write_creating_dirs(&full_path, contents, |dir| fs::create_dir_all(dir)).map_err(|e| {
            StorageError::WriteFailed {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// まず直接書き込み、親ディレクトリがない場合のみ作成して再試行する
///
/// SPIFFSはディレクトリを持たず`mkdir`が失敗するが、`/`を含むファイル名は
/// そのまま書き込めるため、ディレクトリ作成の失敗は致命的エラーにしない。
fn write_creating_dirs<F>(full_path: &Path, contents: &str, create_dirs: F) -> io::Result<()>
where
    F: Fn(&Path) -> io::Result<()>,
{
    match fs::write(full_path, contents) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = full_path.parent() {
                if let Err(e) = create_dirs(parent) {
                    warn!("Could not create {}: {}", parent.display(), e);
                }
            }
            fs::write(full_path, contents)
        }
        result => result,
    }
}
