use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Storage, StorageError, StorageResult};

/// テスト用のメモリ上ストレージ
///
/// クローンしたインスタンス同士で内容を共有するため、
/// センサーに渡した後でもテスト側から書き込み内容を検証できます。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, String>>>,
    simulate_write_error: Arc<Mutex<bool>>,
    simulate_read_error: Arc<Mutex<bool>>,
    write_count: Arc<Mutex<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: ファイルを直接配置
    pub fn insert(&self, path: &str, contents: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_string());
    }

    /// テスト用: ファイル内容を取得
    pub fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// テスト用: 書き込みエラーをシミュレート
    pub fn set_write_error(&self, enable: bool) {
        *self.simulate_write_error.lock().unwrap() = enable;
    }

    /// テスト用: 存在確認・読み取りエラーをシミュレート
    pub fn set_read_error(&self, enable: bool) {
        *self.simulate_read_error.lock().unwrap() = enable;
    }

    /// テスト用: 成功した書き込みの回数
    pub fn write_count(&self) -> usize {
        *self.write_count.lock().unwrap()
    }
}

impl MemoryStorage {
    fn check_read(&self, path: &str) -> StorageResult<()> {
        if *self.simulate_read_error.lock().unwrap() {
            return Err(StorageError::ReadFailed {
                path: path.to_string(),
                reason: "Simulated read error".to_string(),
            });
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn file_exists(&self, path: &str) -> StorageResult<bool> {
        self.check_read(path)?;
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    fn read_file(&self, path: &str) -> StorageResult<String> {
        self.check_read(path)?;
        self.get(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn write_file(&mut self, path: &str, contents: &str) -> StorageResult<()> {
        if *self.simulate_write_error.lock().unwrap() {
            return Err(StorageError::WriteFailed {
                path: path.to_string(),
                reason: "Simulated write error".to_string(),
            });
        }
        self.insert(path, contents);
        *self.write_count.lock().unwrap() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(!storage.file_exists("/a.json").unwrap());

        storage.write_file("/a.json", "{}").unwrap();
        assert!(storage.file_exists("/a.json").unwrap());
        assert_eq!(storage.read_file("/a.json").unwrap(), "{}");
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_memory_storage_shared_between_clones() {
        let storage = MemoryStorage::new();
        let mut handle = storage.clone();
        handle.write_file("/b.json", "x").unwrap();
        assert_eq!(storage.get("/b.json"), Some("x".to_string()));
    }

    #[test]
    fn test_memory_storage_write_error() {
        let mut storage = MemoryStorage::new();
        storage.set_write_error(true);
        assert!(matches!(
            storage.write_file("/c.json", "x"),
            Err(StorageError::WriteFailed { .. })
        ));
        assert!(!storage.file_exists("/c.json").unwrap());
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_memory_storage_read_missing() {
        let storage = MemoryStorage::new();
        assert_eq!(
            storage.read_file("/missing.json"),
            Err(StorageError::NotFound("/missing.json".to_string()))
        );
    }
}
