/// 設定ファイルの永続化
pub mod fs;
pub mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

/// ストレージ操作での結果の型
pub type StorageResult<T> = Result<T, StorageError>;

/// ストレージ操作のエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    /// ファイルが存在しない
    #[error("file not found: {0}")]
    NotFound(String),
    /// 読み取りエラー
    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },
    /// 書き込みエラー
    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

/// ファイルストレージのインターフェース
///
/// パスは`/settings/sen/DFWaterConductivity.json`のような絶対パスで、
/// 実装ごとのルート（SPIFFSのマウント先など）からの相対位置として扱われます。
pub trait Storage {
    /// ファイルが存在するか
    ///
    /// 存在しない場合は`Ok(false)`、確認自体に失敗した場合はエラーを返します。
    fn file_exists(&self, path: &str) -> StorageResult<bool>;

    /// ファイルの内容を文字列として読み取る
    fn read_file(&self, path: &str) -> StorageResult<String>;

    /// ファイルに文字列を書き込む（親ディレクトリが必要な場合のみ作成）
    fn write_file(&mut self, path: &str, contents: &str) -> StorageResult<()>;
}
