use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;

use super::analog::{AdcReader, AnalogError};

/// テスト用のADCモック実装
///
/// 実際のADCハードウェアを使わずにピンごとの生値を返します。
/// 読み取り順序と回数を記録し、テストで検証できます。
#[derive(Debug, Clone, Default)]
pub struct MockAdc {
    /// ピンごとの読み取り値（順番に循環して返す）
    values: Arc<Mutex<HashMap<u8, Vec<u16>>>>,
    /// 読み取り位置
    cursors: Arc<Mutex<HashMap<u8, usize>>>,
    /// 読み取られたピンの記録
    pub read_log: Arc<Mutex<Vec<u8>>>,
    /// 使用可能なピン（Noneの場合はすべて許可）
    allowed_pins: Option<Vec<u8>>,
    /// エラーシミュレーション用のフラグ
    simulate_read_error: Arc<Mutex<bool>>,
}

impl MockAdc {
    /// 新しいMockAdcインスタンスを作成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用可能なピンを制限する
    pub fn with_pins(mut self, pins: &[u8]) -> Self {
        self.allowed_pins = Some(pins.to_vec());
        self
    }

    /// テスト用: ピンの固定値を設定
    pub fn set_value(&self, pin: u8, raw: u16) {
        self.set_sequence(pin, &[raw]);
    }

    /// テスト用: ピンの値の列を設定（読み取りごとに循環）
    pub fn set_sequence(&self, pin: u8, raw: &[u16]) {
        self.values.lock().unwrap().insert(pin, raw.to_vec());
        self.cursors.lock().unwrap().insert(pin, 0);
    }

    /// テスト用: 読み取りエラーをシミュレート
    pub fn set_read_error(&self, enable: bool) {
        *self.simulate_read_error.lock().unwrap() = enable;
    }

    /// テスト用: 読み取られたピンの順序を取得
    pub fn get_read_log(&self) -> Vec<u8> {
        self.read_log.lock().unwrap().clone()
    }

    /// テスト用: 読み取り記録をクリア
    pub fn clear_read_log(&self) {
        self.read_log.lock().unwrap().clear();
    }

    /// テスト用: 指定ピンの読み取り回数
    pub fn read_count(&self, pin: u8) -> usize {
        self.read_log
            .lock()
            .unwrap()
            .iter()
            .filter(|p| **p == pin)
            .count()
    }
}

impl AdcReader for MockAdc {
    fn supports_pin(&self, pin: u8) -> bool {
        match self.allowed_pins {
            Some(ref pins) => pins.contains(&pin),
            None => true,
        }
    }

    fn read_raw(&mut self, pin: u8) -> Result<u16, AnalogError> {
        if *self.simulate_read_error.lock().unwrap() {
            return Err(AnalogError::ReadFailed {
                pin,
                reason: "Simulated read error".to_string(),
            });
        }

        self.read_log.lock().unwrap().push(pin);

        let values = self.values.lock().unwrap();
        let sequence = match values.get(&pin) {
            Some(sequence) if !sequence.is_empty() => sequence,
            _ => return Ok(0),
        };
        let mut cursors = self.cursors.lock().unwrap();
        let cursor = cursors.entry(pin).or_insert(0);
        let value = sequence[*cursor % sequence.len()];
        *cursor += 1;
        Ok(value)
    }
}

/// テスト用の遅延モック
///
/// 実際には待機せず、要求された遅延時間の合計を記録します。
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total_ns: Arc<Mutex<u64>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: 要求された遅延の合計（ミリ秒）
    pub fn total_ms(&self) -> u64 {
        *self.total_ns.lock().unwrap() / 1_000_000
    }

    pub fn reset(&self) {
        *self.total_ns.lock().unwrap() = 0;
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.lock().unwrap() += ns as u64;
    }
}
