/// PT1000ボードの測定可能温度範囲（℃）
const TEMPERATURE_MIN_C: f32 = -40.0;
const TEMPERATURE_MAX_C: f32 = 125.0;

/// 測定結果（ハードウェア非依存）
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// 温度補正済みEC値（μS/cm）
    pub conductivity_us_cm: f32,
    /// 水温（℃）
    pub temperature_celsius: f32,
    /// EC信号電圧（mV）
    pub ec_millivolts: f32,
    /// 温度信号電圧（mV）
    pub temp_millivolts: f32,
    /// 測定の信頼性（true: 正常、false: 警告あり）
    pub is_reliable: bool,
    /// 警告メッセージ
    pub warnings: Vec<String>,
}

impl Measurement {
    pub fn new(
        conductivity_us_cm: f32,
        temperature_celsius: f32,
        ec_millivolts: f32,
        temp_millivolts: f32,
    ) -> Self {
        Self {
            conductivity_us_cm,
            temperature_celsius,
            ec_millivolts,
            temp_millivolts,
            is_reliable: true,
            warnings: Vec::new(),
        }
    }

    /// 出力値 {導電率, 温度} をこの順序で返す
    pub fn values(&self) -> [f32; 2] {
        [self.conductivity_us_cm, self.temperature_celsius]
    }

    /// 測定値の妥当性を検証し、警告を付与する
    ///
    /// # 引数
    /// * `adc_voltage_mv` - ADC基準電圧（飽和判定に使用）
    pub fn validated(mut self, adc_voltage_mv: f32) -> Self {
        if self.ec_millivolts <= 0.0 {
            self.add_warning("EC電圧が0mVです - プローブ接続を確認してください".to_string());
        } else if self.ec_millivolts >= adc_voltage_mv {
            self.add_warning("EC電圧が飽和しています - 入力電圧が高すぎます".to_string());
        }

        if self.temp_millivolts <= 0.0 {
            self.add_warning("温度電圧が0mVです - プローブ接続を確認してください".to_string());
        } else if self.temp_millivolts >= adc_voltage_mv {
            self.add_warning("温度電圧が飽和しています - 入力電圧が高すぎます".to_string());
        }

        if !(TEMPERATURE_MIN_C..=TEMPERATURE_MAX_C).contains(&self.temperature_celsius) {
            self.add_warning(format!(
                "温度が測定範囲外です: {:.1}°C",
                self.temperature_celsius
            ));
        }

        if self.conductivity_us_cm < 0.0 {
            self.add_warning("EC値が負の値です".to_string());
        }

        self
    }

    /// 警告メッセージを追加（信頼性をfalseにする）
    pub fn add_warning(&mut self, warning: String) {
        self.is_reliable = false;
        self.warnings.push(warning);
    }

    /// 測定データのサマリを取得
    pub fn get_summary(&self) -> String {
        let mut parts = vec![
            format!("EC:{:.1}μS/cm", self.conductivity_us_cm),
            format!("温度:{:.1}°C", self.temperature_celsius),
        ];

        if !self.warnings.is_empty() {
            parts.push(format!("警告:{}件", self.warnings.len()));
        }

        parts.join(", ")
    }
}
