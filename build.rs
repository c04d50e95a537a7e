fn main() {
    println!("cargo:rerun-if-changed=cfg.toml");

    // ESP-IDFビルド時のみ環境変数を出力
    #[cfg(feature = "esp")]
    embuild::espidf::sysenv::output();
}
