use chrono::Utc;

fn main() {
    // Stamp build time for /api/health / ビルド日時を埋め込む
    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    println!("cargo:rerun-if-changed=build.rs");
}
