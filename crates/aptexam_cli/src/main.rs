//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `aptexam_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("aptexam_core ping={}", aptexam_core::ping());
    println!("aptexam_core version={}", aptexam_core::core_version());
    println!(
        "aptexam_core schema_version={}",
        aptexam_core::db::migrations::latest_version()
    );
}
