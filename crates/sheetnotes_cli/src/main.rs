//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `sheetnotes_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("sheetnotes_core ping={}", sheetnotes_core::ping());
    println!(
        "sheetnotes_core version={}",
        sheetnotes_core::core_version()
    );
}
