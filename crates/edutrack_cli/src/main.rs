//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `edutrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use edutrack_core::db::migrations::latest_version;
use edutrack_core::db::open_db_in_memory;

fn main() {
    println!("edutrack_core version={}", edutrack_core::core_version());

    match open_db_in_memory() {
        Ok(_) => println!("store schema_version={}", latest_version()),
        Err(err) => {
            eprintln!("store bootstrap failed: {err}");
            std::process::exit(1);
        }
    }
}
