//! Prints the crate version and which optional capabilities were compiled
//! in, mirroring `original_source/bin/ophelib_version.cpp`'s report of
//! `ophelib_version()` / `ophelib_openmp_enabled()`.

use clap::Parser;

#[derive(Parser)]
#[command(about = "Print paillier-suite's version and build configuration")]
struct Args;

fn main() {
    let _args = Args::parse();
    println!("paillier-suite {}", env!("CARGO_PKG_VERSION"));
    println!(
        "parallel: {}",
        if cfg!(feature = "parallel") {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "insecure-debug-keys: {}",
        if cfg!(feature = "insecure-debug-keys") {
            "enabled"
        } else {
            "disabled"
        }
    );
}
