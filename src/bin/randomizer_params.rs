//! Given `r_bits` and a lookup table size `r_lut`, prints the smallest
//! `r_use` (how many table entries to multiply together) that still gives
//! at least `r_bits` of re-randomization entropy.
//!
//! Mirrors `original_source/bin/ophelib_compute_randomizer_params.cpp`.

use clap::Parser;

#[derive(Parser)]
#[command(about = "Compute the r_use parameter for a fast-randomizer lookup table")]
struct Args {
    /// Desired re-randomization strength, in bits.
    r_bits: u32,
    /// Lookup table size.
    r_lut: u64,
}

fn main() {
    let args = Args::parse();
    let r_use = paillier_suite::utils::compute_r_use(args.r_bits, args.r_lut);
    println!("r_use = {r_use}");
}
