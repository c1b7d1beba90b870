//! Dumps a bincode-serialized value of a given type kind to stdout.
//!
//! Mirrors `original_source/bin/ophelib_dump.cpp`'s type-kind switch:
//! `I, C, P, Vf, VI, VC, VP, Mf, MI, MC, PK, SK, KP`.

use std::fmt::Debug;
use std::fs;
use std::process::ExitCode;

use clap::Parser;
use serde::de::DeserializeOwned;

use paillier_suite::keys::{KeyPair, PrivateKey, PublicKey};
use paillier_suite::{BigInt, Ciphertext, PackedCiphertext};

#[derive(Parser)]
#[command(about = "Dump a stored wire value to stdout")]
struct Args {
    /// I, C, P, Vf, VI, VC, VP, Mf, MI, MC, PK, SK, KP
    kind: String,
    file: String,
}

fn load<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let bytes = fs::read(path).map_err(|e| format!("reading {path}: {e}"))?;
    bincode::deserialize(&bytes).map_err(|e| format!("decoding {path}: {e}"))
}

fn dump<T: Debug + DeserializeOwned>(path: &str) -> Result<(), String> {
    let value: T = load(path)?;
    println!("{value:?}");
    Ok(())
}

fn dump_bigint(path: &str) -> Result<(), String> {
    let value: BigInt = load(path)?;
    println!("{value}");
    Ok(())
}

fn run(args: &Args) -> Result<(), String> {
    match args.kind.as_str() {
        "I" => dump_bigint(&args.file),
        "C" => dump::<Ciphertext>(&args.file),
        "P" => dump::<PackedCiphertext>(&args.file),
        "Vf" => dump::<Vec<f64>>(&args.file),
        "VI" => dump::<Vec<BigInt>>(&args.file),
        "VC" => dump::<Vec<Ciphertext>>(&args.file),
        "VP" => dump::<Vec<PackedCiphertext>>(&args.file),
        "Mf" => dump::<Vec<Vec<f64>>>(&args.file),
        "MI" => dump::<Vec<Vec<BigInt>>>(&args.file),
        "MC" => dump::<Vec<Vec<Ciphertext>>>(&args.file),
        "PK" => dump::<PublicKey>(&args.file),
        "SK" => dump::<PrivateKey>(&args.file),
        "KP" => dump::<KeyPair>(&args.file),
        other => Err(format!(
            "invalid type '{other}'; expected one of I, C, P, Vf, VI, VC, VP, Mf, MI, MC, PK, SK, KP"
        )),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
