use paillier_suite::{BigInt, Paillier, PaillierFast};
use rug::Integer;

/// Safe 1536 bit prime number in hex encoding, used as a fixed, reproducible
/// input for the reference variant's benchmarks.
const P: &str = "e84f454a8dd9e923fc85be8ca09278e28c5a3d9419cf118ef56912910f364c5\
                 29d999dba2837e55d413827ccf97a4b6c49addd56f079032164d487fbd22d5e\
                 a9ff0c8fdc6bce1b878a7109f33061874f310ae35ac75db3ac3fd5f49d8b85b\
                 8823f05fc288602abf6a4ef641a3766a44d7ecbceebe3bf144a582639b55658\
                 e93cc57445715ce83c0e7088ec701ded2bcbd2e91a68cb26b1aaddadf99aeef\
                 927fb82459a3805c232e36162cbea024a2fe7485b96eeb278d45016c622261b\
                 3d3aa3";
/// Safe 1536 bit prime number in hex encoding
const Q: &str = "9461f6a273f4bdf08ce0b1071253e0688d622d6b714b407200fa709d964034c\
                 1b84b97057a8dd48904a99e83f1cb4c94d6927ac6424b8028eefe6503336e03\
                 1ff0d7379932b1f6fa457d8a1e4d9436c42df8ba86ad54cc83a708cd6385d4d\
                 5cbf0c62f9f692f04e500726d5d41224e2ec88d48bd3d04c004c9a8e6ce23ee\
                 fb54995d7b4473c021f8a72c06fe3ce6488e6b1b8ad51b635a853121f4285c0\
                 c364aab061aea672cb6dd86cee08b63a5b3f1fc78f1712e1a333b2552471e5a\
                 d8403f";

fn fixed_primes() -> (BigInt, BigInt) {
    (
        BigInt::from_str_radix(P, 16).unwrap(),
        BigInt::from_str_radix(Q, 16).unwrap(),
    )
}

fn encryption(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();

    let (p, q) = fixed_primes();
    let reference = Paillier::from_primes(p, q).unwrap();
    let fast = PaillierFast::generate(&mut rng, 2048).unwrap();

    let n = reference.public_key().n.clone();
    let half_n = &n >> 1;

    let mut group = c.benchmark_group("Encrypt");

    // The reference variant's nonce is independent of the plaintext, so the
    // setup phase can draw both and leave only the deterministic encoding
    // arithmetic in the timed body.
    group.bench_function("Reference variant", |b| {
        b.iter_batched(
            || {
                let x = BigInt::random_below(&mut rng, &n) - half_n.clone();
                let nonce = paillier_suite::utils::sample_in_mult_group(&mut rng, &n);
                (x, nonce)
            },
            |(x, nonce)| reference.encrypt_with(&x, &nonce).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    // The fast variant only exposes the re-randomizing entry point, so its
    // nonce draw (a handful of lookup-table multiplications) is part of the
    // timed body, same as a real caller would pay.
    group.bench_function("Fast variant", |b| {
        b.iter_batched(
            || BigInt::random_below(&mut rng, &n) - half_n.clone(),
            |x| fast.encrypt_with_random(&mut paillier_suite::utils::global_rng(), &x).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn decryption(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();

    let (p, q) = fixed_primes();
    let reference = Paillier::from_primes(p, q).unwrap();
    let fast = PaillierFast::generate(&mut rng, 2048).unwrap();

    let mut group = c.benchmark_group("Decrypt");

    group.bench_function("Reference variant", |b| {
        b.iter_batched(
            || {
                let plaintext = BigInt::random_below(&mut rng, &reference.public_key().n);
                reference.encrypt_with_random(&mut rng, &plaintext).unwrap().0
            },
            |c| reference.decrypt(&c).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("Fast variant (CRT accelerated)", |b| {
        b.iter_batched(
            || {
                let plaintext = BigInt::random_below(&mut rng, &fast.public_key().n);
                fast.encrypt_with_random(&mut rng, &plaintext).unwrap()
            },
            |c| fast.decrypt(&c).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn scalar_mul(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();

    let (p, q) = fixed_primes();
    let reference = Paillier::from_primes(p, q).unwrap();
    let fast = PaillierFast::generate(&mut rng, 2048).unwrap();

    let mut group = c.benchmark_group("Homomorphic scalar multiplication");

    group.bench_function("Reference variant", |b| {
        b.iter_batched(
            || {
                let reference_n = &reference.public_key().n;
                let scalar = BigInt::random_below(&mut rng, reference_n);
                let plaintext = BigInt::random_below(&mut rng, reference_n);
                let enc_x = reference.encrypt_with_random(&mut rng, &plaintext).unwrap().0;
                (scalar, enc_x)
            },
            |(scalar, enc_x)| enc_x.mul_scalar(&scalar).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("Fast variant (CRT accelerated)", |b| {
        b.iter_batched(
            || {
                let fast_n = &fast.public_key().n;
                let scalar = BigInt::random_below(&mut rng, fast_n);
                let plaintext = BigInt::random_below(&mut rng, fast_n);
                let enc_x = fast.encrypt_with_random(&mut rng, &plaintext).unwrap();
                (scalar, enc_x)
            },
            |(scalar, enc_x)| enc_x.mul_scalar(&scalar).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

/// Naive safe-prime search kept around as the "before" baseline that
/// [`paillier_suite::utils::generate_safe_prime`] replaced: search by
/// incrementing through odd numbers one `next_prime` call at a time,
/// instead of drawing a fresh random candidate each round.
pub fn naive_safe_prime(rng: &mut impl rand_core::RngCore, bits: u32) -> Integer {
    use rug::{integer::IsPrime, Assign};
    let mut rng = paillier_suite::utils::external_rand(rng);
    let mut x = Integer::new();
    loop {
        x.assign(Integer::random_bits(bits - 1, &mut rng));
        x.set_bit(bits - 2, true);
        x.next_prime_mut();
        x <<= 1;
        x += 1;

        if let IsPrime::Yes | IsPrime::Probably = x.is_probably_prime(25) {
            return x;
        }
    }
}

fn safe_primes(c: &mut criterion::Criterion) {
    let rng = rand_dev::DevRng::new();

    let mut group = c.benchmark_group("Safe primes");
    for (bits, sample_size) in [(512, 200), (1024, 10), (1536, 10)] {
        let id = |s| format!("{}/{}", bits, s);
        group.sample_size(sample_size);

        group.bench_function(id("Naive next_prime search"), |b| {
            b.iter(|| naive_safe_prime(&mut rng.clone(), bits))
        });
        group.bench_function(id("Current"), |b| {
            b.iter(|| paillier_suite::utils::generate_safe_prime(&mut rng.clone(), bits))
        });
    }
}

fn rng_conversion(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();

    let mut group = c.benchmark_group("PRNG conversion");

    group.bench_function("into GMP", |b| {
        b.iter(|| {
            let mut gmp_rng = paillier_suite::utils::external_rand(std::hint::black_box(&mut rng));
            let dyn_rng: &mut dyn rug::rand::MutRandState = &mut gmp_rng;
            let _ = std::hint::black_box(dyn_rng);
        })
    });
}

criterion::criterion_group!(
    benches,
    encryption,
    decryption,
    scalar_mul,
    safe_primes,
    rng_conversion
);
criterion::criterion_main!(benches);
