use hashtrial::{
    hash::{AHash, Fnv1a, Mul31, Mul31x4, Mul31x8, StdHash},
    Corpus, StringHash,
};

use criterion::{criterion_group, criterion_main, BenchmarkGroup, Criterion, Throughput};

const NUM_KEYS: usize = 4096;

fn bench_hasher<H: StringHash>(
    group: &mut BenchmarkGroup<'_, criterion::measurement::WallTime>,
    name: &str,
    keys: &[String],
) {
    let hasher = H::default();

    group.bench_function(name, |b| {
        b.iter(|| {
            keys.iter().fold(0usize, |acc, key| {
                acc ^ hasher.hash_bytes(criterion::black_box(key.as_bytes()))
            })
        })
    });
}

fn bench_corpus(c: &mut Criterion, corpus_name: &str, keys: &[String]) {
    let mut group = c.benchmark_group(format!("hash {} keys", corpus_name));
    group.throughput(Throughput::Elements(keys.len() as u64));

    bench_hasher::<AHash>(&mut group, "ahash::AHasher", keys);
    bench_hasher::<StdHash>(&mut group, "std::hash", keys);
    bench_hasher::<Mul31>(&mut group, "mul31_hash", keys);
    bench_hasher::<Mul31x4>(&mut group, "mul31_x4_hash", keys);
    bench_hasher::<Mul31x8>(&mut group, "mul31_x8_hash", keys);
    bench_hasher::<Fnv1a>(&mut group, "fnv1a_hash", keys);

    #[cfg(feature = "fxhash")]
    bench_hasher::<hashtrial::hash::FxHash>(&mut group, "FxHasher", keys);

    #[cfg(feature = "xxhash")]
    {
        bench_hasher::<hashtrial::hash::Xxh3>(&mut group, "xxh3_64", keys);
        bench_hasher::<hashtrial::hash::Xxh64>(&mut group, "xxh64", keys);
    }

    group.finish();
}

fn bench_hashers(c: &mut Criterion) {
    let corpus = match Corpus::build(NUM_KEYS / 2) {
        Ok(corpus) => corpus,
        Err(e) => panic!("{}", e),
    };

    bench_corpus(c, "consecutive", &corpus.consecutive()[1..]);
    bench_corpus(c, "random", &corpus.random()[1..]);
}

criterion_group!(benches, bench_hashers);
criterion_main!(benches);
