use hashtrial::{
    hash::{AHash, Fnv1a, Mul31},
    Corpus, FlatMap, StringHash,
};

use std::hash::BuildHasherDefault;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn build_corpus(n: usize) -> Corpus {
    match Corpus::build(n) {
        Ok(corpus) => corpus,
        Err(e) => panic!("{}", e),
    }
}

fn flat_map_of<H: StringHash>(corpus: &Corpus) -> FlatMap<String, u32, H> {
    let n = corpus.n();

    corpus.random()[1..=n]
        .iter()
        .enumerate()
        .map(|(i, key)| (key.clone(), i as u32 + 1))
        .collect()
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("random lookup");

    for &n in [64usize, 4096, 262_144].iter() {
        let corpus = build_corpus(n);
        let keys = &corpus.random()[1..];

        let mul31 = flat_map_of::<Mul31>(&corpus);
        let fnv1a = flat_map_of::<Fnv1a>(&corpus);
        let ahash = flat_map_of::<AHash>(&corpus);
        let hashbrown: hashbrown::HashMap<String, u32, BuildHasherDefault<ahash::AHasher>> =
            ahash.iter().map(|(k, v)| (k.clone(), *v)).collect();

        group.bench_with_input(BenchmarkId::new("FlatMap<mul31_hash>", n), keys, |b, keys| {
            b.iter(|| keys.iter().filter_map(|k| mul31.get(k.as_str())).count())
        });
        group.bench_with_input(BenchmarkId::new("FlatMap<fnv1a_hash>", n), keys, |b, keys| {
            b.iter(|| keys.iter().filter_map(|k| fnv1a.get(k.as_str())).count())
        });
        group.bench_with_input(BenchmarkId::new("FlatMap<ahash>", n), keys, |b, keys| {
            b.iter(|| keys.iter().filter_map(|k| ahash.get(k.as_str())).count())
        });
        group.bench_with_input(BenchmarkId::new("hashbrown<ahash>", n), keys, |b, keys| {
            b.iter(|| keys.iter().filter_map(|k| hashbrown.get(k.as_str())).count())
        });
    }

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let corpus = build_corpus(4096);
    let keys = &corpus.consecutive()[1..=corpus.n()];

    c.bench_function("FlatMap<mul31_hash>: consecutive insertion", |b| {
        b.iter(|| {
            let mut map: FlatMap<String, u32, Mul31> = FlatMap::default();

            for (i, key) in keys.iter().enumerate() {
                map.insert_if_absent(key.clone(), i as u32);
            }

            map.len()
        })
    });
}

criterion_group!(benches, bench_lookup, bench_insert);
criterion_main!(benches);
