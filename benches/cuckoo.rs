use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferric_cuckoo::{CuckooFilter, FilterConfig, PermutationEncoding, TableKind};

const NUM_KEYS: u32 = 100_000;

fn filled(table: TableKind, bits: u32) -> CuckooFilter {
    let config = FilterConfig::default()
        .with_num_keys(NUM_KEYS)
        .with_bits_per_item(bits)
        .with_table(table)
        .with_seed(1);
    let mut filter = CuckooFilter::new(config).unwrap();
    for i in 0..NUM_KEYS {
        filter.insert(&i.to_le_bytes()).unwrap();
    }
    filter
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for (name, bits) in [("fixed", 16), ("semi_sorted", 13)] {
        group.bench_function(BenchmarkId::new(name, bits), |b| {
            b.iter(|| {
                let table = if name == "fixed" {
                    TableKind::FixedWidth
                } else {
                    TableKind::SemiSorted
                };
                black_box(filled(table, bits))
            })
        });
    }
    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");
    let fixed = filled(TableKind::FixedWidth, 16);
    let semi = filled(TableKind::SemiSorted, 13);

    for (name, filter) in [("fixed", &fixed), ("semi_sorted", &semi)] {
        group.bench_function(BenchmarkId::new(name, "hit"), |b| {
            let mut i = 0u32;
            b.iter(|| {
                i = (i + 1) % NUM_KEYS;
                black_box(filter.contains(&i.to_le_bytes()).unwrap())
            })
        });
        group.bench_function(BenchmarkId::new(name, "miss"), |b| {
            let mut i = NUM_KEYS;
            b.iter(|| {
                i = i.wrapping_add(1).max(NUM_KEYS);
                black_box(filter.contains(&i.to_le_bytes()).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_delete_reinsert(c: &mut Criterion) {
    let mut filter = filled(TableKind::SemiSorted, 13);
    c.bench_function("semi_sorted_delete_reinsert", |b| {
        let mut i = 0u32;
        b.iter(|| {
            i = (i + 1) % NUM_KEYS;
            let key = i.to_le_bytes();
            filter.delete(&key);
            filter.insert(&key).unwrap();
        })
    });
}

fn bench_permutation(c: &mut Criterion) {
    let perm = PermutationEncoding::shared();
    c.bench_function("permutation_encode_decode", |b| {
        let mut codeword = 0u16;
        b.iter(|| {
            codeword = (codeword + 1) % 3876;
            black_box(perm.encode(perm.decode(black_box(codeword))))
        })
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_contains,
    bench_delete_reinsert,
    bench_permutation
);
criterion_main!(benches);
