use ferric_cuckoo::{CuckooFilter, FilterConfig, TableKind};
use std::time::Instant;

/// (label, semi-sorted?, bits per item)
const CONFIGS: &[(&str, bool, u32)] = &[
    ("fixed-8", false, 8),
    ("fixed-12", false, 12),
    ("fixed-16", false, 16),
    ("semi-9", true, 9),
    ("semi-13", true, 13),
    ("semi-17", true, 17),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("🦀 Cuckoo Filter Micro Benchmark");
    println!("{}", "=".repeat(55));

    let num_keys: u32 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(100_000);

    println!("Keys per filter: {}", num_keys);
    println!();

    let keys: Vec<Vec<u8>> = (0..num_keys).map(|i| i.to_string().into_bytes()).collect();
    let absent: Vec<Vec<u8>> = (num_keys..2 * num_keys)
        .map(|i| i.to_string().into_bytes())
        .collect();

    let mut results = Vec::new();

    for &(label, semi_sorted, bits) in CONFIGS {
        println!("🔬 Testing {}...", label);

        let table = if semi_sorted {
            TableKind::SemiSorted
        } else {
            TableKind::FixedWidth
        };
        let config = FilterConfig::default()
            .with_num_keys(num_keys)
            .with_bits_per_item(bits)
            .with_table(table)
            .with_seed(1);

        let start = Instant::now();
        let mut filter = CuckooFilter::new(config)?;
        let creation_time = start.elapsed().as_secs_f64();

        // Insert benchmark
        let start = Instant::now();
        let mut inserted = 0usize;
        for key in &keys {
            if filter.insert(key).is_err() {
                break;
            }
            inserted += 1;
        }
        let insert_time = start.elapsed().as_secs_f64();

        // Query benchmark (successful lookups)
        let start = Instant::now();
        let mut hits = 0usize;
        for key in &keys[..inserted] {
            if filter.contains(key)? {
                hits += 1;
            }
        }
        let query_time = start.elapsed().as_secs_f64();

        // Query benchmark (false positive test)
        let mut false_positives = 0usize;
        for key in &absent {
            if filter.contains(key)? {
                false_positives += 1;
            }
        }

        // Delete benchmark
        let start = Instant::now();
        for key in &keys[..inserted] {
            filter.delete(key);
        }
        let delete_time = start.elapsed().as_secs_f64();

        let rate = |n: usize, secs: f64| {
            if secs > 0.0 {
                n as f64 / secs
            } else {
                f64::INFINITY
            }
        };
        let insert_rate = rate(inserted, insert_time);
        let query_rate = rate(inserted, query_time);
        let delete_rate = rate(inserted, delete_time);
        let fpr = false_positives as f64 / absent.len().max(1) as f64;

        results.push((
            label,
            creation_time,
            inserted,
            insert_rate,
            query_rate,
            delete_rate,
            hits,
            fpr,
        ));

        println!(
            "   ✅ Done - Insert rate: {:.0} ops/s, Query rate: {:.0} ops/s",
            insert_rate, query_rate
        );
    }

    println!("\n📊 Results (CSV format):");
    println!("config,creation_time,inserted,insert_rate,query_rate,delete_rate,hits,false_positive_rate");

    for (label, creation_time, inserted, insert_rate, query_rate, delete_rate, hits, fpr) in
        &results
    {
        println!(
            "{},{:.6},{},{:.0},{:.0},{:.0},{},{:.6}",
            label, creation_time, inserted, insert_rate, query_rate, delete_rate, hits, fpr
        );
    }

    Ok(())
}
