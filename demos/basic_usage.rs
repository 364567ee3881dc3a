//! Basic usage examples for ferric-cuckoo

use ferric_cuckoo::utils::optimal_cuckoo_parameters;
use ferric_cuckoo::{CuckooError, CuckooFilter, FilterConfig, TableKind, XxHash64};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Ferric Cuckoo Filter Examples ===\n");

    // Example 1: Basic Cuckoo Filter
    println!("1. Basic Cuckoo Filter:");
    let mut filter = CuckooFilter::with_capacity(1000)?;

    let test_data = ["apple", "banana", "cherry", "durian", "elderberry"];
    for item in &test_data {
        filter.insert(item.as_bytes())?;
    }

    for item in &test_data {
        println!("  {} in filter: {}", item, filter.contains(item.as_bytes())?);
    }

    // Deletion is what sets a cuckoo filter apart from a Bloom filter
    filter.delete(b"banana");
    println!("  banana after delete: {}", filter.contains(b"banana")?);

    for item in &["fig", "grape", "honeydew"] {
        println!("  {} in filter: {}", item, filter.contains(item.as_bytes())?);
    }

    println!("  {}", filter.stats());
    println!();

    // Example 2: Semi-sorted table
    println!("2. Semi-sorted table (13-bit tags, ~1 bit/tag saved):");
    let params = optimal_cuckoo_parameters(50_000, 0.001, 4)?;
    println!(
        "  Suggested: {} buckets, {} bits per tag, FPR <= {:.6}",
        params.num_buckets, params.bits_per_item, params.expected_fpr
    );

    let config = FilterConfig::default()
        .with_num_keys(50_000)
        .with_bits_per_item(13)
        .with_table(TableKind::SemiSorted)
        .with_hash(XxHash64::with_seed(0x5eed))
        .with_seed(7);
    let mut semi = CuckooFilter::new(config)?;

    for i in 0..50_000u32 {
        semi.insert(&i.to_le_bytes())?;
    }
    let false_positives = (50_000..100_000u32)
        .filter(|i| semi.contains(&i.to_le_bytes()).unwrap_or(false))
        .count();
    println!("  {}", semi.table_info().replace('\n', "\n  "));
    println!("  False positives: {}/50000", false_positives);
    println!("  {}", semi.stats());
    println!();

    // Example 3: Filling up
    println!("3. Overfilling a tiny filter:");
    let config = FilterConfig::default()
        .with_num_keys(16)
        .with_max_kicks(50)
        .with_seed(1);
    let mut tiny = CuckooFilter::new(config)?;

    let mut accepted = 0;
    for i in 0..1000u32 {
        match tiny.insert(&i.to_le_bytes()) {
            Ok(()) => accepted += 1,
            Err(CuckooError::Full) => {
                println!("  Full after {} items ({} slots)", accepted, tiny.capacity());
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    println!("  Bucket loads: {:?}", tiny.bucket_loads());

    tiny.delete(&0u32.to_le_bytes());
    println!("  After one delete, full: {}", tiny.is_full());

    Ok(())
}
