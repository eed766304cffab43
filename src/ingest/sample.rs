//! Synthetic protein records for demos and tests.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::{ProteinRecord, ProteinStatus};

const DOMAIN_POOL: usize = 100;
const GO_TERM_BASE: u32 = 836_742;
const REVIEWED_FRACTION: f64 = 0.3;

fn domain_pool() -> Vec<String> {
    (1..=DOMAIN_POOL).map(|i| format!("IPR{:06}", i)).collect()
}

fn ec_pool() -> Vec<String> {
    let mut pool = Vec::with_capacity(3 * 9 * 9);
    for i in 1..4 {
        for j in 1..10 {
            for k in 1..10 {
                pool.push(format!("1.{}.{}.{}", i, j, k));
            }
        }
    }
    pool
}

fn go_pool() -> Vec<String> {
    (1..=100).map(|i| format!("GO:{}", GO_TERM_BASE + i)).collect()
}

fn pick<R: Rng>(rng: &mut R, pool: &[String], amount: usize) -> Vec<String> {
    pool.choose_multiple(rng, amount).cloned().collect()
}

/// Generate `count` synthetic records: 1–8 domains, 0–3 EC numbers,
/// 0–5 GO terms, roughly 30% reviewed. The same `seed` yields the same data.
pub fn generate_sample(count: usize, seed: u64) -> Vec<ProteinRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (domains, ecs, gos) = (domain_pool(), ec_pool(), go_pool());

    (0..count)
        .map(|i| {
            let mut record = ProteinRecord::new(format!("SAMPLE_{:06}", i));
            record.name = Some(format!("Sample protein {}", i));
            record.description = Some(format!("Generated sample protein {}", i));
            record.taxonomy_id = Some("9606".to_string());
            record.taxonomy_name = Some("Homo sapiens".to_string());

            let n_domains = rng.gen_range(1..=8);
            record.domain_ids = pick(&mut rng, &domains, n_domains);
            let n_ec = rng.gen_range(0..=3);
            record.ec_numbers = pick(&mut rng, &ecs, n_ec);
            let n_go = rng.gen_range(0..=5);
            record.go_terms = pick(&mut rng, &gos, n_go);

            record.status = if rng.gen_bool(REVIEWED_FRACTION) {
                ProteinStatus::Reviewed
            } else {
                ProteinStatus::Unreviewed
            };
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_shape() {
        let records = generate_sample(50, 42);
        assert_eq!(records.len(), 50);
        assert_eq!(records[0].protein_id, "SAMPLE_000000");

        for r in &records {
            assert!((1..=8).contains(&r.domain_ids.len()));
            assert!(r.ec_numbers.len() <= 3);
            assert!(r.go_terms.len() <= 5);
            assert!(r.domain_ids.iter().all(|d| d.starts_with("IPR0")));
            let unique: HashSet<&String> = r.domain_ids.iter().collect();
            assert_eq!(unique.len(), r.domain_ids.len());
            assert_eq!(r.taxonomy_id.as_deref(), Some("9606"));
        }
    }

    #[test]
    fn test_sample_is_reproducible() {
        assert_eq!(generate_sample(20, 7), generate_sample(20, 7));
        assert_ne!(generate_sample(20, 7), generate_sample(20, 8));
    }
}
