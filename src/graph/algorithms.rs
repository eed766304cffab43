//! Similarity graph algorithms.
//!
//! - **Jaccard similarity** on domain sets
//! - **Inverted index** construction (domain → proteins)
//! - **Pairwise similarity** via bucket enumeration: only pairs that co-occur
//!   in at least one domain bucket are ever scored, so cost is bounded by
//!   Σ k_d² over domain buckets instead of V²
//! - **Similarity queries**: pairwise matrix, top-k ranking, domain distribution
//!
//! All functions are synchronous and operate on an in-memory snapshot.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::models::{DomainDistribution, DomainIndex, DomainProfile, PairKey, SimilarityEdge, SimilarProtein};
use crate::models::ProteinProjection;

/// Number of domains reported by [`domain_distribution`].
const TOP_DOMAINS: usize = 20;

// ============================================================================
// Jaccard similarity
// ============================================================================

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`.
///
/// Returns 0.0 when either set is empty.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

// ============================================================================
// Snapshot preparation and inverted index
// ============================================================================

/// Convert projections into domain profiles, keeping the first occurrence of
/// each protein id and stopping after `max_proteins` distinct proteins.
pub fn prepare_profiles(
    proteins: &[ProteinProjection],
    max_proteins: Option<usize>,
) -> Vec<DomainProfile> {
    let cap = max_proteins.unwrap_or(usize::MAX);
    let mut seen = HashSet::new();
    let mut profiles = Vec::with_capacity(proteins.len().min(cap));

    for protein in proteins {
        if profiles.len() >= cap {
            break;
        }
        if !seen.insert(protein.protein_id.as_str()) {
            tracing::warn!("Duplicate protein id {} in snapshot, keeping first", protein.protein_id);
            continue;
        }
        profiles.push(DomainProfile::from(protein));
    }
    profiles
}

/// Build the domain → proteins inverted index.
///
/// Every protein appears exactly once under each domain of its own set;
/// proteins with an empty domain set appear nowhere.
pub fn build_domain_index(profiles: &[DomainProfile]) -> DomainIndex {
    let mut index = DomainIndex::new();
    for profile in profiles {
        for domain in &profile.domains {
            index.insert(domain, &profile.protein_id);
        }
    }
    index
}

// ============================================================================
// Pairwise similarity
// ============================================================================

/// Result of the pairwise similarity pass.
#[derive(Debug, Clone, Default)]
pub struct SimilarityComputation {
    /// Edges with `jaccard ≥ min_similarity`, sorted by pair key.
    pub edges: Vec<SimilarityEdge>,
    /// Distinct pairs sharing at least one domain (scored candidates).
    pub candidate_pairs: usize,
}

/// Derive thresholded Jaccard edges from the inverted index.
///
/// For every bucket with ≥ 2 proteins, all unordered pairs accumulate the
/// bucket's domain into their shared set. Each accumulated pair is then
/// scored against the full domain sets of both endpoints. Pairs that never
/// share a bucket are never candidates, so `min_similarity = 0` still
/// requires a non-empty intersection.
pub fn compute_similarities(
    profiles: &[DomainProfile],
    index: &DomainIndex,
    min_similarity: f64,
) -> SimilarityComputation {
    let domains_of: HashMap<&str, &BTreeSet<String>> = profiles
        .iter()
        .map(|p| (p.protein_id.as_str(), &p.domains))
        .collect();

    let mut shared: HashMap<PairKey, BTreeSet<String>> = HashMap::new();
    for (domain, proteins) in index.iter() {
        if proteins.len() < 2 {
            continue;
        }
        for i in 0..proteins.len() {
            for j in (i + 1)..proteins.len() {
                if let Some(key) = PairKey::new(&proteins[i], &proteins[j]) {
                    shared.entry(key).or_default().insert(domain.to_string());
                }
            }
        }
    }

    let candidate_pairs = shared.len();
    let mut edges: Vec<SimilarityEdge> = shared
        .into_iter()
        .filter_map(|(key, shared_domains)| {
            let a = domains_of.get(key.first())?;
            let b = domains_of.get(key.second())?;
            let union = a.union(b).count();
            if union == 0 || shared_domains.is_empty() {
                return None;
            }
            let similarity = shared_domains.len() as f64 / union as f64;
            (similarity >= min_similarity).then(|| SimilarityEdge {
                protein_a: key.first().to_string(),
                protein_b: key.second().to_string(),
                shared_domains,
                jaccard_similarity: similarity,
            })
        })
        .collect();

    edges.sort_by(|x, y| {
        (x.protein_a.as_str(), x.protein_b.as_str()).cmp(&(y.protein_a.as_str(), y.protein_b.as_str()))
    });

    SimilarityComputation {
        edges,
        candidate_pairs,
    }
}

// ============================================================================
// Similarity queries
// ============================================================================

/// Full pairwise Jaccard matrix for the given profiles (diagonal included).
pub fn similarity_matrix(profiles: &[DomainProfile]) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut matrix = BTreeMap::new();
    for a in profiles {
        let row: BTreeMap<String, f64> = profiles
            .iter()
            .map(|b| (b.protein_id.clone(), jaccard(&a.domains, &b.domains)))
            .collect();
        matrix.insert(a.protein_id.clone(), row);
    }
    matrix
}

/// Rank `candidates` by similarity to `target`, most similar first.
///
/// The target itself and candidates sharing no domain are excluded.
pub fn rank_similar(
    target: &DomainProfile,
    candidates: &[ProteinProjection],
    top_k: usize,
    min_similarity: f64,
) -> Vec<SimilarProtein> {
    let mut ranked: Vec<SimilarProtein> = candidates
        .iter()
        .filter(|c| c.protein_id != target.protein_id)
        .filter_map(|c| {
            let profile = DomainProfile::from(c);
            let similarity = jaccard(&target.domains, &profile.domains);
            if similarity <= 0.0 || similarity < min_similarity {
                return None;
            }
            Some(SimilarProtein {
                protein_id: c.protein_id.clone(),
                name: c.name.clone(),
                similarity,
                shared_domains: target
                    .domains
                    .intersection(&profile.domains)
                    .cloned()
                    .collect(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.protein_id.cmp(&b.protein_id))
    });
    ranked.truncate(top_k);
    ranked
}

/// Summarise how domains are distributed across proteins.
pub fn domain_distribution(proteins: &[ProteinProjection]) -> DomainDistribution {
    if proteins.is_empty() {
        return DomainDistribution::default();
    }

    let mut domain_counts: HashMap<&str, usize> = HashMap::new();
    let mut per_protein: Vec<usize> = Vec::with_capacity(proteins.len());

    for protein in proteins {
        let unique: BTreeSet<&str> = protein.domain_ids.iter().map(String::as_str).collect();
        per_protein.push(unique.len());
        for domain in unique {
            *domain_counts.entry(domain).or_insert(0) += 1;
        }
    }

    let mut most_common: Vec<(String, usize)> = domain_counts
        .iter()
        .map(|(d, c)| (d.to_string(), *c))
        .collect();
    most_common.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    most_common.truncate(TOP_DOMAINS);

    per_protein.sort_unstable();
    let n = per_protein.len();
    let median = if n % 2 == 1 {
        per_protein[n / 2] as f64
    } else {
        (per_protein[n / 2 - 1] + per_protein[n / 2]) as f64 / 2.0
    };

    DomainDistribution {
        total_unique_domains: domain_counts.len(),
        most_common_domains: most_common,
        average_domains_per_protein: per_protein.iter().sum::<usize>() as f64 / n as f64,
        median_domains_per_protein: median,
        max_domains_per_protein: per_protein[n - 1],
        min_domains_per_protein: per_protein[0],
        proteins_with_no_domains: per_protein.iter().filter(|&&c| c == 0).count(),
    }
}

// ============================================================================
// Tests
// ============================================================================
