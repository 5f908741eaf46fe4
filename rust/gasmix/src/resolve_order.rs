//! Order in which the substances of a test mixture can be isolated.
//!
//! In every round each remaining substance that owns at least one AMU no other
//! remaining substance uses is scheduled, then removed. Removing substances
//! frees up their shared AMUs, so the next round can pick up substances that
//! were fully overlapped before. A round that schedules nothing while
//! substances remain means the overlaps cannot be resolved.

use crate::errors::{
    GasMixError,
    Result,
};
use crate::models::{
    Amu,
    UniqueAmuMolecule,
};
use crate::traits::SubstanceLike;
use nohash_hasher::{
    IntMap,
    IntSet,
};
use tracing::debug;

/// Substances of `remaining` that have at least one AMU used by no other
/// substance of `remaining`, in input order, together with the index of
/// the substance in `remaining`.
fn unique_amu_candidates<S: SubstanceLike>(remaining: &[&S]) -> Vec<(usize, UniqueAmuMolecule)> {
    let mut occurrences: IntMap<Amu, usize> = IntMap::default();
    for sub in remaining {
        let distinct: IntSet<Amu> = sub.atomic_masses().iter().copied().collect();
        for amu in distinct {
            *occurrences.entry(amu).or_insert(0) += 1;
        }
    }

    remaining
        .iter()
        .enumerate()
        .filter_map(|(i, sub)| {
            let uniq_amus: Vec<Amu> = sub
                .atomic_masses()
                .iter()
                .copied()
                .filter(|amu| occurrences.get(amu) == Some(&1))
                .collect();
            if uniq_amus.is_empty() {
                None
            } else {
                Some((
                    i,
                    UniqueAmuMolecule {
                        symbol: sub.symbol().to_string(),
                        uniq_amus,
                    },
                ))
            }
        })
        .collect()
}

/// Substances of `remaining` with at least one AMU used by no other
/// substance of `remaining`.
pub fn molecules_with_unique_amus<S: SubstanceLike>(remaining: &[S]) -> Vec<UniqueAmuMolecule> {
    let refs: Vec<&S> = remaining.iter().collect();
    unique_amu_candidates(&refs)
        .into_iter()
        .map(|(_, molecule)| molecule)
        .collect()
}

/// Resolve order grouped by planner round.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip_all, level = "trace")
)]
pub fn plan_rounds<S: SubstanceLike>(test_mixture: &[S]) -> Result<Vec<Vec<UniqueAmuMolecule>>> {
    let mut remaining: Vec<&S> = test_mixture.iter().collect();
    let mut rounds = Vec::new();

    while !remaining.is_empty() {
        let batch = unique_amu_candidates(&remaining);
        if batch.is_empty() {
            return Err(GasMixError::UnsolvableOverlap {
                remaining: remaining.iter().map(|x| x.symbol().to_string()).collect(),
            });
        }

        let scheduled: IntSet<usize> = batch.iter().map(|(i, _)| *i).collect();
        let mut i = 0;
        remaining.retain(|_| {
            let keep = !scheduled.contains(&i);
            i += 1;
            keep
        });

        let round: Vec<UniqueAmuMolecule> = batch.into_iter().map(|(_, x)| x).collect();
        debug!(
            "Resolve round {}: {:?}",
            rounds.len(),
            round.iter().map(|x| x.symbol.as_str()).collect::<Vec<_>>()
        );
        rounds.push(round);
    }

    Ok(rounds)
}

/// Flat resolve order: every substance exactly once, with the AMUs that were
/// unique to it when it was scheduled.
pub fn plan_order<S: SubstanceLike>(test_mixture: &[S]) -> Result<Vec<UniqueAmuMolecule>> {
    Ok(plan_rounds(test_mixture)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Substance;

    fn overlapping_mixture() -> Vec<Substance> {
        vec![
            Substance::new("test0", vec![1, 2, 3]),
            Substance::new("test1", vec![1, 2, 3, 4]),
            Substance::new("test2", vec![1, 2, 3, 4, 5]),
            Substance::new("test3", vec![6, 1, 2, 3, 4]),
        ]
    }

    fn molecule(symbol: &str, uniq_amus: Vec<Amu>) -> UniqueAmuMolecule {
        UniqueAmuMolecule {
            symbol: symbol.to_string(),
            uniq_amus,
        }
    }

    #[test]
    fn test_resolve_order() {
        let order = plan_order(&overlapping_mixture()).unwrap();
        assert_eq!(
            order,
            vec![
                molecule("test2", vec![5]),
                molecule("test3", vec![6]),
                molecule("test1", vec![4]),
                molecule("test0", vec![1, 2, 3]),
            ]
        );
    }

    #[test]
    fn test_resolve_rounds() {
        let rounds = plan_rounds(&overlapping_mixture()).unwrap();
        let symbols: Vec<Vec<&str>> = rounds
            .iter()
            .map(|r| r.iter().map(|x| x.symbol.as_str()).collect())
            .collect();
        assert_eq!(
            symbols,
            vec![vec!["test2", "test3"], vec!["test1"], vec!["test0"]]
        );
    }

    #[test]
    fn test_resolve_order_is_idempotent() {
        let mixture = overlapping_mixture();
        let first = plan_order(&mixture).unwrap();
        for _ in 0..5 {
            assert_eq!(plan_order(&mixture).unwrap(), first);
        }
    }

    #[test]
    fn test_full_overlap_is_unsolvable() {
        let mixture = vec![
            Substance::new("CO", vec![28, 12, 16]),
            Substance::new("N2", vec![12, 28, 16]),
        ];
        assert_eq!(
            plan_order(&mixture),
            Err(GasMixError::UnsolvableOverlap {
                remaining: vec!["CO".to_string(), "N2".to_string()],
            })
        );
    }

    #[test]
    fn test_unsolvable_after_first_round() {
        let mixture = vec![
            Substance::new("a", vec![1, 2]),
            Substance::new("b", vec![1, 2]),
            Substance::new("c", vec![1, 3]),
        ];
        // c goes first via AMU 3, a and b then share everything
        let res = plan_order(&mixture);
        assert_eq!(
            res,
            Err(GasMixError::UnsolvableOverlap {
                remaining: vec!["a".to_string(), "b".to_string()],
            })
        );
    }

    #[test]
    fn test_molecules_with_unique_amus() {
        let found = molecules_with_unique_amus(&overlapping_mixture());
        assert_eq!(
            found,
            vec![molecule("test2", vec![5]), molecule("test3", vec![6])]
        );
    }

    #[test]
    fn test_empty_mixture() {
        let mixture: Vec<Substance> = vec![];
        assert!(plan_order(&mixture).unwrap().is_empty());
    }
}
