//! The dependency-mask closure of §4.4.
//!
//! Given the equality set `E` of a scan, `M` is the multiset of dependency
//! masks carried by `E`'s constraints. The closure `C` is `{0}` union every
//! mask reachable by OR-folding any subset of `M`, computed by iterative
//! extension: start with `{0}`; for each distinct mask `m` in `M`, extend
//! the running set with `{ x | m : x ∈ current set }`.
//!
//! The closure enumerates every dependency configuration in which a
//! nested-loop driver could supply constants for equality predicates. Its
//! size grows exponentially in the number of *distinct* non-zero masks, so
//! per §9 of the design we cap the number of distinct masks considered
//! (default 12); above the cap we fall back to a single synthetic mask that
//! is the bitwise OR of every mask, and the closure becomes `{0, OR(M)}`.

use advisor_core::Constraint;

/// Computes the dependency-mask closure for an equality set, honoring the
/// `max_distinct_masks` cap documented in the design.
pub fn dependency_closure(equality: &[Constraint], max_distinct_masks: usize) -> Vec<u64> {
    let mut distinct: Vec<u64> = Vec::new();
    for c in equality {
        let m = c.dependency_mask();
        if m != 0 && !distinct.contains(&m) {
            distinct.push(m);
        }
    }

    if distinct.len() > max_distinct_masks {
        tracing::warn!(
            distinct_masks = distinct.len(),
            cap = max_distinct_masks,
            "dependency mask closure exceeded cap, falling back to OR-fold"
        );
        let or_fold = distinct.iter().fold(0u64, |acc, m| acc | m);
        return vec![0, or_fold];
    }

    let mut closure: Vec<u64> = vec![0];
    for m in distinct {
        let mut extended = Vec::with_capacity(closure.len());
        for &x in &closure {
            let candidate = x | m;
            if !closure.contains(&candidate) && !extended.contains(&candidate) {
                extended.push(candidate);
            }
        }
        closure.extend(extended);
    }
    closure
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::types::ConstraintKind;

    fn eq(mask: u64) -> Constraint {
        Constraint::new(0, "BINARY", ConstraintKind::Equality, mask, false)
    }

    #[test]
    fn test_closure_empty_equality_is_just_zero() {
        assert_eq!(dependency_closure(&[], 12), vec![0]);
    }

    #[test]
    fn test_closure_single_nonzero_mask() {
        let equality = vec![eq(0b10)];
        assert_eq!(dependency_closure(&equality, 12), vec![0, 0b10]);
    }

    #[test]
    fn test_closure_two_independent_masks() {
        let equality = vec![eq(0b01), eq(0b10)];
        let closure = dependency_closure(&equality, 12);
        assert_eq!(closure.len(), 4);
        assert!(closure.contains(&0));
        assert!(closure.contains(&0b01));
        assert!(closure.contains(&0b10));
        assert!(closure.contains(&0b11));
    }

    #[test]
    fn test_closure_duplicate_masks_do_not_blow_up() {
        let equality = vec![eq(0b01), eq(0b01), eq(0b01)];
        assert_eq!(dependency_closure(&equality, 12), vec![0, 0b01]);
    }

    #[test]
    fn test_closure_cap_falls_back_to_or_fold() {
        let equality: Vec<Constraint> = (0..13).map(|i| eq(1 << i)).collect();
        let closure = dependency_closure(&equality, 12);
        assert_eq!(closure.len(), 2);
        assert_eq!(closure[0], 0);
        assert_eq!(closure[1], (1u64 << 13) - 1);
    }
}
