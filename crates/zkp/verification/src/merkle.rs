//! Merkle root over an ordered list of hex digests

use audit_crypto::HashPrimitive;

/// Fold `leaves` into a single root.
///
/// Each level pairs adjacent elements into `H(a ‖ b)`. An unpaired last
/// element moves up unchanged; it is neither duplicated nor hashed with
/// itself. One leaf is its own root, no leaves give `None`.
pub fn merkle_root(hasher: &dyn HashPrimitive, leaves: &[String]) -> Option<String> {
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hasher.combine(left, right),
                _ => pair[0].clone(),
            })
            .collect();
    }
    level.pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_crypto::Sha256Hash;
    use proptest::prelude::*;

    fn leaves(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| Sha256Hash.digest_str(n)).collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(merkle_root(&Sha256Hash, &[]), None);
        assert_eq!(merkle_root(&Sha256Hash, &["h".to_string()]), Some("h".to_string()));
    }

    #[test]
    fn test_odd_leaf_is_carried_not_duplicated() {
        let h = Sha256Hash;
        let l = leaves(&["a", "b", "c"]);

        let carried = h.combine(&h.combine(&l[0], &l[1]), &l[2]);
        let duplicated = h.combine(&h.combine(&l[0], &l[1]), &h.combine(&l[2], &l[2]));

        let root = merkle_root(&h, &l).unwrap();
        assert_eq!(root, carried);
        assert_ne!(root, duplicated);
    }

    #[test]
    fn test_four_leaves() {
        let h = Sha256Hash;
        let l = leaves(&["step1", "step2", "step3", "step4"]);
        let expected = h.combine(&h.combine(&l[0], &l[1]), &h.combine(&l[2], &l[3]));
        assert_eq!(merkle_root(&h, &l), Some(expected));
    }

    #[test]
    fn test_five_leaves_carry_across_two_levels() {
        let h = Sha256Hash;
        let l = leaves(&["1", "2", "3", "4", "5"]);
        let left = h.combine(&h.combine(&l[0], &l[1]), &h.combine(&l[2], &l[3]));
        assert_eq!(merkle_root(&h, &l), Some(h.combine(&left, &l[4])));
    }

    proptest! {
        #[test]
        fn root_depends_on_every_leaf(names in proptest::collection::vec("[a-z]{1,8}", 2..12), idx in any::<prop::sample::Index>()) {
            let l: Vec<String> = names.iter().map(|n| Sha256Hash.digest_str(n)).collect();
            let root = merkle_root(&Sha256Hash, &l);

            let mut changed = l.clone();
            let i = idx.index(changed.len());
            changed[i] = Sha256Hash.digest_str(&format!("{}-changed", names[i]));

            prop_assert_ne!(root, merkle_root(&Sha256Hash, &changed));
        }

        #[test]
        fn root_is_deterministic(names in proptest::collection::vec("[a-z]{1,8}", 0..12)) {
            let l: Vec<String> = names.iter().map(|n| Sha256Hash.digest_str(n)).collect();
            prop_assert_eq!(merkle_root(&Sha256Hash, &l), merkle_root(&Sha256Hash, &l));
        }
    }
}
