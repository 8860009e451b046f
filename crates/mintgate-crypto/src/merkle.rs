//! # Membership Tree
//!
//! A binary hash tree summarising the eligible-identity set in a single
//! 32-byte commitment. An identity proves membership with the list of
//! sibling digests on its path to the root.
//!
//! ## Algorithm
//!
//! Domain-separated SHA-256:
//! - Leaf: `SHA256(0x00 || identity_bytes)`.
//! - Node: `SHA256(0x01 || min(a, b) || max(a, b))`.
//!
//! Siblings are ordered lexicographically before hashing at every level, so
//! a proof carries no left/right markers and the same identity set always
//! yields the same commitment regardless of input order.
//!
//! Construction sorts and de-duplicates the leaf digests, pairs adjacent
//! nodes, and promotes an unpaired last node unchanged to the next level.
//!
//! ## Security Invariant
//!
//! The leaf and node prefixes keep a 64-byte interior preimage from ever
//! being accepted as a leaf. Verification is binary: the folded digest
//! equals the commitment byte-for-byte, or the identity is not a member.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use mintgate_core::{Digest, Identity};

use crate::error::CryptoError;

/// Longest proof accepted by [`verify`]. A tree this deep would hold more
/// identities than can exist.
pub const MAX_PROOF_DEPTH: usize = 256;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

fn sha256_parts(parts: &[&[u8]]) -> Digest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Digest::from_bytes(out)
}

/// Compute the leaf digest for an identity: `SHA256(0x00 || identity)`.
pub fn leaf_hash(identity: &Identity) -> Digest {
    sha256_parts(&[&[LEAF_PREFIX], identity.as_bytes()])
}

/// Compute a parent digest with sorted pairing:
/// `SHA256(0x01 || min(a, b) || max(a, b))`.
pub fn node_hash(a: &Digest, b: &Digest) -> Digest {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    sha256_parts(&[&[NODE_PREFIX], lo.as_bytes(), hi.as_bytes()])
}

// ---------------------------------------------------------------------------
// Commitment and proof
// ---------------------------------------------------------------------------

/// The published root digest of a membership tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(pub Digest);

impl Commitment {
    /// Parse a commitment from `0x`-prefixed hex.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Digest::from_hex(s)
            .map(Self)
            .map_err(|e| CryptoError::DigestError(e.to_string()))
    }

    /// The underlying digest.
    pub fn digest(&self) -> &Digest {
        &self.0
    }

    /// Render as `0x`-prefixed hex (66 characters).
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Sibling digests from a leaf up to the root, lowest level first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipProof(pub Vec<Digest>);

impl MembershipProof {
    /// An empty proof (valid only for a single-member tree).
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parse a proof from hex-encoded sibling digests.
    pub fn from_hex_strs<S: AsRef<str>>(items: &[S]) -> Result<Self, CryptoError> {
        items
            .iter()
            .map(|s| Digest::from_hex(s.as_ref()).map_err(|e| CryptoError::DigestError(e.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Number of sibling digests.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the proof has no siblings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex form of every sibling, in order.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.0.iter().map(Digest::to_hex).collect()
    }
}

/// Verify that `identity` belongs to the set summarised by `commitment`.
///
/// Folds the proof against the identity's leaf digest with sorted pairing
/// and compares the result to the commitment. Returns `false` for any
/// non-member and for any malformed proof, including one longer than
/// [`MAX_PROOF_DEPTH`]. Never panics and never errors.
pub fn verify(identity: &Identity, proof: &MembershipProof, commitment: &Commitment) -> bool {
    if proof.len() > MAX_PROOF_DEPTH {
        return false;
    }
    let computed = proof
        .0
        .iter()
        .fold(leaf_hash(identity), |acc, sibling| node_hash(&acc, sibling));
    computed == commitment.0
}

// ---------------------------------------------------------------------------
// Offline construction
// ---------------------------------------------------------------------------

/// A fully materialised membership tree.
///
/// Built offline from the eligible-identity list. `levels[0]` holds the
/// sorted leaf digests; the last level holds the single root.
#[derive(Debug, Clone)]
pub struct MembershipTree {
    levels: Vec<Vec<Digest>>,
}

impl MembershipTree {
    /// Build a tree from an identity list. Order and duplicates are irrelevant.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySet`] when no identity is given.
    pub fn build<I>(identities: I) -> Result<Self, CryptoError>
    where
        I: IntoIterator<Item = Identity>,
    {
        let mut leaves: Vec<Digest> = identities.into_iter().map(|id| leaf_hash(&id)).collect();
        if leaves.is_empty() {
            return Err(CryptoError::EmptySet);
        }
        leaves.sort();
        leaves.dedup();

        let mut levels = vec![leaves];
        while let Some(level) = levels.last() {
            if level.len() == 1 {
                break;
            }
            let next: Vec<Digest> = level
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(right) => node_hash(&pair[0], right),
                    None => pair[0],
                })
                .collect();
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// The root commitment.
    pub fn commitment(&self) -> Commitment {
        // `build` guarantees a non-empty top level.
        Commitment(self.levels[self.levels.len() - 1][0])
    }

    /// Number of distinct members.
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    /// Always false: an empty tree cannot be built.
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// Depth of the tree (number of levels above the leaves).
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Whether `identity` is one of the leaves.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.levels[0].binary_search(&leaf_hash(identity)).is_ok()
    }

    /// Produce the inclusion proof for `identity`, or `None` for a non-member.
    pub fn proof(&self, identity: &Identity) -> Option<MembershipProof> {
        let mut index = self.levels[0].binary_search(&leaf_hash(identity)).ok()?;
        let mut siblings = Vec::with_capacity(self.depth());
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            if sibling < level.len() {
                siblings.push(level[sibling]);
            }
            index /= 2;
        }
        Some(MembershipProof(siblings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u8) -> Identity {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        bytes[0] = 0xA0;
        Identity::from_bytes(bytes)
    }

    #[test]
    fn test_leaf_and_node_are_domain_separated() {
        let a = id(1);
        let leaf = leaf_hash(&a);
        assert_ne!(leaf, mintgate_core::sha256(a.as_bytes()));
        let n = node_hash(&leaf, &leaf);
        assert_ne!(n, leaf);
    }

    #[test]
    fn test_node_hash_is_order_independent() {
        let a = leaf_hash(&id(1));
        let b = leaf_hash(&id(2));
        assert_eq!(node_hash(&a, &b), node_hash(&b, &a));
    }

    #[test]
    fn test_empty_set_rejected() {
        let result = MembershipTree::build(Vec::new());
        assert_eq!(result.unwrap_err(), CryptoError::EmptySet);
    }

    #[test]
    fn test_single_member_tree() {
        let tree = MembershipTree::build([id(7)]).unwrap();
        assert_eq!(tree.commitment().0, leaf_hash(&id(7)));
        let proof = tree.proof(&id(7)).unwrap();
        assert!(proof.is_empty());
        assert!(verify(&id(7), &proof, &tree.commitment()));
        assert!(!verify(&id(8), &proof, &tree.commitment()));
    }

    #[test]
    fn test_two_member_tree() {
        let tree = MembershipTree::build([id(1), id(2)]).unwrap();
        let expected = node_hash(&leaf_hash(&id(1)), &leaf_hash(&id(2)));
        assert_eq!(tree.commitment().0, expected);
        for who in [id(1), id(2)] {
            let proof = tree.proof(&who).unwrap();
            assert_eq!(proof.len(), 1);
            assert!(verify(&who, &proof, &tree.commitment()));
        }
    }

    #[test]
    fn test_odd_sized_tree_promotes_last_node() {
        for size in 1..=17u8 {
            let members: Vec<Identity> = (0..size).map(id).collect();
            let tree = MembershipTree::build(members.clone()).unwrap();
            assert_eq!(tree.len(), size as usize);
            for m in &members {
                let proof = tree.proof(m).unwrap();
                assert!(proof.len() <= tree.depth());
                assert!(verify(m, &proof, &tree.commitment()), "size {size}, member {m}");
            }
        }
    }

    #[test]
    fn test_insertion_order_and_duplicates_do_not_matter() {
        let a = MembershipTree::build([id(1), id(2), id(3)]).unwrap();
        let b = MembershipTree::build([id(3), id(1), id(2), id(1)]).unwrap();
        assert_eq!(a.commitment(), b.commitment());
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_non_member_has_no_proof() {
        let tree = MembershipTree::build([id(1), id(2)]).unwrap();
        assert!(tree.proof(&id(3)).is_none());
        assert!(!tree.contains(&id(3)));
    }

    #[test]
    fn test_member_proof_fails_against_other_identity() {
        let tree = MembershipTree::build([id(1), id(2), id(3), id(4)]).unwrap();
        let proof = tree.proof(&id(1)).unwrap();
        assert!(!verify(&id(5), &proof, &tree.commitment()));
    }

    #[test]
    fn test_tampered_proof_fails() {
        let tree = MembershipTree::build((0..8).map(id)).unwrap();
        let mut proof = tree.proof(&id(3)).unwrap();
        proof.0[1].0[0] ^= 0x01;
        assert!(!verify(&id(3), &proof, &tree.commitment()));
    }

    #[test]
    fn test_truncated_and_extended_proofs_fail() {
        let tree = MembershipTree::build((0..8).map(id)).unwrap();
        let proof = tree.proof(&id(3)).unwrap();

        let mut short = proof.clone();
        short.0.pop();
        assert!(!verify(&id(3), &short, &tree.commitment()));

        let mut long = proof;
        long.0.push(leaf_hash(&id(9)));
        assert!(!verify(&id(3), &long, &tree.commitment()));
    }

    #[test]
    fn test_oversized_proof_rejected() {
        let tree = MembershipTree::build([id(1)]).unwrap();
        let proof = MembershipProof(vec![leaf_hash(&id(2)); MAX_PROOF_DEPTH + 1]);
        assert!(!verify(&id(1), &proof, &tree.commitment()));
    }

    #[test]
    fn test_rotated_commitment_invalidates_old_proofs() {
        let old = MembershipTree::build([id(1), id(2)]).unwrap();
        let new = MembershipTree::build([id(2), id(3)]).unwrap();
        let proof = old.proof(&id(1)).unwrap();
        assert!(verify(&id(1), &proof, &old.commitment()));
        assert!(!verify(&id(1), &proof, &new.commitment()));
    }

    #[test]
    fn test_commitment_hex_roundtrip() {
        let tree = MembershipTree::build([id(1), id(2)]).unwrap();
        let hex = tree.commitment().to_hex();
        assert_eq!(hex.len(), 66);
        assert_eq!(Commitment::from_hex(&hex).unwrap(), tree.commitment());
        assert!(Commitment::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_proof_hex_strings_roundtrip() {
        let tree = MembershipTree::build((0..5).map(id)).unwrap();
        let proof = tree.proof(&id(4)).unwrap();
        let parsed = MembershipProof::from_hex_strs(&proof.to_hex_strings()).unwrap();
        assert_eq!(parsed, proof);
    }

    #[test]
    fn test_serde_uses_hex_strings() {
        let tree = MembershipTree::build((0..3).map(id)).unwrap();
        let proof = tree.proof(&id(0)).unwrap();
        let json = serde_json::to_value(&proof).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), proof.len());
        assert!(items.iter().all(|v| v.as_str().is_some_and(|s| s.starts_with("0x"))));

        let commitment = serde_json::to_value(tree.commitment()).unwrap();
        assert_eq!(commitment, serde_json::json!(tree.commitment().to_hex()));
    }

    fn identity_strategy() -> impl Strategy<Value = Identity> {
        prop::array::uniform20(any::<u8>()).prop_map(Identity::from_bytes)
    }

    proptest! {
        /// Every member of a random set verifies against the set's commitment.
        #[test]
        fn members_always_verify(
            members in prop::collection::btree_set(identity_strategy(), 1..64)
        ) {
            let tree = MembershipTree::build(members.iter().copied()).unwrap();
            let commitment = tree.commitment();
            for m in &members {
                let proof = tree.proof(m).unwrap();
                prop_assert!(verify(m, &proof, &commitment));
            }
        }

        /// A random non-member never verifies, whichever member's proof it borrows.
        #[test]
        fn non_members_never_verify(
            members in prop::collection::btree_set(identity_strategy(), 1..32),
            outsider in identity_strategy(),
        ) {
            prop_assume!(!members.contains(&outsider));
            let tree = MembershipTree::build(members.iter().copied()).unwrap();
            let commitment = tree.commitment();
            prop_assert!(tree.proof(&outsider).is_none());
            for m in &members {
                let borrowed = tree.proof(m).unwrap();
                prop_assert!(!verify(&outsider, &borrowed, &commitment));
            }
            prop_assert!(!verify(&outsider, &MembershipProof::empty(), &commitment));
        }

        /// The commitment depends only on the set, not on insertion order.
        #[test]
        fn commitment_is_order_independent(
            members in prop::collection::vec(identity_strategy(), 1..32)
        ) {
            let forward = MembershipTree::build(members.iter().copied()).unwrap();
            let reversed = MembershipTree::build(members.iter().rev().copied()).unwrap();
            prop_assert_eq!(forward.commitment(), reversed.commitment());
        }
    }
}
