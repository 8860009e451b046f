//! # Asset Registry Seam
//!
//! The engine decides *whether* assets may be issued; the registry decides
//! their ids and records who owns them. Ids are assigned sequentially from 1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mintgate_core::{AssetId, Identity};

/// Failures reported by a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The id space is exhausted.
    #[error("asset id space exhausted after {last_id}")]
    IdsExhausted { last_id: u64 },

    /// The registry refused the mint for its own reasons.
    #[error("registry rejected mint: {0}")]
    Rejected(String),
}

/// The external asset-ownership ledger.
pub trait AssetRegistry {
    /// Issue `quantity` new assets to `owner`, returning their ids in order.
    fn mint(&mut self, owner: Identity, quantity: u64) -> Result<Vec<AssetId>, RegistryError>;

    fn balance_of(&self, owner: &Identity) -> u64;

    fn owner_of(&self, asset_id: AssetId) -> Option<Identity>;

    fn tokens_of_owner(&self, owner: &Identity) -> Vec<AssetId>;

    fn total_minted(&self) -> u64;
}

/// In-process registry with sequential ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryRegistry {
    owners: BTreeMap<AssetId, Identity>,
    holdings: BTreeMap<Identity, Vec<AssetId>>,
    last_id: u64,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetRegistry for InMemoryRegistry {
    fn mint(&mut self, owner: Identity, quantity: u64) -> Result<Vec<AssetId>, RegistryError> {
        let last = self
            .last_id
            .checked_add(quantity)
            .ok_or(RegistryError::IdsExhausted {
                last_id: self.last_id,
            })?;
        let ids: Vec<AssetId> = (self.last_id + 1..=last).map(AssetId).collect();
        for id in &ids {
            self.owners.insert(*id, owner);
        }
        self.holdings.entry(owner).or_default().extend(ids.iter().copied());
        self.last_id = last;
        Ok(ids)
    }

    fn balance_of(&self, owner: &Identity) -> u64 {
        self.holdings.get(owner).map_or(0, |ids| ids.len() as u64)
    }

    fn owner_of(&self, asset_id: AssetId) -> Option<Identity> {
        self.owners.get(&asset_id).copied()
    }

    fn tokens_of_owner(&self, owner: &Identity) -> Vec<AssetId> {
        self.holdings.get(owner).cloned().unwrap_or_default()
    }

    fn total_minted(&self) -> u64 {
        self.last_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> Identity {
        Identity::from_bytes([n; 20])
    }

    #[test]
    fn test_ids_start_at_one_and_are_sequential() {
        let mut registry = InMemoryRegistry::new();
        assert_eq!(registry.mint(id(1), 2).unwrap(), vec![AssetId(1), AssetId(2)]);
        assert_eq!(registry.mint(id(2), 1).unwrap(), vec![AssetId(3)]);
        assert_eq!(registry.mint(id(1), 1).unwrap(), vec![AssetId(4)]);
        assert_eq!(registry.total_minted(), 4);
        assert_eq!(registry.balance_of(&id(1)), 3);
        assert_eq!(
            registry.tokens_of_owner(&id(1)),
            vec![AssetId(1), AssetId(2), AssetId(4)]
        );
        assert_eq!(registry.owner_of(AssetId(3)), Some(id(2)));
        assert_eq!(registry.owner_of(AssetId(5)), None);
    }

    #[test]
    fn test_unknown_owner_has_nothing() {
        let registry = InMemoryRegistry::new();
        assert_eq!(registry.balance_of(&id(7)), 0);
        assert!(registry.tokens_of_owner(&id(7)).is_empty());
    }

    #[test]
    fn test_id_exhaustion_is_an_error() {
        let mut registry = InMemoryRegistry {
            last_id: u64::MAX - 1,
            ..InMemoryRegistry::default()
        };
        assert_eq!(
            registry.mint(id(1), 2),
            Err(RegistryError::IdsExhausted { last_id: u64::MAX - 1 })
        );
        assert_eq!(registry.mint(id(1), 1).unwrap(), vec![AssetId(u64::MAX)]);
    }
}
