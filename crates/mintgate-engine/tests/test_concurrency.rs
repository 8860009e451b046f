//! # Concurrent Callers
//!
//! Many threads race for a small supply. The caps must hold exactly and
//! every issued asset must be paid for.

use std::sync::Arc;
use std::thread;

use mintgate_core::{Amount, Identity, Timestamp};
use mintgate_crypto::MembershipTree;
use mintgate_engine::{
    AssetRegistry, EngineState, InMemoryRegistry, LedgerRail, ManualClock, SaleEngine, SaleError,
};
use mintgate_state::{QuotaLimits, SaleConfig};

const H: i64 = 3_600;
const PUB_PRICE: Amount = Amount::new(3_000_000_000_000_000);

fn id(n: u8) -> Identity {
    Identity::from_bytes([n; 20])
}

fn start() -> Timestamp {
    Timestamp::parse("2026-01-01T00:00:00Z").unwrap()
}

type Engine = SaleEngine<InMemoryRegistry, LedgerRail, Arc<ManualClock>>;

fn shared_engine(limits: QuotaLimits) -> (Arc<Engine>, Arc<ManualClock>) {
    let mut config = SaleConfig::new(start(), "ipfs://CID/");
    config.limits = limits;
    let tree = MembershipTree::build([id(1)]).unwrap();
    let state = EngineState::new(config, tree.commitment(), id(0xad), id(0xbe)).unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let engine = SaleEngine::new(
        state,
        InMemoryRegistry::new(),
        LedgerRail::new(),
        Arc::clone(&clock),
    )
    .unwrap();
    (Arc::new(engine), clock)
}

#[test]
fn racing_public_mints_never_oversell() {
    let limits = QuotaLimits {
        max_sale_supply: 50,
        max_total_supply: 60,
        ..QuotaLimits::default()
    };
    let (engine, clock) = shared_engine(limits);
    clock.advance(25 * H).unwrap();

    let handles: Vec<_> = (0u8..32)
        .map(|n| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut minted = 0u64;
                for _ in 0..10 {
                    match engine.public_mint(id(100 + n), 1, PUB_PRICE) {
                        Ok(receipt) => minted += receipt.asset_ids.len() as u64,
                        Err(
                            SaleError::AmountNftPerWalletExceeded { .. }
                            | SaleError::MaxSupplyExceeded { .. },
                        ) => {}
                        Err(other) => panic!("unexpected rejection: {other}"),
                    }
                }
                minted
            })
        })
        .collect();

    let minted: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(minted, 50);
    assert_eq!(engine.total_supply(), 50);
    assert_eq!(engine.with_registry(|r| r.total_minted()), 50);
    assert_eq!(engine.custodied_balance(), PUB_PRICE.checked_mul(50).unwrap());
    for n in 0u8..32 {
        assert!(engine.quota_of(&id(100 + n)).total() <= 4);
        assert_eq!(engine.balance_of(&id(100 + n)), engine.quota_of(&id(100 + n)).total());
    }
}

#[test]
fn same_identity_from_many_threads_respects_cap() {
    let (engine, clock) = shared_engine(QuotaLimits::default());
    clock.advance(25 * H).unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.public_mint(id(7), 1, PUB_PRICE).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .filter_map(|h| h.join().ok())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 4);
    assert_eq!(engine.quota_of(&id(7)).public_minted, 4);
}

#[test]
fn readers_see_whole_operations() {
    let limits = QuotaLimits {
        max_sale_supply: 100,
        max_total_supply: 100,
        ..QuotaLimits::default()
    };
    let (engine, clock) = shared_engine(limits);
    clock.advance(25 * H).unwrap();

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for n in 0u8..25 {
                let _ = engine.public_mint(id(n), 3, PUB_PRICE.checked_mul(3).unwrap());
            }
        })
    };
    let reader = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..500 {
                let snap = engine.snapshot();
                let issued = u128::from(snap.quota.issued());
                assert_eq!(snap.settlement.custodied().units(), issued * PUB_PRICE.units());
                assert_eq!(issued % 3, 0);
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(engine.total_supply(), 75);
}
