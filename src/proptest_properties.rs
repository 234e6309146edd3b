//! Property-based tests over the engine's core invariants.
//!
//! Covers the properties the unit suites can only spot-check:
//!
//! 1. **Balanced invariant** — for equal balances `b`, `D == 2b` (±1).
//! 2. **Round-trip conservation** — swapping out and back strictly loses
//!    value, but no more than the fees account for.
//! 3. **Virtual price monotonicity** — swaps never lower the share value.
//! 4. **Liquidity conservation** — add then remove returns no more than
//!    was deposited, and nearly all of it.
//! 5. **Locked-profit decay** — monotone non-increasing, zero at the
//!    horizon.
//! 6. **Optimizer dominance** — the chosen split is never worse than
//!    either pure route.

#![allow(clippy::panic)]

use proptest::prelude::*;

use crate::config::{PoolConfig, DEFAULT_DEGRADATION_RATE};
use crate::domain::{AccountId, Amount, AssetIndex, BasisPoints, Rounding, Shares};
use crate::math::compute_d;
use crate::optimizer::HybridOptimizer;
use crate::pool::{LockedProfitTracker, StablePool};
use crate::traits::NoReserves;

const UNIT: u128 = 1_000_000_000_000_000_000;

fn units(n: u128) -> Amount {
    Amount::new(n * UNIT)
}

fn lp() -> AccountId {
    AccountId::from_bytes([1u8; 32])
}

fn seeded_pool(base: u128, quote: u128, amp: u64) -> StablePool {
    let Ok(config) = PoolConfig::new(
        amp,
        BasisPoints::new(4),
        BasisPoints::new(20),
        DEFAULT_DEGRADATION_RATE,
        0,
    ) else {
        panic!("valid config");
    };
    let Ok(mut pool) = StablePool::new(config) else {
        panic!("pool construction");
    };
    let Ok(_) = pool.add_liquidity(lp(), [units(base), units(quote)], Shares::ZERO, 0) else {
        panic!("seed deposit");
    };
    pool
}

proptest! {
    #[test]
    fn balanced_invariant_equals_sum(b in 1u128..1_000_000, amp in 1u64..10_000) {
        let bal = units(b);
        let Ok(d) = compute_d(&[bal, bal], amp) else {
            panic!("solver failed on balanced input");
        };
        prop_assert!(d.get().abs_diff(2 * bal.get()) <= 1);
    }

    #[test]
    fn round_trip_never_creates_value(
        reserve in 1_000u128..100_000,
        amount in 1u128..500,
        amp in 10u64..5_000,
    ) {
        let mut pool = seeded_pool(reserve, reserve, amp);
        let input = units(amount);
        let Ok(first) = pool.swap(
            AssetIndex::Base,
            AssetIndex::Quote,
            input,
            Amount::ZERO,
            &mut NoReserves,
            0,
        ) else {
            panic!("forward swap");
        };
        let Ok(second) = pool.swap(
            AssetIndex::Quote,
            AssetIndex::Base,
            first.amount_out(),
            Amount::ZERO,
            &mut NoReserves,
            0,
        ) else {
            panic!("return swap");
        };
        // Strict loss: the 4bp fee is charged on both legs.
        prop_assert!(second.amount_out() < input);
        // Bounded loss: two fee legs plus the fee-induced retrace gap stay
        // well under 20bp, so the pool is not silently overcharging either.
        let Ok(floor) = BasisPoints::new(20).apply_complement(input) else {
            panic!("loss floor");
        };
        prop_assert!(second.amount_out() >= floor);
    }

    #[test]
    fn swaps_never_lower_virtual_price(
        reserve in 1_000u128..100_000,
        amount in 1u128..900,
        amp in 10u64..5_000,
    ) {
        let mut pool = seeded_pool(reserve, reserve, amp);
        let Ok(before) = pool.virtual_price(0) else {
            panic!("virtual price");
        };
        let Ok(_) = pool.swap(
            AssetIndex::Base,
            AssetIndex::Quote,
            units(amount),
            Amount::ZERO,
            &mut NoReserves,
            0,
        ) else {
            panic!("swap");
        };
        let Ok(after) = pool.virtual_price(0) else {
            panic!("virtual price");
        };
        prop_assert!(after >= before);
    }

    #[test]
    fn add_remove_conserves_value(
        reserve in 1_000u128..100_000,
        deposit in 10u128..1_000,
        amp in 10u64..5_000,
    ) {
        let mut pool = seeded_pool(reserve, reserve, amp);
        let caller = AccountId::from_bytes([2u8; 32]);
        let put = units(deposit);
        let Ok(minted) = pool.add_liquidity(caller, [put, put], Shares::ZERO, 0) else {
            panic!("deposit");
        };
        let Ok(got) = pool.remove_liquidity(
            caller,
            minted,
            [Amount::ZERO; 2],
            &mut NoReserves,
            0,
        ) else {
            panic!("withdrawal");
        };
        for k in 0..2 {
            prop_assert!(got[k] <= put);
            // Balanced round trip loses only rounding dust.
            prop_assert!(got[k] >= put.saturating_sub(&Amount::new(put.get() / 1_000)));
        }
    }

    #[test]
    fn locked_profit_decays_to_zero(
        gain in 1u128..1_000_000,
        t1 in 0u64..30_000,
        t2 in 0u64..30_000,
    ) {
        let mut tracker = LockedProfitTracker::new(DEFAULT_DEGRADATION_RATE);
        tracker.on_report(units(gain), Amount::ZERO, 0);
        let (early, late) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        prop_assert!(tracker.current_locked(late) <= tracker.current_locked(early));
        // DEFAULT_DEGRADATION_RATE reaches full scale within ~6h.
        prop_assert_eq!(tracker.current_locked(21_601), Amount::ZERO);
    }

    #[test]
    fn optimizer_never_worse_than_pure_routes(
        amount in 1u128..2_000,
        curvature in 2_000u128..50_000,
        direct_bps in 9_000u32..10_000,
    ) {
        let c = units(curvature);
        let swap = move |x: Amount| {
            let penalty = x
                .mul_div(&x, &Amount::new(c.get() * 2), Rounding::Down)
                .unwrap_or(Amount::MAX);
            Ok(x.saturating_sub(&penalty))
        };
        let direct = move |x: Amount| BasisPoints::new(direct_bps).apply(x, Rounding::Down);

        let total = units(amount);
        let Ok(all_swap) = swap(total) else {
            panic!("swap quote");
        };
        let Ok(all_direct) = direct(total) else {
            panic!("direct quote");
        };
        let Ok(quote) = HybridOptimizer::with_defaults().optimize(total, swap, direct) else {
            panic!("optimize");
        };
        prop_assert!(quote.expected_total() >= all_swap);
        prop_assert!(quote.expected_total() >= all_direct);
    }
}
