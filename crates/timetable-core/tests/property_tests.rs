use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use timetable_core::algorithms::{Algorithm, AlgorithmKind, Amortization};
use timetable_core::params::LoanParameters;
use timetable_core::timetable::Timetable;

fn kind() -> impl Strategy<Value = AlgorithmKind> {
    prop::sample::select(AlgorithmKind::ALL.to_vec())
}

/// Amount in cents, annual rate in hundredths of a percent, duration, deferral.
fn loan() -> impl Strategy<Value = (i64, i64, u32, u32)> {
    (1i64..=500_000_000, 0i64..=2_500, 1u32..=120).prop_flat_map(|(cents, bp, duration)| {
        (Just(cents), Just(bp), Just(duration), 0..duration)
    })
}

fn build(kind: AlgorithmKind, cents: i64, bp: i64, duration: u32, deferred: u32) -> Timetable {
    let deferred = if kind == AlgorithmKind::UncapitalizedBullet { 0 } else { deferred };
    let params = LoanParameters::builder(
        Decimal::new(cents, 2),
        Decimal::new(bp, 2),
        NaiveDate::from_ymd_opt(2019, 10, 31).unwrap(),
        duration,
    )
    .deferred_in_periods(deferred)
    .build()
    .unwrap();
    Algorithm::new(kind, params)
        .unwrap()
        .build_full_timetable()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn capital_and_interest_are_conserved(kind in kind(), (cents, bp, duration, deferred) in loan()) {
        let amount = Decimal::new(cents, 2);
        let tt = build(kind, cents, bp, duration, deferred);
        prop_assert_eq!(tt.len(), duration as usize);

        let total = tt.total_interests();
        for term in &tt {
            prop_assert_eq!(term.paid_capital() + term.remaining_capital(), amount);
            prop_assert_eq!(term.paid_interests() + term.remaining_interests(), total);
            prop_assert_eq!(term.payment(), term.capital() + term.interests());
            prop_assert!(term.capital() >= Decimal::ZERO);
        }
        let last = tt.last().unwrap();
        prop_assert_eq!(last.remaining_capital(), Decimal::ZERO);
        prop_assert_eq!(last.remaining_interests(), Decimal::ZERO);
    }

    #[test]
    fn remaining_capital_is_monotonic(kind in kind(), (cents, bp, duration, deferred) in loan()) {
        let tt = build(kind, cents, bp, duration, deferred);
        for pair in tt.terms().windows(2) {
            prop_assert!(pair[1].remaining_capital() <= pair[0].remaining_capital());
            prop_assert!(pair[1].paid_capital() >= pair[0].paid_capital());
        }
    }

    #[test]
    fn interest_is_never_negative_and_accrues_monotonically(
        kind in kind(),
        (cents, bp, duration, deferred) in loan(),
    ) {
        // InFine settles its whole rounding difference on the last term.
        prop_assume!(kind != AlgorithmKind::InFine);
        let tt = build(kind, cents, bp, duration, deferred);
        for term in &tt {
            prop_assert!(term.interests() >= Decimal::ZERO, "term {}", term.index);
        }
        for pair in tt.terms().windows(2) {
            prop_assert!(pair[1].paid_interests() >= pair[0].paid_interests());
            prop_assert!(pair[1].remaining_interests() <= pair[0].remaining_interests());
        }
    }

    #[test]
    fn annuity_rounding_drift_stays_below_a_cent((cents, bp, duration, deferred) in loan()) {
        let tt = build(AlgorithmKind::Standard, cents, bp, duration, deferred);
        for term in &tt {
            let detail = term.amounts.rounding.as_ref().unwrap();
            prop_assert!(detail.accrued_delta.abs() < dec!(0.01));
            prop_assert_eq!(detail.paid_total, term.paid_capital() + term.paid_interests());
        }
    }

    #[test]
    fn every_amount_has_cent_precision(kind in kind(), (cents, bp, duration, deferred) in loan()) {
        let tt = build(kind, cents, bp, duration, deferred);
        for term in &tt {
            prop_assert_eq!(term.payment(), term.payment().round_dp(2));
            prop_assert_eq!(term.interests(), term.interests().round_dp(2));
        }
    }
}
