// ═══════════════════════════════════════════════════════════════════
// Reconciler Tests — apply_live_quote, apply_live_quotes, net worth
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;

use vault_core::errors::CoreError;
use vault_core::models::aggregate::Percentage;
use vault_core::models::holding::{
    DepositDetails, DepositStatus, DepositType, HoldingRecord, InterestPayout, MetalDetails,
    MetalForm, MetalType,
};
use vault_core::models::loan::{LoanRecord, LoanType};
use vault_core::models::quote::SpotQuote;
use vault_core::services::derivation::summarize;
use vault_core::services::net_worth::{appreciation_of, equity_of, recompute_net_worth};
use vault_core::services::reconciler::{apply_live_quote, apply_live_quotes};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 13, h, 0, 0).unwrap()
}

fn gold(id: &str, grams: f64) -> HoldingRecord {
    let details = MetalDetails {
        metal: MetalType::Gold,
        form: MetalForm::Bar,
        purity: "999".into(),
        storage_location: "Bank Locker".into(),
        vendor: None,
    };
    HoldingRecord::metal("Gold Bar", details, grams, 5_000.0, d(2024, 1, 10)).with_id(id)
}

fn btc(id: &str, coins: f64) -> HoldingRecord {
    HoldingRecord::crypto("Bitcoin", "btc", coins, 3_000_000.0, d(2025, 6, 1)).with_id(id)
}

fn fd(id: &str, principal: f64) -> HoldingRecord {
    let details = DepositDetails {
        bank_name: "SBI".into(),
        deposit_type: DepositType::SeniorCitizenFd,
        interest_rate_percent: 7.5,
        tenure_months: 24,
        maturity_date: d(2027, 1, 1),
        maturity_amount: principal * 1.15,
        interest_earned: principal * 0.15,
        interest_accrued: 0.0,
        status: DepositStatus::Active,
        interest_payout: InterestPayout::Quarterly,
        auto_renewal: true,
    };
    HoldingRecord::deposit("SBI FD", details, principal, d(2025, 1, 1)).with_id(id)
}

fn quotes(entries: &[(&str, f64)]) -> HashMap<String, SpotQuote> {
    entries
        .iter()
        .map(|(id, price)| (id.to_string(), SpotQuote::new(*id, *price, at(10))))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════
// apply_live_quote
// ═══════════════════════════════════════════════════════════════════

mod single_quote {
    use super::*;

    #[test]
    fn advances_price_value_and_timestamp() {
        let record = gold("g1", 10.0);
        let updated = apply_live_quote(&record, 6_850.0, at(9)).unwrap();
        assert_eq!(updated.current_unit_price(), 6_850.0);
        assert_eq!(updated.current_value(), 68_500.0);
        assert_eq!(updated.last_updated_at(), at(9));
        assert_eq!(updated.id, "g1");
    }

    #[test]
    fn leaves_input_untouched() {
        let record = gold("g1", 10.0);
        let before = record.clone();
        let _ = apply_live_quote(&record, 6_850.0, at(9)).unwrap();
        assert_eq!(record, before);
    }

    #[test]
    fn value_matches_quantity_times_price() {
        let record = gold("g1", 7.3);
        for price in [0.0, 1.0, 6_850.25, 1e9] {
            let updated = apply_live_quote(&record, price, at(9)).unwrap();
            assert_eq!(updated.current_value(), updated.quantity() * updated.current_unit_price());
        }
    }

    #[test]
    fn same_quote_twice_only_moves_timestamp() {
        let record = gold("g1", 10.0);
        let first = apply_live_quote(&record, 6_850.0, at(9)).unwrap();
        let second = apply_live_quote(&first, 6_850.0, at(11)).unwrap();
        assert_eq!(first.current_unit_price(), second.current_unit_price());
        assert_eq!(first.current_value(), second.current_value());
        assert_eq!(second.last_updated_at(), at(11));
    }

    #[test]
    fn negative_quote_rejected_and_record_unchanged() {
        let record = gold("g1", 10.0);
        let before = record.clone();
        let err = apply_live_quote(&record, -5.0, at(9)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuote { price, .. } if price == -5.0));
        assert_eq!(record, before);
    }

    #[test]
    fn non_finite_quotes_rejected() {
        let record = gold("g1", 10.0);
        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                apply_live_quote(&record, price, at(9)),
                Err(CoreError::InvalidQuote { .. })
            ));
        }
    }

    #[test]
    fn zero_is_a_valid_quote() {
        let updated = apply_live_quote(&gold("g1", 10.0), 0.0, at(9)).unwrap();
        assert_eq!(updated.current_value(), 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// apply_live_quotes
// ═══════════════════════════════════════════════════════════════════

mod batch_quotes {
    use super::*;

    #[test]
    fn partial_override_keeps_order_and_unmatched() {
        let records = vec![fd("fd1", 100_000.0), gold("g1", 10.0), btc("c1", 0.5)];
        let updated = apply_live_quotes(&records, &quotes(&[("gold", 6_850.0)])).unwrap();

        let ids: Vec<&str> = updated.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["fd1", "g1", "c1"]);
        assert_eq!(updated[0], records[0]);
        assert_eq!(updated[1].current_value(), 68_500.0);
        assert_eq!(updated[1].last_updated_at(), at(10));
        assert_eq!(updated[2], records[2]);
    }

    #[test]
    fn crypto_matched_by_uppercase_symbol() {
        let records = vec![btc("c1", 0.5)];
        let updated = apply_live_quotes(&records, &quotes(&[("BTC", 4_000_000.0)])).unwrap();
        assert_eq!(updated[0].current_value(), 2_000_000.0);
    }

    #[test]
    fn every_matching_holding_repriced() {
        let records = vec![gold("g1", 10.0), gold("g2", 2.0)];
        let updated = apply_live_quotes(&records, &quotes(&[("gold", 7_000.0)])).unwrap();
        assert_eq!(updated[0].current_value(), 70_000.0);
        assert_eq!(updated[1].current_value(), 14_000.0);
    }

    #[test]
    fn empty_quotes_change_nothing() {
        let records = vec![gold("g1", 10.0), btc("c1", 1.0)];
        let updated = apply_live_quotes(&records, &HashMap::new()).unwrap();
        assert_eq!(updated, records);
    }

    #[test]
    fn one_invalid_quote_rejects_batch() {
        let records = vec![gold("g1", 10.0), btc("c1", 1.0)];
        let err = apply_live_quotes(
            &records,
            &quotes(&[("gold", 6_850.0), ("BTC", f64::NAN)]),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuote { ref identifier, .. } if identifier == "BTC"));
    }

    #[test]
    fn invalid_quote_for_unheld_asset_is_ignored() {
        let records = vec![gold("g1", 10.0)];
        let updated = apply_live_quotes(&records, &quotes(&[("gold", 6_850.0), ("ETH", -1.0)])).unwrap();
        assert_eq!(updated[0].current_value(), 68_500.0);
    }

    #[test]
    fn aggregates_follow_reconciled_records() {
        let records = vec![gold("g1", 10.0)];
        assert_eq!(summarize(&records).total_current_value, 50_000.0);
        let updated = apply_live_quotes(&records, &quotes(&[("gold", 6_850.0)])).unwrap();
        let agg = summarize(&updated);
        assert_eq!(agg.total_current_value, 68_500.0);
        assert_eq!(agg.total_return_percent, Percentage::Defined(37.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
// net worth
// ═══════════════════════════════════════════════════════════════════

mod net_worth {
    use super::*;

    fn home_loan(id: &str, asset: &str, outstanding: f64) -> LoanRecord {
        LoanRecord {
            id: id.into(),
            loan_type: LoanType::Home,
            linked_asset_id: asset.into(),
            loan_amount: 1_200_000.0,
            outstanding_balance: outstanding,
            monthly_emi: 18_000.0,
            interest_rate_percent: 8.4,
            start_date: d(2021, 5, 1),
            end_date: d(2036, 4, 30),
        }
    }

    #[test]
    fn assets_minus_loans() {
        let assets = vec![fd("fd1", 2_298_943.0)];
        let loans = vec![home_loan("l1", "fd1", 600_000.0), home_loan("l2", "x", 250_000.0)];
        let state = recompute_net_worth(assets, loans);
        assert_eq!(state.total_asset_value(), 2_298_943.0);
        assert_eq!(state.total_loan_value(), 850_000.0);
        assert_eq!(state.net_worth(), 1_448_943.0);
    }

    #[test]
    fn no_loans() {
        let state = recompute_net_worth(vec![gold("g1", 10.0)], vec![]);
        assert_eq!(state.net_worth(), state.total_asset_value());
    }

    #[test]
    fn appreciation() {
        let record = apply_live_quote(&gold("g1", 10.0), 4_000.0, at(9)).unwrap();
        let a = appreciation_of(&record);
        assert_eq!(a.invested, 50_000.0);
        assert_eq!(a.current, 40_000.0);
        assert_eq!(a.gain, -10_000.0);
        assert_eq!(a.gain_percent, Percentage::Defined(-20.0));
        assert!(!a.is_positive);
    }

    #[test]
    fn appreciation_on_zero_cost_is_undefined() {
        let gift = HoldingRecord::crypto("Airdrop", "ETH", 2.0, 0.0, d(2025, 1, 1));
        let a = appreciation_of(&gift);
        assert!(a.gain_percent.is_undefined());
        assert!(a.is_positive);
    }

    #[test]
    fn equity_subtracts_linked_loan() {
        let state = recompute_net_worth(
            vec![fd("fd1", 900_000.0).with_loan("l1"), gold("g1", 10.0).with_loan("dangling")],
            vec![home_loan("l1", "fd1", 400_000.0)],
        );
        assert_eq!(equity_of(&state, "fd1").unwrap(), 500_000.0);
        assert_eq!(equity_of(&state, "g1").unwrap(), 50_000.0);
        assert!(matches!(equity_of(&state, "nope"), Err(CoreError::RecordNotFound(_))));
    }
}
