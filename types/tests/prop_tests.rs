use proptest::prelude::*;

use rlusd_types::{AccountId, Address, CurrencyCode, Decimal, TokenAmount, TxHash};

proptest! {
    /// Any account id encodes to an address that parses back to the same id.
    #[test]
    fn address_from_account_id_parses(bytes in prop::array::uniform20(0u8..)) {
        let address = Address::from_account_id(AccountId(bytes));
        prop_assert!(address.as_str().starts_with('r'));
        let parsed = Address::parse(address.as_str()).unwrap();
        prop_assert_eq!(parsed.account_id().0, bytes);
    }

    /// Dropping a character from a valid address never yields a valid one
    /// for the same account.
    #[test]
    fn truncated_address_never_matches(bytes in prop::array::uniform20(0u8..)) {
        let address = Address::from_account_id(AccountId(bytes));
        let text = address.as_str();
        let truncated = &text[..text.len() - 1];
        prop_assert!(Address::parse(truncated).map(|a| a.account_id().0 != bytes).unwrap_or(true));
    }

    /// Three-letter alphanumeric codes (other than XRP) use the standard layout.
    #[test]
    fn three_letter_codes_are_standard(code in "[A-Z0-9]{3}") {
        prop_assume!(code != "XRP");
        let parsed = CurrencyCode::parse(&code).unwrap();
        prop_assert!(parsed.is_standard());
        prop_assert_eq!(parsed.ledger_code(), code);
    }

    /// Longer tickers are reported in hex and recognised in either form.
    #[test]
    fn tickers_match_their_hex(code in "[A-Z]{4,20}") {
        let parsed = CurrencyCode::parse(&code).unwrap();
        let hex = parsed.ledger_code();
        prop_assert_eq!(hex.len(), 40);
        prop_assert!(parsed.matches(&hex));
        prop_assert_eq!(parsed.display_name(), code);
    }

    /// Positive integers up to the ceiling are accepted; anything above is not.
    #[test]
    fn ceiling_partitions_amounts(n in 1i64..2_000) {
        let ceiling = Decimal::from(1_000);
        let result = TokenAmount::parse_with_ceiling(&n.to_string(), ceiling);
        prop_assert_eq!(result.is_ok(), n <= 1_000);
    }

    /// Non-positive amounts are always rejected.
    #[test]
    fn non_positive_rejected(n in -1_000_000i64..=0) {
        prop_assert!(TokenAmount::parse(&n.to_string()).is_err());
    }

    /// TxHash hex form roundtrips and is upper-case.
    #[test]
    fn tx_hash_hex(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        let hex = hash.to_hex();
        prop_assert_eq!(hex.clone(), hex.to_uppercase());
        prop_assert_eq!(TxHash::from_hex(&hex).unwrap(), hash);
    }
}
