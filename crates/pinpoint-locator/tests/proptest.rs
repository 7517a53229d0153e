//! Property-based tests for the locator grammar.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use proptest::prelude::*;

use pinpoint_locator::Locator;

// Strategy for plain tokens with no grammar characters.
fn plain_token() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._+$-]{1,30}".prop_filter("no grammar chars and no bare name", |s| {
        !s.contains([':', ',', '(', ')'])
    })
}

fn dimension_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,10}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any paren nesting depth round-trips with exactly one layer stripped.
    #[test]
    fn nested_parens_strip_one_layer(name in dimension_name(), inner in "[a-z]{1,8}", depth in 1usize..8) {
        let wrapped = format!("{}{}{}", "(".repeat(depth), inner, ")".repeat(depth));
        let text = format!("{name}:{wrapped}");
        let mut locator = Locator::new(&text).unwrap();
        let expected = format!("{}{}{}", "(".repeat(depth - 1), inner, ")".repeat(depth - 1));
        prop_assert_eq!(locator.single_value_of(&name).unwrap(), Some(expected));
    }

    /// A base64 literal decodes to the original text and is never re-parsed
    /// as locator syntax, whatever the payload contains.
    #[test]
    fn base64_literals_are_opaque(payload in "[ -~]{0,40}") {
        let text = format!("$base64:{}", STANDARD.encode(&payload));
        let locator = Locator::new(&text).unwrap();
        prop_assert!(locator.is_single_value());
        prop_assert_eq!(locator.dimension_count(), 0);
        prop_assert_eq!(locator.single_value(), Some(payload.as_str()));
    }

    /// Base64 round-trips through the value position of a dimension, too.
    #[test]
    fn base64_round_trips_in_value_position(name in dimension_name(), payload in "[ -~]{0,40}") {
        let text = format!("{name}:($base64:{})", STANDARD.encode(&payload));
        let mut locator = Locator::new(&text).unwrap();
        prop_assert_eq!(locator.single_value_of(&name).unwrap(), Some(payload));
    }

    /// Tokens without a top-level colon or a name(value) group parse as
    /// single values equal to the input.
    #[test]
    fn plain_tokens_are_single_values(token in plain_token()) {
        let locator = Locator::new(&token).unwrap();
        prop_assert!(locator.is_single_value());
        prop_assert_eq!(locator.single_value(), Some(token.as_str()));
    }

    /// Every name in the dimension alphabet is accepted with a value.
    #[test]
    fn valid_names_parse(name in dimension_name(), value in "[a-z0-9]{0,10}") {
        let text = format!("{name}:{value}");
        let mut locator = Locator::new(&text).unwrap();
        prop_assert_eq!(locator.single_value_of(&name).unwrap(), Some(value));
    }

    /// An escaped value is literal: one paren layer around arbitrary text
    /// (with balanced inner parens) round-trips unchanged.
    #[test]
    fn escaped_text_round_trips(inner in "[a-z:,]{0,20}") {
        let text = format!("({inner})");
        let locator = Locator::new(&text).unwrap();
        prop_assert_eq!(locator.single_value(), Some(inner.as_str()));
    }

    /// Rebuilding locator text from pairs parses back to the same pairs.
    #[test]
    fn pair_rendering_round_trips(
        names in prop::collection::vec(dimension_name(), 1..5),
        values in prop::collection::vec("[a-z:,()]{0,10}".prop_filter("balanced", |v| {
            let mut depth = 0i32;
            for c in v.chars() {
                match c {
                    '(' => depth += 1,
                    ')' => { depth -= 1; if depth < 0 { return false; } }
                    _ => {}
                }
            }
            depth == 0
        }), 1..5),
    ) {
        let pairs: Vec<(&str, &str)> = names
            .iter()
            .zip(values.iter())
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect();
        let text = Locator::text_from_pairs(&pairs);
        let mut locator = Locator::new(&text).unwrap();
        for (name, value) in &pairs {
            let read = locator.values_of(name);
            prop_assert!(read.iter().any(|r| r == value), "{:?} missing in {:?}", value, read);
        }
    }
}
