//! Integration tests for herald-parser crate.

use herald_common::test_utils::{init_test_logging, property_testing};
use herald_parser::{NamedArgumentToken, StringParser};
use proptest::prelude::*;

const EVERYTHING_INPUT: &str = r#"single "with quotes" --key "value with quotes" name=value"#;
const EVERYTHING_INPUT_NAMED_FIRST: &str = r#"--key "value with quotes" name=value single "with quotes" "#;
const NAMED_INPUT: &str = r#"--one one two=two --three "three three" four="four four""#;
const SINGLE_INPUT: &str = "one two three four five";
const QUOTED_INPUT: &str = r#""one one" "two two" "three three" "four four" "five five""#;
const NUMBERS: &str = "12345";

fn positional(parser: &mut StringParser) -> Vec<String> {
    std::iter::from_fn(|| parser.parse_next().map(|t| t.data)).collect()
}

#[test]
fn test_consuming_everything() {
    let mut parser = StringParser::new(NUMBERS);

    assert_eq!(parser.consume_remaining(), NUMBERS);
    assert_eq!(parser.consume_remaining(), "");
    assert!(parser.parse_next().is_none());
}

#[test]
fn test_consuming_predicates() {
    let mut parser = StringParser::new(NUMBERS);

    assert_eq!(parser.consume_while(|c| c == '1').as_deref(), Some("1"));
    assert_eq!(parser.consume_while(|c| c == '2').as_deref(), Some("2"));
    assert_eq!(parser.consume_while(|c| c == '2'), None);
    assert_eq!(parser.parse_next().map(|t| t.data).as_deref(), Some("345"));
    assert_eq!(parser.consume_while(|c| c == '2'), None);
    assert_eq!(parser.consume_remaining(), "");
}

#[test]
fn test_everything_natural_order() {
    init_test_logging();
    let mut parser = StringParser::new(EVERYTHING_INPUT);

    let named = parser.parse_named();

    assert_eq!(
        named,
        vec![
            NamedArgumentToken::new("key", "value with quotes"),
            NamedArgumentToken::new("name", "value"),
        ]
    );
    assert_eq!(positional(&mut parser), vec!["single", "with quotes"]);
}

#[test]
fn test_everything_named_first() {
    let mut parser = StringParser::new(EVERYTHING_INPUT_NAMED_FIRST);

    let named = parser.parse_named();

    assert_eq!(
        named,
        vec![
            NamedArgumentToken::new("key", "value with quotes"),
            NamedArgumentToken::new("name", "value"),
        ]
    );
    assert_eq!(positional(&mut parser), vec!["single", "with quotes"]);
}

#[test]
fn test_single_positional_arguments() {
    let mut parser = StringParser::new(SINGLE_INPUT);

    assert!(parser.parse_named().is_empty());
    assert_eq!(positional(&mut parser), vec!["one", "two", "three", "four", "five"]);
}

#[test]
fn test_quoted_positional_arguments() {
    let mut parser = StringParser::new(QUOTED_INPUT);

    assert!(parser.parse_named().is_empty());
    assert_eq!(
        positional(&mut parser),
        vec!["one one", "two two", "three three", "four four", "five five"]
    );
}

#[test]
fn test_named_arguments_only() {
    let mut parser = StringParser::new(NAMED_INPUT);

    let named = parser.parse_named();

    assert_eq!(
        named,
        vec![
            NamedArgumentToken::new("one", "one"),
            NamedArgumentToken::new("two", "two"),
            NamedArgumentToken::new("three", "three three"),
            NamedArgumentToken::new("four", "four four"),
        ]
    );
    assert!(parser.parse_next().is_none());
}

proptest! {
    #[test]
    fn test_plain_words_round_trip(words in proptest::collection::vec(property_testing::word_strategy(), 0..8)) {
        let mut parser = StringParser::new(words.join(" "));

        prop_assert!(parser.parse_named().is_empty());
        prop_assert_eq!(positional(&mut parser), words);
    }

    #[test]
    fn test_keyword_values_are_extracted(
        key in "[a-z]{1,8}",
        value in property_testing::word_strategy(),
        rest in property_testing::word_strategy(),
    ) {
        let mut parser = StringParser::new(format!("{rest} {key}={value}"));

        let named = parser.parse_named();
        prop_assert_eq!(named, vec![NamedArgumentToken::new(key, value)]);
        prop_assert_eq!(positional(&mut parser), vec![rest]);
    }
}
