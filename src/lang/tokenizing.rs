//! Tokenizing is deliberately trivial in this language.  A token is any run of
//! non-whitespace characters and is never split further, so the whole
//! tokenizer is a thin wrapper around `split_whitespace`.  The only subtlety
//! lives in [`parse_forth_int`], which decides whether a word token doubles as
//! an integer literal.

/// Split an input line into its whitespace separated word tokens.
///
/// Empty input yields an empty list, no token is ever empty, and no token
/// contains whitespace.  This is a pure function with no failure mode.
pub fn split_into_words(input: &str) -> Vec<&str> {
    input.split_whitespace().collect()
}

/// Try to read a token as a signed decimal integer literal.
///
/// The words `+` and `-` are always treated as words, never as numbers, even
/// though `-` is a valid integer prefix.
pub fn parse_forth_int(token: &str) -> Option<i64> {
    if token == "+" || token == "-" {
        return None;
    }

    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(split_into_words("").is_empty());
        assert!(split_into_words("   \t \n ").is_empty());
    }

    #[test]
    fn tokens_are_split_on_any_whitespace_run() {
        assert_eq!(
            split_into_words("1 2\t+\n  ."),
            vec!["1", "2", "+", "."]
        );
    }

    #[test]
    fn tokenizing_is_idempotent_on_already_split_input() {
        let input = "10 1 IF 20 ELSE 30 THEN .";

        for token in split_into_words(input) {
            assert_eq!(split_into_words(token), vec![token]);
        }
    }

    #[test]
    fn tokenizing_distributes_over_concatenation() {
        let a = ": double 2 *";
        let b = "; 21 double .";

        let mut expected = split_into_words(a);
        expected.extend(split_into_words(b));

        assert_eq!(split_into_words(&format!("{} {}", a, b)), expected);
    }

    #[test]
    fn integer_literals() {
        assert_eq!(parse_forth_int("42"), Some(42));
        assert_eq!(parse_forth_int("-17"), Some(-17));
        assert_eq!(parse_forth_int("0"), Some(0));
        assert_eq!(parse_forth_int("12abc"), None);
        assert_eq!(parse_forth_int("EMIT"), None);
    }

    #[test]
    fn plus_and_minus_are_words_not_numbers() {
        assert_eq!(parse_forth_int("+"), None);
        assert_eq!(parse_forth_int("-"), None);
    }
}
