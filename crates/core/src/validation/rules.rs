//! Rule names and chain parsing.

/// A built-in validation rule, identified by its chain name.
///
/// Rule dispatch is an explicit name-to-tag mapping; there is no dynamic
/// lookup of handler functions by string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    Min,
    Max,
    Password,
    Alpha,
    Alphanumeric,
    Numeric,
    Integer,
    PostalCode,
    Url,
    Match,
    In,
    Unique,
}

impl Rule {
    /// Resolve a chain token name to a rule tag. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Rule> {
        match name {
            "required" => Some(Rule::Required),
            "email" => Some(Rule::Email),
            "min" => Some(Rule::Min),
            "max" => Some(Rule::Max),
            "password" => Some(Rule::Password),
            "alpha" => Some(Rule::Alpha),
            "alphanumeric" => Some(Rule::Alphanumeric),
            "numeric" => Some(Rule::Numeric),
            "integer" => Some(Rule::Integer),
            "postalcode" => Some(Rule::PostalCode),
            "url" => Some(Rule::Url),
            "match" => Some(Rule::Match),
            "in" => Some(Rule::In),
            "unique" => Some(Rule::Unique),
            _ => None,
        }
    }
}

/// A parsed rule with its parameters, e.g. `min:8` or `in:1,2,3,4,5`.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub rule: Rule,
    pub params: Vec<String>,
}

/// A single token of a rule chain. Unknown rule names are preserved so the
/// engine can decide whether to skip them (default) or reject them (strict
/// mode).
#[derive(Debug, Clone)]
pub enum ChainToken {
    Known(RuleSpec),
    Unknown(String),
}

/// Parse a pipe-delimited rule chain into its tokens.
///
/// Each token optionally carries parameters after the first `:`, separated
/// by commas. Evaluation order is declaration order.
pub fn parse_chain(chain: &str) -> Vec<ChainToken> {
    chain
        .split('|')
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> ChainToken {
    let (name, params) = match token.split_once(':') {
        Some((name, param_str)) => (
            name,
            param_str.split(',').map(str::to_string).collect::<Vec<_>>(),
        ),
        None => (token, Vec::new()),
    };

    match Rule::from_name(name) {
        Some(rule) => ChainToken::Known(RuleSpec { rule, params }),
        None => ChainToken::Unknown(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_bare_rule() {
        let tokens = parse_chain("required");
        assert_eq!(tokens.len(), 1);
        assert_matches!(&tokens[0], ChainToken::Known(spec) => {
            assert_eq!(spec.rule, Rule::Required);
            assert!(spec.params.is_empty());
        });
    }

    #[test]
    fn parses_chain_in_declaration_order() {
        let tokens = parse_chain("required|email|max:255");
        assert_eq!(tokens.len(), 3);
        assert_matches!(&tokens[0], ChainToken::Known(s) => assert_eq!(s.rule, Rule::Required));
        assert_matches!(&tokens[1], ChainToken::Known(s) => assert_eq!(s.rule, Rule::Email));
        assert_matches!(&tokens[2], ChainToken::Known(s) => {
            assert_eq!(s.rule, Rule::Max);
            assert_eq!(s.params, vec!["255"]);
        });
    }

    #[test]
    fn parses_comma_separated_params() {
        let tokens = parse_chain("in:1,2,3,4,5");
        assert_matches!(&tokens[0], ChainToken::Known(spec) => {
            assert_eq!(spec.rule, Rule::In);
            assert_eq!(spec.params, vec!["1", "2", "3", "4", "5"]);
        });
    }

    #[test]
    fn only_first_colon_splits_name_from_params() {
        let tokens = parse_chain("unique:users,email,42");
        assert_matches!(&tokens[0], ChainToken::Known(spec) => {
            assert_eq!(spec.rule, Rule::Unique);
            assert_eq!(spec.params, vec!["users", "email", "42"]);
        });
    }

    #[test]
    fn unknown_names_are_preserved() {
        let tokens = parse_chain("required|frobnicate:3");
        assert_matches!(&tokens[1], ChainToken::Unknown(name) => assert_eq!(name, "frobnicate"));
    }

    #[test]
    fn empty_tokens_are_dropped() {
        assert!(parse_chain("").is_empty());
        assert_eq!(parse_chain("required|").len(), 1);
    }
}
