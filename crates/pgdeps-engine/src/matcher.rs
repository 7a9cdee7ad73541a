//! Lexical reference matching
//!
//! Decides whether a view or function body mentions a target object by
//! looking for its name as a delimited token. This is a heuristic, not a
//! SQL parser:
//!
//! - a string literal or comment containing the token is a false positive
//! - dynamic SQL (`EXECUTE format(...)`) and identifiers split by odd
//!   formatting are false negatives
//! - matching is case-sensitive; unquoted identifiers written in upper
//!   case inside a function body are not found
//!
//! Two forms are tried, in order:
//!
//! 1. qualified, `schema.name`, each part optionally double-quoted
//! 2. bare, `name`, optionally double-quoted, only when the candidate lives
//!    in the target's schema (the default search path would resolve it
//!    there)
//!
//! A token must start at the beginning of the text or after a character
//! that is neither an identifier character, a double quote nor a `.`, and
//! must end at the end of the text or before a character that is neither
//! an identifier character nor a double quote. Identifier characters are
//! Unicode word characters and `$`, as PostgreSQL accepts letters outside
//! ASCII in unquoted names. So `s.t(`, `s.t;`, `s.t)` and `s.t.col` all
//! match `s.t`, while `s.tfoo`, `s.tä` and `x.s.t` do not.

use regex::Regex;

/// Characters that may precede a token
const LEFT_BOUNDARY: &str = r#"(?:^|[^\w$".])"#;

/// Characters that may follow a token
const RIGHT_BOUNDARY: &str = r#"(?:$|[^\w$"])"#;

/// Compiled patterns for one target object
///
/// Build once per target and reuse it for every candidate definition.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    target_schema: String,
    qualified: Regex,
    bare: Regex,
}

impl ReferencePattern {
    /// Compile the patterns for `schema.name`
    pub fn new(schema: &str, name: &str) -> Result<Self, regex::Error> {
        let schema_part = quoted_identifier(schema);
        let name_part = quoted_identifier(name);

        let qualified = Regex::new(&format!(
            r"{}{}\.{}{}",
            LEFT_BOUNDARY, schema_part, name_part, RIGHT_BOUNDARY
        ))?;
        let bare = Regex::new(&format!("{}{}{}", LEFT_BOUNDARY, name_part, RIGHT_BOUNDARY))?;

        Ok(Self {
            target_schema: schema.to_string(),
            qualified,
            bare,
        })
    }

    /// Check whether `definition`, owned by an object of `candidate_schema`,
    /// references the target
    pub fn matches(&self, definition: &str, candidate_schema: &str) -> bool {
        if self.qualified.is_match(definition) {
            return true;
        }

        candidate_schema == self.target_schema && self.bare.is_match(definition)
    }
}

/// Identifier that may or may not be wrapped in double quotes
fn quoted_identifier(ident: &str) -> String {
    format!(r#""?{}"?"#, regex::escape(ident))
}

/// One-shot form of [`ReferencePattern::matches`]
///
/// Never fails: a target whose pattern cannot be compiled matches nothing.
pub fn matches(
    definition: &str,
    target_schema: &str,
    target_name: &str,
    candidate_schema: &str,
) -> bool {
    match ReferencePattern::new(target_schema, target_name) {
        Ok(pattern) => pattern.matches(definition, candidate_schema),
        Err(e) => {
            tracing::warn!("cannot build reference pattern for {}.{}: {}", target_schema, target_name, e);
            false
        }
    }
}
