//! Naming strategies for rewriting logical names into wire names
//!
//! A naming strategy is applied to every record name, record field name,
//! enum name, and enum symbol during schema derivation, uniformly at every
//! nesting depth. Strategies must be pure and stable: the same input always
//! produces the same output, with no dependence on external state.

/// Maps a logical field/type name to its wire-level name.
///
/// Implemented by the built-in strategies below; any `Fn(&str) -> String`
/// closure works as a custom strategy with no further coupling to the
/// schema engine. Strategies need not be invertible.
pub trait NamingStrategy {
    fn apply(&self, name: &str) -> String;
}

impl<F> NamingStrategy for F
where
    F: Fn(&str) -> String,
{
    fn apply(&self, name: &str) -> String {
        self(name)
    }
}

/// Returns every name unchanged. The default strategy when deriving a
/// writer schema from a descriptor without an explicit strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNaming;

impl NamingStrategy for IdentityNaming {
    fn apply(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Rewrites camelCase logical names to snake_case wire names.
///
/// A separator is inserted before an uppercase letter exactly when the
/// preceding character is not itself uppercase, so acronym runs never
/// produce doubled separators: `ipv4Address` becomes `ipv4_address` and
/// `myIPv4Field` becomes `my_ipv4_field`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseNaming;

impl NamingStrategy for SnakeCaseNaming {
    fn apply(&self, name: &str) -> String {
        let mut wire = String::with_capacity(name.len() + 4);
        // True at the start so a leading uppercase letter gets no separator
        let mut prev_upper = true;
        for ch in name.chars() {
            if ch.is_uppercase() {
                if !prev_upper {
                    wire.push('_');
                }
                wire.extend(ch.to_lowercase());
                prev_upper = true;
            } else {
                wire.push(ch);
                prev_upper = false;
            }
        }
        wire
    }
}

/// Rewrites camelCase logical names to PascalCase wire names.
///
/// Uppercases the first character only; internal casing is preserved, so
/// `ipv4Address` becomes `Ipv4Address`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PascalCaseNaming;

impl NamingStrategy for PascalCaseNaming {
    fn apply(&self, name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
