//! The [`Locator`] type: parsed locator text plus dimension access with
//! used-dimension tracking.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{LocatorError, Result};
use crate::parser::{self, DimensionValue, ParsedLocator};

/// A parsed locator: either a bare single value or an ordered collection of
/// named, possibly multi-valued dimensions.
///
/// Reading a dimension marks it *used*; [`Locator::check_fully_processed`]
/// then verifies that nothing the caller supplied was silently ignored. The
/// used set lives inside the locator and is only reachable through `&mut
/// self`, so one locator belongs to one resolution pass at a time.
///
/// # Example
///
/// ```
/// use pinpoint_locator::Locator;
///
/// let mut locator = Locator::new("name:deploy,count:3").unwrap();
/// assert_eq!(locator.single_value_of("name").unwrap().as_deref(), Some("deploy"));
/// assert_eq!(locator.i64_of("count").unwrap(), Some(3));
/// locator.check_fully_processed().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Locator {
    raw: String,
    single_value: Option<String>,
    dimensions: Vec<(String, Vec<DimensionValue>)>,
    help_requested: bool,
    known: BTreeSet<String>,
    hidden: BTreeSet<String>,
    ignored_if_unused: BTreeSet<String>,
    used: BTreeSet<String>,
    modified: bool,
}

impl Locator {
    /// The wildcard value: a dimension set to `$any` is present but carries
    /// no constraint.
    pub const ANY: &'static str = "$any";

    /// The reserved help token.
    pub const HELP: &'static str = "$help";

    /// Parses locator text in default mode.
    pub fn new(text: &str) -> Result<Locator> {
        Self::from_parsed(text, parser::parse(text, false, &[])?)
    }

    /// Parses locator text in extended mode: bare names become empty-valued
    /// dimensions and names may contain `-`. `custom_names` are matched
    /// verbatim before the name alphabet applies.
    pub fn new_extended(text: &str, custom_names: &[&str]) -> Result<Locator> {
        let custom: Vec<String> = custom_names.iter().map(|s| s.to_string()).collect();
        Self::from_parsed(text, parser::parse(text, true, &custom)?)
    }

    /// Parses locator text in default mode with a set of known dimension
    /// names. Known names double as the custom-name whitelist, so reserved
    /// names like `$strict` parse, and they feed the locator description
    /// used in diagnostics.
    pub fn with_known_dimensions(text: &str, known: &[String]) -> Result<Locator> {
        let mut locator = Self::from_parsed(text, parser::parse(text, false, known)?)?;
        locator.known.extend(known.iter().cloned());
        Ok(locator)
    }

    /// An empty locator: no single value, no dimensions. Useful as a
    /// synthesized default when no locator text was supplied.
    pub fn empty() -> Locator {
        Locator::default()
    }

    fn from_parsed(text: &str, parsed: ParsedLocator) -> Result<Locator> {
        Ok(Locator {
            raw: text.to_string(),
            single_value: parsed.single_value,
            dimensions: parsed.dimensions,
            help_requested: parsed.help_requested,
            ..Locator::default()
        })
    }

    // ========================================================================
    // Single value
    // ========================================================================

    /// Returns `true` when the text had no dimension structure.
    pub fn is_single_value(&self) -> bool {
        self.single_value.is_some()
    }

    /// The single value, if this locator is one.
    pub fn single_value(&self) -> Option<&str> {
        self.single_value.as_deref()
    }

    /// The single value interpreted as an integer. `Ok(None)` when this is
    /// not a single-value locator; an error when the value is not numeric.
    pub fn single_value_as_i64(&self) -> Result<Option<i64>> {
        match &self.single_value {
            None => Ok(None),
            Some(value) => value.parse::<i64>().map(Some).map_err(|_| {
                LocatorError::invalid_value(format!("single value '{value}' is not a number"))
            }),
        }
    }

    // ========================================================================
    // Dimension access (marks dimensions used)
    // ========================================================================

    /// The value of a dimension expected to appear at most once.
    ///
    /// Returns `Ok(None)` when the dimension is absent or set to the
    /// unquoted wildcard [`Self::ANY`] (the dimension still counts as used),
    /// and an error when it carries several values. A parenthesized `($any)`
    /// is the literal text.
    pub fn single_value_of(&mut self, name: &str) -> Result<Option<String>> {
        let values = match self.dimensions.iter().find(|(n, _)| n == name) {
            None => return Ok(None),
            Some((_, values)) => values,
        };
        if values.len() > 1 {
            return Err(LocatorError::invalid_value(format!(
                "dimension '{name}' has {} values, a single value was expected",
                values.len()
            )));
        }
        let value = values[0].clone();
        self.used.insert(name.to_string());
        if !value.quoted && value.text == Self::ANY {
            Ok(None)
        } else {
            Ok(Some(value.text))
        }
    }

    /// All values of a dimension, in declaration order (empty if absent).
    /// `$any` values are returned verbatim here.
    pub fn values_of(&mut self, name: &str) -> Vec<String> {
        match self.dimensions.iter().find(|(n, _)| n == name) {
            None => Vec::new(),
            Some((_, values)) => {
                let values = values.iter().map(|v| v.text.clone()).collect();
                self.used.insert(name.to_string());
                values
            }
        }
    }

    /// A single-valued dimension as an integer.
    pub fn i64_of(&mut self, name: &str) -> Result<Option<i64>> {
        match self.single_value_of(name)? {
            None => Ok(None),
            Some(value) => value.parse::<i64>().map(Some).map_err(|_| {
                LocatorError::invalid_value(format!(
                    "dimension '{name}' value '{value}' is not a number"
                ))
            }),
        }
    }

    /// Like [`Self::i64_of`] with a fallback for an absent dimension.
    pub fn i64_of_or(&mut self, name: &str, default: Option<i64>) -> Result<Option<i64>> {
        Ok(self.i64_of(name)?.or(default))
    }

    /// A three-valued boolean: `true`/`yes`, `false`/`no`, or `None` for an
    /// absent dimension and the `any`/`all`/`$any` wildcards.
    pub fn bool_of(&mut self, name: &str) -> Result<Option<bool>> {
        match self.single_value_of(name)? {
            None => Ok(None),
            Some(value) => parse_boolean(name, &value),
        }
    }

    /// A boolean with a default: wildcards and absence yield `default`,
    /// anything that is not a boolean is an error.
    pub fn strict_bool_of(&mut self, name: &str, default: bool) -> Result<bool> {
        match self.single_value_of(name)? {
            None => Ok(default),
            Some(value) => Ok(parse_boolean(name, &value)?.unwrap_or(default)),
        }
    }

    // ========================================================================
    // Introspection (does not mark anything used)
    // ========================================================================

    /// Whether any of the given dimensions is present.
    pub fn is_any_present(&self, names: &[&str]) -> bool {
        names
            .iter()
            .any(|name| self.dimensions.iter().any(|(n, _)| n == name))
    }

    /// The number of distinct dimension names.
    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    /// Dimension names in declaration order.
    pub fn defined_dimensions(&self) -> Vec<String> {
        self.dimensions.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Whether the reserved help token was present.
    pub fn help_requested(&self) -> bool {
        self.help_requested
    }

    /// Options attached to the help token (`$help:(...)`), as a locator of
    /// their own. Empty when no options were given.
    pub fn help_options(&mut self) -> Locator {
        match self.values_of(Self::HELP).into_iter().next() {
            Some(value) if !value.is_empty() => {
                Locator::new(&value).unwrap_or_else(|_| Locator::empty())
            }
            _ => Locator::empty(),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replaces all values of a dimension with one value, keeping its
    /// position; appends the dimension when absent.
    pub fn set_dimension(&mut self, name: &str, value: &str) {
        match self.dimensions.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => {
                values.clear();
                values.push(DimensionValue::plain(value));
            }
            None => self
                .dimensions
                .push((name.to_string(), vec![DimensionValue::plain(value)])),
        }
        self.modified = true;
    }

    /// Sets a dimension only when it is absent. A dimension set to `$any`
    /// counts as present.
    pub fn set_dimension_if_not_present(&mut self, name: &str, value: &str) {
        if !self.is_any_present(&[name]) {
            self.set_dimension(name, value);
        }
    }

    /// Removes a dimension entirely.
    pub fn remove_dimension(&mut self, name: &str) {
        let before = self.dimensions.len();
        self.dimensions.retain(|(n, _)| n != name);
        if self.dimensions.len() != before {
            self.modified = true;
        }
    }

    /// Copies dimensions from `defaults` that this locator does not define.
    /// No-op for single-value locators.
    pub fn apply_defaults(&mut self, defaults: &Locator) {
        if self.is_single_value() {
            return;
        }
        for (name, values) in &defaults.dimensions {
            if !self.is_any_present(&[name.as_str()]) {
                self.dimensions.push((name.clone(), values.clone()));
                self.modified = true;
            }
        }
    }

    // ========================================================================
    // Usage tracking
    // ========================================================================

    /// Registers known dimension names (for diagnostics and help output).
    pub fn add_known_dimensions<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.known.extend(names.into_iter().map(Into::into));
    }

    /// Marks dimensions as accepted without being listed in help or errors.
    pub fn add_hidden_dimensions<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.hidden.extend(names.into_iter().map(Into::into));
    }

    /// Marks dimensions that may legitimately stay unused.
    pub fn add_ignored_if_unused<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.ignored_if_unused
            .extend(names.into_iter().map(Into::into));
    }

    /// Marks a dimension as used without reading it.
    pub fn mark_used(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    /// Forgets that a dimension was used.
    pub fn mark_unused(&mut self, name: &str) {
        self.used.remove(name);
    }

    /// Resets all usage tracking.
    pub fn mark_all_unused(&mut self) {
        self.used.clear();
    }

    /// Names read so far, sorted.
    pub fn used_dimensions(&self) -> Vec<String> {
        self.used.iter().cloned().collect()
    }

    /// Defined names not read yet, in declaration order.
    pub fn unused_dimensions(&self) -> Vec<String> {
        self.dimensions
            .iter()
            .map(|(n, _)| n.clone())
            .filter(|n| !self.used.contains(n))
            .collect()
    }

    /// Fails when any non-hidden, non-ignored dimension was never consumed.
    /// When help was requested the error carries the known-dimension listing.
    pub fn check_fully_processed(&self) -> Result<()> {
        let unused: Vec<String> = self
            .dimensions
            .iter()
            .map(|(n, _)| n.clone())
            .filter(|n| {
                !self.used.contains(n)
                    && !self.hidden.contains(n)
                    && !self.ignored_if_unused.contains(n)
            })
            .collect();
        if unused.is_empty() {
            return Ok(());
        }
        let mut message = format!(
            "locator dimensions [{}] are unknown or unused",
            unused.join(", ")
        );
        if self.help_requested {
            message.push('\n');
            message.push_str(&self.description(false));
        }
        Err(LocatorError::UnusedDimensions {
            dimensions: unused,
            message,
        })
    }

    /// A one-line listing of the known dimensions, optionally including the
    /// hidden ones.
    pub fn description(&self, include_hidden: bool) -> String {
        let visible: Vec<&str> = self
            .known
            .iter()
            .filter(|n| include_hidden || !self.hidden.contains(*n))
            .map(|n| n.as_str())
            .collect();
        if visible.is_empty() {
            "no dimensions are known for this locator".to_string()
        } else {
            format!("known dimensions: {}", visible.join(", "))
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// The locator as text: the original input until the locator is mutated,
    /// a rebuilt form afterwards.
    pub fn text(&self) -> String {
        if !self.modified || self.single_value.is_some() {
            return self.raw.clone();
        }
        let pairs: Vec<(&str, &str)> = self
            .dimensions
            .iter()
            .flat_map(|(n, vs)| vs.iter().map(move |v| (n.as_str(), v.text.as_str())))
            .collect();
        Self::text_from_pairs(&pairs)
    }

    /// Builds locator text from name/value pairs, wrapping values that
    /// contain grammar characters in one paren layer.
    pub fn text_from_pairs(pairs: &[(&str, &str)]) -> String {
        pairs
            .iter()
            .map(|(name, value)| format!("{name}:{}", escape_value(value)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parses `text`, replaces `name` with `value`, and renders the result.
    pub fn text_with_dimension(text: &str, name: &str, value: &str) -> Result<String> {
        let mut locator = Locator::new(text)?;
        locator.set_dimension(name, value);
        Ok(locator.text())
    }

    /// Parses `text` and adds `name:value` only when `name` is absent.
    pub fn text_with_dimension_if_not_present(
        text: &str,
        name: &str,
        value: &str,
    ) -> Result<String> {
        let mut locator = Locator::new(text)?;
        locator.set_dimension_if_not_present(name, value);
        Ok(locator.text())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

fn escape_value(value: &str) -> String {
    if value.contains([',', ':', '(', ')']) {
        format!("({value})")
    } else {
        value.to_string()
    }
}

fn parse_boolean(name: &str, value: &str) -> Result<Option<bool>> {
    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") {
        Ok(Some(true))
    } else if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no") {
        Ok(Some(false))
    } else if value.eq_ignore_ascii_case("any")
        || value.eq_ignore_ascii_case("all")
        || value == Locator::ANY
    {
        Ok(None)
    } else {
        Err(LocatorError::invalid_value(format!(
            "dimension '{name}' value '{value}' is not a boolean"
        )))
    }
}
