//! Locator micro-language: compact text queries over named dimensions.
//!
//! A *locator* selects items out of a collection with a single string instead
//! of one query parameter per field: `name:deploy,count:3`, `status:(failed)`,
//! or just `deploy` (a bare *single value*). The grammar supports nested
//! parenthesized values (`buildType:(name:5,project:(id:P1))`), literal
//! escaping (`(a:b,c:d)` is the text `a:b,c:d`), base64-encoded literals
//! (`$base64:YWFh`), valueless dimensions in extended mode (`id,name`), and a
//! reserved `$help` token.
//!
//! Parsing yields a [`Locator`]: an ordered dimension map plus a single-value
//! flag. Consumers read dimensions through the typed accessors, which track
//! which dimensions were actually understood; [`Locator::check_fully_processed`]
//! turns anything left over into an error, so a typo in a dimension name never
//! silently matches everything.
//!
//! # Example
//!
//! ```
//! use pinpoint_locator::Locator;
//!
//! let mut locator = Locator::new("status:failed,count:5,unrelated:x").unwrap();
//! assert_eq!(locator.single_value_of("status").unwrap().as_deref(), Some("failed"));
//! assert_eq!(locator.i64_of("count").unwrap(), Some(5));
//!
//! // "unrelated" was never consumed:
//! assert!(locator.check_fully_processed().is_err());
//! ```

mod error;
mod locator;
mod parser;

pub use error::{LocatorError, Result};
pub use locator::Locator;
