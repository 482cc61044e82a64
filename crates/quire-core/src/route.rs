//! Path router.
//!
//! Every page request path has the shape `/<operation>/<identifier>`. The
//! operation comes from a closed set and the identifier is restricted to
//! ASCII alphanumerics, which is what keeps page identifiers from ever
//! naming anything outside the storage root.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RouteError;

/// Longest identifier accepted. Keeps file names well under filesystem limits.
pub const MAX_ID_LEN: usize = 128;

/// The operations a path may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    View,
    Edit,
    Save,
    Create,
    Login,
    Signup,
}

impl Operation {
    /// All operations, in routing-table order.
    pub const ALL: [Self; 6] = [
        Self::View,
        Self::Edit,
        Self::Save,
        Self::Create,
        Self::Login,
        Self::Signup,
    ];

    /// The path segment naming this operation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Save => "save",
            Self::Create => "create",
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| RouteError::UnknownOperation { name: s.to_owned() })
    }
}

/// A validated page identifier: non-empty, ASCII alphanumeric, bounded length.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Validate `raw` as a page identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidId`] if `raw` is empty, too long, or
    /// contains anything other than ASCII letters and digits.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let reason = if raw.is_empty() {
            Some("identifier must not be empty")
        } else if raw.len() > MAX_ID_LEN {
            Some("identifier is too long")
        } else if !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some("identifier may only contain ASCII letters and digits")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(RouteError::InvalidId {
                id: raw.to_owned(),
                reason,
            }),
            None => Ok(Self(raw.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The decoded `{operation, identifier}` pair of a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub operation: Operation,
    pub id: PageId,
}

impl RouteMatch {
    /// Match a raw request path against `/<operation>/<identifier>`.
    ///
    /// The path is taken as it arrived on the wire: percent-encoded bytes
    /// are not decoded and therefore never match.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] for any path outside the grammar.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let not_found = || RouteError::NotFound {
            path: path.to_owned(),
        };

        let rest = path.strip_prefix('/').ok_or_else(not_found)?;
        let (op, id) = rest.split_once('/').ok_or_else(not_found)?;

        let operation = op.parse::<Operation>().map_err(|_| not_found())?;
        let id = PageId::parse(id).map_err(|_| not_found())?;

        Ok(Self { operation, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_every_operation() {
        for op in Operation::ALL {
            let m = RouteMatch::parse(&format!("/{op}/abc123")).unwrap();
            assert_eq!(m.operation, op);
            assert_eq!(m.id.as_str(), "abc123");
        }
    }

    #[test]
    fn view_route_extracts_identifier() {
        let m = RouteMatch::parse("/view/abc123").unwrap();
        assert_eq!(m.operation, Operation::View);
        assert_eq!(m.id, PageId::parse("abc123").unwrap());
    }

    #[test]
    fn rejects_paths_outside_grammar() {
        for path in [
            "/view/abc 123",
            "/view/abc%20123",
            "/delete/abc",
            "/view/",
            "/view",
            "/",
            "",
            "view/abc",
            "/view/abc/",
            "/view/abc/def",
            "/view/../etc",
            "/view/..",
            "/view/a.b",
            "/view/a-b",
            "/view/a_b",
            "/VIEW/abc",
            "/view/caf\u{e9}",
        ] {
            assert!(
                matches!(RouteMatch::parse(path), Err(RouteError::NotFound { .. })),
                "path {path:?} should not match"
            );
        }
    }

    #[test]
    fn identifier_length_is_bounded() {
        let longest = "a".repeat(MAX_ID_LEN);
        assert!(PageId::parse(&longest).is_ok());

        let too_long = "a".repeat(MAX_ID_LEN + 1);
        assert!(matches!(
            PageId::parse(&too_long),
            Err(RouteError::InvalidId { .. })
        ));
    }

    #[test]
    fn operation_names_roundtrip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!(matches!(
            "acctcreate".parse::<Operation>(),
            Err(RouteError::UnknownOperation { .. })
        ));
    }
}
