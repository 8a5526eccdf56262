//! `Set-Cookie` attribute parsing.
//!
//! The gateway removes the `Domain` attribute from backend cookies so
//! the browser assigns them to the gateway's own origin. Removal works
//! at the attribute level: a cookie value that happens to contain the
//! substring `domain=` is never touched, and every attribute that is
//! kept keeps its original bytes.

use crate::error::{GatewayError, Result};

/// A parsed `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirective {
    /// Cookie name.
    pub name: String,
    /// Cookie value, verbatim.
    pub value: String,
    /// Attributes after the name-value pair, in order. Flag attributes
    /// such as `Secure` carry no value.
    pub attributes: Vec<(String, Option<String>)>,
}

impl CookieDirective {
    /// Parse a `Set-Cookie` header into its name-value pair and
    /// attributes. Fails when the leading `name=value` segment is
    /// missing; callers forward such headers unmodified.
    pub fn parse(header: &str) -> Result<Self> {
        let mut segments = header.split(';');
        let pair = segments.next().unwrap_or_default();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| GatewayError::malformed_cookie(header))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::malformed_cookie(header));
        }

        let attributes = segments
            .map(|segment| {
                let segment = segment.trim();
                match segment.split_once('=') {
                    Some((attr_name, attr_value)) => {
                        (attr_name.trim().to_string(), Some(attr_value.to_string()))
                    }
                    None => (segment.to_string(), None),
                }
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
            attributes,
        })
    }

    /// Whether the directive carries a `Domain` attribute.
    #[must_use]
    pub fn has_domain(&self) -> bool {
        self.attributes
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("domain"))
    }
}

/// Remove the `Domain` attribute (and only that attribute) from a
/// `Set-Cookie` header.
///
/// Every kept segment keeps its original bytes, so the result differs
/// from the input only by the removed attribute. Headers without a
/// leading `name=value` pair are rejected as malformed.
pub fn strip_domain_attribute(header: &str) -> Result<String> {
    // Validate the name-value shape up front.
    CookieDirective::parse(header)?;

    let mut segments = header.split(';');
    let mut kept = vec![segments.next().unwrap_or_default()];
    kept.extend(segments.filter(|segment| !is_domain_attribute(segment)));

    Ok(kept.join(";"))
}

/// Attribute-level match for `Domain`, case-insensitive, tolerant of
/// surrounding whitespace. Only applied to segments after the cookie's
/// own `name=value` pair.
fn is_domain_attribute(segment: &str) -> bool {
    let name = match segment.split_once('=') {
        Some((name, _)) => name,
        None => segment,
    };
    name.trim().eq_ignore_ascii_case("domain")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_domain_and_nothing_else() {
        let header = "session=abc; Domain=backend.internal; Secure; HttpOnly";
        assert_eq!(
            strip_domain_attribute(header).unwrap(),
            "session=abc; Secure; HttpOnly"
        );
    }

    #[test]
    fn preserves_all_other_attributes_byte_for_byte() {
        let header =
            "sid=xyz; Path=/; Max-Age=3600; SameSite=Lax; Domain=.example.com; Secure; HttpOnly";
        assert_eq!(
            strip_domain_attribute(header).unwrap(),
            "sid=xyz; Path=/; Max-Age=3600; SameSite=Lax; Secure; HttpOnly"
        );
    }

    #[test]
    fn domain_match_is_case_insensitive() {
        let header = "a=b; domain=x.test; secure";
        assert_eq!(strip_domain_attribute(header).unwrap(), "a=b; secure");

        let header = "a=b; DOMAIN=x.test";
        assert_eq!(strip_domain_attribute(header).unwrap(), "a=b");
    }

    #[test]
    fn value_containing_domain_substring_is_untouched() {
        let header = "redirect=https%3A%2F%2Fx%3Fdomain=evil.test; Secure";
        assert_eq!(
            strip_domain_attribute(header).unwrap(),
            "redirect=https%3A%2F%2Fx%3Fdomain=evil.test; Secure"
        );

        // The literal substring in a raw value, still only the real
        // attribute is removed.
        let header = "state=domain=abc; Domain=backend.internal; HttpOnly";
        assert_eq!(
            strip_domain_attribute(header).unwrap(),
            "state=domain=abc; HttpOnly"
        );
    }

    #[test]
    fn header_without_domain_is_unchanged() {
        let header = "session=abc; Secure; HttpOnly; SameSite=None";
        assert_eq!(strip_domain_attribute(header).unwrap(), header);
    }

    #[test]
    fn unusual_spacing_is_preserved_for_kept_segments() {
        let header = "a=b;Secure;  HttpOnly; Domain=x.test";
        assert_eq!(
            strip_domain_attribute(header).unwrap(),
            "a=b;Secure;  HttpOnly"
        );
    }

    #[test]
    fn malformed_header_is_rejected() {
        let err = strip_domain_attribute("no-equals-sign").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedCookie { .. }));

        let err = strip_domain_attribute("=value-without-name; Secure").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedCookie { .. }));
    }

    #[test]
    fn parse_exposes_attributes() {
        let directive =
            CookieDirective::parse("session=abc; Domain=backend.internal; Secure").unwrap();
        assert_eq!(directive.name, "session");
        assert_eq!(directive.value, "abc");
        assert!(directive.has_domain());
        assert_eq!(
            directive.attributes,
            vec![
                ("Domain".to_string(), Some("backend.internal".to_string())),
                ("Secure".to_string(), None),
            ]
        );
    }
}
