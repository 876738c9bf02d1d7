//! RFC 822 style address lists: `Name <email>` or bare `email`, comma separated.
//!
//! Parsing never fails. Malformed fragments degrade to whatever can be salvaged and
//! empty fragments are dropped.

use serde::Serialize;

use super::mime::{encode_header_word, strip_line_breaks};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub email: String,
    pub name: Option<String>,
}

impl Address {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            email: email.into(),
            name: (!name.trim().is_empty()).then_some(name),
        }
    }

    /// Parses one address specification.
    ///
    /// With angle brackets the bracketed text is the email and whatever precedes it,
    /// unquoted, is the name. An unclosed `<` runs to the end of the fragment. Without
    /// them the whole fragment is the email and the name falls back to its local part.
    pub fn parse(fragment: &str) -> Option<Self> {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(open) = trimmed.find('<') {
            let close = trimmed
                .rfind('>')
                .filter(|close| *close > open)
                .unwrap_or(trimmed.len());
            let email = remove_spaces(&trimmed[open + 1..close]);
            if email.is_empty() {
                return None;
            }
            return Some(Self {
                email,
                name: clean_name(&trimmed[..open]),
            });
        }

        let email = remove_spaces(trimmed);
        let name = email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .map(ToOwned::to_owned);
        Some(Self { email, name })
    }

    /// `name <email>` when a name is present, else the bare email.
    pub fn to_wire(&self) -> String {
        let email = strip_line_breaks(&self.email);
        let name = self
            .name
            .as_deref()
            .map(strip_line_breaks)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        match name {
            Some(name) => format!("{} <{email}>", format_display_name(&name)),
            None => email,
        }
    }
}

/// Ordered email → display name mapping. Re-inserting an email keeps its position and
/// takes the newer name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AddressList {
    entries: Vec<Address>,
}

impl AddressList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        split_list(raw)
            .into_iter()
            .filter_map(Address::parse)
            .collect()
    }

    pub fn insert(&mut self, address: Address) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.email == address.email)
        {
            Some(existing) => existing.name = address.name,
            None => self.entries.push(address),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&Address> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emails(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.email.as_str()).collect()
    }

    /// Wire form of every entry joined for a single header, `None` when empty.
    pub fn to_header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }

        Some(
            self.entries
                .iter()
                .map(Address::to_wire)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

impl FromIterator<Address> for AddressList {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        let mut list = Self::new();
        for address in iter {
            list.insert(address);
        }
        list
    }
}

impl From<Address> for AddressList {
    fn from(address: Address) -> Self {
        Self {
            entries: vec![address],
        }
    }
}

impl From<Vec<Address>> for AddressList {
    fn from(addresses: Vec<Address>) -> Self {
        addresses.into_iter().collect()
    }
}

impl From<&str> for AddressList {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for AddressList {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl<'a> IntoIterator for &'a AddressList {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// True when `candidate` is a single bare address such as `user@example.com`.
pub fn is_valid_email(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };

    if local.is_empty() || local.contains('@') {
        return false;
    }

    if domain.split('.').count() < 2 || domain.split('.').any(str::is_empty) {
        return false;
    }

    !candidate
        .chars()
        .any(|ch| ch.is_whitespace() || ch.is_control() || "<>()[],;:\\\"".contains(ch))
}

/// Splits on commas that sit outside double quotes and angle brackets. A quote or
/// bracket left open at the end hides nothing: the list is split on every comma.
fn split_list(raw: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut in_angle = false;

    for (index, ch) in raw.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => in_angle = true,
            '>' if !in_quotes => in_angle = false,
            ',' if !in_quotes && !in_angle => {
                fragments.push(&raw[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }

    if in_quotes || in_angle {
        return raw.split(',').collect();
    }

    fragments.push(&raw[start..]);
    fragments
}

fn remove_spaces(value: &str) -> String {
    value.chars().filter(|ch| !ch.is_whitespace()).collect()
}

fn clean_name(raw: &str) -> Option<String> {
    let name = raw.trim().replace('"', "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn format_display_name(name: &str) -> String {
    if !name.is_ascii() {
        return encode_header_word(name);
    }

    if name.chars().any(|ch| "()<>[]:;@\\,.\"".contains(ch)) {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        return format!("\"{escaped}\"");
    }

    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_bare_entries_in_order() {
        let list = AddressList::parse("Name <e@x.com>, other@y.com");
        let entries = list.iter().collect::<Vec<_>>();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].email, "e@x.com");
        assert_eq!(entries[0].name.as_deref(), Some("Name"));
        assert_eq!(entries[1].email, "other@y.com");
        assert_eq!(entries[1].name.as_deref(), Some("other"));
    }

    #[test]
    fn strips_quotes_from_display_names() {
        let list = AddressList::parse("\"Doe, Jane\" <jane@example.com>,\"Bob\" <bob@example.com>");

        assert_eq!(list.len(), 2);
        assert_eq!(list.first().and_then(|a| a.name.as_deref()), Some("Doe, Jane"));
        assert_eq!(list.emails(), ["jane@example.com", "bob@example.com"]);
    }

    #[test]
    fn unclosed_bracket_keeps_later_recipients() {
        let list = AddressList::parse("Bad <a@x.com, other@y.com");

        assert_eq!(list.len(), 2);
        assert_eq!(list.emails(), ["a@x.com", "other@y.com"]);
        assert_eq!(list.first().and_then(|a| a.name.as_deref()), Some("Bad"));
    }

    #[test]
    fn stray_quote_keeps_later_recipients() {
        let list = AddressList::parse("O\"Brien <o@x.com>, b@y.com");

        assert_eq!(list.len(), 2);
        assert_eq!(list.emails(), ["o@x.com", "b@y.com"]);
        assert_eq!(list.first().and_then(|a| a.name.as_deref()), Some("OBrien"));
    }

    #[test]
    fn skips_empty_fragments_and_blank_input() {
        assert!(AddressList::parse("").is_empty());
        assert!(AddressList::parse(" , ,").is_empty());
        assert_eq!(AddressList::parse("a@x.com,, b@x.com").len(), 2);
    }

    #[test]
    fn duplicate_email_keeps_position_and_takes_last_name() {
        let list = AddressList::parse("a@x.com, b@x.com, Alice <a@x.com>");

        assert_eq!(list.emails(), ["a@x.com", "b@x.com"]);
        assert_eq!(list.first().and_then(|a| a.name.as_deref()), Some("Alice"));
    }

    #[test]
    fn bare_bracketed_address_has_no_name() {
        let address = Address::parse("<solo@example.com>").expect("address");

        assert_eq!(address.email, "solo@example.com");
        assert_eq!(address.name, None);
        assert_eq!(address.to_wire(), "solo@example.com");
    }

    #[test]
    fn serializes_names_with_quoting_and_encoding() {
        assert_eq!(Address::named("a@x.com", "Alice").to_wire(), "Alice <a@x.com>");
        assert_eq!(
            Address::named("j@x.com", "Doe, Jane").to_wire(),
            "\"Doe, Jane\" <j@x.com>"
        );
        assert_eq!(
            Address::named("z@x.com", "Zoë").to_wire(),
            "=?utf-8?B?Wm/Dqw==?= <z@x.com>"
        );
        assert_eq!(Address::new("b@x.com").to_wire(), "b@x.com");
    }

    #[test]
    fn header_value_joins_entries() {
        let list: AddressList = vec![Address::named("a@x.com", "A"), Address::new("b@x.com")].into();

        assert_eq!(list.to_header_value().as_deref(), Some("A <a@x.com>, b@x.com"));
        assert_eq!(AddressList::new().to_header_value(), None);
    }

    #[test]
    fn validates_bare_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("User <user@example.com>"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a b@example.com"));
    }
}
