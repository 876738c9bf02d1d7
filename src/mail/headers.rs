use crate::api::models::Header;

/// Read-only, case-insensitive view over a part's headers in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderIndex<'a> {
    entries: &'a [Header],
}

impl<'a> HeaderIndex<'a> {
    pub fn new(entries: &'a [Header]) -> Self {
        Self { entries }
    }

    /// First header whose name matches `name` ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// Like [`get`](Self::get) but trims the value and treats blank as absent.
    pub fn get_non_empty(&self, name: &str) -> Option<&'a str> {
        self.get(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn all(&self) -> &'a [Header] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let headers = [Header::new("sUbJeCt", "case test")];
        let index = HeaderIndex::new(&headers);

        assert_eq!(index.get("Subject"), Some("case test"));
        assert_eq!(index.get("SUBJECT"), Some("case test"));
    }

    #[test]
    fn first_occurrence_wins() {
        let headers = [
            Header::new("Received", "from a"),
            Header::new("To", "x@example.com"),
            Header::new("received", "from b"),
        ];
        let index = HeaderIndex::new(&headers);

        assert_eq!(index.get("Received"), Some("from a"));
        assert_eq!(index.all().len(), 3);
        assert_eq!(index.all()[2].value, "from b");
    }

    #[test]
    fn missing_header_is_absent_not_an_error() {
        let index = HeaderIndex::default();

        assert!(index.is_empty());
        assert_eq!(index.get("From"), None);
        assert_eq!(index.get_non_empty("From"), None);
    }

    #[test]
    fn blank_value_is_filtered_by_non_empty_lookup() {
        let headers = [Header::new("References", "   ")];
        let index = HeaderIndex::new(&headers);

        assert_eq!(index.get("References"), Some("   "));
        assert_eq!(index.get_non_empty("References"), None);
    }
}
