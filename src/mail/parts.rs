use crate::api::models::Part;

use super::headers::HeaderIndex;

impl Part {
    pub fn is_leaf(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn header_index(&self) -> HeaderIndex<'_> {
        HeaderIndex::new(&self.headers)
    }

    pub fn attachment_id(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.attachment_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }

    /// Still-encoded inline payload.
    pub fn data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.data.as_deref())
            .filter(|data| !data.is_empty())
    }

    pub fn size(&self) -> Option<u64> {
        self.body.as_ref().and_then(|body| body.size)
    }

    pub fn is_mime_type(&self, mime_type: &str) -> bool {
        self.mime_type.eq_ignore_ascii_case(mime_type)
    }

    /// Every part of this subtree, this one included, that satisfies `predicate`,
    /// in depth-first pre-order.
    pub fn find_all<P>(&self, predicate: P) -> Vec<&Part>
    where
        P: FnMut(&Part) -> bool,
    {
        walk(std::slice::from_ref(self), predicate, false)
    }

    pub fn find_first<P>(&self, predicate: P) -> Option<&Part>
    where
        P: FnMut(&Part) -> bool,
    {
        walk(std::slice::from_ref(self), predicate, true).pop()
    }
}

/// Depth-first pre-order walk over a forest. With `early_stop` the walk ends at the
/// first match, so existence checks never visit the rest of the tree.
pub fn walk<'a, P>(roots: &'a [Part], mut predicate: P, early_stop: bool) -> Vec<&'a Part>
where
    P: FnMut(&Part) -> bool,
{
    let mut found = Vec::new();
    let mut stack: Vec<&Part> = roots.iter().rev().collect();

    while let Some(part) = stack.pop() {
        if predicate(part) {
            found.push(part);
            if early_stop {
                break;
            }
        }
        stack.extend(part.parts.iter().rev());
    }

    found
}

pub fn any<P>(roots: &[Part], predicate: P) -> bool
where
    P: FnMut(&Part) -> bool,
{
    !walk(roots, predicate, true).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::PartBody;

    fn leaf(mime_type: &str, data: &str) -> Part {
        Part {
            mime_type: mime_type.to_string(),
            body: Some(PartBody {
                data: Some(data.to_string()),
                ..PartBody::default()
            }),
            ..Part::default()
        }
    }

    fn container(mime_type: &str, parts: Vec<Part>) -> Part {
        Part {
            mime_type: mime_type.to_string(),
            parts,
            ..Part::default()
        }
    }

    fn sample_tree() -> Part {
        container(
            "multipart/mixed",
            vec![
                container(
                    "multipart/alternative",
                    vec![leaf("text/plain", "p1"), leaf("text/html", "h1")],
                ),
                leaf("text/plain", "p2"),
            ],
        )
    }

    #[test]
    fn visits_in_pre_order() {
        let tree = sample_tree();
        let order = tree
            .find_all(|_| true)
            .into_iter()
            .map(|part| part.mime_type.as_str())
            .collect::<Vec<_>>();

        assert_eq!(
            order,
            [
                "multipart/mixed",
                "multipart/alternative",
                "text/plain",
                "text/html",
                "text/plain"
            ]
        );
    }

    #[test]
    fn find_first_stops_at_first_match() {
        let tree = sample_tree();
        let mut visited = 0;
        let first = tree.find_first(|part| {
            visited += 1;
            part.is_mime_type("text/plain")
        });

        assert_eq!(first.and_then(Part::data), Some("p1"));
        assert_eq!(visited, 3);
    }

    #[test]
    fn handles_deep_nesting_without_recursion() {
        let mut tree = leaf("text/plain", "bottom");
        for _ in 0..1_000 {
            tree = container("multipart/mixed", vec![tree]);
        }

        assert_eq!(tree.find_all(Part::is_leaf).len(), 1);
        assert!(any(&tree.parts, |part| part.data() == Some("bottom")));
    }

    #[test]
    fn empty_forest_has_no_matches() {
        assert!(walk(&[], |_| true, false).is_empty());
        assert!(!any(&[], |_| true));
    }
}
