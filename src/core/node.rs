//! Node tree - the in-memory document representation
//!
//! A `Node` owns its attributes and children outright. Cloning a node is a
//! deep copy, so a subtree moved into another document can never be observed
//! from the document it was copied out of.

/// A labeled tree element with ordered attributes, ordered children and
/// optional text content
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    text: Option<String>,
}

impl Node {
    /// Create an empty element with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Builder form of [`Node::set_attr`]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of [`Node::set_text`]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Builder form of [`Node::push`]
    pub fn with_child(mut self, child: Node) -> Self {
        self.push(child);
        self
    }

    /// Builder form of [`Node::extend`]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.extend(children);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Text content, or the empty string when there is none
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Set an attribute. An existing key keeps its position and gets the new value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set text content. Empty text clears it, so an element with empty text
    /// and one with none serialize the same way.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.text = (!text.is_empty()).then_some(text);
    }

    /// Append text, joining with any text already present
    pub fn append_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn extend(&mut self, children: impl IntoIterator<Item = Node>) {
        self.children.extend(children);
    }

    /// Insert a child at `index`, clamped to the end of the child list
    pub fn insert(&mut self, index: usize, child: Node) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    /// Direct children with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn child_mut(&mut self, tag: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }

    /// Remove every direct child with the given tag, returning how many went
    pub fn remove_children(&mut self, tag: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|c| c.tag != tag);
        before - self.children.len()
    }

    /// All descendants in document order, excluding `self`
    pub fn descendants(&self) -> FindAll<'_> {
        FindAll::new(self, "")
    }

    /// All descendants matching a tag path.
    ///
    /// `a` matches any descendant named `a`. `a/b` matches any `b` that is a
    /// direct child of an `a` descendant. The root itself never matches.
    pub fn find_all<'a>(&'a self, path: &'a str) -> FindAll<'a> {
        FindAll::new(self, path)
    }

    /// First descendant in document order satisfying `predicate`
    pub fn find_first(&self, predicate: impl Fn(&Node) -> bool) -> Option<&Node> {
        self.descendants().find(|n| predicate(n))
    }
}

/// [`Node::find_all`] over a root that may be absent. An absent root yields nothing.
pub fn find_all<'a>(root: Option<&'a Node>, path: &'a str) -> FindAll<'a> {
    match root {
        Some(root) => root.find_all(path),
        None => FindAll::empty(),
    }
}

/// Keep only nodes whose attribute `key` equals `value` exactly
pub fn filter_by_attribute<'a, I>(
    nodes: I,
    key: &'a str,
    value: &'a str,
) -> impl Iterator<Item = &'a Node> + 'a
where
    I: IntoIterator<Item = &'a Node>,
    I::IntoIter: 'a,
{
    nodes.into_iter().filter(move |n| n.attr(key) == Some(value))
}

/// Lazy pre-order traversal matching a tag path against the ancestor chain
///
/// The traversal keeps the path from the root to the current node on an
/// explicit stack, so matching `a/b/c` is a suffix comparison on that stack.
pub struct FindAll<'a> {
    segments: Vec<&'a str>,
    // (node, index of the next child to visit); stack[0] is the root
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> FindAll<'a> {
    fn new(root: &'a Node, path: &'a str) -> Self {
        let segments = path.split('/').filter(|s| !s.is_empty()).collect();
        Self {
            segments,
            stack: vec![(root, 0)],
        }
    }

    fn empty() -> Self {
        Self {
            segments: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn current_matches(&self) -> bool {
        if self.segments.is_empty() {
            return true;
        }
        // Ancestors below the root, including the node just pushed
        let chain = &self.stack[1..];
        if chain.len() < self.segments.len() {
            return false;
        }
        let tail = &chain[chain.len() - self.segments.len()..];
        tail.iter()
            .zip(&self.segments)
            .all(|((node, _), seg)| node.tag == *seg)
    }
}

impl<'a> Iterator for FindAll<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        loop {
            let frame = self.stack.last_mut()?;
            let parent: &'a Node = frame.0;
            match parent.children.get(frame.1) {
                Some(child) => {
                    frame.1 += 1;
                    self.stack.push((child, 0));
                    if self.current_matches() {
                        return Some(child);
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment() -> Node {
        Node::new("github-review")
            .with_child(
                Node::new("organization")
                    .with_attr("name", "acme")
                    .with_child(
                        Node::new("reporting")
                            .with_attr("class", "repo-report")
                            .with_attr("repo", "acme/widgets"),
                    )
                    .with_child(Node::new("license").with_attr("repo", "acme/widgets"))
                    .with_child(
                        Node::new("reporting")
                            .with_attr("class", "user-report")
                            .with_text("alice"),
                    ),
            )
            .with_child(Node::new("reporting").with_attr("class", "stray"))
    }

    #[test]
    fn test_set_attr_keeps_keys_unique_and_ordered() {
        let mut node = Node::new("repo").with_attr("name", "a").with_attr("stars", 1);
        node.set_attr("name", "b");
        assert_eq!(
            node.attributes(),
            &[
                ("name".to_string(), "b".to_string()),
                ("stars".to_string(), "1".to_string())
            ]
        );
        assert_eq!(node.attr("name"), Some("b"));
        assert_eq!(node.attr("missing"), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = fragment();
        let mut copy = original.clone();
        copy.remove_children("organization");
        assert_eq!(original.children().len(), 2);
        assert_eq!(copy.children().len(), 1);
        assert_ne!(original, copy);
    }

    #[test]
    fn test_find_all_path_matches_direct_children_only() {
        let root = fragment();
        let found: Vec<_> = root.find_all("organization/reporting").collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].attr("class"), Some("repo-report"));
        assert_eq!(found[1].attr("class"), Some("user-report"));
    }

    #[test]
    fn test_find_all_single_segment_is_any_descendant() {
        let root = fragment();
        assert_eq!(root.find_all("reporting").count(), 3);
        assert_eq!(root.find_all("github-review").count(), 0);
    }

    #[test]
    fn test_find_all_is_in_document_order() {
        let root = Node::new("r").with_child(
            Node::new("a")
                .with_child(
                    Node::new("b")
                        .with_child(Node::new("a").with_child(Node::new("b").with_text("deep"))),
                )
                .with_child(Node::new("b").with_text("shallow")),
        );
        let texts: Vec<_> = root.find_all("a/b").map(|n| n.text_or_empty()).collect();
        assert_eq!(texts, vec!["", "deep", "shallow"]);
    }

    #[test]
    fn test_find_all_is_restartable() {
        let root = fragment();
        let first: Vec<_> = root.find_all("organization/license").collect();
        let second: Vec<_> = root.find_all("organization/license").collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_absent_root_yields_nothing() {
        assert_eq!(find_all(None, "organization").count(), 0);
    }

    #[test]
    fn test_find_first_and_filter() {
        let root = fragment();
        let lic = root.find_first(|n| n.tag() == "license").unwrap();
        assert_eq!(lic.attr("repo"), Some("acme/widgets"));

        let users: Vec<_> =
            filter_by_attribute(root.find_all("reporting"), "class", "user-report").collect();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].text(), Some("alice"));
    }
}
