//! Attribute- and element-aware XML comparison.
//!
//! Documents are parsed into a small element tree: qualified name, the
//! non-namespace attributes in sorted order, the concatenated direct text
//! (CDATA included) and the child elements. Comments, processing
//! instructions and declarations are dropped.
//!
//! Paths are the slash-joined local names from the root down, e.g.
//! `catalog/book/title`.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{StructuralConfig, DEFAULT_MAX_DEPTH};
use crate::error::{StructureError, StructureResult};

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// One element of a parsed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    local_name: String,
    attributes: BTreeMap<String, String>,
    text: String,
    /// `(children before the run, end offset in text)` per text run.
    text_runs: Vec<(usize, usize)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> StructureResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let local_name = String::from_utf8_lossy(start.local_name().into_inner()).into_owned();

        let mut attributes = BTreeMap::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, value);
        }

        Ok(Self {
            name,
            local_name,
            attributes,
            text: String::new(),
            text_runs: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Qualified name, prefix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Attributes other than namespace declarations, sorted by name.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct text content, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// All descendant text in document order, untrimmed.
    pub fn deep_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let mut start = 0;
        let mut runs = self.text_runs.iter().peekable();
        for (i, child) in self.children.iter().enumerate() {
            while let Some(&(_, end)) = runs.next_if(|(before, _)| *before <= i) {
                out.push_str(&self.text[start..end]);
                start = end;
            }
            child.collect_text(out);
        }
        out.push_str(&self.text[start..]);
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
        self.text_runs.push((self.children.len(), self.text.len()));
    }
}

/// A parsed document with exactly one root element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Parse `text` with the default nesting limit.
    pub fn parse(text: &str) -> StructureResult<Self> {
        Self::parse_with_max_depth(text, DEFAULT_MAX_DEPTH)
    }

    /// Parse `text`, failing if elements nest deeper than `max_depth` below
    /// the root.
    pub fn parse_with_max_depth(text: &str, max_depth: usize) -> StructureResult<Self> {
        parse_document(text, max_depth, "document")
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

impl FromStr for XmlDocument {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_document(text: &str, max_depth: usize, side: &'static str) -> StructureResult<XmlDocument> {
    if text.trim().is_empty() {
        return Err(StructureError::EmptyInput {
            format: "XML",
            side,
        });
    }

    let mut reader = Reader::from_str(text);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let element = open_element(&e, &stack, &root, max_depth)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = open_element(&e, &stack, &root, max_depth)?;
                attach(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    StructureError::MalformedXml("closing tag without an open element".into())
                })?;
                attach(element, &mut stack, &mut root);
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                append_text(&text, &mut stack)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append_text(&text, &mut stack)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(StructureError::MalformedXml(format!(
            "element <{}> is never closed",
            open.name
        )));
    }

    root.map(|root| XmlDocument { root })
        .ok_or(StructureError::MissingRoot)
}

fn open_element(
    start: &BytesStart<'_>,
    stack: &[XmlElement],
    root: &Option<XmlElement>,
    max_depth: usize,
) -> StructureResult<XmlElement> {
    if stack.is_empty() && root.is_some() {
        return Err(StructureError::MalformedXml(
            "document has more than one root element".into(),
        ));
    }
    if stack.len() > max_depth {
        return Err(StructureError::DepthExceeded { max: max_depth });
    }
    XmlElement::from_start(start)
}

fn attach(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_text(text: &str, stack: &mut [XmlElement]) -> StructureResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_text(text),
        None if text.trim().is_empty() => {}
        None => {
            return Err(StructureError::MalformedXml(
                "text outside the root element".into(),
            ))
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Changes
// ---------------------------------------------------------------------------

/// What an [`ElementChange`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementChangeKind {
    AddElement,
    RemoveElement,
    ModifyElement,
    AddAttribute,
    RemoveAttribute,
    ModifyAttribute,
    ReorderElement,
}

impl ElementChangeKind {
    pub fn is_element_change(self) -> bool {
        matches!(
            self,
            Self::AddElement | Self::RemoveElement | Self::ModifyElement | Self::ReorderElement
        )
    }

    pub fn is_attribute_change(self) -> bool {
        !self.is_element_change()
    }
}

/// One path-addressed difference between two XML trees.
///
/// Positions are zero-based indices among the parent's child elements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementChange {
    pub kind: ElementChangeKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_position: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_position: Option<usize>,
}

impl ElementChange {
    fn new(kind: ElementChangeKind, path: &str) -> Self {
        Self {
            kind,
            path: path.to_owned(),
            attribute: None,
            old_value: None,
            new_value: None,
            old_position: None,
            new_position: None,
        }
    }

    fn values(mut self, old: Option<&str>, new: Option<&str>) -> Self {
        self.old_value = old.map(str::to_owned);
        self.new_value = new.map(str::to_owned);
        self
    }

    fn attribute(mut self, name: &str) -> Self {
        self.attribute = Some(name.to_owned());
        self
    }

    fn positions(mut self, old: usize, new: usize) -> Self {
        self.old_position = Some(old);
        self.new_position = Some(new);
        self
    }
}

/// The ordered change list of an XML comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlDiff {
    pub changes: Vec<ElementChange>,
}

impl XmlDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of changes of the given kind.
    pub fn count(&self, kind: ElementChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    pub fn element_changes(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind.is_element_change())
            .count()
    }

    pub fn attribute_changes(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind.is_attribute_change())
            .count()
    }

    pub fn reorders(&self) -> usize {
        self.count(ElementChangeKind::ReorderElement)
    }

    /// Changes recorded at `path`, in order.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ElementChange> + 'a {
        self.changes.iter().filter(move |c| c.path == path)
    }
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// Recursive XML tree comparator.
#[derive(Clone, Debug, Default)]
pub struct XmlComparator {
    config: StructuralConfig,
}

impl XmlComparator {
    pub fn new(config: StructuralConfig) -> Self {
        Self { config }
    }

    /// Parse and compare two XML texts.
    pub fn compare_str(&self, left: &str, right: &str) -> StructureResult<XmlDiff> {
        let left = parse_document(left, self.config.max_depth, "left")?;
        let right = parse_document(right, self.config.max_depth, "right")?;
        self.compare_documents(&left, &right)
    }

    /// Compare two parsed documents.
    pub fn compare_documents(
        &self,
        left: &XmlDocument,
        right: &XmlDocument,
    ) -> StructureResult<XmlDiff> {
        let mut diff = XmlDiff::default();
        let path = left.root.local_name.clone();
        self.walk(&left.root, &right.root, &path, 0, &mut diff.changes)?;
        debug!(changes = diff.len(), "xml comparison finished");
        Ok(diff)
    }

    fn walk(
        &self,
        left: &XmlElement,
        right: &XmlElement,
        path: &str,
        depth: usize,
        out: &mut Vec<ElementChange>,
    ) -> StructureResult<()> {
        if depth > self.config.max_depth {
            return Err(StructureError::DepthExceeded {
                max: self.config.max_depth,
            });
        }

        if left.name != right.name {
            out.push(
                ElementChange::new(ElementChangeKind::ModifyElement, path)
                    .values(Some(&left.local_name), Some(&right.local_name)),
            );
            return Ok(());
        }

        compare_attributes(left, right, path, out);

        let (old_text, new_text) = (left.text(), right.text());
        if old_text != new_text {
            out.push(
                ElementChange::new(ElementChangeKind::ModifyElement, path)
                    .values(Some(old_text), Some(new_text)),
            );
        }

        if left.children.is_empty() && right.children.is_empty() {
            return Ok(());
        }

        if is_reordered(&left.children, &right.children) {
            self.match_by_name(left, right, path, depth, out)
        } else {
            self.match_by_position(left, right, path, depth, out)
        }
    }

    fn match_by_name(
        &self,
        left: &XmlElement,
        right: &XmlElement,
        path: &str,
        depth: usize,
        out: &mut Vec<ElementChange>,
    ) -> StructureResult<()> {
        let mut matched = vec![false; right.children.len()];

        for (i, child) in left.children.iter().enumerate() {
            let child_path = format!("{path}/{}", child.local_name);
            let found = (0..right.children.len())
                .find(|&j| !matched[j] && right.children[j].name == child.name);

            match found {
                Some(j) => {
                    matched[j] = true;
                    if self.config.report_reorders && i != j {
                        out.push(
                            ElementChange::new(ElementChangeKind::ReorderElement, &child_path)
                                .positions(i, j),
                        );
                    }
                    self.walk(child, &right.children[j], &child_path, depth + 1, out)?;
                }
                None => out.push(removed(&child_path, child)),
            }
        }

        for (j, child) in right.children.iter().enumerate() {
            if !matched[j] {
                out.push(added(&format!("{path}/{}", child.local_name), child));
            }
        }
        Ok(())
    }

    fn match_by_position(
        &self,
        left: &XmlElement,
        right: &XmlElement,
        path: &str,
        depth: usize,
        out: &mut Vec<ElementChange>,
    ) -> StructureResult<()> {
        let len = left.children.len().max(right.children.len());
        for i in 0..len {
            match (left.children.get(i), right.children.get(i)) {
                (Some(l), Some(r)) => {
                    let child_path = format!("{path}/{}", l.local_name);
                    self.walk(l, r, &child_path, depth + 1, out)?;
                }
                (Some(l), None) => out.push(removed(&format!("{path}/{}", l.local_name), l)),
                (None, Some(r)) => out.push(added(&format!("{path}/{}", r.local_name), r)),
                (None, None) => {}
            }
        }
        Ok(())
    }
}

/// Compare two XML texts with the default configuration.
pub fn compare_xml(left: &str, right: &str) -> StructureResult<XmlDiff> {
    XmlComparator::default().compare_str(left, right)
}

/// Compare two parsed documents with the default configuration.
pub fn compare_documents(left: &XmlDocument, right: &XmlDocument) -> StructureResult<XmlDiff> {
    XmlComparator::default().compare_documents(left, right)
}

fn compare_attributes(
    left: &XmlElement,
    right: &XmlElement,
    path: &str,
    out: &mut Vec<ElementChange>,
) {
    let names: BTreeSet<&String> = left.attributes.keys().chain(right.attributes.keys()).collect();

    for name in names {
        let change = match (left.attributes.get(name), right.attributes.get(name)) {
            (None, Some(new)) => ElementChange::new(ElementChangeKind::AddAttribute, path)
                .values(None, Some(new)),
            (Some(old), None) => ElementChange::new(ElementChangeKind::RemoveAttribute, path)
                .values(Some(old), None),
            (Some(old), Some(new)) if old != new => {
                ElementChange::new(ElementChangeKind::ModifyAttribute, path)
                    .values(Some(old), Some(new))
            }
            _ => continue,
        };
        out.push(change.attribute(name));
    }
}

/// Same multiset of child local names in a different sequence.
fn is_reordered(left: &[XmlElement], right: &[XmlElement]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let names = |children: &[XmlElement]| -> Vec<String> {
        children.iter().map(|c| c.local_name.clone()).collect()
    };
    let (l, r) = (names(left), names(right));
    if l == r {
        return false;
    }
    let (mut ls, mut rs) = (l, r);
    ls.sort_unstable();
    rs.sort_unstable();
    ls == rs
}

fn added(path: &str, element: &XmlElement) -> ElementChange {
    ElementChange::new(ElementChangeKind::AddElement, path).values(None, Some(&element.deep_text()))
}

fn removed(path: &str, element: &XmlElement) -> ElementChange {
    ElementChange::new(ElementChangeKind::RemoveElement, path)
        .values(Some(&element.deep_text()), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(diff: &XmlDiff) -> Vec<ElementChangeKind> {
        diff.changes.iter().map(|c| c.kind).collect()
    }

    // ---- parsing

    #[test]
    fn parses_attributes_text_and_children() {
        let doc = XmlDocument::parse(
            r#"<?xml version="1.0"?>
            <!-- leading comment -->
            <root xmlns:x="urn:x" x:id="7" b="2" a="1">
              hello <![CDATA[<raw>]]>
              <x:child>inner</x:child>
            </root>"#,
        )
        .unwrap();

        let root = doc.root();
        assert_eq!(root.name(), "root");
        let attrs: Vec<_> = root.attributes().keys().map(String::as_str).collect();
        assert_eq!(attrs, vec!["a", "b", "x:id"]);
        assert!(root.text().starts_with("hello"));
        assert!(root.text().ends_with("<raw>"));
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].name(), "x:child");
        assert_eq!(root.children()[0].local_name(), "child");
        assert_eq!(root.children()[0].text(), "inner");
    }

    #[test]
    fn entities_are_unescaped() {
        let doc: XmlDocument = r#"<r v="a&amp;b">1 &lt; 2</r>"#.parse().unwrap();
        assert_eq!(doc.root().attribute("v"), Some("a&b"));
        assert_eq!(doc.root().text(), "1 < 2");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            XmlDocument::parse("   "),
            Err(StructureError::EmptyInput { .. })
        ));
    }

    #[test]
    fn document_without_root_is_rejected() {
        assert!(matches!(
            XmlDocument::parse("<?xml version=\"1.0\"?><!-- nothing -->"),
            Err(StructureError::MissingRoot)
        ));
    }

    #[test]
    fn multiple_roots_are_rejected() {
        assert!(matches!(
            XmlDocument::parse("<a/><b/>"),
            Err(StructureError::MalformedXml(_))
        ));
    }

    #[test]
    fn stray_text_is_rejected() {
        assert!(matches!(
            XmlDocument::parse("<a/>trailing"),
            Err(StructureError::MalformedXml(_))
        ));
    }

    #[test]
    fn unclosed_element_is_rejected() {
        let err = XmlDocument::parse("<a><b></b>").unwrap_err();
        assert!(matches!(
            err,
            StructureError::MalformedXml(_) | StructureError::Xml(_)
        ));
    }

    #[test]
    fn mismatched_end_tag_is_rejected() {
        assert!(XmlDocument::parse("<a><b></a></b>").is_err());
    }

    #[test]
    fn parse_depth_limit() {
        let err = XmlDocument::parse_with_max_depth("<a><b><c/></b></a>", 1).unwrap_err();
        assert!(matches!(err, StructureError::DepthExceeded { max: 1 }));
        assert!(XmlDocument::parse_with_max_depth("<a><b/></a>", 1).is_ok());
    }

    // ---- attributes

    #[test]
    fn attribute_order_is_ignored() {
        let d = compare_xml(r#"<r a="1" b="2"/>"#, r#"<r b="2" a="1"/>"#).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn namespace_declarations_are_ignored() {
        let d = compare_xml(r#"<r xmlns="urn:a" k="v"/>"#, r#"<r xmlns="urn:b" k="v"/>"#).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn attribute_changes_in_sorted_order() {
        let d = compare_xml(
            r#"<r z="1" m="old" a="gone"/>"#,
            r#"<r z="1" m="new" b="fresh"/>"#,
        )
        .unwrap();

        assert_eq!(
            kinds(&d),
            vec![
                ElementChangeKind::RemoveAttribute,
                ElementChangeKind::AddAttribute,
                ElementChangeKind::ModifyAttribute,
            ]
        );
        assert_eq!(d.changes[0].attribute.as_deref(), Some("a"));
        assert_eq!(d.changes[0].old_value.as_deref(), Some("gone"));
        assert_eq!(d.changes[1].new_value.as_deref(), Some("fresh"));
        assert_eq!(d.changes[2].old_value.as_deref(), Some("old"));
        assert_eq!(d.changes[2].new_value.as_deref(), Some("new"));
        assert!(d.changes.iter().all(|c| c.path == "r"));
        assert_eq!(d.attribute_changes(), 3);
    }

    // ---- elements

    #[test]
    fn appended_child_is_one_add() {
        let d = compare_xml("<r><a/><b/></r>", "<r><a/><b/><c/></r>").unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.changes[0].kind, ElementChangeKind::AddElement);
        assert_eq!(d.changes[0].path, "r/c");
    }

    #[test]
    fn removed_child_carries_its_text() {
        let d = compare_xml(
            "<r><a/><b>x<i>y</i></b></r>",
            "<r><a/></r>",
        )
        .unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.changes[0].kind, ElementChangeKind::RemoveElement);
        assert_eq!(d.changes[0].path, "r/b");
        assert_eq!(d.changes[0].old_value.as_deref(), Some("xy"));
    }

    #[test]
    fn deep_text_follows_document_order() {
        let doc = XmlDocument::parse("<a>x<b>y<c>1</c>2</b>z<![CDATA[!]]><d/>w</a>").unwrap();
        assert_eq!(doc.root().deep_text(), "xy12z!w");
        assert_eq!(doc.root().text(), "xz!w");

        let d = compare_xml("<r><m>x<b>y</b>z</m></r>", "<r/>").unwrap();
        assert_eq!(d.changes[0].old_value.as_deref(), Some("xyz"));
    }

    #[test]
    fn renamed_element_stops_recursion() {
        let d = compare_xml(
            r#"<r><old k="1"><x/></old></r>"#,
            r#"<r><new k="2"><y/></new></r>"#,
        )
        .unwrap();
        assert_eq!(d.len(), 1);
        let change = &d.changes[0];
        assert_eq!(change.kind, ElementChangeKind::ModifyElement);
        assert_eq!(change.path, "r/old");
        assert_eq!(change.old_value.as_deref(), Some("old"));
        assert_eq!(change.new_value.as_deref(), Some("new"));
    }

    #[test]
    fn text_change_is_modify_element() {
        let d = compare_xml("<r><t> same </t><v>1</v></r>", "<r><t>same</t><v>2</v></r>").unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.changes[0].path, "r/v");
        assert_eq!(d.changes[0].old_value.as_deref(), Some("1"));
        assert_eq!(d.changes[0].new_value.as_deref(), Some("2"));
    }

    #[test]
    fn cdata_counts_as_text() {
        let d = compare_xml("<r><![CDATA[a]]></r>", "<r>a</r>").unwrap();
        assert!(d.is_empty());
    }

    // ---- reordering

    #[test]
    fn reordered_children_match_by_name() {
        let d = compare_xml(
            r#"<r><a v="1"/><b v="2"/></r>"#,
            r#"<r><b v="2"/><a v="1"/></r>"#,
        )
        .unwrap();

        assert_eq!(d.reorders(), 2);
        assert_eq!(d.len(), 2);
        let a = d.at("r/a").next().unwrap();
        assert_eq!(a.old_position, Some(0));
        assert_eq!(a.new_position, Some(1));
    }

    #[test]
    fn reorder_reporting_can_be_disabled() {
        let comparator = XmlComparator::new(StructuralConfig {
            report_reorders: false,
            ..Default::default()
        });
        let d = comparator
            .compare_str("<r><a/><b/></r>", "<r><b/><a/></r>")
            .unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn reordered_children_still_recurse() {
        let d = compare_xml(
            r#"<r><a v="1"/><b/></r>"#,
            r#"<r><b/><a v="9"/></r>"#,
        )
        .unwrap();
        let attr: Vec<_> = d
            .changes
            .iter()
            .filter(|c| c.kind == ElementChangeKind::ModifyAttribute)
            .collect();
        assert_eq!(attr.len(), 1);
        assert_eq!(attr[0].path, "r/a");
    }

    #[test]
    fn same_local_names_with_other_prefixes_are_unmatched() {
        let d = compare_xml(
            r#"<r xmlns:p="urn:p" xmlns:q="urn:q"><p:a/><b/></r>"#,
            r#"<r xmlns:p="urn:p" xmlns:q="urn:q"><b/><q:a/></r>"#,
        )
        .unwrap();
        assert_eq!(d.count(ElementChangeKind::RemoveElement), 1);
        assert_eq!(d.count(ElementChangeKind::AddElement), 1);
        assert_eq!(d.reorders(), 1);
    }

    #[test]
    fn different_name_multisets_compare_positionally() {
        let d = compare_xml("<r><a/><b/></r>", "<r><b/><c/></r>").unwrap();
        assert_eq!(d.reorders(), 0);
        assert_eq!(
            kinds(&d),
            vec![ElementChangeKind::ModifyElement, ElementChangeKind::ModifyElement]
        );
    }

    #[test]
    fn compare_depth_limit() {
        let comparator = XmlComparator::new(StructuralConfig {
            max_depth: 1,
            ..Default::default()
        });
        let left = XmlDocument::parse("<a><b><c>1</c></b></a>").unwrap();
        let right = XmlDocument::parse("<a><b><c>2</c></b></a>").unwrap();
        let err = comparator.compare_documents(&left, &right).unwrap_err();
        assert!(matches!(err, StructureError::DepthExceeded { max: 1 }));
    }

    #[test]
    fn empty_side_names_the_side() {
        let err = compare_xml("<r/>", "").unwrap_err();
        assert!(matches!(err, StructureError::EmptyInput { side: "right", .. }));
    }
}
