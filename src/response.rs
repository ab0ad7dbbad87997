//! Streaming XML response trees.
//!
//! FPS defines dozens of operations, each with its own occasionally-changing
//! result shape. Rather than one schema type per operation, every response is
//! parsed into a generic [`ResponseNode`] tree: a single streaming pass over
//! the document builds nodes for everything inside the `<Action>Result`
//! element and discards the surrounding envelope. Fields are reached by tag
//! name at any depth, so new result shapes need no code changes here.

use std::fmt;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::FlexPayError;
use crate::Result;

/// Suffix appended to the operation name to form the result-root tag.
const RESULT_SUFFIX: &str = "Result";

/// Tag whose text is captured as the response correlation identifier.
const REQUEST_ID_TAG: &str = "RequestId";

/// One XML element from a response.
///
/// A node is either a leaf (trimmed text, no children) or a branch (named
/// children, ignorable text). Children are owned and ordered by discovery;
/// repeated tags at one level are all kept. The root node additionally
/// carries the correlation `RequestId` and the untouched response text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResponseNode {
    name: String,
    value: String,
    children: Vec<ResponseNode>,
    request_id: Option<String>,
    response_text: Option<String>,
}

impl ResponseNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// The element's tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element's trimmed text value. Empty for branch nodes.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this node is a leaf: text content and no child elements.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && !self.value.is_empty()
    }

    /// First child with the given tag name.
    pub fn get_child(&self, name: &str) -> Option<&ResponseNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Every child with the given tag name, in discovery order. The provider
    /// is allowed to repeat a tag at one level, so lookups must not assume
    /// uniqueness.
    pub fn get_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ResponseNode> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// All children in discovery order.
    pub fn children(&self) -> &[ResponseNode] {
        &self.children
    }

    /// The correlation identifier captured from the response, if any.
    /// Populated only on the result root.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// The raw, untouched response body. Populated only on the result root,
    /// preserving the ability to inspect or re-parse the original payload.
    pub fn response_text(&self) -> Option<&str> {
        self.response_text.as_deref()
    }
}

impl fmt::Display for ResponseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            f.write_str(&self.value)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Builder state: outside the result subtree, inside it, or finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BuilderState {
    Scanning,
    Building,
    Done,
}

/// Incremental tree builder fed by parser events.
///
/// Nodes under construction live on an explicit stack; a finished node is
/// attached to the node below it when its closing tag arrives, which keeps
/// ownership acyclic without parent back-references.
struct TreeBuilder {
    result_tag: String,
    state: BuilderState,
    stack: Vec<ResponseNode>,
    text: String,
    root: Option<ResponseNode>,
}

impl TreeBuilder {
    fn new(operation: &str) -> Self {
        Self {
            result_tag: format!("{}{}", operation, RESULT_SUFFIX),
            state: BuilderState::Scanning,
            stack: Vec::new(),
            text: String::new(),
            root: None,
        }
    }

    fn open_element(&mut self, name: &str) {
        self.text.clear();
        match self.state {
            BuilderState::Scanning if name == self.result_tag => {
                self.stack.push(ResponseNode::new(name));
                self.state = BuilderState::Building;
            }
            BuilderState::Building => {
                self.stack.push(ResponseNode::new(name));
            }
            // Envelope content before the result root, or anything after it
            // closed, is not part of the result.
            _ => {}
        }
    }

    fn close_element(&mut self, name: &str) {
        let text = std::mem::take(&mut self.text);

        // The correlation identifier can close at any depth once the root
        // exists: inside the result subtree or in a sibling metadata element
        // after the result closed.
        if name == REQUEST_ID_TAG {
            let root = match self.state {
                BuilderState::Building => self.stack.first_mut(),
                BuilderState::Done => self.root.as_mut(),
                BuilderState::Scanning => None,
            };
            if let Some(root) = root {
                root.request_id = Some(text.trim().to_string());
            }
        }

        if self.state != BuilderState::Building {
            return;
        }
        if let Some(mut node) = self.stack.pop() {
            node.value = text.trim().to_string();
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => {
                    self.root = Some(node);
                    self.state = BuilderState::Done;
                }
            }
        }
    }

    fn append_text(&mut self, chunk: &str) {
        self.text.push_str(chunk);
    }

    fn finish(self, raw: &str, operation: &str) -> Result<ResponseNode> {
        match self.root {
            Some(mut root) => {
                root.response_text = Some(raw.to_string());
                Ok(root)
            }
            None => Err(FlexPayError::malformed_response(
                operation,
                format!("no <{}> element in response", self.result_tag),
            )),
        }
    }
}

/// Parse a raw response body into the result tree for `operation`.
///
/// The result root is the `<OperationName>Result` element; everything outside
/// it is wrapper envelope and is dropped, except the `RequestId` correlation
/// identifier, which is attached to the root wherever it appears. Fails with
/// [`FlexPayError::MalformedResponse`] if the result root never appears or
/// the document is not well-formed XML.
pub fn parse_response(body: &str, operation: &str) -> Result<ResponseNode> {
    let mut reader = Reader::from_str(body);
    let mut builder = TreeBuilder::new(operation);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                builder.open_element(&name);
            }
            Ok(Event::Empty(e)) => {
                // A self-closing element opens and immediately closes.
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                builder.open_element(&name);
                builder.close_element(&name);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                builder.close_element(&name);
            }
            Ok(Event::Text(t)) => {
                let chunk = t
                    .unescape()
                    .map_err(|e| FlexPayError::malformed_response(operation, e.to_string()))?;
                builder.append_text(&chunk);
            }
            Ok(Event::CData(t)) => {
                let chunk = String::from_utf8_lossy(&t.into_inner()).into_owned();
                builder.append_text(&chunk);
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctypes.
            Ok(_) => {}
            Err(e) => {
                return Err(FlexPayError::malformed_response(operation, e.to_string()));
            }
        }
    }

    builder.finish(body, operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_is_discarded() {
        let body = "<Envelope><Before>noise</Before>\
                    <PayResult><TransactionId>T-1</TransactionId></PayResult>\
                    <After>noise</After></Envelope>";
        let root = parse_response(body, "Pay").unwrap();

        assert_eq!(root.name(), "PayResult");
        assert_eq!(root.get_child("TransactionId").unwrap().value(), "T-1");
        assert!(root.get_child("Before").is_none());
        assert!(root.get_child("After").is_none());
        assert!(root.get_child("Envelope").is_none());
    }

    #[test]
    fn test_request_id_inside_result() {
        let body = "<Envelope><PayResult>\
                    <TransactionId>T-1</TransactionId>\
                    <RequestId>R-1</RequestId>\
                    </PayResult></Envelope>";
        let root = parse_response(body, "Pay").unwrap();

        assert_eq!(root.name(), "PayResult");
        assert_eq!(root.get_child("TransactionId").unwrap().value(), "T-1");
        assert_eq!(root.request_id(), Some("R-1"));
    }

    #[test]
    fn test_request_id_in_sibling_metadata() {
        let body = "<PayResponse>\
                    <PayResult><TransactionId>T-9</TransactionId></PayResult>\
                    <ResponseMetadata><RequestId>bd4e69d9-23a4</RequestId></ResponseMetadata>\
                    </PayResponse>";
        let root = parse_response(body, "Pay").unwrap();

        assert_eq!(root.request_id(), Some("bd4e69d9-23a4"));
        // Metadata elements outside the result never become children.
        assert!(root.get_child("ResponseMetadata").is_none());
        assert!(root.get_child("RequestId").is_none());
    }

    #[test]
    fn test_missing_result_root_is_malformed() {
        let body = "<SomeResponse><OtherResult>nope</OtherResult></SomeResponse>";
        let err = parse_response(body, "Pay").unwrap_err();
        match err {
            FlexPayError::MalformedResponse { operation, reason } => {
                assert_eq!(operation, "Pay");
                assert!(reason.contains("PayResult"));
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_body_is_malformed() {
        let err = parse_response("<PayResult><Oops></PayResult>", "Pay").unwrap_err();
        assert!(matches!(err, FlexPayError::MalformedResponse { .. }));
    }

    #[test]
    fn test_leaf_and_branch_rendering() {
        let body = "<GetAccountBalanceResult>\
                    <AccountBalance><TotalBalance><Value> 42.50 </Value></TotalBalance></AccountBalance>\
                    </GetAccountBalanceResult>";
        let root = parse_response(body, "GetAccountBalance").unwrap();

        let balance = root.get_child("AccountBalance").unwrap();
        assert!(!balance.is_leaf());
        assert_eq!(balance.to_string(), "AccountBalance");

        let value = balance
            .get_child("TotalBalance")
            .and_then(|t| t.get_child("Value"))
            .unwrap();
        assert!(value.is_leaf());
        // Surrounding whitespace is trimmed.
        assert_eq!(value.value(), "42.50");
        assert_eq!(value.to_string(), "42.50");
    }

    #[test]
    fn test_repeated_tags_are_all_kept() {
        let body = "<GetTokensByCallerResult>\
                    <Token><TokenId>a</TokenId></Token>\
                    <Token><TokenId>b</TokenId></Token>\
                    </GetTokensByCallerResult>";
        let root = parse_response(body, "GetTokensByCaller").unwrap();

        let tokens: Vec<_> = root.get_children("Token").collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].get_child("TokenId").unwrap().value(), "a");
        assert_eq!(tokens[1].get_child("TokenId").unwrap().value(), "b");
        // get_child returns the first occurrence.
        assert_eq!(
            root.get_child("Token").unwrap().get_child("TokenId").unwrap().value(),
            "a"
        );
    }

    #[test]
    fn test_self_closing_element() {
        let body = "<PayResult><CallerDescription/><TransactionId>T-2</TransactionId></PayResult>";
        let root = parse_response(body, "Pay").unwrap();

        let empty = root.get_child("CallerDescription").unwrap();
        assert_eq!(empty.value(), "");
        assert!(!empty.is_leaf());
        // An empty element renders as its own tag name.
        assert_eq!(empty.to_string(), "CallerDescription");
    }

    #[test]
    fn test_raw_body_attached_to_root() {
        let body = "<PayResult><TransactionId>T-3</TransactionId></PayResult>";
        let root = parse_response(body, "Pay").unwrap();
        assert_eq!(root.response_text(), Some(body));
        // Children do not carry the raw payload.
        assert_eq!(root.get_child("TransactionId").unwrap().response_text(), None);
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let body = "<PayResult><CallerDescription>Widgets &amp; Co.</CallerDescription></PayResult>";
        let root = parse_response(body, "Pay").unwrap();
        assert_eq!(
            root.get_child("CallerDescription").unwrap().value(),
            "Widgets & Co."
        );
    }

    #[test]
    fn test_namespaced_tags_match_by_local_name() {
        let body = "<ns:PayResponse xmlns:ns=\"http://fps.amazonaws.com/doc/2010-08-28/\">\
                    <ns:PayResult><ns:TransactionId>T-7</ns:TransactionId></ns:PayResult>\
                    </ns:PayResponse>";
        let root = parse_response(body, "Pay").unwrap();
        assert_eq!(root.name(), "PayResult");
        assert_eq!(root.get_child("TransactionId").unwrap().value(), "T-7");
    }
}
