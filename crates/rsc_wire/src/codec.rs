//! Node <-> JSON conversion
//!
//! # Wire Format
//!
//! ```text
//! {"$element":"fragment","props":{"children":[
//!     {"$element":"intrinsic","type":"div","key":"0_div","props":{}},
//!     {"$element":"reference","module":"widgets/counter","key":"1","props":{"start":0}}
//! ]}}
//! ```
//!
//! Plain object keys starting with `$` are written with one extra `$`
//! (`"$price"` becomes `"$$price"`), so user data never carries the marker.
//!
//! # Depth
//!
//! Every element costs three JSON levels (element, props, children array).
//! Both directions accept up to [`MAX_DEPTH`] levels, so whatever `encode`
//! writes, `decode` reads back.

use std::borrow::Cow;

use rsc_core::{Element, ElementKind, Key, Node, Props};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{WireError, WireResult};

/// Reserved key whose value names an element's kind
pub const ELEMENT_MARKER: &str = "$element";

const KIND_FRAGMENT: &str = "fragment";
const KIND_INTRINSIC: &str = "intrinsic";
const KIND_REFERENCE: &str = "reference";

const FIELD_TYPE: &str = "type";
const FIELD_MODULE: &str = "module";
const FIELD_KEY: &str = "key";
const FIELD_PROPS: &str = "props";

/// Deepest JSON nesting either direction accepts
pub const MAX_DEPTH: usize = 512;

/// Encode an evaluated tree as compact JSON text
pub fn encode(node: &Node) -> WireResult<String> {
    let text = serde_json::to_string(&to_value(node)?)?;
    log::trace!("Encoded tree into {} bytes", text.len());
    Ok(text)
}

/// Encode an evaluated tree as indented JSON text
pub fn encode_pretty(node: &Node) -> WireResult<String> {
    Ok(serde_json::to_string_pretty(&to_value(node)?)?)
}

/// Decode JSON text into a tree
pub fn decode(text: &str) -> WireResult<Node> {
    let depth = nesting_depth(text);
    if depth > MAX_DEPTH {
        return Err(WireError::Malformed(format!(
            "payload nested {} levels deep, limit is {}",
            depth, MAX_DEPTH
        )));
    }

    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;

    let node = from_value(value)?;
    log::trace!("Decoded {} bytes", text.len());
    Ok(node)
}

/// Make encoded text safe to embed inside an HTML `<script>` element
pub fn script_safe(text: &str) -> String {
    text.replace('<', "\\u003c")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Convert a tree into a JSON value
pub fn to_value(node: &Node) -> WireResult<Value> {
    value_at(node, 0)
}

/// `depth` counts the containers already open around `node`
fn value_at(node: &Node, depth: usize) -> WireResult<Value> {
    Ok(match node {
        Node::Null => Value::Null,
        Node::Bool(b) => Value::Bool(*b),
        Node::Number(n) => Value::Number(n.clone()),
        Node::String(s) => Value::String(s.clone()),
        Node::Array(items) => {
            let depth = enter(depth)?;
            Value::Array(
                items
                    .iter()
                    .map(|item| value_at(item, depth))
                    .collect::<WireResult<_>>()?,
            )
        }
        Node::Object(map) => Value::Object(props_to_map(map, enter(depth)?)?),
        Node::Element(element) => Value::Object(element_to_map(element, enter(depth)?)?),
    })
}

fn enter(depth: usize) -> WireResult<usize> {
    let depth = depth + 1;
    if depth > MAX_DEPTH {
        return Err(WireError::Unserializable(format!(
            "tree nested deeper than {} levels",
            MAX_DEPTH
        )));
    }
    Ok(depth)
}

/// Deepest bracket nesting in `text`, ignoring brackets inside strings
fn nesting_depth(text: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Convert a JSON value into a tree
pub fn from_value(value: Value) -> WireResult<Node> {
    Ok(match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(n) => Node::Number(n),
        Value::String(s) => Node::String(s),
        Value::Array(items) => {
            Node::Array(items.into_iter().map(from_value).collect::<WireResult<_>>()?)
        }
        Value::Object(map) if map.contains_key(ELEMENT_MARKER) => {
            Node::Element(map_to_element(map)?)
        }
        Value::Object(map) => Node::Object(map_to_props(map)?),
    })
}

fn element_to_map(element: &Element, depth: usize) -> WireResult<Map<String, Value>> {
    let mut map = Map::new();
    match element.kind() {
        ElementKind::Fragment => {
            map.insert(ELEMENT_MARKER.into(), KIND_FRAGMENT.into());
        }
        ElementKind::Intrinsic(tag) => {
            map.insert(ELEMENT_MARKER.into(), KIND_INTRINSIC.into());
            map.insert(FIELD_TYPE.into(), Value::String(tag.clone()));
        }
        ElementKind::BoundaryReference(path) => {
            map.insert(ELEMENT_MARKER.into(), KIND_REFERENCE.into());
            map.insert(FIELD_MODULE.into(), Value::String(path.clone()));
        }
        ElementKind::Composite(component) => {
            return Err(WireError::Unserializable(format!(
                "composite `{}` (evaluate the tree before encoding)",
                component.name()
            )));
        }
    }
    if let Some(key) = element.get_key() {
        map.insert(FIELD_KEY.into(), Value::String(key.as_str().to_string()));
    }
    let props = props_to_map(element.props(), enter(depth)?)?;
    map.insert(FIELD_PROPS.into(), Value::Object(props));
    Ok(map)
}

fn map_to_element(mut fields: Map<String, Value>) -> WireResult<Element> {
    let kind = match fields.remove(ELEMENT_MARKER) {
        Some(Value::String(kind)) => kind,
        other => {
            return Err(WireError::Malformed(format!(
                "element marker must be a string, got {}",
                describe(other.as_ref())
            )))
        }
    };

    let kind = match kind.as_str() {
        KIND_FRAGMENT => ElementKind::Fragment,
        KIND_INTRINSIC => ElementKind::Intrinsic(take_string(&mut fields, FIELD_TYPE, &kind)?),
        KIND_REFERENCE => {
            ElementKind::BoundaryReference(take_string(&mut fields, FIELD_MODULE, &kind)?)
        }
        unknown => {
            return Err(WireError::Malformed(format!(
                "unknown element kind `{}`",
                unknown
            )))
        }
    };

    let key = match fields.remove(FIELD_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::String(key)) => Some(Key::from(key)),
        Some(other) => {
            return Err(WireError::Malformed(format!(
                "element key must be a string, got {}",
                describe(Some(&other))
            )))
        }
    };

    let props = match fields.remove(FIELD_PROPS) {
        None => Props::new(),
        Some(Value::Object(map)) => map_to_props(map)?,
        Some(other) => {
            return Err(WireError::Malformed(format!(
                "element props must be an object, got {}",
                describe(Some(&other))
            )))
        }
    };

    if let Some(field) = fields.keys().next() {
        return Err(WireError::Malformed(format!(
            "unexpected field `{}` on {} element",
            field,
            kind.name()
        )));
    }

    Ok(Element::new(kind, props, key))
}

fn props_to_map(props: &Props, depth: usize) -> WireResult<Map<String, Value>> {
    props
        .iter()
        .map(|(name, value)| -> WireResult<(String, Value)> {
            Ok((escape_key(name).into_owned(), value_at(value, depth)?))
        })
        .collect()
}

fn map_to_props(map: Map<String, Value>) -> WireResult<Props> {
    map.into_iter()
        .map(|(name, value)| -> WireResult<(String, Node)> {
            Ok((unescape_key(name)?, from_value(value)?))
        })
        .collect()
}

fn escape_key(name: &str) -> Cow<'_, str> {
    if name.starts_with('$') {
        Cow::Owned(format!("${}", name))
    } else {
        Cow::Borrowed(name)
    }
}

fn unescape_key(mut name: String) -> WireResult<String> {
    if name.starts_with("$$") {
        name.remove(0);
        Ok(name)
    } else if name.starts_with('$') {
        Err(WireError::Malformed(format!("reserved key `{}` in object", name)))
    } else {
        Ok(name)
    }
}

fn take_string(fields: &mut Map<String, Value>, field: &str, kind: &str) -> WireResult<String> {
    match fields.remove(field) {
        Some(Value::String(s)) => Ok(s),
        other => Err(WireError::Malformed(format!(
            "{} element needs a string `{}`, got {}",
            kind,
            field,
            describe(other.as_ref())
        ))),
    }
}

fn describe(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "a bool",
        Some(Value::Number(_)) => "a number",
        Some(Value::String(_)) => "a string",
        Some(Value::Array(_)) => "an array",
        Some(Value::Object(_)) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsc_core::Component;

    fn sample_tree() -> Node {
        Node::from(Element::fragment(vec![
            Node::from(Element::intrinsic("div").key("0_div")),
            Node::from(
                Element::reference("widgets/counter")
                    .key("1")
                    .prop("start", 0),
            ),
        ]))
    }

    #[test]
    fn test_encode_shape() {
        let text = encode(&sample_tree()).unwrap();
        assert_eq!(
            text,
            concat!(
                r#"{"$element":"fragment","props":{"children":["#,
                r#"{"$element":"intrinsic","type":"div","key":"0_div","props":{}},"#,
                r#"{"$element":"reference","module":"widgets/counter","key":"1","props":{"start":0}}"#,
                r#"]}}"#
            )
        );
    }

    #[test]
    fn test_roundtrip_sample() {
        let tree = sample_tree();
        let decoded = decode(&encode(&tree).unwrap()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn test_roundtrip_keeps_prop_order() {
        let tree = Node::from(
            Element::intrinsic("input")
                .prop("type", "text")
                .prop("value", "x")
                .prop("autofocus", true),
        );
        let decoded = decode(&encode(&tree).unwrap()).unwrap();
        let names: Vec<&str> = decoded
            .as_element()
            .unwrap()
            .props()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["type", "value", "autofocus"]);
    }

    #[test]
    fn test_numbers_keep_integer_and_float() {
        let tree = Node::Array(vec![Node::from(3), Node::from(2.5), Node::from(-0.125)]);
        let text = encode(&tree).unwrap();
        assert_eq!(text, "[3,2.5,-0.125]");
        assert_eq!(decode(&text).unwrap(), tree);
    }

    #[test]
    fn test_dollar_keys_are_escaped() {
        let mut data = Props::new();
        data.insert("$element".to_string(), Node::from("not an element"));
        data.insert("$$price".to_string(), Node::from(3));
        let tree = Node::from(Element::intrinsic("span").prop("data", Node::Object(data)));

        let text = encode(&tree).unwrap();
        assert!(text.contains(r#""$$element":"not an element""#));
        assert!(text.contains(r#""$$$price":3"#));

        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, tree);
        let data = decoded.as_element().unwrap().props().get("data").unwrap();
        assert!(matches!(data, Node::Object(_)));
    }

    #[test]
    fn test_composite_is_not_serializable() {
        let component = Component::new("Counter", |_| Ok(Node::Null));
        let tree = Node::from(Element::intrinsic("div").child(Element::composite(component)));
        match encode(&tree) {
            Err(WireError::Unserializable(msg)) => assert!(msg.contains("Counter")),
            other => panic!("Expected Unserializable, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let err = decode(r#"{"$element":"composite","props":{}}"#).unwrap_err();
        assert!(matches!(err, WireError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_missing_tag() {
        let err = decode(r#"{"$element":"intrinsic","props":{}}"#).unwrap_err();
        assert!(err.to_string().contains("`type`"));
    }

    #[test]
    fn test_decode_rejects_unexpected_field() {
        let err = decode(r#"{"$element":"fragment","type":"div"}"#).unwrap_err();
        assert!(err.to_string().contains("unexpected field `type`"));
    }

    #[test]
    fn test_decode_rejects_reserved_object_key() {
        let err = decode(r#"{"$ref":"x"}"#).unwrap_err();
        assert!(matches!(err, WireError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(matches!(decode("{not json").unwrap_err(), WireError::Json(_)));
    }

    #[test]
    fn test_missing_props_decode_as_empty() {
        let node = decode(r#"{"$element":"reference","module":"components/app"}"#).unwrap();
        let element = node.as_element().unwrap();
        assert_eq!(element.kind().module_path(), Some("components/app"));
        assert!(element.props().is_empty());
    }

    fn nested(depth: usize) -> Node {
        let mut node = Element::intrinsic("span");
        for _ in 0..depth {
            node = Element::intrinsic("div").key("0_div").child(node);
        }
        Node::from(node)
    }

    #[test]
    fn test_roundtrip_deep_tree() {
        let tree = nested(120);
        let text = encode(&tree).unwrap();
        assert!(nesting_depth(&text) > 128);
        assert_eq!(decode(&text).unwrap(), tree);
    }

    #[test]
    fn test_encode_rejects_tree_past_depth_limit() {
        match encode(&nested(MAX_DEPTH / 3 + 1)) {
            Err(WireError::Unserializable(msg)) => assert!(msg.contains("nested deeper")),
            other => panic!("Expected Unserializable, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_payload_past_depth_limit() {
        let text = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert!(matches!(decode(&text).unwrap_err(), WireError::Malformed(_)));

        let text = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(decode(&text).is_ok());
    }

    #[test]
    fn test_nesting_depth_skips_strings() {
        assert_eq!(nesting_depth(r#"{"a":"[[[{{"}"#), 1);
        assert_eq!(nesting_depth(r#"["\\",[["\"]"]]]"#), 3);
        assert_eq!(nesting_depth("3"), 0);
    }

    #[test]
    fn test_script_safe() {
        let text = encode(&Node::from("</script><script>alert(1)")).unwrap();
        let safe = script_safe(&text);
        assert!(!safe.contains('<'));
        assert_eq!(decode(&safe).unwrap(), Node::from("</script><script>alert(1)"));
    }
}
