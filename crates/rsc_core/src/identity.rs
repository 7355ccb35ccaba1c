//! Synthesized sibling identity
//!
//! Siblings without an explicit key get one derived from their position and,
//! for intrinsic elements, their tag: `"3"` or `"3_div"`. Re-evaluating a
//! structurally identical list therefore yields the same keys.
//!
//! A synthesized key that collides with a key already taken in the same
//! sibling list gets the first free `~n` suffix (`"0_li~1"`, `"0_li~2"`, ...).

use std::collections::HashSet;

use crate::element::{Key, Node};

/// Derive the key for the sibling at `index`
pub fn synthesize_key(index: usize, tag: Option<&str>) -> Key {
    match tag {
        Some(tag) => Key::new(format!("{}_{}", index, tag)),
        None => Key::new(index.to_string()),
    }
}

/// Give every unkeyed element in an evaluated sibling list a key
///
/// Explicit keys are kept verbatim. Non-element siblings are untouched.
pub fn assign_sibling_keys(siblings: Vec<Node>) -> Vec<Node> {
    let mut taken: HashSet<String> = siblings
        .iter()
        .filter_map(Node::as_element)
        .filter_map(|element| element.get_key())
        .map(|key| key.as_str().to_string())
        .collect();

    siblings
        .into_iter()
        .enumerate()
        .map(|(index, node)| match node {
            Node::Element(element) if element.get_key().is_none() => {
                let base = synthesize_key(index, element.kind().tag());
                let key = free_key(base, &taken);
                taken.insert(key.as_str().to_string());
                Node::Element(element.key(key))
            }
            other => other,
        })
        .collect()
}

fn free_key(base: Key, taken: &HashSet<String>) -> Key {
    if !taken.contains(base.as_str()) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}~{}", base, n);
        if !taken.contains(&candidate) {
            return Key::new(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn keys(nodes: &[Node]) -> Vec<Option<String>> {
        nodes
            .iter()
            .map(|n| {
                n.as_element()
                    .and_then(|e| e.get_key())
                    .map(|k| k.as_str().to_string())
            })
            .collect()
    }

    #[test]
    fn test_synthesize_key() {
        assert_eq!(synthesize_key(0, Some("div")).as_str(), "0_div");
        assert_eq!(synthesize_key(7, None).as_str(), "7");
    }

    #[test]
    fn test_assign_keys_by_position_and_tag() {
        let siblings = vec![
            Node::from(Element::intrinsic("li")),
            Node::from(Element::reference("widgets/counter")),
            Node::from("text"),
            Node::from(Element::fragment(Vec::<Node>::new())),
        ];
        let keyed = assign_sibling_keys(siblings);
        assert_eq!(
            keys(&keyed),
            vec![Some("0_li".into()), Some("1".into()), None, Some("3".into())]
        );
    }

    #[test]
    fn test_explicit_keys_win() {
        let siblings = vec![
            Node::from(Element::intrinsic("li").key("first")),
            Node::from(Element::intrinsic("li")),
        ];
        let keyed = assign_sibling_keys(siblings);
        assert_eq!(keys(&keyed), vec![Some("first".into()), Some("1_li".into())]);
    }

    #[test]
    fn test_collision_tie_break() {
        let siblings = vec![
            Node::from(Element::intrinsic("li")),
            Node::from(Element::intrinsic("li").key("0_li")),
            Node::from(Element::intrinsic("li").key("0_li~1")),
        ];
        let keyed = assign_sibling_keys(siblings);
        assert_eq!(
            keys(&keyed),
            vec![Some("0_li~2".into()), Some("0_li".into()), Some("0_li~1".into())]
        );
    }

    #[test]
    fn test_assignment_is_stable() {
        let build = || {
            vec![
                Node::from(Element::intrinsic("a")),
                Node::from(Element::intrinsic("b")),
            ]
        };
        assert_eq!(assign_sibling_keys(build()), assign_sibling_keys(build()));
    }
}
