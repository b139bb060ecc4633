#[derive(Debug)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document {
        doctype: Option<String>,
        children: Vec<Node>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl Node {
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn is_element_named(&self, target: &str) -> bool {
        matches!(self, Node::Element { name, .. } if name.eq_ignore_ascii_case(target))
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        let Node::Element { attributes, .. } = self else {
            return None;
        };
        attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v.as_deref())
    }

    /// Set `key` to `value`, replacing an existing entry of the same name.
    pub fn set_attr(&mut self, key: &str, value: String) {
        let Node::Element { attributes, .. } = self else {
            return;
        };
        for (k, v) in attributes.iter_mut() {
            if k.eq_ignore_ascii_case(key) {
                *v = Some(value);
                return;
            }
        }
        attributes.push((key.to_string(), Some(value)));
    }

    /// Concatenated text of direct text children. Element and comment
    /// children contribute nothing (matches rawtext content of a script).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        if let Some(children) = self.children() {
            for child in children {
                if let Node::Text { text } = child {
                    out.push_str(text);
                }
            }
        }
        out
    }
}
