use crate::types::{Node, Token};

/// Build an owned DOM from a token stream.
///
/// Elements left open at end of input are closed implicitly; end tags with
/// no matching open element are ignored. Input is assumed well-formed, so
/// neither path does spec-style error recovery.
pub fn build_dom(tokens: Vec<Token>) -> Node {
    let mut doctype: Option<String> = None;
    // stack[0] is the document; the rest are open elements.
    let mut stack: Vec<Node> = vec![Node::Document {
        doctype: None,
        children: Vec::new(),
    }];

    for token in tokens {
        match token {
            Token::Doctype(s) => {
                doctype = Some(s);
            }
            Token::Comment(text) => append(&mut stack, Node::Comment { text }),
            Token::Text(text) => {
                if !text.is_empty() {
                    append(&mut stack, Node::Text { text });
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let element = Node::Element {
                    name,
                    attributes,
                    children: Vec::new(),
                };
                if self_closing {
                    append(&mut stack, element);
                } else {
                    stack.push(element);
                }
            }
            Token::EndTag(target) => {
                let matches_open = stack[1..]
                    .iter()
                    .any(|open| open.is_element_named(&target));
                if !matches_open {
                    log::trace!(target: "html.dom", "ignoring unmatched </{target}>");
                    continue;
                }
                loop {
                    let closed = stack.pop().expect("matched element is on the stack");
                    let was_target = closed.is_element_named(&target);
                    append(&mut stack, closed);
                    if was_target {
                        break;
                    }
                }
            }
        }
    }

    // Close whatever is still open.
    while stack.len() > 1 {
        let closed = stack.pop().expect("stack has more than the document");
        append(&mut stack, closed);
    }

    let mut document = stack.pop().expect("document root");
    if let Node::Document { doctype: dt, .. } = &mut document {
        *dt = doctype;
    }
    document
}

fn append(stack: &mut [Node], node: Node) {
    let parent = stack.last_mut().expect("stack is never empty");
    parent
        .children_mut()
        .expect("open nodes can hold children")
        .push(node);
}
