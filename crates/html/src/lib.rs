pub mod scripts;

mod dom_builder;
mod entities;
mod serialize;
mod tokenizer;
mod types;

pub use crate::dom_builder::build_dom;
pub use crate::entities::{escape_attr, escape_text};
pub use crate::serialize::serialize;
pub use crate::tokenizer::tokenize;
pub use crate::types::{Node, Token};

/// Parse a markup string into an owned DOM.
pub fn parse(input: &str) -> Node {
    build_dom(tokenize(input))
}
