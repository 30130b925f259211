pub mod node_document;

pub use node_document::{parse_node_yaml, to_node_yaml, NodeDocument};
