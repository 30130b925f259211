pub mod rule_template;

pub use rule_template::{concat_rule_and_node, expand_rule_template};
