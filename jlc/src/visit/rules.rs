use crate::ast::NodeTag;
use std::collections::HashMap;

/// Per-node-kind overrides of a pass's default behavior.
///
/// Language extensions register a rule for the node kinds they change; a pass consults its
/// table before falling back to the built-in handling of a node.
pub struct RuleTable<R> {
    rules: HashMap<NodeTag, R>,
}

impl<R: Copy> RuleTable<R> {
    pub fn new() -> RuleTable<R> {
        RuleTable {
            rules: HashMap::new(),
        }
    }

    /// Registers `rule` for nodes tagged `tag` and returns the rule it replaces.
    pub fn register(&mut self, tag: NodeTag, rule: R) -> Option<R> {
        self.rules.insert(tag, rule)
    }

    pub fn get(&self, tag: NodeTag) -> Option<R> {
        self.rules.get(&tag).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<R: Copy> Default for RuleTable<R> {
    fn default() -> RuleTable<R> {
        RuleTable::new()
    }
}

impl<R: Copy> Clone for RuleTable<R> {
    fn clone(&self) -> RuleTable<R> {
        RuleTable {
            rules: self.rules.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(value: u32) -> u32 {
        value + 1
    }

    fn second(value: u32) -> u32 {
        value * 2
    }

    #[test]
    fn later_registrations_replace_earlier_ones() {
        let mut rules: RuleTable<fn(u32) -> u32> = RuleTable::new();
        assert!(rules.register(NodeTag::Assign, first).is_none());
        assert!(rules.register(NodeTag::Assign, second).is_some());
        assert_eq!(rules.get(NodeTag::Assign).map(|rule| rule(5)), Some(10));
        assert!(rules.get(NodeTag::Binary).is_none());
    }
}
