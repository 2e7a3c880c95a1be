/// State of a checkbox that may summarise several children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    Checked,
    Unchecked,
    Mixed,
}

impl TriState {
    #[must_use]
    pub const fn is_checked(self) -> bool {
        matches!(self, Self::Checked)
    }

    #[must_use]
    pub const fn is_any(self) -> bool {
        !matches!(self, Self::Unchecked)
    }
}

/// A tree of checkboxes where only leaves hold state.
///
/// Group states are computed bottom-up on every read, so a master box is
/// checked exactly when all its children are. Setting a group writes the value
/// down to every leaf below it.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckNode<K> {
    key: K,
    checked: bool,
    children: Vec<CheckNode<K>>,
}

impl<K: Copy + PartialEq> CheckNode<K> {
    #[must_use]
    pub fn leaf(key: K) -> Self {
        Self { key, checked: false, children: Vec::new() }
    }

    #[must_use]
    pub fn group(key: K, children: Vec<Self>) -> Self {
        Self { key, checked: false, children }
    }

    #[must_use]
    pub fn key(&self) -> K {
        self.key
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    #[must_use]
    pub fn state(&self) -> TriState {
        if self.is_leaf() {
            return if self.checked { TriState::Checked } else { TriState::Unchecked };
        }
        let mut any = false;
        let mut all = true;
        for child in &self.children {
            match child.state() {
                TriState::Checked => any = true,
                TriState::Unchecked => all = false,
                TriState::Mixed => {
                    any = true;
                    all = false;
                }
            }
        }
        match (all, any) {
            (true, _) => TriState::Checked,
            (false, true) => TriState::Mixed,
            (false, false) => TriState::Unchecked,
        }
    }

    #[must_use]
    pub fn find(&self, key: K) -> Option<&Self> {
        if self.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(key))
    }

    fn find_mut(&mut self, key: K) -> Option<&mut Self> {
        if self.key == key {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(key))
    }

    fn set_all(&mut self, value: bool) {
        self.checked = value;
        for child in &mut self.children {
            child.set_all(value);
        }
    }

    /// Sets a node and everything below it. Returns false for an unknown key.
    pub fn set(&mut self, key: K, value: bool) -> bool {
        match self.find_mut(key) {
            Some(node) => {
                node.set_all(value);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn state_of(&self, key: K) -> Option<TriState> {
        self.find(key).map(Self::state)
    }

    /// Checked leaves in tree order
    #[must_use]
    pub fn checked_leaves(&self) -> Vec<K> {
        let mut out = Vec::new();
        self.collect_checked(&mut out);
        out
    }

    fn collect_checked(&self, out: &mut Vec<K>) {
        if self.is_leaf() {
            if self.checked {
                out.push(self.key);
            }
        } else {
            for child in &self.children {
                child.collect_checked(out);
            }
        }
    }

    /// All leaves in tree order
    #[must_use]
    pub fn leaves(&self) -> Vec<K> {
        if self.is_leaf() {
            return vec![self.key];
        }
        self.children.iter().flat_map(Self::leaves).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Key {
        Root,
        A,
        B,
        Sub,
        C,
        D,
    }

    fn tree() -> CheckNode<Key> {
        CheckNode::group(Key::Root, vec![
            CheckNode::leaf(Key::A),
            CheckNode::leaf(Key::B),
            CheckNode::group(Key::Sub, vec![CheckNode::leaf(Key::C), CheckNode::leaf(Key::D)]),
        ])
    }

    #[test]
    fn test_new_tree_is_unchecked() {
        let t = tree();
        assert_eq!(t.state(), TriState::Unchecked);
        assert!(t.checked_leaves().is_empty());
    }

    #[test]
    fn test_nested_rollup() {
        let mut t = tree();
        t.set(Key::C, true);
        assert_eq!(t.state_of(Key::Sub), Some(TriState::Mixed));
        assert_eq!(t.state(), TriState::Mixed);

        t.set(Key::D, true);
        assert_eq!(t.state_of(Key::Sub), Some(TriState::Checked));
        assert_eq!(t.state(), TriState::Mixed);

        t.set(Key::A, true);
        t.set(Key::B, true);
        assert_eq!(t.state(), TriState::Checked);
    }

    #[test]
    fn test_group_set_propagates_down() {
        let mut t = tree();
        t.set(Key::Root, true);
        assert_eq!(t.checked_leaves(), vec![Key::A, Key::B, Key::C, Key::D]);

        t.set(Key::Sub, false);
        assert_eq!(t.checked_leaves(), vec![Key::A, Key::B]);
        assert_eq!(t.state(), TriState::Mixed);
    }

    #[test]
    fn test_unknown_key_is_reported() {
        let mut sub = CheckNode::group(Key::Sub, vec![CheckNode::leaf(Key::C)]);
        assert!(!sub.set(Key::A, true));
        assert_eq!(sub.leaves(), vec![Key::C]);
    }
}
