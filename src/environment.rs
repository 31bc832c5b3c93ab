//! The single flat namespace GIANT programs evaluate against.
//!
//! There is no lexical scoping (spec §3/§9 "when-without-scope"): every
//! binding - scalar, anchor or relational - lives in one ordered namespace
//! for the lifetime of the program. Order is preserved on insertion and is
//! not disturbed by rebinding, since `list anchors` must display anchors in
//! declaration order.

use crate::value::{Anchor, Binding};

#[derive(Debug, Default)]
pub struct Environment {
    order: Vec<String>,
    slots: std::collections::HashMap<String, (usize, Binding)>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Bind `name` to `value`. Rebinding an existing name replaces its value
    /// in place, keeping its original position in iteration order.
    pub fn bind(&mut self, name: &str, value: Binding) {
        if let Some((_, existing)) = self.slots.get_mut(name) {
            *existing = value;
        } else {
            self.order.push(name.to_string());
            self.slots.insert(name.to_string(), (self.order.len() - 1, value));
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.slots.get(name).map(|(_, b)| b)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Anchors, in declaration order, for `list anchors` / `describe anchor`.
    pub fn iter_anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.order.iter().filter_map(move |name| match self.slots.get(name) {
            Some((_, Binding::Anchor(a))) => Some(a),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;

    #[test]
    fn rebinding_replaces_value_in_place() {
        let mut env = Environment::new();
        env.bind("x", Binding::Scalar(Scalar::Int(1)));
        env.bind("y", Binding::Scalar(Scalar::Int(2)));
        env.bind("x", Binding::Scalar(Scalar::Int(9)));

        assert_eq!(env.lookup("x"), Some(&Binding::Scalar(Scalar::Int(9))));
        assert_eq!(env.lookup("y"), Some(&Binding::Scalar(Scalar::Int(2))));
    }

    #[test]
    fn anchors_iterate_in_declaration_order() {
        let mut env = Environment::new();
        let mk = |name: &str, v: i64| Anchor {
            name: name.to_string(),
            value: Scalar::Int(v),
            metadata: vec![],
        };
        env.bind("b", Binding::Anchor(mk("b", 2)));
        env.bind("a", Binding::Anchor(mk("a", 1)));
        let names: Vec<&str> = env.iter_anchors().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
