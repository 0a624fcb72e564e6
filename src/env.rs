//! Lexical scopes: an `Rc`-linked parent chain of insertion-ordered
//! bindings, matching §4.4's push/pop contract by construction — a scope's
//! bindings are released exactly once, when its `Rc` drops.

use crate::error::{undefined_variable, MycoError};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Scope {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn root() -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Push a new child scope; the returned handle is the new innermost scope.
    pub fn child(parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Add a new binding in this (the innermost) scope, shadowing any outer
    /// binding of the same name.
    pub fn define(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// Search inner-to-outer for `name`, returning a clone of its value.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.borrow().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Update the nearest existing binding for `name`. Assigning to a name
    /// with no existing binding anywhere in the chain raises
    /// `undefined-variable` rather than silently creating one.
    pub fn assign(&self, name: &str, value: Value, line: usize) -> Result<(), MycoError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(p) => p.assign(name, value, line),
            None => Err(MycoError::new(undefined_variable(), line)),
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        if self.bindings.borrow().contains_key(name) {
            return true;
        }
        self.parent.as_ref().is_some_and(|p| p.is_bound(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let root = Scope::root();
        root.define("x", Value::Int(1));
        assert!(matches!(root.lookup("x"), Some(Value::Int(1))));
    }

    #[test]
    fn lookup_missing_is_none() {
        let root = Scope::root();
        assert!(root.lookup("missing").is_none());
    }

    #[test]
    fn child_sees_parent_bindings() {
        let root = Scope::root();
        root.define("x", Value::Int(1));
        let child = Scope::child(&root);
        assert!(matches!(child.lookup("x"), Some(Value::Int(1))));
    }

    #[test]
    fn child_shadows_parent() {
        let root = Scope::root();
        root.define("x", Value::Int(1));
        let child = Scope::child(&root);
        child.define("x", Value::Int(2));
        assert!(matches!(child.lookup("x"), Some(Value::Int(2))));
        assert!(matches!(root.lookup("x"), Some(Value::Int(1))));
    }

    #[test]
    fn assign_updates_outer_binding() {
        let root = Scope::root();
        root.define("x", Value::Int(1));
        let child = Scope::child(&root);
        child.assign("x", Value::Int(9), 1).unwrap();
        assert!(matches!(root.lookup("x"), Some(Value::Int(9))));
        assert!(child.bindings.borrow().get("x").is_none());
    }

    #[test]
    fn assign_to_unbound_name_errors() {
        let root = Scope::root();
        let err = root.assign("missing", Value::Int(1), 3).unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn popping_a_scope_releases_its_bindings() {
        let root = Scope::root();
        {
            let child = Scope::child(&root);
            child.define("temp", Value::Int(1));
            assert!(child.lookup("temp").is_some());
        }
        assert!(root.lookup("temp").is_none());
    }
}
