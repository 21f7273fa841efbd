use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use crate::compiler::ast::FunctionLiteral;
use crate::compiler::object::{Function, Object};


/// A lexical scope: local bindings plus the scope it is nested in.
///
/// The outer link is a strong [`Rc`]. A closure returned from a call must keep the call's
/// scope alive after the frame is gone, so a [`Weak`] parent pointer is not enough here.
///
/// A function bound in the very scope it captured would keep that scope alive forever, so such a
/// binding only remembers the scope weakly and the function is rebuilt on lookup.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Binding>,
    outer: Option<Rc<RefCell<Environment>>>,
}

#[derive(Debug)]
enum Binding {
    Value(Object),
    SelfCapturing {
        literal: Rc<FunctionLiteral>,
        env: Weak<RefCell<Environment>>,
    },
}

impl Binding {
    fn get(&self) -> Option<Object> {
        match self {
            Binding::Value(value) => Some(value.clone()),
            // The scope holding this binding is the one it points to, so it is alive while read
            Binding::SelfCapturing { literal, env } => env.upgrade()
                .map(|env| Object::Function(Rc::new(Function { literal: Rc::clone(literal), env }))),
        }
    }
}

impl Environment {
    pub fn new_global() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }))
    }

    /// Looks `name` up in this scope, then in every enclosing scope.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(binding) => binding.get(),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds `name` in this scope only, shadowing any outer binding. Returns the stored value.
    pub fn set(&mut self, name: String, value: Object) -> Object {
        let binding = match &value {
            Object::Function(function) if std::ptr::eq::<Environment>(function.env.as_ptr(), self) => Binding::SelfCapturing {
                literal: Rc::clone(&function.literal),
                env: Rc::downgrade(&function.env),
            },
            value => Binding::Value(value.clone()),
        };

        self.store.insert(name, binding);
        value
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }

    pub fn outer(&self) -> Option<&Rc<RefCell<Environment>>> {
        self.outer.as_ref()
    }
}
