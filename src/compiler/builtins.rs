use std::rc::Rc;
use crate::compiler::object::{Object, RuntimeError, NULL};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
    Print,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        Some(match name {
            "len" => Builtin::Len,
            "first" => Builtin::First,
            "last" => Builtin::Last,
            "rest" => Builtin::Rest,
            "push" => Builtin::Push,
            "print" => Builtin::Print,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
            Builtin::Print => "print",
        }
    }

    pub fn call(self, args: Vec<Object>) -> Result<Object, RuntimeError> {
        match self {
            Builtin::Len => match self.single(&args)? {
                Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
                Object::String(value) => Ok(Object::Integer(value.chars().count() as i64)),
                other => Err(self.unsupported(other)),
            },
            Builtin::First => {
                let elements = self.array(self.single(&args)?)?;
                Ok(elements.first().cloned().unwrap_or(NULL))
            },
            Builtin::Last => {
                let elements = self.array(self.single(&args)?)?;
                Ok(elements.last().cloned().unwrap_or(NULL))
            },
            Builtin::Rest => {
                let elements = self.array(self.single(&args)?)?;

                Ok(match elements.split_first() {
                    Some((_, rest)) => Object::Array(Rc::new(rest.to_vec())),
                    None => NULL,
                })
            },
            Builtin::Push => {
                self.expect_args(&args, 2)?;

                let mut elements = self.array(&args[0])?.to_vec();
                elements.push(args[1].clone());
                Ok(Object::Array(Rc::new(elements)))
            },
            Builtin::Print => {
                println!("{}", args.iter().map(Object::to_string).collect::<Vec<String>>().join(" "));
                Ok(NULL)
            },
        }
    }

    fn expect_args(self, args: &[Object], expected: usize) -> Result<(), RuntimeError> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(RuntimeError::ArityMismatch { expected, got: args.len() })
        }
    }

    fn single(self, args: &[Object]) -> Result<&Object, RuntimeError> {
        self.expect_args(args, 1)?;
        Ok(&args[0])
    }

    fn array(self, arg: &Object) -> Result<&[Object], RuntimeError> {
        match arg {
            Object::Array(elements) => Ok(elements),
            other => Err(self.unsupported(other)),
        }
    }

    fn unsupported(self, arg: &Object) -> RuntimeError {
        RuntimeError::BuiltinArgument { builtin: self.name(), got: arg.type_name() }
    }
}
