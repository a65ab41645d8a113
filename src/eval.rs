//! Tree-walking consumer of parsed functions.
//!
//! Registering a function establishes its signature (one `f64` per parameter) and resolves every
//! name in its body against the parameters and the functions registered before it. Calls then
//! evaluate the body directly.

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Expression, Function, Operator, Prototype, Visitor};

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum EvalError {
    #[error("unknown variable referenced {0}")]
    UnknownVariable(String),
    #[error("unknown function {0}")]
    UnknownFunction(String),
    #[error("invalid number of args in call {0} expected {1} found {2}")]
    InvalidCall(String, usize, usize),
    #[error("duplicate parameter {1} in function {0}")]
    DuplicateParameter(String, String),
    #[error("function {0} is already defined")]
    Redefinition(String),
    #[error("call depth exceeded {0}")]
    RecursionLimit(usize),
}

/// Checks a body before it is accepted; nothing is evaluated.
struct Resolver<'a> {
    functions: &'a HashMap<String, Rc<Function>>,
    prototype: &'a Prototype,
}

impl<'a> Resolver<'a> {
    fn arity(&self, callee: &str) -> Option<usize> {
        if callee == self.prototype.name {
            return Some(self.prototype.args.len());
        }
        self.functions
            .get(callee)
            .map(|function| function.prototype.args.len())
    }
}

impl<'a> Visitor for Resolver<'a> {
    type Output = Result<(), EvalError>;

    fn visit_literal(&mut self, _: f64) -> Self::Output {
        Ok(())
    }

    fn visit_variable(&mut self, name: &str) -> Self::Output {
        if self.prototype.args.iter().any(|arg| arg == name) {
            Ok(())
        } else {
            Err(EvalError::UnknownVariable(name.to_string()))
        }
    }

    fn visit_binary(&mut self, _: Operator, lhs: &Expression, rhs: &Expression) -> Self::Output {
        lhs.accept(self)?;
        rhs.accept(self)
    }

    fn visit_call(&mut self, callee: &str, args: &[Expression]) -> Self::Output {
        let expected = self
            .arity(callee)
            .ok_or_else(|| EvalError::UnknownFunction(callee.to_string()))?;
        if expected != args.len() {
            return Err(EvalError::InvalidCall(
                callee.to_string(),
                expected,
                args.len(),
            ));
        }
        args.iter().try_for_each(|arg| arg.accept(self))
    }
}

#[derive(Debug)]
pub struct Evaluator {
    functions: HashMap<String, Rc<Function>>,
    named_values: HashMap<String, f64>,
    depth: usize,
    max_depth: usize,
}

impl std::default::Default for Evaluator {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            functions: HashMap::new(),
            named_values: HashMap::new(),
            depth: 0,
            max_depth,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name).map(|function| function.as_ref())
    }

    /// Accept `function` once its signature and body resolve.
    pub fn register(&mut self, function: Function) -> Result<(), EvalError> {
        let proto = &function.prototype;
        if self.functions.contains_key(&proto.name) {
            return Err(EvalError::Redefinition(proto.name.clone()));
        }

        for (i, arg) in proto.args.iter().enumerate() {
            if proto.args[..i].contains(arg) {
                return Err(EvalError::DuplicateParameter(
                    proto.name.clone(),
                    arg.clone(),
                ));
            }
        }

        let mut resolver = Resolver {
            functions: &self.functions,
            prototype: proto,
        };
        function.body.accept(&mut resolver)?;

        log::debug!("registered {}", proto.name);
        self.functions.insert(proto.name.clone(), Rc::new(function));
        Ok(())
    }

    pub fn call(&mut self, name: &str, args: &[f64]) -> Result<f64, EvalError> {
        let function = match self.functions.get(name) {
            Some(function) => Rc::clone(function),
            None => return Err(EvalError::UnknownFunction(name.to_string())),
        };
        let proto = &function.prototype;

        if proto.args.len() != args.len() {
            return Err(EvalError::InvalidCall(
                name.to_string(),
                proto.args.len(),
                args.len(),
            ));
        }
        if self.depth >= self.max_depth {
            return Err(EvalError::RecursionLimit(self.max_depth));
        }

        let scope = proto
            .args
            .iter()
            .cloned()
            .zip(args.iter().copied())
            .collect();
        let outer = std::mem::replace(&mut self.named_values, scope);
        self.depth += 1;

        let result = function.body.accept(self);

        self.depth -= 1;
        self.named_values = outer;
        result
    }
}

impl Visitor for Evaluator {
    type Output = Result<f64, EvalError>;

    fn visit_literal(&mut self, value: f64) -> Self::Output {
        Ok(value)
    }

    fn visit_variable(&mut self, name: &str) -> Self::Output {
        match self.named_values.get(name) {
            Some(value) => Ok(*value),
            None => Err(EvalError::UnknownVariable(name.to_string())),
        }
    }

    fn visit_binary(&mut self, op: Operator, lhs: &Expression, rhs: &Expression) -> Self::Output {
        let lhs = lhs.accept(self)?;
        let rhs = rhs.accept(self)?;

        Ok(match op {
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Mul => lhs * rhs,
            Operator::Div => lhs / rhs,
        })
    }

    fn visit_call(&mut self, callee: &str, args: &[Expression]) -> Self::Output {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(arg.accept(self)?);
        }
        self.call(callee, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::parser::{parse_program_str, parse_str};
    use pretty_assertions::assert_eq;

    fn function(source: &str) -> Function {
        parse_str(source, &mut Vec::<Diagnostic>::new()).unwrap()
    }

    fn evaluator(source: &str) -> Evaluator {
        let mut evaluator = Evaluator::new();
        for function in parse_program_str(source, &mut Vec::<Diagnostic>::new()).unwrap() {
            evaluator.register(function).unwrap();
        }
        evaluator
    }

    #[test]
    fn evaluation_works() {
        let mut evaluator = evaluator("thing(x, y) x * (y - 1) / 2");
        assert_eq!(evaluator.call("thing", &[4.0, 3.0]), Ok(4.0));
    }

    #[test]
    fn precedence_and_associativity_hold() {
        let mut evaluator = evaluator("a() 1 + 2 * 3  b() 8 - 4 - 2  c() 16 / 4 / 2");
        assert_eq!(evaluator.call("a", &[]), Ok(7.0));
        assert_eq!(evaluator.call("b", &[]), Ok(2.0));
        assert_eq!(evaluator.call("c", &[]), Ok(2.0));
    }

    #[test]
    fn calls_previous_functions() {
        let mut evaluator = evaluator("sq(x) x * x  hyp(a, b) sq(a) + sq(b)");
        assert_eq!(evaluator.call("hyp", &[3.0, 4.0]), Ok(25.0));
        assert!(evaluator.get("sq").is_some());
    }

    #[test]
    fn division_follows_ieee() {
        let mut evaluator = evaluator("div(a, b) a / b");
        assert_eq!(evaluator.call("div", &[1.0, 0.0]), Ok(f64::INFINITY));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut evaluator = Evaluator::new();
        assert_eq!(
            evaluator.register(function("f(x) y")),
            Err(EvalError::UnknownVariable("y".to_string()))
        );
        assert_eq!(
            evaluator.register(function("f(x) g(x)")),
            Err(EvalError::UnknownFunction("g".to_string()))
        );
        assert_eq!(
            evaluator.call("f", &[]),
            Err(EvalError::UnknownFunction("f".to_string()))
        );
    }

    #[test]
    fn arity_is_checked() {
        let mut evaluator = evaluator("add(a, b) a + b");
        assert_eq!(
            evaluator.register(function("three() add(1, 2, 3)")),
            Err(EvalError::InvalidCall("add".to_string(), 2, 3))
        );
        assert_eq!(
            evaluator.call("add", &[1.0]),
            Err(EvalError::InvalidCall("add".to_string(), 2, 1))
        );
    }

    #[test]
    fn duplicate_parameters_and_redefinitions() {
        let mut evaluator = evaluator("one() 1");
        assert_eq!(
            evaluator.register(function("dup(a, b, a) a")),
            Err(EvalError::DuplicateParameter("dup".to_string(), "a".to_string()))
        );
        assert_eq!(
            evaluator.register(function("one() 2")),
            Err(EvalError::Redefinition("one".to_string()))
        );
        assert_eq!(evaluator.call("one", &[]), Ok(1.0));
    }

    #[test]
    fn recursion_is_bounded() {
        let mut evaluator = Evaluator::with_max_depth(16);
        evaluator.register(function("forever(x) forever(x + 1)")).unwrap();
        assert_eq!(
            evaluator.call("forever", &[0.0]),
            Err(EvalError::RecursionLimit(16))
        );
        // state is restored after the failure
        evaluator.register(function("id(x) x")).unwrap();
        assert_eq!(evaluator.call("id", &[5.0]), Ok(5.0));
    }
}
