use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Prototype {
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(f64),
    Variable(String),
    Binary(Operator, Box<Expression>, Box<Expression>),
    Call(String, Vec<Expression>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Expression,
}

impl Expression {
    pub fn binary(op: Operator, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn variable(name: &str) -> Self {
        Expression::Variable(name.to_string())
    }

    pub fn call(callee: &str, args: Vec<Expression>) -> Self {
        Expression::Call(callee.to_string(), args)
    }

    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expression::Literal(value) => visitor.visit_literal(*value),
            Expression::Variable(name) => visitor.visit_variable(name),
            Expression::Binary(op, lhs, rhs) => visitor.visit_binary(*op, lhs, rhs),
            Expression::Call(callee, args) => visitor.visit_call(callee, args),
        }
    }
}

/// One method per expression variant, dispatched by [`Expression::accept`].
pub trait Visitor {
    type Output;

    fn visit_literal(&mut self, value: f64) -> Self::Output;
    fn visit_variable(&mut self, name: &str) -> Self::Output;
    fn visit_binary(&mut self, op: Operator, lhs: &Expression, rhs: &Expression) -> Self::Output;
    fn visit_call(&mut self, callee: &str, args: &[Expression]) -> Self::Output;
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Binary(op, lhs, rhs) => write!(f, "({} {} {})", op, lhs, rhs),
            Expression::Call(callee, args) => {
                write!(f, "(call {}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.args.join(" "))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(def {} {})", self.prototype, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Depth;

    impl Visitor for Depth {
        type Output = usize;

        fn visit_literal(&mut self, _: f64) -> usize {
            1
        }

        fn visit_variable(&mut self, _: &str) -> usize {
            1
        }

        fn visit_binary(&mut self, _: Operator, lhs: &Expression, rhs: &Expression) -> usize {
            1 + lhs.accept(self).max(rhs.accept(self))
        }

        fn visit_call(&mut self, _: &str, args: &[Expression]) -> usize {
            1 + args.iter().map(|arg| arg.accept(self)).max().unwrap_or(0)
        }
    }

    #[test]
    fn operator_symbols() {
        let ops = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];
        let symbols: String = ops.iter().map(|op| op.symbol()).collect();
        assert_eq!(symbols, "+-*/");
        assert_eq!(Operator::Div.to_string(), "/");
    }

    #[test]
    fn display_works() {
        let function = Function {
            prototype: Prototype {
                name: "foo".to_string(),
                args: vec!["x".to_string(), "y".to_string()],
            },
            body: Expression::binary(
                Operator::Add,
                Expression::Literal(1.5),
                Expression::call(
                    "bar",
                    vec![Expression::variable("x"), Expression::Literal(2.0)],
                ),
            ),
        };
        assert_eq!(function.to_string(), "(def foo (x y) (+ 1.5 (call bar x 2)))");
        assert_eq!(Expression::call("nop", vec![]).to_string(), "(call nop)");
    }

    #[test]
    fn visitor_reaches_every_node() {
        let expr = Expression::binary(
            Operator::Mul,
            Expression::variable("a"),
            Expression::call(
                "f",
                vec![Expression::binary(
                    Operator::Sub,
                    Expression::Literal(1.0),
                    Expression::Literal(2.0),
                )],
            ),
        );
        assert_eq!(expr.accept(&mut Depth), 4);
    }
}
