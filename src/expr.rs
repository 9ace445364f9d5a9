//! The deferred-expression sub-language evaluated against a [`Context`].

use std::rc::Rc;

use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::value::{Record, Value};

/// A binary operator usable inside an [`Expr`] tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    And,
    /// `||`
    Or,
}

/// A unary operator usable inside an [`Expr`] tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Arithmetic negation.
    Neg,
    /// Logical not.
    Not,
}

/// A deferred reference into a [`Context`], evaluated lazily at parse/build
/// time. Builds up the same way `this.width * this.height` would in the
/// source toolkit: attribute access and operators construct a tree instead
/// of evaluating eagerly.
#[derive(Clone)]
pub enum Expr {
    /// A literal value, evaluates to itself.
    Const(Value),
    /// The current context's own bindings, as a `Value::Record`.
    This,
    /// Navigate to the parent frame, then evaluate the inner expression
    /// there.
    Parent(Box<Expr>),
    /// Navigate to the root frame, then evaluate the inner expression there.
    Root(Box<Expr>),
    /// Navigate to the external params record, then evaluate the inner
    /// expression there.
    Params(Box<Expr>),
    /// The nearest enclosing `_index`.
    Index,
    /// Field access: evaluate `base`, then look up `name` in it (`base` must
    /// evaluate to a `Value::Record`).
    Attr(Box<Expr>, String),
    /// A binary operator over two sub-expressions.
    BinOp(Box<Expr>, BinOp, Box<Expr>),
    /// A unary operator over a sub-expression.
    UnOp(UnOp, Box<Expr>),
    /// An escape hatch: an arbitrary Rust closure, for anything the operator
    /// sub-language can't express directly.
    Func(Rc<dyn Fn(&Context) -> Result<Value>>),
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Const(v) => write!(f, "Const({v:?})"),
            Expr::This => write!(f, "This"),
            Expr::Parent(e) => write!(f, "Parent({e:?})"),
            Expr::Root(e) => write!(f, "Root({e:?})"),
            Expr::Params(e) => write!(f, "Params({e:?})"),
            Expr::Index => write!(f, "Index"),
            Expr::Attr(e, n) => write!(f, "Attr({e:?}, {n:?})"),
            Expr::BinOp(l, op, r) => write!(f, "BinOp({l:?}, {op:?}, {r:?})"),
            Expr::UnOp(op, e) => write!(f, "UnOp({op:?}, {e:?})"),
            Expr::Func(_) => write!(f, "Func(..)"),
        }
    }
}

impl Expr {
    /// `this.<name>` sugar.
    pub fn field(name: impl Into<String>) -> Expr {
        Expr::Attr(Box::new(Expr::This), name.into())
    }

    /// `this.<name>` continuing off of `self`.
    pub fn attr(self, name: impl Into<String>) -> Expr {
        Expr::Attr(Box::new(self), name.into())
    }

    /// Wrap a plain closure as an expression.
    pub fn func(f: impl Fn(&Context) -> Result<Value> + 'static) -> Expr {
        Expr::Func(Rc::new(f))
    }

    /// Evaluate this expression against `ctx`.
    pub fn evaluate(&self, ctx: &Context) -> Result<Value> {
        match self {
            Expr::Const(v) => Ok(v.clone()),
            Expr::This => Ok(Value::Record(ctx.bindings().clone())),
            Expr::Parent(inner) => {
                let parent = ctx.parent().ok_or_else(|| {
                    Error::new(ErrorKind::MissingContextKey("_".to_string()))
                })?;
                inner.evaluate(parent)
            }
            Expr::Root(inner) => inner.evaluate(ctx.root_frame()),
            Expr::Params(inner) => {
                // `_params` is modelled as a record-valued pseudo-frame: we
                // evaluate `inner` against a throwaway frame whose bindings
                // *are* the params, so `Attr` lookups work uniformly.
                let params_ctx = params_as_this(ctx.params());
                inner.evaluate(&params_ctx)
            }
            Expr::Index => ctx
                .index()
                .map(|i| Value::Int(i as i128))
                .ok_or_else(|| Error::new(ErrorKind::MissingContextKey("_index".to_string()))),
            Expr::Attr(base, name) => {
                let v = base.evaluate(ctx)?;
                match v {
                    Value::Record(r) => r
                        .get(name)
                        .cloned()
                        .ok_or_else(|| Error::new(ErrorKind::MissingContextKey(name.clone()))),
                    other => Err(Error::new(ErrorKind::Other(format!(
                        "cannot access field `{name}` on {other:?}"
                    )))),
                }
            }
            Expr::BinOp(l, op, r) => eval_binop(l.evaluate(ctx)?, *op, r.evaluate(ctx)?),
            Expr::UnOp(op, inner) => eval_unop(*op, inner.evaluate(ctx)?),
            Expr::Func(f) => f(ctx),
        }
    }
}

/// Build a standalone [`Context`]-shaped view over `params` so `Expr::Attr`
/// can look fields up in it the same way it does for `This`. Params live in
/// their own namespace, so this bypasses the ordinary reserved-key gate that
/// `Context::bind` enforces for user-declared fields.
fn params_as_this(params: &Record) -> Context {
    Context::root_with_bindings(params.clone())
}

fn eval_binop(l: Value, op: BinOp, r: Value) -> Result<Value> {
    use BinOp::*;
    match op {
        Add | Sub | Mul | Div | Rem => {
            if matches!(l, Value::Float(_)) || matches!(r, Value::Float(_)) {
                let (a, b) = (l.as_float()?, r.as_float()?);
                let v = match op {
                    Add => a + b,
                    Sub => a - b,
                    Mul => a * b,
                    Div => a / b,
                    Rem => a % b,
                    _ => unreachable!(),
                };
                Ok(Value::Float(v))
            } else {
                let (a, b) = (l.as_int()?, r.as_int()?);
                let v = match op {
                    Add => a.checked_add(b),
                    Sub => a.checked_sub(b),
                    Mul => a.checked_mul(b),
                    Div => {
                        if b == 0 {
                            None
                        } else {
                            a.checked_div(b)
                        }
                    }
                    Rem => {
                        if b == 0 {
                            None
                        } else {
                            a.checked_rem(b)
                        }
                    }
                    _ => unreachable!(),
                }
                .ok_or_else(|| Error::new(ErrorKind::IntegerOutOfRange))?;
                Ok(Value::Int(v))
            }
        }
        Eq => Ok(Value::Bool(l == r)),
        Ne => Ok(Value::Bool(l != r)),
        Lt | Le | Gt | Ge => {
            let (a, b) = (l.as_float()?, r.as_float()?);
            let v = match op {
                Lt => a < b,
                Le => a <= b,
                Gt => a > b,
                Ge => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Bool(v))
        }
        And => Ok(Value::Bool(l.as_bool()? && r.as_bool()?)),
        Or => Ok(Value::Bool(l.as_bool()? || r.as_bool()?)),
    }
}

fn eval_unop(op: UnOp, v: Value) -> Result<Value> {
    match op {
        UnOp::Neg => match v {
            Value::Int(i) => Ok(Value::Int(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(Error::new(ErrorKind::Other(format!(
                "cannot negate {other:?}"
            )))),
        },
        UnOp::Not => Ok(Value::Bool(!v.as_bool()?)),
    }
}

impl std::ops::Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::BinOp(Box::new(self), BinOp::Add, Box::new(rhs))
    }
}
impl std::ops::Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::BinOp(Box::new(self), BinOp::Sub, Box::new(rhs))
    }
}
impl std::ops::Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::BinOp(Box::new(self), BinOp::Mul, Box::new(rhs))
    }
}
