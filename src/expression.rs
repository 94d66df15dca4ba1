//! Symbolic expressions and exact-solution inputs.
//!
//! An exact solution is supplied in one of two explicit forms, see [`ExactSolution`]:
//!
//! - a symbolic [`Expr`] (one per component), evaluated cell by cell at the reference
//!   interpolation points of the target space mapped through the cell geometry, or
//! - a raw callable, evaluated once on the batch of physical DOF coordinates of the target space.
use nalgebra::{DMatrix, Point};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A closed-form scalar expression in the spatial coordinates.
///
/// Expressions are built with ordinary arithmetic operators:
///
/// ```
/// use fenorm::expression::Expr;
/// use std::f64::consts::PI;
///
/// let u = (PI * Expr::x()).sin() * (PI * Expr::y()).sin() + 1.0;
/// assert!((u.evaluate(&[0.5, 0.5]) - 2.0).abs() < 1e-14);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    /// The spatial coordinate with the given index (`x = 0`, `y = 1`, ...).
    Coordinate(usize),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Powi(Box<Expr>, i32),
    Sqrt(Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Exp(Box<Expr>),
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    pub fn coordinate(index: usize) -> Self {
        Self::Coordinate(index)
    }

    pub fn x() -> Self {
        Self::Coordinate(0)
    }

    pub fn y() -> Self {
        Self::Coordinate(1)
    }

    pub fn powi(self, n: i32) -> Self {
        Self::Powi(Box::new(self), n)
    }

    pub fn sqrt(self) -> Self {
        Self::Sqrt(Box::new(self))
    }

    pub fn sin(self) -> Self {
        Self::Sin(Box::new(self))
    }

    pub fn cos(self) -> Self {
        Self::Cos(Box::new(self))
    }

    pub fn exp(self) -> Self {
        Self::Exp(Box::new(self))
    }

    /// Evaluates the expression at the point with coordinates `x`.
    ///
    /// # Panics
    ///
    /// Panics if the expression references a coordinate index beyond `x.len()`. Use
    /// [`Expr::max_coordinate_index`] to validate expressions up front.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Coordinate(index) => x[*index],
            Self::Neg(a) => -a.evaluate(x),
            Self::Add(a, b) => a.evaluate(x) + b.evaluate(x),
            Self::Sub(a, b) => a.evaluate(x) - b.evaluate(x),
            Self::Mul(a, b) => a.evaluate(x) * b.evaluate(x),
            Self::Div(a, b) => a.evaluate(x) / b.evaluate(x),
            Self::Powi(a, n) => a.evaluate(x).powi(*n),
            Self::Sqrt(a) => a.evaluate(x).sqrt(),
            Self::Sin(a) => a.evaluate(x).sin(),
            Self::Cos(a) => a.evaluate(x).cos(),
            Self::Exp(a) => a.evaluate(x).exp(),
        }
    }

    /// The largest coordinate index referenced by the expression, if any.
    pub fn max_coordinate_index(&self) -> Option<usize> {
        match self {
            Self::Constant(_) => None,
            Self::Coordinate(index) => Some(*index),
            Self::Neg(a) | Self::Powi(a, _) | Self::Sqrt(a) | Self::Sin(a) | Self::Cos(a) | Self::Exp(a) => {
                a.max_coordinate_index()
            }
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b) => {
                a.max_coordinate_index().max(b.max_coordinate_index())
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

macro_rules! impl_binary_op_for_expr {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl<Rhs: Into<Expr>> $trait<Rhs> for Expr {
            type Output = Expr;

            fn $method(self, rhs: Rhs) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs.into()))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(Expr::Constant(self)), Box::new(rhs))
            }
        }
    };
}

impl_binary_op_for_expr!(Add, add, Add);
impl_binary_op_for_expr!(Sub, sub, Sub);
impl_binary_op_for_expr!(Mul, mul, Mul);
impl_binary_op_for_expr!(Div, div, Div);

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 3] = ["x", "y", "z"];
        match self {
            Self::Constant(value) => write!(f, "{}", value),
            Self::Coordinate(index) => match NAMES.get(*index) {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "x[{}]", index),
            },
            Self::Neg(a) => write!(f, "-({})", a),
            Self::Add(a, b) => write!(f, "({} + {})", a, b),
            Self::Sub(a, b) => write!(f, "({} - {})", a, b),
            Self::Mul(a, b) => write!(f, "{} * {}", a, b),
            Self::Div(a, b) => write!(f, "{} / ({})", a, b),
            Self::Powi(a, n) => write!(f, "({})^{}", a, n),
            Self::Sqrt(a) => write!(f, "sqrt({})", a),
            Self::Sin(a) => write!(f, "sin({})", a),
            Self::Cos(a) => write!(f, "cos({})", a),
            Self::Exp(a) => write!(f, "exp({})", a),
        }
    }
}

/// A function evaluated on a batch of physical points.
///
/// Given `n` points, the function must return a matrix with `value_size` rows and `n` columns,
/// where column `i` holds the value at point `i`.
pub type PointFunction<const D: usize> = Box<dyn Fn(&[Point<f64, D>]) -> DMatrix<f64> + Send + Sync>;

/// The exact solution a numerical field is compared against.
///
/// The two forms are evaluated differently (see the module documentation), so the caller
/// states explicitly which one is supplied.
pub enum ExactSolution<const D: usize> {
    /// A closed-form expression, one entry per solution component.
    Expression(Vec<Expr>),
    /// A raw callable evaluated on coordinate arrays.
    Callable(PointFunction<D>),
}

impl<const D: usize> ExactSolution<D> {
    pub fn scalar_expression(expr: Expr) -> Self {
        Self::Expression(vec![expr])
    }

    pub fn vector_expression(components: Vec<Expr>) -> Self {
        Self::Expression(components)
    }

    pub fn callable<F>(function: F) -> Self
    where
        F: Fn(&[Point<f64, D>]) -> DMatrix<f64> + Send + Sync + 'static,
    {
        Self::Callable(Box::new(function))
    }

    /// Convenience constructor for a scalar callable evaluated point by point.
    pub fn scalar_fn<F>(function: F) -> Self
    where
        F: Fn(&Point<f64, D>) -> f64 + Send + Sync + 'static,
    {
        Self::callable(move |points: &[Point<f64, D>]| {
            DMatrix::from_iterator(1, points.len(), points.iter().map(&function))
        })
    }

    /// The number of components, if known without evaluating the solution.
    pub fn value_size(&self) -> Option<usize> {
        match self {
            Self::Expression(components) => Some(components.len()),
            Self::Callable(_) => None,
        }
    }
}

impl<const D: usize> Debug for ExactSolution<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression(components) => f.debug_tuple("Expression").field(components).finish(),
            Self::Callable(_) => f.debug_tuple("Callable").field(&"<function>").finish(),
        }
    }
}
