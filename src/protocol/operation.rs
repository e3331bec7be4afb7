//! Known worker operations and their deadline classes.
//!
//! The worker program dispatches on the `operation` string of each request.
//! This catalogue names the operations it implements and groups them by how
//! long they are allowed to run.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default deadline for algebra, calculus, solver and display operations.
pub const STANDARD_DEADLINE: Duration = Duration::from_millis(1200);

/// Default deadline for 2D graph operations.
pub const GRAPH_DEADLINE: Duration = Duration::from_millis(2000);

/// Default deadline for 3D graph operations.
pub const GRAPH_3D_DEADLINE: Duration = Duration::from_millis(2500);

// ============================================================================
// OperationClass
// ============================================================================

/// Deadline class of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// Symbolic computation returning text.
    Standard,
    /// 2D plot rendering.
    Graph,
    /// 3D surface rendering.
    Graph3d,
}

// ============================================================================
// Deadlines
// ============================================================================

/// Per-class dispatch deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Deadline for [`OperationClass::Standard`].
    pub standard: Duration,
    /// Deadline for [`OperationClass::Graph`].
    pub graph: Duration,
    /// Deadline for [`OperationClass::Graph3d`].
    pub graph_3d: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            standard: STANDARD_DEADLINE,
            graph: GRAPH_DEADLINE,
            graph_3d: GRAPH_3D_DEADLINE,
        }
    }
}

impl Deadlines {
    /// Returns the deadline for a class.
    #[inline]
    #[must_use]
    pub fn for_class(&self, class: OperationClass) -> Duration {
        match class {
            OperationClass::Standard => self.standard,
            OperationClass::Graph => self.graph,
            OperationClass::Graph3d => self.graph_3d,
        }
    }

    /// Returns the deadline for an operation name.
    ///
    /// Unknown operations get the standard deadline; the worker answers
    /// them with an error line almost immediately.
    #[must_use]
    pub fn for_operation(&self, name: &str) -> Duration {
        let class = name
            .parse::<Operation>()
            .map_or(OperationClass::Standard, Operation::class);
        self.for_class(class)
    }
}

// ============================================================================
// Operation
// ============================================================================

/// An operation implemented by the worker program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Algebra
    EvaluateExpression,
    ExpandExpression,
    FactorExpression,
    SimplifyExpression,

    // Calculus
    DeriveExpression,
    IntegrateDefiniteExpression,
    IntegrateIndefiniteExpression,
    LimitExpression,

    // Solvers
    SolveEquation,
    SolveLinearSystem,

    // Graphs
    GraphFuncSingle,
    GraphFuncMultiple,
    GraphRelSingle,
    GraphRelMultiple,
    GraphParametric,
    GraphExprSingle,
    GraphExprMultiple,

    // Misc
    DisplayText,
}

impl Operation {
    /// All operations, in catalogue order.
    pub const ALL: [Operation; 18] = [
        Self::EvaluateExpression,
        Self::ExpandExpression,
        Self::FactorExpression,
        Self::SimplifyExpression,
        Self::DeriveExpression,
        Self::IntegrateDefiniteExpression,
        Self::IntegrateIndefiniteExpression,
        Self::LimitExpression,
        Self::SolveEquation,
        Self::SolveLinearSystem,
        Self::GraphFuncSingle,
        Self::GraphFuncMultiple,
        Self::GraphRelSingle,
        Self::GraphRelMultiple,
        Self::GraphParametric,
        Self::GraphExprSingle,
        Self::GraphExprMultiple,
        Self::DisplayText,
    ];

    /// Returns the wire name sent in the `operation` field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EvaluateExpression => "evaluate_expression",
            Self::ExpandExpression => "expand_expression",
            Self::FactorExpression => "factor_expression",
            Self::SimplifyExpression => "simplify_expression",
            Self::DeriveExpression => "derive_expression",
            Self::IntegrateDefiniteExpression => "integrate_definite_expression",
            Self::IntegrateIndefiniteExpression => "integrate_indefinite_expression",
            Self::LimitExpression => "limit_expression",
            Self::SolveEquation => "solve_equation",
            Self::SolveLinearSystem => "solve_linear_system",
            Self::GraphFuncSingle => "graph_func_single",
            Self::GraphFuncMultiple => "graph_func_multiple",
            Self::GraphRelSingle => "graph_rel_single",
            Self::GraphRelMultiple => "graph_rel_multiple",
            Self::GraphParametric => "graph_parametric",
            Self::GraphExprSingle => "graph_expr_single",
            Self::GraphExprMultiple => "graph_expr_multiple",
            Self::DisplayText => "display_text",
        }
    }

    /// Returns the deadline class.
    #[must_use]
    pub const fn class(self) -> OperationClass {
        match self {
            Self::GraphFuncSingle
            | Self::GraphFuncMultiple
            | Self::GraphRelSingle
            | Self::GraphRelMultiple
            | Self::GraphParametric => OperationClass::Graph,
            Self::GraphExprSingle | Self::GraphExprMultiple => OperationClass::Graph3d,
            _ => OperationClass::Standard,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| Error::config(format!("Unknown operation: {s}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trips_through_from_str() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_operation() {
        let err = "frobnicate".parse::<Operation>().unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_classes() {
        assert_eq!(Operation::SolveEquation.class(), OperationClass::Standard);
        assert_eq!(Operation::GraphParametric.class(), OperationClass::Graph);
        assert_eq!(Operation::GraphExprMultiple.class(), OperationClass::Graph3d);
    }

    #[test]
    fn test_default_deadlines() {
        let deadlines = Deadlines::default();
        assert_eq!(
            deadlines.for_operation("evaluate_expression"),
            Duration::from_millis(1200)
        );
        assert_eq!(
            deadlines.for_operation("graph_func_single"),
            Duration::from_millis(2000)
        );
        assert_eq!(
            deadlines.for_operation("graph_expr_single"),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_unknown_operation_gets_standard_deadline() {
        let deadlines = Deadlines {
            standard: Duration::from_millis(10),
            ..Deadlines::default()
        };
        assert_eq!(deadlines.for_operation("nope"), Duration::from_millis(10));
    }
}
