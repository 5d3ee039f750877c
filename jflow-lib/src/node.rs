use core::hash::{Hash, Hasher};

use crate::tree::{ClassId, ExprId, FieldId, LocalId, MethodId, StmtId, TreeContext, TyId};

/// Handle into the node arena of a [`Cfg`](crate::cfg::Cfg). Like the tree
/// handles, node handles are indices so pushing more nodes never
/// invalidates them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// Handle into the synthetic temporary table of a CFG. Temporaries are
/// introduced during lowering when a sub-expression value has to merge
/// across control paths.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TempId(pub(crate) u32);

/// Something assignable that analyses can track: a variable declared in
/// the source, or a temporary synthesized by the CFG builder.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Variable {
    Local(LocalId),
    Temp(TempId),
}

/// Where a node came from. Diagnostics and annotations only; control flow
/// never depends on it.
#[derive(Clone, Copy, Debug)]
pub enum Origin {
    Expr(ExprId),
    Stmt(StmtId),
    Synthetic,
}

/// One dataflow node. Nodes are immutable once the builder created them;
/// they live in the CFG's arena and refer to their operands by [`NodeId`].
///
/// Equality and hashing are structural over the kind only: the kind tag,
/// the operand handles, and the constant payloads. The type and the origin
/// do not participate, so two occurrences of the same computation compare
/// equal regardless of where they appear.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub ty: TyId,
    pub origin: Origin,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

/// The closed vocabulary of dataflow nodes. Short-circuiting boolean
/// operators and the conditional expression have no node kind; the
/// builder lowers them to control flow and a synthesized temporary.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum NodeKind {
    IntegerLiteral(i32),
    LongLiteral(i64),
    BooleanLiteral(bool),
    CharacterLiteral(char),
    StringLiteral(String),
    NullLiteral,

    NumericalMinus { operand: NodeId },
    NumericalPlus { operand: NodeId },
    BitwiseComplement { operand: NodeId },
    ConditionalNot { operand: NodeId },

    NumericalAddition { lhs: NodeId, rhs: NodeId },
    NumericalSubtraction { lhs: NodeId, rhs: NodeId },
    NumericalMultiplication { lhs: NodeId, rhs: NodeId },
    /// May raise `ArithmeticException`.
    IntegerDivision { lhs: NodeId, rhs: NodeId },
    /// May raise `ArithmeticException`.
    IntegerRemainder { lhs: NodeId, rhs: NodeId },

    LeftShift { lhs: NodeId, rhs: NodeId },
    SignedRightShift { lhs: NodeId, rhs: NodeId },
    UnsignedRightShift { lhs: NodeId, rhs: NodeId },

    BitwiseAnd { lhs: NodeId, rhs: NodeId },
    BitwiseOr { lhs: NodeId, rhs: NodeId },
    BitwiseXor { lhs: NodeId, rhs: NodeId },

    EqualTo { lhs: NodeId, rhs: NodeId },
    NotEqual { lhs: NodeId, rhs: NodeId },
    LessThan { lhs: NodeId, rhs: NodeId },
    LessThanOrEqual { lhs: NodeId, rhs: NodeId },
    GreaterThan { lhs: NodeId, rhs: NodeId },
    GreaterThanOrEqual { lhs: NodeId, rhs: NodeId },

    StringConcatenate { lhs: NodeId, rhs: NodeId },
    StringConversion { operand: NodeId },

    WideningConversion { operand: NodeId },
    NarrowingConversion { operand: NodeId },
    Boxing { operand: NodeId },
    /// May raise `NullPointerException`.
    Unboxing { operand: NodeId },

    LocalVariable(Variable),
    ThisLiteral,
    /// May raise `NullPointerException`.
    FieldAccess { object: NodeId, field: FieldId },
    /// May raise `NullPointerException` or
    /// `ArrayIndexOutOfBoundsException`.
    ArrayAccess { array: NodeId, index: NodeId },

    /// `target` is an access node (local, field access, or array access).
    /// An assignment through a field or array access inherits the faults
    /// of the access.
    Assignment { target: NodeId, expression: NodeId },
    VariableDeclaration { variable: Variable },

    /// The method being looked up on a receiver, `None` for static calls.
    MethodAccess {
        receiver: Option<NodeId>,
        method: MethodId,
    },
    /// May raise the callee's declared throwables, `RuntimeException`,
    /// and `NullPointerException` through the receiver lookup.
    MethodInvocation { target: NodeId, arguments: Vec<NodeId> },
    /// May raise the constructor's declared throwables and
    /// `RuntimeException`.
    ObjectCreation {
        constructor: MethodId,
        arguments: Vec<NodeId>,
    },
    /// May raise `NegativeArraySizeException`.
    ArrayCreation { length: NodeId },

    /// A reference cast may raise `ClassCastException`; primitive casts
    /// never appear here, they lower to conversion nodes.
    TypeCast { operand: NodeId },
    InstanceOf { operand: NodeId, tested: ClassId },

    Return(Option<NodeId>),
    /// Raises the static type of its operand.
    Throw(NodeId),
    /// One comparison of a switch selector against one case label.
    Case { selector: NodeId, expression: NodeId },

    /// A synthetic point in the flow with no runtime effect, e.g. the
    /// rethrow at the end of an exceptional finally duplicate.
    Marker(String),
    /// The value an expression-bodied unit evaluates to.
    LambdaResultExpression { operand: NodeId },
}

impl NodeKind {
    /// The operands in evaluation order. Transfer functions that walk
    /// backwards through values rely on this order matching the order the
    /// operand nodes appear in the block.
    pub fn operands(&self) -> Vec<NodeId> {
        use NodeKind::*;
        match self {
            IntegerLiteral(_)
            | LongLiteral(_)
            | BooleanLiteral(_)
            | CharacterLiteral(_)
            | StringLiteral(_)
            | NullLiteral
            | LocalVariable(_)
            | ThisLiteral
            | VariableDeclaration { .. }
            | Marker(_) => Vec::new(),
            NumericalMinus { operand }
            | NumericalPlus { operand }
            | BitwiseComplement { operand }
            | ConditionalNot { operand }
            | StringConversion { operand }
            | WideningConversion { operand }
            | NarrowingConversion { operand }
            | Boxing { operand }
            | Unboxing { operand }
            | TypeCast { operand }
            | InstanceOf { operand, .. }
            | LambdaResultExpression { operand } => vec![*operand],
            NumericalAddition { lhs, rhs }
            | NumericalSubtraction { lhs, rhs }
            | NumericalMultiplication { lhs, rhs }
            | IntegerDivision { lhs, rhs }
            | IntegerRemainder { lhs, rhs }
            | LeftShift { lhs, rhs }
            | SignedRightShift { lhs, rhs }
            | UnsignedRightShift { lhs, rhs }
            | BitwiseAnd { lhs, rhs }
            | BitwiseOr { lhs, rhs }
            | BitwiseXor { lhs, rhs }
            | EqualTo { lhs, rhs }
            | NotEqual { lhs, rhs }
            | LessThan { lhs, rhs }
            | LessThanOrEqual { lhs, rhs }
            | GreaterThan { lhs, rhs }
            | GreaterThanOrEqual { lhs, rhs }
            | StringConcatenate { lhs, rhs } => vec![*lhs, *rhs],
            FieldAccess { object, .. } => vec![*object],
            ArrayAccess { array, index } => vec![*array, *index],
            Assignment { target, expression } => vec![*target, *expression],
            MethodAccess { receiver, .. } => receiver.iter().copied().collect(),
            MethodInvocation { target, arguments } => {
                let mut result = vec![*target];
                result.extend_from_slice(arguments);
                result
            }
            ObjectCreation { arguments, .. } => arguments.clone(),
            ArrayCreation { length } => vec![*length],
            Return(value) => value.iter().copied().collect(),
            Throw(value) => vec![*value],
            Case {
                selector,
                expression,
            } => vec![*selector, *expression],
        }
    }

    /// Checks the invariants between a kind and the type it was built
    /// with. Violations are programming errors in whoever constructs
    /// nodes, so this panics instead of reporting.
    pub(crate) fn check_type(&self, ty: TyId) {
        use NodeKind::*;
        match self {
            IntegerLiteral(_) => assert!(matches!(ty, TyId::Int)),
            LongLiteral(_) => assert!(matches!(ty, TyId::Long)),
            CharacterLiteral(_) => assert!(matches!(ty, TyId::Char)),
            NullLiteral => assert!(matches!(ty, TyId::Null)),
            StringLiteral(_) | StringConcatenate { .. } | StringConversion { .. } => {
                assert!(ty == TyId::Class(TreeContext::STRING));
            }
            BooleanLiteral(_)
            | ConditionalNot { .. }
            | EqualTo { .. }
            | NotEqual { .. }
            | LessThan { .. }
            | LessThanOrEqual { .. }
            | GreaterThan { .. }
            | GreaterThanOrEqual { .. }
            | InstanceOf { .. }
            | Case { .. } => assert!(matches!(ty, TyId::Boolean)),
            Boxing { .. } | ObjectCreation { .. } => assert!(matches!(ty, TyId::Class(_))),
            Unboxing { .. } => assert!(!ty.is_reference()),
            ArrayCreation { .. } => assert!(matches!(ty, TyId::Array(_))),
            ThisLiteral => assert!(matches!(ty, TyId::Class(_))),
            Return(_) | Throw(_) | VariableDeclaration { .. } | Marker(_) => {
                assert!(matches!(ty, TyId::Void));
            }
            _ => {}
        }
    }
}
