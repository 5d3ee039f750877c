use core::fmt::Write;

/// Handle into the class table of a [`TreeContext`].
///
/// Tree nodes are represented as indices into some storage in
/// `TreeContext`. The reason they are not references is that references
/// would be invalidated after we pushed some more nodes into the
/// `TreeContext`. Use the accessors like [`TreeContext::expr`] to get the
/// data back. The context cannot be mutated while any of the returned
/// references are live.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ClassId(u32);

/// Handle into the local variable table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LocalId(u32);

/// Handle into the field table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FieldId(u32);

/// Handle into the method table. Constructors are methods returning
/// their class.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MethodId(u32);

/// Handle into the expression arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ExprId(u32);

/// Handle into the statement arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StmtId(u32);

/// Handle into the array element type table, see [`TyId::Array`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ArrayId(u32);

/// A resolved static type. Array types are interned in the context so the
/// handle stays `Copy`; [`TreeContext::element_type`] recovers the element
/// type. There is no floating point.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TyId {
    Int,
    Long,
    Boolean,
    Char,
    Void,
    /// The type of the `null` literal, a subtype of every reference type.
    Null,
    Class(ClassId),
    Array(ArrayId),
}

impl TyId {
    pub fn is_reference(&self) -> bool {
        matches!(self, TyId::Class(_) | TyId::Array(_) | TyId::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TyId::Int | TyId::Long | TyId::Char)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Short-circuiting; lowered to control flow, never to a value node.
    And,
    /// Short-circuiting; lowered to control flow, never to a value node.
    Or,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum IncDecOp {
    Inc,
    Dec,
}

/// An expression record. Every expression carries its resolved static
/// type; producing those is the front end's job, the CFG builder only
/// reads them.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TyId,
    pub line: u32,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    IntLit(i32),
    LongLit(i64),
    BoolLit(bool),
    CharLit(char),
    StringLit(String),
    NullLit,
    Local(LocalId),
    This,
    Field { object: ExprId, field: FieldId },
    Index { array: ExprId, index: ExprId },
    /// `receiver` is `None` for static calls.
    Call {
        receiver: Option<ExprId>,
        method: MethodId,
        args: Vec<ExprId>,
    },
    New { ctor: MethodId, args: Vec<ExprId> },
    NewArray { length: ExprId },
    Unary { op: UnOp, operand: ExprId },
    Binary { op: BinOp, lhs: ExprId, rhs: ExprId },
    /// `op` is the operator of a compound assignment like `+=`.
    Assign {
        target: ExprId,
        op: Option<BinOp>,
        value: ExprId,
    },
    IncDec {
        op: IncDecOp,
        prefix: bool,
        target: ExprId,
    },
    Ternary {
        cond: ExprId,
        then: ExprId,
        els: ExprId,
    },
    /// The target type of the cast is the type of the expression itself.
    Cast { operand: ExprId },
    InstanceOf { operand: ExprId, tested: ClassId },
}

/// A statement record.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Expr(ExprId),
    VarDecl { local: LocalId, init: Option<ExprId> },
    If {
        cond: ExprId,
        then: StmtId,
        els: Option<StmtId>,
    },
    While { cond: ExprId, body: StmtId },
    DoWhile { body: StmtId, cond: ExprId },
    For {
        init: Vec<StmtId>,
        cond: Option<ExprId>,
        update: Vec<ExprId>,
        body: StmtId,
    },
    Switch {
        selector: ExprId,
        cases: Vec<SwitchCase>,
    },
    Try {
        body: StmtId,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
    },
    Throw(ExprId),
    Return(Option<ExprId>),
    Break,
    Continue,
    Block(Vec<StmtId>),
    Empty,
}

/// One labeled section of a `switch`. A `None` label is the `default`
/// section. Bodies fall through to the next section in source order.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub label: Option<ExprId>,
    pub body: Vec<StmtId>,
}

#[derive(Clone, Debug)]
pub struct CatchClause {
    pub exception: ClassId,
    pub binding: LocalId,
    pub body: StmtId,
}

/// What the CFG builder lowers: a method body, or the single expression of
/// an expression-bodied lambda or a field initializer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Unit {
    Method(StmtId),
    Expression(ExprId),
}

#[derive(Clone, Debug)]
struct ClassInfo {
    name: String,
    superclass: Option<ClassId>,
}

#[derive(Clone, Debug)]
struct LocalInfo {
    name: String,
    ty: TyId,
}

#[derive(Clone, Debug)]
struct FieldInfo {
    name: String,
    ty: TyId,
}

#[derive(Clone, Debug)]
struct MethodInfo {
    name: String,
    params: Vec<TyId>,
    ret: TyId,
    throws: Vec<ClassId>,
}

/// Arena for a resolved, statically typed syntax tree, along with the
/// class hierarchy and the symbol tables the tree refers to. The context
/// starts out seeded with the core classes ([`TreeContext::OBJECT`],
/// the boxed primitives, the throwable hierarchy) so user code only adds
/// its own.
#[derive(Clone, Debug)]
pub struct TreeContext {
    classes: Vec<ClassInfo>,
    locals: Vec<LocalInfo>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    arrays: Vec<TyId>,
}

impl TreeContext {
    pub const OBJECT: ClassId = ClassId(0);
    pub const STRING: ClassId = ClassId(1);
    pub const INTEGER: ClassId = ClassId(2);
    pub const LONG: ClassId = ClassId(3);
    pub const BOOLEAN: ClassId = ClassId(4);
    pub const CHARACTER: ClassId = ClassId(5);
    pub const THROWABLE: ClassId = ClassId(6);
    pub const ERROR: ClassId = ClassId(7);
    pub const EXCEPTION: ClassId = ClassId(8);
    pub const RUNTIME_EXCEPTION: ClassId = ClassId(9);
    pub const NULL_POINTER_EXCEPTION: ClassId = ClassId(10);
    pub const ARITHMETIC_EXCEPTION: ClassId = ClassId(11);
    pub const INDEX_OUT_OF_BOUNDS_EXCEPTION: ClassId = ClassId(12);
    pub const CLASS_CAST_EXCEPTION: ClassId = ClassId(13);
    pub const NEGATIVE_ARRAY_SIZE_EXCEPTION: ClassId = ClassId(14);

    pub fn new() -> Self {
        let mut ctx = Self {
            classes: Vec::new(),
            locals: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            exprs: Vec::new(),
            stmts: Vec::new(),
            arrays: Vec::new(),
        };
        let seeded = [
            ("Object", None),
            ("String", Some(Self::OBJECT)),
            ("Integer", Some(Self::OBJECT)),
            ("Long", Some(Self::OBJECT)),
            ("Boolean", Some(Self::OBJECT)),
            ("Character", Some(Self::OBJECT)),
            ("Throwable", Some(Self::OBJECT)),
            ("Error", Some(Self::THROWABLE)),
            ("Exception", Some(Self::THROWABLE)),
            ("RuntimeException", Some(Self::EXCEPTION)),
            ("NullPointerException", Some(Self::RUNTIME_EXCEPTION)),
            ("ArithmeticException", Some(Self::RUNTIME_EXCEPTION)),
            (
                "ArrayIndexOutOfBoundsException",
                Some(Self::RUNTIME_EXCEPTION),
            ),
            ("ClassCastException", Some(Self::RUNTIME_EXCEPTION)),
            ("NegativeArraySizeException", Some(Self::RUNTIME_EXCEPTION)),
        ];
        for (name, superclass) in seeded {
            ctx.make_class(name, superclass);
        }
        ctx
    }

    pub fn make_class(&mut self, name: &str, superclass: Option<ClassId>) -> ClassId {
        self.classes.push(ClassInfo {
            name: name.to_owned(),
            superclass,
        });
        ClassId((self.classes.len() - 1) as u32)
    }

    pub fn make_local(&mut self, name: &str, ty: TyId) -> LocalId {
        assert!(!matches!(ty, TyId::Void));
        self.locals.push(LocalInfo {
            name: name.to_owned(),
            ty,
        });
        LocalId((self.locals.len() - 1) as u32)
    }

    pub fn make_field(&mut self, name: &str, ty: TyId) -> FieldId {
        assert!(!matches!(ty, TyId::Void));
        self.fields.push(FieldInfo {
            name: name.to_owned(),
            ty,
        });
        FieldId((self.fields.len() - 1) as u32)
    }

    pub fn make_method(
        &mut self,
        name: &str,
        params: Vec<TyId>,
        ret: TyId,
        throws: Vec<ClassId>,
    ) -> MethodId {
        self.methods.push(MethodInfo {
            name: name.to_owned(),
            params,
            ret,
            throws,
        });
        MethodId((self.methods.len() - 1) as u32)
    }

    /// Interned array type with the given element type, so that two
    /// mentions of `int[]` compare equal.
    pub fn make_array_type(&mut self, element: TyId) -> TyId {
        assert!(!matches!(element, TyId::Void | TyId::Null));
        if let Some(idx) = self.arrays.iter().position(|e| *e == element) {
            return TyId::Array(ArrayId(idx as u32));
        }
        self.arrays.push(element);
        TyId::Array(ArrayId((self.arrays.len() - 1) as u32))
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0 as usize]
    }

    pub fn type_of(&self, id: ExprId) -> TyId {
        self.expr(id).ty
    }

    pub fn element_type(&self, ty: TyId) -> TyId {
        let TyId::Array(id) = ty
        else {
            panic!("Not an array type.");
        };
        self.arrays[id.0 as usize]
    }

    pub fn class_name(&self, id: ClassId) -> &str {
        &self.classes[id.0 as usize].name
    }

    pub fn superclass(&self, id: ClassId) -> Option<ClassId> {
        self.classes[id.0 as usize].superclass
    }

    /// Reflexive, transitive subtyping along the superclass links.
    pub fn is_subtype(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut current = Some(sub);
        while let Some(c) = current {
            if c == sup {
                return true;
            }
            current = self.superclass(c);
        }
        false
    }

    pub fn local_name(&self, id: LocalId) -> &str {
        &self.locals[id.0 as usize].name
    }

    pub fn local_type(&self, id: LocalId) -> TyId {
        self.locals[id.0 as usize].ty
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        &self.fields[id.0 as usize].name
    }

    pub fn field_type(&self, id: FieldId) -> TyId {
        self.fields[id.0 as usize].ty
    }

    pub fn method_name(&self, id: MethodId) -> &str {
        &self.methods[id.0 as usize].name
    }

    pub fn method_params(&self, id: MethodId) -> &[TyId] {
        &self.methods[id.0 as usize].params
    }

    pub fn method_return(&self, id: MethodId) -> TyId {
        self.methods[id.0 as usize].ret
    }

    pub fn method_throws(&self, id: MethodId) -> &[ClassId] {
        &self.methods[id.0 as usize].throws
    }

    /// The wrapper class of a primitive type, e.g. `Integer` for `int`.
    pub fn boxed_class(&self, ty: TyId) -> Option<ClassId> {
        match ty {
            TyId::Int => Some(Self::INTEGER),
            TyId::Long => Some(Self::LONG),
            TyId::Boolean => Some(Self::BOOLEAN),
            TyId::Char => Some(Self::CHARACTER),
            _ => None,
        }
    }

    /// The primitive type a wrapper class unboxes to, if any.
    pub fn unboxed_type(&self, class: ClassId) -> Option<TyId> {
        match class {
            Self::INTEGER => Some(TyId::Int),
            Self::LONG => Some(TyId::Long),
            Self::BOOLEAN => Some(TyId::Boolean),
            Self::CHARACTER => Some(TyId::Char),
            _ => None,
        }
    }

    pub fn type_name(&self, ty: TyId) -> String {
        match ty {
            TyId::Int => "int".to_owned(),
            TyId::Long => "long".to_owned(),
            TyId::Boolean => "boolean".to_owned(),
            TyId::Char => "char".to_owned(),
            TyId::Void => "void".to_owned(),
            TyId::Null => "null".to_owned(),
            TyId::Class(id) => self.class_name(id).to_owned(),
            TyId::Array(_) => {
                let mut result = self.type_name(self.element_type(ty));
                let _ = write!(result, "[]");
                result
            }
        }
    }

    fn make_expr(&mut self, kind: ExprKind, ty: TyId, line: u32) -> ExprId {
        self.exprs.push(Expr { kind, ty, line });
        ExprId((self.exprs.len() - 1) as u32)
    }

    fn make_stmt(&mut self, kind: StmtKind, line: u32) -> StmtId {
        self.stmts.push(Stmt { kind, line });
        StmtId((self.stmts.len() - 1) as u32)
    }

    pub fn make_int_lit(&mut self, value: i32, line: u32) -> ExprId {
        self.make_expr(ExprKind::IntLit(value), TyId::Int, line)
    }

    pub fn make_long_lit(&mut self, value: i64, line: u32) -> ExprId {
        self.make_expr(ExprKind::LongLit(value), TyId::Long, line)
    }

    pub fn make_bool_lit(&mut self, value: bool, line: u32) -> ExprId {
        self.make_expr(ExprKind::BoolLit(value), TyId::Boolean, line)
    }

    pub fn make_char_lit(&mut self, value: char, line: u32) -> ExprId {
        self.make_expr(ExprKind::CharLit(value), TyId::Char, line)
    }

    pub fn make_string_lit(&mut self, value: &str, line: u32) -> ExprId {
        self.make_expr(
            ExprKind::StringLit(value.to_owned()),
            TyId::Class(Self::STRING),
            line,
        )
    }

    pub fn make_null_lit(&mut self, line: u32) -> ExprId {
        self.make_expr(ExprKind::NullLit, TyId::Null, line)
    }

    pub fn make_local_ref(&mut self, local: LocalId, line: u32) -> ExprId {
        let ty = self.local_type(local);
        self.make_expr(ExprKind::Local(local), ty, line)
    }

    pub fn make_this(&mut self, class: ClassId, line: u32) -> ExprId {
        self.make_expr(ExprKind::This, TyId::Class(class), line)
    }

    pub fn make_field_access(&mut self, object: ExprId, field: FieldId, line: u32) -> ExprId {
        assert!(self.type_of(object).is_reference());
        let ty = self.field_type(field);
        self.make_expr(ExprKind::Field { object, field }, ty, line)
    }

    pub fn make_index(&mut self, array: ExprId, index: ExprId, line: u32) -> ExprId {
        let ty = self.element_type(self.type_of(array));
        self.make_expr(ExprKind::Index { array, index }, ty, line)
    }

    pub fn make_call(
        &mut self,
        receiver: Option<ExprId>,
        method: MethodId,
        args: Vec<ExprId>,
        line: u32,
    ) -> ExprId {
        let ty = self.method_return(method);
        self.make_expr(
            ExprKind::Call {
                receiver,
                method,
                args,
            },
            ty,
            line,
        )
    }

    pub fn make_new(&mut self, ctor: MethodId, args: Vec<ExprId>, line: u32) -> ExprId {
        let ty = self.method_return(ctor);
        assert!(matches!(ty, TyId::Class(_)));
        self.make_expr(ExprKind::New { ctor, args }, ty, line)
    }

    pub fn make_new_array(&mut self, element: TyId, length: ExprId, line: u32) -> ExprId {
        let ty = self.make_array_type(element);
        self.make_expr(ExprKind::NewArray { length }, ty, line)
    }

    pub fn make_unary(&mut self, op: UnOp, operand: ExprId, ty: TyId, line: u32) -> ExprId {
        self.make_expr(ExprKind::Unary { op, operand }, ty, line)
    }

    pub fn make_binary(
        &mut self,
        op: BinOp,
        lhs: ExprId,
        rhs: ExprId,
        ty: TyId,
        line: u32,
    ) -> ExprId {
        self.make_expr(ExprKind::Binary { op, lhs, rhs }, ty, line)
    }

    pub fn make_assign(&mut self, target: ExprId, value: ExprId, line: u32) -> ExprId {
        self.make_assign_impl(target, None, value, line)
    }

    pub fn make_compound_assign(
        &mut self,
        op: BinOp,
        target: ExprId,
        value: ExprId,
        line: u32,
    ) -> ExprId {
        assert!(!matches!(op, BinOp::And | BinOp::Or));
        self.make_assign_impl(target, Some(op), value, line)
    }

    fn make_assign_impl(
        &mut self,
        target: ExprId,
        op: Option<BinOp>,
        value: ExprId,
        line: u32,
    ) -> ExprId {
        assert!(matches!(
            self.expr(target).kind,
            ExprKind::Local(_) | ExprKind::Field { .. } | ExprKind::Index { .. }
        ));
        let ty = self.type_of(target);
        self.make_expr(ExprKind::Assign { target, op, value }, ty, line)
    }

    pub fn make_inc_dec(
        &mut self,
        op: IncDecOp,
        prefix: bool,
        target: ExprId,
        line: u32,
    ) -> ExprId {
        assert!(matches!(
            self.expr(target).kind,
            ExprKind::Local(_) | ExprKind::Field { .. } | ExprKind::Index { .. }
        ));
        let ty = self.type_of(target);
        assert!(ty.is_numeric() || self.unboxed_for(ty).is_some());
        self.make_expr(ExprKind::IncDec { op, prefix, target }, ty, line)
    }

    pub fn make_ternary(
        &mut self,
        cond: ExprId,
        then: ExprId,
        els: ExprId,
        ty: TyId,
        line: u32,
    ) -> ExprId {
        self.make_expr(ExprKind::Ternary { cond, then, els }, ty, line)
    }

    pub fn make_cast(&mut self, operand: ExprId, target: TyId, line: u32) -> ExprId {
        self.make_expr(ExprKind::Cast { operand }, target, line)
    }

    pub fn make_instance_of(&mut self, operand: ExprId, tested: ClassId, line: u32) -> ExprId {
        assert!(self.type_of(operand).is_reference());
        self.make_expr(ExprKind::InstanceOf { operand, tested }, TyId::Boolean, line)
    }

    pub fn make_expr_stmt(&mut self, expr: ExprId, line: u32) -> StmtId {
        self.make_stmt(StmtKind::Expr(expr), line)
    }

    pub fn make_var_decl(&mut self, local: LocalId, init: Option<ExprId>, line: u32) -> StmtId {
        self.make_stmt(StmtKind::VarDecl { local, init }, line)
    }

    pub fn make_if(
        &mut self,
        cond: ExprId,
        then: StmtId,
        els: Option<StmtId>,
        line: u32,
    ) -> StmtId {
        self.make_stmt(StmtKind::If { cond, then, els }, line)
    }

    pub fn make_while(&mut self, cond: ExprId, body: StmtId, line: u32) -> StmtId {
        self.make_stmt(StmtKind::While { cond, body }, line)
    }

    pub fn make_do_while(&mut self, body: StmtId, cond: ExprId, line: u32) -> StmtId {
        self.make_stmt(StmtKind::DoWhile { body, cond }, line)
    }

    pub fn make_for(
        &mut self,
        init: Vec<StmtId>,
        cond: Option<ExprId>,
        update: Vec<ExprId>,
        body: StmtId,
        line: u32,
    ) -> StmtId {
        self.make_stmt(
            StmtKind::For {
                init,
                cond,
                update,
                body,
            },
            line,
        )
    }

    pub fn make_switch(&mut self, selector: ExprId, cases: Vec<SwitchCase>, line: u32) -> StmtId {
        self.make_stmt(StmtKind::Switch { selector, cases }, line)
    }

    pub fn make_try(
        &mut self,
        body: StmtId,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
        line: u32,
    ) -> StmtId {
        assert!(!catches.is_empty() || finally.is_some());
        self.make_stmt(
            StmtKind::Try {
                body,
                catches,
                finally,
            },
            line,
        )
    }

    pub fn make_throw(&mut self, expr: ExprId, line: u32) -> StmtId {
        assert!(matches!(self.type_of(expr), TyId::Class(_) | TyId::Null));
        self.make_stmt(StmtKind::Throw(expr), line)
    }

    pub fn make_return(&mut self, expr: Option<ExprId>, line: u32) -> StmtId {
        self.make_stmt(StmtKind::Return(expr), line)
    }

    pub fn make_break(&mut self, line: u32) -> StmtId {
        self.make_stmt(StmtKind::Break, line)
    }

    pub fn make_continue(&mut self, line: u32) -> StmtId {
        self.make_stmt(StmtKind::Continue, line)
    }

    pub fn make_block(&mut self, stmts: Vec<StmtId>, line: u32) -> StmtId {
        self.make_stmt(StmtKind::Block(stmts), line)
    }

    pub fn make_empty(&mut self, line: u32) -> StmtId {
        self.make_stmt(StmtKind::Empty, line)
    }

    fn unboxed_for(&self, ty: TyId) -> Option<TyId> {
        if let TyId::Class(c) = ty {
            return self.unboxed_type(c);
        }
        None
    }
}

impl Default for TreeContext {
    fn default() -> Self {
        Self::new()
    }
}
