use utils::DiagnosticEmitter;

use crate::cfg::{Cfg, Edge, Terminator};
use crate::node::{Node, NodeId, NodeKind, Origin, Variable};
use crate::tree::{
    BinOp, CatchClause, ClassId, ExprId, ExprKind, FieldId, IncDecOp, LocalId, StmtId, StmtKind,
    SwitchCase, TreeContext, TyId, UnOp, Unit,
};

const NPE: ClassId = TreeContext::NULL_POINTER_EXCEPTION;
const OUT_OF_BOUNDS: ClassId = TreeContext::INDEX_OUT_OF_BOUNDS_EXCEPTION;
const ARITHMETIC: ClassId = TreeContext::ARITHMETIC_EXCEPTION;
const NEGATIVE_SIZE: ClassId = TreeContext::NEGATIVE_ARRAY_SIZE_EXCEPTION;
const CLASS_CAST: ClassId = TreeContext::CLASS_CAST_EXCEPTION;
const RUNTIME: ClassId = TreeContext::RUNTIME_EXCEPTION;
const THROWABLE: ClassId = TreeContext::THROWABLE;

/// Lowers a single unit of a [`TreeContext`] into a [`Cfg`].
///
/// The lowering decomposes every expression into single-assignment nodes,
/// turns short-circuit operators into control flow, and links each node that
/// can raise an exception to the matching handler or to the exceptional exit.
/// Malformed input (an abrupt jump with no enclosing construct, unreachable
/// statements, impossible conversions) is reported through the
/// [`DiagnosticEmitter`] and yields `None`.
pub struct CfgBuilder<'src> {
    tree: &'src TreeContext,
    diag: &'src mut DiagnosticEmitter,
}

impl<'src> CfgBuilder<'src> {
    pub fn new(tree: &'src TreeContext, diag: &'src mut DiagnosticEmitter) -> Self {
        CfgBuilder { tree, diag }
    }

    pub fn build(self, unit: Unit) -> Option<Cfg> {
        Lowering {
            tree: self.tree,
            diag: self.diag,
            cfg: Cfg::new(unit),
            current: None,
            last_fault_block: None,
            loops: Vec::new(),
            tries: Vec::new(),
        }
        .run(unit)
    }
}

/// An enclosing loop or switch, the target of `break` and `continue`.
#[derive(Clone, Copy)]
struct LoopFrame {
    break_target: usize,
    /// `None` for switches, which `continue` skips over.
    continue_target: Option<usize>,
    /// Exception frames below this construct stay intact when jumping out.
    tries_depth: usize,
}

#[derive(Clone)]
struct TryFrame {
    /// Catch clause entry blocks in declaration order.
    catches: Vec<(ClassId, usize)>,
    /// Cleared once the body is lowered; faults in the catch bodies and in
    /// the finally copies no longer route to the clauses of this frame.
    clauses_active: bool,
    /// The shared exceptional copy of the finally block, if any.
    exceptional_finally: Option<usize>,
    finally: Option<StmtId>,
}

struct Lowering<'src> {
    tree: &'src TreeContext,
    diag: &'src mut DiagnosticEmitter,
    cfg: Cfg,
    /// The block under construction, `None` after a terminator.
    current: Option<usize>,
    /// The most recently sealed block, where the last faulting node lives.
    last_fault_block: Option<usize>,
    loops: Vec<LoopFrame>,
    tries: Vec<TryFrame>,
}

enum Lvalue {
    Local(LocalId),
    Field { object: NodeId, field: FieldId },
    Index { array: NodeId, index: NodeId },
}

impl Lowering<'_> {
    fn run(mut self, unit: Unit) -> Option<Cfg> {
        let first = self.cfg.new_block();
        self.cfg.add_edge(Cfg::ENTRY_BLOCK, Edge::Normal(first));
        self.current = Some(first);
        match unit {
            Unit::Method(body) => self.lower_stmt(body)?,
            Unit::Expression(expr) => {
                let operand = self.lower_expr(expr)?;
                let ty = self.node_ty(operand);
                self.append(
                    NodeKind::LambdaResultExpression { operand },
                    ty,
                    Origin::Expr(expr),
                );
            }
        }
        if let Some(block) = self.current {
            self.cfg.add_edge(block, Edge::Normal(Cfg::EXIT_BLOCK));
        }
        self.cfg.prune_unreachable();
        Some(self.cfg)
    }

    fn block(&self) -> usize {
        let Some(block) = self.current else {
            panic!("No block under construction.");
        };
        block
    }

    fn node_ty(&self, id: NodeId) -> TyId {
        self.cfg.node(id).ty
    }

    fn fault(&mut self, line: u32, construct: &str, message: &str) {
        self.diag
            .report(line, &format!("at '{construct}'"), message);
    }

    fn append(&mut self, kind: NodeKind, ty: TyId, origin: Origin) -> NodeId {
        let id = self.cfg.add_node(Node { kind, ty, origin });
        let block = self.block();
        self.cfg.push_node(block, id);
        id
    }

    /// Appends a node that can raise the given exceptions. The block is
    /// sealed afterwards so the exceptional edges stay node precise; the
    /// non-exceptional path continues in a fresh block.
    fn append_faulting(
        &mut self,
        kind: NodeKind,
        ty: TyId,
        origin: Origin,
        causes: &[ClassId],
    ) -> NodeId {
        if causes.is_empty() {
            return self.append(kind, ty, origin);
        }
        let id = self.append(kind, ty, origin);
        let block = self.block();
        for &cause in causes {
            self.add_fault_edges(block, cause);
        }
        let next = self.cfg.new_block();
        self.cfg.add_edge(block, Edge::Normal(next));
        self.current = Some(next);
        self.last_fault_block = Some(block);
        id
    }

    /// Appends a node that always transfers control exceptionally.
    fn append_terminal(&mut self, kind: NodeKind, origin: Origin, thrown: ClassId) {
        self.append(kind, TyId::Void, origin);
        let block = self.block();
        self.add_fault_edges(block, thrown);
        self.current = None;
    }

    /// Connects a faulting block to every handler the thrown type can reach.
    ///
    /// Walks the enclosing exception frames innermost first. A clause whose
    /// type covers the thrown type consumes it; a clause the thrown type
    /// merely overlaps with may consume it, so the walk adds the edge and
    /// keeps going. Frames with a finally get the exceptional copy, and
    /// anything left over escapes to the exceptional exit.
    fn add_fault_edges(&mut self, block: usize, thrown: ClassId) {
        for frame in self.tries.iter().rev() {
            if frame.clauses_active {
                for &(caught, target) in &frame.catches {
                    if self.tree.is_subtype(thrown, caught) {
                        self.cfg
                            .add_edge(block, Edge::Exceptional { target, thrown });
                        return;
                    }
                    if self.tree.is_subtype(caught, thrown) {
                        self.cfg
                            .add_edge(block, Edge::Exceptional { target, thrown });
                    }
                }
            }
            if let Some(target) = frame.exceptional_finally {
                self.cfg
                    .add_edge(block, Edge::Exceptional { target, thrown });
                return;
            }
        }
        self.cfg.add_edge(
            block,
            Edge::Exceptional {
                target: Cfg::EXCEPTIONAL_EXIT_BLOCK,
                thrown,
            },
        );
    }

    /// Ends the current block with a two-way branch on `value`.
    ///
    /// When the condition node faulted, the node sits at the end of an
    /// already sealed block; the branch is placed there instead and the
    /// empty continuation block is left for pruning. Such a block carries
    /// true, false and exceptional successors at the same time.
    fn branch_on(&mut self, value: NodeId, true_target: usize, false_target: usize) {
        let mut block = self.block();
        if self.cfg.last_node(block) != Some(value) {
            let Some(faulted) = self.last_fault_block else {
                panic!("Branch condition is not the last node of a block.");
            };
            assert_eq!(self.cfg.last_node(faulted), Some(value));
            self.cfg.retract_last_edge(faulted);
            block = faulted;
        }
        self.cfg.set_terminator(block, Terminator::Branch(value));
        self.cfg.add_edge(block, Edge::True(true_target));
        self.cfg.add_edge(block, Edge::False(false_target));
        self.current = None;
    }

    /// Opens a fresh block that control falls into from the current one.
    fn start_block(&mut self) -> usize {
        let previous = self.block();
        let block = self.cfg.new_block();
        self.cfg.add_edge(previous, Edge::Normal(block));
        self.current = Some(block);
        block
    }

    /// Lowers a copy of every finally block an abrupt jump escapes from,
    /// innermost first, down to (but excluding) `depth`. A copy that ends
    /// abruptly itself cancels the jump, so the walk stops with it.
    fn run_finallys_to(&mut self, depth: usize) -> Option<()> {
        let saved = self.tries.clone();
        for idx in (depth..saved.len()).rev() {
            if self.current.is_none() {
                break;
            }
            if let Some(finally) = saved[idx].finally {
                self.tries.truncate(idx);
                self.lower_stmt(finally)?;
            }
        }
        self.tries = saved;
        Some(())
    }

    fn lower_stmts(&mut self, stmts: &[StmtId]) -> Option<()> {
        for &s in stmts {
            if self.current.is_none() {
                let stmt = self.tree.stmt(s);
                self.fault(stmt.line, stmt_name(&stmt.kind), "unreachable code.");
                return None;
            }
            self.lower_stmt(s)?;
        }
        Some(())
    }

    fn lower_stmt(&mut self, s: StmtId) -> Option<()> {
        let tree = self.tree;
        let stmt = tree.stmt(s);
        match &stmt.kind {
            StmtKind::Expr(e) => {
                self.lower_expr(*e)?;
            }
            StmtKind::VarDecl { local, init } => self.lower_var_decl(*local, *init, s)?,
            StmtKind::If { cond, then, els } => self.lower_if(*cond, *then, *els)?,
            StmtKind::While { cond, body } => self.lower_while(*cond, *body)?,
            StmtKind::DoWhile { body, cond } => self.lower_do_while(*body, *cond)?,
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => self.lower_for(init, *cond, update, *body)?,
            StmtKind::Switch { selector, cases } => self.lower_switch(*selector, cases, s)?,
            StmtKind::Try {
                body,
                catches,
                finally,
            } => self.lower_try(*body, catches, *finally, s)?,
            StmtKind::Throw(e) => self.lower_throw(*e, s)?,
            StmtKind::Return(e) => self.lower_return(*e, s)?,
            StmtKind::Break => self.lower_break(stmt.line)?,
            StmtKind::Continue => self.lower_continue(stmt.line)?,
            StmtKind::Block(stmts) => self.lower_stmts(stmts)?,
            StmtKind::Empty => {}
        }
        Some(())
    }

    fn lower_var_decl(&mut self, local: LocalId, init: Option<ExprId>, s: StmtId) -> Option<()> {
        self.append(
            NodeKind::VariableDeclaration {
                variable: Variable::Local(local),
            },
            TyId::Void,
            Origin::Stmt(s),
        );
        if let Some(init) = init {
            let ty = self.tree.local_type(local);
            let target = self.append(
                NodeKind::LocalVariable(Variable::Local(local)),
                ty,
                Origin::Stmt(s),
            );
            let value = self.lower_expr(init)?;
            let expression = self.adapt(value, ty, init)?;
            self.append(
                NodeKind::Assignment { target, expression },
                ty,
                Origin::Stmt(s),
            );
        }
        Some(())
    }

    fn lower_if(&mut self, cond: ExprId, then: StmtId, els: Option<StmtId>) -> Option<()> {
        let then_block = self.cfg.new_block();
        let else_block = els.map(|_| self.cfg.new_block());
        let after = self.cfg.new_block();
        self.lower_condition(cond, then_block, else_block.unwrap_or(after))?;
        self.current = Some(then_block);
        self.lower_stmt(then)?;
        if let Some(block) = self.current {
            self.cfg.add_edge(block, Edge::Normal(after));
        }
        if let (Some(els), Some(else_block)) = (els, else_block) {
            self.current = Some(else_block);
            self.lower_stmt(els)?;
            if let Some(block) = self.current {
                self.cfg.add_edge(block, Edge::Normal(after));
            }
        }
        self.current = Some(after);
        Some(())
    }

    fn lower_while(&mut self, cond: ExprId, body: StmtId) -> Option<()> {
        let header = self.start_block();
        let body_block = self.cfg.new_block();
        let after = self.cfg.new_block();
        self.lower_condition(cond, body_block, after)?;
        self.current = Some(body_block);
        self.loops.push(LoopFrame {
            break_target: after,
            continue_target: Some(header),
            tries_depth: self.tries.len(),
        });
        let body_result = self.lower_stmt(body);
        self.loops.pop();
        body_result?;
        if let Some(block) = self.current {
            self.cfg.add_edge(block, Edge::Normal(header));
        }
        self.current = Some(after);
        Some(())
    }

    fn lower_do_while(&mut self, body: StmtId, cond: ExprId) -> Option<()> {
        let body_block = self.start_block();
        let header = self.cfg.new_block();
        let after = self.cfg.new_block();
        self.loops.push(LoopFrame {
            break_target: after,
            continue_target: Some(header),
            tries_depth: self.tries.len(),
        });
        let body_result = self.lower_stmt(body);
        self.loops.pop();
        body_result?;
        if let Some(block) = self.current {
            self.cfg.add_edge(block, Edge::Normal(header));
        }
        self.current = Some(header);
        self.lower_condition(cond, body_block, after)?;
        self.current = Some(after);
        Some(())
    }

    fn lower_for(
        &mut self,
        init: &[StmtId],
        cond: Option<ExprId>,
        update: &[ExprId],
        body: StmtId,
    ) -> Option<()> {
        self.lower_stmts(init)?;
        let header = self.start_block();
        let body_block = self.cfg.new_block();
        let after = self.cfg.new_block();
        let update_block = if update.is_empty() {
            None
        } else {
            Some(self.cfg.new_block())
        };
        match cond {
            Some(cond) => self.lower_condition(cond, body_block, after)?,
            None => {
                let block = self.block();
                self.cfg.add_edge(block, Edge::Normal(body_block));
            }
        }
        self.current = Some(body_block);
        let continue_target = update_block.unwrap_or(header);
        self.loops.push(LoopFrame {
            break_target: after,
            continue_target: Some(continue_target),
            tries_depth: self.tries.len(),
        });
        let body_result = self.lower_stmt(body);
        self.loops.pop();
        body_result?;
        if let Some(block) = self.current {
            self.cfg.add_edge(block, Edge::Normal(continue_target));
        }
        if let Some(update_block) = update_block {
            self.current = Some(update_block);
            for &e in update {
                self.lower_expr(e)?;
            }
            let block = self.block();
            self.cfg.add_edge(block, Edge::Normal(header));
        }
        self.current = Some(after);
        Some(())
    }

    fn lower_switch(&mut self, selector: ExprId, cases: &[SwitchCase], s: StmtId) -> Option<()> {
        let line = self.tree.stmt(s).line;
        if cases.iter().filter(|case| case.label.is_none()).count() > 1 {
            self.fault(line, "switch", "more than one 'default' label.");
            return None;
        }
        let selector_node = self.lower_expr(selector)?;
        let selector_node = self.unbox_value(selector_node, selector);
        let selector_ty = self.node_ty(selector_node);

        let body_blocks: Vec<usize> = cases.iter().map(|_| self.cfg.new_block()).collect();
        let after = self.cfg.new_block();
        let default_block = cases
            .iter()
            .position(|case| case.label.is_none())
            .map(|idx| body_blocks[idx]);

        // One comparison per labeled case, tested in declaration order.
        let labeled: Vec<(usize, ExprId)> = cases
            .iter()
            .enumerate()
            .filter_map(|(idx, case)| case.label.map(|label| (idx, label)))
            .collect();
        for (pos, &(idx, label)) in labeled.iter().enumerate() {
            let label_node = self.lower_expr(label)?;
            let expression = self.adapt(label_node, selector_ty, label)?;
            let case_node = self.append(
                NodeKind::Case {
                    selector: selector_node,
                    expression,
                },
                TyId::Boolean,
                Origin::Expr(label),
            );
            if pos + 1 < labeled.len() {
                let next_test = self.cfg.new_block();
                self.branch_on(case_node, body_blocks[idx], next_test);
                self.current = Some(next_test);
            } else {
                self.branch_on(case_node, body_blocks[idx], default_block.unwrap_or(after));
            }
        }
        if labeled.is_empty() {
            let block = self.block();
            self.cfg
                .add_edge(block, Edge::Normal(default_block.unwrap_or(after)));
        }

        self.loops.push(LoopFrame {
            break_target: after,
            continue_target: None,
            tries_depth: self.tries.len(),
        });
        let mut bodies_result = Some(());
        for (idx, case) in cases.iter().enumerate() {
            self.current = Some(body_blocks[idx]);
            bodies_result = self.lower_stmts(&case.body);
            if bodies_result.is_none() {
                break;
            }
            // Falling off the end of a case runs into the next one.
            if let Some(block) = self.current {
                let target = if idx + 1 < cases.len() {
                    body_blocks[idx + 1]
                } else {
                    after
                };
                self.cfg.add_edge(block, Edge::Normal(target));
            }
        }
        self.loops.pop();
        bodies_result?;
        self.current = Some(after);
        Some(())
    }

    fn lower_try(
        &mut self,
        body: StmtId,
        catches: &[CatchClause],
        finally: Option<StmtId>,
        s: StmtId,
    ) -> Option<()> {
        let line = self.tree.stmt(s).line;
        // The shared exceptional copy of the finally is built before the
        // frame is pushed, so its own faults route to the enclosing frames.
        // It ends by handing the pending exception on.
        let exceptional_finally = match finally {
            Some(finally) => {
                let outer = self.current.take();
                let entry = self.cfg.new_block();
                self.current = Some(entry);
                self.lower_stmt(finally)?;
                if self.current.is_some() {
                    self.append_terminal(
                        NodeKind::Marker("rethrow".to_owned()),
                        Origin::Stmt(finally),
                        THROWABLE,
                    );
                }
                self.current = outer;
                Some(entry)
            }
            None => None,
        };

        let mut catch_targets = Vec::new();
        for clause in catches {
            if !self.tree.is_subtype(clause.exception, THROWABLE) {
                let name = self.tree.class_name(clause.exception).to_owned();
                self.fault(line, &name, "caught type is not a Throwable.");
                return None;
            }
            catch_targets.push((clause.exception, self.cfg.new_block()));
        }

        self.tries.push(TryFrame {
            catches: catch_targets.clone(),
            clauses_active: true,
            exceptional_finally,
            finally,
        });
        self.lower_stmt(body)?;

        let mut ends = Vec::new();
        if let Some(block) = self.current {
            ends.push(block);
        }
        let Some(frame) = self.tries.last_mut() else {
            panic!("Exception frame vanished.");
        };
        frame.clauses_active = false;

        for (clause, &(_, entry)) in catches.iter().zip(&catch_targets) {
            self.current = Some(entry);
            self.append(
                NodeKind::VariableDeclaration {
                    variable: Variable::Local(clause.binding),
                },
                TyId::Void,
                Origin::Stmt(clause.body),
            );
            self.lower_stmt(clause.body)?;
            if let Some(block) = self.current {
                ends.push(block);
            }
        }
        self.tries.pop();

        // Each completion path gets its own copy of the finally block.
        let after = self.cfg.new_block();
        for end in ends {
            self.current = Some(end);
            if let Some(finally) = finally {
                self.lower_stmt(finally)?;
            }
            if let Some(block) = self.current {
                self.cfg.add_edge(block, Edge::Normal(after));
            }
        }
        self.current = Some(after);
        Some(())
    }

    fn lower_throw(&mut self, e: ExprId, s: StmtId) -> Option<()> {
        let line = self.tree.stmt(s).line;
        let value = self.lower_expr(e)?;
        let thrown = match self.node_ty(value) {
            TyId::Class(class) if self.tree.is_subtype(class, THROWABLE) => class,
            // `throw null` raises a NullPointerException instead.
            TyId::Null => NPE,
            ty => {
                let name = self.tree.type_name(ty);
                self.fault(line, "throw", &format!("cannot throw a value of type {name}."));
                return None;
            }
        };
        self.append_terminal(NodeKind::Throw(value), Origin::Stmt(s), thrown);
        Some(())
    }

    fn lower_return(&mut self, value: Option<ExprId>, s: StmtId) -> Option<()> {
        let result = match value {
            Some(e) => Some(self.lower_expr(e)?),
            None => None,
        };
        self.run_finallys_to(0)?;
        if self.current.is_some() {
            self.append(NodeKind::Return(result), TyId::Void, Origin::Stmt(s));
            let block = self.block();
            self.cfg.add_edge(block, Edge::Normal(Cfg::EXIT_BLOCK));
            self.current = None;
        }
        Some(())
    }

    fn lower_break(&mut self, line: u32) -> Option<()> {
        let Some(frame) = self.loops.last().copied() else {
            self.fault(line, "break", "'break' outside of a loop or switch.");
            return None;
        };
        self.run_finallys_to(frame.tries_depth)?;
        if let Some(block) = self.current {
            self.cfg.add_edge(block, Edge::Normal(frame.break_target));
            self.current = None;
        }
        Some(())
    }

    fn lower_continue(&mut self, line: u32) -> Option<()> {
        let target = self
            .loops
            .iter()
            .rev()
            .find_map(|frame| frame.continue_target.map(|t| (t, frame.tries_depth)));
        let Some((target, tries_depth)) = target else {
            self.fault(line, "continue", "'continue' outside of a loop.");
            return None;
        };
        self.run_finallys_to(tries_depth)?;
        if let Some(block) = self.current {
            self.cfg.add_edge(block, Edge::Normal(target));
            self.current = None;
        }
        Some(())
    }

    /// Lowers a boolean expression in branching position. Short-circuit
    /// operators and conditionals never materialize a value here; they
    /// chain the branches of their operands directly.
    fn lower_condition(&mut self, e: ExprId, true_target: usize, false_target: usize) -> Option<()> {
        let tree = self.tree;
        match &tree.expr(e).kind {
            ExprKind::Binary {
                op: BinOp::And,
                lhs,
                rhs,
            } => {
                let rhs_block = self.cfg.new_block();
                self.lower_condition(*lhs, rhs_block, false_target)?;
                self.current = Some(rhs_block);
                self.lower_condition(*rhs, true_target, false_target)
            }
            ExprKind::Binary {
                op: BinOp::Or,
                lhs,
                rhs,
            } => {
                let rhs_block = self.cfg.new_block();
                self.lower_condition(*lhs, true_target, rhs_block)?;
                self.current = Some(rhs_block);
                self.lower_condition(*rhs, true_target, false_target)
            }
            ExprKind::Ternary { cond, then, els } => {
                let then_block = self.cfg.new_block();
                let else_block = self.cfg.new_block();
                self.lower_condition(*cond, then_block, else_block)?;
                self.current = Some(then_block);
                self.lower_condition(*then, true_target, false_target)?;
                self.current = Some(else_block);
                self.lower_condition(*els, true_target, false_target)
            }
            _ => {
                let value = self.lower_expr(e)?;
                let value = self.adapt(value, TyId::Boolean, e)?;
                self.branch_on(value, true_target, false_target);
                Some(())
            }
        }
    }

    fn lower_expr(&mut self, e: ExprId) -> Option<NodeId> {
        let tree = self.tree;
        let expr = tree.expr(e);
        let origin = Origin::Expr(e);
        match &expr.kind {
            ExprKind::IntLit(value) => {
                Some(self.append(NodeKind::IntegerLiteral(*value), TyId::Int, origin))
            }
            ExprKind::LongLit(value) => {
                Some(self.append(NodeKind::LongLiteral(*value), TyId::Long, origin))
            }
            ExprKind::BoolLit(value) => {
                Some(self.append(NodeKind::BooleanLiteral(*value), TyId::Boolean, origin))
            }
            ExprKind::CharLit(value) => {
                Some(self.append(NodeKind::CharacterLiteral(*value), TyId::Char, origin))
            }
            ExprKind::StringLit(value) => Some(self.append(
                NodeKind::StringLiteral(value.clone()),
                TyId::Class(TreeContext::STRING),
                origin,
            )),
            ExprKind::NullLit => Some(self.append(NodeKind::NullLiteral, TyId::Null, origin)),
            ExprKind::Local(local) => Some(self.append(
                NodeKind::LocalVariable(Variable::Local(*local)),
                expr.ty,
                origin,
            )),
            ExprKind::This => Some(self.append(NodeKind::ThisLiteral, expr.ty, origin)),
            ExprKind::Field { object, field } => {
                let object = self.lower_expr(*object)?;
                Some(self.append_faulting(
                    NodeKind::FieldAccess {
                        object,
                        field: *field,
                    },
                    expr.ty,
                    origin,
                    &[NPE],
                ))
            }
            ExprKind::Index { array, index } => {
                let array = self.lower_expr(*array)?;
                let index_node = self.lower_expr(*index)?;
                let index_node = self.adapt(index_node, TyId::Int, *index)?;
                Some(self.append_faulting(
                    NodeKind::ArrayAccess {
                        array,
                        index: index_node,
                    },
                    expr.ty,
                    origin,
                    &[NPE, OUT_OF_BOUNDS],
                ))
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                let receiver_node = match receiver {
                    Some(receiver) => Some(self.lower_expr(*receiver)?),
                    None => None,
                };
                let target = self.append(
                    NodeKind::MethodAccess {
                        receiver: receiver_node,
                        method: *method,
                    },
                    tree.method_return(*method),
                    origin,
                );
                let arguments = self.lower_arguments(args, tree.method_params(*method), e)?;
                let mut causes = Vec::new();
                if receiver_node.is_some() {
                    causes.push(NPE);
                }
                for &thrown in tree.method_throws(*method) {
                    if !causes.contains(&thrown) {
                        causes.push(thrown);
                    }
                }
                if !causes.contains(&RUNTIME) {
                    causes.push(RUNTIME);
                }
                Some(self.append_faulting(
                    NodeKind::MethodInvocation { target, arguments },
                    expr.ty,
                    origin,
                    &causes,
                ))
            }
            ExprKind::New { ctor, args } => {
                let arguments = self.lower_arguments(args, tree.method_params(*ctor), e)?;
                let mut causes = Vec::new();
                for &thrown in tree.method_throws(*ctor) {
                    if !causes.contains(&thrown) {
                        causes.push(thrown);
                    }
                }
                if !causes.contains(&RUNTIME) {
                    causes.push(RUNTIME);
                }
                Some(self.append_faulting(
                    NodeKind::ObjectCreation {
                        constructor: *ctor,
                        arguments,
                    },
                    expr.ty,
                    origin,
                    &causes,
                ))
            }
            ExprKind::NewArray { length } => {
                let length_node = self.lower_expr(*length)?;
                let length_node = self.adapt(length_node, TyId::Int, *length)?;
                Some(self.append_faulting(
                    NodeKind::ArrayCreation {
                        length: length_node,
                    },
                    expr.ty,
                    origin,
                    &[NEGATIVE_SIZE],
                ))
            }
            ExprKind::Unary {
                op: UnOp::Not,
                operand,
            } => {
                let value = self.lower_expr(*operand)?;
                let operand_node = self.adapt(value, TyId::Boolean, *operand)?;
                Some(self.append(
                    NodeKind::ConditionalNot {
                        operand: operand_node,
                    },
                    TyId::Boolean,
                    origin,
                ))
            }
            ExprKind::Unary { op, operand } => {
                let value = self.lower_expr(*operand)?;
                let operand_node = self.unary_promote(value, e)?;
                let ty = self.node_ty(operand_node);
                let kind = match op {
                    UnOp::Neg => NodeKind::NumericalMinus {
                        operand: operand_node,
                    },
                    UnOp::Plus => NodeKind::NumericalPlus {
                        operand: operand_node,
                    },
                    UnOp::BitNot => NodeKind::BitwiseComplement {
                        operand: operand_node,
                    },
                    UnOp::Not => panic!("Handled above."),
                };
                Some(self.append(kind, ty, origin))
            }
            ExprKind::Binary {
                op: BinOp::And | BinOp::Or,
                ..
            } => self.lower_short_circuit_value(e),
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.lower_expr(*lhs)?;
                let rhs = self.lower_expr(*rhs)?;
                self.emit_binary(*op, lhs, rhs, e)
            }
            ExprKind::Assign { target, op, value } => self.lower_assign(*target, *op, *value, e),
            ExprKind::IncDec {
                op,
                prefix,
                target,
            } => self.lower_inc_dec(*op, *prefix, *target, e),
            ExprKind::Ternary { .. } => self.lower_ternary_value(e),
            ExprKind::Cast { operand } => {
                let value = self.lower_expr(*operand)?;
                self.coerce(value, expr.ty, e)
            }
            ExprKind::InstanceOf { operand, tested } => {
                let operand_node = self.lower_expr(*operand)?;
                Some(self.append(
                    NodeKind::InstanceOf {
                        operand: operand_node,
                        tested: *tested,
                    },
                    TyId::Boolean,
                    origin,
                ))
            }
        }
    }

    fn lower_arguments(
        &mut self,
        args: &[ExprId],
        params: &[TyId],
        e: ExprId,
    ) -> Option<Vec<NodeId>> {
        if args.len() != params.len() {
            let line = self.tree.expr(e).line;
            self.fault(line, "call", "wrong number of arguments.");
            return None;
        }
        let mut arguments = Vec::new();
        for (&arg, &param) in args.iter().zip(params) {
            let value = self.lower_expr(arg)?;
            arguments.push(self.adapt(value, param, arg)?);
        }
        Some(arguments)
    }

    /// A short-circuit operator in value position writes into a fresh
    /// temporary on both branches; the join reads the temporary back.
    fn lower_short_circuit_value(&mut self, e: ExprId) -> Option<NodeId> {
        let temp = self.cfg.make_temp(TyId::Boolean);
        let true_block = self.cfg.new_block();
        let false_block = self.cfg.new_block();
        let join = self.cfg.new_block();
        self.lower_condition(e, true_block, false_block)?;
        for (block, value) in [(true_block, true), (false_block, false)] {
            self.current = Some(block);
            let target = self.append(
                NodeKind::LocalVariable(Variable::Temp(temp)),
                TyId::Boolean,
                Origin::Synthetic,
            );
            let expression = self.append(
                NodeKind::BooleanLiteral(value),
                TyId::Boolean,
                Origin::Synthetic,
            );
            self.append(
                NodeKind::Assignment { target, expression },
                TyId::Boolean,
                Origin::Synthetic,
            );
            self.cfg.add_edge(block, Edge::Normal(join));
        }
        self.current = Some(join);
        Some(self.append(
            NodeKind::LocalVariable(Variable::Temp(temp)),
            TyId::Boolean,
            Origin::Expr(e),
        ))
    }

    fn lower_ternary_value(&mut self, e: ExprId) -> Option<NodeId> {
        let tree = self.tree;
        let ExprKind::Ternary { cond, then, els } = &tree.expr(e).kind else {
            panic!("Not a conditional expression.");
        };
        let ty = tree.expr(e).ty;
        let temp = self.cfg.make_temp(ty);
        let then_block = self.cfg.new_block();
        let else_block = self.cfg.new_block();
        let join = self.cfg.new_block();
        self.lower_condition(*cond, then_block, else_block)?;
        for (block, arm) in [(then_block, *then), (else_block, *els)] {
            self.current = Some(block);
            let target = self.append(
                NodeKind::LocalVariable(Variable::Temp(temp)),
                ty,
                Origin::Synthetic,
            );
            let value = self.lower_expr(arm)?;
            let expression = self.adapt(value, ty, arm)?;
            self.append(
                NodeKind::Assignment { target, expression },
                ty,
                Origin::Synthetic,
            );
            if let Some(block) = self.current {
                self.cfg.add_edge(block, Edge::Normal(join));
            }
        }
        self.current = Some(join);
        Some(self.append(
            NodeKind::LocalVariable(Variable::Temp(temp)),
            ty,
            Origin::Expr(e),
        ))
    }

    fn lower_assign(
        &mut self,
        target: ExprId,
        op: Option<BinOp>,
        value: ExprId,
        e: ExprId,
    ) -> Option<NodeId> {
        let ty = self.tree.type_of(target);
        let lvalue = self.lower_lvalue(target)?;
        match op {
            None => {
                let target_node = self.emit_write_access(&lvalue, target);
                let value_node = self.lower_expr(value)?;
                let expression = self.adapt(value_node, ty, value)?;
                let causes = write_causes(&lvalue);
                Some(self.append_faulting(
                    NodeKind::Assignment {
                        target: target_node,
                        expression,
                    },
                    ty,
                    Origin::Expr(e),
                    &causes,
                ))
            }
            Some(op) => {
                let read = self.emit_read_access(&lvalue, target);
                let target_node = self.emit_write_access(&lvalue, target);
                let value_node = self.lower_expr(value)?;
                let computed = self.emit_binary(op, read, value_node, e)?;
                let expression = self.coerce(computed, ty, e)?;
                let causes = write_causes(&lvalue);
                Some(self.append_faulting(
                    NodeKind::Assignment {
                        target: target_node,
                        expression,
                    },
                    ty,
                    Origin::Expr(e),
                    &causes,
                ))
            }
        }
    }

    fn lower_inc_dec(
        &mut self,
        op: IncDecOp,
        prefix: bool,
        target: ExprId,
        e: ExprId,
    ) -> Option<NodeId> {
        let ty = self.tree.type_of(target);
        let lvalue = self.lower_lvalue(target)?;
        let read = self.emit_read_access(&lvalue, target);
        let target_node = self.emit_write_access(&lvalue, target);
        let operand = self.unary_promote(read, e)?;
        let one = if self.node_ty(operand) == TyId::Long {
            self.append(NodeKind::LongLiteral(1), TyId::Long, Origin::Synthetic)
        } else {
            self.append(NodeKind::IntegerLiteral(1), TyId::Int, Origin::Synthetic)
        };
        let kind = match op {
            IncDecOp::Inc => NodeKind::NumericalAddition {
                lhs: operand,
                rhs: one,
            },
            IncDecOp::Dec => NodeKind::NumericalSubtraction {
                lhs: operand,
                rhs: one,
            },
        };
        let promoted_ty = self.node_ty(operand);
        let computed = self.append(kind, promoted_ty, Origin::Expr(e));
        let expression = self.coerce(computed, ty, e)?;
        let causes = write_causes(&lvalue);
        let assignment = self.append_faulting(
            NodeKind::Assignment {
                target: target_node,
                expression,
            },
            ty,
            Origin::Expr(e),
            &causes,
        );
        Some(if prefix { assignment } else { read })
    }

    /// Evaluates the subexpressions of an assignment target once. Reads and
    /// the final write reuse the evaluated parts, so a compound assignment
    /// observes its array or receiver a single time.
    fn lower_lvalue(&mut self, target: ExprId) -> Option<Lvalue> {
        let tree = self.tree;
        match &tree.expr(target).kind {
            ExprKind::Local(local) => Some(Lvalue::Local(*local)),
            ExprKind::Field { object, field } => {
                let object = self.lower_expr(*object)?;
                Some(Lvalue::Field {
                    object,
                    field: *field,
                })
            }
            ExprKind::Index { array, index } => {
                let array = self.lower_expr(*array)?;
                let index_node = self.lower_expr(*index)?;
                let index = self.adapt(index_node, TyId::Int, *index)?;
                Some(Lvalue::Index { array, index })
            }
            _ => panic!("Not an assignable expression."),
        }
    }

    fn emit_read_access(&mut self, lvalue: &Lvalue, target: ExprId) -> NodeId {
        let ty = self.tree.type_of(target);
        let origin = Origin::Expr(target);
        match lvalue {
            Lvalue::Local(local) => {
                self.append(NodeKind::LocalVariable(Variable::Local(*local)), ty, origin)
            }
            Lvalue::Field { object, field } => self.append_faulting(
                NodeKind::FieldAccess {
                    object: *object,
                    field: *field,
                },
                ty,
                origin,
                &[NPE],
            ),
            Lvalue::Index { array, index } => self.append_faulting(
                NodeKind::ArrayAccess {
                    array: *array,
                    index: *index,
                },
                ty,
                origin,
                &[NPE, OUT_OF_BOUNDS],
            ),
        }
    }

    /// The access node an [`NodeKind::Assignment`] stores through. It never
    /// faults itself; the assignment node carries the exceptional edges of
    /// the store.
    fn emit_write_access(&mut self, lvalue: &Lvalue, target: ExprId) -> NodeId {
        let ty = self.tree.type_of(target);
        let origin = Origin::Expr(target);
        let kind = match lvalue {
            Lvalue::Local(local) => NodeKind::LocalVariable(Variable::Local(*local)),
            Lvalue::Field { object, field } => NodeKind::FieldAccess {
                object: *object,
                field: *field,
            },
            Lvalue::Index { array, index } => NodeKind::ArrayAccess {
                array: *array,
                index: *index,
            },
        };
        self.append(kind, ty, origin)
    }

    fn emit_binary(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId, e: ExprId) -> Option<NodeId> {
        let origin = Origin::Expr(e);
        let string = TyId::Class(TreeContext::STRING);
        match op {
            BinOp::Add if self.node_ty(lhs) == string || self.node_ty(rhs) == string => {
                let lhs = self.string_convert(lhs, e);
                let rhs = self.string_convert(rhs, e);
                Some(self.append(NodeKind::StringConcatenate { lhs, rhs }, string, origin))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul => {
                let (lhs, rhs, ty) = self.promote_binary(lhs, rhs, e)?;
                let kind = match op {
                    BinOp::Add => NodeKind::NumericalAddition { lhs, rhs },
                    BinOp::Sub => NodeKind::NumericalSubtraction { lhs, rhs },
                    _ => NodeKind::NumericalMultiplication { lhs, rhs },
                };
                Some(self.append(kind, ty, origin))
            }
            BinOp::Div | BinOp::Rem => {
                let (lhs, rhs, ty) = self.promote_binary(lhs, rhs, e)?;
                let kind = match op {
                    BinOp::Div => NodeKind::IntegerDivision { lhs, rhs },
                    _ => NodeKind::IntegerRemainder { lhs, rhs },
                };
                Some(self.append_faulting(kind, ty, origin, &[ARITHMETIC]))
            }
            BinOp::Shl | BinOp::Shr | BinOp::UShr => {
                // Shift operands promote independently; the left side
                // dictates the result type.
                let lhs = self.unary_promote(lhs, e)?;
                let rhs = self.unary_promote(rhs, e)?;
                let ty = self.node_ty(lhs);
                let kind = match op {
                    BinOp::Shl => NodeKind::LeftShift { lhs, rhs },
                    BinOp::Shr => NodeKind::SignedRightShift { lhs, rhs },
                    _ => NodeKind::UnsignedRightShift { lhs, rhs },
                };
                Some(self.append(kind, ty, origin))
            }
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
                let lhs = self.unbox_value(lhs, e);
                let rhs = self.unbox_value(rhs, e);
                let (lhs, rhs, ty) =
                    if self.node_ty(lhs) == TyId::Boolean && self.node_ty(rhs) == TyId::Boolean {
                        (lhs, rhs, TyId::Boolean)
                    } else {
                        self.promote_binary(lhs, rhs, e)?
                    };
                let kind = match op {
                    BinOp::BitAnd => NodeKind::BitwiseAnd { lhs, rhs },
                    BinOp::BitOr => NodeKind::BitwiseOr { lhs, rhs },
                    _ => NodeKind::BitwiseXor { lhs, rhs },
                };
                Some(self.append(kind, ty, origin))
            }
            BinOp::Eq | BinOp::Ne => {
                let (lhs, rhs) = if self.node_ty(lhs).is_reference()
                    && self.node_ty(rhs).is_reference()
                {
                    // Two references compare by identity, without unboxing.
                    (lhs, rhs)
                } else {
                    let lhs = self.unbox_value(lhs, e);
                    let rhs = self.unbox_value(rhs, e);
                    if self.node_ty(lhs) == TyId::Boolean && self.node_ty(rhs) == TyId::Boolean {
                        (lhs, rhs)
                    } else {
                        let (lhs, rhs, _) = self.promote_binary(lhs, rhs, e)?;
                        (lhs, rhs)
                    }
                };
                let kind = match op {
                    BinOp::Eq => NodeKind::EqualTo { lhs, rhs },
                    _ => NodeKind::NotEqual { lhs, rhs },
                };
                Some(self.append(kind, TyId::Boolean, origin))
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let (lhs, rhs, _) = self.promote_binary(lhs, rhs, e)?;
                let kind = match op {
                    BinOp::Lt => NodeKind::LessThan { lhs, rhs },
                    BinOp::Le => NodeKind::LessThanOrEqual { lhs, rhs },
                    BinOp::Gt => NodeKind::GreaterThan { lhs, rhs },
                    _ => NodeKind::GreaterThanOrEqual { lhs, rhs },
                };
                Some(self.append(kind, TyId::Boolean, origin))
            }
            BinOp::And | BinOp::Or => panic!("Short-circuit operators lower to control flow."),
        }
    }

    fn string_convert(&mut self, value: NodeId, e: ExprId) -> NodeId {
        if self.node_ty(value) == TyId::Class(TreeContext::STRING) {
            value
        } else {
            self.append(
                NodeKind::StringConversion { operand: value },
                TyId::Class(TreeContext::STRING),
                Origin::Expr(e),
            )
        }
    }

    /// Unwraps a value of a box class. The produced node can raise a
    /// NullPointerException. Values of any other type pass through.
    fn unbox_value(&mut self, value: NodeId, e: ExprId) -> NodeId {
        if let TyId::Class(class) = self.node_ty(value) {
            if let Some(primitive) = self.tree.unboxed_type(class) {
                return self.append_faulting(
                    NodeKind::Unboxing { operand: value },
                    primitive,
                    Origin::Expr(e),
                    &[NPE],
                );
            }
        }
        value
    }

    /// Unary numeric promotion: unbox, then widen char to int.
    fn unary_promote(&mut self, value: NodeId, e: ExprId) -> Option<NodeId> {
        let value = self.unbox_value(value, e);
        match self.node_ty(value) {
            TyId::Int | TyId::Long => Some(value),
            TyId::Char => Some(self.append(
                NodeKind::WideningConversion { operand: value },
                TyId::Int,
                Origin::Expr(e),
            )),
            ty => {
                let line = self.tree.expr(e).line;
                let name = self.tree.type_name(ty);
                self.fault(
                    line,
                    "operator",
                    &format!("numeric operand expected, found {name}."),
                );
                None
            }
        }
    }

    /// Binary numeric promotion: both operands widen to the larger of their
    /// promoted types.
    fn promote_binary(
        &mut self,
        lhs: NodeId,
        rhs: NodeId,
        e: ExprId,
    ) -> Option<(NodeId, NodeId, TyId)> {
        let lhs = self.unary_promote(lhs, e)?;
        let rhs = self.unary_promote(rhs, e)?;
        let ty = if self.node_ty(lhs) == TyId::Long || self.node_ty(rhs) == TyId::Long {
            TyId::Long
        } else {
            TyId::Int
        };
        let lhs = self.widen_to(lhs, ty, e);
        let rhs = self.widen_to(rhs, ty, e);
        Some((lhs, rhs, ty))
    }

    fn widen_to(&mut self, value: NodeId, ty: TyId, e: ExprId) -> NodeId {
        if self.node_ty(value) == ty {
            value
        } else {
            self.append(
                NodeKind::WideningConversion { operand: value },
                ty,
                Origin::Expr(e),
            )
        }
    }

    /// Adapts a value to the type a surrounding context expects, inserting
    /// unboxing, boxing and widening nodes as needed. Conversions that lose
    /// information or cross unrelated types are faults; those only happen
    /// through an explicit cast, which goes through [`Lowering::coerce`].
    fn adapt(&mut self, value: NodeId, expected: TyId, e: ExprId) -> Option<NodeId> {
        let actual = self.node_ty(value);
        if actual == expected {
            return Some(value);
        }
        match expected {
            TyId::Int | TyId::Long | TyId::Char | TyId::Boolean => {
                let value = self.unbox_value(value, e);
                let actual = self.node_ty(value);
                if actual == expected {
                    return Some(value);
                }
                if widens(actual, expected) {
                    return Some(self.append(
                        NodeKind::WideningConversion { operand: value },
                        expected,
                        Origin::Expr(e),
                    ));
                }
                self.conversion_mismatch(actual, expected, e)
            }
            TyId::Class(class) => match actual {
                TyId::Null => Some(value),
                TyId::Class(actual_class) if self.tree.is_subtype(actual_class, class) => {
                    Some(value)
                }
                TyId::Array(_) if class == TreeContext::OBJECT => Some(value),
                TyId::Int | TyId::Long | TyId::Char | TyId::Boolean => {
                    let Some(boxed) = self.tree.boxed_class(actual) else {
                        panic!("Primitive without a box class.");
                    };
                    if self.tree.is_subtype(boxed, class) {
                        return Some(self.append(
                            NodeKind::Boxing { operand: value },
                            TyId::Class(boxed),
                            Origin::Expr(e),
                        ));
                    }
                    self.conversion_mismatch(actual, expected, e)
                }
                _ => self.conversion_mismatch(actual, expected, e),
            },
            TyId::Array(_) => match actual {
                TyId::Null => Some(value),
                _ => self.conversion_mismatch(actual, expected, e),
            },
            TyId::Void | TyId::Null => self.conversion_mismatch(actual, expected, e),
        }
    }

    /// The conversions an explicit cast permits on top of [`Lowering::adapt`]:
    /// narrowing between primitives and checked reference downcasts.
    fn coerce(&mut self, value: NodeId, expected: TyId, e: ExprId) -> Option<NodeId> {
        let actual = self.node_ty(value);
        if actual == expected {
            return Some(value);
        }
        match (actual, expected) {
            (TyId::Long, TyId::Int | TyId::Char) | (TyId::Int, TyId::Char) => {
                Some(self.append(
                    NodeKind::NarrowingConversion { operand: value },
                    expected,
                    Origin::Expr(e),
                ))
            }
            (TyId::Class(from), TyId::Class(to)) if self.tree.is_subtype(from, to) => {
                // An upcast always succeeds; the node records the new
                // static type without exceptional edges.
                Some(self.append(
                    NodeKind::TypeCast { operand: value },
                    expected,
                    Origin::Expr(e),
                ))
            }
            (TyId::Class(from), TyId::Class(to)) if self.tree.is_subtype(to, from) => {
                Some(self.append_faulting(
                    NodeKind::TypeCast { operand: value },
                    expected,
                    Origin::Expr(e),
                    &[CLASS_CAST],
                ))
            }
            (TyId::Class(from), TyId::Int | TyId::Long | TyId::Char | TyId::Boolean)
                if self.tree.unboxed_type(from).is_none() =>
            {
                // Casting e.g. an Object down to int goes through the box
                // class first.
                let Some(boxed) = self.tree.boxed_class(expected) else {
                    panic!("Primitive without a box class.");
                };
                if !self.tree.is_subtype(boxed, from) {
                    return self.conversion_mismatch(actual, expected, e);
                }
                let cast = self.append_faulting(
                    NodeKind::TypeCast { operand: value },
                    TyId::Class(boxed),
                    Origin::Expr(e),
                    &[CLASS_CAST],
                );
                Some(self.append_faulting(
                    NodeKind::Unboxing { operand: cast },
                    expected,
                    Origin::Expr(e),
                    &[NPE],
                ))
            }
            (TyId::Class(from), TyId::Array(_)) if from == TreeContext::OBJECT => {
                Some(self.append_faulting(
                    NodeKind::TypeCast { operand: value },
                    expected,
                    Origin::Expr(e),
                    &[CLASS_CAST],
                ))
            }
            _ => self.adapt(value, expected, e),
        }
    }

    fn conversion_mismatch(&mut self, actual: TyId, expected: TyId, e: ExprId) -> Option<NodeId> {
        let line = self.tree.expr(e).line;
        let from = self.tree.type_name(actual);
        let to = self.tree.type_name(expected);
        self.fault(line, "conversion", &format!("cannot convert {from} to {to}."));
        None
    }
}

fn widens(from: TyId, to: TyId) -> bool {
    matches!(
        (from, to),
        (TyId::Char, TyId::Int) | (TyId::Char, TyId::Long) | (TyId::Int, TyId::Long)
    )
}

fn write_causes(lvalue: &Lvalue) -> Vec<ClassId> {
    match lvalue {
        Lvalue::Local(_) => Vec::new(),
        Lvalue::Field { .. } => vec![NPE],
        Lvalue::Index { .. } => vec![NPE, OUT_OF_BOUNDS],
    }
}

fn stmt_name(kind: &StmtKind) -> &'static str {
    match kind {
        StmtKind::Expr(_) => "expression",
        StmtKind::VarDecl { .. } => "declaration",
        StmtKind::If { .. } => "if",
        StmtKind::While { .. } => "while",
        StmtKind::DoWhile { .. } => "do",
        StmtKind::For { .. } => "for",
        StmtKind::Switch { .. } => "switch",
        StmtKind::Try { .. } => "try",
        StmtKind::Throw(_) => "throw",
        StmtKind::Return(_) => "return",
        StmtKind::Break => "break",
        StmtKind::Continue => "continue",
        StmtKind::Block(_) => "block",
        StmtKind::Empty => "';'",
    }
}
