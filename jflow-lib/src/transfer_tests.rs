use analysis::cfg::OpPos;
use analysis::domains::{Flat, Lattice, Map, MapCtx, SignDomain};
use analysis::solvers::{SolveMonotone, TransferResult};
use utils::DiagnosticEmitter;

use super::builder::CfgBuilder;
use super::cfg::{Cfg, print_with_annotations};
use super::node::{Node, NodeId, NodeKind, Variable};
use super::transfer::{NodeTransferAdapter, TransferInput, annotations_from_analysis_results};
use super::tree::*;
use super::visit::NodeVisitor;

fn build(tree: &TreeContext, unit: Unit) -> Result<Cfg, String> {
    let mut diag = DiagnosticEmitter::log_to_buffer();
    let Some(cfg) = CfgBuilder::new(tree, &mut diag).build(unit)
    else {
        return Err(diag.out_buffer().unwrap() + &diag.err_buffer().unwrap());
    };
    Ok(cfg)
}

type SignStore = Map<Variable, SignDomain>;

/// Forward sign propagation over the local store. Assignments bind the
/// sign of their right hand side; comparisons against a side of known
/// sign narrow the other side on the true branch. Unknown variables read
/// as top, so formals need no declarations.
struct SignAnalysis;

impl SignAnalysis {
    fn sign_of(
        id: NodeId,
        cfg: &Cfg,
        ctx: &MapCtx<Variable, SignDomain>,
        state: &SignStore,
    ) -> SignDomain {
        match &cfg.node(id).kind {
            NodeKind::IntegerLiteral(value) => SignDomain::from(*value),
            NodeKind::LongLiteral(value) => SignDomain::from(*value),
            NodeKind::LocalVariable(variable) => state.get_or_top(variable, ctx),
            NodeKind::NumericalMinus { operand } => -Self::sign_of(*operand, cfg, ctx, state),
            NodeKind::NumericalAddition { lhs, rhs } => {
                Self::sign_of(*lhs, cfg, ctx, state) + Self::sign_of(*rhs, cfg, ctx, state)
            }
            NodeKind::NumericalSubtraction { lhs, rhs } => {
                Self::sign_of(*lhs, cfg, ctx, state) - Self::sign_of(*rhs, cfg, ctx, state)
            }
            NodeKind::NumericalMultiplication { lhs, rhs } => {
                Self::sign_of(*lhs, cfg, ctx, state) * Self::sign_of(*rhs, cfg, ctx, state)
            }
            NodeKind::WideningConversion { operand }
            | NodeKind::NarrowingConversion { operand }
            | NodeKind::Boxing { operand }
            | NodeKind::Unboxing { operand } => Self::sign_of(*operand, cfg, ctx, state),
            _ => SignDomain::Top,
        }
    }

    /// Narrows the binding of `target` when the node reads a variable.
    fn narrow(
        target: NodeId,
        sign: SignDomain,
        input: &TransferInput<SignStore>,
        state: &mut SignStore,
    ) {
        if let NodeKind::LocalVariable(variable) = &input.cfg.node(target).kind {
            let narrowed = state
                .get_or_top(variable, input.ctx)
                .meet(&sign, &input.ctx.1);
            state.insert(*variable, narrowed);
        }
    }

    fn split(
        then_state: SignStore,
        input: &TransferInput<SignStore>,
    ) -> TransferResult<SignStore> {
        if then_state == *input.pre_state {
            return TransferResult::Regular(then_state);
        }
        TransferResult::Conditional {
            then_state,
            else_state: input.pre_state.clone(),
        }
    }
}

impl<'a> NodeVisitor<TransferInput<'a, SignStore>> for SignAnalysis {
    type Output = TransferResult<SignStore>;

    fn default_visit(
        &mut self,
        _id: NodeId,
        _node: &Node,
        input: TransferInput<'a, SignStore>,
    ) -> Self::Output {
        TransferResult::Regular(input.pre_state.clone())
    }

    fn visit_assignment(
        &mut self,
        _id: NodeId,
        node: &Node,
        input: TransferInput<'a, SignStore>,
    ) -> Self::Output {
        let NodeKind::Assignment { target, expression } = &node.kind else {
            unreachable!();
        };
        let mut state = input.pre_state.clone();
        if let NodeKind::LocalVariable(variable) = &input.cfg.node(*target).kind {
            let sign = Self::sign_of(*expression, input.cfg, input.ctx, input.pre_state);
            state.insert(*variable, sign);
        }
        TransferResult::Regular(state)
    }

    fn visit_equal_to(
        &mut self,
        _id: NodeId,
        node: &Node,
        input: TransferInput<'a, SignStore>,
    ) -> Self::Output {
        let NodeKind::EqualTo { lhs, rhs } = &node.kind else {
            unreachable!();
        };
        // On the true branch both sides share their signs.
        let lhs_sign = Self::sign_of(*lhs, input.cfg, input.ctx, input.pre_state);
        let rhs_sign = Self::sign_of(*rhs, input.cfg, input.ctx, input.pre_state);
        let mut then_state = input.pre_state.clone();
        Self::narrow(*lhs, rhs_sign, &input, &mut then_state);
        Self::narrow(*rhs, lhs_sign, &input, &mut then_state);
        Self::split(then_state, &input)
    }

    fn visit_greater_than(
        &mut self,
        _id: NodeId,
        node: &Node,
        input: TransferInput<'a, SignStore>,
    ) -> Self::Output {
        let NodeKind::GreaterThan { lhs, rhs } = &node.kind else {
            unreachable!();
        };
        let mut then_state = input.pre_state.clone();
        if Self::sign_of(*rhs, input.cfg, input.ctx, input.pre_state) == SignDomain::Zero {
            Self::narrow(*lhs, SignDomain::Positive, &input, &mut then_state);
        }
        if Self::sign_of(*lhs, input.cfg, input.ctx, input.pre_state) == SignDomain::Zero {
            Self::narrow(*rhs, SignDomain::Negative, &input, &mut then_state);
        }
        Self::split(then_state, &input)
    }

    fn visit_less_than(
        &mut self,
        _id: NodeId,
        node: &Node,
        input: TransferInput<'a, SignStore>,
    ) -> Self::Output {
        let NodeKind::LessThan { lhs, rhs } = &node.kind else {
            unreachable!();
        };
        let mut then_state = input.pre_state.clone();
        if Self::sign_of(*rhs, input.cfg, input.ctx, input.pre_state) == SignDomain::Zero {
            Self::narrow(*lhs, SignDomain::Negative, &input, &mut then_state);
        }
        if Self::sign_of(*lhs, input.cfg, input.ctx, input.pre_state) == SignDomain::Zero {
            Self::narrow(*rhs, SignDomain::Positive, &input, &mut then_state);
        }
        Self::split(then_state, &input)
    }
}

type ConstStore = Map<Variable, Flat<i64>>;

/// Classic constant propagation: assignments bind the folded value of
/// their right hand side, joining different constants loses the value.
struct ConstantFolding;

impl ConstantFolding {
    fn value_of(
        id: NodeId,
        cfg: &Cfg,
        ctx: &MapCtx<Variable, Flat<i64>>,
        state: &ConstStore,
    ) -> Flat<i64> {
        let fold = |lhs: Flat<i64>, rhs: Flat<i64>, op: fn(i64, i64) -> i64| match (lhs, rhs) {
            (Flat::Bottom, _) | (_, Flat::Bottom) => Flat::Bottom,
            (Flat::Element(a), Flat::Element(b)) => Flat::Element(op(a, b)),
            _ => Flat::Top,
        };
        match &cfg.node(id).kind {
            NodeKind::IntegerLiteral(value) => Flat::Element(i64::from(*value)),
            NodeKind::LongLiteral(value) => Flat::Element(*value),
            NodeKind::LocalVariable(variable) => state.get_or_top(variable, ctx),
            NodeKind::NumericalMinus { operand } => {
                match Self::value_of(*operand, cfg, ctx, state) {
                    Flat::Element(value) => Flat::Element(value.wrapping_neg()),
                    other => other,
                }
            }
            NodeKind::NumericalAddition { lhs, rhs } => fold(
                Self::value_of(*lhs, cfg, ctx, state),
                Self::value_of(*rhs, cfg, ctx, state),
                i64::wrapping_add,
            ),
            NodeKind::NumericalSubtraction { lhs, rhs } => fold(
                Self::value_of(*lhs, cfg, ctx, state),
                Self::value_of(*rhs, cfg, ctx, state),
                i64::wrapping_sub,
            ),
            NodeKind::NumericalMultiplication { lhs, rhs } => fold(
                Self::value_of(*lhs, cfg, ctx, state),
                Self::value_of(*rhs, cfg, ctx, state),
                i64::wrapping_mul,
            ),
            NodeKind::WideningConversion { operand }
            | NodeKind::NarrowingConversion { operand } => {
                Self::value_of(*operand, cfg, ctx, state)
            }
            _ => Flat::Top,
        }
    }
}

impl<'a> NodeVisitor<TransferInput<'a, ConstStore>> for ConstantFolding {
    type Output = TransferResult<ConstStore>;

    fn default_visit(
        &mut self,
        _id: NodeId,
        _node: &Node,
        input: TransferInput<'a, ConstStore>,
    ) -> Self::Output {
        TransferResult::Regular(input.pre_state.clone())
    }

    fn visit_assignment(
        &mut self,
        _id: NodeId,
        node: &Node,
        input: TransferInput<'a, ConstStore>,
    ) -> Self::Output {
        let NodeKind::Assignment { target, expression } = &node.kind else {
            unreachable!();
        };
        let mut state = input.pre_state.clone();
        if let NodeKind::LocalVariable(variable) = &input.cfg.node(*target).kind {
            let value = Self::value_of(*expression, input.cfg, input.ctx, input.pre_state);
            state.insert(*variable, value);
        }
        TransferResult::Regular(state)
    }
}

#[test]
fn assignments_propagate_the_seeded_signs() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let x = tree.make_local("x", TyId::Int);
    let y = tree.make_local("y", TyId::Int);
    let target = tree.make_local_ref(y, 1);
    let x_read = tree.make_local_ref(x, 1);
    let assign = tree.make_assign(target, x_read, 1);
    let stmt = tree.make_expr_stmt(assign, 1);
    let result = tree.make_local_ref(y, 2);
    let ret = tree.make_return(Some(result), 2);
    let body = tree.make_block(vec![stmt, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    let ctx: MapCtx<Variable, SignDomain> = MapCtx::for_join_semi_lattice();
    let mut seed: SignStore = Map::new();
    seed.insert(Variable::Local(x), SignDomain::Negative);
    let mut transfer = NodeTransferAdapter(SignAnalysis);
    let states = SolveMonotone::default()
        .solve(&cfg, seed, &ctx, &mut transfer)
        .unwrap();

    let anns = annotations_from_analysis_results(&cfg, &tree, &ctx, &mut transfer, &states);
    let expected = r"bb0:
  succs: bb3
bb1:
bb2:
bb3:
  n0 = y
  n1 = x
  n2 = n0 = n1 /* y: Negative */
  n3 = y
  n4 = return n3
  succs: bb1
";
    assert_eq!(print_with_annotations(&cfg, &tree, &anns), expected);
    Ok(())
}

#[test]
fn equality_refines_the_true_branch() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let x = tree.make_local("x", TyId::Int);
    let y = tree.make_local("y", TyId::Int);
    let x_read = tree.make_local_ref(x, 1);
    let zero = tree.make_int_lit(0, 1);
    let cond = tree.make_binary(BinOp::Eq, x_read, zero, TyId::Boolean, 1);
    let then_target = tree.make_local_ref(y, 2);
    let x_again = tree.make_local_ref(x, 2);
    let then_assign = tree.make_assign(then_target, x_again, 2);
    let then = tree.make_expr_stmt(then_assign, 2);
    let else_target = tree.make_local_ref(y, 3);
    let two = tree.make_int_lit(2, 3);
    let else_assign = tree.make_assign(else_target, two, 3);
    let els = tree.make_expr_stmt(else_assign, 3);
    let branch = tree.make_if(cond, then, Some(els), 1);
    let result = tree.make_local_ref(y, 4);
    let ret = tree.make_return(Some(result), 4);
    let body = tree.make_block(vec![branch, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    let ctx: MapCtx<Variable, SignDomain> = MapCtx::for_join_semi_lattice();
    let mut transfer = NodeTransferAdapter(SignAnalysis);
    let states = SolveMonotone::default()
        .solve(&cfg, Map::new(), &ctx, &mut transfer)
        .unwrap();

    // Only the true edge carries the x = 0 fact.
    assert_eq!(
        states.pre_states[4].get(&Variable::Local(x)),
        Some(&SignDomain::Zero)
    );
    assert!(states.pre_states[5].get(&Variable::Local(x)).is_none());

    let anns = annotations_from_analysis_results(&cfg, &tree, &ctx, &mut transfer, &states);
    let expected = r"bb0:
  succs: bb3
bb1:
bb2:
bb3:
  n0 = x
  n1 = 0
  n2 = n0 == n1 /* x: Zero */
  br n2
  succs: T:bb4 F:bb5
bb4:
  n3 = y
  n4 = x
  n5 = n3 = n4 /* y: Zero */
  succs: bb6
bb5:
  n6 = y
  n7 = 2
  n8 = n6 = n7 /* y: Positive */
  succs: bb6
bb6:
  n9 = y
  n10 = return n9
  succs: bb1
";
    assert_eq!(print_with_annotations(&cfg, &tree, &anns), expected);
    Ok(())
}

#[test]
fn positive_guard_narrows_the_compared_variable() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let x = tree.make_local("x", TyId::Int);
    let y = tree.make_local("y", TyId::Int);
    let x_read = tree.make_local_ref(x, 1);
    let zero = tree.make_int_lit(0, 1);
    let cond = tree.make_binary(BinOp::Gt, x_read, zero, TyId::Boolean, 1);
    let then_target = tree.make_local_ref(y, 2);
    let x_again = tree.make_local_ref(x, 2);
    let then_assign = tree.make_assign(then_target, x_again, 2);
    let then = tree.make_expr_stmt(then_assign, 2);
    let else_target = tree.make_local_ref(y, 3);
    let x_third = tree.make_local_ref(x, 3);
    let negated = tree.make_unary(UnOp::Neg, x_third, TyId::Int, 3);
    let else_assign = tree.make_assign(else_target, negated, 3);
    let els = tree.make_expr_stmt(else_assign, 3);
    let branch = tree.make_if(cond, then, Some(els), 1);
    let result = tree.make_local_ref(y, 4);
    let ret = tree.make_return(Some(result), 4);
    let body = tree.make_block(vec![branch, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    let ctx: MapCtx<Variable, SignDomain> = MapCtx::for_join_semi_lattice();
    let mut transfer = NodeTransferAdapter(SignAnalysis);
    let states = SolveMonotone::default()
        .solve(&cfg, Map::new(), &ctx, &mut transfer)
        .unwrap();

    let anns = annotations_from_analysis_results(&cfg, &tree, &ctx, &mut transfer, &states);
    let expected = r"bb0:
  succs: bb3
bb1:
bb2:
bb3:
  n0 = x
  n1 = 0
  n2 = n0 > n1 /* x: Positive */
  br n2
  succs: T:bb4 F:bb5
bb4:
  n3 = y
  n4 = x
  n5 = n3 = n4 /* y: Positive */
  succs: bb6
bb5:
  n6 = y
  n7 = x
  n8 = -n7
  n9 = n6 = n8 /* y: Top */
  succs: bb6
bb6:
  n10 = y
  n11 = return n10
  succs: bb1
";
    assert_eq!(print_with_annotations(&cfg, &tree, &anns), expected);
    Ok(())
}

#[test]
fn refinements_reach_short_circuit_operands() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let x = tree.make_local("x", TyId::Int);
    let y = tree.make_local("y", TyId::Int);
    let z = tree.make_local("z", TyId::Int);
    let x_read = tree.make_local_ref(x, 1);
    let zero_x = tree.make_int_lit(0, 1);
    let x_is_zero = tree.make_binary(BinOp::Eq, x_read, zero_x, TyId::Boolean, 1);
    let y_read = tree.make_local_ref(y, 1);
    let zero_y = tree.make_int_lit(0, 1);
    let y_is_zero = tree.make_binary(BinOp::Eq, y_read, zero_y, TyId::Boolean, 1);
    let cond = tree.make_binary(BinOp::And, x_is_zero, y_is_zero, TyId::Boolean, 1);
    let target = tree.make_local_ref(z, 2);
    let x_again = tree.make_local_ref(x, 2);
    let y_again = tree.make_local_ref(y, 2);
    let sum = tree.make_binary(BinOp::Add, x_again, y_again, TyId::Int, 2);
    let assign = tree.make_assign(target, sum, 2);
    let then = tree.make_expr_stmt(assign, 2);
    let branch = tree.make_if(cond, then, None, 1);
    let result = tree.make_local_ref(z, 3);
    let ret = tree.make_return(Some(result), 3);
    let body = tree.make_block(vec![branch, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    let ctx: MapCtx<Variable, SignDomain> = MapCtx::for_join_semi_lattice();
    let mut transfer = NodeTransferAdapter(SignAnalysis);
    let states = SolveMonotone::default()
        .solve(&cfg, Map::new(), &ctx, &mut transfer)
        .unwrap();

    // The right operand's block bb6 only runs when x == 0 held, and the
    // then block bb4 sees both facts.
    assert_eq!(
        states.pre_states[6].get(&Variable::Local(x)),
        Some(&SignDomain::Zero)
    );
    assert_eq!(
        states.pre_states[4].get(&Variable::Local(x)),
        Some(&SignDomain::Zero)
    );
    assert_eq!(
        states.pre_states[4].get(&Variable::Local(y)),
        Some(&SignDomain::Zero)
    );

    let anns = annotations_from_analysis_results(&cfg, &tree, &ctx, &mut transfer, &states);
    let expected = r"bb0:
  succs: bb3
bb1:
bb2:
bb3:
  n0 = x
  n1 = 0
  n2 = n0 == n1 /* x: Zero */
  br n2
  succs: T:bb6 F:bb5
bb4:
  n6 = z
  n7 = x
  n8 = y
  n9 = n7 + n8
  n10 = n6 = n9 /* z: Zero */
  succs: bb5
bb5:
  n11 = z
  n12 = return n11
  succs: bb1
bb6:
  n3 = y
  n4 = 0
  n5 = n3 == n4 /* y: Zero */
  br n5
  succs: T:bb4 F:bb5
";
    assert_eq!(print_with_annotations(&cfg, &tree, &anns), expected);
    Ok(())
}

#[test]
fn loop_stores_converge_to_their_fixpoint() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let i = tree.make_local("i", TyId::Int);
    let zero = tree.make_int_lit(0, 1);
    let decl = tree.make_var_decl(i, Some(zero), 1);
    let i_read = tree.make_local_ref(i, 2);
    let ten = tree.make_int_lit(10, 2);
    let cond = tree.make_binary(BinOp::Lt, i_read, ten, TyId::Boolean, 2);
    let target = tree.make_local_ref(i, 3);
    let i_again = tree.make_local_ref(i, 3);
    let one = tree.make_int_lit(1, 3);
    let sum = tree.make_binary(BinOp::Add, i_again, one, TyId::Int, 3);
    let assign = tree.make_assign(target, sum, 3);
    let loop_body = tree.make_expr_stmt(assign, 3);
    let while_stmt = tree.make_while(cond, loop_body, 2);
    let result = tree.make_local_ref(i, 4);
    let ret = tree.make_return(Some(result), 4);
    let body = tree.make_block(vec![decl, while_stmt, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    let ctx: MapCtx<Variable, SignDomain> = MapCtx::for_join_semi_lattice();
    let mut transfer = NodeTransferAdapter(SignAnalysis);
    let states = SolveMonotone::default()
        .solve(&cfg, Map::new(), &ctx, &mut transfer)
        .unwrap();

    // Zero from the initializer joins Positive from the back edge.
    let header = OpPos {
        block_id: 4,
        op_id: 2,
    };
    let before = states.before_op(header, &cfg, &ctx, &mut transfer);
    assert_eq!(before.get(&Variable::Local(i)), Some(&SignDomain::Top));
    let init = OpPos {
        block_id: 3,
        op_id: 3,
    };
    let after = states.after_op(init, &cfg, &ctx, &mut transfer);
    assert_eq!(after.get(&Variable::Local(i)), Some(&SignDomain::Zero));

    // The replay reports the fixpoint: the increment writes top over top,
    // so only the initializer annotates.
    let anns = annotations_from_analysis_results(&cfg, &tree, &ctx, &mut transfer, &states);
    let expected = r"bb0:
  succs: bb3
bb1:
bb2:
bb3:
  n0 = var i
  n1 = i
  n2 = 0
  n3 = n1 = n2 /* i: Zero */
  succs: bb4
bb4:
  n4 = i
  n5 = 10
  n6 = n4 < n5
  br n6
  succs: T:bb5 F:bb6
bb5:
  n7 = i
  n8 = i
  n9 = 1
  n10 = n8 + n9
  n11 = n7 = n10
  succs: bb4
bb6:
  n12 = i
  n13 = return n12
  succs: bb1
";
    assert_eq!(print_with_annotations(&cfg, &tree, &anns), expected);
    Ok(())
}

#[test]
fn exhausted_iteration_budget_yields_no_result() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let i = tree.make_local("i", TyId::Int);
    let zero = tree.make_int_lit(0, 1);
    let decl = tree.make_var_decl(i, Some(zero), 1);
    let i_read = tree.make_local_ref(i, 2);
    let ten = tree.make_int_lit(10, 2);
    let cond = tree.make_binary(BinOp::Lt, i_read, ten, TyId::Boolean, 2);
    let target = tree.make_local_ref(i, 3);
    let i_again = tree.make_local_ref(i, 3);
    let one = tree.make_int_lit(1, 3);
    let sum = tree.make_binary(BinOp::Add, i_again, one, TyId::Int, 3);
    let assign = tree.make_assign(target, sum, 3);
    let loop_body = tree.make_expr_stmt(assign, 3);
    let while_stmt = tree.make_while(cond, loop_body, 2);
    let ret = tree.make_return(None, 4);
    let body = tree.make_block(vec![decl, while_stmt, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    // The back edge needs a second visit of the header and the body; one
    // pass per block is not enough.
    let ctx: MapCtx<Variable, SignDomain> = MapCtx::for_join_semi_lattice();
    let mut transfer = NodeTransferAdapter(SignAnalysis);
    let limited = SolveMonotone { node_limit: 1 }.solve(&cfg, Map::new(), &ctx, &mut transfer);
    assert!(limited.is_none());
    Ok(())
}

#[test]
fn handlers_observe_the_state_before_the_fault() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let d = tree.make_local("d", TyId::Int);
    let x = tree.make_local("x", TyId::Int);
    let q = tree.make_local("q", TyId::Int);
    let e = tree.make_local("e", TyId::Class(TreeContext::ARITHMETIC_EXCEPTION));

    let zero = tree.make_int_lit(0, 1);
    let decl_x = tree.make_var_decl(x, Some(zero), 1);

    let t1 = tree.make_local_ref(x, 3);
    let one = tree.make_int_lit(1, 3);
    let a1 = tree.make_assign(t1, one, 3);
    let s1 = tree.make_expr_stmt(a1, 3);
    let ten = tree.make_int_lit(10, 4);
    let d_read = tree.make_local_ref(d, 4);
    let div = tree.make_binary(BinOp::Div, ten, d_read, TyId::Int, 4);
    let decl_q = tree.make_var_decl(q, Some(div), 4);
    let t2 = tree.make_local_ref(x, 5);
    let zero_again = tree.make_int_lit(0, 5);
    let a2 = tree.make_assign(t2, zero_again, 5);
    let s2 = tree.make_expr_stmt(a2, 5);
    let try_body = tree.make_block(vec![s1, decl_q, s2], 2);

    let t3 = tree.make_local_ref(x, 7);
    let minus_one = tree.make_int_lit(-1, 7);
    let a3 = tree.make_assign(t3, minus_one, 7);
    let catch_body = tree.make_expr_stmt(a3, 7);
    let try_stmt = tree.make_try(
        try_body,
        vec![CatchClause {
            exception: TreeContext::ARITHMETIC_EXCEPTION,
            binding: e,
            body: catch_body,
        }],
        None,
        2,
    );
    let result = tree.make_local_ref(x, 9);
    let ret = tree.make_return(Some(result), 9);
    let body = tree.make_block(vec![decl_x, try_stmt, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    let ctx: MapCtx<Variable, SignDomain> = MapCtx::for_join_semi_lattice();
    let mut transfer = NodeTransferAdapter(SignAnalysis);
    let states = SolveMonotone::default()
        .solve(&cfg, Map::new(), &ctx, &mut transfer)
        .unwrap();

    // The exceptional edge carries the store from before the division:
    // the handler sees the x = 1 write but never the x = 0 one.
    assert_eq!(
        states.pre_states[4].get(&Variable::Local(x)),
        Some(&SignDomain::Positive)
    );
    assert_eq!(
        states.pre_states[6].get(&Variable::Local(x)),
        Some(&SignDomain::Top)
    );

    let anns = annotations_from_analysis_results(&cfg, &tree, &ctx, &mut transfer, &states);
    let expected = r"bb0:
  succs: bb3
bb1:
bb2:
bb3:
  n0 = var x
  n1 = x
  n2 = 0
  n3 = n1 = n2 /* x: Zero */
  n4 = x
  n5 = 1
  n6 = n4 = n5 /* x: Positive */
  n7 = var q
  n8 = q
  n9 = 10
  n10 = d
  n11 = n9 / n10
  succs: exc(ArithmeticException):bb4 bb5
bb4:
  n16 = var e
  n17 = x
  n18 = -1
  n19 = n17 = n18 /* x: Negative */
  succs: bb6
bb5:
  n12 = n8 = n11 /* q: Top */
  n13 = x
  n14 = 0
  n15 = n13 = n14 /* x: Zero */
  succs: bb6
bb6:
  n20 = x
  n21 = return n20
  succs: bb1
";
    assert_eq!(print_with_annotations(&cfg, &tree, &anns), expected);
    Ok(())
}

#[test]
fn constants_fold_along_straight_line_code() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let a = tree.make_local("a", TyId::Int);
    let b = tree.make_local("b", TyId::Int);
    let three = tree.make_int_lit(3, 1);
    let decl_a = tree.make_var_decl(a, Some(three), 1);
    let a_read = tree.make_local_ref(a, 2);
    let two = tree.make_int_lit(2, 2);
    let product = tree.make_binary(BinOp::Mul, a_read, two, TyId::Int, 2);
    let one = tree.make_int_lit(1, 2);
    let sum = tree.make_binary(BinOp::Add, product, one, TyId::Int, 2);
    let decl_b = tree.make_var_decl(b, Some(sum), 2);
    let result = tree.make_local_ref(b, 3);
    let ret = tree.make_return(Some(result), 3);
    let body = tree.make_block(vec![decl_a, decl_b, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    let ctx: MapCtx<Variable, Flat<i64>> = MapCtx::for_join_semi_lattice();
    let mut transfer = NodeTransferAdapter(ConstantFolding);
    let states = SolveMonotone::default()
        .solve(&cfg, Map::new(), &ctx, &mut transfer)
        .unwrap();

    let anns = annotations_from_analysis_results(&cfg, &tree, &ctx, &mut transfer, &states);
    let expected = r"bb0:
  succs: bb3
bb1:
bb2:
bb3:
  n0 = var a
  n1 = a
  n2 = 3
  n3 = n1 = n2 /* a: Element(3) */
  n4 = var b
  n5 = b
  n6 = a
  n7 = 2
  n8 = n6 * n7
  n9 = 1
  n10 = n8 + n9
  n11 = n5 = n10 /* b: Element(7) */
  n12 = b
  n13 = return n12
  succs: bb1
";
    assert_eq!(print_with_annotations(&cfg, &tree, &anns), expected);
    Ok(())
}

#[test]
fn joining_different_constants_loses_the_value() -> Result<(), String> {
    let mut tree = TreeContext::new();
    let c = tree.make_local("c", TyId::Boolean);
    let k = tree.make_local("k", TyId::Int);
    let m = tree.make_local("m", TyId::Int);
    let decl_k = tree.make_var_decl(k, None, 1);
    let cond = tree.make_local_ref(c, 2);
    let t1 = tree.make_local_ref(k, 3);
    let one = tree.make_int_lit(1, 3);
    let a1 = tree.make_assign(t1, one, 3);
    let then = tree.make_expr_stmt(a1, 3);
    let t2 = tree.make_local_ref(k, 4);
    let two = tree.make_int_lit(2, 4);
    let a2 = tree.make_assign(t2, two, 4);
    let els = tree.make_expr_stmt(a2, 4);
    let branch = tree.make_if(cond, then, Some(els), 2);
    let k_read = tree.make_local_ref(k, 5);
    let one_more = tree.make_int_lit(1, 5);
    let sum = tree.make_binary(BinOp::Add, k_read, one_more, TyId::Int, 5);
    let decl_m = tree.make_var_decl(m, Some(sum), 5);
    let result = tree.make_local_ref(m, 6);
    let ret = tree.make_return(Some(result), 6);
    let body = tree.make_block(vec![decl_k, branch, decl_m, ret], 1);
    let cfg = build(&tree, Unit::Method(body))?;

    let ctx: MapCtx<Variable, Flat<i64>> = MapCtx::for_join_semi_lattice();
    let mut transfer = NodeTransferAdapter(ConstantFolding);
    let states = SolveMonotone::default()
        .solve(&cfg, Map::new(), &ctx, &mut transfer)
        .unwrap();

    assert_eq!(states.pre_states[6].get(&Variable::Local(k)), Some(&Flat::Top));

    let anns = annotations_from_analysis_results(&cfg, &tree, &ctx, &mut transfer, &states);
    let expected = r"bb0:
  succs: bb3
bb1:
bb2:
bb3:
  n0 = var k
  n1 = c
  br n1
  succs: T:bb4 F:bb5
bb4:
  n2 = k
  n3 = 1
  n4 = n2 = n3 /* k: Element(1) */
  succs: bb6
bb5:
  n5 = k
  n6 = 2
  n7 = n5 = n6 /* k: Element(2) */
  succs: bb6
bb6:
  n8 = var m
  n9 = m
  n10 = k
  n11 = 1
  n12 = n10 + n11
  n13 = n9 = n12 /* m: Top */
  n14 = m
  n15 = return n14
  succs: bb1
";
    assert_eq!(print_with_annotations(&cfg, &tree, &anns), expected);
    Ok(())
}
