use core::cmp::Ordering;
use core::marker::PhantomData;

use super::cfg::{CfgBlock, CfgEdge, ControlFlowGraph, EdgeKind, OpPos, RPOWorklist};
use super::domains::JoinSemiLattice;

/// The result of transferring one operation. Most operations produce a
/// single state; the operation terminating a block with true/false
/// successors may produce a two-way split so the solver can propagate
/// different refinements along the two branches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferResult<D> {
    Regular(D),
    Conditional { then_state: D, else_state: D },
}

impl<D: JoinSemiLattice> TransferResult<D> {
    /// Collapse a split into a single state by joining the branches.
    pub fn into_regular(self, ctx: &D::LatticeContext) -> D {
        match self {
            TransferResult::Regular(state) => state,
            TransferResult::Conditional {
                then_state,
                else_state,
            } => then_state.join(&else_state, ctx),
        }
    }
}

/// Transfer functions need to implement this trait. For the most common
/// cases creating an [`OpTransfer`] from a closure should be sufficient.
/// The default implementation is the identity transfer.
pub trait TransferFunction<Cfg, D>
where
    Cfg: ControlFlowGraph,
    D: JoinSemiLattice,
{
    /// Apply the effects of an operation to the analysis state. Returning
    /// [`TransferResult::Conditional`] is only meaningful for the last
    /// operation of a block that has true/false successors; anywhere else
    /// the solver joins the branches right away.
    fn operation(
        &mut self,
        _pos: OpPos,
        _op: &<<Cfg as ControlFlowGraph>::Block as CfgBlock>::Operation,
        _cfg: &Cfg,
        _ctx: &D::LatticeContext,
        pre_state: &D,
    ) -> TransferResult<D> {
        TransferResult::Regular(pre_state.clone())
    }
}

/// A transfer function that never modifies the analysis state. It can be
/// useful to use together with other utilities that can wrap/combine/transform
/// transfer functions.
pub struct NoOpTransfer;

impl<Cfg, D> TransferFunction<Cfg, D> for NoOpTransfer
where
    Cfg: ControlFlowGraph,
    D: JoinSemiLattice,
{
}

/// Small utility so users do not need to create a new struct for every
/// transfer function for operations.
pub struct OpTransfer<F, Cfg, D>
where
    Cfg: ControlFlowGraph,
    D: JoinSemiLattice,
    F: FnMut(
        OpPos,
        &<<Cfg as ControlFlowGraph>::Block as CfgBlock>::Operation,
        &Cfg,
        &D::LatticeContext,
        &D,
    ) -> TransferResult<D>,
{
    func: F,
    phantom: PhantomData<(Cfg, D)>,
}

impl<F, Cfg, D> TransferFunction<Cfg, D> for OpTransfer<F, Cfg, D>
where
    Cfg: ControlFlowGraph,
    D: JoinSemiLattice,
    F: FnMut(
        OpPos,
        &<<Cfg as ControlFlowGraph>::Block as CfgBlock>::Operation,
        &Cfg,
        &D::LatticeContext,
        &D,
    ) -> TransferResult<D>,
{
    fn operation(
        &mut self,
        pos: OpPos,
        op: &<<Cfg as ControlFlowGraph>::Block as CfgBlock>::Operation,
        cfg: &Cfg,
        ctx: &<D as JoinSemiLattice>::LatticeContext,
        pre_state: &D,
    ) -> TransferResult<D> {
        (self.func)(pos, op, cfg, ctx, pre_state)
    }
}

impl<F, Cfg, D> OpTransfer<F, Cfg, D>
where
    Cfg: ControlFlowGraph,
    D: JoinSemiLattice,
    F: FnMut(
        OpPos,
        &<<Cfg as ControlFlowGraph>::Block as CfgBlock>::Operation,
        &Cfg,
        &D::LatticeContext,
        &D,
    ) -> TransferResult<D>,
{
    /// Create a new transfer function for operations from a closure or function.
    pub fn new(func: F) -> Self {
        Self {
            func,
            phantom: PhantomData,
        }
    }
}

/// The analysis states at the block boundaries. Only the states at the
/// boundaries are stored; the state at an operation inside a block is
/// recomputed on demand by replaying the transfer function over the
/// block prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisStates<D> {
    /// The state on entry of each block, the join of what the incoming
    /// edges carry.
    pub pre_states: Vec<D>,
    /// The state after the last operation of each block. For a block
    /// whose transfer ends in a split this is the join of the branches.
    pub post_states: Vec<D>,
}

impl<D: JoinSemiLattice> AnalysisStates<D> {
    pub fn new<Cfg: ControlFlowGraph>(cfg: &Cfg, ctx: &D::LatticeContext) -> Self {
        Self {
            pre_states: vec![D::bottom(ctx); cfg.blocks().len()],
            post_states: vec![D::bottom(ctx); cfg.blocks().len()],
        }
    }

    /// The state right before the operation at `pos`. Splits of earlier
    /// operations in the block are joined during the replay.
    pub fn before_op<Cfg, F>(
        &self,
        pos: OpPos,
        cfg: &Cfg,
        ctx: &D::LatticeContext,
        transfer: &mut F,
    ) -> D
    where
        Cfg: ControlFlowGraph,
        F: TransferFunction<Cfg, D>,
    {
        self.replay(pos.block_id, pos.op_id, cfg, ctx, transfer)
    }

    /// The state right after the operation at `pos`.
    pub fn after_op<Cfg, F>(
        &self,
        pos: OpPos,
        cfg: &Cfg,
        ctx: &D::LatticeContext,
        transfer: &mut F,
    ) -> D
    where
        Cfg: ControlFlowGraph,
        F: TransferFunction<Cfg, D>,
    {
        self.replay(pos.block_id, pos.op_id + 1, cfg, ctx, transfer)
    }

    fn replay<Cfg, F>(
        &self,
        block_id: usize,
        op_num: usize,
        cfg: &Cfg,
        ctx: &D::LatticeContext,
        transfer: &mut F,
    ) -> D
    where
        Cfg: ControlFlowGraph,
        F: TransferFunction<Cfg, D>,
    {
        let mut state = self.pre_states[block_id].clone();
        let ops = cfg.blocks()[block_id].operations();
        for (op_id, op) in ops.iter().take(op_num).enumerate() {
            state = transfer
                .operation(OpPos { block_id, op_id }, op, cfg, ctx, &state)
                .into_regular(ctx);
        }
        state
    }
}

/// A basic solver for monotonic transfer functions. The solver is using a
/// worklist that visits the queued nodes in reverse post-order and runs
/// until the analysis states stop changing.
///
/// Propagation along the outgoing edges of a block depends on the kind of
/// the edge:
/// * normal edges carry the state after the last operation,
/// * true/false edges carry the corresponding branch of a
///   [`TransferResult::Conditional`] (or the regular state when the
///   transfer did not split),
/// * exceptional edges carry the state *before* the last operation of the
///   block, since the operation that raised the exception never completed.
///
/// Requirements:
/// * The transfer function must be monotone.
/// * The domain must have finite height; there is no widening, domains
///   with very long chains will exhaust the iteration budget and the
///   solver returns no result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SolveMonotone {
    /// Set the approximate iteration limit per node. If the limit is reached
    /// (the analysis did not converge in the permitted number of steps),
    /// the solver terminates without a result.
    pub node_limit: usize,
}

impl Default for SolveMonotone {
    fn default() -> Self {
        Self { node_limit: 20 }
    }
}

impl SolveMonotone {
    /// Run the solver on a CFG mutating the analysis states in place. The
    /// return value is false when the analysis did not converge. The caller
    /// seeds the analysis by placing the initial state into the pre-state
    /// of the entry block.
    pub fn solve_in_place<Cfg, D, F>(
        self,
        cfg: &Cfg,
        lat_ctx: &D::LatticeContext,
        states: &mut AnalysisStates<D>,
        transfer: &mut F,
    ) -> bool
    where
        Cfg: ControlFlowGraph,
        D: JoinSemiLattice,
        F: TransferFunction<Cfg, D>,
    {
        let node_num = cfg.blocks().len();
        assert_eq!(states.pre_states.len(), node_num);
        assert_eq!(states.post_states.len(), node_num);
        if node_num == 0 {
            return true;
        }

        let mut visited = vec![false; node_num];
        let mut worklist = RPOWorklist::new(cfg);
        worklist.push(0);

        let limit = self.node_limit * node_num;
        let mut processed_nodes = 0_usize;
        while let Some(current) = worklist.pop() {
            if limit > 0 && processed_nodes >= limit {
                return false;
            }
            processed_nodes += 1;
            visited[current] = true;

            let block = &cfg.blocks()[current];
            let ops = block.operations();
            let mut state = states.pre_states[current].clone();
            let mut split = None;
            let mut before_last = state.clone();
            for (op_id, op) in ops.iter().enumerate() {
                let pos = OpPos {
                    block_id: current,
                    op_id,
                };
                before_last = state.clone();
                match transfer.operation(pos, op, cfg, lat_ctx, &state) {
                    TransferResult::Regular(next) => state = next,
                    TransferResult::Conditional {
                        then_state,
                        else_state,
                    } => {
                        state = then_state.join(&else_state, lat_ctx);
                        // Only the split of the last operation survives;
                        // mid-block splits collapse into the join.
                        split = if op_id + 1 == ops.len() {
                            Some((then_state, else_state))
                        } else {
                            None
                        };
                    }
                }
            }
            states.post_states[current] = state;

            for edge in block.successors() {
                let to = edge.target();
                let candidate = match edge.kind() {
                    EdgeKind::Normal => &states.post_states[current],
                    EdgeKind::True => split
                        .as_ref()
                        .map_or(&states.post_states[current], |(then_state, _)| then_state),
                    EdgeKind::False => split
                        .as_ref()
                        .map_or(&states.post_states[current], |(_, else_state)| else_state),
                    EdgeKind::Exceptional => &before_last,
                };
                let joined = states.pre_states[to].join(candidate, lat_ctx);
                debug_assert!(
                    matches!(
                        joined.partial_cmp(&states.pre_states[to]),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    "Non-monotone join on the edge from block {current} to block {to}."
                );
                if !visited[to] || joined != states.pre_states[to] {
                    states.pre_states[to] = joined;
                    worklist.push(to);
                }
            }
        }
        true
    }

    /// Run the solver on a CFG returning the analysis states at the
    /// boundaries of each basic block. Returns `None` when the analysis
    /// did not converge.
    ///
    /// # Arguments
    ///
    /// * `seed` - The initial program state for the entry block. This often
    ///   has the initial abstract values for the formal parameters of a
    ///   function.
    /// * `transfer` - Function to apply the effects of the operations.
    pub fn solve<Cfg, D, F>(
        self,
        cfg: &Cfg,
        seed: D,
        lat_ctx: &D::LatticeContext,
        transfer: &mut F,
    ) -> Option<AnalysisStates<D>>
    where
        Cfg: ControlFlowGraph,
        D: JoinSemiLattice,
        F: TransferFunction<Cfg, D>,
    {
        let mut states = AnalysisStates::new(cfg, lat_ctx);
        if !states.pre_states.is_empty() {
            states.pre_states[0] = seed;
        }
        if self.solve_in_place(cfg, lat_ctx, &mut states, transfer) {
            Some(states)
        } else {
            None
        }
    }
}
