use analysis::cfg::{CfgBlock, ControlFlowGraph, OpPos};
use analysis::domains::{JoinSemiLattice, Map, MapCtx};
use analysis::solvers::{AnalysisStates, TransferFunction, TransferResult};

use crate::cfg::{Annotations, Cfg, variable_name};
use crate::node::{NodeId, Variable};
use crate::tree::TreeContext;
use crate::visit::{NodeVisitor, visit};

/// Everything one visit receives from the engine: where the operation
/// sits, the graph it belongs to, the lattice context, and the state
/// flowing into the operation.
pub struct TransferInput<'a, D: JoinSemiLattice> {
    pub pos: OpPos,
    pub cfg: &'a Cfg,
    pub ctx: &'a D::LatticeContext,
    pub pre_state: &'a D,
}

/// The node-level transfer contract: an analysis over the lowered graph
/// is a [`NodeVisitor`] taking a [`TransferInput`] and producing the
/// transferred state. Policies override the kinds they interpret and let
/// `default_visit` return the incoming state unchanged; returning a
/// [`TransferResult::Conditional`] from the node a block branches on
/// propagates different refinements along the true and false edges.
pub trait NodeTransfer<D: JoinSemiLattice>:
    for<'a> NodeVisitor<TransferInput<'a, D>, Output = TransferResult<D>>
{
}

impl<D, T> NodeTransfer<D> for T
where
    D: JoinSemiLattice,
    T: for<'a> NodeVisitor<TransferInput<'a, D>, Output = TransferResult<D>>,
{
}

/// Adapts a [`NodeTransfer`] to the engine's operation-level contract by
/// resolving each operation id against the graph's node arena and
/// dispatching on the node kind.
pub struct NodeTransferAdapter<T>(pub T);

impl<D, T> TransferFunction<Cfg, D> for NodeTransferAdapter<T>
where
    D: JoinSemiLattice,
    T: NodeTransfer<D>,
{
    fn operation(
        &mut self,
        pos: OpPos,
        op: &NodeId,
        cfg: &Cfg,
        ctx: &D::LatticeContext,
        pre_state: &D,
    ) -> TransferResult<D> {
        let input = TransferInput {
            pos,
            cfg,
            ctx,
            pre_state,
        };
        visit(&mut self.0, *op, cfg.node(*op), input)
    }
}

/// Renders the store changes of every operation of a converged analysis
/// as printable annotations for
/// [`print_with_annotations`](crate::cfg::print_with_annotations).
///
/// The transfer is replayed once over each block from its solved entry
/// state, so loop headers report their fixpoint facts rather than
/// whatever an intermediate solver visit produced. Each binding an
/// operation adds or changes is printed as `name: value`, sorted for
/// deterministic output, and attached after the operation.
pub fn annotations_from_analysis_results<D, T>(
    cfg: &Cfg,
    tree: &TreeContext,
    ctx: &MapCtx<Variable, D>,
    transfer: &mut T,
    states: &AnalysisStates<Map<Variable, D>>,
) -> Annotations
where
    D: JoinSemiLattice,
    T: TransferFunction<Cfg, Map<Variable, D>>,
{
    let mut anns = Annotations::new();
    for (block_id, block) in cfg.blocks().iter().enumerate() {
        let mut state = states.pre_states[block_id].clone();
        for (op_id, op) in block.operations().iter().enumerate() {
            let pos = OpPos { block_id, op_id };
            let next = transfer
                .operation(pos, op, cfg, ctx, &state)
                .into_regular(ctx);
            let mut printed: Vec<String> = next
                .changed_values(&state)
                .into_iter()
                .map(|(variable, value)| {
                    format!("{}: {:?}", variable_name(variable, tree), value)
                })
                .collect();
            printed.sort();
            if !printed.is_empty() {
                anns.post.insert(pos, printed);
            }
            state = next;
        }
    }
    anns
}
