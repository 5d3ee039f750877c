use std::collections::HashSet;
use std::fmt::Write;

use priority_queue::PriorityQueue;

/// Flavor of a control flow edge. Solvers route different analysis states
/// along different edge kinds, see
/// [`TransferResult`](crate::solvers::TransferResult).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Unconditional control transfer.
    Normal,
    /// Taken when the terminator of the source block evaluates to true.
    True,
    /// Taken when the terminator of the source block evaluates to false.
    False,
    /// Taken when the last operation of the source block raises an
    /// exception instead of completing.
    Exceptional,
}

/// An outgoing edge of a basic block. The simplest graphs can use plain
/// block indices as edges, richer ones can attach an [`EdgeKind`] and
/// other payloads.
pub trait CfgEdge {
    fn target(&self) -> usize;
    fn kind(&self) -> EdgeKind;
}

/// A bare block index is an unconditional edge.
impl CfgEdge for usize {
    fn target(&self) -> usize {
        *self
    }

    fn kind(&self) -> EdgeKind {
        EdgeKind::Normal
    }
}

pub trait CfgBlock {
    type Operation;
    type Edge: CfgEdge;

    fn operations(&self) -> &[Self::Operation];
    fn successors(&self) -> &[Self::Edge];
    fn predecessors(&self) -> &[usize];
}

/// The entry block is the block with index 0. The block order is expected
/// to be stable and deterministic, but apart from the entry block solvers
/// make no assumption about it; the visitation order is always derived
/// from the edges.
pub trait ControlFlowGraph {
    type Block: CfgBlock;

    fn blocks(&self) -> &[Self::Block];
}

/// Position of an operation in a CFG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpPos {
    pub block_id: usize,
    pub op_id: usize,
}

/// Post-order of the blocks reachable from the entry. Successors are
/// explored last to first, so reversing the result enumerates the first
/// successor chain before its siblings.
fn post_order<Cfg: ControlFlowGraph>(cfg: &Cfg) -> Vec<usize> {
    let block_num = cfg.blocks().len();
    let mut order = Vec::with_capacity(block_num);
    if block_num == 0 {
        return order;
    }
    let mut visited = vec![false; block_num];
    // The second element is the number of successors already explored.
    let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
    visited[0] = true;
    while let Some(&(block, succ_idx)) = stack.last() {
        let succs = cfg.blocks()[block].successors();
        if succ_idx == succs.len() {
            order.push(block);
            stack.pop();
            continue;
        }
        let top = stack.len() - 1;
        stack[top].1 += 1;
        let next = succs[succs.len() - 1 - succ_idx].target();
        if !visited[next] {
            visited[next] = true;
            stack.push((next, 0));
        }
    }
    order
}

/// Returns the edges that close a cycle in the depth-first traversal of
/// the graph. When every loop is entered through a dedicated header that
/// dominates the body, the returned edges are exactly the edges pointing
/// back to loop headers.
pub fn get_back_edges<Cfg: ControlFlowGraph>(cfg: &Cfg) -> HashSet<(usize, usize)> {
    let block_num = cfg.blocks().len();
    let mut back_edges = HashSet::new();
    if block_num == 0 {
        return back_edges;
    }
    let mut visited = vec![false; block_num];
    let mut on_stack = vec![false; block_num];
    let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
    visited[0] = true;
    on_stack[0] = true;
    while let Some(&(block, succ_idx)) = stack.last() {
        let succs = cfg.blocks()[block].successors();
        if succ_idx == succs.len() {
            on_stack[block] = false;
            stack.pop();
            continue;
        }
        let top = stack.len() - 1;
        stack[top].1 += 1;
        let next = succs[succs.len() - 1 - succ_idx].target();
        if on_stack[next] {
            back_edges.insert((block, next));
        } else if !visited[next] {
            visited[next] = true;
            on_stack[next] = true;
            stack.push((next, 0));
        }
    }
    back_edges
}

/// A worklist that pops blocks in reverse post-order. Pushing a block that
/// is already queued is a no-op, so processing an acyclic region settles
/// every block in a single pass.
pub struct RPOWorklist {
    order: Vec<usize>,
    queue: PriorityQueue<usize, core::cmp::Reverse<usize>>,
}

impl RPOWorklist {
    pub fn new<Cfg: ControlFlowGraph>(cfg: &Cfg) -> Self {
        let mut order = vec![0usize; cfg.blocks().len()];
        for (rpo, &block) in post_order(cfg).iter().rev().enumerate() {
            order[block] = rpo;
        }
        Self {
            order,
            queue: PriorityQueue::new(),
        }
    }

    /// The position of a block in the reverse post-order of the graph.
    /// Unreachable blocks are mapped to position 0.
    pub fn get_rpo_order(&self, block: usize) -> usize {
        self.order[block]
    }

    pub fn push(&mut self, block: usize) {
        self.queue.push(block, core::cmp::Reverse(self.order[block]));
    }

    pub fn push_successors<Cfg: ControlFlowGraph>(&mut self, block: usize, cfg: &Cfg) {
        for edge in cfg.blocks()[block].successors() {
            self.push(edge.target());
        }
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.queue.pop().map(|(block, _)| block)
    }
}

/// Render the CFG in graphviz format. True and false branches are labeled,
/// exceptional edges are dashed.
pub fn print<Cfg, OpPrinter>(name: Option<&str>, cfg: &Cfg, printer: OpPrinter) -> String
where
    Cfg: ControlFlowGraph,
    OpPrinter: Fn(&<<Cfg as ControlFlowGraph>::Block as CfgBlock>::Operation) -> String,
{
    let mut output = match name {
        Some(name) => format!("digraph {name} {{\n"),
        None => "digraph CFG {\n".to_owned(),
    };
    for (counter, block) in cfg.blocks().iter().enumerate() {
        write!(output, "  Node_{counter}[label=\"").unwrap();
        let text: Vec<_> = block.operations().iter().map(&printer).collect();
        output.push_str(&text.join("\\n"));
        output.push_str("\"]\n");
    }
    output.push('\n');
    for (counter, block) in cfg.blocks().iter().enumerate() {
        for next in block.successors() {
            let attr = match next.kind() {
                EdgeKind::Normal => "",
                EdgeKind::True => " [label=\"T\"]",
                EdgeKind::False => " [label=\"F\"]",
                EdgeKind::Exceptional => " [style=\"dashed\"]",
            };
            writeln!(output, "  Node_{} -> Node_{}{}", counter, next.target(), attr).unwrap();
        }
    }
    output.push_str("}\n");
    output
}
