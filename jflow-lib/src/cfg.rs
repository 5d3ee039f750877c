use core::fmt::Write;
use std::collections::HashMap;

use analysis::cfg::{CfgBlock, CfgEdge, ControlFlowGraph, EdgeKind, OpPos};
use itertools::Itertools;

use crate::node::{Node, NodeId, NodeKind, TempId, Variable};
use crate::tree::{ClassId, TreeContext, TyId, Unit};

/// An outgoing edge of a basic block. Exceptional edges record the static
/// type of the exception whose raise causes the transfer, so handler
/// matching stays visible in the graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Edge {
    Normal(usize),
    True(usize),
    False(usize),
    Exceptional { target: usize, thrown: ClassId },
}

impl Edge {
    pub(crate) fn with_target(self, target: usize) -> Edge {
        match self {
            Edge::Normal(_) => Edge::Normal(target),
            Edge::True(_) => Edge::True(target),
            Edge::False(_) => Edge::False(target),
            Edge::Exceptional { thrown, .. } => Edge::Exceptional { target, thrown },
        }
    }
}

impl CfgEdge for Edge {
    fn target(&self) -> usize {
        match self {
            Edge::Normal(target) | Edge::True(target) | Edge::False(target) => *target,
            Edge::Exceptional { target, .. } => *target,
        }
    }

    fn kind(&self) -> EdgeKind {
        match self {
            Edge::Normal(_) => EdgeKind::Normal,
            Edge::True(_) => EdgeKind::True,
            Edge::False(_) => EdgeKind::False,
            Edge::Exceptional { .. } => EdgeKind::Exceptional,
        }
    }
}

/// How a block ends. A branch terminator names the block's last node; the
/// block then has exactly one true and one false successor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Terminator {
    #[default]
    None,
    Branch(NodeId),
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BasicBlock {
    nodes: Vec<NodeId>,
    term: Terminator,
    succs: Vec<Edge>,
    preds: Vec<usize>,
}

impl BasicBlock {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn terminator(&self) -> Terminator {
        self.term
    }
}

impl CfgBlock for BasicBlock {
    type Operation = NodeId;
    type Edge = Edge;

    fn operations(&self) -> &[Self::Operation] {
        &self.nodes
    }

    fn successors(&self) -> &[Self::Edge] {
        &self.succs
    }

    fn predecessors(&self) -> &[usize] {
        &self.preds
    }
}

/// The control flow graph of one lowered unit. The graph owns the node
/// arena and the table of synthesized temporaries; it is read-only once
/// the builder returned it.
///
/// Block 0 is the entry, always empty and never the target of a back
/// edge. Block 1 is the regular exit, block 2 the exceptional exit;
/// neither has successors. Every other block is reachable from the entry,
/// the builder prunes the rest.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cfg {
    nodes: Vec<Node>,
    basic_blocks: Vec<BasicBlock>,
    temps: Vec<TyId>,
    unit: Unit,
}

impl ControlFlowGraph for Cfg {
    type Block = BasicBlock;

    fn blocks(&self) -> &[Self::Block] {
        &self.basic_blocks
    }
}

impl Cfg {
    pub const ENTRY_BLOCK: usize = 0;
    pub const EXIT_BLOCK: usize = 1;
    pub const EXCEPTIONAL_EXIT_BLOCK: usize = 2;

    pub(crate) fn new(unit: Unit) -> Self {
        Self {
            nodes: Vec::new(),
            basic_blocks: vec![BasicBlock::default(); 3],
            temps: Vec::new(),
            unit,
        }
    }

    pub fn entry(&self) -> usize {
        Self::ENTRY_BLOCK
    }

    pub fn exit(&self) -> usize {
        Self::EXIT_BLOCK
    }

    pub fn exceptional_exit(&self) -> usize {
        Self::EXCEPTIONAL_EXIT_BLOCK
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn temp_type(&self, id: TempId) -> TyId {
        self.temps[id.0 as usize]
    }

    pub fn temp_count(&self) -> usize {
        self.temps.len()
    }

    pub(crate) fn add_node(&mut self, node: Node) -> NodeId {
        node.kind.check_type(node.ty);
        self.nodes.push(node);
        NodeId((self.nodes.len() - 1) as u32)
    }

    pub(crate) fn make_temp(&mut self, ty: TyId) -> TempId {
        self.temps.push(ty);
        TempId((self.temps.len() - 1) as u32)
    }

    pub(crate) fn new_block(&mut self) -> usize {
        self.basic_blocks.push(BasicBlock::default());
        self.basic_blocks.len() - 1
    }

    pub(crate) fn push_node(&mut self, block: usize, id: NodeId) {
        self.basic_blocks[block].nodes.push(id);
    }

    pub(crate) fn set_terminator(&mut self, block: usize, term: Terminator) {
        if let Terminator::Branch(node) = term {
            assert_eq!(self.basic_blocks[block].nodes.last(), Some(&node));
        }
        self.basic_blocks[block].term = term;
    }

    pub(crate) fn add_edge(&mut self, from: usize, edge: Edge) {
        self.basic_blocks[edge.target()].preds.push(from);
        self.basic_blocks[from].succs.push(edge);
    }

    pub(crate) fn last_node(&self, block: usize) -> Option<NodeId> {
        self.basic_blocks[block].nodes.last().copied()
    }

    pub(crate) fn retract_last_edge(&mut self, from: usize) {
        let Some(edge) = self.basic_blocks[from].succs.pop() else {
            panic!("No edge to retract.");
        };
        let preds = &mut self.basic_blocks[edge.target()].preds;
        let Some(idx) = preds.iter().rposition(|pred| *pred == from) else {
            panic!("Broken predecessor list.");
        };
        preds.remove(idx);
    }

    /// Drops every block that is not reachable from the entry and
    /// renumbers the rest. The two exit blocks are kept even when
    /// unreachable, so a unit that cannot return normally still has its
    /// regular exit.
    pub(crate) fn prune_unreachable(&mut self) {
        let block_num = self.basic_blocks.len();
        let mut reachable = vec![false; block_num];
        reachable[Self::ENTRY_BLOCK] = true;
        reachable[Self::EXIT_BLOCK] = true;
        reachable[Self::EXCEPTIONAL_EXIT_BLOCK] = true;
        let mut stack = vec![Self::ENTRY_BLOCK];
        while let Some(block) = stack.pop() {
            for edge in &self.basic_blocks[block].succs {
                let target = edge.target();
                if !reachable[target] {
                    reachable[target] = true;
                    stack.push(target);
                }
            }
        }
        if reachable.iter().all(|r| *r) {
            return;
        }

        // The exits are the lowest indices and always kept, so their
        // numbers survive the renumbering.
        let mut remap = vec![usize::MAX; block_num];
        let mut next = 0_usize;
        for (block, keep) in reachable.iter().enumerate() {
            if *keep {
                remap[block] = next;
                next += 1;
            }
        }
        let blocks = core::mem::take(&mut self.basic_blocks);
        self.basic_blocks = blocks
            .into_iter()
            .enumerate()
            .filter(|(block, _)| reachable[*block])
            .map(|(_, mut block)| {
                for edge in &mut block.succs {
                    *edge = edge.with_target(remap[edge.target()]);
                }
                block.preds = block
                    .preds
                    .iter()
                    .filter(|pred| reachable[**pred])
                    .map(|pred| remap[*pred])
                    .collect();
                block
            })
            .collect();
    }
}

/// Analysis results attached to operation positions, rendered into the
/// textual CFG listing by [`print_with_annotations`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotations {
    pub pre: HashMap<OpPos, Vec<String>>,
    pub post: HashMap<OpPos, Vec<String>>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The display name of a variable, `$tN` for synthesized temporaries.
pub fn variable_name(var: Variable, tree: &TreeContext) -> String {
    match var {
        Variable::Local(local) => tree.local_name(local).to_owned(),
        Variable::Temp(temp) => format!("$t{}", temp.0),
    }
}

/// One node rendered with its operands as `nK` references.
pub fn print_node(id: NodeId, cfg: &Cfg, tree: &TreeContext) -> String {
    let n = |id: &NodeId| format!("n{}", id.0);
    use NodeKind::*;
    match &cfg.node(id).kind {
        IntegerLiteral(value) => format!("{value}"),
        LongLiteral(value) => format!("{value}L"),
        BooleanLiteral(value) => format!("{value}"),
        CharacterLiteral(value) => format!("'{value}'"),
        StringLiteral(value) => format!("\"{value}\""),
        NullLiteral => "null".to_owned(),
        NumericalMinus { operand } => format!("-{}", n(operand)),
        NumericalPlus { operand } => format!("+{}", n(operand)),
        BitwiseComplement { operand } => format!("~{}", n(operand)),
        ConditionalNot { operand } => format!("!{}", n(operand)),
        NumericalAddition { lhs, rhs } => format!("{} + {}", n(lhs), n(rhs)),
        NumericalSubtraction { lhs, rhs } => format!("{} - {}", n(lhs), n(rhs)),
        NumericalMultiplication { lhs, rhs } => format!("{} * {}", n(lhs), n(rhs)),
        IntegerDivision { lhs, rhs } => format!("{} / {}", n(lhs), n(rhs)),
        IntegerRemainder { lhs, rhs } => format!("{} % {}", n(lhs), n(rhs)),
        LeftShift { lhs, rhs } => format!("{} << {}", n(lhs), n(rhs)),
        SignedRightShift { lhs, rhs } => format!("{} >> {}", n(lhs), n(rhs)),
        UnsignedRightShift { lhs, rhs } => format!("{} >>> {}", n(lhs), n(rhs)),
        BitwiseAnd { lhs, rhs } => format!("{} & {}", n(lhs), n(rhs)),
        BitwiseOr { lhs, rhs } => format!("{} | {}", n(lhs), n(rhs)),
        BitwiseXor { lhs, rhs } => format!("{} ^ {}", n(lhs), n(rhs)),
        EqualTo { lhs, rhs } => format!("{} == {}", n(lhs), n(rhs)),
        NotEqual { lhs, rhs } => format!("{} != {}", n(lhs), n(rhs)),
        LessThan { lhs, rhs } => format!("{} < {}", n(lhs), n(rhs)),
        LessThanOrEqual { lhs, rhs } => format!("{} <= {}", n(lhs), n(rhs)),
        GreaterThan { lhs, rhs } => format!("{} > {}", n(lhs), n(rhs)),
        GreaterThanOrEqual { lhs, rhs } => format!("{} >= {}", n(lhs), n(rhs)),
        StringConcatenate { lhs, rhs } => format!("{} + {}", n(lhs), n(rhs)),
        StringConversion { operand } => format!("str({})", n(operand)),
        WideningConversion { operand } => format!("widen({})", n(operand)),
        NarrowingConversion { operand } => format!("narrow({})", n(operand)),
        Boxing { operand } => format!("box({})", n(operand)),
        Unboxing { operand } => format!("unbox({})", n(operand)),
        LocalVariable(var) => variable_name(*var, tree),
        ThisLiteral => "this".to_owned(),
        FieldAccess { object, field } => format!("{}.{}", n(object), tree.field_name(*field)),
        ArrayAccess { array, index } => format!("{}[{}]", n(array), n(index)),
        Assignment { target, expression } => format!("{} = {}", n(target), n(expression)),
        VariableDeclaration { variable } => format!("var {}", variable_name(*variable, tree)),
        MethodAccess { receiver, method } => match receiver {
            Some(receiver) => format!("{}.{}", n(receiver), tree.method_name(*method)),
            None => tree.method_name(*method).to_owned(),
        },
        MethodInvocation { target, arguments } => {
            format!("{}({})", n(target), arguments.iter().map(n).join(", "))
        }
        ObjectCreation {
            constructor,
            arguments,
        } => format!(
            "new {}({})",
            tree.method_name(*constructor),
            arguments.iter().map(n).join(", ")
        ),
        ArrayCreation { length } => {
            let element = tree.element_type(cfg.node(id).ty);
            format!("new {}[{}]", tree.type_name(element), n(length))
        }
        TypeCast { operand } => format!("({}) {}", tree.type_name(cfg.node(id).ty), n(operand)),
        InstanceOf { operand, tested } => {
            format!("{} instanceof {}", n(operand), tree.class_name(*tested))
        }
        Return(value) => match value {
            Some(value) => format!("return {}", n(value)),
            None => "return".to_owned(),
        },
        Throw(value) => format!("throw {}", n(value)),
        Case {
            selector,
            expression,
        } => format!("case {} == {}", n(selector), n(expression)),
        Marker(text) => format!("marker({text})"),
        LambdaResultExpression { operand } => format!("result {}", n(operand)),
    }
}

/// Textual listing of the graph: blocks in order, their nodes numbered by
/// arena id, the branch terminator, and the outgoing edges with `T:`/`F:`
/// and `exc(Type):` labels.
pub fn print(cfg: &Cfg, tree: &TreeContext) -> String {
    print_with_annotations(cfg, tree, &Annotations::new())
}

/// The textual listing with analysis results interleaved as comments on
/// the annotated node lines.
pub fn print_with_annotations(cfg: &Cfg, tree: &TreeContext, anns: &Annotations) -> String {
    let mut result = String::new();
    for (block_id, block) in cfg.blocks().iter().enumerate() {
        writeln!(result, "bb{block_id}:").unwrap();
        for (op_id, &node) in block.nodes().iter().enumerate() {
            let pos = OpPos { block_id, op_id };
            result.push_str("  ");
            if let Some(pre) = anns.pre.get(&pos) {
                if !pre.is_empty() {
                    write!(result, "/* {} */ ", pre.join(", ")).unwrap();
                }
            }
            write!(result, "n{} = {}", node.0, print_node(node, cfg, tree)).unwrap();
            if let Some(post) = anns.post.get(&pos) {
                if !post.is_empty() {
                    write!(result, " /* {} */", post.join(", ")).unwrap();
                }
            }
            result.push('\n');
        }
        if let Terminator::Branch(node) = block.terminator() {
            writeln!(result, "  br n{}", node.0).unwrap();
        }
        if !block.successors().is_empty() {
            let edges = block
                .successors()
                .iter()
                .map(|edge| match edge {
                    Edge::Normal(target) => format!("bb{target}"),
                    Edge::True(target) => format!("T:bb{target}"),
                    Edge::False(target) => format!("F:bb{target}"),
                    Edge::Exceptional { target, thrown } => {
                        format!("exc({}):bb{}", tree.class_name(*thrown), target)
                    }
                })
                .join(" ");
            writeln!(result, "  succs: {edges}").unwrap();
        }
    }
    result
}

/// Render the CFG in graphviz format via the generic printer. The node
/// texts land inside quoted dot labels, so backslashes and quotes must be
/// escaped; string and character literals can contain both.
pub fn print_dot(cfg: &Cfg, tree: &TreeContext) -> String {
    analysis::cfg::print(None, cfg, |id| {
        format!("n{} = {}", id.0, print_node(*id, cfg, tree))
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
    })
}
