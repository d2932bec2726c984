//! Test data builders
//!
//! Short-hand for laying out graphs by hand.

use tiersplit_pdg::{
    Construct, EdgeType, NodeIndex, ParamDirection, ProgramDependenceGraph, SyntaxKind, Tier,
};

/// Thin wrapper that keeps the test bodies readable
#[derive(Debug, Default)]
pub struct GraphBuilder {
    pub pdg: ProgramDependenceGraph,
    next_construct: u64,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn construct(&mut self, kind: SyntaxKind) -> Construct {
        self.next_construct += 1;
        Construct::new(self.next_construct, kind)
    }

    pub fn statement(&mut self) -> NodeIndex {
        let c = self.construct(SyntaxKind::ExpressionStatement).into_shared();
        self.pdg.new_statement_node(Some(c))
    }

    pub fn statement_of(&mut self, kind: SyntaxKind) -> NodeIndex {
        let c = self.construct(kind).into_shared();
        self.pdg.new_statement_node(Some(c))
    }

    pub fn entry(&mut self) -> NodeIndex {
        let c = self.construct(SyntaxKind::FunctionDeclaration).into_shared();
        self.pdg.new_entry_node(Some(c))
    }

    pub fn call(&mut self) -> NodeIndex {
        let c = self.construct(SyntaxKind::CallExpression).into_shared();
        self.pdg.new_call_node(Some(c))
    }

    pub fn object_entry(&mut self) -> NodeIndex {
        let c = self.construct(SyntaxKind::ObjectExpression).into_shared();
        self.pdg.new_object_entry_node(Some(c))
    }

    pub fn formal(&mut self, name: &str, direction: ParamDirection) -> NodeIndex {
        self.pdg.new_formal_parameter(name, direction)
    }

    pub fn actual(&mut self, direction: ParamDirection) -> NodeIndex {
        self.pdg.new_actual_parameter(direction, None, None)
    }

    pub fn exit(&mut self, exception: bool) -> NodeIndex {
        self.pdg.new_exit_node(None, exception)
    }

    pub fn tier(&mut self, tier: Tier) -> NodeIndex {
        self.pdg
            .ensure_distributed(tier)
            .expect("distributed node")
    }

    pub fn control(&mut self, from: NodeIndex, to: NodeIndex) -> &mut Self {
        self.pdg.add_edge_out(from, to, EdgeType::Control, None);
        self
    }

    pub fn data(&mut self, from: NodeIndex, to: NodeIndex) -> &mut Self {
        self.pdg.add_edge_out(from, to, EdgeType::Data, None);
        self
    }

    pub fn edge(&mut self, from: NodeIndex, to: NodeIndex, edge_type: EdgeType) -> &mut Self {
        self.pdg.add_edge_out(from, to, edge_type, None);
        self
    }

    pub fn build(self) -> ProgramDependenceGraph {
        self.pdg
    }
}
