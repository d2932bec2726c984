//! Hand-built program graphs

use super::GraphBuilder;
use tiersplit_pdg::{EdgeType, NodeIndex, ParamDirection, ProgramDependenceGraph, Tier};

/// `function foo(x) { return x; }  foo(42);`
pub struct IdentityCall {
    pub pdg: ProgramDependenceGraph,
    pub entry: NodeIndex,
    pub formal_in: NodeIndex,
    pub exit: NodeIndex,
    pub call: NodeIndex,
    pub actual_in: NodeIndex,
}

pub fn identity_call() -> IdentityCall {
    let mut b = GraphBuilder::new();
    let entry = b.entry();
    let formal_in = b.formal("x", ParamDirection::In);
    let exit = b.exit(false);
    b.control(entry, formal_in)
        .control(entry, exit)
        .data(formal_in, exit);

    let call = b.call();
    let actual_in = b.actual(ParamDirection::In);
    b.control(call, actual_in)
        .data(actual_in, formal_in)
        .edge(call, entry, EdgeType::Call);

    IdentityCall {
        pdg: b.build(),
        entry,
        formal_in,
        exit,
        call,
        actual_in,
    }
}

/// `var r = foo(foo(v)); use(r);`
pub struct NestedCall {
    pub pdg: ProgramDependenceGraph,
    pub value: NodeIndex,
    pub statement: NodeIndex,
    pub outer: NodeIndex,
    pub outer_arg: NodeIndex,
    pub inner: NodeIndex,
    pub inner_arg: NodeIndex,
    pub consumer: NodeIndex,
}

pub fn nested_call() -> NestedCall {
    let mut b = GraphBuilder::new();
    let value = b.statement();
    let statement = b.statement();
    let outer = b.call();
    let outer_arg = b.actual(ParamDirection::In);
    let inner = b.call();
    let inner_arg = b.actual(ParamDirection::In);
    let consumer = b.statement();
    b.control(statement, outer)
        .control(outer, outer_arg)
        .control(outer_arg, inner)
        .control(inner, inner_arg)
        .data(value, inner_arg)
        .data(outer, consumer);

    NestedCall {
        pdg: b.build(),
        value,
        statement,
        outer,
        outer_arg,
        inner,
        inner_arg,
        consumer,
    }
}

/// Client and server slices over a small program
pub struct TwoTierProgram {
    pub pdg: ProgramDependenceGraph,
    pub client: NodeIndex,
    pub server: NodeIndex,
    pub client_stms: Vec<NodeIndex>,
    pub server_stms: Vec<NodeIndex>,
}

pub fn two_tier_program() -> TwoTierProgram {
    let mut b = GraphBuilder::new();
    let client = b.tier(Tier::Client);
    let server = b.tier(Tier::Server);

    let c_block = b.statement_of(tiersplit_pdg::SyntaxKind::BlockStatement);
    let c_read = b.statement();
    let c_show = b.statement();
    b.control(client, c_block)
        .control(c_block, c_read)
        .control(c_block, c_show);

    let s_block = b.statement_of(tiersplit_pdg::SyntaxKind::BlockStatement);
    let s_store = b.statement();
    b.control(server, s_block).control(s_block, s_store);

    // client reads server state, server receives client input
    b.edge(s_store, c_read, EdgeType::RemoteData)
        .edge(c_read, s_store, EdgeType::RemoteData)
        .data(c_read, c_show);

    TwoTierProgram {
        pdg: b.build(),
        client,
        server,
        client_stms: vec![c_block, c_read, c_show],
        server_stms: vec![s_block, s_store],
    }
}
