//! Source construct contract
//!
//! PDG nodes keep an opaque back-reference to the syntax node they were
//! built from. The analyses only ask a handful of yes/no questions about it
//! and follow three structural links (`init`, `expression.right`,
//! `declarations`). Any parser can plug in by implementing
//! [`SourceConstruct`]; [`Construct`] is a plain owned implementation used by
//! builders that do not want to expose their own tree.

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a syntax node inside one parsed source unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstructId(pub u64);

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Syntax kinds the analyses can distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    Program,
    FunctionExpression,
    FunctionDeclaration,
    VariableDeclaration,
    VariableDeclarator,
    Property,
    AssignmentExpression,
    ExpressionStatement,
    ObjectExpression,
    NewExpression,
    CallExpression,
    TryStatement,
    CatchClause,
    ForStatement,
    ReturnStatement,
    ThrowStatement,
    BlockStatement,
    IfStatement,
    Identifier,
    Literal,
    Other,
}

/// Read-only view of the syntax node behind a PDG node.
///
/// Implementors only need `construct_id` and `kind`; the structural links
/// default to absent.
pub trait SourceConstruct: fmt::Debug + Send + Sync {
    fn construct_id(&self) -> ConstructId;

    fn kind(&self) -> SyntaxKind;

    /// Initializer of a variable declarator
    fn init(&self) -> Option<ConstructId> {
        None
    }

    /// Kind of the wrapped expression of an expression statement
    fn expression_kind(&self) -> Option<SyntaxKind> {
        None
    }

    /// Right-hand side of the wrapped assignment expression
    fn expression_right(&self) -> Option<ConstructId> {
        None
    }

    /// Declarators of a variable declaration
    fn declarations(&self) -> &[ConstructId] {
        &[]
    }

    /// Object entry node the builder attached to this construct
    fn object_entry(&self) -> Option<NodeIndex> {
        None
    }

    fn is_fun_exp(&self) -> bool {
        self.kind() == SyntaxKind::FunctionExpression
    }

    fn is_fun_decl(&self) -> bool {
        self.kind() == SyntaxKind::FunctionDeclaration
    }

    fn is_var_decl(&self) -> bool {
        self.kind() == SyntaxKind::VariableDeclaration
    }

    fn is_var_declarator(&self) -> bool {
        self.kind() == SyntaxKind::VariableDeclarator
    }

    fn is_property(&self) -> bool {
        self.kind() == SyntaxKind::Property
    }

    fn is_exp_stm(&self) -> bool {
        self.kind() == SyntaxKind::ExpressionStatement
    }

    fn is_obj_exp(&self) -> bool {
        self.kind() == SyntaxKind::ObjectExpression
    }

    fn is_new_exp(&self) -> bool {
        self.kind() == SyntaxKind::NewExpression
    }

    fn is_try_stm(&self) -> bool {
        self.kind() == SyntaxKind::TryStatement
    }

    fn is_catch_stm(&self) -> bool {
        self.kind() == SyntaxKind::CatchClause
    }

    fn is_for_stm(&self) -> bool {
        self.kind() == SyntaxKind::ForStatement
    }

    /// `x = ...;` as a statement
    fn is_assignment_stm(&self) -> bool {
        self.is_exp_stm() && self.expression_kind() == Some(SyntaxKind::AssignmentExpression)
    }
}

/// Owned construct description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Construct {
    pub id: ConstructId,
    pub kind: SyntaxKind,
    pub init: Option<ConstructId>,
    pub expression: Option<(SyntaxKind, Option<ConstructId>)>,
    pub declarations: Vec<ConstructId>,
    pub object_entry: Option<NodeIndex>,
}

impl Construct {
    pub fn new(id: u64, kind: SyntaxKind) -> Self {
        Construct {
            id: ConstructId(id),
            kind,
            init: None,
            expression: None,
            declarations: Vec::new(),
            object_entry: None,
        }
    }

    pub fn with_init(mut self, init: ConstructId) -> Self {
        self.init = Some(init);
        self
    }

    /// Wrap an expression; `right` is only meaningful for assignments
    pub fn with_expression(mut self, kind: SyntaxKind, right: Option<ConstructId>) -> Self {
        self.expression = Some((kind, right));
        self
    }

    pub fn with_declarations(mut self, declarations: Vec<ConstructId>) -> Self {
        self.declarations = declarations;
        self
    }

    pub fn with_object_entry(mut self, node: NodeIndex) -> Self {
        self.object_entry = Some(node);
        self
    }

    /// Shared handle as stored on PDG nodes
    pub fn into_shared(self) -> Arc<dyn SourceConstruct> {
        Arc::new(self)
    }
}

impl SourceConstruct for Construct {
    fn construct_id(&self) -> ConstructId {
        self.id
    }

    fn kind(&self) -> SyntaxKind {
        self.kind
    }

    fn init(&self) -> Option<ConstructId> {
        self.init
    }

    fn expression_kind(&self) -> Option<SyntaxKind> {
        self.expression.map(|(kind, _)| kind)
    }

    fn expression_right(&self) -> Option<ConstructId> {
        self.expression.and_then(|(_, right)| right)
    }

    fn declarations(&self) -> &[ConstructId] {
        &self.declarations
    }

    fn object_entry(&self) -> Option<NodeIndex> {
        self.object_entry
    }
}
