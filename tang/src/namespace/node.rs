//! Namespace nodes.

use std::fmt;

use super::parser::ParserRef;
use crate::classpath::ConstructorDeclaration;
use crate::reflection::TypeExpr;

/// Handle of a node inside one namespace arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root package.
    pub const ROOT: Self = Self(0);

    /// Position in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A namespace entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Grouping only.
    Package,
    /// A class or interface.
    Class(ClassNode),
    /// A named-parameter declaration.
    NamedParameter(NamedParameterNode),
}

impl NodeKind {
    /// Short description used in error messages.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Class(_) => "class",
            Self::NamedParameter(_) => "named parameter",
        }
    }
}

/// Class or interface details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    pub(crate) is_interface: bool,
    pub(crate) is_abstract: bool,
    pub(crate) is_unit: bool,
    pub(crate) is_external_constructor: bool,
    pub(crate) superclass: Option<NodeId>,
    pub(crate) interfaces: Vec<NodeId>,
    pub(crate) constructors: Vec<ConstructorDeclaration>,
}

impl ClassNode {
    /// Returns `true` for interfaces.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Returns `true` for abstract classes.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Returns `true` for unit classes.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.is_unit
    }

    /// Returns `true` if instances of this class produce values of another
    /// type (it implements `ExternalConstructor<T>`).
    #[must_use]
    pub fn is_external_constructor(&self) -> bool {
        self.is_external_constructor
    }

    /// Direct superclass.
    #[must_use]
    pub fn superclass(&self) -> Option<NodeId> {
        self.superclass
    }

    /// Directly implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> &[NodeId] {
        &self.interfaces
    }

    /// Declared constructors.
    #[must_use]
    pub fn constructors(&self) -> &[ConstructorDeclaration] {
        &self.constructors
    }

    /// A concrete class the injector could instantiate: not an interface,
    /// not abstract, and either declares no constructors or at least one
    /// injectable one.
    #[must_use]
    pub fn is_injection_candidate(&self) -> bool {
        !self.is_interface
            && !self.is_abstract
            && (self.constructors.is_empty() || self.constructors.iter().any(|c| c.injectable))
    }
}

/// Named-parameter details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParameterNode {
    pub(crate) target: TypeExpr,
    pub(crate) element: Option<TypeExpr>,
    pub(crate) default: Option<String>,
    pub(crate) default_set: Vec<String>,
    pub(crate) doc: Option<String>,
    pub(crate) parser: Option<ParserRef>,
}

impl NamedParameterNode {
    /// The declared target type (`T` in `Name<T>`).
    #[must_use]
    pub fn target(&self) -> &TypeExpr {
        &self.target
    }

    /// Returns `true` if the target's erasure is `Set`.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.element.is_some()
    }

    /// The element type of a set-valued parameter.
    #[must_use]
    pub fn element_type(&self) -> Option<&TypeExpr> {
        self.element.as_ref()
    }

    /// The type individual values must have: the element type for sets,
    /// the target otherwise.
    #[must_use]
    pub fn value_type(&self) -> &TypeExpr {
        self.element.as_ref().unwrap_or(&self.target)
    }

    /// Scalar default, unparsed.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Set defaults, unparsed.
    #[must_use]
    pub fn default_set(&self) -> &[String] {
        &self.default_set
    }

    /// Documentation string.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Parser responsible for this parameter's values, if any.
    #[must_use]
    pub fn parser(&self) -> Option<&ParserRef> {
        self.parser.as_ref()
    }
}

impl Node {
    /// Handle of this node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Last segment of the full name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable full name; empty for the root.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Enclosing package or class.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Node variant.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Class details, if this is a class node.
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassNode> {
        match &self.kind {
            NodeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Named-parameter details, if this is a named-parameter node.
    #[must_use]
    pub fn as_named_parameter(&self) -> Option<&NamedParameterNode> {
        match &self.kind {
            NodeKind::NamedParameter(np) => Some(np),
            _ => None,
        }
    }

    /// Returns `true` for package nodes.
    #[must_use]
    pub fn is_package(&self) -> bool {
        matches!(self.kind, NodeKind::Package)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.describe(), self.full_name)
    }
}
