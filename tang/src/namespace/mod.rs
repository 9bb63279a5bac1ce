//! The namespace: a lazily materialised graph of declaration nodes.
//!
//! Nodes live in an arena owned by the [`Namespace`] and are handed out as
//! `Arc<Node>`. A node is created the first time its full name is looked
//! up; its outer class (or package), superclass and interfaces are
//! materialised first. Materialisation takes a write lock only for the
//! final insert and re-checks the name under it, so concurrent lookups of
//! the same name always observe one node.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tang::classpath::{Classpath, ClasspathLoader};
//! use tang::namespace::Namespace;
//!
//! let entry = ClasspathLoader::parse_str("inline", r"
//! declarations:
//!   - name: com.example.Timer
//!     kind: interface
//!   - name: com.example.SystemTimer
//!     implements: [com.example.Timer]
//! ").unwrap();
//! let namespace = Namespace::from_classpath(Classpath::from_entries([entry]).unwrap());
//!
//! let timer = namespace.get_node("com.example.Timer").unwrap();
//! let system = namespace.get_node("com.example.SystemTimer").unwrap();
//! assert!(namespace.is_assignable(&timer, &system));
//! assert!(Arc::ptr_eq(&timer, &namespace.get_node("com.example.Timer").unwrap()));
//! ```

mod node;
mod parser;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::classpath::declaration::{package_of, simple_name};
use crate::classpath::{prelude, Classpath, Declaration, NamedParameterAttr};
use crate::error::{Error, Result};
use crate::reflection::{Reflection, TypeExpr};

pub use node::{ClassNode, NamedParameterNode, Node, NodeId, NodeKind};
pub use parser::{ParameterParser, ParserRef};

#[derive(Debug)]
struct Arena {
    nodes: Vec<Arc<Node>>,
    by_name: HashMap<String, NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl Arena {
    fn new() -> Self {
        let root = Arc::new(Node {
            id: NodeId::ROOT,
            name: String::new(),
            full_name: String::new(),
            parent: None,
            kind: NodeKind::Package,
        });
        let mut by_name = HashMap::new();
        by_name.insert(String::new(), NodeId::ROOT);
        Self {
            nodes: vec![root],
            by_name,
            children: HashMap::new(),
        }
    }
}

/// A class hierarchy built on demand from a [`Classpath`].
#[derive(Debug)]
pub struct Namespace {
    classpath: Classpath,
    parsers: ParameterParser,
    arena: RwLock<Arena>,
}

impl Namespace {
    /// Creates an empty namespace over `classpath` using `parsers`.
    #[must_use]
    pub fn new(classpath: Classpath, parsers: ParameterParser) -> Self {
        Self {
            classpath,
            parsers,
            arena: RwLock::new(Arena::new()),
        }
    }

    /// Creates a namespace with only the built-in parsers.
    #[must_use]
    pub fn from_classpath(classpath: Classpath) -> Self {
        Self::new(classpath, ParameterParser::new())
    }

    /// The declarations backing this namespace.
    #[must_use]
    pub fn classpath(&self) -> &Classpath {
        &self.classpath
    }

    /// The parser set.
    #[must_use]
    pub fn parsers(&self) -> &ParameterParser {
        &self.parsers
    }

    /// A reflection adapter over this namespace's classpath.
    #[must_use]
    pub fn reflection(&self) -> Reflection<'_> {
        Reflection::new(&self.classpath)
    }

    /// Resolves a type descriptor to its node, materialising it if needed.
    ///
    /// Parameterised descriptors resolve to the node of their erasure.
    ///
    /// # Errors
    ///
    /// Returns `NameResolution` for unparseable or undeclared names,
    /// `NotInjectable` for anonymous or local declarations, and
    /// `InvalidDeclaration` / `GenericsMismatch` when the declaration (or one
    /// it depends on) is malformed.
    pub fn get_node(&self, descriptor: &str) -> Result<Arc<Node>> {
        let ty = TypeExpr::parse(descriptor)?;
        let mut visiting = Vec::new();
        self.materialize(ty.raw(), &mut visiting)
    }

    /// An already-materialised node by full name.
    #[must_use]
    pub fn find(&self, full_name: &str) -> Option<Arc<Node>> {
        let arena = self.arena.read();
        arena
            .by_name
            .get(full_name)
            .map(|id| Arc::clone(&arena.nodes[id.0]))
    }

    /// A node by handle.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Arc<Node>> {
        self.arena.read().nodes.get(id.0).cloned()
    }

    /// The root package.
    #[must_use]
    pub fn root(&self) -> Arc<Node> {
        Arc::clone(&self.arena.read().nodes[NodeId::ROOT.0])
    }

    /// Materialised children of a node, ordered by full name.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<Arc<Node>> {
        let arena = self.arena.read();
        let mut children: Vec<Arc<Node>> = arena
            .children
            .get(&id)
            .map(|ids| ids.iter().map(|c| Arc::clone(&arena.nodes[c.0])).collect())
            .unwrap_or_default();
        children.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        children
    }

    /// Number of materialised nodes, root included.
    #[must_use]
    pub fn materialized_len(&self) -> usize {
        self.arena.read().nodes.len()
    }

    /// Can an instance of `sub` be used where `sup` is expected?
    #[must_use]
    pub fn is_assignable(&self, sup: &Node, sub: &Node) -> bool {
        self.reflection()
            .is_assignable(&sup.full_name, &sub.full_name)
    }

    /// The type an external-constructor node produces.
    ///
    /// # Errors
    ///
    /// Returns `GenericsMismatch` if the produced type cannot be recovered.
    pub fn produced_type(&self, constructor: &Node) -> Result<TypeExpr> {
        self.reflection().interface_target(
            prelude::EXTERNAL_CONSTRUCTOR,
            &TypeExpr::named(&constructor.full_name),
        )
    }

    /// Combines the namespaces of several configurations with an extra
    /// classpath and extra parser plug-ins.
    ///
    /// When the union adds nothing to the first namespace, that namespace is
    /// returned as-is so its nodes keep their identity.
    ///
    /// # Errors
    ///
    /// Returns `MergeConflict` when a name is declared differently, or a
    /// type is parsed differently, by two inputs; parser registration errors
    /// are returned unchanged.
    pub fn merge(
        namespaces: &[&Arc<Namespace>],
        classpath: Option<&Classpath>,
        parsers: &[&str],
    ) -> Result<Arc<Namespace>> {
        let mut merged_classpath = classpath.cloned().unwrap_or_default();
        let mut merged_parsers = ParameterParser::new();
        for namespace in namespaces {
            merged_classpath = merged_classpath.union(&namespace.classpath)?;
            merged_parsers = merged_parsers.merge(&namespace.parsers)?;
        }
        for parser in parsers {
            merged_parsers.register(&merged_classpath, parser)?;
        }

        if let Some(first) = namespaces.first() {
            if first.classpath == merged_classpath && first.parsers == merged_parsers {
                return Ok(Arc::clone(first));
            }
        }

        log::info!(
            "merged {} namespace(s) into {} declaration(s)",
            namespaces.len(),
            merged_classpath.len()
        );
        Ok(Arc::new(Self::new(merged_classpath, merged_parsers)))
    }

    fn materialize(&self, name: &str, visiting: &mut Vec<String>) -> Result<Arc<Node>> {
        if let Some(node) = self.find(name) {
            return Ok(node);
        }
        if visiting.iter().any(|v| v == name) {
            return Err(Error::invalid_declaration(
                name,
                format!("cyclic declaration: {} -> {name}", visiting.join(" -> ")),
            ));
        }

        let Some(decl) = self.classpath.declaration(name) else {
            if self.classpath.is_package(name) {
                let parent = match package_of(name) {
                    Some(package) => self.materialize(package, visiting)?.id,
                    None => NodeId::ROOT,
                };
                return Ok(self.insert(name, parent, NodeKind::Package));
            }
            return Err(Error::name_resolution(name, "not declared on the classpath"));
        };

        if decl.anonymous || decl.local {
            return Err(Error::NotInjectable {
                name: name.to_string(),
                reason: if decl.anonymous {
                    "anonymous declarations cannot be referenced".into()
                } else {
                    "local declarations cannot be referenced".into()
                },
            });
        }

        visiting.push(name.to_string());
        let result = self.materialize_declaration(decl, visiting);
        visiting.pop();
        result
    }

    fn materialize_declaration(
        &self,
        decl: &Declaration,
        visiting: &mut Vec<String>,
    ) -> Result<Arc<Node>> {
        let parent = match decl.outer_class().or_else(|| decl.package()) {
            Some(enclosing) => self.materialize(enclosing, visiting)?.id,
            None => NodeId::ROOT,
        };

        let kind = match &decl.named_parameter {
            Some(attr) => NodeKind::NamedParameter(self.named_parameter(decl, attr)?),
            None => NodeKind::Class(self.class_node(decl, visiting)?),
        };

        Ok(self.insert(&decl.name, parent, kind))
    }

    fn class_node(&self, decl: &Declaration, visiting: &mut Vec<String>) -> Result<ClassNode> {
        let superclass = match &decl.extends {
            Some(ty) => {
                let node = self.materialize(ty.raw(), visiting)?;
                match node.as_class() {
                    Some(class) if !class.is_interface => Some(node.id),
                    _ => {
                        return Err(Error::invalid_declaration(
                            &decl.name,
                            format!("extends {node}, which is not a class"),
                        ))
                    }
                }
            }
            None => None,
        };

        let mut interfaces = Vec::with_capacity(decl.implements.len());
        for ty in &decl.implements {
            let node = self.materialize(ty.raw(), visiting)?;
            match node.as_class() {
                Some(class) if class.is_interface => interfaces.push(node.id),
                _ => {
                    return Err(Error::invalid_declaration(
                        &decl.name,
                        format!("implements {node}, which is not an interface"),
                    ))
                }
            }
        }

        let is_external_constructor = decl.name != prelude::EXTERNAL_CONSTRUCTOR
            && self
                .reflection()
                .is_assignable(prelude::EXTERNAL_CONSTRUCTOR, &decl.name);

        Ok(ClassNode {
            is_interface: decl.is_interface(),
            is_abstract: decl.is_abstract,
            is_unit: decl.unit,
            is_external_constructor,
            superclass,
            interfaces,
            constructors: decl.constructors.clone(),
        })
    }

    fn named_parameter(
        &self,
        decl: &Declaration,
        attr: &NamedParameterAttr,
    ) -> Result<NamedParameterNode> {
        if !decl.type_params.is_empty() {
            return Err(Error::invalid_declaration(
                &decl.name,
                "named parameters cannot declare type variables",
            ));
        }

        let reflection = self.reflection();
        let target = reflection.interface_target(prelude::NAME, &TypeExpr::named(&decl.name))?;
        let element = if target.raw() == prelude::SET {
            Some(reflection.element_type(&target)?)
        } else {
            None
        };

        match (&element, attr) {
            (None, NamedParameterAttr { default_set, .. }) if !default_set.is_empty() => {
                return Err(Error::invalid_declaration(
                    &decl.name,
                    format!("'default_set' given for scalar parameter of type {target}"),
                ));
            }
            (Some(_), NamedParameterAttr { default: Some(_), .. }) => {
                return Err(Error::invalid_declaration(
                    &decl.name,
                    "set-valued parameters take 'default_set'",
                ));
            }
            _ => {}
        }

        let value_type = element.as_ref().unwrap_or(&target);
        for raw in attr.default.iter().chain(attr.default_set.iter()) {
            self.check_default(&decl.name, value_type, raw)?;
        }

        Ok(NamedParameterNode {
            parser: self.parsers.parser_for(value_type.raw()),
            target,
            element,
            default: attr.default.clone(),
            default_set: attr.default_set.clone(),
            doc: attr.doc.clone(),
        })
    }

    fn check_default(&self, name: &str, value_type: &TypeExpr, raw: &str) -> Result<()> {
        if self.parsers.parser_for(value_type.raw()).is_some() {
            return self.parsers.check(value_type.raw(), raw).map_err(|reason| {
                Error::invalid_declaration(name, format!("default '{raw}': {reason}"))
            });
        }

        let is_class = self
            .classpath
            .declaration(raw)
            .is_some_and(|d| !d.is_named_parameter());
        if is_class && self.reflection().is_assignable(value_type.raw(), raw) {
            Ok(())
        } else {
            Err(Error::invalid_declaration(
                name,
                format!("default '{raw}' is not a class assignable to {value_type}"),
            ))
        }
    }

    fn insert(&self, full_name: &str, parent: NodeId, kind: NodeKind) -> Arc<Node> {
        let mut arena = self.arena.write();
        if let Some(id) = arena.by_name.get(full_name) {
            return Arc::clone(&arena.nodes[id.0]);
        }

        let id = NodeId(arena.nodes.len());
        let node = Arc::new(Node {
            id,
            name: simple_name(full_name).to_string(),
            full_name: full_name.to_string(),
            parent: Some(parent),
            kind,
        });
        log::trace!("materialised {node}");
        arena.nodes.push(Arc::clone(&node));
        arena.by_name.insert(full_name.to_string(), id);
        arena.children.entry(parent).or_default().push(id);
        node
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::from_classpath(Classpath::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::ClasspathLoader;

    fn namespace(yaml: &str) -> Namespace {
        let entry = ClasspathLoader::parse_str("test", yaml).unwrap();
        Namespace::from_classpath(Classpath::from_entries([entry]).unwrap())
    }

    const DECLS: &str = r"
declarations:
  - name: app.Timer
    kind: interface
  - name: app.SystemTimer
    implements: [app.Timer]
  - name: app.SystemTimer$Tick
  - name: app.Timeout
    implements: ['Name<Integer>']
    named_parameter:
      default: '10'
  - name: app.Ports
    implements: ['Name<Set<Integer>>']
    named_parameter:
      default_set: ['80', '443']
  - name: app.Anon
    anonymous: true
  - name: app.TimerCtor
    implements: ['ExternalConstructor<app.Timer>']
";

    #[test]
    fn test_get_node_links_parents() {
        let ns = namespace(DECLS);
        let tick = ns.get_node("app.SystemTimer$Tick").unwrap();
        let outer = ns.find("app.SystemTimer").unwrap();
        let package = ns.find("app").unwrap();

        assert_eq!(tick.parent(), Some(outer.id()));
        assert_eq!(outer.parent(), Some(package.id()));
        assert_eq!(package.parent(), Some(NodeId::ROOT));
        assert!(package.is_package());
        assert_eq!(tick.name(), "Tick");
        assert_eq!(ns.children(outer.id())[0].full_name(), "app.SystemTimer$Tick");
    }

    #[test]
    fn test_get_node_is_idempotent() {
        let ns = namespace(DECLS);
        let a = ns.get_node("app.Timer").unwrap();
        let count = ns.materialized_len();
        let b = ns.get_node("app.Timer").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(ns.materialized_len(), count);
    }

    #[test]
    fn test_get_node_erases_arguments() {
        let ns = namespace(DECLS);
        let set = ns.get_node("Set<Integer>").unwrap();
        assert_eq!(set.full_name(), "Set");
        assert!(set.as_class().unwrap().is_interface());
    }

    #[test]
    fn test_get_node_unknown() {
        let ns = namespace(DECLS);
        assert!(matches!(
            ns.get_node("app.Missing"),
            Err(Error::NameResolution { .. })
        ));
        assert!(matches!(
            ns.get_node("Set<"),
            Err(Error::NameResolution { .. })
        ));
    }

    #[test]
    fn test_get_node_rejects_anonymous() {
        let ns = namespace(DECLS);
        assert!(matches!(
            ns.get_node("app.Anon"),
            Err(Error::NotInjectable { .. })
        ));
    }

    #[test]
    fn test_named_parameter_nodes() {
        let ns = namespace(DECLS);
        let timeout = ns.get_node("app.Timeout").unwrap();
        let np = timeout.as_named_parameter().unwrap();
        assert!(!np.is_set());
        assert_eq!(np.default_value(), Some("10"));
        assert_eq!(np.parser(), Some(&ParserRef::Builtin("Integer")));

        let ports = ns.get_node("app.Ports").unwrap();
        let np = ports.as_named_parameter().unwrap();
        assert!(np.is_set());
        assert_eq!(np.element_type().unwrap().raw(), "Integer");
        assert_eq!(np.target().to_string(), "Set<Integer>");
    }

    #[test]
    fn test_external_constructor_flag() {
        let ns = namespace(DECLS);
        let ctor = ns.get_node("app.TimerCtor").unwrap();
        assert!(ctor.as_class().unwrap().is_external_constructor());
        assert_eq!(ns.produced_type(&ctor).unwrap().raw(), "app.Timer");
        let plain = ns.get_node("app.SystemTimer").unwrap();
        assert!(!plain.as_class().unwrap().is_external_constructor());
    }

    #[test]
    fn test_bad_default_is_invalid_declaration() {
        let ns = namespace(
            "declarations:\n  - name: app.Bad\n    implements: ['Name<Integer>']\n    named_parameter:\n      default: ten\n",
        );
        assert!(matches!(
            ns.get_node("app.Bad"),
            Err(Error::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn test_class_default_must_be_assignable() {
        let yaml = r"
declarations:
  - name: app.Timer
    kind: interface
  - name: app.SystemTimer
    implements: [app.Timer]
  - name: app.Clock
  - name: app.Good
    implements: ['Name<app.Timer>']
    named_parameter: { default: app.SystemTimer }
  - name: app.Bad
    implements: ['Name<app.Timer>']
    named_parameter: { default: app.Clock }
";
        let ns = namespace(yaml);
        assert!(ns.get_node("app.Good").is_ok());
        assert!(ns.get_node("app.Bad").is_err());
    }

    #[test]
    fn test_named_parameter_without_name_interface() {
        let ns = namespace("declarations:\n  - name: app.P\n    named_parameter: {}\n");
        assert!(matches!(
            ns.get_node("app.P"),
            Err(Error::GenericsMismatch { .. })
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let ns = namespace(
            "declarations:\n  - name: x.A\n    extends: x.B\n  - name: x.B\n    extends: x.A\n",
        );
        let err = ns.get_node("x.A").unwrap_err();
        assert!(format!("{err}").contains("cyclic"));
    }

    #[test]
    fn test_extends_interface_is_invalid() {
        let ns = namespace(
            "declarations:\n  - name: x.I\n    kind: interface\n  - name: x.C\n    extends: x.I\n",
        );
        assert!(matches!(
            ns.get_node("x.C"),
            Err(Error::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn test_package_lookup() {
        let ns = namespace(DECLS);
        let app = ns.get_node("app").unwrap();
        assert!(app.is_package());
        assert_eq!(app.to_string(), "package app");
    }

    #[test]
    fn test_merge_reuses_identical_namespace() {
        let ns = Arc::new(namespace(DECLS));
        let merged = Namespace::merge(&[&ns, &ns], None, &[]).unwrap();
        assert!(Arc::ptr_eq(&ns, &merged));
    }

    #[test]
    fn test_merge_unions_and_conflicts() {
        let a = Arc::new(namespace("declarations:\n  - name: x.A\n"));
        let b = Arc::new(namespace("declarations:\n  - name: x.B\n"));
        let merged = Namespace::merge(&[&a, &b], None, &[]).unwrap();
        assert!(merged.get_node("x.A").is_ok());
        assert!(merged.get_node("x.B").is_ok());

        let c = Arc::new(namespace("declarations:\n  - name: x.A\n    kind: interface\n"));
        assert!(matches!(
            Namespace::merge(&[&a, &c], None, &[]),
            Err(Error::MergeConflict { .. })
        ));
    }

    #[test]
    fn test_merge_registers_parsers() {
        let yaml = "declarations:\n  - name: x.D\n  - name: x.DParser\n    implements: ['ExternalConstructor<x.D>']\n";
        let a = Arc::new(namespace(yaml));
        let merged = Namespace::merge(&[&a], None, &["x.DParser"]).unwrap();
        assert!(!Arc::ptr_eq(&a, &merged));
        assert_eq!(
            merged.parsers().parser_for("x.D"),
            Some(ParserRef::Plugin("x.DParser".into()))
        );
    }
}
