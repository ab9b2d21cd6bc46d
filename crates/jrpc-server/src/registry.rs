//! Method registry: dotted names resolved through nested namespaces.
//!
//! The tree is assembled with [`RegistryBuilder`] during startup and frozen
//! into a [`Registry`]. After that it is only ever read, so lookups from
//! many threads need no locking.

use std::collections::HashMap;

use tracing::info;

use crate::handler::Method;

/// Separator between namespace segments in a method name.
pub const SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid method path: {0:?}")]
    InvalidPath(String),
    #[error("a method is already registered at {0:?}")]
    Duplicate(String),
}

#[derive(Debug, Default, Clone)]
struct Node {
    method: Option<Method>,
    children: HashMap<String, Node>,
}

impl Node {
    fn child_mut(&mut self, segment: &str) -> &mut Node {
        self.children.entry(segment.to_string()).or_default()
    }

    /// Merge `other` into this node; `path` is only used for error reporting.
    fn merge(&mut self, other: Node, path: &str) -> Result<(), RegistryError> {
        if let Some(method) = other.method {
            if self.method.is_some() {
                return Err(RegistryError::Duplicate(path.to_string()));
            }
            self.method = Some(method);
        }
        for (segment, child) in other.children {
            let child_path = join(path, &segment);
            self.child_mut(&segment).merge(child, &child_path)?;
        }
        Ok(())
    }

    fn collect(&self, prefix: &str, out: &mut Vec<String>) {
        if self.method.as_ref().is_some_and(Method::is_exposed) {
            out.push(prefix.to_string());
        }
        for (segment, child) in &self.children {
            child.collect(&join(prefix, segment), out);
        }
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{segment}")
    }
}

fn segments(path: &str) -> Result<Vec<&str>, RegistryError> {
    let parts: Vec<&str> = path.split(SEPARATOR).collect();
    if parts.iter().any(|p| p.is_empty() || p.trim() != *p) {
        return Err(RegistryError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

/// A detached subtree of methods that can be mounted under a prefix.
#[derive(Debug, Default, Clone)]
pub struct Namespace {
    root: Node,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method at a (possibly dotted) path relative to this
    /// namespace.
    pub fn register(&mut self, path: &str, method: Method) -> Result<&mut Self, RegistryError> {
        let mut node = &mut self.root;
        for segment in segments(path)? {
            node = node.child_mut(segment);
        }
        if node.method.is_some() {
            return Err(RegistryError::Duplicate(path.to_string()));
        }
        node.method = Some(method);
        Ok(self)
    }

    /// Attach another namespace under `path`.
    pub fn mount(&mut self, path: &str, namespace: Namespace) -> Result<&mut Self, RegistryError> {
        let mut node = &mut self.root;
        for segment in segments(path)? {
            node = node.child_mut(segment);
        }
        node.merge(namespace.root, path)?;
        Ok(self)
    }
}

/// Startup-time registry construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    namespace: Namespace,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: &str, method: Method) -> Result<&mut Self, RegistryError> {
        self.namespace.register(path, method)?;
        Ok(self)
    }

    pub fn mount(&mut self, path: &str, namespace: Namespace) -> Result<&mut Self, RegistryError> {
        self.namespace.mount(path, namespace)?;
        Ok(self)
    }

    pub fn build(self) -> Registry {
        let registry = Registry {
            root: self.namespace.root,
        };
        info!("Method registry built ({} exposed methods)", registry.methods().len());
        registry
    }
}

/// Read-only method tree.
#[derive(Debug, Default)]
pub struct Registry {
    root: Node,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolve a dotted method name.
    ///
    /// A missing segment, an empty segment, or an unexposed terminal method
    /// all resolve to `None`.
    pub fn resolve(&self, name: &str) -> Option<&Method> {
        let mut node = &self.root;
        for segment in name.split(SEPARATOR) {
            if segment.is_empty() {
                return None;
            }
            node = node.children.get(segment)?;
        }
        node.method.as_ref().filter(|m| m.is_exposed())
    }

    /// Sorted dotted names of every exposed method.
    pub fn methods(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.collect("", &mut out);
        out.sort();
        out
    }
}
