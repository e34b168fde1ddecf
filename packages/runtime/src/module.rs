//! Loadable modules
//!
//! A module is an immutable symbol table of component types and helper
//! functions. Compiled templates and host code both produce modules; type
//! handles keep their module alive.

use crate::component::{
    Component, ComponentDescriptor, ComponentFactory, NativeComponentFactory,
};
use crate::error::ResolveError;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

static NEXT_MODULE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique module identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u64);

impl ModuleId {
    fn next() -> Self {
        ModuleId(NEXT_MODULE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failure reported by a helper function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HelperError(pub String);

impl HelperError {
    pub fn new(message: impl Into<String>) -> Self {
        HelperError(message.into())
    }
}

type HelperFn = dyn Fn(&[Value]) -> Result<Value, HelperError> + Send + Sync;

/// A function callable from template expressions.
#[derive(Clone)]
pub struct HelperFunction {
    name: String,
    arity: RangeInclusive<usize>,
    func: Arc<HelperFn>,
}

impl HelperFunction {
    pub fn new<F>(name: impl Into<String>, arity: RangeInclusive<usize>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HelperError> + Send + Sync + 'static,
    {
        HelperFunction {
            name: name.into(),
            arity,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> &RangeInclusive<usize> {
        &self.arity
    }

    pub fn accepts(&self, argc: usize) -> bool {
        self.arity.contains(&argc)
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, HelperError> {
        (self.func)(args)
    }
}

impl fmt::Debug for HelperFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

#[derive(Clone)]
pub enum SymbolKind {
    Component(Arc<dyn ComponentFactory>),
    Function(Arc<HelperFunction>),
}

/// A named definition inside a module.
#[derive(Clone)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    /// Fully qualified name, e.g. `Quill.Generated.Greeting`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last dot-separated segment of the name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, SymbolKind::Component(_))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SymbolKind::Component(_) => "component",
            SymbolKind::Function(_) => "function",
        };
        write!(f, "{} {}", kind, self.name)
    }
}

pub(crate) fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// An independently loadable unit owning its own symbol table.
pub struct LoadedModule {
    id: ModuleId,
    name: String,
    symbols: IndexMap<String, Symbol>,
}

impl LoadedModule {
    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Indexes of symbols whose qualified or simple name equals `name`.
    pub fn lookup(&self, name: &str) -> Vec<usize> {
        if let Some(index) = self.symbols.get_index_of(name) {
            return vec![index];
        }
        self.symbols
            .values()
            .enumerate()
            .filter(|(_, symbol)| symbol.simple_name() == name)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn symbol(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get_index(index).map(|(_, symbol)| symbol)
    }

    pub fn function(&self, name: &str) -> Option<&Arc<HelperFunction>> {
        self.lookup(name)
            .into_iter()
            .filter_map(|index| match self.symbol(index).map(Symbol::kind) {
                Some(SymbolKind::Function(function)) => Some(function),
                _ => None,
            })
            .next()
    }

    pub fn handle(self: &Arc<Self>, index: usize) -> Option<TypeHandle> {
        (index < self.symbols.len()).then(|| TypeHandle {
            module: Arc::clone(self),
            index,
        })
    }

    /// Resolve any symbol by name.
    pub fn resolve_type(self: &Arc<Self>, name: &str) -> Result<TypeHandle, ResolveError> {
        let matches = self.lookup(name);
        match matches.as_slice() {
            [] => Err(ResolveError::NotFound {
                name: name.to_string(),
                module: self.name.clone(),
            }),
            [index] => Ok(TypeHandle {
                module: Arc::clone(self),
                index: *index,
            }),
            _ => Err(self.ambiguous(name, &matches)),
        }
    }

    /// Resolve a symbol by name and require it to be a component type.
    pub fn resolve_component_type(self: &Arc<Self>, name: &str) -> Result<TypeHandle, ResolveError> {
        let handle = self.resolve_type(name)?;
        if !handle.is_component() {
            return Err(ResolveError::NotAComponent {
                name: handle.name().to_string(),
                module: self.name.clone(),
            });
        }
        Ok(handle)
    }

    pub fn component_types(self: &Arc<Self>) -> Vec<TypeHandle> {
        self.symbols
            .values()
            .enumerate()
            .filter(|(_, symbol)| symbol.is_component())
            .map(|(index, _)| TypeHandle {
                module: Arc::clone(self),
                index,
            })
            .collect()
    }

    /// The only component type of the module. Several component types make
    /// the request ambiguous instead of picking one.
    pub fn sole_component_type(self: &Arc<Self>) -> Result<TypeHandle, ResolveError> {
        let mut components = self.component_types();
        match components.len() {
            0 => Err(ResolveError::NotFound {
                name: "<component>".to_string(),
                module: self.name.clone(),
            }),
            1 => Ok(components.remove(0)),
            _ => Err(ResolveError::Ambiguous {
                name: "<component>".to_string(),
                module: self.name.clone(),
                candidates: components.iter().map(|h| h.name().to_string()).collect(),
            }),
        }
    }

    fn ambiguous(&self, name: &str, matches: &[usize]) -> ResolveError {
        ResolveError::Ambiguous {
            name: name.to_string(),
            module: self.name.clone(),
            candidates: matches
                .iter()
                .filter_map(|index| self.symbol(*index))
                .map(|symbol| symbol.name().to_string())
                .collect(),
        }
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("symbols", &self.symbols.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Assembles a [`LoadedModule`].
pub struct ModuleBuilder {
    name: String,
    symbols: IndexMap<String, Symbol>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ModuleBuilder {
            name: name.into(),
            symbols: IndexMap::new(),
        }
    }

    /// Add a component type; a symbol with the same name is replaced.
    pub fn component(mut self, name: impl Into<String>, factory: Arc<dyn ComponentFactory>) -> Self {
        let name = name.into();
        self.symbols.insert(
            name.clone(),
            Symbol {
                name,
                kind: SymbolKind::Component(factory),
            },
        );
        self
    }

    pub fn native_component<T: Component + Default + 'static>(self, name: impl Into<String>) -> Self {
        self.native_component_with::<T>(name, ComponentDescriptor::default())
    }

    pub fn native_component_with<T: Component + Default + 'static>(
        self,
        name: impl Into<String>,
        descriptor: ComponentDescriptor,
    ) -> Self {
        self.component(name, Arc::new(NativeComponentFactory::<T>::new(descriptor)))
    }

    /// Add a helper function under its own name.
    pub fn function(mut self, function: HelperFunction) -> Self {
        let name = function.name().to_string();
        self.symbols.insert(
            name.clone(),
            Symbol {
                name,
                kind: SymbolKind::Function(Arc::new(function)),
            },
        );
        self
    }

    pub fn build(self) -> Arc<LoadedModule> {
        Arc::new(LoadedModule {
            id: ModuleId::next(),
            name: self.name,
            symbols: self.symbols,
        })
    }
}

/// A reference to one definition inside a loaded module.
#[derive(Clone)]
pub struct TypeHandle {
    module: Arc<LoadedModule>,
    index: usize,
}

impl TypeHandle {
    /// Wrap a native Rust component type in a single-symbol module.
    pub fn native<T: Component + Default + 'static>() -> Self {
        let name = std::any::type_name::<T>().replace("::", ".");
        let module = ModuleBuilder::new(name.clone())
            .native_component::<T>(name)
            .build();
        TypeHandle { module, index: 0 }
    }

    pub fn module(&self) -> &Arc<LoadedModule> {
        &self.module
    }

    fn symbol(&self) -> &Symbol {
        // The index is validated when the handle is created.
        &self.module.symbols[self.index]
    }

    pub fn name(&self) -> &str {
        self.symbol().name()
    }

    pub fn simple_name(&self) -> &str {
        self.symbol().simple_name()
    }

    pub fn is_component(&self) -> bool {
        self.symbol().is_component()
    }

    pub fn as_component(&self) -> Option<&Arc<dyn ComponentFactory>> {
        match self.symbol().kind() {
            SymbolKind::Component(factory) => Some(factory),
            SymbolKind::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<HelperFunction>> {
        match self.symbol().kind() {
            SymbolKind::Function(function) => Some(function),
            SymbolKind::Component(_) => None,
        }
    }

    pub fn descriptor(&self) -> Option<&ComponentDescriptor> {
        self.as_component().map(|factory| factory.descriptor())
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.module.id == other.module.id && self.index == other.index
    }
}

impl Eq for TypeHandle {}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({} in {}{})", self.name(), self.module.name, self.module.id)
    }
}
