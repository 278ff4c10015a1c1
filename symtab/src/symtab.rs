use std::{borrow::Borrow, collections::HashMap, hash::Hash};

/// SymbolTable associates a Symbol `S` with a stored value `T`.
pub type SymbolTable<S, T> = HashMap<S, T>;

/// Scoped implements nested scoping on top of `SymbolTable`.
///
/// There is always a root scope. Lookups walk from the innermost scope
/// outwards and return the first hit, so an inner definition shadows an
/// outer one for as long as its scope is active. Defining a symbol twice in
/// the same scope replaces the earlier definition.
pub struct Scoped<S, T>
where
    S: Hash + Eq,
{
    root: SymbolTable<S, T>,
    scopes: Vec<SymbolTable<S, T>>,
}

#[derive(Debug)]
pub struct CannotLeaveRootScopeError;

impl<S, T> Default for Scoped<S, T>
where
    S: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, T> Scoped<S, T>
where
    S: Hash + Eq,
{
    pub fn new() -> Self {
        Scoped {
            root: SymbolTable::new(),
            scopes: Vec::new(),
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(SymbolTable::new())
    }

    pub fn leave_scope(&mut self) -> Result<(), CannotLeaveRootScopeError> {
        self.scopes
            .pop()
            .map(|_| ())
            .ok_or(CannotLeaveRootScopeError)
    }

    /// Number of scopes entered on top of the root scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Define `sym` in the innermost scope. Returns the definition it
    /// replaced in that same scope, if any.
    pub fn define(&mut self, sym: S, val: T) -> Option<T> {
        self.current_scope_mut().insert(sym, val)
    }

    pub fn visible_definition<Q>(&self, sym: &Q) -> Option<&T>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.scopes
            .iter()
            .rev()
            .chain(std::iter::once(&self.root))
            .find_map(|scope| scope.get(sym))
    }

    fn current_scope_mut(&mut self) -> &mut SymbolTable<S, T> {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => &mut self.root,
        }
    }
}
