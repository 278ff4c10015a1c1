use ast::{names, FormalParam, Line, Ty};
use derive_more::Display;
use std::collections::{hash_map::Entry, HashMap};

/// Index of a class in the [`TypeSystem`]. Parents are stored as ids, never
/// as references, so the registry can be built up class by class.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display(fmt = "class#{}", _0)]
pub struct ClassId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckedType {
    Int,
    /// No value, e.g. a `while` loop or a call to a `void` method.
    NoType,
    /// The type of the `void` literal.
    Null,
    TypeRef(ClassId),
}

impl CheckedType {
    pub fn class_id(self) -> Option<ClassId> {
        match self {
            CheckedType::TypeRef(id) => Some(id),
            _ => None,
        }
    }
}

/// Where a class came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOrigin {
    Builtin,
    /// Index into `Program::classes`.
    Declared(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParamDef {
    pub name: String,
    pub type_name: String,
    pub ty: CheckedType,
}

impl MethodParamDef {
    pub fn new(name: &str, type_name: &str, ty: CheckedType) -> Self {
        Self {
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMethodDef {
    pub name: String,
    pub line: Line,
    pub owner: ClassId,
    pub params: Vec<MethodParamDef>,
    pub return_type_name: String,
    /// `None` when the declared return type did not resolve.
    pub return_ty: Option<CheckedType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassAttributeDef {
    pub name: String,
    pub owner: ClassId,
    pub type_name: String,
    pub ty: CheckedType,
}

#[derive(Debug)]
pub struct ClassDef {
    pub name: String,
    pub line: Line,
    pub origin: ClassOrigin,
    pub declared_parent: Option<String>,
    /// Filled in by hierarchy validation; only `Object` keeps `None`.
    pub parent: Option<ClassId>,
    /// In registration order.
    methods: Vec<ClassMethodDef>,
    attributes: HashMap<String, ClassAttributeDef>,
}

impl ClassDef {
    pub fn new(name: &str, line: Line, origin: ClassOrigin, declared_parent: Option<&str>) -> Self {
        Self {
            name: name.to_owned(),
            line,
            origin,
            declared_parent: declared_parent.map(str::to_owned),
            parent: None,
            methods: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    pub fn add_method(&mut self, method: ClassMethodDef) -> Result<(), ClassMethodDef> {
        if self.own_method(&method.name).is_some() {
            return Err(method);
        }
        self.methods.push(method);
        Ok(())
    }

    pub fn add_attribute(&mut self, attribute: ClassAttributeDef) -> Result<(), ClassAttributeDef> {
        match self.attributes.entry(attribute.name.clone()) {
            Entry::Occupied(_) => Err(attribute),
            Entry::Vacant(e) => {
                e.insert(attribute);
                Ok(())
            }
        }
    }

    /// Only methods declared in this very class.
    pub fn own_method(&self, name: &str) -> Option<&ClassMethodDef> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// Only attributes declared in this very class.
    pub fn own_attribute(&self, name: &str) -> Option<&ClassAttributeDef> {
        self.attributes.get(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &ClassMethodDef> {
        self.methods.iter()
    }

    pub fn is_builtin(&self) -> bool {
        self.origin == ClassOrigin::Builtin
    }
}

#[derive(Debug)]
pub struct ClassAlreadyDeclared;

/// The class registry. Built-ins are registered first, followed by user
/// classes in declaration order; a `ClassId` is the registration index.
#[derive(Debug, Default)]
pub struct TypeSystem {
    classes: Vec<ClassDef>,
    by_name: HashMap<String, ClassId>,
}

impl TypeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class_def(&mut self, class_def: ClassDef) -> Result<ClassId, ClassAlreadyDeclared> {
        let id = ClassId(self.classes.len());
        match self.by_name.entry(class_def.name.clone()) {
            Entry::Occupied(_) => Err(ClassAlreadyDeclared),
            Entry::Vacant(e) => {
                e.insert(id);
                self.classes.push(class_def);
                Ok(id)
            }
        }
    }

    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDef {
        &mut self.classes[id.0]
    }

    pub fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).cloned()
    }

    /// Resolve a type name as it may appear in a declaration: `Int` or any
    /// registered class. `void` is not a type here.
    pub fn resolve_type(&self, name: &str) -> Option<CheckedType> {
        if name == names::INT {
            Some(CheckedType::Int)
        } else {
            self.lookup_class(name).map(CheckedType::TypeRef)
        }
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(ClassId)
    }

    /// User classes in declaration order, with their index in the program.
    pub fn declared_classes(&self) -> impl Iterator<Item = (ClassId, usize)> + '_ {
        self.classes
            .iter()
            .enumerate()
            .filter_map(|(idx, class)| match class.origin {
                ClassOrigin::Declared(decl_idx) => Some((ClassId(idx), decl_idx)),
                ClassOrigin::Builtin => None,
            })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Walks the parent chain of `id`, excluding `id` itself. The walk gives
    /// up after visiting every class once, so it terminates even while the
    /// hierarchy still contains a cycle.
    pub fn ancestors(&self, id: ClassId) -> Ancestors<'_> {
        Ancestors {
            type_system: self,
            next: self.class(id).parent,
            remaining: self.classes.len(),
        }
    }

    /// True if `ancestor` is found strictly above `class` in the hierarchy.
    pub fn is_strict_ancestor(&self, ancestor: ClassId, class: ClassId) -> bool {
        self.ancestors(class).any(|id| id == ancestor)
    }

    /// Method lookup: the class itself first, then each ancestor.
    pub fn lookup_method(&self, class: ClassId, name: &str) -> Option<&ClassMethodDef> {
        std::iter::once(class)
            .chain(self.ancestors(class))
            .find_map(|id| self.class(id).own_method(name))
    }

    /// The nearest definition of `name` in a strict ancestor of `class`.
    pub fn overridden_method(&self, class: ClassId, name: &str) -> Option<&ClassMethodDef> {
        self.ancestors(class)
            .find_map(|id| self.class(id).own_method(name))
    }

    pub fn lookup_attribute(&self, class: ClassId, name: &str) -> Option<&ClassAttributeDef> {
        std::iter::once(class)
            .chain(self.ancestors(class))
            .find_map(|id| self.class(id).own_attribute(name))
    }

    pub fn type_name(&self, ty: CheckedType) -> &str {
        match ty {
            CheckedType::Int => names::INT,
            CheckedType::NoType => names::NO_TYPE,
            CheckedType::Null => names::VOID,
            CheckedType::TypeRef(id) => &self.class(id).name,
        }
    }

    /// The form in which a type is recorded in the program tree.
    pub fn annotation(&self, ty: CheckedType) -> Ty {
        match ty {
            CheckedType::Int => Ty::Int,
            CheckedType::NoType => Ty::NoType,
            CheckedType::Null => Ty::Null,
            CheckedType::TypeRef(id) => Ty::Class(self.class(id).name.clone()),
        }
    }

    /// The implicit `self` of a feature declared in `class`.
    pub fn self_param(&self, class: ClassId, line: Line) -> FormalParam {
        let mut param = FormalParam::new(line, names::SELF, &self.class(class).name);
        param.variable_type = Some(self.annotation(CheckedType::TypeRef(class)));
        param
    }
}

pub struct Ancestors<'ts> {
    type_system: &'ts TypeSystem,
    next: Option<ClassId>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = self.type_system.class(current).parent;
        Some(current)
    }
}
