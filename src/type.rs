use crate::define_key;
use itertools::Itertools;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

pub trait TypeData: Sized + fmt::Debug + Clone + PartialEq + Eq + Hash {
    /// Nominal type declarations (structs, enums, classes)
    type Nominal: Key;
    /// Archetypes; the abstract parameters bound by generic declarations and associated types
    type Generic: Key;
    type Trait: Key;
    type Association: Key;
    /// Value declarations; both trait requirements and the declarations witnessing them
    type Value: Key;
    type Context: Key;
}

pub trait Key: PartialEq + Eq + fmt::Debug + Clone + Hash + fmt::Display {}

impl<'a> Key for &'a str {}
impl Key for usize {}
impl Key for u32 {}
impl Key for u16 {}
impl Key for u8 {}
impl Key for char {}
impl Key for String {}

define_key!(TypeId, "Handle to an interned type in a `TypeArena`");

pub type TypesBuf = SmallVec<[TypeId; 2]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type<D: TypeData> {
    pub constr: TypeKind<D>,
    pub params: TypesBuf,
    /// The type this one is nested inside of
    pub parent: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind<D: TypeData> {
    Nominal(D::Nominal),
    Archetype(D::Generic),
}

impl<D: TypeData> Type<D> {
    pub fn nominal(decl: D::Nominal, params: TypesBuf, parent: Option<TypeId>) -> Self {
        Self {
            constr: TypeKind::Nominal(decl),
            params,
            parent,
        }
    }

    pub fn archetype(gid: D::Generic) -> Self {
        Self {
            constr: TypeKind::Archetype(gid),
            params: TypesBuf::new(),
            parent: None,
        }
    }

    /// A nominal type applied to type arguments, such as `Array<Int>` or `Outer<T>`
    pub fn is_bound_generic(&self) -> bool {
        matches!(self.constr, TypeKind::Nominal(_)) && !self.params.is_empty()
    }

    pub fn decl(&self) -> Option<&D::Nominal> {
        match &self.constr {
            TypeKind::Nominal(decl) => Some(decl),
            TypeKind::Archetype(_) => None,
        }
    }
}

/// Hash-consed storage for every type of a compilation session.
///
/// Structurally equal types always intern to the same `TypeId`, so comparing handles is
/// comparing identity.
#[derive(Debug, Clone)]
pub struct TypeArena<D: TypeData> {
    types: Vec<Type<D>>,
    interned: HashMap<Type<D>, TypeId>,
}

impl<D: TypeData> Default for TypeArena<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TypeData> TypeArena<D> {
    pub fn new() -> Self {
        Self {
            types: vec![],
            interned: HashMap::new(),
        }
    }

    pub fn intern(&mut self, type_: Type<D>) -> TypeId {
        if let Some(id) = self.interned.get(&type_) {
            return *id;
        }

        #[cfg(debug_assertions)]
        for id in type_.params.iter().chain(type_.parent.iter()) {
            assert!(id.index() < self.types.len(), "type from another arena");
        }

        let id = TypeId::from(self.types.len());
        self.types.push(type_.clone());
        self.interned.insert(type_, id);
        id
    }

    pub fn nominal(&mut self, decl: D::Nominal, params: &[TypeId]) -> TypeId {
        self.intern(Type::nominal(decl, params.iter().copied().collect(), None))
    }

    pub fn nested(&mut self, parent: TypeId, decl: D::Nominal, params: &[TypeId]) -> TypeId {
        self.intern(Type::nominal(
            decl,
            params.iter().copied().collect(),
            Some(parent),
        ))
    }

    pub fn archetype(&mut self, gid: D::Generic) -> TypeId {
        self.intern(Type::archetype(gid))
    }

    pub fn get(&self, id: TypeId) -> &Type<D> {
        self.types.get(id.index()).expect("type not defined")
    }

    pub fn display(&self, id: TypeId) -> DisplayType<'_, D> {
        DisplayType { arena: self, id }
    }
}

pub struct DisplayType<'a, D: TypeData> {
    arena: &'a TypeArena<D>,
    id: TypeId,
}

impl<'a, D: TypeData> fmt::Display for DisplayType<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let type_ = self.arena.get(self.id);

        if let Some(parent) = type_.parent {
            write!(f, "{}.", self.arena.display(parent))?;
        }

        match &type_.constr {
            TypeKind::Nominal(decl) => write!(f, "{}", decl)?,
            TypeKind::Archetype(gid) => write!(f, "{}", gid)?,
        }

        if type_.params.is_empty() {
            Ok(())
        } else {
            write!(
                f,
                "<{}>",
                type_
                    .params
                    .iter()
                    .format_with(", ", |id, f| f(&self.arena.display(*id)))
            )
        }
    }
}
