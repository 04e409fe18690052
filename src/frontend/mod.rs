use crate::*;
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

mod nominal;
mod r#trait;

pub use nominal::NominalDecl;
pub use r#trait::{AssociatedType, TraitDecl};

#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        define_key!($name, "");
    };
    ($name:ident, $comment:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[doc=$comment]
        pub struct $name(usize);

        impl From<usize> for $name {
            fn from(i: usize) -> $name {
                $name(i)
            }
        }

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

/// Every trait and nominal declaration known to the compilation session
#[derive(Debug, Clone)]
pub struct Declarations<D: TypeData> {
    traits: HashMap<D::Trait, TraitDecl<D>>,
    nominals: HashMap<D::Nominal, NominalDecl<D>>,

    association_owners: HashMap<D::Association, D::Trait>,
    requirement_owners: HashMap<D::Value, D::Trait>,
    archetypes: HashMap<D::Generic, Vec<D::Trait>>,
}

impl<D: TypeData> Default for Declarations<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TypeData> Declarations<D> {
    pub fn new() -> Self {
        Self {
            traits: HashMap::new(),
            nominals: HashMap::new(),
            association_owners: HashMap::new(),
            requirement_owners: HashMap::new(),
            archetypes: HashMap::new(),
        }
    }

    pub fn declare_trait(&mut self, decl: TraitDecl<D>) {
        for assoc in decl.associated() {
            self.association_owners
                .insert(assoc.name.clone(), decl.identifier.clone());
            self.declare_archetype(assoc.archetype.clone(), assoc.conforms_to.clone());
        }
        for req in decl.requirements() {
            self.requirement_owners
                .insert(req.clone(), decl.identifier.clone());
        }

        let previous = self.traits.insert(decl.identifier.clone(), decl);
        assert!(previous.is_none(), "trait declared twice");
    }

    pub fn declare_nominal(&mut self, decl: NominalDecl<D>) {
        for (gid, constrs) in decl.generics.iter() {
            self.declare_archetype(gid.clone(), constrs.clone());
        }

        let previous = self.nominals.insert(decl.identifier.clone(), decl);
        assert!(previous.is_none(), "nominal type declared twice");
    }

    fn declare_archetype(&mut self, gid: D::Generic, conforms_to: Vec<D::Trait>) {
        let previous = self.archetypes.insert(gid, conforms_to);
        assert!(previous.is_none(), "archetype bound by more than one declaration");
    }

    pub fn get_trait(&self, trid: &D::Trait) -> &TraitDecl<D> {
        self.traits.get(trid).expect("trait not declared")
    }

    pub fn get_nominal(&self, decl: &D::Nominal) -> &NominalDecl<D> {
        self.nominals.get(decl).expect("nominal type not declared")
    }

    /// The trait an associated type is declared in
    pub fn association_owner(&self, assoc: &D::Association) -> Option<&D::Trait> {
        self.association_owners.get(assoc)
    }

    /// The trait a value requirement is declared in
    pub fn requirement_owner(&self, requirement: &D::Value) -> Option<&D::Trait> {
        self.requirement_owners.get(requirement)
    }

    /// The traits an archetype is declared to conform to
    pub fn conforms_to(&self, gid: &D::Generic) -> Option<&[D::Trait]> {
        self.archetypes.get(gid).map(Vec::as_slice)
    }

    pub fn generic_params(&self, decl: &D::Nominal) -> &Generics<D> {
        &self.get_nominal(decl).generics
    }

    /// Whether `trait_` is `ancestor` or (transitively) inherits from it
    pub fn inherits_from(&self, trait_: &D::Trait, ancestor: &D::Trait) -> bool {
        trait_ == ancestor
            || self
                .get_trait(trait_)
                .inherits()
                .iter()
                .any(|parent| self.inherits_from(parent, ancestor))
    }
}

impl<D: TypeData> fmt::Display for Declarations<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.traits
                .values()
                .map(|t| t.to_string())
                .chain(self.nominals.values().map(|n| n.to_string()))
                .sorted()
                .format("\n")
        )
    }
}
