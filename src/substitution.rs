use crate::{define_key, ConformanceId, TypeArena, TypeData, TypeId};
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt;

define_key!(
    SubstitutionId,
    "Handle to a `Substitution` allocated in a `Context`"
);

/// How a replacement type satisfies one of the traits its archetype requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConformanceRef {
    Concrete(ConformanceId),
    /// The replacement is itself an archetype, conforming through its own declared requirements
    Abstract,
}

pub type Conformances = SmallVec<[ConformanceRef; 4]>;

/// An archetype replaced by a type, along with the conformances proving that the replacement
/// meets the archetype's requirements. One entry per trait in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution<D: TypeData> {
    pub archetype: D::Generic,
    pub replacement: TypeId,
    pub conformances: Conformances,
}

impl<D: TypeData> Substitution<D> {
    pub fn new(archetype: D::Generic, replacement: TypeId, conformances: Conformances) -> Self {
        Self {
            archetype,
            replacement,
            conformances,
        }
    }

    pub fn display<'a>(&'a self, types: &'a TypeArena<D>) -> DisplaySubstitution<'a, D> {
        DisplaySubstitution { sub: self, types }
    }
}

pub struct DisplaySubstitution<'a, D: TypeData> {
    sub: &'a Substitution<D>,
    types: &'a TypeArena<D>,
}

impl<'a, D: TypeData> fmt::Display for DisplaySubstitution<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} := {}",
            self.sub.archetype,
            self.types.display(self.sub.replacement)
        )?;

        if !self.sub.conformances.is_empty() {
            write!(
                f,
                " [{}]",
                self.sub
                    .conformances
                    .iter()
                    .format_with(", ", |conf, f| match conf {
                        ConformanceRef::Concrete(id) => f(&format_args!("#{}", id.index())),
                        ConformanceRef::Abstract => f(&"abstract"),
                    })
            )?;
        }

        Ok(())
    }
}
