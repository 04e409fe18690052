use crate::{
    define_key, ConformanceState, Context, Generics, InheritedConformance,
    InheritedConformances, NormalConformance, SpecializedConformance, TypeData, TypeId, TypeKind,
    WitnessRef,
};

define_key!(
    ConformanceId,
    "Handle to a conformance allocated in a `Context`"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConformanceKind {
    Normal,
    Specialized,
    Inherited,
}

impl ConformanceKind {
    pub fn describe(self) -> &'static str {
        match self {
            ConformanceKind::Normal => "normal",
            ConformanceKind::Specialized => "specialized",
            ConformanceKind::Inherited => "inherited",
        }
    }
}

/// The record of a type conforming to a trait
#[derive(Debug, Clone)]
pub enum Conformance<D: TypeData> {
    /// Established directly by the conformance checker, owning its witnesses
    Normal(NormalConformance<D>),
    /// A generic conformance applied to concrete type arguments, such as `Array<Int>: Sequence`
    /// derived from `Array<T>: Sequence`
    Specialized(SpecializedConformance<D>),
    /// A conformance reused from a superclass
    Inherited(InheritedConformance),
}

impl<D: TypeData> Conformance<D> {
    pub fn kind(&self) -> ConformanceKind {
        match self {
            Conformance::Normal(_) => ConformanceKind::Normal,
            Conformance::Specialized(_) => ConformanceKind::Specialized,
            Conformance::Inherited(_) => ConformanceKind::Inherited,
        }
    }

    pub fn conforming_type(&self) -> TypeId {
        match self {
            Conformance::Normal(normal) => normal.conforming_type(),
            Conformance::Specialized(spec) => spec.conforming_type(),
            Conformance::Inherited(inherited) => inherited.conforming_type(),
        }
    }
}

// Every query below matches on all three kinds without a wildcard arm, so a new kind of
// conformance can't be added without deciding how it answers each of them.
impl<D: TypeData> Context<D> {
    pub fn kind(&self, id: ConformanceId) -> ConformanceKind {
        self.conformance(id).kind()
    }

    /// The trait being conformed to
    pub fn protocol(&self, id: ConformanceId) -> &D::Trait {
        match self.conformance(id) {
            Conformance::Normal(normal) => normal.protocol(),
            Conformance::Specialized(spec) => self.protocol(spec.generic_conformance()),
            Conformance::Inherited(inherited) => self.protocol(inherited.inherited_conformance()),
        }
    }

    /// The declaration context in which the conformance was stated
    pub fn decl_context(&self, id: ConformanceId) -> &D::Context {
        match self.conformance(id) {
            Conformance::Normal(normal) => normal.decl_context(),
            Conformance::Specialized(spec) => self.decl_context(spec.generic_conformance()),
            Conformance::Inherited(inherited) => {
                self.decl_context(inherited.inherited_conformance())
            }
        }
    }

    pub fn state(&self, id: ConformanceId) -> ConformanceState {
        match self.conformance(id) {
            Conformance::Normal(normal) => normal.state(),
            Conformance::Specialized(spec) => self.state(spec.generic_conformance()),
            Conformance::Inherited(inherited) => self.state(inherited.inherited_conformance()),
        }
    }

    pub fn conforming_type(&self, id: ConformanceId) -> TypeId {
        self.conformance(id).conforming_type()
    }

    /// The witness for a value requirement.
    ///
    /// Specialized conformances hand out the generic conformance's witness as-is, without
    /// applying their substitutions to it.
    pub fn try_witness(&self, id: ConformanceId, requirement: &D::Value) -> Option<&WitnessRef<D>> {
        match self.conformance(id) {
            Conformance::Normal(normal) => normal.witness(requirement),
            Conformance::Specialized(spec) => {
                self.try_witness(spec.generic_conformance(), requirement)
            }
            Conformance::Inherited(inherited) => {
                self.try_witness(inherited.inherited_conformance(), requirement)
            }
        }
    }

    /// # Panics
    ///
    /// If no witness was recorded for `requirement`
    pub fn witness(&self, id: ConformanceId, requirement: &D::Value) -> &WitnessRef<D> {
        match self.try_witness(id, requirement) {
            Some(witness) => witness,
            None => panic!(
                "no witness for {} in conformance of {} to {}",
                requirement,
                self.types.display(self.conforming_type(id)),
                self.protocol(id),
            ),
        }
    }

    /// The conformances to the traits inherited by this conformance's trait
    pub fn inherited_conformances(&self, id: ConformanceId) -> &InheritedConformances<D> {
        match self.conformance(id) {
            Conformance::Normal(normal) => normal.inherited_conformances(),
            Conformance::Specialized(spec) => {
                self.inherited_conformances(spec.generic_conformance())
            }
            Conformance::Inherited(inherited) => {
                self.inherited_conformances(inherited.inherited_conformance())
            }
        }
    }

    /// Whether the witness for `requirement` is the trait's default definition, or was
    /// otherwise deduced
    pub fn uses_default_definition(&self, id: ConformanceId, requirement: &D::Value) -> bool {
        match self.conformance(id) {
            Conformance::Normal(normal) => normal.uses_default_definition(requirement),
            Conformance::Specialized(spec) => {
                self.uses_default_definition(spec.generic_conformance(), requirement)
            }
            Conformance::Inherited(inherited) => {
                self.uses_default_definition(inherited.inherited_conformance(), requirement)
            }
        }
    }

    /// The generic parameters the conformance is stated over.
    ///
    /// For a normal conformance the enclosing types of the conforming type are walked until one
    /// that isn't a plain nominal type is reached. If that's a bound generic type, its
    /// declaration's parameters are returned.
    ///
    /// Specialized and inherited conformances could in principle still be open over some
    /// parameters, but that isn't tracked and they always return `None`.
    pub fn generic_params(&self, id: ConformanceId) -> Option<&Generics<D>> {
        match self.conformance(id) {
            Conformance::Normal(normal) => {
                let root = self.generic_root(normal.conforming_type())?;
                let type_ = self.types.get(root);
                let decl = type_.decl()?;
                let generics = self.decls.generic_params(decl);

                debug_assert!(
                    type_.params.len() == generics.len()
                        && type_.params.iter().zip(generics.gids()).all(|(param, gid)| {
                            self.types.get(*param).constr == TypeKind::Archetype(gid.clone())
                        }),
                    "conformance for constrained generic type not implemented"
                );

                Some(generics)
            }
            Conformance::Specialized(_) => None,
            Conformance::Inherited(_) => None,
        }
    }

    /// Walks out of plain nested nominal types until reaching a bound generic type
    pub(crate) fn generic_root(&self, mut id: TypeId) -> Option<TypeId> {
        loop {
            let type_ = self.types.get(id);
            if type_.is_bound_generic() {
                return Some(id);
            }
            match &type_.constr {
                TypeKind::Nominal(_) => id = type_.parent?,
                TypeKind::Archetype(_) => return None,
            }
        }
    }
}
