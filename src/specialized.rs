use crate::{
    Conformance, ConformanceId, ConformanceOracle, Conformances, Context, Mapping,
    SpecializationError, Substitution, SubstitutionId, TypeData, TypeId,
};
use std::collections::HashMap;

/// A generic conformance applied to a set of substitutions.
///
/// Type witnesses are derived from the generic conformance on first request and memoized.
#[derive(Debug, Clone)]
pub struct SpecializedConformance<D: TypeData> {
    generic: ConformanceId,
    conforming_type: TypeId,
    substitutions: Vec<Substitution<D>>,
    type_witnesses: HashMap<D::Association, SubstitutionId>,
}

impl<D: TypeData> SpecializedConformance<D> {
    pub fn new(
        generic: ConformanceId,
        conforming_type: TypeId,
        substitutions: Vec<Substitution<D>>,
    ) -> Self {
        Self {
            generic,
            conforming_type,
            substitutions,
            type_witnesses: HashMap::new(),
        }
    }

    pub fn generic_conformance(&self) -> ConformanceId {
        self.generic
    }

    pub fn conforming_type(&self) -> TypeId {
        self.conforming_type
    }

    pub fn substitutions(&self) -> &[Substitution<D>] {
        &self.substitutions
    }

    /// The type witness for `assoc` if it has already been derived
    pub fn cached_type_witness(&self, assoc: &D::Association) -> Option<SubstitutionId> {
        self.type_witnesses.get(assoc).copied()
    }
}

impl<D: TypeData> Context<D> {
    /// Specialize `generic` for `conforming_type`, an instantiation of its conforming type
    /// under `substitutions`
    pub fn specialize(
        &mut self,
        generic: ConformanceId,
        conforming_type: TypeId,
        substitutions: Vec<Substitution<D>>,
    ) -> ConformanceId {
        tracing::debug!(
            protocol = %self.protocol(generic),
            generic = %self.types.display(self.conforming_type(generic)),
            type_ = %self.types.display(conforming_type),
            "allocating specialized conformance"
        );
        self.alloc_conformance(Conformance::Specialized(SpecializedConformance::new(
            generic,
            conforming_type,
            substitutions,
        )))
    }

    /// The type witness for an associated type.
    ///
    /// # Panics
    ///
    /// On any `SpecializationError`, as those can only happen if an earlier phase accepted an
    /// ill-formed conformance or substitution.
    pub fn type_witness<O>(
        &mut self,
        oracle: &mut O,
        id: ConformanceId,
        assoc: &D::Association,
    ) -> SubstitutionId
    where
        O: ConformanceOracle<D> + ?Sized,
    {
        match self.try_type_witness(oracle, id, assoc) {
            Ok(sid) => sid,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_type_witness<O>(
        &mut self,
        oracle: &mut O,
        id: ConformanceId,
        assoc: &D::Association,
    ) -> Result<SubstitutionId, SpecializationError<D>>
    where
        O: ConformanceOracle<D> + ?Sized,
    {
        match self.conformance(id) {
            Conformance::Normal(normal) => normal
                .type_witness(assoc)
                .ok_or_else(|| SpecializationError::MissingWitness(assoc.clone())),
            Conformance::Specialized(_) => self.specialize_type_witness(oracle, id, assoc),
            Conformance::Inherited(inherited) => {
                let inherited = inherited.inherited_conformance();
                self.try_type_witness(oracle, inherited, assoc)
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self, oracle))]
    fn specialize_type_witness<O>(
        &mut self,
        oracle: &mut O,
        id: ConformanceId,
        assoc: &D::Association,
    ) -> Result<SubstitutionId, SpecializationError<D>>
    where
        O: ConformanceOracle<D> + ?Sized,
    {
        let (generic, mapping) = match self.conformance(id) {
            Conformance::Specialized(spec) => {
                if let Some(known) = spec.cached_type_witness(assoc) {
                    tracing::trace!("cached");
                    return Ok(known);
                }
                (spec.generic, Mapping::from_substitutions(&spec.substitutions))
            }
            other => unreachable!("specializing a {} conformance", other.kind().describe()),
        };

        let generic_sid = self.try_type_witness(oracle, generic, assoc)?;
        let generic_witness = self.substitution(generic_sid).clone();

        let specialized = mapping.apply(&mut self.types, generic_witness.replacement, true)?;

        if specialized == generic_witness.replacement {
            tracing::trace!("witness does not depend on the substitutions");
            return Ok(self.cache_type_witness(id, assoc, generic_sid));
        }

        tracing::debug!(
            mapping = %mapping.display(&self.types),
            specialized = %self.types.display(specialized),
            "deriving conformances of specialized witness"
        );

        // These lookups can't fail for a type checked substitution
        let requirements = match self.decls.conforms_to(&generic_witness.archetype) {
            Some(traits) => traits.to_vec(),
            None => {
                return Err(SpecializationError::UndeclaredArchetype(
                    generic_witness.archetype,
                ))
            }
        };
        let mut conformances = Conformances::with_capacity(requirements.len());
        for trait_ in requirements {
            match oracle.lookup_conformance(self, specialized, &trait_) {
                Some(conformance) => conformances.push(conformance),
                None => {
                    return Err(SpecializationError::NotConforming {
                        type_: self.types.display(specialized).to_string(),
                        trait_,
                    })
                }
            }
        }

        let sid = self.alloc_substitution(Substitution::new(
            generic_witness.archetype,
            specialized,
            conformances,
        ));
        Ok(self.cache_type_witness(id, assoc, sid))
    }

    /// Returns whichever witness ends up canonical for `assoc`; entries are never replaced
    fn cache_type_witness(
        &mut self,
        id: ConformanceId,
        assoc: &D::Association,
        sid: SubstitutionId,
    ) -> SubstitutionId {
        match self.conformance_mut(id) {
            Conformance::Specialized(spec) => *spec
                .type_witnesses
                .entry(assoc.clone())
                .or_insert(sid),
            other => unreachable!("caching into a {} conformance", other.kind().describe()),
        }
    }
}
