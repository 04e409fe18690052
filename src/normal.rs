use crate::{
    Conformance, ConformanceId, Context, Substitution, SubstitutionId, TypeData, TypeId,
    WitnessError,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConformanceState {
    Incomplete,
    Complete,
}

/// A reference to the declaration witnessing a value requirement, along with the substitutions
/// it is referenced under.
#[derive(Debug, Clone, PartialEq)]
pub struct WitnessRef<D: TypeData> {
    pub decl: D::Value,
    pub substitutions: Vec<SubstitutionId>,
}

impl<D: TypeData> WitnessRef<D> {
    pub fn new(decl: D::Value) -> Self {
        Self {
            decl,
            substitutions: vec![],
        }
    }
}

pub type InheritedConformances<D> = HashMap<<D as TypeData>::Trait, ConformanceId>;

#[derive(Debug, Clone)]
struct Witnesses<D: TypeData> {
    types: HashMap<D::Association, SubstitutionId>,
    values: HashMap<D::Value, WitnessRef<D>>,
    inherited: InheritedConformances<D>,
    defaulted: HashSet<D::Value>,
}

impl<D: TypeData> Default for Witnesses<D> {
    fn default() -> Self {
        Self {
            types: HashMap::new(),
            values: HashMap::new(),
            inherited: HashMap::new(),
            defaulted: HashSet::new(),
        }
    }
}

/// The witness table of a conformance that's still being checked.
///
/// Entries can only be added, and only once per key.
#[derive(Debug, Clone)]
pub struct WitnessTableBuilder<D: TypeData> {
    witnesses: Witnesses<D>,
}

/// A finished witness table. Read-only.
#[derive(Debug, Clone)]
pub struct WitnessTable<D: TypeData> {
    witnesses: Witnesses<D>,
}

impl<D: TypeData> Default for WitnessTableBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TypeData> Default for WitnessTable<D> {
    fn default() -> Self {
        Self {
            witnesses: Witnesses::default(),
        }
    }
}

impl<D: TypeData> WitnessTableBuilder<D> {
    pub fn new() -> Self {
        Self {
            witnesses: Witnesses::default(),
        }
    }

    pub fn set_type_witness(
        &mut self,
        assoc: D::Association,
        sub: SubstitutionId,
    ) -> Result<(), WitnessError<D>> {
        if self.witnesses.types.contains_key(&assoc) {
            return Err(WitnessError::TypeWitnessAlreadySet(assoc));
        }
        self.witnesses.types.insert(assoc, sub);
        Ok(())
    }

    pub fn set_witness(
        &mut self,
        requirement: D::Value,
        witness: WitnessRef<D>,
    ) -> Result<(), WitnessError<D>> {
        if self.witnesses.values.contains_key(&requirement) {
            return Err(WitnessError::WitnessAlreadySet(requirement));
        }
        self.witnesses.values.insert(requirement, witness);
        Ok(())
    }

    pub fn set_inherited_conformance(
        &mut self,
        trait_: D::Trait,
        conformance: ConformanceId,
    ) -> Result<(), WitnessError<D>> {
        if self.witnesses.inherited.contains_key(&trait_) {
            return Err(WitnessError::InheritedAlreadySet(trait_));
        }
        self.witnesses.inherited.insert(trait_, conformance);
        Ok(())
    }

    pub fn add_default_definition(&mut self, requirement: D::Value) {
        self.witnesses.defaulted.insert(requirement);
    }

    #[must_use]
    pub fn finish(self) -> WitnessTable<D> {
        WitnessTable {
            witnesses: self.witnesses,
        }
    }
}

macro_rules! impl_witness_lookups {
    ($table:ident) => {
        impl<D: TypeData> $table<D> {
            pub fn type_witness(&self, assoc: &D::Association) -> Option<SubstitutionId> {
                self.witnesses.types.get(assoc).copied()
            }

            pub fn witness(&self, requirement: &D::Value) -> Option<&WitnessRef<D>> {
                self.witnesses.values.get(requirement)
            }

            pub fn inherited_conformances(&self) -> &InheritedConformances<D> {
                &self.witnesses.inherited
            }

            pub fn uses_default_definition(&self, requirement: &D::Value) -> bool {
                self.witnesses.defaulted.contains(requirement)
            }
        }
    };
}

impl_witness_lookups!(WitnessTableBuilder);
impl_witness_lookups!(WitnessTable);

#[derive(Debug, Clone)]
enum Phase<D: TypeData> {
    Incomplete(WitnessTableBuilder<D>),
    Complete(WitnessTable<D>),
}

/// The conformance of a type to a trait, as established by the conformance checker
#[derive(Debug, Clone)]
pub struct NormalConformance<D: TypeData> {
    pub(crate) protocol: D::Trait,
    pub(crate) conforming_type: TypeId,
    pub(crate) context: D::Context,
    table: Phase<D>,
}

impl<D: TypeData> NormalConformance<D> {
    pub fn new(protocol: D::Trait, conforming_type: TypeId, context: D::Context) -> Self {
        Self {
            protocol,
            conforming_type,
            context,
            table: Phase::Incomplete(WitnessTableBuilder::new()),
        }
    }

    pub fn protocol(&self) -> &D::Trait {
        &self.protocol
    }

    pub fn conforming_type(&self) -> TypeId {
        self.conforming_type
    }

    pub fn decl_context(&self) -> &D::Context {
        &self.context
    }

    pub fn state(&self) -> ConformanceState {
        match &self.table {
            Phase::Incomplete(_) => ConformanceState::Incomplete,
            Phase::Complete(_) => ConformanceState::Complete,
        }
    }

    pub(crate) fn builder_mut(&mut self) -> Result<&mut WitnessTableBuilder<D>, WitnessError<D>> {
        match &mut self.table {
            Phase::Incomplete(builder) => Ok(builder),
            Phase::Complete(_) => Err(WitnessError::AlreadyComplete(self.protocol.clone())),
        }
    }

    pub(crate) fn complete(&mut self) -> Result<(), WitnessError<D>> {
        let table = std::mem::replace(&mut self.table, Phase::Complete(WitnessTable::default()));
        match table {
            Phase::Incomplete(builder) => {
                self.table = Phase::Complete(builder.finish());
                Ok(())
            }
            Phase::Complete(frozen) => {
                self.table = Phase::Complete(frozen);
                Err(WitnessError::AlreadyComplete(self.protocol.clone()))
            }
        }
    }

    pub fn type_witness(&self, assoc: &D::Association) -> Option<SubstitutionId> {
        match &self.table {
            Phase::Incomplete(builder) => builder.type_witness(assoc),
            Phase::Complete(table) => table.type_witness(assoc),
        }
    }

    pub fn witness(&self, requirement: &D::Value) -> Option<&WitnessRef<D>> {
        match &self.table {
            Phase::Incomplete(builder) => builder.witness(requirement),
            Phase::Complete(table) => table.witness(requirement),
        }
    }

    pub fn inherited_conformances(&self) -> &InheritedConformances<D> {
        match &self.table {
            Phase::Incomplete(builder) => builder.inherited_conformances(),
            Phase::Complete(table) => table.inherited_conformances(),
        }
    }

    pub fn uses_default_definition(&self, requirement: &D::Value) -> bool {
        match &self.table {
            Phase::Incomplete(builder) => builder.uses_default_definition(requirement),
            Phase::Complete(table) => table.uses_default_definition(requirement),
        }
    }
}

fn normal_mut<D: TypeData>(
    conformances: &mut [Conformance<D>],
    id: ConformanceId,
) -> Result<&mut NormalConformance<D>, WitnessError<D>> {
    match conformances.get_mut(id.index()).expect("conformance not defined") {
        Conformance::Normal(normal) => Ok(normal),
        other => Err(WitnessError::NotNormal(other.kind().describe())),
    }
}

impl<D: TypeData> Context<D> {
    pub fn normal_conformance(
        &mut self,
        protocol: D::Trait,
        conforming_type: TypeId,
        context: D::Context,
    ) -> ConformanceId {
        tracing::debug!(
            protocol = %protocol,
            type_ = %self.types.display(conforming_type),
            "allocating normal conformance"
        );
        self.alloc_conformance(Conformance::Normal(NormalConformance::new(
            protocol,
            conforming_type,
            context,
        )))
    }

    pub fn try_set_type_witness(
        &mut self,
        id: ConformanceId,
        assoc: D::Association,
        sub: Substitution<D>,
    ) -> Result<(), WitnessError<D>> {
        let normal = normal_mut(&mut self.conformances, id)?;

        match self.decls.association_owner(&assoc) {
            None => return Err(WitnessError::UndeclaredAssociation(assoc)),
            Some(owner) if *owner != normal.protocol => {
                return Err(WitnessError::AssociationInWrongTrait {
                    owner: owner.clone(),
                    expected: normal.protocol.clone(),
                    assoc,
                })
            }
            Some(owner) => {
                let declared = self.decls.get_trait(owner).association(&assoc);
                if let Some(declared) = declared.filter(|decl| decl.archetype != sub.archetype) {
                    return Err(WitnessError::ArchetypeMismatch {
                        expected: declared.archetype.clone(),
                        found: sub.archetype,
                        assoc,
                    });
                }
            }
        }

        if normal.type_witness(&assoc).is_some() {
            return Err(WitnessError::TypeWitnessAlreadySet(assoc));
        }
        normal.builder_mut()?;

        tracing::trace!(
            protocol = %normal.protocol,
            assoc = %assoc,
            witness = %sub.display(&self.types),
            "type witness"
        );

        let sid = SubstitutionId::from(self.substitutions.len());
        self.substitutions.push(sub);

        normal.builder_mut()?.set_type_witness(assoc, sid)
    }

    /// Record the type witness for an associated type.
    ///
    /// # Panics
    ///
    /// If the associated type belongs to another trait, `sub` isn't stated over the archetype
    /// the trait declares for it, the associated type already has a witness, or the conformance
    /// is complete.
    pub fn set_type_witness(
        &mut self,
        id: ConformanceId,
        assoc: D::Association,
        sub: Substitution<D>,
    ) {
        if let Err(err) = self.try_set_type_witness(id, assoc, sub) {
            panic!("{}", err);
        }
    }

    pub fn try_set_witness(
        &mut self,
        id: ConformanceId,
        requirement: D::Value,
        witness: WitnessRef<D>,
    ) -> Result<(), WitnessError<D>> {
        let normal = normal_mut(&mut self.conformances, id)?;

        match self.decls.requirement_owner(&requirement) {
            None => return Err(WitnessError::UndeclaredRequirement(requirement)),
            Some(owner) if *owner != normal.protocol => {
                return Err(WitnessError::RequirementInWrongTrait {
                    owner: owner.clone(),
                    expected: normal.protocol.clone(),
                    requirement,
                })
            }
            Some(_) => {}
        }

        if normal.witness(&requirement).is_some() {
            return Err(WitnessError::WitnessAlreadySet(requirement));
        }

        tracing::trace!(
            protocol = %normal.protocol,
            requirement = %requirement,
            witness = %witness.decl,
            "witness"
        );

        normal.builder_mut()?.set_witness(requirement, witness)
    }

    /// Record the witness for a value requirement.
    ///
    /// # Panics
    ///
    /// If the requirement belongs to another trait, already has a witness, or the conformance
    /// is complete.
    pub fn set_witness(
        &mut self,
        id: ConformanceId,
        requirement: D::Value,
        witness: WitnessRef<D>,
    ) {
        if let Err(err) = self.try_set_witness(id, requirement, witness) {
            panic!("{}", err);
        }
    }

    pub fn try_set_inherited_conformance(
        &mut self,
        id: ConformanceId,
        inherited: D::Trait,
        conformance: ConformanceId,
    ) -> Result<(), WitnessError<D>> {
        let normal = normal_mut(&mut self.conformances, id)?;

        if normal.protocol == inherited || !self.decls.inherits_from(&normal.protocol, &inherited) {
            return Err(WitnessError::NotInherited {
                trait_: normal.protocol.clone(),
                inherited,
            });
        }

        normal
            .builder_mut()?
            .set_inherited_conformance(inherited, conformance)
    }

    pub fn set_inherited_conformance(
        &mut self,
        id: ConformanceId,
        inherited: D::Trait,
        conformance: ConformanceId,
    ) {
        if let Err(err) = self.try_set_inherited_conformance(id, inherited, conformance) {
            panic!("{}", err);
        }
    }

    /// Mark the witness of `requirement` as coming from the trait's default definition
    pub fn add_default_definition(&mut self, id: ConformanceId, requirement: D::Value) {
        let result = normal_mut(&mut self.conformances, id)
            .and_then(|normal| normal.builder_mut())
            .map(|builder| builder.add_default_definition(requirement));

        if let Err(err) = result {
            panic!("{}", err);
        }
    }

    /// Freeze the witness table of a normal conformance
    pub fn complete(&mut self, id: ConformanceId) {
        let result = normal_mut(&mut self.conformances, id).and_then(|normal| {
            tracing::debug!(protocol = %normal.protocol, "conformance complete");
            normal.complete()
        });

        if let Err(err) = result {
            panic!("{}", err);
        }
    }
}
