use crate::{
    Conformance, ConformanceId, Declarations, Substitution, SubstitutionId, TypeArena, TypeData,
};
use itertools::Itertools;
use owo_colors::OwoColorize;
use std::fmt;

/// The compilation session owning every type, conformance and substitution.
///
/// Nothing is ever freed individually. Everything is addressed by handle and lives as long as
/// the context does.
///
/// Mutation, including the lazy derivation of specialized type witnesses, requires `&mut self`.
/// Once populated, a `Context` can be shared for concurrent reads.
#[derive(Debug, Clone)]
pub struct Context<D: TypeData> {
    pub types: TypeArena<D>,
    pub decls: Declarations<D>,

    pub(crate) conformances: Vec<Conformance<D>>,
    pub(crate) substitutions: Vec<Substitution<D>>,
}

impl<D: TypeData> Default for Context<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TypeData> Context<D> {
    pub fn new() -> Self {
        Self::with_declarations(Declarations::new())
    }

    pub fn with_declarations(decls: Declarations<D>) -> Self {
        Self {
            types: TypeArena::new(),
            decls,
            conformances: vec![],
            substitutions: vec![],
        }
    }

    pub(crate) fn alloc_conformance(&mut self, conformance: Conformance<D>) -> ConformanceId {
        let id = ConformanceId::from(self.conformances.len());
        self.conformances.push(conformance);
        id
    }

    pub fn alloc_substitution(&mut self, sub: Substitution<D>) -> SubstitutionId {
        let id = SubstitutionId::from(self.substitutions.len());
        self.substitutions.push(sub);
        id
    }

    pub fn conformance(&self, id: ConformanceId) -> &Conformance<D> {
        self.conformances
            .get(id.index())
            .expect("conformance not defined")
    }

    pub(crate) fn conformance_mut(&mut self, id: ConformanceId) -> &mut Conformance<D> {
        self.conformances
            .get_mut(id.index())
            .expect("conformance not defined")
    }

    pub fn substitution(&self, id: SubstitutionId) -> &Substitution<D> {
        self.substitutions
            .get(id.index())
            .expect("substitution not defined")
    }

    pub fn conformance_count(&self) -> usize {
        self.conformances.len()
    }

    pub fn conformance_ids(&self) -> impl Iterator<Item = ConformanceId> {
        (0..self.conformances.len()).map(ConformanceId::from)
    }
}

impl<D: TypeData> fmt::Display for Context<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\n  {}",
            "with conformances".green(),
            self.conformance_ids().format_with("\n  ", |id, f| {
                let conformance = self.conformance(id);
                let origin = match conformance {
                    Conformance::Normal(_) => String::new(),
                    Conformance::Specialized(spec) => {
                        format!(" {} #{}", "from".purple(), spec.generic_conformance().index())
                    }
                    Conformance::Inherited(inherited) => format!(
                        " {} #{}",
                        "from".purple(),
                        inherited.inherited_conformance().index()
                    ),
                };
                f(&format_args!(
                    "#{} {} {}: {}{}",
                    id.index(),
                    conformance.kind().describe().blue(),
                    self.types.display(conformance.conforming_type()),
                    self.protocol(id),
                    origin,
                ))
            })
        )
    }
}
