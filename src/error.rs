use crate::TypeData;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubstError<D: TypeData> {
    #[error("archetype {0} has no substitution")]
    Unbound(D::Generic),
}

/// Precondition violations when populating a normal conformance
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WitnessError<D: TypeData> {
    #[error("associated type {0} is not declared by any trait")]
    UndeclaredAssociation(D::Association),
    #[error("associated type {assoc} belongs to {owner}, not {expected}")]
    AssociationInWrongTrait {
        assoc: D::Association,
        owner: D::Trait,
        expected: D::Trait,
    },
    #[error("type witness for {assoc} is stated over {found}, expected {expected}")]
    ArchetypeMismatch {
        assoc: D::Association,
        expected: D::Generic,
        found: D::Generic,
    },
    #[error("{0} is not a requirement of any trait")]
    UndeclaredRequirement(D::Value),
    #[error("requirement {requirement} belongs to {owner}, not {expected}")]
    RequirementInWrongTrait {
        requirement: D::Value,
        owner: D::Trait,
        expected: D::Trait,
    },
    #[error("{inherited} is not inherited by {trait_}")]
    NotInherited { inherited: D::Trait, trait_: D::Trait },

    #[error("type witness for {0} already known")]
    TypeWitnessAlreadySet(D::Association),
    #[error("witness for {0} already known")]
    WitnessAlreadySet(D::Value),
    #[error("inherited conformance to {0} already known")]
    InheritedAlreadySet(D::Trait),

    #[error("conformance to {0} already complete")]
    AlreadyComplete(D::Trait),
    #[error("only normal conformances have witness tables, found {0} conformance")]
    NotNormal(&'static str),
}

/// Failures while deriving a type witness.
///
/// None of these are user errors. They mean an earlier phase handed over a conformance or a
/// substitution list that the type checker should never have accepted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecializationError<D: TypeData> {
    #[error(transparent)]
    Subst(#[from] SubstError<D>),
    #[error("improperly checked substitution: {type_} does not conform to {trait_}")]
    NotConforming { type_: String, trait_: D::Trait },
    #[error("archetype {0} is not declared by any trait or nominal type")]
    UndeclaredArchetype(D::Generic),
    #[error("no type witness for {0}")]
    MissingWitness(D::Association),
}
