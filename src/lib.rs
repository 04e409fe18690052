//! Records of types conforming to traits, and the derivation of conformances for
//! instantiations of generic types.

mod forall;
pub use forall::Generics;

mod r#type;
pub use r#type::{DisplayType, Key, Type, TypeArena, TypeData, TypeId, TypeKind, TypesBuf};

mod mapping;
pub use mapping::{DisplayMapping, Mapping};

mod visitor;

mod error;
pub use error::{SpecializationError, SubstError, WitnessError};

mod substitution;
pub use substitution::{
    ConformanceRef, Conformances, DisplaySubstitution, Substitution, SubstitutionId,
};

mod context;
pub use context::Context;

mod conformance;
pub use conformance::{Conformance, ConformanceId, ConformanceKind};

mod normal;
pub use normal::{
    ConformanceState, InheritedConformances, NormalConformance, WitnessRef, WitnessTable,
    WitnessTableBuilder,
};

mod specialized;
pub use specialized::SpecializedConformance;

mod inherited;
pub use inherited::InheritedConformance;

mod query;
pub use query::{ConformanceOracle, ConformanceTable};

pub mod frontend;
pub use frontend::Declarations;

#[cfg(test)]
mod tests;
