use crate::{Conformance, ConformanceId, Context, TypeData, TypeId};

/// A conformance reused by a subclass from its superclass.
///
/// Every query other than the conforming type is answered by the inherited conformance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InheritedConformance {
    conforming_type: TypeId,
    inherited: ConformanceId,
}

impl InheritedConformance {
    pub fn new(conforming_type: TypeId, inherited: ConformanceId) -> Self {
        Self {
            conforming_type,
            inherited,
        }
    }

    pub fn conforming_type(&self) -> TypeId {
        self.conforming_type
    }

    pub fn inherited_conformance(&self) -> ConformanceId {
        self.inherited
    }
}

impl<D: TypeData> Context<D> {
    /// Reuse `inherited` for the subclass `conforming_type`
    pub fn inherit(&mut self, inherited: ConformanceId, conforming_type: TypeId) -> ConformanceId {
        tracing::debug!(
            protocol = %self.protocol(inherited),
            type_ = %self.types.display(conforming_type),
            "allocating inherited conformance"
        );
        self.alloc_conformance(Conformance::Inherited(InheritedConformance::new(
            conforming_type,
            inherited,
        )))
    }
}
