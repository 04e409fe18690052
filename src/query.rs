use crate::{
    ConformanceId, ConformanceRef, Conformances, Context, Substitution, TypeData, TypeId, TypeKind,
};
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

/// Answers whether a type conforms to a trait.
///
/// Consulted when a specialized type witness needs the conformances of its new replacement type.
pub trait ConformanceOracle<D: TypeData> {
    fn lookup_conformance(
        &mut self,
        ctx: &mut Context<D>,
        type_: TypeId,
        trait_: &D::Trait,
    ) -> Option<ConformanceRef>;
}

/// The conformances declared by a module, indexed by trait
pub struct ConformanceTable<D: TypeData> {
    trids: HashMap<D::Trait, Variants<D>>,
}

#[derive(Debug)]
struct Variants<D: TypeData> {
    /// Conformances of one exact type, including specializations already handed out
    concrete: HashMap<TypeId, ConformanceId>,
    /// Conformances stated over the generic parameters of a declaration
    generic: HashMap<D::Nominal, ConformanceId>,
}

impl<D: TypeData> Default for ConformanceTable<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TypeData> ConformanceTable<D> {
    pub fn new() -> Self {
        ConformanceTable {
            trids: HashMap::new(),
        }
    }

    /// Make `conformance` visible to lookups.
    ///
    /// Conformances with generic parameters apply to every instantiation of their conforming
    /// type's declaration.
    pub fn implement(&mut self, ctx: &Context<D>, conformance: ConformanceId) {
        let trid = ctx.protocol(conformance).clone();
        let conforming_type = ctx.conforming_type(conformance);
        let tvariant = self.trids.entry(trid).or_insert_with(Variants::new);

        let decl = ctx.types.get(conforming_type).decl();

        match (ctx.generic_params(conformance), decl) {
            (Some(_), Some(decl)) => {
                let previous = tvariant.generic.insert(decl.clone(), conformance);
                assert!(previous.is_none(), "conflicting generic conformances");
            }
            _ => {
                let previous = tvariant.concrete.insert(conforming_type, conformance);
                assert!(previous.is_none(), "conflicting conformances");
            }
        }
    }

    fn specialize(
        &mut self,
        ctx: &mut Context<D>,
        generic: ConformanceId,
        type_: TypeId,
    ) -> Option<ConformanceId> {
        let root = ctx.generic_root(type_)?;
        let root_type = ctx.types.get(root).clone();
        let generics = ctx.decls.generic_params(root_type.decl()?).clone();

        #[cfg(debug_assertions)]
        if generics.len() != root_type.params.len() {
            panic!("mismatched amount of type parameters");
        }

        let mut substitutions = Vec::with_capacity(generics.len());
        for ((gid, constrs), param) in generics.iter().zip(root_type.params.iter()) {
            let conformances = constrs
                .iter()
                .map(|trid| self.lookup_conformance(ctx, *param, trid))
                .collect::<Option<Conformances>>()?;
            substitutions.push(Substitution::new(gid.clone(), *param, conformances));
        }

        Some(ctx.specialize(generic, type_, substitutions))
    }
}

impl<D: TypeData> ConformanceOracle<D> for ConformanceTable<D> {
    fn lookup_conformance(
        &mut self,
        ctx: &mut Context<D>,
        type_: TypeId,
        trait_: &D::Trait,
    ) -> Option<ConformanceRef> {
        let decl = match &ctx.types.get(type_).constr {
            TypeKind::Archetype(gid) => {
                let conforms = ctx
                    .decls
                    .conforms_to(gid)
                    .unwrap_or(&[])
                    .iter()
                    .any(|trid| ctx.decls.inherits_from(trid, trait_));
                return if conforms {
                    Some(ConformanceRef::Abstract)
                } else {
                    None
                };
            }
            TypeKind::Nominal(decl) => decl.clone(),
        };

        let variants = self.trids.get(trait_)?;
        if let Some(known) = variants.concrete.get(&type_) {
            return Some(ConformanceRef::Concrete(*known));
        }

        let generic = *variants.generic.get(&decl)?;
        if ctx.conforming_type(generic) == type_ {
            return Some(ConformanceRef::Concrete(generic));
        }

        let specialized = self.specialize(ctx, generic, type_)?;
        tracing::trace!(
            trait_ = %trait_,
            type_ = %ctx.types.display(type_),
            "specialized generic conformance"
        );

        self.trids
            .get_mut(trait_)
            .expect("trait vanished from index")
            .concrete
            .insert(type_, specialized);

        Some(ConformanceRef::Concrete(specialized))
    }
}

impl<D: TypeData> Variants<D> {
    fn new() -> Self {
        Self {
            concrete: HashMap::new(),
            generic: HashMap::new(),
        }
    }
}

impl<D: TypeData> fmt::Debug for ConformanceTable<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.trids.is_empty() {
            write!(f, "![]!")
        } else {
            writeln!(f, "![")?;
            for (trid, variants) in &self.trids {
                writeln!(
                    f,
                    "  {}: concrete #[{}] generic #[{}]",
                    trid,
                    variants.concrete.values().map(|id| id.index()).sorted().format(", "),
                    variants.generic.values().map(|id| id.index()).sorted().format(", "),
                )?;
            }
            write!(f, "]!")
        }
    }
}
