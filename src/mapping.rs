use crate::{SubstError, Substitution, TypeArena, TypeData, TypeId, TypeKind};
use itertools::Itertools;
use owo_colors::OwoColorize;
use std::fmt;

/// Maps archetypes to the types replacing them
#[derive(Debug, Clone)]
pub struct Mapping<D: TypeData> {
    conversion: Vec<(D::Generic, TypeId)>,
}

impl<D: TypeData> Default for Mapping<D> {
    fn default() -> Self {
        Self { conversion: vec![] }
    }
}

fn find<G: PartialEq>(gids: &[(G, TypeId)], gid: &G) -> Option<TypeId> {
    gids.iter()
        .find_map(|(g, id)| if g == gid { Some(*id) } else { None })
}

impl<D: TypeData> Mapping<D> {
    pub fn from_substitutions(substitutions: &[Substitution<D>]) -> Self {
        let mut mapping = Mapping::default();
        for sub in substitutions {
            mapping.assign(sub.archetype.clone(), sub.replacement);
        }
        mapping
    }

    pub fn resolve_gid(&self, gid: &D::Generic) -> Option<TypeId> {
        find(&self.conversion, gid)
    }

    /// Binds `gid`, shadowing any earlier binding of the same archetype
    pub fn assign(&mut self, gid: D::Generic, replacement: TypeId) {
        self.conversion.insert(0, (gid, replacement))
    }

    /// Substitute every archetype bound by this mapping.
    ///
    /// With `strict`, an archetype that isn't bound is an error. Otherwise it's left in place.
    ///
    /// The result is the same `TypeId` as the input if nothing was replaced.
    pub fn apply(
        &self,
        types: &mut TypeArena<D>,
        id: TypeId,
        strict: bool,
    ) -> Result<TypeId, SubstError<D>> {
        types.try_map_type(id, &mut |types, type_| {
            if let TypeKind::Archetype(gid) = &type_.constr {
                match self.resolve_gid(gid) {
                    Some(replacement) => return Ok(replacement),
                    None if strict => return Err(SubstError::Unbound(gid.clone())),
                    None => {}
                }
            }
            Ok(types.intern(type_))
        })
    }

    pub fn display<'a>(&'a self, types: &'a TypeArena<D>) -> DisplayMapping<'a, D> {
        DisplayMapping {
            mapping: self,
            types,
        }
    }
}

pub struct DisplayMapping<'a, D: TypeData> {
    mapping: &'a Mapping<D>,
    types: &'a TypeArena<D>,
}

impl<'a, D: TypeData> fmt::Display for DisplayMapping<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.mapping.conversion.is_empty() {
            return Ok(());
        }

        write!(
            f,
            "{} ({})",
            "converting".green(),
            self.mapping
                .conversion
                .iter()
                .format_with(" ", |(gid, id), f| f(&format_args!(
                    "{} {} {}",
                    gid,
                    "->".purple(),
                    self.types.display(*id),
                )))
        )
    }
}
