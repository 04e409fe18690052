use crate::{Type, TypeArena, TypeData, TypeId, TypesBuf};

impl<D: TypeData> TypeArena<D> {
    /// Rebuilds a type bottom-up.
    ///
    /// `f` receives every node with its parameters and parent already mapped, and decides which
    /// type takes its place. Returning `arena.intern(node)` keeps the node as-is.
    pub fn try_map_type<E, F>(&mut self, id: TypeId, f: &mut F) -> Result<TypeId, E>
    where
        F: FnMut(&mut Self, Type<D>) -> Result<TypeId, E>,
    {
        let type_ = self.get(id).clone();

        let params = type_
            .params
            .iter()
            .map(|param| self.try_map_type(*param, f))
            .collect::<Result<TypesBuf, E>>()?;

        let parent = match type_.parent {
            Some(parent) => Some(self.try_map_type(parent, f)?),
            None => None,
        };

        f(
            self,
            Type {
                constr: type_.constr,
                params,
                parent,
            },
        )
    }

    /// Whether any archetype occurs within the type
    pub fn has_archetypes(&self, id: TypeId) -> bool {
        let type_ = self.get(id);
        type_.decl().is_none()
            || type_.params.iter().any(|p| self.has_archetypes(*p))
            || type_.parent.map_or(false, |p| self.has_archetypes(p))
    }
}
