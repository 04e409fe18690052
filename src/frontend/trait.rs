use super::*;

/// An associated type requirement, along with the archetype standing in for it and the traits
/// that archetype must conform to
#[derive(Debug, Clone)]
pub struct AssociatedType<D: TypeData> {
    pub name: D::Association,
    pub archetype: D::Generic,
    pub conforms_to: Vec<D::Trait>,
}

#[derive(Debug, Clone)]
pub struct TraitDecl<D: TypeData> {
    pub identifier: D::Trait,
    associated: Vec<AssociatedType<D>>,
    requirements: Vec<D::Value>,
    inherits: Vec<D::Trait>,
}

impl<D: TypeData> TraitDecl<D> {
    pub fn new(identifier: D::Trait) -> Self {
        TraitDecl {
            identifier,
            associated: vec![],
            requirements: vec![],
            inherits: vec![],
        }
    }

    pub fn push_associated(
        &mut self,
        name: D::Association,
        archetype: D::Generic,
        conforms_to: Vec<D::Trait>,
    ) {
        self.associated.push(AssociatedType {
            name,
            archetype,
            conforms_to,
        });
    }

    pub fn push_requirement(&mut self, requirement: D::Value) {
        self.requirements.push(requirement);
    }

    pub fn push_inherited(&mut self, trid: D::Trait) {
        self.inherits.push(trid);
    }

    pub fn associated(&self) -> &[AssociatedType<D>] {
        &self.associated
    }

    pub fn association(&self, name: &D::Association) -> Option<&AssociatedType<D>> {
        self.associated.iter().find(|assoc| &assoc.name == name)
    }

    pub fn requirements(&self) -> &[D::Value] {
        &self.requirements
    }

    /// Traits directly inherited by this one
    pub fn inherits(&self) -> &[D::Trait] {
        &self.inherits
    }
}

impl<D: TypeData> fmt::Display for TraitDecl<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "trait {}", self.identifier)?;
        if !self.inherits.is_empty() {
            write!(f, ": {}", self.inherits.iter().format(" + "))?;
        }
        write!(
            f,
            " {{ {} }}",
            self.associated
                .iter()
                .map(|assoc| format!("type {}", assoc.name))
                .chain(self.requirements.iter().map(|req| req.to_string()))
                .format(", ")
        )
    }
}
