use super::*;

/// A struct, enum or class declaration
#[derive(Debug, Clone)]
pub struct NominalDecl<D: TypeData> {
    pub identifier: D::Nominal,
    pub generics: Generics<D>,
}

impl<D: TypeData> NominalDecl<D> {
    pub fn new(identifier: D::Nominal, generics: Generics<D>) -> Self {
        Self {
            identifier,
            generics,
        }
    }
}

impl<D: TypeData> fmt::Display for NominalDecl<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.generics.is_empty() {
            write!(f, "{}", self.identifier)
        } else {
            write!(f, "∀{}. {}", &self.generics, self.identifier)
        }
    }
}
