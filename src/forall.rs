use crate::TypeData;
use itertools::Itertools;
use std::fmt;

/// A formal generic parameter list along with the interfaces each parameter is required to
/// conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct Generics<D: TypeData> {
    inner: Vec<(D::Generic, Vec<D::Trait>)>,
}

impl<D: TypeData> Default for Generics<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TypeData> Generics<D> {
    pub fn new() -> Self {
        Self { inner: vec![] }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn insert_with_con(&mut self, gid: D::Generic, con: Vec<D::Trait>) {
        self.inner.push((gid, con));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(D::Generic, Vec<D::Trait>)> {
        self.inner.iter()
    }

    pub fn gids(&self) -> impl Iterator<Item = &D::Generic> {
        self.inner.iter().map(|(gid, _)| gid)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<D: TypeData> fmt::Display for Generics<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.inner.iter().format_with(", ", |(gen, constrs), f| {
                if constrs.is_empty() {
                    f(gen)
                } else {
                    f(&format_args!("{}: {}", &gen, constrs.iter().format(" + ")))
                }
            })
        )
    }
}
