//! Tensor wrappers, adapted from https://github.com/jamjamjon/usls

use anyhow::{bail, Result};
use ndarray::{Array, IxDyn};

/// Model input, wrapper over [`Array<f32, IxDyn>`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl From<Vec<f32>> for X {
    fn from(x: Vec<f32>) -> Self {
        Self(Array::from_vec(x).into_dyn().into_owned())
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self> {
        Ok(Self::from(Array::from_shape_vec(shape, xs)?))
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }
}

/// Ordered, named collection of tensors passed between pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct Xs {
    items: Vec<(String, X)>,
}

impl From<X> for Xs {
    fn from(x: X) -> Self {
        let mut xs = Self::default();
        xs.push(x);
        xs
    }
}

impl From<Vec<X>> for Xs {
    fn from(xs: Vec<X>) -> Self {
        let mut ys = Self::default();
        for x in xs {
            ys.push(x);
        }
        ys
    }
}

impl std::ops::Index<usize> for Xs {
    type Output = X;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index].1
    }
}

impl IntoIterator for Xs {
    type Item = X;
    type IntoIter = std::iter::Map<std::vec::IntoIter<(String, X)>, fn((String, X)) -> X>;

    fn into_iter(self) -> Self::IntoIter {
        let take: fn((String, X)) -> X = |(_, x)| x;
        self.items.into_iter().map(take)
    }
}

impl Xs {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends an unnamed tensor; its key is its position.
    pub fn push(&mut self, x: X) {
        let key = self.items.len().to_string();
        self.items.push((key, x));
    }

    pub fn push_kv(&mut self, key: &str, x: X) -> Result<()> {
        if self.items.iter().any(|(k, _)| k == key) {
            bail!("Tensor `{}` is already present", key);
        }
        self.items.push((key.to_string(), x));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&X> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, x)| x)
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
