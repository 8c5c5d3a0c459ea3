//! Sequential composition of transformers

use super::Transformer;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Two transformers applied one after the other.
///
/// Longer pipelines nest: `Pipeline::new(a, b).then(c)` is
/// `Pipeline<Pipeline<A, B>, C>`. The output type of each step must match the
/// input type of the next, which the `Transformer` bounds check at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline<A, B> {
    first: A,
    second: B,
}

impl<A, B> Pipeline<A, B> {
    /// Create a pipeline from two steps
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Append another step
    pub fn then<C>(self, next: C) -> Pipeline<Self, C> {
        Pipeline::new(self, next)
    }

    /// First step
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Second step
    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<In, A, B> Transformer<In> for Pipeline<A, B>
where
    In: ?Sized,
    A: Transformer<In>,
    B: Transformer<A::Output>,
{
    type Output = B::Output;

    fn fit(&mut self, x: &In) -> Result<&mut Self> {
        let intermediate = self.first.fit_transform(x)?;
        self.second.fit(&intermediate)?;
        Ok(self)
    }

    fn transform(&self, x: &In) -> Result<Self::Output> {
        let intermediate = self.first.transform(x)?;
        self.second.transform(&intermediate)
    }

    fn fit_transform(&mut self, x: &In) -> Result<Self::Output> {
        let intermediate = self.first.fit_transform(x)?;
        self.second.fit_transform(&intermediate)
    }
}
