use std::fmt;
use std::marker::PhantomData;

use sea_orm::sea_query::{IntoCondition, SimpleExpr};
use sea_orm::{Condition, EntityTrait};

/// Caller-supplied predicates for one entity, ANDed together.
///
/// The tenant predicate is never part of this list; the compiler adds it.
/// An empty list means "no restriction".
pub struct Filters<E> {
    conditions: Vec<Condition>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> Filters<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Add one predicate. Nested `Condition::any()` groups keep their own
    /// parentheses, so an OR inside a filter cannot escape the outer AND.
    #[must_use]
    pub fn and<C: IntoCondition>(mut self, cond: C) -> Self {
        self.conditions.push(cond.into_condition());
        self
    }

    pub fn push<C: IntoCondition>(&mut self, cond: C) {
        self.conditions.push(cond.into_condition());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub(crate) fn into_condition(self) -> Condition {
        self.conditions
            .into_iter()
            .fold(Condition::all(), Condition::add)
    }
}

impl<E: EntityTrait> Default for Filters<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Filters<E> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Filters<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filters")
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}

impl<E: EntityTrait> From<SimpleExpr> for Filters<E> {
    fn from(expr: SimpleExpr) -> Self {
        Self::new().and(expr)
    }
}

impl<E: EntityTrait> From<Condition> for Filters<E> {
    fn from(cond: Condition) -> Self {
        Self::new().and(cond)
    }
}

impl<E: EntityTrait, C: IntoCondition> FromIterator<C> for Filters<E> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::and)
    }
}
