use std::fmt;

use sea_orm::EntityTrait;

use crate::scoped::error::RepoError;
use crate::scoped::filters::Filters;

type Predicate<E> = Box<dyn FnOnce(&<E as EntityTrait>::ActiveModel) -> bool + Send>;
type Rejection = Box<dyn FnOnce() -> RepoError + Send>;

/// Guard evaluated inside the insert transaction before the row is written.
///
/// Existence checks run through the same tenant-scoped compiler as reads, so
/// uniqueness is per tenant. They are advisory: a concurrent insert can slip
/// between check and write, and only a storage unique constraint closes that
/// gap.
pub struct InsertCondition<E: EntityTrait> {
    pub(crate) check: ConflictCheck<E>,
    pub(crate) reject: Rejection,
}

pub(crate) enum ConflictCheck<E: EntityTrait> {
    /// Reject if any row in the current tenant matches.
    Existing(Filters<E>),
    /// Reject if the predicate holds for the candidate.
    Predicate(Predicate<E>),
}

impl<E: EntityTrait> InsertCondition<E> {
    /// Reject the insert if a row matching `filters` already exists for this tenant.
    ///
    /// ```rust,ignore
    /// InsertCondition::unique_where(
    ///     Filters::new().and(Expr::col(currency::Column::Id).eq("usd")),
    ///     || RepoError::already_exists("usd"),
    /// )
    /// ```
    #[must_use]
    pub fn unique_where<R>(filters: Filters<E>, reject: R) -> Self
    where
        R: FnOnce() -> RepoError + Send + 'static,
    {
        Self {
            check: ConflictCheck::Existing(filters),
            reject: Box::new(reject),
        }
    }

    /// Reject the insert if `predicate` holds for the candidate row.
    #[must_use]
    pub fn rejects_if<P, R>(predicate: P, reject: R) -> Self
    where
        P: FnOnce(&E::ActiveModel) -> bool + Send + 'static,
        R: FnOnce() -> RepoError + Send + 'static,
    {
        Self {
            check: ConflictCheck::Predicate(Box::new(predicate)),
            reject: Box::new(reject),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for InsertCondition<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.check {
            ConflictCheck::Existing(_) => "unique_where",
            ConflictCheck::Predicate(_) => "rejects_if",
        };
        f.debug_struct("InsertCondition")
            .field("check", &kind)
            .finish_non_exhaustive()
    }
}
