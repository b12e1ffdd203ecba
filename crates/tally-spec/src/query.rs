//! Queries: a specification plus ordering and paging.
//!
//! [`Query`] is the unit a repository receives. In memory it filters,
//! sorts and pages a slice; for a store it yields a [`QueryPlan`] that a
//! translation layer lowers in one piece.

use std::fmt;

use crate::error::Result;
use crate::expr::Expression;
use crate::ordering::{compare_by_orderings, Dir, OrderBy};
use crate::spec::Specification;
use crate::traits::Filterable;

/// A filter with ordering, limit and offset.
///
/// ```
/// use tally_spec::{Filterable, Query};
///
/// #[derive(Filterable)]
/// struct Goal {
///     #[filter(String)]
///     name: String,
///     #[filter(Number)]
///     target: u32,
/// }
///
/// let goals = vec![
///     Goal { name: "Bike".into(), target: 800 },
///     Goal { name: "Trip".into(), target: 2_500 },
///     Goal { name: "Rainy day".into(), target: 5_000 },
/// ];
///
/// let query = Query::new()
///     .matching(Goal::TARGET.gte(1_000))
///     .order_by(Goal::TARGET.desc())
///     .limit(1)
///     .build();
///
/// let top = query.filter(&goals);
/// assert_eq!(top.len(), 1);
/// assert_eq!(top[0].name, "Rainy day");
/// ```
pub struct Query<E> {
    spec: Specification<E>,
    orderings: Vec<OrderBy>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl<E> Clone for Query<E> {
    fn clone(&self) -> Self {
        Query {
            spec: self.spec.clone(),
            orderings: self.orderings.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<E> fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("spec", &self.spec)
            .field("orderings", &self.orderings)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<E> Default for Query<E> {
    fn default() -> Self {
        Query {
            spec: Specification::everything(),
            orderings: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

impl<E> Query<E> {
    /// An empty query; it matches every item.
    pub fn new() -> Self {
        Query::default()
    }

    /// ANDs `spec` into the filter.
    ///
    /// The first call replaces the initial `everything()` rather than
    /// nesting under it.
    pub fn matching(mut self, spec: Specification<E>) -> Self {
        self.spec = if self.spec.is_everything() {
            spec
        } else {
            self.spec.and(spec)
        };
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.orderings.push(order);
        self
    }

    pub fn order_asc(self, field: &str) -> Self {
        self.order_by(OrderBy::new(field, Dir::Asc))
    }

    pub fn order_desc(self, field: &str) -> Self {
        self.order_by(OrderBy::new(field, Dir::Desc))
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn build(self) -> Self {
        self
    }

    pub fn specification(&self) -> &Specification<E> {
        &self.spec
    }

    pub fn orderings(&self) -> &[OrderBy] {
        &self.orderings
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    /// Returns `true` if the filter matches everything.
    pub fn is_unfiltered(&self) -> bool {
        self.spec.is_everything()
    }

    /// Translates the filter and bundles it with ordering and paging.
    ///
    /// Fails with [`SpecError::UnsupportedPredicate`](crate::SpecError)
    /// if the filter holds a closure leaf.
    pub fn plan(&self) -> Result<QueryPlan<E>> {
        Ok(QueryPlan {
            filter: self.spec.to_expression()?,
            orderings: self.orderings.clone(),
            limit: self.limit,
            offset: self.offset,
        })
    }
}

impl<E: Filterable> Query<E> {
    pub fn matches(&self, item: &E) -> bool {
        self.spec.is_satisfied_by(item)
    }

    /// Filters, sorts (stable), then applies offset and limit.
    pub fn filter<'a>(&self, items: &'a [E]) -> Vec<&'a E> {
        let mut results = self.spec.filter(items);
        if !self.orderings.is_empty() {
            results.sort_by(|a, b| compare_by_orderings(*a, *b, &self.orderings));
        }
        page(results, self.offset, self.limit)
    }

    pub fn filter_cloned(&self, items: &[E]) -> Vec<E>
    where
        E: Clone,
    {
        self.filter(items).into_iter().cloned().collect()
    }

    /// Number of matches, ignoring paging.
    pub fn count(&self, items: &[E]) -> usize {
        self.spec.count(items)
    }

    /// First match in sort order, respecting the offset.
    pub fn first<'a>(&self, items: &'a [E]) -> Option<&'a E> {
        if self.limit == Some(0) {
            return None;
        }
        let mut matches = self.spec.filter(items);
        if !self.orderings.is_empty() {
            matches.sort_by(|a, b| compare_by_orderings(*a, *b, &self.orderings));
        }
        matches.into_iter().nth(self.offset.unwrap_or(0))
    }
}

fn page<T>(items: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
    let offset = offset.unwrap_or(0);
    let limit = limit.unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

/// Translated form of a [`Query`], ready for a store.
pub struct QueryPlan<E> {
    pub filter: Expression<E>,
    pub orderings: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl<E> Clone for QueryPlan<E> {
    fn clone(&self) -> Self {
        QueryPlan {
            filter: self.filter.clone(),
            orderings: self.orderings.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<E> PartialEq for QueryPlan<E> {
    fn eq(&self, other: &Self) -> bool {
        self.filter == other.filter
            && self.orderings == other.orderings
            && self.limit == other.limit
            && self.offset == other.offset
    }
}

impl<E> fmt::Debug for QueryPlan<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPlan")
            .field("filter", &self.filter)
            .field("orderings", &self.orderings)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}
