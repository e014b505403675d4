pub mod filter;
pub mod operator;
pub mod projection;
pub mod sort;
pub mod translator;
pub mod value;

pub use filter::{Clause, FieldFilter, Filter, Predicate};
pub use operator::Operator;
pub use projection::Projection;
pub use sort::{Direction, Sort, SortKey};
pub use translator::QueryDescriptor;

/// A read request against a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    pub projection: Option<Projection>,
    pub sort: Sort,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            projection: None,
            sort: Sort::unsorted(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }
}
