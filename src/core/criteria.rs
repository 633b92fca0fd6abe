use crate::core::distance::DistanceProvider;
use crate::models::{Lot, Origin};

/// How a composite combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    And,
    Or,
}

/// A composable boolean predicate over a (lot, origin) pair
///
/// Leaves are concrete predicates; `Composite` combines children in
/// order with short-circuit evaluation. The tree is acyclic by
/// construction since children are always built fresh.
#[derive(Debug, Clone)]
pub enum Criterion {
    /// True iff the lot is currently available
    Available,
    /// True iff the lot is within the given distance in km
    MaxDistance(f64),
    /// True iff the hourly price does not exceed the given maximum
    MaxPrice(f64),
    Composite {
        op: CombineOp,
        children: Vec<Criterion>,
    },
}

impl Criterion {
    /// Empty AND composite; matches everything until children are added
    pub fn all() -> Self {
        Criterion::Composite {
            op: CombineOp::And,
            children: Vec::new(),
        }
    }

    /// Empty OR composite; by convention also matches everything, since
    /// it is only used as an accumulator seeded before children are added
    pub fn any() -> Self {
        Criterion::Composite {
            op: CombineOp::Or,
            children: Vec::new(),
        }
    }

    /// Append a child to a composite; no effect on leaf criteria
    pub fn push(&mut self, child: Criterion) {
        if let Criterion::Composite { children, .. } = self {
            children.push(child);
        }
    }

    /// Evaluate the criterion against a lot and the searcher's origin
    ///
    /// AND stops at the first false child and OR at the first true one;
    /// `MaxDistance` touches the distance provider, so composites are
    /// ordered cheap-first by the caller.
    pub fn matches(&self, lot: &Lot, origin: Origin, provider: &dyn DistanceProvider) -> bool {
        match self {
            Criterion::Available => lot.is_available,
            Criterion::MaxDistance(max_km) => {
                provider.distance(origin, lot.position()) <= *max_km
            }
            Criterion::MaxPrice(max_price) => lot.price_per_hour <= *max_price,
            Criterion::Composite { op, children } => match op {
                CombineOp::And => children.iter().all(|c| c.matches(lot, origin, provider)),
                CombineOp::Or => {
                    children.is_empty()
                        || children.iter().any(|c| c.matches(lot, origin, provider))
                }
            },
        }
    }
}
