// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Systematic (canonical) orders.
//!
//! Some abstraction collections come with a natural set of partial orders,
//! for example one prefix per systematically generated pattern. The
//! generator tries all of them before it falls back to sampling. They are
//! handed to the generator as an immutable `SystematicOrders` value, which
//! validates its orders once and is cheap to clone.

use saturn_model::abstraction::Abstractions;
use saturn_model::order::Order;
use std::sync::Arc;

/// An immutable collection of validated partial orders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystematicOrders {
    orders: Arc<[Order]>,
    num_abstractions: usize,
}

impl SystematicOrders {
    /// No systematic orders.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a collection of partial orders over `num_abstractions`
    /// abstractions.
    ///
    /// # Panics
    ///
    /// Panics if an order refers to an abstraction outside
    /// `0..num_abstractions`.
    pub fn new(orders: Vec<Order>, num_abstractions: usize) -> Self {
        for order in &orders {
            assert!(
                order.iter().all(|index| index.get() < num_abstractions),
                "called `SystematicOrders::new` with order {order} out of range for {num_abstractions} abstractions"
            );
        }
        Self {
            orders: orders.into(),
            num_abstractions,
        }
    }

    /// Enumerates the orders of `source` for `abstractions`.
    pub fn from_source<S, C>(source: &C, abstractions: &Abstractions<S>) -> Self
    where
        C: CanonicalOrderSource<S> + ?Sized,
    {
        Self::new(source.canonical_orders(abstractions), abstractions.len())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// The number of abstractions the orders were validated against; `0`
    /// for an empty collection.
    #[inline]
    pub fn num_abstractions(&self) -> usize {
        self.num_abstractions
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }
}

impl<'a> IntoIterator for &'a SystematicOrders {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Enumerates canonical partial orders for an abstraction collection.
pub trait CanonicalOrderSource<S> {
    fn canonical_orders(&self, abstractions: &Abstractions<S>) -> Vec<Order>;
}

/// One single-element prefix `[i]` per abstraction, in index order.
///
/// Completing these prefixes guarantees that every abstraction is saturated
/// first in at least one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SingletonPrefixes;

impl<S> CanonicalOrderSource<S> for SingletonPrefixes {
    fn canonical_orders(&self, abstractions: &Abstractions<S>) -> Vec<Order> {
        abstractions.indices().map(|index| Order::new(vec![index])).collect()
    }
}
