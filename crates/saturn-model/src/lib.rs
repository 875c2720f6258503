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

//! # Saturn Model
//!
//! The planning-side collaborators that cost partitioning operates on.
//!
//! ## Architecture
//!
//! * **`index`**: `AbstractionIndex`, the handle through which every other
//!   component refers to an abstraction.
//! * **`abstraction`**: The `Abstraction` and `MappingFunction` interfaces and
//!   the owning `Abstractions` arena.
//! * **`explicit`**: `ExplicitAbstraction`, an abstraction given by its
//!   labelled transition system, with Dijkstra goal distances and saturated
//!   costs.
//! * **`order`**: `Order`, a sequence of distinct abstraction indices that
//!   defines a saturation sequence.
//! * **`task`**: `SasTask`, a small finite-domain planning task, and the
//!   `TransitionModel` / `FactState` interfaces used by samplers and online
//!   heuristics.
//! * **`projection`**: Builds pattern-database abstractions of a `SasTask`.
//!
//! ## Ownership
//!
//! Abstractions are owned by exactly one `Abstractions` arena. Generators and
//! cost partitioning functions borrow it; the runtime evaluator consumes it
//! and keeps only the mapping functions it needs.

pub mod abstraction;
pub mod explicit;
pub mod index;
pub mod order;
pub mod projection;
pub mod task;
