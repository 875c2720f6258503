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

//! # Saturn Core
//!
//! Foundational building blocks shared by the Saturn crates. Everything in
//! here is independent of planning tasks and abstractions; the crate only
//! provides storage, indexing, numeric, and timing primitives that the
//! cost partitioning machinery relies on in its inner loops.
//!
//! ## Modules
//!
//! - `array_pool`: Append-only storage for many independently sized arrays
//!   in one contiguous buffer (`ArrayPool<T>`). Used to hold the lookup
//!   tables of a cost partitioning without one allocation per table.
//! - `index`: Phantom-tagged, strongly typed indices (`TypedIndex<T>`).
//! - `num`: The `Cost` type, the infinite sentinel `INF`, and
//!   infinity-absorbing arithmetic (`InfinityArithmetic`).
//! - `timer`: Cooperative wall-clock budgets (`CountdownTimer`).

pub mod array_pool;
pub mod index;
pub mod num;
pub mod timer;
