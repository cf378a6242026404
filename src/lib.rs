//! # TuPy
//!
//! Fibonacci helpers: the value at a single index, or the whole sequence up
//! to an index. Values are arbitrary precision ([`num_bigint::BigUint`]), so
//! large indices never overflow.
//!
//! ## Overview of Functions
//!
//! ### Errors
//! - `FibonacciError`: every failure the crate reports. The core functions only
//!   ever return `InvalidArgument`, for a negative index; the remaining variants
//!   come from the chunked builders in [`parallel`] (bad chunk sizes, thread
//!   and task failures).
//!
//! ### Core
//! - [`fib_val`]: F(index) by iterating the recurrence in O(1) space.
//! - [`fib_arr`]: `[F(0), .., F(index - 1)]`, or up to and including F(index)
//!   when `inclusive` is set.
//! - [`fibo::fib_val_fast`]: F(index) through matrix exponentiation.
//!
//! ### Chunked builders
//! [`parallel`] builds the same arrays as `fib_arr` with rayon, plain threads
//! plus a `kanal` channel, or tokio tasks. Each chunk is seeded with matrix
//! exponentiation (see [`math`]) and filled in by iteration.
//!
//! ## Usage Example
//! ```rust
//! use num_bigint::BigUint;
//! use tupy::{fib_arr, fib_val};
//!
//! assert_eq!(fib_val(6).unwrap(), BigUint::from(8u32));
//! let fibs = fib_arr(9, false).unwrap();
//! assert_eq!(fibs.len(), 9);
//! assert_eq!(fibs.last(), Some(&BigUint::from(21u32)));
//! ```

pub mod error;
pub mod fibo;
pub mod math;
pub mod parallel;

pub use error::FibonacciError;
pub use fibo::*;

/// Version of this package.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Authors of this package.
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
