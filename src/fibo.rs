use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{FibonacciError, Result};
use crate::math::fibonacci_pair;

// Rejects negative indices and, on targets where `usize` is narrower than
// `i64`, indices the host cannot address.
pub(crate) fn checked_index(index: i64) -> Result<usize> {
    if index < 0 {
        return Err(FibonacciError::InvalidArgument { index });
    }
    usize::try_from(index).map_err(|_| FibonacciError::IndexTooLarge { index })
}

// Length of the sequence `fib_arr(index, inclusive)` returns.
pub(crate) fn array_len(index: i64, inclusive: bool) -> Result<usize> {
    let len = checked_index(index)?;
    if inclusive {
        len.checked_add(1).ok_or(FibonacciError::IndexTooLarge { index })
    } else {
        Ok(len)
    }
}

/// Returns the value of the Fibonacci sequence at `index`.
///
/// Two running values are advanced two positions per step, so only O(1)
/// big integers are alive at any time and the loop runs `index / 2` times.
///
/// # Errors
/// [`FibonacciError::InvalidArgument`] if `index` is negative.
///
/// # Example
/// ```
/// use num_bigint::BigUint;
/// assert_eq!(tupy::fib_val(6).unwrap(), BigUint::from(8u32));
/// assert!(tupy::fib_val(-1).is_err());
/// ```
pub fn fib_val(index: i64) -> Result<BigUint> {
    let n = checked_index(index)?;

    // a holds the even positions, b the odd ones
    let mut a = BigUint::zero();
    let mut b = BigUint::one();

    for _ in (1..n).step_by(2) {
        a += &b;
        b += &a;
    }

    Ok(if n % 2 == 0 { a } else { b })
}

/// Same contract as [`fib_val`], computed with O(log n) matrix
/// multiplications instead of a linear walk.
///
/// # Example
/// ```
/// use num_bigint::BigUint;
/// let expected = BigUint::parse_bytes(b"354224848179261915075", 10).unwrap();
/// assert_eq!(tupy::fibo::fib_val_fast(100).unwrap(), expected);
/// ```
pub fn fib_val_fast(index: i64) -> Result<BigUint> {
    let n = checked_index(index)?;
    let (value, _) = fibonacci_pair(n);
    Ok(value)
}

/// Returns the Fibonacci numbers from index 0 up to `index`.
///
/// The value at `index` itself is only included when `inclusive` is set, so
/// the result has length `index` or `index + 1`.
///
/// # Errors
/// [`FibonacciError::InvalidArgument`] if `index` is negative.
///
/// # Example
/// ```
/// use num_bigint::BigUint;
/// let fibs = tupy::fib_arr(9, false).unwrap();
/// assert_eq!(fibs.len(), 9);
/// assert_eq!(fibs[8], BigUint::from(21u32));
/// assert_eq!(tupy::fib_arr(0, true).unwrap(), vec![BigUint::from(0u32)]);
/// ```
pub fn fib_arr(index: i64, inclusive: bool) -> Result<Vec<BigUint>> {
    let len = array_len(index, inclusive)?;

    let mut array = vec![BigUint::zero(); len];
    if len > 1 {
        array[1] = BigUint::one();
    }

    for i in 2..len {
        let next = &array[i - 2] + &array[i - 1];
        array[i] = next;
    }

    Ok(array)
}
