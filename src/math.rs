use std::ops::Mul;

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// A 2x2 matrix of big integers, laid out as `[[a, b], [c, d]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    pub a: BigUint,
    pub b: BigUint,
    pub c: BigUint,
    pub d: BigUint,
}

impl Matrix {
    pub fn identity() -> Self {
        Matrix {
            a: BigUint::one(),
            b: BigUint::zero(),
            c: BigUint::zero(),
            d: BigUint::one(),
        }
    }

    /// The Fibonacci Q-matrix `[[1, 1], [1, 0]]`. Its n-th power is
    /// `[[F(n+1), F(n)], [F(n), F(n-1)]]`.
    pub fn fibonacci() -> Self {
        Matrix {
            a: BigUint::one(),
            b: BigUint::one(),
            c: BigUint::one(),
            d: BigUint::zero(),
        }
    }

    /// Raises the matrix to `exp` by repeated squaring.
    pub fn pow(&self, mut exp: usize) -> Matrix {
        let mut result = Matrix::identity();
        let mut base = self.clone();

        while exp > 0 {
            if exp & 1 == 1 {
                result = &result * &base;
            }
            exp >>= 1;
            // skip the last squaring, its result would be thrown away
            if exp > 0 {
                base = &base * &base;
            }
        }

        result
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        Matrix {
            a: &self.a * &rhs.a + &self.b * &rhs.c,
            b: &self.a * &rhs.b + &self.b * &rhs.d,
            c: &self.c * &rhs.a + &self.d * &rhs.c,
            d: &self.c * &rhs.b + &self.d * &rhs.d,
        }
    }
}

/// Returns `(F(n), F(n+1))`.
pub fn fibonacci_pair(n: usize) -> (BigUint, BigUint) {
    let Matrix { a, b, .. } = Matrix::fibonacci().pow(n);
    (b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn identity_is_neutral() {
        let q = Matrix::fibonacci();
        assert_eq!(&q * &Matrix::identity(), q);
        assert_eq!(&Matrix::identity() * &q, q);
    }

    #[test]
    fn zeroth_power_is_identity() {
        assert_eq!(Matrix::fibonacci().pow(0), Matrix::identity());
    }

    #[test]
    fn powers_of_q() {
        let q5 = Matrix::fibonacci().pow(5);
        assert_eq!(q5.a, BigUint::from(8u32));
        assert_eq!(q5.b, BigUint::from(5u32));
        assert_eq!(q5.c, BigUint::from(5u32));
        assert_eq!(q5.d, BigUint::from(3u32));
    }

    #[test]
    fn pairs() {
        assert_eq!(fibonacci_pair(0), (BigUint::zero(), BigUint::one()));
        assert_eq!(fibonacci_pair(1), (BigUint::one(), BigUint::one()));
        assert_eq!(
            fibonacci_pair(10),
            (BigUint::from(55u32), BigUint::from(89u32))
        );
    }

    #[test]
    fn large_pair() {
        let (f100, _) = fibonacci_pair(100);
        assert_eq!(
            f100,
            BigUint::parse_bytes(b"354224848179261915075", 10).unwrap()
        );
    }
}
