//! Chunked builders for Fibonacci arrays.
//!
//! Every builder here returns exactly what [`fib_arr`](crate::fib_arr) returns
//! for the same `index` and `inclusive` flag. The output is split into
//! contiguous chunks; each chunk seeds itself with `(F(start), F(start + 1))`
//! from matrix exponentiation and then iterates the recurrence, so chunks
//! can be computed independently of each other.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

use kanal::bounded;
use log::{debug, trace};
use num_bigint::BigUint;
use num_traits::Zero;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinHandle};

use crate::error::{FibonacciError, Result};
use crate::fibo::{array_len, fib_arr};
use crate::math::fibonacci_pair;

/// How an array is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Plain iteration, see [`fib_arr`].
    Sequential,
    /// Chunks on the rayon thread pool.
    Rayon,
    /// A fixed pool of OS threads fed over channels.
    Threads,
    /// One tokio task per chunk on a multi-threaded runtime.
    Tokio,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayOptions {
    pub chunk_size: usize,
    /// Only used by [`Strategy::Tokio`].
    pub max_concurrent_tasks: usize,
}

impl Default for ArrayOptions {
    fn default() -> Self {
        ArrayOptions {
            chunk_size: 1000,
            max_concurrent_tasks: 20,
        }
    }
}

/// Builds `fib_arr(index, inclusive)` with the given strategy.
///
/// [`Strategy::Tokio`] spins up its own runtime. Inside an async context it
/// fails with [`FibonacciError::NestedRuntime`]; await [`fib_arr_tokio`]
/// there instead.
pub fn fib_arr_with(
    strategy: Strategy,
    index: i64,
    inclusive: bool,
    options: &ArrayOptions,
) -> Result<Vec<BigUint>> {
    match strategy {
        Strategy::Sequential => fib_arr(index, inclusive),
        Strategy::Rayon => fib_arr_rayon(index, inclusive, options.chunk_size),
        Strategy::Threads => fib_arr_threads(index, inclusive, options.chunk_size),
        Strategy::Tokio => {
            if tokio::runtime::Handle::try_current().is_ok() {
                return Err(FibonacciError::NestedRuntime);
            }
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            rt.block_on(fib_arr_tokio(
                index,
                inclusive,
                options.chunk_size,
                options.max_concurrent_tasks,
            ))
        }
    }
}

// Half-open `(start, end)` bounds of every chunk covering `0..len`.
fn chunk_bounds(len: usize, chunk_size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..len)
        .step_by(chunk_size)
        .map(move |start| (start, len.min(start.saturating_add(chunk_size))))
}

fn checked_plan(index: i64, inclusive: bool, chunk_size: usize) -> Result<usize> {
    let len = array_len(index, inclusive)?;
    if chunk_size == 0 {
        return Err(FibonacciError::InvalidChunkSize);
    }
    Ok(len)
}

/// Computes `F(start)..F(end)`.
pub fn fibonacci_chunk(start: usize, end: usize) -> Vec<BigUint> {
    trace!("computing chunk {start}..{end}");
    let mut fibs = Vec::with_capacity(end.saturating_sub(start));
    let (mut a, mut b) = fibonacci_pair(start);

    for _ in start..end {
        let next = &a + &b;
        fibs.push(std::mem::replace(&mut a, std::mem::replace(&mut b, next)));
    }

    fibs
}

/// Builds the array on the rayon pool, one job per chunk.
///
/// # Example
/// ```
/// use tupy::parallel::fib_arr_rayon;
/// assert_eq!(fib_arr_rayon(50, true, 7).unwrap(), tupy::fib_arr(50, true).unwrap());
/// ```
pub fn fib_arr_rayon(index: i64, inclusive: bool, chunk_size: usize) -> Result<Vec<BigUint>> {
    let len = checked_plan(index, inclusive, chunk_size)?;
    debug!("rayon build of {len} values in chunks of {chunk_size}");

    Ok((0..len)
        .into_par_iter()
        .step_by(chunk_size)
        .flat_map_iter(|start| {
            fibonacci_chunk(start, len.min(start.saturating_add(chunk_size)))
        })
        .collect())
}

/// Builds the array on a fixed pool of OS threads, one per available core
/// and never more than there are chunks. Workers pull chunk bounds from a
/// job channel and send each finished chunk back over a result channel; the
/// pieces are put in order afterwards.
pub fn fib_arr_threads(index: i64, inclusive: bool, chunk_size: usize) -> Result<Vec<BigUint>> {
    let len = checked_plan(index, inclusive, chunk_size)?;
    let chunks = len.div_ceil(chunk_size);
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(chunks)
        .max(1);
    debug!("threaded build of {len} values in {chunks} chunks on {workers} workers");

    let (job_sender, job_receiver) = bounded::<(usize, usize)>(chunks.max(1));
    for bounds in chunk_bounds(len, chunk_size) {
        job_sender.send(bounds)?;
    }
    // workers stop once the queue is drained
    drop(job_sender);

    let (sender, receiver) = bounded::<(usize, Vec<BigUint>)>(chunks.max(1));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let jobs = job_receiver.clone();
            let sender = sender.clone();
            thread::spawn(move || -> Result<()> {
                for (start, end) in jobs {
                    sender.send((start, fibonacci_chunk(start, end)))?;
                }
                Ok(())
            })
        })
        .collect();

    // the receiver stops once every worker's sender is gone
    drop(sender);

    for handle in handles {
        handle
            .join()
            .map_err(|e| FibonacciError::ThreadJoin(format!("thread panicked: {e:?}")))??;
    }

    let mut parts = Vec::with_capacity(chunks);
    for part in receiver {
        parts.push(part);
    }
    parts.sort_unstable_by_key(|(start, _)| *start);

    let mut result = Vec::with_capacity(len);
    for (_, chunk) in parts {
        result.extend(chunk);
    }

    Ok(result)
}

/// Builds the array with one tokio task per chunk, running at most
/// `max_concurrent_tasks` of them at a time.
pub async fn fib_arr_tokio(
    index: i64,
    inclusive: bool,
    chunk_size: usize,
    max_concurrent_tasks: usize,
) -> Result<Vec<BigUint>> {
    let len = checked_plan(index, inclusive, chunk_size)?;
    if max_concurrent_tasks == 0 {
        return Err(FibonacciError::InvalidConcurrency);
    }
    debug!("tokio build of {len} values, {max_concurrent_tasks} tasks at a time");

    let semaphore = Arc::new(Semaphore::new(max_concurrent_tasks));

    let tasks: Vec<JoinHandle<Result<(usize, Vec<BigUint>)>>> = chunk_bounds(len, chunk_size)
        .map(|(start, end)| {
            let semaphore = Arc::clone(&semaphore);
            task::spawn(async move {
                let _permit = semaphore.acquire().await?;
                Ok::<_, FibonacciError>((start, fibonacci_chunk(start, end)))
            })
        })
        .collect();

    let mut result = vec![BigUint::zero(); len];
    for task in tasks {
        let (start, chunk) = task.await??;
        for (slot, value) in result[start..].iter_mut().zip(chunk) {
            *slot = value;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn bounds_cover_everything() {
        let bounds: Vec<_> = chunk_bounds(10, 4).collect();
        assert_eq!(bounds, vec![(0, 4), (4, 8), (8, 10)]);
        assert_eq!(chunk_bounds(0, 4).count(), 0);
        assert_eq!(chunk_bounds(3, 100).collect::<Vec<_>>(), vec![(0, 3)]);
    }

    #[test]
    fn chunk_in_the_middle() {
        let expected = fib_arr(20, false).unwrap();
        assert_eq!(fibonacci_chunk(5, 12), expected[5..12].to_vec());
        assert!(fibonacci_chunk(7, 7).is_empty());
    }

    #[test]
    fn rayon_matches_sequential() {
        for index in [0, 1, 2, 9, 64, 333] {
            for inclusive in [false, true] {
                for chunk_size in [1, 3, 10, 1000] {
                    assert_eq!(
                        fib_arr_rayon(index, inclusive, chunk_size).unwrap(),
                        fib_arr(index, inclusive).unwrap(),
                        "index {index}, inclusive {inclusive}, chunk {chunk_size}"
                    );
                }
            }
        }
    }

    #[test]
    fn threads_match_sequential() {
        for index in [0, 1, 9, 100] {
            for inclusive in [false, true] {
                assert_eq!(
                    fib_arr_threads(index, inclusive, 7).unwrap(),
                    fib_arr(index, inclusive).unwrap()
                );
            }
        }
    }

    #[test]
    fn threads_with_single_value_chunks() {
        let expected = fib_arr(10_000, true).unwrap();
        assert_eq!(fib_arr_threads(10_000, true, 1).unwrap(), expected);
    }

    #[test(tokio::test)]
    async fn tokio_strategy_inside_runtime_is_rejected() {
        assert!(matches!(
            fib_arr_with(Strategy::Tokio, 10, false, &ArrayOptions::default()),
            Err(FibonacciError::NestedRuntime)
        ));
        assert_eq!(
            fib_arr_with(Strategy::Rayon, 10, false, &ArrayOptions::default()).unwrap(),
            fib_arr(10, false).unwrap()
        );
    }

    #[test(tokio::test)]
    async fn tokio_matches_sequential() {
        for index in [0, 1, 9, 250] {
            for inclusive in [false, true] {
                assert_eq!(
                    fib_arr_tokio(index, inclusive, 16, 3).await.unwrap(),
                    fib_arr(index, inclusive).unwrap()
                );
            }
        }
    }

    #[test]
    fn strategies_agree() {
        let options = ArrayOptions {
            chunk_size: 11,
            max_concurrent_tasks: 2,
        };
        let expected = fib_arr(120, true).unwrap();
        for strategy in [
            Strategy::Sequential,
            Strategy::Rayon,
            Strategy::Threads,
            Strategy::Tokio,
        ] {
            assert_eq!(
                fib_arr_with(strategy, 120, true, &options).unwrap(),
                expected,
                "{strategy:?}"
            );
        }
    }

    #[test]
    fn invalid_arguments() {
        assert!(matches!(
            fib_arr_rayon(-1, false, 10),
            Err(FibonacciError::InvalidArgument { index: -1 })
        ));
        assert!(matches!(
            fib_arr_threads(-4, true, 10),
            Err(FibonacciError::InvalidArgument { index: -4 })
        ));
        assert!(matches!(
            fib_arr_rayon(10, false, 0),
            Err(FibonacciError::InvalidChunkSize)
        ));
        assert!(matches!(
            fib_arr_threads(10, false, 0),
            Err(FibonacciError::InvalidChunkSize)
        ));
    }

    #[test(tokio::test)]
    async fn tokio_invalid_arguments() {
        assert!(matches!(
            fib_arr_tokio(-2, false, 10, 4).await,
            Err(FibonacciError::InvalidArgument { index: -2 })
        ));
        assert!(matches!(
            fib_arr_tokio(10, false, 0, 4).await,
            Err(FibonacciError::InvalidChunkSize)
        ));
        assert!(matches!(
            fib_arr_tokio(10, false, 10, 0).await,
            Err(FibonacciError::InvalidConcurrency)
        ));
    }
}
