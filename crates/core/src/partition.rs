use std::ops::Range;

/// Half-open `[start, finish)` slice of variable indices owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkRange {
    pub start: usize,
    pub finish: usize,
}

impl WorkRange {
    pub fn len(&self) -> usize {
        self.finish - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.finish == self.start
    }

    pub fn contains(&self, v: usize) -> bool {
        self.start <= v && v < self.finish
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.finish
    }
}

/// Number of workers that actually receive variables.
pub fn effective_workers(variable_count: usize, worker_count: usize) -> usize {
    worker_count.min(variable_count)
}

fn range_start(variable_count: usize, workers: usize, worker_id: usize) -> usize {
    worker_id * (variable_count / workers) + worker_id.min(variable_count % workers)
}

/// Contiguous, balanced slice of `[0, variable_count)` for `worker_id`.
///
/// The first `variable_count % workers` workers get one extra variable.
/// Workers beyond `variable_count` get an empty range.
pub fn partition(variable_count: usize, worker_count: usize, worker_id: usize) -> WorkRange {
    let workers = effective_workers(variable_count, worker_count);
    if worker_id >= workers {
        return WorkRange {
            start: variable_count,
            finish: variable_count,
        };
    }
    WorkRange {
        start: range_start(variable_count, workers, worker_id),
        finish: range_start(variable_count, workers, worker_id + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_everything_exactly_once() {
        for variables in 1..40 {
            for workers in 1..=variables {
                let mut next = 0;
                for id in 0..workers {
                    let range = partition(variables, workers, id);
                    assert_eq!(range.start, next, "{} vars / {} workers", variables, workers);
                    let base = variables / workers;
                    assert!(range.len() == base || range.len() == base + 1);
                    next = range.finish;
                }
                assert_eq!(next, variables);
            }
        }
    }

    #[test]
    fn remainder_goes_to_first_workers() {
        let sizes: Vec<usize> = (0..4).map(|id| partition(10, 4, id).len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn excess_workers_get_empty_ranges() {
        assert_eq!(effective_workers(3, 5), 3);
        assert_eq!(partition(3, 5, 2), WorkRange { start: 2, finish: 3 });
        assert!(partition(3, 5, 3).is_empty());
        assert!(partition(3, 5, 4).is_empty());
    }
}
