//! Equal-width histograms

/// Bin counts over `edges.len() - 1` equal-width bins; the last bin is closed
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Build a histogram of the finite values, with at most `max_bins` bins
    ///
    /// The bin count drops to the number of distinct values when that is
    /// smaller. A single repeated value gets one bin of width 1 centred on it.
    pub fn new(values: &[f64], max_bins: usize) -> Option<Self> {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || max_bins == 0 {
            return None;
        }
        finite.sort_by(f64::total_cmp);

        let min = finite[0];
        let max = finite[finite.len() - 1];
        let mut distinct = finite.clone();
        distinct.dedup();
        let bins = max_bins.min(distinct.len()).max(1);

        let (lo, hi) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let width = (hi - lo) / bins as f64;

        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { (i as f64).mul_add(width, lo) })
            .collect();
        let mut counts = vec![0; bins];
        for v in finite {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = ((v - lo) / width).floor() as usize;
            counts[index.min(bins - 1)] += 1;
        }

        Some(Self { edges, counts })
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(lower, upper, count)` per bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_bins() {
        let hist = Histogram::new(&[0.0, 1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(hist.edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(hist.counts, vec![2, 3]);
        assert_eq!(hist.max_count(), 3);
    }

    #[test]
    fn test_bins_capped_by_distinct_values() {
        let hist = Histogram::new(&[1.0, 1.0, 2.0, 2.0, 2.0], 50).unwrap();
        assert_eq!(hist.counts, vec![2, 3]);
    }

    #[test]
    fn test_single_value() {
        let hist = Histogram::new(&[7.0, 7.0], 10).unwrap();
        assert_eq!(hist.edges, vec![6.5, 7.5]);
        assert_eq!(hist.counts, vec![2]);
    }

    #[test]
    fn test_ignores_non_finite() {
        let hist = Histogram::new(&[f64::INFINITY, 1.0, f64::NAN, 3.0], 2).unwrap();
        assert_eq!(hist.counts.iter().sum::<usize>(), 2);
        assert!(Histogram::new(&[f64::NAN], 10).is_none());
        assert!(Histogram::new(&[], 10).is_none());
    }

    #[test]
    fn test_bins_iterator() {
        let hist = Histogram::new(&[0.0, 10.0], 2).unwrap();
        let bins: Vec<_> = hist.bins().collect();
        assert_eq!(bins, vec![(0.0, 5.0, 1), (5.0, 10.0, 1)]);
    }
}
