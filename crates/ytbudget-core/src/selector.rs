//! Duration-budgeted video selection
//!
//! Walks a listing in order, keeps every entry with a known duration and stops
//! as soon as the running total reaches the budget. Both entry points share the
//! same [`Accumulator`]; [`select_stream`] only polls the listing as far as the
//! cutoff, so metadata for later entries is never fetched.

use crate::budget::Budget;
use futures::{Stream, StreamExt};
use std::ops::ControlFlow;

/// One item of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct VideoEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    /// Seconds; `None` when the lookup failed or the source did not report it
    pub duration: Option<f64>,
}

impl VideoEntry {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        duration: Option<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
            duration,
        }
    }

    /// Duration usable for accumulation. Zero, negative and non-finite values count as unknown.
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }
}

/// Outcome of a selection pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionResult {
    /// Selected entries in listing order
    pub entries: Vec<VideoEntry>,
    /// Sum of the selected durations, in seconds
    pub total_seconds: f64,
    /// Entries pulled from the listing, including ones without a duration
    pub seen: usize,
    /// Whether the running total reached the budget
    pub budget_reached: bool,
}

impl SelectionResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.url.clone()).collect()
    }
}

/// Running state of the fold
#[derive(Debug)]
pub struct Accumulator {
    budget: f64,
    result: SelectionResult,
}

impl Accumulator {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget: budget.as_secs(),
            result: SelectionResult::default(),
        }
    }

    /// False when the budget is non-positive and nothing should be consumed
    pub fn wants_more(&self) -> bool {
        self.budget.is_finite() && self.budget > 0.0 && !self.result.budget_reached
    }

    /// Feed one entry; `Break` once the budget is met.
    pub fn push(&mut self, entry: VideoEntry) -> ControlFlow<()> {
        if !self.wants_more() {
            return ControlFlow::Break(());
        }

        self.result.seen += 1;

        if let Some(duration) = entry.known_duration() {
            self.result.total_seconds += duration;
            self.result.entries.push(entry);

            if self.result.total_seconds >= self.budget {
                self.result.budget_reached = true;
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    pub fn finish(self) -> SelectionResult {
        self.result
    }
}

/// Select the shortest listing prefix whose known durations reach `budget`.
pub fn select<I>(entries: I, budget: Budget) -> SelectionResult
where
    I: IntoIterator<Item = VideoEntry>,
{
    let mut acc = Accumulator::new(budget);
    if !acc.wants_more() {
        return acc.finish();
    }

    for entry in entries {
        if acc.push(entry).is_break() {
            break;
        }
    }

    acc.finish()
}

/// Same as [`select`], for a listing that is produced asynchronously.
pub async fn select_stream<S>(entries: S, budget: Budget) -> SelectionResult
where
    S: Stream<Item = VideoEntry>,
{
    let mut acc = Accumulator::new(budget);
    if !acc.wants_more() {
        return acc.finish();
    }

    futures::pin_mut!(entries);
    while let Some(entry) = entries.next().await {
        if acc.push(entry).is_break() {
            break;
        }
    }

    acc.finish()
}

/// Cutoff chosen by the estimate strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimate {
    /// No usable durations in the listing
    Nothing,
    /// The whole listing fits in the budget
    All,
    /// Download this many leading entries
    First(usize),
}

/// Estimate how many leading entries approximate `budget`, assuming every
/// entry lasts the listing's average duration. At least one entry is taken
/// when the listing exceeds the budget.
pub fn estimate_count(total_seconds: f64, count: usize, budget: Budget) -> Estimate {
    if count == 0 || !(total_seconds.is_finite() && total_seconds > 0.0) || !budget.is_positive() {
        return Estimate::Nothing;
    }

    if total_seconds <= budget.as_secs() {
        return Estimate::All;
    }

    let average = total_seconds / count as f64;
    let wanted = (budget.as_secs() / average).floor() as usize;
    Estimate::First(wanted.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::cell::Cell;

    fn entries(durations: &[Option<f64>]) -> Vec<VideoEntry> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                VideoEntry::new(
                    format!("id{}", i + 1),
                    format!("https://youtu.be/id{}", i + 1),
                    format!("Video {}", i + 1),
                    *d,
                )
            })
            .collect()
    }

    fn secs(durations: &[f64]) -> Vec<VideoEntry> {
        entries(&durations.iter().map(|d| Some(*d)).collect::<Vec<_>>())
    }

    fn ids(result: &SelectionResult) -> Vec<&str> {
        result.entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_stops_at_first_prefix_reaching_budget() {
        let result = select(secs(&[50.0, 50.0, 50.0]), Budget::from_secs(80.0));
        assert_eq!(ids(&result), vec!["id1", "id2"]);
        assert_eq!(result.total_seconds, 100.0);
        assert!(result.budget_reached);
        assert_eq!(result.seen, 2);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let result = select(secs(&[30.0, 30.0, 30.0]), Budget::from_secs(60.0));
        assert_eq!(ids(&result), vec!["id1", "id2"]);
        assert_eq!(result.total_seconds, 60.0);
        assert_eq!(result.urls(), vec!["https://youtu.be/id1", "https://youtu.be/id2"]);
    }

    #[test]
    fn test_returns_everything_when_budget_not_reached() {
        let result = select(secs(&[10.0, 20.0, 30.0]), Budget::from_secs(3600.0));
        assert_eq!(result.len(), 3);
        assert_eq!(result.total_seconds, 60.0);
        assert!(!result.budget_reached);
    }

    #[test]
    fn test_empty_input() {
        let result = select(Vec::new(), Budget::from_secs(60.0));
        assert!(result.is_empty());
        assert_eq!(result.total_seconds, 0.0);
        assert_eq!(result.seen, 0);
    }

    #[test]
    fn test_unknown_durations_are_skipped() {
        let listing = entries(&[
            None,
            Some(0.0),
            Some(40.0),
            Some(-5.0),
            Some(f64::NAN),
            Some(40.0),
            Some(40.0),
        ]);
        let result = select(listing, Budget::from_secs(70.0));
        assert_eq!(ids(&result), vec!["id3", "id6"]);
        assert_eq!(result.total_seconds, 80.0);
        assert_eq!(result.seen, 6);
    }

    #[test]
    fn test_all_unknown_is_empty() {
        let result = select(entries(&[None, Some(0.0)]), Budget::from_secs(10.0));
        assert!(result.is_empty());
        assert_eq!(result.total_seconds, 0.0);
        assert_eq!(result.seen, 2);
    }

    #[test]
    fn test_non_positive_budget_selects_nothing() {
        let pulled = Cell::new(0);
        let listing = secs(&[10.0, 20.0]).into_iter().inspect(|_| pulled.set(pulled.get() + 1));
        let result = select(listing, Budget::from_secs(0.0));
        assert!(result.is_empty());
        assert_eq!(pulled.get(), 0);

        let result = select(secs(&[10.0]), Budget::from_secs(-1.0));
        assert!(result.is_empty());
    }

    #[test]
    fn test_does_not_pull_past_cutoff() {
        let pulled = Cell::new(0);
        let listing = secs(&[100.0, 100.0, 100.0, 100.0])
            .into_iter()
            .inspect(|_| pulled.set(pulled.get() + 1));
        let result = select(listing, Budget::from_secs(150.0));
        assert_eq!(result.len(), 2);
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn test_minimal_prefix_property() {
        let durations = [12.0, 7.5, 30.0, 1.0, 45.0, 3.0, 60.0];
        let total: f64 = durations.iter().sum();
        for budget in [1.0, 12.0, 12.5, 19.5, 20.0, 50.0, 95.5, 158.0, total, total + 1.0] {
            let result = select(secs(&durations), Budget::from_secs(budget));
            let n = result.len();
            let prefix: f64 = durations[..n].iter().sum();
            assert_eq!(result.total_seconds, prefix);
            if total >= budget {
                assert!(prefix >= budget);
                let shorter: f64 = durations[..n - 1].iter().sum();
                assert!(shorter < budget, "budget {} took too many entries", budget);
            } else {
                assert_eq!(n, durations.len());
            }
        }
    }

    #[test]
    fn test_same_input_same_result() {
        let listing = secs(&[25.0, 35.0, 45.0]);
        let budget = Budget::from_secs(50.0);
        assert_eq!(select(listing.clone(), budget), select(listing, budget));
    }

    #[tokio::test]
    async fn test_stream_matches_iterator() {
        let listing = entries(&[Some(50.0), None, Some(50.0), Some(50.0)]);
        let budget = Budget::from_secs(80.0);
        let from_stream = select_stream(stream::iter(listing.clone()), budget).await;
        assert_eq!(from_stream, select(listing, budget));
        assert_eq!(from_stream.total_seconds, 100.0);
    }

    #[tokio::test]
    async fn test_stream_stops_polling_at_cutoff() {
        let pulled = Cell::new(0);
        let listing = stream::iter(secs(&[60.0, 60.0, 60.0])).then(|entry| {
            pulled.set(pulled.get() + 1);
            async move { entry }
        });
        let result = select_stream(listing, Budget::from_secs(60.0)).await;
        assert_eq!(result.len(), 1);
        assert_eq!(pulled.get(), 1);
    }

    #[test]
    fn test_estimate_count() {
        let budget = Budget::from_secs(3600.0);
        assert_eq!(estimate_count(0.0, 0, budget), Estimate::Nothing);
        assert_eq!(estimate_count(600.0, 0, budget), Estimate::Nothing);
        assert_eq!(estimate_count(3600.0, 4, budget), Estimate::All);
        // 10 videos averaging 20 minutes: 3 fit in an hour
        assert_eq!(estimate_count(12000.0, 10, budget), Estimate::First(3));
        assert_eq!(estimate_count(20000.0, 2, budget), Estimate::First(1));
    }
}
