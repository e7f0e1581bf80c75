//! Run aggregation
//!
//! Folds the verdicts of a run into counters per classification bucket.
//! Counting is commutative, so the report does not depend on the order in
//! which packages happened to be processed.
//!
//! - [`results`]: the on-disk results store

pub mod results;

use serde::Serialize;

use crate::domain::Verdict;

/// Classification of one verdict; the first matching rule wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    /// Only a default export, trivially compatible
    DefaultOnly,
    /// Every expected name detected (a superset counts too)
    AllDetected,
    /// Readme encourages named exports and some were detected
    PartialWithIntent,
    /// Readme encourages named exports and none were detected
    ExpectedButNoneDetected,
    /// Some detected, no readme signal
    PartialNoSignal,
    /// None detected, no readme signal
    NoneNoSignal,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::DefaultOnly,
        Bucket::AllDetected,
        Bucket::PartialWithIntent,
        Bucket::ExpectedButNoneDetected,
        Bucket::PartialNoSignal,
        Bucket::NoneNoSignal,
    ];

    /// Whether a package in this bucket works under the static interface
    pub fn is_compatible(self) -> bool {
        matches!(self, Bucket::DefaultOnly | Bucket::AllDetected)
    }
}

/// Bucket a single verdict
pub fn classify(verdict: &Verdict) -> Bucket {
    let expected = verdict.expected_names.len();
    let detected = verdict.detected_names.len();
    let signal = verdict.readme_encourages_named_exports;

    if expected == 0 {
        Bucket::DefaultOnly
    } else if expected <= detected {
        Bucket::AllDetected
    } else if signal && detected > 0 {
        Bucket::PartialWithIntent
    } else if signal {
        Bucket::ExpectedButNoneDetected
    } else if detected > 0 {
        Bucket::PartialNoSignal
    } else {
        Bucket::NoneNoSignal
    }
}

/// Counters over one slice of the verdicts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub count: usize,
    pub default_only: usize,
    pub all_detected: usize,
    pub partial_with_intent: usize,
    pub expected_but_none_detected: usize,
    pub partial_no_signal: usize,
    pub none_no_signal: usize,
}

impl Tally {
    pub fn add(&mut self, bucket: Bucket) {
        self.count += 1;
        *self.slot(bucket) += 1;
    }

    fn slot(&mut self, bucket: Bucket) -> &mut usize {
        match bucket {
            Bucket::DefaultOnly => &mut self.default_only,
            Bucket::AllDetected => &mut self.all_detected,
            Bucket::PartialWithIntent => &mut self.partial_with_intent,
            Bucket::ExpectedButNoneDetected => &mut self.expected_but_none_detected,
            Bucket::PartialNoSignal => &mut self.partial_no_signal,
            Bucket::NoneNoSignal => &mut self.none_no_signal,
        }
    }

    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::DefaultOnly => self.default_only,
            Bucket::AllDetected => self.all_detected,
            Bucket::PartialWithIntent => self.partial_with_intent,
            Bucket::ExpectedButNoneDetected => self.expected_but_none_detected,
            Bucket::PartialNoSignal => self.partial_no_signal,
            Bucket::NoneNoSignal => self.none_no_signal,
        }
    }

    pub fn compatible(&self) -> usize {
        Bucket::ALL
            .iter()
            .filter(|b| b.is_compatible())
            .map(|b| self.get(*b))
            .sum()
    }

    pub fn incompatible(&self) -> usize {
        self.count - self.compatible()
    }

    /// Packages with some but not all names detected
    pub fn some_detected(&self) -> usize {
        self.partial_with_intent + self.partial_no_signal
    }

    /// Packages with named exports of which none were detected
    pub fn none_detected(&self) -> usize {
        self.expected_but_none_detected + self.none_no_signal
    }
}

/// Summary of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub overall: Tally,
    /// Restricted to packages whose readme shows named-export usage
    pub readme_signaled: Tally,
    /// Restricted to packages generated by a transpiler
    pub transpiled: Tally,
}

/// Fold all verdicts into a fresh report
pub fn aggregate(verdicts: &[Verdict]) -> AggregateReport {
    verdicts
        .iter()
        .fold(AggregateReport::default(), |mut report, verdict| {
            let bucket = classify(verdict);
            report.overall.add(bucket);
            if verdict.readme_encourages_named_exports {
                report.readme_signaled.add(bucket);
            }
            if verdict.transpiled {
                report.transpiled.add(bucket);
            }
            report
        })
}
