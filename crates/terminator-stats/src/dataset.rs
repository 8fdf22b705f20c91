/// Minimum number of values required to split a dataset into quartiles.
pub const MIN_VALUES: usize = 3;

/// Error returned when a dataset has too few values to compute quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("can't calculate quartiles for fewer than 3 values (got {count})")]
pub struct TooFewValuesError {
    /// Number of values that were provided.
    pub count: usize,
}

/// How far beyond the quartiles a value must lie to count as an outlier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    /// More than 1.5 × IQR beyond the nearest quartile.
    #[default]
    Weak,
    /// More than 3 × IQR beyond the nearest quartile.
    Strong,
}

impl Sensitivity {
    /// Selects [`Sensitivity::Strong`] when `strong` is set, [`Sensitivity::Weak`] otherwise.
    #[must_use]
    pub fn from_strong(strong: bool) -> Self {
        if strong { Self::Strong } else { Self::Weak }
    }

    /// The multiplier applied to the inter-quartile range.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Weak => 1.5,
            Self::Strong => 3.0,
        }
    }
}

/// Result of classifying a value against a [`Dataset`].
///
/// A value lies below the lower bound, above the upper bound, or between them.
/// The lower bound never exceeds the upper bound, so the classes are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum OutlierClass {
    /// Within the outlier bounds (bounds themselves included).
    Inlier,
    /// Strictly below the lower bound.
    Lower,
    /// Strictly above the upper bound.
    Upper,
}

/// Median and quartile summary of a set of `f64` observations.
///
/// Quartiles use the "exclusive" method: the data is split in half and, for an
/// odd number of values, the median element belongs to neither half.
///
/// # Examples
///
/// ```
/// use terminator_stats::dataset::Dataset;
///
/// let dataset = Dataset::new([5.0, 1.0, 4.0, 2.0, 3.0]).unwrap();
/// assert_eq!(dataset.lower_quartile(), 1.5);
/// assert_eq!(dataset.median(), 3.0);
/// assert_eq!(dataset.upper_quartile(), 4.5);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    values: Vec<f64>,
    lower_quartile: f64,
    median: f64,
    upper_quartile: f64,
}

impl Dataset {
    /// Computes the median and quartiles from unsorted values.
    ///
    /// The values are collected and sorted internally.
    ///
    /// # Errors
    ///
    /// Returns [`TooFewValuesError`] if fewer than [`MIN_VALUES`] values are given.
    ///
    /// # Examples
    ///
    /// ```
    /// use terminator_stats::dataset::Dataset;
    ///
    /// assert!(Dataset::new([1.0, 2.0]).is_err());
    ///
    /// let dataset = Dataset::new([3.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(dataset.median(), 2.0);
    /// ```
    pub fn new<I>(values: I) -> Result<Self, TooFewValuesError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        if values.len() < MIN_VALUES {
            return Err(TooFewValuesError {
                count: values.len(),
            });
        }
        values.sort_by(f64::total_cmp);

        let n = values.len();
        let (lower_end, upper_start) = if n % 2 == 0 {
            (n / 2, n / 2)
        } else {
            ((n - 1) / 2, (n - 1) / 2 + 1)
        };

        // Both halves hold at least one value because n >= MIN_VALUES.
        let median = sorted_median(&values);
        let lower_quartile = sorted_median(&values[..lower_end]);
        let upper_quartile = sorted_median(&values[upper_start..]);

        Ok(Self {
            values,
            lower_quartile,
            median,
            upper_quartile,
        })
    }

    /// The values in ascending order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values in the dataset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: a dataset holds at least [`MIN_VALUES`] values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        self.median
    }

    #[must_use]
    pub fn lower_quartile(&self) -> f64 {
        self.lower_quartile
    }

    #[must_use]
    pub fn upper_quartile(&self) -> f64 {
        self.upper_quartile
    }

    /// The inter-quartile range, `upper_quartile - lower_quartile`.
    #[must_use]
    pub fn inter_quartile_range(&self) -> f64 {
        self.upper_quartile - self.lower_quartile
    }

    /// Returns the `(lower, upper)` outlier bounds for the given sensitivity.
    ///
    /// # Examples
    ///
    /// ```
    /// use terminator_stats::dataset::{Dataset, Sensitivity};
    ///
    /// // lower quartile 1, upper quartile 3
    /// let dataset = Dataset::new([1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(dataset.outlier_bounds(Sensitivity::Weak), (-2.0, 6.0));
    /// assert_eq!(dataset.outlier_bounds(Sensitivity::Strong), (-5.0, 9.0));
    /// ```
    #[must_use]
    pub fn outlier_bounds(&self, sensitivity: Sensitivity) -> (f64, f64) {
        let spread = self.inter_quartile_range() * sensitivity.multiplier();
        (self.lower_quartile - spread, self.upper_quartile + spread)
    }

    /// Classifies `value` as a lower outlier, an upper outlier, or neither.
    ///
    /// Values exactly on a bound are not outliers.
    #[must_use]
    pub fn is_outlier(&self, value: f64, sensitivity: Sensitivity) -> OutlierClass {
        let (lower, upper) = self.outlier_bounds(sensitivity);
        if value < lower {
            OutlierClass::Lower
        } else if value > upper {
            OutlierClass::Upper
        } else {
            OutlierClass::Inlier
        }
    }
}

/// Computes the median of values sorted in ascending order.
///
/// For an even number of values this is the mean of the two middle values.
/// Returns `None` if `sorted_values` is empty.
///
/// # Examples
///
/// ```
/// use terminator_stats::dataset::median;
///
/// assert_eq!(median(&[]), None);
/// assert_eq!(median(&[1.0]), Some(1.0));
/// assert_eq!(median(&[1.0, 2.0]), Some(1.5));
/// assert_eq!(median(&[1.0, 2.0, 3.0]), Some(2.0));
/// ```
#[must_use]
pub fn median(sorted_values: &[f64]) -> Option<f64> {
    debug_assert!(
        sorted_values.is_sorted_by(|a, b| a <= b),
        "values must be sorted in ascending order"
    );

    (!sorted_values.is_empty()).then(|| sorted_median(sorted_values))
}

fn sorted_median(sorted_values: &[f64]) -> f64 {
    let mid = sorted_values.len() / 2;
    if sorted_values.len() % 2 == 0 {
        f64::midpoint(sorted_values[mid - 1], sorted_values[mid])
    } else {
        sorted_values[mid]
    }
}
