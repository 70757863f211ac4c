use crate::cli::InspectArgs;
use crate::error::Result;
use molfeat::core::models::features::FeatureMatrix;
use molfeat::workflows;
use std::fmt;
use tracing::info;

/// Summary statistics of a feature matrix. Extremes and mean cover finite values only.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub rows: usize,
    pub cols: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub non_finite: usize,
}

impl FeatureSummary {
    pub fn from_matrix(features: &FeatureMatrix) -> Self {
        let (rows, cols) = features.dim();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut finite = 0usize;
        for &value in features.iter().filter(|v| v.is_finite()) {
            min = min.min(value);
            max = max.max(value);
            sum += value;
            finite += 1;
        }

        let stat = |v: f64| (finite > 0).then_some(v);
        Self {
            rows,
            cols,
            min: stat(min),
            max: stat(max),
            mean: stat(sum / finite.max(1) as f64),
            non_finite: features.len() - finite,
        }
    }
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.6}", v));
        writeln!(f, "shape:      ({}, {})", self.rows, self.cols)?;
        writeln!(f, "min:        {}", show(self.min))?;
        writeln!(f, "max:        {}", show(self.max))?;
        writeln!(f, "mean:       {}", show(self.mean))?;
        write!(f, "non-finite: {}", self.non_finite)
    }
}

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Loading features from {:?}", &args.input);
    let features = workflows::load_features(&args.input)?;
    let summary = FeatureSummary::from_matrix(&features);

    println!("{}", args.input.display());
    println!("{}", summary);
    Ok(())
}
