//! Model training command

use std::path::Path;

use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};
use tracing::{info, warn};
use wattcast_lib::dataset::TrainingSet;
use wattcast_lib::{ConsumptionModel, ObjectWhitelist, SchemaKind};

use crate::output;

/// One row in five is held out for the metrics report.
const HOLDOUT_EVERY: usize = 5;

pub fn run(input: &Path, model_path: &Path, budget: f32, verbose: bool) -> Result<()> {
    let set = TrainingSet::from_csv(input)?;

    if set.schema == SchemaKind::MultiEntity {
        let whitelist = ObjectWhitelist::from_ids(set.distinct_object_ids());
        let sidecar = ObjectWhitelist::sidecar_path(model_path);
        // A failed sidecar write degrades request gating but does not
        // invalidate the model itself.
        match whitelist.save(&sidecar) {
            Ok(()) => info!(
                path = %sidecar.display(),
                ids = whitelist.len(),
                "object id whitelist saved"
            ),
            Err(err) => {
                output::print_warning(&format!("could not save object id whitelist: {err:#}"))
            }
        }
    }

    let (train_set, holdout) = set.split_holdout(HOLDOUT_EVERY);
    let model = ConsumptionModel::train(&train_set, budget)?;

    if holdout.is_empty() {
        warn!("training set too small for a holdout; skipping metrics");
    } else {
        let predicted = model.predict_many(&holdout.observations)?;
        let actual: Vec<f64> = holdout
            .observations
            .iter()
            .filter_map(|observation| observation.consumption)
            .collect();
        let report = MetricsReport::compute(&actual, &predicted);
        info!(
            mae = report.mae,
            rmse = report.rmse,
            r_squared = report.r_squared,
            "holdout metrics"
        );
        if verbose {
            println!("{}", report.table());
        }
    }

    model.save(model_path)?;
    output::print_success(&format!("model saved to {}", model_path.display()));
    Ok(())
}

/// Holdout regression metrics.
struct MetricsReport {
    mae: f64,
    rmse: f64,
    r_squared: f64,
}

impl MetricsReport {
    fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len()) as f64;
        let pairs = actual.iter().zip(predicted);

        let mae = pairs.clone().map(|(y, p)| (y - p).abs()).sum::<f64>() / n;
        let mse = pairs.clone().map(|(y, p)| (y - p).powi(2)).sum::<f64>() / n;

        let mean = actual.iter().sum::<f64>() / n;
        let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
        let ss_res: f64 = pairs.map(|(y, p)| (y - p).powi(2)).sum();
        let r_squared = if ss_tot == 0.0 {
            f64::NAN
        } else {
            1.0 - ss_res / ss_tot
        };

        Self {
            mae,
            rmse: mse.sqrt(),
            r_squared,
        }
    }

    fn table(&self) -> String {
        let rows = vec![
            MetricRow {
                metric: "MAE",
                value: format!("{:.4}", self.mae),
            },
            MetricRow {
                metric: "RMSE",
                value: format!("{:.4}", self.rmse),
            },
            MetricRow {
                metric: "R²",
                value: format!("{:.4}", self.r_squared),
            },
        ];
        Table::new(rows).with(Style::rounded()).to_string()
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}
