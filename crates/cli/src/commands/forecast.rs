//! Hourly forecast command

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::info;
use wattcast_lib::{ConsumptionModel, ForecastSequencer, ObjectWhitelist};

use crate::output;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn run(
    model_path: &Path,
    start: NaiveDateTime,
    steps: usize,
    object: Option<&str>,
    out_path: Option<&Path>,
) -> Result<()> {
    let model = ConsumptionModel::load(model_path)?;

    if model.expects_object_id() {
        let Some(id) = object else {
            output::print_error("this model requires --object <id> for forecasting");
            return Ok(());
        };
        let whitelist = ObjectWhitelist::load(&ObjectWhitelist::sidecar_path(model_path))?;
        if !whitelist.contains(id) {
            output::print_error(&format!("object id '{id}' was not seen during training"));
            return Ok(());
        }
    }

    info!(start = %start, steps, "forecasting hourly consumption");
    let mut sink = output::open_sink(out_path)?;
    let sequencer = ForecastSequencer::new();
    for (instant, record) in sequencer.generate(start, steps) {
        let prediction = model.predict_record(object, &record)?;
        writeln!(
            sink,
            "Predicted consumption ({}): {} KWh",
            instant.format(TIMESTAMP_FORMAT),
            output::format_kwh(prediction)
        )?;
    }

    sink.flush().context("failed to flush forecast output")
}
