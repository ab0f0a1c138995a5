//! Stdin scoring command

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use wattcast_lib::protocol::{LineOutcome, ScoringSession};
use wattcast_lib::{ConsumptionModel, ObjectWhitelist};

use crate::output;

pub fn run(model_path: &Path, out_path: Option<&Path>) -> Result<()> {
    let model = ConsumptionModel::load(model_path)?;
    let whitelist = if model.expects_object_id() {
        Some(ObjectWhitelist::load(&ObjectWhitelist::sidecar_path(
            model_path,
        ))?)
    } else {
        None
    };
    info!(
        model = %model_path.display(),
        multi_entity = model.expects_object_id(),
        "scoring observations from stdin"
    );

    let session = ScoringSession::new(model.expects_object_id(), whitelist.as_ref());
    let mut sink = output::open_sink(out_path)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        match session.handle_line(&line, &model)? {
            LineOutcome::End => break,
            LineOutcome::Scored {
                object_id: Some(id),
                prediction,
            } => writeln!(sink, "{id},{}", output::format_kwh(prediction))?,
            LineOutcome::Scored {
                object_id: None,
                prediction,
            } => writeln!(sink, "{}", output::format_kwh(prediction))?,
            LineOutcome::Rejected(err) => {
                output::print_warning(&format!("skipping input '{line}': {err}"))
            }
            LineOutcome::Filtered => {}
        }
    }

    sink.flush().context("failed to flush scored output")
}
