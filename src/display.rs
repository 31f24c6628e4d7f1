use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::inference::ModelSignature;
use crate::labels::Prediction;

/// Prints the winning label on its own line, then the per-class scores.
pub fn display_prediction(text: &str, prediction: &Prediction) {
    println!("{} {}", "Input:".bold(), text);
    println!(
        "{} {} {}",
        "Label:".bold(),
        prediction.label.green().bold(),
        format!("(index {}, score {:.4})", prediction.index, prediction.score).dimmed()
    );

    if prediction.scores.len() > 1 {
        println!("{}", scores_table(prediction));
    }
}

fn scores_table(prediction: &Prediction) -> Table {
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("#").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Label").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Score").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for (i, score) in prediction.scores.iter().enumerate() {
        let colour = if i == prediction.index {
            comfy_table::Color::Green
        } else {
            comfy_table::Color::White
        };
        table.add_row(vec![
            Cell::new(i).set_alignment(CellAlignment::Right),
            Cell::new(&score.label).fg(colour),
            Cell::new(format!("{:.4}", score.score))
                .fg(colour)
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Prints the declared inputs and outputs of a loaded model
pub fn display_signature(signature: &ModelSignature) {
    let mut table = Table::new();
    table
        .set_header(vec!["Direction", "Name", "Type", "Shape"])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let rows = signature
        .inputs
        .iter()
        .map(|s| ("input", s))
        .chain(signature.outputs.iter().map(|s| ("output", s)));
    for (direction, spec) in rows {
        let dims: Vec<String> = spec
            .dims
            .iter()
            .map(|d| d.map_or_else(|| "?".to_string(), |d| d.to_string()))
            .collect();
        table.add_row(vec![
            direction.to_string(),
            spec.name.clone(),
            spec.dtype.to_string(),
            format!("[{}]", dims.join(", ")),
        ]);
    }
    println!("{}", table);
}
