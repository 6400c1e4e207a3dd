use colored::Colorize;
use formpage_core::{Extraction, FieldExtractor, FieldKind};

use crate::prelude::{println, *};

#[derive(Debug, clap::Args, Clone)]
pub struct Options {
    /// Path to a UTF-8 template
    path: std::path::PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(options: Options, global: crate::Global) -> Result<()> {
    let config = crate::config::load(&global)?;
    let text = std::fs::read_to_string(&options.path)
        .wrap_err_with(|| f!("Failed to read {}", options.path.display()))?;

    let extractor = FieldExtractor::new(&config.extractor).map_err(|e| eyre!(e))?;
    let extraction = extractor.extract(&text);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
    } else {
        output_table(&extraction);
        if global.verbose {
            println!(
                "\n{} fields, {} required",
                extraction.fields.len(),
                extraction.fields.iter().filter(|f| f.required).count()
            );
        }
    }

    for warning in &extraction.warnings {
        warn(warning);
    }

    Ok(())
}

fn output_table(extraction: &Extraction) {
    if extraction.fields.is_empty() {
        println!("{}", "No fields found".bright_black());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Label".bold().cyan(),
        "Kind".bold().cyan(),
        "Span".bold().cyan(),
        "Required".bold().cyan()
    ]);

    for field in &extraction.fields {
        let label = if field.label.is_empty() {
            "(unlabeled)".bright_black().to_string()
        } else {
            field.label.clone()
        };
        let required = if field.required { "yes" } else { "no" };
        table.add_row(prettytable::row![
            label,
            kind_colored(field.kind),
            field.span.to_string(),
            required
        ]);
    }

    table.printstd();
}

fn kind_colored(kind: FieldKind) -> String {
    let name = kind.to_string();
    match kind {
        FieldKind::Signature => name.magenta().to_string(),
        FieldKind::Date => name.blue().to_string(),
        FieldKind::Currency => name.green().to_string(),
        FieldKind::Checkbox => name.yellow().to_string(),
        FieldKind::GenericBlank => name,
    }
}
