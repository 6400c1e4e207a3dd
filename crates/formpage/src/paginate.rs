use formpage_core::{ContentElement, Pagination, Paginator};
use formpage_render::TextMeasurer;

use crate::prelude::{println, *};

#[derive(Debug, clap::Args, Clone)]
pub struct Options {
    /// Path to a JSON array of content elements
    path: std::path::PathBuf,

    /// Override the content height derived from the page geometry, in points
    #[arg(long)]
    content_height: Option<f32>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(options: Options, global: crate::Global) -> Result<()> {
    let config = crate::config::load(&global)?;
    let source = std::fs::read_to_string(&options.path)
        .wrap_err_with(|| f!("Failed to read {}", options.path.display()))?;
    let elements: Vec<ContentElement> = serde_json::from_str(&source)
        .wrap_err_with(|| f!("{} is not a JSON list of elements", options.path.display()))?;

    let mut layout = config.layout();
    if let Some(height) = options.content_height {
        layout.content_height = height;
    }

    let pagination = Paginator::new(layout)
        .paginate(&elements, &TextMeasurer::new())
        .map_err(|e| eyre!(e))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&pagination)?);
    } else {
        output_table(&pagination, layout.content_height, global.verbose);
    }

    for warning in &pagination.warnings {
        warn(warning);
    }

    Ok(())
}

fn output_table(pagination: &Pagination, content_height: f32, verbose: bool) {
    use colored::Colorize;

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Page".bold().cyan(),
        "Elements".bold().cyan(),
        "Used".bold().cyan()
    ]);

    for page in &pagination.pages {
        let indices = page
            .indices()
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let used = f!("{:.1} / {:.1}", page.used_height, content_height);
        let used = if page.used_height > content_height {
            used.red().to_string()
        } else {
            used
        };
        table.add_row(prettytable::row![page.number, indices, used]);
    }

    table.printstd();

    if verbose {
        println!("\n{} pages", pagination.page_count());
    }
}
