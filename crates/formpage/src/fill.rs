use std::path::{Path, PathBuf};

use formpage_core::template::{self, FormValues};
use formpage_core::{audit, EngineConfig, ExtractionWarning, Field, FieldExtractor, Pagination, Paginator};
use formpage_render::{render_pages, render_pdf, TextMeasurer};
use serde::Serialize;

use crate::prelude::{eprintln, println, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// The template with its blanks filled, unpaginated
    Text,
    /// Plain-text rendering of the paginated document
    Preview,
    /// Fields, pages and warnings as JSON
    Json,
    /// PDF document (requires --output)
    Pdf,
}

#[derive(Debug, clap::Args, Clone)]
pub struct Options {
    /// Path to a UTF-8 template
    template: PathBuf,

    /// JSON object mapping field labels to values
    #[arg(long)]
    values: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "preview")]
    format: Format,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail when a required field has no value
    #[arg(long)]
    strict: bool,
}

/// Everything produced by filling one template.
#[derive(Debug, Serialize)]
pub struct FilledDocument {
    pub fields: Vec<Field>,
    pub extraction_warnings: Vec<ExtractionWarning>,
    /// Labels of required fields left without a value.
    pub missing: Vec<String>,
    pub pagination: Pagination,
    /// SHA-256 of the paginated text.
    pub digest: String,
    #[serde(skip)]
    pub filled_text: String,
}

/// Extract, fill, and paginate a template.
pub fn fill_document(text: &str, values: &FormValues, config: &EngineConfig) -> Result<FilledDocument> {
    let extractor = FieldExtractor::new(&config.extractor).map_err(|e| eyre!(e))?;
    let extraction = extractor.extract(text);

    let missing = template::missing_required(&extraction.fields, values)
        .into_iter()
        .map(|field| field.label.clone())
        .collect();

    let filled_text =
        template::fill_text(text, &extraction.fields, values).map_err(|e| eyre!(e))?;
    let elements =
        template::build_elements(text, &extraction.fields, values).map_err(|e| eyre!(e))?;
    let pagination = Paginator::new(config.layout())
        .paginate(&elements, &TextMeasurer::new())
        .map_err(|e| eyre!(e))?;
    let digest = audit::content_digest(&pagination.pages);

    log::debug!(
        "{} fields, {} elements, {} pages, digest {}",
        extraction.fields.len(),
        elements.len(),
        pagination.page_count(),
        digest
    );

    Ok(FilledDocument {
        fields: extraction.fields,
        extraction_warnings: extraction.warnings,
        missing,
        pagination,
        digest,
        filled_text,
    })
}

/// Fill the template at `path` and write it as a PDF to `output`.
pub fn fill_to_pdf(
    path: &Path,
    values: &FormValues,
    config: &EngineConfig,
    output: &Path,
) -> Result<FilledDocument> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| f!("Failed to read {}", path.display()))?;
    let document = fill_document(&text, values, config)?;
    let bytes = render_pdf(&document.pagination.pages, &config.page).map_err(|e| eyre!(e))?;
    std::fs::write(output, bytes)
        .wrap_err_with(|| f!("Failed to write {}", output.display()))?;
    Ok(document)
}

pub async fn run(options: Options, global: crate::Global) -> Result<()> {
    let config = crate::config::load(&global)?;
    let values = crate::config::load_values(options.values.as_deref())?;

    let text = std::fs::read_to_string(&options.template)
        .wrap_err_with(|| f!("Failed to read {}", options.template.display()))?;
    let document = fill_document(&text, &values, &config)?;
    report(&document, options.strict, global.verbose)?;

    let rendered = match options.format {
        Format::Text => document.filled_text.clone(),
        Format::Preview => render_pages(&document.pagination.pages, config.page.content_width()),
        Format::Json => serde_json::to_string_pretty(&document)?,
        Format::Pdf => {
            let output = options
                .output
                .as_deref()
                .ok_or_else(|| eyre!("--output is required for PDF output"))?;
            let bytes =
                render_pdf(&document.pagination.pages, &config.page).map_err(|e| eyre!(e))?;
            std::fs::write(output, bytes)
                .wrap_err_with(|| f!("Failed to write {}", output.display()))?;
            eprintln!(
                "Wrote {} pages to {}",
                document.pagination.page_count(),
                output.display()
            );
            return Ok(());
        }
    };

    match &options.output {
        Some(path) => std::fs::write(path, rendered)
            .wrap_err_with(|| f!("Failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Surface warnings and missing values; in strict mode missing values fail.
fn report(document: &FilledDocument, strict: bool, verbose: bool) -> Result<()> {
    for warning in &document.extraction_warnings {
        warn(warning);
    }
    for warning in &document.pagination.warnings {
        warn(warning);
    }

    if !document.missing.is_empty() {
        if strict {
            return Err(Error::MissingValues(document.missing.clone()).into());
        }
        warn(f!("no value for required fields: {}", document.missing.join(", ")));
    }

    if verbose {
        eprintln!(
            "{} fields, {} pages, digest {}",
            document.fields.len(),
            document.pagination.page_count(),
            document.digest
        );
    }

    Ok(())
}
