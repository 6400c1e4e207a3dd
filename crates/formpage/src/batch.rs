use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use futures::future::join_all;

use crate::prelude::{println, *};

#[derive(Debug, clap::Args, Clone)]
pub struct Options {
    /// Templates to fill
    #[arg(required = true)]
    templates: Vec<PathBuf>,

    /// JSON object mapping field labels to values, shared by every template
    #[arg(long)]
    values: Option<PathBuf>,

    /// Directory the PDFs are written to
    #[arg(long)]
    out_dir: PathBuf,
}

/// Outcome for one template of the batch.
#[derive(Debug)]
struct BatchItem {
    template: PathBuf,
    result: Result<(PathBuf, usize)>,
}

/// `out_dir/<template stem>.pdf` for every template.
///
/// Templates sharing a stem (`a/lease.txt`, `b/lease.txt`) would write the
/// same file from two tasks at once; later ones get a numeric suffix
/// (`lease-2.pdf`) instead.
fn output_paths(out_dir: &Path, templates: &[PathBuf]) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    templates
        .iter()
        .map(|template| {
            let stem = template
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());

            let mut name = f!("{stem}.pdf");
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = f!("{stem}-{n}.pdf");
                n += 1;
            }
            if n > 2 {
                log::warn!(
                    "{} shares its name with another template; writing {}",
                    template.display(),
                    name
                );
            }
            out_dir.join(name)
        })
        .collect()
}

pub async fn run(options: Options, global: crate::Global) -> Result<()> {
    let config = crate::config::load(&global)?;
    let values = Arc::new(crate::config::load_values(options.values.as_deref())?);
    std::fs::create_dir_all(&options.out_dir)
        .wrap_err_with(|| f!("Failed to create {}", options.out_dir.display()))?;

    // Templates are independent; each is filled on the blocking pool.
    let outputs = output_paths(&options.out_dir, &options.templates);
    let tasks = options.templates.iter().zip(outputs).map(|(template, output)| {
        let template = template.clone();
        let values = Arc::clone(&values);
        async move {
            let result = tokio::task::spawn_blocking({
                let template = template.clone();
                move || {
                    crate::fill::fill_to_pdf(&template, &values, &config, &output)
                        .map(|document| (output, document.pagination.page_count()))
                }
            })
            .await
            .map_err(|e| eyre!("Worker failed: {}", e))
            .and_then(|result| result);
            BatchItem { template, result }
        }
    });
    let items = join_all(tasks).await;

    let failed = output_summary(&items, global.verbose);
    if failed > 0 {
        return Err(Error::BatchFailed {
            failed,
            total: items.len(),
        }
        .into());
    }

    Ok(())
}

/// Print one row per template; returns the number of failures.
fn output_summary(items: &[BatchItem], verbose: bool) -> usize {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Template".bold().cyan(),
        "Result".bold().cyan()
    ]);

    let mut failed = 0;
    for item in items {
        let result = match &item.result {
            Ok((output, pages)) => f!("{} ({} pages)", output.display(), pages)
                .green()
                .to_string(),
            Err(err) => {
                failed += 1;
                if verbose {
                    f!("{:?}", err).red().to_string()
                } else {
                    err.to_string().red().to_string()
                }
            }
        };
        table.add_row(prettytable::row![item.template.display(), result]);
    }

    table.printstd();
    println!(
        "\n{} of {} templates filled",
        items.len() - failed,
        items.len()
    );

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_paths() {
        let outputs = output_paths(Path::new("/tmp/out"), &[PathBuf::from("forms/lease.txt")]);
        assert_eq!(outputs, vec![PathBuf::from("/tmp/out/lease.pdf")]);
    }

    #[test]
    fn test_output_paths_never_collide() {
        let templates = vec![
            PathBuf::from("a/lease.txt"),
            PathBuf::from("b/lease.txt"),
            PathBuf::from("lease-2.md"),
            PathBuf::from("c/lease.md"),
        ];
        let outputs = output_paths(Path::new("out"), &templates);

        assert_eq!(
            outputs,
            vec![
                PathBuf::from("out/lease.pdf"),
                PathBuf::from("out/lease-2.pdf"),
                PathBuf::from("out/lease-2-2.pdf"),
                PathBuf::from("out/lease-3.pdf"),
            ]
        );
    }

    #[tokio::test]
    async fn test_batch_same_stem_writes_both() {
        let temp_dir = TempDir::new().unwrap();
        let mut templates = Vec::new();
        for dir in ["a", "b"] {
            let path = temp_dir.path().join(dir).join("lease.txt");
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "Tenant: ______\n").unwrap();
            templates.push(path);
        }
        let out_dir = temp_dir.path().join("out");

        let options = Options {
            templates,
            values: None,
            out_dir: out_dir.clone(),
        };
        let global = crate::Global {
            config: None,
            verbose: false,
        };

        run(options, global).await.unwrap();
        assert!(out_dir.join("lease.pdf").exists());
        assert!(out_dir.join("lease-2.pdf").exists());
    }

    #[tokio::test]
    async fn test_batch_reports_failures_without_stopping() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.txt");
        std::fs::write(&good, "Name: ______\n").unwrap();
        let missing = temp_dir.path().join("missing.txt");
        let out_dir = temp_dir.path().join("out");

        let options = Options {
            templates: vec![good, missing],
            values: None,
            out_dir: out_dir.clone(),
        };
        let global = crate::Global {
            config: None,
            verbose: false,
        };

        let err = run(options, global).await.unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
        assert!(out_dir.join("good.pdf").exists());
        assert!(!out_dir.join("missing.pdf").exists());
    }
}
