#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Missing values for required fields: {}", .0.join(", "))]
    MissingValues(Vec<String>),

    #[error("{failed} of {total} templates failed")]
    BatchFailed { failed: usize, total: usize },
}
