// Résumé pipeline: ingestion, normalization into a canonical Document,
// per-field versioning and the final export selection.

pub mod fields;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod queries;
pub mod selection;
pub mod versioning;

#[cfg(test)]
pub(crate) mod testing;
