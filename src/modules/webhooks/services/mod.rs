pub mod ingestor;

pub use ingestor::{IngestOutcome, ProviderNotification, WebhookIngestor};
