// Infrastructure layer module
// SQLite and filesystem adapters for the domain ports, plus the Ollama client

pub mod database;
pub mod files;
pub mod ollama;
pub mod repositories;
pub mod snapshots;

pub use files::FsArtifactStore;
pub use ollama::OllamaClient;
pub use snapshots::FileSnapshotStore;
