pub mod intent;
pub mod ollama;
pub mod scripted;
