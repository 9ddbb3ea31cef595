// Adapters layer: concrete implementations for external systems (OpenAI, Pinecone, OpenWeatherMap).

pub mod http;
pub mod openai;
pub mod pinecone;
pub mod weather;

pub use openai::{OpenAiClient, OpenAiSettings};
pub use pinecone::{PineconeIndex, PineconeSettings};
pub use weather::WeatherClient;
