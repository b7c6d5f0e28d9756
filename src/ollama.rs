//! Ollama-backed embedding and generation capabilities.
//!
//! Both clients speak the Ollama REST API over synchronous `ureq` agents
//! with bounded timeouts. Generation results are normalized into the fixed
//! [`Generation`] variant set right here at the capability boundary: the
//! designated answer field is extracted when the response is structured,
//! with a best-effort string conversion as the fallback; a non-string
//! result never escapes this module.

use std::time::Duration;

use crate::config::OllamaConfig;
use crate::embed::Embedder;
use crate::error::{EmbedError, LlmError};
use crate::qa::{Generation, Generator};

/// Probe the Ollama server with a lightweight `/api/tags` request.
///
/// Returns false when the server is unreachable or unhealthy; used to decide
/// whether to fall back to the offline embedder.
pub fn probe(config: &OllamaConfig) -> bool {
    let url = format!("{}/api/tags", config.base_url);
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(5))
        .build();
    match agent.get(&url).call() {
        Ok(resp) => resp.status() == 200,
        Err(_) => false,
    }
}

fn agent_with_timeout(timeout_secs: u64) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

fn is_timeout(err: &ureq::Error) -> bool {
    matches!(
        err,
        ureq::Error::Transport(t)
            if t.kind() == ureq::ErrorKind::Io && t.to_string().contains("timed out")
    )
}

/// Embedding capability backed by `/api/embeddings`.
pub struct OllamaEmbedder {
    config: OllamaConfig,
    /// Vector dimension of the configured embedding model.
    dimension: usize,
}

impl OllamaEmbedder {
    /// Create an embedder, probing the model once to learn its dimension.
    pub fn connect(config: OllamaConfig) -> Result<Self, EmbedError> {
        let mut embedder = Self {
            config,
            dimension: 0,
        };
        let probe_vec = embedder.request_embedding("dimension probe")?;
        if probe_vec.is_empty() {
            return Err(EmbedError::InvalidVector {
                message: "model returned an empty vector".into(),
            });
        }
        embedder.dimension = probe_vec.len();
        tracing::info!(
            model = %embedder.config.embed_model,
            dim = embedder.dimension,
            "connected to Ollama embedder"
        );
        Ok(embedder)
    }

    fn request_embedding(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let agent = agent_with_timeout(self.config.timeout_secs);
        let response = agent
            .post(&url)
            .send_json(serde_json::json!({
                "model": self.config.embed_model,
                "prompt": text,
            }))
            .map_err(|e| EmbedError::Backend {
                message: e.to_string(),
            })?;

        let body: serde_json::Value =
            response.into_json().map_err(|e| EmbedError::Backend {
                message: format!("read body: {e}"),
            })?;

        body["embedding"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                    .collect()
            })
            .ok_or_else(|| EmbedError::InvalidVector {
                message: "response has no \"embedding\" array".into(),
            })
    }
}

impl Embedder for OllamaEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let vector = self.request_embedding(text)?;
        if vector.len() != self.dimension {
            return Err(EmbedError::InvalidVector {
                message: format!(
                    "expected {} dims, got {}",
                    self.dimension,
                    vector.len()
                ),
            });
        }
        Ok(vector)
    }
}

/// Generation capability backed by `/api/generate`.
pub struct OllamaGenerator {
    config: OllamaConfig,
}

impl OllamaGenerator {
    pub fn new(config: OllamaConfig) -> Self {
        Self { config }
    }

    /// Pull the answer text out of a response value.
    ///
    /// Ollama returns `{"response": "..."}`; other deployments wrap the text
    /// in `answer`/`output` fields. Anything else degrades to the value's
    /// string rendering.
    fn extract_text(body: &serde_json::Value) -> String {
        for field in ["response", "answer", "output"] {
            if let Some(text) = body[field].as_str() {
                return text.trim().to_string();
            }
        }
        if let Some(text) = body.as_str() {
            return text.trim().to_string();
        }
        body.to_string()
    }
}

impl Generator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> Result<Generation, LlmError> {
        let url = format!("{}/api/generate", self.config.base_url);
        let agent = agent_with_timeout(self.config.timeout_secs);

        let response = agent
            .post(&url)
            .send_json(serde_json::json!({
                "model": self.config.model,
                "prompt": prompt,
                "stream": false,
                "options": { "temperature": 0.3 },
            }))
            .map_err(|e| {
                if is_timeout(&e) {
                    LlmError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    match e {
                        ureq::Error::Status(code, _) => LlmError::RequestFailed {
                            message: format!("HTTP status {code}"),
                        },
                        ureq::Error::Transport(_) => LlmError::Unavailable {
                            url: self.config.base_url.clone(),
                        },
                    }
                }
            })?;

        let body: serde_json::Value =
            response.into_json().map_err(|e| LlmError::ParseError {
                message: format!("read body: {e}"),
            })?;

        let text = Self::extract_text(&body);
        if text.is_empty() {
            return Err(LlmError::ParseError {
                message: "model returned an empty response".into(),
            });
        }
        Ok(Generation::from_raw(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_prefers_response_field() {
        let body = serde_json::json!({"response": "  An answer.  ", "answer": "wrong"});
        assert_eq!(OllamaGenerator::extract_text(&body), "An answer.");
    }

    #[test]
    fn extract_text_falls_back_through_fields() {
        let body = serde_json::json!({"answer": "from answer field"});
        assert_eq!(OllamaGenerator::extract_text(&body), "from answer field");

        let body = serde_json::json!({"output": "from output field"});
        assert_eq!(OllamaGenerator::extract_text(&body), "from output field");
    }

    #[test]
    fn extract_text_never_returns_a_non_string_shape() {
        let body = serde_json::json!({"unexpected": {"nested": 42}});
        let text = OllamaGenerator::extract_text(&body);
        assert!(text.contains("unexpected"));
    }
}
