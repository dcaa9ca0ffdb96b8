// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Streaming Emitter - Synthesized ndjson streaming
//
// Backends are called without streaming. When the client asks for a stream
// the complete reply is cut into small slices and written as one JSON line
// per slice with a short pause in between.

use crate::application::translation::ProxyError;
use crate::domain::ollama::{OllamaReply, ReplyKind};
use crate::domain::proxy_config::StreamingConfig;
use async_stream::stream;
use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CHUNK_SIZE: usize = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingEmitter {
    chunk_size: usize,
    delay: Duration,
}

impl Default for StreamingEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_DELAY)
    }
}

impl StreamingEmitter {
    /// A zero chunk size is treated as one character per line
    pub fn new(chunk_size: usize, delay: Duration) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            delay,
        }
    }

    pub fn from_config(config: &StreamingConfig) -> Self {
        Self::new(config.chunk_size, config.delay())
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Split text into slices of at most `chunk_size` characters
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.chunk_size)
            .map(|slice| slice.iter().collect())
            .collect()
    }

    /// Lines to emit for one request outcome; `done` is set on the last only
    pub fn frames(
        &self,
        kind: ReplyKind,
        model: &str,
        outcome: Result<OllamaReply, ProxyError>,
    ) -> Vec<OllamaReply> {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                let created_at = chrono::Utc::now().timestamp().to_string();
                let message = format!("Error: {}", e);
                return vec![OllamaReply::new(kind, model, &created_at, &message, true)];
            }
        };

        let mut pieces = self.chunk(reply.content());
        if pieces.is_empty() {
            pieces.push(String::new());
        }

        let last = pieces.len() - 1;
        pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| {
                OllamaReply::new(kind, reply.model(), reply.created_at(), piece, i == last)
            })
            .collect()
    }

    /// Serialize frames as ndjson, pausing between lines.
    ///
    /// The pause is an await point, so dropping the stream on client
    /// disconnect stops emission.
    pub fn into_stream(
        &self,
        frames: Vec<OllamaReply>,
    ) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        let delay = self.delay;
        stream! {
            let total = frames.len();
            for (i, frame) in frames.into_iter().enumerate() {
                match serde_json::to_vec(&frame) {
                    Ok(mut line) => {
                        line.push(b'\n');
                        yield Ok(Bytes::from(line));
                    }
                    Err(e) => {
                        warn!("Failed to serialize stream frame: {}", e);
                        continue;
                    }
                }

                if i + 1 < total && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn emitter(chunk_size: usize) -> StreamingEmitter {
        StreamingEmitter::new(chunk_size, Duration::ZERO)
    }

    #[test]
    fn test_chunking() {
        let e = emitter(3);
        assert_eq!(e.chunk("Hello, "), vec!["Hel", "lo,", " "]);
        assert_eq!(e.chunk("abc"), vec!["abc"]);
        assert!(e.chunk("").is_empty());
        // Multi-byte characters stay whole
        assert_eq!(e.chunk("héllo✓"), vec!["hél", "lo✓"]);
    }

    #[test]
    fn test_frames_mark_only_last_done() {
        let e = emitter(3);
        let reply = OllamaReply::new(ReplyKind::Generate, "gpt-4o", "1700000000", "Hello, ", true);
        let frames = e.frames(ReplyKind::Generate, "gpt-4o", Ok(reply));

        assert_eq!(frames.len(), 3);
        let done: Vec<bool> = frames.iter().map(|f| f.is_done()).collect();
        assert_eq!(done, vec![false, false, true]);
        let text: String = frames.iter().map(|f| f.content()).collect();
        assert_eq!(text, "Hello, ");
        assert!(frames.iter().all(|f| f.model() == "gpt-4o" && f.created_at() == "1700000000"));
    }

    #[test]
    fn test_empty_reply_yields_single_done_frame() {
        let e = emitter(3);
        let reply = OllamaReply::new(ReplyKind::Chat, "gpt-4", "1", "", true);
        let frames = e.frames(ReplyKind::Chat, "gpt-4", Ok(reply));
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_done());
        assert_eq!(frames[0].content(), "");
    }

    #[test]
    fn test_error_yields_single_done_frame() {
        let e = emitter(3);
        let frames = e.frames(
            ReplyKind::Chat,
            "nope",
            Err(ProxyError::ModelNotFound("nope".to_string())),
        );
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_done());
        assert_eq!(frames[0].kind(), ReplyKind::Chat);
        assert_eq!(frames[0].model(), "nope");
        assert!(frames[0].content().starts_with("Error: model not found"));
    }

    #[tokio::test]
    async fn test_stream_writes_ndjson_lines() {
        let e = emitter(2);
        let reply = OllamaReply::new(ReplyKind::Chat, "gpt-4", "1", "abc", true);
        let frames = e.frames(ReplyKind::Chat, "gpt-4", Ok(reply));

        let chunks: Vec<Bytes> = e
            .into_stream(frames)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        assert_eq!(chunks.len(), 2);

        let first: serde_json::Value = serde_json::from_slice(&chunks[0]).unwrap();
        assert_eq!(first["message"]["content"], "ab");
        assert_eq!(first["message"]["role"], "assistant");
        assert_eq!(first["done"], false);
        assert!(chunks.iter().all(|c| c.ends_with(b"\n")));

        let last: serde_json::Value = serde_json::from_slice(&chunks[1]).unwrap();
        assert_eq!(last["message"]["content"], "c");
        assert_eq!(last["done"], true);
    }

    #[tokio::test]
    async fn test_stream_pauses_between_lines_only() {
        let e = StreamingEmitter::new(1, Duration::from_millis(200));
        let reply = OllamaReply::new(ReplyKind::Generate, "gpt-4", "1", "ab", true);
        let frames = e.frames(ReplyKind::Generate, "gpt-4", Ok(reply));

        let started = std::time::Instant::now();
        let lines = e.into_stream(frames).count().await;
        let elapsed = started.elapsed();
        assert_eq!(lines, 2);
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(400), "slept after the last line");
    }

    #[test]
    fn test_from_config() {
        let config = StreamingConfig {
            chunk_size: 8,
            delay_ms: 10,
        };
        let e = StreamingEmitter::from_config(&config);
        assert_eq!(e.chunk_size(), 8);
        assert_eq!(e.delay(), Duration::from_millis(10));
        assert_eq!(StreamingEmitter::default().chunk_size(), 3);
    }
}
