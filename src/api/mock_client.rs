use crate::api::client::MockStreamProducer;
use crate::api::stream::ByteStream;
use crate::error::TransportError;
use crate::types::Message;
use bytes::Bytes;
use futures::stream;
use std::sync::{Arc, Mutex};

enum MockReply {
    Records(Vec<String>),
    Fail(TransportError),
}

/// Scripted transport: each `submit` consumes the next reply in order.
#[derive(Clone)]
pub struct MockAgentClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    submitted: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockAgentClient {
    /// One entry per run; each string is an SSE record, framed with a
    /// trailing blank line unless it already ends with one.
    pub fn new(responses: Vec<Vec<String>>) -> Self {
        Self::from_replies(responses.into_iter().map(MockReply::Records).collect())
    }

    pub fn failing(error: TransportError) -> Self {
        Self::from_replies(vec![MockReply::Fail(error)])
    }

    fn from_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Transcripts received by each `submit`, oldest first.
    pub fn submitted(&self) -> Vec<Vec<Message>> {
        self.submitted.lock().unwrap().clone()
    }
}

impl MockStreamProducer for MockAgentClient {
    fn create_mock_stream(&self, messages: &[Message]) -> Result<ByteStream, TransportError> {
        self.submitted.lock().unwrap().push(messages.to_vec());

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(TransportError::Request {
                url: "mock".to_string(),
                message: "MockAgentClient: no more responses configured".to_string(),
            });
        }

        let records = match replies.remove(0) {
            MockReply::Records(records) => records,
            MockReply::Fail(error) => return Err(error),
        };

        let chunks: Vec<Result<Bytes, TransportError>> = records
            .into_iter()
            .map(|record| {
                let framed = if record.ends_with("\n\n") {
                    record
                } else {
                    format!("{record}\n\n")
                };
                Ok(Bytes::from(framed))
            })
            .collect();

        Ok(Box::pin(stream::iter(chunks)))
    }
}
