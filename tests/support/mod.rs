#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use jcritic::{
    llm::{GenerateRequest, RemoteError, TextGenerator},
    retry::Sleeper,
};

/// What the fake backend answers on one call.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Text(&'static str),
    RateLimited,
    Fatal,
}

/// Backend that replays a script, then repeats `fallback` forever.
pub struct ScriptedGenerator {
    replies:  Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls:    AtomicUsize,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedGenerator {
    pub fn new(replies: impl IntoIterator<Item = Reply>, fallback: Reply) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: Reply) -> Self {
        Self::new([], reply)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        match reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::RateLimited => Err(RemoteError::Api {
                code:    Some(429),
                kind:    Some("RESOURCE_EXHAUSTED".into()),
                message: "Resource has been exhausted (e.g. check quota).".into(),
            }),
            Reply::Fatal => Err(RemoteError::Api {
                code:    Some(400),
                kind:    Some("INVALID_ARGUMENT".into()),
                message: "API key not valid.".into(),
            }),
        }
    }
}

/// Records requested delays instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

impl Sleeper for &RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

/// Template-shaped reply used across tests.
pub const TEMPLATE_REPLY: &str = "1. **Evaluation:** Partially Correct\n2. **Justification:** \
                                  deposit accepts negative amounts.\n3. **Suggested \
                                  Correction:** reject amounts <= 0.";
