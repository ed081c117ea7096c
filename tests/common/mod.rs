#![allow(dead_code)]

use async_trait::async_trait;
use career_guide::{AiGateway, BackendError, ChatSession, GenerativeBackend};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted backend that records every message it receives.
pub struct StubBackend {
    behaviour: Behaviour,
    calls: AtomicUsize,
    received: Mutex<Vec<String>>,
}

pub enum Behaviour {
    Reply(Option<String>),
    Echo,
    Fail(fn() -> BackendError),
    Hang(Duration),
}

impl StubBackend {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeBackend for StubBackend {
    async fn send_message(
        &self,
        session: &ChatSession,
        message: &str,
    ) -> Result<Option<String>, BackendError> {
        assert!(session.history().is_empty(), "sessions must start without history");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(message.to_string());
        match &self.behaviour {
            Behaviour::Reply(reply) => Ok(reply.clone()),
            Behaviour::Echo => {
                // Longer messages answer sooner so replies finish out of order.
                let delay = 50u64.saturating_sub(message.len() as u64);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(Some(format!("echo:{}", message)))
            }
            Behaviour::Fail(make) => Err(make()),
            Behaviour::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(Some("too late".to_string()))
            }
        }
    }
}

pub fn gateway_with(backend: Arc<StubBackend>) -> AiGateway {
    AiGateway::new(backend, Duration::from_secs(5))
}
