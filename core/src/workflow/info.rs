// bindery/src/workflow/info.rs

//! Sources for the caller-supplied data a workflow may ask for before discovery.

use crate::error::BinderyError;
use crate::options::UserArgs;
use crate::workflow::definition::{AdditionalData, InfoRequest};
use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{event, Level};

/// Answers a workflow's `InfoRequest`.
///
/// The job waits on `provide` with no timeout; wrap the provider if one is needed.
#[async_trait]
pub trait AdditionalInfoProvider: Send + Sync {
  async fn provide(&self, workflow: &str, args: &UserArgs, request: InfoRequest) -> anyhow::Result<AdditionalData>;
}

/// For callers that never answer requests. A workflow that asks fails its job.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdditionalInfo;

#[async_trait]
impl AdditionalInfoProvider for NoAdditionalInfo {
  async fn provide(&self, workflow: &str, _args: &UserArgs, _request: InfoRequest) -> anyhow::Result<AdditionalData> {
    Err(anyhow!(BinderyError::MissingAdditionalInfo {
      workflow: workflow.to_string(),
    }))
  }
}

/// Answers every request with the same mapping.
#[derive(Debug, Clone, Default)]
pub struct StaticInfo(pub AdditionalData);

#[async_trait]
impl AdditionalInfoProvider for StaticInfo {
  async fn provide(&self, _workflow: &str, _args: &UserArgs, _request: InfoRequest) -> anyhow::Result<AdditionalData> {
    Ok(self.0.clone())
  }
}

/// A pending request handed to an interactive frontend.
#[derive(Debug)]
pub struct InfoPrompt {
  pub workflow: String,
  pub request: InfoRequest,
  reply: oneshot::Sender<AdditionalData>,
}

impl InfoPrompt {
  /// Sends the answer back to the waiting job. Returns the data if the job is gone.
  pub fn respond(self, data: AdditionalData) -> Result<(), AdditionalData> {
    self.reply.send(data)
  }
}

/// Forwards requests over a channel and waits for the frontend's reply.
#[derive(Debug, Clone)]
pub struct ChannelInfoProvider {
  prompts: mpsc::Sender<InfoPrompt>,
}

impl ChannelInfoProvider {
  pub fn new(buffer: usize) -> (Self, mpsc::Receiver<InfoPrompt>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (Self { prompts: tx }, rx)
  }
}

#[async_trait]
impl AdditionalInfoProvider for ChannelInfoProvider {
  async fn provide(&self, workflow: &str, _args: &UserArgs, request: InfoRequest) -> anyhow::Result<AdditionalData> {
    let (reply_tx, reply_rx) = oneshot::channel();
    let prompt = InfoPrompt {
      workflow: workflow.to_string(),
      request,
      reply: reply_tx,
    };
    self
      .prompts
      .send(prompt)
      .await
      .map_err(|_| anyhow!("Frontend stopped listening for information requests"))?;
    event!(Level::DEBUG, %workflow, "Information request forwarded to frontend.");
    reply_rx
      .await
      .map_err(|_| anyhow!("Frontend dropped the information request without answering"))
  }
}
