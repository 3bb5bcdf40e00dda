use futures::channel::{mpsc, oneshot};
use futures::future::FutureExt;
use futures::prelude::*;
use tracing::{debug, warn};

use crate::command::Command;
use crate::committee::DistributionReport;
use crate::error::{Error, Result};
use crate::keys::{Identity, Share, ShareSet};

/// Issues commands to the committee event loop.
///
/// Cloning a client is cheap; every clone talks to the same event loop.
///
/// # Examples
///
/// ```rust
/// use futures::channel::mpsc;
/// use splitkey::client::Client;
/// use splitkey::command::Command;
///
/// let (sender, _receiver) = mpsc::channel::<Command>(10);
/// let client = Client { sender };
/// ```
#[derive(Clone)]
pub struct Client {
    pub sender: mpsc::Sender<Command>,
}

impl Client {
    /// Delivers a share to the member whose identity it carries.
    ///
    /// # Errors
    ///
    /// `UnknownRecipient` if no such member exists, `DuplicateShare` if the member
    /// already holds a share for `subject`.
    pub async fn register_share(
        &mut self,
        subject: String,
        share: Share,
        threshold: usize,
    ) -> Result<()> {
        let (sender, receiver) = oneshot::channel();
        self.sender
            .send(Command::RegisterShare {
                subject,
                share,
                threshold,
                sender,
            })
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        receiver
            .await
            .map_err(|_| Error::Transport("committee dropped the request".into()))?
    }

    /// Requests a member's share of `subject`.
    pub async fn get_share(&mut self, subject: String, member: Identity) -> Result<Share> {
        let (sender, receiver) = oneshot::channel();
        self.sender
            .send(Command::GetShare {
                subject,
                member,
                sender,
            })
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        receiver
            .await
            .map_err(|_| Error::Transport("committee dropped the request".into()))?
    }

    /// Sends every share of `subject` to its member concurrently and waits for all
    /// deliveries to finish.
    pub async fn distribute(
        &self,
        subject: &str,
        shares: &ShareSet,
        threshold: usize,
    ) -> DistributionReport {
        let requests = shares.iter().map(|(id, share)| {
            let id = *id;
            let subject = subject.to_string();
            let share = share.clone();
            let mut client = self.clone();
            debug!("Sending minipool '{}' share to member {}", subject, id);
            async move { (id, client.register_share(subject, share, threshold).await) }.boxed()
        });

        let mut report = DistributionReport::default();
        for (id, result) in futures::future::join_all(requests).await {
            match result {
                Ok(()) => report.delivered.push(id),
                Err(err) => report.failures.push((id, err)),
            }
        }
        report
    }

    /// Fetches the shares of the given members for `subject`.
    ///
    /// Members without a share are skipped and logged; the caller decides whether
    /// what remains is enough.
    pub async fn gather(&self, subject: &str, members: &[Identity]) -> ShareSet {
        let requests = members.iter().map(|&id| {
            let subject = subject.to_string();
            let mut client = self.clone();
            async move { (id, client.get_share(subject, id).await) }.boxed()
        });

        let mut shares = ShareSet::new();
        for (id, result) in futures::future::join_all(requests).await {
            match result {
                Ok(share) => {
                    shares.insert(id, share);
                }
                Err(err) => warn!("No share from member {}: {}", id, err),
            }
        }
        shares
    }
}
