use futures::channel::oneshot;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::committee::Committee;
use crate::error::{Error, Result};
use crate::keys::{Identity, Share};

/// Represents commands that can be issued to the committee event loop.
///
/// # Variants
///
/// * `RegisterShare` - Deliver a share to the member whose identity it carries.
/// * `GetShare` - Ask a member for its share of a minipool.
#[derive(Debug)]
pub enum Command {
    RegisterShare {
        subject: String,
        share: Share,
        threshold: usize,
        sender: oneshot::Sender<Result<()>>,
    },
    GetShare {
        subject: String,
        member: Identity,
        sender: oneshot::Sender<Result<Share>>,
    },
}

/// Handles one command against the committee and answers on its oneshot channel.
///
/// The work touches the member stores (and possibly disk), so the event loop runs
/// it on the blocking pool.
pub fn command_handler(committee: Arc<Committee>, command: Command) {
    match command {
        Command::RegisterShare {
            subject,
            share,
            threshold,
            sender,
        } => {
            let member = share.identity();
            let result = committee
                .member(member)
                .and_then(|m| m.set_key_share(&subject, &share, threshold));
            if let Err(err) = &result {
                warn!("⚠️ Delivery of minipool '{}' share to {} failed: {}", subject, member, err);
            }
            if sender.send(result).is_err() {
                debug!("Requester for member {} went away", member);
            }
        }
        Command::GetShare {
            subject,
            member,
            sender,
        } => {
            let result = committee
                .member(member)
                .and_then(|m| m.key_share(&subject))
                .and_then(|share| {
                    share.ok_or_else(|| Error::ShareNotFound {
                        subject: subject.clone(),
                        member,
                    })
                });
            if sender.send(result).is_err() {
                debug!("Requester for member {} went away", member);
            }
        }
    }
}
