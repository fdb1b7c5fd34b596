//! Time-boxed draw and rematch offers.
//!
//! An offer waits on a one-shot [`NegotiationTimer`]; the opponent's response
//! reaches it through the matching [`CancelHandle`]. The offer's lifecycle is
//! tracked in the session as a [`Negotiation`] sub-state.

use std::time::Duration;

use tokio::sync::oneshot;

use super::ack::AckType;

/// Window a draw offer stays open.
pub const DRAW_OFFER_WINDOW: Duration = Duration::from_secs(10);

/// Window a rematch offer stays open.
pub const REMATCH_OFFER_WINDOW: Duration = Duration::from_secs(15);

/// How a wait on a [`NegotiationTimer`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationOutcome {
    Responded { accepted: bool },
    Expired,
}

/// Single-use cancelable deadline.
#[derive(Debug)]
pub struct NegotiationTimer {
    rx: oneshot::Receiver<bool>,
}

/// Response side of a [`NegotiationTimer`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: Option<oneshot::Sender<bool>>,
}

impl NegotiationTimer {
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = oneshot::channel();
        (Self { rx }, CancelHandle { tx: Some(tx) })
    }

    /// Wait until the handle is cancelled or `window` elapses. A handle
    /// dropped without cancelling counts as expiry.
    pub async fn start_and_await(self, window: Duration) -> NegotiationOutcome {
        match tokio::time::timeout(window, self.rx).await {
            Ok(Ok(accepted)) => NegotiationOutcome::Responded { accepted },
            Ok(Err(_)) | Err(_) => NegotiationOutcome::Expired,
        }
    }
}

impl CancelHandle {
    /// Wake the waiter with the response. Returns `false` if the waiter is
    /// gone (deadline passed) or the handle was already used.
    pub fn cancel(&mut self, accepted: bool) -> bool {
        match self.tx.take() {
            Some(tx) => tx.send(accepted).is_ok(),
            None => false,
        }
    }
}

/// Final verdict of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Declined,
    Expired,
}

impl Verdict {
    pub fn from_response(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Declined
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
        }
    }
}

/// Negotiation sub-state of one offer kind.
#[derive(Debug, Default)]
pub enum Negotiation {
    #[default]
    Idle,
    Offered {
        by: String,
        seq: u64,
        handle: CancelHandle,
    },
    Resolved {
        by: String,
        seq: u64,
        verdict: Verdict,
    },
}

impl Negotiation {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Offered { .. })
    }

    /// Player whose offer is awaiting a response.
    pub fn pending_offerer(&self) -> Option<&str> {
        match self {
            Self::Offered { by, .. } => Some(by),
            _ => None,
        }
    }

    /// Record a response to the pending offer and wake the offerer.
    ///
    /// Returns the verdict, or `None` when nothing is pending.
    pub fn respond(&mut self, accepted: bool) -> Option<Verdict> {
        if !self.is_pending() {
            return None;
        }
        let Self::Offered { by, seq, mut handle } = std::mem::take(self) else {
            return None;
        };
        // A false return means the deadline already fired; the offerer still
        // honors the recorded verdict when it retakes the lock.
        handle.cancel(accepted);

        let verdict = Verdict::from_response(accepted);
        *self = Self::Resolved { by, seq, verdict };
        Some(verdict)
    }

    /// Close the pending offer as expired without a response. Dropping the
    /// handle wakes the waiter at once.
    pub fn withdraw(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        if let Self::Offered { by, seq, handle } = std::mem::take(self) {
            drop(handle);
            *self = Self::Resolved {
                by,
                seq,
                verdict: Verdict::Expired,
            };
        }
        true
    }

    /// Settle offer `seq` after its wait ended. A verdict recorded by a
    /// response wins; otherwise the offer expires.
    pub fn settle(&mut self, seq: u64) -> Verdict {
        match self {
            Self::Resolved {
                seq: resolved, verdict, ..
            } if *resolved == seq => *verdict,
            Self::Offered { seq: offered, .. } if *offered == seq => {
                if let Self::Offered { by, seq, .. } = std::mem::take(self) {
                    *self = Self::Resolved {
                        by,
                        seq,
                        verdict: Verdict::Expired,
                    };
                }
                Verdict::Expired
            }
            _ => Verdict::Expired,
        }
    }
}

/// The two offer kinds a session negotiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationKind {
    Draw,
    Rematch,
}

impl NegotiationKind {
    pub fn window(&self) -> Duration {
        match self {
            Self::Draw => DRAW_OFFER_WINDOW,
            Self::Rematch => REMATCH_OFFER_WINDOW,
        }
    }

    /// Draw offers only make sense during play; rematches are offered after.
    pub fn requires_active(&self) -> bool {
        matches!(self, Self::Draw)
    }

    pub fn not_offered(&self) -> AckType {
        match self {
            Self::Draw => AckType::DrawNotOffered,
            Self::Rematch => AckType::RematchNotOffered,
        }
    }

    /// Acknowledgement returned to the offerer for a verdict.
    pub fn ack_for(&self, verdict: Verdict) -> AckType {
        match (self, verdict) {
            (_, Verdict::Accepted) => AckType::Success,
            (Self::Draw, Verdict::Declined) => AckType::DrawOfferDeclined,
            (Self::Draw, Verdict::Expired) => AckType::DrawOfferExpired,
            (Self::Rematch, Verdict::Declined) => AckType::RematchOfferDeclined,
            (Self::Rematch, Verdict::Expired) => AckType::RematchOfferExpired,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Rematch => "rematch",
        }
    }
}
