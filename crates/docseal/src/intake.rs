//! Intake dispatch: one task per event.
//!
//! Attestations of the same identity are serialized by the attestation
//! orchestrator's identity locks; everything else runs concurrently, up to
//! a bound on events in flight.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

use docseal_core::Submission;

use crate::attestation::{AttestResult, AttestationOrchestrator};
use crate::error::Result;
use crate::verification::{VerificationOrchestrator, VerificationOutcome, VerificationRequest};

/// Work arriving from intake.
#[derive(Debug, Clone)]
pub enum IntakeEvent {
    Attest(Submission),
    Verify(VerificationRequest),
}

/// Outcome of one intake event.
#[derive(Debug)]
pub enum IntakeOutcome {
    Attestation(Result<AttestResult>),
    Verification(VerificationOutcome),
    /// The task running the event did not finish.
    Aborted(String),
}

pub struct Dispatcher {
    attestation: Arc<AttestationOrchestrator>,
    verification: Arc<VerificationOrchestrator>,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(
        attestation: Arc<AttestationOrchestrator>,
        verification: Arc<VerificationOrchestrator>,
        max_in_flight: usize,
    ) -> Self {
        Self {
            attestation,
            verification,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Process one event on the current task.
    pub async fn handle(&self, event: IntakeEvent) -> IntakeOutcome {
        run(&self.attestation, &self.verification, event).await
    }

    /// Process events concurrently. Outcomes are returned in event order.
    pub async fn dispatch(
        &self,
        events: impl IntoIterator<Item = IntakeEvent>,
    ) -> Vec<IntakeOutcome> {
        let mut tasks = JoinSet::new();
        let mut count = 0;

        for (index, event) in events.into_iter().enumerate() {
            let attestation = Arc::clone(&self.attestation);
            let verification = Arc::clone(&self.verification);
            let permits = Arc::clone(&self.permits);

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, run(&attestation, &verification, event).await)
            });
            count += 1;
        }

        let mut outcomes: Vec<Option<IntakeOutcome>> = (0..count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => error!(error = %e, "intake task did not complete"),
            }
        }

        outcomes
            .into_iter()
            .map(|o| {
                o.unwrap_or_else(|| IntakeOutcome::Aborted("intake task did not complete".into()))
            })
            .collect()
    }
}

async fn run(
    attestation: &AttestationOrchestrator,
    verification: &VerificationOrchestrator,
    event: IntakeEvent,
) -> IntakeOutcome {
    match event {
        IntakeEvent::Attest(submission) => {
            IntakeOutcome::Attestation(attestation.attest(&submission).await)
        }
        IntakeEvent::Verify(request) => {
            IntakeOutcome::Verification(verification.verify(&request).await)
        }
    }
}
