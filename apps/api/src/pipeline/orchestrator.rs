use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{OptimizationOutcome, PipelineError, PipelineFailure, Stage};
use crate::config::GenerationSettings;
use crate::generation::analysis::analyze;
use crate::generation::client::{GenerationClient, GenerationError};
use crate::generation::fit::score_fit;
use crate::generation::prompts::build_optimize_prompt;
use crate::models::profile::{GeneratedProfile, JobContext, SourceProfile};
use crate::repair::{repair_profile, RepairError, RepairStrategy};
use crate::validation::{validate, ContainmentPolicy};

/// Characters of raw generator output kept in a log line.
const RAW_LOG_PREFIX_CHARS: usize = 200;

/// Characters of the fingerprint shown in logs.
const FINGERPRINT_LOG_CHARS: usize = 12;

type RunResult = Result<OptimizationOutcome, PipelineFailure>;
type SharedRun = Arc<OnceCell<RunResult>>;

/// Runs the optimization pipeline and collapses concurrent identical requests
/// into one run. Holds no per-request state outside the in-flight map.
pub struct Orchestrator {
    client: Arc<GenerationClient>,
    policy: ContainmentPolicy,
    total_budget: Duration,
    profile_char_limit: usize,
    job_description_char_limit: usize,
    in_flight: Mutex<HashMap<String, SharedRun>>,
}

impl Orchestrator {
    pub fn new(
        client: Arc<GenerationClient>,
        settings: &GenerationSettings,
        policy: ContainmentPolicy,
    ) -> Self {
        Self {
            client,
            policy,
            total_budget: settings.total_budget,
            profile_char_limit: settings.profile_char_limit,
            job_description_char_limit: settings.job_description_char_limit,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &ContainmentPolicy {
        &self.policy
    }

    /// Runs the pipeline to completion.
    pub async fn optimize(&self, source: SourceProfile, job: JobContext) -> RunResult {
        self.optimize_cancellable(source, job, std::future::pending()).await
    }

    /// Runs the pipeline until it finishes or `cancel` resolves, whichever is
    /// first. Cancelling drops the outstanding backend call; no partial profile
    /// is returned.
    pub async fn optimize_cancellable<C>(
        &self,
        source: SourceProfile,
        job: JobContext,
        cancel: C,
    ) -> RunResult
    where
        C: Future<Output = ()>,
    {
        let job = self.prepare(&source, job)?;
        let fingerprint = fingerprint(&source, &job)
            .map_err(|e| PipelineFailure::new(Stage::Received, PipelineError::InvalidInput(e.to_string())))?;
        let short = short(&fingerprint).to_string();

        // Dropping the caller's future (client disconnect) still leaves the run.
        let participation = self.join(&fingerprint);
        let result = tokio::select! {
            result = participation.run().get_or_init(|| self.run(&fingerprint, &source, &job)) => result.clone(),
            _ = cancel => {
                // Only generation awaits, so that is where a cancel lands.
                info!("[{short}] cancelled by caller");
                Err(PipelineFailure::new(Stage::Generating, PipelineError::Cancelled))
            }
        };
        result
    }

    /// Input ceilings: an oversized profile is rejected, an oversized job
    /// description is truncated.
    fn prepare(&self, source: &SourceProfile, mut job: JobContext) -> Result<JobContext, PipelineFailure> {
        let invalid = |msg: String| PipelineFailure::new(Stage::Received, PipelineError::InvalidInput(msg));

        if job.description.trim().is_empty() {
            return Err(invalid("job description cannot be empty".to_string()));
        }

        let profile_chars = serde_json::to_string(source)
            .map_err(|e| invalid(e.to_string()))?
            .chars()
            .count();
        if profile_chars > self.profile_char_limit {
            return Err(invalid(format!(
                "profile is {profile_chars} characters, limit is {}",
                self.profile_char_limit
            )));
        }

        if let Some((idx, _)) = job.description.char_indices().nth(self.job_description_char_limit) {
            debug!(
                "truncating job description to {} characters",
                self.job_description_char_limit
            );
            job.description.truncate(idx);
        }
        Ok(job)
    }

    /// Registers interest in the run for `fingerprint`, creating it if absent.
    fn join(&self, fingerprint: &str) -> Participation<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let run = in_flight.entry(fingerprint.to_string()).or_default();
        if run.initialized() {
            debug!("[{}] reusing finished run", short(fingerprint));
        } else if Arc::strong_count(run) > 1 {
            debug!("[{}] joining in-flight run", short(fingerprint));
        }
        Participation {
            in_flight: &self.in_flight,
            fingerprint: fingerprint.to_string(),
            run: run.clone(),
        }
    }

    async fn run(&self, fingerprint: &str, source: &SourceProfile, job: &JobContext) -> RunResult {
        let request_id = Uuid::new_v4();
        let short = short(fingerprint);
        let mut stages = vec![Stage::Received];
        info!("[{request_id}] {short} received (model: {})", self.client.model());

        let failed = |stage: Stage, error: PipelineError| {
            warn!("[{request_id}] {short} failed while {stage}: {error}");
            PipelineFailure::new(stage, error)
        };

        let analysis = analyze(job);
        let fit = score_fit(source, &analysis);
        debug!(
            "[{request_id}] {short} fit score {} (matched: {})",
            fit.overall_score,
            fit.matched_keywords().join(", ")
        );
        let prompt = build_optimize_prompt(source, job, &analysis)
            .map_err(|e| failed(Stage::Received, PipelineError::InvalidInput(e.to_string())))?;

        // ── Generating ──────────────────────────────────────────────────────
        enter(&mut stages, Stage::Generating, request_id, short);
        let raw = match timeout(self.total_budget, self.client.generate(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(failed(Stage::Generating, e.into())),
            Err(_) => {
                return Err(failed(
                    Stage::Generating,
                    PipelineError::Timeout {
                        budget: self.total_budget,
                    },
                ))
            }
        };

        // ── Repairing ───────────────────────────────────────────────────────
        enter(&mut stages, Stage::Repairing, request_id, short);
        let (profile, strategy) = match repair_profile(&raw) {
            Ok((profile, strategy)) => {
                if strategy.is_lossy() {
                    warn!("[{request_id}] {short} output recovered by {strategy}; trailing content may be lost");
                } else if strategy != RepairStrategy::Direct {
                    debug!("[{request_id}] {short} output repaired with strategy {strategy}");
                }
                (profile, Some(strategy))
            }
            Err(RepairError::RecoverableEmpty) => {
                warn!("[{request_id}] {short} generator returned an empty document");
                (GeneratedProfile::empty(), None)
            }
            Err(e) => {
                warn!(
                    "[{request_id}] {short} unrepairable output starts with: {}",
                    prefix(&raw, RAW_LOG_PREFIX_CHARS)
                );
                return Err(failed(Stage::Repairing, GenerationError::Repair(e).into()));
            }
        };

        // ── Validating ──────────────────────────────────────────────────────
        enter(&mut stages, Stage::Validating, request_id, short);
        let report = validate(source, &profile, job, &self.policy);
        if !report.passed {
            warn!(
                "[{request_id}] {short} validation failed with {} errors: {}",
                report.error_count(),
                report
                    .errors
                    .iter()
                    .map(|issue| issue.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            );
        }

        stages.push(Stage::Done);
        info!(
            "[{request_id}] {short} done ({} errors, {} warnings)",
            report.error_count(),
            report.warning_count()
        );
        Ok(OptimizationOutcome {
            request_id,
            fingerprint: fingerprint.to_string(),
            profile,
            report,
            repair_strategy: strategy.map(RepairStrategy::as_str),
            analysis,
            fit,
            stages,
            model: self.client.model().to_string(),
        })
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().unwrap().len()
    }
}

/// One caller's hold on a shared run. The last holder to drop removes the
/// in-flight entry, so a later identical request starts a fresh run.
struct Participation<'a> {
    in_flight: &'a Mutex<HashMap<String, SharedRun>>,
    fingerprint: String,
    run: SharedRun,
}

impl Participation<'_> {
    fn run(&self) -> &OnceCell<RunResult> {
        &self.run
    }
}

impl Drop for Participation<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // Released under the lock so concurrent leavers see exact counts.
        let run = std::mem::take(&mut self.run);
        let last = in_flight
            .get(&self.fingerprint)
            .is_some_and(|entry| Arc::ptr_eq(entry, &run) && Arc::strong_count(&run) == 2);
        if last {
            in_flight.remove(&self.fingerprint);
        }
        drop(run);
    }
}

fn enter(stages: &mut Vec<Stage>, stage: Stage, request_id: Uuid, short: &str) {
    info!("[{request_id}] {short} {stage}");
    stages.push(stage);
}

/// SHA-256 over the canonical JSON of source and job.
pub fn fingerprint(source: &SourceProfile, job: &JobContext) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_vec(&(source, job))?;
    Ok(format!("{:x}", Sha256::digest(&canonical)))
}

fn short(fingerprint: &str) -> &str {
    prefix(fingerprint, FINGERPRINT_LOG_CHARS)
}

fn prefix(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
