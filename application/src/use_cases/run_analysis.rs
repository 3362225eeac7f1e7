//! Run Analysis use case
//!
//! Drives the phase pipeline:
//!
//! ```text
//! START → phase1 → phase2 → phase3 → phase4 → phase5 → final → DONE
//!            └────────┴────────┴── any failure ──┴────────┴──→ FAILED / CANCELLED
//! ```
//!
//! Every agent is resolved before the first provider call, so configuration
//! and provider-resolution problems abort the run before anything is billed.
//! Each phase sees the project context plus the records of strictly earlier
//! phases and is merged into the [`ConsolidatedReport`] only on success.

use crate::config::{PhaseDataPolicy, RunPolicy};
use crate::ports::agent::{Agent, AgentError, invoke_phase};
use crate::ports::agent_factory::{AgentFactory, FactoryError};
use crate::ports::progress::{AnalysisProgress, NoProgress};
use crate::use_cases::shared::{Cancelled, cancellable, is_cancelled, sleep_cancellable};
use architect_domain::{
    ConfigurationError, ConsolidatedReport, FinalAnalysis, PhaseDataError, PhaseId, PhaseInput,
    PhaseRecord, PhaseResult, PipelineState, ProjectContext, ProviderKind, ReportError,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during an analysis run
#[derive(Error, Debug)]
pub enum RunAnalysisError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Provider {provider} for {phase} is not compiled into this build")]
    UnsupportedProvider {
        phase: PhaseId,
        provider: ProviderKind,
    },

    #[error("{phase} failed after {attempts} attempt(s): {source}")]
    PhaseFailed {
        phase: PhaseId,
        attempts: u32,
        #[source]
        source: AgentError,
        report: Box<ConsolidatedReport>,
    },

    #[error("{phase} produced unusable output: {source}")]
    PhaseData {
        phase: PhaseId,
        #[source]
        source: PhaseDataError,
        report: Box<ConsolidatedReport>,
    },

    #[error("Run cancelled during {phase}")]
    Cancelled {
        phase: PhaseId,
        report: Box<ConsolidatedReport>,
    },

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<FactoryError> for RunAnalysisError {
    fn from(err: FactoryError) -> Self {
        match err {
            FactoryError::Configuration(e) => RunAnalysisError::Configuration(e),
            FactoryError::UnsupportedProvider { phase, provider } => {
                RunAnalysisError::UnsupportedProvider { phase, provider }
            }
        }
    }
}

impl RunAnalysisError {
    /// The phase the run stopped in, if it got that far.
    pub fn failed_phase(&self) -> Option<PhaseId> {
        match self {
            RunAnalysisError::PhaseFailed { phase, .. }
            | RunAnalysisError::PhaseData { phase, .. }
            | RunAnalysisError::Cancelled { phase, .. } => Some(*phase),
            RunAnalysisError::UnsupportedProvider { phase, .. } => Some(*phase),
            RunAnalysisError::Configuration(_) | RunAnalysisError::Report(_) => None,
        }
    }

    /// Records of every phase that completed before the run stopped.
    pub fn partial_report(&self) -> Option<&ConsolidatedReport> {
        match self {
            RunAnalysisError::PhaseFailed { report, .. }
            | RunAnalysisError::PhaseData { report, .. }
            | RunAnalysisError::Cancelled { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Terminal pipeline state, for errors raised after the run started.
    pub fn state(&self) -> Option<PipelineState> {
        match self {
            RunAnalysisError::PhaseFailed { phase, .. }
            | RunAnalysisError::PhaseData { phase, .. } => Some(PipelineState::Failed(*phase)),
            RunAnalysisError::Cancelled { phase, .. } => Some(PipelineState::Cancelled(*phase)),
            _ => None,
        }
    }

    /// Whether the run never reached a provider call.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RunAnalysisError::Configuration(_) | RunAnalysisError::UnsupportedProvider { .. }
        )
    }
}

/// Input for the RunAnalysis use case
#[derive(Debug, Clone)]
pub struct RunAnalysisInput {
    pub project: Arc<ProjectContext>,
    /// Date stamped into the report; defaults to today.
    pub analysis_date: Option<String>,
}

impl RunAnalysisInput {
    pub fn new(project: impl Into<Arc<ProjectContext>>) -> Self {
        Self {
            project: project.into(),
            analysis_date: None,
        }
    }

    pub fn with_analysis_date(mut self, date: impl Into<String>) -> Self {
        self.analysis_date = Some(date.into());
        self
    }
}

/// Output of a completed run
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub report: ConsolidatedReport,
    pub final_analysis: FinalAnalysis,
    pub state: PipelineState,
}

/// Why a single phase call stopped.
enum CallFailure {
    Cancelled,
    Failed { attempts: u32, source: AgentError },
}

/// Use case for running the phase pipeline over one project
pub struct RunAnalysisUseCase<F: AgentFactory + 'static> {
    factory: Arc<F>,
    policy: RunPolicy,
    cancellation_token: Option<CancellationToken>,
}

impl<F: AgentFactory + 'static> RunAnalysisUseCase<F> {
    pub fn new(factory: Arc<F>, policy: RunPolicy) -> Self {
        Self {
            factory,
            policy,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn policy(&self) -> &RunPolicy {
        &self.policy
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunAnalysisInput,
    ) -> Result<AnalysisOutput, RunAnalysisError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunAnalysisInput,
        progress: &dyn AnalysisProgress,
    ) -> Result<AnalysisOutput, RunAnalysisError> {
        let agents = self.resolve_agents()?;
        let project = input.project;

        if project.structure.is_empty() {
            warn!(
                project = %project.name,
                "Project structure is empty, continuing with placeholder"
            );
        }

        let analysis_date = input
            .analysis_date
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        let mut report = ConsolidatedReport::new(
            project.name.clone(),
            analysis_date,
            project.structure.clone().or_sentinel(),
            project.excluded_files.clone(),
        );

        info!(
            project = %project.name,
            files = project.files.len(),
            "Starting analysis with {} phases",
            agents.len()
        );
        let phases: Vec<PhaseId> = agents.iter().map(|(phase, _)| *phase).collect();
        progress.on_run_start(&project.name, &phases);

        let mut state = PipelineState::Start;
        for (phase, agent) in &agents {
            let phase = *phase;
            state = state.advance();
            debug!(?state, "Pipeline advanced");

            if is_cancelled(&self.cancellation_token) {
                return Err(self.cancelled(phase, report, progress));
            }

            let phase_input = PhaseInput::from_report(phase, Arc::clone(&project), &report);
            let (result, attempts) = match self
                .call_with_retry(agent.as_ref(), &phase_input, progress)
                .await
            {
                Ok(done) => done,
                Err(CallFailure::Cancelled) => {
                    return Err(self.cancelled(phase, report, progress));
                }
                Err(CallFailure::Failed { attempts, source }) => {
                    warn!(
                        state = ?state.fail(),
                        attempts,
                        error = %source,
                        "Phase failed, aborting run"
                    );
                    progress.on_phase_failed(phase, &source.to_string());
                    return Err(RunAnalysisError::PhaseFailed {
                        phase,
                        attempts,
                        source,
                        report: Box::new(report),
                    });
                }
            };

            let record = match self.build_record(phase, agent.as_ref(), result, attempts) {
                Ok(record) => record,
                Err(source) => {
                    warn!(state = ?state.fail(), error = %source, "Phase output rejected");
                    progress.on_phase_failed(phase, &source.to_string());
                    return Err(RunAnalysisError::PhaseData {
                        phase,
                        source,
                        report: Box::new(report),
                    });
                }
            };

            report.merge(record)?;
            if let Some(record) = report.get(phase) {
                progress.on_phase_complete(phase, record);
            }
        }
        state = state.advance();

        let final_analysis = Self::final_analysis(&report);
        info!(
            tokens_used = final_analysis.tokens_used,
            degraded = final_analysis.degraded_phases.len(),
            "Analysis complete"
        );
        progress.on_run_complete(final_analysis.tokens_used, &final_analysis.degraded_phases);

        Ok(AnalysisOutput {
            report,
            final_analysis,
            state,
        })
    }

    /// Resolve an agent for every phase, in order, before anything is sent.
    fn resolve_agents(&self) -> Result<Vec<(PhaseId, Box<dyn Agent>)>, RunAnalysisError> {
        PhaseId::ALL
            .into_iter()
            .map(|phase| -> Result<(PhaseId, Box<dyn Agent>), RunAnalysisError> {
                let overrides = self.policy.overrides_for(phase);
                let agent = self.factory.get_agent(phase, &overrides)?;
                debug!(
                    phase = %phase,
                    provider = %agent.provider(),
                    model = agent.model(),
                    "Resolved agent"
                );
                Ok((phase, agent))
            })
            .collect()
    }

    /// Call the phase operation with timeout, bounded retry and cancellation.
    async fn call_with_retry(
        &self,
        agent: &dyn Agent,
        input: &PhaseInput,
        progress: &dyn AnalysisProgress,
    ) -> Result<(PhaseResult, u32), CallFailure> {
        let phase = input.phase;
        let retry = &self.policy.retry;
        let max_attempts = retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            if is_cancelled(&self.cancellation_token) {
                return Err(CallFailure::Cancelled);
            }

            info!(
                phase = %phase,
                provider = %agent.provider(),
                model = agent.model(),
                attempt,
                "{}",
                phase.display_name()
            );
            progress.on_phase_start(phase, agent.provider(), agent.model(), attempt);

            let error = match cancellable(&self.cancellation_token, self.call_once(agent, input))
                .await
            {
                Err(Cancelled) => return Err(CallFailure::Cancelled),
                Ok(Ok(result)) => return Ok((result, attempt)),
                Ok(Err(error)) => error,
            };

            if !error.is_retryable() || attempt >= max_attempts {
                return Err(CallFailure::Failed {
                    attempts: attempt,
                    source: error,
                });
            }

            let delay = retry.delay_after(attempt, error.is_rate_limit(), error.retry_after());
            warn!(
                phase = %phase,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Phase call failed, retrying"
            );
            progress.on_phase_retry(phase, attempt, &error, delay);

            if sleep_cancellable(&self.cancellation_token, delay)
                .await
                .is_err()
            {
                return Err(CallFailure::Cancelled);
            }
            attempt += 1;
        }
    }

    /// One phase call bounded by the call timeout.
    async fn call_once(
        &self,
        agent: &dyn Agent,
        input: &PhaseInput,
    ) -> Result<PhaseResult, AgentError> {
        let call = invoke_phase(agent, input);
        match self.policy.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(AgentError::Timeout(limit)),
            },
            None => call.await,
        }
    }

    /// Turn a phase result into a record, applying the phase-data policy.
    fn build_record(
        &self,
        phase: PhaseId,
        agent: &dyn Agent,
        result: PhaseResult,
        attempts: u32,
    ) -> Result<PhaseRecord, PhaseDataError> {
        let key = phase.result_key();
        let problem = match result.get(key) {
            Some(output) if !output.trim().is_empty() => {
                return Ok(
                    PhaseRecord::completed(phase, agent.provider(), agent.model(), output)
                        .with_usage(result.usage)
                        .with_attempts(attempts),
                );
            }
            Some(_) => PhaseDataError::EmptyOutput {
                phase,
                key: key.to_string(),
            },
            None => PhaseDataError::MissingKey {
                phase,
                key: key.to_string(),
            },
        };

        match self.policy.phase_data {
            PhaseDataPolicy::Lenient => {
                warn!(phase = %phase, error = %problem, "Recording phase as degraded");
                Ok(
                    PhaseRecord::degraded(phase, agent.provider(), agent.model(), problem.to_string())
                        .with_usage(result.usage)
                        .with_attempts(attempts),
                )
            }
            PhaseDataPolicy::Strict => Err(problem),
        }
    }

    fn cancelled(
        &self,
        phase: PhaseId,
        report: ConsolidatedReport,
        progress: &dyn AnalysisProgress,
    ) -> RunAnalysisError {
        info!(state = ?PipelineState::Running(phase).cancel(), "Analysis cancelled");
        progress.on_cancelled(phase);
        RunAnalysisError::Cancelled {
            phase,
            report: Box::new(report),
        }
    }

    fn final_analysis(report: &ConsolidatedReport) -> FinalAnalysis {
        FinalAnalysis {
            output: report
                .get(PhaseId::Final)
                .map(|r| r.output.clone())
                .unwrap_or_default(),
            tokens_used: report.total_usage().total(),
            degraded_phases: report.degraded_phases(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::agent::{ChatMessage, Completion};
    use crate::ports::agent_factory::AgentOverrides;
    use architect_domain::{
        ModelConfig, PhaseRegistry, PromptTemplate, ProjectStructure, ReasoningMode, TokenUsage,
        UNAVAILABLE_PLACEHOLDER,
    };
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    // ==================== Test Mocks ====================

    #[derive(Clone)]
    enum Behavior {
        Respond(String),
        ProviderError,
        AuthError,
        /// Provider rejects the request with HTTP 400.
        Rejected,
        /// Fail with a provider error this many times, then respond.
        FailThenRespond(u32, String),
        RateLimitedThenRespond(Duration, String),
        /// Never returns.
        Hang,
        /// Respond under the wrong result key.
        WrongKey,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct RecordedCall {
        phase: PhaseId,
        prior: Vec<(PhaseId, String)>,
        prompt: String,
    }

    struct MockAgent {
        config: ModelConfig,
        system_prompt: String,
        behavior: Behavior,
        attempts: AtomicU32,
        calls: Arc<Mutex<Vec<RecordedCall>>>,
    }

    #[async_trait]
    impl Agent for MockAgent {
        fn provider(&self) -> ProviderKind {
            self.config.provider()
        }

        fn model(&self) -> &str {
            self.config.model_name()
        }

        fn reasoning_mode(&self) -> ReasoningMode {
            self.config.reasoning_mode()
        }

        fn system_prompt(&self) -> &str {
            &self.system_prompt
        }

        async fn send(&self, _messages: &[ChatMessage]) -> Result<Completion, AgentError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match &self.behavior {
                Behavior::Respond(text) => {
                    Ok(Completion::new(text.clone()).with_usage(TokenUsage::new(10, 5)))
                }
                Behavior::ProviderError => {
                    Err(AgentError::ProviderCall("connection reset".into()))
                }
                Behavior::AuthError => Err(AgentError::Authentication {
                    provider: self.provider(),
                    message: "invalid api key".into(),
                }),
                Behavior::Rejected => Err(AgentError::InvalidRequest {
                    provider: self.provider(),
                    status: 400,
                    message: "maximum context length exceeded".into(),
                }),
                Behavior::FailThenRespond(failures, text) => {
                    if attempt <= *failures {
                        Err(AgentError::ProviderCall("503".into()))
                    } else {
                        Ok(Completion::new(text.clone()))
                    }
                }
                Behavior::RateLimitedThenRespond(after, text) => {
                    if attempt == 1 {
                        Err(AgentError::RateLimited {
                            provider: self.provider(),
                            retry_after: Some(*after),
                        })
                    } else {
                        Ok(Completion::new(text.clone()))
                    }
                }
                Behavior::Hang => std::future::pending().await,
                Behavior::WrongKey => Ok(Completion::new("unused")),
            }
        }

        async fn run_phase(&self, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
            let prompt = PromptTemplate::user(input);
            self.calls.lock().unwrap().push(RecordedCall {
                phase: input.phase,
                prior: input
                    .prior()
                    .iter()
                    .map(|r| (r.phase, r.output.clone()))
                    .collect(),
                prompt: prompt.clone(),
            });
            let messages = [
                ChatMessage::system(self.system_prompt()),
                ChatMessage::user(prompt),
            ];
            let completion = self.send(&messages).await?;
            let key = match self.behavior {
                Behavior::WrongKey => "unexpected",
                _ => input.phase.result_key(),
            };
            Ok(PhaseResult::new(key, completion.text).with_usage(completion.usage))
        }
    }

    struct MockFactory {
        registry: Arc<PhaseRegistry>,
        behaviors: BTreeMap<PhaseId, Behavior>,
        calls: Arc<Mutex<Vec<RecordedCall>>>,
        overrides_seen: Mutex<Vec<(PhaseId, AgentOverrides)>>,
    }

    impl MockFactory {
        fn new(behaviors: BTreeMap<PhaseId, Behavior>) -> Self {
            Self::with_registry(
                PhaseRegistry::uniform(
                    ModelConfig::sampled(ProviderKind::AzureOpenAi, "gpt-4o", 0.7).unwrap(),
                ),
                behaviors,
            )
        }

        fn with_registry(
            registry: impl Into<Arc<PhaseRegistry>>,
            behaviors: BTreeMap<PhaseId, Behavior>,
        ) -> Self {
            Self {
                registry: registry.into(),
                behaviors,
                calls: Arc::new(Mutex::new(Vec::new())),
                overrides_seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AgentFactory for MockFactory {
        fn get_agent(
            &self,
            phase: PhaseId,
            overrides: &AgentOverrides,
        ) -> Result<Box<dyn Agent>, FactoryError> {
            let config = self.registry.resolve(phase)?;
            if matches!(config.provider(), ProviderKind::Gemini | ProviderKind::DeepSeek) {
                return Err(FactoryError::UnsupportedProvider {
                    phase,
                    provider: config.provider(),
                });
            }
            self.overrides_seen
                .lock()
                .unwrap()
                .push((phase, overrides.clone()));
            let behavior = self
                .behaviors
                .get(&phase)
                .cloned()
                .unwrap_or_else(|| Behavior::Respond(format!("{} output", phase)));
            Ok(Box::new(MockAgent {
                config,
                system_prompt: overrides
                    .system_prompt
                    .clone()
                    .unwrap_or_else(|| PromptTemplate::system(phase).to_string()),
                behavior,
                attempts: AtomicU32::new(0),
                calls: Arc::clone(&self.calls),
            }))
        }
    }

    fn project() -> ProjectContext {
        ProjectContext::new(
            "demo",
            ProjectStructure::from_paths(["src/a.rs", "src/b.rs", "Cargo.toml"]),
        )
        .with_excluded_files(vec!["assets/huge.bin".into()])
    }

    fn fast_policy() -> RunPolicy {
        RunPolicy::default().with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            ..Default::default()
        })
    }

    fn use_case(factory: MockFactory, policy: RunPolicy) -> (Arc<MockFactory>, RunAnalysisUseCase<MockFactory>) {
        let factory = Arc::new(factory);
        (Arc::clone(&factory), RunAnalysisUseCase::new(factory, policy))
    }

    fn input() -> RunAnalysisInput {
        RunAnalysisInput::new(project()).with_analysis_date("2026-01-01")
    }

    fn scripted(responses: &[(PhaseId, &str)]) -> BTreeMap<PhaseId, Behavior> {
        responses
            .iter()
            .map(|(phase, text)| (*phase, Behavior::Respond(text.to_string())))
            .collect()
    }

    fn five_responses() -> BTreeMap<PhaseId, Behavior> {
        scripted(&[
            (PhaseId::Phase1, "found modules A,B"),
            (PhaseId::Phase2, "plan: analyze A then B"),
            (PhaseId::Phase3, "A is a parser, B is a writer"),
            (PhaseId::Phase4, "pipeline pattern detected"),
            (PhaseId::Phase5, "well-structured project"),
            (PhaseId::Final, "final report"),
        ])
    }

    // ==================== Pipeline ====================

    #[tokio::test]
    async fn test_end_to_end_with_five_mocked_phases() {
        let (factory, use_case) = use_case(MockFactory::new(five_responses()), fast_policy());
        let output = use_case.execute(input()).await.unwrap();

        assert_eq!(output.state, PipelineState::Done);
        assert_eq!(output.report.phase_ids(), PhaseId::ALL.to_vec());
        assert_eq!(output.final_analysis.output, "final report");
        assert_eq!(output.final_analysis.tokens_used, 6 * 15);
        assert!(output.final_analysis.degraded_phases.is_empty());

        let calls = factory.calls();
        let final_call = calls.iter().find(|c| c.phase == PhaseId::Final).unwrap();
        assert_eq!(final_call.prior.len(), 5);
        for text in [
            "found modules A,B",
            "plan: analyze A then B",
            "A is a parser, B is a writer",
            "pipeline pattern detected",
            "well-structured project",
        ] {
            assert!(final_call.prompt.contains(text), "final prompt lacks {text}");
        }
        assert!(final_call.prompt.contains("assets/huge.bin"));
    }

    #[tokio::test]
    async fn test_phases_only_see_earlier_results() {
        let (factory, use_case) = use_case(MockFactory::new(five_responses()), fast_policy());
        use_case.execute(input()).await.unwrap();

        let calls = factory.calls();
        assert_eq!(
            calls.iter().map(|c| c.phase).collect::<Vec<_>>(),
            PhaseId::ALL.to_vec()
        );
        for call in &calls {
            assert!(call.prior.iter().all(|(p, _)| *p < call.phase));
            assert_eq!(call.prior.len(), call.phase.ordinal() - 1);
        }
    }

    #[tokio::test]
    async fn test_mutating_later_response_leaves_earlier_inputs_unchanged() {
        let (first, uc) = use_case(MockFactory::new(five_responses()), fast_policy());
        uc.execute(input()).await.unwrap();

        let mut mutated = five_responses();
        mutated.insert(
            PhaseId::Phase4,
            Behavior::Respond("event-driven pattern detected".into()),
        );
        let (second, uc) = use_case(MockFactory::new(mutated), fast_policy());
        uc.execute(input()).await.unwrap();

        let (first, second) = (first.calls(), second.calls());
        for phase in [PhaseId::Phase1, PhaseId::Phase2, PhaseId::Phase3, PhaseId::Phase4] {
            let a = first.iter().find(|c| c.phase == phase).unwrap();
            let b = second.iter().find(|c| c.phase == phase).unwrap();
            assert_eq!(a, b, "input of {phase} changed");
        }
        let final_b = second.iter().find(|c| c.phase == PhaseId::Final).unwrap();
        assert!(final_b.prompt.contains("event-driven pattern detected"));
    }

    #[tokio::test]
    async fn test_replay_yields_same_phase_keys() {
        let (_, first) = use_case(MockFactory::new(BTreeMap::new()), fast_policy());
        let (_, second) = use_case(MockFactory::new(BTreeMap::new()), fast_policy());
        let a = first.execute(input()).await.unwrap();
        let b = second.execute(input()).await.unwrap();
        assert_eq!(a.report.phase_ids(), b.report.phase_ids());
    }

    #[tokio::test]
    async fn test_phase1_sections_are_recorded() {
        let behaviors = scripted(&[(
            PhaseId::Phase1,
            "## Project Structure\nsrc/\n## Dependencies\nserde\n## Tech Stack\nRust",
        )]);
        let (_, use_case) = use_case(MockFactory::new(behaviors), fast_policy());
        let output = use_case.execute(input()).await.unwrap();

        let phase1 = output.report.get(PhaseId::Phase1).unwrap();
        assert_eq!(phase1.sections.get("dependencies").map(String::as_str), Some("serde"));
        assert_eq!(phase1.sections.get("tech_stack").map(String::as_str), Some("Rust"));
    }

    #[tokio::test]
    async fn test_empty_structure_uses_sentinel() {
        let (factory, use_case) = use_case(MockFactory::new(BTreeMap::new()), fast_policy());
        let project = ProjectContext::new("bare", ProjectStructure::default());
        let output = use_case
            .execute(RunAnalysisInput::new(project))
            .await
            .unwrap();

        assert!(output.report.project_structure.is_sentinel());
        assert_eq!(output.state, PipelineState::Done);
        let calls = factory.calls();
        assert!(calls[0].prompt.contains("No project structure provided"));
    }

    #[tokio::test]
    async fn test_swapping_provider_keeps_pipeline_shape() {
        let registry = PhaseRegistry::default().with_phase(
            PhaseId::Phase2,
            ModelConfig::reasoning(
                ProviderKind::Anthropic,
                "claude-3-7-sonnet-20250219",
                ReasoningMode::Enabled,
            )
            .unwrap(),
        );
        let (_, use_case) = use_case(
            MockFactory::with_registry(registry, BTreeMap::new()),
            fast_policy(),
        );
        let output = use_case.execute(input()).await.unwrap();

        assert_eq!(output.report.phase_ids(), PhaseId::ALL.to_vec());
        assert_eq!(
            output.report.get(PhaseId::Phase2).unwrap().provider,
            ProviderKind::Anthropic
        );
        assert_eq!(
            output.report.get(PhaseId::Phase3).unwrap().provider,
            ProviderKind::AzureOpenAi
        );
    }

    #[tokio::test]
    async fn test_overrides_reach_factory() {
        let policy = fast_policy()
            .with_default_overrides(AgentOverrides::default().with_max_tokens(1024))
            .with_phase_override(
                PhaseId::Final,
                AgentOverrides::default().with_system_prompt("write tersely"),
            );
        let (factory, use_case) = use_case(MockFactory::new(BTreeMap::new()), policy);
        use_case.execute(input()).await.unwrap();

        let seen = factory.overrides_seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 6);
        assert!(seen.iter().all(|(_, o)| o.max_tokens == Some(1024)));
        let (_, final_overrides) = seen.iter().find(|(p, _)| *p == PhaseId::Final).unwrap();
        assert_eq!(final_overrides.system_prompt.as_deref(), Some("write tersely"));
    }

    // ==================== Construction failures ====================

    #[tokio::test]
    async fn test_missing_phase_aborts_before_any_call() {
        let registry = PhaseRegistry::default().without_phase(PhaseId::Phase4);
        let (factory, use_case) = use_case(
            MockFactory::with_registry(registry, BTreeMap::new()),
            fast_policy(),
        );
        let err = use_case.execute(input()).await.unwrap_err();

        assert!(matches!(
            err,
            RunAnalysisError::Configuration(ConfigurationError::MissingPhase(PhaseId::Phase4))
        ));
        assert!(err.is_configuration_error());
        assert!(factory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_provider_aborts_before_any_call() {
        let registry = PhaseRegistry::default().with_phase(
            PhaseId::Phase5,
            ModelConfig::sampled(ProviderKind::Gemini, "gemini-2.0-flash", 0.5).unwrap(),
        );
        let (factory, use_case) = use_case(
            MockFactory::with_registry(registry, BTreeMap::new()),
            fast_policy(),
        );
        let err = use_case.execute(input()).await.unwrap_err();

        assert!(matches!(
            err,
            RunAnalysisError::UnsupportedProvider {
                phase: PhaseId::Phase5,
                provider: ProviderKind::Gemini
            }
        ));
        assert!(factory.calls().is_empty());
    }

    // ==================== Failures and retries ====================

    #[tokio::test]
    async fn test_phase3_provider_error_stops_run() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(PhaseId::Phase3, Behavior::ProviderError);
        let (factory, use_case) = use_case(MockFactory::new(behaviors), fast_policy());
        let err = use_case.execute(input()).await.unwrap_err();

        assert_eq!(err.failed_phase(), Some(PhaseId::Phase3));
        assert_eq!(err.state(), Some(PipelineState::Failed(PhaseId::Phase3)));
        match &err {
            RunAnalysisError::PhaseFailed {
                attempts, source, ..
            } => {
                assert_eq!(*attempts, 3);
                assert!(source.is_provider_call_error());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let report = err.partial_report().unwrap();
        assert_eq!(report.phase_ids(), vec![PhaseId::Phase1, PhaseId::Phase2]);
        for phase in [PhaseId::Phase4, PhaseId::Phase5, PhaseId::Final] {
            assert!(!report.contains(phase));
            assert!(factory.calls().iter().all(|c| c.phase != phase));
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(
            PhaseId::Phase2,
            Behavior::FailThenRespond(2, "plan after retries".into()),
        );
        let (_, use_case) = use_case(MockFactory::new(behaviors), fast_policy());
        let output = use_case.execute(input()).await.unwrap();

        let phase2 = output.report.get(PhaseId::Phase2).unwrap();
        assert_eq!(phase2.output, "plan after retries");
        assert_eq!(phase2.attempts, 3);
    }

    #[tokio::test]
    async fn test_authentication_error_is_not_retried() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(PhaseId::Phase1, Behavior::AuthError);
        let (factory, use_case) = use_case(MockFactory::new(behaviors), fast_policy());
        let err = use_case.execute(input()).await.unwrap_err();

        assert!(matches!(
            err,
            RunAnalysisError::PhaseFailed {
                phase: PhaseId::Phase1,
                attempts: 1,
                ..
            }
        ));
        assert_eq!(factory.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_request_is_not_retried() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(PhaseId::Phase3, Behavior::Rejected);
        let (factory, use_case) = use_case(MockFactory::new(behaviors), fast_policy());
        let err = use_case.execute(input()).await.unwrap_err();

        match err {
            RunAnalysisError::PhaseFailed {
                phase,
                attempts,
                source,
                ..
            } => {
                assert_eq!(phase, PhaseId::Phase3);
                assert_eq!(attempts, 1);
                assert!(matches!(source, AgentError::InvalidRequest { status: 400, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let phase3_calls = factory
            .calls()
            .iter()
            .filter(|c| c.phase == PhaseId::Phase3)
            .count();
        assert_eq!(phase3_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honours_retry_after() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(
            PhaseId::Phase1,
            Behavior::RateLimitedThenRespond(Duration::from_secs(30), "ok".into()),
        );
        let (_, use_case) = use_case(MockFactory::new(behaviors), fast_policy());

        let started = tokio::time::Instant::now();
        let output = use_case.execute(input()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert_eq!(output.report.get(PhaseId::Phase1).unwrap().attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_provider_call_error() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(PhaseId::Phase2, Behavior::Hang);
        let policy = fast_policy()
            .with_call_timeout(Some(Duration::from_millis(50)))
            .with_retry(RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                ..Default::default()
            });
        let (factory, use_case) = use_case(MockFactory::new(behaviors), policy);
        let err = use_case.execute(input()).await.unwrap_err();

        match err {
            RunAnalysisError::PhaseFailed {
                phase,
                attempts,
                source,
                ..
            } => {
                assert_eq!(phase, PhaseId::Phase2);
                assert_eq!(attempts, 2);
                assert!(matches!(source, AgentError::Timeout(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let phase2_calls = factory
            .calls()
            .iter()
            .filter(|c| c.phase == PhaseId::Phase2)
            .count();
        assert_eq!(phase2_calls, 2);
    }

    // ==================== Phase data policy ====================

    #[tokio::test]
    async fn test_lenient_policy_records_placeholder() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(PhaseId::Phase3, Behavior::WrongKey);
        let (factory, use_case) = use_case(MockFactory::new(behaviors), fast_policy());
        let output = use_case.execute(input()).await.unwrap();

        let phase3 = output.report.get(PhaseId::Phase3).unwrap();
        assert!(phase3.is_degraded());
        assert_eq!(phase3.output, UNAVAILABLE_PLACEHOLDER);
        assert_eq!(output.final_analysis.degraded_phases, vec![PhaseId::Phase3]);

        let calls = factory.calls();
        let phase4 = calls.iter().find(|c| c.phase == PhaseId::Phase4).unwrap();
        assert!(phase4.prior.contains(&(PhaseId::Phase3, UNAVAILABLE_PLACEHOLDER.to_string())));
    }

    #[tokio::test]
    async fn test_strict_policy_fails_run() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(PhaseId::Phase3, Behavior::WrongKey);
        let policy = fast_policy().with_phase_data(PhaseDataPolicy::Strict);
        let (_, use_case) = use_case(MockFactory::new(behaviors), policy);
        let err = use_case.execute(input()).await.unwrap_err();

        match &err {
            RunAnalysisError::PhaseData { phase, source, report } => {
                assert_eq!(*phase, PhaseId::Phase3);
                assert!(matches!(source, PhaseDataError::MissingKey { .. }));
                assert_eq!(report.phase_ids(), vec![PhaseId::Phase1, PhaseId::Phase2]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_output_is_degraded() {
        let behaviors = scripted(&[(PhaseId::Phase5, "   ")]);
        let (_, use_case) = use_case(MockFactory::new(behaviors), fast_policy());
        let output = use_case.execute(input()).await.unwrap();
        assert!(output.report.get(PhaseId::Phase5).unwrap().is_degraded());
    }

    // ==================== Cancellation ====================

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let (factory, use_case) = use_case(MockFactory::new(BTreeMap::new()), fast_policy());
        let use_case = use_case.with_cancellation(token);
        let err = use_case.execute(input()).await.unwrap_err();

        assert!(matches!(
            err,
            RunAnalysisError::Cancelled {
                phase: PhaseId::Phase1,
                ..
            }
        ));
        assert!(factory.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_in_flight_call() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(PhaseId::Phase2, Behavior::Hang);
        let token = CancellationToken::new();
        let (factory, use_case) = use_case(MockFactory::new(behaviors), fast_policy());
        let use_case = use_case.with_cancellation(token.clone());

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let err = use_case.execute(input()).await.unwrap_err();

        assert_eq!(err.state(), Some(PipelineState::Cancelled(PhaseId::Phase2)));
        assert_eq!(
            err.partial_report().unwrap().phase_ids(),
            vec![PhaseId::Phase1]
        );
        let phase2_calls = factory
            .calls()
            .iter()
            .filter(|c| c.phase == PhaseId::Phase2)
            .count();
        assert_eq!(phase2_calls, 1, "cancelled call must not be retried");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let mut behaviors = BTreeMap::new();
        behaviors.insert(PhaseId::Phase1, Behavior::ProviderError);
        let policy = fast_policy().with_retry(RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(60),
            ..Default::default()
        });
        let token = CancellationToken::new();
        let (factory, use_case) = use_case(MockFactory::new(behaviors), policy);
        let use_case = use_case.with_cancellation(token.clone());

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });
        let err = use_case.execute(input()).await.unwrap_err();

        assert!(matches!(
            err,
            RunAnalysisError::Cancelled {
                phase: PhaseId::Phase1,
                ..
            }
        ));
        assert_eq!(factory.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_runs_share_registry() {
        let shared = Arc::new(PhaseRegistry::uniform(
            ModelConfig::sampled(ProviderKind::OpenAi, "gpt-4.1", 0.5).unwrap(),
        ));
        let (_, first) = use_case(
            MockFactory::with_registry(Arc::clone(&shared), BTreeMap::new()),
            fast_policy(),
        );
        let (_, second) = use_case(
            MockFactory::with_registry(Arc::clone(&shared), five_responses()),
            fast_policy(),
        );
        assert_eq!(Arc::strong_count(&shared), 3);

        let (a, b) = tokio::join!(first.execute(input()), second.execute(input()));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.report.phase_ids(), b.report.phase_ids());
        for record in a.report.phases.values().chain(b.report.phases.values()) {
            assert_eq!(record.provider, ProviderKind::OpenAi);
            assert_eq!(record.model, "gpt-4.1");
        }
    }
}
