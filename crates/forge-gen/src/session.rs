//! Asset session state machine
//!
//! `Idle -> Resolving -> Ready | Failed`. A new request from `Ready` or
//! `Failed` goes back through `Resolving`. The session owns the account and
//! the current descriptor; a failed request leaves both untouched.

use crate::descriptor::AssetDescriptor;
use crate::entitlement::{self, Account};
use crate::export::{self, ExportEncoder, ExportFormat, ExportOutcome};
use crate::geometry::{DetailLevel, RenderKey, TessellationRecipe};
use crate::provider::Deadline;
use crate::resolver::PromptResolver;
use crate::texture::TextureSynthesizer;
use forge_core::{ForgeError, Result};
use std::fmt;
use std::time::Duration;

/// Input to one generation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub detail: DetailLevel,
    pub include_texture: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            detail: DetailLevel::default(),
            include_texture: false,
        }
    }

    pub fn with_detail(mut self, detail: DetailLevel) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_texture(mut self, include_texture: bool) -> Self {
        self.include_texture = include_texture;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resolving,
    Ready,
    /// Last request failed; carries the user-facing notice
    Failed(String),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Resolving => write!(f, "resolving"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// What the renderer collaborator draws
#[derive(Debug, Clone)]
pub struct Preview<'a> {
    pub descriptor: &'a AssetDescriptor,
    pub recipe: TessellationRecipe,
    pub key: RenderKey,
}

pub struct AssetSession {
    resolver: PromptResolver,
    synthesizer: TextureSynthesizer,
    account: Account,
    current: Option<AssetDescriptor>,
    detail: DetailLevel,
    state: SessionState,
    request_timeout: Option<Duration>,
}

impl AssetSession {
    pub fn new(resolver: PromptResolver, synthesizer: TextureSynthesizer, account: Account) -> Self {
        Self {
            resolver,
            synthesizer,
            account,
            current: None,
            detail: DetailLevel::default(),
            state: SessionState::Idle,
            request_timeout: None,
        }
    }

    /// Bound each generation request; on expiry the request fails instead
    /// of waiting on a hung collaborator
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn account(&self) -> Account {
        self.account
    }

    pub fn current(&self) -> Option<&AssetDescriptor> {
        self.current.as_ref()
    }

    pub fn detail(&self) -> DetailLevel {
        self.detail
    }

    /// Change mesh density without regenerating
    pub fn set_detail(&mut self, detail: DetailLevel) {
        self.detail = detail;
    }

    /// Run one generation request to completion.
    ///
    /// A blank prompt or an account with no credits is refused before the
    /// session leaves its current state. Once accepted, the request's detail
    /// level applies whether or not generation succeeds.
    pub fn generate(&mut self, request: GenerationRequest) -> Result<&AssetDescriptor> {
        if request.prompt.trim().is_empty() {
            return Err(ForgeError::EmptyPrompt);
        }
        if !self.account.can_generate() {
            return Err(ForgeError::InsufficientCredits {
                credits: self.account.credits,
            });
        }

        self.transition(SessionState::Resolving);
        self.detail = request.detail;
        let deadline = self
            .request_timeout
            .map(Deadline::after)
            .unwrap_or_default();

        match self.run_pipeline(&request, deadline) {
            Ok(descriptor) => {
                self.account = entitlement::spend(&self.account);
                tracing::info!(
                    asset = %descriptor.id(),
                    shape = %descriptor.shape(),
                    credits = self.account.credits,
                    "asset ready"
                );
                self.transition(SessionState::Ready);
                Ok(&*self.current.insert(descriptor))
            }
            Err(e) => {
                tracing::error!(error = %e, "generation failed");
                self.transition(SessionState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn run_pipeline(
        &self,
        request: &GenerationRequest,
        deadline: Deadline,
    ) -> Result<AssetDescriptor> {
        let params = self.resolver.resolve_within(&request.prompt, deadline);
        deadline.check("prompt resolution")?;

        let texture = if request.include_texture {
            let texture = self.synthesizer.synthesize_within(&request.prompt, deadline);
            deadline.check("texture synthesis")?;
            texture
        } else {
            None
        };

        AssetDescriptor::assemble(params, &request.prompt, texture)
    }

    fn transition(&mut self, next: SessionState) {
        tracing::info!(from = %self.state, to = %next, "session transition");
        self.state = next;
    }

    /// Current descriptor with the recipe for the current detail level
    pub fn preview(&self) -> Option<Preview<'_>> {
        let descriptor = self.current.as_ref()?;
        Some(Preview {
            descriptor,
            recipe: TessellationRecipe::new(descriptor.shape(), self.detail),
            key: RenderKey {
                asset_id: descriptor.id(),
                detail: self.detail,
            },
        })
    }

    /// Export the current descriptor. Denial is an outcome, not an error.
    pub fn export(
        &self,
        format: ExportFormat,
        encoder: &mut dyn ExportEncoder,
    ) -> Result<ExportOutcome> {
        let preview = self.preview().ok_or(ForgeError::NoActiveAsset)?;
        export::export(preview.descriptor, &preview.recipe, format, &self.account, encoder)
    }

    pub fn upgrade(&mut self) {
        self.account = entitlement::upgrade(&self.account);
        tracing::info!(tier = ?self.account.tier, "account upgraded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AssetParameters, Shape};
    use crate::geometry::Tessellation;
    use crate::providers::mock::{MockImageGenerator, MockInference};
    use forge_core::Scale;

    const BARREL_JSON: &str = r##"{"shape":"cylinder","color":"#8B4513","roughness":0.8,"metalness":0.6,"scale":[1,1,1],"name":"Rusty Barrel"}"##;

    struct CountingEncoder {
        calls: usize,
    }

    impl ExportEncoder for CountingEncoder {
        fn encode(
            &mut self,
            _: &AssetDescriptor,
            _: &TessellationRecipe,
            _: ExportFormat,
        ) -> Result<Vec<u8>> {
            self.calls += 1;
            Ok(vec![0x67, 0x6c, 0x54, 0x46])
        }
    }

    fn session(inference: MockInference, account: Account) -> AssetSession {
        AssetSession::new(
            PromptResolver::new(Box::new(inference)),
            TextureSynthesizer::new(Box::new(MockImageGenerator::new())),
            account,
        )
    }

    #[test]
    fn test_scenario_rusty_barrel() {
        let mut s = session(MockInference::responding(BARREL_JSON), Account::free(5));
        assert_eq!(s.state(), &SessionState::Idle);

        let request = GenerationRequest::new("a rusty barrel")
            .with_detail(DetailLevel::Medium)
            .with_texture(true);
        let descriptor = s.generate(request).unwrap().clone();

        assert_eq!(descriptor.shape(), Shape::Cylinder);
        assert_eq!(descriptor.color().as_str(), "#8B4513");
        assert_eq!(descriptor.roughness(), 0.8);
        assert_eq!(descriptor.metalness(), 0.6);
        assert_eq!(descriptor.name(), "Rusty Barrel");
        assert_eq!(descriptor.description(), "a rusty barrel");
        assert!(descriptor.texture().is_some());
        assert_eq!(s.state(), &SessionState::Ready);
        assert_eq!(s.account().credits, 4);

        let preview = s.preview().unwrap();
        assert_eq!(preview.recipe.segment_count, 32);
        match preview.recipe.tessellation {
            Tessellation::Cylinder { radial_segments, .. } => assert_eq!(radial_segments, 32),
            other => panic!("expected cylinder, got {:?}", other),
        }
    }

    #[test]
    fn test_scenario_collaborator_failure_uses_fallback() {
        let mut s = session(MockInference::failing("connection refused"), Account::free(5));
        let descriptor = s.generate(GenerationRequest::new("a mystery object")).unwrap().clone();

        let expected = AssetParameters::fallback();
        assert_eq!(Some(descriptor.shape()), expected.shape);
        assert_eq!(descriptor.color().as_str(), "#cccccc");
        assert_eq!(descriptor.roughness(), 0.5);
        assert_eq!(descriptor.metalness(), 0.5);
        assert_eq!(descriptor.scale(), Scale::ONE);
        assert_eq!(descriptor.name(), "Unknown Object");
        assert_eq!(s.state(), &SessionState::Ready);
        assert_eq!(s.account().credits, 4);
    }

    #[test]
    fn test_scenario_free_tier_fbx_denied() {
        let mut s = session(MockInference::responding(BARREL_JSON), Account::free(5));
        s.generate(GenerationRequest::new("a rusty barrel")).unwrap();
        let credits_before = s.account().credits;

        let mut encoder = CountingEncoder { calls: 0 };
        let outcome = s.export(ExportFormat::Fbx, &mut encoder).unwrap();

        assert!(matches!(
            outcome,
            ExportOutcome::UpgradeRequired { format: ExportFormat::Fbx }
        ));
        assert_eq!(encoder.calls, 0);
        assert_eq!(s.account().credits, credits_before);
    }

    #[test]
    fn test_upgrade_unlocks_pro_formats() {
        let mut s = session(MockInference::responding(BARREL_JSON), Account::free(5));
        s.generate(GenerationRequest::new("a rusty barrel")).unwrap();
        s.upgrade();

        let mut encoder = CountingEncoder { calls: 0 };
        match s.export(ExportFormat::Obj, &mut encoder).unwrap() {
            ExportOutcome::Exported(file) => assert_eq!(file.file_name, "rusty_barrel.obj"),
            other => panic!("expected export, got {:?}", other),
        }
        assert_eq!(encoder.calls, 1);
        assert_eq!(s.account().credits, 4);
    }

    #[test]
    fn test_texture_failure_still_debits() {
        let mut s = AssetSession::new(
            PromptResolver::new(Box::new(MockInference::responding(BARREL_JSON))),
            TextureSynthesizer::new(Box::new(MockImageGenerator::failing("no quota"))),
            Account::free(2),
        );
        let request = GenerationRequest::new("a rusty barrel").with_texture(true);
        let descriptor = s.generate(request).unwrap();
        assert!(descriptor.texture().is_none());
        assert_eq!(s.account().credits, 1);
    }

    #[test]
    fn test_texture_not_requested_skips_collaborator() {
        let images = MockImageGenerator::new();
        let log = images.request_log();
        let mut s = AssetSession::new(
            PromptResolver::new(Box::new(MockInference::new())),
            TextureSynthesizer::new(Box::new(images)),
            Account::free(1),
        );
        s.generate(GenerationRequest::new("a ball").with_texture(false)).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_new_request_supersedes_with_new_id() {
        let mut s = session(MockInference::new(), Account::free(5));
        let first = s.generate(GenerationRequest::new("a ball")).unwrap().id();
        let second = s.generate(GenerationRequest::new("a ball")).unwrap().id();
        assert_ne!(first, second);
        assert_eq!(s.current().map(|d| d.id()), Some(second));
        assert_eq!(s.account().credits, 3);
    }

    #[test]
    fn test_empty_prompt_rejected_without_state_change() {
        let mut s = session(MockInference::new(), Account::free(5));
        assert!(matches!(
            s.generate(GenerationRequest::new("   ")),
            Err(ForgeError::EmptyPrompt)
        ));
        assert_eq!(s.state(), &SessionState::Idle);
        assert_eq!(s.account().credits, 5);
    }

    #[test]
    fn test_zero_credits_blocks_generation() {
        let mut s = session(MockInference::new(), Account::free(1));
        s.generate(GenerationRequest::new("a gem")).unwrap();
        assert_eq!(s.account().credits, 0);

        let err = s.generate(GenerationRequest::new("another gem")).unwrap_err();
        assert!(matches!(err, ForgeError::InsufficientCredits { credits: 0 }));
        assert_eq!(s.state(), &SessionState::Ready);
        assert_eq!(s.account().credits, 0);
    }

    #[test]
    fn test_deadline_expiry_fails_and_keeps_previous() {
        let mut s = session(MockInference::new(), Account::free(5));
        let previous = s.generate(GenerationRequest::new("a donut")).unwrap().id();

        let mut s = s.with_request_timeout(Some(Duration::ZERO));
        let err = s.generate(GenerationRequest::new("a pillar")).unwrap_err();

        assert!(matches!(err, ForgeError::DeadlineExceeded(_)));
        assert!(matches!(s.state(), SessionState::Failed(_)));
        assert_eq!(s.current().map(|d| d.id()), Some(previous));
        assert_eq!(s.account().credits, 4);
    }

    #[test]
    fn test_detail_applies_even_when_request_fails() {
        let mut s = session(MockInference::new(), Account::free(5));
        s.generate(GenerationRequest::new("a donut").with_detail(DetailLevel::Low))
            .unwrap();

        let mut s = s.with_request_timeout(Some(Duration::ZERO));
        let request = GenerationRequest::new("a pillar").with_detail(DetailLevel::High);
        assert!(s.generate(request).is_err());

        assert_eq!(s.detail(), DetailLevel::High);
        let preview = s.preview().unwrap();
        assert_eq!(preview.descriptor.shape(), Shape::Torus);
        assert_eq!(preview.recipe.segment_count, 128);
    }

    #[test]
    fn test_failed_session_recovers_on_resubmit() {
        let mut s = session(MockInference::new(), Account::free(5))
            .with_request_timeout(Some(Duration::ZERO));
        assert!(s.generate(GenerationRequest::new("a cone")).is_err());

        let mut s = s.with_request_timeout(None);
        s.generate(GenerationRequest::new("a cone")).unwrap();
        assert_eq!(s.state(), &SessionState::Ready);
        assert_eq!(s.current().map(|d| d.shape()), Some(Shape::Cone));
    }

    #[test]
    fn test_export_without_asset() {
        let s = session(MockInference::new(), Account::pro(5));
        let mut encoder = CountingEncoder { calls: 0 };
        assert!(matches!(
            s.export(ExportFormat::Glb, &mut encoder),
            Err(ForgeError::NoActiveAsset)
        ));
    }

    #[test]
    fn test_detail_change_changes_render_key() {
        let mut s = session(MockInference::new(), Account::free(5));
        s.generate(GenerationRequest::new("a crate").with_detail(DetailLevel::Low))
            .unwrap();
        let low = s.preview().unwrap().key;
        assert_eq!(s.preview().unwrap().recipe.segment_count, 12);

        s.set_detail(DetailLevel::High);
        let preview = s.preview().unwrap();
        assert!(RenderKey::needs_rerender(Some(&low), &preview.key));
        assert_eq!(preview.recipe.segment_count, 128);
        assert_eq!(preview.descriptor.id(), low.asset_id);
    }
}
