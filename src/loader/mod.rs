//! Loader for `.vrma` animation content
//!
//! One load is one fetch followed by one parse. How the fetched content is
//! interpreted depends on the configured [`ContentStrategy`]:
//! - `Json`: the JSON track format, always
//! - `Sniff`: GLB when the content starts with `glTF`, JSON otherwise
//! - `VrmAnimation`: the VRM animation parser, with the caller's skeleton
//!   attached to the result

pub mod gltf;
pub mod json;
#[cfg(feature = "vrm-animation")]
pub mod vrma;

pub use self::gltf::{is_binary_gltf, AnimationParser, GltfAnimationParser, GLB_MAGIC};
pub use self::json::{decode_text, parse_json_clip, JSON_CLIP_NAME};
#[cfg(feature = "vrm-animation")]
pub use self::vrma::{VrmAnimationParser, VRM_ANIMATION_EXTENSION};

use crate::async_loading::{AsyncClipHandle, LoadState};
use crate::clip::AnimationClip;
use crate::config::{ContentStrategy, LoaderConfig};
use crate::fetch::{FetchRequest, Fetcher, FileFetcher, ResponseType};
use crate::manager::LoadingManagerHandle;
use crate::runtime::{AsyncSpawner, JoinHandle};
use crate::skeleton::{Skeleton, SkeletonSource};
use crate::{LoaderError, Result};
use std::sync::Arc;

/// Callback receiving the error of a failed callback-style load
pub type ErrorCallback = Box<dyn FnOnce(LoaderError) + Send>;

/// Outcome of a successful load
#[derive(Debug, Clone, Default)]
pub struct LoadResult {
    /// The parsed clip; `None` when binary content holds no animation
    pub clip: Option<AnimationClip>,
    /// Skeleton of the supplied model, VRM animation loads only
    pub skeleton: Option<Arc<Skeleton>>,
}

impl LoadResult {
    /// A result carrying only a clip
    pub fn from_clip(clip: Option<AnimationClip>) -> Self {
        Self {
            clip,
            skeleton: None,
        }
    }
}

/// Loads animation clips through a [`Fetcher`]
///
/// Generic over the fetcher so tests and embedders can supply their own
/// byte source.
pub struct VrmaLoader<F: Fetcher = FileFetcher> {
    fetcher: Arc<F>,
    manager: LoadingManagerHandle,
    config: LoaderConfig,
    binary_parser: Arc<dyn AnimationParser>,
    vrm_parser: Option<Arc<dyn AnimationParser>>,
}

impl<F: Fetcher> Clone for VrmaLoader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            manager: self.manager.clone(),
            config: self.config.clone(),
            binary_parser: Arc::clone(&self.binary_parser),
            vrm_parser: self.vrm_parser.clone(),
        }
    }
}

impl<F: Fetcher> std::fmt::Debug for VrmaLoader<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VrmaLoader")
            .field("config", &self.config)
            .field("manager", &self.manager)
            .field("binary_parser", &self.binary_parser)
            .field("vrm_parser", &self.vrm_parser)
            .finish()
    }
}

impl<F: Fetcher> VrmaLoader<F> {
    /// Create a loader with its own loading manager and default settings
    pub fn new(fetcher: F) -> Self {
        Self::with_manager(fetcher, LoadingManagerHandle::new())
    }

    /// Create a loader reporting to a shared loading manager
    pub fn with_manager(fetcher: F, manager: LoadingManagerHandle) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            manager,
            config: LoaderConfig::default(),
            binary_parser: Arc::new(GltfAnimationParser::new()),
            vrm_parser: default_vrm_parser(),
        }
    }

    /// Replace all settings
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Choose how fetched content is interpreted
    pub fn with_strategy(mut self, strategy: ContentStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Parser used for GLB content in `Sniff` mode
    pub fn with_binary_parser(mut self, parser: impl AnimationParser + 'static) -> Self {
        self.binary_parser = Arc::new(parser);
        self
    }

    /// Parser used in `VrmAnimation` mode
    pub fn with_vrm_parser(mut self, parser: impl AnimationParser + 'static) -> Self {
        self.vrm_parser = Some(Arc::new(parser));
        self
    }

    /// Prefix prepended to every requested URL
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.config.path = path.into();
        self
    }

    /// Add a header sent with every request
    pub fn set_request_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.config.request_headers.insert(name.into(), value.into());
        self
    }

    /// Whether requests carry credentials
    pub fn set_with_credentials(&mut self, with_credentials: bool) -> &mut Self {
        self.config.with_credentials = with_credentials;
        self
    }

    /// Current settings
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The byte source
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The loading manager this loader reports to
    pub fn manager(&self) -> &LoadingManagerHandle {
        &self.manager
    }

    /// The fetch request issued for a URL
    pub fn request(&self, url: &str) -> FetchRequest {
        let response_type = match self.config.strategy {
            ContentStrategy::Json => ResponseType::Text,
            ContentStrategy::Sniff | ContentStrategy::VrmAnimation => ResponseType::ArrayBuffer,
        };

        FetchRequest {
            url: self.manager.resolve_url(&self.config.resolve(url)),
            headers: self.config.request_headers.clone(),
            with_credentials: self.config.with_credentials,
            response_type,
        }
    }

    /// Parse content that has already been fetched
    ///
    /// No model is involved, so the result never carries a skeleton.
    pub async fn parse(&self, data: &[u8]) -> Result<LoadResult> {
        self.parse_content(data, None).await
    }

    /// Fetch and parse one URL, propagating any failure to the caller
    ///
    /// In `VrmAnimation` mode the skeleton of `model`, if any, is attached to
    /// the result. The loading manager sees the item start and end, and an
    /// item error on failure.
    pub async fn load_async(&self, url: &str, model: Option<&dyn SkeletonSource>) -> Result<LoadResult> {
        let skeleton = self.skeleton_for(model);
        self.load_with_skeleton(url, skeleton).await
    }

    /// Fetch and parse one URL in the background
    ///
    /// `on_load` receives the result. A failure goes to `on_error` when
    /// given, otherwise it is logged.
    pub fn load<S, L>(
        &self,
        spawner: &S,
        url: &str,
        model: Option<&dyn SkeletonSource>,
        on_load: L,
        on_error: Option<ErrorCallback>,
    ) -> JoinHandle
    where
        S: AsyncSpawner,
        L: FnOnce(LoadResult) + Send + 'static,
        F: 'static,
    {
        let loader = self.clone();
        let url = url.to_string();
        let skeleton = self.skeleton_for(model);

        spawner.spawn(async move {
            match loader.load_with_skeleton(&url, skeleton).await {
                Ok(result) => on_load(result),
                Err(err) => match on_error {
                    Some(on_error) => on_error(err),
                    None => log::error!("Failed to load {url}: {err}"),
                },
            }
        })
    }

    /// Fetch and parse one URL in the background, exposing progress
    /// through a handle
    pub fn load_tracked<S>(&self, spawner: &S, url: &str, model: Option<&dyn SkeletonSource>) -> AsyncClipHandle
    where
        S: AsyncSpawner,
        F: 'static,
    {
        let handle = AsyncClipHandle::new(url);
        let state = handle.state_arc();
        let loader = self.clone();
        let url = url.to_string();
        let skeleton = self.skeleton_for(model);

        spawner.spawn(async move {
            let next = match loader.load_with_skeleton(&url, skeleton).await {
                Ok(result) => LoadState::Completed(result),
                Err(err) => LoadState::Failed(err.to_string()),
            };
            *state.write() = next;
        });
        handle
    }

    fn skeleton_for(&self, model: Option<&dyn SkeletonSource>) -> Option<Arc<Skeleton>> {
        match self.config.strategy {
            ContentStrategy::VrmAnimation => model.and_then(|m| m.skeleton()),
            ContentStrategy::Json | ContentStrategy::Sniff => None,
        }
    }

    async fn load_with_skeleton(&self, url: &str, skeleton: Option<Arc<Skeleton>>) -> Result<LoadResult> {
        let request = self.request(url);
        self.manager.item_start(url);

        let result = match self.fetcher.fetch(&request).await {
            Ok(data) => self.parse_content(&data, skeleton).await,
            Err(err) => Err(err.into()),
        };

        if result.is_err() {
            self.manager.item_error(url);
        }
        self.manager.item_end(url);
        result
    }

    async fn parse_content(&self, data: &[u8], skeleton: Option<Arc<Skeleton>>) -> Result<LoadResult> {
        match self.config.strategy {
            ContentStrategy::Json => {
                let clip = parse_json_clip(&decode_text(data))?;
                Ok(LoadResult::from_clip(Some(clip)))
            }
            ContentStrategy::Sniff if is_binary_gltf(data) => {
                log::debug!("Content is binary glTF ({} bytes)", data.len());
                let clip = self.binary_parser.parse_animation(data).await?;
                Ok(LoadResult::from_clip(clip))
            }
            ContentStrategy::Sniff => {
                let clip = parse_json_clip(&decode_text(data))?;
                Ok(LoadResult::from_clip(Some(clip)))
            }
            ContentStrategy::VrmAnimation => {
                let parser = self.vrm_parser.as_ref().ok_or_else(|| {
                    LoaderError::UnsupportedFormat("VRM animation support is not enabled".to_string())
                })?;
                let clip = parser.parse_animation(data).await?;
                Ok(LoadResult { clip, skeleton })
            }
        }
    }
}

#[cfg(feature = "vrm-animation")]
fn default_vrm_parser() -> Option<Arc<dyn AnimationParser>> {
    Some(Arc::new(VrmAnimationParser::new()))
}

#[cfg(not(feature = "vrm-animation"))]
fn default_vrm_parser() -> Option<Arc<dyn AnimationParser>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use futures::executor::block_on;

    #[test]
    fn test_request_carries_settings() {
        let mut loader = VrmaLoader::new(MemoryFetcher::new());
        loader
            .set_path("anims/")
            .set_request_header("x-token", "abc")
            .set_with_credentials(true);
        loader.manager().set_url_modifier(|url| format!("https://cdn/{url}"));

        let request = loader.request("wave.vrma");
        assert_eq!(request.url, "https://cdn/anims/wave.vrma");
        assert_eq!(request.headers.get("x-token").map(String::as_str), Some("abc"));
        assert!(request.with_credentials);
        assert_eq!(request.response_type, ResponseType::ArrayBuffer);

        let json_loader = loader.clone().with_strategy(ContentStrategy::Json);
        assert_eq!(json_loader.request("wave.vrma").response_type, ResponseType::Text);
    }

    #[test]
    fn test_parse_sniffs_json() {
        let loader = VrmaLoader::new(MemoryFetcher::new());
        let result = block_on(loader.parse(br#"{"duration": 2.5, "tracks": []}"#)).unwrap();

        let clip = result.clip.expect("clip");
        assert_eq!(clip.duration, 2.5);
        assert!(result.skeleton.is_none());
    }

    #[test]
    fn test_json_strategy_never_sniffs() {
        let loader = VrmaLoader::new(MemoryFetcher::new()).with_strategy(ContentStrategy::Json);
        let err = block_on(loader.parse(b"glTF\x02\x00\x00\x00")).unwrap_err();
        assert!(matches!(err, LoaderError::Json(_)));
    }

    #[cfg(not(feature = "vrm-animation"))]
    #[test]
    fn test_vrm_strategy_without_parser_is_unsupported() {
        let loader = VrmaLoader::new(MemoryFetcher::new()).with_strategy(ContentStrategy::VrmAnimation);
        let err = block_on(loader.parse(b"glTF\x02\x00\x00\x00")).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    }

    #[derive(Debug)]
    struct CountingParser(Arc<std::sync::atomic::AtomicUsize>);

    #[async_trait::async_trait]
    impl AnimationParser for CountingParser {
        async fn parse_animation(&self, _data: &[u8]) -> Result<Option<AnimationClip>> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(None)
        }
    }

    #[test]
    fn test_magic_delegates_to_binary_parser() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let loader =
            VrmaLoader::new(MemoryFetcher::new()).with_binary_parser(CountingParser(Arc::clone(&calls)));

        // not valid JSON, so a JSON attempt would fail
        let result = block_on(loader.parse(b"glTF not json at all")).unwrap();

        assert!(result.clip.is_none());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
