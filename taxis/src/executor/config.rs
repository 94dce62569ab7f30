//! Executor configuration and lifecycle hooks

use super::error::{ExecutionError, Result};
use super::result::NodeResult;
use crate::graph::LeveledNode;
use std::fmt;
use std::sync::Arc;

/// Default number of work invocations allowed in flight within one level.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Scheduling policy for a run.
///
/// Plain data, so hosts can keep it in their own configuration files:
///
/// ```
/// use taxis::ExecutorConfig;
///
/// let config: ExecutorConfig = serde_json::from_str(r#"{ "concurrency": 8 }"#).unwrap();
/// assert_eq!(config.concurrency, 8);
/// assert!(config.fail_fast);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum simultaneously running work invocations within a single level.
    ///
    /// Levels themselves always run one after another.
    ///
    /// Default: 4
    pub concurrency: usize,

    /// Stop dispatching new work after the first failed item.
    ///
    /// Work already running is allowed to finish; later levels never start.
    ///
    /// Default: true
    pub fail_fast: bool,
}

impl ExecutorConfig {
    /// Four items at a time, stop on first failure.
    pub const DEFAULT: ExecutorConfig = ExecutorConfig {
        concurrency: DEFAULT_CONCURRENCY,
        fail_fast: true,
    };

    /// One item at a time, stop on first failure.
    pub const SEQUENTIAL: ExecutorConfig = ExecutorConfig {
        concurrency: 1,
        fail_fast: true,
    };

    /// Four items at a time, run everything regardless of failures.
    pub const KEEP_GOING: ExecutorConfig = ExecutorConfig {
        concurrency: DEFAULT_CONCURRENCY,
        fail_fast: false,
    };

    /// Sets the per-level concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the failure policy
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Checks that the configuration can make progress
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ExecutionError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Called just before work starts for a node.
pub type StartHook<D> = Arc<dyn Fn(&LeveledNode<D>) + Send + Sync>;

/// Called with each result as soon as it is produced.
pub type CompleteHook<D, O> = Arc<dyn Fn(&NodeResult<D, O>) + Send + Sync>;

/// Configuration plus lifecycle hooks for one or more runs.
///
/// Hooks are invoked synchronously from the executing task, in the order the
/// events happen.
pub struct ExecuteOptions<D = (), O = ()> {
    pub config: ExecutorConfig,
    pub on_node_start: Option<StartHook<D>>,
    pub on_node_complete: Option<CompleteHook<D, O>>,
}

impl<D, O> ExecuteOptions<D, O> {
    /// Creates options with the given configuration and no hooks
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            on_node_start: None,
            on_node_complete: None,
        }
    }

    /// Sets the per-level concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Sets the failure policy
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// Registers a hook called before each work invocation
    pub fn on_node_start(mut self, hook: impl Fn(&LeveledNode<D>) + Send + Sync + 'static) -> Self {
        self.on_node_start = Some(Arc::new(hook));
        self
    }

    /// Registers a hook called with each produced result
    pub fn on_node_complete(
        mut self,
        hook: impl Fn(&NodeResult<D, O>) + Send + Sync + 'static,
    ) -> Self {
        self.on_node_complete = Some(Arc::new(hook));
        self
    }
}

impl<D, O> Default for ExecuteOptions<D, O> {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl<D, O> Clone for ExecuteOptions<D, O> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            on_node_start: self.on_node_start.clone(),
            on_node_complete: self.on_node_complete.clone(),
        }
    }
}

impl<D, O> From<ExecutorConfig> for ExecuteOptions<D, O> {
    fn from(config: ExecutorConfig) -> Self {
        Self::new(config)
    }
}

impl<D, O> fmt::Debug for ExecuteOptions<D, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("config", &self.config)
            .field("on_node_start", &self.on_node_start.is_some())
            .field("on_node_complete", &self.on_node_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.concurrency, 4);
        assert!(config.fail_fast);
        assert_eq!(config, ExecutorConfig::DEFAULT);
    }

    #[test]
    fn test_builder() {
        let config = ExecutorConfig::SEQUENTIAL
            .with_concurrency(2)
            .with_fail_fast(false);
        assert_eq!(config.concurrency, 2);
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_zero_concurrency_is_invalid() {
        let err = ExecutorConfig::default()
            .with_concurrency(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidConfig(_)));
        assert!(ExecutorConfig::SEQUENTIAL.validate().is_ok());
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let config: ExecutorConfig = serde_json::from_str(r#"{ "fail_fast": false }"#).unwrap();
        assert_eq!(config, ExecutorConfig::KEEP_GOING);

        let json = serde_json::to_string(&ExecutorConfig::SEQUENTIAL).unwrap();
        assert_eq!(json, r#"{"concurrency":1,"fail_fast":true}"#);
    }

    #[test]
    fn test_options_debug_hides_hooks() {
        let options: ExecuteOptions = ExecuteOptions::default().on_node_start(|_| {});
        let debug = format!("{:?}", options);
        assert!(debug.contains("on_node_start: true"));
        assert!(debug.contains("on_node_complete: false"));
    }
}
