use std::collections::BTreeMap;

use anyhow::bail;

use crate::cli::PurgeTunnelCli;
use crate::context::RunnerContext;
use crate::types::PurgeTunnelResult;

pub type HookResult = anyhow::Result<()>;

pub type TestHook<M, W> = fn(&mut RunnerContext<M, W>) -> HookResult;
pub type BackendHook<M, W> = fn(&PurgeTunnelCli) -> PurgeTunnelResult<(M, W)>;

/// The builder for a scenario definition.
///
/// This must be used at the start of a scenario to define the tests that you want to run.
pub struct ScenarioDefinitionBuilder<M, W> {
    /// The name of the scenario, which should be unique within the test suite.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// This value is initialised for you when using [ScenarioDefinitionBuilder::new_with_init].
    #[doc(hidden)]
    cli: PurgeTunnelCli,
    /// Connects the MDS and workload collaborators from the command line options. Run once, before
    /// any test starts.
    backend_fn: Option<BackendHook<M, W>>,
    /// The named tests for this scenario. All of them run unless the command line selects some.
    tests: BTreeMap<String, TestHook<M, W>>,
}

pub struct ScenarioDefinition<M, W> {
    pub name: String,
    pub cli: PurgeTunnelCli,
    pub backend_fn: BackendHook<M, W>,
    pub tests: Vec<(String, TestHook<M, W>)>,
}

impl<M, W> ScenarioDefinitionBuilder<M, W> {
    /// Initialise a new scenario definition from the scenario name and command line arguments.
    /// This also initialises logging.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, crate::init::init())
    }

    /// Initialise a new scenario definition from an already parsed command line.
    pub fn new(name: &str, cli: PurgeTunnelCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            backend_fn: None,
            tests: BTreeMap::new(),
        }
    }

    /// Set how the MDS and workload collaborators are created.
    pub fn use_backend(mut self, backend_fn: BackendHook<M, W>) -> Self {
        self.backend_fn = Some(backend_fn);
        self
    }

    /// Register a named test.
    pub fn use_named_test(mut self, name: &str, test: TestHook<M, W>) -> Self {
        let previous = self.tests.insert(name.to_string(), test);

        if previous.is_some() {
            panic!("Test [{}] is already defined", name);
        }

        self
    }

    pub(crate) fn build(self) -> PurgeTunnelResult<ScenarioDefinition<M, W>> {
        let Some(backend_fn) = self.backend_fn else {
            bail!("No backend configured for scenario [{}]", self.name);
        };

        if self.tests.is_empty() {
            bail!("No tests defined for scenario [{}]", self.name);
        }

        let tests = if self.cli.test.is_empty() {
            self.tests.into_iter().collect()
        } else {
            let mut selected = Vec::with_capacity(self.cli.test.len());
            for name in &self.cli.test {
                match self.tests.get(name) {
                    Some(test) => selected.push((name.clone(), *test)),
                    None => bail!(
                        "Test [{}] is not defined, available tests are: {}",
                        name,
                        self.tests.keys().cloned().collect::<Vec<_>>().join(", ")
                    ),
                }
            }
            selected
        };

        Ok(ScenarioDefinition {
            name: self.name,
            cli: self.cli,
            backend_fn,
            tests,
        })
    }
}
