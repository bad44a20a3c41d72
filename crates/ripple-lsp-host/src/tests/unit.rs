//! Unit tests for handshake edge cases.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use mockall::mock;
use ripple_config::{ConfigError, EnvironmentSnapshot};
use rstest::{fixture, rstest};
use serde_json::json;

use crate::errors::{CompositionError, InitializeError, LoadTarget, SessionState};
use crate::extension::{
    ExtensionModules, ExtensionRoot, RippleLanguageExtension, TypeScriptExtension,
};
use crate::module::ModuleHandle;
use crate::plugin::ServicePlugin;
use crate::sdk::TypeScriptSdk;
use crate::session::Session;
use crate::test_support::{InMemoryModuleLoader, RecordingReporter};
use crate::tests::support::{
    EXT_ROOT, StaticExtensions, environment, full_options, initialize_params, installation,
    shared, uri,
};

mock! {
    pub TypeScriptFactory {}

    impl TypeScriptExtension for TypeScriptFactory {
        fn typescript_plugins(
            &self,
            sdk: &TypeScriptSdk,
        ) -> Result<Vec<ServicePlugin>, CompositionError>;
    }
}

struct Harness {
    loader: InMemoryModuleLoader,
    reporter: RecordingReporter,
}

impl Harness {
    fn session(&self, env: EnvironmentSnapshot) -> Session {
        Session::new(
            shared(&self.loader),
            Arc::new(ExtensionRoot::new(Some(Utf8PathBuf::from(EXT_ROOT)))),
            Arc::new(self.reporter.clone()),
            env,
        )
    }

    fn session_with_factory(&self, factory: MockTypeScriptFactory) -> Session {
        let modules = ExtensionModules::new(
            Arc::new(RippleLanguageExtension::new(ModuleHandle::new("/ext/language.js"))),
            Arc::new(factory),
        );
        Session::new(
            shared(&self.loader),
            Arc::new(StaticExtensions(modules)),
            Arc::new(self.reporter.clone()),
            EnvironmentSnapshot::default(),
        )
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        loader: installation(),
        reporter: RecordingReporter::default(),
    }
}

#[rstest]
fn environment_fills_missing_options(harness: Harness) {
    let mut session = harness.session(environment(&[
        ("RIPPLE_COMPILER_PATH", "/opt/ripple"),
        ("TSDK_PATH", "/opt/ts"),
    ]));

    session
        .initialize(&initialize_params(None, None, false))
        .expect("environment paths should suffice");

    let server = session.server().expect("composed server");
    assert_eq!(server.handles().ripple.path(), Utf8Path::new("/opt/ripple"));
    assert_eq!(server.handles().typescript.root(), Utf8Path::new("/opt/ts"));
}

#[rstest]
fn options_win_over_environment(harness: Harness) {
    let mut session = harness.session(environment(&[
        ("RIPPLE_COMPILER_PATH", "/env/ripple"),
        ("TSDK_PATH", "/env/ts"),
    ]));

    session
        .initialize(&initialize_params(Some(full_options()), None, false))
        .expect("options should resolve");

    let lookups = harness.loader.lookups();
    assert!(lookups.contains(&Utf8PathBuf::from("/opt/ripple")));
    assert!(!lookups.iter().any(|path| path.starts_with("/env")));
}

#[rstest]
fn missing_sdk_names_the_nested_field(harness: Harness) {
    let mut session = harness.session(EnvironmentSnapshot::default());

    let error = session
        .initialize(&initialize_params(
            Some(json!({ "ripplePath": "/opt/ripple" })),
            None,
            false,
        ))
        .expect_err("tsdk is required");

    assert_eq!(
        error.to_string(),
        "initializationOptions.typescript.tsdk is required"
    );
    assert!(harness.loader.lookups().is_empty());
}

#[rstest]
fn malformed_options_are_rejected(harness: Harness) {
    let mut session = harness.session(EnvironmentSnapshot::default());

    let error = session
        .initialize(&initialize_params(Some(json!(["/opt/ripple"])), None, false))
        .expect_err("an array is not an options object");

    assert!(matches!(
        error,
        InitializeError::Configuration(ConfigError::InvalidOptions { .. })
    ));
    assert_eq!(session.state(), SessionState::Failed);
}

#[rstest]
fn missing_compiler_module_is_a_load_error(mut harness: Harness) {
    harness.loader = InMemoryModuleLoader::default().with_module("/opt/ts/typescript.js");
    let mut session = harness.session(EnvironmentSnapshot::default());

    let error = session
        .initialize(&initialize_params(Some(full_options()), None, false))
        .expect_err("compiler is missing");

    assert!(matches!(
        error,
        InitializeError::Load {
            target: LoadTarget::RippleCompiler,
            ..
        }
    ));
    assert!(session.server().is_none());
    let reports = harness.reporter.reports();
    let (context, message) = reports.first().expect("failure reported");
    assert_eq!(context, "Failed during onInitialize");
    assert!(message.contains("/opt/ripple"), "unexpected message: {message}");
}

#[rstest]
fn outdated_sdk_is_incompatible(mut harness: Harness) {
    harness.loader = installation().with_json(
        "/opt/package.json",
        json!({ "name": "typescript", "version": "3.9.7" }),
    );
    let mut session = harness.session(EnvironmentSnapshot::default());

    let error = session
        .initialize(&initialize_params(Some(full_options()), None, false))
        .expect_err("TypeScript 3 is too old");

    assert!(
        error.to_string().contains("TypeScript 3.9.7 is not supported"),
        "unexpected message: {error}"
    );
}

#[rstest]
fn unknown_extension_root_fails_clearly(harness: Harness) {
    let mut session = Session::new(
        shared(&harness.loader),
        Arc::new(ExtensionRoot::new(None)),
        Arc::new(harness.reporter.clone()),
        EnvironmentSnapshot::default(),
    );

    let error = session
        .initialize(&initialize_params(Some(full_options()), None, false))
        .expect_err("extension root is unknown");

    assert!(matches!(
        error,
        InitializeError::Configuration(ConfigError::MissingExtensionRoot)
    ));
    assert_eq!(session.state(), SessionState::Failed);
}

#[rstest]
fn factory_failure_exposes_no_plugins(harness: Harness) {
    let mut factory = MockTypeScriptFactory::new();
    factory
        .expect_typescript_plugins()
        .times(1)
        .returning(|_| Err(CompositionError::factory("ts.js", "unsupported SDK")));
    let mut session = harness.session_with_factory(factory);

    let error = session
        .initialize(&initialize_params(Some(full_options()), None, false))
        .expect_err("factory fails");

    assert!(matches!(error, InitializeError::Composition { .. }));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(session.server().is_none());
}

#[rstest]
fn duplicate_diagnostics_plugin_is_rejected(harness: Harness) {
    let mut factory = MockTypeScriptFactory::new();
    factory
        .expect_typescript_plugins()
        .returning(|_| Ok(vec![ServicePlugin::new("ripple-diagnostics")]));
    let mut session = harness.session_with_factory(factory);

    let error = session
        .initialize(&initialize_params(Some(full_options()), None, false))
        .expect_err("duplicate plugin");

    assert!(
        error.to_string().contains("'ripple-diagnostics'"),
        "unexpected message: {error}"
    );
}

#[rstest]
fn second_initialize_leaves_the_session_ready(harness: Harness) {
    let mut session = harness.session(EnvironmentSnapshot::default());
    let params = initialize_params(Some(full_options()), None, false);
    session.initialize(&params).expect("first initialize");

    let error = session.initialize(&params).expect_err("second initialize");

    assert!(matches!(
        error,
        InitializeError::AlreadyInitialized {
            state: SessionState::Ready
        }
    ));
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.server().is_some());
}

#[rstest]
fn initialized_requires_a_ready_session(harness: Harness) {
    let mut session = harness.session(EnvironmentSnapshot::default());

    let error = session.initialized().expect_err("not initialized yet");

    assert!(matches!(
        error,
        InitializeError::NotReady {
            state: SessionState::Uninitialized
        }
    ));
}

#[rstest]
fn static_clients_get_no_watch_registration(harness: Harness) {
    let mut session = harness.session(EnvironmentSnapshot::default());
    session
        .initialize(&initialize_params(Some(full_options()), None, false))
        .expect("initialize");

    let registration = session.initialized().expect("initialized");

    assert!(registration.is_none());
}

#[rstest]
fn unknown_locale_falls_back_to_builtin_messages(harness: Harness) {
    let mut session = harness.session(EnvironmentSnapshot::default());

    session
        .initialize(&initialize_params(Some(full_options()), Some("de-AT"), false))
        .expect("missing tables never fail initialization");

    let server = session.server().expect("composed server");
    assert!(server.handles().diagnostic_messages.is_builtin());
}

#[rstest]
fn opened_documents_resolve_their_project(harness: Harness) {
    let mut session = harness.session(EnvironmentSnapshot::default());
    session
        .initialize(&initialize_params(Some(full_options()), None, false))
        .expect("initialize");

    let project = session
        .open_document(&uri("file:///work/src/App.ripple"))
        .expect("ready")
        .expect("file document");

    assert_eq!(project.root(), Utf8Path::new("/work"));
    let server = session.server().expect("composed server");
    assert_eq!(server.project_service().project_count(), 1);
    assert!(
        session
            .open_document(&uri("untitled:Untitled-1"))
            .expect("ready")
            .is_none()
    );
}
