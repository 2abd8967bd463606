use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mailmorph_client::{validate_base_url, Backend, ClientConfig, ReqwestClient, RequestSettings};
use mailmorph_core::{update, AppState, AppViewModel, Msg, Notice, ViewKind};
use mailmorph_logging::{mm_debug, mm_info, mm_warn};

use super::cli::{Cli, Command};
use super::effects::EffectRunner;
use super::{logging, ui};

const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::initialize(cli.log, cli.verbose);

    match dotenvy::dotenv() {
        Ok(path) => mm_info!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => mm_warn!("Ignoring .env file: {}", err),
    }

    if let Some(url) = cli.base_url.as_deref() {
        validate_base_url("--base-url", url)?;
    }
    let config = ClientConfig::from_env()
        .context("reading client configuration")?
        .with_contract(cli.contract())
        .with_transport(cli.transport());
    mm_info!(
        "Backend base URL: {}",
        config.resolve_base_url(cli.base_url.as_deref())
    );
    let client = Arc::new(ReqwestClient::new(config)?);

    match &cli.command {
        Command::Health => check_health(&client, cli.base_url.as_deref()),
        Command::Extract { text, .. } => {
            let text = match text {
                Some(text) => text.clone(),
                None => read_stdin()?,
            };
            run_view(&cli, client, ViewKind::Extract, Some(text))
        }
        Command::Metrics => run_view(&cli, client, ViewKind::Metrics, None),
        Command::Logs => run_view(&cli, client, ViewKind::Logs, None),
    }
}

fn check_health(client: &ReqwestClient, base_url: Option<&str>) -> anyhow::Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let status = runtime.block_on(client.health(base_url))?;
    println!("{}", status.status);
    Ok(if status.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("reading email text from stdin")?;
    Ok(text)
}

/// Mounts one view, waits for its request to settle, then unmounts it.
fn run_view(
    cli: &Cli,
    backend: Arc<dyn Backend>,
    kind: ViewKind,
    input: Option<String>,
) -> anyhow::Result<ExitCode> {
    let settings = RequestSettings {
        base_url: cli.base_url.clone(),
        max_words: cli.max_words(),
    };
    let runner = EffectRunner::new(backend, settings).context("starting request engine")?;
    let mut session = Session {
        state: AppState::new(),
        runner,
        kind,
        out: io::stdout(),
        last_screen: String::new(),
    };

    session.dispatch(Msg::ViewMounted(kind))?;
    if let Some(text) = input {
        session.dispatch(Msg::InputChanged(text))?;
        session.dispatch(Msg::ExtractSubmitted)?;
    }

    while session.is_loading() {
        let msg = session.runner.next_msg(POLL_INTERVAL).unwrap_or(Msg::Tick);
        session.dispatch(msg)?;
    }

    let code = session.exit_code();
    session.dispatch(Msg::ViewUnmounted(kind))?;
    Ok(code)
}

struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    kind: ViewKind,
    out: W,
    last_screen: String,
}

impl<W: Write> Session<W> {
    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        mm_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.draw(&state.view())?;
        }
        self.state = state;
        self.runner.enqueue(effects);
        Ok(())
    }

    fn draw(&mut self, view: &AppViewModel) -> io::Result<()> {
        let screen = ui::render::render(self.kind, view);
        if screen.is_empty() || screen == self.last_screen {
            return Ok(());
        }
        writeln!(self.out, "{screen}")?;
        self.out.flush()?;
        self.last_screen = screen;
        Ok(())
    }

    fn is_loading(&self) -> bool {
        match self.kind {
            ViewKind::Extract => self.state.extraction().is_pending(),
            ViewKind::Metrics => self.state.metrics().is_pending(),
            ViewKind::Logs => self.state.logs().is_pending(),
        }
    }

    fn exit_code(&self) -> ExitCode {
        let view = self.state.view();
        let failed = match self.kind {
            ViewKind::Extract => {
                view.extraction.error.is_some()
                    || matches!(view.notice, Some(Notice::EmptyInput))
            }
            ViewKind::Metrics => view.metrics.error.is_some(),
            ViewKind::Logs => view.logs.error.is_some(),
        };
        if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}
