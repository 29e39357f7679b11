use casement_core::{CasementConfig, HeadlessBackend, QuitSignal};
use casement_script::{register_namespace, Console, ScriptContext, SharedRegistry};
use std::io;
use std::sync::Arc;

const CONFIG_ENV: &str = "CASEMENT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "casement.toml";

fn main() -> anyhow::Result<()> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = CasementConfig::load_or_default(&path)?;

    casement_modules_logging::init(&cfg.log);
    log::info!(target: "casement", "boot config='{}'", path);

    let quit = QuitSignal::new();
    if cfg.console.trap_ctrlc {
        quit.install_ctrlc()?;
    }

    let backend = Arc::new(HeadlessBackend::with_limit(cfg.wm.max_windows));
    let registry = SharedRegistry::default();

    let ctx = ScriptContext::new();
    ctx.register_quit(quit.clone())?;
    register_namespace(&ctx, backend, registry)?;

    let mut console = Console::new(ctx, cfg.console, quit);
    let reason = console.run(io::stdin().lock(), io::stdout().lock())?;

    log::info!(target: "casement", "shutdown reason={:?}", reason);
    Ok(())
}
