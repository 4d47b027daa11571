use anyhow::{Context, Result};
use esnextbin::cli::{Command, USAGE};
use esnextbin::prompt::PromptSurface;
use esnextbin::{build, Sketch, SketchGists};
use esnextbin_auth::{AuthorizationPort, Settings};
use gist_api::endpoints::GistId;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let (log_path, _guard) = esnextbin::logging::init_logging()?;
    tracing::info!("esnextbin starting, logging to {}", log_path.display());

    let settings = Settings::new().context("Failed to load configuration")?;
    if let Err(e) = settings.validate() {
        anyhow::bail!("Invalid configuration: {}", e);
    }

    let port = AuthorizationPort::new();
    let surface = Arc::new(PromptSurface::new(port.clone(), settings.app_origin()?));
    let gists = build(&settings, port, surface)?;

    run(&gists, command).await
}

async fn run(gists: &SketchGists, command: Command) -> Result<()> {
    match command {
        Command::Fetch { identity, dir } => {
            let sketch = gists.fetch(&identity).await?;
            sketch.save(&dir).await?;
            println!("Fetched {} into {}", identity, dir.display());
        }
        Command::Create { dir, visibility } => {
            let sketch = Sketch::load(&dir).await?;
            let saved = gists.create(&sketch, visibility).await?;
            report(gists, saved.gist.id.as_ref(), saved.is_fork);
        }
        Command::Update {
            id,
            dir,
            visibility,
        } => {
            let sketch = Sketch::load(&dir).await?;
            let saved = gists.update(&id, &sketch, visibility).await?;
            report(gists, saved.gist.id.as_ref(), saved.is_fork);
        }
        Command::Logout => {
            gists.revoke_credential();
            println!("Stored GitHub token removed");
        }
    }
    Ok(())
}

fn report(gists: &SketchGists, id: Option<&GistId>, is_fork: bool) {
    match id {
        Some(id) if is_fork => println!("Original gist is gone, saved as {}", gists.share_link(id)),
        Some(id) => println!("Saved {}", gists.share_link(id)),
        None => println!("Saved"),
    }
}
