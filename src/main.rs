use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, BufRead, Write};

use bouquet_editor::camera::Viewport;
use bouquet_editor::cli::Cli;
use bouquet_editor::commands::Command;
use bouquet_editor::config::BouquetConfig;
use bouquet_editor::frontend::{execute, status_line, Reply};
use bouquet_editor::loaders::GltfModelSource;
use bouquet_editor::session::BouquetSession;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = BouquetConfig::resolve(cli.config.as_deref())?;
    let viewport = Viewport::new(cli.sidebar_width, 0.0, cli.width, cli.height);
    let source = GltfModelSource::new(&cli.models_dir);
    let mut session = BouquetSession::new(config, source, viewport);
    info!("Bouquet editor ready with {} slots", session.counts().capacity);

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(io::BufReader::new(
            std::fs::File::open(path).with_context(|| format!("Failed to open script: {:?}", path))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let interactive = cli.script.is_none() && !cli.quiet;

    let mut stdout = io::stdout();
    if !cli.quiet {
        writeln!(stdout, "{}", status_line(&session.counts()))?;
    }
    if interactive {
        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            if interactive {
                write!(stdout, "> ")?;
                stdout.flush()?;
            }
            continue;
        }

        match trimmed.parse::<Command>() {
            Ok(command) => match execute(&mut session, &command) {
                Reply::Quit => break,
                Reply::Text(text) => {
                    writeln!(stdout, "{}", text)?;
                    if command.mutates_bouquet() && !cli.quiet {
                        writeln!(stdout, "{}", status_line(&session.counts()))?;
                    }
                }
            },
            Err(e) => writeln!(stdout, "error: {}", e)?,
        }

        if interactive {
            write!(stdout, "> ")?;
            stdout.flush()?;
        }
    }

    Ok(())
}
