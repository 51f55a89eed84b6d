use anyhow::Result;
use clap::Parser;
use speechseal::cli::Cli;
use speechseal::config::Config;
use speechseal::pipeline::Pipeline;
use speechseal::pipeline::sink::StdoutDisplay;
use std::io::BufRead;
use std::time::Duration;

/// Pipe-mode harness: each stdin line is one partial hypothesis revision, a
/// blank line is a sentence boundary. Confirmed-window fingerprints land on
/// stdout.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;
    if cli.verbose >= 1 {
        eprintln!(
            "speechseal: audio format {} Hz, {} channel(s), {}-bit",
            config.audio.sample_rate, config.audio.channels, config.audio.bits_per_sample
        );
    }

    let mut pipeline = Pipeline::new(StdoutDisplay::new());
    pipeline.start();
    let words = pipeline.input();

    if !cli.quiet {
        eprintln!(
            "speechseal {}: reading partial hypotheses from stdin (blank line = end of sentence)",
            speechseal::version_string()
        );
    }

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if cli.verbose >= 2 {
            eprintln!("speechseal: partial: {:?}", line);
        }

        if line.trim().is_empty() {
            words.signal_end_of_sentence();
        } else {
            words.put_text(&line);
        }
    }

    // stdin is done; let queued events flow through before parking the stages.
    if !pipeline.drain(Duration::from_secs(2)) && !cli.quiet {
        eprintln!("speechseal: pipeline did not drain fully before shutdown");
    }
    pipeline.stop();

    Ok(())
}
