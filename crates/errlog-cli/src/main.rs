//! errlog - Export an ELMAH error log into local XML files
//!
//! Reads the log's CSV index, locates each error's XML document and
//! writes it verbatim as `error-<url>.xml`.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use errlog_core::{HttpFetcher, ProgressContext, fmt_num};
use errlog_elmah::{ElmahXmlDecoder, EntryReport, download_location};

mod args;
mod config;

use args::{index_url, parse_args};
use config::Config;

fn main() -> Result<()> {
    let cli = match parse_args(std::env::args_os())? {
        Ok(cli) => cli,
        Err(help) => help.exit(),
    };
    let home = index_url(&cli.index)?;

    // Progress context (TTY auto-detect)
    let progress = ProgressContext::new();

    // Logging:
    //   TTY:     quiet (warn) unless --debug, the status line shows activity
    //   non-TTY: info unless --debug
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    errlog_core::init_logging(quiet, cli.debug, multi)?;

    let config = Config::load(cli.config.as_deref())?;

    let run_config = errlog_elmah::Config {
        output_dir: cli
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output.default_dir.clone()),
        silent: cli.silent,
        max_entries: cli.limit,
        ..errlog_elmah::Config::new(download_location(&home))
    };

    let fetcher = HttpFetcher::new(&config.http.to_http_config(cli.timeout))
        .context("Failed to build HTTP client")?;

    let summary = errlog_elmah::run(
        &run_config,
        &fetcher,
        &ElmahXmlDecoder,
        &progress,
        |report: &EntryReport<'_>| {
            progress.println(format!(
                "{}\nError {} of {}: {}\n{}\n",
                report.url,
                fmt_num(report.index),
                fmt_num(report.total),
                report.kind,
                report.message
            ));
        },
    )?;

    if !run_config.silent {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Summary").fg(Color::Cyan),
                Cell::new("Value").fg(Color::Cyan),
            ]);
        table.add_row(vec!["Index", run_config.index_url.as_str()]);
        table.add_row(vec![
            "Output directory",
            &run_config.output_dir.display().to_string(),
        ]);
        table.add_row(vec![
            "Exported",
            &format!("{} of {}", fmt_num(summary.exported), fmt_num(summary.total)),
        ]);
        table.add_row(vec![
            "Elapsed",
            &format!("{:.1}s", summary.elapsed.as_secs_f64()),
        ]);
        eprintln!("\n{table}");
    }

    Ok(())
}
