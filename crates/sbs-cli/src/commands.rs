use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;

use sbs_core::{AssignmentContext, TransitionOutcome};
use sbs_model::{CategoryFilter, FilterCriteria, RowId};
use sbs_persistence::{AutoSaveConfig, AutoSaver};

use sbs_cli::export::{projection_frame, write_csv};
use sbs_cli::review::Review;
use sbs_cli::session::Session;
use sbs_cli::settings::Settings;
use sbs_cli::summary::{
    NO_CHANNEL_MESSAGE, describe_outcome, mapping_table, print_projection, stats_line,
};
use sbs_cli::urls::{BrowserOpener, PrintOpener, UrlOpener, run_url_job, url_progress_bar};

use crate::cli::{
    ConfigArgs, ExportArgs, FilterArgs, OpenUrlsArgs, ReviewArgs, RowArgs, SetArgs, ShowArgs,
    TableArgs, ViewArgs,
};

/// Layers the command-line filter flags over `base`.
pub fn criteria_from(filters: &FilterArgs, base: FilterCriteria) -> FilterCriteria {
    let mut criteria = base;
    if let Some(category) = &filters.category {
        criteria = criteria.with_category(CategoryFilter::parse(category));
    }
    if filters.single_category {
        criteria = criteria.with_single_category_only(true);
    }
    if let Some(search) = &filters.search {
        criteria = criteria.with_search(search.clone());
    }
    if !filters.status.is_empty() {
        criteria = criteria.with_statuses(filters.status.iter().copied());
    }
    if filters.no_channels {
        criteria = criteria.with_channels(Vec::<String>::new());
    } else if !filters.channel.is_empty() {
        criteria = criteria.with_channels(filters.channel.iter().cloned());
    }
    criteria
}

/// Opens the table and applies the filter flags to the chosen view.
fn open_view(args: &ViewArgs, settings: &Settings) -> Result<(Session, String)> {
    let mut session = Session::open(&args.table.table, args.table.state.as_deref(), settings)?;
    let view = session.view_name(args.view.as_deref())?;
    let criteria = criteria_from(&args.filters, session.criteria(&view)?);
    session.apply_criteria(&view, criteria)?;
    Ok((session, view))
}

pub fn run_mapping(args: &TableArgs, settings: &Settings) -> Result<()> {
    let session = Session::open(&args.table, args.state.as_deref(), settings)?;
    let board = session.board();
    println!("Table: {}", session.source().display());
    println!(
        "Rows: {}  Columns: {}",
        board.table().len(),
        board.table().columns.len()
    );
    println!("{}", mapping_table(session.report(), &board.table().columns));
    let duplicated = board.contacts().duplicate_groups().count();
    if duplicated > 0 {
        println!("{duplicated} contacts appear on more than one row");
    }
    let tabs: Vec<&str> = board.views().names().into_iter().skip(1).collect();
    if !tabs.is_empty() {
        println!("Category tabs: {}", tabs.join(", "));
    }
    Ok(())
}

pub fn run_show(args: &ShowArgs, settings: &Settings) -> Result<()> {
    let (session, view) = open_view(&args.view, settings)?;
    let projection = session.board().projection(&view)?;
    if projection.is_guard() {
        println!("{NO_CHANNEL_MESSAGE}");
        return Ok(());
    }
    let columns = session.display_columns(&settings.display.columns);
    let rows = session.row_views(projection.rows(), &columns);
    print_projection(&session.column_names(&columns), &rows, args.limit);
    println!("{}", stats_line(&session.board().statistics(&view)?));
    Ok(())
}

pub fn run_stats(args: &ViewArgs, settings: &Settings) -> Result<()> {
    let (session, view) = open_view(args, settings)?;
    if session.board().projection(&view)?.is_guard() {
        println!("{NO_CHANNEL_MESSAGE}");
        return Ok(());
    }
    println!("{}", stats_line(&session.board().statistics(&view)?));
    Ok(())
}

pub fn run_set(args: &SetArgs, settings: &Settings) -> Result<()> {
    apply_and_save(&args.row, settings, |session, row, ctx| {
        session.board_mut().set_status(row, args.status, ctx)
    })
}

pub fn run_toggle(args: &RowArgs, settings: &Settings) -> Result<()> {
    apply_and_save(args, settings, |session, row, ctx| {
        session.board_mut().toggle(row, ctx)
    })
}

fn apply_and_save<F>(args: &RowArgs, settings: &Settings, transition: F) -> Result<()>
where
    F: FnOnce(&mut Session, RowId, &AssignmentContext) -> Option<TransitionOutcome>,
{
    if args.table.state.is_none() {
        bail!("set and toggle need a snapshot file to save into (use --state FILE)");
    }
    let mut session = Session::open(&args.table.table, args.table.state.as_deref(), settings)?;
    let view = session.view_name(args.view.as_deref())?;
    let row = RowId(args.row);
    if !session.board().table().contains(row) {
        bail!(
            "row {row} is not in the table ({} rows)",
            session.board().table().len()
        );
    }

    let mut ctx = session.board().assignment_context(&view)?;
    if let Some(category) = &args.category {
        ctx.product = Some(category.clone());
    }
    if let Some(channel) = &args.channel {
        ctx.channel = Some(channel.clone());
    }

    let outcome = transition(&mut session, row, &ctx);
    println!("{}", describe_outcome(row, outcome.as_ref()));
    if outcome.is_none() {
        return Ok(());
    }
    let path = session.save()?;
    println!("Saved: {}", path.display());
    Ok(())
}

pub fn run_export(args: &ExportArgs, settings: &Settings) -> Result<()> {
    let (session, view) = open_view(&args.view, settings)?;
    let projection = session.board().projection(&view)?;
    if projection.is_guard() {
        bail!("{NO_CHANNEL_MESSAGE}");
    }
    let columns = session.display_columns(&settings.display.columns);
    let rows = session.row_views(projection.rows(), &columns);
    let mut frame = projection_frame(&session.column_names(&columns), &rows)?;
    write_csv(&mut frame, &args.out)?;
    println!("Exported {} rows to {}", rows.len(), args.out.display());
    Ok(())
}

pub fn run_open_urls(args: &OpenUrlsArgs, settings: &Settings) -> Result<()> {
    let (session, view) = open_view(&args.view, settings)?;
    if session.board().projection(&view)?.is_guard() {
        println!("{NO_CHANNEL_MESSAGE}");
        return Ok(());
    }
    let batch_size = args.batch_size.unwrap_or(settings.urls.batch_size);
    let delay = Duration::from_millis(args.delay_ms.unwrap_or(settings.urls.delay_ms));
    let board = session.board();
    let mut job = board.url_job(&view, args.only_status, batch_size, delay)?;
    if job.total() == 0 {
        println!("No URLs to open");
        return Ok(());
    }

    let (mut opener, progress): (Box<dyn UrlOpener>, ProgressBar) = if args.dry_run {
        (Box::new(PrintOpener), ProgressBar::hidden())
    } else {
        (Box::new(BrowserOpener), url_progress_bar(job.total()))
    };
    let report = run_url_job(
        &mut job,
        || board.generation(),
        opener.as_mut(),
        &progress,
        std::thread::sleep,
    );
    println!(
        "Opened {} URLs in {} batches{}",
        report.opened,
        report.batches,
        if report.failed > 0 {
            format!(", {} failed", report.failed)
        } else {
            String::new()
        }
    );
    Ok(())
}

pub fn run_review(args: &ReviewArgs, settings: &Settings) -> Result<()> {
    let mut session = Session::open(&args.table.table, args.table.state.as_deref(), settings)?;
    let view = session.view_name(args.view.as_deref())?;
    let columns = session.display_columns(&settings.display.columns);
    let config = if args.no_autosave {
        AutoSaveConfig::disabled()
    } else {
        settings.autosave.clone()
    };

    let stdout = io::stdout();
    let review = Review::new(&mut session, view, columns, AutoSaver::new(config), stdout.lock());
    let report = review.run(io::stdin().lock())?;
    eprintln!(
        "{} commands, {} changes, {} errors",
        report.commands, report.changes, report.errors
    );
    if session.board().is_dirty() {
        eprintln!("warning: unsaved changes were discarded");
    }
    Ok(())
}

pub fn run_config(args: &ConfigArgs, config: Option<&Path>, settings: &Settings) -> Result<()> {
    let path = config.map_or_else(Settings::config_path, Path::to_path_buf);
    if args.init {
        if path.exists() {
            println!("Settings file already exists: {}", path.display());
        } else {
            Settings::default()
                .save_to(&path)
                .with_context(|| format!("failed to initialize {}", path.display()))?;
            println!("Wrote default settings to {}", path.display());
            return Ok(());
        }
    }
    println!("# {}", path.display());
    print!("{}", settings.to_toml()?);
    Ok(())
}
