//! Line-driven review session.
//!
//! Reads one command per line, applies it to the board and gives the
//! auto-saver a chance to run after every change. Built for stdin, but any
//! reader works, which is how the tests drive it.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, bail};

use sbs_core::TransitionOutcome;
use sbs_model::{CategoryFilter, FilterCriteria, RowId, RowStatus};
use sbs_persistence::AutoSaver;

use crate::session::Session;
use crate::summary::{NO_CHANNEL_MESSAGE, describe_outcome, projection_table, stats_line};

const HELP: &str = "\
commands:
  set ROW STATUS            request a status (undecided, selected, waiting, excluded)
  toggle ROW                cycle a row's status
  assign ROW PRODUCT[|CH]   re-tag a selected row, '-' clears a tag
  category NAME|all         filter by category
  channels A,B|all|none     enabled channels
  search TEXT               free-text search, empty clears
  status A,B|all            enabled statuses
  show [N]                  print the projection
  stats                     print the status line
  save                      write the snapshot file
  quit                      leave (unsaved changes are auto-saved)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    Set { row: RowId, status: RowStatus },
    Toggle(RowId),
    Assign {
        row: RowId,
        product: Option<String>,
        channel: Option<String>,
    },
    Category(CategoryFilter),
    Channels(ChannelChoice),
    Search(String),
    Statuses(Vec<RowStatus>),
    Show(Option<usize>),
    Stats,
    Save,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelChoice {
    All,
    Only(Vec<String>),
}

impl FromStr for ReviewCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));
        match verb.to_lowercase().as_str() {
            "set" => {
                let mut parts = rest.split_whitespace();
                let row = parse_row(parts.next())?;
                let status = parts
                    .next()
                    .ok_or("usage: set ROW STATUS")?
                    .parse::<RowStatus>()
                    .map_err(|error| error.to_string())?;
                Ok(ReviewCommand::Set { row, status })
            }
            "toggle" => Ok(ReviewCommand::Toggle(parse_row(Some(rest))?)),
            "assign" => {
                let (row, tags) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("usage: assign ROW PRODUCT[|CHANNEL]")?;
                let (product, channel) = tags.split_once('|').unwrap_or((tags, "-"));
                Ok(ReviewCommand::Assign {
                    row: parse_row(Some(row))?,
                    product: tag(product),
                    channel: tag(channel),
                })
            }
            "category" => Ok(ReviewCommand::Category(CategoryFilter::parse(rest))),
            "channels" => Ok(ReviewCommand::Channels(match rest.to_lowercase().as_str() {
                "all" => ChannelChoice::All,
                "none" | "" => ChannelChoice::Only(Vec::new()),
                _ => ChannelChoice::Only(split_list(rest).map(str::to_string).collect()),
            })),
            "search" => Ok(ReviewCommand::Search(rest.to_string())),
            "status" => {
                if rest.is_empty() || rest.eq_ignore_ascii_case("all") {
                    return Ok(ReviewCommand::Statuses(RowStatus::ALL.to_vec()));
                }
                split_list(rest)
                    .map(|value| value.parse::<RowStatus>().map_err(|e| e.to_string()))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ReviewCommand::Statuses)
            }
            "show" => {
                if rest.is_empty() {
                    return Ok(ReviewCommand::Show(None));
                }
                rest.parse::<usize>()
                    .map(|limit| ReviewCommand::Show(Some(limit)))
                    .map_err(|_| format!("not a row count: {rest}"))
            }
            "stats" => Ok(ReviewCommand::Stats),
            "save" => Ok(ReviewCommand::Save),
            "help" | "?" => Ok(ReviewCommand::Help),
            "quit" | "exit" => Ok(ReviewCommand::Quit),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}

fn parse_row(value: Option<&str>) -> Result<RowId, String> {
    let value = value.map(str::trim).unwrap_or_default();
    value
        .parse::<RowId>()
        .map_err(|_| format!("not a row number: '{value}'"))
}

fn tag(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty() && value != "-").then(|| value.to_string())
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// What a review session did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewReport {
    pub commands: usize,
    pub changes: usize,
    pub errors: usize,
    pub saved: Vec<PathBuf>,
    pub autosaved: Vec<PathBuf>,
}

pub struct Review<'a, W: Write> {
    session: &'a mut Session,
    view: String,
    columns: Vec<usize>,
    autosaver: AutoSaver,
    out: W,
    report: ReviewReport,
}

impl<'a, W: Write> Review<'a, W> {
    pub fn new(
        session: &'a mut Session,
        view: String,
        columns: Vec<usize>,
        autosaver: AutoSaver,
        out: W,
    ) -> Self {
        Self {
            session,
            view,
            columns,
            autosaver,
            out,
            report: ReviewReport::default(),
        }
    }

    /// Runs until `quit` or end of input, then flushes unsaved changes.
    pub fn run<R: BufRead>(mut self, input: R) -> Result<ReviewReport> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            self.report.commands += 1;
            let command = match line.parse::<ReviewCommand>() {
                Ok(command) => command,
                Err(message) => {
                    self.report.errors += 1;
                    writeln!(self.out, "error: {message}")?;
                    continue;
                }
            };
            if command == ReviewCommand::Quit {
                break;
            }
            if let Err(error) = self.apply(command) {
                self.report.errors += 1;
                writeln!(self.out, "error: {error:#}")?;
            }
            self.tick();
        }

        let source = self.session.source().to_path_buf();
        if let Some(path) = self
            .autosaver
            .flush(self.session.board_mut(), Some(&source))
        {
            writeln!(self.out, "unsaved changes written to {}", path.display())?;
            self.report.autosaved.push(path);
        }
        Ok(self.report)
    }

    fn apply(&mut self, command: ReviewCommand) -> Result<()> {
        match command {
            ReviewCommand::Set { row, status } => {
                let ctx = self.session.board().assignment_context(&self.view)?;
                let outcome = self.session.board_mut().set_status(row, status, &ctx);
                self.report_outcome(row, outcome)?;
            }
            ReviewCommand::Toggle(row) => {
                let ctx = self.session.board().assignment_context(&self.view)?;
                let outcome = self.session.board_mut().toggle(row, &ctx);
                self.report_outcome(row, outcome)?;
            }
            ReviewCommand::Assign {
                row,
                product,
                channel,
            } => {
                if !self
                    .session
                    .board_mut()
                    .set_assignment(row, product, channel)
                {
                    bail!("row {row} is not selected");
                }
                self.report.changes += 1;
                writeln!(self.out, "row {row}: assignment updated")?;
            }
            ReviewCommand::Category(category) => {
                let criteria = self.session.criteria(&self.view)?.with_category(category);
                self.apply_criteria(criteria)?;
            }
            ReviewCommand::Channels(choice) => {
                let channels = match choice {
                    ChannelChoice::All => self.session.board().channel_catalog().to_vec(),
                    ChannelChoice::Only(channels) => channels,
                };
                let criteria = self.session.criteria(&self.view)?.with_channels(channels);
                self.apply_criteria(criteria)?;
            }
            ReviewCommand::Search(text) => {
                let criteria = self.session.criteria(&self.view)?.with_search(text);
                self.apply_criteria(criteria)?;
            }
            ReviewCommand::Statuses(statuses) => {
                let criteria = self.session.criteria(&self.view)?.with_statuses(statuses);
                self.apply_criteria(criteria)?;
            }
            ReviewCommand::Show(limit) => self.show(limit)?,
            ReviewCommand::Stats => {
                let summary = self.session.board().statistics(&self.view)?;
                writeln!(self.out, "{}", stats_line(&summary))?;
            }
            ReviewCommand::Save => self.save()?,
            ReviewCommand::Help => writeln!(self.out, "{HELP}")?,
            ReviewCommand::Quit => {}
        }
        Ok(())
    }

    fn apply_criteria(&mut self, criteria: FilterCriteria) -> Result<()> {
        let outcome = self.session.apply_criteria(&self.view, criteria)?;
        if outcome.is_guard() {
            writeln!(self.out, "{NO_CHANNEL_MESSAGE}")?;
        } else {
            let visible = outcome.len();
            writeln!(self.out, "{visible} rows visible")?;
        }
        Ok(())
    }

    fn show(&mut self, limit: Option<usize>) -> Result<()> {
        let projection = self.session.board().projection(&self.view)?;
        if projection.is_guard() {
            writeln!(self.out, "{NO_CHANNEL_MESSAGE}")?;
            return Ok(());
        }
        let rows = self.session.row_views(projection.rows(), &self.columns);
        let headers = self.session.column_names(&self.columns);
        writeln!(self.out, "{}", projection_table(&headers, &rows, limit))?;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let tracker = self.autosaver.tracker_mut();
        tracker.open_manual_save();
        tracker.start_save();
        let result = self.session.save();
        let tracker = self.autosaver.tracker_mut();
        tracker.close_manual_save();
        match result {
            Ok(path) => {
                tracker.save_complete();
                writeln!(self.out, "saved to {}", path.display())?;
                self.report.saved.push(path);
                Ok(())
            }
            Err(error) => {
                tracker.save_failed();
                Err(error)
            }
        }
    }

    fn tick(&mut self) {
        let source = self.session.source().to_path_buf();
        if let Some(path) = self
            .autosaver
            .tick(self.session.board_mut(), Some(&source))
        {
            self.report.autosaved.push(path);
        }
    }

    fn report_outcome(&mut self, row: RowId, outcome: Option<TransitionOutcome>) -> Result<()> {
        if outcome.is_some() {
            self.report.changes += 1;
        }
        writeln!(self.out, "{}", describe_outcome(row, outcome.as_ref()))?;
        Ok(())
    }
}
