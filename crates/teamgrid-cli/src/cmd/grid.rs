use crate::output::{print_json, print_json_line, print_table};
use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use clap::Subcommand;
use futures::StreamExt;
use std::path::Path;
use teamgrid_core::calendar;
use teamgrid_core::client::HttpGateway;
use teamgrid_core::controller::GridController;
use teamgrid_core::prefs::ViewPrefs;
use teamgrid_core::record::CellPosition;
use teamgrid_core::types::{DayPart, Status};
use teamgrid_core::view::GridView;

#[derive(Subcommand)]
pub enum GridSubcommand {
    /// Show the 14-day grid for a project
    Show {
        project: String,
        /// First date of the window (default: last viewed, else this week)
        #[arg(long)]
        from: Option<String>,
    },
    /// Move the window two weeks forward
    Next { project: String },
    /// Move the window two weeks back
    Prev { project: String },
    /// Move the window to the current week
    Today { project: String },
    /// Rotate one cell to its next status
    Click {
        project: String,
        user: String,
        /// YYYY-MM-DD
        date: String,
        /// morning | afternoon
        #[arg(default_value = "morning")]
        part: String,
    },
    /// Set a status on a span of one member's half-days
    Set {
        project: String,
        user: String,
        /// Span start, DATE[:PART] (part defaults to morning)
        from: String,
        /// Span end, DATE[:PART] (part defaults to afternoon; omit for one cell)
        #[arg(long)]
        to: Option<String>,
        /// Status name, or key 1-4 (working, partial, not working, free)
        #[arg(long, short = 's')]
        status: String,
    },
    /// Follow live updates for a project until interrupted
    Watch { project: String },
}

pub fn run(
    root: &Path,
    server: Option<&str>,
    subcmd: GridSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let gw = super::gateway(root, server)?;
    super::block_on(async move {
        match subcmd {
            GridSubcommand::Show { project, from } => {
                let from = from.as_deref().map(parse_date).transpose()?;
                let c = open_controller(&gw, root, &project, from).await?;
                if from.is_some() {
                    remember_window(root, &c)?;
                }
                render(&c.view(), json)
            }
            GridSubcommand::Next { project } => {
                let mut c = open_controller(&gw, root, &project, None).await?;
                c.next_period();
                remember_window(root, &c)?;
                render(&c.view(), json)
            }
            GridSubcommand::Prev { project } => {
                let mut c = open_controller(&gw, root, &project, None).await?;
                c.previous_period();
                remember_window(root, &c)?;
                render(&c.view(), json)
            }
            GridSubcommand::Today { project } => {
                let mut c = open_controller(&gw, root, &project, None).await?;
                c.today_period(today());
                remember_window(root, &c)?;
                render(&c.view(), json)
            }
            GridSubcommand::Click {
                project,
                user,
                date,
                part,
            } => {
                let mut c = open_controller(&gw, root, &project, None).await?;
                let day_part: DayPart = part.parse()?;
                let cell = CellPosition::new(user, parse_date(&date)?, day_part);
                let record = c
                    .click(cell.clone())
                    .await?
                    .ok_or_else(|| anyhow!("{} {} is not editable", cell.date, cell.day_part))?;
                if json {
                    print_json(&record)
                } else {
                    println!(
                        "{} {} {} → {}",
                        record.user_id,
                        record.date,
                        record.day_part,
                        record.status.label()
                    );
                    Ok(())
                }
            }
            GridSubcommand::Set {
                project,
                user,
                from,
                to,
                status,
            } => {
                let mut c = open_controller(&gw, root, &project, None).await?;
                let anchor = parse_cell(&user, &from, DayPart::Morning)?;
                let target = match to.as_deref() {
                    Some(to) => parse_cell(&user, to, DayPart::Afternoon)?,
                    None => anchor.clone(),
                };

                if !c.drag_start(anchor.clone()) {
                    bail!("{} {} is not editable", anchor.date, anchor.day_part);
                }
                if target != anchor && !c.drag_extend(&target) {
                    bail!("{} {} is not editable", target.date, target.day_part);
                }
                c.drag_end();
                let selected = c.selection().len();

                let outcome = match single_key(&status) {
                    Some(key) => c
                        .key_press(key)
                        .await
                        .ok_or_else(|| anyhow!("no status is bound to key '{key}'"))?,
                    None => c.apply_status(status.parse::<Status>()?).await,
                };
                let next = outcome.next.clone();
                let written = outcome.into_result()?;

                if json {
                    print_json(&serde_json::json!({ "written": written, "next": next }))
                } else {
                    println!("Set {} of {selected} cell(s)", written.len());
                    if let Some(next) = next {
                        println!("next: {} {} {}", next.user_id, next.date, next.day_part);
                    }
                    Ok(())
                }
            }
            GridSubcommand::Watch { project } => watch(&gw, root, &project, json).await,
        }
    })
}

// ---------------------------------------------------------------------------
// Controller setup
// ---------------------------------------------------------------------------

async fn open_controller(
    gw: &HttpGateway,
    root: &Path,
    project_id: &str,
    from: Option<NaiveDate>,
) -> anyhow::Result<GridController<HttpGateway>> {
    let detail = gw
        .get_project(project_id)
        .await
        .with_context(|| format!("failed to load project '{project_id}'"))?;
    let prefs = ViewPrefs::load(root)?;
    let start = from
        .or_else(|| prefs.window_start(project_id))
        .unwrap_or_else(|| calendar::start_of_week(today()));
    let c = GridController::open(gw.clone(), detail.project, detail.members, start).await?;
    Ok(c)
}

fn remember_window(root: &Path, c: &GridController<HttpGateway>) -> anyhow::Result<()> {
    let mut prefs = ViewPrefs::load(root)?;
    prefs.set_window_start(&c.project().id, c.window_start());
    prefs.save(root).context("failed to write views.yaml")?;
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    calendar::parse_date(s).with_context(|| format!("expected YYYY-MM-DD, got '{s}'"))
}

/// `2024-01-08` or `2024-01-08:pm`.
fn parse_cell(user: &str, arg: &str, default_part: DayPart) -> anyhow::Result<CellPosition> {
    let (date, part) = match arg.split_once(':') {
        Some((date, part)) => (date, part.parse()?),
        None => (arg, default_part),
    };
    Ok(CellPosition::new(user, parse_date(date)?, part))
}

fn single_key(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => Some(c),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(view: &GridView, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(view);
    }

    println!("{}  {}", view.project_id, view.title());
    println!();

    let date_headers: Vec<String> = view
        .dates
        .iter()
        .map(|h| h.date.format("%a %d").to_string())
        .collect();
    let mut headers = vec!["MEMBER"];
    headers.extend(date_headers.iter().map(String::as_str));

    let rows = view
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.member.display_name.clone()];
            cells.extend(row.cells.chunks(2).map(|pair| {
                pair.iter()
                    .map(|c| if c.editable { c.status.symbol() } else { '·' })
                    .collect::<String>()
            }));
            cells
        })
        .collect();

    if view.rows.is_empty() {
        println!("No members.");
    } else {
        print_table(&headers, rows);
    }
    println!();
    println!("Each date shows morning then afternoon.");
    println!(
        "{}",
        Status::all()
            .iter()
            .map(|s| format!("{} {}", s.symbol(), s.label()))
            .chain(std::iter::once("· before project start".to_string()))
            .collect::<Vec<_>>()
            .join("   ")
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// watch
// ---------------------------------------------------------------------------

async fn watch(gw: &HttpGateway, root: &Path, project_id: &str, json: bool) -> anyhow::Result<()> {
    let mut c = open_controller(gw, root, project_id, None).await?;
    let mut events = Box::pin(gw.events().await.context("failed to subscribe to updates")?);
    tracing::info!(project = %project_id, server = %gw.base_url(), "watching availability updates");

    loop {
        tokio::select! {
            item = events.next() => match item {
                Some(Ok(event)) => {
                    if !c.apply_event(&event) {
                        continue;
                    }
                    if json {
                        print_json_line(&event)?;
                    } else {
                        println!(
                            "{} {} {} → {}",
                            event.user_id,
                            event.date,
                            event.day_part,
                            event.status.label()
                        );
                    }
                }
                Some(Err(e)) => tracing::warn!(error = %e, "skipping malformed update"),
                None => {
                    tracing::info!("update stream closed by server");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
