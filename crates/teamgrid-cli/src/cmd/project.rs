use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::Path;
use teamgrid_core::calendar;
use teamgrid_core::project::{NewProject, ProjectDetail, ProjectPatch};

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Create a project
    Create {
        /// Display name
        name: String,
        /// First day of the project (YYYY-MM-DD); earlier weeks are read-only
        #[arg(long)]
        start: String,
        /// Explicit id (derived from the name when omitted)
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Weekday sprints begin on, 0 = Sunday .. 6 = Saturday
        #[arg(long)]
        sprint_start_day: Option<u8>,
    },
    /// List all projects
    List,
    /// Show a project and its members
    Show { id: String },
    /// Rename a project or change its start date
    Update {
        id: String,
        /// New display name (required by the server)
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        sprint_start_day: Option<u8>,
    },
    /// Add a user to a project
    AddMember { project: String, user: String },
    /// Remove a user from a project
    RemoveMember { project: String, user: String },
    /// Manage sprint start dates
    Sprint {
        #[command(subcommand)]
        subcommand: SprintSubcommand,
    },
}

#[derive(Subcommand)]
pub enum SprintSubcommand {
    /// Record a sprint start date
    Add { project: String, date: String },
    /// Remove a sprint start date
    Remove { project: String, date: String },
    /// List sprint start dates
    List { project: String },
}

pub fn run(
    root: &Path,
    server: Option<&str>,
    subcmd: ProjectSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let gw = super::gateway(root, server)?;
    super::block_on(async move {
        match subcmd {
            ProjectSubcommand::Create {
                name,
                start,
                id,
                description,
                sprint_start_day,
            } => {
                let body = NewProject {
                    id,
                    name,
                    description,
                    start_date: parse_date(&start)?,
                    sprint_start_day,
                };
                let project = gw.create_project(&body).await?;
                if json {
                    print_json(&project)?;
                } else {
                    println!(
                        "Created project '{}' starting {}",
                        project.id, project.start_date
                    );
                }
            }
            ProjectSubcommand::List => {
                let projects = gw.list_projects().await?;
                if json {
                    print_json(&projects)?;
                } else if projects.is_empty() {
                    println!("No projects.");
                } else {
                    let rows = projects
                        .iter()
                        .map(|p| {
                            vec![
                                p.id.clone(),
                                p.name.clone(),
                                p.start_date.to_string(),
                                p.member_ids.len().to_string(),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "NAME", "START", "MEMBERS"], rows);
                }
            }
            ProjectSubcommand::Show { id } => {
                let detail = gw.get_project(&id).await?;
                print_detail(&detail, json)?;
            }
            ProjectSubcommand::Update {
                id,
                name,
                description,
                start,
                sprint_start_day,
            } => {
                let patch = ProjectPatch {
                    name,
                    description,
                    start_date: start.as_deref().map(parse_date).transpose()?,
                    sprint_start_day,
                };
                let project = gw.update_project(&id, &patch).await?;
                if json {
                    print_json(&project)?;
                } else {
                    println!("Updated project '{}'", project.id);
                }
            }
            ProjectSubcommand::AddMember { project, user } => {
                let detail = gw.add_member(&project, &user).await?;
                if json {
                    print_json(&detail)?;
                } else {
                    println!("Added '{user}' to '{project}'");
                }
            }
            ProjectSubcommand::RemoveMember { project, user } => {
                let detail = gw.remove_member(&project, &user).await?;
                if json {
                    print_json(&detail)?;
                } else {
                    println!("Removed '{user}' from '{project}'");
                }
            }
            ProjectSubcommand::Sprint { subcommand } => {
                let sprints = match subcommand {
                    SprintSubcommand::Add { project, date } => {
                        gw.add_sprint(&project, parse_date(&date)?).await?
                    }
                    SprintSubcommand::Remove { project, date } => {
                        gw.remove_sprint(&project, parse_date(&date)?).await?
                    }
                    SprintSubcommand::List { project } => gw.list_sprints(&project).await?,
                };
                print_sprints(&sprints, json)?;
            }
        }
        Ok(())
    })
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    calendar::parse_date(s).with_context(|| format!("expected YYYY-MM-DD, got '{s}'"))
}

fn print_detail(detail: &ProjectDetail, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(detail);
    }
    let p = &detail.project;
    println!("{} ({})", p.name, p.id);
    if let Some(description) = &p.description {
        println!("{description}");
    }
    println!("Start:     {} (editable from {})", p.start_date, p.editable_from());
    println!("Sprints:   {} start on weekday {}", p.sprints.len(), p.sprint_start_day);
    println!();
    if detail.members.is_empty() {
        println!("No members.");
        return Ok(());
    }
    let rows = detail
        .members
        .iter()
        .map(|m| vec![m.id.clone(), m.display_name.clone(), m.email.clone()])
        .collect();
    print_table(&["ID", "NAME", "EMAIL"], rows);
    Ok(())
}

fn print_sprints(sprints: &[NaiveDate], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&sprints);
    }
    if sprints.is_empty() {
        println!("No sprints.");
    }
    for s in sprints {
        println!("{}  {}", s, s.format("%a"));
    }
    Ok(())
}
