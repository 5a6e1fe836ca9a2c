use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;
use teamgrid_core::member::NewUser;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Register a user
    Add {
        /// Email address
        email: String,
        /// Display name
        #[arg(long, default_value = "")]
        name: String,
        /// Explicit id (lowercase slug; generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// List all users
    List,
}

pub fn run(
    root: &Path,
    server: Option<&str>,
    subcmd: UserSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let gw = super::gateway(root, server)?;
    super::block_on(async move {
        match subcmd {
            UserSubcommand::Add { email, name, id } => {
                let user = gw.create_user(&NewUser { id, name, email }).await?;
                if json {
                    print_json(&user)?;
                } else {
                    println!("Created user '{}' <{}>", user.id, user.email);
                }
            }
            UserSubcommand::List => {
                let users = gw.list_users().await?;
                if json {
                    print_json(&users)?;
                } else if users.is_empty() {
                    println!("No users.");
                } else {
                    let rows = users
                        .iter()
                        .map(|u| vec![u.id.clone(), u.name.clone(), u.email.clone()])
                        .collect();
                    print_table(&["ID", "NAME", "EMAIL"], rows);
                }
            }
        }
        Ok(())
    })
}
