use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{load_settings, Field, ListSnapshot, SubmitError, Workbench};
use shared::{
    domain::{Submission, SubmissionId},
    protocol::ListQuery,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "submissions", about = "Manage contact form submissions")]
struct Cli {
    /// Overrides API_BASE / client.toml.
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Print the full UI snapshot as JSON after the command.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: i64,
    },
    Create(FieldArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct FieldArgs {
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    age: Option<String>,
    #[arg(long)]
    address: Option<String>,
    /// Email, Phone or Both.
    #[arg(long)]
    contact: Option<String>,
}

impl FieldArgs {
    fn edits(&self) -> Vec<(Field, &str)> {
        [
            (Field::FullName, &self.full_name),
            (Field::Email, &self.email),
            (Field::PhoneNumber, &self.phone),
            (Field::Age, &self.age),
            (Field::Address, &self.address),
            (Field::PreferredContact, &self.contact),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_base) = cli.api_base {
        settings.api_base = api_base;
    }
    debug!(api_base = %settings.api_base, "connecting");
    let bench = Workbench::connect(&settings)?;

    match cli.command {
        Command::List {
            page,
            limit,
            search,
        } => {
            let limit = limit.unwrap_or(settings.default_page_size);
            bench
                .list()
                .fetch_page(ListQuery {
                    page,
                    limit,
                    search,
                })
                .await?;
            print_page(&bench.list().snapshot().await);
        }
        Command::Show { id } => {
            let submission = bench.api().get(SubmissionId(id)).await?;
            print_submission(&submission);
        }
        Command::Create(fields) => {
            for (field, value) in fields.edits() {
                bench.form().set_field(field, value).await;
            }
            let created = submit(&bench).await?;
            println!("Created submission {}", created.id);
        }
        Command::Update { id, fields } => {
            let existing = bench.api().get(SubmissionId(id)).await?;
            bench.form().begin_edit(&existing).await?;
            for (field, value) in fields.edits() {
                bench.form().set_field(field, value).await;
            }
            let updated = submit(&bench).await?;
            println!("Updated submission {}", updated.id);
        }
        Command::Delete { id, yes } => {
            let deletes = bench.deletes();
            deletes.request_delete(SubmissionId(id)).await?;
            if yes {
                deletes.confirm_delete().await?;
                println!("Deleted submission {id}");
            } else {
                deletes.cancel_delete().await?;
                println!("Delete submission {id}? Re-run with --yes to confirm.");
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&bench.snapshot().await)?);
    }
    Ok(())
}

async fn submit(bench: &Workbench) -> Result<Submission> {
    match bench.form().submit().await {
        Ok(submission) => Ok(submission),
        Err(SubmitError::Invalid(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            bail!("form has {} invalid field(s)", errors.len());
        }
        Err(err) => Err(err.into()),
    }
}

fn print_page(snapshot: &ListSnapshot) {
    println!(
        "{:>5}  {:<24}  {:<28}  {:<12}  {:>3}  {:<7}",
        "ID", "NAME", "EMAIL", "PHONE", "AGE", "CONTACT"
    );
    for row in &snapshot.items {
        println!(
            "{:>5}  {:<24}  {:<28}  {:<12}  {:>3}  {:<7}",
            row.id.0, row.full_name, row.email, row.phone_number, row.age, row.preferred_contact
        );
    }
    println!(
        "Page {} of {} | Total: {}",
        snapshot.query.page,
        snapshot.page_count,
        snapshot.total
    );
}

fn print_submission(submission: &Submission) {
    println!("id:                {}", submission.id);
    println!("full_name:         {}", submission.full_name);
    println!("email:             {}", submission.email);
    println!("phone_number:      {}", submission.phone_number);
    println!("age:               {}", submission.age);
    println!(
        "address:           {}",
        submission.address.as_deref().unwrap_or("-")
    );
    println!("preferred_contact: {}", submission.preferred_contact);
    println!("created_at:        {}", submission.created_at.to_rfc3339());
    println!("updated_at:        {}", submission.updated_at.to_rfc3339());
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
