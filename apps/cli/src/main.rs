use std::process::ExitCode;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use client_core::{LifecycleState, SiteClient, SubmissionController};
use shared::{
    domain::{
        Category, RawFields, FIELD_CATEGORY, FIELD_PROBLEM, FIELD_RESOURCES, FIELD_SOLUTION,
        FIELD_TITLE,
    },
    protocol::BlogQuery,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "idea", about = "Submit an idea to the studio or browse the blog")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a proposal through the idea submission form.
    Submit(IdeaArgs),
    /// List blog posts, optionally filtered.
    Blog {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct IdeaArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    problem: String,
    #[arg(long, value_enum)]
    category: CategoryArg,
    #[arg(long)]
    solution: String,
    /// Links such as a repository or design file.
    #[arg(long, default_value = "")]
    resources: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    FinTech,
    CivicTech,
    Logistics,
    Infrastructure,
    Other,
}

impl From<CategoryArg> for Category {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::FinTech => Category::FinTech,
            CategoryArg::CivicTech => Category::CivicTech,
            CategoryArg::Logistics => Category::Logistics,
            CategoryArg::Infrastructure => Category::Infrastructure,
            CategoryArg::Other => Category::Other,
        }
    }
}

impl IdeaArgs {
    fn into_fields(self) -> RawFields {
        RawFields::new()
            .with(FIELD_TITLE, self.title)
            .with(FIELD_PROBLEM, self.problem)
            .with(FIELD_CATEGORY, Category::from(self.category).as_str())
            .with(FIELD_SOLUTION, self.solution)
            .with(FIELD_RESOURCES, self.resources)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();
    let client = SiteClient::new(args.server_url);

    match args.command {
        Command::Submit(idea) => Ok(submit(client, idea).await),
        Command::Blog { category, search } => {
            blog(&client, BlogQuery { category, search }).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn submit(client: SiteClient, idea: IdeaArgs) -> ExitCode {
    let controller = SubmissionController::new(client);
    println!("Sending...");
    let outcome = controller.submit(idea.into_fields()).await;
    debug!(?outcome, "submission finished");

    match controller.state() {
        LifecycleState::Succeeded => {
            println!("Idea Sent! Thank you for your submission. Our team will review your idea.");
            ExitCode::SUCCESS
        }
        LifecycleState::Failed(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        state => {
            eprintln!("Submission did not complete (state: {state:?})");
            ExitCode::FAILURE
        }
    }
}

async fn blog(client: &SiteClient, query: BlogQuery) -> Result<()> {
    let listing = client.blog(&query).await?;
    println!("Categories: {}", listing.categories.join(" | "));
    if listing.posts.is_empty() {
        println!("No posts match.");
    }
    for post in listing.posts {
        let date = post
            .published_on
            .map(|d| d.format("%b %d, %Y").to_string())
            .unwrap_or_default();
        println!(
            "- {} [{}] {} /blog/{}",
            post.title,
            post.category.as_deref().unwrap_or("Uncategorized"),
            date,
            post.slug
        );
    }
    Ok(())
}
