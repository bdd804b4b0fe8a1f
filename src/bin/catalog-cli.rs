use clap::{Parser, Subcommand};
use serde_json::Value;

use course_catalog::Course;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Command-line client for the course catalog service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service status and counters
    Status,
    /// List every course in the catalog
    List,
    /// Show one course by code
    Show { code: String },
    /// Submit a new course
    Add {
        #[arg(long, default_value = "")]
        code: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        instructor: String,
        #[arg(long, default_value = "")]
        semester: String,
        #[arg(long, default_value = "")]
        schedule: String,
        #[arg(long, default_value = "")]
        classroom: String,
        #[arg(long, default_value = "")]
        prerequisites: String,
        #[arg(long, default_value = "")]
        grading: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = url::Url::parse(&cli.url)?;
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client.get(base.join("/api/status")?).send().await?;
            print_response(res).await?;
        }
        Commands::List => {
            let res = client.get(base.join("/api/courses")?).send().await?;
            print_response(res).await?;
        }
        Commands::Show { code } => {
            let mut url = base.join("/api/courses/")?;
            url.path_segments_mut()
                .map_err(|_| "service URL cannot carry a path")?
                .pop_if_empty()
                .push(&code);
            let res = client.get(url).send().await?;
            print_response(res).await?;
        }
        Commands::Add {
            code,
            name,
            instructor,
            semester,
            schedule,
            classroom,
            prerequisites,
            grading,
            description,
        } => {
            let course = Course {
                code,
                name,
                instructor,
                semester,
                schedule,
                classroom,
                prerequisites,
                grading,
                description,
            };
            let res = client
                .post(base.join("/api/courses")?)
                .json(&course)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: catalog API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
